// Licensed under the Apache-2.0 license

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Configuration file, searched for as perso-tool.toml when omitted
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Raise the log level (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the objects of a raw perso blob
    Inspect {
        /// Raw blob file
        blob: PathBuf,
    },

    /// Extract the typed records of a raw perso blob
    Unpack {
        /// Raw blob file
        blob: PathBuf,

        /// Skip the signature, TBS and device id checks
        #[arg(long)]
        lenient: bool,
    },

    /// Build a raw perso blob from endorsed certificates
    Pack {
        /// Certificate as LABEL=FILE, in blob order
        #[arg(long = "cert", value_name = "LABEL=FILE", required = true)]
        certs: Vec<String>,

        /// Output file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Print the console JSON command carrying a raw perso blob
    ToJson {
        /// Raw blob file
        blob: PathBuf,

        /// Object count to advertise instead of the counted one
        #[arg(long)]
        num_objects: Option<usize>,
    },

    /// Decode and unpack a perso blob from a captured console response
    FromConsole {
        /// Captured console text
        capture: PathBuf,

        /// Also save the raw blob
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Do not verify the response CRC
        #[arg(long)]
        skip_crc: bool,
    },

    /// Print the RMA token command for a hex encoded token hash
    RmaToken {
        /// 16-byte token hash, hex encoded
        token: String,

        /// Omit the trailing CRC object
        #[arg(long)]
        skip_crc: bool,
    },

    /// Write the effective configuration as TOML
    InitConfig {
        /// Output file
        #[arg(default_value = "perso-tool.toml")]
        output: PathBuf,
    },
}
