// Licensed under the Apache-2.0 license

//! perso-tool: offline helper for personalization blobs
//!
//! Works on raw blob files (the used bytes of a blob, as the DUT lays them
//! out) and on captured console text.

use anyhow::Result;
use args::{Args, Commands};
use clap::Parser;
use config::PersoToolConfig;
use simple_logger::SimpleLogger;
use std::io::Write;

mod args;
mod commands;
mod config;

fn main() -> Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => PersoToolConfig::from_file(path)?,
        None => PersoToolConfig::load_default()?,
    };

    let level = match args.verbose {
        0 => config.log_level()?,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    SimpleLogger::new().with_level(level).init()?;

    let mut stdout = std::io::stdout().lock();
    match &args.command {
        Commands::Inspect { blob } => commands::inspect(blob, &mut stdout),
        Commands::Unpack { blob, lenient } => {
            commands::unpack(&config, blob, *lenient, &mut stdout)
        }
        Commands::Pack { certs, output } => {
            let blob = commands::pack_certs(certs, output)?;
            writeln!(stdout, "wrote {} objects, {} bytes", blob.num_objects, blob.next_free)?;
            Ok(())
        }
        Commands::ToJson { blob, num_objects } => {
            commands::to_json(&config, blob, *num_objects, &mut stdout)
        }
        Commands::FromConsole {
            capture,
            output,
            skip_crc,
        } => {
            let blob = commands::from_console(
                &config,
                capture,
                output.as_deref(),
                *skip_crc,
                &mut stdout,
            )?;
            log::info!("decoded {} objects, {} bytes", blob.num_objects, blob.next_free);
            Ok(())
        }
        Commands::RmaToken { token, skip_crc } => {
            commands::rma_token(token, *skip_crc, &mut stdout)
        }
        Commands::InitConfig { output } => {
            config.save_to_file(output)?;
            writeln!(stdout, "wrote {:?}", output)?;
            Ok(())
        }
    }
}
