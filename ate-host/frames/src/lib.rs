// Licensed under the Apache-2.0 license

//! ATE host frame layer
//!
//! Splits serialized commands across fixed-capacity SPI console frames,
//! reassembles received frames, and strips console noise around payloads.

pub mod console;
pub mod error;
pub mod frame;

pub use console::{
    crc32, encode_console_response, parse_console_response, ConsoleResponse, ResponseStatus,
};
pub use error::{FrameError, FrameResult};
pub use frame::{
    chunk, chunk_to_vec, frame_count, reassemble, trim_to_json, Frame, FRAME_PAD_BYTE,
    SPI_CONSOLE_FRAME_SIZE,
};
