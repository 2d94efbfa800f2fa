// Licensed under the Apache-2.0 license

//! DUT console transport
//!
//! [`DutConsole`] turns whole commands into frames for a [`ConsoleDriver`]
//! and frames back into commands. Timeouts and retries belong to the driver.

use crate::error::{ConsoleError, TransportError, TransportResult};
use ate_host_frames::{
    chunk_to_vec, frame_count, parse_console_response, reassemble, Frame, SPI_CONSOLE_FRAME_SIZE,
};

/// Trait for the physical or simulated console link
pub trait ConsoleDriver: Send {
    /// Send one frame to the DUT
    fn send_frame(&mut self, frame: &Frame) -> Result<(), ConsoleError>;

    /// Receive the next frame of the current command, `None` once the
    /// command is complete
    fn receive_frame(&mut self) -> Result<Option<Frame>, ConsoleError>;

    /// Block until the DUT prints `sync_msg`
    fn wait_for(&mut self, sync_msg: &str) -> Result<(), ConsoleError>;
}

/// Console configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsoleConfig {
    pub frame_capacity: usize,
    pub max_frames: usize,
    pub verify_crc: bool,
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            frame_capacity: SPI_CONSOLE_FRAME_SIZE,
            max_frames: 20,
            verify_crc: true,
        }
    }
}

impl ConsoleConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_frame_capacity(mut self, capacity: usize) -> Self {
        self.frame_capacity = capacity;
        self
    }

    pub fn with_max_frames(mut self, max_frames: usize) -> Self {
        self.max_frames = max_frames;
        self
    }

    pub fn with_crc_check(mut self, verify_crc: bool) -> Self {
        self.verify_crc = verify_crc;
        self
    }
}

/// Command-level access to the DUT console
pub struct DutConsole<'a> {
    driver: &'a mut dyn ConsoleDriver,
    config: ConsoleConfig,
}

impl<'a> DutConsole<'a> {
    pub fn new(driver: &'a mut dyn ConsoleDriver, config: ConsoleConfig) -> Self {
        Self { driver, config }
    }

    pub fn config(&self) -> &ConsoleConfig {
        &self.config
    }

    fn sync(&mut self, sync_msg: Option<&str>) -> TransportResult<()> {
        if let Some(msg) = sync_msg.filter(|m| !m.is_empty()) {
            log::debug!("waiting for \"{}\"", msg);
            self.driver.wait_for(msg)?;
        }
        Ok(())
    }

    /// Sends a command, after `sync_msg` if given.
    ///
    /// A command that fits one frame goes out space padded. Longer commands
    /// are split across up to `max_frames` frames.
    pub fn send_command(&mut self, sync_msg: Option<&str>, command: &[u8]) -> TransportResult<usize> {
        let capacity = self.config.frame_capacity;
        let need = frame_count(command.len(), capacity.max(1));
        if need > self.config.max_frames {
            log::error!(
                "{} byte command needs {} frames, max {}",
                command.len(),
                need,
                self.config.max_frames
            );
            return Err(TransportError::TooManyFrames {
                need,
                max: self.config.max_frames,
            });
        }

        let frames = if need <= 1 {
            let mut frame = Frame::new(capacity);
            frame.fill_padded(command)?;
            vec![frame]
        } else {
            chunk_to_vec(command, capacity)?
        };

        self.sync(sync_msg)?;
        self.send_frames(&frames)?;
        Ok(frames.len())
    }

    pub fn send_frames(&mut self, frames: &[Frame]) -> TransportResult<()> {
        for frame in frames {
            self.driver.send_frame(frame)?;
        }
        log::debug!("sent {} frames", frames.len());
        Ok(())
    }

    /// Collects the frames of one command, after `sync_msg` if given.
    pub fn receive_frames(&mut self, sync_msg: Option<&str>) -> TransportResult<Vec<Frame>> {
        self.sync(sync_msg)?;
        let mut frames = Vec::new();
        while let Some(frame) = self.driver.receive_frame()? {
            if frames.len() == self.config.max_frames {
                log::error!("DUT sent more than {} frames", self.config.max_frames);
                return Err(TransportError::TooManyFrames {
                    need: frames.len() + 1,
                    max: self.config.max_frames,
                });
            }
            frames.push(frame);
        }
        if frames.is_empty() {
            return Err(TransportError::NoResponse);
        }
        Ok(frames)
    }

    /// Receives one command as raw console bytes.
    pub fn receive_command(&mut self, sync_msg: Option<&str>) -> TransportResult<Vec<u8>> {
        let frames = self.receive_frames(sync_msg)?;
        Ok(reassemble(&frames))
    }

    /// Receives a `RESP_OK`/`RESP_ERR` response and returns its body.
    ///
    /// `RESP_ERR` responses become [`TransportError::DeviceError`].
    pub fn receive_response(&mut self, sync_msg: Option<&str>) -> TransportResult<Vec<u8>> {
        let raw = self.receive_command(sync_msg)?;
        let text = String::from_utf8_lossy(&raw);
        let response = parse_console_response(&text, self.config.verify_crc)?;
        if !response.is_ok() {
            log::error!("DUT returned RESP_ERR: {}", response.body);
            return Err(TransportError::DeviceError(response.body));
        }
        Ok(response.body.into_bytes())
    }
}
