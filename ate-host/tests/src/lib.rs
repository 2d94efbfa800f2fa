// Licensed under the Apache-2.0 license

//! Integration tests for the ATE host crates
//!
//! All integration tests live in this one library so they can share the
//! simulated DUT in [`common`].


#[cfg(test)]
pub mod test_cp_flow;

#[cfg(test)]
pub mod test_ft_flow;

#[cfg(test)]
pub mod test_console_frames;
