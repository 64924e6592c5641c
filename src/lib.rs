//! Hevconv - HEVC re-encoding front-end for ffmpeg
//!
//! Validates conversion parameters against the nvenc and libx265 backends,
//! builds the ffmpeg invocation, and supervises the encoder process while
//! deriving progress from its output streams.

pub mod cli;
pub mod command;
pub mod config;
pub mod encoder;
pub mod error;
pub mod executor;
pub mod params;
pub mod progress;
