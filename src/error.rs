use std::path::PathBuf;
use thiserror::Error;

/// Errors detected before any encoder process is spawned. Each variant
/// carries the offending value and the accepted range or set.
#[derive(Error, Debug, PartialEq)]
pub enum ValidationError {
    #[error("unknown encoder '{given}': valid encoders are nvenc, libx265")]
    UnknownEncoder { given: String },

    #[error("input file not found: {path}")]
    InputNotFound { path: PathBuf },

    #[error("CRF value {crf} out of range: must be between {min} and {max}")]
    CrfOutOfRange { crf: i32, min: i32, max: i32 },

    #[error("preset index {index} out of range: must be between 0 and {max}")]
    PresetIndexOutOfRange { index: i64, max: usize },

    #[error("unknown preset '{given}': valid presets are {valid} or 0-{max_index}")]
    UnknownPresetName {
        given: String,
        valid: String,
        max_index: usize,
    },

    #[error("unknown audio codec '{given}': valid codecs are aac, copy, mp3")]
    UnknownAudioCodec { given: String },

    #[error("resolution '{given}' is invalid: must be a positive integer")]
    InvalidResolution { given: String },

    #[error("output directory does not exist: {dir}")]
    OutputDirectoryMissing { dir: PathBuf },
}

/// Errors detected while spawning or supervising the encoder process.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("failed to spawn encoder process: {detail}")]
    SpawnFailed { detail: String },

    #[error("encoder exited with code {code}")]
    NonZeroExit { code: i32 },

    #[error("conversion aborted")]
    Cancelled,

    #[error("IO error while supervising encoder: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum HevconvError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Execution(#[from] ExecutionError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, HevconvError>;
