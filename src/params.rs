use std::path::{Path, PathBuf};

use crate::encoder::{AudioCodec, Encoder};
use crate::error::ValidationError;

/// Conversion options as gathered from the command line merged with config
/// defaults, before any checking has happened.
#[derive(Debug, Clone)]
pub struct RawParams {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub crf: i32,
    /// Preset name or numeric index into the backend's preset table.
    pub preset: String,
    pub audio_codec: String,
    pub resolution: Option<String>,
    pub encoder: String,
    pub bitrate: Option<String>,
}

impl RawParams {
    pub fn new<P: Into<PathBuf>>(input: P) -> Self {
        Self {
            input: input.into(),
            output: None,
            crf: 28,
            preset: "fast".to_string(),
            audio_codec: "aac".to_string(),
            resolution: None,
            encoder: "nvenc".to_string(),
            bitrate: None,
        }
    }
}

/// A validated, immutable parameter set. `preset` is guaranteed to resolve
/// against `encoder`'s preset table, either as a lower-cased name or as a
/// numeric index, and is never touched again after validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionParams {
    pub input: PathBuf,
    pub output: Option<PathBuf>,
    pub crf: i32,
    pub preset: String,
    pub audio_codec: AudioCodec,
    pub resolution: Option<u32>,
    pub encoder: Encoder,
    pub bitrate: Option<String>,
}

/// Check a raw parameter set against the encoder catalog and the filesystem.
/// Checks run in a fixed order and the first failure wins; nothing is
/// accumulated. The only side effects are read-only stat calls.
pub fn validate(raw: &RawParams) -> Result<ConversionParams, ValidationError> {
    let encoder =
        Encoder::from_id(&raw.encoder).ok_or_else(|| ValidationError::UnknownEncoder {
            given: raw.encoder.clone(),
        })?;

    if raw.input.as_os_str().is_empty() || !raw.input.is_file() {
        return Err(ValidationError::InputNotFound {
            path: raw.input.clone(),
        });
    }

    let (min_crf, max_crf) = encoder.crf_range();
    if raw.crf < min_crf || raw.crf > max_crf {
        return Err(ValidationError::CrfOutOfRange {
            crf: raw.crf,
            min: min_crf,
            max: max_crf,
        });
    }

    let preset = validate_preset(&raw.preset, encoder)?;

    let audio_codec =
        AudioCodec::from_id(&raw.audio_codec).ok_or_else(|| ValidationError::UnknownAudioCodec {
            given: raw.audio_codec.clone(),
        })?;

    let resolution = match &raw.resolution {
        Some(value) => Some(validate_resolution(value)?),
        None => None,
    };

    if let Some(output) = &raw.output {
        validate_output_dir(output)?;
    }

    Ok(ConversionParams {
        input: raw.input.clone(),
        output: raw.output.clone(),
        crf: raw.crf,
        preset,
        audio_codec,
        resolution,
        encoder,
        bitrate: raw.bitrate.clone(),
    })
}

/// A numeric preset must be a valid index into the backend's table; a
/// textual one must match a table entry case-insensitively. Returns the
/// lower-cased value either way.
fn validate_preset(preset: &str, encoder: Encoder) -> Result<String, ValidationError> {
    let table = encoder.presets();

    if let Ok(index) = preset.parse::<i64>() {
        if index < 0 || index as usize >= table.len() {
            return Err(ValidationError::PresetIndexOutOfRange {
                index,
                max: table.len() - 1,
            });
        }
        return Ok(preset.to_string());
    }

    let normalized = preset.to_lowercase();
    if table.contains(&normalized.as_str()) {
        Ok(normalized)
    } else {
        Err(ValidationError::UnknownPresetName {
            given: preset.to_string(),
            valid: table.join(", "),
            max_index: table.len() - 1,
        })
    }
}

fn validate_resolution(value: &str) -> Result<u32, ValidationError> {
    match value.trim().parse::<u32>() {
        Ok(height) if height > 0 => Ok(height),
        _ => Err(ValidationError::InvalidResolution {
            given: value.to_string(),
        }),
    }
}

/// A bare filename has an empty parent, which means the current directory.
fn validate_output_dir(output: &Path) -> Result<(), ValidationError> {
    match output.parent() {
        None => Ok(()),
        Some(dir) if dir.as_os_str().is_empty() => Ok(()),
        Some(dir) if dir.is_dir() => Ok(()),
        Some(dir) => Err(ValidationError::OutputDirectoryMissing {
            dir: dir.to_path_buf(),
        }),
    }
}
