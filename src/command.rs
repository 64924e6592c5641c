use rand::Rng;
use std::path::{Path, PathBuf};

use crate::params::ConversionParams;

const SUFFIX_CHARS: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";
const SUFFIX_LEN: usize = 6;

/// A fully resolved ffmpeg invocation for one conversion. Building it is
/// deterministic apart from the one-time output-name generation, which
/// happens here and nowhere else.
#[derive(Debug, Clone)]
pub struct ConversionCommand {
    pub args: Vec<String>,
    pub output: PathBuf,
}

impl ConversionCommand {
    /// Build the argument vector for a validated parameter set. Numeric
    /// presets are resolved to their table entry; a missing output path is
    /// generated next to the input.
    pub fn from_params(params: &ConversionParams) -> Self {
        let output = params
            .output
            .clone()
            .unwrap_or_else(|| default_output_path(&params.input));
        let args = build_args(params, &output);
        Self { args, output }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

/// Pure function of the validated parameters and the resolved output path.
/// Flag grouping matches what ffmpeg requires: input before codec and
/// filter options, output last.
fn build_args(params: &ConversionParams, output: &Path) -> Vec<String> {
    let table = params.encoder.presets();
    let preset = match params.preset.parse::<usize>() {
        Ok(index) => table[index],
        Err(_) => params.preset.as_str(),
    };

    let mut args = vec![
        "-y".to_string(),
        "-i".to_string(),
        params.input.to_string_lossy().to_string(),
        "-c:v".to_string(),
        params.encoder.codec_flag().to_string(),
        "-preset".to_string(),
        preset.to_string(),
    ];

    // scale=-2:HEIGHT keeps the aspect ratio with an even width.
    if let Some(height) = params.resolution {
        args.extend(["-vf".to_string(), format!("scale=-2:{}", height)]);
    }

    // Without an explicit bitrate the conversion runs in constant-quality
    // mode driven by CRF alone.
    if let Some(bitrate) = &params.bitrate {
        args.extend(["-b:v".to_string(), bitrate.clone()]);
    }

    args.extend([
        "-crf".to_string(),
        params.crf.to_string(),
        "-c:a".to_string(),
        params.audio_codec.id().to_string(),
        "-progress".to_string(),
        "pipe:1".to_string(),
        output.to_string_lossy().to_string(),
    ]);

    args
}

/// `<stem>_hevc_<6 random lowercase alphanumerics><original extension>` in
/// the input's directory. No collision check against existing files.
fn default_output_path(input: &Path) -> PathBuf {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| SUFFIX_CHARS[rng.gen_range(0..SUFFIX_CHARS.len())] as char)
        .collect();

    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_default();
    let extension = input
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    input
        .with_file_name(format!("{}_hevc_{}{}", stem, suffix, extension))
}
