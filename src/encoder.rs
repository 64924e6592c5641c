use serde::{Deserialize, Serialize};
use std::fmt;

/// Nvenc preset vocabulary (ffmpeg hevc_nvenc). Index position doubles as the
/// numeric preset value accepted on the command line.
const NVENC_PRESETS: &[&str] = &[
    "default",
    "slow",
    "medium",
    "fast",
    "hp",
    "hq",
    "bd",
    "ll",
    "llhq",
    "llhp",
    "lossless",
    "losslesshp",
    "p1",
    "p2",
    "p3",
    "p4",
    "p5",
    "p6",
    "p7",
];

/// libx265 preset vocabulary, slowest to fastest as ffmpeg orders them.
const LIBX265_PRESETS: &[&str] = &[
    "ultrafast",
    "superfast",
    "veryfast",
    "faster",
    "fast",
    "medium",
    "slow",
    "slower",
    "veryslow",
];

/// Supported HEVC encoder backends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Encoder {
    #[default]
    Nvenc,
    Libx265,
}

impl Encoder {
    /// Resolve a backend identifier, case-insensitively. Unknown identifiers
    /// yield `None`; the caller decides how to report that.
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "nvenc" => Some(Encoder::Nvenc),
            "libx265" => Some(Encoder::Libx265),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            Encoder::Nvenc => "nvenc",
            Encoder::Libx265 => "libx265",
        }
    }

    /// The `-c:v` value ffmpeg expects for this backend.
    pub fn codec_flag(&self) -> &'static str {
        match self {
            Encoder::Nvenc => "hevc_nvenc",
            Encoder::Libx265 => "libx265",
        }
    }

    /// Ordered preset table; index position is the numeric-preset mapping.
    pub fn presets(&self) -> &'static [&'static str] {
        match self {
            Encoder::Nvenc => NVENC_PRESETS,
            Encoder::Libx265 => LIBX265_PRESETS,
        }
    }

    /// Inclusive CRF bounds for this backend.
    pub fn crf_range(&self) -> (i32, i32) {
        (0, 51)
    }
}

impl fmt::Display for Encoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

/// Audio handling for the converted file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AudioCodec {
    #[default]
    Aac,
    Copy,
    Mp3,
}

impl AudioCodec {
    /// Resolve a codec identifier, case-insensitively.
    pub fn from_id(id: &str) -> Option<Self> {
        match id.to_lowercase().as_str() {
            "aac" => Some(AudioCodec::Aac),
            "copy" => Some(AudioCodec::Copy),
            "mp3" => Some(AudioCodec::Mp3),
            _ => None,
        }
    }

    pub fn id(&self) -> &'static str {
        match self {
            AudioCodec::Aac => "aac",
            AudioCodec::Copy => "copy",
            AudioCodec::Mp3 => "mp3",
        }
    }
}

impl fmt::Display for AudioCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_tables() {
        assert_eq!(Encoder::Nvenc.presets().len(), 19);
        assert_eq!(Encoder::Libx265.presets().len(), 9);
        assert_eq!(Encoder::Nvenc.presets()[0], "default");
        assert_eq!(Encoder::Nvenc.presets()[18], "p7");
        assert_eq!(Encoder::Libx265.presets()[2], "veryfast");
        assert_eq!(Encoder::Libx265.presets()[8], "veryslow");
    }

    #[test]
    fn test_encoder_from_id() {
        assert_eq!(Encoder::from_id("nvenc"), Some(Encoder::Nvenc));
        assert_eq!(Encoder::from_id("LIBX265"), Some(Encoder::Libx265));
        assert_eq!(Encoder::from_id("libx264"), None);
        assert_eq!(Encoder::from_id(""), None);
    }

    #[test]
    fn test_codec_flags() {
        assert_eq!(Encoder::Nvenc.codec_flag(), "hevc_nvenc");
        assert_eq!(Encoder::Libx265.codec_flag(), "libx265");
    }

    #[test]
    fn test_crf_range() {
        assert_eq!(Encoder::Nvenc.crf_range(), (0, 51));
        assert_eq!(Encoder::Libx265.crf_range(), (0, 51));
    }

    #[test]
    fn test_audio_codec_from_id() {
        assert_eq!(AudioCodec::from_id("AAC"), Some(AudioCodec::Aac));
        assert_eq!(AudioCodec::from_id("copy"), Some(AudioCodec::Copy));
        assert_eq!(AudioCodec::from_id("flac"), None);
    }
}
