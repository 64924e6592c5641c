use clap::Parser;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Input video files to convert
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Output file path (default: generated next to the input)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Video quality, lower is better (default: 28)
    #[arg(short, long)]
    pub crf: Option<i32>,

    /// Encoder preset, a name or a numeric index (default: fast)
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Audio codec: aac, copy or mp3 (default: aac)
    #[arg(short, long)]
    pub audio_codec: Option<String>,

    /// Target vertical resolution in pixels, e.g. 720
    #[arg(short, long)]
    pub resolution: Option<String>,

    /// Encoder backend: nvenc or libx265 (default: nvenc)
    #[arg(short, long)]
    pub encoder: Option<String>,

    /// Target video bitrate, e.g. 5M or 100k (default: constant quality)
    #[arg(short, long)]
    pub bitrate: Option<String>,

    /// Configuration file path
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}
