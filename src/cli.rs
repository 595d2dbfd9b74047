use clap::{Parser, ValueEnum};
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, ValueEnum, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// One line per frame: time and note names
    #[default]
    Text,
    /// One JSON object per frame
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "pitchscope", about = "Detect sounded notes in an audio file, frame by frame")]
pub struct Cli {
    /// Input audio file (WAV, MP3, FLAC, OGG, AAC)
    pub input: PathBuf,

    /// Start of the analysed span, in seconds
    #[arg(long, default_value_t = 0.0)]
    pub start: f64,

    /// End of the analysed span, in seconds (defaults to the end of the file)
    #[arg(long)]
    pub end: Option<f64>,

    /// Analysis frames per second
    #[arg(long, default_value_t = 30)]
    pub fps: u32,

    /// log2 of the number of frequency bins (4-16)
    #[arg(short, long, default_value_t = 12)]
    pub resolution: u32,

    /// Weight of the previous frame when smoothing (0.0-1.0)
    #[arg(short, long, default_value_t = 0.8)]
    pub smoothing: f32,

    /// Minimum peak prominence on the normalized log-magnitude scale
    #[arg(short, long, default_value_t = 0.1)]
    pub threshold: f32,

    /// Lowest frequency searched for notes, in Hz
    #[arg(long, default_value_t = 27.5)]
    pub min_freq: f64,

    /// Highest frequency searched for notes, in Hz
    #[arg(long, default_value_t = 4200.0)]
    pub max_freq: f64,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Analyse all frames up front on every core, then report
    #[arg(long)]
    pub parallel: bool,

    /// Config file (defaults to pitchscope.toml or the user config dir)
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}
