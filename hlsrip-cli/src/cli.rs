use clap::Parser;
use std::path::PathBuf;

/// Define CLI arguments
#[derive(Parser)]
#[command(
    author = "hua0512 <https://github.com/hua0512>",
    version,
    about = "Downloads an HLS stream embedded in a web page and muxes it into MP4",
    long_about = "Scans a web page for an embedded HLS master playlist, lets you pick a\n\
                  video and an audio rendition, downloads both segment sets concurrently\n\
                  and muxes them into a single MP4 file with ffmpeg."
)]
pub struct CliArgs {
    /// URL of the page embedding the stream
    #[arg(
        short,
        long,
        help = "URL of the page embedding the stream (prompted for when omitted)"
    )]
    pub url: Option<String>,

    /// Output MP4 path
    #[arg(
        short,
        long,
        help = "Path of the muxed MP4 file (default: final-output-<timestamp>.mp4)"
    )]
    pub output: Option<PathBuf>,

    /// Concurrent segment downloads per track
    #[arg(
        short,
        long,
        default_value = "4",
        help = "Maximum number of segment downloads in flight per track"
    )]
    pub concurrency: usize,

    /// Overall timeout in seconds
    #[arg(
        long,
        default_value = "30",
        help = "Overall timeout in seconds for HTTP requests"
    )]
    pub timeout: u64,

    /// Connection timeout in seconds
    #[arg(
        long,
        default_value = "10",
        help = "Timeout in seconds for establishing connections"
    )]
    pub connect_timeout: u64,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable detailed debug logging")]
    pub verbose: bool,

    /// Disable progress bars
    #[arg(long, help = "Disable progress bars")]
    pub no_progress: bool,
}
