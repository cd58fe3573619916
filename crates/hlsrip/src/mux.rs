use std::path::Path;
use std::process::Stdio;

use tokio::process::Command;
use tracing::{debug, info};

use crate::error::RipError;

/// Muxes an assembled video track and audio track into an MP4 container.
/// The video stream is copied as-is; audio is re-encoded to AAC.
pub async fn mux(video: &Path, audio: &Path, output: &Path) -> Result<(), RipError> {
    debug!(
        video = %video.display(),
        audio = %audio.display(),
        output = %output.display(),
        "invoking ffmpeg"
    );
    let result = Command::new("ffmpeg")
        .args(["-hide_banner", "-loglevel", "error", "-y", "-i"])
        .arg(video)
        .arg("-i")
        .arg(audio)
        .args(["-c:v", "copy", "-c:a", "aac", "-f", "mp4"])
        .arg(output)
        .stdin(Stdio::null())
        .output()
        .await?;

    if !result.status.success() {
        let stderr = String::from_utf8_lossy(&result.stderr).trim().to_owned();
        return Err(RipError::MuxFailure(stderr));
    }

    info!(output = %output.display(), "mux complete");
    Ok(())
}

/// Checks whether an ffmpeg binary is reachable on PATH.
pub async fn probe() -> bool {
    Command::new("ffmpeg")
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await
        .is_ok_and(|status| status.success())
}
