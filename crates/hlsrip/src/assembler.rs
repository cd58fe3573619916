use std::path::Path;

use tokio::fs::File;
use tokio::io::AsyncWriteExt;
use tracing::{debug, trace};

use crate::error::RipError;
use crate::fetcher::TrackDownload;

/// Concatenates the downloaded chunks of one track into a single file.
///
/// Chunks are written in index order; indices missing from the download
/// (failed segments) are simply absent from the output. Returns the number
/// of bytes written.
pub async fn assemble(download: &TrackDownload, path: &Path) -> Result<u64, RipError> {
    let mut file = File::create(path).await?;
    let mut written: u64 = 0;
    for (index, chunk) in &download.chunks {
        file.write_all(chunk).await?;
        written += chunk.len() as u64;
        trace!(index, bytes = chunk.len(), "chunk written");
    }
    file.flush().await?;
    debug!(kind = %download.kind, path = %path.display(), written, "track assembled");
    Ok(written)
}
