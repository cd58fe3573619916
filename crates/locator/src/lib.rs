// Manifest locator: derives an HLS master playlist URL from raw page content.
pub mod locate;

pub use locate::{ManifestCandidate, Provenance, locate};
