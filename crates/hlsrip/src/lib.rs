//! HLS download engine: fetches pages and playlists, lists and selects
//! renditions, downloads segments with bounded concurrency, reassembles
//! them in declaration order and muxes the tracks with ffmpeg.

pub mod assembler;
pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod mux;
pub mod playlist;
pub mod rendition;

pub use client::{base_of, create_client, fetch_manifest, fetch_page};
pub use config::{DownloadConfig, FetcherConfig};
pub use error::RipError;
pub use fetcher::{HttpSegmentSource, SegmentFetcher, SegmentSource, TrackDownload};
pub use playlist::{RenditionLists, list_renditions, resolve, segment_set, select};
pub use rendition::{Rendition, Segment, SegmentSet, TrackKind};
