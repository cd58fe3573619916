use std::collections::HashSet;

use m3u8_rs::{AlternativeMediaType, MasterPlaylist, MediaPlaylist, Playlist, parse_playlist_res};
use tracing::{debug, warn};
use url::Url;

use crate::client::base_of;
use crate::error::RipError;
use crate::rendition::{Rendition, Segment, SegmentSet, TrackKind};

/// Renditions offered by a master playlist, in declaration order.
#[derive(Debug, Clone)]
pub struct RenditionLists {
    pub video: Vec<Rendition>,
    pub audio: Vec<Rendition>,
}

/// Parses a master playlist body into its video and audio renditions.
///
/// Video renditions come from the variant streams, audio renditions from
/// the `TYPE=AUDIO` alternatives that carry a URI. Both lists preserve
/// declaration order. A media playlist body is rejected here: callers that
/// reached this point expected variants to choose from.
pub fn list_renditions(manifest_text: &str) -> Result<RenditionLists, RipError> {
    let master = parse_master(manifest_text)?;

    let video = master
        .variants
        .iter()
        .map(|variant| Rendition {
            kind: TrackKind::Video,
            uri: variant.uri.clone(),
            label: video_label(variant.bandwidth, variant.resolution.as_ref()),
        })
        .collect();

    let audio = master
        .alternatives
        .iter()
        .filter(|alt| alt.media_type == AlternativeMediaType::Audio)
        .filter_map(|alt| {
            let uri = alt.uri.clone()?;
            Some(Rendition {
                kind: TrackKind::Audio,
                uri,
                label: audio_label(&alt.name, alt.language.as_deref()),
            })
        })
        .collect();

    let lists = RenditionLists { video, audio };
    debug!(
        video = lists.video.len(),
        audio = lists.audio.len(),
        "renditions listed"
    );
    Ok(lists)
}

/// Picks a rendition by 1-based ordinal, the numbering shown to the user.
pub fn select(renditions: &[Rendition], ordinal: usize) -> Result<&Rendition, RipError> {
    if ordinal == 0 || ordinal > renditions.len() {
        return Err(RipError::SelectionOutOfRange {
            ordinal,
            available: renditions.len(),
        });
    }
    Ok(&renditions[ordinal - 1])
}

/// Resolves a rendition URI against the master playlist base.
pub fn resolve(rendition: &Rendition, master_base: &Url) -> Result<Url, RipError> {
    master_base.join(&rendition.uri).map_err(|e| {
        RipError::InvalidUrl(format!(
            "failed to resolve rendition URI {}: {e}",
            rendition.uri
        ))
    })
}

/// Parses a media playlist body into an ordered segment set.
///
/// Segment URIs are resolved against the media playlist's own base. Each
/// segment keeps its declared playlist position as index; a URL seen before
/// is dropped on re-occurrence, so deduplication leaves gaps in the
/// numbering rather than renumbering the survivors.
pub fn segment_set(
    media_text: &str,
    media_url: &Url,
    kind: TrackKind,
) -> Result<SegmentSet, RipError> {
    let media = parse_media(media_text)?;
    let base = base_of(media_url)?;

    let mut seen: HashSet<String> = HashSet::new();
    let mut segments = Vec::with_capacity(media.segments.len());
    for (index, declared) in media.segments.iter().enumerate() {
        let url = base.join(&declared.uri).map_err(|e| {
            RipError::InvalidUrl(format!("failed to resolve segment URI {}: {e}", declared.uri))
        })?;
        if !seen.insert(url.as_str().to_owned()) {
            warn!(%url, index, "duplicate segment URL skipped");
            continue;
        }
        segments.push(Segment::new(kind, index, url));
    }

    debug!(%kind, count = segments.len(), "segment set built");
    Ok(SegmentSet { kind, segments })
}

fn parse_master(text: &str) -> Result<MasterPlaylist, RipError> {
    match parse_playlist_res(text.as_bytes()) {
        Ok(Playlist::MasterPlaylist(pl)) => Ok(pl),
        Ok(Playlist::MediaPlaylist(_)) => Err(RipError::ManifestParse(
            "expected a master playlist but got a media playlist".to_owned(),
        )),
        Err(e) => Err(RipError::ManifestParse(format!(
            "failed to parse master playlist: {e}"
        ))),
    }
}

fn parse_media(text: &str) -> Result<MediaPlaylist, RipError> {
    match parse_playlist_res(text.as_bytes()) {
        Ok(Playlist::MediaPlaylist(pl)) => Ok(pl),
        Ok(Playlist::MasterPlaylist(_)) => Err(RipError::ManifestParse(
            "expected a media playlist but got a master playlist".to_owned(),
        )),
        Err(e) => Err(RipError::ManifestParse(format!(
            "failed to parse media playlist: {e}"
        ))),
    }
}

fn video_label(bandwidth: u64, resolution: Option<&m3u8_rs::Resolution>) -> String {
    let kbps = bandwidth / 1000;
    match resolution {
        Some(res) => format!("{}x{} @ {kbps} kbps", res.width, res.height),
        None => format!("{kbps} kbps"),
    }
}

fn audio_label(name: &str, language: Option<&str>) -> String {
    match language {
        Some(lang) => format!("{name} ({lang})"),
        None => name.to_owned(),
    }
}
