use url::Url;

/// Which elementary track a rendition or segment belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackKind {
    Video,
    Audio,
}

impl TrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrackKind::Video => "video",
            TrackKind::Audio => "audio",
        }
    }
}

impl std::fmt::Display for TrackKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable entry of a master playlist, either a variant stream or an
/// audio alternative. `uri` is kept as declared; resolution against the
/// master base happens at selection time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendition {
    pub kind: TrackKind,
    pub uri: String,
    pub label: String,
}

/// A single media segment with its position in the playlist. Positions are
/// the declared playlist indices; deduplication may leave gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub index: usize,
    pub url: Url,
    pub file_name: String,
}

impl Segment {
    pub fn new(kind: TrackKind, index: usize, url: Url) -> Self {
        let file_name = format!("{kind}_segment_{index}.ts");
        Self {
            index,
            url,
            file_name,
        }
    }
}

/// The ordered segments of one media playlist.
#[derive(Debug, Clone)]
pub struct SegmentSet {
    pub kind: TrackKind,
    pub segments: Vec<Segment>,
}
