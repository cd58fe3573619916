use regex::Regex;
use std::sync::LazyLock;
use tracing::{debug, warn};
use url::Url;

static SCRIPT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<script[^>]*>(.*?)</script>").unwrap());

// Brace-delimited object on a single line, greedy. Multi-line JSON blobs are
// not handled by this tier and fall through to the later ones.
static JSON_OBJECT_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{.*\}").unwrap());

static ANCHOR_HREF_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*["']([^"']+)["']"#).unwrap());

static INLINE_URL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s'"]+\.m3u8"#).unwrap());

const MANIFEST_EXTENSION: &str = ".m3u8";

/// How a manifest candidate was derived from the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    StructuredJson,
    AnchorLink,
    InlineScript,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Provenance::StructuredJson => "structured-json",
            Provenance::AnchorLink => "anchor-link",
            Provenance::InlineScript => "inline-script",
        };
        f.write_str(tag)
    }
}

/// A located master manifest URL. The URL is always absolute; relative
/// references are resolved against the page base before being surfaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestCandidate {
    pub url: Url,
    pub provenance: Provenance,
}

/// Scans raw page text for a master manifest reference.
///
/// Three tiers are attempted in order, each only if the previous one yielded
/// nothing: embedded JSON player state (`streams[0].url`), anchor hrefs
/// containing the manifest extension, and absolute manifest URLs inside
/// inline script bodies. `None` is a normal outcome, not a fault.
pub fn locate(page_text: &str, page_base: &Url) -> Option<ManifestCandidate> {
    let tiers: [(Provenance, fn(&str) -> Vec<String>); 3] = [
        (Provenance::StructuredJson, structured_json_urls),
        (Provenance::AnchorLink, anchor_link_urls),
        (Provenance::InlineScript, inline_script_urls),
    ];

    for (provenance, tier) in tiers {
        let candidates = dedup_preserving_order(tier(page_text));
        let Some(raw) = candidates.into_iter().next() else {
            continue;
        };
        match page_base.join(&raw) {
            Ok(url) => {
                debug!(%url, %provenance, "manifest candidate located");
                return Some(ManifestCandidate { url, provenance });
            }
            Err(e) => {
                warn!(raw, error = %e, "discarding unresolvable manifest candidate");
            }
        }
    }

    debug!("no manifest reference found in page");
    None
}

/// Tier 1: brace-delimited JSON objects inside script blocks carrying a
/// `streams` list whose first element has a `url` field. Malformed JSON and
/// absent fields are not errors; the candidate is simply skipped.
fn structured_json_urls(page_text: &str) -> Vec<String> {
    let mut urls = Vec::new();
    for script in SCRIPT_REGEX.captures_iter(page_text) {
        let body = script[1].trim();
        let Some(object) = JSON_OBJECT_REGEX.find(body) else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<serde_json::Value>(object.as_str()) else {
            continue;
        };
        if let Some(url) = value
            .get("streams")
            .and_then(|streams| streams.get(0))
            .and_then(|stream| stream.get("url"))
            .and_then(|url| url.as_str())
        {
            urls.push(url.to_owned());
        }
    }
    urls
}

/// Tier 2: hyperlink targets containing the manifest extension, in document
/// order. Multiple matches are not ranked; first occurrence wins.
fn anchor_link_urls(page_text: &str) -> Vec<String> {
    ANCHOR_HREF_REGEX
        .captures_iter(page_text)
        .map(|caps| caps[1].to_owned())
        .filter(|href| href.contains(MANIFEST_EXTENSION))
        .collect()
}

/// Tier 3: absolute manifest URLs inside raw script bodies.
fn inline_script_urls(page_text: &str) -> Vec<String> {
    let mut urls = Vec::new();
    for script in SCRIPT_REGEX.captures_iter(page_text) {
        for found in INLINE_URL_REGEX.find_iter(&script[1]) {
            urls.push(found.as_str().to_owned());
        }
    }
    urls
}

fn dedup_preserving_order(candidates: Vec<String>) -> Vec<String> {
    let mut unique = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        if !unique.contains(&candidate) {
            unique.push(candidate);
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base() -> Url {
        Url::parse("https://example.com/watch/42").unwrap()
    }

    #[test]
    fn structured_json_tier_wins() {
        let page = r#"<html><script>{"streams":[{"url":"http://x/master.m3u8"}]}</script></html>"#;
        let candidate = locate(page, &base()).unwrap();
        assert_eq!(candidate.url.as_str(), "http://x/master.m3u8");
        assert_eq!(candidate.provenance, Provenance::StructuredJson);
    }

    #[test]
    fn locate_is_idempotent() {
        let page = r#"<script>{"streams":[{"url":"http://x/master.m3u8"}]}</script>"#;
        let first = locate(page, &base()).unwrap();
        let second = locate(page, &base()).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn malformed_json_falls_through_to_anchors() {
        let page = concat!(
            r#"<script>{"streams": not-json}</script>"#,
            r#"<a href="/vod/stream.m3u8">play</a>"#,
        );
        let candidate = locate(page, &base()).unwrap();
        assert_eq!(candidate.provenance, Provenance::AnchorLink);
        assert_eq!(candidate.url.as_str(), "https://example.com/vod/stream.m3u8");
    }

    #[test]
    fn json_without_streams_field_yields_nothing_for_tier() {
        let page = r#"<script>{"config":{"autoplay":true}}</script>"#;
        assert!(locate(page, &base()).is_none());
    }

    #[test]
    fn first_anchor_in_document_order_wins() {
        let page = concat!(
            r#"<a href="https://cdn.example.com/a/master.m3u8">a</a>"#,
            r#"<a href="https://cdn.example.com/b/master.m3u8">b</a>"#,
        );
        let candidate = locate(page, &base()).unwrap();
        assert_eq!(candidate.url.as_str(), "https://cdn.example.com/a/master.m3u8");
    }

    #[test]
    fn anchors_are_deduplicated_within_the_tier() {
        let page = concat!(
            r#"<a href="https://cdn.example.com/a/master.m3u8">a</a>"#,
            r#"<a href="https://cdn.example.com/a/master.m3u8">again</a>"#,
        );
        let candidate = locate(page, &base()).unwrap();
        assert_eq!(candidate.url.as_str(), "https://cdn.example.com/a/master.m3u8");
    }

    #[test]
    fn anchors_without_manifest_extension_are_ignored() {
        let page = concat!(
            r#"<a href="/about">about</a>"#,
            r#"<script>var src = "https://cdn.example.com/live/master.m3u8";</script>"#,
        );
        let candidate = locate(page, &base()).unwrap();
        assert_eq!(candidate.provenance, Provenance::InlineScript);
        assert_eq!(candidate.url.as_str(), "https://cdn.example.com/live/master.m3u8");
    }

    #[test]
    fn relative_anchor_is_resolved_against_page_base() {
        let page = r#"<a href="hls/index.m3u8">play</a>"#;
        let candidate = locate(page, &base()).unwrap();
        assert_eq!(candidate.url.as_str(), "https://example.com/watch/hls/index.m3u8");
    }

    #[test]
    fn empty_page_yields_none() {
        assert!(locate("", &base()).is_none());
        assert!(locate("<html><body>nothing here</body></html>", &base()).is_none());
    }
}
