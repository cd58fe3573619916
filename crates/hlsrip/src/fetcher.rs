use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use reqwest::Client;
use tracing::{debug, warn};

use crate::config::FetcherConfig;
use crate::error::RipError;
use crate::rendition::{Segment, SegmentSet, TrackKind};

/// Called with the segment index each time a download settles.
pub type ProgressFn = dyn Fn(usize) + Send + Sync;

/// Source of raw segment bytes. The engine downloads over HTTP; tests
/// substitute in-memory sources.
#[async_trait]
pub trait SegmentSource: Send + Sync {
    async fn fetch_segment(&self, segment: &Segment) -> Result<Bytes, RipError>;
}

/// Downloads segment bodies over HTTP, streaming the response into memory.
pub struct HttpSegmentSource {
    client: Client,
    timeout: Duration,
}

impl HttpSegmentSource {
    pub fn new(client: Client, config: &FetcherConfig) -> Self {
        Self {
            client,
            timeout: config.segment_timeout,
        }
    }
}

#[async_trait]
impl SegmentSource for HttpSegmentSource {
    async fn fetch_segment(&self, segment: &Segment) -> Result<Bytes, RipError> {
        let response = self
            .client
            .get(segment.url.clone())
            .timeout(self.timeout)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(RipError::Status {
                status,
                url: segment.url.clone(),
            });
        }

        let mut stream = response.bytes_stream();
        let mut buf = BytesMut::new();
        while let Some(chunk) = stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        debug!(index = segment.index, bytes = buf.len(), "segment downloaded");
        Ok(buf.freeze())
    }
}

/// The outcome of downloading one segment set. `chunks` is ordered by
/// segment index regardless of arrival order; `failed` lists the indices
/// that produced no bytes.
#[derive(Debug)]
pub struct TrackDownload {
    pub kind: TrackKind,
    pub chunks: Vec<(usize, Bytes)>,
    pub failed: Vec<usize>,
}

impl TrackDownload {
    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn total_bytes(&self) -> u64 {
        self.chunks.iter().map(|(_, chunk)| chunk.len() as u64).sum()
    }
}

/// Downloads the segments of a set with a bounded number of requests in
/// flight, then hands the bodies back in index order.
pub struct SegmentFetcher {
    source: Arc<dyn SegmentSource>,
    concurrency: usize,
}

impl SegmentFetcher {
    pub fn new(source: Arc<dyn SegmentSource>, config: &FetcherConfig) -> Self {
        Self {
            source,
            // a cap of zero would stall the feed loop forever
            concurrency: config.download_concurrency.max(1),
        }
    }

    /// Fetches every segment of the set. A failed segment is recorded and
    /// never aborts the rest of the set; completion order does not leak
    /// into the result, which is keyed and sorted by declared index.
    pub async fn fetch(&self, set: &SegmentSet, progress: Option<&ProgressFn>) -> TrackDownload {
        let mut pending = set.segments.iter();
        let mut in_flight = FuturesUnordered::new();
        let mut settled: BTreeMap<usize, Result<Bytes, RipError>> = BTreeMap::new();

        loop {
            while in_flight.len() < self.concurrency {
                let Some(segment) = pending.next() else {
                    break;
                };
                let source = Arc::clone(&self.source);
                in_flight.push(async move { (segment.index, source.fetch_segment(segment).await) });
            }
            let Some((index, outcome)) = in_flight.next().await else {
                break;
            };
            if let Some(report) = progress {
                report(index);
            }
            settled.insert(index, outcome);
        }

        let mut chunks = Vec::with_capacity(settled.len());
        let mut failed = Vec::new();
        for (index, outcome) in settled {
            match outcome {
                Ok(bytes) => chunks.push((index, bytes)),
                Err(e) => {
                    warn!(kind = %set.kind, index, error = %e, "segment download failed");
                    failed.push(index);
                }
            }
        }

        debug!(
            kind = %set.kind,
            downloaded = chunks.len(),
            failed = failed.len(),
            "segment set fetch finished"
        );
        TrackDownload {
            kind: set.kind,
            chunks,
            failed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::sleep;
    use url::Url;

    fn make_set(count: usize) -> SegmentSet {
        let segments = (0..count)
            .map(|index| {
                let url = Url::parse(&format!("https://cdn.example.com/seg{index}.ts")).unwrap();
                Segment::new(TrackKind::Video, index, url)
            })
            .collect();
        SegmentSet {
            kind: TrackKind::Video,
            segments,
        }
    }

    fn config(concurrency: usize) -> FetcherConfig {
        FetcherConfig {
            download_concurrency: concurrency,
            ..FetcherConfig::default()
        }
    }

    /// Finishes later segments sooner, so arrival order is the reverse of
    /// declaration order.
    struct ReversedLatencySource {
        count: usize,
    }

    #[async_trait]
    impl SegmentSource for ReversedLatencySource {
        async fn fetch_segment(&self, segment: &Segment) -> Result<Bytes, RipError> {
            let delay = (self.count - segment.index) as u64 * 10;
            sleep(Duration::from_millis(delay)).await;
            Ok(Bytes::from(vec![segment.index as u8]))
        }
    }

    struct FailingSource {
        fail_index: usize,
    }

    #[async_trait]
    impl SegmentSource for FailingSource {
        async fn fetch_segment(&self, segment: &Segment) -> Result<Bytes, RipError> {
            if segment.index == self.fail_index {
                return Err(RipError::Io(std::io::Error::other("connection reset")));
            }
            Ok(Bytes::from(vec![segment.index as u8]))
        }
    }

    struct TrackingSource {
        in_flight: AtomicUsize,
        peak: AtomicUsize,
    }

    #[async_trait]
    impl SegmentSource for TrackingSource {
        async fn fetch_segment(&self, segment: &Segment) -> Result<Bytes, RipError> {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak.fetch_max(now, Ordering::SeqCst);
            sleep(Duration::from_millis(20)).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            Ok(Bytes::from(vec![segment.index as u8]))
        }
    }

    #[tokio::test]
    async fn chunks_come_back_in_index_order_regardless_of_arrival() {
        let set = make_set(5);
        let source = Arc::new(ReversedLatencySource { count: 5 });
        let fetcher = SegmentFetcher::new(source, &config(5));

        let download = fetcher.fetch(&set, None).await;

        assert!(download.failed.is_empty());
        let indices: Vec<usize> = download.chunks.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 2, 3, 4]);
        for (index, chunk) in &download.chunks {
            assert_eq!(chunk.as_ref(), &[*index as u8]);
        }
    }

    #[tokio::test]
    async fn a_failed_segment_does_not_abort_the_set() {
        let set = make_set(4);
        let source = Arc::new(FailingSource { fail_index: 2 });
        let fetcher = SegmentFetcher::new(source, &config(2));

        let download = fetcher.fetch(&set, None).await;

        assert_eq!(download.failed, vec![2]);
        let indices: Vec<usize> = download.chunks.iter().map(|(i, _)| *i).collect();
        assert_eq!(indices, vec![0, 1, 3]);
    }

    #[tokio::test]
    async fn in_flight_requests_never_exceed_the_cap() {
        let set = make_set(10);
        let source = Arc::new(TrackingSource {
            in_flight: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
        });
        let fetcher = SegmentFetcher::new(Arc::clone(&source) as Arc<dyn SegmentSource>, &config(2));

        let download = fetcher.fetch(&set, None).await;

        assert_eq!(download.chunks.len(), 10);
        assert!(source.peak.load(Ordering::SeqCst) <= 2);
    }

    #[tokio::test]
    async fn progress_is_reported_once_per_segment() {
        let set = make_set(3);
        let source = Arc::new(ReversedLatencySource { count: 3 });
        let fetcher = SegmentFetcher::new(source, &config(3));

        let reported = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&reported);
        let on_progress = move |_: usize| {
            counter.fetch_add(1, Ordering::SeqCst);
        };
        fetcher.fetch(&set, Some(&on_progress)).await;

        assert_eq!(reported.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn empty_set_yields_an_empty_download() {
        let set = make_set(0);
        let source = Arc::new(ReversedLatencySource { count: 0 });
        let fetcher = SegmentFetcher::new(source, &config(4));

        let download = fetcher.fetch(&set, None).await;

        assert!(download.is_empty());
        assert!(download.failed.is_empty());
        assert_eq!(download.total_bytes(), 0);
    }
}
