use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use hlsrip_engine::{
    DownloadConfig, FetcherConfig, HttpSegmentSource, SegmentFetcher, SegmentSource, TrackDownload,
    TrackKind, assembler, base_of, create_client, fetch_manifest, fetch_page, list_renditions,
    mux, resolve, segment_set,
};
use indicatif::{MultiProgress, ProgressBar};
use manifest_locator::locate;
use tracing::{info, warn};
use url::Url;

use crate::cli::CliArgs;
use crate::error::AppError;
use crate::progress::ProgressManager;
use crate::prompt;

pub async fn run(args: CliArgs) -> Result<(), AppError> {
    if !mux::probe().await {
        return Err(AppError::Initialization(
            "ffmpeg was not found on PATH; install it and retry".to_owned(),
        ));
    }

    let input = match args.url {
        Some(url) => url,
        None => prompt::read_line("Enter the URL of the page with the stream: ").await?,
    };
    let page_url = Url::parse(&input)
        .map_err(|e| AppError::InvalidInput(format!("invalid URL {input}: {e}")))?;

    let download_config = DownloadConfig {
        timeout: Duration::from_secs(args.timeout),
        connect_timeout: Duration::from_secs(args.connect_timeout),
        ..DownloadConfig::default()
    };
    let fetcher_config = FetcherConfig {
        download_concurrency: args.concurrency,
        segment_timeout: Duration::from_secs(args.timeout),
    };
    let client = create_client(&download_config)?;

    let Some(page) = fetch_page(&client, &page_url).await? else {
        return Err(AppError::InvalidInput(format!(
            "no page content at {page_url}"
        )));
    };
    let Some(candidate) = locate(&page, &page_url) else {
        return Err(AppError::InvalidInput(format!(
            "no master manifest reference found in {page_url}"
        )));
    };
    info!(url = %candidate.url, provenance = %candidate.provenance, "master manifest located");

    let manifest_text = fetch_manifest(&client, &candidate.url).await?;
    let master_base = base_of(&candidate.url)?;
    let lists = list_renditions(&manifest_text)?;
    if lists.video.is_empty() {
        return Err(AppError::InvalidInput(
            "master playlist offers no video renditions".to_owned(),
        ));
    }
    if lists.audio.is_empty() {
        return Err(AppError::InvalidInput(
            "master playlist offers no audio renditions".to_owned(),
        ));
    }

    let video = prompt::choose_rendition(&lists.video, TrackKind::Video).await?;
    let audio = prompt::choose_rendition(&lists.audio, TrackKind::Audio).await?;
    info!(video = %video.label, audio = %audio.label, "renditions selected");

    let video_url = resolve(video, &master_base)?;
    let audio_url = resolve(audio, &master_base)?;
    let video_text = fetch_manifest(&client, &video_url).await?;
    let audio_text = fetch_manifest(&client, &audio_url).await?;
    let video_set = segment_set(&video_text, &video_url, TrackKind::Video)?;
    let audio_set = segment_set(&audio_text, &audio_url, TrackKind::Audio)?;
    info!(
        video_segments = video_set.segments.len(),
        audio_segments = audio_set.segments.len(),
        "segment sets built"
    );

    let source: Arc<dyn SegmentSource> =
        Arc::new(HttpSegmentSource::new(client.clone(), &fetcher_config));
    let fetcher = SegmentFetcher::new(source, &fetcher_config);

    let multi = MultiProgress::new();
    let progress = if args.no_progress {
        ProgressManager::new_disabled(multi)
    } else {
        ProgressManager::new(multi)
    };
    let video_bar = progress.track_bar(TrackKind::Video, video_set.segments.len());
    let audio_bar = progress.track_bar(TrackKind::Audio, audio_set.segments.len());
    let video_inc = bar_tick(&video_bar);
    let audio_inc = bar_tick(&audio_bar);

    let (video_download, audio_download) = tokio::join!(
        fetcher.fetch(&video_set, Some(&video_inc)),
        fetcher.fetch(&audio_set, Some(&audio_inc)),
    );
    video_bar.finish_with_message("Video segments downloaded");
    audio_bar.finish_with_message("Audio segments downloaded");

    report_failures(&video_download);
    report_failures(&audio_download);
    if video_download.is_empty() {
        return Err(AppError::InvalidInput(
            "every video segment failed to download".to_owned(),
        ));
    }
    if audio_download.is_empty() {
        return Err(AppError::InvalidInput(
            "every audio segment failed to download".to_owned(),
        ));
    }

    let workdir = tempfile::tempdir()?;
    let video_path = workdir.path().join("video_combined.ts");
    let audio_path = workdir.path().join("audio_combined.ts");
    let video_bytes = assembler::assemble(&video_download, &video_path).await?;
    let audio_bytes = assembler::assemble(&audio_download, &audio_path).await?;
    info!(video_bytes, audio_bytes, "tracks assembled");

    let output = args.output.unwrap_or_else(default_output_name);
    mux::mux(&video_path, &audio_path, &output).await?;
    info!(output = %output.display(), "done");
    Ok(())
}

fn bar_tick(bar: &ProgressBar) -> impl Fn(usize) + Send + Sync + use<> {
    let bar = bar.clone();
    move |_| {
        bar.inc(1);
    }
}

fn report_failures(download: &TrackDownload) {
    if download.failed.is_empty() {
        return;
    }
    warn!(
        kind = %download.kind,
        failed = ?download.failed,
        "some segments failed to download; the output will have gaps"
    );
}

fn default_output_name() -> PathBuf {
    PathBuf::from(format!(
        "final-output-{}.mp4",
        Local::now().format("%Y-%m-%d-%H-%M-%S")
    ))
}
