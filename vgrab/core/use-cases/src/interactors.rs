use ::async_trait::async_trait;
use ::domain::VideoUrl;
use ::futures::prelude::*;

use crate::boundaries::Accept;
use crate::boundaries::DownloadVideoOutputBoundary;
use crate::boundaries::DownloadVideoRequestModel;
use crate::boundaries::DownloadVideoResponseModel;
use crate::gateways::VideoDownloader;
use crate::models::descriptors::DownloadOutcome;
use crate::models::descriptors::ResolvedVideo;
use crate::models::events::DiagnosticEvent;
use crate::models::events::VideoDownloadEvent;
use crate::utils::aliases::BoxedStream;
use crate::utils::aliases::Fallible;
use crate::utils::aliases::MaybeOwnedPath;
use crate::utils::aliases::MaybeOwnedString;

#[derive(::bon::Builder)]
#[builder(on(_, into))]
pub struct DownloadVideoInteractor {
    pub output_boundary: ::std::sync::Arc<dyn DownloadVideoOutputBoundary>,
    pub downloader: ::std::sync::Arc<dyn VideoDownloader>,

    pub directory: MaybeOwnedPath,
}

#[async_trait]
impl Accept<DownloadVideoRequestModel> for DownloadVideoInteractor {
    async fn accept(self: ::std::sync::Arc<Self>, request: DownloadVideoRequestModel) -> Fallible<()> {
        let url = VideoUrl::new(request.url.trim().to_owned());

        if url.is_empty() {
            return ::std::sync::Arc::clone(&self.output_boundary)
                .present(&DownloadVideoResponseModel::NoUrlProvided)
                .await;
        }

        // The single error boundary around the delegated call: a collaborator
        // that cannot even start is reported the same way as one that fails
        // mid-run, and neither outcome escapes as a process failure.
        let (video_download_events, diagnostic_events) =
            match ::std::sync::Arc::clone(&self.downloader).download(url.clone()).await {
                Ok(streams) => streams,
                Err(err) => {
                    ::tracing::warn!(%url, %err, "downloader refused to start");

                    return ::std::sync::Arc::clone(&self.output_boundary)
                        .present(&DownloadVideoResponseModel::Failed { message: err.to_string().into() })
                        .await;
                },
            };

        ::std::sync::Arc::clone(&self.output_boundary).activate().await?;

        let ((videos, failure), _) = ::tokio::try_join!(
            ::std::sync::Arc::clone(&self).collect(video_download_events),
            ::std::sync::Arc::clone(&self).forward(diagnostic_events),
        )?;

        ::std::sync::Arc::clone(&self.output_boundary).deactivate().await?;

        // Per-item errors on multi-item input stay suppressed: anything that
        // completed is still a success, and the stderr diagnostics have
        // already surfaced live. The failure report is reserved for runs
        // where nothing came through.
        let response = match DownloadOutcome::from_videos(videos) {
            Some(outcome) => DownloadVideoResponseModel::Completed {
                outcome,
                directory: self.directory.clone(),
            },
            None => match failure {
                Some(message) => DownloadVideoResponseModel::Failed { message },
                None => DownloadVideoResponseModel::DetailsUnavailable,
            },
        };

        ::std::sync::Arc::clone(&self.output_boundary).present(&response).await
    }
}

impl DownloadVideoInteractor {
    async fn collect(
        self: ::std::sync::Arc<Self>, events: BoxedStream<VideoDownloadEvent>,
    ) -> Fallible<(Vec<ResolvedVideo>, Option<MaybeOwnedString>)> {
        ::futures::pin_mut!(events);

        let mut videos = Vec::new();
        let mut failure = None;

        while let Some(event) = events.next().await {
            ::std::sync::Arc::clone(&self.output_boundary).update(&event).await?;

            match event {
                VideoDownloadEvent::Completed(event) => videos.push(event.video),
                VideoDownloadEvent::Failed(event) => failure = Some(event.message),
                _ => {},
            }
        }

        ::tracing::info!(completed = videos.len(), failed = failure.is_some(), "event stream drained");

        Ok((videos, failure))
    }

    async fn forward(self: ::std::sync::Arc<Self>, events: BoxedStream<DiagnosticEvent>) -> Fallible<()> {
        ::futures::pin_mut!(events);

        while let Some(event) = events.next().await {
            ::std::sync::Arc::clone(&self.output_boundary).diagnose(&event).await?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ::domain::VideoMetadata;

    use super::*;
    use crate::models::events::VideoDownloadCompletedEvent;
    use crate::models::events::VideoDownloadFailedEvent;
    use crate::models::events::VideoDownloadStartedEvent;

    enum Script {
        Events(Vec<VideoDownloadEvent>),
        Unavailable(&'static str),
    }

    struct StubDownloader {
        calls: ::std::sync::Mutex<Vec<VideoUrl>>,
        script: ::std::sync::Mutex<Option<Script>>,
    }

    impl StubDownloader {
        fn scripted(script: Script) -> ::std::sync::Arc<Self> {
            ::std::sync::Arc::new(Self {
                calls: ::std::sync::Mutex::new(Vec::new()),
                script: ::std::sync::Mutex::new(Some(script)),
            })
        }

        fn calls(&self) -> Vec<VideoUrl> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl VideoDownloader for StubDownloader {
        async fn download(
            self: ::std::sync::Arc<Self>, url: VideoUrl,
        ) -> Fallible<(BoxedStream<VideoDownloadEvent>, BoxedStream<DiagnosticEvent>)> {
            self.calls.lock().unwrap().push(url);

            match self.script.lock().unwrap().take().expect("stub invoked more than once") {
                Script::Unavailable(message) => Err(::anyhow::anyhow!(message)),
                Script::Events(events) => Ok((
                    ::std::boxed::Box::pin(::futures::stream::iter(events)),
                    ::std::boxed::Box::pin(::futures::stream::empty()),
                )),
            }
        }
    }

    #[derive(Default)]
    struct RecordingBoundary {
        presented: ::std::sync::Mutex<Vec<String>>,
    }

    impl RecordingBoundary {
        fn presented(&self) -> Vec<String> {
            self.presented.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl DownloadVideoOutputBoundary for RecordingBoundary {
        async fn activate(self: ::std::sync::Arc<Self>) -> Fallible<()> {
            Ok(())
        }

        async fn deactivate(self: ::std::sync::Arc<Self>) -> Fallible<()> {
            Ok(())
        }

        async fn update(self: ::std::sync::Arc<Self>, _: &VideoDownloadEvent) -> Fallible<()> {
            Ok(())
        }

        async fn diagnose(self: ::std::sync::Arc<Self>, _: &DiagnosticEvent) -> Fallible<()> {
            Ok(())
        }

        async fn present(self: ::std::sync::Arc<Self>, response: &DownloadVideoResponseModel) -> Fallible<()> {
            let line = match response {
                DownloadVideoResponseModel::Completed { outcome, directory } => {
                    let video = outcome.first();

                    format!(
                        "completed: {}.{} in {}",
                        video.metadata.title.as_deref().unwrap_or("Video"),
                        video.metadata.ext.as_deref().unwrap_or("mp4"),
                        directory.display(),
                    )
                },
                DownloadVideoResponseModel::DetailsUnavailable => "details-unavailable".to_owned(),
                DownloadVideoResponseModel::Failed { message } => format!("failed: {}", message),
                DownloadVideoResponseModel::NoUrlProvided => "no-url".to_owned(),
            };

            self.presented.lock().unwrap().push(line);

            Ok(())
        }
    }

    fn interactor(
        downloader: &::std::sync::Arc<StubDownloader>, boundary: &::std::sync::Arc<RecordingBoundary>,
    ) -> ::std::sync::Arc<DownloadVideoInteractor> {
        ::std::sync::Arc::new(
            DownloadVideoInteractor::builder()
                .output_boundary(
                    ::std::sync::Arc::clone(boundary) as ::std::sync::Arc<dyn DownloadVideoOutputBoundary>
                )
                .downloader(::std::sync::Arc::clone(downloader) as ::std::sync::Arc<dyn VideoDownloader>)
                .directory(::std::path::PathBuf::from("/tmp/media"))
                .build(),
        )
    }

    fn completed(title: &'static str, ext: &'static str) -> VideoDownloadEvent {
        VideoDownloadEvent::Completed(
            VideoDownloadCompletedEvent::builder()
                .video(
                    ResolvedVideo::builder()
                        .metadata(VideoMetadata::builder().title(title).ext(ext).build())
                        .build(),
                )
                .build(),
        )
    }

    #[tokio::test]
    async fn empty_input_skips_the_downloader() {
        let downloader = StubDownloader::scripted(Script::Events(Vec::new()));
        let boundary = ::std::sync::Arc::new(RecordingBoundary::default());

        let request = DownloadVideoRequestModel::builder().url("   \t  ").build();
        interactor(&downloader, &boundary).accept(request).await.unwrap();

        assert!(downloader.calls().is_empty());
        assert_eq!(boundary.presented(), vec!["no-url".to_owned()]);
    }

    #[tokio::test]
    async fn url_is_trimmed_and_downloaded_exactly_once() {
        let downloader = StubDownloader::scripted(Script::Events(vec![completed("Sample", "mp4")]));
        let boundary = ::std::sync::Arc::new(RecordingBoundary::default());

        let request = DownloadVideoRequestModel::builder().url("  https://example.com/v/1  ").build();
        interactor(&downloader, &boundary).accept(request).await.unwrap();

        assert_eq!(downloader.calls(), vec![VideoUrl::from("https://example.com/v/1")]);
    }

    #[tokio::test]
    async fn single_item_reports_its_filename_and_directory() {
        let downloader = StubDownloader::scripted(Script::Events(vec![
            VideoDownloadEvent::Started(VideoDownloadStartedEvent::builder().url("https://example.com/v/1").build()),
            completed("Sample", "mp4"),
        ]));
        let boundary = ::std::sync::Arc::new(RecordingBoundary::default());

        let request = DownloadVideoRequestModel::builder().url("https://example.com/v/1").build();
        interactor(&downloader, &boundary).accept(request).await.unwrap();

        assert_eq!(boundary.presented(), vec!["completed: Sample.mp4 in /tmp/media".to_owned()]);
    }

    #[tokio::test]
    async fn multi_item_reports_only_the_first_entry() {
        let downloader = StubDownloader::scripted(Script::Events(vec![
            completed("Clip1", "mov"),
            completed("Clip2", "mp4"),
            completed("Clip3", "mp4"),
        ]));
        let boundary = ::std::sync::Arc::new(RecordingBoundary::default());

        let request = DownloadVideoRequestModel::builder().url("https://example.com/list/1").build();
        interactor(&downloader, &boundary).accept(request).await.unwrap();

        assert_eq!(boundary.presented(), vec!["completed: Clip1.mov in /tmp/media".to_owned()]);
    }

    #[tokio::test]
    async fn partially_failed_batch_still_reports_its_completed_entries() {
        let downloader = StubDownloader::scripted(Script::Events(vec![
            completed("Clip1", "mov"),
            VideoDownloadEvent::Failed(
                VideoDownloadFailedEvent::builder().message("ERROR: item 2 unavailable").build(),
            ),
            completed("Clip3", "mp4"),
        ]));
        let boundary = ::std::sync::Arc::new(RecordingBoundary::default());

        let request = DownloadVideoRequestModel::builder().url("https://example.com/list/1").build();
        interactor(&downloader, &boundary).accept(request).await.unwrap();

        assert_eq!(boundary.presented(), vec!["completed: Clip1.mov in /tmp/media".to_owned()]);
    }

    #[tokio::test]
    async fn unavailable_collaborator_is_caught_not_propagated() {
        let downloader = StubDownloader::scripted(Script::Unavailable("network error"));
        let boundary = ::std::sync::Arc::new(RecordingBoundary::default());

        let request = DownloadVideoRequestModel::builder().url("https://example.com/v/1").build();
        let result = interactor(&downloader, &boundary).accept(request).await;

        assert!(result.is_ok());
        assert_eq!(boundary.presented(), vec!["failed: network error".to_owned()]);
    }

    #[tokio::test]
    async fn terminal_failure_event_is_caught_not_propagated() {
        let downloader = StubDownloader::scripted(Script::Events(vec![VideoDownloadEvent::Failed(
            VideoDownloadFailedEvent::builder().message("ERROR: network error").build(),
        )]));
        let boundary = ::std::sync::Arc::new(RecordingBoundary::default());

        let request = DownloadVideoRequestModel::builder().url("https://example.com/v/1").build();
        let result = interactor(&downloader, &boundary).accept(request).await;

        assert!(result.is_ok());
        assert_eq!(boundary.presented(), vec!["failed: ERROR: network error".to_owned()]);
    }

    #[tokio::test]
    async fn empty_completion_set_is_a_warning_not_an_error() {
        let downloader = StubDownloader::scripted(Script::Events(Vec::new()));
        let boundary = ::std::sync::Arc::new(RecordingBoundary::default());

        let request = DownloadVideoRequestModel::builder().url("https://example.com/v/1").build();
        interactor(&downloader, &boundary).accept(request).await.unwrap();

        assert_eq!(boundary.presented(), vec!["details-unavailable".to_owned()]);
    }
}
