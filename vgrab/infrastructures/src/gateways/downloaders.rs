use ::async_trait::async_trait;
use ::domain::VideoMetadata;
use ::domain::VideoUrl;
use ::futures::prelude::*;
use ::use_cases::gateways::VideoDownloader;
use ::use_cases::models::descriptors::ResolvedVideo;
use ::use_cases::models::events::DiagnosticEvent;
use ::use_cases::models::events::DiagnosticLevel;
use ::use_cases::models::events::VideoDownloadCompletedEvent;
use ::use_cases::models::events::VideoDownloadEvent;
use ::use_cases::models::events::VideoDownloadFailedEvent;
use ::use_cases::models::events::VideoDownloadProgressUpdatedEvent;
use ::use_cases::models::events::VideoDownloadStartedEvent;

use crate::utils::aliases::BoxedFuture;
use crate::utils::aliases::BoxedStream;
use crate::utils::aliases::Fallible;
use crate::utils::aliases::MaybeOwnedPath;
use crate::utils::aliases::MaybeOwnedString;
use crate::utils::extensions::OptionExt;

#[derive(::bon::Builder)]
#[builder(on(_, into))]
pub struct YtdlpDownloader {
    directory: MaybeOwnedPath,
    format: MaybeOwnedString,
}

impl YtdlpDownloader {
    /// Startup dependency check. A failure here is the only fatal path the
    /// binary has, so it runs before anything is asked of the user.
    pub async fn probe() -> Fallible<()> {
        let (_, _, status) = TokioCommandExecutor::execute("yt-dlp", ["--version"])?;
        let status = status.await?;

        ::anyhow::ensure!(status.success(), "`yt-dlp --version` exited with {}", status);

        Ok(())
    }
}

#[async_trait]
impl VideoDownloader for YtdlpDownloader {
    async fn download(
        self: ::std::sync::Arc<Self>, url: VideoUrl,
    ) -> Fallible<(BoxedStream<VideoDownloadEvent>, BoxedStream<DiagnosticEvent>)> {
        let (video_download_events_tx, video_download_events_rx) = ::tokio::sync::mpsc::unbounded_channel();
        let (diagnostic_events_tx, diagnostic_events_rx) = ::tokio::sync::mpsc::unbounded_channel();

        #[rustfmt::skip]
        let (stdout, stderr, status) = TokioCommandExecutor::execute("yt-dlp", [
            &*url,
            "--quiet",
            "--color", "no_color",
            "--paths", self.directory.to_str().ok()?,
            "--format", &*self.format,
            "--ignore-errors",
            "--output", "%(title)s.%(ext)s",
            "--newline",
            "--progress",
            "--print", "before_dl:[video-started]%(webpage_url)s",
            "--progress-template", "[video-downloading]%(progress.status)s;%(progress.downloaded_bytes)s;%(progress.total_bytes)s",
            "--print", "after_move:[video-completed]%(title)s;%(ext)s;%(filepath)s",
        ])?;

        ::tracing::debug!(%url, "spawned yt-dlp");

        ::tokio::spawn(async move {
            let last_error = ::tokio::sync::Mutex::new(None::<MaybeOwnedString>);

            ::tokio::try_join!(
                async {
                    stdout
                        .filter_map(|line| async { VideoDownloadEvent::from_line(line) })
                        .map(Ok)
                        .try_for_each(|event| async { video_download_events_tx.send(event) })
                        .await
                        .map_err(::anyhow::Error::from)
                },
                async {
                    stderr
                        .filter_map(|line| async { DiagnosticEvent::from_line(line) })
                        .map(Ok)
                        .try_for_each(|event| async {
                            if event.level == DiagnosticLevel::Error {
                                *last_error.lock().await = Some(event.message.clone());
                            }

                            diagnostic_events_tx.send(event)
                        })
                        .await
                        .map_err(::anyhow::Error::from)
                },
            )?;

            let status = status.await?;

            if !status.success() {
                ::tracing::warn!(%status, "yt-dlp failed");

                let message = last_error
                    .lock()
                    .await
                    .take()
                    .unwrap_or_else(|| format!("yt-dlp exited with {}", status).into());

                let event = VideoDownloadFailedEvent::builder().message(message).build();
                video_download_events_tx.send(VideoDownloadEvent::Failed(event))?;
            }

            Ok::<_, ::anyhow::Error>(())
        });

        Ok((
            ::std::boxed::Box::pin(::tokio_stream::wrappers::UnboundedReceiverStream::new(video_download_events_rx)),
            ::std::boxed::Box::pin(::tokio_stream::wrappers::UnboundedReceiverStream::new(diagnostic_events_rx)),
        ))
    }
}

trait CommandExecutor {
    fn execute<Program, Args>(
        program: Program, args: Args,
    ) -> Fallible<(
        BoxedStream<MaybeOwnedString>,
        BoxedStream<MaybeOwnedString>,
        BoxedFuture<Fallible<::std::process::ExitStatus>>,
    )>
    where
        Program: AsRef<::std::ffi::OsStr>,
        Args: IntoIterator,
        Args::Item: AsRef<::std::ffi::OsStr>;
}

struct TokioCommandExecutor;

impl CommandExecutor for TokioCommandExecutor {
    fn execute<Program, Args>(
        program: Program, args: Args,
    ) -> Fallible<(
        BoxedStream<MaybeOwnedString>,
        BoxedStream<MaybeOwnedString>,
        BoxedFuture<Fallible<::std::process::ExitStatus>>,
    )>
    where
        Program: AsRef<::std::ffi::OsStr>,
        Args: IntoIterator,
        Args::Item: AsRef<::std::ffi::OsStr>,
    {
        use ::tokio::io::AsyncBufReadExt as _;

        let (stdout_tx, stdout_rx) = ::tokio::sync::mpsc::unbounded_channel();
        let (stderr_tx, stderr_rx) = ::tokio::sync::mpsc::unbounded_channel();

        let mut process = ::tokio::process::Command::new(program)
            .args(args)
            .stdin(::std::process::Stdio::null())
            .stdout(::std::process::Stdio::piped())
            .stderr(::std::process::Stdio::piped())
            .spawn()?;

        let stdout = process.stdout.take().ok()?;
        let stderr = process.stderr.take().ok()?;

        ::tokio::spawn(async move {
            let lines = ::tokio::io::BufReader::new(stdout).lines();

            ::tokio_stream::wrappers::LinesStream::new(lines)
                .filter_map(|line| async move { line.ok() })
                .map(|line| line.to_owned().into())
                .map(Ok)
                .try_for_each(|line| async { stdout_tx.send(line) })
                .await
        });

        ::tokio::spawn(async move {
            let lines = ::tokio::io::BufReader::new(stderr).lines();

            ::tokio_stream::wrappers::LinesStream::new(lines)
                .filter_map(|line| async move { line.ok() })
                .map(|line| line.to_owned().into())
                .map(Ok)
                .try_for_each(|line| async { stderr_tx.send(line) })
                .await
        });

        Ok((
            ::std::boxed::Box::pin(::tokio_stream::wrappers::UnboundedReceiverStream::new(stdout_rx)),
            ::std::boxed::Box::pin(::tokio_stream::wrappers::UnboundedReceiverStream::new(stderr_rx)),
            ::std::boxed::Box::pin(async move { Ok(process.wait().await?) }),
        ))
    }
}

trait FromYtdlpLine: ::core::marker::Send + ::core::marker::Sync {
    fn from_line<Line>(line: Line) -> Option<Self>
    where
        Line: AsRef<str>,
        Self: Sized;
}

impl FromYtdlpLine for VideoDownloadEvent {
    fn from_line<Line>(line: Line) -> Option<Self>
    where
        Line: AsRef<str>,
        Self: Sized,
    {
        let line = line.as_ref();

        VideoDownloadProgressUpdatedEvent::from_line(line)
            .map(Self::ProgressUpdated)
            .or(VideoDownloadStartedEvent::from_line(line).map(Self::Started))
            .or(VideoDownloadCompletedEvent::from_line(line).map(Self::Completed))
    }
}

impl FromYtdlpLine for VideoDownloadStartedEvent {
    fn from_line<Line>(line: Line) -> Option<Self>
    where
        Line: AsRef<str>,
        Self: Sized,
    {
        let attrs = line.as_ref().strip_prefix("[video-started]")?.split(';');
        let [url] = YtdlpAttributes::parse(attrs)?.into();

        Some(Self::builder().url(url.singlevalued()?).build())
    }
}

impl FromYtdlpLine for VideoDownloadProgressUpdatedEvent {
    fn from_line<Line>(line: Line) -> Option<Self>
    where
        Line: AsRef<str>,
        Self: Sized,
    {
        let attrs = line.as_ref().strip_prefix("[video-downloading]")?.split(';');
        let [status, downloaded_bytes, total_bytes] = YtdlpAttributes::parse(attrs)?.into();

        Some(
            Self::builder()
                .status(status.singlevalued()?)
                .maybe_downloaded_bytes(downloaded_bytes.singlevalued().and_then(|bytes| bytes.parse::<f64>().ok()).map(|bytes| bytes.floor() as u64))
                .maybe_total_bytes(total_bytes.singlevalued().and_then(|bytes| bytes.parse::<f64>().ok()).map(|bytes| bytes.floor() as u64))
                .build(),
        )
    }
}

impl FromYtdlpLine for VideoDownloadCompletedEvent {
    fn from_line<Line>(line: Line) -> Option<Self>
    where
        Line: AsRef<str>,
        Self: Sized,
    {
        // `splitn` keeps the filepath intact even when it contains `;`.
        let attrs = line.as_ref().strip_prefix("[video-completed]")?.splitn(3, ';');
        let [title, ext, path] = YtdlpAttributes::parse(attrs)?.into();

        Some(
            Self::builder()
                .video(
                    ResolvedVideo::builder()
                        .metadata(
                            VideoMetadata::builder()
                                .maybe_title(title.singlevalued())
                                .maybe_ext(ext.singlevalued())
                                .build(),
                        )
                        .maybe_path(path.singlevalued().map(|path| ::std::path::PathBuf::from(path.into_owned())))
                        .build(),
                )
                .build(),
        )
    }
}

impl FromYtdlpLine for DiagnosticEvent {
    fn from_line<Line>(line: Line) -> Option<Self>
    where
        Line: AsRef<str>,
        Self: Sized,
    {
        let attrs = line.as_ref().splitn(2, ':');
        let [level, message] = YtdlpAttributes::parse(attrs)?.into();

        Some(
            Self::builder()
                .level(match level.singlevalued()?.as_ref() {
                    "WARNING" => DiagnosticLevel::Warning,
                    "ERROR" => DiagnosticLevel::Error,
                    _ => return None,
                })
                .message(message.singlevalued()?)
                .build(),
        )
    }
}

#[derive(Clone)]
struct YtdlpAttribute<'a>(&'a str);

impl<'a> YtdlpAttribute<'a> {
    fn singlevalued(self) -> Option<MaybeOwnedString> {
        match self.0.trim() {
            "NA" => None,
            attr => Some(attr.to_owned().into()),
        }
    }
}

struct YtdlpAttributes<'a, const N: usize>([YtdlpAttribute<'a>; N]);

impl<'a, const N: usize> From<YtdlpAttributes<'a, N>> for [YtdlpAttribute<'a>; N] {
    fn from(outer: YtdlpAttributes<'a, N>) -> Self {
        outer.0
    }
}

impl<'a, const N: usize> YtdlpAttributes<'a, N> {
    fn parse<Attrs>(attrs: Attrs) -> Option<Self>
    where
        Attrs: Iterator<Item = &'a str>,
    {
        let attrs = attrs
            .map(YtdlpAttribute)
            .collect::<Vec<_>>()
            .try_into()
            .ok()?;

        Some(Self(attrs))
    }
}
