use ::async_trait::async_trait;
use ::use_cases::boundaries::DownloadVideoOutputBoundary;
use ::use_cases::boundaries::DownloadVideoResponseModel;
use ::use_cases::models::events::DiagnosticEvent;
use ::use_cases::models::events::DiagnosticLevel;
use ::use_cases::models::events::VideoDownloadCompletedEvent;
use ::use_cases::models::events::VideoDownloadEvent;
use ::use_cases::models::events::VideoDownloadFailedEvent;
use ::use_cases::models::events::VideoDownloadProgressUpdatedEvent;
use ::use_cases::models::events::VideoDownloadStartedEvent;

use crate::utils::aliases::Fallible;

macro_rules! lazy_progress_style {
    ($template:expr) => {
        ::once_cell::sync::Lazy::new(|| ::indicatif::ProgressStyle::with_template($template).unwrap())
    };
}

pub struct DownloadVideoView {
    progress_bars: ::indicatif::MultiProgress,
    video_progress_bar: ::indicatif::ProgressBar,
}

impl DownloadVideoView {
    pub fn new() -> Fallible<Self> {
        static PROGRESS_BAR_STYLE: ::once_cell::sync::Lazy<::indicatif::ProgressStyle> =
            lazy_progress_style!("{prefix} {bar:50} {msg}");

        let progress_bars = ::indicatif::MultiProgress::new();
        progress_bars.set_draw_target(::indicatif::ProgressDrawTarget::hidden());

        let video_progress_bar =
            progress_bars.add(::indicatif::ProgressBar::no_length().with_style(PROGRESS_BAR_STYLE.clone()));

        video_progress_bar.disable_steady_tick();
        video_progress_bar.set_prefix(format!("{} / {}", FormattedUninitBytes, FormattedUninitBytes));
        video_progress_bar.set_message(format!("{}", FormattedUninitPercentage));

        Ok(Self { progress_bars, video_progress_bar })
    }

    fn update_started(&self, event: &VideoDownloadStartedEvent) {
        use ::colored::Colorize as _;

        let VideoDownloadStartedEvent { url } = event;

        // Plain status lines belong on stdout; the bar itself draws on stderr.
        println!("Attempting to download video from URL: {}", url.white().bold());
    }

    fn update_progress(&self, event: &VideoDownloadProgressUpdatedEvent) {
        let VideoDownloadProgressUpdatedEvent { status, downloaded_bytes, total_bytes } = event;

        if let (Some(downloaded_bytes), Some(total_bytes)) = (downloaded_bytes, total_bytes) {
            let percentage = *downloaded_bytes as f64 / *total_bytes as f64 * 100.0;

            self.video_progress_bar.set_length(*total_bytes);
            self.video_progress_bar.set_position(*downloaded_bytes);
            self.video_progress_bar.set_prefix(format!(
                "{} / {}",
                FormattedBytes(*downloaded_bytes),
                FormattedBytes(*total_bytes)
            ));
            self.video_progress_bar
                .set_message(format!("{}", FormattedPercentage(percentage as u64)));
        }

        // One status line per callback while actively downloading; `finished`
        // records only settle the bar.
        if status.as_ref() == "downloading" {
            println!("{}", status_line(status, *total_bytes));
        }
    }

    fn update_completed(&self, _: &VideoDownloadCompletedEvent) {
        use ::colored::Colorize as _;

        static PROGRESS_BAR_FINISH_STYLE: ::once_cell::sync::Lazy<::indicatif::ProgressStyle> =
            lazy_progress_style!("{prefix} {bar:50.green} {msg}");

        self.video_progress_bar.set_style(PROGRESS_BAR_FINISH_STYLE.clone());
        self.video_progress_bar
            .set_prefix(self.video_progress_bar.prefix().green().to_string());
        self.video_progress_bar
            .set_message(self.video_progress_bar.message().green().to_string());

        self.video_progress_bar.finish();
    }

    fn update_failed(&self, _: &VideoDownloadFailedEvent) {
        use ::colored::Colorize as _;

        static PROGRESS_BAR_ABANDON_STYLE: ::once_cell::sync::Lazy<::indicatif::ProgressStyle> =
            lazy_progress_style!("{prefix} {bar:50.red} {msg}");

        self.video_progress_bar.set_style(PROGRESS_BAR_ABANDON_STYLE.clone());
        self.video_progress_bar
            .set_message(self.video_progress_bar.message().red().to_string());

        self.video_progress_bar.abandon();
    }
}

#[async_trait]
impl DownloadVideoOutputBoundary for DownloadVideoView {
    async fn activate(self: ::std::sync::Arc<Self>) -> Fallible<()> {
        self.progress_bars.set_draw_target(::indicatif::ProgressDrawTarget::stderr());
        self.video_progress_bar.tick();

        Ok(())
    }

    async fn deactivate(self: ::std::sync::Arc<Self>) -> Fallible<()> {
        self.progress_bars.set_draw_target(::indicatif::ProgressDrawTarget::hidden());

        Ok(())
    }

    async fn update(self: ::std::sync::Arc<Self>, event: &VideoDownloadEvent) -> Fallible<()> {
        match event {
            VideoDownloadEvent::Started(event) => self.update_started(event),
            VideoDownloadEvent::ProgressUpdated(event) => self.update_progress(event),
            VideoDownloadEvent::Completed(event) => self.update_completed(event),
            VideoDownloadEvent::Failed(event) => self.update_failed(event),
        }

        Ok(())
    }

    async fn diagnose(self: ::std::sync::Arc<Self>, event: &DiagnosticEvent) -> Fallible<()> {
        use ::colored::Colorize as _;

        static DECOY_PROGRESS_BAR_STYLE: ::once_cell::sync::Lazy<::indicatif::ProgressStyle> =
            lazy_progress_style!("{msg}");

        let DiagnosticEvent { message, level } = event;

        let message = match level {
            DiagnosticLevel::Warning => message.yellow(),
            DiagnosticLevel::Error => message.red(),
        };

        let decoy_progress_bar = self
            .progress_bars
            .add(::indicatif::ProgressBar::no_length().with_style(DECOY_PROGRESS_BAR_STYLE.clone()));

        decoy_progress_bar.finish_with_message(format!("{}", message));

        Ok(())
    }

    async fn present(self: ::std::sync::Arc<Self>, response: &DownloadVideoResponseModel) -> Fallible<()> {
        use ::colored::Colorize as _;

        match response {
            DownloadVideoResponseModel::Completed { outcome, directory } => {
                let video = outcome.first();

                let title = video.metadata.title.as_deref().unwrap_or("Video");
                let ext = video.metadata.ext.as_deref().unwrap_or("mp4");
                let filename = format!("{}.{}", title, ext);

                println!("\n{}", format!("Download complete! Saved as: {}", filename).green().bold());
                println!("File location: {}", directory.join(&filename).display());
            },

            DownloadVideoResponseModel::DetailsUnavailable => {
                println!(
                    "\n{}",
                    "Download finished, but could not retrieve detailed file info.".yellow()
                );
            },

            DownloadVideoResponseModel::Failed { message } => {
                println!("\n{}", format!("An error occurred during download: {}", message).red());
                println!(
                    "This could be due to an invalid URL, a private video (try adding credentials), or a network issue."
                );
            },

            DownloadVideoResponseModel::NoUrlProvided => {
                println!("No URL provided. Exiting.");
            },
        }

        Ok(())
    }
}

struct FormattedPercentage(u64);

impl ::std::fmt::Display for FormattedPercentage {
    fn fmt(&self, formatter: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        write!(formatter, "{:>3}%", self.0)
    }
}

struct FormattedUninitPercentage;

impl ::std::fmt::Display for FormattedUninitPercentage {
    fn fmt(&self, formatter: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        write!(formatter, "{:>3}%", "??")
    }
}

struct FormattedBytes(u64);

impl ::std::fmt::Display for FormattedBytes {
    fn fmt(&self, formatter: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        write!(formatter, "{}", ::bytesize::ByteSize::b(self.0))
    }
}

struct FormattedUninitBytes;

impl ::std::fmt::Display for FormattedUninitBytes {
    fn fmt(&self, formatter: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        write!(formatter, "??MiB")
    }
}

fn status_line(status: &str, total_bytes: Option<u64>) -> String {
    let total_bytes = total_bytes
        .map(|bytes| FormattedBytes(bytes).to_string())
        .unwrap_or_else(|| "N/A".to_owned());

    format!("Status: {}. Total bytes: {}", status, total_bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_line_names_the_total_when_known() {
        assert!(status_line("downloading", Some(512)).starts_with("Status: downloading. Total bytes: 512"));
    }

    #[test]
    fn status_line_falls_back_to_a_placeholder_without_a_total() {
        assert_eq!(status_line("downloading", None), "Status: downloading. Total bytes: N/A");
    }
}
