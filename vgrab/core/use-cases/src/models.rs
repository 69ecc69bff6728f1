pub mod events {
    use crate::models::descriptors::ResolvedVideo;
    use crate::utils::aliases::MaybeOwnedString;

    /// Everything yt-dlp tells us about one invocation, replayed as a stream.
    #[derive(Debug)]
    pub enum VideoDownloadEvent {
        Started(VideoDownloadStartedEvent),
        ProgressUpdated(VideoDownloadProgressUpdatedEvent),
        Completed(VideoDownloadCompletedEvent),
        Failed(VideoDownloadFailedEvent),
    }

    #[derive(Debug, ::bon::Builder)]
    #[builder(on(_, into))]
    pub struct VideoDownloadStartedEvent {
        pub url: MaybeOwnedString,
    }

    #[derive(Debug, ::bon::Builder)]
    #[builder(on(_, into))]
    pub struct VideoDownloadProgressUpdatedEvent {
        pub status: MaybeOwnedString,

        /// Byte counts are absent while yt-dlp has not sized the stream yet.
        pub downloaded_bytes: Option<u64>,
        pub total_bytes: Option<u64>,
    }

    #[derive(Debug, ::bon::Builder)]
    pub struct VideoDownloadCompletedEvent {
        pub video: ResolvedVideo,
    }

    /// Terminal collaborator failure: spawn succeeded but yt-dlp gave up.
    #[derive(Debug, ::bon::Builder)]
    #[builder(on(_, into))]
    pub struct VideoDownloadFailedEvent {
        pub message: MaybeOwnedString,
    }

    #[derive(Debug, ::bon::Builder)]
    #[builder(on(_, into))]
    pub struct DiagnosticEvent {
        pub level: DiagnosticLevel,
        pub message: MaybeOwnedString,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum DiagnosticLevel {
        Warning,
        Error,
    }
}

pub mod descriptors {
    pub type ResolvedVideo = ::domain::Video;

    /// What one invocation resolved to, folded once after the event streams
    /// drain. `Multiple` keeps the items in completion order and is never
    /// empty; an empty completion set is `None`, a separate non-exceptional
    /// branch rather than a failure.
    #[derive(Debug)]
    pub enum DownloadOutcome {
        Single(ResolvedVideo),
        Multiple(Vec<ResolvedVideo>),
    }

    impl DownloadOutcome {
        pub fn from_videos(mut videos: Vec<ResolvedVideo>) -> Option<Self> {
            match videos.len() {
                0 => None,
                1 => Some(Self::Single(videos.remove(0))),
                _ => Some(Self::Multiple(videos)),
            }
        }

        /// The only item anything downstream consults.
        pub fn first(&self) -> &ResolvedVideo {
            match self {
                Self::Single(video) => video,
                Self::Multiple(videos) => &videos[0],
            }
        }
    }
}
