use ::async_trait::async_trait;

use crate::models::descriptors::DownloadOutcome;
use crate::models::events::DiagnosticEvent;
use crate::models::events::VideoDownloadEvent;
use crate::utils::aliases::Fallible;
use crate::utils::aliases::MaybeOwnedPath;
use crate::utils::aliases::MaybeOwnedString;

#[async_trait]
pub trait Accept<Request> {
    async fn accept(self: ::std::sync::Arc<Self>, request: Request) -> Fallible<()>;
}

#[derive(::bon::Builder)]
#[builder(on(_, into))]
pub struct DownloadVideoRequestModel {
    pub url: String,
}

/// One closing summary per invocation, exactly one variant presented.
pub enum DownloadVideoResponseModel {
    /// yt-dlp exited cleanly and reported at least one item.
    Completed {
        outcome: DownloadOutcome,
        directory: MaybeOwnedPath,
    },

    /// yt-dlp exited cleanly but never reported an item.
    DetailsUnavailable,

    /// The collaborator failed to start or gave up; caught, never fatal.
    Failed { message: MaybeOwnedString },

    /// The trimmed input was empty, nothing was attempted.
    NoUrlProvided,
}

#[async_trait]
pub trait DownloadVideoOutputBoundary: Send + Sync {
    async fn activate(self: ::std::sync::Arc<Self>) -> Fallible<()>;
    async fn deactivate(self: ::std::sync::Arc<Self>) -> Fallible<()>;

    async fn update(self: ::std::sync::Arc<Self>, event: &VideoDownloadEvent) -> Fallible<()>;
    async fn diagnose(self: ::std::sync::Arc<Self>, event: &DiagnosticEvent) -> Fallible<()>;

    async fn present(self: ::std::sync::Arc<Self>, response: &DownloadVideoResponseModel) -> Fallible<()>;
}
