use ::async_trait::async_trait;
use ::domain::VideoUrl;

use crate::models::events::DiagnosticEvent;
use crate::models::events::VideoDownloadEvent;
use crate::utils::aliases::BoxedStream;
use crate::utils::aliases::Fallible;

/// The external extraction/download routine. An `Err` here means the
/// collaborator could not even be started; failures after startup arrive as
/// [`VideoDownloadEvent::Failed`] on the event stream.
#[async_trait]
pub trait VideoDownloader: Send + Sync {
    async fn download(
        self: ::std::sync::Arc<Self>, url: VideoUrl,
    ) -> Fallible<(BoxedStream<VideoDownloadEvent>, BoxedStream<DiagnosticEvent>)>;
}
