pub(crate) mod utils;

use crate::utils::aliases::MaybeOwnedPath;
use crate::utils::aliases::MaybeOwnedString;

/// The information record yt-dlp reports for one downloaded item.
#[derive(Debug, Clone, ::bon::Builder)]
#[builder(on(_, into))]
pub struct Video {
    pub metadata: VideoMetadata,

    /// Where yt-dlp moved the finished file, when it told us.
    pub path: Option<MaybeOwnedPath>,
}

#[derive(Debug, Clone, ::bon::Builder)]
#[builder(on(_, into))]
pub struct VideoMetadata {
    pub title: Option<MaybeOwnedString>,
    pub ext: Option<MaybeOwnedString>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VideoUrl(MaybeOwnedString);

impl VideoUrl {
    pub fn new<Url>(url: Url) -> Self
    where
        Url: Into<MaybeOwnedString>,
    {
        Self(url.into())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<String> for VideoUrl {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

impl From<&'static str> for VideoUrl {
    fn from(url: &'static str) -> Self {
        Self::new(url)
    }
}

impl ::std::ops::Deref for VideoUrl {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl ::std::fmt::Display for VideoUrl {
    fn fmt(&self, formatter: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}
