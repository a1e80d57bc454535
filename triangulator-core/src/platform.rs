use crate::error::RedditApiError;
use crate::types::{ChannelHandle, Comment, Credentials, SelfIdentity};
use async_trait::async_trait;

/// The social platform the monitor talks to.
///
/// Implementations report raw platform failures; the caller decides whether
/// a failure happened while authenticating, streaming or delivering.
#[async_trait]
pub trait PlatformClient: Send + Sync {
    type Comments: CommentStream;

    /// Logs in and resolves the account and channel named in `credentials`.
    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<(SelfIdentity, ChannelHandle), RedditApiError>;

    /// Opens a live stream of new comments in `channel`.
    fn stream_comments(&self, channel: &ChannelHandle) -> Self::Comments;

    async fn send_direct_message(
        &self,
        identity: &SelfIdentity,
        subject: &str,
        body: &str,
    ) -> Result<(), RedditApiError>;
}

#[async_trait]
pub trait CommentStream: Send {
    /// Waits for the next comment. `Ok(None)` means the stream is exhausted.
    async fn next_comment(&mut self) -> Result<Option<Comment>, RedditApiError>;
}
