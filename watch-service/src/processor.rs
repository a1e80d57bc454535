use crate::lifecycle::PROCESS_NAME;
use crate::matcher;
use crate::notifier::Notifier;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace};
use triangulator_core::{
    Comment, CommentStream, CoreError, Credentials, ErrorReporter, PlatformClient, SelfIdentity,
    WatchList,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorOptions {
    /// Suppress the console line for each detection.
    pub quiet: bool,
    /// Log failed deliveries and keep streaming instead of stopping.
    pub continue_on_delivery_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProcessorState {
    Idle,
    Authenticated,
    Streaming,
    Terminated,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessorStats {
    pub comments_seen: u64,
    pub notifications_sent: u64,
    pub deliveries_failed: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The shutdown token was cancelled.
    Shutdown { stats: ProcessorStats },
}

/// Drives the monitor: authenticate, open the comment stream, notify on
/// every comment from a watched author.
pub struct StreamProcessor<P: PlatformClient> {
    client: P,
    watch_list: WatchList,
    options: ProcessorOptions,
    state: ProcessorState,
    stats: ProcessorStats,
}

impl<P: PlatformClient> StreamProcessor<P> {
    pub fn new(client: P, watch_list: WatchList, options: ProcessorOptions) -> Self {
        Self {
            client,
            watch_list,
            options,
            state: ProcessorState::Idle,
            stats: ProcessorStats::default(),
        }
    }

    pub fn state(&self) -> ProcessorState {
        self.state
    }

    pub fn stats(&self) -> ProcessorStats {
        self.stats
    }

    pub fn client(&self) -> &P {
        &self.client
    }

    /// Runs until `shutdown` is cancelled or an unrecoverable error occurs.
    ///
    /// The token is checked before every pull from the stream and raced
    /// against the pull itself, so a signal interrupts a long wait for new
    /// comments. Every path ends in [`ProcessorState::Terminated`].
    pub async fn run(
        &mut self,
        credentials: &Credentials,
        shutdown: &CancellationToken,
    ) -> Result<RunOutcome, CoreError> {
        let result = self.stream(credentials, shutdown).await;
        self.state = ProcessorState::Terminated;
        result
    }

    async fn stream(
        &mut self,
        credentials: &Credentials,
        shutdown: &CancellationToken,
    ) -> Result<RunOutcome, CoreError> {
        let session = tokio::select! {
            biased;
            _ = shutdown.cancelled() => None,
            result = self.client.authenticate(credentials) => Some(result.map_err(CoreError::Auth)?),
        };
        let Some((identity, channel)) = session else {
            info!("Shutdown requested before authentication completed");
            return Ok(RunOutcome::Shutdown { stats: self.stats });
        };

        self.state = ProcessorState::Authenticated;
        info!(
            "{} authenticated, user name: '{}'",
            PROCESS_NAME, identity.name
        );
        info!("Subreddit name: {}", channel.name);

        let mut comments = self.client.stream_comments(&channel);
        self.state = ProcessorState::Streaming;
        debug!(
            "Watching r/{} for {} users",
            channel.name,
            self.watch_list.len()
        );

        loop {
            if shutdown.is_cancelled() {
                break;
            }

            let next = tokio::select! {
                biased;
                _ = shutdown.cancelled() => None,
                next = comments.next_comment() => Some(next),
            };
            let Some(next) = next else {
                break;
            };

            let comment = next
                .map_err(CoreError::Stream)?
                .ok_or(CoreError::StreamEnded)?;
            self.stats.comments_seen += 1;
            self.process_comment(&identity, &comment).await?;
        }

        info!(
            "Stopped after {} comments, {} notifications sent",
            self.stats.comments_seen, self.stats.notifications_sent
        );
        Ok(RunOutcome::Shutdown { stats: self.stats })
    }

    /// Sends one notification per watch-list entry matching the author.
    async fn process_comment(
        &mut self,
        identity: &SelfIdentity,
        comment: &Comment,
    ) -> Result<(), CoreError> {
        trace!(
            "Comment {} by {:?} (reply to {:?})",
            comment.id,
            comment.author,
            comment.parent_kind
        );

        let notifier = Notifier::new(&self.client, self.options.quiet);

        for author in matcher::matching_entries(comment, &self.watch_list) {
            match notifier.notify(identity, author, comment).await {
                Ok(_) => self.stats.notifications_sent += 1,
                Err(source) => {
                    self.stats.deliveries_failed += 1;
                    let error = CoreError::Delivery {
                        recipient: identity.name.clone(),
                        source,
                    };
                    if !self.options.continue_on_delivery_error {
                        return Err(error);
                    }
                    ErrorReporter::new().report_warning(&error);
                }
            }
        }

        Ok(())
    }
}
