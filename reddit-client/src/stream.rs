use crate::RedditClient;
use async_trait::async_trait;
use lru::LruCache;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::time::Duration;
use tracing::{debug, trace};
use triangulator_core::{Comment, CommentStream, RedditApiError};

/// Comments requested per poll, the maximum a listing returns.
const POLL_LIMIT: u32 = 100;

/// Three full listings plus one.
const SEEN_CAPACITY: NonZeroUsize = match NonZeroUsize::new(301) {
    Some(capacity) => capacity,
    None => unreachable!(),
};

/// Records `fullname` as seen. Returns `false` if it already was.
///
/// Lookups use `contains`, which leaves the recency order alone, so the
/// cache evicts in insertion order.
pub(crate) fn mark_seen(seen: &mut LruCache<String, ()>, fullname: &str) -> bool {
    if seen.contains(fullname) {
        return false;
    }
    seen.put(fullname.to_string(), ());
    true
}

/// Exponential delay between empty polls, with a little jitter.
#[derive(Debug, Clone)]
pub struct PollBackoff {
    base: Duration,
    current: Duration,
    max: Duration,
}

impl Default for PollBackoff {
    fn default() -> Self {
        Self::new(Duration::from_secs(1), Duration::from_secs(16))
    }
}

impl PollBackoff {
    pub fn new(base: Duration, max: Duration) -> Self {
        Self {
            base,
            current: base,
            max,
        }
    }

    /// Delay before the next poll; doubles the following one up to `max`.
    pub fn next_delay(&mut self) -> Duration {
        let max_jitter = self.current.as_secs_f64() / 16.0;
        let jitter = fastrand::f64() * max_jitter - max_jitter / 2.0;
        let delay = Duration::from_secs_f64((self.current.as_secs_f64() + jitter).max(0.0));

        self.current = std::cmp::min(self.current * 2, self.max);
        delay
    }

    pub fn reset(&mut self) {
        self.current = self.base;
    }
}

/// Endless stream of new comments in one subreddit, built by polling the
/// subreddit's comment listing.
pub struct RedditCommentStream {
    client: RedditClient,
    subreddit: String,
    seen: LruCache<String, ()>,
    pending: VecDeque<Comment>,
    backoff: PollBackoff,
    skip_existing: bool,
    first_poll: bool,
}

impl RedditCommentStream {
    pub(crate) fn new(client: RedditClient, subreddit: String, skip_existing: bool) -> Self {
        Self {
            client,
            subreddit,
            seen: LruCache::new(SEEN_CAPACITY),
            pending: VecDeque::new(),
            backoff: PollBackoff::default(),
            skip_existing,
            first_poll: true,
        }
    }

    /// Fetches the listing once and queues the unseen comments, oldest first.
    /// Returns whether anything unseen was found.
    async fn poll(&mut self) -> Result<bool, RedditApiError> {
        let (api, access_token) = self.client.access().await?;
        let listing = api
            .get_subreddit_comments(&access_token, &self.subreddit, POLL_LIMIT)
            .await?;

        let skip = self.skip_existing && self.first_poll;
        self.first_poll = false;

        let mut found = false;
        for child in listing.data.children.into_iter().rev() {
            if !mark_seen(&mut self.seen, &child.data.name) {
                continue;
            }
            found = true;

            if skip {
                trace!("Skipping existing comment {}", child.data.name);
                continue;
            }
            self.pending.push_back(child.data.into());
        }

        debug!(
            "Polled r/{}: {} new comments queued",
            self.subreddit,
            self.pending.len()
        );
        Ok(found)
    }
}

#[async_trait]
impl CommentStream for RedditCommentStream {
    async fn next_comment(&mut self) -> Result<Option<Comment>, RedditApiError> {
        loop {
            if let Some(comment) = self.pending.pop_front() {
                return Ok(Some(comment));
            }

            if self.poll().await? {
                self.backoff.reset();
            } else {
                let delay = self.backoff.next_delay();
                trace!("No new comments in r/{}, waiting {:?}", self.subreddit, delay);
                tokio::time::sleep(delay).await;
            }
        }
    }
}
