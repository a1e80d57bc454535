use chrono::{DateTime, Utc};
use std::fmt;

/// Reddit script-app credentials plus the subreddit to watch.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_agent: String,
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub subreddit: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_agent", &self.user_agent)
            .field("client_id", &self.client_id)
            .field("client_secret", &mask(&self.client_secret))
            .field("username", &self.username)
            .field("password", &mask(&self.password))
            .field("subreddit", &self.subreddit)
            .finish()
    }
}

fn mask(s: &str) -> String {
    if s.len() <= 6 {
        "***".into()
    } else {
        let prefix: String = s.chars().take(3).collect();
        format!("{}***", prefix)
    }
}

/// Ordered author names whose comments trigger a notification.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchList {
    entries: Vec<String>,
}

impl WatchList {
    pub fn new(entries: Vec<String>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for WatchList {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self::new(iter.into_iter().map(Into::into).collect())
    }
}

/// Everything the run file configures.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSettings {
    pub watch_list: WatchList,
    /// Mark the comments already in the subreddit at startup as seen instead of reporting them.
    pub skip_existing: bool,
    /// Log and skip failed private messages instead of stopping the monitor.
    pub continue_on_delivery_error: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParentKind {
    Comment,
    Submission,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: String,
    /// `None` when the account was deleted.
    pub author: Option<String>,
    pub body: String,
    pub permalink: String,
    pub parent_kind: ParentKind,
    pub created: DateTime<Utc>,
}

/// The account the monitor is logged in as. Detection messages are sent here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelfIdentity {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHandle {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationEvent {
    pub subject: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_credentials_debug_masks_secrets() {
        let credentials = Credentials {
            user_agent: "implant-triangulator/0.1 by operator".to_string(),
            client_id: "abc123".to_string(),
            client_secret: "supersecretvalue".to_string(),
            username: "operator".to_string(),
            password: "hunter2".to_string(),
            subreddit: "rust".to_string(),
        };

        let debug = format!("{:?}", credentials);
        assert!(debug.contains("sup***"));
        assert!(debug.contains("hun***"));
        assert!(!debug.contains("supersecretvalue"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("operator"));
    }

    #[test]
    fn test_watch_list_keeps_order_and_duplicates() {
        let list: WatchList = ["bob", "alice", "bob"].into_iter().collect();
        assert_eq!(list.len(), 3);
        assert_eq!(list.iter().collect::<Vec<_>>(), vec!["bob", "alice", "bob"]);
        assert!(WatchList::default().is_empty());
    }
}
