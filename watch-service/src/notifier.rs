use tracing::info;
use triangulator_core::{Comment, NotificationEvent, PlatformClient, RedditApiError, SelfIdentity};

/// Prefix that turns a comment permalink into an absolute URL.
pub const PERMALINK_BASE: &str = "https://www.reddit.com";

/// The message for a comment written by the watched `author`.
pub fn detection_event(author: &str, comment: &Comment) -> NotificationEvent {
    NotificationEvent {
        subject: format!("{} DETECTED", author),
        body: format!(
            "{}\n{}{}",
            comment.body.to_lowercase(),
            PERMALINK_BASE,
            comment.permalink
        ),
    }
}

/// Sends the detection message to the monitor's own account.
pub struct Notifier<'a, P: PlatformClient> {
    client: &'a P,
    quiet: bool,
}

impl<'a, P: PlatformClient> Notifier<'a, P> {
    /// `quiet` drops the console line for each match; the message is still sent.
    pub fn new(client: &'a P, quiet: bool) -> Self {
        Self { client, quiet }
    }

    pub async fn notify(
        &self,
        identity: &SelfIdentity,
        author: &str,
        comment: &Comment,
    ) -> Result<NotificationEvent, RedditApiError> {
        let event = detection_event(author, comment);

        if !self.quiet {
            info!("{} : {}", event.subject, event.body);
        }

        self.client
            .send_direct_message(identity, &event.subject, &event.body)
            .await?;

        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use triangulator_core::ParentKind;

    fn comment() -> Comment {
        Comment {
            id: "k1".to_string(),
            author: Some("alice".to_string()),
            body: "Found The IMPLANT\nSecond Line".to_string(),
            permalink: "/r/rust/comments/abc/title/k1/".to_string(),
            parent_kind: ParentKind::Comment,
            created: Utc::now(),
        }
    }

    #[test]
    fn test_subject_names_author() {
        let event = detection_event("alice", &comment());
        assert_eq!(event.subject, "alice DETECTED");
    }

    #[test]
    fn test_body_is_lowercase_text_then_permalink() {
        let comment = comment();
        let event = detection_event("alice", &comment);

        assert!(event.body.starts_with("found the implant\nsecond line"));
        let suffix = format!("\n{}{}", PERMALINK_BASE, comment.permalink);
        assert!(event.body.ends_with(&suffix));
        assert_eq!(
            event.body,
            "found the implant\nsecond line\nhttps://www.reddit.com/r/rust/comments/abc/title/k1/"
        );
    }

    #[test]
    fn test_permalink_is_not_lowercased() {
        let mut comment = comment();
        comment.permalink = "/r/Rust/comments/AbC/Title/K1/".to_string();
        let event = detection_event("alice", &comment);
        assert!(event.body.ends_with("https://www.reddit.com/r/Rust/comments/AbC/Title/K1/"));
    }
}
