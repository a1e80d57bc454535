#[cfg(test)]
mod tests {
    use crate::{
        AuthState, PollBackoff, RedditClient, RedditCommentData, RedditEndpoints,
        RedditListing, RedditToken,
    };
    use crate::stream::mark_seen;
    use lru::LruCache;
    use std::num::NonZeroUsize;
    use std::time::{Duration, SystemTime};
    use triangulator_core::{
        ChannelHandle, Comment, CommentStream, ParentKind, PlatformClient, RedditApiError,
        SelfIdentity,
    };

    fn comment_data(name: &str, author: &str, parent_id: &str) -> RedditCommentData {
        RedditCommentData {
            id: name.trim_start_matches("t1_").to_string(),
            name: name.to_string(),
            author: author.to_string(),
            body: "Some Comment Text".to_string(),
            permalink: format!("/r/rust/comments/abc/post/{}/", name),
            parent_id: parent_id.to_string(),
            created_utc: 1640995200.0,
        }
    }

    #[test]
    fn test_endpoints() {
        let defaults = RedditEndpoints::default();
        assert_eq!(defaults.api_base, "https://oauth.reddit.com");
        assert_eq!(defaults.www_base, "https://www.reddit.com");

        let local = RedditEndpoints::single_host("http://127.0.0.1:8080/");
        assert_eq!(local.api_base, "http://127.0.0.1:8080");
        assert_eq!(local.www_base, "http://127.0.0.1:8080");
    }

    #[test]
    fn test_client_starts_unauthenticated() {
        let client = RedditClient::new();
        let state = tokio_test::block_on(client.get_auth_state());
        assert_eq!(state, AuthState::NotAuthenticated);
    }

    #[test]
    fn test_requests_before_login_fail() {
        let client = RedditClient::new();
        let identity = SelfIdentity {
            name: "operator".to_string(),
        };

        let result = tokio_test::block_on(client.send_direct_message(&identity, "s", "b"));
        assert!(matches!(result, Err(RedditApiError::NotAuthenticated)));

        let mut stream = client.stream_comments(&ChannelHandle {
            name: "rust".to_string(),
        });
        let result = tokio_test::block_on(stream.next_comment());
        assert!(matches!(result, Err(RedditApiError::NotAuthenticated)));
    }

    #[test]
    fn test_required_scopes() {
        let scopes = crate::PasswordGrant::required_scopes();
        assert_eq!(scopes, vec!["identity", "read", "privatemessages"]);
    }

    #[test]
    fn test_token_expiry() {
        let now = SystemTime::now();

        let valid_token = RedditToken {
            access_token: "valid_token".to_string(),
            expires_at: now + Duration::from_secs(3600),
        };
        assert!(!valid_token.is_expired());
        assert!(!valid_token.expires_within(Duration::from_secs(60)));
        assert!(valid_token.expires_within(Duration::from_secs(7200)));

        let expired_token = RedditToken {
            access_token: "expired_token".to_string(),
            expires_at: now - Duration::from_secs(1),
        };
        assert!(expired_token.is_expired());
    }

    #[test]
    fn test_seen_set_evicts_oldest() {
        let mut seen = LruCache::new(NonZeroUsize::new(2).unwrap());
        assert!(seen.is_empty());

        assert!(mark_seen(&mut seen, "t1_a"));
        assert!(mark_seen(&mut seen, "t1_b"));
        assert!(!mark_seen(&mut seen, "t1_a"));
        assert_eq!(seen.len(), 2);

        // A repeated sighting must not keep t1_a alive
        assert!(mark_seen(&mut seen, "t1_c"));
        assert_eq!(seen.len(), 2);
        assert!(!seen.contains("t1_a"));
        assert!(seen.contains("t1_b"));
        assert!(seen.contains("t1_c"));

        // Evicted entries count as new again
        assert!(mark_seen(&mut seen, "t1_a"));
    }

    #[test]
    fn test_backoff_doubles_and_caps() {
        let mut backoff = PollBackoff::new(Duration::from_secs(1), Duration::from_secs(4));
        let expected = [1.0, 2.0, 4.0, 4.0];

        for base in expected {
            let delay = backoff.next_delay().as_secs_f64();
            let tolerance = base / 32.0 + 1e-9;
            assert!(
                (delay - base).abs() <= tolerance,
                "delay {} not within {} of {}",
                delay,
                tolerance,
                base
            );
        }

        backoff.reset();
        let delay = backoff.next_delay().as_secs_f64();
        assert!((delay - 1.0).abs() <= 1.0 / 32.0 + 1e-9);
    }

    #[test]
    fn test_comment_conversion() {
        let comment: Comment = comment_data("t1_abc", "alice", "t3_post").into();
        assert_eq!(comment.id, "abc");
        assert_eq!(comment.author.as_deref(), Some("alice"));
        assert_eq!(comment.body, "Some Comment Text");
        assert_eq!(comment.parent_kind, ParentKind::Submission);
        assert_eq!(comment.created.timestamp(), 1640995200);

        let reply: Comment = comment_data("t1_def", "bob", "t1_abc").into();
        assert_eq!(reply.parent_kind, ParentKind::Comment);
    }

    #[test]
    fn test_deleted_author_becomes_none() {
        let comment: Comment = comment_data("t1_abc", "[deleted]", "t3_post").into();
        assert_eq!(comment.author, None);
    }

    #[test]
    fn test_listing_deserialization() {
        let json = serde_json::json!({
            "kind": "Listing",
            "data": {
                "after": "t1_b",
                "before": null,
                "children": [
                    {
                        "kind": "t1",
                        "data": {
                            "id": "b",
                            "name": "t1_b",
                            "author": "alice",
                            "body": "Hello",
                            "permalink": "/r/rust/comments/x/y/b/",
                            "parent_id": "t3_x",
                            "subreddit": "rust",
                            "created_utc": 1700000000.0,
                            "score": 3
                        }
                    }
                ]
            }
        });

        let listing: RedditListing<RedditCommentData> = serde_json::from_value(json).unwrap();
        assert_eq!(listing.data.children.len(), 1);
        assert_eq!(listing.data.children[0].data.author, "alice");
        assert_eq!(listing.data.modhash, None);
    }
}
