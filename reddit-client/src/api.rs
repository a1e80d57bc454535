use chrono::{DateTime, Utc};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, error, warn};
use triangulator_core::{Comment, ErrorExt, ParentKind, RedditApiError};
use url::Url;

pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";

/// Author name Reddit reports for removed accounts.
const DELETED_AUTHOR: &str = "[deleted]";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
    pub modhash: Option<String>,
    pub dist: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditCommentData {
    pub id: String,
    /// Fullname, e.g. `t1_abc123`.
    pub name: String,
    pub author: String,
    pub body: String,
    pub permalink: String,
    pub parent_id: String,
    pub created_utc: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditUserData {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Deserialize)]
struct ComposeResponse {
    json: ComposeResult,
}

#[derive(Debug, Deserialize)]
struct ComposeResult {
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

#[derive(Debug, Clone)]
pub struct RedditApiClient {
    http_client: Client,
    api_base: Url,
}

impl RedditApiClient {
    pub fn with_base_url(user_agent: &str, api_base: &str) -> Result<Self, RedditApiError> {
        let api_base = Url::parse(api_base).map_err(|e| RedditApiError::InvalidRequest {
            details: format!("invalid API base URL '{}': {}", api_base, e),
        })?;

        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(transport_error)?;

        Ok(Self {
            http_client,
            api_base,
        })
    }

    pub fn http_client(&self) -> &Client {
        &self.http_client
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: Option<&[(&str, &str)]>,
        form_params: Option<&[(&str, &str)]>,
    ) -> Result<Response, RedditApiError> {
        let url = self
            .api_base
            .join(endpoint)
            .map_err(|e| RedditApiError::InvalidRequest {
                details: format!("invalid endpoint '{}': {}", endpoint, e),
            })?;

        let mut request_builder = self
            .http_client
            .request(method.clone(), url)
            .bearer_auth(access_token);

        if let Some(params) = query_params {
            request_builder = request_builder.query(params);
        }
        if let Some(params) = form_params {
            request_builder = request_builder.form(params);
        }

        debug!("Making Reddit API request: {} {}", method, endpoint);
        let response = request_builder.send().await.map_err(|e| {
            error!("Network error for {} {}: {}", method, endpoint, e);
            transport_error(e)
        })?;

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, endpoint);
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        Err(status_error(&response, endpoint))
    }

    pub async fn get_user_info(&self, access_token: &str) -> Result<RedditUserData, RedditApiError> {
        let response = self
            .make_request(Method::GET, "/api/v1/me", access_token, None, None)
            .await?;

        let user_data: RedditUserData = response.json().await.map_err(|e| {
            error!("Failed to parse user data: {}", e);
            RedditApiError::InvalidResponse {
                details: "Failed to parse user data".to_string(),
            }
        })?;

        debug!("Retrieved user info for: {}", user_data.name);
        Ok(user_data)
    }

    /// Newest comments across the subreddit, newest first.
    pub async fn get_subreddit_comments(
        &self,
        access_token: &str,
        subreddit: &str,
        limit: u32,
    ) -> Result<RedditListing<RedditCommentData>, RedditApiError> {
        let endpoint = format!("/r/{}/comments", subreddit);
        let limit = limit.to_string();
        let params = [("limit", limit.as_str()), ("raw_json", "1")];

        let response = self
            .make_request(Method::GET, &endpoint, access_token, Some(&params[..]), None)
            .await
            .map_err(|e| {
                if is_missing_subreddit(&e) {
                    RedditApiError::SubredditNotFound {
                        subreddit: subreddit.to_string(),
                    }
                } else {
                    e
                }
            })?;

        let listing: RedditListing<RedditCommentData> =
            response.json().await.map_err(|e| RedditApiError::InvalidResponse {
                details: format!("Failed to parse comments for r/{}: {}", subreddit, e),
            })?;

        debug!(
            "Retrieved {} comments from r/{}",
            listing.data.children.len(),
            subreddit
        );
        Ok(listing)
    }

    /// Sends a private message. Reddit answers 200 even when it refuses the
    /// message, so the `json.errors` array has to be inspected as well.
    pub async fn compose_message(
        &self,
        access_token: &str,
        to: &str,
        subject: &str,
        text: &str,
    ) -> Result<(), RedditApiError> {
        let form = [
            ("api_type", "json"),
            ("to", to),
            ("subject", subject),
            ("text", text),
        ];

        let response = self
            .make_request(Method::POST, "/api/compose", access_token, None, Some(&form[..]))
            .await?;

        let result: ComposeResponse =
            response.json().await.map_err(|e| RedditApiError::InvalidResponse {
                details: format!("Failed to parse compose response: {}", e),
            })?;

        if !result.json.errors.is_empty() {
            let reason = result
                .json
                .errors
                .iter()
                .map(describe_api_error)
                .collect::<Vec<_>>()
                .join("; ");
            let rejected = RedditApiError::MessageRejected { reason };
            rejected.log_warn();
            return Err(rejected);
        }

        debug!("Message '{}' sent to u/{}", subject, to);
        Ok(())
    }
}

pub(crate) fn transport_error(e: reqwest::Error) -> RedditApiError {
    if e.is_timeout() {
        RedditApiError::RequestTimeout
    } else {
        RedditApiError::Network {
            details: e.to_string(),
        }
    }
}

fn status_error(response: &Response, endpoint: &str) -> RedditApiError {
    let status = response.status();
    match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(60);
            warn!("Rate limited, retry after {} seconds", retry_after);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        StatusCode::UNAUTHORIZED => RedditApiError::InvalidToken,
        StatusCode::FORBIDDEN => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        StatusCode::NOT_FOUND => RedditApiError::InvalidResponse {
            details: format!("Resource not found: {}", endpoint),
        },
        s if s.is_server_error() => RedditApiError::ServerError {
            status_code: s.as_u16(),
        },
        s => RedditApiError::InvalidResponse {
            details: format!("Unexpected status {} for {}", s, endpoint),
        },
    }
}

fn is_missing_subreddit(error: &RedditApiError) -> bool {
    matches!(error, RedditApiError::InvalidResponse { details } if details.starts_with("Resource not found"))
}

/// Reddit reports API errors as `[code, message, field]` triples.
fn describe_api_error(value: &serde_json::Value) -> String {
    match value.as_array() {
        Some(parts) => parts
            .iter()
            .filter_map(|part| part.as_str())
            .collect::<Vec<_>>()
            .join(": "),
        None => value.to_string(),
    }
}

impl From<RedditCommentData> for Comment {
    fn from(data: RedditCommentData) -> Self {
        let author = if data.author == DELETED_AUTHOR || data.author.is_empty() {
            None
        } else {
            Some(data.author)
        };

        let parent_kind = if data.parent_id.starts_with("t1_") {
            ParentKind::Comment
        } else {
            ParentKind::Submission
        };

        let created: DateTime<Utc> =
            DateTime::from_timestamp(data.created_utc as i64, 0).unwrap_or_default();

        Self {
            id: data.id,
            author,
            body: data.body,
            permalink: data.permalink,
            parent_kind,
            created,
        }
    }
}
