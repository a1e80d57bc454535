pub mod api;
pub mod auth;
pub mod stream;

#[cfg(test)]
mod tests;

pub use api::{RedditApiClient, RedditCommentData, RedditListing, RedditUserData};
pub use auth::{PasswordGrant, RedditToken};
pub use stream::{PollBackoff, RedditCommentStream};

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info};
use triangulator_core::{
    ChannelHandle, Credentials, PlatformClient, RedditApiError, SelfIdentity,
};

/// Tokens are renewed this long before Reddit would reject them.
const TOKEN_RENEWAL_MARGIN: Duration = Duration::from_secs(60);

/// Hosts the client talks to. Tests point both at a mock server.
#[derive(Debug, Clone)]
pub struct RedditEndpoints {
    pub api_base: String,
    pub www_base: String,
}

impl Default for RedditEndpoints {
    fn default() -> Self {
        Self {
            api_base: api::REDDIT_API_BASE.to_string(),
            www_base: auth::REDDIT_WWW_BASE.to_string(),
        }
    }
}

impl RedditEndpoints {
    pub fn single_host(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api_base: base.to_string(),
            www_base: base.to_string(),
        }
    }
}

/// Authentication state
#[derive(Debug, Clone, PartialEq)]
pub enum AuthState {
    NotAuthenticated,
    Authenticated { username: String },
}

struct Session {
    api: RedditApiClient,
    grant: PasswordGrant,
    username: String,
    password: String,
    token: RedditToken,
}

/// Reddit implementation of [`PlatformClient`]. Clones share one session.
#[derive(Clone)]
pub struct RedditClient {
    endpoints: RedditEndpoints,
    skip_existing: bool,
    session: Arc<Mutex<Option<Session>>>,
}

impl Default for RedditClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RedditClient {
    pub fn new() -> Self {
        Self::with_endpoints(RedditEndpoints::default())
    }

    pub fn with_endpoints(endpoints: RedditEndpoints) -> Self {
        Self {
            endpoints,
            skip_existing: false,
            session: Arc::new(Mutex::new(None)),
        }
    }

    /// Do not report the comments already present when a stream starts.
    pub fn with_skip_existing(mut self, skip_existing: bool) -> Self {
        self.skip_existing = skip_existing;
        self
    }

    pub async fn get_auth_state(&self) -> AuthState {
        match self.session.lock().await.as_ref() {
            Some(session) => AuthState::Authenticated {
                username: session.username.clone(),
            },
            None => AuthState::NotAuthenticated,
        }
    }

    /// API handle plus a bearer token that is valid for at least the renewal margin.
    pub(crate) async fn access(&self) -> Result<(RedditApiClient, String), RedditApiError> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(RedditApiError::NotAuthenticated)?;

        if session.token.expires_within(TOKEN_RENEWAL_MARGIN) {
            info!("Reddit access token is about to expire, renewing");
            session.token = session
                .grant
                .request_token(&session.username, &session.password)
                .await?;
        }

        Ok((session.api.clone(), session.token.access_token.clone()))
    }
}

#[async_trait]
impl PlatformClient for RedditClient {
    type Comments = RedditCommentStream;

    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> Result<(SelfIdentity, ChannelHandle), RedditApiError> {
        let api = RedditApiClient::with_base_url(&credentials.user_agent, &self.endpoints.api_base)?;
        let grant = PasswordGrant::new(
            api.http_client().clone(),
            &credentials.client_id,
            &credentials.client_secret,
            &self.endpoints.www_base,
        )?;

        let token = grant
            .request_token(&credentials.username, &credentials.password)
            .await?;
        let user = api.get_user_info(&token.access_token).await?;
        debug!("Logged in to Reddit as u/{} ({})", user.name, user.id);

        let identity = SelfIdentity { name: user.name };
        let channel = ChannelHandle {
            name: credentials.subreddit.clone(),
        };

        *self.session.lock().await = Some(Session {
            api,
            grant,
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            token,
        });

        Ok((identity, channel))
    }

    fn stream_comments(&self, channel: &ChannelHandle) -> Self::Comments {
        RedditCommentStream::new(self.clone(), channel.name.clone(), self.skip_existing)
    }

    async fn send_direct_message(
        &self,
        identity: &SelfIdentity,
        subject: &str,
        body: &str,
    ) -> Result<(), RedditApiError> {
        let (api, access_token) = self.access().await?;
        api.compose_message(&access_token, &identity.name, subject, body)
            .await
    }
}
