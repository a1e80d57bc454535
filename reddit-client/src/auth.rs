//! OAuth2 resource-owner password grant for Reddit "script" apps.

use crate::api::transport_error;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, RequestTokenError,
    ResourceOwnerPassword, ResourceOwnerUsername, Scope, TokenResponse, TokenUrl,
};
use std::time::{Duration, SystemTime};
use tracing::{debug, error};
use triangulator_core::RedditApiError;

pub const REDDIT_WWW_BASE: &str = "https://www.reddit.com";

/// Reddit access tokens last one hour unless the response says otherwise.
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Debug, Clone)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        self.expires_within(Duration::ZERO)
    }

    pub fn expires_within(&self, margin: Duration) -> bool {
        SystemTime::now() + margin >= self.expires_at
    }
}

pub struct PasswordGrant {
    oauth_client: BasicClient,
    http_client: reqwest::Client,
}

impl PasswordGrant {
    pub fn new(
        http_client: reqwest::Client,
        client_id: &str,
        client_secret: &str,
        www_base: &str,
    ) -> Result<Self, RedditApiError> {
        let invalid_url = |e: oauth2::url::ParseError| RedditApiError::InvalidRequest {
            details: format!("invalid OAuth2 URL under '{}': {}", www_base, e),
        };

        let auth_url =
            AuthUrl::new(format!("{}/api/v1/authorize", www_base)).map_err(invalid_url)?;
        let token_url =
            TokenUrl::new(format!("{}/api/v1/access_token", www_base)).map_err(invalid_url)?;

        let oauth_client = BasicClient::new(
            ClientId::new(client_id.to_string()),
            Some(ClientSecret::new(client_secret.to_string())),
            auth_url,
            Some(token_url),
        );

        Ok(Self {
            oauth_client,
            http_client,
        })
    }

    pub fn required_scopes() -> Vec<&'static str> {
        vec!["identity", "read", "privatemessages"]
    }

    pub async fn request_token(
        &self,
        username: &str,
        password: &str,
    ) -> Result<RedditToken, RedditApiError> {
        let username = ResourceOwnerUsername::new(username.to_string());
        let password = ResourceOwnerPassword::new(password.to_string());

        let response = self
            .oauth_client
            .exchange_password(&username, &password)
            .add_scopes(
                Self::required_scopes()
                    .into_iter()
                    .map(|scope| Scope::new(scope.to_string())),
            )
            .request_async(|request| send_oauth_request(&self.http_client, request))
            .await
            .map_err(|e| {
                error!("Reddit token request failed: {}", e);
                match e {
                    RequestTokenError::ServerResponse(response) => {
                        RedditApiError::AuthenticationFailed {
                            reason: response.to_string(),
                        }
                    }
                    RequestTokenError::Request(e) => transport_error(e),
                    other => RedditApiError::AuthenticationFailed {
                        reason: other.to_string(),
                    },
                }
            })?;

        let lifetime = response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);

        debug!("Obtained Reddit access token valid for {:?}", lifetime);
        Ok(RedditToken {
            access_token: response.access_token().secret().clone(),
            expires_at: SystemTime::now() + lifetime,
        })
    }
}

/// Runs an oauth2 token request through our own client so Reddit sees the
/// configured user agent.
async fn send_oauth_request(
    client: &reqwest::Client,
    request: HttpRequest,
) -> Result<HttpResponse, reqwest::Error> {
    let response = client
        .request(request.method, request.url.as_str())
        .headers(request.headers)
        .body(request.body)
        .send()
        .await?;

    let status_code = response.status();
    let headers = response.headers().clone();
    let body = response.bytes().await?.to_vec();

    Ok(HttpResponse {
        status_code,
        headers,
        body,
    })
}
