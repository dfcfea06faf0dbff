//! API client for the cashbook REST API.
//!
//! `ApiClient::send` attaches the session's bearer token to each request and,
//! when the server answers `401`, renews the access token once with the
//! refresh token and replays the request. If renewal fails the session is
//! invalidated and the original `401` is returned.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::auth::Session;
use crate::config::ClientConfig;
use crate::models::{LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, UserProfile};

use super::request::{ApiRequest, ApiResponse, ResponseBody, ResponseKind};
use super::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

const LOGIN_PATH: &str = "/api/auth/login/";
const REFRESH_PATH: &str = "/api/auth/refresh/";
const CURRENT_USER_PATH: &str = "/api/auth/me/";

/// A token refresh that every concurrently rejected request can await.
type PendingRefresh = Shared<BoxFuture<'static, Result<String, ApiError>>>;

/// Where a single `send` ended up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Outcome {
    Success,
    FailedNon401,
    Failed401NoRefresh,
    RetriedSuccess,
    RetriedFailed,
    RefreshFailedLoggedOut,
}

/// Result of trying to obtain a usable access token after a `401`.
enum Renewal {
    Token(String),
    NoRefreshToken,
    Failed,
}

/// Authenticated client for the cashbook API.
/// Clone is cheap - all clones share the transport, session and refresh state.
#[derive(Clone)]
pub struct ApiClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
    pending_refresh: Arc<Mutex<Option<PendingRefresh>>>,
}

impl ApiClient {
    /// Create a client that talks HTTP through `reqwest`.
    pub fn new(config: ClientConfig, session: Arc<Session>) -> Result<Self, ApiError> {
        let transport = ReqwestTransport::new(config.timeout)?;
        Ok(Self::with_transport(config, session, Arc::new(transport)))
    }

    pub fn with_transport(
        config: ClientConfig,
        session: Arc<Session>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            session,
            pending_refresh: Arc::new(Mutex::new(None)),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Send a request with the current access token, renewing it once on `401`.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        self.execute(request).await.0
    }

    /// Send a request and decode its JSON body.
    pub(crate) async fn fetch<T: DeserializeOwned>(&self, request: ApiRequest) -> Result<T, ApiError> {
        self.send(request).await?.json()
    }

    pub(crate) async fn execute(&self, request: ApiRequest) -> (Result<ApiResponse, ApiError>, Outcome) {
        let token = self.session.access_token().await;
        let rejected = match self.dispatch(&request, token.clone()).await {
            Ok(response) => return self.finish(&request, Ok(response), Outcome::Success),
            Err(e) if !e.is_unauthorized() => {
                return self.finish(&request, Err(e), Outcome::FailedNon401)
            }
            Err(e) => e,
        };

        // From here the request has used its one retry; a second 401 is final.
        let fresh = match self.renewed_token(token.as_deref()).await {
            Renewal::Token(fresh) => fresh,
            Renewal::NoRefreshToken => {
                return self.finish(&request, Err(rejected), Outcome::Failed401NoRefresh)
            }
            Renewal::Failed => {
                return self.finish(&request, Err(rejected), Outcome::RefreshFailedLoggedOut)
            }
        };

        match self.dispatch(&request, Some(fresh)).await {
            Ok(response) => self.finish(&request, Ok(response), Outcome::RetriedSuccess),
            Err(e) => self.finish(&request, Err(e), Outcome::RetriedFailed),
        }
    }

    fn finish(
        &self,
        request: &ApiRequest,
        result: Result<ApiResponse, ApiError>,
        outcome: Outcome,
    ) -> (Result<ApiResponse, ApiError>, Outcome) {
        match &result {
            Ok(response) => debug!(
                method = %request.method,
                path = %request.path,
                status = %response.status,
                ?outcome,
                "Request finished"
            ),
            Err(e) => debug!(
                method = %request.method,
                path = %request.path,
                error = %e,
                ?outcome,
                "Request failed"
            ),
        }
        (result, outcome)
    }

    /// Perform one HTTP exchange and classify the response.
    async fn dispatch(
        &self,
        request: &ApiRequest,
        bearer: Option<String>,
    ) -> Result<ApiResponse, ApiError> {
        let http = HttpRequest {
            method: request.method.clone(),
            url: self.config.url(&request.path),
            query: request.query.clone(),
            body: request.body.clone(),
            bearer,
        };

        let response = check_response(self.transport.execute(http).await?)?;
        let body = match request.response_kind {
            ResponseKind::Binary => ResponseBody::Binary(response.body),
            ResponseKind::Json => decode_json_body(&response)?,
        };

        Ok(ApiResponse {
            status: response.status,
            body,
        })
    }

    async fn renewed_token(&self, rejected_token: Option<&str>) -> Renewal {
        // Another request may already have replaced the token we were rejected with
        if let Some(current) = self.session.access_token().await {
            if rejected_token != Some(current.as_str()) {
                debug!("Access token already renewed, retrying with current token");
                return Renewal::Token(current);
            }
        }

        if self.session.refresh_token().await.is_none() {
            debug!("No refresh token stored, not attempting renewal");
            return Renewal::NoRefreshToken;
        }

        match self.shared_refresh().await {
            Ok(token) => Renewal::Token(token),
            Err(_) => Renewal::Failed,
        }
    }

    /// Join the refresh already in flight, or start one.
    async fn shared_refresh(&self) -> Result<String, ApiError> {
        let pending = {
            let mut slot = self.pending_refresh.lock().await;
            match slot.as_ref() {
                Some(pending) => pending.clone(),
                None => {
                    let pending = refresh_access_token(
                        Arc::clone(&self.config),
                        Arc::clone(&self.transport),
                        Arc::clone(&self.session),
                    )
                    .boxed()
                    .shared();
                    *slot = Some(pending.clone());
                    pending
                }
            }
        };

        let result = pending.clone().await;

        let mut slot = self.pending_refresh.lock().await;
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&pending)) {
            *slot = None;
        }
        result
    }

    // ===== Authentication =====

    /// Log in with a username and password, storing the issued token pair.
    pub async fn login(&self, username: &str, password: &str) -> Result<UserProfile, ApiError> {
        let request = ApiRequest::post(LOGIN_PATH).json(&LoginRequest { username, password })?;

        // Credentials are never attached to, or renewed for, the login call itself
        let response = self.dispatch(&request, None).await.map_err(|e| {
            warn!(username, error = %e, "Login failed");
            e
        })?;
        let login: LoginResponse = response.json()?;

        self.session.set_tokens(login.access, login.refresh).await;
        info!(username, "Logged in");
        Ok(login.user)
    }

    /// Discard the session's tokens.
    pub async fn logout(&self) {
        self.session.clear().await;
        info!("Logged out");
    }

    pub async fn current_user(&self) -> Result<UserProfile, ApiError> {
        self.fetch(ApiRequest::get(CURRENT_USER_PATH)).await
    }

    /// Resume a stored session.
    ///
    /// Returns the current user if a stored token is still accepted. A stored
    /// token that cannot be used is discarded.
    pub async fn bootstrap(&self) -> Result<Option<UserProfile>, ApiError> {
        if !self.session.is_authenticated().await {
            return Ok(None);
        }

        match self.current_user().await {
            Ok(user) => Ok(Some(user)),
            Err(e) => {
                warn!(error = %e, "Failed to fetch current user, clearing session");
                self.session.clear().await;
                Ok(None)
            }
        }
    }
}

/// Exchange the refresh token for a new access token and store it.
/// On any failure both tokens are discarded and the session is invalidated.
async fn refresh_access_token(
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    session: Arc<Session>,
) -> Result<String, ApiError> {
    match request_access_token(&config, transport.as_ref(), &session).await {
        Ok(access) => {
            session.set_access_token(access.clone()).await;
            info!("Access token refreshed");
            Ok(access)
        }
        Err(e) => {
            warn!(error = %e, "Token refresh failed, invalidating session");
            session.invalidate().await;
            Err(e)
        }
    }
}

async fn request_access_token(
    config: &ClientConfig,
    transport: &dyn Transport,
    session: &Session,
) -> Result<String, ApiError> {
    let refresh = session
        .refresh_token()
        .await
        .ok_or_else(|| ApiError::Unauthorized {
            body: "No refresh token".to_string(),
        })?;

    let body = serde_json::to_value(RefreshRequest { refresh: &refresh })
        .map_err(|e| ApiError::InvalidRequest(format!("Failed to encode refresh request: {}", e)))?;

    let response = transport
        .execute(HttpRequest {
            method: Method::POST,
            url: config.url(REFRESH_PATH),
            query: Vec::new(),
            body: Some(body),
            bearer: None,
        })
        .await?;
    let response = check_response(response)?;

    let parsed: RefreshResponse = serde_json::from_slice(&response.body)
        .map_err(|e| ApiError::InvalidResponse(format!("Failed to parse refresh response: {}", e)))?;
    if parsed.access.is_empty() {
        return Err(ApiError::InvalidResponse(
            "Refresh response contained an empty access token".to_string(),
        ));
    }
    Ok(parsed.access)
}

/// Return the response if successful, or an error carrying its body.
fn check_response(response: HttpResponse) -> Result<HttpResponse, ApiError> {
    if response.is_success() {
        Ok(response)
    } else {
        Err(ApiError::from_status(response.status, &response.text()))
    }
}

fn decode_json_body(response: &HttpResponse) -> Result<ResponseBody, ApiError> {
    if response.status == StatusCode::NO_CONTENT
        || response.body.iter().all(|b| b.is_ascii_whitespace())
    {
        return Ok(ResponseBody::Empty);
    }
    serde_json::from_slice(&response.body)
        .map(ResponseBody::Json)
        .map_err(|e| match response.content_type.as_deref() {
            Some(content_type) if !content_type.contains("json") => ApiError::InvalidResponse(
                format!("Expected JSON but the server sent {}", content_type),
            ),
            _ => ApiError::InvalidResponse(format!("Failed to parse JSON response: {}", e)),
        })
}
