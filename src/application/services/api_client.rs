//! API Client
//!
//! The single outbound path to the REST API. Every request carries the
//! current bearer token when there is one, and every response passes the
//! authorization interceptor: a 401/403 on an authenticated endpoint forces
//! logout of the session the request was sent under.
//!
//! Failures reach callers as an [`ApiError`] holding one display-ready
//! message, whatever shape the server's error body had.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, instrument, warn};
use validator::Validate;

use crate::application::dto::{
    ChangePasswordRequest, ChatHistoryResponse, ChatRequest, ChatResponse, ChatSessionResponse,
    DocumentResponse, FeedbackRequest, FeedbackResponse, FeedbackSubmittedResponse, LoginRequest,
    LoginResponse, MessageResponse, ProfileResponse, RefreshSessionResponse, SetPasswordRequest,
    UpdateProfileRequest,
};
use crate::application::services::SessionContext;
use crate::config::ApiSettings;
use crate::domain::{ApiRequest, LogoutReason, Transport, TransportError};
use crate::shared::error::{
    ApiError, NETWORK_ERROR_MESSAGE, SESSION_EXPIRED_MESSAGE, TIMEOUT_ERROR_MESSAGE,
};
use crate::shared::validation::{parse_error_body, validation_error, ParsedError};

/// Endpoint paths, relative to the API base URL.
pub mod paths {
    pub const LOGIN: &str = "/auth/login";
    pub const REFRESH_SESSION: &str = "/auth/refresh-session";
    pub const LOGOUT: &str = "/auth/logout";
    pub const SET_PASSWORD: &str = "/auth/set-password";
    pub const CHANGE_PASSWORD: &str = "/auth/change-password";
    pub const PROFILE: &str = "/auth/profile";
    pub const DOCUMENTS: &str = "/documents";
    pub const DOCUMENT_UPLOAD: &str = "/documents/upload";
    pub const CHAT: &str = "/chat";
    pub const FEEDBACK_SUBMIT: &str = "/feedback/submit";
    pub const MY_FEEDBACK: &str = "/feedback/my-feedback";
    pub const CHAT_SESSIONS: &str = "/chat-history/sessions";

    pub fn document(id: &str) -> String {
        format!("{}/{}", DOCUMENTS, id)
    }

    pub fn chat_session(id: i64) -> String {
        format!("{}/{}", CHAT_SESSIONS, id)
    }
}

/// Endpoints whose 401/403 must not force logout.
///
/// A failed refresh is left to the next protected call so that
/// refresh-fails/logout/refresh-fails cannot loop.
const INTERCEPTOR_EXEMPT: [&str; 1] = [paths::REFRESH_SESSION];

/// Whether the request may attach the bearer token and trigger the
/// authorization interceptor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Access {
    /// Credential endpoints: no bearer, rejections are business errors
    Public,
    Authenticated,
}

/// Client for the RAG console REST API.
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    ctx: Arc<SessionContext>,
    request_timeout: Duration,
    upload_timeout: Duration,
}

impl ApiClient {
    pub fn new(transport: Arc<dyn Transport>, ctx: Arc<SessionContext>, settings: &ApiSettings) -> Self {
        Self {
            transport,
            ctx,
            request_timeout: settings.request_timeout(),
            upload_timeout: settings.upload_timeout(),
        }
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.ctx
    }

    /// Send an authenticated request and return the raw 2xx body.
    ///
    /// `fallback` is the message used when a failure carries none.
    pub async fn send(&self, request: ApiRequest, fallback: &str) -> Result<String, ApiError> {
        self.dispatch(request, Access::Authenticated, fallback).await
    }

    /// Send an authenticated request and decode the 2xx body as JSON.
    pub async fn send_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        fallback: &str,
    ) -> Result<T, ApiError> {
        let body = self.send(request, fallback).await?;
        decode_body(&body)
    }

    #[instrument(skip_all, fields(method = %request.method, path = %request.path))]
    async fn dispatch(
        &self,
        mut request: ApiRequest,
        access: Access,
        fallback: &str,
    ) -> Result<String, ApiError> {
        let (generation, token) = self.ctx.credentials();
        let bearer = match (access, token) {
            (Access::Authenticated, Some(token)) => Some(token),
            _ => None,
        };
        let bearer_sent = bearer.is_some();
        if let Some(token) = bearer {
            request = request.with_header("Authorization", format!("Bearer {}", token));
        }
        let path = request.path.clone();

        let response = match self.transport.execute(request).await {
            Ok(response) => response,
            Err(TransportError::Timeout) => {
                warn!("Request timed out");
                return Err(ApiError::Timeout(TIMEOUT_ERROR_MESSAGE.into()));
            }
            Err(TransportError::Network(e)) => {
                warn!(error = %e, "Request failed without a response");
                return Err(ApiError::Network(NETWORK_ERROR_MESSAGE.into()));
            }
        };

        if response.is_success() {
            debug!(status = response.status, "Request succeeded");
            return Ok(response.body);
        }

        let status = response.status;
        if (status == 401 || status == 403) && !INTERCEPTOR_EXEMPT.contains(&path.as_str()) {
            if bearer_sent {
                warn!(status, %path, "Authorization rejected, forcing logout");
                self.ctx.terminate(generation, LogoutReason::SessionExpired);
                return Err(ApiError::Unauthorized(SESSION_EXPIRED_MESSAGE.into()));
            }
            if access == Access::Authenticated {
                // No session to end
                debug!(status, %path, "Unauthenticated request rejected");
                return Err(ApiError::Unauthorized(SESSION_EXPIRED_MESSAGE.into()));
            }
        }

        debug!(status, "Request rejected");
        Err(match parse_error_body(&response.body) {
            ParsedError::Validation(message) => ApiError::Validation(message),
            ParsedError::Message(message) => ApiError::Server { status, message },
            ParsedError::Unknown => ApiError::Server {
                status,
                message: fallback.to_string(),
            },
        })
    }

    fn json_request<B: Serialize>(&self, request: ApiRequest, body: &B) -> Result<ApiRequest, ApiError> {
        let value = serde_json::to_value(body)
            .map_err(|e| ApiError::Decode(format!("Could not encode request: {}", e)))?;
        Ok(request.json(value).timeout(self.request_timeout))
    }

    // --- Authentication ---

    /// POST /auth/login
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let request = self.json_request(ApiRequest::post(paths::LOGIN), request)?;
        let body = self.dispatch(request, Access::Public, "Login failed").await?;
        decode_body(&body)
    }

    /// POST /auth/refresh-session
    pub async fn refresh_session(&self) -> Result<RefreshSessionResponse, ApiError> {
        let request = ApiRequest::post(paths::REFRESH_SESSION).timeout(self.request_timeout);
        self.send_json(request, "Failed to refresh session").await
    }

    /// POST /auth/logout
    pub async fn logout(&self) -> Result<(), ApiError> {
        let request = ApiRequest::post(paths::LOGOUT).timeout(self.request_timeout);
        self.send(request, "Logout failed").await.map(|_| ())
    }

    /// POST /auth/set-password, first-time setup before any session exists
    pub async fn set_password(&self, request: &SetPasswordRequest) -> Result<String, ApiError> {
        let request = self.json_request(ApiRequest::post(paths::SET_PASSWORD), request)?;
        let body = self
            .dispatch(request, Access::Public, "Failed to set password")
            .await?;
        Ok(decode_message(&body, "Password set successfully"))
    }

    /// POST /auth/change-password
    pub async fn change_password(&self, request: &ChangePasswordRequest) -> Result<String, ApiError> {
        let request = self.json_request(ApiRequest::post(paths::CHANGE_PASSWORD), request)?;
        let body = self.send(request, "Failed to change password").await?;
        Ok(decode_message(&body, "Password changed successfully"))
    }

    /// GET /auth/profile
    pub async fn get_profile(&self) -> Result<ProfileResponse, ApiError> {
        let request = ApiRequest::get(paths::PROFILE).timeout(self.request_timeout);
        self.send_json(request, "Failed to load profile").await
    }

    /// PUT /auth/profile; keeps the cached profile in step on success.
    pub async fn update_profile(&self, request: &UpdateProfileRequest) -> Result<String, ApiError> {
        let http = self.json_request(ApiRequest::put(paths::PROFILE), request)?;
        let body = self.send(http, "Failed to update profile").await?;

        self.ctx.update_profile(|profile| {
            profile.full_name = request.full_name.clone();
            profile.email = request.email.clone();
        })?;

        Ok(decode_message(&body, "Profile updated successfully"))
    }

    // --- Documents ---

    /// GET /documents
    pub async fn list_documents(&self) -> Result<Vec<DocumentResponse>, ApiError> {
        let request = ApiRequest::get(paths::DOCUMENTS).timeout(self.request_timeout);
        self.send_json(request, "Failed to load documents").await
    }

    /// POST /documents/upload as multipart, with the extended upload budget.
    pub async fn upload_document(
        &self,
        filename: &str,
        bytes: Vec<u8>,
    ) -> Result<DocumentResponse, ApiError> {
        let request = ApiRequest::post(paths::DOCUMENT_UPLOAD)
            .file("file", filename, bytes)
            .timeout(self.upload_timeout);
        self.send_json(request, "Failed to upload document").await
    }

    /// DELETE /documents/{id}
    pub async fn delete_document(&self, id: &str) -> Result<String, ApiError> {
        let request = ApiRequest::delete(paths::document(id)).timeout(self.request_timeout);
        let body = self.send(request, "Failed to delete document").await?;
        Ok(decode_message(&body, "Document deleted successfully"))
    }

    // --- Chat ---

    /// POST /chat
    pub async fn send_chat(&self, request: &ChatRequest) -> Result<ChatResponse, ApiError> {
        request.validate().map_err(validation_error)?;
        let request = self.json_request(ApiRequest::post(paths::CHAT), request)?;
        self.send_json(request, "Failed to get a response").await
    }

    /// GET /chat-history/sessions, most recent first
    pub async fn list_chat_sessions(&self) -> Result<Vec<ChatSessionResponse>, ApiError> {
        let request = ApiRequest::get(paths::CHAT_SESSIONS).timeout(self.request_timeout);
        self.send_json(request, "Failed to load chat history").await
    }

    /// GET /chat-history/sessions/{id}
    pub async fn chat_session_history(&self, id: i64) -> Result<ChatHistoryResponse, ApiError> {
        let request = ApiRequest::get(paths::chat_session(id)).timeout(self.request_timeout);
        self.send_json(request, "Failed to load conversation").await
    }

    /// DELETE /chat-history/sessions/{id}
    pub async fn delete_chat_session(&self, id: i64) -> Result<String, ApiError> {
        let request = ApiRequest::delete(paths::chat_session(id)).timeout(self.request_timeout);
        let body = self.send(request, "Failed to delete conversation").await?;
        Ok(decode_message(&body, "Chat session deleted successfully"))
    }

    // --- Feedback ---

    /// POST /feedback/submit, returning the new feedback id
    pub async fn submit_feedback(
        &self,
        request: &FeedbackRequest,
    ) -> Result<FeedbackSubmittedResponse, ApiError> {
        request.validate().map_err(validation_error)?;
        let request = self.json_request(ApiRequest::post(paths::FEEDBACK_SUBMIT), request)?;
        self.send_json(request, "Failed to submit feedback").await
    }

    /// GET /feedback/my-feedback, newest first
    pub async fn my_feedback(&self) -> Result<Vec<FeedbackResponse>, ApiError> {
        let request = ApiRequest::get(paths::MY_FEEDBACK).timeout(self.request_timeout);
        self.send_json(request, "Failed to load feedback").await
    }
}

fn decode_body<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    serde_json::from_str(body).map_err(|e| {
        warn!(error = %e, "Unexpected response body");
        ApiError::Decode("The server returned an unexpected response.".into())
    })
}

fn decode_message(body: &str, default: &str) -> String {
    serde_json::from_str::<MessageResponse>(body)
        .ok()
        .map(|r| r.message)
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| default.to_string())
}
