//! Response DTOs
//!
//! Data structures for API response bodies.

use serde::Deserialize;

use crate::domain::{Role, UserProfile};

/// Login response: token plus the profile of the signed-in account
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user_id: i64,
    pub email: String,
    pub full_name: String,
    pub role: Role,
    #[serde(default)]
    pub organization_role: Option<String>,
    #[serde(default)]
    pub organization_id: Option<i64>,
    #[serde(default)]
    pub admin_id: Option<i64>,
}

impl LoginResponse {
    /// Profile to cache beside the token.
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            user_id: self.user_id,
            email: self.email.clone(),
            full_name: self.full_name.clone(),
            role: self.role,
            organization_role: self.organization_role.clone(),
            organization_id: self.organization_id,
            admin_id: self.admin_id,
        }
    }
}

/// Session refresh response
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshSessionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub access_token: Option<String>,
}

impl RefreshSessionResponse {
    /// The newly issued token, if the server actually issued one.
    pub fn issued_token(&self) -> Option<&str> {
        match (&self.success, &self.access_token) {
            (true, Some(token)) if !token.is_empty() => Some(token.as_str()),
            _ => None,
        }
    }
}

/// Generic `{ "message": ... }` success payload
#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

/// Current profile as reported by the server
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileResponse {
    pub user_id: i64,
    pub email: String,
    pub full_name: String,
    pub role: String,
    #[serde(default)]
    pub organization_id: Option<i64>,
    #[serde(default)]
    pub admin_id: Option<i64>,
    #[serde(default)]
    pub created_at: Option<String>,
}

/// Uploaded document metadata
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DocumentResponse {
    pub id: String,
    pub filename: String,
    pub original_filename: String,
    pub file_type: String,
    pub file_size: i64,
    #[serde(default)]
    pub file_path: Option<String>,
    pub processed: bool,
    #[serde(default)]
    pub chunk_count: i64,
    #[serde(default)]
    pub content_preview: Option<String>,
    pub uploaded_at: f64,
}

/// Answer to a chat question, with the retrieval context it was built from
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: i64,
    pub message_id: i64,
    #[serde(default)]
    pub sources: Vec<serde_json::Value>,
    #[serde(default)]
    pub confidence: f64,
    #[serde(default)]
    pub chunks_found: i64,
}

/// Acknowledgement of a stored feedback entry
#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackSubmittedResponse {
    #[serde(default)]
    pub message: String,
    pub feedback_id: i64,
}

/// Feedback previously submitted by the signed-in user
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FeedbackResponse {
    pub feedback_id: i64,
    pub user_id: i64,
    #[serde(default)]
    pub organization_id: Option<i64>,
    pub session_id: i64,
    pub message_id: i64,
    pub user_message: String,
    pub bot_response: String,
    pub rating: u8,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub user_role: Option<String>,
}

/// Chat conversation summary
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatSessionResponse {
    pub session_id: i64,
    pub title: String,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
    #[serde(default)]
    pub message_count: i64,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatMessageResponse {
    pub message_id: i64,
    pub session_id: i64,
    pub role: String,
    pub content: String,
    #[serde(default)]
    pub timestamp: Option<String>,
    pub message_order: i64,
}

/// One conversation with its messages in order
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ChatHistoryResponse {
    pub session: ChatSessionResponse,
    pub messages: Vec<ChatMessageResponse>,
}
