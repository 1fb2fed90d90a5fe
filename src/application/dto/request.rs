//! Request DTOs
//!
//! Data structures for API request bodies.

use serde::Serialize;
use validator::Validate;

/// Login request
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// First-time password setup for an invited admin or user
#[derive(Debug, Clone, Serialize, Validate)]
pub struct SetPasswordRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Change password request
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ChangePasswordRequest {
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,

    #[validate(length(min = 8, message = "New password must be at least 8 characters"))]
    pub new_password: String,
}

/// Update profile request
#[derive(Debug, Clone, Serialize, Validate)]
pub struct UpdateProfileRequest {
    #[validate(length(min = 1, max = 100, message = "Full name must be 1-100 characters"))]
    pub full_name: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,
}

/// Chat question; `session_id` continues an existing conversation
#[derive(Debug, Clone, Serialize, Validate)]
pub struct ChatRequest {
    #[validate(length(min = 1, message = "Message is required"))]
    pub message: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<i64>,
}

/// Rating of one chatbot answer
#[derive(Debug, Clone, Serialize, Validate)]
pub struct FeedbackRequest {
    pub session_id: i64,
    pub message_id: i64,

    #[validate(length(min = 1, message = "User message is required"))]
    pub user_message: String,

    #[validate(length(min = 1, message = "Bot response is required"))]
    pub bot_response: String,

    #[validate(range(min = 1, max = 5, message = "Rating must be between 1 and 5"))]
    pub rating: u8,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}
