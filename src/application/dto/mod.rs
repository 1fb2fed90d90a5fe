//! Data Transfer Objects
//!
//! DTOs for API request/response serialization.

pub mod request;
pub mod response;

pub use request::{
    ChangePasswordRequest, ChatRequest, FeedbackRequest, LoginRequest, SetPasswordRequest,
    UpdateProfileRequest,
};
pub use response::{
    ChatHistoryResponse, ChatMessageResponse, ChatResponse, ChatSessionResponse, DocumentResponse,
    FeedbackResponse, FeedbackSubmittedResponse, LoginResponse, MessageResponse, ProfileResponse,
    RefreshSessionResponse,
};
