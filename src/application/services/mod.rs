//! Application Services
//!
//! ## Available Services
//!
//! - **SessionContext**: Shared token/profile slots, listener registration, termination
//! - **ApiClient**: REST calls with bearer attachment and the 401/403 interceptor
//! - **SessionManager**: Expiry watch, activity-driven refresh, login and logout

pub mod api_client;
pub mod session_context;
pub mod session_manager;

pub use api_client::{paths, ApiClient};
pub use session_context::SessionContext;
pub use session_manager::SessionManager;
