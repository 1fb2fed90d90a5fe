//! Session lifecycle state and persisted storage keys.

/// Keys used in persistent session storage.
pub mod keys {
    /// Current bearer token
    pub const TOKEN: &str = "token";
    /// Serialized [`UserProfile`](super::super::UserProfile)
    pub const USER: &str = "user";
    /// Reason for the last forced logout, read once by the login view
    pub const LOGOUT_REASON: &str = "logoutReason";
}

/// Lifecycle state of the session in this process.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No token present
    NoSession,
    /// Token present and not known to be expired
    Active,
    /// Token present, refresh call in flight
    Expiring,
    /// Forced out by expiry or an authorization failure; ends on next login
    Terminated,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NoSession => "no_session",
            Self::Active => "active",
            Self::Expiring => "expiring",
            Self::Terminated => "terminated",
        }
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reason recorded for the login view after a forced logout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutReason {
    SessionExpired,
}

impl LogoutReason {
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "session_expired" => Some(Self::SessionExpired),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SessionExpired => "session_expired",
        }
    }

    /// Notice shown once on the login view.
    pub fn notice(&self) -> &'static str {
        match self {
            Self::SessionExpired => "Your session expired. Please sign in again.",
        }
    }
}

impl std::fmt::Display for LogoutReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of one expiry check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryCheck {
    NoSession,
    Valid,
    /// Expired; forced termination ran
    Expired,
    /// Undecodable; credentials were cleared without a logout reason
    Malformed,
}

/// Result of one activity-triggered refresh attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Gate closed by a pending attempt or cooldown
    Throttled,
    /// No token; listeners were deregistered
    NoSession,
    /// Token expired or undecodable; server not contacted
    Skipped,
    /// New token stored
    Refreshed,
    /// Refresh call failed; left to the HTTP client's interceptor
    Failed,
    /// Session changed while the call was in flight; result discarded
    Superseded,
}
