//! Navigation side effect of a forced logout.

/// Sends the UI back to the login view.
///
/// Implementations are fire-and-forget: they must not fail and must not
/// call back into the session.
pub trait Navigator: Send + Sync {
    /// Reload the client onto the login view.
    fn redirect_to_login(&self);
}
