//! Navigator adapters.

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::domain::Navigator;

/// Request to show the login view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoginRedirect;

/// Navigator that hands redirects to the UI loop over a channel.
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<LoginRedirect>,
}

impl ChannelNavigator {
    /// Create the navigator and the receiver the UI loop listens on.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<LoginRedirect>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn redirect_to_login(&self) {
        if self.tx.send(LoginRedirect).is_err() {
            warn!("Login redirect dropped: UI loop is gone");
        } else {
            debug!("Login redirect queued");
        }
    }
}
