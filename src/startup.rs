//! Application Startup
//!
//! Wiring of adapters into the session services, and the console loop the
//! runner binary drives.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::application::services::{ApiClient, SessionContext, SessionManager};
use crate::config::Settings;
use crate::domain::{ActivityKind, SessionState};
use crate::infrastructure::{
    open_store, ActivityBus, ChannelNavigator, LoginRedirect, ReqwestTransport, SystemClock,
};

/// Login credentials for the console runner.
#[derive(Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Console command read from one input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsoleInput {
    /// Any other line counts as a keypress
    KeyPress,
    /// `visible`: the window regained visibility
    Visible,
    /// `logout`: explicit logout
    Logout,
}

impl ConsoleInput {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "visible" => Self::Visible,
            "logout" => Self::Logout,
            _ => Self::KeyPress,
        }
    }
}

/// Why the console loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// Session was terminated and the navigator asked for the login view
    Redirected,
    /// The user asked to log out
    LoggedOut,
    /// Input closed
    EndOfInput,
}

/// Fully wired console instance
pub struct Console {
    manager: Arc<SessionManager>,
    activity: ActivityBus,
    redirects: mpsc::UnboundedReceiver<LoginRedirect>,
}

impl Console {
    /// Build the console from settings
    pub fn build(settings: Settings) -> Result<Self> {
        let store = open_store(&settings.storage).context("Failed to open session storage")?;
        info!(persistent = settings.storage.path.is_some(), "Session storage ready");

        let (navigator, redirects) = ChannelNavigator::channel();
        let ctx = Arc::new(SessionContext::new(
            store,
            Arc::new(SystemClock),
            Arc::new(navigator),
        ));

        let transport =
            ReqwestTransport::new(&settings.api).context("Failed to build HTTP client")?;
        info!(base_url = %settings.api.base_url, "HTTP client ready");

        let api = Arc::new(ApiClient::new(Arc::new(transport), ctx, &settings.api));
        let activity = ActivityBus::new();
        let manager = SessionManager::new(api, Arc::new(activity.clone()), settings.session);

        Ok(Self::new(manager, activity, redirects))
    }

    /// Assemble a console from already wired parts.
    pub fn new(
        manager: Arc<SessionManager>,
        activity: ActivityBus,
        redirects: mpsc::UnboundedReceiver<LoginRedirect>,
    ) -> Self {
        Self {
            manager,
            activity,
            redirects,
        }
    }

    pub fn manager(&self) -> &Arc<SessionManager> {
        &self.manager
    }

    /// Resume or start a session, then feed `input` lines as activity until
    /// the session ends.
    pub async fn run_until_stopped<R>(
        mut self,
        credentials: Option<Credentials>,
        input: R,
    ) -> Result<StopReason>
    where
        R: AsyncBufRead + Unpin,
    {
        if self.manager.bootstrap() == SessionState::NoSession {
            if let Some(reason) = self.manager.context().take_logout_reason() {
                warn!("{}", reason.notice());
            }
            let credentials = credentials.context("No stored session and no credentials given")?;
            let profile = self
                .manager
                .login(&credentials.email, &credentials.password)
                .await
                .map_err(|e| anyhow::anyhow!("Login failed: {}", e))?;
            info!(home = profile.role.home_view(), "Session started");
        }

        let watch = self.manager.spawn_expiry_watch();
        let mut lines = input.lines();
        let reason = loop {
            tokio::select! {
                _ = self.redirects.recv() => break StopReason::Redirected,
                line = lines.next_line() => match line.context("Failed to read input")? {
                    Some(line) => match ConsoleInput::parse(&line) {
                        ConsoleInput::KeyPress => {
                            self.activity.emit(ActivityKind::KeyPress);
                        }
                        ConsoleInput::Visible => self.manager.on_visibility_regained(),
                        ConsoleInput::Logout => break StopReason::LoggedOut,
                    },
                    None => break StopReason::EndOfInput,
                },
            }
        };

        watch.abort();
        match reason {
            StopReason::Redirected => {
                if let Some(reason) = self.manager.context().take_logout_reason() {
                    warn!("{}", reason.notice());
                }
            }
            StopReason::LoggedOut | StopReason::EndOfInput => self.manager.logout().await,
        }

        info!(?reason, "Console stopped");
        Ok(reason)
    }
}
