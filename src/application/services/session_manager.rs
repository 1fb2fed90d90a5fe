//! Session Lifecycle Manager
//!
//! Keeps the bearer token fresh while the user is active and ends the
//! session promptly, and once, when it is no longer valid.
//!
//! ```text
//! NoSession --login--> Active --activity--> Expiring --ok--> Active
//!                        |                      |
//!                        +--expired / 401 ------+--> Terminated
//! ```
//!
//! Timers run on the tokio runtime: the expiry watch ticks every
//! `expiry_check_interval`, the refresh gate reopens `refresh_cooldown`
//! after each attempt, and listeners attach
//! `listener_registration_delay` after login.

use std::sync::{Arc, Weak};

use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{interval, sleep, MissedTickBehavior};
use tracing::{debug, info, instrument, warn};
use validator::Validate;

use crate::application::dto::LoginRequest;
use crate::application::services::{ApiClient, SessionContext};
use crate::config::SessionSettings;
use crate::domain::{
    ActivityHandler, ActivityKind, ActivitySource, Claims, ExpiryCheck, LogoutReason,
    RefreshOutcome, SessionState, Subscription, UserProfile,
};
use crate::shared::error::ApiError;
use crate::shared::validation::validation_error;

/// Drives the session state machine.
pub struct SessionManager {
    ctx: Arc<SessionContext>,
    api: Arc<ApiClient>,
    activity: Arc<dyn ActivitySource>,
    settings: SessionSettings,
    visibility: Arc<Notify>,
    this: Weak<SessionManager>,
}

impl SessionManager {
    pub fn new(
        api: Arc<ApiClient>,
        activity: Arc<dyn ActivitySource>,
        settings: SessionSettings,
    ) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            ctx: Arc::clone(api.context()),
            api,
            activity,
            settings,
            visibility: Arc::new(Notify::new()),
            this: this.clone(),
        })
    }

    pub fn context(&self) -> &Arc<SessionContext> {
        &self.ctx
    }

    /// Current lifecycle state.
    ///
    /// `Active` covers the short window after login before listeners attach.
    pub fn state(&self) -> SessionState {
        if self.ctx.is_terminated() {
            return SessionState::Terminated;
        }
        if self.ctx.token().is_none() {
            return SessionState::NoSession;
        }
        if self.ctx.refresh_in_flight() {
            return SessionState::Expiring;
        }
        SessionState::Active
    }

    /// Resume whatever session persisted storage holds.
    ///
    /// An expired token is terminated, an undecodable one is cleared, and a
    /// valid one gets its activity listeners immediately.
    #[instrument(skip(self))]
    pub fn bootstrap(&self) -> SessionState {
        if self.check_expiry() == ExpiryCheck::Valid {
            info!("Resuming stored session");
            self.register_activity_listeners();
        }
        self.state()
    }

    /// Compare the token's expiry with the clock; no network involved.
    pub fn check_expiry(&self) -> ExpiryCheck {
        let (generation, token) = self.ctx.credentials();
        let Some(token) = token else {
            return ExpiryCheck::NoSession;
        };

        match Claims::decode(&token) {
            Err(e) => {
                // Corruption or tampering, not a timeout: no expiry notice
                warn!(error = %e, "Stored token is undecodable, clearing credentials");
                self.ctx.end_session_if(generation);
                ExpiryCheck::Malformed
            }
            Ok(claims) if claims.is_expired_at(self.ctx.now()) => {
                info!(expired_at = ?claims.expires_at(), "Token expired");
                self.ctx.terminate(generation, LogoutReason::SessionExpired);
                ExpiryCheck::Expired
            }
            Ok(_) => ExpiryCheck::Valid,
        }
    }

    /// Run [`check_expiry`](Self::check_expiry) every
    /// `expiry_check_interval` and whenever visibility is regained.
    ///
    /// The task runs until aborted; checks against a cleared session are
    /// no-ops.
    pub fn spawn_expiry_watch(&self) -> JoinHandle<()> {
        let this = self.this.clone();
        let visibility = Arc::clone(&self.visibility);
        let period = self.settings.expiry_check_interval();

        tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = visibility.notified() => {
                        debug!("Visibility regained");
                    }
                }
                let Some(manager) = this.upgrade() else {
                    debug!("Session manager dropped, stopping expiry watch");
                    return;
                };
                manager.check_expiry();
            }
        })
    }

    /// Signal that the UI became visible again.
    pub fn on_visibility_regained(&self) {
        self.visibility.notify_one();
    }

    // --- Activity listeners ---

    /// Attach one shared handler to every activity signal. Idempotent.
    pub fn register_activity_listeners(&self) -> bool {
        let registered = self.ctx.register_listeners(|| self.subscribe_activity());
        if registered {
            info!("Activity listeners registered");
        }
        registered
    }

    /// Attach the handler only while session `generation` is still live.
    fn register_activity_listeners_for(&self, generation: u64) -> bool {
        let registered = self
            .ctx
            .register_listeners_for(generation, || self.subscribe_activity());
        if registered {
            info!(generation, "Activity listeners registered");
        } else {
            debug!(generation, "Listener registration skipped");
        }
        registered
    }

    fn subscribe_activity(&self) -> Subscription {
        self.activity
            .subscribe(&ActivityKind::ALL, self.activity_handler())
    }

    /// Detach the activity handler. Idempotent.
    pub fn deregister_activity_listeners(&self) -> bool {
        let removed = self.ctx.deregister_listeners();
        if removed {
            info!("Activity listeners removed");
        }
        removed
    }

    pub fn listeners_registered(&self) -> bool {
        self.ctx.listeners_registered()
    }

    fn activity_handler(&self) -> ActivityHandler {
        let this = self.this.clone();
        Arc::new(move |kind: ActivityKind| {
            let Some(manager) = this.upgrade() else {
                return;
            };
            if manager.ctx.refresh_gate_closed() {
                return;
            }
            match tokio::runtime::Handle::try_current() {
                Ok(handle) => {
                    handle.spawn(async move {
                        let outcome = manager.refresh_on_activity().await;
                        debug!(%kind, ?outcome, "Activity handled");
                    });
                }
                Err(_) => warn!(%kind, "Activity outside the runtime ignored"),
            }
        })
    }

    /// Refresh the session in response to user activity.
    ///
    /// At most one attempt per cooldown window: the gate is closed
    /// synchronously before the first suspension point and reopens
    /// `refresh_cooldown` after the attempt. A failed refresh is not acted
    /// on here; the API client's interceptor owns that reaction.
    pub async fn refresh_on_activity(&self) -> RefreshOutcome {
        if !self.ctx.try_close_refresh_gate() {
            return RefreshOutcome::Throttled;
        }

        let (generation, token) = self.ctx.credentials();
        let Some(token) = token else {
            self.deregister_activity_listeners();
            self.ctx.open_refresh_gate();
            return RefreshOutcome::NoSession;
        };

        match Claims::decode(&token) {
            Ok(claims) if !claims.is_expired_at(self.ctx.now()) => {}
            _ => {
                // Expiry watch handles expired and malformed tokens
                self.ctx.open_refresh_gate();
                return RefreshOutcome::Skipped;
            }
        }

        self.ctx.set_refresh_in_flight(true);
        debug!("Refreshing session");
        let result = self.api.refresh_session().await;
        self.ctx.set_refresh_in_flight(false);

        let outcome = match result {
            Ok(response) => match response.issued_token() {
                Some(new_token) => match self.ctx.replace_token(generation, new_token) {
                    Ok(true) => {
                        info!("Session refreshed");
                        RefreshOutcome::Refreshed
                    }
                    Ok(false) => {
                        debug!("Session changed during refresh, discarding token");
                        RefreshOutcome::Superseded
                    }
                    Err(e) => {
                        warn!(error = %e, "Could not store refreshed token");
                        RefreshOutcome::Failed
                    }
                },
                None => {
                    warn!("Refresh response carried no token");
                    RefreshOutcome::Failed
                }
            },
            Err(e) => {
                debug!(error = %e, "Session refresh failed");
                RefreshOutcome::Failed
            }
        };

        self.schedule_gate_reopen();
        outcome
    }

    fn schedule_gate_reopen(&self) {
        let ctx = Arc::clone(&self.ctx);
        let cooldown = self.settings.refresh_cooldown();
        tokio::spawn(async move {
            sleep(cooldown).await;
            ctx.open_refresh_gate();
        });
    }

    // --- Login / logout ---

    /// Authenticate, persist the session, and return the profile.
    ///
    /// Nothing is persisted on failure. Activity listeners attach after
    /// `listener_registration_delay`.
    #[instrument(skip(self, password))]
    pub async fn login(&self, email: &str, password: &str) -> Result<UserProfile, ApiError> {
        let request = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        request.validate().map_err(validation_error)?;

        let response = self.api.login(&request).await?;
        let profile = response.profile();
        let generation = self.ctx.begin_session(&response.access_token, &profile)?;
        info!(role = %profile.role, user_id = profile.user_id, "Logged in");

        self.schedule_listener_registration(generation);
        Ok(profile)
    }

    fn schedule_listener_registration(&self, generation: u64) {
        let this = self.this.clone();
        let delay = self.settings.listener_registration_delay();
        tokio::spawn(async move {
            sleep(delay).await;
            let Some(manager) = this.upgrade() else {
                return;
            };
            // The session may have ended during the delay
            manager.register_activity_listeners_for(generation);
        });
    }

    /// Log out: notify the server best-effort, then clear local state.
    ///
    /// Local teardown runs even if the server call fails, panics, or the
    /// future is dropped mid-flight.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let _teardown = Teardown { ctx: &self.ctx };

        if self.ctx.token().is_some() {
            if let Err(e) = self.api.logout().await {
                debug!(error = %e, "Server logout failed, clearing locally anyway");
            }
        }
        info!("Logged out");
    }
}

/// Ends the session when dropped.
struct Teardown<'a> {
    ctx: &'a SessionContext,
}

impl Drop for Teardown<'_> {
    fn drop(&mut self) {
        self.ctx.end_session();
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("state", &self.state())
            .field("settings", &self.settings)
            .finish()
    }
}
