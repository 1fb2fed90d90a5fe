//! Session Context
//!
//! The single owner of process-wide session state: the persisted token and
//! profile, the activity-listener registration, the refresh throttle gate,
//! and the termination sequence. The API client and the session manager
//! share one context by `Arc`.
//!
//! Every write to the token slot happens under the session generation lock.
//! The generation is bumped whenever a session begins or ends, which lets
//! late responses recognise that the session they were issued for is gone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::domain::{
    keys, Clock, LogoutReason, Navigator, SessionStore, Subscription, UserProfile,
};
use crate::shared::error::StorageError;

/// Shared session state and the operations that mutate it.
pub struct SessionContext {
    store: Arc<dyn SessionStore>,
    clock: Arc<dyn Clock>,
    navigator: Arc<dyn Navigator>,
    generation: Mutex<u64>,
    listeners: Mutex<Option<Subscription>>,
    refresh_gate_closed: AtomicBool,
    refresh_in_flight: AtomicBool,
    terminated: AtomicBool,
}

impl SessionContext {
    pub fn new(
        store: Arc<dyn SessionStore>,
        clock: Arc<dyn Clock>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            store,
            clock,
            navigator,
            generation: Mutex::new(0),
            listeners: Mutex::new(None),
            refresh_gate_closed: AtomicBool::new(false),
            refresh_in_flight: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
        }
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    // --- Token and profile ---

    /// Current bearer token. Unreadable storage reads as no token.
    pub fn token(&self) -> Option<String> {
        self.read(keys::TOKEN)
    }

    /// Current session generation together with its token.
    pub fn credentials(&self) -> (u64, Option<String>) {
        let generation = self.generation.lock();
        (*generation, self.token())
    }

    pub fn generation(&self) -> u64 {
        *self.generation.lock()
    }

    /// Cached profile of the signed-in account.
    pub fn profile(&self) -> Option<UserProfile> {
        let raw = self.read(keys::USER)?;
        match serde_json::from_str(&raw) {
            Ok(profile) => Some(profile),
            Err(e) => {
                warn!(error = %e, "Cached profile is unreadable");
                None
            }
        }
    }

    /// Start a new session with `token` and `profile`.
    ///
    /// Either both are stored or neither is. Returns the new generation.
    pub fn begin_session(&self, token: &str, profile: &UserProfile) -> Result<u64, StorageError> {
        let serialized = serde_json::to_string(profile)?;

        let mut generation = self.generation.lock();
        self.store.set(keys::TOKEN, token)?;
        if let Err(e) = self.store.set(keys::USER, &serialized) {
            self.remove_logged(keys::TOKEN);
            return Err(e);
        }

        *generation += 1;
        self.terminated.store(false, Ordering::SeqCst);
        debug!(generation = *generation, "Session started");
        Ok(*generation)
    }

    /// Overwrite the token if the session is still `expected_generation`.
    ///
    /// Returns `false` when the session ended or was replaced meanwhile.
    pub fn replace_token(&self, expected_generation: u64, token: &str) -> Result<bool, StorageError> {
        let generation = self.generation.lock();
        if *generation != expected_generation {
            return Ok(false);
        }
        self.store.set(keys::TOKEN, token)?;
        Ok(true)
    }

    /// Apply `update` to the cached profile, if there is one.
    pub fn update_profile(&self, update: impl FnOnce(&mut UserProfile)) -> Result<bool, StorageError> {
        let _generation = self.generation.lock();
        let Some(mut profile) = self.profile() else {
            return Ok(false);
        };
        update(&mut profile);
        self.store.set(keys::USER, &serde_json::to_string(&profile)?)?;
        Ok(true)
    }

    /// End the session locally: deregister listeners and clear token and
    /// profile. No logout reason, no navigation.
    pub fn end_session(&self) {
        let mut generation = self.generation.lock();
        self.end_locked(&mut generation);
    }

    /// [`end_session`](Self::end_session) for session `expected_generation`
    /// only; returns `false` and leaves state alone if it was replaced.
    pub fn end_session_if(&self, expected_generation: u64) -> bool {
        let mut generation = self.generation.lock();
        if *generation != expected_generation {
            debug!(
                expected = expected_generation,
                current = *generation,
                "Session end skipped: session already replaced"
            );
            return false;
        }
        self.end_locked(&mut generation);
        true
    }

    fn end_locked(&self, generation: &mut u64) {
        *generation += 1;
        self.deregister_listeners();
        self.clear_credentials();
        debug!(generation = *generation, "Session ended");
    }

    /// Forced logout of session `expected_generation`.
    ///
    /// Deregisters listeners, clears token and profile, records `reason`,
    /// then redirects to login, in that order. Runs at most once per
    /// session; returns `false` if that session already ended.
    pub fn terminate(&self, expected_generation: u64, reason: LogoutReason) -> bool {
        let mut generation = self.generation.lock();
        if *generation != expected_generation {
            debug!(
                expected = expected_generation,
                current = *generation,
                "Termination skipped: session already ended"
            );
            return false;
        }
        *generation += 1;
        self.terminated.store(true, Ordering::SeqCst);

        self.deregister_listeners();
        self.clear_credentials();
        if let Err(e) = self.store.set(keys::LOGOUT_REASON, reason.as_str()) {
            warn!(error = %e, "Failed to record logout reason");
        }
        drop(generation);

        info!(%reason, "Session terminated, redirecting to login");
        self.navigator.redirect_to_login();
        true
    }

    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::SeqCst)
    }

    // --- Logout reason ---

    /// Reason for the last forced logout, without consuming it.
    pub fn logout_reason(&self) -> Option<LogoutReason> {
        self.read(keys::LOGOUT_REASON)
            .as_deref()
            .and_then(LogoutReason::from_str)
    }

    /// Read and clear the reason for the last forced logout.
    pub fn take_logout_reason(&self) -> Option<LogoutReason> {
        let reason = self.logout_reason();
        if reason.is_some() {
            self.remove_logged(keys::LOGOUT_REASON);
        }
        reason
    }

    // --- Activity listeners ---

    /// Install the subscription produced by `subscribe` unless one is
    /// already installed. The check and the install happen under one lock.
    pub fn register_listeners(&self, subscribe: impl FnOnce() -> Subscription) -> bool {
        let mut listeners = self.listeners.lock();
        if listeners.is_some() {
            return false;
        }
        *listeners = Some(subscribe());
        true
    }

    /// [`register_listeners`](Self::register_listeners) on behalf of session
    /// `expected_generation`. Nothing is installed if that session has ended
    /// or lost its token; the check holds the generation lock through the
    /// install so a concurrent termination cannot slip in between.
    pub fn register_listeners_for(
        &self,
        expected_generation: u64,
        subscribe: impl FnOnce() -> Subscription,
    ) -> bool {
        let generation = self.generation.lock();
        if *generation != expected_generation || self.token().is_none() {
            return false;
        }
        self.register_listeners(subscribe)
    }

    /// Dispose the installed subscription, if any.
    pub fn deregister_listeners(&self) -> bool {
        let subscription = self.listeners.lock().take();
        match subscription {
            Some(subscription) => {
                subscription.dispose();
                true
            }
            None => false,
        }
    }

    pub fn listeners_registered(&self) -> bool {
        self.listeners.lock().is_some()
    }

    // --- Refresh throttle gate ---

    /// Close the gate; `false` if it was already closed.
    pub fn try_close_refresh_gate(&self) -> bool {
        self.refresh_gate_closed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
    }

    pub fn open_refresh_gate(&self) {
        self.refresh_gate_closed.store(false, Ordering::SeqCst);
    }

    pub fn refresh_gate_closed(&self) -> bool {
        self.refresh_gate_closed.load(Ordering::SeqCst)
    }

    pub fn set_refresh_in_flight(&self, in_flight: bool) {
        self.refresh_in_flight.store(in_flight, Ordering::SeqCst);
    }

    pub fn refresh_in_flight(&self) -> bool {
        self.refresh_in_flight.load(Ordering::SeqCst)
    }

    // --- Storage helpers ---

    fn read(&self, key: &str) -> Option<String> {
        match self.store.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!(key, error = %e, "Session storage read failed");
                None
            }
        }
    }

    fn remove_logged(&self, key: &str) {
        if let Err(e) = self.store.remove(key) {
            warn!(key, error = %e, "Session storage delete failed");
        }
    }

    fn clear_credentials(&self) {
        self.remove_logged(keys::TOKEN);
        self.remove_logged(keys::USER);
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("generation", &*self.generation.lock())
            .field("listeners_registered", &self.listeners_registered())
            .field("refresh_gate_closed", &self.refresh_gate_closed())
            .field("terminated", &self.is_terminated())
            .finish()
    }
}
