//! Session Lifecycle Tests
//!
//! Expiry detection, activity-driven refresh, and listener bookkeeping on
//! tokio's paused clock.

use std::time::Duration;

use chrono::Utc;
use pretty_assertions::assert_eq;

use rag_console_client::domain::{
    keys, ActivityKind, ApiResponse, Claims, ExpiryCheck, LogoutReason, SessionState,
};
use rag_console_client::infrastructure::MemoryStore;

use crate::common::{
    advance_secs, mint_token, refresh_body, settle, Harness, RedirectSnapshot, Reply,
};

const REFRESH: &str = "/auth/refresh-session";

/// Token with `exp` 1000 s in the past is terminated on the first check
#[tokio::test(start_paused = true)]
async fn test_expired_token_is_terminated_before_redirect() {
    let token = mint_token(Utc::now().timestamp() - 1000);
    let harness = Harness::with_store(MemoryStore::with_entries([
        (keys::TOKEN, token.as_str()),
        (keys::USER, r#"{"user_id":7}"#),
    ]));

    let check = harness.manager.check_expiry();

    assert_eq!(check, ExpiryCheck::Expired);
    assert_eq!(
        harness.navigator.redirects(),
        vec![RedirectSnapshot {
            token: None,
            user: None,
            reason: Some("session_expired".into()),
        }]
    );
    assert_eq!(harness.manager.state(), SessionState::Terminated);
}

#[tokio::test(start_paused = true)]
async fn test_bootstrap_with_expired_token_registers_nothing() {
    let token = mint_token(Utc::now().timestamp() - 1000);
    let harness = Harness::with_store(MemoryStore::with_entries([(keys::TOKEN, token)]));

    let state = harness.manager.bootstrap();

    assert_eq!(state, SessionState::Terminated);
    assert_eq!(harness.activity.listener_count(), 0);
    assert_eq!(harness.navigator.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_bootstrap_with_valid_token_registers_listeners_immediately() {
    let token = mint_token(Utc::now().timestamp() + 600);
    let harness = Harness::with_store(MemoryStore::with_entries([(keys::TOKEN, token)]));

    let state = harness.manager.bootstrap();

    assert_eq!(state, SessionState::Active);
    assert_eq!(harness.activity.listener_count(), ActivityKind::ALL.len());
}

/// Unparsable token at startup: storage cleared, no listeners, no notice
#[tokio::test(start_paused = true)]
async fn test_malformed_token_at_startup_clears_storage_silently() {
    let harness = Harness::with_store(MemoryStore::with_entries([
        (keys::TOKEN, "definitely-not-a-jwt"),
        (keys::USER, r#"{"user_id":7}"#),
    ]));

    let state = harness.manager.bootstrap();

    assert_eq!(state, SessionState::NoSession);
    assert!(harness.store.is_empty());
    assert_eq!(harness.activity.listener_count(), 0);
    assert_eq!(harness.navigator.count(), 0);
    assert_eq!(harness.ctx().logout_reason(), None);
}

#[tokio::test(start_paused = true)]
async fn test_check_expiry_without_token_is_noop() {
    let harness = Harness::new();

    assert_eq!(harness.manager.check_expiry(), ExpiryCheck::NoSession);
    assert_eq!(harness.navigator.count(), 0);
}

/// `login` then decode of the stored token gives an expiry in the future
#[tokio::test(start_paused = true)]
async fn test_login_round_trip_stores_future_expiry() {
    let harness = Harness::new();
    let token = harness.token_valid_for(120);
    harness.script_login(&token);

    let profile = harness
        .manager
        .login("admin@acme.test", "correct horse")
        .await
        .unwrap();

    let stored = harness.stored_token().unwrap();
    let claims = Claims::decode(&stored).unwrap();
    assert!(claims.exp > harness.now().timestamp());
    assert_eq!(profile.role.home_view(), "/admin");
    assert_eq!(harness.ctx().profile(), Some(profile));
}

#[tokio::test(start_paused = true)]
async fn test_listeners_attach_two_seconds_after_login() {
    let harness = Harness::new();
    harness.script_login(&harness.token_valid_for(120));
    harness
        .manager
        .login("admin@acme.test", "correct horse")
        .await
        .unwrap();

    advance_secs(1).await;
    assert!(!harness.manager.listeners_registered());

    advance_secs(1).await;
    assert!(harness.manager.listeners_registered());
    assert_eq!(harness.manager.state(), SessionState::Active);
}

#[tokio::test(start_paused = true)]
async fn test_logout_during_registration_delay_leaves_no_listeners() {
    let harness = Harness::new();
    harness.script_login(&harness.token_valid_for(120));
    harness
        .manager
        .login("admin@acme.test", "correct horse")
        .await
        .unwrap();

    harness.manager.logout().await;
    advance_secs(3).await;

    assert!(!harness.manager.listeners_registered());
}

#[tokio::test(start_paused = true)]
async fn test_register_and_deregister_are_idempotent() {
    let harness = Harness::new();

    assert!(harness.manager.register_activity_listeners());
    assert!(!harness.manager.register_activity_listeners());
    assert_eq!(harness.activity.subscription_count(), 1);
    assert_eq!(harness.activity.emit(ActivityKind::Click), 1);

    assert!(harness.manager.deregister_activity_listeners());
    assert!(!harness.manager.deregister_activity_listeners());
    assert_eq!(harness.activity.subscription_count(), 0);
    assert_eq!(harness.activity.emit(ActivityKind::Click), 0);
}

/// Login at T0, activity at T5 refreshes once, activity at T10 does not
#[tokio::test(start_paused = true)]
async fn test_activity_refreshes_at_most_once_per_cooldown() {
    let harness = Harness::new();
    harness.signed_in_for(120).await;
    let refreshed = harness.token_valid_for(600);
    harness.script_refresh(&refreshed);

    advance_secs(3).await;
    harness.activity.emit(ActivityKind::KeyPress);
    settle().await;
    assert_eq!(harness.transport.calls_to(REFRESH), 1);
    assert_eq!(harness.stored_token(), Some(refreshed));

    advance_secs(5).await;
    harness.activity.emit(ActivityKind::Click);
    settle().await;
    assert_eq!(harness.transport.calls_to(REFRESH), 1);

    // Gate reopens 30 s after the T5 attempt
    advance_secs(26).await;
    harness.activity.emit(ActivityKind::Scroll);
    settle().await;
    assert_eq!(harness.transport.calls_to(REFRESH), 2);
}

#[tokio::test(start_paused = true)]
async fn test_burst_of_signals_issues_one_refresh() {
    let harness = Harness::new();
    harness.signed_in_for(120).await;
    harness.script_refresh(&harness.token_valid_for(600));

    for _ in 0..20 {
        for kind in ActivityKind::ALL {
            harness.activity.emit(kind);
        }
    }
    settle().await;

    assert_eq!(harness.transport.calls_to(REFRESH), 1);
}

#[tokio::test(start_paused = true)]
async fn test_refresh_reports_expiring_while_in_flight() {
    let harness = Harness::new();
    harness.signed_in_for(120).await;
    harness.transport.script(
        REFRESH,
        Reply::Delayed(
            Duration::from_secs(1),
            ApiResponse::new(200, refresh_body(&harness.token_valid_for(600))),
        ),
    );

    harness.activity.emit(ActivityKind::KeyPress);
    settle().await;
    assert_eq!(harness.manager.state(), SessionState::Expiring);

    advance_secs(1).await;
    assert_eq!(harness.manager.state(), SessionState::Active);
}

/// A refresh that returns after a new login must not overwrite its token
#[tokio::test(start_paused = true)]
async fn test_refresh_result_from_previous_session_is_discarded() {
    let harness = Harness::new();
    harness.signed_in_for(120).await;
    harness.transport.script(
        REFRESH,
        Reply::Delayed(
            Duration::from_secs(5),
            ApiResponse::new(200, refresh_body("stale-refresh")),
        ),
    );
    harness.activity.emit(ActivityKind::KeyPress);
    settle().await;

    harness.manager.logout().await;
    let second = harness.token_valid_for(300);
    harness.script_login(&second);
    harness
        .manager
        .login("admin@acme.test", "correct horse")
        .await
        .unwrap();
    advance_secs(5).await;

    assert_eq!(harness.stored_token(), Some(second));
}

#[tokio::test(start_paused = true)]
async fn test_refresh_is_skipped_for_expired_token() {
    let harness = Harness::new();
    harness.signed_in_for(5).await;

    advance_secs(10).await;
    harness.activity.emit(ActivityKind::KeyPress);
    settle().await;

    assert_eq!(harness.transport.calls_to(REFRESH), 0);
    assert!(!harness.ctx().refresh_gate_closed());
}

/// Refresh 401 is swallowed; the next protected call's 401 terminates
#[tokio::test(start_paused = true)]
async fn test_refresh_rejection_defers_termination_to_next_call() {
    let harness = Harness::new();
    harness.signed_in_for(120).await;
    harness
        .transport
        .script(REFRESH, Reply::status(401, r#"{"detail":"Session revoked"}"#));
    harness
        .transport
        .script("/documents", Reply::status(401, r#"{"detail":"Session revoked"}"#));

    harness.activity.emit(ActivityKind::KeyPress);
    settle().await;

    assert_eq!(harness.transport.calls_to(REFRESH), 1);
    assert_eq!(harness.navigator.count(), 0);
    assert!(harness.stored_token().is_some());

    let _ = harness.api.list_documents().await;

    assert_eq!(harness.navigator.count(), 1);
    assert_eq!(harness.stored_token(), None);
    assert_eq!(harness.activity.listener_count(), 0);
}

/// An idle user's expired token is terminated within one poll interval
#[tokio::test(start_paused = true)]
async fn test_expiry_watch_terminates_idle_session_within_poll_interval() {
    let harness = Harness::new();
    harness.signed_in_for(15).await;
    let _watch = harness.manager.spawn_expiry_watch();
    settle().await;

    advance_secs(10).await;
    assert_eq!(harness.navigator.count(), 0);

    advance_secs(10).await;
    assert_eq!(harness.navigator.count(), 1);
    assert_eq!(harness.ctx().take_logout_reason(), Some(LogoutReason::SessionExpired));
    assert_eq!(harness.ctx().take_logout_reason(), None);
    assert_eq!(harness.activity.listener_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_visibility_regained_checks_immediately() {
    let harness = Harness::new();
    harness.signed_in_for(5).await;
    let _watch = harness.manager.spawn_expiry_watch();
    settle().await;

    advance_secs(5).await;
    assert_eq!(harness.navigator.count(), 0);

    harness.manager.on_visibility_regained();
    settle().await;

    assert_eq!(harness.navigator.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_expiry_watch_after_termination_is_noop() {
    let harness = Harness::new();
    harness.signed_in_for(5).await;
    let _watch = harness.manager.spawn_expiry_watch();

    for _ in 0..6 {
        advance_secs(10).await;
    }

    assert_eq!(harness.navigator.count(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_new_login_after_termination_restarts_lifecycle() {
    let harness = Harness::new();
    harness.signed_in_for(5).await;
    advance_secs(10).await;
    harness.manager.check_expiry();
    assert_eq!(harness.manager.state(), SessionState::Terminated);

    harness.signed_in_for(120).await;

    assert_eq!(harness.manager.state(), SessionState::Active);
    assert!(harness.manager.listeners_registered());
}
