//! Authentication API Tests

use pretty_assertions::assert_eq;

use rag_console_client::application::dto::{SetPasswordRequest, UpdateProfileRequest};
use rag_console_client::domain::{
    keys, LogoutReason, RequestBody, Role, SessionState, TransportError,
};
use rag_console_client::shared::error::{ApiError, NETWORK_ERROR_MESSAGE};

use crate::common::{login_body, Harness, RedirectSnapshot, Reply};

/// Login sends the credentials as JSON and returns the profile
#[tokio::test(start_paused = true)]
async fn test_login_with_valid_credentials() {
    let harness = Harness::new();
    let token = harness.token_valid_for(120);
    harness
        .transport
        .script("/auth/login", Reply::status(200, login_body(&token, "super_admin")));

    let profile = harness
        .manager
        .login("  root@acme.test ", "correct horse")
        .await
        .unwrap();

    let request = &harness.transport.requests()[0];
    assert_eq!(
        request.body,
        RequestBody::Json(serde_json::json!({
            "email": "root@acme.test",
            "password": "correct horse"
        }))
    );
    assert_eq!(request.header("Authorization"), None);
    assert_eq!(profile.role, Role::SuperAdmin);
    assert_eq!(profile.role.home_view(), "/super-admin");
    assert_eq!(harness.stored_token(), Some(token));
    assert!(harness.store.contains(keys::USER));
}

/// Business rejection is surfaced verbatim and nothing is persisted
#[tokio::test(start_paused = true)]
async fn test_login_rejection_is_surfaced_verbatim() {
    let harness = Harness::new();
    harness.transport.script(
        "/auth/login",
        Reply::status(
            403,
            r#"{"detail":"Password not set. Please set your password first."}"#,
        ),
    );

    let err = harness
        .manager
        .login("new@acme.test", "anything")
        .await
        .unwrap_err();

    assert_eq!(err.message(), "Password not set. Please set your password first.");
    assert!(harness.store.is_empty());
    assert_eq!(harness.navigator.count(), 0);
    assert_eq!(harness.manager.state(), SessionState::NoSession);
}

#[tokio::test(start_paused = true)]
async fn test_login_with_empty_password_fails_locally() {
    let harness = Harness::new();

    let err = harness
        .manager
        .login("admin@acme.test", "")
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::Validation("password: Password is required".into()));
    assert!(harness.transport.requests().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_login_network_failure_is_single_message() {
    let harness = Harness::new();
    harness.transport.script(
        "/auth/login",
        Reply::Fail(TransportError::Network("connection refused".into())),
    );

    let err = harness
        .manager
        .login("admin@acme.test", "correct horse")
        .await
        .unwrap_err();

    assert_eq!(err.message(), NETWORK_ERROR_MESSAGE);
}

#[tokio::test(start_paused = true)]
async fn test_set_password_returns_server_message() {
    let harness = Harness::new();
    harness.transport.script(
        "/auth/set-password",
        Reply::status(200, r#"{"message":"Password set successfully. You can now login."}"#),
    );

    let message = harness
        .api
        .set_password(&SetPasswordRequest {
            email: "new@acme.test".into(),
            password: "long-enough".into(),
        })
        .await
        .unwrap();

    assert_eq!(message, "Password set successfully. You can now login.");
}

#[tokio::test(start_paused = true)]
async fn test_set_password_validation_errors_are_flattened() {
    let harness = Harness::new();
    harness.transport.script(
        "/auth/set-password",
        Reply::status(
            422,
            r#"{"detail":[
                {"loc":["body","email"],"msg":"value is not a valid email address"},
                {"loc":["body","password"],"msg":"ensure this value has at least 8 characters"}
            ]}"#,
        ),
    );

    let err = harness
        .api
        .set_password(&SetPasswordRequest {
            email: "bad".into(),
            password: "short".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(
        err,
        ApiError::Validation(
            "email: value is not a valid email address; password: ensure this value has at least 8 characters"
                .into()
        )
    );
}

#[tokio::test(start_paused = true)]
async fn test_logout_clears_state_and_notifies_server() {
    let harness = Harness::new();
    let token = harness.signed_in_for(120).await;

    harness.manager.logout().await;

    let logout = harness
        .transport
        .requests()
        .into_iter()
        .find(|r| r.path == "/auth/logout")
        .unwrap();
    assert_eq!(
        logout.header("Authorization").map(str::to_string),
        Some(format!("Bearer {}", token))
    );
    assert!(harness.store.is_empty());
    assert_eq!(harness.activity.listener_count(), 0);
    assert_eq!(harness.navigator.count(), 0);
}

/// Local state clears even when the server notification fails
#[tokio::test(start_paused = true)]
async fn test_logout_clears_state_when_server_unreachable() {
    let harness = Harness::new();
    harness.signed_in_for(120).await;
    harness
        .transport
        .script("/auth/logout", Reply::Fail(TransportError::Timeout));

    harness.manager.logout().await;

    assert!(harness.store.is_empty());
    assert_eq!(harness.activity.listener_count(), 0);
    assert_eq!(harness.manager.state(), SessionState::NoSession);
}

/// A rejected logout is an authorization failure like any other
#[tokio::test(start_paused = true)]
async fn test_logout_rejected_by_server_forces_termination() {
    let harness = Harness::new();
    harness.signed_in_for(120).await;
    harness
        .transport
        .script("/auth/logout", Reply::status(401, r#"{"detail":"Not authenticated"}"#));

    harness.manager.logout().await;

    assert_eq!(
        harness.navigator.redirects(),
        vec![RedirectSnapshot {
            token: None,
            user: None,
            reason: Some("session_expired".into()),
        }]
    );
    assert_eq!(harness.stored_token(), None);
    assert_eq!(harness.activity.listener_count(), 0);
    assert_eq!(harness.ctx().take_logout_reason(), Some(LogoutReason::SessionExpired));
}

#[tokio::test(start_paused = true)]
async fn test_profile_update_is_reflected_in_cache() {
    let harness = Harness::new();
    harness.signed_in_for(120).await;
    harness.transport.script(
        "/auth/profile",
        Reply::status(200, r#"{"message":"Profile updated successfully"}"#),
    );

    harness
        .api
        .update_profile(&UpdateProfileRequest {
            full_name: "Ada King".into(),
            email: "ada@acme.test".into(),
        })
        .await
        .unwrap();

    let profile = harness.ctx().profile().unwrap();
    assert_eq!(profile.full_name, "Ada King");
    assert_eq!(profile.role, Role::Admin);
}
