//! Authorization Interceptor Tests

use std::time::Duration;

use pretty_assertions::assert_eq;

use rag_console_client::application::dto::ChatRequest;
use rag_console_client::domain::{ApiResponse, LogoutReason, SessionState};
use rag_console_client::shared::error::{ApiError, SESSION_EXPIRED_MESSAGE};

use crate::common::{advance_secs, Harness, RedirectSnapshot, Reply};

const DOCUMENTS: &str = "/documents";

#[tokio::test(start_paused = true)]
async fn test_forbidden_response_terminates_session() {
    let harness = Harness::new();
    harness.signed_in_for(120).await;
    harness
        .transport
        .script(DOCUMENTS, Reply::status(403, r#"{"detail":"Forbidden"}"#));

    let err = harness.api.list_documents().await.unwrap_err();

    assert_eq!(err, ApiError::Unauthorized(SESSION_EXPIRED_MESSAGE.into()));
    assert_eq!(
        harness.navigator.redirects(),
        vec![RedirectSnapshot {
            token: None,
            user: None,
            reason: Some("session_expired".into()),
        }]
    );
    assert_eq!(harness.activity.listener_count(), 0);
    assert_eq!(harness.manager.state(), SessionState::Terminated);
}

/// Concurrent 401s for one session run the termination sequence once
#[tokio::test(start_paused = true)]
async fn test_concurrent_rejections_terminate_once() {
    let harness = Harness::new();
    harness.signed_in_for(120).await;
    harness.transport.script(
        DOCUMENTS,
        Reply::Delayed(
            Duration::from_millis(100),
            ApiResponse::new(401, r#"{"detail":"Token expired"}"#),
        ),
    );

    let (a, b, c) = tokio::join!(
        harness.api.list_documents(),
        harness.api.list_documents(),
        harness.api.list_documents(),
    );

    for result in [a, b, c] {
        assert!(matches!(result, Err(ApiError::Unauthorized(_))));
    }
    assert_eq!(harness.navigator.count(), 1);
    assert_eq!(harness.ctx().take_logout_reason(), Some(LogoutReason::SessionExpired));
}

#[tokio::test(start_paused = true)]
async fn test_sequential_rejections_after_termination_do_not_redirect_again() {
    let harness = Harness::new();
    harness.signed_in_for(120).await;
    harness
        .transport
        .script(DOCUMENTS, Reply::status(401, r#"{"detail":"Token expired"}"#));

    let _ = harness.api.list_documents().await;
    let _ = harness.api.list_documents().await;

    assert_eq!(harness.navigator.count(), 1);
    let second = &harness.transport.requests()[harness.transport.requests().len() - 1];
    assert_eq!(second.header("Authorization"), None);
}

/// A 401 for a request sent in an earlier session leaves the new one alone
#[tokio::test(start_paused = true)]
async fn test_late_rejection_from_previous_session_is_ignored() {
    let harness = Harness::new();
    harness.signed_in_for(120).await;
    harness.transport.script(
        DOCUMENTS,
        Reply::Delayed(
            Duration::from_secs(5),
            ApiResponse::new(401, r#"{"detail":"Token expired"}"#),
        ),
    );
    let api = harness.api.clone();
    let pending = tokio::spawn(async move { api.list_documents().await });
    advance_secs(1).await;

    harness.manager.logout().await;
    let token = harness.signed_in_for(300).await;
    advance_secs(5).await;

    assert!(pending.await.unwrap().is_err());
    assert_eq!(harness.navigator.count(), 0);
    assert_eq!(harness.stored_token(), Some(token));
}

#[tokio::test(start_paused = true)]
async fn test_refresh_endpoint_rejection_is_not_intercepted() {
    let harness = Harness::new();
    harness.signed_in_for(120).await;
    harness.transport.script(
        "/auth/refresh-session",
        Reply::status(403, r#"{"detail":"Refresh not allowed"}"#),
    );

    let err = harness.api.refresh_session().await.unwrap_err();

    assert_eq!(
        err,
        ApiError::Server {
            status: 403,
            message: "Refresh not allowed".into()
        }
    );
    assert_eq!(harness.navigator.count(), 0);
    assert!(harness.stored_token().is_some());
}

#[tokio::test(start_paused = true)]
async fn test_server_error_does_not_terminate() {
    let harness = Harness::new();
    harness.signed_in_for(120).await;
    harness
        .transport
        .script(DOCUMENTS, Reply::status(500, r#"{"detail":"Vector store unavailable"}"#));

    let err = harness.api.list_documents().await.unwrap_err();

    assert_eq!(err.message(), "Vector store unavailable");
    assert_eq!(harness.navigator.count(), 0);
    assert_eq!(harness.manager.state(), SessionState::Active);
}

#[tokio::test(start_paused = true)]
async fn test_chat_rejection_terminates_session() {
    let harness = Harness::new();
    harness.signed_in_for(120).await;
    harness
        .transport
        .script("/chat", Reply::status(401, r#"{"detail":"Could not validate credentials"}"#));

    let err = harness
        .api
        .send_chat(&ChatRequest {
            message: "Where is the onboarding guide?".into(),
            session_id: None,
        })
        .await
        .unwrap_err();

    assert_eq!(err, ApiError::Unauthorized(SESSION_EXPIRED_MESSAGE.into()));
    assert_eq!(harness.navigator.count(), 1);
    assert_eq!(harness.ctx().take_logout_reason(), Some(LogoutReason::SessionExpired));
}
