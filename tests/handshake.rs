//! Login handshake round trips against a mocked exchange endpoint.

mod common;

use common::Fixture;
use fls_dashboard::session::{CHALLENGE_KEY, TOKEN_KEY};
use fls_dashboard::{Error, HandshakeState, KeyValueStore, LoginFlow};
use serde_json::json;
use wiremock::matchers::{any, body_json, method, path};
use wiremock::{Mock, ResponseTemplate};

fn flow(fx: &Fixture) -> LoginFlow {
    LoginFlow::new(fx.config.clone(), fx.sessions.clone(), fx.backend.clone())
}

/// Starts a login and returns the challenge it stored.
fn start_login(fx: &Fixture, flow: &LoginFlow) -> String {
    match flow.initiate().unwrap() {
        HandshakeState::AwaitingRedirectReturn { authorize_url } => {
            assert_eq!(authorize_url.host_str(), Some("speckle.example.com"));
        }
        other => panic!("unexpected state: {other:?}"),
    }
    fx.memory.get_item(CHALLENGE_KEY).expect("challenge stored")
}

#[tokio::test]
async fn successful_exchange_persists_session() {
    let fx = Fixture::start().await;
    let flow = flow(&fx);
    let challenge = start_login(&fx, &flow);

    Mock::given(method("POST"))
        .and(path("/auth/speckle/exchange"))
        .and(body_json(json!({ "code": "abc", "challenge": challenge })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": "u1",
            "email": "a@b.com",
            "name": "A",
        })))
        .expect(1)
        .mount(&fx.server)
        .await;

    let state = flow.resume(Some("abc")).await;

    let HandshakeState::Authenticated(session) = state else {
        panic!("expected authenticated, got {state:?}");
    };
    assert_eq!(session.user_id.as_str(), "u1");
    assert_eq!(fx.sessions.get(), session);
    assert_eq!(fx.sessions.get().email, "a@b.com");
    assert_eq!(fx.sessions.get().display_name, "A");
    assert_eq!(fx.sessions.token(), None);
    assert_eq!(fx.memory.get_item(CHALLENGE_KEY), None);
}

#[tokio::test]
async fn exchange_token_is_kept_for_later_calls() {
    let fx = Fixture::start().await;
    let flow = flow(&fx);
    start_login(&fx, &flow);

    Mock::given(path("/auth/speckle/exchange"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": "u1",
            "email": "a@b.com",
            "name": "A",
            "token": "tok-1",
        })))
        .mount(&fx.server)
        .await;

    assert!(matches!(
        flow.resume(Some("abc")).await,
        HandshakeState::Authenticated(_)
    ));
    assert_eq!(fx.sessions.token().as_deref(), Some("tok-1"));
}

#[tokio::test]
async fn new_login_without_token_drops_previous_token() {
    let fx = Fixture::start().await;
    fx.sign_in("userA", Some("token-of-A"));
    let flow = flow(&fx);
    start_login(&fx, &flow);

    Mock::given(path("/auth/speckle/exchange"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user_id": "u1",
            "email": "a@b.com",
            "name": "A",
        })))
        .expect(1)
        .mount(&fx.server)
        .await;

    let HandshakeState::Authenticated(session) = flow.resume(Some("abc")).await else {
        panic!("expected authenticated");
    };

    assert_eq!(session.token, None);
    assert_eq!(fx.sessions.get(), session);
    assert_eq!(fx.memory.get_item(TOKEN_KEY), None);
}

#[tokio::test]
async fn code_without_challenge_fails_without_backend_call() {
    let fx = Fixture::start().await;
    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&fx.server)
        .await;

    let state = flow(&fx).resume(Some("abc")).await;

    assert!(matches!(state, HandshakeState::Failed(Error::LostChallenge)));
    assert!(fx.memory.is_empty());
}

#[tokio::test]
async fn response_without_user_is_malformed() {
    let fx = Fixture::start().await;
    let flow = flow(&fx);
    start_login(&fx, &flow);

    Mock::given(path("/auth/speckle/exchange"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "email": "a@b.com" })))
        .expect(1)
        .mount(&fx.server)
        .await;

    let state = flow.resume(Some("abc")).await;

    assert!(matches!(state, HandshakeState::Failed(Error::MalformedResponse(_))));
    assert!(!fx.sessions.get().is_present());
}

#[tokio::test]
async fn backend_failure_is_reported_and_nothing_stored() {
    let fx = Fixture::start().await;
    let flow = flow(&fx);
    start_login(&fx, &flow);

    Mock::given(path("/auth/speckle/exchange"))
        .respond_with(ResponseTemplate::new(500).set_body_string("exchange exploded"))
        .expect(1)
        .mount(&fx.server)
        .await;

    let state = flow.resume(Some("abc")).await;

    match state {
        HandshakeState::Failed(Error::Backend { status, body }) => {
            assert_eq!(status, 500);
            assert_eq!(body, "exchange exploded");
        }
        other => panic!("expected backend failure, got {other:?}"),
    }
    assert!(!fx.sessions.get().is_present());
    // Consumed even on failure; a retry needs a fresh login.
    assert_eq!(fx.memory.get_item(CHALLENGE_KEY), None);
}

#[tokio::test]
async fn second_return_with_same_code_is_rejected_locally() {
    let fx = Fixture::start().await;
    let flow = flow(&fx);
    start_login(&fx, &flow);

    Mock::given(path("/auth/speckle/exchange"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "user_id": "u1" })))
        .expect(1)
        .mount(&fx.server)
        .await;

    assert!(matches!(
        flow.resume(Some("abc")).await,
        HandshakeState::Authenticated(_)
    ));
    assert!(matches!(
        flow.resume(Some("abc")).await,
        HandshakeState::Failed(Error::LostChallenge)
    ));
}
