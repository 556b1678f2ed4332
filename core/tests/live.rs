//! The universal dispatcher in live mode against the mock server.

use std::error::Error;

use kipple_networking::{
    DecodableRequest, DispatchMode, Environment, NetworkRequestDispatching, NetworkingError,
    Request, ResponseAnticipating, UniversalNetworkRequestDispatcher,
};
use mock_server::{Echo, User};
use pretty_assertions::assert_eq;
use serde::Deserialize;
use tokio::net::TcpListener;

#[derive(Debug, Deserialize, PartialEq)]
struct PingResponse {
    ok: bool,
}

#[derive(Debug, Deserialize)]
struct StrictPing {
    #[allow(dead_code)]
    ok: String,
}

/// Lists users, unwrapping the server's `data` envelope.
struct ListUsers(Request);

impl ListUsers {
    fn new() -> Self {
        Self(Request::get("/users").with_root_response_key("data"))
    }
}

impl ResponseAnticipating for ListUsers {
    type Response = Vec<User>;

    fn request(&self) -> &Request {
        &self.0
    }
}

async fn start_server() -> Environment {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(mock_server::run(listener));
    Environment::new(&format!("http://{addr}"))
}

fn live() -> UniversalNetworkRequestDispatcher {
    let dispatcher = UniversalNetworkRequestDispatcher::new(None, DispatchMode::Live).unwrap();
    assert!(dispatcher.is_live());
    dispatcher
}

#[tokio::test]
async fn decodes_ping() {
    let env = start_server().await;

    let ping = live()
        .response(&DecodableRequest::<PingResponse>::new("/ping"), &env)
        .await
        .unwrap();

    assert_eq!(ping, PingResponse { ok: true });
}

#[tokio::test]
async fn raw_response_carries_metadata() {
    let env = start_server().await;

    let response = live().request(&Request::get("/ping"), &env).await.unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.url(), format!("{}/ping", env.base_url()));
    assert_eq!(response.header("content-type"), Some("application/json"));
    assert_eq!(response.into_value(), br#"{"ok":true}"#.to_vec());
}

#[tokio::test]
async fn type_mismatch_is_unable_to_decode() {
    let env = start_server().await;

    let err = live()
        .response(&DecodableRequest::<StrictPing>::new("/ping"), &env)
        .await
        .unwrap_err();

    assert_eq!(err.decode_type_name(), Some("StrictPing"));
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn json_body_and_headers_reach_the_server() {
    let env = start_server().await.with_header("X-Client", "kipple");

    let echo = live()
        .request_decoded::<Echo>(
            &Request::post("/echo")
                .with_parameter("name", "Ann")
                .with_header("X-Request", "1"),
            &env,
        )
        .await
        .unwrap()
        .into_value();

    assert_eq!(echo.method, "POST");
    assert_eq!(echo.body, r#"{"name":"Ann"}"#);
    assert_eq!(echo.headers.get("x-client").map(String::as_str), Some("kipple"));
    assert_eq!(echo.headers.get("x-request").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn root_response_key_unwraps_listing() {
    let env = start_server().await;
    let dispatcher = live();

    let created = dispatcher
        .request_decoded::<User>(&Request::post("/users").with_parameter("name", "Ann"), &env)
        .await
        .unwrap();
    assert_eq!(created.status(), 201);

    let users = dispatcher.response(&ListUsers::new(), &env).await.unwrap();

    assert_eq!(users, vec![created.into_value()]);
}

#[tokio::test]
async fn base_url_override_wins() {
    let env = start_server().await;
    let elsewhere = Environment::new("http://127.0.0.1:1");

    let ping = live()
        .request_decoded::<PingResponse>(&Request::get("/ping").with_base_url(env.base_url()), &elsewhere)
        .await
        .unwrap();

    assert_eq!(ping.into_value(), PingResponse { ok: true });
}

#[tokio::test]
async fn error_status_is_passed_through() {
    let env = start_server().await;

    let err = live()
        .request(&Request::get("/status/503"), &env)
        .await
        .unwrap_err();

    match err {
        NetworkingError::UnacceptableStatus { status, body } => {
            assert_eq!(status, 503);
            assert_eq!(body, "status 503");
        }
        other => panic!("expected UnacceptableStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn connection_failure_is_a_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = live()
        .request(&Request::get("/ping"), &Environment::new(&format!("http://{addr}")))
        .await
        .unwrap_err();

    match &err {
        NetworkingError::Transport(cause) => assert!(cause.is_connect()),
        other => panic!("expected Transport, got {other:?}"),
    }
    assert!(err.source().is_some());
}
