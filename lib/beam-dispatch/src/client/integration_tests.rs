//! Dispatcher tests against in-memory transports.
//!
//! The spy records every request it receives, so the tests can check both what is sent and
//! that nothing is sent when the request cannot be built.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use headers::ContentType;
use http::header::CONTENT_TYPE;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use super::*;

#[derive(Debug, Default)]
struct SpyTransport {
    requests: Mutex<Vec<TransportRequest>>,
    responses: Mutex<VecDeque<Result<TransportResponse, TransportError>>>,
}

impl SpyTransport {
    fn replying(response: TransportResponse) -> Self {
        let spy = Self::default();
        spy.push(Ok(response));
        spy
    }

    fn push(&self, response: Result<TransportResponse, TransportError>) {
        self.responses
            .lock()
            .expect("responses lock")
            .push_back(response);
    }

    fn requests(&self) -> Vec<TransportRequest> {
        self.requests.lock().expect("requests lock").clone()
    }

    fn last_request(&self) -> TransportRequest {
        self.requests()
            .pop()
            .expect("at least one request was sent")
    }
}

impl Transport for SpyTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.requests.lock().expect("requests lock").push(request);
        self.responses
            .lock()
            .expect("responses lock")
            .pop_front()
            .unwrap_or_else(|| Ok(json_response(StatusCode::OK, "{}")))
    }
}

/// Mimics a transport holding a credential: authenticated calls fail before the network
/// when none is configured.
#[derive(Debug, Default)]
struct CredentialTransport {
    token: RwLock<Option<String>>,
    network: SpyTransport,
}

impl Transport for CredentialTransport {
    async fn send(
        &self,
        mut request: TransportRequest,
    ) -> Result<TransportResponse, TransportError> {
        if request.with_auth {
            let token = self.token.read().await;
            let Some(token) = token.as_ref() else {
                return Err(AuthenticationError::MissingCredential.into());
            };
            let (name, value) = Authentication::Bearer(token.as_str().into()).to_header()?;
            request.headers.insert(name, value);
        }
        self.network.send(request).await
    }
}

fn json_response(status: StatusCode, body: &'static str) -> TransportResponse {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    TransportResponse {
        status,
        headers,
        body: Bytes::from_static(body.as_bytes()),
    }
}

#[derive(Debug, PartialEq, Deserialize)]
struct Account {
    id: ObjectId,
    email: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatsUpdate {
    set: std::collections::BTreeMap<&'static str, i32>,
}

const GET_ACCOUNT: EndpointDescriptor =
    EndpointDescriptor::get("/object/accounts/{objectId}/").with_auth();
const SEARCH_ACCOUNTS: EndpointDescriptor =
    EndpointDescriptor::get("/basic/accounts/search").with_auth();
const GET_PRESENCE: EndpointDescriptor = EndpointDescriptor::get("/presence/query");
const POST_STATS: EndpointDescriptor =
    EndpointDescriptor::post("/object/stats/{objectId}/client").with_auth();
const GET_COMMENT: EndpointDescriptor =
    EndpointDescriptor::get("/users/{user_id}/posts/{post_id}/{comment_id}");

#[tokio::test]
async fn should_send_resolved_path_with_auth_flag() {
    let spy = SpyTransport::replying(json_response(
        StatusCode::OK,
        r#"{"id": 123456789012345, "email": null}"#,
    ));
    let dispatcher = Dispatcher::new(&spy);

    let response = dispatcher
        .dispatch::<Account>(
            &GET_ACCOUNT,
            RequestParameters::new().with_path_param("objectId", 123_456_789_012_345_u64),
        )
        .await
        .expect("should dispatch");

    let request = spy.last_request();
    assert_eq!(request.method, Method::GET);
    assert_eq!(request.url, "/object/accounts/123456789012345/");
    assert!(request.with_auth);
    assert!(request.body.is_none());
    assert_eq!(response.status_code(), StatusCode::OK);
    assert_eq!(
        response.into_payload(),
        Account {
            id: ObjectId::from(123_456_789_012_345_u64),
            email: None,
        }
    );
}

#[tokio::test]
async fn should_skip_absent_query_parameters() {
    let spy = SpyTransport::default();
    let dispatcher = Dispatcher::new(&spy);

    dispatcher
        .dispatch_raw(
            &SEARCH_ACCOUNTS,
            RequestParameters::new()
                .with_query_param("page", 1)
                .with_query_param("pagesize", 20)
                .with_query_param("query", None::<String>),
        )
        .await
        .expect("should dispatch");

    assert_eq!(spy.last_request().url, "/basic/accounts/search?page=1&pagesize=20");
}

#[tokio::test]
async fn should_repeat_array_query_parameters() {
    let spy = SpyTransport::default();
    let dispatcher = Dispatcher::new(&spy);

    dispatcher
        .dispatch_raw(
            &GET_PRESENCE,
            RequestParameters::new().with_query_param("Players", vec!["p1", "p2"]),
        )
        .await
        .expect("should dispatch");

    let request = spy.last_request();
    assert_eq!(request.url, "/presence/query?Players=p1&Players=p2");
    assert!(!request.with_auth);
}

#[tokio::test]
async fn should_not_call_transport_when_path_parameter_is_missing() {
    let spy = SpyTransport::default();
    let dispatcher = Dispatcher::new(&spy);

    let result = dispatcher
        .dispatch_raw(
            &GET_COMMENT,
            RequestParameters::new().with_path_param("user_id", 123),
        )
        .await;

    let Err(DispatchError::MissingPathParameter { missing, .. }) = result else {
        panic!("expected a missing path parameter, got {result:?}");
    };
    assert_eq!(missing, vec!["comment_id", "post_id"]);
    assert!(spy.requests().is_empty());
}

#[tokio::test]
async fn should_not_call_transport_with_unsupported_values() {
    let spy = SpyTransport::default();
    let dispatcher = Dispatcher::new(&spy);

    let result = dispatcher
        .dispatch_raw(
            &GET_PRESENCE,
            RequestParameters::new().with_query_param("Players", vec![vec!["nested"]]),
        )
        .await;

    assert!(matches!(
        result,
        Err(DispatchError::UnsupportedParameterValue { .. })
    ));
    assert!(spy.requests().is_empty());
}

#[tokio::test]
async fn should_not_call_transport_when_a_value_fails_to_serialize() {
    let spy = SpyTransport::default();
    let dispatcher = Dispatcher::new(&spy);
    let scores: std::collections::BTreeMap<(i32, i32), i32> = [((1, 2), 3)].into_iter().collect();

    let result = dispatcher
        .dispatch_raw(
            &GET_PRESENCE,
            RequestParameters::new()
                .with_query_param("scores", scores.clone())
                .with_query_param("page", 1),
        )
        .await;
    assert!(matches!(
        result,
        Err(DispatchError::UnsupportedParameterValue { .. })
    ));

    let result = dispatcher
        .dispatch_raw(
            &GET_PRESENCE,
            RequestParameters::new().with_header("X-Scores", scores),
        )
        .await;
    assert!(matches!(
        result,
        Err(DispatchError::UnsupportedParameterValue { .. })
    ));

    assert!(spy.requests().is_empty());
}

#[tokio::test]
async fn should_not_call_transport_with_dot_segment_identifier() {
    let spy = SpyTransport::default();
    let dispatcher = Dispatcher::new(&spy);

    let result = dispatcher
        .dispatch_raw(
            &GET_ACCOUNT,
            RequestParameters::new().with_path_param("objectId", ".."),
        )
        .await;

    assert!(matches!(
        result,
        Err(DispatchError::DotSegmentPathParameter { .. })
    ));
    assert!(spy.requests().is_empty());
}

#[tokio::test]
async fn should_send_json_body_and_gamertag() {
    let spy = SpyTransport::default();
    let dispatcher = Dispatcher::new(&spy);
    let update = StatsUpdate {
        set: [("level", 7)].into_iter().collect(),
    };

    dispatcher
        .dispatch_raw(
            &POST_STATS,
            RequestParameters::new()
                .with_path_param("objectId", ObjectId::from(42_u64))
                .with_gamertag(ObjectId::from(u64::MAX))
                .with_json(&update)
                .expect("serializable"),
        )
        .await
        .expect("should dispatch");

    let request = spy.last_request();
    assert_eq!(request.method, Method::POST);
    assert_eq!(request.url, "/object/stats/42/client");
    assert_eq!(
        request.headers.get(GAMERTAG_HEADER),
        Some(&HeaderValue::from_static("18446744073709551615"))
    );
    assert_eq!(
        request.headers.get(CONTENT_TYPE),
        Some(&HeaderValue::from_static("application/json"))
    );
    let body = request.body.expect("a body");
    insta::assert_snapshot!(String::from_utf8_lossy(&body).to_string(), @r#"{"set":{"level":7}}"#);
}

#[tokio::test]
async fn should_let_caller_headers_win() {
    let spy = SpyTransport::default();
    let dispatcher = Dispatcher::new(&spy);

    dispatcher
        .dispatch_raw(
            &POST_STATS,
            RequestParameters::new()
                .with_path_param("objectId", 42)
                .with_gamertag(ObjectId::from(1_u64))
                .with_body(CallBody::raw_with_content_type(
                    "{}",
                    ContentType::json(),
                ))
                .with_header("X-BEAM-GAMERTAG", 2)
                .with_header("Content-Type", "application/vnd.beam+json")
                .with_header("X-Request-ID", "abc-123"),
        )
        .await
        .expect("should dispatch");

    let headers = spy.last_request().headers;
    insta::assert_debug_snapshot!(headers, @r#"
    {
        "x-beam-gamertag": "2",
        "content-type": "application/vnd.beam+json",
        "x-request-id": "abc-123",
    }
    "#);
}

#[tokio::test]
async fn should_reject_invalid_header_before_sending() {
    let spy = SpyTransport::default();
    let dispatcher = Dispatcher::new(&spy);

    let result = dispatcher
        .dispatch_raw(
            &GET_PRESENCE,
            RequestParameters::new().with_header("bad header", "value"),
        )
        .await;

    assert!(matches!(result, Err(DispatchError::InvalidHeaderName(_))));
    assert!(spy.requests().is_empty());
}

#[tokio::test]
async fn should_return_error_status_without_failing() {
    let spy = SpyTransport::replying(json_response(
        StatusCode::NOT_FOUND,
        r#"{"status": 404, "error": "UnknownAccount"}"#,
    ));
    let dispatcher = Dispatcher::new(&spy);

    let response = dispatcher
        .dispatch_raw(
            &GET_ACCOUNT,
            RequestParameters::new().with_path_param("objectId", 1),
        )
        .await
        .expect("a status is not an error");

    assert_eq!(response.status_code(), StatusCode::NOT_FOUND);
    assert!(!response.is_success());
    assert_eq!(
        response.payload().as_text(),
        Some(r#"{"status": 404, "error": "UnknownAccount"}"#)
    );
}

#[tokio::test]
async fn should_report_status_when_decoding_fails() {
    let spy = SpyTransport::replying(json_response(
        StatusCode::NOT_FOUND,
        r#"{"status": 404, "error": "UnknownAccount"}"#,
    ));
    let dispatcher = Dispatcher::new(&spy);

    let result = dispatcher
        .dispatch::<Account>(
            &GET_ACCOUNT,
            RequestParameters::new().with_path_param("objectId", 1),
        )
        .await;

    let Err(DispatchError::Decode { status, .. }) = result else {
        panic!("expected a decode error, got {result:?}");
    };
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn should_propagate_transport_errors() {
    let spy = SpyTransport::default();
    spy.push(Err(TransportError::other("connection reset")));
    let dispatcher = Dispatcher::new(&spy);

    let result = dispatcher
        .dispatch_raw(&GET_PRESENCE, RequestParameters::new())
        .await;

    assert!(matches!(
        result,
        Err(DispatchError::Transport(TransportError::Other(_)))
    ));
    assert_eq!(spy.requests().len(), 1);
}

#[tokio::test]
async fn should_fail_without_credential_then_succeed_once_set() {
    let transport = CredentialTransport::default();
    let dispatcher = Dispatcher::new(&transport);
    let parameters = || RequestParameters::new().with_path_param("objectId", 1);

    let result = dispatcher.dispatch_raw(&GET_ACCOUNT, parameters()).await;
    assert!(matches!(
        result,
        Err(DispatchError::Transport(TransportError::Authentication(
            AuthenticationError::MissingCredential
        )))
    ));
    assert!(transport.network.requests().is_empty());

    *transport.token.write().await = Some("access-token".to_string());
    let response = dispatcher
        .dispatch_raw(&GET_ACCOUNT, parameters())
        .await
        .expect("should dispatch");

    assert!(response.is_success());
    let request = transport.network.last_request();
    assert_eq!(
        request.headers.get(http::header::AUTHORIZATION),
        Some(&HeaderValue::from_static("Bearer access-token"))
    );
}

#[tokio::test]
async fn should_not_require_credential_for_anonymous_endpoints() {
    let transport = CredentialTransport::default();
    let dispatcher = Dispatcher::new(&transport);

    let response = dispatcher
        .dispatch_raw(&GET_PRESENCE, RequestParameters::new())
        .await
        .expect("should dispatch");

    assert!(response.is_success());
    assert!(
        transport
            .network
            .last_request()
            .headers
            .get(http::header::AUTHORIZATION)
            .is_none()
    );
}

#[tokio::test]
async fn should_serve_concurrent_calls() {
    let spy = Arc::new(SpyTransport::default());
    let dispatcher = Dispatcher::new(Arc::clone(&spy));

    let mut tasks = Vec::new();
    for id in 0..16_u64 {
        let dispatcher = dispatcher.clone();
        tasks.push(tokio::spawn(async move {
            dispatcher
                .dispatch_raw(
                    &GET_ACCOUNT,
                    RequestParameters::new().with_path_param("objectId", id),
                )
                .await
        }));
    }
    for task in tasks {
        task.await
            .expect("task should complete")
            .expect("should dispatch");
    }

    let mut urls = spy
        .requests()
        .into_iter()
        .map(|request| request.url)
        .collect::<Vec<_>>();
    urls.sort();
    urls.dedup();
    assert_eq!(urls.len(), 16);
}
