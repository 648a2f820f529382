//! Integration tests for the service pipeline over `HyperTransport`,
//! using wiremock.

use std::sync::Arc;

use gantry::{
    BasicNetworkService, ContainerNetworkTask, HyperTransport, Method, NetworkError,
    NetworkServiceExt, NetworkTask, Request, Resource,
};
use serde::Deserialize;
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct Train {
    name: String,
}

fn train_resource(server: &MockServer) -> Resource<Train, NetworkError> {
    let url = url::Url::parse(&format!("{}/train", server.uri())).expect("url");
    let request = Request::builder(Method::Get, url).build();
    Resource::json(request, std::convert::identity)
}

fn service() -> BasicNetworkService<HyperTransport> {
    BasicNetworkService::new(HyperTransport::new())
}

#[tokio::test]
async fn fetch_parses_the_response_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/train"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"name": "ICE"})))
        .mount(&mock_server)
        .await;

    let task = Arc::new(ContainerNetworkTask::new());
    let train = service()
        .fetch(train_resource(&mock_server), task)
        .await
        .expect("train");

    assert_eq!(train.name, "ICE");
}

#[tokio::test]
async fn fetch_with_response_exposes_status_and_headers() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/train"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("X-Request-Id", "abc-123")
                .set_body_raw(r#"{"name":"ICE"}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    let task = Arc::new(ContainerNetworkTask::new());
    let (train, response) = service()
        .fetch_with_response(train_resource(&mock_server), task)
        .await
        .expect("train");

    assert_eq!(train.name, "ICE");
    assert_eq!(response.status(), 200);
    assert_eq!(response.header("x-request-id"), Some("abc-123"));
}

#[tokio::test]
async fn request_headers_and_query_reach_the_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/train"))
        .and(header("Accept", "application/json"))
        .and(query_param("line", "ICE"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"name":"ICE"}"#, "application/json"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let url = url::Url::parse(&format!("{}/train", mock_server.uri())).expect("url");
    let request = Request::builder(Method::Get, url)
        .header("Accept", "application/json")
        .query("line", "ICE")
        .build();
    let resource: Resource<Train, NetworkError> = Resource::json(request, std::convert::identity);

    let task = Arc::new(ContainerNetworkTask::new());
    service().fetch(resource, task).await.expect("train");
}

#[tokio::test]
async fn malformed_payload_is_a_serialization_error_carrying_the_bytes() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/train"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw(r#"{"namee":"ICE"}"#, "application/json"),
        )
        .mount(&mock_server)
        .await;

    let task = Arc::new(ContainerNetworkTask::new());
    let err = service()
        .fetch(train_resource(&mock_server), task)
        .await
        .expect_err("serialization error");

    match err {
        NetworkError::Serialization { data, .. } => {
            assert_eq!(data.as_deref(), Some(br#"{"namee":"ICE"}"#.as_slice()));
        }
        other => panic!("expected serialization error, got {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_carries_metadata_and_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/train"))
        .respond_with(ResponseTemplate::new(401).set_body_raw(r#"{"reason":"expired"}"#, "application/json"))
        .mount(&mock_server)
        .await;

    let task = Arc::new(ContainerNetworkTask::new());
    let err = service()
        .fetch(train_resource(&mock_server), task)
        .await
        .expect_err("unauthorized");

    match err {
        NetworkError::Unauthorized { response, data } => {
            assert_eq!(response.status(), 401);
            assert_eq!(data.as_deref(), Some(br#"{"reason":"expired"}"#.as_slice()));
        }
        other => panic!("expected unauthorized, got {other:?}"),
    }
}

#[tokio::test]
async fn server_error_is_classified_with_its_status() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/train"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let task = Arc::new(ContainerNetworkTask::new());
    let err = service()
        .fetch(train_resource(&mock_server), task)
        .await
        .expect_err("server error");

    assert!(matches!(err, NetworkError::Server { .. }));
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn failures_are_mapped_through_the_resource_error_mapper() {
    #[derive(Debug, PartialEq, Eq)]
    enum AppError {
        NotFound,
        Other(u16),
        Network,
    }

    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/train"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let url = url::Url::parse(&format!("{}/train", mock_server.uri())).expect("url");
    let request = Request::builder(Method::Get, url).build();
    let resource: Resource<Train, AppError> = Resource::json(request, |error| match error.status() {
        Some(404) => AppError::NotFound,
        Some(status) => AppError::Other(status),
        None => AppError::Network,
    });

    let task = Arc::new(ContainerNetworkTask::new());
    let err = service().fetch(resource, task).await.expect_err("mapped");

    assert_eq!(err, AppError::NotFound);
}

#[tokio::test]
async fn fetch_with_callback_delivers_the_result() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/train"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"name":"ICE"}"#, "application/json"))
        .mount(&mock_server)
        .await;

    let (tx, rx) = tokio::sync::oneshot::channel();
    let task = Arc::new(ContainerNetworkTask::new());
    service()
        .fetch_with_callback(train_resource(&mock_server), task, |result| {
            tx.send(result).map_err(drop).expect("receiver alive");
        })
        .await;

    let train = rx.await.expect("callback ran").expect("train");
    assert_eq!(train.name, "ICE");
}

#[tokio::test]
async fn cancelling_the_task_aborts_an_in_flight_request() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/train"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(r#"{"name":"ICE"}"#, "application/json")
                .set_delay(std::time::Duration::from_secs(10)),
        )
        .mount(&mock_server)
        .await;

    let service = Arc::new(service());
    let task = Arc::new(ContainerNetworkTask::new());
    let resource = train_resource(&mock_server);

    let call = {
        let service = Arc::clone(&service);
        let task = Arc::clone(&task);
        tokio::spawn(async move { service.fetch(resource, task).await })
    };

    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    task.cancel();

    let started = std::time::Instant::now();
    let err = call.await.expect("join").expect_err("cancelled");
    assert!(matches!(err, NetworkError::Cancelled));
    // The call must unwind well before the server's 10s delay elapses.
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
}
