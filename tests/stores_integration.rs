use axum::{
    body::Body,
    http::{self, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use scanned_cases_stub::{routes::SCANNED_CASES_PATH, server, stores::Stores, utils::GlobalConfig};
use serde_json::{json, Value};
use serial_test::serial;
use tower::ServiceExt; // for `oneshot`

fn get_api_router(stores: &Stores) -> Router {
    server::app(stores.clone(), GlobalConfig::default())
}

async fn send(
    api_router: &Router,
    method: http::Method,
    uri: &str,
    body: Body,
) -> (StatusCode, Option<Value>) {
    let response = api_router
        .clone()
        .oneshot(
            Request::builder()
                .uri(uri)
                .method(method)
                .header(http::header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    let body = if body.is_empty() {
        None
    } else {
        Some(serde_json::from_slice(&body).unwrap())
    };

    (status, body)
}

async fn create_case(api_router: &Router) -> Value {
    let (status, body) = send(
        api_router,
        http::Method::POST,
        SCANNED_CASES_PATH,
        Body::from(json!({ "batchId": "batch-1" }).to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    body.unwrap()
}

#[tokio::test]
async fn test_empty_store_lists_nothing() {
    let api_router = get_api_router(&Stores::in_memory());

    let (status, body) = send(
        &api_router,
        http::Method::GET,
        "/system/store/lpaIdStore",
        Body::empty(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Some(json!({})));
}

#[tokio::test]
async fn test_seeded_counter_is_used() {
    let api_router = get_api_router(&Stores::in_memory());

    let (status, body) = send(
        &api_router,
        http::Method::PUT,
        "/system/store/lpaIdStore/counter",
        Body::from("5000"),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert_eq!(body, None);

    assert_eq!(create_case(&api_router).await, json!({ "uid": "700000005000" }));

    let (_, body) = send(
        &api_router,
        http::Method::GET,
        "/system/store/lpaIdStore",
        Body::empty(),
    )
    .await;
    assert_eq!(body, Some(json!({ "counter": 5001 })));
}

#[tokio::test]
async fn test_whole_float_counter_is_used() {
    let api_router = get_api_router(&Stores::in_memory());

    let (status, _) = send(
        &api_router,
        http::Method::PUT,
        "/system/store/lpaIdStore/counter",
        Body::from("100.0"),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert_eq!(create_case(&api_router).await, json!({ "uid": "700000000100" }));
}

#[tokio::test]
async fn test_reset_starts_a_new_sequence() {
    let api_router = get_api_router(&Stores::in_memory());

    create_case(&api_router).await;
    create_case(&api_router).await;

    let (status, _) = send(
        &api_router,
        http::Method::DELETE,
        "/system/store/lpaIdStore",
        Body::empty(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert_eq!(create_case(&api_router).await, json!({ "uid": "700000000100" }));
}

#[tokio::test]
async fn test_reset_of_unknown_store_is_a_no_op() {
    let api_router = get_api_router(&Stores::in_memory());

    let (status, _) = send(
        &api_router,
        http::Method::DELETE,
        "/system/store/never-opened",
        Body::empty(),
    )
    .await;

    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_arbitrary_items_round_trip() {
    let api_router = get_api_router(&Stores::in_memory());
    let item = json!({ "caseType": "lpa", "documents": [1, 2, 3] });

    let (status, _) = send(
        &api_router,
        http::Method::PUT,
        "/system/store/fixtures/case",
        Body::from(item.to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(
        &api_router,
        http::Method::GET,
        "/system/store/fixtures/case",
        Body::empty(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Some(item));
}

#[tokio::test]
async fn test_missing_item_is_not_found() {
    let api_router = get_api_router(&Stores::in_memory());

    let (status, body) = send(
        &api_router,
        http::Method::GET,
        "/system/store/lpaIdStore/counter",
        Body::empty(),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let body = body.unwrap();
    assert_eq!(body["code"], "not_found");
    assert_eq!(body["details"], "no item `counter` in store `lpaIdStore`");
}

#[tokio::test]
async fn test_malformed_item_is_a_bad_request() {
    let stores = Stores::in_memory();
    let api_router = get_api_router(&stores);

    let (status, body) = send(
        &api_router,
        http::Method::PUT,
        "/system/store/lpaIdStore/counter",
        Body::from("{nope"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body.unwrap()["code"], "bad_request");
    assert_eq!(
        stores.open("lpaIdStore").load("counter").await.unwrap(),
        None
    );
}

// NOTE: requires a Redis on localhost (docker-compose.test.yml)
#[tokio::test]
#[serial]
#[ignore = "requires a running Redis"]
async fn test_redis_backed_sequence() {
    let stores = Stores::redis("redis://localhost").await.unwrap();
    let api_router = get_api_router(&stores);

    // Reset the counter before the run
    let (status, _) = send(
        &api_router,
        http::Method::DELETE,
        "/system/store/lpaIdStore",
        Body::empty(),
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    assert_eq!(create_case(&api_router).await, json!({ "uid": "700000000100" }));
    assert_eq!(create_case(&api_router).await, json!({ "uid": "700000000101" }));

    // a second connection sees the same session
    let other = get_api_router(&Stores::redis("redis://localhost").await.unwrap());
    assert_eq!(create_case(&other).await, json!({ "uid": "700000000102" }));
}
