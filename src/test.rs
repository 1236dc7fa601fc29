use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::task::JoinSet;
use tower::ServiceExt;
use uuid::Uuid;

use crate::{
    error::ErrorVerbosity,
    server::{app, ConfigError, ServerConfig},
    state::{book_store::BookStore, ApiState},
    types::book::Book,
};

const BOOK_ID: &str = "11111111-1111-1111-1111-111111111111";
const UNKNOWN_ID: &str = "22222222-2222-2222-2222-222222222222";

fn test_app(verbosity: ErrorVerbosity) -> (Router, ApiState) {
    let state = ApiState::new(verbosity, BookStore::new());

    (app(state.clone(), false), state)
}

fn book_json(rating: f64) -> Value {
    json!({
        "id": BOOK_ID,
        "title": "A",
        "author": "B",
        "description": "C",
        "rating": rating,
    })
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("Failed to build request");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("Router is infallible");

    let status = response.status();

    let bytes = response
        .into_body()
        .collect()
        .await
        .expect("Failed to read response body")
        .to_bytes();

    let body = match bytes.is_empty() {
        true => Value::Null,
        false => serde_json::from_slice(&bytes).expect("Response body is not JSON"),
    };

    (status, body)
}

#[tokio::test]
async fn example_config_is_valid() {
    let config = ServerConfig::from_config_file("config.example.yaml")
        .await
        .expect("Example config is not parsable");

    assert_eq!(config.socket_address().port(), 5000);

    let overridden = "0.0.0.0:8080".parse().expect("Valid socket address");
    let config = config.with_socket_address(overridden);
    assert_eq!(config.socket_address(), overridden);
    assert_eq!(config.error_verbosity(), ErrorVerbosity::Full);
    assert!(!config.trace_response_body());
}

#[tokio::test]
async fn missing_config_file_is_reported() {
    let result = ServerConfig::from_config_file("does-not-exist.yaml").await;

    assert!(matches!(result, Err(ConfigError::Read { .. })));
}

#[tokio::test]
async fn book_lifecycle() {
    let (app, _) = test_app(ErrorVerbosity::Full);

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));

    let (status, body) = send(&app, Method::POST, "/", Some(book_json(4.5))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, book_json(4.5));

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([book_json(4.5)]));

    let uri = format!("/{BOOK_ID}");

    let (status, body) = send(&app, Method::PUT, &uri, Some(book_json(5.0))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, book_json(5.0));

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([book_json(5.0)]));

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "detail": "Book deleted" }));

    let (status, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn create_appends_at_the_end() {
    let (app, state) = test_app(ErrorVerbosity::Full);

    let first = json!({
        "id": UNKNOWN_ID,
        "title": "First",
        "author": "Author",
        "description": "Description",
        "rating": 1.0,
    });

    send(&app, Method::POST, "/", Some(first.clone())).await;
    send(&app, Method::POST, "/", Some(book_json(2.0))).await;

    let (_, body) = send(&app, Method::GET, "/", None).await;
    assert_eq!(body, json!([first, book_json(2.0)]));

    let books = state.books().list().await;
    assert_eq!(books[1].id, Uuid::parse_str(BOOK_ID).expect("Valid uuid"));
}

#[tokio::test]
async fn update_and_delete_unknown_book_are_not_found() {
    let (app, state) = test_app(ErrorVerbosity::Full);

    send(&app, Method::POST, "/", Some(book_json(4.5))).await;

    let uri = format!("/{UNKNOWN_ID}");

    let (status, body) = send(&app, Method::PUT, &uri, Some(book_json(1.0))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Book not found");
    assert_eq!(body["error_type"], "NotFound");
    assert_eq!(
        body["error"]["reason"],
        format!("Book with id {UNKNOWN_ID} not found")
    );

    let (status, body) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "Book not found");

    let books = state.books().list().await;
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].rating, 4.5);
}

#[tokio::test]
async fn update_does_not_compare_body_id_with_path_id() {
    let (app, state) = test_app(ErrorVerbosity::Full);

    send(&app, Method::POST, "/", Some(book_json(4.5))).await;

    let mut replacement = book_json(3.0);
    replacement["id"] = json!(UNKNOWN_ID);

    let uri = format!("/{BOOK_ID}");

    let (status, body) = send(&app, Method::PUT, &uri, Some(replacement.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, replacement);

    let books = state.books().list().await;
    assert_eq!(books.len(), 1);
    assert_eq!(books[0].id, Uuid::parse_str(UNKNOWN_ID).expect("Valid uuid"));
}

#[tokio::test]
async fn create_rejects_invalid_books() {
    let (app, state) = test_app(ErrorVerbosity::Full);

    let invalid = [
        ("title", json!("")),
        ("author", json!("")),
        ("description", json!("")),
        ("rating", json!(-0.1)),
        ("rating", json!(5.1)),
    ];

    for (field, value) in invalid {
        let mut book = book_json(4.5);
        book[field] = value;

        let (status, body) = send(&app, Method::POST, "/", Some(book)).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "field: {field}");
        assert_eq!(body["error_type"], "Validation");
        assert!(
            body["error"]["validation_errors"].get(field).is_some(),
            "field: {field}"
        );
    }

    assert!(state.books().is_empty().await);
}

#[tokio::test]
async fn update_rejects_invalid_book() {
    let (app, state) = test_app(ErrorVerbosity::Full);

    send(&app, Method::POST, "/", Some(book_json(4.5))).await;

    let uri = format!("/{BOOK_ID}");

    let (status, body) = send(&app, Method::PUT, &uri, Some(book_json(7.0))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_type"], "Validation");

    assert_eq!(state.books().list().await[0].rating, 4.5);
}

#[tokio::test]
async fn create_accepts_rating_bounds() {
    let (app, state) = test_app(ErrorVerbosity::Full);

    for rating in [0.0, 5.0] {
        let (status, _) = send(&app, Method::POST, "/", Some(book_json(rating))).await;

        assert_eq!(status, StatusCode::OK);
    }

    let ratings: Vec<f64> = state
        .books()
        .list()
        .await
        .into_iter()
        .map(|Book { rating, .. }| rating)
        .collect();
    assert_eq!(ratings, vec![0.0, 5.0]);
}

#[tokio::test]
async fn create_rejects_malformed_body() {
    let (app, _) = test_app(ErrorVerbosity::Full);

    let mut malformed_id = book_json(4.5);
    malformed_id["id"] = json!("not-a-uuid");

    let (status, body) = send(&app, Method::POST, "/", Some(malformed_id)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_type"], "Body");
    assert!(body["error"]["body_expected_schema"].is_string());

    let (status, body) = send(&app, Method::POST, "/", Some(json!({ "id": BOOK_ID }))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error_type"], "Body");
}

#[tokio::test]
async fn malformed_book_id_is_rejected() {
    let (app, _) = test_app(ErrorVerbosity::Full);

    let (status, body) = send(&app, Method::DELETE, "/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error_type"], "Path");
    assert_eq!(body["detail"], "Failed to parse path parameters");

    let (status, _) = send(&app, Method::PUT, "/not-a-uuid", Some(book_json(4.5))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_route_is_not_found() {
    let (app, _) = test_app(ErrorVerbosity::Full);

    let (status, body) = send(&app, Method::GET, "/books/shelf", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error_type"], "NotFound");
    assert_eq!(body["detail"], "The requested resource was not found");
}

#[tokio::test]
async fn wrong_method_is_not_allowed() {
    let (app, _) = test_app(ErrorVerbosity::Full);

    let (status, body) = send(&app, Method::DELETE, "/", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error_type"], "MethodNotAllowed");

    let (status, _) = send(&app, Method::GET, &format!("/{BOOK_ID}"), None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
}

#[tokio::test]
async fn message_verbosity_only_returns_detail() {
    let (app, _) = test_app(ErrorVerbosity::Message);

    let (status, body) = send(&app, Method::DELETE, &format!("/{UNKNOWN_ID}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "detail": "Book not found" }));

    let mut book = book_json(4.5);
    book["title"] = json!("");

    let (status, body) = send(&app, Method::POST, "/", Some(book)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body, json!({ "detail": "Validation failed" }));
}

#[tokio::test]
async fn type_verbosity_hides_reasons() {
    let (app, _) = test_app(ErrorVerbosity::Type);

    let (status, body) = send(&app, Method::DELETE, &format!("/{UNKNOWN_ID}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(
        body,
        json!({ "detail": "Book not found", "error_type": "NotFound" })
    );

    let (status, body) = send(&app, Method::DELETE, "/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["path_error_reason"], Value::Null);
}

#[tokio::test]
async fn none_verbosity_keeps_status_and_drops_body() {
    let (app, _) = test_app(ErrorVerbosity::None);

    let (status, body) = send(&app, Method::DELETE, &format!("/{UNKNOWN_ID}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, Value::Null);

    let (status, body) = send(&app, Method::DELETE, "/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, Value::Null);
}

#[tokio::test]
async fn response_body_tracing_keeps_the_body() {
    let state = ApiState::new(ErrorVerbosity::Full, BookStore::new());
    let app = app(state, true);

    let (status, body) = send(&app, Method::POST, "/", Some(book_json(4.5))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, book_json(4.5));
}

#[tokio::test]
async fn openapi_document_describes_book_routes() {
    let (app, _) = test_app(ErrorVerbosity::Full);

    let (status, body) = send(&app, Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"].get("/").is_some());
    assert!(body["paths"].get("/{book_id}").is_some());
    assert!(body["components"]["schemas"].get("Book").is_some());
    assert!(body["components"]["schemas"]
        .get("DeleteBookResponse")
        .is_some());
}

#[tokio::test]
async fn unparsable_body_is_unprocessable() {
    let (app, state) = test_app(ErrorVerbosity::Full);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .expect("Failed to build request");

    let response = app.clone().oneshot(request).await.expect("Router is infallible");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let request = Request::builder()
        .method(Method::POST)
        .uri("/")
        .body(Body::from(book_json(4.5).to_string()))
        .expect("Failed to build request");

    let response = app.clone().oneshot(request).await.expect("Router is infallible");
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    assert!(state.books().is_empty().await);
}

fn numbered_book_json(id: u128, rating: f64) -> Value {
    json!({
        "id": Uuid::from_u128(id),
        "title": format!("Book {id}"),
        "author": "Author",
        "description": "Description",
        "rating": rating,
    })
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_requests_keep_the_store_consistent() {
    let seeded: Vec<Book> = (1..=50)
        .map(|id| {
            serde_json::from_value(numbered_book_json(id, 1.0)).expect("Seed book is valid")
        })
        .collect();

    let state = ApiState::new(ErrorVerbosity::Full, BookStore::with_books(seeded));
    let app = app(state.clone(), false);

    let mut requests = JoinSet::new();

    for id in 1000..1200 {
        let app = app.clone();
        requests.spawn(async move {
            send(&app, Method::POST, "/", Some(numbered_book_json(id, 2.0))).await
        });
    }

    for id in 1..=25 {
        let app = app.clone();
        let uri = format!("/{}", Uuid::from_u128(id));
        requests.spawn(async move {
            send(&app, Method::PUT, &uri, Some(numbered_book_json(id, 5.0))).await
        });
    }

    for id in 26..=50 {
        let app = app.clone();
        let uri = format!("/{}", Uuid::from_u128(id));
        requests.spawn(async move { send(&app, Method::DELETE, &uri, None).await });
    }

    while let Some(result) = requests.join_next().await {
        let (status, _) = result.expect("Request task panicked");
        assert_eq!(status, StatusCode::OK);
    }

    let books = state.books().list().await;
    assert_eq!(books.len(), 25 + 200);

    for id in 1000..1200 {
        assert!(books.iter().any(|book| book.id == Uuid::from_u128(id)));
    }

    for id in 1..=25 {
        let book = books
            .iter()
            .find(|book| book.id == Uuid::from_u128(id))
            .expect("Updated book is present");
        assert_eq!(book.rating, 5.0);
    }

    for id in 26..=50 {
        assert!(books.iter().all(|book| book.id != Uuid::from_u128(id)));
    }

    // Updated books keep their seeded order at the front.
    let front: Vec<Uuid> = books[..25].iter().map(|book| book.id).collect();
    let expected: Vec<Uuid> = (1..=25).map(Uuid::from_u128).collect();
    assert_eq!(front, expected);
}
