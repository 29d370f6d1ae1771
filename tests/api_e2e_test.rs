use axum::body::Body;
use axum::http::{Request, StatusCode};
use book_exchange::adapters::in_memory::{self, InMemoryStore, InMemoryUserDirectory};
use book_exchange::api::types::*;
use book_exchange::api::{AppState, create_router};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

// ============================================================================
// E2Eテスト用のヘルパー関数
// ============================================================================

/// インメモリのストアでルーターを組み立てる
fn setup_app() -> (axum::Router, Arc<InMemoryUserDirectory>) {
    let users = Arc::new(InMemoryUserDirectory::new());
    let service_deps = in_memory::dependencies(Arc::new(InMemoryStore::new()), users.clone());
    let app_state = Arc::new(AppState { service_deps });

    (create_router(app_state), users)
}

async fn send(app: &axum::Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json");
    let request = match body {
        Some(body) => request.body(Body::from(serde_json::to_string(&body).unwrap())),
        None => request.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    (status, bytes.to_vec())
}

fn parse<T: DeserializeOwned>(bytes: &[u8]) -> T {
    serde_json::from_slice(bytes).unwrap()
}

async fn register_book(app: &axum::Router, owner_id: Uuid, title: &str) -> BookResponse {
    let (status, body) = send(
        app,
        "POST",
        "/books/register",
        Some(json!({
            "ownerId": owner_id,
            "title": title,
            "author": "Test Author",
            "genre": "mystery",
            "condition": "like-new",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    parse(&body)
}

async fn create_request(
    app: &axum::Router,
    sender_id: Uuid,
    sender_book: &BookResponse,
    receiver_book: &BookResponse,
) -> (StatusCode, Vec<u8>) {
    send(
        app,
        "POST",
        "/requests",
        Some(json!({
            "senderId": sender_id,
            "senderBookId": sender_book.id,
            "receiverBookId": receiver_book.id,
        })),
    )
    .await
}

// ============================================================================
// E2Eテスト: 正常系フロー
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup_app();

    let (status, body) = send(&app, "GET", "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");
}

#[tokio::test]
async fn test_e2e_full_exchange_flow() {
    let (app, users) = setup_app();
    let alice = Uuid::new_v4();
    let bob = Uuid::new_v4();
    users
        .add_user(book_exchange::domain::UserId::from_uuid(bob), "Bob", "bob@example.com")
        .unwrap();

    let alice_book = register_book(&app, alice, "The Name of the Rose").await;
    let bob_book = register_book(&app, bob, "Gaudy Night").await;
    assert!(alice_book.is_available);
    assert_eq!(alice_book.status, "available");

    // Step 1: リクエスト作成（POST /requests）
    let (status, body) = create_request(&app, alice, &alice_book, &bob_book).await;
    assert_eq!(status, StatusCode::CREATED);
    let created: RequestDetailResponse = parse(&body);
    assert_eq!(created.request.status, "pending");
    assert_eq!(created.request.receiver_id, bob);

    // Step 2: 受け手が承認（PUT /requests/:id/accept）
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/requests/{}/accept", created.request.id),
        Some(json!({ "userId": bob, "shippingMethod": "express" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let accepted: ExchangeRequestResponse = parse(&body);
    assert_eq!(accepted.status, "accepted");

    // Step 3: 両方の書籍が交換済み
    for book_id in [alice_book.id, bob_book.id] {
        let (status, body) = send(&app, "GET", &format!("/books/{}", book_id), None).await;
        assert_eq!(status, StatusCode::OK);
        let book: BookResponse = parse(&body);
        assert_eq!(book.status, "exchanged");
        assert!(!book.is_available);
    }

    // Step 4: 注文はリクエストIDから取得できる
    let (status, body) = send(
        &app,
        "GET",
        &format!("/orders/request/{}", created.request.id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let order: OrderDetailResponse = parse(&body);
    assert_eq!(order.order.status, "pending");
    assert_eq!(order.order.shipping_method, "express");

    // Step 5: 配送状況を更新（PUT /orders/:id）
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/orders/{}", order.order.id),
        Some(json!({ "status": "shipped", "trackingNumber": "1Z999" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let shipped: OrderDetailResponse = parse(&body);
    assert_eq!(shipped.order.status, "shipped");
    assert_eq!(shipped.order.tracking_number.as_deref(), Some("1Z999"));

    // Step 6: 両者の注文一覧に表示される
    for user in [alice, bob] {
        let (status, body) = send(&app, "GET", &format!("/orders/user/{}", user), None).await;
        assert_eq!(status, StatusCode::OK);
        let orders: Vec<OrderDetailResponse> = parse(&body);
        assert_eq!(orders.len(), 1);
    }

    // Step 7: リクエスト一覧は利用者を解決済み（未登録の利用者はnull）
    let (status, body) = send(&app, "GET", &format!("/requests/user/{}", alice), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Value = parse(&body);
    assert_eq!(listed[0]["status"], "accepted");
    assert_eq!(listed[0]["receiver"]["name"], "Bob");
    assert!(listed[0]["sender"].is_null());
    assert_eq!(listed[0]["senderBook"]["title"], "The Name of the Rose");
}

// ============================================================================
// E2Eテスト: エラーケース
// ============================================================================

#[tokio::test]
async fn test_e2e_accept_by_sender_is_forbidden() {
    let (app, _) = setup_app();
    let alice = Uuid::new_v4();
    let alice_book = register_book(&app, alice, "Rebecca").await;
    let bob_book = register_book(&app, Uuid::new_v4(), "Emma").await;
    let (_, body) = create_request(&app, alice, &alice_book, &bob_book).await;
    let created: RequestDetailResponse = parse(&body);

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/requests/{}/accept", created.request.id),
        Some(json!({ "userId": alice })),
    )
    .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    let error: ErrorResponse = parse(&body);
    assert!(error.error);
    assert_eq!(error.message, "Not authorized to accept this request");
}

#[tokio::test]
async fn test_e2e_duplicate_request_is_bad_request() {
    let (app, _) = setup_app();
    let alice = Uuid::new_v4();
    let alice_book = register_book(&app, alice, "Rebecca").await;
    let bob_book = register_book(&app, Uuid::new_v4(), "Emma").await;

    let (status, _) = create_request(&app, alice, &alice_book, &bob_book).await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, body) = create_request(&app, alice, &alice_book, &bob_book).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.message, "Exchange request already exists");
}

#[tokio::test]
async fn test_e2e_unknown_book_is_not_found() {
    let (app, _) = setup_app();
    let alice = Uuid::new_v4();
    let alice_book = register_book(&app, alice, "Rebecca").await;

    let (status, body) = send(
        &app,
        "POST",
        "/requests",
        Some(json!({
            "senderId": alice,
            "senderBookId": alice_book.id,
            "receiverBookId": Uuid::new_v4(),
        })),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.message, "One or both books not found");
}

#[tokio::test]
async fn test_e2e_malformed_id_is_bad_request() {
    let (app, _) = setup_app();

    let (status, body) = send(
        &app,
        "PUT",
        "/requests/not-a-uuid/cancel",
        Some(json!({ "userId": Uuid::new_v4() })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert!(error.error);

    let (status, body) = send(&app, "GET", "/requests/user/xyz", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert!(error.error);

    let (status, body) = send(
        &app,
        "POST",
        "/requests",
        Some(json!({
            "senderId": "nope",
            "senderBookId": Uuid::new_v4(),
            "receiverBookId": Uuid::new_v4(),
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert!(error.error);
}

#[tokio::test]
async fn test_e2e_malformed_query_is_bad_request() {
    let (app, _) = setup_app();

    let (status, body) = send(&app, "GET", "/books?page=abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert!(error.error);
    assert!(!error.message.is_empty());

    let (status, body) = send(&app, "GET", "/books?page=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.message, "Page must be at least 1");
}

#[tokio::test]
async fn test_e2e_invalid_genre_is_rejected() {
    let (app, _) = setup_app();

    let (status, body) = send(
        &app,
        "POST",
        "/books/register",
        Some(json!({
            "ownerId": Uuid::new_v4(),
            "title": "Leaves of Grass",
            "author": "Walt Whitman",
            "genre": "poetry",
            "condition": "good",
        })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.message, "poetry is not a valid genre");
}

#[tokio::test]
async fn test_e2e_book_listing_pagination_shape() {
    let (app, _) = setup_app();
    let owner = Uuid::new_v4();
    for title in ["First Book", "Second Book", "Third Book"] {
        register_book(&app, owner, title).await;
    }

    let (status, body) = send(&app, "GET", "/books?page=2&limit=2", None).await;

    assert_eq!(status, StatusCode::OK);
    let page: BookPageResponse = parse(&body);
    assert_eq!(page.data.len(), 1);
    assert_eq!(page.pagination.current_page, 2);
    assert_eq!(page.pagination.total_pages, 2);
    assert_eq!(page.pagination.total_items, 3);
    assert_eq!(page.pagination.items_per_page, 2);

    let (status, body) = send(&app, "GET", "/books/search?title=second", None).await;
    assert_eq!(status, StatusCode::OK);
    let found: Vec<BookResponse> = parse(&body);
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].title, "Second Book");
}

#[tokio::test]
async fn test_e2e_bookmark_lifecycle() {
    let (app, _) = setup_app();
    let reader = Uuid::new_v4();
    let book = register_book(&app, Uuid::new_v4(), "Middlemarch").await;

    let (status, body) = send(
        &app,
        "POST",
        "/bookmarks",
        Some(json!({ "userId": reader, "bookId": book.id, "notes": "after exams" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let saved: BookmarkResponse = parse(&body);
    assert_eq!(saved.book.map(|b| b.id), Some(book.id));

    let (status, body) = send(&app, "GET", &format!("/bookmarks/user/{}", reader), None).await;
    assert_eq!(status, StatusCode::OK);
    let listed: Vec<BookmarkResponse> = parse(&body);
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].notes.as_deref(), Some("after exams"));

    let uri = format!("/bookmarks/user/{}/book/{}", reader, book.id);
    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: ErrorResponse = parse(&body);
    assert_eq!(error.message, "Bookmark not found");
}
