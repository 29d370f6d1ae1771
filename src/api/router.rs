use axum::{
    Router,
    routing::{get, post, put},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{AppState, bookmarks, books, orders, requests};

/// Creates the API router with all marketplace endpoints
///
/// Books:
/// - GET /books, GET /books/search, GET /books/user/:userId
/// - POST /books/register
/// - GET / PUT / DELETE /books/:id
///
/// Bookmarks:
/// - GET /bookmarks/user/:userId, POST /bookmarks
/// - DELETE /bookmarks/user/:userId/book/:bookId
///
/// Exchange requests:
/// - POST /requests, GET /requests/user/:userId
/// - PUT /requests/:id/accept, /reject, /cancel
///
/// Orders:
/// - POST /orders, PUT /orders/:id
/// - GET /orders/user/:userId, GET /orders/request/:requestId
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check endpoint
        .route("/health", get(health_check))
        // Book registry
        .route("/books", get(books::list_books))
        .route("/books/search", get(books::search_books))
        .route("/books/register", post(books::register_book))
        .route("/books/user/:user_id", get(books::list_books_by_owner))
        .route(
            "/books/:id",
            get(books::get_book)
                .put(books::update_book)
                .delete(books::delete_book),
        )
        // Bookmarks
        .route("/bookmarks", post(bookmarks::save_bookmark))
        .route(
            "/bookmarks/user/:user_id",
            get(bookmarks::list_bookmarks_for_user),
        )
        .route(
            "/bookmarks/user/:user_id/book/:book_id",
            axum::routing::delete(bookmarks::remove_bookmark),
        )
        // Exchange requests
        .route("/requests", post(requests::create_request))
        .route(
            "/requests/user/:user_id",
            get(requests::list_requests_for_user),
        )
        .route("/requests/:id/accept", put(requests::accept_request))
        .route("/requests/:id/reject", put(requests::reject_request))
        .route("/requests/:id/cancel", put(requests::cancel_request))
        // Orders
        .route("/orders", post(orders::create_order))
        .route("/orders/:id", put(orders::update_order))
        .route("/orders/user/:user_id", get(orders::list_orders_for_user))
        .route(
            "/orders/request/:request_id",
            get(orders::get_order_for_request),
        )
        // Add tracing middleware
        .layer(TraceLayer::new_for_http())
        // Add application state
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}
