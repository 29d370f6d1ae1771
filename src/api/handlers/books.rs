use crate::application::catalog;
use crate::domain::{BookId, UserId, commands::*};
use crate::ports::BookSearch;
use axum::{
    Json,
    extract::{Path, Query, State, rejection::{JsonRejection, PathRejection, QueryRejection}},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{AppState, parse_field, parse_optional};
use crate::api::{
    error::ApiError,
    types::{
        BookPageResponse, BookResponse, ListBooksQuery, MessageResponse, RegisterBookBody,
        SearchBooksQuery, UpdateBookBody,
    },
};

/// GET /books?page&limit - 書籍一覧（新しい順、ページング）
pub async fn list_books(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ListBooksQuery>, QueryRejection>,
) -> Result<Json<BookPageResponse>, ApiError> {
    let Query(query) = query?;
    let page = catalog::list_books(&state.service_deps, query.page, query.limit).await?;

    Ok(Json(page.into()))
}

/// GET /books/search?title&author&genre - 部分一致検索
pub async fn search_books(
    State(state): State<Arc<AppState>>,
    query: Result<Query<SearchBooksQuery>, QueryRejection>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let Query(query) = query?;
    let criteria = BookSearch {
        title: query.title,
        author: query.author,
        genre: query.genre,
    };

    let books = catalog::search_books(&state.service_deps, criteria).await?;

    Ok(Json(books.into_iter().map(Into::into).collect()))
}

/// GET /books/user/:userId - 利用者が出品している書籍
pub async fn list_books_by_owner(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<BookResponse>>, ApiError> {
    let Path(user_id) = path?;
    let books =
        catalog::list_books_by_owner(&state.service_deps, UserId::from_uuid(user_id)).await?;

    Ok(Json(books.into_iter().map(Into::into).collect()))
}

/// GET /books/:id
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<BookResponse>, ApiError> {
    let Path(book_id) = path?;
    let book = catalog::get_book(&state.service_deps, BookId::from_uuid(book_id)).await?;

    Ok(Json(book.into()))
}

/// POST /books/register - 書籍を登録
pub async fn register_book(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterBookBody>, JsonRejection>,
) -> Result<(StatusCode, Json<BookResponse>), ApiError> {
    let Json(req) = payload?;

    let cmd = RegisterBook {
        owner_id: UserId::from_uuid(req.owner_id),
        title: req.title,
        author: req.author,
        genre: parse_field(&req.genre)?,
        condition: parse_field(&req.condition)?,
        description: req.description,
        image_url: req.image_url,
        registered_at: chrono::Utc::now(),
    };

    let book = catalog::register_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(book.into())))
}

/// PUT /books/:id - 書籍情報を更新（部分更新）
pub async fn update_book(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateBookBody>, JsonRejection>,
) -> Result<Json<BookResponse>, ApiError> {
    let Path(book_id) = path?;
    let Json(req) = payload?;

    let cmd = UpdateBook {
        book_id: BookId::from_uuid(book_id),
        title: req.title,
        author: req.author,
        genre: parse_optional(req.genre)?,
        condition: parse_optional(req.condition)?,
        status: parse_optional(req.status)?,
        description: req.description,
        image_url: req.image_url,
        updated_at: chrono::Utc::now(),
    };

    let book = catalog::update_book(&state.service_deps, cmd).await?;

    Ok(Json(book.into()))
}

/// DELETE /books/:id
///
/// 交換リクエストから参照されている書籍は削除できない。
pub async fn delete_book(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path(book_id) = path?;
    catalog::delete_book(&state.service_deps, BookId::from_uuid(book_id)).await?;

    Ok(Json(MessageResponse::new("Book deleted successfully")))
}
