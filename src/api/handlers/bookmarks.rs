use crate::application::catalog;
use crate::domain::{BookId, UserId, commands::SaveBookmark};
use axum::{
    Json,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
};
use std::sync::Arc;
use uuid::Uuid;

use super::AppState;
use crate::api::{
    error::ApiError,
    types::{BookmarkResponse, MessageResponse, SaveBookmarkBody},
};

/// GET /bookmarks/user/:userId - 新しい順、書籍を解決済み
pub async fn list_bookmarks_for_user(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<BookmarkResponse>>, ApiError> {
    let Path(user_id) = path?;
    let views =
        catalog::list_bookmarks_for_user(&state.service_deps, UserId::from_uuid(user_id)).await?;

    Ok(Json(views.into_iter().map(Into::into).collect()))
}

/// POST /bookmarks - ブックマークを保存（既存ならメモを更新）
pub async fn save_bookmark(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SaveBookmarkBody>, JsonRejection>,
) -> Result<Json<BookmarkResponse>, ApiError> {
    let Json(req) = payload?;

    let cmd = SaveBookmark {
        user_id: UserId::from_uuid(req.user_id),
        book_id: BookId::from_uuid(req.book_id),
        notes: req.notes,
        saved_at: chrono::Utc::now(),
    };

    let view = catalog::save_bookmark(&state.service_deps, cmd).await?;

    Ok(Json(view.into()))
}

/// DELETE /bookmarks/user/:userId/book/:bookId
pub async fn remove_bookmark(
    State(state): State<Arc<AppState>>,
    path: Result<Path<(Uuid, Uuid)>, PathRejection>,
) -> Result<Json<MessageResponse>, ApiError> {
    let Path((user_id, book_id)) = path?;
    catalog::remove_bookmark(
        &state.service_deps,
        UserId::from_uuid(user_id),
        BookId::from_uuid(book_id),
    )
    .await?;

    Ok(Json(MessageResponse::new("Bookmark removed successfully")))
}
