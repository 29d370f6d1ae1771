use crate::application::ApplicationError;
use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(ApplicationError);

impl From<ApplicationError> for ApiError {
    fn from(err: ApplicationError) -> Self {
        ApiError(err)
    }
}

/// JSONボディの解析失敗（不正なUUID、列挙値の型違いなど）は400として扱う
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(ApplicationError::Validation(rejection.body_text()))
    }
}

/// パスパラメータの解析失敗（不正なUUIDなど）は400として扱う
impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError(ApplicationError::Validation(rejection.body_text()))
    }
}

/// クエリ文字列の解析失敗（数値でないページ番号など）は400として扱う
impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError(ApplicationError::Validation(rejection.body_text()))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self.0 {
            // 404 Not Found - リクエストされたリソースが存在しない
            ApplicationError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),

            // 403 Forbidden - 操作者が送り手・受け手・所有者でない
            ApplicationError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg),

            // 400 Bad Request - 状態遷移の違反、入力値の不正
            ApplicationError::Conflict(msg) | ApplicationError::Validation(msg) => {
                (StatusCode::BAD_REQUEST, msg)
            }

            // 500 Internal Server Error - 永続化層の障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            ApplicationError::Store(ref e) => {
                tracing::error!("Store error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse::new(message))).into_response()
    }
}
