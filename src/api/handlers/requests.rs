use crate::application::exchange;
use crate::domain::{BookId, RequestId, ShippingMethod, UserId, commands::*};
use axum::{
    Json,
    extract::{Path, State, rejection::{JsonRejection, PathRejection}},
    http::StatusCode,
};
use std::sync::Arc;
use uuid::Uuid;

use super::{AppState, parse_optional};
use crate::api::{
    error::ApiError,
    types::{
        AcceptRequestBody, ActingUserBody, CreateRequestBody, ExchangeRequestResponse,
        RequestDetailResponse,
    },
};

/// POST /requests - 交換リクエストを送る
///
/// 強制されるビジネスルール:
/// - 両方の書籍が存在すること
/// - 送り手が送り手側の書籍を所有していること
/// - 両方の書籍が交換可能であること
/// - 同じ書籍ペアの保留中リクエストがないこと
pub async fn create_request(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateRequestBody>, JsonRejection>,
) -> Result<(StatusCode, Json<RequestDetailResponse>), ApiError> {
    let Json(req) = payload?;

    let cmd = CreateExchangeRequest {
        sender_id: UserId::from_uuid(req.sender_id),
        sender_book_id: BookId::from_uuid(req.sender_book_id),
        receiver_book_id: BookId::from_uuid(req.receiver_book_id),
        requested_at: chrono::Utc::now(),
    };

    let view = exchange::create_request(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(view.into())))
}

/// PUT /requests/:id/accept - 交換リクエストを承認
///
/// リクエストの承認・注文の作成・両方の書籍の交換済み化を1つの単位で行う。
/// 作成された注文は GET /orders/request/:requestId で取得できる。
pub async fn accept_request(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<AcceptRequestBody>, JsonRejection>,
) -> Result<Json<ExchangeRequestResponse>, ApiError> {
    let Path(request_id) = path?;
    let Json(req) = payload?;
    let shipping_method: Option<ShippingMethod> = parse_optional(req.shipping_method)?;

    let cmd = AcceptExchangeRequest {
        request_id: RequestId::from_uuid(request_id),
        acting_user_id: UserId::from_uuid(req.user_id),
        shipping_method: shipping_method.unwrap_or_default(),
        accepted_at: chrono::Utc::now(),
    };

    let accepted = exchange::accept_request(&state.service_deps, cmd).await?;

    Ok(Json(accepted.into()))
}

/// PUT /requests/:id/reject - 交換リクエストを拒否（受け手のみ）
pub async fn reject_request(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ActingUserBody>, JsonRejection>,
) -> Result<Json<ExchangeRequestResponse>, ApiError> {
    let Path(request_id) = path?;
    let Json(req) = payload?;

    let cmd = RejectExchangeRequest {
        request_id: RequestId::from_uuid(request_id),
        acting_user_id: UserId::from_uuid(req.user_id),
        rejected_at: chrono::Utc::now(),
    };

    let rejected = exchange::reject_request(&state.service_deps, cmd).await?;

    Ok(Json(rejected.into()))
}

/// PUT /requests/:id/cancel - 交換リクエストを取り消し（送り手のみ）
pub async fn cancel_request(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<ActingUserBody>, JsonRejection>,
) -> Result<Json<ExchangeRequestResponse>, ApiError> {
    let Path(request_id) = path?;
    let Json(req) = payload?;

    let cmd = CancelExchangeRequest {
        request_id: RequestId::from_uuid(request_id),
        acting_user_id: UserId::from_uuid(req.user_id),
        cancelled_at: chrono::Utc::now(),
    };

    let cancelled = exchange::cancel_request(&state.service_deps, cmd).await?;

    Ok(Json(cancelled.into()))
}

/// GET /requests/user/:userId - 利用者が関わるリクエスト一覧（新しい順）
pub async fn list_requests_for_user(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<RequestDetailResponse>>, ApiError> {
    let Path(user_id) = path?;
    let views =
        exchange::list_requests_for_user(&state.service_deps, UserId::from_uuid(user_id)).await?;

    Ok(Json(views.into_iter().map(Into::into).collect()))
}
