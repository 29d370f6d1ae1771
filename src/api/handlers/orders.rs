use crate::application::order;
use crate::domain::{OrderId, OrderStatus, RequestId, ShippingMethod, UserId, commands::*};
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
    types::{CreateOrderBody, OrderDetailResponse, UpdateOrderBody},
};

/// POST /orders - 承認済みリクエストの注文を作成
///
/// 承認時に注文は作成済みのため、通常は「既に存在する」エラーになる。
pub async fn create_order(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CreateOrderBody>, JsonRejection>,
) -> Result<(StatusCode, Json<OrderDetailResponse>), ApiError> {
    let Json(req) = payload?;
    let shipping_method: Option<ShippingMethod> = parse_optional(req.shipping_method)?;

    let cmd = CreateOrder {
        request_id: RequestId::from_uuid(req.request_id),
        shipping_method: shipping_method.unwrap_or_default(),
        created_at: chrono::Utc::now(),
    };

    let view = order::create_order(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(view.into())))
}

/// PUT /orders/:id - 配送状況を更新（部分更新）
pub async fn update_order(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
    payload: Result<Json<UpdateOrderBody>, JsonRejection>,
) -> Result<Json<OrderDetailResponse>, ApiError> {
    let Path(order_id) = path?;
    let Json(req) = payload?;
    let status: Option<OrderStatus> = parse_optional(req.status)?;

    let cmd = UpdateOrder {
        order_id: OrderId::from_uuid(order_id),
        status,
        tracking_number: req.tracking_number,
        estimated_delivery_date: req.estimated_delivery_date,
        updated_at: chrono::Utc::now(),
    };

    let view = order::update_order(&state.service_deps, cmd).await?;

    Ok(Json(view.into()))
}

/// GET /orders/user/:userId
pub async fn list_orders_for_user(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<Vec<OrderDetailResponse>>, ApiError> {
    let Path(user_id) = path?;
    let views = order::list_orders_for_user(&state.service_deps, UserId::from_uuid(user_id)).await?;

    Ok(Json(views.into_iter().map(Into::into).collect()))
}

/// GET /orders/request/:requestId
pub async fn get_order_for_request(
    State(state): State<Arc<AppState>>,
    path: Result<Path<Uuid>, PathRejection>,
) -> Result<Json<OrderDetailResponse>, ApiError> {
    let Path(request_id) = path?;
    let view =
        order::find_order_by_request(&state.service_deps, RequestId::from_uuid(request_id)).await?;

    Ok(Json(view.into()))
}
