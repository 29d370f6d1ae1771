use crate::domain::{self, CreateOrderError, RequestId, UserId, commands::*};
use crate::ports::*;

use crate::application::{
    ApplicationError, OrderView, Result, ServiceDependencies, views::resolve_orders,
};

const ORDER_NOT_FOUND: &str = "Order not found";

/// 承認済みリクエストに対して注文を作成する
///
/// 承認時に注文は自動作成されるため、既に注文がある場合はConflictになる。
/// 既存チェックと挿入はストア側で不可分に行われる。
pub async fn create_order(deps: &ServiceDependencies, cmd: CreateOrder) -> Result<OrderView> {
    let request = deps
        .exchange_store
        .get_by_id(cmd.request_id)
        .await
        .map_err(ApplicationError::Store)?
        .ok_or_else(|| ApplicationError::NotFound("Exchange request not found".to_string()))?;

    let order =
        domain::order::create_order_for_request(&request, cmd.shipping_method, cmd.created_at)
            .map_err(|e| match e {
                CreateOrderError::RequestNotAccepted(_) => ApplicationError::Conflict(
                    "Can only create orders for accepted exchange requests".to_string(),
                ),
            })?;

    let outcome = deps
        .order_repository
        .insert_for_request(order.clone())
        .await
        .map_err(ApplicationError::Store)?;

    if outcome == InsertOrderOutcome::AlreadyExists {
        return Err(ApplicationError::Conflict(
            "Order already exists for this exchange request".to_string(),
        ));
    }

    tracing::info!(order_id = %order.order_id, request_id = %order.request_id, "Order created");

    first_view(deps, order).await
}

/// 配送状況を更新する（部分更新）
pub async fn update_order(deps: &ServiceDependencies, cmd: UpdateOrder) -> Result<OrderView> {
    let order = deps
        .order_repository
        .get_by_id(cmd.order_id)
        .await
        .map_err(ApplicationError::Store)?
        .ok_or_else(|| ApplicationError::NotFound(ORDER_NOT_FOUND.to_string()))?;

    let updated = domain::order::update_order(&order, cmd)
        .map_err(|e| ApplicationError::Validation(e.to_string()))?;

    deps.order_repository
        .update(updated.clone())
        .await
        .map_err(ApplicationError::Store)?;

    tracing::info!(
        order_id = %updated.order_id,
        status = updated.status.as_str(),
        "Order updated"
    );

    first_view(deps, updated).await
}

/// 利用者が関わる交換の注文一覧（作成日時の新しい順）
pub async fn list_orders_for_user(
    deps: &ServiceDependencies,
    user_id: UserId,
) -> Result<Vec<OrderView>> {
    let orders = deps
        .order_repository
        .find_by_user(user_id)
        .await
        .map_err(ApplicationError::Store)?;

    resolve_orders(deps, orders).await
}

/// リクエストIDから注文を取得する
///
/// 承認のレスポンスには注文が含まれないため、クライアントはこれで注文を見つける。
pub async fn find_order_by_request(
    deps: &ServiceDependencies,
    request_id: RequestId,
) -> Result<OrderView> {
    let order = deps
        .order_repository
        .get_by_request_id(request_id)
        .await
        .map_err(ApplicationError::Store)?
        .ok_or_else(|| ApplicationError::NotFound(ORDER_NOT_FOUND.to_string()))?;

    first_view(deps, order).await
}

async fn first_view(deps: &ServiceDependencies, order: domain::order::Order) -> Result<OrderView> {
    let order_id = order.order_id;
    resolve_orders(deps, vec![order])
        .await?
        .into_iter()
        .next()
        .ok_or_else(|| {
            tracing::error!(order_id = %order_id, "Order view could not be resolved");
            ApplicationError::NotFound(ORDER_NOT_FOUND.to_string())
        })
}
