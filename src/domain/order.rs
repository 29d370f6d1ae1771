use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    CreateOrderError, OrderId, OrderValidationError, OrderStatus, RequestId, RequestStatus, ShippingMethod,
    commands::UpdateOrder, exchange::ExchangeRequest,
};

/// 追跡番号の最大文字数
pub const TRACKING_NUMBER_MAX_CHARS: usize = 100;

/// Order集約 - 承認済み交換の配送追跡
///
/// 承認済みリクエスト1件につき注文は1件のみ。
/// 作成後はリクエストの状態遷移とは独立して更新される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub request_id: RequestId,
    pub status: OrderStatus,
    pub shipping_method: ShippingMethod,
    pub tracking_number: Option<String>,
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 純粋関数：新しい注文を作成する（ステータスはPending）
pub fn open_order(
    request_id: RequestId,
    shipping_method: ShippingMethod,
    created_at: DateTime<Utc>,
) -> Order {
    Order {
        order_id: OrderId::new(),
        request_id,
        status: OrderStatus::Pending,
        shipping_method,
        tracking_number: None,
        estimated_delivery_date: None,
        created_at,
        updated_at: created_at,
    }
}

/// 純粋関数：承認済みリクエストに対して注文を作成する
///
/// 承認時に注文は自動作成されるため、通常この経路は使われない。
/// 既存注文の有無はストア側の一意制約で判定する。
pub fn create_order_for_request(
    request: &ExchangeRequest,
    shipping_method: ShippingMethod,
    created_at: DateTime<Utc>,
) -> Result<Order, CreateOrderError> {
    if request.status != RequestStatus::Accepted {
        return Err(CreateOrderError::RequestNotAccepted(request.status));
    }
    Ok(open_order(request.request_id, shipping_method, created_at))
}

/// 純粋関数：配送状況を更新する
///
/// 指定されたフィールドのみ置き換える。ステータス遷移の制約はない。
/// 空の追跡番号は未指定として扱う。
///
/// ビジネスルール：
/// - 追跡番号は前後の空白を除いて100文字まで
pub fn update_order(order: &Order, cmd: UpdateOrder) -> Result<Order, OrderValidationError> {
    let tracking_number = cmd
        .tracking_number
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    if let Some(t) = &tracking_number {
        if t.chars().count() > TRACKING_NUMBER_MAX_CHARS {
            return Err(OrderValidationError::TrackingNumberTooLong);
        }
    }

    Ok(Order {
        status: cmd.status.unwrap_or(order.status),
        tracking_number: tracking_number.or_else(|| order.tracking_number.clone()),
        estimated_delivery_date: cmd
            .estimated_delivery_date
            .or(order.estimated_delivery_date),
        updated_at: cmd.updated_at,
        ..order.clone()
    })
}
