use crate::domain::{
    OrderId, OrderStatus, RequestId, ShippingMethod, UserId, order::Order,
};
use crate::ports::order_repository::{
    InsertOrderOutcome, OrderRepository as OrderRepositoryTrait, Result,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

use super::{invalid_data, unique_violation};

const ORDERS_REQUEST_ID_UNIQUE: &str = "orders_request_id_unique";

const ORDER_COLUMNS: &str = r#"
    o.order_id, o.request_id, o.status, o.shipping_method,
    o.tracking_number, o.estimated_delivery_date, o.created_at, o.updated_at
"#;

fn map_row_to_order(row: &PgRow) -> Result<Order> {
    let status: &str = row.get("status");
    let shipping_method: &str = row.get("shipping_method");

    Ok(Order {
        order_id: OrderId::from_uuid(row.get("order_id")),
        request_id: RequestId::from_uuid(row.get("request_id")),
        status: OrderStatus::from_str(status).map_err(invalid_data)?,
        shipping_method: ShippingMethod::from_str(shipping_method).map_err(invalid_data)?,
        tracking_number: row.get("tracking_number"),
        estimated_delivery_date: row.get("estimated_delivery_date"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// OrderRepositoryのPostgreSQL実装
pub struct OrderRepository {
    pool: PgPool,
}

impl OrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderRepositoryTrait for OrderRepository {
    /// request_idの一意制約違反は`AlreadyExists`
    async fn insert_for_request(&self, order: Order) -> Result<InsertOrderOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO orders (
                order_id, request_id, status, shipping_method,
                tracking_number, estimated_delivery_date, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(order.order_id.value())
        .bind(order.request_id.value())
        .bind(order.status.as_str())
        .bind(order.shipping_method.as_str())
        .bind(&order.tracking_number)
        .bind(order.estimated_delivery_date)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertOrderOutcome::Inserted),
            Err(e) if unique_violation(&e).as_deref() == Some(ORDERS_REQUEST_ID_UNIQUE) => {
                Ok(InsertOrderOutcome::AlreadyExists)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_by_id(&self, order_id: OrderId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM orders o WHERE o.order_id = $1",
            ORDER_COLUMNS
        ))
        .bind(order_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_order).transpose()
    }

    async fn get_by_request_id(&self, request_id: RequestId) -> Result<Option<Order>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM orders o WHERE o.request_id = $1",
            ORDER_COLUMNS
        ))
        .bind(request_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_order).transpose()
    }

    async fn update(&self, order: Order) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE orders
            SET status = $2,
                tracking_number = $3,
                estimated_delivery_date = $4,
                updated_at = $5
            WHERE order_id = $1
            "#,
        )
        .bind(order.order_id.value())
        .bind(order.status.as_str())
        .bind(&order.tracking_number)
        .bind(order.estimated_delivery_date)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM orders o
            JOIN exchange_requests r ON r.request_id = o.request_id
            WHERE r.sender_id = $1 OR r.receiver_id = $1
            ORDER BY o.created_at DESC
            "#,
            ORDER_COLUMNS
        ))
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_order).collect()
    }
}
