use crate::domain::{
    BookId, RequestId, RequestStatus, UserId,
    exchange::{Acceptance, ExchangeRequest},
};
use crate::ports::exchange_store::{
    AcceptOutcome, ExchangeStore as ExchangeStoreTrait, InsertOutcome, Result, TransitionOutcome,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;
use uuid::Uuid;

use super::{invalid_data, unique_violation};

const ONE_PENDING_PER_PAIR: &str = "exchange_requests_one_pending_per_pair";

const REQUEST_COLUMNS: &str = r#"
    request_id, sender_id, sender_book_id, receiver_id, receiver_book_id,
    status, created_at, updated_at
"#;

fn map_row_to_request(row: &PgRow) -> Result<ExchangeRequest> {
    let status: &str = row.get("status");

    Ok(ExchangeRequest {
        request_id: RequestId::from_uuid(row.get("request_id")),
        sender_id: UserId::from_uuid(row.get("sender_id")),
        sender_book_id: BookId::from_uuid(row.get("sender_book_id")),
        receiver_id: UserId::from_uuid(row.get("receiver_id")),
        receiver_book_id: BookId::from_uuid(row.get("receiver_book_id")),
        status: RequestStatus::from_str(status).map_err(invalid_data)?,
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// ExchangeStoreのPostgreSQL実装
///
/// 承認時の書き込み（リクエスト・注文・書籍2冊）は1つのトランザクションで実行する。
/// 各書き込みは検証済みの状態を条件とするため、競合に負けた承認は
/// 中途半端な書き込みではなく型付きの結果として観測される。
pub struct ExchangeStore {
    pool: PgPool,
}

impl ExchangeStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ExchangeStoreTrait for ExchangeStore {
    /// 重複の検出は保留中ペアに対する部分一意インデックスに任せる
    async fn insert_pending(&self, request: ExchangeRequest) -> Result<InsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO exchange_requests (
                request_id, sender_id, sender_book_id, receiver_id, receiver_book_id,
                status, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(request.request_id.value())
        .bind(request.sender_id.value())
        .bind(request.sender_book_id.value())
        .bind(request.receiver_id.value())
        .bind(request.receiver_book_id.value())
        .bind(request.status.as_str())
        .bind(request.created_at)
        .bind(request.updated_at)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(InsertOutcome::Inserted),
            Err(e) if unique_violation(&e).as_deref() == Some(ONE_PENDING_PER_PAIR) => {
                Ok(InsertOutcome::DuplicatePending)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn get_by_id(&self, request_id: RequestId) -> Result<Option<ExchangeRequest>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM exchange_requests WHERE request_id = $1",
            REQUEST_COLUMNS
        ))
        .bind(request_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_request).transpose()
    }

    async fn find_by_ids(&self, request_ids: &[RequestId]) -> Result<Vec<ExchangeRequest>> {
        if request_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = request_ids.iter().map(|id| id.value()).collect();

        let rows = sqlx::query(&format!(
            "SELECT {} FROM exchange_requests WHERE request_id = ANY($1)",
            REQUEST_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_request).collect()
    }

    async fn apply_transition(&self, request: ExchangeRequest) -> Result<TransitionOutcome> {
        let result = sqlx::query(
            r#"
            UPDATE exchange_requests
            SET status = $2, updated_at = $3
            WHERE request_id = $1 AND status = 'pending'
            "#,
        )
        .bind(request.request_id.value())
        .bind(request.status.as_str())
        .bind(request.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 1 {
            Ok(TransitionOutcome::Applied)
        } else {
            Ok(TransitionOutcome::Stale)
        }
    }

    /// 承認を原子的にコミットする
    ///
    /// 1. リクエスト行をロックし、まだPendingであることを確認
    /// 2. 書籍2行をID順にロック（重なり合う承認同士のデッドロックを防ぐ）
    /// 3. まだ交換可能な場合のみ両方の書籍を交換済みにする
    /// 4. リクエストを承認済みにする
    /// 5. 注文を挿入（リクエストごとに一意）
    ///
    /// 途中でreturnするとトランザクションがdropされ、ロールバックされる。
    async fn commit_acceptance(&self, acceptance: Acceptance) -> Result<AcceptOutcome> {
        let request_id = acceptance.request.request_id;
        let mut tx = self.pool.begin().await?;

        let current: Option<String> = sqlx::query_scalar(
            "SELECT status FROM exchange_requests WHERE request_id = $1 FOR UPDATE",
        )
        .bind(request_id.value())
        .fetch_optional(&mut *tx)
        .await?;

        match current.as_deref() {
            Some("pending") => {}
            Some(_) => return Ok(AcceptOutcome::RequestNotPending),
            None => {
                return Err(format!("exchange request {} disappeared during accept", request_id)
                    .into());
            }
        }

        let mut book_ids: Vec<Uuid> = acceptance.book_ids().iter().map(|id| id.value()).collect();
        book_ids.sort();

        sqlx::query("SELECT book_id FROM books WHERE book_id = ANY($1) ORDER BY book_id FOR UPDATE")
            .bind(&book_ids)
            .fetch_all(&mut *tx)
            .await?;

        let exchanged = sqlx::query(
            r#"
            UPDATE books
            SET status = 'exchanged', updated_at = $2
            WHERE book_id = ANY($1) AND status = 'available'
            "#,
        )
        .bind(&book_ids)
        .bind(acceptance.accepted_at)
        .execute(&mut *tx)
        .await?;

        if exchanged.rows_affected() != 2 {
            tracing::debug!(
                request_id = %request_id,
                updated = exchanged.rows_affected(),
                "Books no longer available, rolling back"
            );
            return Ok(AcceptOutcome::BooksUnavailable);
        }

        sqlx::query(
            r#"
            UPDATE exchange_requests
            SET status = $2, updated_at = $3
            WHERE request_id = $1 AND status = 'pending'
            "#,
        )
        .bind(request_id.value())
        .bind(acceptance.request.status.as_str())
        .bind(acceptance.request.updated_at)
        .execute(&mut *tx)
        .await?;

        let order = &acceptance.order;
        sqlx::query(
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
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(AcceptOutcome::Committed)
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<ExchangeRequest>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM exchange_requests
            WHERE sender_id = $1 OR receiver_id = $1
            ORDER BY created_at DESC
            "#,
            REQUEST_COLUMNS
        ))
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_request).collect()
    }
}
