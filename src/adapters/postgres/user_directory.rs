use crate::domain::UserId;
use crate::ports::user_directory::{Result, UserDirectory as UserDirectoryTrait, UserSummary};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use uuid::Uuid;

/// UserDirectoryのPostgreSQL実装
///
/// 利用者管理コンテキストが管理する`users`テーブルを読み取り専用で参照する。
pub struct UserDirectory {
    pool: PgPool,
}

impl UserDirectory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserDirectoryTrait for UserDirectory {
    async fn find_summaries(&self, user_ids: &[UserId]) -> Result<Vec<UserSummary>> {
        if user_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = user_ids.iter().map(|id| id.value()).collect();

        let rows = sqlx::query("SELECT user_id, name, email FROM users WHERE user_id = ANY($1)")
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows
            .iter()
            .map(|row| UserSummary {
                user_id: UserId::from_uuid(row.get("user_id")),
                name: row.get("name"),
                email: row.get("email"),
            })
            .collect())
    }
}
