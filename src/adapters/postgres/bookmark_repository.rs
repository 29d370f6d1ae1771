use crate::domain::{BookId, BookmarkId, UserId, bookmark::Bookmark};
use crate::ports::bookmark_repository::{BookmarkRepository as BookmarkRepositoryTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};

fn map_row_to_bookmark(row: &PgRow) -> Bookmark {
    Bookmark {
        bookmark_id: BookmarkId::from_uuid(row.get("bookmark_id")),
        user_id: UserId::from_uuid(row.get("user_id")),
        book_id: BookId::from_uuid(row.get("book_id")),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// BookmarkRepositoryのPostgreSQL実装
pub struct BookmarkRepository {
    pool: PgPool,
}

impl BookmarkRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookmarkRepositoryTrait for BookmarkRepository {
    async fn find(&self, user_id: UserId, book_id: BookId) -> Result<Option<Bookmark>> {
        let row = sqlx::query(
            r#"
            SELECT bookmark_id, user_id, book_id, notes, created_at, updated_at
            FROM bookmarks
            WHERE user_id = $1 AND book_id = $2
            "#,
        )
        .bind(user_id.value())
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.as_ref().map(map_row_to_bookmark))
    }

    /// INSERT ... ON CONFLICT で(user_id, book_id)ごとに1件を保つ
    async fn save(&self, bookmark: Bookmark) -> Result<Bookmark> {
        let row = sqlx::query(
            r#"
            INSERT INTO bookmarks (bookmark_id, user_id, book_id, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (user_id, book_id)
            DO UPDATE SET
                notes = EXCLUDED.notes,
                updated_at = EXCLUDED.updated_at
            RETURNING bookmark_id, user_id, book_id, notes, created_at, updated_at
            "#,
        )
        .bind(bookmark.bookmark_id.value())
        .bind(bookmark.user_id.value())
        .bind(bookmark.book_id.value())
        .bind(&bookmark.notes)
        .bind(bookmark.created_at)
        .bind(bookmark.updated_at)
        .fetch_one(&self.pool)
        .await?;

        Ok(map_row_to_bookmark(&row))
    }

    async fn delete(&self, user_id: UserId, book_id: BookId) -> Result<bool> {
        let result = sqlx::query("DELETE FROM bookmarks WHERE user_id = $1 AND book_id = $2")
            .bind(user_id.value())
            .bind(book_id.value())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Bookmark>> {
        let rows = sqlx::query(
            r#"
            SELECT bookmark_id, user_id, book_id, notes, created_at, updated_at
            FROM bookmarks
            WHERE user_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.iter().map(map_row_to_bookmark).collect())
    }
}
