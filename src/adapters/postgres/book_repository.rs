use crate::domain::{BookId, BookStatus, Condition, Genre, UserId, book::Book};
use crate::ports::book_repository::{
    BookRepository as BookRepositoryTrait, BookSearch, DeleteOutcome, Result,
};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;
use uuid::Uuid;

use super::invalid_data;

const BOOK_COLUMNS: &str = r#"
    book_id, title, author, genre, condition, status, owner_id,
    description, image_url, created_at, updated_at
"#;

/// PostgreSQLの行データをBookに変換する
///
/// `is_available`カラムは`status`からの生成列のため読み込まない。
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    let genre: &str = row.get("genre");
    let condition: &str = row.get("condition");
    let status: &str = row.get("status");

    Ok(Book {
        book_id: BookId::from_uuid(row.get("book_id")),
        title: row.get("title"),
        author: row.get("author"),
        genre: Genre::from_str(genre).map_err(invalid_data)?,
        condition: Condition::from_str(condition).map_err(invalid_data)?,
        status: BookStatus::from_str(status).map_err(invalid_data)?,
        owner_id: UserId::from_uuid(row.get("owner_id")),
        description: row.get("description"),
        image_url: row.get("image_url"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    })
}

/// ILIKE用のパターンを組み立てる（`%`・`_`・`\`はエスケープして文字通りに扱う）
fn contains_pattern(value: &Option<String>) -> Option<String> {
    value.as_ref().map(|v| {
        let escaped = v
            .replace('\\', "\\\\")
            .replace('%', "\\%")
            .replace('_', "\\_");
        format!("%{}%", escaped)
    })
}

/// BookRepositoryのPostgreSQL実装
pub struct BookRepository {
    pool: PgPool,
}

impl BookRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookRepositoryTrait for BookRepository {
    async fn insert(&self, book: Book) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO books (
                book_id, title, author, genre, condition, status, owner_id,
                description, image_url, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(book.book_id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.genre.as_str())
        .bind(book.condition.as_str())
        .bind(book.status.as_str())
        .bind(book.owner_id.value())
        .bind(&book.description)
        .bind(&book.image_url)
        .bind(book.created_at)
        .bind(book.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// 条件付きUPDATE（ステータスが読み込み時点から変わっていない場合のみ）
    async fn update(&self, book: Book, expected_status: BookStatus) -> Result<bool> {
        let result = sqlx::query(
            r#"
            UPDATE books
            SET title = $2,
                author = $3,
                genre = $4,
                condition = $5,
                status = $6,
                description = $7,
                image_url = $8,
                updated_at = $9
            WHERE book_id = $1 AND status = $10
            "#,
        )
        .bind(book.book_id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(book.genre.as_str())
        .bind(book.condition.as_str())
        .bind(book.status.as_str())
        .bind(&book.description)
        .bind(&book.image_url)
        .bind(book.updated_at)
        .bind(expected_status.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM books WHERE book_id = $1",
            BOOK_COLUMNS
        ))
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn find_by_ids(&self, book_ids: &[BookId]) -> Result<Vec<Book>> {
        if book_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = book_ids.iter().map(|id| id.value()).collect();

        let rows = sqlx::query(&format!(
            "SELECT {} FROM books WHERE book_id = ANY($1)",
            BOOK_COLUMNS
        ))
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_book).collect()
    }

    /// 交換リクエストからの外部キー参照がある場合は`Referenced`
    ///
    /// ブックマークはON DELETE CASCADEで一緒に削除される。
    async fn delete(&self, book_id: BookId) -> Result<DeleteOutcome> {
        let result = sqlx::query("DELETE FROM books WHERE book_id = $1")
            .bind(book_id.value())
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Ok(DeleteOutcome::NotFound),
            Ok(_) => Ok(DeleteOutcome::Deleted),
            Err(sqlx::Error::Database(db_err)) if db_err.is_foreign_key_violation() => {
                Ok(DeleteOutcome::Referenced)
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<(Vec<Book>, u64)> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM books")
            .fetch_one(&self.pool)
            .await?;

        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM books
            ORDER BY created_at DESC, book_id
            LIMIT $1 OFFSET $2
            "#,
            BOOK_COLUMNS
        ))
        .bind(i64::try_from(limit)?)
        .bind(i64::try_from(offset)?)
        .fetch_all(&self.pool)
        .await?;

        let books = rows.iter().map(map_row_to_book).collect::<Result<Vec<_>>>()?;
        Ok((books, u64::try_from(total)?))
    }

    async fn search(&self, criteria: &BookSearch) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {}
            FROM books
            WHERE ($1::text IS NULL OR title ILIKE $1 ESCAPE '\')
              AND ($2::text IS NULL OR author ILIKE $2 ESCAPE '\')
              AND ($3::text IS NULL OR genre ILIKE $3 ESCAPE '\')
            ORDER BY created_at DESC
            "#,
            BOOK_COLUMNS
        ))
        .bind(contains_pattern(&criteria.title))
        .bind(contains_pattern(&criteria.author))
        .bind(contains_pattern(&criteria.genre))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_book).collect()
    }

    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Book>> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM books WHERE owner_id = $1 ORDER BY created_at DESC",
            BOOK_COLUMNS
        ))
        .bind(owner_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_book).collect()
    }
}
