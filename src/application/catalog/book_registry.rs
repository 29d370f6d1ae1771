use crate::domain::{self, BookId, UserId, book::Book, commands::*};
use crate::ports::*;

use crate::application::{ApplicationError, Result, ServiceDependencies};

/// 1ページあたりのデフォルト件数
pub const DEFAULT_PAGE_LIMIT: u64 = 10;
/// 1ページあたりの最大件数
pub const MAX_PAGE_LIMIT: u64 = 100;

const BOOK_NOT_FOUND: &str = "Book not found";

/// 書籍一覧の1ページ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPage {
    pub books: Vec<Book>,
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
}

/// 書籍を登録する
pub async fn register_book(deps: &ServiceDependencies, cmd: RegisterBook) -> Result<Book> {
    let book = domain::book::register_book(cmd)
        .map_err(|e| ApplicationError::Validation(e.to_string()))?;

    deps.book_repository
        .insert(book.clone())
        .await
        .map_err(ApplicationError::Store)?;

    tracing::info!(book_id = %book.book_id, owner_id = %book.owner_id, "Book registered");
    Ok(book)
}

pub async fn get_book(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    deps.book_repository
        .get_by_id(book_id)
        .await
        .map_err(ApplicationError::Store)?
        .ok_or_else(|| ApplicationError::NotFound(BOOK_NOT_FOUND.to_string()))
}

/// 書籍情報を更新する
///
/// 読み込んだ時点のステータスを期待値として書き込む。
/// その間に交換が成立していた場合はConflictを返し、交換済みの状態を上書きしない。
pub async fn update_book(deps: &ServiceDependencies, cmd: UpdateBook) -> Result<Book> {
    let book = get_book(deps, cmd.book_id).await?;

    let updated = domain::book::update_book(&book, cmd)
        .map_err(|e| ApplicationError::Validation(e.to_string()))?;

    let written = deps
        .book_repository
        .update(updated.clone(), book.status)
        .await
        .map_err(ApplicationError::Store)?;

    if !written {
        tracing::warn!(book_id = %book.book_id, "Book changed while updating");
        return Err(ApplicationError::Conflict(
            "Book was modified concurrently, please retry".to_string(),
        ));
    }

    tracing::info!(book_id = %updated.book_id, "Book updated");
    Ok(updated)
}

/// 書籍を削除する
///
/// 交換リクエストから参照されている書籍は履歴を保つため削除できない。
pub async fn delete_book(deps: &ServiceDependencies, book_id: BookId) -> Result<()> {
    let outcome = deps
        .book_repository
        .delete(book_id)
        .await
        .map_err(ApplicationError::Store)?;

    match outcome {
        DeleteOutcome::Deleted => {
            tracing::info!(book_id = %book_id, "Book deleted");
            Ok(())
        }
        DeleteOutcome::NotFound => Err(ApplicationError::NotFound(BOOK_NOT_FOUND.to_string())),
        DeleteOutcome::Referenced => Err(ApplicationError::Conflict(
            "Book is part of an exchange request and cannot be deleted".to_string(),
        )),
    }
}

/// 書籍一覧をページ単位で取得する（登録日時の新しい順）
///
/// # 引数
/// * `page` - 1始まりのページ番号（未指定は1）
/// * `limit` - 1ページの件数（未指定は10、1〜100）
pub async fn list_books(
    deps: &ServiceDependencies,
    page: Option<u64>,
    limit: Option<u64>,
) -> Result<BookPage> {
    let page = page.unwrap_or(1);
    let limit = limit.unwrap_or(DEFAULT_PAGE_LIMIT);

    if page < 1 {
        return Err(ApplicationError::Validation(
            "Page must be at least 1".to_string(),
        ));
    }
    if !(1..=MAX_PAGE_LIMIT).contains(&limit) {
        return Err(ApplicationError::Validation(format!(
            "Limit must be between 1 and {}",
            MAX_PAGE_LIMIT
        )));
    }

    let offset = (page - 1).saturating_mul(limit);
    let (books, total_items) = deps
        .book_repository
        .list(offset, limit)
        .await
        .map_err(ApplicationError::Store)?;

    Ok(BookPage {
        books,
        current_page: page,
        total_pages: total_items.div_ceil(limit),
        total_items,
        items_per_page: limit,
    })
}

/// 条件で書籍を検索する（大文字小文字を区別しない部分一致）
pub async fn search_books(deps: &ServiceDependencies, criteria: BookSearch) -> Result<Vec<Book>> {
    let criteria = BookSearch {
        title: non_blank(criteria.title),
        author: non_blank(criteria.author),
        genre: non_blank(criteria.genre),
    };

    deps.book_repository
        .search(&criteria)
        .await
        .map_err(ApplicationError::Store)
}

/// 利用者が出品している書籍一覧
pub async fn list_books_by_owner(deps: &ServiceDependencies, owner_id: UserId) -> Result<Vec<Book>> {
    deps.book_repository
        .find_by_owner(owner_id)
        .await
        .map_err(ApplicationError::Store)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
