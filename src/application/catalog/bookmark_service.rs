use crate::domain::{self, BookId, UserId, book::Book, commands::SaveBookmark};
use std::collections::HashMap;

use crate::application::{ApplicationError, BookmarkView, Result, ServiceDependencies};

/// ブックマークを保存する（(利用者, 書籍)ごとに1件、既存なら更新）
///
/// # エラー
/// - NotFound: 書籍が存在しない
pub async fn save_bookmark(deps: &ServiceDependencies, cmd: SaveBookmark) -> Result<BookmarkView> {
    let (book, existing) = futures::try_join!(
        deps.book_repository.get_by_id(cmd.book_id),
        deps.bookmark_repository.find(cmd.user_id, cmd.book_id),
    )
    .map_err(ApplicationError::Store)?;

    let book = book.ok_or_else(|| ApplicationError::NotFound("Book not found".to_string()))?;

    let bookmark = domain::bookmark::save_bookmark(existing.as_ref(), cmd);
    let saved = deps
        .bookmark_repository
        .save(bookmark)
        .await
        .map_err(ApplicationError::Store)?;

    tracing::debug!(user_id = %saved.user_id, book_id = %saved.book_id, "Bookmark saved");

    Ok(BookmarkView {
        bookmark: saved,
        book: Some(book),
    })
}

/// 利用者のブックマーク一覧（新しい順、書籍を解決済み）
pub async fn list_bookmarks_for_user(
    deps: &ServiceDependencies,
    user_id: UserId,
) -> Result<Vec<BookmarkView>> {
    let bookmarks = deps
        .bookmark_repository
        .find_by_user(user_id)
        .await
        .map_err(ApplicationError::Store)?;

    let book_ids: Vec<BookId> = bookmarks.iter().map(|b| b.book_id).collect();
    let books: HashMap<BookId, Book> = deps
        .book_repository
        .find_by_ids(&book_ids)
        .await
        .map_err(ApplicationError::Store)?
        .into_iter()
        .map(|b| (b.book_id, b))
        .collect();

    Ok(bookmarks
        .into_iter()
        .map(|bookmark| BookmarkView {
            book: books.get(&bookmark.book_id).cloned(),
            bookmark,
        })
        .collect())
}

pub async fn remove_bookmark(
    deps: &ServiceDependencies,
    user_id: UserId,
    book_id: BookId,
) -> Result<()> {
    let removed = deps
        .bookmark_repository
        .delete(user_id, book_id)
        .await
        .map_err(ApplicationError::Store)?;

    if !removed {
        return Err(ApplicationError::NotFound("Bookmark not found".to_string()));
    }
    Ok(())
}
