use crate::domain::{BookId, UserId, bookmark::Bookmark};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// ブックマークリポジトリポート
#[async_trait]
pub trait BookmarkRepository: Send + Sync {
    /// 利用者と書籍の組でブックマークを取得する
    async fn find(&self, user_id: UserId, book_id: BookId) -> Result<Option<Bookmark>>;

    /// ブックマークを保存する（(user_id, book_id)でupsert）
    ///
    /// 保存後の状態を返す。同時に作成された場合は先に保存された方のIDが残る。
    async fn save(&self, bookmark: Bookmark) -> Result<Bookmark>;

    /// ブックマークを削除する。存在しなかった場合は`false`。
    async fn delete(&self, user_id: UserId, book_id: BookId) -> Result<bool>;

    /// 利用者のブックマークを取得する（作成日時の新しい順）
    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Bookmark>>;
}
