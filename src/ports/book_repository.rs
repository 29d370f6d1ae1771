use crate::domain::{BookId, BookStatus, UserId, book::Book};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 書籍検索条件
///
/// 指定された条件はすべて満たす必要がある（AND）。
/// 各条件は大文字小文字を区別しない部分一致。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookSearch {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
}

impl BookSearch {
    /// 大文字小文字を区別しない部分一致でこの条件を満たすか
    ///
    /// インメモリ実装で使用する。PostgreSQL実装はILIKEで同じ意味を表す。
    pub fn matches(&self, book: &Book) -> bool {
        fn contains(haystack: &str, needle: &Option<String>) -> bool {
            match needle {
                Some(needle) => haystack.to_lowercase().contains(&needle.to_lowercase()),
                None => true,
            }
        }

        contains(&book.title, &self.title)
            && contains(&book.author, &self.author)
            && contains(book.genre.as_str(), &self.genre)
    }
}

/// 削除の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    NotFound,
    /// 交換リクエストから参照されているため削除できない
    Referenced,
}

/// 書籍リポジトリポート
///
/// 書籍登録簿の永続化を抽象化する。
/// 交換成立による書籍の更新はこのポートではなく`ExchangeStore`が
/// 同一トランザクション内で行う。
#[async_trait]
pub trait BookRepository: Send + Sync {
    /// 新しい書籍を保存する
    async fn insert(&self, book: Book) -> Result<()>;

    /// 書籍を更新する（楽観的並行性制御）
    ///
    /// 保存済みのステータスが`expected_status`と一致する場合のみ更新し、
    /// 一致しない場合（交換成立などで同時に変更された）は`false`を返す。
    async fn update(&self, book: Book, expected_status: BookStatus) -> Result<bool>;

    /// IDで書籍を取得する
    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>>;

    /// 複数IDで書籍を取得する（存在しないIDは無視）
    async fn find_by_ids(&self, book_ids: &[BookId]) -> Result<Vec<Book>>;

    /// 書籍を削除する
    async fn delete(&self, book_id: BookId) -> Result<DeleteOutcome>;

    /// 書籍一覧をページ単位で取得する
    ///
    /// 登録日時の新しい順。戻り値は（ページ内の書籍, 総件数）。
    async fn list(&self, offset: u64, limit: u64) -> Result<(Vec<Book>, u64)>;

    /// 条件で書籍を検索する
    async fn search(&self, criteria: &BookSearch) -> Result<Vec<Book>>;

    /// 利用者が所有する書籍を取得する
    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Book>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Condition, Genre};
    use chrono::Utc;

    fn book(title: &str, author: &str, genre: Genre) -> Book {
        let now = Utc::now();
        Book {
            book_id: BookId::new(),
            title: title.to_string(),
            author: author.to_string(),
            genre,
            condition: Condition::Good,
            status: BookStatus::Available,
            owner_id: UserId::new(),
            description: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_search_matches_everything() {
        let criteria = BookSearch::default();
        assert!(criteria.matches(&book("Dune", "Frank Herbert", Genre::SciFi)));
    }

    #[test]
    fn test_search_is_case_insensitive_substring() {
        let criteria = BookSearch {
            title: Some("DUN".to_string()),
            ..Default::default()
        };
        assert!(criteria.matches(&book("Dune", "Frank Herbert", Genre::SciFi)));
        assert!(!criteria.matches(&book("Emma", "Jane Austen", Genre::Romance)));
    }

    #[test]
    fn test_search_requires_all_criteria() {
        let criteria = BookSearch {
            author: Some("herbert".to_string()),
            genre: Some("romance".to_string()),
            ..Default::default()
        };
        assert!(!criteria.matches(&book("Dune", "Frank Herbert", Genre::SciFi)));
    }
}
