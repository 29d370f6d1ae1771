use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, BookmarkId, UserId, commands::SaveBookmark};

/// ブックマーク - 利用者ごと書籍ごとに1件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub bookmark_id: BookmarkId,
    pub user_id: UserId,
    pub book_id: BookId,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 純粋関数：ブックマークを保存する（upsert）
///
/// 既存のブックマークがあればメモを更新し、なければ新規作成する。
/// メモが未指定の場合は既存のメモを保持する。
pub fn save_bookmark(existing: Option<&Bookmark>, cmd: SaveBookmark) -> Bookmark {
    match existing {
        Some(bookmark) => Bookmark {
            notes: cmd.notes.or_else(|| bookmark.notes.clone()),
            updated_at: cmd.saved_at,
            ..bookmark.clone()
        },
        None => Bookmark {
            bookmark_id: BookmarkId::new(),
            user_id: cmd.user_id,
            book_id: cmd.book_id,
            notes: cmd.notes,
            created_at: cmd.saved_at,
            updated_at: cmd.saved_at,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_save_bookmark_creates_new() {
        let cmd = SaveBookmark {
            user_id: UserId::new(),
            book_id: BookId::new(),
            notes: Some("読みたい".to_string()),
            saved_at: Utc::now(),
        };

        let bookmark = save_bookmark(None, cmd.clone());

        assert_eq!(bookmark.user_id, cmd.user_id);
        assert_eq!(bookmark.book_id, cmd.book_id);
        assert_eq!(bookmark.notes.as_deref(), Some("読みたい"));
    }

    #[test]
    fn test_save_bookmark_updates_existing_in_place() {
        let saved_at = Utc::now();
        let cmd = SaveBookmark {
            user_id: UserId::new(),
            book_id: BookId::new(),
            notes: Some("first".to_string()),
            saved_at,
        };
        let original = save_bookmark(None, cmd.clone());

        let updated = save_bookmark(
            Some(&original),
            SaveBookmark {
                notes: None,
                saved_at: saved_at + Duration::minutes(5),
                ..cmd
            },
        );

        assert_eq!(updated.bookmark_id, original.bookmark_id);
        assert_eq!(updated.notes.as_deref(), Some("first"));
        assert_eq!(updated.created_at, saved_at);
        assert_eq!(updated.updated_at, saved_at + Duration::minutes(5));
    }
}
