use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BookId, BookStatus, BookValidationError, Condition, Genre, UserId,
    commands::{RegisterBook, UpdateBook},
};

/// タイトル・著者名の最小文字数
pub const NAME_MIN_CHARS: usize = 2;
/// タイトル・著者名の最大文字数
pub const NAME_MAX_CHARS: usize = 100;
/// 説明の最大文字数
pub const DESCRIPTION_MAX_CHARS: usize = 500;

/// Book集約 - 1人の利用者が出品する1冊の書籍
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    pub genre: Genre,
    pub condition: Condition,
    pub status: BookStatus,
    pub owner_id: UserId,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// 交換可能か（ステータスから導出）
    pub fn is_available(&self) -> bool {
        self.status.is_available()
    }

    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.owner_id == user_id
    }
}

fn validate_name(value: &str, err: BookValidationError) -> Result<String, BookValidationError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if !(NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&len) {
        return Err(err);
    }
    Ok(trimmed.to_string())
}

fn normalize_optional(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 空白のみの説明は未設定として扱う
fn validate_description(value: Option<String>) -> Result<Option<String>, BookValidationError> {
    match normalize_optional(value) {
        Some(description) if description.chars().count() > DESCRIPTION_MAX_CHARS => {
            Err(BookValidationError::DescriptionTooLong)
        }
        description => Ok(description),
    }
}

/// 純粋関数：書籍を登録する
///
/// ビジネスルール：
/// - タイトル・著者名は前後の空白を除いて2〜100文字
/// - 説明は500文字まで
/// - 登録直後のステータスはAvailable
pub fn register_book(cmd: RegisterBook) -> Result<Book, BookValidationError> {
    let title = validate_name(&cmd.title, BookValidationError::TitleLength)?;
    let author = validate_name(&cmd.author, BookValidationError::AuthorLength)?;
    let description = validate_description(cmd.description)?;

    Ok(Book {
        book_id: BookId::new(),
        title,
        author,
        genre: cmd.genre,
        condition: cmd.condition,
        status: BookStatus::Available,
        owner_id: cmd.owner_id,
        description,
        image_url: normalize_optional(cmd.image_url),
        created_at: cmd.registered_at,
        updated_at: cmd.registered_at,
    })
}

/// 純粋関数：書籍情報を更新する
///
/// 指定されたフィールドのみ置き換える。所有者とIDは変更できない。
/// ステータスを変更すると交換可能フラグも同時に変わる（導出値のため）。
///
/// ビジネスルール：
/// - Exchangedへの変更、Exchangedからの変更はできない
pub fn update_book(book: &Book, cmd: UpdateBook) -> Result<Book, BookValidationError> {
    if let Some(status) = cmd.status {
        let touches_exchanged =
            status == BookStatus::Exchanged || book.status == BookStatus::Exchanged;
        if status != book.status && touches_exchanged {
            return Err(BookValidationError::StatusLocked);
        }
    }

    let title = match cmd.title {
        Some(title) => validate_name(&title, BookValidationError::TitleLength)?,
        None => book.title.clone(),
    };
    let author = match cmd.author {
        Some(author) => validate_name(&author, BookValidationError::AuthorLength)?,
        None => book.author.clone(),
    };
    let description = match cmd.description {
        Some(description) => validate_description(Some(description))?,
        None => book.description.clone(),
    };
    let image_url = match cmd.image_url {
        Some(image_url) => normalize_optional(Some(image_url)),
        None => book.image_url.clone(),
    };

    Ok(Book {
        title,
        author,
        genre: cmd.genre.unwrap_or(book.genre),
        condition: cmd.condition.unwrap_or(book.condition),
        status: cmd.status.unwrap_or(book.status),
        description,
        image_url,
        updated_at: cmd.updated_at,
        ..book.clone()
    })
}

/// 純粋関数：交換成立により書籍を交換済みにする
pub fn mark_exchanged(book: &Book, exchanged_at: DateTime<Utc>) -> Book {
    Book {
        status: BookStatus::Exchanged,
        updated_at: exchanged_at,
        ..book.clone()
    }
}
