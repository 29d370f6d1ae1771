use super::RequestStatus;

/// 書籍登録・更新のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookValidationError {
    /// タイトルが2〜100文字でない
    TitleLength,
    /// 著者名が2〜100文字でない
    AuthorLength,
    /// 説明が500文字を超えている
    DescriptionTooLong,
    /// 交換済みステータスは交換の成立でのみ設定・解除される
    StatusLocked,
}

impl std::fmt::Display for BookValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BookValidationError::TitleLength => {
                f.write_str("Book title must be between 2 and 100 characters long")
            }
            BookValidationError::AuthorLength => {
                f.write_str("Author name must be between 2 and 100 characters long")
            }
            BookValidationError::DescriptionTooLong => {
                f.write_str("Description cannot exceed 500 characters")
            }
            BookValidationError::StatusLocked => {
                f.write_str("Exchanged status is managed by exchange requests")
            }
        }
    }
}

/// 交換リクエスト作成のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateRequestError {
    /// 送り手が送り手側の書籍を所有していない
    NotBookOwner,
    /// どちらかの書籍が交換可能でない
    BookUnavailable,
    /// 自分の書籍同士の交換
    SelfExchange,
}

/// 交換リクエストの状態遷移エラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionError {
    /// 承認・拒否は受け手のみ可能
    NotReceiver,
    /// 取り消しは送り手のみ可能
    NotSender,
    /// 既に終端状態（現在のステータスを保持）
    NotPending(RequestStatus),
    /// 承認時点でどちらかの書籍が交換可能でない
    BookUnavailable,
}

/// 注文更新のバリデーションエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderValidationError {
    /// 追跡番号が100文字を超えている
    TrackingNumberTooLong,
}

impl std::fmt::Display for OrderValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderValidationError::TrackingNumberTooLong => {
                f.write_str("Tracking number cannot exceed 100 characters")
            }
        }
    }
}

/// 注文作成のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOrderError {
    /// リクエストが承認済みでない
    RequestNotAccepted(RequestStatus),
}
