use thiserror::Error;

/// アプリケーション層のエラー
///
/// 交換・注文・カタログの各サービスで共通の分類。
/// API層でHTTPステータスに対応付けられる（404 / 403 / 400 / 400 / 500）。
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 対象のエンティティが存在しない
    #[error("{0}")]
    NotFound(String),

    /// 操作者に権限がない（送り手・受け手の不一致など）
    #[error("{0}")]
    Forbidden(String),

    /// 状態遷移として不正（終端状態、交換不可の書籍、重複など）
    #[error("{0}")]
    Conflict(String),

    /// 入力値が不正
    #[error("{0}")]
    Validation(String),

    /// 永続化層のエラー（トランザクションはロールバック済み）
    #[error("Storage error")]
    Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, ApplicationError>;
