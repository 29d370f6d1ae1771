use crate::domain::UserId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 利用者の表示用情報
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
}

/// 利用者ディレクトリポート
///
/// 交換コンテキストと利用者管理コンテキスト（認証・プロフィール）の境界を維持する。
/// 交換コンテキストは一覧表示のために名前とメールアドレスだけを参照する。
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// 複数IDの利用者情報を取得する（存在しないIDは無視）
    async fn find_summaries(&self, user_ids: &[UserId]) -> Result<Vec<UserSummary>>;
}
