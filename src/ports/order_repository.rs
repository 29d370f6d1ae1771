use crate::domain::{OrderId, RequestId, UserId, order::Order};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 注文挿入の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOrderOutcome {
    Inserted,
    /// 同じリクエストの注文が既に存在する（request_idの一意制約）
    AlreadyExists,
}

/// 注文リポジトリポート
///
/// 承認時の注文作成は`ExchangeStore::commit_acceptance`が行う。
/// このポートは作成後の配送追跡と照会を担う。
#[async_trait]
pub trait OrderRepository: Send + Sync {
    /// 承認済みリクエストに対する注文を挿入する
    ///
    /// 1リクエスト1注文の一意性はここで保証される（チェックと挿入は不可分）。
    async fn insert_for_request(&self, order: Order) -> Result<InsertOrderOutcome>;

    /// IDで注文を取得する
    async fn get_by_id(&self, order_id: OrderId) -> Result<Option<Order>>;

    /// リクエストIDで注文を取得する
    async fn get_by_request_id(&self, request_id: RequestId) -> Result<Option<Order>>;

    /// 注文を更新する
    async fn update(&self, order: Order) -> Result<()>;

    /// 利用者が送り手または受け手である交換の注文を取得する（作成日時の新しい順）
    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>>;
}
