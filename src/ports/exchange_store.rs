use crate::domain::{
    RequestId, UserId,
    exchange::{Acceptance, ExchangeRequest},
};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 保留中リクエスト挿入の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// 同じ（送り手書籍, 受け手書籍）の保留中リクエストが既に存在する
    DuplicatePending,
}

/// 状態遷移（拒否・取り消し）の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    Applied,
    /// 保存済みのリクエストが既にPendingではなかった
    Stale,
}

/// 承認コミットの結果
///
/// `Committed`以外の場合、何も書き込まれていない。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AcceptOutcome {
    Committed,
    /// 保存済みのリクエストが既にPendingではなかった（同時承認など）
    RequestNotPending,
    /// どちらかの書籍が既に交換可能ではなかった
    BooksUnavailable,
}

/// 交換リクエストストアポート
///
/// 交換リクエストの永続化と、承認時の複数集約にまたがる原子的な書き込みを抽象化する。
/// 実装はデータベーストランザクションまたは単一ライターの直列化で原子性を保証すること。
#[async_trait]
pub trait ExchangeStore: Send + Sync {
    /// 保留中リクエストを挿入する
    ///
    /// 同一ペアの保留中リクエストの一意性はここで保証される（チェックと挿入は不可分）。
    async fn insert_pending(&self, request: ExchangeRequest) -> Result<InsertOutcome>;

    /// IDでリクエストを取得する
    async fn get_by_id(&self, request_id: RequestId) -> Result<Option<ExchangeRequest>>;

    /// 複数IDでリクエストを取得する（存在しないIDは無視）
    async fn find_by_ids(&self, request_ids: &[RequestId]) -> Result<Vec<ExchangeRequest>>;

    /// Pendingからの遷移（拒否・取り消し）を保存する
    ///
    /// 保存済みのリクエストがPendingの場合のみ書き込む。
    async fn apply_transition(&self, request: ExchangeRequest) -> Result<TransitionOutcome>;

    /// 承認を原子的にコミットする
    ///
    /// 1. リクエストをAcceptedに更新（Pendingの場合のみ）
    /// 2. 注文を1件作成
    /// 3. 両方の書籍をExchangedに更新（Availableの場合のみ）
    ///
    /// すべて成功するか、何も反映されないかのどちらか。
    /// 書き込み途中の障害は`Err`として返し、リクエストはPendingのまま残る。
    async fn commit_acceptance(&self, acceptance: Acceptance) -> Result<AcceptOutcome>;

    /// 利用者が送り手または受け手であるリクエストを取得する（作成日時の新しい順）
    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<ExchangeRequest>>;
}
