pub mod catalog;
mod errors;
pub mod exchange;
pub mod order;
mod views;

use crate::ports::*;
use std::sync::Arc;

pub use errors::{ApplicationError, Result};
pub use views::{BookmarkView, OrderView, RequestView};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞い（メソッド）は持たず、各サービスの関数に依存関係を渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub book_repository: Arc<dyn BookRepository>,
    pub exchange_store: Arc<dyn ExchangeStore>,
    pub order_repository: Arc<dyn OrderRepository>,
    pub bookmark_repository: Arc<dyn BookmarkRepository>,
    pub user_directory: Arc<dyn UserDirectory>,
}
