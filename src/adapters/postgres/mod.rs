pub mod book_repository;
pub mod bookmark_repository;
pub mod exchange_store;
pub mod order_repository;
pub mod user_directory;

// パブリックに型を再エクスポート
pub use book_repository::BookRepository as PostgresBookRepository;
pub use bookmark_repository::BookmarkRepository as PostgresBookmarkRepository;
pub use exchange_store::ExchangeStore as PostgresExchangeStore;
pub use order_repository::OrderRepository as PostgresOrderRepository;
pub use user_directory::UserDirectory as PostgresUserDirectory;

use crate::application::ServiceDependencies;
use sqlx::PgPool;
use std::sync::Arc;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 文字列カラムを列挙型に変換できなかった場合のエラー
fn invalid_data(message: String) -> BoxError {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}

/// 一意制約違反の場合、その制約名を返す
fn unique_violation(err: &sqlx::Error) -> Option<String> {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            db_err.constraint().map(str::to_string)
        }
        _ => None,
    }
}

/// 同じコネクションプールを共有するサービスの依存関係を組み立てる
pub fn dependencies(pool: PgPool) -> ServiceDependencies {
    ServiceDependencies {
        book_repository: Arc::new(PostgresBookRepository::new(pool.clone())),
        exchange_store: Arc::new(PostgresExchangeStore::new(pool.clone())),
        order_repository: Arc::new(PostgresOrderRepository::new(pool.clone())),
        bookmark_repository: Arc::new(PostgresBookmarkRepository::new(pool.clone())),
        user_directory: Arc::new(PostgresUserDirectory::new(pool)),
    }
}
