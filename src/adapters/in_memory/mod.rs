pub mod store;
pub mod user_directory;

pub use store::InMemoryStore;
pub use user_directory::InMemoryUserDirectory;

use crate::application::ServiceDependencies;
use std::sync::Arc;

/// インメモリのストアと利用者ディレクトリからサービスの依存関係を組み立てる
pub fn dependencies(
    store: Arc<InMemoryStore>,
    users: Arc<InMemoryUserDirectory>,
) -> ServiceDependencies {
    ServiceDependencies {
        book_repository: store.clone(),
        exchange_store: store.clone(),
        order_repository: store.clone(),
        bookmark_repository: store,
        user_directory: users,
    }
}
