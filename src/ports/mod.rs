pub mod book_repository;
pub mod bookmark_repository;
pub mod exchange_store;
pub mod order_repository;
pub mod user_directory;

pub use book_repository::*;
pub use bookmark_repository::*;
pub use exchange_store::*;
pub use order_repository::*;
pub use user_directory::*;
