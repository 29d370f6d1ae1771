mod book_registry;
mod bookmark_service;

pub use book_registry::{
    BookPage, DEFAULT_PAGE_LIMIT, MAX_PAGE_LIMIT, delete_book, get_book, list_books,
    list_books_by_owner, register_book, search_books, update_book,
};
pub use bookmark_service::{list_bookmarks_for_user, remove_bookmark, save_bookmark};
