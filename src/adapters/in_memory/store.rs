use crate::domain::{
    BookId, BookStatus, OrderId, RequestId, RequestStatus, UserId,
    book::{Book, mark_exchanged},
    bookmark::Bookmark,
    exchange::{Acceptance, ExchangeRequest},
    order::Order,
};
use crate::ports::book_repository::Result;
use crate::ports::{
    AcceptOutcome, BookRepository, BookSearch, BookmarkRepository, DeleteOutcome, ExchangeStore,
    InsertOrderOutcome, InsertOutcome, OrderRepository, TransitionOutcome,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

#[derive(Default)]
struct Tables {
    books: HashMap<BookId, Book>,
    requests: HashMap<RequestId, ExchangeRequest>,
    orders: HashMap<OrderId, Order>,
    bookmarks: HashMap<(UserId, BookId), Bookmark>,
}

impl Tables {
    fn order_for_request(&self, request_id: RequestId) -> Option<&Order> {
        self.orders.values().find(|o| o.request_id == request_id)
    }

    fn has_pending_pair(&self, sender_book_id: BookId, receiver_book_id: BookId) -> bool {
        self.requests.values().any(|r| {
            r.status == RequestStatus::Pending
                && r.sender_book_id == sender_book_id
                && r.receiver_book_id == receiver_book_id
        })
    }
}

/// すべてのリポジトリポートのインメモリ実装
///
/// 全テーブルを1つのMutexで保護するため、複数エンティティにまたがる承認を含め
/// すべての操作は直列化される。書き込みは変更前にすべて検証されるので、
/// 各操作は全部反映されるか何も反映されないかのどちらかになる。
///
/// ロックを`.await`をまたいで保持しないこと。
#[derive(Default)]
pub struct InMemoryStore {
    tables: Mutex<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn tables(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| std::io::Error::other("in-memory store lock poisoned").into())
    }
}

fn newest_first<T>(items: &mut [T], created_at: impl Fn(&T) -> chrono::DateTime<chrono::Utc>) {
    items.sort_by(|a, b| created_at(b).cmp(&created_at(a)));
}

#[async_trait]
impl BookRepository for InMemoryStore {
    async fn insert(&self, book: Book) -> Result<()> {
        self.tables()?.books.insert(book.book_id, book);
        Ok(())
    }

    async fn update(&self, book: Book, expected_status: BookStatus) -> Result<bool> {
        let mut tables = self.tables()?;
        match tables.books.get_mut(&book.book_id) {
            Some(current) if current.status == expected_status => {
                *current = book;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn get_by_id(&self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self.tables()?.books.get(&book_id).cloned())
    }

    async fn find_by_ids(&self, book_ids: &[BookId]) -> Result<Vec<Book>> {
        let tables = self.tables()?;
        Ok(book_ids
            .iter()
            .filter_map(|id| tables.books.get(id).cloned())
            .collect())
    }

    /// 交換リクエストから参照されている書籍は削除しない。
    /// 書籍のブックマークは書籍と共に削除される。
    async fn delete(&self, book_id: BookId) -> Result<DeleteOutcome> {
        let mut tables = self.tables()?;
        if !tables.books.contains_key(&book_id) {
            return Ok(DeleteOutcome::NotFound);
        }
        let referenced = tables
            .requests
            .values()
            .any(|r| r.sender_book_id == book_id || r.receiver_book_id == book_id);
        if referenced {
            return Ok(DeleteOutcome::Referenced);
        }

        tables.books.remove(&book_id);
        tables.bookmarks.retain(|(_, id), _| *id != book_id);
        Ok(DeleteOutcome::Deleted)
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<(Vec<Book>, u64)> {
        let tables = self.tables()?;
        let mut books: Vec<Book> = tables.books.values().cloned().collect();
        newest_first(&mut books, |b| b.created_at);

        let total = books.len() as u64;
        let page = books
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();
        Ok((page, total))
    }

    async fn search(&self, criteria: &BookSearch) -> Result<Vec<Book>> {
        let tables = self.tables()?;
        let mut books: Vec<Book> = tables
            .books
            .values()
            .filter(|b| criteria.matches(b))
            .cloned()
            .collect();
        newest_first(&mut books, |b| b.created_at);
        Ok(books)
    }

    async fn find_by_owner(&self, owner_id: UserId) -> Result<Vec<Book>> {
        let tables = self.tables()?;
        let mut books: Vec<Book> = tables
            .books
            .values()
            .filter(|b| b.is_owned_by(owner_id))
            .cloned()
            .collect();
        newest_first(&mut books, |b| b.created_at);
        Ok(books)
    }
}

#[async_trait]
impl ExchangeStore for InMemoryStore {
    async fn insert_pending(&self, request: ExchangeRequest) -> Result<InsertOutcome> {
        let mut tables = self.tables()?;
        if tables.has_pending_pair(request.sender_book_id, request.receiver_book_id) {
            return Ok(InsertOutcome::DuplicatePending);
        }
        tables.requests.insert(request.request_id, request);
        Ok(InsertOutcome::Inserted)
    }

    async fn get_by_id(&self, request_id: RequestId) -> Result<Option<ExchangeRequest>> {
        Ok(self.tables()?.requests.get(&request_id).cloned())
    }

    async fn find_by_ids(&self, request_ids: &[RequestId]) -> Result<Vec<ExchangeRequest>> {
        let tables = self.tables()?;
        Ok(request_ids
            .iter()
            .filter_map(|id| tables.requests.get(id).cloned())
            .collect())
    }

    async fn apply_transition(&self, request: ExchangeRequest) -> Result<TransitionOutcome> {
        let mut tables = self.tables()?;
        match tables.requests.get_mut(&request.request_id) {
            Some(current) if current.status == RequestStatus::Pending => {
                *current = request;
                Ok(TransitionOutcome::Applied)
            }
            _ => Ok(TransitionOutcome::Stale),
        }
    }

    async fn commit_acceptance(&self, acceptance: Acceptance) -> Result<AcceptOutcome> {
        let mut tables = self.tables()?;
        let request_id = acceptance.request.request_id;

        match tables.requests.get(&request_id) {
            Some(current) if current.status == RequestStatus::Pending => {}
            Some(_) => return Ok(AcceptOutcome::RequestNotPending),
            None => {
                return Err(std::io::Error::other(format!(
                    "exchange request {} disappeared during accept",
                    request_id
                ))
                .into());
            }
        }

        let mut exchanged = Vec::with_capacity(2);
        for book_id in acceptance.book_ids() {
            let book = tables.books.get(&book_id).ok_or_else(|| {
                std::io::Error::other(format!("book {} disappeared during accept", book_id))
            })?;
            if !book.is_available() {
                return Ok(AcceptOutcome::BooksUnavailable);
            }
            exchanged.push(mark_exchanged(book, acceptance.accepted_at));
        }

        if tables.order_for_request(request_id).is_some() {
            return Err(std::io::Error::other(format!(
                "order for request {} already exists",
                request_id
            ))
            .into());
        }

        // 検証済み。ここから先は失敗しない
        for book in exchanged {
            tables.books.insert(book.book_id, book);
        }
        tables
            .orders
            .insert(acceptance.order.order_id, acceptance.order);
        tables.requests.insert(request_id, acceptance.request);

        Ok(AcceptOutcome::Committed)
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<ExchangeRequest>> {
        let tables = self.tables()?;
        let mut requests: Vec<ExchangeRequest> = tables
            .requests
            .values()
            .filter(|r| r.involves(user_id))
            .cloned()
            .collect();
        newest_first(&mut requests, |r| r.created_at);
        Ok(requests)
    }
}

#[async_trait]
impl OrderRepository for InMemoryStore {
    async fn insert_for_request(&self, order: Order) -> Result<InsertOrderOutcome> {
        let mut tables = self.tables()?;
        if tables.order_for_request(order.request_id).is_some() {
            return Ok(InsertOrderOutcome::AlreadyExists);
        }
        tables.orders.insert(order.order_id, order);
        Ok(InsertOrderOutcome::Inserted)
    }

    async fn get_by_id(&self, order_id: OrderId) -> Result<Option<Order>> {
        Ok(self.tables()?.orders.get(&order_id).cloned())
    }

    async fn get_by_request_id(&self, request_id: RequestId) -> Result<Option<Order>> {
        Ok(self.tables()?.order_for_request(request_id).cloned())
    }

    async fn update(&self, order: Order) -> Result<()> {
        self.tables()?.orders.insert(order.order_id, order);
        Ok(())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Order>> {
        let tables = self.tables()?;
        let mut orders: Vec<Order> = tables
            .orders
            .values()
            .filter(|o| {
                tables
                    .requests
                    .get(&o.request_id)
                    .is_some_and(|r| r.involves(user_id))
            })
            .cloned()
            .collect();
        newest_first(&mut orders, |o| o.created_at);
        Ok(orders)
    }
}

#[async_trait]
impl BookmarkRepository for InMemoryStore {
    async fn find(&self, user_id: UserId, book_id: BookId) -> Result<Option<Bookmark>> {
        Ok(self.tables()?.bookmarks.get(&(user_id, book_id)).cloned())
    }

    async fn save(&self, bookmark: Bookmark) -> Result<Bookmark> {
        let mut tables = self.tables()?;
        let key = (bookmark.user_id, bookmark.book_id);
        let saved = match tables.bookmarks.get(&key) {
            // 先に作成されたブックマークのIDと作成日時を残す
            Some(existing) => Bookmark {
                bookmark_id: existing.bookmark_id,
                created_at: existing.created_at,
                ..bookmark
            },
            None => bookmark,
        };
        tables.bookmarks.insert(key, saved.clone());
        Ok(saved)
    }

    async fn delete(&self, user_id: UserId, book_id: BookId) -> Result<bool> {
        Ok(self.tables()?.bookmarks.remove(&(user_id, book_id)).is_some())
    }

    async fn find_by_user(&self, user_id: UserId) -> Result<Vec<Bookmark>> {
        let tables = self.tables()?;
        let mut bookmarks: Vec<Bookmark> = tables
            .bookmarks
            .values()
            .filter(|b| b.user_id == user_id)
            .cloned()
            .collect();
        newest_first(&mut bookmarks, |b| b.created_at);
        Ok(bookmarks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        Condition, Genre, ShippingMethod,
        exchange::{accept_request, create_request},
    };
    use chrono::{Duration, Utc};

    fn book_owned_by(owner_id: UserId) -> Book {
        let now = Utc::now();
        Book {
            book_id: BookId::new(),
            title: "Kafka on the Shore".to_string(),
            author: "Haruki Murakami".to_string(),
            genre: Genre::Fiction,
            condition: Condition::LikeNew,
            status: BookStatus::Available,
            owner_id,
            description: None,
            image_url: None,
            created_at: now,
            updated_at: now,
        }
    }

    struct Seeded {
        store: InMemoryStore,
        sender_book: Book,
        receiver_book: Book,
        request: ExchangeRequest,
    }

    async fn seeded() -> Seeded {
        let store = InMemoryStore::new();
        let sender_book = book_owned_by(UserId::new());
        let receiver_book = book_owned_by(UserId::new());
        BookRepository::insert(&store, sender_book.clone()).await.unwrap();
        BookRepository::insert(&store, receiver_book.clone()).await.unwrap();

        let request =
            create_request(sender_book.owner_id, &sender_book, &receiver_book, Utc::now()).unwrap();
        store.insert_pending(request.clone()).await.unwrap();

        Seeded {
            store,
            sender_book,
            receiver_book,
            request,
        }
    }

    fn acceptance_for(s: &Seeded) -> Acceptance {
        accept_request(
            &s.request,
            &s.sender_book,
            &s.receiver_book,
            s.request.receiver_id,
            ShippingMethod::Online,
            Utc::now(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_insert_pending_rejects_duplicate_pair() {
        let s = seeded().await;
        let duplicate = ExchangeRequest {
            request_id: RequestId::new(),
            ..s.request.clone()
        };

        let outcome = s.store.insert_pending(duplicate).await.unwrap();
        assert_eq!(outcome, InsertOutcome::DuplicatePending);
    }

    #[tokio::test]
    async fn test_insert_pending_allows_pair_after_close() {
        let s = seeded().await;
        let rejected = ExchangeRequest {
            status: RequestStatus::Rejected,
            ..s.request.clone()
        };
        s.store.apply_transition(rejected).await.unwrap();

        let again = ExchangeRequest {
            request_id: RequestId::new(),
            ..s.request.clone()
        };
        assert_eq!(
            s.store.insert_pending(again).await.unwrap(),
            InsertOutcome::Inserted
        );
    }

    #[tokio::test]
    async fn test_commit_acceptance_writes_everything() {
        let s = seeded().await;
        let acceptance = acceptance_for(&s);
        let order_id = acceptance.order.order_id;

        let outcome = s.store.commit_acceptance(acceptance).await.unwrap();
        assert_eq!(outcome, AcceptOutcome::Committed);

        let stored = ExchangeStore::get_by_id(&s.store, s.request.request_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, RequestStatus::Accepted);

        let order = s
            .store
            .get_by_request_id(s.request.request_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(order.order_id, order_id);

        for book_id in [s.sender_book.book_id, s.receiver_book.book_id] {
            let book = BookRepository::get_by_id(&s.store, book_id)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(book.status, BookStatus::Exchanged);
            assert!(!book.is_available());
        }
    }

    #[tokio::test]
    async fn test_commit_acceptance_twice_reports_not_pending() {
        let s = seeded().await;

        let first = s.store.commit_acceptance(acceptance_for(&s)).await.unwrap();
        let second = s.store.commit_acceptance(acceptance_for(&s)).await.unwrap();

        assert_eq!(first, AcceptOutcome::Committed);
        assert_eq!(second, AcceptOutcome::RequestNotPending);
        assert_eq!(OrderRepository::find_by_user(&s.store, s.request.sender_id).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_commit_acceptance_rolls_back_when_book_missing() {
        let s = seeded().await;
        s.store
            .tables()
            .unwrap()
            .books
            .remove(&s.receiver_book.book_id);

        let result = s.store.commit_acceptance(acceptance_for(&s)).await;
        assert!(result.is_err());

        let stored = ExchangeStore::get_by_id(&s.store, s.request.request_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
        assert!(
            s.store
                .get_by_request_id(s.request.request_id)
                .await
                .unwrap()
                .is_none()
        );
        let sender_book = BookRepository::get_by_id(&s.store, s.sender_book.book_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(sender_book.status, BookStatus::Available);
    }

    #[tokio::test]
    async fn test_commit_acceptance_reports_unavailable_book() {
        let s = seeded().await;
        let reserved = Book {
            status: BookStatus::Reserved,
            ..s.sender_book.clone()
        };
        BookRepository::update(&s.store, reserved, BookStatus::Available)
            .await
            .unwrap();

        let outcome = s.store.commit_acceptance(acceptance_for(&s)).await.unwrap();
        assert_eq!(outcome, AcceptOutcome::BooksUnavailable);

        let stored = ExchangeStore::get_by_id(&s.store, s.request.request_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.status, RequestStatus::Pending);
    }

    #[tokio::test]
    async fn test_book_update_fails_when_status_changed() {
        let s = seeded().await;
        s.store.commit_acceptance(acceptance_for(&s)).await.unwrap();

        let edited = Book {
            title: "Edited".to_string(),
            ..s.sender_book.clone()
        };
        let written = BookRepository::update(&s.store, edited, BookStatus::Available)
            .await
            .unwrap();
        assert!(!written);
    }

    #[tokio::test]
    async fn test_delete_referenced_book_is_refused() {
        let s = seeded().await;
        let outcome = BookRepository::delete(&s.store, s.sender_book.book_id)
            .await
            .unwrap();
        assert_eq!(outcome, DeleteOutcome::Referenced);

        let lonely = book_owned_by(UserId::new());
        BookRepository::insert(&s.store, lonely.clone()).await.unwrap();
        assert_eq!(
            BookRepository::delete(&s.store, lonely.book_id).await.unwrap(),
            DeleteOutcome::Deleted
        );
        assert_eq!(
            BookRepository::delete(&s.store, lonely.book_id).await.unwrap(),
            DeleteOutcome::NotFound
        );
    }

    #[tokio::test]
    async fn test_list_pages_newest_first() {
        let store = InMemoryStore::new();
        let owner = UserId::new();
        let base = Utc::now();
        for i in 0..5 {
            let book = Book {
                created_at: base + Duration::seconds(i),
                ..book_owned_by(owner)
            };
            BookRepository::insert(&store, book).await.unwrap();
        }

        let (page, total) = store.list(2, 2).await.unwrap();
        assert_eq!(total, 5);
        assert_eq!(page.len(), 2);
        assert_eq!(page[0].created_at, base + Duration::seconds(2));
        assert_eq!(page[1].created_at, base + Duration::seconds(1));
    }

    #[tokio::test]
    async fn test_bookmark_save_keeps_first_id() {
        let store = InMemoryStore::new();
        let user_id = UserId::new();
        let book_id = BookId::new();
        let now = Utc::now();
        let first = Bookmark {
            bookmark_id: crate::domain::BookmarkId::new(),
            user_id,
            book_id,
            notes: None,
            created_at: now,
            updated_at: now,
        };
        let second = Bookmark {
            bookmark_id: crate::domain::BookmarkId::new(),
            notes: Some("gift idea".to_string()),
            updated_at: now + Duration::minutes(1),
            ..first.clone()
        };

        store.save(first.clone()).await.unwrap();
        let saved = store.save(second).await.unwrap();

        assert_eq!(saved.bookmark_id, first.bookmark_id);
        assert_eq!(saved.notes.as_deref(), Some("gift idea"));
        assert_eq!(BookmarkRepository::find_by_user(&store, user_id).await.unwrap().len(), 1);
    }
}
