use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::{BookmarkView, OrderView, RequestView, catalog::BookPage};
use crate::domain::{book::Book, exchange::ExchangeRequest, order::Order};
use crate::ports::UserSummary;

// ============================================================================
// Request bodies / query parameters
// ============================================================================

/// POST /requests
///
/// 受け手の利用者IDは受け付けない（受け手側書籍の所有者から導出する）。
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRequestBody {
    pub sender_id: Uuid,
    pub sender_book_id: Uuid,
    pub receiver_book_id: Uuid,
}

/// PUT /requests/:id/accept
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AcceptRequestBody {
    pub user_id: Uuid,
    pub shipping_method: Option<String>,
}

/// PUT /requests/:id/reject と PUT /requests/:id/cancel
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActingUserBody {
    pub user_id: Uuid,
}

/// POST /orders
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderBody {
    pub request_id: Uuid,
    pub shipping_method: Option<String>,
}

/// PUT /orders/:id
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateOrderBody {
    pub status: Option<String>,
    pub tracking_number: Option<String>,
    pub estimated_delivery_date: Option<DateTime<Utc>>,
}

/// POST /books/register
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBookBody {
    pub owner_id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub condition: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// PUT /books/:id
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBookBody {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
    pub condition: Option<String>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
}

/// GET /books?page&limit
#[derive(Debug, Deserialize)]
pub struct ListBooksQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// GET /books/search?title&author&genre
#[derive(Debug, Deserialize)]
pub struct SearchBooksQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<String>,
}

/// POST /bookmarks
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaveBookmarkBody {
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub notes: Option<String>,
}

// ============================================================================
// Responses
// ============================================================================

/// 書籍レスポンス（`isAvailable`はステータスから導出）
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookResponse {
    pub id: Uuid,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub condition: String,
    pub status: String,
    pub owner_id: Uuid,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            id: book.book_id.value(),
            is_available: book.is_available(),
            genre: book.genre.as_str().to_string(),
            condition: book.condition.as_str().to_string(),
            status: book.status.as_str().to_string(),
            owner_id: book.owner_id.value(),
            title: book.title,
            author: book.author,
            description: book.description,
            image_url: book.image_url,
            created_at: book.created_at,
            updated_at: book.updated_at,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    pub current_page: u64,
    pub total_pages: u64,
    pub total_items: u64,
    pub items_per_page: u64,
}

/// GET /books のレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BookPageResponse {
    pub data: Vec<BookResponse>,
    pub pagination: PaginationResponse,
}

impl From<BookPage> for BookPageResponse {
    fn from(page: BookPage) -> Self {
        Self {
            pagination: PaginationResponse {
                current_page: page.current_page,
                total_pages: page.total_pages,
                total_items: page.total_items,
                items_per_page: page.items_per_page,
            },
            data: page.books.into_iter().map(BookResponse::from).collect(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserSummaryResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

impl From<UserSummary> for UserSummaryResponse {
    fn from(user: UserSummary) -> Self {
        Self {
            id: user.user_id.value(),
            name: user.name,
            email: user.email,
        }
    }
}

/// 交換リクエストレスポンス（状態遷移の結果）
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeRequestResponse {
    pub id: Uuid,
    pub sender_id: Uuid,
    pub sender_book_id: Uuid,
    pub receiver_id: Uuid,
    pub receiver_book_id: Uuid,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ExchangeRequest> for ExchangeRequestResponse {
    fn from(request: ExchangeRequest) -> Self {
        Self {
            id: request.request_id.value(),
            sender_id: request.sender_id.value(),
            sender_book_id: request.sender_book_id.value(),
            receiver_id: request.receiver_id.value(),
            receiver_book_id: request.receiver_book_id.value(),
            status: request.status.as_str().to_string(),
            created_at: request.created_at,
            updated_at: request.updated_at,
        }
    }
}

/// 利用者と書籍を解決済みの交換リクエスト（一覧・作成）
///
/// 解決できなかった参照は`null`になる。
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestDetailResponse {
    #[serde(flatten)]
    pub request: ExchangeRequestResponse,
    pub sender: Option<UserSummaryResponse>,
    pub receiver: Option<UserSummaryResponse>,
    pub sender_book: Option<BookResponse>,
    pub receiver_book: Option<BookResponse>,
}

impl From<RequestView> for RequestDetailResponse {
    fn from(view: RequestView) -> Self {
        Self {
            request: view.request.into(),
            sender: view.sender.map(Into::into),
            receiver: view.receiver.map(Into::into),
            sender_book: view.sender_book.map(Into::into),
            receiver_book: view.receiver_book.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub id: Uuid,
    pub request_id: Uuid,
    pub status: String,
    pub shipping_method: String,
    pub tracking_number: Option<String>,
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Order> for OrderResponse {
    fn from(order: Order) -> Self {
        Self {
            id: order.order_id.value(),
            request_id: order.request_id.value(),
            status: order.status.as_str().to_string(),
            shipping_method: order.shipping_method.as_str().to_string(),
            tracking_number: order.tracking_number,
            estimated_delivery_date: order.estimated_delivery_date,
            created_at: order.created_at,
            updated_at: order.updated_at,
        }
    }
}

/// リクエストを解決済みの注文
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDetailResponse {
    #[serde(flatten)]
    pub order: OrderResponse,
    pub request: Option<RequestDetailResponse>,
}

impl From<OrderView> for OrderDetailResponse {
    fn from(view: OrderView) -> Self {
        Self {
            order: view.order.into(),
            request: view.request.map(Into::into),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookmarkResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub book_id: Uuid,
    pub notes: Option<String>,
    pub book: Option<BookResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<BookmarkView> for BookmarkResponse {
    fn from(view: BookmarkView) -> Self {
        let bookmark = view.bookmark;
        Self {
            id: bookmark.bookmark_id.value(),
            user_id: bookmark.user_id.value(),
            book_id: bookmark.book_id.value(),
            notes: bookmark.notes,
            book: view.book.map(Into::into),
            created_at: bookmark.created_at,
            updated_at: bookmark.updated_at,
        }
    }
}

/// 削除などの結果メッセージ
#[derive(Debug, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
    pub error: bool,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            error: true,
        }
    }
}
