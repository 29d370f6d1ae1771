use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BookId, BookStatus, Condition, Genre, OrderId, OrderStatus, RequestId, ShippingMethod, UserId,
};

/// コマンド：書籍を登録する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisterBook {
    pub owner_id: UserId,
    pub title: String,
    pub author: String,
    pub genre: Genre,
    pub condition: Condition,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub registered_at: DateTime<Utc>,
}

/// コマンド：書籍情報を更新する（部分更新）
///
/// `None` のフィールドは変更しない。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateBook {
    pub book_id: BookId,
    pub title: Option<String>,
    pub author: Option<String>,
    pub genre: Option<Genre>,
    pub condition: Option<Condition>,
    pub status: Option<BookStatus>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub updated_at: DateTime<Utc>,
}

/// コマンド：交換リクエストを送る
///
/// 受け手の利用者IDは含まない。受け手の書籍の所有者から導出される。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateExchangeRequest {
    pub sender_id: UserId,
    pub sender_book_id: BookId,
    pub receiver_book_id: BookId,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：交換リクエストを承認する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcceptExchangeRequest {
    pub request_id: RequestId,
    pub acting_user_id: UserId,
    pub shipping_method: ShippingMethod,
    pub accepted_at: DateTime<Utc>,
}

/// コマンド：交換リクエストを拒否する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectExchangeRequest {
    pub request_id: RequestId,
    pub acting_user_id: UserId,
    pub rejected_at: DateTime<Utc>,
}

/// コマンド：交換リクエストを取り消す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelExchangeRequest {
    pub request_id: RequestId,
    pub acting_user_id: UserId,
    pub cancelled_at: DateTime<Utc>,
}

/// コマンド：承認済みリクエストに対して注文を作成する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateOrder {
    pub request_id: RequestId,
    pub shipping_method: ShippingMethod,
    pub created_at: DateTime<Utc>,
}

/// コマンド：配送状況を更新する（部分更新、遷移制約なし）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateOrder {
    pub order_id: OrderId,
    pub status: Option<OrderStatus>,
    pub tracking_number: Option<String>,
    pub estimated_delivery_date: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

/// コマンド：ブックマークを保存する（作成または更新）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveBookmark {
    pub user_id: UserId,
    pub book_id: BookId,
    pub notes: Option<String>,
    pub saved_at: DateTime<Utc>,
}
