use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{
    BookId, CreateRequestError, RequestId, RequestStatus, ShippingMethod, TransitionError, UserId,
    book::Book,
    order::{Order, open_order},
};

/// ExchangeRequest集約 - 2人の利用者が所有する2冊の書籍の交換提案
///
/// 不変条件：
/// - `receiver_id` は作成時点の受け手側書籍の所有者
/// - `Pending` を離れたリクエストは二度と変更されない
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeRequest {
    pub request_id: RequestId,
    pub sender_id: UserId,
    pub sender_book_id: BookId,
    pub receiver_id: UserId,
    pub receiver_book_id: BookId,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ExchangeRequest {
    pub fn involves(&self, user_id: UserId) -> bool {
        self.sender_id == user_id || self.receiver_id == user_id
    }
}

/// 承認によって発生する書き込みの集合
///
/// リクエスト・注文・書籍2冊の更新はすべて1つの単位としてコミットされる。
/// どれか1つでも失敗した場合は何も反映されない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acceptance {
    pub request: ExchangeRequest,
    pub order: Order,
    pub accepted_at: DateTime<Utc>,
}

impl Acceptance {
    /// 交換済みにする書籍（送り手側、受け手側）
    pub fn book_ids(&self) -> [BookId; 2] {
        [self.request.sender_book_id, self.request.receiver_book_id]
    }
}

/// 純粋関数：交換リクエストを作成する
///
/// ビジネスルール：
/// - 送り手は送り手側の書籍を所有していること
/// - 両方の書籍が交換可能であること
/// - 受け手側の書籍を送り手自身が所有していないこと
/// - 受け手は受け手側書籍の所有者から導出する
///
/// 同一ペアの保留中リクエストの重複チェックはストア側の一意制約で行う。
pub fn create_request(
    sender_id: UserId,
    sender_book: &Book,
    receiver_book: &Book,
    requested_at: DateTime<Utc>,
) -> Result<ExchangeRequest, CreateRequestError> {
    if !sender_book.is_owned_by(sender_id) {
        return Err(CreateRequestError::NotBookOwner);
    }

    if !sender_book.is_available() || !receiver_book.is_available() {
        return Err(CreateRequestError::BookUnavailable);
    }

    if receiver_book.is_owned_by(sender_id) {
        return Err(CreateRequestError::SelfExchange);
    }

    Ok(ExchangeRequest {
        request_id: RequestId::new(),
        sender_id,
        sender_book_id: sender_book.book_id,
        receiver_id: receiver_book.owner_id,
        receiver_book_id: receiver_book.book_id,
        status: RequestStatus::Pending,
        created_at: requested_at,
        updated_at: requested_at,
    })
}

fn ensure_pending(request: &ExchangeRequest) -> Result<(), TransitionError> {
    if request.status.is_terminal() {
        return Err(TransitionError::NotPending(request.status));
    }
    Ok(())
}

fn transition(
    request: &ExchangeRequest,
    status: RequestStatus,
    at: DateTime<Utc>,
) -> ExchangeRequest {
    ExchangeRequest {
        status,
        updated_at: at,
        ..request.clone()
    }
}

/// 純粋関数：交換リクエストを承認する
///
/// ビジネスルール：
/// - 承認できるのは受け手のみ
/// - Pending状態のみ承認可能
/// - 両方の書籍がまだ交換可能であること
///
/// 副作用なし。承認後のリクエストと新しい注文を`Acceptance`として返す。
pub fn accept_request(
    request: &ExchangeRequest,
    sender_book: &Book,
    receiver_book: &Book,
    acting_user_id: UserId,
    shipping_method: ShippingMethod,
    accepted_at: DateTime<Utc>,
) -> Result<Acceptance, TransitionError> {
    if request.receiver_id != acting_user_id {
        return Err(TransitionError::NotReceiver);
    }
    ensure_pending(request)?;

    if !sender_book.is_available() || !receiver_book.is_available() {
        return Err(TransitionError::BookUnavailable);
    }

    let accepted = transition(request, RequestStatus::Accepted, accepted_at);
    let order = open_order(accepted.request_id, shipping_method, accepted_at);

    Ok(Acceptance {
        request: accepted,
        order,
        accepted_at,
    })
}

/// 純粋関数：交換リクエストを拒否する
///
/// 受け手のみ、Pending状態のみ。書籍・注文への副作用なし。
pub fn reject_request(
    request: &ExchangeRequest,
    acting_user_id: UserId,
    rejected_at: DateTime<Utc>,
) -> Result<ExchangeRequest, TransitionError> {
    if request.receiver_id != acting_user_id {
        return Err(TransitionError::NotReceiver);
    }
    ensure_pending(request)?;

    Ok(transition(request, RequestStatus::Rejected, rejected_at))
}

/// 純粋関数：交換リクエストを取り消す
///
/// 送り手のみ、Pending状態のみ。書籍・注文への副作用なし。
pub fn cancel_request(
    request: &ExchangeRequest,
    acting_user_id: UserId,
    cancelled_at: DateTime<Utc>,
) -> Result<ExchangeRequest, TransitionError> {
    if request.sender_id != acting_user_id {
        return Err(TransitionError::NotSender);
    }
    ensure_pending(request)?;

    Ok(transition(request, RequestStatus::Cancelled, cancelled_at))
}
