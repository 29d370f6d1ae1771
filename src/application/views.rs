use crate::domain::{
    BookId, RequestId, UserId, book::Book, bookmark::Bookmark, exchange::ExchangeRequest,
    order::Order,
};
use crate::ports::UserSummary;
use std::collections::HashMap;

use super::{ApplicationError, Result, ServiceDependencies};

/// 表示用に解決済みの交換リクエスト
///
/// 送り手・受け手の利用者情報と両方の書籍を含む読み取り専用の投影。
/// 参照先が見つからない場合は`None`（一覧全体は失敗させない）。
#[derive(Debug, Clone)]
pub struct RequestView {
    pub request: ExchangeRequest,
    pub sender: Option<UserSummary>,
    pub receiver: Option<UserSummary>,
    pub sender_book: Option<Book>,
    pub receiver_book: Option<Book>,
}

/// 表示用に解決済みの注文
#[derive(Debug, Clone)]
pub struct OrderView {
    pub order: Order,
    pub request: Option<RequestView>,
}

/// 表示用に解決済みのブックマーク
#[derive(Debug, Clone)]
pub struct BookmarkView {
    pub bookmark: Bookmark,
    pub book: Option<Book>,
}

fn unique<T: Copy + Eq + std::hash::Hash>(ids: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut seen = std::collections::HashSet::new();
    ids.into_iter().filter(|id| seen.insert(*id)).collect()
}

/// リクエスト列を表示用に解決する（順序は保持）
pub(crate) async fn resolve_requests(
    deps: &ServiceDependencies,
    requests: Vec<ExchangeRequest>,
) -> Result<Vec<RequestView>> {
    if requests.is_empty() {
        return Ok(Vec::new());
    }

    let user_ids: Vec<UserId> = unique(
        requests
            .iter()
            .flat_map(|r| [r.sender_id, r.receiver_id]),
    );
    let book_ids: Vec<BookId> = unique(
        requests
            .iter()
            .flat_map(|r| [r.sender_book_id, r.receiver_book_id]),
    );

    let (users, books) = futures::try_join!(
        deps.user_directory.find_summaries(&user_ids),
        deps.book_repository.find_by_ids(&book_ids),
    )
    .map_err(ApplicationError::Store)?;

    let users: HashMap<UserId, UserSummary> =
        users.into_iter().map(|u| (u.user_id, u)).collect();
    let books: HashMap<BookId, Book> = books.into_iter().map(|b| (b.book_id, b)).collect();

    Ok(requests
        .into_iter()
        .map(|request| RequestView {
            sender: users.get(&request.sender_id).cloned(),
            receiver: users.get(&request.receiver_id).cloned(),
            sender_book: books.get(&request.sender_book_id).cloned(),
            receiver_book: books.get(&request.receiver_book_id).cloned(),
            request,
        })
        .collect())
}

/// 注文列を表示用に解決する（順序は保持）
pub(crate) async fn resolve_orders(
    deps: &ServiceDependencies,
    orders: Vec<Order>,
) -> Result<Vec<OrderView>> {
    if orders.is_empty() {
        return Ok(Vec::new());
    }

    let request_ids: Vec<RequestId> = unique(orders.iter().map(|o| o.request_id));
    let requests = deps
        .exchange_store
        .find_by_ids(&request_ids)
        .await
        .map_err(ApplicationError::Store)?;

    let views: HashMap<RequestId, RequestView> = resolve_requests(deps, requests)
        .await?
        .into_iter()
        .map(|v| (v.request.request_id, v))
        .collect();

    Ok(orders
        .into_iter()
        .map(|order| {
            let request = views.get(&order.request_id).cloned();
            if request.is_none() {
                tracing::warn!(order_id = %order.order_id, "Order references a missing request");
            }
            OrderView { order, request }
        })
        .collect())
}
