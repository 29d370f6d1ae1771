use crate::domain::{
    self, CreateRequestError, RequestId, TransitionError, UserId, book::Book, commands::*,
    exchange::ExchangeRequest,
};
use crate::ports::*;

use crate::application::{
    ApplicationError, RequestView, Result, ServiceDependencies, views::resolve_requests,
};

const BOOKS_NOT_FOUND: &str = "One or both books not found";
const BOOKS_NO_LONGER_AVAILABLE: &str = "One or both books are no longer available for exchange";

/// イベントストアの代わりにストアからリクエストを読み込むヘルパー関数
///
/// accept / reject / cancel で共通利用される。
///
/// # エラー
/// - Store: 読み込み失敗
/// - NotFound: リクエストが存在しない
async fn load_request(deps: &ServiceDependencies, request_id: RequestId) -> Result<ExchangeRequest> {
    deps.exchange_store
        .get_by_id(request_id)
        .await
        .map_err(ApplicationError::Store)?
        .ok_or_else(|| ApplicationError::NotFound("Request not found".to_string()))
}

/// 送り手側・受け手側の書籍を並行して読み込む
async fn load_book_pair(
    deps: &ServiceDependencies,
    sender_book_id: domain::BookId,
    receiver_book_id: domain::BookId,
) -> Result<(Book, Book)> {
    let (sender_book, receiver_book) = futures::try_join!(
        deps.book_repository.get_by_id(sender_book_id),
        deps.book_repository.get_by_id(receiver_book_id),
    )
    .map_err(ApplicationError::Store)?;

    match (sender_book, receiver_book) {
        (Some(sender_book), Some(receiver_book)) => Ok((sender_book, receiver_book)),
        _ => Err(ApplicationError::NotFound(BOOKS_NOT_FOUND.to_string())),
    }
}

/// 書き込み競合に負けた場合、最新の状態を読み直してエラーメッセージに反映する
async fn stale_request_error(deps: &ServiceDependencies, request_id: RequestId) -> ApplicationError {
    match load_request(deps, request_id).await {
        Ok(current) => {
            ApplicationError::Conflict(format!("Request is already {}", current.status.as_str()))
        }
        Err(err) => err,
    }
}

fn map_transition_error(err: TransitionError, forbidden_message: &str) -> ApplicationError {
    match err {
        TransitionError::NotReceiver | TransitionError::NotSender => {
            ApplicationError::Forbidden(forbidden_message.to_string())
        }
        TransitionError::NotPending(status) => {
            ApplicationError::Conflict(format!("Request is already {}", status.as_str()))
        }
        TransitionError::BookUnavailable => {
            ApplicationError::Conflict(BOOKS_NO_LONGER_AVAILABLE.to_string())
        }
    }
}

/// 交換リクエストを送る
///
/// ビジネスルール：
/// - 両方の書籍が存在すること
/// - 送り手が送り手側の書籍を所有していること
/// - 両方の書籍が交換可能であること
/// - 同じ書籍ペアの保留中リクエストが存在しないこと
///
/// 受け手は受け手側書籍の所有者から導出する（クライアント入力は信用しない）。
/// 書籍には副作用なし。
///
/// # 戻り値
/// 利用者・書籍を解決済みの保留中リクエスト
pub async fn create_request(
    deps: &ServiceDependencies,
    cmd: CreateExchangeRequest,
) -> Result<RequestView> {
    // 1. 両方の書籍を取得
    let (sender_book, receiver_book) =
        load_book_pair(deps, cmd.sender_book_id, cmd.receiver_book_id).await?;

    // 2. ドメイン層の純粋関数を呼び出し
    let request = domain::exchange::create_request(
        cmd.sender_id,
        &sender_book,
        &receiver_book,
        cmd.requested_at,
    )
    .map_err(|e| match e {
        CreateRequestError::NotBookOwner => {
            ApplicationError::Forbidden("You do not own this book".to_string())
        }
        CreateRequestError::BookUnavailable => ApplicationError::Conflict(
            "One or both books are not available for exchange".to_string(),
        ),
        CreateRequestError::SelfExchange => ApplicationError::Conflict(
            "Cannot request an exchange for your own book".to_string(),
        ),
    })?;

    // 3. 保存（重複チェックと挿入は不可分）
    let outcome = deps
        .exchange_store
        .insert_pending(request.clone())
        .await
        .map_err(ApplicationError::Store)?;

    if outcome == InsertOutcome::DuplicatePending {
        tracing::warn!(
            sender_book_id = %request.sender_book_id,
            receiver_book_id = %request.receiver_book_id,
            "Duplicate pending exchange request rejected"
        );
        return Err(ApplicationError::Conflict(
            "Exchange request already exists".to_string(),
        ));
    }

    tracing::info!(
        request_id = %request.request_id,
        sender_id = %request.sender_id,
        receiver_id = %request.receiver_id,
        "Exchange request created"
    );

    let users = deps
        .user_directory
        .find_summaries(&[request.sender_id, request.receiver_id])
        .await
        .map_err(ApplicationError::Store)?;
    let find_user = |user_id| users.iter().find(|u| u.user_id == user_id).cloned();

    Ok(RequestView {
        sender: find_user(request.sender_id),
        receiver: find_user(request.receiver_id),
        sender_book: Some(sender_book),
        receiver_book: Some(receiver_book),
        request,
    })
}

/// 交換リクエストを承認する
///
/// ビジネスルール：
/// - リクエストが存在すること
/// - 操作者が受け手であること
/// - リクエストがPending状態であること
/// - 両方の書籍がまだ交換可能であること
///
/// # 一貫性保証
///
/// リクエストの更新・注文の作成・書籍2冊の更新は`ExchangeStore::commit_acceptance`で
/// 原子的にコミットされる。ストアの障害時は何も反映されず、リクエストはPendingのまま
/// `ApplicationError::Store`を返す（再試行可能）。
///
/// 同時に承認された場合、コミットできるのは1件のみで、もう一方はConflictになる。
pub async fn accept_request(
    deps: &ServiceDependencies,
    cmd: AcceptExchangeRequest,
) -> Result<ExchangeRequest> {
    // 1. リクエストと書籍を取得
    let request = load_request(deps, cmd.request_id).await?;
    let (sender_book, receiver_book) =
        load_book_pair(deps, request.sender_book_id, request.receiver_book_id).await?;

    // 2. ドメイン層の純粋関数を呼び出し
    let acceptance = domain::exchange::accept_request(
        &request,
        &sender_book,
        &receiver_book,
        cmd.acting_user_id,
        cmd.shipping_method,
        cmd.accepted_at,
    )
    .map_err(|e| map_transition_error(e, "Not authorized to accept this request"))?;

    let accepted = acceptance.request.clone();
    let order_id = acceptance.order.order_id;

    // 3. 原子的にコミット
    let outcome = deps
        .exchange_store
        .commit_acceptance(acceptance)
        .await
        .map_err(|e| {
            tracing::error!(request_id = %cmd.request_id, "Accept transaction rolled back: {}", e);
            ApplicationError::Store(e)
        })?;

    match outcome {
        AcceptOutcome::Committed => {
            tracing::info!(
                request_id = %accepted.request_id,
                order_id = %order_id,
                "Exchange request accepted"
            );
            Ok(accepted)
        }
        AcceptOutcome::RequestNotPending => {
            tracing::warn!(request_id = %cmd.request_id, "Lost race while accepting request");
            Err(stale_request_error(deps, cmd.request_id).await)
        }
        AcceptOutcome::BooksUnavailable => {
            tracing::warn!(request_id = %cmd.request_id, "Books taken while accepting request");
            Err(ApplicationError::Conflict(
                BOOKS_NO_LONGER_AVAILABLE.to_string(),
            ))
        }
    }
}

/// 交換リクエストを拒否する
///
/// 受け手のみ、Pending状態のみ。書籍・注文への副作用なし。
pub async fn reject_request(
    deps: &ServiceDependencies,
    cmd: RejectExchangeRequest,
) -> Result<ExchangeRequest> {
    let request = load_request(deps, cmd.request_id).await?;

    let rejected =
        domain::exchange::reject_request(&request, cmd.acting_user_id, cmd.rejected_at)
            .map_err(|e| map_transition_error(e, "Not authorized to reject this request"))?;

    save_transition(deps, rejected).await
}

/// 交換リクエストを取り消す
///
/// 送り手のみ、Pending状態のみ。書籍・注文への副作用なし。
pub async fn cancel_request(
    deps: &ServiceDependencies,
    cmd: CancelExchangeRequest,
) -> Result<ExchangeRequest> {
    let request = load_request(deps, cmd.request_id).await?;

    let cancelled =
        domain::exchange::cancel_request(&request, cmd.acting_user_id, cmd.cancelled_at)
            .map_err(|e| match e {
                TransitionError::NotPending(_) => {
                    ApplicationError::Conflict("Can only cancel pending requests".to_string())
                }
                other => map_transition_error(other, "Only the sender can cancel this request"),
            })?;

    save_transition(deps, cancelled).await
}

async fn save_transition(
    deps: &ServiceDependencies,
    request: ExchangeRequest,
) -> Result<ExchangeRequest> {
    let outcome = deps
        .exchange_store
        .apply_transition(request.clone())
        .await
        .map_err(ApplicationError::Store)?;

    match outcome {
        TransitionOutcome::Applied => {
            tracing::info!(
                request_id = %request.request_id,
                status = request.status.as_str(),
                "Exchange request closed"
            );
            Ok(request)
        }
        TransitionOutcome::Stale => Err(stale_request_error(deps, request.request_id).await),
    }
}

/// 利用者が送り手または受け手であるリクエスト一覧（作成日時の新しい順）
///
/// 各リクエストは表示用に解決済み。読み取り専用。
pub async fn list_requests_for_user(
    deps: &ServiceDependencies,
    user_id: UserId,
) -> Result<Vec<RequestView>> {
    let requests = deps
        .exchange_store
        .find_by_user(user_id)
        .await
        .map_err(ApplicationError::Store)?;

    resolve_requests(deps, requests).await
}
