use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;

use crate::api::requests::{
    ApproveRequest, BatchApproveRequest, ListLedgerQuery, ListRecordsQuery, MerchantQuery,
    RefundQueryRequest, RefundRequest, RejectRequest, WithdrawApplyRequest, WithdrawCancelRequest,
};
use crate::api::responses::{
    AdminRecordListResponse, ApiResponse, BalanceLogResponse, BatchApproveResponse,
    HealthResponse, PaginatedResponse, RefundInfoResponse, RefundResponse, SettleRecordResponse,
    WithdrawableInfoResponse,
};
use crate::error::Result;
use crate::models::SettleStatus;
use crate::repositories::SettleRecordQuery;
use crate::services::LedgerService;

use super::routes::AppState;

/// Maps a service outcome into the uniform envelope: success and business
/// rejections both ride in HTTP 200, only persistence faults surface as 500.
fn respond<T, R>(result: Result<T>) -> (StatusCode, Json<ApiResponse<R>>)
where
    R: From<T> + Serialize,
{
    match result {
        Ok(value) => (StatusCode::OK, Json(ApiResponse::success(R::from(value)))),
        Err(err) if err.is_business_error() => {
            (StatusCode::OK, Json(ApiResponse::failure(err.to_string())))
        }
        Err(err) => {
            tracing::error!("request failed: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failure("an internal error occurred")),
            )
        }
    }
}

fn validation_failure<R>(msg: String) -> (StatusCode, Json<ApiResponse<R>>) {
    (StatusCode::OK, Json(ApiResponse::failure(msg)))
}

/// Health check endpoint.
pub async fn health_check(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let db_healthy = sqlx::query("SELECT 1").fetch_one(&state.pool).await.is_ok();

    let response = HealthResponse {
        status: if db_healthy { "healthy".to_string() } else { "degraded".to_string() },
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        database: db_healthy,
    };

    Json(ApiResponse::success(response))
}

// ============================================================================
// Merchant Handlers
// ============================================================================

/// Withdrawable-amount snapshot plus fee parameters and destination accounts.
pub async fn withdraw_info(
    State(state): State<AppState>,
    Query(query): Query<MerchantQuery>,
) -> (StatusCode, Json<ApiResponse<WithdrawableInfoResponse>>) {
    let service = state.withdrawal_service();
    respond(service.withdrawable_info(query.merchant_id).await)
}

/// Apply for a withdrawal; funds are reserved immediately.
pub async fn withdraw_apply(
    State(state): State<AppState>,
    Json(request): Json<WithdrawApplyRequest>,
) -> (StatusCode, Json<ApiResponse<SettleRecordResponse>>) {
    if let Err(msg) = request.validate() {
        return validation_failure(msg);
    }

    let service = state.withdrawal_service();
    respond(
        service
            .apply(request.merchant_id, request.amount, request.settlement_account_id)
            .await,
    )
}

/// Cancel a still-pending withdrawal; the reserved amount is credited back.
pub async fn withdraw_cancel(
    State(state): State<AppState>,
    Json(request): Json<WithdrawCancelRequest>,
) -> (StatusCode, Json<ApiResponse<SettleRecordResponse>>) {
    let service = state.withdrawal_service();
    respond(service.cancel(request.merchant_id, request.record_id).await)
}

/// Merchant-scoped withdrawal record listing.
pub async fn merchant_withdraw_records(
    State(state): State<AppState>,
    Query(query): Query<ListRecordsQuery>,
) -> (StatusCode, Json<ApiResponse<PaginatedResponse<SettleRecordResponse>>>) {
    let Some(merchant_id) = query.merchant_id else {
        return validation_failure("merchant_id is required".to_string());
    };

    let status = match parse_status(query.status.as_deref()) {
        Ok(status) => status,
        Err(msg) => return validation_failure(msg),
    };

    let criteria = SettleRecordQuery {
        merchant_id: Some(merchant_id),
        status,
        settle_type: query.settle_type.clone(),
        limit: query.limit.unwrap_or(20).min(100),
        offset: query.offset.unwrap_or(0),
    };

    list_records(&state, &criteria).await
}

/// Balance-log listing for merchant audit.
pub async fn merchant_ledger(
    State(state): State<AppState>,
    Query(query): Query<ListLedgerQuery>,
) -> (StatusCode, Json<ApiResponse<PaginatedResponse<BalanceLogResponse>>>) {
    let ledger_service = LedgerService::new(state.pool.clone());
    let limit = query.limit.unwrap_or(20).min(100);
    let offset = query.offset.unwrap_or(0);

    let total = match ledger_service.count_entries(query.merchant_id).await {
        Ok(count) => count,
        Err(err) => {
            tracing::error!("failed to count ledger entries: {}", err);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failure("an internal error occurred")),
            );
        }
    };

    match ledger_service.entries(query.merchant_id, limit, offset).await {
        Ok(entries) => {
            let items: Vec<BalanceLogResponse> =
                entries.into_iter().map(BalanceLogResponse::from).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(PaginatedResponse::new(items, total, limit, offset))),
            )
        }
        Err(err) => {
            tracing::error!("failed to list ledger entries: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failure("an internal error occurred")),
            )
        }
    }
}

/// Refund (part of) a paid order back through its original channel.
pub async fn refund(
    State(state): State<AppState>,
    Json(request): Json<RefundRequest>,
) -> (StatusCode, Json<ApiResponse<RefundResponse>>) {
    if let Err(msg) = request.validate() {
        return validation_failure(msg);
    }

    let service = state.refund_service();
    let reason = request.reason.as_deref().unwrap_or("merchant refund");
    respond(
        service
            .refund(request.merchant_id, &request.trade_no, request.money, reason)
            .await,
    )
}

/// Refund-eligibility lookup for an order.
pub async fn refund_query(
    State(state): State<AppState>,
    Json(request): Json<RefundQueryRequest>,
) -> (StatusCode, Json<ApiResponse<RefundInfoResponse>>) {
    if let Err(msg) = request.validate() {
        return validation_failure(msg);
    }

    let service = state.refund_service();
    respond(service.refund_info(request.merchant_id, &request.trade_no).await)
}

// ============================================================================
// Admin Handlers
// ============================================================================

/// Approve a single pending withdrawal.
pub async fn withdraw_approve(
    State(state): State<AppState>,
    Json(request): Json<ApproveRequest>,
) -> (StatusCode, Json<ApiResponse<SettleRecordResponse>>) {
    let service = state.withdrawal_service();
    let remark = request.remark.as_deref().unwrap_or("");
    respond(service.approve(request.record_id, request.actor, remark).await)
}

/// Reject a pending withdrawal with a mandatory reason; the reserved amount
/// is credited back.
pub async fn withdraw_reject(
    State(state): State<AppState>,
    Json(request): Json<RejectRequest>,
) -> (StatusCode, Json<ApiResponse<SettleRecordResponse>>) {
    if let Err(msg) = request.validate() {
        return validation_failure(msg);
    }

    let service = state.withdrawal_service();
    respond(service.reject(request.record_id, request.actor, &request.remark).await)
}

/// Approve a batch of withdrawals; failures are counted, not propagated.
pub async fn withdraw_batch_approve(
    State(state): State<AppState>,
    Json(request): Json<BatchApproveRequest>,
) -> (StatusCode, Json<ApiResponse<BatchApproveResponse>>) {
    if let Err(msg) = request.validate() {
        return validation_failure(msg);
    }

    let service = state.withdrawal_service();
    respond(service.batch_approve(&request.record_ids, request.actor).await)
}

/// Cross-merchant withdrawal record listing, with the pending backlog for
/// the approval dashboard.
pub async fn admin_withdraw_records(
    State(state): State<AppState>,
    Query(query): Query<ListRecordsQuery>,
) -> (StatusCode, Json<ApiResponse<AdminRecordListResponse>>) {
    let status = match parse_status(query.status.as_deref()) {
        Ok(status) => status,
        Err(msg) => return validation_failure(msg),
    };

    let criteria = SettleRecordQuery {
        merchant_id: query.merchant_id,
        status,
        settle_type: query.settle_type.clone(),
        limit: query.limit.unwrap_or(20).min(100),
        offset: query.offset.unwrap_or(0),
    };

    let service = state.withdrawal_service();
    let listing = service.list_records(&criteria).await;
    let stats = service.pending_stats().await;

    match (listing, stats) {
        (Ok((records, total)), Ok((pending_count, pending_amount))) => {
            let items: Vec<SettleRecordResponse> =
                records.into_iter().map(SettleRecordResponse::from).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(AdminRecordListResponse {
                    items,
                    total,
                    limit: criteria.limit,
                    offset: criteria.offset,
                    pending_count,
                    pending_amount: format!("{:.2}", pending_amount),
                })),
            )
        }
        (Err(err), _) | (_, Err(err)) => {
            tracing::error!("failed to list settlement records: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failure("an internal error occurred")),
            )
        }
    }
}

async fn list_records(
    state: &AppState,
    criteria: &SettleRecordQuery,
) -> (StatusCode, Json<ApiResponse<PaginatedResponse<SettleRecordResponse>>>) {
    let service = state.withdrawal_service();
    match service.list_records(criteria).await {
        Ok((records, total)) => {
            let items: Vec<SettleRecordResponse> =
                records.into_iter().map(SettleRecordResponse::from).collect();
            (
                StatusCode::OK,
                Json(ApiResponse::success(PaginatedResponse::new(
                    items,
                    total,
                    criteria.limit,
                    criteria.offset,
                ))),
            )
        }
        Err(err) => {
            tracing::error!("failed to list settlement records: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::failure("an internal error occurred")),
            )
        }
    }
}

/// Accepts both the named statuses and the historical numeric codes.
fn parse_status(status: Option<&str>) -> std::result::Result<Option<SettleStatus>, String> {
    match status {
        None => Ok(None),
        Some(s) => match s.to_lowercase().as_str() {
            "pending" | "0" => Ok(Some(SettleStatus::Pending)),
            "approved" | "1" => Ok(Some(SettleStatus::Approved)),
            "terminated" | "3" => Ok(Some(SettleStatus::Terminated)),
            other => Err(format!(
                "invalid status '{}'. Valid values: pending, approved, terminated",
                other
            )),
        },
    }
}
