//! Payment handlers.
//!
//! ```text
//! POST /api/v1/payments                      Idempotency-Key: <key>
//! GET  /api/v1/payments?limit=20&offset=0
//! GET  /api/v1/payments/{id}
//! POST /api/v1/admin/payments/{id}/settle   {"outcome":"COMPLETED"}
//! ```
//!
//! Sending requires an `Idempotency-Key` header. A retried request with the
//! same key returns the stored transaction with `200` and
//! `Idempotent-Replayed: true` instead of `201`.

use actix_web::{HttpRequest, HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{
    Caller, Page, PaymentRequest, SettlementOutcome, Transaction, TransactionId, UserId,
};
use crate::inbound::http::ApiResult;
use crate::inbound::http::idempotency::{IDEMPOTENT_REPLAYED_HEADER, require_idempotency_key};
use crate::inbound::http::schemas::{ErrorSchema, TransactionPageSchema, TransactionSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{FieldName, PageQuery, parse_uuid};

/// Body of `POST /api/v1/payments`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendPaymentRequest {
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    pub recipient_id: String,
    /// Amount in minor units, `1..=1000000000`.
    #[schema(example = 2500)]
    pub amount_cents: i64,
    /// ISO currency code: `USD`, `EUR` or `GBP`.
    #[schema(example = "EUR")]
    pub currency: String,
    /// Free text, sanitised and capped at 280 characters.
    #[serde(default)]
    pub description: Option<String>,
}

/// Body of the settlement endpoint.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SettleRequest {
    /// `COMPLETED` or `FAILED`.
    #[schema(value_type = String, example = "COMPLETED")]
    pub outcome: SettlementOutcome,
}

pub(crate) fn transaction_id(raw: &str) -> Result<TransactionId, crate::domain::Error> {
    parse_uuid(raw, FieldName::new("id")).map(TransactionId::from_uuid)
}

/// Send money to another user.
#[utoipa::path(
    post,
    path = "/api/v1/payments",
    request_body = SendPaymentRequest,
    params(("Idempotency-Key" = String, Header, description = "Client-chosen deduplication key")),
    responses(
        (status = 201, description = "Payment recorded", body = TransactionSchema),
        (status = 200, description = "Replay of an earlier request", body = TransactionSchema,
            headers(("Idempotent-Replayed" = String, description = "Always `true`"))),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Key lacks write permission", body = ErrorSchema),
        (status = 404, description = "Recipient not found", body = ErrorSchema),
        (status = 409, description = "Key reused by another sender", body = ErrorSchema),
        (status = 503, description = "Service unavailable", body = ErrorSchema)
    ),
    tags = ["payments"],
    operation_id = "sendPayment"
)]
#[post("/payments")]
pub async fn send_payment(
    state: web::Data<HttpState>,
    caller: Caller,
    request: HttpRequest,
    payload: web::Json<SendPaymentRequest>,
) -> ApiResult<HttpResponse> {
    let idempotency_key = require_idempotency_key(request.headers())?;
    let payload = payload.into_inner();
    let recipient_id = UserId::from_uuid(parse_uuid(
        &payload.recipient_id,
        FieldName::new("recipientId"),
    )?);
    let outcome = state
        .payments
        .send(
            &caller,
            PaymentRequest {
                idempotency_key,
                recipient_id,
                amount_cents: payload.amount_cents,
                currency: payload.currency,
                description: payload.description,
            },
        )
        .await?;

    if outcome.replayed {
        Ok(HttpResponse::Ok()
            .insert_header((IDEMPOTENT_REPLAYED_HEADER, "true"))
            .json(outcome.transaction))
    } else {
        Ok(HttpResponse::Created().json(outcome.transaction))
    }
}

/// Transactions the caller sent or received, newest first.
#[utoipa::path(
    get,
    path = "/api/v1/payments",
    params(PageQuery),
    responses(
        (status = 200, description = "Transactions", body = TransactionPageSchema),
        (status = 400, description = "Invalid pagination", body = ErrorSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema)
    ),
    tags = ["payments"],
    operation_id = "listPayments"
)]
#[get("/payments")]
pub async fn list_payments(
    state: web::Data<HttpState>,
    caller: Caller,
    query: web::Query<PageQuery>,
) -> ApiResult<web::Json<Page<Transaction>>> {
    let page = query.to_request()?;
    Ok(web::Json(state.payments_query.list(&caller, page).await?))
}

/// One transaction, visible to its participants and administrators.
#[utoipa::path(
    get,
    path = "/api/v1/payments/{id}",
    params(("id" = String, Path, description = "Transaction identifier")),
    responses(
        (status = 200, description = "Transaction", body = TransactionSchema),
        (status = 401, description = "Unauthorised", body = ErrorSchema),
        (status = 403, description = "Not a participant", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema)
    ),
    tags = ["payments"],
    operation_id = "getPayment"
)]
#[get("/payments/{id}")]
pub async fn get_payment(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
) -> ApiResult<web::Json<Transaction>> {
    let id = transaction_id(&path)?;
    Ok(web::Json(state.payments_query.get(&caller, &id).await?))
}

/// Move a pending transaction to its terminal state.
#[utoipa::path(
    post,
    path = "/api/v1/admin/payments/{id}/settle",
    params(("id" = String, Path, description = "Transaction identifier")),
    request_body = SettleRequest,
    responses(
        (status = 200, description = "Settled transaction", body = TransactionSchema),
        (status = 403, description = "Forbidden", body = ErrorSchema),
        (status = 404, description = "Not found", body = ErrorSchema),
        (status = 409, description = "Transaction already settled", body = ErrorSchema)
    ),
    tags = ["admin"],
    operation_id = "settlePayment"
)]
#[post("/admin/payments/{id}/settle")]
pub async fn settle_payment(
    state: web::Data<HttpState>,
    caller: Caller,
    path: web::Path<String>,
    payload: web::Json<SettleRequest>,
) -> ApiResult<web::Json<Transaction>> {
    let id = transaction_id(&path)?;
    let transaction = state
        .payments
        .settle(&caller, &id, payload.into_inner().outcome)
        .await?;
    Ok(web::Json(transaction))
}
