//! Funding round calculator.
//!
//! ```text
//! POST /api/v1/equity/calculate
//! {"preMoneyCents":400000000,"investmentCents":100000000,
//!  "preMoneyShares":1000000,"holders":[{"name":"Founder","ownershipBps":10000}]}
//! ```
//!
//! Pure computation; no credentials are required.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::equity;
use crate::domain::{Error, FundingRound, HolderStake, RoundOutcome};
use crate::inbound::http::ApiResult;
use crate::inbound::http::schemas::{ErrorSchema, RoundOutcomeSchema};

/// An existing shareholder.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HolderInput {
    pub name: String,
    /// Ownership before the round, in basis points.
    #[schema(example = 6000)]
    pub ownership_bps: u32,
}

/// Body of `POST /api/v1/equity/calculate`.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CalculateRequest {
    #[schema(example = 400_000_000)]
    pub pre_money_cents: u64,
    #[schema(example = 100_000_000)]
    pub investment_cents: u64,
    /// Fully diluted share count before the round; enables share pricing.
    pub pre_money_shares: Option<u64>,
    #[serde(default)]
    pub holders: Vec<HolderInput>,
}

impl From<CalculateRequest> for FundingRound {
    fn from(value: CalculateRequest) -> Self {
        Self {
            pre_money_cents: value.pre_money_cents,
            investment_cents: value.investment_cents,
            pre_money_shares: value.pre_money_shares,
            holders: value
                .holders
                .into_iter()
                .map(|holder| HolderStake {
                    name: holder.name,
                    ownership_bps: holder.ownership_bps,
                })
                .collect(),
        }
    }
}

/// Post-money valuation, investor stake and per-holder dilution.
#[utoipa::path(
    post,
    path = "/api/v1/equity/calculate",
    request_body = CalculateRequest,
    responses(
        (status = 200, description = "Round outcome", body = RoundOutcomeSchema),
        (status = 400, description = "Inputs have no meaningful answer", body = ErrorSchema)
    ),
    tags = ["equity"],
    operation_id = "calculateRound",
    security([])
)]
#[post("/equity/calculate")]
pub async fn calculate(payload: web::Json<CalculateRequest>) -> ApiResult<web::Json<RoundOutcome>> {
    let round = FundingRound::from(payload.into_inner());
    let outcome = equity::calculate(&round)
        .map_err(|err| Error::invalid_field(err.field(), "invalid", err.to_string()))?;
    Ok(web::Json(outcome))
}
