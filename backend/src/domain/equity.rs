//! Equity dilution calculator.
//!
//! Closed-form round maths over integer minor units and basis points:
//!
//! - `post_money = pre_money + investment`
//! - `investor_bps = round(investment / post_money * 10_000)`
//! - each prior holder keeps `round(prior_bps * (10_000 - investor_bps) / 10_000)`,
//!   computed over running totals so that the holders together never exceed
//!   `10_000 - investor_bps` (a holder may land one basis point below its own
//!   rounded value)
//! - with a share count: `price = pre_money / shares`,
//!   `new_shares = round(investment * shares / pre_money)`
//!
//! All rounding is half-up and performed on `u128` intermediates so no input
//! within `u64` can overflow.

use serde::Serialize;

/// Basis points representing full ownership.
pub const BPS_SCALE: u32 = 10_000;

/// Price precision: prices are reported in thousandths of a minor unit.
pub const PRICE_SCALE: u64 = 1_000;

/// Errors raised by the calculator for inputs that have no meaningful answer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EquityError {
    #[error("pre-money valuation must be greater than zero")]
    ZeroPreMoney,
    #[error("investment must be greater than zero")]
    ZeroInvestment,
    #[error("post-money valuation exceeds the supported range")]
    ValuationOverflow,
    #[error("pre-money share count must be greater than zero")]
    ZeroShares,
    #[error("holder name must not be empty")]
    EmptyHolderName,
    #[error("holder ownership totals {total} bps, above {BPS_SCALE}")]
    HoldersExceedWhole { total: u64 },
}

impl EquityError {
    /// Name of the input field the error refers to.
    pub fn field(&self) -> &'static str {
        match self {
            Self::ZeroPreMoney | Self::ValuationOverflow => "preMoneyCents",
            Self::ZeroInvestment => "investmentCents",
            Self::ZeroShares => "preMoneyShares",
            Self::EmptyHolderName | Self::HoldersExceedWhole { .. } => "holders",
        }
    }
}

/// Ownership held by an existing shareholder before the round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HolderStake {
    pub name: String,
    pub ownership_bps: u32,
}

/// Inputs describing a priced funding round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FundingRound {
    pub pre_money_cents: u64,
    pub investment_cents: u64,
    pub pre_money_shares: Option<u64>,
    pub holders: Vec<HolderStake>,
}

/// Ownership change for one prior holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HolderDilution {
    pub name: String,
    pub before_bps: u32,
    pub after_bps: u32,
    pub dilution_bps: u32,
}

/// Share-level terms, present when a pre-money share count was supplied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShareTerms {
    /// Price per share in thousandths of a minor unit.
    pub price_per_share_millicents: u64,
    pub new_shares: u64,
    pub post_money_shares: u64,
}

/// Result of evaluating a [`FundingRound`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundOutcome {
    pub pre_money_cents: u64,
    pub investment_cents: u64,
    pub post_money_cents: u64,
    pub investor_ownership_bps: u32,
    pub holders: Vec<HolderDilution>,
    pub shares: Option<ShareTerms>,
}

fn div_round_half_up(numerator: u128, denominator: u128) -> u128 {
    (numerator * 2 + denominator) / (denominator * 2)
}

/// Post-money valuation.
///
/// # Examples
/// ```
/// use dfds_backend::domain::equity::post_money;
///
/// assert_eq!(post_money(8_000_000, 2_000_000), Ok(10_000_000));
/// ```
pub fn post_money(pre_money_cents: u64, investment_cents: u64) -> Result<u64, EquityError> {
    if pre_money_cents == 0 {
        return Err(EquityError::ZeroPreMoney);
    }
    if investment_cents == 0 {
        return Err(EquityError::ZeroInvestment);
    }
    pre_money_cents
        .checked_add(investment_cents)
        .ok_or(EquityError::ValuationOverflow)
}

/// Share of `whole` represented by `part`, in basis points, rounded half up.
///
/// `part` must not exceed `whole`; the result is then at most [`BPS_SCALE`].
pub fn ownership_bps(part: u64, whole: u64) -> u32 {
    if whole == 0 {
        return 0;
    }
    let bps = div_round_half_up(u128::from(part) * u128::from(BPS_SCALE), u128::from(whole));
    u32::try_from(bps.min(u128::from(BPS_SCALE))).unwrap_or(BPS_SCALE)
}

/// Prior ownership scaled down by the investor's new stake.
pub fn diluted_bps(prior_bps: u32, investor_bps: u32) -> u32 {
    let remaining = BPS_SCALE.saturating_sub(investor_bps);
    let scaled = div_round_half_up(
        u128::from(prior_bps) * u128::from(remaining),
        u128::from(BPS_SCALE),
    );
    u32::try_from(scaled).unwrap_or(prior_bps)
}

fn share_terms(
    pre_money_cents: u64,
    investment_cents: u64,
    pre_money_shares: u64,
) -> Result<ShareTerms, EquityError> {
    if pre_money_shares == 0 {
        return Err(EquityError::ZeroShares);
    }
    let price = div_round_half_up(
        u128::from(pre_money_cents) * u128::from(PRICE_SCALE),
        u128::from(pre_money_shares),
    );
    let new_shares = div_round_half_up(
        u128::from(investment_cents) * u128::from(pre_money_shares),
        u128::from(pre_money_cents),
    );
    let price_per_share_millicents =
        u64::try_from(price).map_err(|_| EquityError::ValuationOverflow)?;
    let new_shares = u64::try_from(new_shares).map_err(|_| EquityError::ValuationOverflow)?;
    let post_money_shares = pre_money_shares
        .checked_add(new_shares)
        .ok_or(EquityError::ValuationOverflow)?;
    Ok(ShareTerms {
        price_per_share_millicents,
        new_shares,
        post_money_shares,
    })
}

/// Evaluate a funding round.
///
/// # Examples
/// ```
/// use dfds_backend::domain::equity::{calculate, FundingRound, HolderStake};
///
/// let outcome = calculate(&FundingRound {
///     pre_money_cents: 800_000_000,
///     investment_cents: 200_000_000,
///     pre_money_shares: None,
///     holders: vec![HolderStake { name: "Founder".into(), ownership_bps: 6_000 }],
/// })
/// .unwrap();
/// assert_eq!(outcome.investor_ownership_bps, 2_000);
/// assert_eq!(outcome.holders[0].after_bps, 4_800);
/// ```
pub fn calculate(round: &FundingRound) -> Result<RoundOutcome, EquityError> {
    let post_money_cents = post_money(round.pre_money_cents, round.investment_cents)?;

    if round.holders.iter().any(|holder| holder.name.trim().is_empty()) {
        return Err(EquityError::EmptyHolderName);
    }
    let total: u64 = round
        .holders
        .iter()
        .map(|holder| u64::from(holder.ownership_bps))
        .sum();
    if total > u64::from(BPS_SCALE) {
        return Err(EquityError::HoldersExceedWhole { total });
    }

    let investor_ownership_bps = ownership_bps(round.investment_cents, post_money_cents);
    let mut cumulative_before = 0_u32;
    let mut cumulative_after = 0_u32;
    let holders = round
        .holders
        .iter()
        .map(|holder| {
            cumulative_before = cumulative_before.saturating_add(holder.ownership_bps);
            let running = diluted_bps(cumulative_before, investor_ownership_bps);
            let after_bps = running.saturating_sub(cumulative_after);
            cumulative_after = running;
            HolderDilution {
                name: holder.name.trim().to_owned(),
                before_bps: holder.ownership_bps,
                after_bps,
                dilution_bps: holder.ownership_bps.saturating_sub(after_bps),
            }
        })
        .collect();

    let shares = round
        .pre_money_shares
        .map(|count| share_terms(round.pre_money_cents, round.investment_cents, count))
        .transpose()?;

    Ok(RoundOutcome {
        pre_money_cents: round.pre_money_cents,
        investment_cents: round.investment_cents,
        post_money_cents,
        investor_ownership_bps,
        holders,
        shares,
    })
}
