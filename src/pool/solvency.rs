use cast::i128;
use soroban_fixed_point_math::SorobanFixedPoint;
use soroban_sdk::{panic_with_error, Env};

use crate::{
    constants::{SCALAR_18, SCALAR_5},
    errors::PairPoolError,
    storage::Positions,
};

use super::Pair;

/// Calculate the collateral required to hold `borrow_amount` of debt at
/// `target_ltv`, rounding against the borrower.
///
/// ### Arguments
/// * `borrow_amount` - The debt owed in the lendable asset
/// * `exchange_rate` - Collateral units per unit of asset, 18 decimals
/// * `target_ltv` - The loan to value fraction to solve for, 5 decimals
pub fn required_collateral(
    e: &Env,
    borrow_amount: i128,
    exchange_rate: i128,
    target_ltv: u32,
) -> i128 {
    borrow_amount
        .fixed_mul_ceil(e, &exchange_rate, &SCALAR_18)
        .fixed_mul_ceil(e, &SCALAR_5, &i128(target_ltv))
}

/// Require that a position's collateral covers its debt at the pair's max
/// LTV. Positions with no debt are always solvent, so the oracle is never
/// read for them.
///
/// ### Panics
/// If the position's debt exceeds what its collateral supports
pub fn require_solvent(e: &Env, pair: &mut Pair, positions: &Positions) {
    if positions.borrow_shares == 0 {
        return;
    }
    let borrow_amount = pair.to_borrow_amount_up(e, positions.borrow_shares);
    let exchange_rate = pair.load_exchange_rate(e);
    let required = required_collateral(e, borrow_amount, exchange_rate, pair.config.max_ltv);
    if positions.collateral < required {
        panic_with_error!(e, PairPoolError::PositionInsolvent);
    }
}

/// Check if a position can be liquidated. A position is eligible once it is
/// insolvent against the max LTV, or unconditionally past the pair's
/// maturity.
pub fn is_liquidatable(e: &Env, pair: &mut Pair, positions: &Positions) -> bool {
    if positions.borrow_shares == 0 {
        return false;
    }
    if pair.is_matured(e) {
        return true;
    }
    let borrow_amount = pair.to_borrow_amount_up(e, positions.borrow_shares);
    let exchange_rate = pair.load_exchange_rate(e);
    let required = required_collateral(e, borrow_amount, exchange_rate, pair.config.max_ltv);
    positions.collateral < required
}
