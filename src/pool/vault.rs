use soroban_fixed_point_math::SorobanFixedPoint;
use soroban_sdk::Env;

/// Convert an amount of the underlying to shares against a pool total.
///
/// When no amount has been deposited yet the conversion is the identity, so
/// the first depositor bootstraps the ledger 1:1. Rounding direction is chosen
/// by the caller per use-site; the ledger itself is direction-agnostic.
///
/// ### Arguments
/// * `total_amount` - The pool's total amount on this side of the ledger
/// * `total_shares` - The pool's total issued shares on this side
/// * `amount` - The amount to convert
/// * `round_up` - If the result should round in favor of the share count
pub fn shares_for_amount(
    e: &Env,
    total_amount: i128,
    total_shares: i128,
    amount: i128,
    round_up: bool,
) -> i128 {
    if total_amount == 0 {
        return amount;
    }
    if round_up {
        amount.fixed_mul_ceil(e, &total_shares, &total_amount)
    } else {
        amount.fixed_mul_floor(e, &total_shares, &total_amount)
    }
}

/// Convert shares to an amount of the underlying against a pool total.
///
/// The zero-share bootstrap case is the identity, mirroring
/// `shares_for_amount`.
///
/// ### Arguments
/// * `total_amount` - The pool's total amount on this side of the ledger
/// * `total_shares` - The pool's total issued shares on this side
/// * `shares` - The shares to convert
/// * `round_up` - If the result should round in favor of the amount
pub fn amount_for_shares(
    e: &Env,
    total_amount: i128,
    total_shares: i128,
    shares: i128,
    round_up: bool,
) -> i128 {
    if total_shares == 0 {
        return shares;
    }
    if round_up {
        shares.fixed_mul_ceil(e, &total_amount, &total_shares)
    } else {
        shares.fixed_mul_floor(e, &total_amount, &total_shares)
    }
}
