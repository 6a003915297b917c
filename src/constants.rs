/********** Numbers **********/

/// Fixed-point scalar for 5 decimal numbers. Used for LTV, utilization,
/// and fee fractions.
pub const SCALAR_5: i128 = 1_00000;

/// Fixed-point scalar for 18 decimal numbers. Used for per-second interest
/// rates and the collateral exchange rate.
pub const SCALAR_18: i128 = 1_000_000_000_000_000_000;
