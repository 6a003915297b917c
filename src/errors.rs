use soroban_sdk::contracterror;

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
/// Error codes for the pair pool contract. Common errors are codes that match
/// up with the built-in contracts error reporting. Pair specific errors start
/// at 1200.
pub enum PairPoolError {
    // Common Errors
    InternalError = 1,
    AlreadyInitializedError = 3,

    UnauthorizedError = 4,

    NegativeAmountError = 8,
    BalanceError = 10,
    OverflowError = 12,

    // Configuration Errors (start at 1200)
    BadRequest = 1200,
    InvalidPairInitArgs = 1201,
    InvalidRateConfig = 1202,
    NotApprovedLender = 1203,
    NotApprovedBorrower = 1204,

    // Pair State Errors
    InsufficientLiquidity = 1205,
    PositionInsolvent = 1206,
    MaturityExceeded = 1207,

    // Oracle Errors
    StalePrice = 1210,
    InvalidPrice = 1211,

    // Liquidation Errors
    LiquidationNotEligible = 1212,
}
