use soroban_sdk::{contracttype, unwrap::UnwrapOptimized, Address, Env, IntoVal, Symbol, TryFromVal, Val};

use crate::pool::RateConfig;

pub(crate) const LEDGER_THRESHOLD_SHARED: u32 = 172800; // ~ 10 days
pub(crate) const LEDGER_BUMP_SHARED: u32 = 241920; // ~ 14 days

pub(crate) const LEDGER_THRESHOLD_USER: u32 = 518400; // ~ 30 days
pub(crate) const LEDGER_BUMP_USER: u32 = 535670; // ~ 31 days

/********** Storage Types **********/

/// The pair's configuration, immutable after initialization
#[derive(Clone)]
#[contracttype]
pub struct PairConfig {
    pub asset: Address,            // the lendable asset contract
    pub collateral_asset: Address, // the collateral asset contract
    pub max_ltv: u32,              // the maximum loan to value fraction, 5 decimals
    pub liquidation_fee: u32,      // the liquidator's bonus on seized collateral, 5 decimals
    pub fee_to_protocol_rate: u32, // the share of accrued interest taken by the protocol, 5 decimals
    pub maturity: u64,             // optional maturity timestamp, 0 for none
    pub penalty_rate: i128,        // the per second rate applied past maturity, 18 decimals
    pub restrict_lenders: bool,    // if true, only approved lenders can deposit
    pub restrict_borrowers: bool,  // if true, only approved borrowers can borrow
}

/// Configuration of the oracle pair used to produce the exchange rate
#[derive(Clone)]
#[contracttype]
pub struct OracleConfig {
    pub divide_feed: Address,           // feed pricing the collateral asset
    pub multiply_feed: Option<Address>, // feed pricing the lendable asset, None treats it as the base
    pub normalization: i32,             // power of ten exponent applied to the combined rate
    pub max_age: u64,                   // maximum allowed price age in seconds
}

/// The pair's mutable ledger totals and rate state
#[derive(Clone)]
#[contracttype]
pub struct PairData {
    pub total_asset_amount: i128,  // total lendable asset deposited, including accrued interest
    pub total_asset_shares: i128,  // total lender shares issued
    pub total_borrow_amount: i128, // total lendable asset borrowed, including accrued interest
    pub total_borrow_shares: i128, // total borrower shares issued
    pub total_collateral: i128,    // total collateral held by the pair
    pub last_timestamp: u64,       // the last timestamp interest was accrued to
    pub rate_per_sec: i128,        // the current per second interest rate, 18 decimals
}

/// The last exchange rate read from the oracle pair
#[derive(Clone)]
#[contracttype]
pub struct ExchangeRateInfo {
    pub last_timestamp: u64,
    pub exchange_rate: i128, // collateral units per unit of asset, 18 decimals
}

/// A view of the stored rate state
#[derive(Clone)]
#[contracttype]
pub struct CurrentRateInfo {
    pub last_timestamp: u64,
    pub fee_to_protocol_rate: u32,
    pub rate_per_sec: i128,
}

/// A user's position with the pair
#[derive(Clone)]
#[contracttype]
pub struct Positions {
    pub asset_shares: i128,  // lender claim against the total asset amount
    pub borrow_shares: i128, // debt claim against the total borrow amount
    pub collateral: i128,    // collateral asset balance backing the debt
}

impl Positions {
    pub fn empty() -> Self {
        Positions {
            asset_shares: 0,
            borrow_shares: 0,
            collateral: 0,
        }
    }
}

/********** Storage Key Types **********/

const ADMIN_KEY: &str = "Admin";
const FEE_TO_KEY: &str = "FeeTo";
const PAIR_CONFIG_KEY: &str = "Config";
const ORACLE_CONFIG_KEY: &str = "Oracle";
const RATE_CONFIG_KEY: &str = "RateCfg";
const PAIR_DATA_KEY: &str = "PairData";
const EXCHANGE_RATE_KEY: &str = "ExchRate";

#[derive(Clone)]
#[contracttype]
pub enum PairDataKey {
    // A map of user address to their position with the pair
    Positions(Address),
    // Approval entries for the lender allow-list
    Lender(Address),
    // Approval entries for the borrower allow-list
    Borrower(Address),
}

/********** Storage **********/

/// Bump the instance rent for the contract
pub fn extend_instance(e: &Env) {
    e.storage()
        .instance()
        .extend_ttl(LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/// Fetch an entry in persistent storage that has a default value if it doesn't exist
fn get_persistent_default<K: IntoVal<Env, Val>, V: TryFromVal<Env, Val>>(
    e: &Env,
    key: &K,
    default: V,
    bump_threshold: u32,
    bump_amount: u32,
) -> V {
    if let Some(result) = e.storage().persistent().get::<K, V>(key) {
        e.storage()
            .persistent()
            .extend_ttl(key, bump_threshold, bump_amount);
        result
    } else {
        default
    }
}

/********** Admin **********/

/// Fetch the current admin Address
///
/// ### Panics
/// If the admin does not exist
pub fn get_admin(e: &Env) -> Address {
    e.storage()
        .instance()
        .get(&Symbol::new(e, ADMIN_KEY))
        .unwrap_optimized()
}

/// Set a new admin
///
/// ### Arguments
/// * `new_admin` - The Address for the admin
pub fn set_admin(e: &Env, new_admin: &Address) {
    e.storage()
        .instance()
        .set::<Symbol, Address>(&Symbol::new(e, ADMIN_KEY), new_admin);
}

/// Checks if an admin is set
pub fn has_admin(e: &Env) -> bool {
    e.storage().instance().has(&Symbol::new(e, ADMIN_KEY))
}

/********** Fee Recipient **********/

/// Fetch the address protocol fee shares are minted to
pub fn get_fee_to(e: &Env) -> Address {
    e.storage()
        .instance()
        .get(&Symbol::new(e, FEE_TO_KEY))
        .unwrap_optimized()
}

/// Set the address protocol fee shares are minted to
pub fn set_fee_to(e: &Env, fee_to: &Address) {
    e.storage()
        .instance()
        .set::<Symbol, Address>(&Symbol::new(e, FEE_TO_KEY), fee_to);
}

/********** Pair Config **********/

/// Fetch the pair configuration
///
/// ### Panics
/// If the pair's config is not set
pub fn get_pair_config(e: &Env) -> PairConfig {
    e.storage()
        .instance()
        .get(&Symbol::new(e, PAIR_CONFIG_KEY))
        .unwrap_optimized()
}

/// Set the pair configuration
pub fn set_pair_config(e: &Env, config: &PairConfig) {
    e.storage()
        .instance()
        .set::<Symbol, PairConfig>(&Symbol::new(e, PAIR_CONFIG_KEY), config);
}

/********** Oracle Config **********/

/// Fetch the oracle pair configuration
pub fn get_oracle_config(e: &Env) -> OracleConfig {
    e.storage()
        .instance()
        .get(&Symbol::new(e, ORACLE_CONFIG_KEY))
        .unwrap_optimized()
}

/// Set the oracle pair configuration
pub fn set_oracle_config(e: &Env, config: &OracleConfig) {
    e.storage()
        .instance()
        .set::<Symbol, OracleConfig>(&Symbol::new(e, ORACLE_CONFIG_KEY), config);
}

/********** Rate Config **********/

/// Fetch the interest rate module configuration
pub fn get_rate_config(e: &Env) -> RateConfig {
    e.storage()
        .instance()
        .get(&Symbol::new(e, RATE_CONFIG_KEY))
        .unwrap_optimized()
}

/// Set the interest rate module configuration
pub fn set_rate_config(e: &Env, config: &RateConfig) {
    e.storage()
        .instance()
        .set::<Symbol, RateConfig>(&Symbol::new(e, RATE_CONFIG_KEY), config);
}

/********** Pair Data **********/

/// Fetch the pair's ledger totals and rate state
///
/// ### Panics
/// If the pair has not been initialized
pub fn get_pair_data(e: &Env) -> PairData {
    let key = Symbol::new(e, PAIR_DATA_KEY);
    e.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
    e.storage()
        .persistent()
        .get::<Symbol, PairData>(&key)
        .unwrap_optimized()
}

/// Set the pair's ledger totals and rate state
pub fn set_pair_data(e: &Env, data: &PairData) {
    let key = Symbol::new(e, PAIR_DATA_KEY);
    e.storage().persistent().set::<Symbol, PairData>(&key, data);
    e.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/********** Exchange Rate **********/

/// Fetch the last stored exchange rate, or a zeroed entry if none was stored
pub fn get_exchange_rate_info(e: &Env) -> ExchangeRateInfo {
    get_persistent_default(
        e,
        &Symbol::new(e, EXCHANGE_RATE_KEY),
        ExchangeRateInfo {
            last_timestamp: 0,
            exchange_rate: 0,
        },
        LEDGER_THRESHOLD_SHARED,
        LEDGER_BUMP_SHARED,
    )
}

/// Store the exchange rate read for this action
pub fn set_exchange_rate_info(e: &Env, info: &ExchangeRateInfo) {
    let key = Symbol::new(e, EXCHANGE_RATE_KEY);
    e.storage()
        .persistent()
        .set::<Symbol, ExchangeRateInfo>(&key, info);
    e.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD_SHARED, LEDGER_BUMP_SHARED);
}

/********** User **********/

/// Fetch the user's position or return an empty Positions struct
///
/// ### Arguments
/// * `user` - The address of the user
pub fn get_positions(e: &Env, user: &Address) -> Positions {
    let key = PairDataKey::Positions(user.clone());
    get_persistent_default(
        e,
        &key,
        Positions::empty(),
        LEDGER_THRESHOLD_USER,
        LEDGER_BUMP_USER,
    )
}

/// Set the user's position
///
/// ### Arguments
/// * `user` - The address of the user
/// * `positions` - The new position for the user
pub fn set_positions(e: &Env, user: &Address, positions: &Positions) {
    let key = PairDataKey::Positions(user.clone());
    e.storage()
        .persistent()
        .set::<PairDataKey, Positions>(&key, positions);
    e.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD_USER, LEDGER_BUMP_USER);
}

/********** Allow-lists **********/

/// Check if an address is an approved lender
pub fn get_approved_lender(e: &Env, lender: &Address) -> bool {
    let key = PairDataKey::Lender(lender.clone());
    get_persistent_default(e, &key, false, LEDGER_THRESHOLD_USER, LEDGER_BUMP_USER)
}

/// Set the approval of a lender
pub fn set_approved_lender(e: &Env, lender: &Address, approved: bool) {
    let key = PairDataKey::Lender(lender.clone());
    e.storage()
        .persistent()
        .set::<PairDataKey, bool>(&key, &approved);
    e.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD_USER, LEDGER_BUMP_USER);
}

/// Check if an address is an approved borrower
pub fn get_approved_borrower(e: &Env, borrower: &Address) -> bool {
    let key = PairDataKey::Borrower(borrower.clone());
    get_persistent_default(e, &key, false, LEDGER_THRESHOLD_USER, LEDGER_BUMP_USER)
}

/// Set the approval of a borrower
pub fn set_approved_borrower(e: &Env, borrower: &Address, approved: bool) {
    let key = PairDataKey::Borrower(borrower.clone());
    e.storage()
        .persistent()
        .set::<PairDataKey, bool>(&key, &approved);
    e.storage()
        .persistent()
        .extend_ttl(&key, LEDGER_THRESHOLD_USER, LEDGER_BUMP_USER);
}
