use cast::i128;
use soroban_sdk::{panic_with_error, Address, Env};

use crate::{
    constants::SCALAR_5,
    errors::PairPoolError,
    storage::{self, OracleConfig, PairConfig, PairData},
};

use super::RateConfig;

/// Initialize the pair with its immutable configuration and seed the ledger
/// totals.
///
/// ### Panics
/// If any configuration value is outside its supported range
pub fn execute_initialize(
    e: &Env,
    admin: &Address,
    fee_to: &Address,
    config: &PairConfig,
    oracle_config: &OracleConfig,
    rate_config: &RateConfig,
) {
    if config.asset == config.collateral_asset
        || config.max_ltv == 0
        || i128(config.max_ltv) >= SCALAR_5
        || i128(config.liquidation_fee) >= SCALAR_5
        || i128(config.fee_to_protocol_rate) > SCALAR_5
        || config.penalty_rate < 0
    {
        panic_with_error!(e, PairPoolError::InvalidPairInitArgs);
    }
    if oracle_config.normalization < -18 || oracle_config.normalization > 18 {
        panic_with_error!(e, PairPoolError::InvalidPairInitArgs);
    }
    rate_config.require_valid(e);

    storage::set_admin(e, admin);
    storage::set_fee_to(e, fee_to);
    storage::set_pair_config(e, config);
    storage::set_oracle_config(e, oracle_config);
    storage::set_rate_config(e, rate_config);
    storage::set_pair_data(
        e,
        &PairData {
            total_asset_amount: 0,
            total_asset_shares: 0,
            total_borrow_amount: 0,
            total_borrow_shares: 0,
            total_collateral: 0,
            last_timestamp: e.ledger().timestamp(),
            rate_per_sec: rate_config.initial_rate(),
        },
    );
}
