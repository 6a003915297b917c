use cast::i128;
use soroban_fixed_point_math::SorobanFixedPoint;
use soroban_sdk::{contracttype, panic_with_error, Env};

use crate::{
    constants::{SCALAR_18, SCALAR_5},
    errors::PairPoolError,
    oracle,
    storage::{self, ExchangeRateInfo, PairConfig, PairData},
};

use super::{interest, vault, RateConfig};

/// The result of accruing interest on the pair.
#[derive(Clone)]
#[contracttype]
pub struct InterestAccrued {
    pub interest_earned: i128, // interest added to both sides of the ledger
    pub fee_amount: i128,      // the slice of interest taken as protocol fee
    pub rate_per_sec: i128,    // the rate stored after the update, 18 decimals
    pub utilization: i128,     // the utilization the rate was computed from, 5 decimals
}

/// The pair aggregate, loaded once per action and stored after all ledger
/// mutations have been applied.
pub struct Pair {
    pub config: PairConfig,
    pub rate_config: RateConfig,
    pub data: PairData,
    exchange_rate: Option<i128>,
}

impl Pair {
    /// Load the Pair from the ledger
    pub fn load(e: &Env) -> Self {
        Pair {
            config: storage::get_pair_config(e),
            rate_config: storage::get_rate_config(e),
            data: storage::get_pair_data(e),
            exchange_rate: None,
        }
    }

    /// Store the pair's ledger totals and rate state
    pub fn store(&self, e: &Env) {
        storage::set_pair_data(e, &self.data);
    }

    /// Fetch the current utilization normalized to 5 decimals. Zero when
    /// nothing has been deposited.
    pub fn utilization(&self, e: &Env) -> i128 {
        if self.data.total_asset_amount == 0 {
            return 0;
        }
        self.data
            .total_borrow_amount
            .fixed_mul_floor(e, &SCALAR_5, &self.data.total_asset_amount)
    }

    /// True once the pair's configured maturity has passed
    pub fn is_matured(&self, e: &Env) -> bool {
        self.config.maturity != 0 && e.ledger().timestamp() > self.config.maturity
    }

    /// Accrue interest up to the current ledger timestamp and split the
    /// protocol fee off as lender share dilution.
    ///
    /// A second call within the same timestamp is a no-op, as is accrual on a
    /// pair with no deposits. Must run before any other ledger mutation so
    /// downstream conversions see post-accrual totals.
    pub fn accrue(&mut self, e: &Env) -> InterestAccrued {
        let now = e.ledger().timestamp();
        let utilization = self.utilization(e);
        if now == self.data.last_timestamp {
            return InterestAccrued {
                interest_earned: 0,
                fee_amount: 0,
                rate_per_sec: self.data.rate_per_sec,
                utilization,
            };
        }
        if self.data.total_asset_amount == 0 {
            self.data.last_timestamp = now;
            return InterestAccrued {
                interest_earned: 0,
                fee_amount: 0,
                rate_per_sec: self.data.rate_per_sec,
                utilization,
            };
        }

        let elapsed = now - self.data.last_timestamp;
        let new_rate = if self.is_matured(e) {
            self.config.penalty_rate
        } else {
            interest::update_rate(
                e,
                &self.rate_config,
                utilization,
                self.data.rate_per_sec,
                elapsed,
            )
        };

        let interest_earned = self.data.total_borrow_amount.fixed_mul_floor(
            e,
            &(new_rate * i128(elapsed)),
            &SCALAR_18,
        );
        self.data.total_borrow_amount += interest_earned;
        self.data.total_asset_amount += interest_earned;

        // the fee dilutes lenders by minting shares against the post-accrual
        // amount and pre-mint share supply
        let fee_amount = interest_earned.fixed_mul_floor(
            e,
            &i128(self.config.fee_to_protocol_rate),
            &SCALAR_5,
        );
        if fee_amount > 0 {
            let fee_shares = vault::shares_for_amount(
                e,
                self.data.total_asset_amount,
                self.data.total_asset_shares,
                fee_amount,
                false,
            );
            if fee_shares > 0 {
                let fee_to = storage::get_fee_to(e);
                let mut fee_positions = storage::get_positions(e, &fee_to);
                fee_positions.asset_shares += fee_shares;
                storage::set_positions(e, &fee_to, &fee_positions);
                self.data.total_asset_shares += fee_shares;
            }
        }

        self.data.rate_per_sec = new_rate;
        self.data.last_timestamp = now;

        InterestAccrued {
            interest_earned,
            fee_amount,
            rate_per_sec: new_rate,
            utilization,
        }
    }

    /// Load the exchange rate from the oracle pair and record it. Returns a
    /// cached version if one was already read this action.
    pub fn load_exchange_rate(&mut self, e: &Env) -> i128 {
        if let Some(exchange_rate) = self.exchange_rate {
            return exchange_rate;
        }
        let oracle_config = storage::get_oracle_config(e);
        let exchange_rate = oracle::load_exchange_rate(
            e,
            &oracle_config,
            &self.config.asset,
            &self.config.collateral_asset,
        );
        self.exchange_rate = Some(exchange_rate);
        storage::set_exchange_rate_info(
            e,
            &ExchangeRateInfo {
                last_timestamp: e.ledger().timestamp(),
                exchange_rate,
            },
        );
        exchange_rate
    }

    /// Require that the un-lent liquidity covers an outflow of `amount`, or panic
    pub fn require_liquidity(&self, e: &Env, amount: i128) {
        if amount > self.data.total_asset_amount - self.data.total_borrow_amount {
            panic_with_error!(e, PairPoolError::InsufficientLiquidity);
        }
    }

    /********** Conversion Functions **********/

    /// Convert an asset amount to lender shares - rounding down
    pub fn to_asset_shares_down(&self, e: &Env, amount: i128) -> i128 {
        vault::shares_for_amount(
            e,
            self.data.total_asset_amount,
            self.data.total_asset_shares,
            amount,
            false,
        )
    }

    /// Convert lender shares to an asset amount - rounding down
    pub fn to_asset_amount_down(&self, e: &Env, shares: i128) -> i128 {
        vault::amount_for_shares(
            e,
            self.data.total_asset_amount,
            self.data.total_asset_shares,
            shares,
            false,
        )
    }

    /// Convert a borrowed amount to debt shares - rounding up
    pub fn to_borrow_shares_up(&self, e: &Env, amount: i128) -> i128 {
        vault::shares_for_amount(
            e,
            self.data.total_borrow_amount,
            self.data.total_borrow_shares,
            amount,
            true,
        )
    }

    /// Convert debt shares to the owed asset amount - rounding up
    pub fn to_borrow_amount_up(&self, e: &Env, shares: i128) -> i128 {
        vault::amount_for_shares(
            e,
            self.data.total_borrow_amount,
            self.data.total_borrow_shares,
            shares,
            true,
        )
    }

    /// Convert debt shares to the owed asset amount - rounding down
    pub fn to_borrow_amount_down(&self, e: &Env, shares: i128) -> i128 {
        vault::amount_for_shares(
            e,
            self.data.total_borrow_amount,
            self.data.total_borrow_shares,
            shares,
            false,
        )
    }
}
