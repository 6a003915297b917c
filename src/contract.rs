use crate::{
    errors::PairPoolError,
    pool::{self, InterestAccrued, PairSnapshot, RateConfig},
    storage::{
        self, CurrentRateInfo, ExchangeRateInfo, OracleConfig, PairConfig, Positions,
    },
};
use soroban_sdk::{contract, contractclient, contractimpl, panic_with_error, Address, Env, Symbol};

/// ### Pair Pool
///
/// An isolated lending pair between one lendable asset and one collateral
/// asset. Lenders hold pro-rata shares of the lendable asset, borrowers hold
/// pro-rata shares of the outstanding debt, and positions must stay under the
/// pair's max LTV against the oracle exchange rate.
#[contract]
pub struct PairPoolContract;

#[contractclient(name = "PairPoolClient")]
pub trait PairPool {
    /// Initialize the pair
    ///
    /// ### Arguments
    /// * `admin` - The address managing the pair
    /// * `fee_to` - The address protocol fee shares are minted to
    /// * `config` - The pair's immutable configuration
    /// * `oracle_config` - The oracle pair producing the exchange rate
    /// * `rate_config` - The interest rate module constants
    ///
    /// ### Panics
    /// If the pair is already initialized or any argument is invalid
    fn initialize(
        e: Env,
        admin: Address,
        fee_to: Address,
        config: PairConfig,
        oracle_config: OracleConfig,
        rate_config: RateConfig,
    );

    /// Deposit the lendable asset and mint lender shares to "from"
    ///
    /// Returns the number of shares minted
    ///
    /// ### Arguments
    /// * `from` - The address depositing
    /// * `amount` - The amount of the lendable asset to deposit
    ///
    /// ### Panics
    /// If the pair restricts lenders and "from" is not approved
    fn deposit(e: Env, from: Address, amount: i128) -> i128;

    /// Burn lender shares of "from" and return the lendable asset
    ///
    /// Returns the amount of the lendable asset withdrawn
    ///
    /// ### Arguments
    /// * `from` - The address withdrawing
    /// * `shares` - The number of lender shares to redeem
    ///
    /// ### Panics
    /// If "from" holds fewer shares, or the un-lent liquidity cannot cover
    /// the withdrawal
    fn withdraw(e: Env, from: Address, shares: i128) -> i128;

    /// Add collateral to "from"'s position
    ///
    /// ### Arguments
    /// * `from` - The address adding collateral
    /// * `amount` - The amount of the collateral asset to add
    fn add_collateral(e: Env, from: Address, amount: i128);

    /// Remove collateral from "from"'s position
    ///
    /// ### Arguments
    /// * `from` - The address removing collateral
    /// * `amount` - The amount of the collateral asset to remove
    ///
    /// ### Panics
    /// If the position would become insolvent
    fn remove_collateral(e: Env, from: Address, amount: i128);

    /// Borrow the lendable asset against "from"'s collateral
    ///
    /// Returns the borrower's updated positions
    ///
    /// ### Arguments
    /// * `from` - The address borrowing
    /// * `amount` - The amount of the lendable asset to borrow
    /// * `collateral_amount` - Collateral to add before the solvency check
    ///
    /// ### Panics
    /// If the pair has matured, "from" is not an approved borrower on a
    /// restricted pair, liquidity is insufficient, or the position would be
    /// insolvent
    fn borrow(e: Env, from: Address, amount: i128, collateral_amount: i128) -> Positions;

    /// Repay debt shares of "from"'s position, capped at the full position
    ///
    /// Returns the debt shares remaining on "from"'s position
    ///
    /// ### Arguments
    /// * `from` - The address repaying
    /// * `shares` - The number of debt shares to repay
    fn repay(e: Env, from: Address, shares: i128) -> i128;

    /// Liquidate an insolvent or matured position
    ///
    /// Returns the amount of collateral seized
    ///
    /// ### Arguments
    /// * `liquidator` - The address repaying the debt
    /// * `borrower` - The owner of the position being liquidated
    /// * `shares` - The number of debt shares to repay, capped at the position
    ///
    /// ### Panics
    /// If the position is neither insolvent nor matured
    fn liquidate(e: Env, liquidator: Address, borrower: Address, shares: i128) -> i128;

    /// Accrue interest up to the current timestamp
    fn accrue_interest(e: Env) -> InterestAccrued;

    /// (Admin only) Approve or revoke a lender on the allow-list
    ///
    /// ### Arguments
    /// * `lender` - The lender address
    /// * `approved` - The new approval state
    fn set_approved_lender(e: Env, lender: Address, approved: bool);

    /// (Admin only) Approve or revoke a borrower on the allow-list
    ///
    /// ### Arguments
    /// * `borrower` - The borrower address
    /// * `approved` - The new approval state
    fn set_approved_borrower(e: Env, borrower: Address, approved: bool);

    /// (Admin only) Change the address protocol fee shares are minted to
    ///
    /// ### Arguments
    /// * `fee_to` - The new fee recipient
    fn set_fee_to(e: Env, fee_to: Address);

    /// Fetch the total lendable asset amount and issued lender shares
    fn total_asset(e: Env) -> (i128, i128);

    /// Fetch the total borrowed amount and issued debt shares
    fn total_borrow(e: Env) -> (i128, i128);

    /// Fetch the stored rate state
    fn current_rate_info(e: Env) -> CurrentRateInfo;

    /// Fetch the last exchange rate read from the oracle pair
    fn exchange_rate_info(e: Env) -> ExchangeRateInfo;

    /// Fetch the positions of "user"
    fn get_positions(e: Env, user: Address) -> Positions;

    /// Fetch the pair's configuration
    fn get_config(e: Env) -> PairConfig;

    /// Fetch a snapshot of the pair's ledger totals
    fn snapshot(e: Env) -> PairSnapshot;
}

#[contractimpl]
impl PairPool for PairPoolContract {
    fn initialize(
        e: Env,
        admin: Address,
        fee_to: Address,
        config: PairConfig,
        oracle_config: OracleConfig,
        rate_config: RateConfig,
    ) {
        storage::extend_instance(&e);
        if storage::has_admin(&e) {
            panic_with_error!(&e, PairPoolError::AlreadyInitializedError);
        }
        admin.require_auth();

        pool::execute_initialize(&e, &admin, &fee_to, &config, &oracle_config, &rate_config);

        e.events()
            .publish((Symbol::new(&e, "initialize"), admin), fee_to);
    }

    fn deposit(e: Env, from: Address, amount: i128) -> i128 {
        storage::extend_instance(&e);
        from.require_auth();

        pool::execute_deposit(&e, &from, amount)
    }

    fn withdraw(e: Env, from: Address, shares: i128) -> i128 {
        storage::extend_instance(&e);
        from.require_auth();

        pool::execute_withdraw(&e, &from, shares)
    }

    fn add_collateral(e: Env, from: Address, amount: i128) {
        storage::extend_instance(&e);
        from.require_auth();

        pool::execute_add_collateral(&e, &from, amount);
    }

    fn remove_collateral(e: Env, from: Address, amount: i128) {
        storage::extend_instance(&e);
        from.require_auth();

        pool::execute_remove_collateral(&e, &from, amount);
    }

    fn borrow(e: Env, from: Address, amount: i128, collateral_amount: i128) -> Positions {
        storage::extend_instance(&e);
        from.require_auth();

        pool::execute_borrow(&e, &from, amount, collateral_amount)
    }

    fn repay(e: Env, from: Address, shares: i128) -> i128 {
        storage::extend_instance(&e);
        from.require_auth();

        pool::execute_repay(&e, &from, shares)
    }

    fn liquidate(e: Env, liquidator: Address, borrower: Address, shares: i128) -> i128 {
        storage::extend_instance(&e);
        liquidator.require_auth();

        pool::execute_liquidate(&e, &liquidator, &borrower, shares)
    }

    fn accrue_interest(e: Env) -> InterestAccrued {
        storage::extend_instance(&e);

        pool::execute_accrue(&e)
    }

    fn set_approved_lender(e: Env, lender: Address, approved: bool) {
        storage::extend_instance(&e);
        storage::get_admin(&e).require_auth();

        storage::set_approved_lender(&e, &lender, approved);

        e.events()
            .publish((Symbol::new(&e, "set_approved_lender"), lender), approved);
    }

    fn set_approved_borrower(e: Env, borrower: Address, approved: bool) {
        storage::extend_instance(&e);
        storage::get_admin(&e).require_auth();

        storage::set_approved_borrower(&e, &borrower, approved);

        e.events().publish(
            (Symbol::new(&e, "set_approved_borrower"), borrower),
            approved,
        );
    }

    fn set_fee_to(e: Env, fee_to: Address) {
        storage::extend_instance(&e);
        storage::get_admin(&e).require_auth();

        storage::set_fee_to(&e, &fee_to);

        e.events()
            .publish((Symbol::new(&e, "set_fee_to"),), fee_to);
    }

    fn total_asset(e: Env) -> (i128, i128) {
        let data = storage::get_pair_data(&e);
        (data.total_asset_amount, data.total_asset_shares)
    }

    fn total_borrow(e: Env) -> (i128, i128) {
        let data = storage::get_pair_data(&e);
        (data.total_borrow_amount, data.total_borrow_shares)
    }

    fn current_rate_info(e: Env) -> CurrentRateInfo {
        let config = storage::get_pair_config(&e);
        let data = storage::get_pair_data(&e);
        CurrentRateInfo {
            last_timestamp: data.last_timestamp,
            fee_to_protocol_rate: config.fee_to_protocol_rate,
            rate_per_sec: data.rate_per_sec,
        }
    }

    fn exchange_rate_info(e: Env) -> ExchangeRateInfo {
        storage::get_exchange_rate_info(&e)
    }

    fn get_positions(e: Env, user: Address) -> Positions {
        storage::get_positions(&e, &user)
    }

    fn get_config(e: Env) -> PairConfig {
        storage::get_pair_config(&e)
    }

    fn snapshot(e: Env) -> PairSnapshot {
        PairSnapshot::take(&e)
    }
}
