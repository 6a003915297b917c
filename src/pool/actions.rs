use cast::i128;
use sep_41_token::TokenClient;
use soroban_fixed_point_math::SorobanFixedPoint;
use soroban_sdk::{panic_with_error, Address, Env, Symbol};

use crate::{
    constants::{SCALAR_18, SCALAR_5},
    errors::PairPoolError,
    storage,
    validator::require_nonnegative,
};

use super::{solvency, InterestAccrued, Pair};

/// Perform a deposit of the lendable asset into the pair from "from"
///
/// ### Arguments
/// * `from` - The address depositing
/// * `amount` - The amount of the lendable asset to deposit
///
/// ### Returns
/// The number of lender shares minted to "from"
///
/// ### Panics
/// If the pair restricts lenders and "from" is not approved
pub fn execute_deposit(e: &Env, from: &Address, amount: i128) -> i128 {
    require_nonnegative(e, &amount);
    let mut pair = Pair::load(e);
    pair.accrue(e);

    if pair.config.restrict_lenders && !storage::get_approved_lender(e, from) {
        panic_with_error!(e, PairPoolError::NotApprovedLender);
    }

    let shares = pair.to_asset_shares_down(e, amount);
    pair.data.total_asset_amount += amount;
    pair.data.total_asset_shares += shares;

    let mut positions = storage::get_positions(e, from);
    positions.asset_shares += shares;

    TokenClient::new(e, &pair.config.asset).transfer(
        from,
        &e.current_contract_address(),
        &amount,
    );

    pair.store(e);
    storage::set_positions(e, from, &positions);

    e.events()
        .publish((Symbol::new(e, "deposit"), from.clone()), (amount, shares));

    shares
}

/// Perform a withdraw of the lendable asset from the pair to "from", burning
/// lender shares
///
/// ### Arguments
/// * `from` - The address withdrawing
/// * `shares` - The number of lender shares to redeem
///
/// ### Returns
/// The amount of the lendable asset sent to "from"
///
/// ### Panics
/// If "from" holds fewer shares than requested, or if the un-lent liquidity
/// cannot cover the withdrawal
pub fn execute_withdraw(e: &Env, from: &Address, shares: i128) -> i128 {
    require_nonnegative(e, &shares);
    let mut pair = Pair::load(e);
    pair.accrue(e);

    let mut positions = storage::get_positions(e, from);
    if positions.asset_shares < shares {
        panic_with_error!(e, PairPoolError::BalanceError);
    }

    let amount = pair.to_asset_amount_down(e, shares);
    pair.require_liquidity(e, amount);
    pair.data.total_asset_amount -= amount;
    pair.data.total_asset_shares -= shares;
    positions.asset_shares -= shares;

    TokenClient::new(e, &pair.config.asset).transfer(
        &e.current_contract_address(),
        from,
        &amount,
    );

    pair.store(e);
    storage::set_positions(e, from, &positions);

    e.events()
        .publish((Symbol::new(e, "withdraw"), from.clone()), (amount, shares));

    amount
}

/// Add collateral to "from"'s position
///
/// ### Arguments
/// * `from` - The address adding collateral
/// * `amount` - The amount of the collateral asset to add
pub fn execute_add_collateral(e: &Env, from: &Address, amount: i128) {
    require_nonnegative(e, &amount);
    let mut pair = Pair::load(e);
    pair.accrue(e);

    let mut positions = storage::get_positions(e, from);
    positions.collateral += amount;
    pair.data.total_collateral += amount;

    TokenClient::new(e, &pair.config.collateral_asset).transfer(
        from,
        &e.current_contract_address(),
        &amount,
    );

    pair.store(e);
    storage::set_positions(e, from, &positions);

    e.events()
        .publish((Symbol::new(e, "add_collateral"), from.clone()), amount);
}

/// Remove collateral from "from"'s position. The position must remain
/// solvent against the pair's max LTV.
///
/// ### Arguments
/// * `from` - The address removing collateral
/// * `amount` - The amount of the collateral asset to remove
///
/// ### Panics
/// If "from" holds less collateral than requested, or if the position would
/// become insolvent
pub fn execute_remove_collateral(e: &Env, from: &Address, amount: i128) {
    require_nonnegative(e, &amount);
    let mut pair = Pair::load(e);
    pair.accrue(e);

    let mut positions = storage::get_positions(e, from);
    if positions.collateral < amount {
        panic_with_error!(e, PairPoolError::BalanceError);
    }
    positions.collateral -= amount;
    pair.data.total_collateral -= amount;

    solvency::require_solvent(e, &mut pair, &positions);

    TokenClient::new(e, &pair.config.collateral_asset).transfer(
        &e.current_contract_address(),
        from,
        &amount,
    );

    pair.store(e);
    storage::set_positions(e, from, &positions);

    e.events()
        .publish((Symbol::new(e, "remove_collateral"), from.clone()), amount);
}

/// Borrow the lendable asset against "from"'s collateral, optionally adding
/// collateral in the same action
///
/// ### Arguments
/// * `from` - The address borrowing
/// * `amount` - The amount of the lendable asset to borrow
/// * `collateral_amount` - Collateral to add before the solvency check
///
/// ### Returns
/// The borrower's updated positions
///
/// ### Panics
/// If the pair has matured, the pair restricts borrowers and "from" is not
/// approved, the liquidity cannot cover the borrow, or the resulting position
/// is insolvent
pub fn execute_borrow(
    e: &Env,
    from: &Address,
    amount: i128,
    collateral_amount: i128,
) -> storage::Positions {
    require_nonnegative(e, &amount);
    require_nonnegative(e, &collateral_amount);
    let mut pair = Pair::load(e);
    pair.accrue(e);

    if pair.is_matured(e) {
        panic_with_error!(e, PairPoolError::MaturityExceeded);
    }
    if pair.config.restrict_borrowers && !storage::get_approved_borrower(e, from) {
        panic_with_error!(e, PairPoolError::NotApprovedBorrower);
    }
    pair.require_liquidity(e, amount);

    let debt_shares = pair.to_borrow_shares_up(e, amount);
    pair.data.total_borrow_amount += amount;
    pair.data.total_borrow_shares += debt_shares;

    let mut positions = storage::get_positions(e, from);
    positions.borrow_shares += debt_shares;
    if collateral_amount > 0 {
        positions.collateral += collateral_amount;
        pair.data.total_collateral += collateral_amount;
        TokenClient::new(e, &pair.config.collateral_asset).transfer(
            from,
            &e.current_contract_address(),
            &collateral_amount,
        );
    }

    solvency::require_solvent(e, &mut pair, &positions);

    TokenClient::new(e, &pair.config.asset).transfer(
        &e.current_contract_address(),
        from,
        &amount,
    );

    pair.store(e);
    storage::set_positions(e, from, &positions);

    e.events().publish(
        (Symbol::new(e, "borrow"), from.clone()),
        (amount, debt_shares, collateral_amount),
    );

    positions
}

/// Repay debt shares of "from"'s position. Requests beyond the position's
/// debt are capped at the full position.
///
/// ### Arguments
/// * `from` - The address repaying
/// * `shares` - The number of debt shares to repay
///
/// ### Returns
/// The debt shares remaining on "from"'s position
pub fn execute_repay(e: &Env, from: &Address, shares: i128) -> i128 {
    require_nonnegative(e, &shares);
    let mut pair = Pair::load(e);
    pair.accrue(e);

    let mut positions = storage::get_positions(e, from);
    let shares = shares.min(positions.borrow_shares);
    let amount = pair.to_borrow_amount_up(e, shares);
    pair.data.total_borrow_amount -= amount;
    pair.data.total_borrow_shares -= shares;
    positions.borrow_shares -= shares;

    TokenClient::new(e, &pair.config.asset).transfer(
        from,
        &e.current_contract_address(),
        &amount,
    );

    pair.store(e);
    storage::set_positions(e, from, &positions);

    e.events()
        .publish((Symbol::new(e, "repay"), from.clone()), (amount, shares));

    positions.borrow_shares
}

/// Liquidate an insolvent or matured position. The liquidator repays debt
/// shares on the borrower's behalf and seizes the matching collateral value
/// plus the pair's liquidation fee, capped at the position's collateral.
///
/// ### Arguments
/// * `liquidator` - The address repaying the debt
/// * `borrower` - The owner of the position being liquidated
/// * `shares` - The number of debt shares to repay, capped at the position
///
/// ### Returns
/// The amount of collateral seized by the liquidator
///
/// ### Panics
/// If the position is neither insolvent nor matured
pub fn execute_liquidate(
    e: &Env,
    liquidator: &Address,
    borrower: &Address,
    shares: i128,
) -> i128 {
    require_nonnegative(e, &shares);
    let mut pair = Pair::load(e);
    pair.accrue(e);

    let mut positions = storage::get_positions(e, borrower);
    if !solvency::is_liquidatable(e, &mut pair, &positions) {
        panic_with_error!(e, PairPoolError::LiquidationNotEligible);
    }

    let shares = shares.min(positions.borrow_shares);
    let repay_amount = pair.to_borrow_amount_up(e, shares);
    pair.data.total_borrow_amount -= repay_amount;
    pair.data.total_borrow_shares -= shares;
    positions.borrow_shares -= shares;

    let exchange_rate = pair.load_exchange_rate(e);
    let debt_value = repay_amount.fixed_mul_floor(e, &exchange_rate, &SCALAR_18);
    let seized = debt_value
        .fixed_mul_floor(e, &(SCALAR_5 + i128(pair.config.liquidation_fee)), &SCALAR_5)
        .min(positions.collateral);
    positions.collateral -= seized;
    pair.data.total_collateral -= seized;

    TokenClient::new(e, &pair.config.asset).transfer(
        liquidator,
        &e.current_contract_address(),
        &repay_amount,
    );
    TokenClient::new(e, &pair.config.collateral_asset).transfer(
        &e.current_contract_address(),
        liquidator,
        &seized,
    );

    pair.store(e);
    storage::set_positions(e, borrower, &positions);

    e.events().publish(
        (Symbol::new(e, "liquidate"), liquidator.clone(), borrower.clone()),
        (repay_amount, shares, seized),
    );

    seized
}

/// Accrue interest on the pair without touching any position
pub fn execute_accrue(e: &Env) -> InterestAccrued {
    let mut pair = Pair::load(e);
    let accrued = pair.accrue(e);
    pair.store(e);

    e.events().publish(
        (Symbol::new(e, "accrue"),),
        (
            accrued.interest_earned,
            accrued.fee_amount,
            accrued.rate_per_sec,
        ),
    );

    accrued
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{constants::SCALAR_18, testutils};
    use soroban_sdk::testutils::Address as _;

    #[test]
    fn test_deposit_and_withdraw_round_trip() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let pool = testutils::create_pair_pool(&e);
        let (asset, asset_client) = testutils::create_token_contract(&e, &bombadil);
        let (collateral, _) = testutils::create_token_contract(&e, &bombadil);
        asset_client.mint(&samwise, &1000_0000000);

        e.as_contract(&pool, || {
            testutils::setup_pair(&e, &asset, &collateral);

            let shares = execute_deposit(&e, &samwise, 100_0000000);
            assert_eq!(shares, 100_0000000);

            let pair = Pair::load(&e);
            assert_eq!(pair.data.total_asset_amount, 100_0000000);
            assert_eq!(pair.data.total_asset_shares, 100_0000000);
            let positions = storage::get_positions(&e, &samwise);
            assert_eq!(positions.asset_shares, 100_0000000);

            let amount = execute_withdraw(&e, &samwise, 100_0000000);
            assert_eq!(amount, 100_0000000);
            let positions = storage::get_positions(&e, &samwise);
            assert_eq!(positions.asset_shares, 0);
        });
        assert_eq!(asset_client.balance(&samwise), 1000_0000000);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1203)")]
    fn test_deposit_requires_approval_when_restricted() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let pool = testutils::create_pair_pool(&e);
        let (asset, asset_client) = testutils::create_token_contract(&e, &bombadil);
        let (collateral, _) = testutils::create_token_contract(&e, &bombadil);
        asset_client.mint(&samwise, &1000_0000000);

        e.as_contract(&pool, || {
            testutils::setup_pair(&e, &asset, &collateral);
            let mut config = storage::get_pair_config(&e);
            config.restrict_lenders = true;
            storage::set_pair_config(&e, &config);

            execute_deposit(&e, &samwise, 100_0000000);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #10)")]
    fn test_withdraw_panics_over_balance() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let pool = testutils::create_pair_pool(&e);
        let (asset, asset_client) = testutils::create_token_contract(&e, &bombadil);
        let (collateral, _) = testutils::create_token_contract(&e, &bombadil);
        asset_client.mint(&samwise, &1000_0000000);

        e.as_contract(&pool, || {
            testutils::setup_pair(&e, &asset, &collateral);
            execute_deposit(&e, &samwise, 100_0000000);
            execute_withdraw(&e, &samwise, 100_0000001);
        });
    }

    #[test]
    fn test_borrow_and_repay() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);
        let pool = testutils::create_pair_pool(&e);
        let (asset, asset_client) = testutils::create_token_contract(&e, &bombadil);
        let (collateral, collateral_client) = testutils::create_token_contract(&e, &bombadil);
        asset_client.mint(&samwise, &1000_0000000);
        collateral_client.mint(&frodo, &1000_0000000);

        e.as_contract(&pool, || testutils::setup_pair(&e, &asset, &collateral));
        testutils::set_exchange_rate(&e, &pool, &bombadil, SCALAR_18);
        e.as_contract(&pool, || {
            execute_deposit(&e, &samwise, 100_0000000);

            // 75% max LTV at a 1:1 exchange rate
            let positions = execute_borrow(&e, &frodo, 75_0000000, 100_0000000);
            assert_eq!(positions.borrow_shares, 75_0000000);
            assert_eq!(positions.collateral, 100_0000000);
            let pair = Pair::load(&e);
            assert_eq!(pair.data.total_borrow_amount, 75_0000000);
            assert_eq!(pair.data.total_collateral, 100_0000000);

            // over-repay requests cap at the position's debt
            let remaining = execute_repay(&e, &frodo, 100_0000000);
            assert_eq!(remaining, 0);
            let positions = storage::get_positions(&e, &frodo);
            assert_eq!(positions.borrow_shares, 0);
            let pair = Pair::load(&e);
            assert_eq!(pair.data.total_borrow_amount, 0);
            assert_eq!(pair.data.total_borrow_shares, 0);
        });
        assert_eq!(asset_client.balance(&frodo), 0);
        assert_eq!(collateral_client.balance(&frodo), 900_0000000);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1206)")]
    fn test_borrow_panics_if_insolvent() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);
        let pool = testutils::create_pair_pool(&e);
        let (asset, asset_client) = testutils::create_token_contract(&e, &bombadil);
        let (collateral, collateral_client) = testutils::create_token_contract(&e, &bombadil);
        asset_client.mint(&samwise, &1000_0000000);
        collateral_client.mint(&frodo, &1000_0000000);

        e.as_contract(&pool, || testutils::setup_pair(&e, &asset, &collateral));
        testutils::set_exchange_rate(&e, &pool, &bombadil, SCALAR_18);
        e.as_contract(&pool, || {
            execute_deposit(&e, &samwise, 100_0000000);
            execute_borrow(&e, &frodo, 75_0000001, 100_0000000);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1205)")]
    fn test_borrow_panics_over_liquidity() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);
        let pool = testutils::create_pair_pool(&e);
        let (asset, asset_client) = testutils::create_token_contract(&e, &bombadil);
        let (collateral, collateral_client) = testutils::create_token_contract(&e, &bombadil);
        asset_client.mint(&samwise, &1000_0000000);
        collateral_client.mint(&frodo, &1000_0000000);

        e.as_contract(&pool, || testutils::setup_pair(&e, &asset, &collateral));
        testutils::set_exchange_rate(&e, &pool, &bombadil, SCALAR_18);
        e.as_contract(&pool, || {
            execute_deposit(&e, &samwise, 50_0000000);
            execute_borrow(&e, &frodo, 50_0000001, 1000_0000000);
        });
    }

    #[test]
    fn test_remove_collateral_checks_solvency() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);
        let pool = testutils::create_pair_pool(&e);
        let (asset, asset_client) = testutils::create_token_contract(&e, &bombadil);
        let (collateral, collateral_client) = testutils::create_token_contract(&e, &bombadil);
        asset_client.mint(&samwise, &1000_0000000);
        collateral_client.mint(&frodo, &1000_0000000);

        e.as_contract(&pool, || testutils::setup_pair(&e, &asset, &collateral));
        testutils::set_exchange_rate(&e, &pool, &bombadil, SCALAR_18);
        e.as_contract(&pool, || {
            execute_deposit(&e, &samwise, 100_0000000);
            execute_borrow(&e, &frodo, 75_0000000, 150_0000000);

            // dropping to exactly the requirement passes
            execute_remove_collateral(&e, &frodo, 50_0000000);
            let positions = storage::get_positions(&e, &frodo);
            assert_eq!(positions.collateral, 100_0000000);
        });
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1206)")]
    fn test_remove_collateral_panics_if_insolvent() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);
        let pool = testutils::create_pair_pool(&e);
        let (asset, asset_client) = testutils::create_token_contract(&e, &bombadil);
        let (collateral, collateral_client) = testutils::create_token_contract(&e, &bombadil);
        asset_client.mint(&samwise, &1000_0000000);
        collateral_client.mint(&frodo, &1000_0000000);

        e.as_contract(&pool, || testutils::setup_pair(&e, &asset, &collateral));
        testutils::set_exchange_rate(&e, &pool, &bombadil, SCALAR_18);
        e.as_contract(&pool, || {
            execute_deposit(&e, &samwise, 100_0000000);
            execute_borrow(&e, &frodo, 75_0000000, 150_0000000);
            execute_remove_collateral(&e, &frodo, 50_0000001);
        });
    }

    #[test]
    fn test_liquidate_seizes_collateral_with_fee() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);
        let pippin = Address::generate(&e);
        let pool = testutils::create_pair_pool(&e);
        let (asset, asset_client) = testutils::create_token_contract(&e, &bombadil);
        let (collateral, collateral_client) = testutils::create_token_contract(&e, &bombadil);
        asset_client.mint(&samwise, &1000_0000000);
        asset_client.mint(&pippin, &1000_0000000);
        collateral_client.mint(&frodo, &1000_0000000);

        e.as_contract(&pool, || testutils::setup_pair(&e, &asset, &collateral));
        testutils::set_exchange_rate(&e, &pool, &bombadil, SCALAR_18);
        e.as_contract(&pool, || {
            execute_deposit(&e, &samwise, 100_0000000);
            execute_borrow(&e, &frodo, 75_0000000, 100_0000000);
        });

        // collateral halves in value, the position is now under water
        testutils::set_exchange_rate(&e, &pool, &bombadil, 2 * SCALAR_18);
        e.as_contract(&pool, || {
            let seized = execute_liquidate(&e, &pippin, &frodo, 25_0000000);

            // 25 debt at a 2.0 rate is 50 collateral, plus the 10% fee
            assert_eq!(seized, 55_0000000);
            let positions = storage::get_positions(&e, &frodo);
            assert_eq!(positions.borrow_shares, 50_0000000);
            assert_eq!(positions.collateral, 45_0000000);
            let pair = Pair::load(&e);
            assert_eq!(pair.data.total_borrow_amount, 50_0000000);
            assert_eq!(pair.data.total_collateral, 45_0000000);
        });
        assert_eq!(collateral_client.balance(&pippin), 55_0000000);
        assert_eq!(asset_client.balance(&pippin), 975_0000000);
    }

    #[test]
    #[should_panic(expected = "Error(Contract, #1212)")]
    fn test_liquidate_panics_if_healthy() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);
        let pippin = Address::generate(&e);
        let pool = testutils::create_pair_pool(&e);
        let (asset, asset_client) = testutils::create_token_contract(&e, &bombadil);
        let (collateral, collateral_client) = testutils::create_token_contract(&e, &bombadil);
        asset_client.mint(&samwise, &1000_0000000);
        asset_client.mint(&pippin, &1000_0000000);
        collateral_client.mint(&frodo, &1000_0000000);

        e.as_contract(&pool, || testutils::setup_pair(&e, &asset, &collateral));
        testutils::set_exchange_rate(&e, &pool, &bombadil, SCALAR_18);
        e.as_contract(&pool, || {
            execute_deposit(&e, &samwise, 100_0000000);
            execute_borrow(&e, &frodo, 50_0000000, 100_0000000);
            execute_liquidate(&e, &pippin, &frodo, 50_0000000);
        });
    }

    #[test]
    fn test_liquidate_seizure_capped_at_position_collateral() {
        let e = Env::default();
        e.mock_all_auths_allowing_non_root_auth();

        let bombadil = Address::generate(&e);
        let samwise = Address::generate(&e);
        let frodo = Address::generate(&e);
        let pippin = Address::generate(&e);
        let pool = testutils::create_pair_pool(&e);
        let (asset, asset_client) = testutils::create_token_contract(&e, &bombadil);
        let (collateral, collateral_client) = testutils::create_token_contract(&e, &bombadil);
        asset_client.mint(&samwise, &1000_0000000);
        asset_client.mint(&pippin, &1000_0000000);
        collateral_client.mint(&frodo, &1000_0000000);

        e.as_contract(&pool, || testutils::setup_pair(&e, &asset, &collateral));
        testutils::set_exchange_rate(&e, &pool, &bombadil, SCALAR_18);
        e.as_contract(&pool, || {
            execute_deposit(&e, &samwise, 100_0000000);
            execute_borrow(&e, &frodo, 75_0000000, 100_0000000);
        });

        // a crash deep enough that the fee cannot be covered
        testutils::set_exchange_rate(&e, &pool, &bombadil, 4 * SCALAR_18);
        e.as_contract(&pool, || {
            let seized = execute_liquidate(&e, &pippin, &frodo, 75_0000000);

            // 75 debt at a 4.0 rate is 300 collateral, only 100 exists
            assert_eq!(seized, 100_0000000);
            let positions = storage::get_positions(&e, &frodo);
            assert_eq!(positions.borrow_shares, 0);
            assert_eq!(positions.collateral, 0);
        });
    }
}
