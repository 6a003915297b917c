#![cfg(test)]

use crate::{
    contract::{PairPoolClient, PairPoolContract},
    pool::{RateConfig, VariableRateConfig},
    storage::{self, OracleConfig, PairConfig, PairData},
};
use sep_40_oracle::testutils::{Asset, MockPriceOracleClient, MockPriceOracleWASM};
use sep_41_token::testutils::{MockTokenClient, MockTokenWASM};
use soroban_sdk::{testutils::Address as _, vec, Address, Env, IntoVal, Symbol};

pub(crate) fn create_pair_pool(e: &Env) -> Address {
    e.register_contract(None, PairPoolContract {})
}

pub(crate) fn create_token_contract<'a>(
    e: &Env,
    admin: &Address,
) -> (Address, MockTokenClient<'a>) {
    let contract_address = e.register_contract_wasm(None, MockTokenWASM);
    let client = MockTokenClient::new(e, &contract_address);
    client.initialize(
        admin,
        &7,
        &"unit".into_val(e),
        &"test".into_val(e),
    );
    (contract_address, client)
}

pub(crate) fn create_mock_oracle<'a>(e: &Env) -> (Address, MockPriceOracleClient<'a>) {
    let contract_address = e.register_contract_wasm(None, MockPriceOracleWASM);
    (
        contract_address.clone(),
        MockPriceOracleClient::new(e, &contract_address),
    )
}

pub(crate) fn default_rate_config() -> RateConfig {
    RateConfig::Variable(VariableRateConfig {
        min_util: 0_40000,
        max_util: 0_80000,
        min_rate: 1_000_000_000,
        max_rate: 146_248_476_607,
        half_life: 43200,
    })
}

pub(crate) fn default_pair_config(asset: &Address, collateral_asset: &Address) -> PairConfig {
    PairConfig {
        asset: asset.clone(),
        collateral_asset: collateral_asset.clone(),
        max_ltv: 0_75000,
        liquidation_fee: 0_10000,
        fee_to_protocol_rate: 0_10000,
        maturity: 0,
        penalty_rate: 0,
        restrict_lenders: false,
        restrict_borrowers: false,
    }
}

/// Seed pair storage directly. Must be invoked within the pool's contract
/// context.
pub(crate) fn setup_pair(e: &Env, asset: &Address, collateral_asset: &Address) {
    storage::set_admin(e, &Address::generate(e));
    storage::set_fee_to(e, &Address::generate(e));
    storage::set_pair_config(e, &default_pair_config(asset, collateral_asset));
    storage::set_rate_config(e, &default_rate_config());
    storage::set_pair_data(
        e,
        &PairData {
            total_asset_amount: 0,
            total_asset_shares: 0,
            total_borrow_amount: 0,
            total_borrow_shares: 0,
            total_collateral: 0,
            last_timestamp: e.ledger().timestamp(),
            rate_per_sec: 1_000_000_000,
        },
    );
}

pub(crate) fn setup_default_pair(e: &Env) {
    setup_pair(e, &Address::generate(e), &Address::generate(e));
}

/// Point the pair at a fresh mock oracle reporting the given exchange rate,
/// in collateral units per unit of asset with 18 decimals. The pair's config
/// must already be stored.
pub(crate) fn set_exchange_rate(e: &Env, pool: &Address, admin: &Address, rate: i128) {
    let config = e.as_contract(pool, || storage::get_pair_config(e));

    let (oracle, oracle_client) = create_mock_oracle(e);
    oracle_client.set_data(
        admin,
        &Asset::Other(Symbol::new(e, "USD")),
        &vec![e, Asset::Stellar(config.collateral_asset.clone())],
        &7,
        &300,
    );
    // a 7 decimal feed price that combines back into the requested rate
    let price = 10_000_000_000_000_000_000_000_000i128 / rate;
    oracle_client.set_price_stable(&vec![e, price]);

    e.as_contract(pool, || {
        storage::set_oracle_config(
            e,
            &OracleConfig {
                divide_feed: oracle,
                multiply_feed: None,
                normalization: 0,
                max_age: 1_000_000,
            },
        );
    });
}

fn create_initialized_pair_pool_with_config(
    e: &Env,
    admin: &Address,
    fee_to: &Address,
    build_config: impl FnOnce(&Address, &Address) -> PairConfig,
) -> (Address, PairPoolClient<'static>) {
    let pool = create_pair_pool(e);
    let client = PairPoolClient::new(e, &pool);
    let (asset, _) = create_token_contract(e, admin);
    let (collateral_asset, _) = create_token_contract(e, admin);

    let config = build_config(&asset, &collateral_asset);
    // a throwaway feed, tests wire a real one with set_exchange_rate
    let oracle_config = OracleConfig {
        divide_feed: Address::generate(e),
        multiply_feed: None,
        normalization: 0,
        max_age: 600,
    };
    client.initialize(
        admin,
        fee_to,
        &config,
        &oracle_config,
        &default_rate_config(),
    );
    (pool, client)
}

pub(crate) fn create_initialized_pair_pool(
    e: &Env,
    admin: &Address,
    fee_to: &Address,
) -> (Address, PairPoolClient<'static>) {
    create_initialized_pair_pool_with_config(e, admin, fee_to, |asset, collateral| {
        default_pair_config(asset, collateral)
    })
}

pub(crate) fn create_initialized_restricted_pair_pool(
    e: &Env,
    admin: &Address,
    fee_to: &Address,
) -> (Address, PairPoolClient<'static>) {
    create_initialized_pair_pool_with_config(e, admin, fee_to, |asset, collateral| {
        let mut config = default_pair_config(asset, collateral);
        config.restrict_lenders = true;
        config.restrict_borrowers = true;
        config
    })
}

pub(crate) fn create_initialized_matured_pair_pool(
    e: &Env,
    admin: &Address,
    fee_to: &Address,
    maturity: u64,
) -> (Address, PairPoolClient<'static>) {
    create_initialized_pair_pool_with_config(e, admin, fee_to, |asset, collateral| {
        let mut config = default_pair_config(asset, collateral);
        config.maturity = maturity;
        config.penalty_rate = 5_000_000_000;
        config
    })
}

pub(crate) fn asset_client<'a>(e: &Env, client: &PairPoolClient) -> MockTokenClient<'a> {
    MockTokenClient::new(e, &client.get_config().asset)
}

pub(crate) fn collateral_client<'a>(e: &Env, client: &PairPoolClient) -> MockTokenClient<'a> {
    MockTokenClient::new(e, &client.get_config().collateral_asset)
}
