use sep_40_oracle::{Asset, PriceFeedClient};
use soroban_sdk::{panic_with_error, Address, Env};

use crate::{
    constants::SCALAR_18,
    errors::PairPoolError,
    storage::OracleConfig,
};

use soroban_fixed_point_math::SorobanFixedPoint;

/// Read a price from a feed and normalize it to 18 decimals.
///
/// ### Arguments
/// * `feed` - The price feed contract
/// * `asset` - The asset to price
/// * `max_age` - The maximum allowed price age in seconds
///
/// ### Panics
/// If the feed has no price, the price is not positive, or the price is older
/// than `max_age`
fn load_feed_price(e: &Env, feed: &Address, asset: &Address, max_age: u64) -> i128 {
    let feed_client = PriceFeedClient::new(e, feed);
    let price_data = match feed_client.lastprice(&Asset::Stellar(asset.clone())) {
        Some(price_data) => price_data,
        None => panic_with_error!(e, PairPoolError::InvalidPrice),
    };
    if price_data.price <= 0 {
        panic_with_error!(e, PairPoolError::InvalidPrice);
    }
    if price_data.timestamp + max_age < e.ledger().timestamp() {
        panic_with_error!(e, PairPoolError::StalePrice);
    }

    let decimals = feed_client.decimals();
    if decimals <= 18 {
        price_data.price * 10i128.pow(18 - decimals)
    } else {
        price_data.price / 10i128.pow(decimals - 18)
    }
}

/// Load the exchange rate for the pair, in collateral units per unit of
/// asset with 18 decimals.
///
/// The divide feed prices the collateral asset and the optional multiply
/// feed prices the lendable asset against the same base. When the multiply
/// feed is absent the lendable asset is treated as the base itself. The
/// configured normalization exponent is applied last to account for token
/// decimal differences.
///
/// ### Panics
/// If either feed reports a stale or non-positive price, or if the combined
/// rate is zero
pub fn load_exchange_rate(
    e: &Env,
    config: &OracleConfig,
    asset: &Address,
    collateral_asset: &Address,
) -> i128 {
    let divide_price = load_feed_price(e, &config.divide_feed, collateral_asset, config.max_age);
    let multiply_price = match &config.multiply_feed {
        Some(feed) => load_feed_price(e, feed, asset, config.max_age),
        None => SCALAR_18,
    };

    let mut exchange_rate = multiply_price.fixed_mul_floor(e, &SCALAR_18, &divide_price);
    if config.normalization >= 0 {
        exchange_rate *= 10i128.pow(config.normalization as u32);
    } else {
        exchange_rate /= 10i128.pow(config.normalization.unsigned_abs());
    }

    if exchange_rate == 0 {
        panic_with_error!(e, PairPoolError::InvalidPrice);
    }
    exchange_rate
}
