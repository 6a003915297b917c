#![no_std]

#[cfg(any(test, feature = "testutils"))]
extern crate std;

mod constants;
mod contract;
mod errors;
mod oracle;
mod pool;
mod storage;
mod testutils;
mod validator;

pub use contract::*;
pub use errors::PairPoolError;
pub use pool::{
    InterestAccrued, LinearRateConfig, PairSnapshot, RateConfig, VariableRateConfig,
};
pub use storage::{
    CurrentRateInfo, ExchangeRateInfo, OracleConfig, PairConfig, PairData, Positions,
};
