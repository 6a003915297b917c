use cast::i128;
use soroban_fixed_point_math::SorobanFixedPoint;
use soroban_sdk::{contracttype, panic_with_error, Env};

use crate::{
    constants::{SCALAR_18, SCALAR_5},
    errors::PairPoolError,
};

/// Constants for the utilization seeking rate curve.
///
/// While utilization sits inside `[min_util, max_util]` the rate holds. Below
/// the band the rate decays toward `min_rate`, above it the rate grows toward
/// `max_rate`, with the adjustment scaling quadratically with the drift and
/// linearly with elapsed time. `half_life` is the controller's time constant:
/// at full drift the rate halves (or doubles) once per half life.
#[derive(Clone)]
#[contracttype]
pub struct VariableRateConfig {
    pub min_util: u32,  // utilization below which the rate decays, 5 decimals
    pub max_util: u32,  // utilization above which the rate grows, 5 decimals
    pub min_rate: i128, // hard floor for the per second rate, 18 decimals
    pub max_rate: i128, // hard ceiling for the per second rate, 18 decimals
    pub half_life: u64, // the controller time constant, in seconds
}

/// Constants for the linear rate curve. The rate interpolates between
/// `min_rate` at zero utilization and `max_rate` at full utilization,
/// independent of the previous rate and elapsed time.
#[derive(Clone)]
#[contracttype]
pub struct LinearRateConfig {
    pub min_rate: i128, // per second rate at zero utilization, 18 decimals
    pub max_rate: i128, // per second rate at full utilization, 18 decimals
}

/// The interest rate module for a pair, selected at creation.
#[derive(Clone)]
#[contracttype]
pub enum RateConfig {
    Linear(LinearRateConfig),
    Variable(VariableRateConfig),
}

impl RateConfig {
    /// Validate the rate constants.
    ///
    /// ### Panics
    /// If any constant is outside its supported range
    pub fn require_valid(&self, e: &Env) {
        match self {
            RateConfig::Linear(linear) => {
                if linear.min_rate < 0 || linear.min_rate > linear.max_rate {
                    panic_with_error!(e, PairPoolError::InvalidRateConfig);
                }
            }
            RateConfig::Variable(variable) => {
                if variable.min_util == 0
                    || variable.min_util > variable.max_util
                    || i128(variable.max_util) >= SCALAR_5
                    || variable.min_rate < 0
                    || variable.min_rate > variable.max_rate
                    || variable.half_life == 0
                {
                    panic_with_error!(e, PairPoolError::InvalidRateConfig);
                }
            }
        }
    }

    /// The rate a freshly created pair starts at.
    pub fn initial_rate(&self) -> i128 {
        match self {
            RateConfig::Linear(linear) => linear.min_rate,
            RateConfig::Variable(variable) => variable.min_rate,
        }
    }
}

/// Calculate the new per second interest rate for the pair.
///
/// ### Arguments
/// * `config` - The rate module constants
/// * `utilization` - The pair's current utilization, 5 decimals
/// * `current_rate` - The stored per second rate, 18 decimals
/// * `elapsed` - Seconds since the last accrual
///
/// ### Returns
/// The new per second rate, clamped into the module's bounds
pub fn update_rate(
    e: &Env,
    config: &RateConfig,
    utilization: i128,
    current_rate: i128,
    elapsed: u64,
) -> i128 {
    match config {
        RateConfig::Linear(linear) => {
            linear.min_rate
                + (linear.max_rate - linear.min_rate).fixed_mul_floor(e, &utilization, &SCALAR_5)
        }
        RateConfig::Variable(variable) => {
            let min_util = i128(variable.min_util);
            let max_util = i128(variable.max_util);
            let half_life_scaled = i128(variable.half_life) * SCALAR_18;
            if utilization < min_util {
                // under-borrowed, decay toward the floor
                let delta_util =
                    (min_util - utilization).fixed_mul_floor(e, &SCALAR_18, &min_util);
                let delta_util_sq = delta_util.fixed_mul_floor(e, &delta_util, &SCALAR_18);
                let decay = half_life_scaled + delta_util_sq * i128(elapsed);
                let new_rate = current_rate.fixed_mul_floor(e, &half_life_scaled, &decay);
                if new_rate < variable.min_rate {
                    variable.min_rate
                } else {
                    new_rate
                }
            } else if utilization > max_util {
                // over-borrowed, grow toward the ceiling
                let delta_util = (utilization - max_util)
                    .fixed_mul_floor(e, &SCALAR_18, &(SCALAR_5 - max_util));
                let delta_util_sq = delta_util.fixed_mul_floor(e, &delta_util, &SCALAR_18);
                let growth = half_life_scaled + delta_util_sq * i128(elapsed);
                let new_rate = current_rate.fixed_mul_floor(e, &growth, &half_life_scaled);
                if new_rate > variable.max_rate {
                    variable.max_rate
                } else {
                    new_rate
                }
            } else {
                current_rate
            }
        }
    }
}
