mod actions;
pub use actions::{
    execute_accrue, execute_add_collateral, execute_borrow, execute_deposit, execute_liquidate,
    execute_remove_collateral, execute_repay, execute_withdraw,
};

mod config;
pub use config::execute_initialize;

mod interest;
pub use interest::{update_rate, LinearRateConfig, RateConfig, VariableRateConfig};

mod pair;
pub use pair::{InterestAccrued, Pair};

mod snapshot;
pub use snapshot::PairSnapshot;

mod solvency;
pub use solvency::{is_liquidatable, required_collateral, require_solvent};

mod vault;
