use soroban_sdk::{contracttype, Env};

use crate::storage;

/// A read-only snapshot of the pair's ledger totals, taken without accruing
#[derive(Clone)]
#[contracttype]
pub struct PairSnapshot {
    pub total_asset_amount: i128,
    pub total_asset_shares: i128,
    pub total_borrow_amount: i128,
    pub total_borrow_shares: i128,
    pub total_collateral: i128,
}

impl PairSnapshot {
    pub fn take(e: &Env) -> Self {
        let data = storage::get_pair_data(e);
        PairSnapshot {
            total_asset_amount: data.total_asset_amount,
            total_asset_shares: data.total_asset_shares,
            total_borrow_amount: data.total_borrow_amount,
            total_borrow_shares: data.total_borrow_shares,
            total_collateral: data.total_collateral,
        }
    }
}
