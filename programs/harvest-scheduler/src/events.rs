use anchor_lang::prelude::*;

use crate::chain::ChainFault;
use crate::state::JobKind;

// ──────────────────────────────────────────────────────
// Events: emitted for off-chain indexing
// ──────────────────────────────────────────────────────

#[event]
pub struct SchedulerInitialized {
    pub admin: Pubkey,
    pub task_queue: Pubkey,
    pub fee_authority: Pubkey,
    pub queue_authority: Pubkey,
}

#[event]
pub struct SchedulerConfigUpdated {
    pub admin: Pubkey,
    pub updated_at: i64,
}

#[event]
pub struct FeeRateUpdated {
    pub mint: Pubkey,
    pub basis_points: u16,
    pub maximum_fee: u64,
    pub effective_epoch: u64,
}

#[event]
pub struct FeesHarvested {
    pub mint: Pubkey,
    pub treasury: Pubkey,
    pub amount: u64,
    pub carried_over: u64,
    pub swept: u16,
    pub skipped: u16,
    pub harvested_at: i64,
}

#[event]
pub struct QueueAuthorityRegistered {
    pub task_queue: Pubkey,
    pub queue_authority: Pubkey,
    /// false when the record already existed
    pub created: bool,
}

#[event]
pub struct QueueAuthorityFunded {
    pub queue_authority: Pubkey,
    pub lamports: u64,
    pub balance: u64,
}

#[event]
pub struct JobCreated {
    pub job: Pubkey,
    pub kind: JobKind,
    pub target: Pubkey,
    pub interval: i64,
    pub compute_budget: u32,
}

#[event]
pub struct TaskQueued {
    pub job: Pubkey,
    pub task_queue: Pubkey,
    /// None when the queue picks the slot
    pub task_id: Option<u16>,
    pub sequence: u64,
    pub run_at: i64,
    pub compute_budget: u32,
}

#[event]
pub struct StaleTaskSkipped {
    pub job: Pubkey,
    pub sequence: u64,
    pub expected_sequence: u64,
}

#[event]
pub struct ChainBroken {
    pub job: Pubkey,
    pub sequence: u64,
    pub fault: ChainFault,
    pub broken_at: i64,
}

#[event]
pub struct ChainExpired {
    pub job: Pubkey,
    pub cycles: u64,
    pub chain_started_at: i64,
    pub expired_at: i64,
}

#[event]
pub struct JobCancelled {
    pub job: Pubkey,
    pub cancelled_at: i64,
}

#[event]
pub struct OracleQueried {
    pub job: Pubkey,
    pub context: Pubkey,
    pub query_count: u32,
}

#[event]
pub struct OracleResponded {
    pub context: Pubkey,
    pub response_count: u32,
    pub response_len: u32,
}
