use anchor_lang::prelude::*;

use crate::harvest::MAX_SOURCES;

// ──────────────────────────────────────────────────────
// Recurring Job: one per mint (harvest) or oracle context
// ──────────────────────────────────────────────────────

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum JobKind {
    Harvest,
    Oracle,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum JobStatus {
    Unscheduled,
    Pending,
    Stalled,
    Expired,
    Cancelled,
}

#[account]
pub struct RecurringJob {
    // ── Identity ──
    pub kind: JobKind,
    pub target: Pubkey,              // Mint, or oracle context
    pub treasury: Pubkey,            // Harvest destination (default for oracle jobs)
    pub sources: Vec<Pubkey>,        // Holder accounts swept each cycle

    // ── Schedule ──
    pub interval: i64,               // Seconds between cycles (0 = back to back)
    pub compute_budget: u32,

    // ── Chain ──
    pub status: JobStatus,
    pub task_queue: Pubkey,          // Queue the chain was armed on
    pub armed_task_id: u16,          // Id the first task was queued under
    pub sequence: u64,               // Carried by the pending task
    pub next_run_at: i64,
    pub chain_started_at: i64,
    pub last_executed_at: i64,
    pub cycles: u64,

    pub bump: u8,
}

impl RecurringJob {
    pub const LEN: usize = 8         // discriminator
        + 1                          // kind
        + 32                         // target
        + 32                         // treasury
        + 4 + 32 * MAX_SOURCES       // sources
        + 8                          // interval
        + 4                          // compute_budget
        + 1                          // status
        + 32                         // task_queue
        + 2                          // armed_task_id
        + 8                          // sequence
        + 8                          // next_run_at
        + 8                          // chain_started_at
        + 8                          // last_executed_at
        + 8                          // cycles
        + 1                          // bump
        + 32;                        // padding

    pub fn new(kind: JobKind, target: Pubkey, interval: i64, compute_budget: u32, bump: u8) -> Self {
        Self {
            kind,
            target,
            treasury: Pubkey::default(),
            sources: Vec::new(),
            interval,
            compute_budget,
            status: JobStatus::Unscheduled,
            task_queue: Pubkey::default(),
            armed_task_id: 0,
            sequence: 0,
            next_run_at: 0,
            chain_started_at: 0,
            last_executed_at: 0,
            cycles: 0,
            bump,
        }
    }
}
