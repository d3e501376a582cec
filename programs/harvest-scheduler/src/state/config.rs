use anchor_lang::prelude::*;

use crate::funding::FundingPolicy;

// ──────────────────────────────────────────────────────
// Scheduler Config: singleton PDA, initialized once by admin
//
// Names the task queue this deployment submits to, the queue
// and oracle programs, and the funding policy for the queue
// authority. Every scheduling instruction validates against it.
// ──────────────────────────────────────────────────────

#[account]
pub struct SchedulerConfig {
    /// The admin authority, can update config, create and cancel jobs
    pub admin: Pubkey,

    /// Task queue account jobs are submitted to
    pub task_queue: Pubkey,

    /// Program owning the task queue
    pub queue_program: Pubkey,

    /// Oracle program used by oracle jobs
    pub oracle_program: Pubkey,

    /// Number of task ids the queue accepts (ids are `0..queue_capacity`)
    pub queue_capacity: u16,

    /// Minimum balance and top-up size for the queue authority
    pub funding: FundingPolicy,

    /// Lamports paid to whoever cranks a task
    pub crank_reward: u64,

    /// Chains older than this are not re-armed (0 = no limit)
    pub max_chain_age: i64,

    /// Blocks new jobs, scheduling and manual harvests
    pub paused: bool,

    pub fee_authority_bump: u8,
    pub queue_authority_bump: u8,

    /// PDA bump
    pub bump: u8,
}

impl SchedulerConfig {
    pub const LEN: usize = 8   // discriminator
        + 32                    // admin
        + 32                    // task_queue
        + 32                    // queue_program
        + 32                    // oracle_program
        + 2                     // queue_capacity
        + 16                    // funding
        + 8                     // crank_reward
        + 8                     // max_chain_age
        + 1                     // paused
        + 1                     // fee_authority_bump
        + 1                     // queue_authority_bump
        + 1                     // bump
        + 64;                   // padding for future fields

    /// The PDA seed, only one config account per program
    pub const SEED: &'static [u8] = b"scheduler_config";
}
