use anchor_lang::prelude::*;

use crate::authority::{FEE_AUTHORITY_SEED, QUEUE_AUTHORITY_SEED};
use crate::errors::SchedulerError;
use crate::events::SchedulerInitialized;
use crate::funding::FundingPolicy;
use crate::state::config::SchedulerConfig;

// ──────────────────────────────────────────────────────
// Initialize Scheduler Config: called once by deployer
//
// Creates the singleton SchedulerConfig PDA and records the
// bumps of both derived authorities so later instructions
// can sign without searching for them again.
//
// The `init` constraint ensures this can only be called once.
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct InitializeScheduler<'info> {
    /// The deployer/admin initializing the scheduler
    #[account(mut)]
    pub admin: Signer<'info>,

    /// The scheduler config PDA, singleton, derived from a fixed seed
    #[account(
        init,
        payer = admin,
        space = SchedulerConfig::LEN,
        seeds = [SchedulerConfig::SEED],
        bump,
    )]
    pub config: Account<'info, SchedulerConfig>,

    /// CHECK: PDA signer only, withdraw/config authority of managed mints
    #[account(seeds = [FEE_AUTHORITY_SEED], bump)]
    pub fee_authority: UncheckedAccount<'info>,

    /// CHECK: PDA signer only, task creator on the task queue
    #[account(seeds = [QUEUE_AUTHORITY_SEED], bump)]
    pub queue_authority: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug)]
pub struct SchedulerParams {
    pub task_queue: Pubkey,
    pub queue_program: Pubkey,
    pub oracle_program: Pubkey,
    pub queue_capacity: u16,
    pub funding: FundingPolicy,
    pub crank_reward: u64,
    pub max_chain_age: i64,
}

pub fn handler(ctx: Context<InitializeScheduler>, params: SchedulerParams) -> Result<()> {
    require!(params.task_queue != Pubkey::default(), SchedulerError::InvalidTaskQueue);
    require!(params.queue_program != Pubkey::default(), SchedulerError::InvalidQueueProgram);
    require!(params.oracle_program != Pubkey::default(), SchedulerError::InvalidOracleProgram);
    require!(params.queue_capacity > 0, SchedulerError::QueueCapacityExceeded);
    require!(params.max_chain_age >= 0, SchedulerError::InvalidChainAge);

    let config = &mut ctx.accounts.config;
    config.admin = ctx.accounts.admin.key();
    config.task_queue = params.task_queue;
    config.queue_program = params.queue_program;
    config.oracle_program = params.oracle_program;
    config.queue_capacity = params.queue_capacity;
    config.funding = params.funding;
    config.crank_reward = params.crank_reward;
    config.max_chain_age = params.max_chain_age;
    config.paused = false;
    config.fee_authority_bump = ctx.bumps.fee_authority;
    config.queue_authority_bump = ctx.bumps.queue_authority;
    config.bump = ctx.bumps.config;

    msg!(
        "Scheduler initialized: admin={}, task_queue={}, min_balance={}, crank_reward={}",
        config.admin,
        config.task_queue,
        config.funding.min_balance,
        config.crank_reward,
    );

    emit!(SchedulerInitialized {
        admin: config.admin,
        task_queue: config.task_queue,
        fee_authority: ctx.accounts.fee_authority.key(),
        queue_authority: ctx.accounts.queue_authority.key(),
    });

    Ok(())
}
