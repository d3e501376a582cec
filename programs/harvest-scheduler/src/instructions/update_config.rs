use anchor_lang::prelude::*;

use crate::errors::SchedulerError;
use crate::events::SchedulerConfigUpdated;
use crate::state::config::SchedulerConfig;

// ──────────────────────────────────────────────────────
// Update Scheduler Config: admin only
//
// Allows the admin to repoint the task queue, change the
// funding policy and crank reward, pause/unpause, or
// transfer admin authority.
//
// A new task queue or queue program applies to chains armed
// afterwards. Running chains keep handing their successors to
// the queue that runs them.
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct UpdateSchedulerConfig<'info> {
    /// The current admin
    #[account(
        constraint = admin.key() == config.admin @ SchedulerError::Unauthorized,
    )]
    pub admin: Signer<'info>,

    /// The scheduler config PDA
    #[account(
        mut,
        seeds = [SchedulerConfig::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, SchedulerConfig>,
}

/// What to update, all fields optional (None = don't change)
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Debug, Default)]
pub struct ConfigUpdate {
    pub task_queue: Option<Pubkey>,
    pub queue_program: Option<Pubkey>,
    pub oracle_program: Option<Pubkey>,
    pub queue_capacity: Option<u16>,
    pub min_balance: Option<u64>,
    pub top_up: Option<u64>,
    pub crank_reward: Option<u64>,
    pub max_chain_age: Option<i64>,
    pub paused: Option<bool>,
    pub new_admin: Option<Pubkey>,
}

pub fn handler(ctx: Context<UpdateSchedulerConfig>, update: ConfigUpdate) -> Result<()> {
    let config = &mut ctx.accounts.config;

    if let Some(task_queue) = update.task_queue {
        require!(task_queue != Pubkey::default(), SchedulerError::InvalidTaskQueue);
        config.task_queue = task_queue;
        msg!("Task queue updated to {}", task_queue);
    }

    if let Some(queue_program) = update.queue_program {
        require!(queue_program != Pubkey::default(), SchedulerError::InvalidQueueProgram);
        config.queue_program = queue_program;
        msg!("Queue program updated to {}", queue_program);
    }

    if let Some(oracle_program) = update.oracle_program {
        require!(oracle_program != Pubkey::default(), SchedulerError::InvalidOracleProgram);
        config.oracle_program = oracle_program;
        msg!("Oracle program updated to {}", oracle_program);
    }

    if let Some(queue_capacity) = update.queue_capacity {
        require!(queue_capacity > 0, SchedulerError::QueueCapacityExceeded);
        config.queue_capacity = queue_capacity;
    }

    if let Some(min_balance) = update.min_balance {
        config.funding.min_balance = min_balance;
        msg!("Queue authority minimum balance updated to {}", min_balance);
    }

    if let Some(top_up) = update.top_up {
        config.funding.top_up = top_up;
    }

    if let Some(crank_reward) = update.crank_reward {
        config.crank_reward = crank_reward;
        msg!("Crank reward updated to {}", crank_reward);
    }

    if let Some(max_chain_age) = update.max_chain_age {
        require!(max_chain_age >= 0, SchedulerError::InvalidChainAge);
        config.max_chain_age = max_chain_age;
    }

    if let Some(paused) = update.paused {
        config.paused = paused;
        msg!("Scheduler paused: {}", paused);
    }

    if let Some(new_admin) = update.new_admin {
        msg!(
            "Admin authority transferred from {} to {}",
            config.admin,
            new_admin
        );
        config.admin = new_admin;
    }

    emit!(SchedulerConfigUpdated {
        admin: config.admin,
        updated_at: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
