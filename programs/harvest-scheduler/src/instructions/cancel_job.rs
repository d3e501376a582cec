use anchor_lang::prelude::*;

use crate::errors::SchedulerError;
use crate::events::JobCancelled;
use crate::state::{JobStatus, RecurringJob, SchedulerConfig};

// ──────────────────────────────────────────────────────
// Cancel Job: admin only, terminal
//
// A task already on the queue still runs, finds the job
// cancelled, and ends the chain without doing anything.
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct CancelJob<'info> {
    #[account(
        constraint = admin.key() == config.admin @ SchedulerError::Unauthorized,
    )]
    pub admin: Signer<'info>,

    #[account(
        seeds = [SchedulerConfig::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, SchedulerConfig>,

    #[account(
        mut,
        constraint = job.status != JobStatus::Cancelled @ SchedulerError::JobCancelled,
    )]
    pub job: Account<'info, RecurringJob>,
}

pub fn handler(ctx: Context<CancelJob>) -> Result<()> {
    let job = &mut ctx.accounts.job;
    job.status = JobStatus::Cancelled;

    msg!("Job {} cancelled after {} cycles", job.key(), job.cycles);

    emit!(JobCancelled {
        job: job.key(),
        cancelled_at: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
