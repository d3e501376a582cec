use anchor_lang::prelude::*;

use crate::authority::{task_queue_authority_address, QUEUE_AUTHORITY_SEED};
use crate::chain::{arm, CycleEnv};
use crate::errors::SchedulerError;
use crate::events::TaskQueued;
use crate::funding::ensure_funded;
use crate::queue::QueueCpi;
use crate::state::{RecurringJob, SchedulerConfig};
use crate::tasks::{JobTask, TaskContext};

// ──────────────────────────────────────────────────────
// Schedule Job: submits the first task of a chain
//
// Valid for new, stalled and expired jobs. The caller picks the
// first task id and passes its task account. Later tasks are
// handed back to the queue by the task before them, so the queue
// recorded here is the one the whole chain runs on, whatever the
// config says afterwards.
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct ScheduleJob<'info> {
    #[account(
        mut,
        constraint = admin.key() == config.admin @ SchedulerError::Unauthorized,
    )]
    pub admin: Signer<'info>,

    #[account(
        seeds = [SchedulerConfig::SEED],
        bump = config.bump,
        constraint = !config.paused @ SchedulerError::SchedulerPaused,
    )]
    pub config: Account<'info, SchedulerConfig>,

    #[account(mut)]
    pub job: Account<'info, RecurringJob>,

    /// CHECK: PDA that signs for the queue, lamports only
    #[account(
        mut,
        seeds = [QUEUE_AUTHORITY_SEED],
        bump = config.queue_authority_bump,
    )]
    pub queue_authority: UncheckedAccount<'info>,

    /// CHECK: Validated by the queue program
    #[account(
        mut,
        address = config.task_queue @ SchedulerError::InvalidTaskQueue,
    )]
    pub task_queue: UncheckedAccount<'info>,

    /// CHECK: Registration record of the queue authority
    #[account(
        constraint = task_queue_authority.key() == task_queue_authority_address(
            &config.queue_program,
            &config.task_queue,
            &queue_authority.key(),
        ) @ SchedulerError::TaskAccountMismatch,
    )]
    pub task_queue_authority: UncheckedAccount<'info>,

    /// CHECK: Task account for `task_id`, created by the queue program
    #[account(mut)]
    pub task: UncheckedAccount<'info>,

    /// CHECK: Address checked against config
    #[account(address = config.queue_program @ SchedulerError::InvalidQueueProgram)]
    pub queue_program: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<ScheduleJob>, task_id: u16) -> Result<()> {
    let config = &ctx.accounts.config;
    let admin = ctx.accounts.admin.to_account_info();
    let queue_authority = ctx.accounts.queue_authority.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();

    ensure_funded(&config.funding, &admin, &queue_authority, &system_program)?;

    let context = TaskContext::from_config(config.key(), config, queue_authority.key());
    let job_key = ctx.accounts.job.key();
    let builder = JobTask::for_job(context, job_key, &ctx.accounts.job, config)?;

    let queue_program = ctx.accounts.queue_program.to_account_info();
    let task_queue_authority = ctx.accounts.task_queue_authority.to_account_info();
    let task_queue = ctx.accounts.task_queue.to_account_info();
    let task = ctx.accounts.task.to_account_info();
    let mut queue = QueueCpi {
        queue_program: &queue_program,
        payer: &admin,
        queue_authority: &queue_authority,
        queue_authority_bump: config.queue_authority_bump,
        task_queue_authority: &task_queue_authority,
        task_queue: &task_queue,
        task: &task,
        system_program: &system_program,
    };

    let env = CycleEnv {
        now: Clock::get()?.unix_timestamp,
        max_chain_age: config.max_chain_age,
        queue_capacity: config.queue_capacity,
        funded: config.funding.require_funded(queue_authority.lamports()).is_ok(),
    };

    let job = &mut ctx.accounts.job;
    let armed = arm(job, task_queue.key(), task_id, &builder, &mut queue, &env)?;

    msg!(
        "Job {} armed on {}: task {} carries #{}",
        job_key,
        task_queue.key(),
        armed.task_id,
        armed.sequence,
    );

    emit!(TaskQueued {
        job: job_key,
        task_queue: task_queue.key(),
        task_id: Some(armed.task_id),
        sequence: armed.sequence,
        run_at: env.now,
        compute_budget: job.compute_budget,
    });

    Ok(())
}
