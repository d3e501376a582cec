use anchor_lang::prelude::*;

use crate::authority::{JOB_SEED, ORACLE_STATE_SEED, QUEUE_AUTHORITY_SEED};
use crate::chain::{run_cycle, Cycle, CycleEnv};
use crate::errors::SchedulerError;
use crate::events::OracleQueried;
use crate::instructions::cycle::{report_rearm, report_stale};
use crate::oracle::{interaction_address, CallbackAccount, Interact};
use crate::queue::RunTaskReturn;
use crate::state::{JobKind, OracleState, RecurringJob, SchedulerConfig};
use crate::tasks::{OraclePayload, OracleTask, TaskContext};

// ──────────────────────────────────────────────────────
// Execute Oracle Job: run by the queue cranker
//
// Sends the stored query to the oracle, then returns the next
// cycle to the queue. The answer arrives later through
// `oracle_callback`.
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct ExecuteOracleJob<'info> {
    #[account(
        seeds = [SchedulerConfig::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, SchedulerConfig>,

    #[account(
        mut,
        seeds = [JOB_SEED, job.target.as_ref()],
        bump = job.bump,
    )]
    pub job: Account<'info, RecurringJob>,

    #[account(
        mut,
        seeds = [ORACLE_STATE_SEED, job.target.as_ref()],
        bump = oracle_state.bump,
    )]
    pub oracle_state: Account<'info, OracleState>,

    /// CHECK: PDA that pays for the interaction
    #[account(
        mut,
        seeds = [QUEUE_AUTHORITY_SEED],
        bump = config.queue_authority_bump,
    )]
    pub queue_authority: UncheckedAccount<'info>,

    /// CHECK: Interaction account, written by the oracle program
    #[account(
        mut,
        constraint = interaction.key() == interaction_address(
            &config.oracle_program,
            &queue_authority.key(),
            &job.target,
        ) @ SchedulerError::OracleAccountMismatch,
    )]
    pub interaction: UncheckedAccount<'info>,

    /// CHECK: Oracle context the job targets
    #[account(address = job.target @ SchedulerError::OracleAccountMismatch)]
    pub context_account: UncheckedAccount<'info>,

    /// CHECK: Address checked against config
    #[account(address = config.oracle_program @ SchedulerError::InvalidOracleProgram)]
    pub oracle_program: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<ExecuteOracleJob>, sequence: u64) -> Result<RunTaskReturn> {
    require!(
        ctx.accounts.job.kind == JobKind::Oracle,
        SchedulerError::JobKindMismatch
    );

    let config = &ctx.accounts.config;
    let now = Clock::get()?.unix_timestamp;

    let queue_authority = ctx.accounts.queue_authority.to_account_info();
    let interaction = ctx.accounts.interaction.to_account_info();
    let context_account = ctx.accounts.context_account.to_account_info();
    let oracle_program = ctx.accounts.oracle_program.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();

    let job_key = ctx.accounts.job.key();
    let context = TaskContext::from_config(config.key(), config, queue_authority.key());

    let mut payload = OraclePayload {
        task: OracleTask::for_job(context, job_key, &ctx.accounts.job, config.oracle_program),
        query: ctx.accounts.oracle_state.query.clone(),
        client: Interact {
            oracle_program: &oracle_program,
            payer: &queue_authority,
            payer_bump: config.queue_authority_bump,
            interaction: &interaction,
            context_account: &context_account,
            system_program: &system_program,
            callback_accounts: vec![
                CallbackAccount {
                    pubkey: ctx.accounts.oracle_state.key(),
                    is_signer: false,
                    is_writable: true,
                },
                CallbackAccount {
                    pubkey: config.key(),
                    is_signer: false,
                    is_writable: false,
                },
            ],
        },
    };

    let env = CycleEnv {
        now,
        max_chain_age: config.max_chain_age,
        queue_capacity: config.queue_capacity,
        funded: config.funding.require_funded(queue_authority.lamports()).is_ok(),
    };

    let job = &mut ctx.accounts.job;
    let rearm = match run_cycle(job, sequence, &mut payload, &env)? {
        Cycle::Stale => {
            report_stale(job_key, job, sequence);
            return Ok(RunTaskReturn::default());
        }
        Cycle::Completed { rearm, .. } => rearm,
    };

    let state = &mut ctx.accounts.oracle_state;
    state.query_count = state.query_count.checked_add(1).ok_or(SchedulerError::Overflow)?;

    msg!("Query #{} sent for context {}", state.query_count, state.context);

    emit!(OracleQueried {
        job: job_key,
        context: state.context,
        query_count: state.query_count,
    });
    report_rearm(&rearm, job_key, job, sequence, now);

    Ok(rearm.into_return())
}
