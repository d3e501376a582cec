use anchor_lang::prelude::*;

use crate::authority::{JOB_SEED, ORACLE_STATE_SEED};
use crate::errors::SchedulerError;
use crate::events::JobCreated;
use crate::oracle::{CreateContext, ORACLE_QUERY_COMPUTE_UNITS};
use crate::queue::SUCCESSOR_COMPUTE_UNITS;
use crate::state::{JobKind, OracleState, RecurringJob, SchedulerConfig};

// ──────────────────────────────────────────────────────
// Create Oracle Job: admin only
//
// Creates the oracle context (counter-seeded, owned by the
// oracle program) and the state that collects its responses.
// Each cycle of the job sends `query` against that context.
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct CreateOracleJob<'info> {
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

    /// CHECK: Context counter, validated by the oracle program
    #[account(mut)]
    pub counter: UncheckedAccount<'info>,

    /// CHECK: Created by the oracle program
    #[account(mut)]
    pub context_account: UncheckedAccount<'info>,

    #[account(
        init,
        payer = admin,
        space = OracleState::LEN,
        seeds = [ORACLE_STATE_SEED, context_account.key().as_ref()],
        bump,
    )]
    pub oracle_state: Account<'info, OracleState>,

    #[account(
        init,
        payer = admin,
        space = RecurringJob::LEN,
        seeds = [JOB_SEED, context_account.key().as_ref()],
        bump,
    )]
    pub job: Account<'info, RecurringJob>,

    /// CHECK: Address checked against config
    #[account(address = config.oracle_program @ SchedulerError::InvalidOracleProgram)]
    pub oracle_program: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<CreateOracleJob>,
    context_text: String,
    query: String,
    interval: i64,
    compute_budget: u32,
) -> Result<()> {
    require!(interval >= 0, SchedulerError::InvalidInterval);
    require!(
        query.len() <= OracleState::MAX_QUERY_LEN && context_text.len() <= OracleState::MAX_QUERY_LEN,
        SchedulerError::QueryTooLong
    );
    require!(
        compute_budget >= ORACLE_QUERY_COMPUTE_UNITS + SUCCESSOR_COMPUTE_UNITS,
        SchedulerError::InsufficientCompute
    );

    let oracle_program = ctx.accounts.oracle_program.to_account_info();
    let payer = ctx.accounts.admin.to_account_info();
    let counter = ctx.accounts.counter.to_account_info();
    let context_account = ctx.accounts.context_account.to_account_info();
    let system_program = ctx.accounts.system_program.to_account_info();

    CreateContext {
        oracle_program: &oracle_program,
        payer: &payer,
        counter: &counter,
        context_account: &context_account,
        system_program: &system_program,
    }
    .invoke(context_text)?;

    let context = context_account.key();

    let state = &mut ctx.accounts.oracle_state;
    state.context = context;
    state.query = query;
    state.last_response = String::new();
    state.query_count = 0;
    state.response_count = 0;
    state.bump = ctx.bumps.oracle_state;

    let job = &mut ctx.accounts.job;
    job.set_inner(RecurringJob::new(
        JobKind::Oracle,
        context,
        interval,
        compute_budget,
        ctx.bumps.job,
    ));

    msg!("Oracle job created for context {}, every {}s", context, interval);

    emit!(JobCreated {
        job: job.key(),
        kind: JobKind::Oracle,
        target: context,
        interval,
        compute_budget,
    });

    Ok(())
}
