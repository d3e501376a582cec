use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, Token2022, TokenAccount};

use crate::authority::{FEE_AUTHORITY_SEED, JOB_SEED, QUEUE_AUTHORITY_SEED};
use crate::chain::{run_cycle, Cycle, CycleEnv};
use crate::errors::SchedulerError;
use crate::events::FeesHarvested;
use crate::harvest::Token2022Fees;
use crate::instructions::cycle::{report_rearm, report_stale};
use crate::queue::RunTaskReturn;
use crate::state::{JobKind, RecurringJob, SchedulerConfig};
use crate::tasks::{HarvestPayload, HarvestTask, TaskContext};

// ──────────────────────────────────────────────────────
// Execute Harvest Job: run by the queue cranker
//
// Sweeps the job's sources into the treasury, then returns the
// task after this one for the queue to place in its free slot.
// No signer besides the cranker: every account is pinned to the
// job or the config. Source accounts follow as remaining accounts.
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct ExecuteHarvestJob<'info> {
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

    /// CHECK: Funding is checked before the successor is handed off
    #[account(
        seeds = [QUEUE_AUTHORITY_SEED],
        bump = config.queue_authority_bump,
    )]
    pub queue_authority: UncheckedAccount<'info>,

    /// CHECK: PDA signer only, withdraw withheld authority
    #[account(
        seeds = [FEE_AUTHORITY_SEED],
        bump = config.fee_authority_bump,
    )]
    pub fee_authority: UncheckedAccount<'info>,

    #[account(
        mut,
        address = job.target @ SchedulerError::InvalidMint,
    )]
    pub mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        address = job.treasury @ SchedulerError::InvalidTreasury,
    )]
    pub treasury: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Program<'info, Token2022>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, ExecuteHarvestJob<'info>>,
    sequence: u64,
) -> Result<RunTaskReturn> {
    require!(
        ctx.accounts.job.kind == JobKind::Harvest,
        SchedulerError::JobKindMismatch
    );
    require!(
        ctx.remaining_accounts
            .iter()
            .all(|info| ctx.accounts.job.sources.contains(info.key)),
        SchedulerError::SourceMismatch
    );

    let config = &ctx.accounts.config;
    let now = Clock::get()?.unix_timestamp;

    let token_program = ctx.accounts.token_program.to_account_info();
    let mint = ctx.accounts.mint.to_account_info();
    let treasury = ctx.accounts.treasury.to_account_info();
    let fee_authority = ctx.accounts.fee_authority.to_account_info();
    let queue_authority = ctx.accounts.queue_authority.to_account_info();

    let job_key = ctx.accounts.job.key();
    let context = TaskContext::from_config(config.key(), config, queue_authority.key());

    let mut payload = HarvestPayload {
        task: HarvestTask::for_job(context, job_key, &ctx.accounts.job, fee_authority.key()),
        ledger: Token2022Fees {
            token_program: &token_program,
            mint: &mint,
            treasury: &treasury,
            fee_authority: &fee_authority,
            fee_authority_bump: config.fee_authority_bump,
            accounts: ctx.remaining_accounts,
        },
    };

    let env = CycleEnv {
        now,
        max_chain_age: config.max_chain_age,
        queue_capacity: config.queue_capacity,
        funded: config.funding.require_funded(queue_authority.lamports()).is_ok(),
    };

    let job = &mut ctx.accounts.job;
    let (report, rearm) = match run_cycle(job, sequence, &mut payload, &env)? {
        Cycle::Stale => {
            report_stale(job_key, job, sequence);
            return Ok(RunTaskReturn::default());
        }
        Cycle::Completed { output, rearm } => (output, rearm),
    };

    msg!(
        "Cycle {} of {}: harvested {} ({} swept, {} skipped, {} carried over)",
        job.cycles,
        job_key,
        report.amount,
        report.swept,
        report.skipped,
        report.carried_over,
    );

    emit!(FeesHarvested {
        mint: mint.key(),
        treasury: treasury.key(),
        amount: report.amount,
        carried_over: report.carried_over,
        swept: report.swept,
        skipped: report.skipped,
        harvested_at: now,
    });
    report_rearm(&rearm, job_key, job, sequence, now);

    Ok(rearm.into_return())
}
