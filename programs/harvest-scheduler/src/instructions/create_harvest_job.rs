use anchor_lang::prelude::*;
use anchor_spl::token_2022::spl_token_2022::{
    extension::{transfer_fee::TransferFeeConfig, BaseStateWithExtensions, StateWithExtensions},
    state::Mint as MintState,
};
use anchor_spl::token_interface::{spl_pod::optional_keys::OptionalNonZeroPubkey, Mint, TokenAccount};

use crate::authority::{FEE_AUTHORITY_SEED, JOB_SEED};
use crate::errors::SchedulerError;
use crate::events::JobCreated;
use crate::harvest::{harvest_compute_units, MAX_SOURCES};
use crate::state::{JobKind, RecurringJob, SchedulerConfig};

// ──────────────────────────────────────────────────────
// Create Harvest Job: admin only, one job per mint
//
// Source holder accounts are passed as remaining accounts and
// stored on the job; every cycle sweeps the same list.
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct CreateHarvestJob<'info> {
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

    #[account(
        init,
        payer = admin,
        space = RecurringJob::LEN,
        seeds = [JOB_SEED, mint.key().as_ref()],
        bump,
    )]
    pub job: Account<'info, RecurringJob>,

    /// CHECK: PDA signer only, must be the mint's withdraw authority
    #[account(
        seeds = [FEE_AUTHORITY_SEED],
        bump = config.fee_authority_bump,
    )]
    pub fee_authority: UncheckedAccount<'info>,

    pub mint: InterfaceAccount<'info, Mint>,

    #[account(
        constraint = treasury.mint == mint.key() @ SchedulerError::InvalidTreasury,
    )]
    pub treasury: InterfaceAccount<'info, TokenAccount>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<CreateHarvestJob>, interval: i64, compute_budget: u32) -> Result<()> {
    require!(interval >= 0, SchedulerError::InvalidInterval);

    let mut sources: Vec<Pubkey> = Vec::with_capacity(ctx.remaining_accounts.len());
    for info in ctx.remaining_accounts.iter() {
        if !sources.contains(info.key) {
            sources.push(info.key());
        }
    }
    require!(sources.len() <= MAX_SOURCES, SchedulerError::TooManySources);
    require!(
        compute_budget >= harvest_compute_units(sources.len()),
        SchedulerError::InsufficientCompute
    );

    {
        let mint = ctx.accounts.mint.to_account_info();
        let mint_data = mint.try_borrow_data()?;
        let mint_with_extension = StateWithExtensions::<MintState>::unpack(&mint_data)?;
        let extension = mint_with_extension
            .get_extension::<TransferFeeConfig>()
            .map_err(|_| SchedulerError::MissingFeeConfig)?;
        require!(
            extension.withdraw_withheld_authority
                == OptionalNonZeroPubkey::try_from(Some(ctx.accounts.fee_authority.key()))?,
            SchedulerError::FeeAuthorityMismatch
        );
    }

    let job = &mut ctx.accounts.job;
    job.set_inner(RecurringJob::new(
        JobKind::Harvest,
        ctx.accounts.mint.key(),
        interval,
        compute_budget,
        ctx.bumps.job,
    ));
    job.treasury = ctx.accounts.treasury.key();
    job.sources = sources;

    msg!(
        "Harvest job created for mint {}: {} sources, every {}s",
        job.target,
        job.sources.len(),
        interval,
    );

    emit!(JobCreated {
        job: job.key(),
        kind: JobKind::Harvest,
        target: job.target,
        interval,
        compute_budget,
    });

    Ok(())
}
