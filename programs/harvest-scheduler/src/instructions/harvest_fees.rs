use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, Token2022, TokenAccount};

use crate::authority::FEE_AUTHORITY_SEED;
use crate::errors::SchedulerError;
use crate::events::FeesHarvested;
use crate::harvest::{harvest, Token2022Fees};
use crate::state::config::SchedulerConfig;

// ──────────────────────────────────────────────────────
// Harvest: one-off sweep, admin only
//
// Source holder accounts are passed as remaining accounts.
// Returns the amount swept from them; a balance already sitting
// on the mint is withdrawn too and reported as carried over.
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct Harvest<'info> {
    #[account(
        constraint = admin.key() == config.admin @ SchedulerError::Unauthorized,
    )]
    pub admin: Signer<'info>,

    #[account(
        seeds = [SchedulerConfig::SEED],
        bump = config.bump,
        constraint = !config.paused @ SchedulerError::SchedulerPaused,
    )]
    pub config: Account<'info, SchedulerConfig>,

    /// CHECK: PDA signer only, withdraw withheld authority
    #[account(
        seeds = [FEE_AUTHORITY_SEED],
        bump = config.fee_authority_bump,
    )]
    pub fee_authority: UncheckedAccount<'info>,

    #[account(mut)]
    pub mint: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        constraint = treasury.mint == mint.key() @ SchedulerError::InvalidTreasury,
    )]
    pub treasury: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Program<'info, Token2022>,
}

pub fn handler<'info>(ctx: Context<'_, '_, 'info, 'info, Harvest<'info>>) -> Result<u64> {
    let token_program = ctx.accounts.token_program.to_account_info();
    let mint = ctx.accounts.mint.to_account_info();
    let treasury = ctx.accounts.treasury.to_account_info();
    let fee_authority = ctx.accounts.fee_authority.to_account_info();

    let candidates = ctx
        .remaining_accounts
        .iter()
        .map(|info| info.key())
        .collect::<Vec<_>>();

    let mut ledger = Token2022Fees {
        token_program: &token_program,
        mint: &mint,
        treasury: &treasury,
        fee_authority: &fee_authority,
        fee_authority_bump: ctx.accounts.config.fee_authority_bump,
        accounts: ctx.remaining_accounts,
    };
    let report = harvest(&mut ledger, &candidates)?;

    msg!(
        "Harvested {} into {} ({} swept, {} skipped, {} carried over)",
        report.amount,
        treasury.key(),
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
        harvested_at: Clock::get()?.unix_timestamp,
    });

    Ok(report.amount)
}
