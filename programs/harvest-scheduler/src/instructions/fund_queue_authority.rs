use anchor_lang::prelude::*;

use crate::authority::QUEUE_AUTHORITY_SEED;
use crate::events::QueueAuthorityFunded;
use crate::funding::ensure_funded;
use crate::state::config::SchedulerConfig;

// ──────────────────────────────────────────────────────
// Fund Queue Authority: anyone may top the PDA up to the
// configured minimum balance
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct FundQueueAuthority<'info> {
    #[account(mut)]
    pub funder: Signer<'info>,

    #[account(
        seeds = [SchedulerConfig::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, SchedulerConfig>,

    /// CHECK: PDA that pays for successor tasks, lamports only
    #[account(
        mut,
        seeds = [QUEUE_AUTHORITY_SEED],
        bump = config.queue_authority_bump,
    )]
    pub queue_authority: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<FundQueueAuthority>) -> Result<u64> {
    let queue_authority = ctx.accounts.queue_authority.to_account_info();
    let lamports = ensure_funded(
        &ctx.accounts.config.funding,
        &ctx.accounts.funder.to_account_info(),
        &queue_authority,
        &ctx.accounts.system_program.to_account_info(),
    )?;

    emit!(QueueAuthorityFunded {
        queue_authority: queue_authority.key(),
        lamports,
        balance: queue_authority.lamports(),
    });

    Ok(lamports)
}
