use anchor_lang::prelude::*;

use crate::errors::GateError;
use crate::events::WhitelistRemoved;
use crate::state::{GateConfig, WhitelistEntry};

// ──────────────────────────────────────────────────────
// Remove from Whitelist: admin only, closes the entry.
// The next transfer from the principal is refused.
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct RemoveFromWhitelist<'info> {
    #[account(
        mut,
        constraint = admin.key() == config.admin @ GateError::Unauthorized,
    )]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [GateConfig::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, GateConfig>,

    /// CHECK: Principal being removed
    pub principal: UncheckedAccount<'info>,

    #[account(
        mut,
        close = admin,
        seeds = [WhitelistEntry::SEED, principal.key().as_ref()],
        bump = whitelist_entry.bump,
        constraint = whitelist_entry.principal == principal.key() @ GateError::InvalidWhitelistEntry,
    )]
    pub whitelist_entry: Account<'info, WhitelistEntry>,
}

pub fn handler(ctx: Context<RemoveFromWhitelist>) -> Result<()> {
    let config = &mut ctx.accounts.config;
    config.entry_count = config.entry_count.saturating_sub(1);

    msg!("Principal {} removed from whitelist", ctx.accounts.principal.key());

    emit!(WhitelistRemoved {
        principal: ctx.accounts.principal.key(),
        removed_by: ctx.accounts.admin.key(),
        removed_at: Clock::get()?.unix_timestamp,
    });

    Ok(())
}
