use anchor_lang::prelude::*;

use crate::errors::GateError;
use crate::events::WhitelistAdded;
use crate::gate::{authorize, plan_insert, InsertOutcome};
use crate::state::{GateConfig, WhitelistEntry};

// ──────────────────────────────────────────────────────
// Add to Whitelist: admin only
//
// Adding a principal twice fails with AlreadyWhitelisted; the
// existing entry is left untouched.
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct AddToWhitelist<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [GateConfig::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, GateConfig>,

    /// CHECK: Principal being allowed, only its key is stored
    pub principal: UncheckedAccount<'info>,

    #[account(
        init_if_needed,
        payer = admin,
        space = WhitelistEntry::LEN,
        seeds = [WhitelistEntry::SEED, principal.key().as_ref()],
        bump,
    )]
    pub whitelist_entry: Account<'info, WhitelistEntry>,

    pub system_program: Program<'info, System>,
}

pub fn handler(mut ctx: Context<AddToWhitelist>) -> Result<()> {
    let bump = ctx.bumps.whitelist_entry;
    let accounts = &mut ctx.accounts;
    let outcome = plan_insert(
        authorize(&accounts.admin.key(), &accounts.config.admin),
        accounts.whitelist_entry.principal != Pubkey::default(),
    );

    match outcome {
        InsertOutcome::Denied => return err!(GateError::Unauthorized),
        InsertOutcome::AlreadyPresent => return err!(GateError::AlreadyWhitelisted),
        InsertOutcome::Created => {}
    }

    let now = Clock::get()?.unix_timestamp;
    accounts.whitelist_entry.set_inner(WhitelistEntry {
        principal: accounts.principal.key(),
        added_by: accounts.admin.key(),
        added_at: now,
        bump,
    });
    accounts.config.entry_count = accounts
        .config
        .entry_count
        .checked_add(1)
        .ok_or(GateError::Overflow)?;

    msg!("Principal {} added to whitelist", accounts.principal.key());

    emit!(WhitelistAdded {
        principal: accounts.principal.key(),
        added_by: accounts.admin.key(),
        added_at: now,
    });

    Ok(())
}
