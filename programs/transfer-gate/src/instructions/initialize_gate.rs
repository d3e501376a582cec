use anchor_lang::prelude::*;
use anchor_spl::token_interface::Mint;

use crate::state::GateConfig;

// ──────────────────────────────────────────────────────
// Initialize Gate: called once by the deployer
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct InitializeGate<'info> {
    #[account(mut)]
    pub admin: Signer<'info>,

    #[account(
        init,
        payer = admin,
        space = GateConfig::LEN,
        seeds = [GateConfig::SEED],
        bump,
    )]
    pub config: Account<'info, GateConfig>,

    pub mint: InterfaceAccount<'info, Mint>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<InitializeGate>) -> Result<()> {
    let config = &mut ctx.accounts.config;
    config.admin = ctx.accounts.admin.key();
    config.mint = ctx.accounts.mint.key();
    config.entry_count = 0;
    config.bump = ctx.bumps.config;

    msg!("Gate initialized for mint {}", config.mint);
    msg!("Admin: {}", config.admin);

    Ok(())
}
