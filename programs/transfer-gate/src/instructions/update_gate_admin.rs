use anchor_lang::prelude::*;

use crate::errors::GateError;
use crate::state::GateConfig;

#[derive(Accounts)]
pub struct UpdateGateAdmin<'info> {
    #[account(
        constraint = admin.key() == config.admin @ GateError::Unauthorized,
    )]
    pub admin: Signer<'info>,

    #[account(
        mut,
        seeds = [GateConfig::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, GateConfig>,
}

pub fn handler(ctx: Context<UpdateGateAdmin>, new_admin: Pubkey) -> Result<()> {
    ctx.accounts.config.admin = new_admin;
    msg!("Gate admin transferred to {}", new_admin);
    Ok(())
}
