use anchor_lang::prelude::*;

use crate::authority::{oracle_identity_address, ORACLE_STATE_SEED};
use crate::errors::SchedulerError;
use crate::events::OracleResponded;
use crate::state::{OracleState, SchedulerConfig};

// ──────────────────────────────────────────────────────
// Oracle Callback: invoked by the oracle with its answer
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct OracleCallback<'info> {
    /// CHECK: Oracle identity PDA, must sign
    #[account(
        address = oracle_identity_address(&config.oracle_program) @ SchedulerError::UnauthorizedCallback,
        constraint = identity.is_signer @ SchedulerError::UnauthorizedCallback,
    )]
    pub identity: UncheckedAccount<'info>,

    #[account(
        mut,
        seeds = [ORACLE_STATE_SEED, oracle_state.context.as_ref()],
        bump = oracle_state.bump,
    )]
    pub oracle_state: Account<'info, OracleState>,

    #[account(
        seeds = [SchedulerConfig::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, SchedulerConfig>,
}

pub fn handler(ctx: Context<OracleCallback>, response: String) -> Result<()> {
    let state = &mut ctx.accounts.oracle_state;
    state.last_response = OracleState::clip_response(&response).to_string();
    state.response_count = state.response_count.checked_add(1).ok_or(SchedulerError::Overflow)?;

    msg!(
        "Response #{} for context {} ({} bytes)",
        state.response_count,
        state.context,
        response.len(),
    );

    emit!(OracleResponded {
        context: state.context,
        response_count: state.response_count,
        response_len: state.last_response.len() as u32,
    });

    Ok(())
}
