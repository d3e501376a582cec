use anchor_lang::prelude::*;
use anchor_spl::token_2022::spl_token_2022::{
    extension::{transfer_fee::TransferFeeConfig, BaseStateWithExtensions, StateWithExtensions},
    state::Mint as MintState,
};
use anchor_spl::token_interface::{transfer_fee_set, Mint, Token2022, TransferFeeSetTransferFee};

use crate::authority::{Authority, FEE_AUTHORITY_SEED};
use crate::errors::SchedulerError;
use crate::events::FeeRateUpdated;
use crate::fees::{FeeRate, FeeSchedule};
use crate::state::config::SchedulerConfig;

// ──────────────────────────────────────────────────────
// Update Fee: admin only, signed by the fee authority
//
// The ledger applies a new rate two epochs after it is set;
// transfers until then still use the previous rate.
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct UpdateFee<'info> {
    #[account(
        constraint = admin.key() == config.admin @ SchedulerError::Unauthorized,
    )]
    pub admin: Signer<'info>,

    #[account(
        seeds = [SchedulerConfig::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, SchedulerConfig>,

    #[account(mut)]
    pub mint: InterfaceAccount<'info, Mint>,

    /// CHECK: PDA signer only, the mint's transfer fee config authority
    #[account(
        seeds = [FEE_AUTHORITY_SEED],
        bump = config.fee_authority_bump,
    )]
    pub fee_authority: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token2022>,
}

pub fn handler(ctx: Context<UpdateFee>, transfer_fee_basis_points: u16, maximum_fee: u64) -> Result<()> {
    let rate = FeeRate::new(transfer_fee_basis_points, maximum_fee)?;
    let epoch = Clock::get()?.epoch;

    let mut schedule = {
        let mint = ctx.accounts.mint.to_account_info();
        let mint_data = mint.try_borrow_data()?;
        let mint_with_extension = StateWithExtensions::<MintState>::unpack(&mint_data)?;
        let extension = mint_with_extension
            .get_extension::<TransferFeeConfig>()
            .map_err(|_| SchedulerError::MissingFeeConfig)?;
        FeeSchedule::from_config(extension)
    };

    let bump = [ctx.accounts.config.fee_authority_bump];
    let seeds = Authority::Fee.signer_seeds(&bump);
    let signer_seeds: &[&[&[u8]]] = &[&seeds[..]];

    transfer_fee_set(
        CpiContext::new_with_signer(
            ctx.accounts.token_program.to_account_info(),
            TransferFeeSetTransferFee {
                token_program_id: ctx.accounts.token_program.to_account_info(),
                mint: ctx.accounts.mint.to_account_info(),
                authority: ctx.accounts.fee_authority.to_account_info(),
            },
            signer_seeds,
        ),
        rate.basis_points,
        rate.maximum_fee,
    )?;

    let effective_epoch = schedule.stage(rate, epoch);

    msg!(
        "Transfer fee set to {}bps (max {}), effective from epoch {}",
        rate.basis_points,
        rate.maximum_fee,
        effective_epoch,
    );

    emit!(FeeRateUpdated {
        mint: ctx.accounts.mint.key(),
        basis_points: rate.basis_points,
        maximum_fee: rate.maximum_fee,
        effective_epoch,
    });

    Ok(())
}
