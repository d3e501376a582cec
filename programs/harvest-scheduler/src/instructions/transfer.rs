use anchor_lang::prelude::*;
use anchor_lang::solana_program::{instruction::AccountMeta, program::invoke};
use anchor_spl::{
    associated_token::AssociatedToken,
    token_2022::spl_token_2022::{
        extension::{
            transfer_fee::{instruction::transfer_checked_with_fee, TransferFeeConfig},
            BaseStateWithExtensions, StateWithExtensions,
        },
        state::Mint as MintState,
    },
    token_interface::{Mint, Token2022, TokenAccount},
};

use crate::errors::SchedulerError;
use crate::fees::FeeSchedule;

// ──────────────────────────────────────────────────────
// Transfer with fee
//
// The fee is computed from the mint's current epoch rate and
// withheld on the recipient. Accounts required by a transfer
// hook are passed as remaining accounts and forwarded as-is.
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct Transfer<'info> {
    #[account(mut)]
    pub sender: Signer<'info>,

    /// CHECK: Recipient wallet
    pub recipient: UncheckedAccount<'info>,

    #[account(mut)]
    pub mint_account: InterfaceAccount<'info, Mint>,

    #[account(
        mut,
        associated_token::mint = mint_account,
        associated_token::authority = sender,
        associated_token::token_program = token_program
    )]
    pub sender_token_account: InterfaceAccount<'info, TokenAccount>,

    #[account(
        init_if_needed,
        payer = sender,
        associated_token::mint = mint_account,
        associated_token::authority = recipient,
        associated_token::token_program = token_program
    )]
    pub recipient_token_account: InterfaceAccount<'info, TokenAccount>,

    pub token_program: Program<'info, Token2022>,

    pub associated_token_program: Program<'info, AssociatedToken>,

    pub system_program: Program<'info, System>,
}

pub fn handler<'info>(
    ctx: Context<'_, '_, 'info, 'info, Transfer<'info>>,
    amount: u64,
) -> Result<()> {
    let fee = {
        let mint = ctx.accounts.mint_account.to_account_info();
        let mint_data = mint.try_borrow_data()?;
        let mint_with_extension = StateWithExtensions::<MintState>::unpack(&mint_data)?;
        let extension = mint_with_extension
            .get_extension::<TransferFeeConfig>()
            .map_err(|_| SchedulerError::MissingFeeConfig)?;
        FeeSchedule::from_config(extension).fee_at(Clock::get()?.epoch, amount)?
    };
    let decimals = ctx.accounts.mint_account.decimals;

    let mut ix = transfer_checked_with_fee(
        &ctx.accounts.token_program.key(),
        &ctx.accounts.sender_token_account.key(),
        &ctx.accounts.mint_account.key(),
        &ctx.accounts.recipient_token_account.key(),
        &ctx.accounts.sender.key(),
        &[],
        amount,
        decimals,
        fee,
    )?;
    ix.accounts.extend(ctx.remaining_accounts.iter().map(|info| AccountMeta {
        pubkey: *info.key,
        is_signer: info.is_signer,
        is_writable: info.is_writable,
    }));

    let mut infos = vec![
        ctx.accounts.sender_token_account.to_account_info(),
        ctx.accounts.mint_account.to_account_info(),
        ctx.accounts.recipient_token_account.to_account_info(),
        ctx.accounts.sender.to_account_info(),
    ];
    infos.extend(ctx.remaining_accounts.iter().cloned());
    infos.push(ctx.accounts.token_program.to_account_info());

    invoke(&ix, &infos)?;

    msg!("Transfer amount: {}", amount);
    msg!("Fee withheld: {}", fee);

    Ok(())
}
