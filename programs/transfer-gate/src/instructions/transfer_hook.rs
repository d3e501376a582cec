use anchor_lang::prelude::*;
use anchor_spl::token_2022::spl_token_2022::{
    extension::{transfer_hook::TransferHookAccount, BaseStateWithExtensions, StateWithExtensions},
    state::Account as TokenAccountState,
};
use anchor_spl::token_interface::{Mint, TokenAccount};

use crate::errors::GateError;
use crate::gate::{check, load_entry, EXTRA_ACCOUNT_METAS_SEED};
use crate::state::WhitelistEntry;

// ──────────────────────────────────────────────────────
// Transfer hook: invoked by Token-2022 on every transfer
//
// Allows the transfer iff the source owner has a whitelist
// entry. Denials are logged, not emitted.
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct TransferHook<'info> {
    #[account(
        token::mint = mint,
        token::authority = owner,
    )]
    pub source_token: InterfaceAccount<'info, TokenAccount>,

    pub mint: InterfaceAccount<'info, Mint>,

    #[account(token::mint = mint)]
    pub destination_token: InterfaceAccount<'info, TokenAccount>,

    /// CHECK: Source token owner, may be any account
    pub owner: UncheckedAccount<'info>,

    /// CHECK: ExtraAccountMetaList PDA
    #[account(
        seeds = [EXTRA_ACCOUNT_METAS_SEED, mint.key().as_ref()],
        bump,
    )]
    pub extra_account_meta_list: UncheckedAccount<'info>,

    /// CHECK: Whitelist entry of `owner`; may not exist
    #[account(
        seeds = [WhitelistEntry::SEED, owner.key().as_ref()],
        bump,
    )]
    pub whitelist_entry: UncheckedAccount<'info>,
}

fn is_transferring(source: &AccountInfo) -> Result<bool> {
    let data = source.try_borrow_data()?;
    let account = StateWithExtensions::<TokenAccountState>::unpack(&data)?;
    let extension = account.get_extension::<TransferHookAccount>()?;
    Ok(bool::from(extension.transferring))
}

pub fn handler(ctx: Context<TransferHook>, amount: u64) -> Result<()> {
    require!(
        is_transferring(&ctx.accounts.source_token.to_account_info())?,
        GateError::NotTransferring
    );

    let owner = ctx.accounts.owner.key();
    let entry = load_entry(ctx.program_id, &ctx.accounts.whitelist_entry.to_account_info());

    if !check(&owner, entry.as_ref()) {
        msg!("Transfer of {} denied: {} is not whitelisted", amount, owner);
        return err!(GateError::NotWhitelisted);
    }

    msg!("Transfer of {} allowed for {}", amount, owner);
    Ok(())
}
