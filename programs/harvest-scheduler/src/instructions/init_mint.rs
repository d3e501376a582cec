use anchor_lang::prelude::*;
use anchor_lang::solana_program::program::invoke;
use anchor_lang::system_program::{create_account, CreateAccount};
use anchor_spl::{
    token_2022::{
        initialize_mint2,
        spl_token_2022::{
            extension::{
                transfer_fee::TransferFeeConfig,
                transfer_hook::instruction::initialize as initialize_transfer_hook,
                BaseStateWithExtensions, ExtensionType, StateWithExtensions,
            },
            pod::PodMint,
            state::Mint as MintState,
        },
        InitializeMint2,
    },
    token_interface::{
        spl_pod::optional_keys::OptionalNonZeroPubkey, transfer_fee_initialize, Token2022,
        TransferFeeInitialize,
    },
};

use crate::authority::FEE_AUTHORITY_SEED;
use crate::errors::SchedulerError;
use crate::fees::FeeRate;

// ──────────────────────────────────────────────────────
// Init Mint: Token-2022 mint with a transfer fee
//
// The fee authority PDA is both the fee config authority and
// the withdraw-withheld authority, so fees can only leave the
// mint through this program. An optional transfer hook program
// (the allow-list gate) is attached at creation.
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct InitMint<'info> {
    /// Pays for the mint and becomes its mint/freeze authority
    #[account(mut)]
    pub authority: Signer<'info>,

    #[account(mut)]
    pub mint: Signer<'info>,

    /// CHECK: PDA that will be the withdraw withheld authority for automated collection
    #[account(seeds = [FEE_AUTHORITY_SEED], bump)]
    pub fee_authority: UncheckedAccount<'info>,

    pub token_program: Program<'info, Token2022>,

    pub system_program: Program<'info, System>,
}

pub fn handler(
    ctx: Context<InitMint>,
    decimals: u8,
    transfer_fee_basis_points: u16,
    maximum_fee: u64,
    transfer_hook_program: Option<Pubkey>,
) -> Result<()> {
    FeeRate::new(transfer_fee_basis_points, maximum_fee)?;

    let mut extensions = vec![ExtensionType::TransferFeeConfig];
    if transfer_hook_program.is_some() {
        extensions.push(ExtensionType::TransferHook);
    }
    let mint_size = ExtensionType::try_calculate_account_len::<PodMint>(&extensions)?;
    let lamports = Rent::get()?.minimum_balance(mint_size);

    create_account(
        CpiContext::new(
            ctx.accounts.system_program.to_account_info(),
            CreateAccount {
                from: ctx.accounts.authority.to_account_info(),
                to: ctx.accounts.mint.to_account_info(),
            },
        ),
        lamports,
        mint_size as u64,
        &ctx.accounts.token_program.key(),
    )?;

    // Extensions must be initialized before the mint itself
    let fee_authority = ctx.accounts.fee_authority.key();
    transfer_fee_initialize(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            TransferFeeInitialize {
                token_program_id: ctx.accounts.token_program.to_account_info(),
                mint: ctx.accounts.mint.to_account_info(),
            },
        ),
        Some(&fee_authority),
        Some(&fee_authority),
        transfer_fee_basis_points,
        maximum_fee,
    )?;

    if let Some(hook_program) = transfer_hook_program {
        let ix = initialize_transfer_hook(
            &ctx.accounts.token_program.key(),
            &ctx.accounts.mint.key(),
            Some(ctx.accounts.authority.key()),
            Some(hook_program),
        )?;
        invoke(
            &ix,
            &[
                ctx.accounts.mint.to_account_info(),
                ctx.accounts.token_program.to_account_info(),
            ],
        )?;
        msg!("Transfer hook program: {}", hook_program);
    }

    initialize_mint2(
        CpiContext::new(
            ctx.accounts.token_program.to_account_info(),
            InitializeMint2 {
                mint: ctx.accounts.mint.to_account_info(),
            },
        ),
        decimals,
        &ctx.accounts.authority.key(),
        Some(&ctx.accounts.authority.key()),
    )?;

    {
        let mint = ctx.accounts.mint.to_account_info();
        let mint_data = mint.try_borrow_data()?;
        let mint_with_extension = StateWithExtensions::<MintState>::unpack(&mint_data)?;
        let extension = mint_with_extension
            .get_extension::<TransferFeeConfig>()
            .map_err(|_| SchedulerError::MissingFeeConfig)?;
        require!(
            extension.withdraw_withheld_authority
                == OptionalNonZeroPubkey::try_from(Some(fee_authority))?,
            SchedulerError::FeeAuthorityMismatch
        );
    }

    msg!("Mint initialized with transfer fee extension");
    msg!("Transfer fee: {} basis points", transfer_fee_basis_points);
    msg!("Maximum fee: {}", maximum_fee);
    msg!("Withdraw authority (PDA): {}", fee_authority);

    Ok(())
}
