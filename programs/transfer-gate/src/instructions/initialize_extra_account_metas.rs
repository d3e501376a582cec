use anchor_lang::prelude::*;
use anchor_spl::token_interface::Mint;
use spl_tlv_account_resolution::{account::ExtraAccountMeta, seeds::Seed, state::ExtraAccountMetaList};
use spl_transfer_hook_interface::instruction::ExecuteInstruction;

use crate::errors::GateError;
use crate::gate::EXTRA_ACCOUNT_METAS_SEED;
use crate::state::{GateConfig, WhitelistEntry};

// ──────────────────────────────────────────────────────
// Extra account metas: tells the token program which extra
// account the hook needs: the whitelist entry of the source
// owner.
//
// Execute account layout:
//   0: source token   1: mint   2: destination token
//   3: source owner   4: this list
//   5: whitelist entry = PDA("whitelist", account 3)
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct InitializeExtraAccountMetas<'info> {
    #[account(
        mut,
        constraint = admin.key() == config.admin @ GateError::Unauthorized,
    )]
    pub admin: Signer<'info>,

    #[account(
        seeds = [GateConfig::SEED],
        bump = config.bump,
        constraint = config.mint == mint.key() @ GateError::InvalidMint,
    )]
    pub config: Account<'info, GateConfig>,

    /// CHECK: ExtraAccountMetaList PDA, written below
    #[account(
        init,
        payer = admin,
        space = ExtraAccountMetaList::size_of(1).unwrap(),
        seeds = [EXTRA_ACCOUNT_METAS_SEED, mint.key().as_ref()],
        bump,
    )]
    pub extra_account_meta_list: UncheckedAccount<'info>,

    pub mint: InterfaceAccount<'info, Mint>,

    pub system_program: Program<'info, System>,
}

pub fn extra_account_metas() -> Result<Vec<ExtraAccountMeta>> {
    Ok(vec![ExtraAccountMeta::new_with_seeds(
        &[
            Seed::Literal {
                bytes: WhitelistEntry::SEED.to_vec(),
            },
            Seed::AccountKey { index: 3 },
        ],
        false,
        false,
    )?])
}

pub fn handler(ctx: Context<InitializeExtraAccountMetas>) -> Result<()> {
    let metas = extra_account_metas()?;
    let info = ctx.accounts.extra_account_meta_list.to_account_info();
    let mut data = info.try_borrow_mut_data()?;
    ExtraAccountMetaList::init::<ExecuteInstruction>(&mut data, &metas)?;

    msg!(
        "Extra account metas for {} initialized with {} accounts",
        ctx.accounts.mint.key(),
        metas.len(),
    );

    Ok(())
}
