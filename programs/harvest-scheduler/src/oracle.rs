use anchor_lang::prelude::*;
use anchor_lang::Discriminator;
use anchor_lang::solana_program::{
    instruction::{AccountMeta, Instruction},
    program::invoke_signed,
};

use crate::authority::Authority;
use crate::errors::SchedulerError;

// ──────────────────────────────────────────────────────
// LLM oracle interface
//
// A query is an interaction account written by the caller; the
// oracle later calls back into `oracle_callback` signed by its
// identity PDA. Until then there is simply no response.
// ──────────────────────────────────────────────────────

pub mod oracle_program {
    use anchor_lang::declare_id;
    declare_id!("LLMrieZMpbJFwN52WgmBNMxYojrpRVYXdC1RCweEbab");
}

pub const INTERACTION_SEED: &[u8] = b"interaction";

pub const ORACLE_QUERY_COMPUTE_UNITS: u32 = 50_000;

/// `sha256("global:create_llm_context")[..8]`
pub const CREATE_LLM_CONTEXT: [u8; 8] = [224, 109, 4, 173, 191, 25, 42, 162];

/// `sha256("global:interact_with_llm")[..8]`
pub const INTERACT_WITH_LLM: [u8; 8] = [2, 54, 5, 16, 87, 123, 219, 132];

/// Account list the oracle forwards to the callback.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct CallbackAccount {
    pub pubkey: Pubkey,
    pub is_signer: bool,
    pub is_writable: bool,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub struct InteractArgs {
    pub text: String,
    pub callback_program_id: Pubkey,
    pub callback_discriminator: [u8; 8],
    pub account_metas: Option<Vec<CallbackAccount>>,
}

pub fn interaction_address(oracle_program: &Pubkey, payer: &Pubkey, context: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(
        &[INTERACTION_SEED, payer.as_ref(), context.as_ref()],
        oracle_program,
    )
    .0
}

fn encode<T: AnchorSerialize>(discriminator: [u8; 8], args: &T) -> Result<Vec<u8>> {
    let mut data = discriminator.to_vec();
    args.serialize(&mut data)
        .map_err(|_| SchedulerError::CompileTransactionFailed)?;
    Ok(data)
}

pub struct CreateContext<'a, 'info> {
    pub oracle_program: &'a AccountInfo<'info>,
    pub payer: &'a AccountInfo<'info>,
    pub counter: &'a AccountInfo<'info>,
    pub context_account: &'a AccountInfo<'info>,
    pub system_program: &'a AccountInfo<'info>,
}

impl<'a, 'info> CreateContext<'a, 'info> {
    pub fn invoke(&self, text: String) -> Result<()> {
        let ix = Instruction {
            program_id: *self.oracle_program.key,
            accounts: vec![
                AccountMeta::new(*self.payer.key, true),
                AccountMeta::new(*self.counter.key, false),
                AccountMeta::new(*self.context_account.key, false),
                AccountMeta::new_readonly(*self.system_program.key, false),
            ],
            data: encode(CREATE_LLM_CONTEXT, &text)?,
        };
        invoke_signed(
            &ix,
            &[
                self.payer.clone(),
                self.counter.clone(),
                self.context_account.clone(),
                self.system_program.clone(),
            ],
            &[],
        )?;
        Ok(())
    }
}

/// Anything that can forward a query to the oracle.
pub trait OracleClient {
    fn interact(&mut self, text: &str) -> Result<()>;
}

pub fn callback_discriminator() -> Result<[u8; 8]> {
    crate::instruction::OracleCallback::DISCRIMINATOR
        .try_into()
        .map_err(|_| error!(SchedulerError::CompileTransactionFailed))
}

/// Sends one query, paid and signed by the queue authority.
pub struct Interact<'a, 'info> {
    pub oracle_program: &'a AccountInfo<'info>,
    pub payer: &'a AccountInfo<'info>,
    pub payer_bump: u8,
    pub interaction: &'a AccountInfo<'info>,
    pub context_account: &'a AccountInfo<'info>,
    pub system_program: &'a AccountInfo<'info>,
    /// Accounts the oracle passes back to `oracle_callback`
    pub callback_accounts: Vec<CallbackAccount>,
}

impl<'a, 'info> OracleClient for Interact<'a, 'info> {
    fn interact(&mut self, text: &str) -> Result<()> {
        let args = InteractArgs {
            text: text.to_string(),
            callback_program_id: crate::ID,
            callback_discriminator: callback_discriminator()?,
            account_metas: Some(self.callback_accounts.clone()),
        };

        let ix = Instruction {
            program_id: *self.oracle_program.key,
            accounts: vec![
                AccountMeta::new(*self.payer.key, true),
                AccountMeta::new(*self.interaction.key, false),
                AccountMeta::new_readonly(*self.context_account.key, false),
                AccountMeta::new_readonly(*self.system_program.key, false),
            ],
            data: encode(INTERACT_WITH_LLM, &args)?,
        };

        let bump = [self.payer_bump];
        let seeds = Authority::Queue.signer_seeds(&bump);

        invoke_signed(
            &ix,
            &[
                self.payer.clone(),
                self.interaction.clone(),
                self.context_account.clone(),
                self.system_program.clone(),
            ],
            &[&seeds[..]],
        )?;
        Ok(())
    }
}
