use anchor_lang::prelude::*;
use spl_discriminator::SplDiscriminate;
use spl_transfer_hook_interface::instruction::ExecuteInstruction;

pub mod errors;
pub mod events;
pub mod gate;
pub mod instructions;
pub mod state;


use instructions::*;

declare_id!("GateHook111111111111111111111111111111111111");

#[program]
pub mod transfer_gate {
    use super::*;

    // ──────────────────────────────────────────────────────
    // GATE ADMIN
    // ──────────────────────────────────────────────────────

    /// Create the gate config for a mint. The signer becomes admin.
    pub fn initialize_gate(ctx: Context<InitializeGate>) -> Result<()> {
        instructions::initialize_gate::handler(ctx)
    }

    pub fn update_gate_admin(ctx: Context<UpdateGateAdmin>, new_admin: Pubkey) -> Result<()> {
        instructions::update_gate_admin::handler(ctx, new_admin)
    }

    /// Publish the extra account the hook resolves on each transfer.
    pub fn initialize_extra_account_metas(ctx: Context<InitializeExtraAccountMetas>) -> Result<()> {
        instructions::initialize_extra_account_metas::handler(ctx)
    }

    // ──────────────────────────────────────────────────────
    // ALLOW-LIST
    // ──────────────────────────────────────────────────────

    pub fn add_to_whitelist(ctx: Context<AddToWhitelist>) -> Result<()> {
        instructions::add_to_whitelist::handler(ctx)
    }

    pub fn remove_from_whitelist(ctx: Context<RemoveFromWhitelist>) -> Result<()> {
        instructions::remove_from_whitelist::handler(ctx)
    }

    // ──────────────────────────────────────────────────────
    // HOOK
    // ──────────────────────────────────────────────────────

    /// Token-2022 execute entry point.
    #[instruction(discriminator = ExecuteInstruction::SPL_DISCRIMINATOR_SLICE)]
    pub fn transfer_hook(ctx: Context<TransferHook>, amount: u64) -> Result<()> {
        instructions::transfer_hook::handler(ctx, amount)
    }
}
