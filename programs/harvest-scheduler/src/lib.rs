use anchor_lang::prelude::*;

pub mod authority;
pub mod chain;
pub mod errors;
pub mod events;
pub mod fees;
pub mod funding;
pub mod harvest;
pub mod instructions;
pub mod oracle;
pub mod queue;
pub mod state;
pub mod tasks;

#[cfg(test)]
mod tests;

use instructions::*;
use queue::RunTaskReturn;

declare_id!("HrvstSchd11111111111111111111111111111111111");

#[program]
pub mod harvest_scheduler {
    use super::*;

    // ──────────────────────────────────────────────────────
    // SCHEDULER ADMIN
    // ──────────────────────────────────────────────────────

    /// Initialize the scheduler config and derive both authorities.
    /// Called once by the deployer.
    pub fn initialize_scheduler(
        ctx: Context<InitializeScheduler>,
        params: SchedulerParams,
    ) -> Result<()> {
        instructions::initialize_config::handler(ctx, params)
    }

    /// Update scheduler config. Admin only.
    /// All fields are optional, pass None to keep current value.
    pub fn update_scheduler_config(
        ctx: Context<UpdateSchedulerConfig>,
        update: ConfigUpdate,
    ) -> Result<()> {
        instructions::update_config::handler(ctx, update)
    }

    // ──────────────────────────────────────────────────────
    // MINT & TREASURY
    // ──────────────────────────────────────────────────────

    /// Create a Token-2022 mint with the transfer fee extension, and
    /// optionally a transfer hook. The fee authority PDA holds both
    /// fee authorities.
    pub fn init_mint(
        ctx: Context<InitMint>,
        decimals: u8,
        transfer_fee_basis_points: u16,
        maximum_fee: u64,
        transfer_hook_program: Option<Pubkey>,
    ) -> Result<()> {
        instructions::init_mint::handler(
            ctx,
            decimals,
            transfer_fee_basis_points,
            maximum_fee,
            transfer_hook_program,
        )
    }

    pub fn init_treasury(ctx: Context<InitTreasury>) -> Result<()> {
        instructions::init_treasury::handler(ctx)
    }

    pub fn mint_to(ctx: Context<MintTokens>, amount: u64) -> Result<()> {
        instructions::mint_to::handler(ctx, amount)
    }

    /// Transfer with the current epoch's fee withheld on the recipient.
    /// Transfer hook extra accounts follow as remaining accounts.
    pub fn transfer<'info>(
        ctx: Context<'_, '_, 'info, 'info, Transfer<'info>>,
        amount: u64,
    ) -> Result<()> {
        instructions::transfer::handler(ctx, amount)
    }

    /// Stage a new fee rate. Active two epochs from now.
    pub fn update_fee(
        ctx: Context<UpdateFee>,
        transfer_fee_basis_points: u16,
        maximum_fee: u64,
    ) -> Result<()> {
        instructions::update_fee::handler(ctx, transfer_fee_basis_points, maximum_fee)
    }

    /// Sweep withheld fees from the given holder accounts into the
    /// treasury. Returns the amount swept from those accounts.
    pub fn harvest<'info>(ctx: Context<'_, '_, 'info, 'info, Harvest<'info>>) -> Result<u64> {
        instructions::harvest_fees::handler(ctx)
    }

    // ──────────────────────────────────────────────────────
    // QUEUE SETUP
    // ──────────────────────────────────────────────────────

    /// Authorize the queue authority PDA on the task queue.
    pub fn register_queue_authority(
        ctx: Context<RegisterQueueAuthority>,
        require_fresh: bool,
    ) -> Result<()> {
        instructions::register_queue_authority::handler(ctx, require_fresh)
    }

    /// Top up the queue authority. Permissionless.
    pub fn fund_queue_authority(ctx: Context<FundQueueAuthority>) -> Result<u64> {
        instructions::fund_queue_authority::handler(ctx)
    }

    // ──────────────────────────────────────────────────────
    // RECURRING JOBS
    // ──────────────────────────────────────────────────────

    /// Create a recurring harvest job for a mint.
    /// Source holder accounts follow as remaining accounts.
    pub fn create_harvest_job(
        ctx: Context<CreateHarvestJob>,
        interval: i64,
        compute_budget: u32,
    ) -> Result<()> {
        instructions::create_harvest_job::handler(ctx, interval, compute_budget)
    }

    /// Create a recurring oracle query job with a fresh oracle context.
    pub fn create_oracle_job(
        ctx: Context<CreateOracleJob>,
        context_text: String,
        query: String,
        interval: i64,
        compute_budget: u32,
    ) -> Result<()> {
        instructions::create_oracle_job::handler(ctx, context_text, query, interval, compute_budget)
    }

    /// Queue the first task of a job's chain.
    pub fn schedule_job(ctx: Context<ScheduleJob>, task_id: u16) -> Result<()> {
        instructions::schedule_job::handler(ctx, task_id)
    }

    /// Admin stops a job. Tasks already queued become no-ops.
    pub fn cancel_job(ctx: Context<CancelJob>) -> Result<()> {
        instructions::cancel_job::handler(ctx)
    }

    // ──────────────────────────────────────────────────────
    // TASK PAYLOADS: executed by the queue
    //
    // Both return the next task of the chain (or nothing) for the
    // queue to place in the running task's free slot.
    // ──────────────────────────────────────────────────────

    pub fn execute_harvest_job<'info>(
        ctx: Context<'_, '_, 'info, 'info, ExecuteHarvestJob<'info>>,
        sequence: u64,
    ) -> Result<RunTaskReturn> {
        instructions::execute_harvest_job::handler(ctx, sequence)
    }

    pub fn execute_oracle_job(ctx: Context<ExecuteOracleJob>, sequence: u64) -> Result<RunTaskReturn> {
        instructions::execute_oracle_job::handler(ctx, sequence)
    }

    /// Called by the oracle with the answer to the last query.
    pub fn oracle_callback(ctx: Context<OracleCallback>, response: String) -> Result<()> {
        instructions::oracle_callback::handler(ctx, response)
    }
}
