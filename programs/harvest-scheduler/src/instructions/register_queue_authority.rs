use anchor_lang::prelude::*;

use crate::authority::{task_queue_authority_address, QUEUE_AUTHORITY_SEED};
use crate::errors::SchedulerError;
use crate::events::QueueAuthorityRegistered;
use crate::queue::{is_registered, plan_registration, AddQueueAuthority, RegistrationOutcome};
use crate::state::config::SchedulerConfig;

// ──────────────────────────────────────────────────────
// Register Queue Authority: one-time handshake
//
// Authorizes the queue authority PDA as a task creator on the
// configured task queue. The queue's own update authority must
// co-sign. Re-running it is harmless: an existing record is
// reported and left alone, unless `require_fresh` is set.
// ──────────────────────────────────────────────────────

#[derive(Accounts)]
pub struct RegisterQueueAuthority<'info> {
    /// Scheduler admin, pays for the registration record
    #[account(mut)]
    pub admin: Signer<'info>,

    /// Update authority of the task queue
    pub update_authority: Signer<'info>,

    #[account(
        seeds = [SchedulerConfig::SEED],
        bump = config.bump,
    )]
    pub config: Account<'info, SchedulerConfig>,

    /// CHECK: PDA being registered, no data
    #[account(
        seeds = [QUEUE_AUTHORITY_SEED],
        bump = config.queue_authority_bump,
    )]
    pub queue_authority: UncheckedAccount<'info>,

    /// CHECK: Registration record, created by the queue program
    #[account(
        mut,
        constraint = task_queue_authority.key() == task_queue_authority_address(
            &config.queue_program,
            &config.task_queue,
            &queue_authority.key(),
        ) @ SchedulerError::TaskAccountMismatch,
    )]
    pub task_queue_authority: UncheckedAccount<'info>,

    /// CHECK: Validated by the queue program
    #[account(
        mut,
        address = config.task_queue @ SchedulerError::InvalidTaskQueue,
    )]
    pub task_queue: UncheckedAccount<'info>,

    /// CHECK: Address checked against config
    #[account(address = config.queue_program @ SchedulerError::InvalidQueueProgram)]
    pub queue_program: UncheckedAccount<'info>,

    pub system_program: Program<'info, System>,
}

pub fn handler(ctx: Context<RegisterQueueAuthority>, require_fresh: bool) -> Result<()> {
    let accounts = &ctx.accounts;
    let record = accounts.task_queue_authority.to_account_info();

    let outcome = plan_registration(
        accounts.admin.key() == accounts.config.admin,
        is_registered(&accounts.config.queue_program, &record),
    );

    match outcome {
        RegistrationOutcome::Denied => return err!(SchedulerError::Unauthorized),
        RegistrationOutcome::AlreadyPresent => {
            require!(!require_fresh, SchedulerError::AlreadyRegistered);
            msg!("Queue authority already registered on {}", accounts.task_queue.key());
        }
        RegistrationOutcome::Created => {
            let queue_program = accounts.queue_program.to_account_info();
            let payer = accounts.admin.to_account_info();
            let update_authority = accounts.update_authority.to_account_info();
            let queue_authority = accounts.queue_authority.to_account_info();
            let task_queue = accounts.task_queue.to_account_info();
            let system_program = accounts.system_program.to_account_info();

            AddQueueAuthority {
                queue_program: &queue_program,
                payer: &payer,
                update_authority: &update_authority,
                queue_authority: &queue_authority,
                task_queue_authority: &record,
                task_queue: &task_queue,
                system_program: &system_program,
            }
            .invoke()?;
            msg!("Queue authority registered on {}", accounts.task_queue.key());
        }
    }

    emit!(QueueAuthorityRegistered {
        task_queue: accounts.task_queue.key(),
        queue_authority: accounts.queue_authority.key(),
        created: outcome == RegistrationOutcome::Created,
    });

    Ok(())
}
