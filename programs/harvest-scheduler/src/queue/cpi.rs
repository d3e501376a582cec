use anchor_lang::prelude::*;
use anchor_lang::solana_program::{
    instruction::{AccountMeta, Instruction},
    program::invoke_signed,
};

use super::{TaskQueue, TaskRequest, ADD_QUEUE_AUTHORITY_V0, QUEUE_TASK_V0};
use crate::authority::{task_address, Authority};
use crate::errors::SchedulerError;

// ──────────────────────────────────────────────────────
// Queue program CPIs: built by hand from the wire types,
// signed by the queue authority PDA
// ──────────────────────────────────────────────────────

/// Whether the queue program holds a registration record at `record`.
pub fn is_registered(queue_program: &Pubkey, record: &AccountInfo) -> bool {
    record.owner == queue_program && !record.data_is_empty()
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RegistrationOutcome {
    Created,
    AlreadyPresent,
    Denied,
}

/// Decides a registration before anything is written.
pub fn plan_registration(caller_is_update_authority: bool, record_exists: bool) -> RegistrationOutcome {
    if !caller_is_update_authority {
        RegistrationOutcome::Denied
    } else if record_exists {
        RegistrationOutcome::AlreadyPresent
    } else {
        RegistrationOutcome::Created
    }
}

pub struct AddQueueAuthority<'a, 'info> {
    pub queue_program: &'a AccountInfo<'info>,
    pub payer: &'a AccountInfo<'info>,
    pub update_authority: &'a AccountInfo<'info>,
    pub queue_authority: &'a AccountInfo<'info>,
    pub task_queue_authority: &'a AccountInfo<'info>,
    pub task_queue: &'a AccountInfo<'info>,
    pub system_program: &'a AccountInfo<'info>,
}

impl<'a, 'info> AddQueueAuthority<'a, 'info> {
    pub fn invoke(&self) -> Result<()> {
        let ix = Instruction {
            program_id: *self.queue_program.key,
            accounts: vec![
                AccountMeta::new(*self.payer.key, true),
                AccountMeta::new_readonly(*self.update_authority.key, true),
                AccountMeta::new_readonly(*self.queue_authority.key, false),
                AccountMeta::new(*self.task_queue_authority.key, false),
                AccountMeta::new(*self.task_queue.key, false),
                AccountMeta::new_readonly(*self.system_program.key, false),
            ],
            data: ADD_QUEUE_AUTHORITY_V0.to_vec(),
        };

        invoke_signed(
            &ix,
            &[
                self.payer.clone(),
                self.update_authority.clone(),
                self.queue_authority.clone(),
                self.task_queue_authority.clone(),
                self.task_queue.clone(),
                self.system_program.clone(),
            ],
            &[],
        )?;
        Ok(())
    }
}

/// The shared task queue, reached through CPI from a top-level
/// instruction only.
///
/// Only the task account supplied in `task` can be checked or
/// written; any other id is reported as not live and rejected
/// on submission.
pub struct QueueCpi<'a, 'info> {
    pub queue_program: &'a AccountInfo<'info>,
    pub payer: &'a AccountInfo<'info>,
    pub queue_authority: &'a AccountInfo<'info>,
    pub queue_authority_bump: u8,
    pub task_queue_authority: &'a AccountInfo<'info>,
    pub task_queue: &'a AccountInfo<'info>,
    pub task: &'a AccountInfo<'info>,
    pub system_program: &'a AccountInfo<'info>,
}

impl<'a, 'info> QueueCpi<'a, 'info> {
    fn task_key(&self, task_id: u16) -> Pubkey {
        task_address(self.queue_program.key, self.task_queue.key, task_id)
    }
}

impl<'a, 'info> TaskQueue for QueueCpi<'a, 'info> {
    fn is_live(&self, task_id: u16) -> bool {
        self.task_key(task_id) == *self.task.key && !self.task.data_is_empty()
    }

    fn queue(&mut self, task_id: u16, request: TaskRequest) -> Result<()> {
        require_keys_eq!(
            self.task_key(task_id),
            *self.task.key,
            SchedulerError::TaskAccountMismatch
        );
        require!(
            is_registered(self.queue_program.key, self.task_queue_authority),
            SchedulerError::UnauthorizedSubmitter
        );

        let args = request.into_args(task_id)?;
        let mut data = QUEUE_TASK_V0.to_vec();
        args.serialize(&mut data)
            .map_err(|_| SchedulerError::CompileTransactionFailed)?;

        let ix = Instruction {
            program_id: *self.queue_program.key,
            accounts: vec![
                AccountMeta::new(*self.payer.key, true),
                AccountMeta::new_readonly(*self.queue_authority.key, true),
                AccountMeta::new_readonly(*self.task_queue_authority.key, false),
                AccountMeta::new(*self.task_queue.key, false),
                AccountMeta::new(*self.task.key, false),
                AccountMeta::new_readonly(*self.system_program.key, false),
            ],
            data,
        };

        let bump = [self.queue_authority_bump];
        let seeds = Authority::Queue.signer_seeds(&bump);

        invoke_signed(
            &ix,
            &[
                self.payer.clone(),
                self.queue_authority.clone(),
                self.task_queue_authority.clone(),
                self.task_queue.clone(),
                self.task.clone(),
                self.system_program.clone(),
            ],
            &[&seeds[..]],
        )?;

        msg!("Task {} queued on {}", task_id, self.task_queue.key);
        Ok(())
    }
}
