use anchor_lang::prelude::*;

use crate::errors::SchedulerError;

// ──────────────────────────────────────────────────────
// Derived authorities: program-controlled signers
//
// Every signer this program uses is a PDA of a fixed seed.
// No key pair exists; signing is proven by re-deriving the
// address inside `invoke_signed`. Off-chain setup code uses
// the same functions to predict the addresses.
// ──────────────────────────────────────────────────────

pub const FEE_AUTHORITY_SEED: &[u8] = b"fee_authority";
pub const QUEUE_AUTHORITY_SEED: &[u8] = b"queue_authority";
pub const JOB_SEED: &[u8] = b"job";
pub const ORACLE_STATE_SEED: &[u8] = b"oracle_state";

/// Seeds used by the task queue program for its own records.
pub const TASK_SEED: &[u8] = b"task";
pub const TASK_QUEUE_AUTHORITY_SEED: &[u8] = b"task_queue_authority";

/// Seed of the oracle's signing identity (owned by the oracle program).
pub const ORACLE_IDENTITY_SEED: &[u8] = b"identity";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Authority {
    /// Withdraw-withheld and fee-config authority of the mint
    Fee,
    /// Task creator on the shared task queue; pays successor tasks
    Queue,
}

impl Authority {
    pub const fn seed(self) -> &'static [u8] {
        match self {
            Authority::Fee => FEE_AUTHORITY_SEED,
            Authority::Queue => QUEUE_AUTHORITY_SEED,
        }
    }

    pub fn derive(self, program_id: &Pubkey) -> (Pubkey, u8) {
        Pubkey::find_program_address(&[self.seed()], program_id)
    }

    /// The address this authority signs as.
    pub fn sign_for(self, program_id: &Pubkey) -> Pubkey {
        self.derive(program_id).0
    }

    /// Re-creates the address from a stored bump, without a search.
    pub fn address_with_bump(self, bump: u8, program_id: &Pubkey) -> Result<Pubkey> {
        Pubkey::create_program_address(&[self.seed(), &[bump]], program_id)
            .map_err(|_| error!(SchedulerError::InvalidAuthority))
    }

    /// Seeds for `invoke_signed`. `bump` must be the canonical bump.
    pub fn signer_seeds(self, bump: &[u8; 1]) -> [&[u8]; 2] {
        [self.seed(), bump]
    }
}

/// Every fixed address of a deployment, derived once from the program id.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProgramAddresses {
    pub program_id: Pubkey,
    pub fee_authority: (Pubkey, u8),
    pub queue_authority: (Pubkey, u8),
    pub config: (Pubkey, u8),
}

impl ProgramAddresses {
    pub fn derive(program_id: &Pubkey) -> Self {
        Self {
            program_id: *program_id,
            fee_authority: Authority::Fee.derive(program_id),
            queue_authority: Authority::Queue.derive(program_id),
            config: Pubkey::find_program_address(
                &[crate::state::SchedulerConfig::SEED],
                program_id,
            ),
        }
    }

    pub fn job(&self, target: &Pubkey) -> (Pubkey, u8) {
        job_address(&self.program_id, target)
    }

    pub fn task_queue_authority(&self, queue_program: &Pubkey, task_queue: &Pubkey) -> Pubkey {
        task_queue_authority_address(queue_program, task_queue, &self.queue_authority.0)
    }
}

pub fn job_address(program_id: &Pubkey, target: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[JOB_SEED, target.as_ref()], program_id)
}

pub fn oracle_state_address(program_id: &Pubkey, context: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[ORACLE_STATE_SEED, context.as_ref()], program_id)
}

/// Proof-of-registration record kept by the queue program.
pub fn task_queue_authority_address(
    queue_program: &Pubkey,
    task_queue: &Pubkey,
    queue_authority: &Pubkey,
) -> Pubkey {
    Pubkey::find_program_address(
        &[
            TASK_QUEUE_AUTHORITY_SEED,
            task_queue.as_ref(),
            queue_authority.as_ref(),
        ],
        queue_program,
    )
    .0
}

pub fn task_address(queue_program: &Pubkey, task_queue: &Pubkey, task_id: u16) -> Pubkey {
    Pubkey::find_program_address(
        &[TASK_SEED, task_queue.as_ref(), &task_id.to_le_bytes()],
        queue_program,
    )
    .0
}

pub fn oracle_identity_address(oracle_program: &Pubkey) -> Pubkey {
    Pubkey::find_program_address(&[ORACLE_IDENTITY_SEED], oracle_program).0
}
