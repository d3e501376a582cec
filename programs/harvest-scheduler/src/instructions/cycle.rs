use anchor_lang::prelude::*;

use crate::chain::Rearm;
use crate::events::{ChainBroken, ChainExpired, StaleTaskSkipped, TaskQueued};
use crate::state::RecurringJob;

// ──────────────────────────────────────────────────────
// Cycle reporting shared by the execute instructions
// ──────────────────────────────────────────────────────

pub fn report_stale(job_key: Pubkey, job: &RecurringJob, sequence: u64) {
    msg!(
        "Task #{} is stale for job {} (expected #{}), skipping",
        sequence,
        job_key,
        job.sequence,
    );
    emit!(StaleTaskSkipped {
        job: job_key,
        sequence,
        expected_sequence: job.sequence,
    });
}

/// `sequence` is the task that just ran.
pub fn report_rearm(rearm: &Rearm, job_key: Pubkey, job: &RecurringJob, sequence: u64, now: i64) {
    match rearm {
        Rearm::Queued {
            sequence: next,
            run_at,
            ..
        } => {
            msg!("Next cycle of {} is task #{} at {}", job_key, next, run_at);
            emit!(TaskQueued {
                job: job_key,
                task_queue: job.task_queue,
                task_id: None,
                sequence: *next,
                run_at: *run_at,
                compute_budget: job.compute_budget,
            });
        }
        Rearm::Expired => {
            msg!("Chain of {} expired after {} cycles", job_key, job.cycles);
            emit!(ChainExpired {
                job: job_key,
                cycles: job.cycles,
                chain_started_at: job.chain_started_at,
                expired_at: now,
            });
        }
        Rearm::Broken(fault) => {
            msg!("Chain of {} broken after task #{}: {:?}", job_key, sequence, fault);
            emit!(ChainBroken {
                job: job_key,
                sequence,
                fault: *fault,
                broken_at: now,
            });
        }
    }
}
