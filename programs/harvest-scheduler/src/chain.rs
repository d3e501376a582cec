use anchor_lang::prelude::*;

use crate::errors::SchedulerError;
use crate::queue::{submit, RunTaskReturn, TaskQueue, TaskRequest, TaskReturn, Trigger};
use crate::state::{JobStatus, RecurringJob};

// ──────────────────────────────────────────────────────
// Task chains
//
// A job is a chain of tasks. Each task runs its payload and then
// hands its successor back to the queue as return data; the queue
// puts it in the free-task slot reserved for it. Every task
// carries the job's sequence number, so a task left over from an
// older chain finds a mismatch and does nothing.
//
//   Unscheduled ──arm──▶ Pending(n) ──run──▶ Pending(n+1)
//        ▲                   │  │  └─▶ Expired   (max chain age)
//        │                   │  └────▶ Stalled   (successor not handed off)
//        └── re-arm ◀────────┘────────▶ Cancelled (admin)
// ──────────────────────────────────────────────────────

/// Builds the task that runs one cycle of a job.
pub trait TaskBuilder {
    /// `sequence` is carried in the instruction data and checked when it runs.
    fn build(&self, sequence: u64, trigger: Trigger) -> TaskRequest;

    /// Worst-case compute of one cycle.
    fn required_compute(&self) -> u32;
}

/// A job's unit of work.
pub trait Payload: TaskBuilder {
    type Output;

    fn run(&mut self) -> Result<Self::Output>;
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum ChainFault {
    /// Queue authority is below the funding threshold
    Underfunded,
    /// Job's compute budget no longer covers a cycle
    InsufficientCompute,
    /// Successor does not fit in return data
    DescriptorTooLarge,
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Rearm {
    Queued {
        sequence: u64,
        run_at: i64,
        successor: TaskReturn,
    },
    Expired,
    Broken(ChainFault),
}

impl Rearm {
    /// What the running task hands back to the queue.
    pub fn into_return(self) -> RunTaskReturn {
        match self {
            Rearm::Queued { successor, .. } => RunTaskReturn::single(successor),
            Rearm::Expired | Rearm::Broken(_) => RunTaskReturn::default(),
        }
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Cycle<T> {
    /// Task no longer matches the job; nothing ran
    Stale,
    Completed { output: T, rearm: Rearm },
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct CycleEnv {
    pub now: i64,
    /// 0 disables expiry
    pub max_chain_age: i64,
    /// First ids accepted by the queue are `0..queue_capacity`
    pub queue_capacity: u16,
    /// Queue authority can pay for the successor
    pub funded: bool,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Armed {
    pub task_id: u16,
    pub sequence: u64,
}

/// Successor trigger, measured from the actual execution time.
pub fn next_trigger(now: i64, interval: i64) -> Result<(Trigger, i64)> {
    if interval <= 0 {
        return Ok((Trigger::Now, now));
    }
    let run_at = now.checked_add(interval).ok_or(SchedulerError::Overflow)?;
    Ok((Trigger::Timestamp(run_at), run_at))
}

/// Submits the first task of a chain under `task_id`. Failures are
/// returned to the operator, who can fix the cause and retry.
///
/// Arming bumps the sequence, so tasks of an earlier chain still
/// sitting on a queue turn stale.
pub fn arm<B: TaskBuilder, Q: TaskQueue>(
    job: &mut RecurringJob,
    task_queue: Pubkey,
    task_id: u16,
    builder: &B,
    queue: &mut Q,
    env: &CycleEnv,
) -> Result<Armed> {
    match job.status {
        JobStatus::Pending => return err!(SchedulerError::JobAlreadyScheduled),
        JobStatus::Cancelled => return err!(SchedulerError::JobCancelled),
        JobStatus::Unscheduled | JobStatus::Stalled | JobStatus::Expired => {}
    }
    require!(env.funded, SchedulerError::InsufficientFunding);
    require!(task_id < env.queue_capacity, SchedulerError::QueueCapacityExceeded);

    let sequence = job.sequence.checked_add(1).ok_or(SchedulerError::Overflow)?;
    let request = builder.build(sequence, Trigger::Now);
    submit(queue, task_id, request, builder.required_compute())?;

    job.status = JobStatus::Pending;
    job.task_queue = task_queue;
    job.armed_task_id = task_id;
    job.sequence = sequence;
    job.next_run_at = env.now;
    job.chain_started_at = env.now;

    Ok(Armed { task_id, sequence })
}

/// Runs one cycle: payload first, then the successor.
///
/// Once the payload has run the cycle never fails because of the
/// successor; a successor that cannot be handed off is reported as
/// `Rearm::Broken` and the job is left `Stalled`.
pub fn run_cycle<P: Payload>(
    job: &mut RecurringJob,
    sequence: u64,
    payload: &mut P,
    env: &CycleEnv,
) -> Result<Cycle<P::Output>> {
    if job.status != JobStatus::Pending || sequence != job.sequence {
        return Ok(Cycle::Stale);
    }
    require!(env.now >= job.next_run_at, SchedulerError::TriggerNotReached);

    let output = payload.run()?;

    job.last_executed_at = env.now;
    job.cycles = job.cycles.checked_add(1).ok_or(SchedulerError::Overflow)?;

    let rearm = rearm(job, payload, env)?;
    match rearm {
        Rearm::Queued { .. } => {}
        Rearm::Expired => job.status = JobStatus::Expired,
        Rearm::Broken(_) => job.status = JobStatus::Stalled,
    }

    Ok(Cycle::Completed { output, rearm })
}

fn rearm<P: Payload>(job: &mut RecurringJob, payload: &P, env: &CycleEnv) -> Result<Rearm> {
    let age = env.now.saturating_sub(job.chain_started_at);
    if env.max_chain_age > 0 && age >= env.max_chain_age {
        return Ok(Rearm::Expired);
    }
    if !env.funded {
        return Ok(Rearm::Broken(ChainFault::Underfunded));
    }

    let sequence = job.sequence.checked_add(1).ok_or(SchedulerError::Overflow)?;
    let (trigger, run_at) = next_trigger(env.now, job.interval)?;
    let request = payload.build(sequence, trigger);
    if request.compute_budget < payload.required_compute() {
        return Ok(Rearm::Broken(ChainFault::InsufficientCompute));
    }

    let Ok(successor) = request.into_return() else {
        return Ok(Rearm::Broken(ChainFault::DescriptorTooLarge));
    };
    if !RunTaskReturn::single(successor.clone()).fits()? {
        return Ok(Rearm::Broken(ChainFault::DescriptorTooLarge));
    }

    job.sequence = sequence;
    job.next_run_at = run_at;

    Ok(Rearm::Queued {
        sequence,
        run_at,
        successor,
    })
}
