use anchor_lang::prelude::*;

use super::harness::*;
use crate::chain::{arm, run_cycle, ChainFault, Cycle, CycleEnv, Payload, Rearm, TaskBuilder};
use crate::errors::SchedulerError;
use crate::queue::{TaskRequest, Trigger, CHAIN_FREE_TASKS};
use crate::state::{JobStatus, RecurringJob};
use crate::tasks::HarvestPayload;

fn env(now: i64) -> CycleEnv {
    CycleEnv {
        now,
        max_chain_age: 0,
        queue_capacity: 16,
        funded: true,
    }
}

/// A ledger with 5 withheld on one holder, and a job sweeping it.
fn setup(interval: i64) -> (RecurringJob, HarvestPayload<MockLedger>, Pubkey) {
    let mut ledger = MockLedger::new(five_percent());
    let alice = ledger.open_account();
    let bob = ledger.open_account();
    ledger.mint_to(&alice, 1_000);
    ledger.transfer(&alice, &bob, 100);

    let job = harvest_job(&ledger, vec![alice, bob], interval);
    let payload = harvest_payload(ledger, &job);
    (job, payload, bob)
}

fn task_queue() -> Pubkey {
    Pubkey::new_unique()
}

// ============ SELF-RESCHEDULING ============

#[test]
fn first_task_harvests_and_hands_off_the_second() {
    let (mut job, mut payload, bob) = setup(0);
    let mut queue = MockQueue::default();
    let tq = task_queue();

    let armed = arm(&mut job, tq, 1, &payload, &mut queue, &env(1_000)).unwrap();
    assert_eq!(queue.live_ids(), vec![1]);
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.task_queue, tq);
    assert_eq!(job.armed_task_id, 1);
    assert_eq!(armed.sequence, 1);
    assert_eq!(queue.tasks[&1].trigger, Trigger::Now);
    assert_eq!(queue.tasks[&1].free_tasks, CHAIN_FREE_TASKS);

    let (cycle, placed) = crank_cycle(&mut queue, &mut job, &mut payload, 1, &env(1_000)).unwrap();
    let Cycle::Completed { output, rearm } = cycle else {
        panic!("cycle should have run");
    };

    assert_eq!(output.amount, 5);
    assert_eq!(payload.ledger.treasury_balance(), 5);
    assert_eq!(payload.ledger.holding(&bob).withheld, 0);
    assert!(matches!(rearm, Rearm::Queued { sequence: 2, .. }));
    assert_eq!(placed.len(), 1);
    assert_eq!(sequence_of(&queue.tasks[&placed[0]]), 2);
    assert_eq!(job.sequence, 2);
    assert_eq!(job.cycles, 1);
}

#[test]
fn chain_keeps_running_through_its_own_slots() {
    let (mut job, mut payload, _) = setup(0);
    let mut queue = MockQueue::default();
    arm(&mut job, task_queue(), 4, &payload, &mut queue, &env(0)).unwrap();

    let mut next = 4;
    for cycle in 1..=5 {
        let (_, placed) = crank_cycle(&mut queue, &mut job, &mut payload, next, &env(cycle)).unwrap();
        assert_eq!(placed.len(), 1);
        assert_eq!(queue.live_ids(), placed);
        next = placed[0];
    }

    assert_eq!(job.cycles, 5);
    assert_eq!(job.sequence, 6);
    assert_eq!(sequence_of(&queue.tasks[&next]), 6);
    // only the first sweep found anything
    assert_eq!(payload.ledger.treasury_balance(), 5);
}

#[test]
fn handed_off_task_names_every_account_it_needs() {
    let (mut job, mut payload, bob) = setup(0);
    let mut queue = MockQueue::default();
    arm(&mut job, task_queue(), 0, &payload, &mut queue, &env(0)).unwrap();

    let (_, placed) = crank_cycle(&mut queue, &mut job, &mut payload, 0, &env(0)).unwrap();
    let accounts = accounts_of(&queue.tasks[&placed[0]]);
    assert!(accounts.contains(&bob));
    assert!(accounts.contains(&job.target));
    assert!(accounts.contains(&job.treasury));
    assert!(accounts.contains(&crate::ID));
}

#[test]
fn successor_trigger_is_measured_from_execution() {
    let (mut job, mut payload, _) = setup(60);
    let mut queue = MockQueue::default();
    arm(&mut job, task_queue(), 0, &payload, &mut queue, &env(1_000)).unwrap();

    // Cranked late: the next run is 60s after this one, not after 1_000.
    let (_, placed) = crank_cycle(&mut queue, &mut job, &mut payload, 0, &env(1_030)).unwrap();
    assert_eq!(queue.tasks[&placed[0]].trigger, Trigger::Timestamp(1_090));
    assert_eq!(job.next_run_at, 1_090);
}

#[test]
fn early_execution_is_rejected() {
    let (mut job, mut payload, _) = setup(60);
    let mut queue = MockQueue::default();
    arm(&mut job, task_queue(), 0, &payload, &mut queue, &env(1_000)).unwrap();
    crank_cycle(&mut queue, &mut job, &mut payload, 0, &env(1_000)).unwrap();

    let sequence = job.sequence;
    let err = run_cycle(&mut job, sequence, &mut payload, &env(1_030)).unwrap_err();
    assert_eq!(code_of(err), code(SchedulerError::TriggerNotReached));
    assert_eq!(job.cycles, 1);
}

// ============ FIRST TASK ============

#[test]
fn live_task_id_is_not_overwritten() {
    let (mut job, payload, _) = setup(0);
    let mut queue = MockQueue::default();
    let original = payload.build(9, Trigger::Timestamp(10)).into_return().unwrap();
    queue.tasks.insert(5, original.clone());

    let err = arm(&mut job, task_queue(), 5, &payload, &mut queue, &env(0)).unwrap_err();

    assert_eq!(code_of(err), code(SchedulerError::DuplicateTaskId));
    assert_eq!(queue.tasks[&5], original);
    assert_eq!(job.status, JobStatus::Unscheduled);
    assert_eq!(job.sequence, 0);
}

#[test]
fn first_id_outside_the_queue_is_rejected() {
    let (mut job, payload, _) = setup(0);
    let mut queue = MockQueue::default();

    let err = arm(&mut job, task_queue(), 16, &payload, &mut queue, &env(0)).unwrap_err();

    assert_eq!(code_of(err), code(SchedulerError::QueueCapacityExceeded));
    assert!(queue.tasks.is_empty());
    assert_eq!(job.status, JobStatus::Unscheduled);
}

#[test]
fn refused_first_task_leaves_the_job_unscheduled() {
    let (mut job, payload, _) = setup(0);
    let mut queue = MockQueue {
        reject: true,
        ..MockQueue::default()
    };

    assert!(arm(&mut job, task_queue(), 0, &payload, &mut queue, &env(0)).is_err());
    assert_eq!(job.status, JobStatus::Unscheduled);
    assert_eq!(job.task_queue, Pubkey::default());
}

#[test]
fn pending_job_cannot_be_armed_twice() {
    let (mut job, payload, _) = setup(0);
    let mut queue = MockQueue::default();
    arm(&mut job, task_queue(), 0, &payload, &mut queue, &env(0)).unwrap();

    let err = arm(&mut job, task_queue(), 4, &payload, &mut queue, &env(0)).unwrap_err();
    assert_eq!(code_of(err), code(SchedulerError::JobAlreadyScheduled));
    assert_eq!(queue.live_ids(), vec![0]);
}

// ============ STALE / EXPIRED / BROKEN ============

#[test]
fn stale_sequence_is_a_no_op() {
    let (mut job, mut payload, bob) = setup(0);
    let mut queue = MockQueue::default();
    arm(&mut job, task_queue(), 0, &payload, &mut queue, &env(0)).unwrap();

    let cycle = run_cycle(&mut job, 7, &mut payload, &env(0)).unwrap();
    assert!(matches!(cycle, Cycle::Stale));
    assert_eq!(payload.ledger.holding(&bob).withheld, 5);
    assert_eq!(job.cycles, 0);
}

#[test]
fn rearming_turns_leftover_tasks_stale() {
    let (mut job, mut payload, _) = setup(0);
    let mut queue = MockQueue::default();
    arm(&mut job, task_queue(), 0, &payload, &mut queue, &env(0)).unwrap();
    let leftover = queue.tasks[&0].clone();

    let mut late = env(100);
    late.max_chain_age = 50;
    crank_cycle(&mut queue, &mut job, &mut payload, 0, &late).unwrap();
    assert_eq!(job.status, JobStatus::Expired);

    arm(&mut job, task_queue(), 3, &payload, &mut queue, &env(200)).unwrap();
    assert_eq!(job.sequence, 2);

    queue.tasks.insert(9, leftover);
    let (cycle, placed) = crank_cycle(&mut queue, &mut job, &mut payload, 9, &env(200)).unwrap();
    assert!(matches!(cycle, Cycle::Stale));
    assert!(placed.is_empty());
    assert_eq!(job.cycles, 1);
    assert_eq!(queue.live_ids(), vec![3]);
}

#[test]
fn cancelled_job_ends_the_chain() {
    let (mut job, mut payload, _) = setup(0);
    let mut queue = MockQueue::default();
    arm(&mut job, task_queue(), 0, &payload, &mut queue, &env(0)).unwrap();
    job.status = JobStatus::Cancelled;

    let (cycle, placed) = crank_cycle(&mut queue, &mut job, &mut payload, 0, &env(0)).unwrap();
    assert!(matches!(cycle, Cycle::Stale));
    assert!(placed.is_empty());
    assert!(queue.tasks.is_empty());

    let err = arm(&mut job, task_queue(), 0, &payload, &mut queue, &env(0)).unwrap_err();
    assert_eq!(code_of(err), code(SchedulerError::JobCancelled));
}

#[test]
fn old_chain_expires_after_running() {
    let (mut job, mut payload, _) = setup(0);
    let mut queue = MockQueue::default();
    arm(&mut job, task_queue(), 0, &payload, &mut queue, &env(0)).unwrap();

    let mut late = env(500);
    late.max_chain_age = 500;
    let (cycle, placed) = crank_cycle(&mut queue, &mut job, &mut payload, 0, &late).unwrap();

    let Cycle::Completed { output, rearm } = cycle else {
        panic!("cycle should have run");
    };
    assert_eq!(output.amount, 5);
    assert_eq!(rearm, Rearm::Expired);
    assert_eq!(job.status, JobStatus::Expired);
    assert!(placed.is_empty());
    assert!(queue.tasks.is_empty());
}

#[test]
fn underfunded_authority_breaks_then_rearm_recovers() {
    let (mut job, mut payload, _) = setup(0);
    let mut queue = MockQueue::default();
    arm(&mut job, task_queue(), 0, &payload, &mut queue, &env(0)).unwrap();

    let mut broke = env(10);
    broke.funded = false;
    let (cycle, placed) = crank_cycle(&mut queue, &mut job, &mut payload, 0, &broke).unwrap();
    assert!(matches!(
        cycle,
        Cycle::Completed {
            rearm: Rearm::Broken(ChainFault::Underfunded),
            ..
        }
    ));
    assert!(placed.is_empty());
    assert_eq!(job.status, JobStatus::Stalled);

    let err = arm(&mut job, task_queue(), 2, &payload, &mut queue, &broke).unwrap_err();
    assert_eq!(code_of(err), code(SchedulerError::InsufficientFunding));

    arm(&mut job, task_queue(), 2, &payload, &mut queue, &env(20)).unwrap();
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.chain_started_at, 20);
    assert_eq!(queue.live_ids(), vec![2]);
}

#[test]
fn shrunk_budget_breaks_the_chain() {
    let (mut job, mut payload, _) = setup(0);
    let mut queue = MockQueue::default();
    arm(&mut job, task_queue(), 0, &payload, &mut queue, &env(0)).unwrap();
    payload.task.compute_budget = 1;

    let (cycle, placed) = crank_cycle(&mut queue, &mut job, &mut payload, 0, &env(0)).unwrap();
    assert!(matches!(
        cycle,
        Cycle::Completed {
            rearm: Rearm::Broken(ChainFault::InsufficientCompute),
            ..
        }
    ));
    assert!(placed.is_empty());
    assert_eq!(job.status, JobStatus::Stalled);
    assert_eq!(job.sequence, 1);
}

/// Touches more accounts than return data can carry.
struct WidePayload {
    accounts: Vec<Pubkey>,
}

impl TaskBuilder for WidePayload {
    fn build(&self, sequence: u64, trigger: Trigger) -> TaskRequest {
        use anchor_lang::solana_program::instruction::{AccountMeta, Instruction};
        TaskRequest {
            trigger,
            instructions: vec![Instruction {
                program_id: crate::ID,
                accounts: self
                    .accounts
                    .iter()
                    .map(|key| AccountMeta::new_readonly(*key, false))
                    .collect(),
                data: [[0u8; 8], sequence.to_le_bytes()].concat(),
            }],
            compute_budget: 100,
            crank_reward: 0,
            free_tasks: CHAIN_FREE_TASKS,
            description: "wide".to_string(),
        }
    }

    fn required_compute(&self) -> u32 {
        100
    }
}

impl Payload for WidePayload {
    type Output = ();

    fn run(&mut self) -> Result<()> {
        Ok(())
    }
}

#[test]
fn successor_too_large_for_return_data_breaks_the_chain() {
    let (mut job, _, _) = setup(0);
    let mut payload = WidePayload {
        accounts: (0..40).map(|_| Pubkey::new_unique()).collect(),
    };
    let mut queue = MockQueue::default();
    arm(&mut job, task_queue(), 0, &payload, &mut queue, &env(0)).unwrap();

    let (cycle, placed) = crank_cycle(&mut queue, &mut job, &mut payload, 0, &env(0)).unwrap();
    assert_eq!(
        cycle,
        Cycle::Completed {
            output: (),
            rearm: Rearm::Broken(ChainFault::DescriptorTooLarge),
        }
    );
    assert!(placed.is_empty());
    assert_eq!(job.status, JobStatus::Stalled);
}

#[test]
fn failed_payload_leaves_the_job_untouched() {
    let (mut job, mut payload, _) = setup(0);
    let mut queue = MockQueue::default();
    arm(&mut job, task_queue(), 0, &payload, &mut queue, &env(0)).unwrap();
    payload.ledger.inert = true;

    let err = run_cycle(&mut job, 1, &mut payload, &env(0)).unwrap_err();
    assert_eq!(code_of(err), code(SchedulerError::HarvestMismatch));
    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.sequence, 1);
    assert_eq!(job.cycles, 0);
}
