use std::collections::{BTreeMap, HashMap};

use anchor_lang::prelude::*;

use crate::authority::ProgramAddresses;
use crate::errors::SchedulerError;
use crate::fees::FeeRate;
use crate::chain::{run_cycle, Cycle, CycleEnv, Payload};
use crate::harvest::{harvest_compute_units, SourceSnapshot, SourceState, WithheldFees};
use crate::queue::{RunTaskReturn, TaskQueue, TaskRequest, TaskReturn, TransactionSource};
use crate::state::{JobKind, RecurringJob};
use crate::tasks::{HarvestPayload, HarvestTask, TaskContext};

// ============ ERROR HELPERS ============

pub fn code_of(err: anchor_lang::error::Error) -> u32 {
    match err {
        anchor_lang::error::Error::AnchorError(e) => e.error_code_number,
        anchor_lang::error::Error::ProgramError(_) => u32::MAX,
    }
}

pub fn code(err: SchedulerError) -> u32 {
    u32::from(err)
}

// ============ IN-MEMORY LEDGER ============

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Holding {
    pub mint: Pubkey,
    pub amount: u64,
    pub withheld: u64,
}

/// Token-2022 fee bookkeeping for one mint: fees are withheld on
/// the recipient, harvested to the mint, then withdrawn.
pub struct MockLedger {
    pub mint: Pubkey,
    pub rate: FeeRate,
    pub mint_withheld: u64,
    pub treasury: Pubkey,
    pub accounts: HashMap<Pubkey, Holding>,
    /// Harvest calls succeed without moving anything
    pub inert: bool,
}

impl MockLedger {
    pub fn new(rate: FeeRate) -> Self {
        let mint = Pubkey::new_unique();
        let treasury = Pubkey::new_unique();
        let mut accounts = HashMap::new();
        accounts.insert(
            treasury,
            Holding {
                mint,
                ..Holding::default()
            },
        );
        Self {
            mint,
            rate,
            mint_withheld: 0,
            treasury,
            accounts,
            inert: false,
        }
    }

    pub fn open_account(&mut self) -> Pubkey {
        let key = Pubkey::new_unique();
        self.accounts.insert(
            key,
            Holding {
                mint: self.mint,
                ..Holding::default()
            },
        );
        key
    }

    pub fn open_foreign_account(&mut self) -> Pubkey {
        let key = Pubkey::new_unique();
        self.accounts.insert(
            key,
            Holding {
                mint: Pubkey::new_unique(),
                amount: 0,
                withheld: 9,
            },
        );
        key
    }

    pub fn mint_to(&mut self, to: &Pubkey, amount: u64) {
        self.accounts.get_mut(to).unwrap().amount += amount;
    }

    pub fn transfer(&mut self, from: &Pubkey, to: &Pubkey, amount: u64) -> u64 {
        let fee = self.rate.fee_for(amount).unwrap();
        self.accounts.get_mut(from).unwrap().amount -= amount;
        let recipient = self.accounts.get_mut(to).unwrap();
        recipient.amount += amount - fee;
        recipient.withheld += fee;
        fee
    }

    pub fn holding(&self, key: &Pubkey) -> Holding {
        self.accounts[key]
    }

    pub fn treasury_balance(&self) -> u64 {
        self.holding(&self.treasury).amount
    }
}

impl WithheldFees for MockLedger {
    fn snapshot(&self, candidates: &[Pubkey]) -> Result<Vec<SourceSnapshot>> {
        Ok(candidates
            .iter()
            .map(|address| {
                let state = match self.accounts.get(address) {
                    None => SourceState::Missing,
                    Some(holding) if holding.mint != self.mint => SourceState::ForeignMint,
                    Some(holding) if holding.withheld == 0 => SourceState::Empty,
                    Some(holding) => SourceState::Withheld(holding.withheld),
                };
                SourceSnapshot {
                    address: *address,
                    state,
                }
            })
            .collect())
    }

    fn mint_withheld(&self) -> Result<u64> {
        Ok(self.mint_withheld)
    }

    fn harvest_to_mint(&mut self, sources: &[Pubkey]) -> Result<()> {
        if self.inert {
            return Ok(());
        }
        for source in sources {
            if let Some(holding) = self.accounts.get_mut(source) {
                if holding.mint == self.mint {
                    self.mint_withheld += holding.withheld;
                    holding.withheld = 0;
                }
            }
        }
        Ok(())
    }

    fn withdraw_to_treasury(&mut self) -> Result<u64> {
        let amount = self.mint_withheld;
        self.mint_withheld = 0;
        self.accounts.get_mut(&self.treasury).unwrap().amount += amount;
        Ok(amount)
    }
}

// ============ IN-MEMORY QUEUE ============

/// Task queue keyed by id. A task is live from submission until it
/// is cranked. What a cranked task returns goes into the lowest free
/// ids, at most one per free-task slot the task reserved.
pub struct MockQueue {
    pub tasks: BTreeMap<u16, TaskReturn>,
    pub capacity: u16,
    pub reject: bool,
}

impl Default for MockQueue {
    fn default() -> Self {
        Self {
            tasks: BTreeMap::new(),
            capacity: 16,
            reject: false,
        }
    }
}

impl MockQueue {
    pub fn crank(&mut self, task_id: u16) -> TaskReturn {
        self.tasks.remove(&task_id).expect("task is not on the queue")
    }

    pub fn accept(&mut self, ran: &TaskReturn, returned: RunTaskReturn) -> Vec<u16> {
        let mut placed = Vec::new();
        for task in returned.tasks.into_iter().take(ran.free_tasks as usize) {
            let id = (0..self.capacity)
                .find(|id| !self.tasks.contains_key(id))
                .expect("queue is full");
            self.tasks.insert(id, task);
            placed.push(id);
        }
        placed
    }

    pub fn live_ids(&self) -> Vec<u16> {
        self.tasks.keys().copied().collect()
    }
}

impl TaskQueue for MockQueue {
    fn is_live(&self, task_id: u16) -> bool {
        self.tasks.contains_key(&task_id)
    }

    fn queue(&mut self, task_id: u16, request: TaskRequest) -> Result<()> {
        require!(!self.reject, SchedulerError::QueueCapacityExceeded);
        require!(
            !self.tasks.contains_key(&task_id),
            SchedulerError::DuplicateTaskId
        );
        self.tasks.insert(task_id, request.into_return()?);
        Ok(())
    }
}

/// Sequence number a compiled task will present to its job.
pub fn sequence_of(task: &TaskReturn) -> u64 {
    let ix = scheduler_instruction(task);
    u64::from_le_bytes(ix.data[8..16].try_into().unwrap())
}

pub fn accounts_of(task: &TaskReturn) -> Vec<Pubkey> {
    let TransactionSource::CompiledV0(tx) = &task.transaction else {
        panic!("expected a compiled transaction");
    };
    tx.accounts.clone()
}

fn scheduler_instruction(task: &TaskReturn) -> &crate::queue::CompiledInstruction {
    let TransactionSource::CompiledV0(tx) = &task.transaction else {
        panic!("expected a compiled transaction");
    };
    tx.instructions
        .iter()
        .find(|ix| tx.accounts[ix.program_id_index as usize] == crate::ID)
        .expect("task does not call this program")
}

/// Cranks `task_id` the way the queue does: run it, then place
/// whatever it handed back. Returns the cycle and the new ids.
pub fn crank_cycle<P: Payload>(
    queue: &mut MockQueue,
    job: &mut RecurringJob,
    payload: &mut P,
    task_id: u16,
    env: &CycleEnv,
) -> Result<(Cycle<P::Output>, Vec<u16>)> {
    let task = queue.crank(task_id);
    let cycle = run_cycle(job, sequence_of(&task), payload, env)?;
    let returned = match &cycle {
        Cycle::Completed { rearm, .. } => rearm.clone().into_return(),
        Cycle::Stale => RunTaskReturn::default(),
    };
    let placed = queue.accept(&task, returned);
    Ok((cycle, placed))
}

// ============ JOB SETUP ============

pub fn task_context() -> TaskContext {
    let addresses = ProgramAddresses::derive(&crate::ID);
    TaskContext {
        config: addresses.config.0,
        queue_authority: addresses.queue_authority.0,
        crank_reward: 1_000_000,
    }
}

pub fn harvest_job(ledger: &MockLedger, sources: Vec<Pubkey>, interval: i64) -> RecurringJob {
    let compute_budget = harvest_compute_units(sources.len());
    let mut job = RecurringJob::new(JobKind::Harvest, ledger.mint, interval, compute_budget, 255);
    job.treasury = ledger.treasury;
    job.sources = sources;
    job
}

pub fn harvest_payload(ledger: MockLedger, job: &RecurringJob) -> HarvestPayload<MockLedger> {
    let addresses = ProgramAddresses::derive(&crate::ID);
    HarvestPayload {
        task: HarvestTask::for_job(
            task_context(),
            Pubkey::new_unique(),
            job,
            addresses.fee_authority.0,
        ),
        ledger,
    }
}

/// 5% fee capped at 1000, the rate used throughout.
pub fn five_percent() -> FeeRate {
    FeeRate::new(500, 1_000).unwrap()
}
