use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;
use anchor_lang::InstructionData;

use crate::authority::{oracle_state_address, Authority};
use crate::chain::{Payload, TaskBuilder};
use crate::harvest::{harvest, harvest_compute_units, HarvestReport, WithheldFees};
use crate::oracle::{interaction_address, OracleClient, ORACLE_QUERY_COMPUTE_UNITS};
use crate::queue::{TaskRequest, Trigger, CHAIN_FREE_TASKS, SUCCESSOR_COMPUTE_UNITS};
use crate::state::{JobKind, RecurringJob, SchedulerConfig};

// ──────────────────────────────────────────────────────
// Task payloads
//
// Each job kind knows how to describe its own next cycle as a
// task (the execute instruction plus every account it touches)
// and how to run one cycle. Tasks name no queue account: the
// queue that runs a task is the one its successor goes to.
// ──────────────────────────────────────────────────────

/// Addresses every queued task refers to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TaskContext {
    pub config: Pubkey,
    pub queue_authority: Pubkey,
    pub crank_reward: u64,
}

impl TaskContext {
    pub fn from_config(config_key: Pubkey, config: &SchedulerConfig, queue_authority: Pubkey) -> Self {
        Self {
            config: config_key,
            queue_authority,
            crank_reward: config.crank_reward,
        }
    }
}

fn short(key: &Pubkey) -> String {
    let mut text = key.to_string();
    text.truncate(8);
    text
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HarvestTask {
    pub context: TaskContext,
    pub job: Pubkey,
    pub fee_authority: Pubkey,
    pub mint: Pubkey,
    pub treasury: Pubkey,
    pub sources: Vec<Pubkey>,
    pub compute_budget: u32,
}

impl HarvestTask {
    pub fn for_job(
        context: TaskContext,
        job_key: Pubkey,
        job: &RecurringJob,
        fee_authority: Pubkey,
    ) -> Self {
        Self {
            context,
            job: job_key,
            fee_authority,
            mint: job.target,
            treasury: job.treasury,
            sources: job.sources.clone(),
            compute_budget: job.compute_budget,
        }
    }
}

impl TaskBuilder for HarvestTask {
    fn build(&self, sequence: u64, trigger: Trigger) -> TaskRequest {
        let ctx = &self.context;
        let mut accounts = crate::accounts::ExecuteHarvestJob {
            config: ctx.config,
            job: self.job,
            queue_authority: ctx.queue_authority,
            fee_authority: self.fee_authority,
            mint: self.mint,
            treasury: self.treasury,
            token_program: anchor_spl::token_2022::ID,
        }
        .to_account_metas(None);
        accounts.extend(self.sources.iter().map(|key| AccountMeta::new(*key, false)));

        TaskRequest {
            trigger,
            instructions: vec![Instruction {
                program_id: crate::ID,
                accounts,
                data: crate::instruction::ExecuteHarvestJob { sequence }.data(),
            }],
            compute_budget: self.compute_budget,
            crank_reward: ctx.crank_reward,
            free_tasks: CHAIN_FREE_TASKS,
            description: format!("harvest {}", short(&self.mint)),
        }
    }

    fn required_compute(&self) -> u32 {
        harvest_compute_units(self.sources.len())
    }
}

pub struct HarvestPayload<L: WithheldFees> {
    pub task: HarvestTask,
    pub ledger: L,
}

impl<L: WithheldFees> TaskBuilder for HarvestPayload<L> {
    fn build(&self, sequence: u64, trigger: Trigger) -> TaskRequest {
        self.task.build(sequence, trigger)
    }

    fn required_compute(&self) -> u32 {
        self.task.required_compute()
    }
}

impl<L: WithheldFees> Payload for HarvestPayload<L> {
    type Output = HarvestReport;

    fn run(&mut self) -> Result<HarvestReport> {
        harvest(&mut self.ledger, &self.task.sources)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OracleTask {
    pub context: TaskContext,
    pub job: Pubkey,
    pub oracle_state: Pubkey,
    pub oracle_program: Pubkey,
    pub llm_context: Pubkey,
    pub compute_budget: u32,
}

impl OracleTask {
    pub fn for_job(
        context: TaskContext,
        job_key: Pubkey,
        job: &RecurringJob,
        oracle_program: Pubkey,
    ) -> Self {
        Self {
            context,
            job: job_key,
            oracle_state: oracle_state_address(&crate::ID, &job.target).0,
            oracle_program,
            llm_context: job.target,
            compute_budget: job.compute_budget,
        }
    }

    pub fn interaction(&self) -> Pubkey {
        interaction_address(
            &self.oracle_program,
            &self.context.queue_authority,
            &self.llm_context,
        )
    }
}

impl TaskBuilder for OracleTask {
    fn build(&self, sequence: u64, trigger: Trigger) -> TaskRequest {
        let ctx = &self.context;
        let accounts = crate::accounts::ExecuteOracleJob {
            config: ctx.config,
            job: self.job,
            oracle_state: self.oracle_state,
            queue_authority: ctx.queue_authority,
            interaction: self.interaction(),
            context_account: self.llm_context,
            oracle_program: self.oracle_program,
            system_program: anchor_lang::system_program::ID,
        }
        .to_account_metas(None);

        TaskRequest {
            trigger,
            instructions: vec![Instruction {
                program_id: crate::ID,
                accounts,
                data: crate::instruction::ExecuteOracleJob { sequence }.data(),
            }],
            compute_budget: self.compute_budget,
            crank_reward: ctx.crank_reward,
            free_tasks: CHAIN_FREE_TASKS,
            description: format!("oracle {}", short(&self.llm_context)),
        }
    }

    fn required_compute(&self) -> u32 {
        ORACLE_QUERY_COMPUTE_UNITS + SUCCESSOR_COMPUTE_UNITS
    }
}

/// Task builder for either job kind, chosen by `RecurringJob::kind`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JobTask {
    Harvest(HarvestTask),
    Oracle(OracleTask),
}

impl JobTask {
    pub fn for_job(
        context: TaskContext,
        job_key: Pubkey,
        job: &RecurringJob,
        config: &SchedulerConfig,
    ) -> Result<Self> {
        Ok(match job.kind {
            JobKind::Harvest => {
                let fee_authority =
                    Authority::Fee.address_with_bump(config.fee_authority_bump, &crate::ID)?;
                JobTask::Harvest(HarvestTask::for_job(context, job_key, job, fee_authority))
            }
            JobKind::Oracle => JobTask::Oracle(OracleTask::for_job(
                context,
                job_key,
                job,
                config.oracle_program,
            )),
        })
    }
}

impl TaskBuilder for JobTask {
    fn build(&self, sequence: u64, trigger: Trigger) -> TaskRequest {
        match self {
            JobTask::Harvest(task) => task.build(sequence, trigger),
            JobTask::Oracle(task) => task.build(sequence, trigger),
        }
    }

    fn required_compute(&self) -> u32 {
        match self {
            JobTask::Harvest(task) => task.required_compute(),
            JobTask::Oracle(task) => task.required_compute(),
        }
    }
}

pub struct OraclePayload<C: OracleClient> {
    pub task: OracleTask,
    pub query: String,
    pub client: C,
}

impl<C: OracleClient> TaskBuilder for OraclePayload<C> {
    fn build(&self, sequence: u64, trigger: Trigger) -> TaskRequest {
        self.task.build(sequence, trigger)
    }

    fn required_compute(&self) -> u32 {
        self.task.required_compute()
    }
}

impl<C: OracleClient> Payload for OraclePayload<C> {
    type Output = ();

    fn run(&mut self) -> Result<()> {
        self.client.interact(&self.query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authority::ProgramAddresses;
    use crate::harvest::MAX_SOURCES;
    use crate::queue::{RunTaskReturn, TransactionSource};

    fn context() -> TaskContext {
        let addresses = ProgramAddresses::derive(&crate::ID);
        TaskContext {
            config: addresses.config.0,
            queue_authority: addresses.queue_authority.0,
            crank_reward: 1_000_000,
        }
    }

    fn harvest_task(sources: Vec<Pubkey>) -> HarvestTask {
        HarvestTask {
            context: context(),
            job: Pubkey::new_unique(),
            fee_authority: ProgramAddresses::derive(&crate::ID).fee_authority.0,
            mint: Pubkey::new_unique(),
            treasury: Pubkey::new_unique(),
            sources,
            compute_budget: 200_000,
        }
    }

    #[test]
    fn harvest_task_touches_sources_and_treasury() {
        let sources = vec![Pubkey::new_unique(), Pubkey::new_unique()];
        let task = harvest_task(sources.clone());
        let request = task.build(3, Trigger::Now);
        let touched = request.touched_accounts();

        for source in &sources {
            assert!(touched.contains(source));
        }
        assert!(touched.contains(&task.treasury));
        assert!(touched.contains(&task.mint));
        assert_eq!(request.free_tasks, CHAIN_FREE_TASKS);
    }

    #[test]
    fn sequence_rides_in_instruction_data() {
        let request = harvest_task(vec![]).build(0x0102, Trigger::Now);
        let data = &request.instructions[0].data;
        assert_eq!(data.len(), 16);
        assert_eq!(&data[8..], &0x0102u64.to_le_bytes());
    }

    #[test]
    fn harvest_sources_are_writable() {
        let source = Pubkey::new_unique();
        let request = harvest_task(vec![source]).build(1, Trigger::Now);
        let meta = request.instructions[0]
            .accounts
            .iter()
            .find(|m| m.pubkey == source)
            .unwrap();
        assert!(meta.is_writable);
        assert!(!meta.is_signer);
    }

    #[test]
    fn no_account_needs_an_outside_signature() {
        let request = harvest_task(vec![Pubkey::new_unique()]).build(1, Trigger::Now);
        assert!(request.instructions[0].accounts.iter().all(|m| !m.is_signer));
    }

    #[test]
    fn widest_harvest_task_fits_in_return_data() {
        let sources = (0..MAX_SOURCES).map(|_| Pubkey::new_unique()).collect();
        let mut task = harvest_task(sources);
        task.compute_budget = harvest_compute_units(MAX_SOURCES);
        let returned = task.build(u64::MAX, Trigger::Timestamp(i64::MAX)).into_return().unwrap();

        let TransactionSource::CompiledV0(tx) = &returned.transaction else {
            panic!("expected a compiled transaction");
        };
        // 7 fixed accounts, the sources, this program, compute budget
        assert_eq!(tx.accounts.len(), 7 + MAX_SOURCES + 2);
        assert!(RunTaskReturn::single(returned).fits().unwrap());
    }

    #[test]
    fn oracle_task_reuses_one_interaction_account() {
        let task = OracleTask {
            context: context(),
            job: Pubkey::new_unique(),
            oracle_state: Pubkey::new_unique(),
            oracle_program: crate::oracle::oracle_program::ID,
            llm_context: Pubkey::new_unique(),
            compute_budget: 200_000,
        };
        let first = task.build(1, Trigger::Now);
        let second = task.build(2, Trigger::Timestamp(60));
        assert!(first.touched_accounts().contains(&task.interaction()));
        assert!(second.touched_accounts().contains(&task.interaction()));
        assert_ne!(first.instructions[0].data, second.instructions[0].data);
    }
}
