use anchor_lang::prelude::*;
use anchor_lang::solana_program::{instruction::Instruction, program::MAX_RETURN_DATA};

use crate::errors::SchedulerError;

pub mod compile;
pub mod cpi;

pub use compile::*;
pub use cpi::*;

// ──────────────────────────────────────────────────────
// Task queue interface
//
// Wire types of the shared task queue (TukTuk-compatible).
// Field order is the Borsh layout the queue program expects.
//
// The first task of a chain is queued by CPI under an id the
// operator picks. Every later task is handed back to the queue
// as return data of the running task and lands in one of the
// free-task slots the queue reserved for it. A task the queue
// is running cannot CPI into the queue again.
// ──────────────────────────────────────────────────────

pub mod queue_program {
    use anchor_lang::declare_id;
    declare_id!("tuktukUrfhXT6ZT77QTU8RQtvgL967uRuVagWF57zVA");
}

pub mod compute_budget {
    use anchor_lang::declare_id;
    declare_id!("ComputeBudget111111111111111111111111111111");
}

/// `sha256("global:queue_task_v0")[..8]`
pub const QUEUE_TASK_V0: [u8; 8] = [177, 95, 195, 252, 241, 2, 178, 88];

/// `sha256("global:add_queue_authority_v0")[..8]`
pub const ADD_QUEUE_AUTHORITY_V0: [u8; 8] = [122, 25, 219, 246, 39, 195, 74, 93];

/// Cost of compiling and serializing the successor.
pub const SUCCESSOR_COMPUTE_UNITS: u32 = 30_000;

/// Free-task slots each chained task reserves: one, for its successor.
pub const CHAIN_FREE_TASKS: u8 = 1;

pub const MAX_DESCRIPTION_LEN: usize = 40;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub enum Trigger {
    Now,
    Timestamp(i64),
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub struct CompiledInstruction {
    pub program_id_index: u8,
    pub accounts: Vec<u8>,
    pub data: Vec<u8>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct CompiledTransaction {
    pub num_rw_signers: u8,
    pub num_ro_signers: u8,
    pub num_rw: u8,
    pub accounts: Vec<Pubkey>,
    pub instructions: Vec<CompiledInstruction>,
    pub signer_seeds: Vec<Vec<Vec<u8>>>,
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub enum TransactionSource {
    CompiledV0(CompiledTransaction),
    RemoteV0 { url: String, signer: Pubkey },
}

#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub struct QueueTaskArgs {
    pub id: u16,
    pub trigger: Trigger,
    pub transaction: TransactionSource,
    pub crank_reward: Option<u64>,
    pub free_tasks: u8,
    pub description: String,
}

/// One task handed back to the queue by a running task.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug)]
pub struct TaskReturn {
    pub trigger: Trigger,
    pub transaction: TransactionSource,
    pub crank_reward: Option<u64>,
    pub free_tasks: u8,
    pub description: String,
}

/// Return data of a task instruction. The queue places each entry of
/// `tasks` into one of the running task's free-task slots.
#[derive(AnchorSerialize, AnchorDeserialize, Clone, PartialEq, Eq, Debug, Default)]
pub struct RunTaskReturn {
    pub tasks: Vec<TaskReturn>,
    pub accounts: Vec<Pubkey>,
}

impl RunTaskReturn {
    pub fn single(task: TaskReturn) -> Self {
        Self {
            tasks: vec![task],
            accounts: vec![],
        }
    }

    pub fn encoded_len(&self) -> Result<usize> {
        let mut data = Vec::new();
        self.serialize(&mut data)
            .map_err(|_| SchedulerError::CompileTransactionFailed)?;
        Ok(data.len())
    }

    /// Whether the runtime will accept this as return data.
    pub fn fits(&self) -> Result<bool> {
        Ok(self.encoded_len()? <= MAX_RETURN_DATA)
    }
}

/// A task as this program describes it, before compilation.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TaskRequest {
    pub trigger: Trigger,
    pub instructions: Vec<Instruction>,
    pub compute_budget: u32,
    pub crank_reward: u64,
    pub free_tasks: u8,
    pub description: String,
}

impl TaskRequest {
    /// Every account the task will touch.
    pub fn touched_accounts(&self) -> Vec<Pubkey> {
        let mut touched = Vec::new();
        for ix in &self.instructions {
            for key in std::iter::once(&ix.program_id).chain(ix.accounts.iter().map(|m| &m.pubkey)) {
                if !touched.contains(key) {
                    touched.push(*key);
                }
            }
        }
        touched
    }

    /// Compiles the task for the queue's return-data hand-off.
    pub fn into_return(self) -> Result<TaskReturn> {
        let mut instructions = Vec::with_capacity(self.instructions.len() + 1);
        instructions.push(set_compute_unit_limit(self.compute_budget));
        instructions.extend(self.instructions);

        let transaction = compile_transaction(instructions, vec![])?;

        Ok(TaskReturn {
            trigger: self.trigger,
            transaction: TransactionSource::CompiledV0(transaction),
            crank_reward: Some(self.crank_reward),
            free_tasks: self.free_tasks,
            description: clip_description(self.description),
        })
    }

    /// Compiles the task for a `queue_task_v0` under `id`.
    pub fn into_args(self, id: u16) -> Result<QueueTaskArgs> {
        let task = self.into_return()?;
        Ok(QueueTaskArgs {
            id,
            trigger: task.trigger,
            transaction: task.transaction,
            crank_reward: task.crank_reward,
            free_tasks: task.free_tasks,
            description: task.description,
        })
    }
}

/// Cuts at the last char boundary within the limit.
pub fn clip_description(mut description: String) -> String {
    if description.len() > MAX_DESCRIPTION_LEN {
        let mut end = MAX_DESCRIPTION_LEN;
        while !description.is_char_boundary(end) {
            end -= 1;
        }
        description.truncate(end);
    }
    description
}

pub fn set_compute_unit_limit(units: u32) -> Instruction {
    let mut data = Vec::with_capacity(5);
    data.push(2u8);
    data.extend_from_slice(&units.to_le_bytes());
    Instruction {
        program_id: compute_budget::ID,
        accounts: vec![],
        data,
    }
}

/// Anything that accepts tasks under a chosen id: the on-chain queue,
/// or an in-memory one.
pub trait TaskQueue {
    fn is_live(&self, task_id: u16) -> bool;

    fn queue(&mut self, task_id: u16, request: TaskRequest) -> Result<()>;
}

/// Validates and submits one task under `task_id`.
pub fn submit<Q: TaskQueue>(
    queue: &mut Q,
    task_id: u16,
    request: TaskRequest,
    required_compute: u32,
) -> Result<()> {
    require!(
        request.compute_budget >= required_compute,
        SchedulerError::InsufficientCompute
    );
    require!(!queue.is_live(task_id), SchedulerError::DuplicateTaskId);
    queue.queue(task_id, request)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchor_lang::solana_program::instruction::AccountMeta;
    use solana_program::hash::hashv;

    fn request(compute_budget: u32) -> TaskRequest {
        TaskRequest {
            trigger: Trigger::Now,
            instructions: vec![Instruction {
                program_id: crate::ID,
                accounts: vec![AccountMeta::new(Pubkey::new_unique(), false)],
                data: vec![1, 2, 3],
            }],
            compute_budget,
            crank_reward: 1_000,
            free_tasks: CHAIN_FREE_TASKS,
            description: "test".to_string(),
        }
    }

    #[derive(Default)]
    struct Recorder {
        live: Vec<u16>,
    }

    impl TaskQueue for Recorder {
        fn is_live(&self, task_id: u16) -> bool {
            self.live.contains(&task_id)
        }

        fn queue(&mut self, task_id: u16, _request: TaskRequest) -> Result<()> {
            self.live.push(task_id);
            Ok(())
        }
    }

    fn anchor_discriminator(name: &str) -> [u8; 8] {
        let hash = hashv(&[&b"global:"[..], name.as_bytes()]).to_bytes();
        let mut out = [0u8; 8];
        out.copy_from_slice(&hash[..8]);
        out
    }

    #[test]
    fn queue_discriminators_match_instruction_names() {
        assert_eq!(QUEUE_TASK_V0, anchor_discriminator("queue_task_v0"));
        assert_eq!(ADD_QUEUE_AUTHORITY_V0, anchor_discriminator("add_queue_authority_v0"));
    }

    #[test]
    fn compute_limit_instruction_layout() {
        let ix = set_compute_unit_limit(200_000);
        assert_eq!(ix.program_id, compute_budget::ID);
        assert_eq!(ix.data, vec![2, 0x40, 0x0d, 0x03, 0x00]);
    }

    #[test]
    fn undersized_budget_is_rejected() {
        let mut queue = Recorder::default();
        assert!(submit(&mut queue, 1, request(10), 11).is_err());
        assert!(queue.live.is_empty());
    }

    #[test]
    fn live_id_is_rejected() {
        let mut queue = Recorder { live: vec![4] };
        assert!(submit(&mut queue, 4, request(100), 100).is_err());
        assert_eq!(queue.live, vec![4]);
    }

    #[test]
    fn args_lead_with_compute_limit() {
        let args = request(123_000).into_args(9).unwrap();
        assert_eq!(args.id, 9);
        assert_eq!(args.crank_reward, Some(1_000));
        assert_eq!(args.free_tasks, CHAIN_FREE_TASKS);
        let TransactionSource::CompiledV0(tx) = args.transaction else {
            panic!("expected a compiled transaction");
        };
        assert_eq!(tx.instructions.len(), 2);
        let first = &tx.instructions[0];
        assert_eq!(tx.accounts[first.program_id_index as usize], compute_budget::ID);
    }

    #[test]
    fn returned_task_matches_queued_args() {
        let returned = request(50_000).into_return().unwrap();
        let args = request(50_000).into_args(3).unwrap();
        assert_eq!(returned.trigger, args.trigger);
        assert_eq!(returned.transaction, args.transaction);
        assert_eq!(returned.free_tasks, args.free_tasks);
    }

    #[test]
    fn empty_return_is_small() {
        let empty = RunTaskReturn::default();
        assert_eq!(empty.encoded_len().unwrap(), 8);
        assert!(empty.fits().unwrap());
    }

    #[test]
    fn long_description_is_clipped() {
        let mut req = request(1);
        req.description = "x".repeat(100);
        let task = req.into_return().unwrap();
        assert_eq!(task.description.len(), MAX_DESCRIPTION_LEN);
    }

    #[test]
    fn multibyte_description_is_clipped_on_a_char_boundary() {
        // 39 ASCII bytes then a 4-byte char straddling the limit
        let text = format!("{}🦀tail", "a".repeat(39));
        let clipped = clip_description(text);
        assert_eq!(clipped, "a".repeat(39));

        let short = clip_description("harvest é".to_string());
        assert_eq!(short, "harvest é");
    }

    #[test]
    fn touched_accounts_include_programs() {
        let touched = request(1).touched_accounts();
        assert_eq!(touched.len(), 2);
        assert_eq!(touched[0], crate::ID);
    }
}
