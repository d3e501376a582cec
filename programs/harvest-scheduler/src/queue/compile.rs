use anchor_lang::prelude::*;
use anchor_lang::solana_program::instruction::Instruction;

use super::{CompiledInstruction, CompiledTransaction};
use crate::errors::SchedulerError;

// ──────────────────────────────────────────────────────
// Instruction → compiled transaction
//
// Accounts are deduplicated and ordered rw signers, ro signers,
// rw, ro. Instructions then refer to accounts by u8 index.
// ──────────────────────────────────────────────────────

#[derive(Clone, Copy)]
struct Entry {
    key: Pubkey,
    is_signer: bool,
    is_writable: bool,
}

impl Entry {
    fn rank(&self) -> u8 {
        match (self.is_signer, self.is_writable) {
            (true, true) => 0,
            (true, false) => 1,
            (false, true) => 2,
            (false, false) => 3,
        }
    }
}

pub fn compile_transaction(
    instructions: Vec<Instruction>,
    signer_seeds: Vec<Vec<Vec<u8>>>,
) -> Result<CompiledTransaction> {
    let mut entries: Vec<Entry> = Vec::new();
    let mut touch = |key: Pubkey, is_signer: bool, is_writable: bool| {
        match entries.iter_mut().find(|e| e.key == key) {
            Some(entry) => {
                entry.is_signer |= is_signer;
                entry.is_writable |= is_writable;
            }
            None => entries.push(Entry {
                key,
                is_signer,
                is_writable,
            }),
        }
    };

    for ix in &instructions {
        for meta in &ix.accounts {
            touch(meta.pubkey, meta.is_signer, meta.is_writable);
        }
        touch(ix.program_id, false, false);
    }

    // stable: first appearance order is kept within a rank
    entries.sort_by_key(Entry::rank);

    require!(
        entries.len() <= u8::MAX as usize,
        SchedulerError::CompileTransactionFailed
    );

    let count = |rank: u8| entries.iter().filter(|e| e.rank() == rank).count() as u8;
    let num_rw_signers = count(0);
    let num_ro_signers = count(1);
    let num_rw = count(2);

    let accounts: Vec<Pubkey> = entries.iter().map(|e| e.key).collect();
    let index_of = |key: &Pubkey| -> Result<u8> {
        accounts
            .iter()
            .position(|k| k == key)
            .map(|i| i as u8)
            .ok_or_else(|| error!(SchedulerError::CompileTransactionFailed))
    };

    let compiled = instructions
        .iter()
        .map(|ix| {
            Ok(CompiledInstruction {
                program_id_index: index_of(&ix.program_id)?,
                accounts: ix
                    .accounts
                    .iter()
                    .map(|meta| index_of(&meta.pubkey))
                    .collect::<Result<Vec<_>>>()?,
                data: ix.data.clone(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CompiledTransaction {
        num_rw_signers,
        num_ro_signers,
        num_rw,
        accounts,
        instructions: compiled,
        signer_seeds,
    })
}
