use anchor_lang::prelude::*;

use crate::state::WhitelistEntry;

// ──────────────────────────────────────────────────────
// Allow-list rules
//
// Pure decisions only. The hook path reads one account and
// makes no calls.
// ──────────────────────────────────────────────────────

pub const EXTRA_ACCOUNT_METAS_SEED: &[u8] = b"extra-account-metas";

pub fn whitelist_entry_address(program_id: &Pubkey, principal: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[WhitelistEntry::SEED, principal.as_ref()], program_id)
}

pub fn extra_account_metas_address(program_id: &Pubkey, mint: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[EXTRA_ACCOUNT_METAS_SEED, mint.as_ref()], program_id)
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum InsertOutcome {
    Created,
    AlreadyPresent,
    Denied,
}

pub fn authorize(caller: &Pubkey, admin: &Pubkey) -> bool {
    caller == admin
}

pub fn plan_insert(caller_is_admin: bool, entry_exists: bool) -> InsertOutcome {
    match (caller_is_admin, entry_exists) {
        (false, _) => InsertOutcome::Denied,
        (true, true) => InsertOutcome::AlreadyPresent,
        (true, false) => InsertOutcome::Created,
    }
}

/// A transfer from `principal` is allowed iff its entry exists.
pub fn check(principal: &Pubkey, entry: Option<&WhitelistEntry>) -> bool {
    entry.is_some_and(|entry| entry.principal == *principal)
}

/// Reads the entry behind `info`, if there is one this program wrote.
pub fn load_entry(program_id: &Pubkey, info: &AccountInfo) -> Option<WhitelistEntry> {
    if info.owner != program_id || info.data_is_empty() {
        return None;
    }
    let data = info.try_borrow_data().ok()?;
    WhitelistEntry::try_deserialize(&mut &data[..]).ok()
}
