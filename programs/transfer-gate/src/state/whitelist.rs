use anchor_lang::prelude::*;

/// Existence of the account is the permission.
#[account]
pub struct WhitelistEntry {
    pub principal: Pubkey,
    pub added_by: Pubkey,
    pub added_at: i64,
    pub bump: u8,
}

impl WhitelistEntry {
    pub const LEN: usize = 8 + 32 + 32 + 8 + 1;

    pub const SEED: &'static [u8] = b"whitelist";
}
