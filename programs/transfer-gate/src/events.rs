use anchor_lang::prelude::*;

#[event]
pub struct WhitelistAdded {
    pub principal: Pubkey,
    pub added_by: Pubkey,
    pub added_at: i64,
}

#[event]
pub struct WhitelistRemoved {
    pub principal: Pubkey,
    pub removed_by: Pubkey,
    pub removed_at: i64,
}
