use anchor_lang::prelude::*;

// ──────────────────────────────────────────────────────
// Gate Config: singleton PDA naming the admin and the
// guarded mint
// ──────────────────────────────────────────────────────

#[account]
pub struct GateConfig {
    /// Can add and remove principals, and hand over the role
    pub admin: Pubkey,

    /// Mint whose transfers this hook checks
    pub mint: Pubkey,

    /// Live allow-list entries
    pub entry_count: u64,

    /// PDA bump
    pub bump: u8,
}

impl GateConfig {
    pub const LEN: usize = 8   // discriminator
        + 32                    // admin
        + 32                    // mint
        + 8                     // entry_count
        + 1                     // bump
        + 32;                   // padding for future fields

    pub const SEED: &'static [u8] = b"gate_config";
}
