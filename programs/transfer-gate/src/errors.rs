use anchor_lang::prelude::*;

#[error_code]
pub enum GateError {
    // ── Authorization errors ──
    #[msg("Only the gate admin can perform this action")]
    Unauthorized,

    // ── Allow-list errors ──
    #[msg("Principal is already on the allow-list")]
    AlreadyWhitelisted,

    #[msg("Source owner is not on the allow-list")]
    NotWhitelisted,

    #[msg("Whitelist entry does not belong to this principal")]
    InvalidWhitelistEntry,

    // ── Hook errors ──
    #[msg("Hook was invoked outside of a transfer")]
    NotTransferring,

    #[msg("Mint is not the one this gate guards")]
    InvalidMint,

    // ── Arithmetic errors ──
    #[msg("Arithmetic overflow")]
    Overflow,
}
