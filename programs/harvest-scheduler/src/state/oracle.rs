use anchor_lang::prelude::*;

// ──────────────────────────────────────────────────────
// Oracle State: query and latest response for one context
// ──────────────────────────────────────────────────────

#[account]
pub struct OracleState {
    pub context: Pubkey,
    pub query: String,
    pub last_response: String,
    pub query_count: u32,
    pub response_count: u32,
    pub bump: u8,
}

impl OracleState {
    pub const MAX_QUERY_LEN: usize = 200;
    pub const MAX_RESPONSE_LEN: usize = 500;

    pub const LEN: usize = 8   // discriminator
        + 32                    // context
        + 4 + Self::MAX_QUERY_LEN
        + 4 + Self::MAX_RESPONSE_LEN
        + 4                     // query_count
        + 4                     // response_count
        + 1;                    // bump

    /// Cuts `response` to the stored maximum on a char boundary.
    pub fn clip_response(response: &str) -> &str {
        if response.len() <= Self::MAX_RESPONSE_LEN {
            return response;
        }
        let mut end = Self::MAX_RESPONSE_LEN;
        while !response.is_char_boundary(end) {
            end -= 1;
        }
        &response[..end]
    }
}
