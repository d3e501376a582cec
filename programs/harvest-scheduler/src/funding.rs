use anchor_lang::prelude::*;
use anchor_lang::system_program::{transfer, Transfer};

use crate::errors::SchedulerError;

// ──────────────────────────────────────────────────────
// Funding guard
//
// The queue authority pays rent and crank rewards for every
// successor task. Before a task referencing it is submitted
// its balance must sit at or above `min_balance`.
// ──────────────────────────────────────────────────────

/// 0.1 SOL
pub const DEFAULT_MIN_AUTHORITY_BALANCE: u64 = 100_000_000;

/// 0.001 SOL
pub const DEFAULT_CRANK_REWARD: u64 = 1_000_000;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug)]
pub struct FundingPolicy {
    /// Balance the authority must hold before a submission
    pub min_balance: u64,
    /// Smallest transfer made when topping up
    pub top_up: u64,
}

impl Default for FundingPolicy {
    fn default() -> Self {
        Self {
            min_balance: DEFAULT_MIN_AUTHORITY_BALANCE,
            top_up: DEFAULT_MIN_AUTHORITY_BALANCE,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FundingAction {
    Sufficient,
    TopUp(u64),
}

impl FundingPolicy {
    pub fn assess(&self, balance: u64) -> FundingAction {
        if balance >= self.min_balance {
            return FundingAction::Sufficient;
        }
        let shortfall = self.min_balance - balance;
        FundingAction::TopUp(shortfall.max(self.top_up))
    }

    /// Precondition form used when no operator is present to pay.
    pub fn require_funded(&self, balance: u64) -> Result<()> {
        require!(
            self.assess(balance) == FundingAction::Sufficient,
            SchedulerError::InsufficientFunding
        );
        Ok(())
    }
}

/// Tops `authority` up from `funder` when the policy asks for it.
/// Returns the lamports moved.
pub fn ensure_funded<'info>(
    policy: &FundingPolicy,
    funder: &AccountInfo<'info>,
    authority: &AccountInfo<'info>,
    system_program: &AccountInfo<'info>,
) -> Result<u64> {
    match policy.assess(authority.lamports()) {
        FundingAction::Sufficient => Ok(0),
        FundingAction::TopUp(lamports) => {
            require!(
                funder.lamports() >= lamports,
                SchedulerError::InsufficientFunding
            );
            transfer(
                CpiContext::new(
                    system_program.clone(),
                    Transfer {
                        from: funder.clone(),
                        to: authority.clone(),
                    },
                ),
                lamports,
            )?;
            msg!("Queue authority topped up by {} lamports", lamports);
            Ok(lamports)
        }
    }
}
