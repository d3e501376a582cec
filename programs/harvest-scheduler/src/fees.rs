use anchor_lang::prelude::*;
use anchor_spl::token_2022::spl_token_2022::extension::transfer_fee::{
    TransferFee, TransferFeeConfig,
};

use crate::errors::SchedulerError;

// ──────────────────────────────────────────────────────
// Transfer fee model
//
// Mirrors the ledger's TransferFeeConfig: a fee is withheld
// on the recipient, rounded up, capped at `maximum_fee`.
// Rate changes only apply from `current_epoch + 2`.
// ──────────────────────────────────────────────────────

pub const MAX_FEE_BASIS_POINTS: u16 = 10_000;

/// Epochs between a rate update and the epoch it takes effect.
pub const FEE_ACTIVATION_EPOCHS: u64 = 2;

#[derive(AnchorSerialize, AnchorDeserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct FeeRate {
    pub basis_points: u16,
    pub maximum_fee: u64,
}

impl FeeRate {
    pub fn new(basis_points: u16, maximum_fee: u64) -> Result<Self> {
        require!(
            basis_points <= MAX_FEE_BASIS_POINTS,
            SchedulerError::FeeRateTooHigh
        );
        Ok(Self {
            basis_points,
            maximum_fee,
        })
    }

    pub fn fee_for(&self, amount: u64) -> Result<u64> {
        if self.basis_points == 0 || amount == 0 {
            return Ok(0);
        }
        let numerator = (amount as u128)
            .checked_mul(self.basis_points as u128)
            .ok_or(SchedulerError::Overflow)?;
        let raw = numerator
            .checked_add(MAX_FEE_BASIS_POINTS as u128 - 1)
            .map(|n| n / MAX_FEE_BASIS_POINTS as u128)
            .ok_or(SchedulerError::Overflow)?;
        let capped = raw.min(self.maximum_fee as u128);
        u64::try_from(capped).map_err(|_| SchedulerError::Overflow.into())
    }
}

impl From<&TransferFee> for FeeRate {
    fn from(fee: &TransferFee) -> Self {
        Self {
            basis_points: u16::from(fee.transfer_fee_basis_points),
            maximum_fee: u64::from(fee.maximum_fee),
        }
    }
}

/// Older/newer rate pair, selected by epoch.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct FeeSchedule {
    pub older: FeeRate,
    pub newer: FeeRate,
    pub newer_epoch: u64,
}

impl FeeSchedule {
    pub fn new(rate: FeeRate, epoch: u64) -> Self {
        Self {
            older: rate,
            newer: rate,
            newer_epoch: epoch,
        }
    }

    /// Reads the pair stored in a mint's fee extension.
    pub fn from_config(config: &TransferFeeConfig) -> Self {
        Self {
            older: FeeRate::from(&config.older_transfer_fee),
            newer: FeeRate::from(&config.newer_transfer_fee),
            newer_epoch: u64::from(config.newer_transfer_fee.epoch),
        }
    }

    pub fn rate_at(&self, epoch: u64) -> &FeeRate {
        if epoch >= self.newer_epoch {
            &self.newer
        } else {
            &self.older
        }
    }

    pub fn fee_at(&self, epoch: u64, amount: u64) -> Result<u64> {
        self.rate_at(epoch).fee_for(amount)
    }

    /// Stage `rate`; returns the first epoch it applies to.
    pub fn stage(&mut self, rate: FeeRate, current_epoch: u64) -> u64 {
        self.older = *self.rate_at(current_epoch);
        self.newer = rate;
        self.newer_epoch = current_epoch.saturating_add(FEE_ACTIVATION_EPOCHS);
        self.newer_epoch
    }
}
