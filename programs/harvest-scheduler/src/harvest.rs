use anchor_lang::prelude::*;
use anchor_spl::token_2022::spl_token_2022::{
    extension::{
        transfer_fee::{TransferFeeAmount, TransferFeeConfig},
        BaseStateWithExtensions, StateWithExtensions,
    },
    state::{Account as TokenAccountState, Mint as MintState},
};
use anchor_spl::token_interface::{
    harvest_withheld_tokens_to_mint, withdraw_withheld_tokens_from_mint,
    HarvestWithheldTokensToMint, WithdrawWithheldTokensFromMint,
};

use crate::authority::Authority;
use crate::errors::SchedulerError;
use crate::queue::SUCCESSOR_COMPUTE_UNITS;

// ──────────────────────────────────────────────────────
// Fee harvest
//
// Withheld fees sit on holder token accounts. A harvest moves
// them to the mint (zeroing the holders) and then withdraws the
// mint's withheld balance into the treasury. The zero step always
// runs before the credit step, so an aborted harvest never
// leaves an amount counted twice.
//
// The reported amount is what the planned sources held. Whatever
// already sat on the mint is withdrawn with it and reported as
// carried over. A plan with no sources touches nothing.
// ──────────────────────────────────────────────────────

/// Upper bound on sources per harvest, sized to one transaction.
pub const MAX_SOURCES: usize = 16;

pub const HARVEST_BASE_COMPUTE_UNITS: u32 = 40_000;
pub const HARVEST_PER_SOURCE_COMPUTE_UNITS: u32 = 6_000;

/// Worst-case cost of one harvest cycle including the successor submission.
pub fn harvest_compute_units(sources: usize) -> u32 {
    let sources = sources.min(MAX_SOURCES) as u32;
    HARVEST_BASE_COMPUTE_UNITS
        + HARVEST_PER_SOURCE_COMPUTE_UNITS * sources
        + SUCCESSOR_COMPUTE_UNITS
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SourceState {
    /// Not supplied, closed, or not a token account
    Missing,
    /// Token account of a different mint
    ForeignMint,
    /// Nothing withheld (already swept, or never charged)
    Empty,
    Withheld(u64),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct SourceSnapshot {
    pub address: Pubkey,
    pub state: SourceState,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum SkipReason {
    Missing,
    ForeignMint,
    Empty,
    Duplicate,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HarvestPlan {
    pub sources: Vec<Pubkey>,
    /// Sum of the withheld amounts on `sources`
    pub expected: u64,
    pub skipped: Vec<(Pubkey, SkipReason)>,
}

impl HarvestPlan {
    pub fn build(snapshots: &[SourceSnapshot]) -> Result<Self> {
        let mut plan = HarvestPlan::default();
        for snapshot in snapshots {
            let seen = plan.sources.contains(&snapshot.address)
                || plan.skipped.iter().any(|(key, _)| *key == snapshot.address);
            if seen {
                plan.skipped.push((snapshot.address, SkipReason::Duplicate));
                continue;
            }
            match snapshot.state {
                SourceState::Missing => plan.skipped.push((snapshot.address, SkipReason::Missing)),
                SourceState::ForeignMint => {
                    plan.skipped.push((snapshot.address, SkipReason::ForeignMint))
                }
                SourceState::Empty | SourceState::Withheld(0) => {
                    plan.skipped.push((snapshot.address, SkipReason::Empty))
                }
                SourceState::Withheld(amount) => {
                    plan.expected = plan
                        .expected
                        .checked_add(amount)
                        .ok_or(SchedulerError::Overflow)?;
                    plan.sources.push(snapshot.address);
                }
            }
        }
        Ok(plan)
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct HarvestReport {
    /// Swept from the sources into the treasury
    pub amount: u64,
    /// Already withheld on the mint, withdrawn alongside
    pub carried_over: u64,
    pub swept: u16,
    pub skipped: u16,
}

/// Ledger operations a harvest needs.
pub trait WithheldFees {
    fn snapshot(&self, candidates: &[Pubkey]) -> Result<Vec<SourceSnapshot>>;

    /// Withheld balance already accumulated on the mint.
    fn mint_withheld(&self) -> Result<u64>;

    fn harvest_to_mint(&mut self, sources: &[Pubkey]) -> Result<()>;

    /// Withdraws the mint's withheld balance; returns the treasury delta.
    fn withdraw_to_treasury(&mut self) -> Result<u64>;
}

pub fn harvest<L: WithheldFees>(ledger: &mut L, candidates: &[Pubkey]) -> Result<HarvestReport> {
    require!(
        candidates.len() <= MAX_SOURCES,
        SchedulerError::TooManySources
    );

    let snapshots = ledger.snapshot(candidates)?;
    let plan = HarvestPlan::build(&snapshots)?;
    let mut report = HarvestReport {
        swept: plan.sources.len() as u16,
        skipped: plan.skipped.len() as u16,
        ..HarvestReport::default()
    };
    if plan.is_empty() {
        return Ok(report);
    }

    let pending = ledger.mint_withheld()?;
    let collected = pending
        .checked_add(plan.expected)
        .ok_or(SchedulerError::Overflow)?;

    ledger.harvest_to_mint(&plan.sources)?;
    require!(
        ledger.mint_withheld()? == collected,
        SchedulerError::HarvestMismatch
    );

    let credited = ledger.withdraw_to_treasury()?;
    require!(credited == collected, SchedulerError::HarvestMismatch);

    report.amount = plan.expected;
    report.carried_over = pending;
    Ok(report)
}

// ──────────────────────────────────────────────────────
// Token-2022 adapter
// ──────────────────────────────────────────────────────

pub struct Token2022Fees<'a, 'info> {
    pub token_program: &'a AccountInfo<'info>,
    pub mint: &'a AccountInfo<'info>,
    pub treasury: &'a AccountInfo<'info>,
    pub fee_authority: &'a AccountInfo<'info>,
    pub fee_authority_bump: u8,
    /// Candidate holder accounts, usually `ctx.remaining_accounts`
    pub accounts: &'a [AccountInfo<'info>],
}

impl<'a, 'info> Token2022Fees<'a, 'info> {
    fn find(&self, key: &Pubkey) -> Option<&'a AccountInfo<'info>> {
        self.accounts.iter().find(|info| info.key == key)
    }

    fn inspect(&self, info: &AccountInfo<'info>) -> Result<SourceState> {
        if info.owner != self.token_program.key || info.data_is_empty() {
            return Ok(SourceState::Missing);
        }
        let data = info.try_borrow_data()?;
        let Ok(account) = StateWithExtensions::<TokenAccountState>::unpack(&data) else {
            return Ok(SourceState::Missing);
        };
        if account.base.mint != *self.mint.key {
            return Ok(SourceState::ForeignMint);
        }
        let withheld = account
            .get_extension::<TransferFeeAmount>()
            .map(|ext| u64::from(ext.withheld_amount))
            .unwrap_or(0);
        Ok(if withheld == 0 {
            SourceState::Empty
        } else {
            SourceState::Withheld(withheld)
        })
    }

    fn treasury_balance(&self) -> Result<u64> {
        let data = self.treasury.try_borrow_data()?;
        let account = StateWithExtensions::<TokenAccountState>::unpack(&data)?;
        require_keys_eq!(account.base.mint, *self.mint.key, SchedulerError::InvalidTreasury);
        Ok(account.base.amount)
    }
}

impl<'a, 'info> WithheldFees for Token2022Fees<'a, 'info> {
    fn snapshot(&self, candidates: &[Pubkey]) -> Result<Vec<SourceSnapshot>> {
        candidates
            .iter()
            .map(|address| {
                let state = match self.find(address) {
                    Some(info) => self.inspect(info)?,
                    None => SourceState::Missing,
                };
                Ok(SourceSnapshot {
                    address: *address,
                    state,
                })
            })
            .collect()
    }

    fn mint_withheld(&self) -> Result<u64> {
        let data = self.mint.try_borrow_data()?;
        let mint = StateWithExtensions::<MintState>::unpack(&data)?;
        let config = mint
            .get_extension::<TransferFeeConfig>()
            .map_err(|_| SchedulerError::MissingFeeConfig)?;
        Ok(u64::from(config.withheld_amount))
    }

    fn harvest_to_mint(&mut self, sources: &[Pubkey]) -> Result<()> {
        let infos = sources
            .iter()
            .filter_map(|key| self.find(key).cloned())
            .collect::<Vec<_>>();

        harvest_withheld_tokens_to_mint(
            CpiContext::new(
                self.token_program.clone(),
                HarvestWithheldTokensToMint {
                    token_program_id: self.token_program.clone(),
                    mint: self.mint.clone(),
                },
            ),
            infos,
        )
    }

    fn withdraw_to_treasury(&mut self) -> Result<u64> {
        let before = self.treasury_balance()?;

        let bump = [self.fee_authority_bump];
        let seeds = Authority::Fee.signer_seeds(&bump);
        let signer_seeds: &[&[&[u8]]] = &[&seeds[..]];

        withdraw_withheld_tokens_from_mint(CpiContext::new_with_signer(
            self.token_program.clone(),
            WithdrawWithheldTokensFromMint {
                token_program_id: self.token_program.clone(),
                mint: self.mint.clone(),
                destination: self.treasury.clone(),
                authority: self.fee_authority.clone(),
            },
            signer_seeds,
        ))?;

        let after = self.treasury_balance()?;
        after
            .checked_sub(before)
            .ok_or_else(|| SchedulerError::Overflow.into())
    }
}
