use anchor_lang::prelude::*;

use super::harness::*;
use crate::errors::SchedulerError;
use crate::harvest::{harvest, HarvestReport, MAX_SOURCES};

// ============ END TO END ============

#[test]
fn transfer_withholds_and_harvest_credits_treasury() {
    let mut ledger = MockLedger::new(five_percent());
    let alice = ledger.open_account();
    let bob = ledger.open_account();
    ledger.mint_to(&alice, 1_000);
    ledger.mint_to(&bob, 1_000);

    let fee = ledger.transfer(&alice, &bob, 100);
    assert_eq!(fee, 5);
    assert_eq!(ledger.holding(&alice).amount, 900);
    assert_eq!(ledger.holding(&bob).amount, 1_095);
    assert_eq!(ledger.holding(&bob).withheld, 5);

    let report = harvest(&mut ledger, &[alice, bob]).unwrap();

    assert_eq!(report.amount, 5);
    assert_eq!(report.swept, 1);
    assert_eq!(report.skipped, 1);
    assert_eq!(ledger.treasury_balance(), 5);
    assert_eq!(ledger.holding(&alice).withheld, 0);
    assert_eq!(ledger.holding(&bob).withheld, 0);
    assert_eq!(ledger.mint_withheld, 0);
}

#[test]
fn fee_is_capped_at_maximum() {
    let mut ledger = MockLedger::new(five_percent());
    let alice = ledger.open_account();
    let bob = ledger.open_account();
    ledger.mint_to(&alice, 1_000_000);

    assert_eq!(ledger.transfer(&alice, &bob, 100_000), 1_000);
    assert_eq!(harvest(&mut ledger, &[bob]).unwrap().amount, 1_000);
}

// ============ IDEMPOTENCE & ADDITIVITY ============

#[test]
fn second_harvest_returns_zero() {
    let mut ledger = MockLedger::new(five_percent());
    let alice = ledger.open_account();
    let bob = ledger.open_account();
    ledger.mint_to(&alice, 1_000);
    ledger.transfer(&alice, &bob, 100);

    assert_eq!(harvest(&mut ledger, &[alice, bob]).unwrap().amount, 5);
    let again = harvest(&mut ledger, &[alice, bob]).unwrap();
    assert_eq!(again.amount, 0);
    assert_eq!(again.swept, 0);
    assert_eq!(ledger.treasury_balance(), 5);
}

#[test]
fn treasury_gains_sum_of_withheld() {
    let mut ledger = MockLedger::new(five_percent());
    let payer = ledger.open_account();
    ledger.mint_to(&payer, 10_000);

    let holders: Vec<Pubkey> = (0..4).map(|_| ledger.open_account()).collect();
    let mut expected = 0;
    for (i, holder) in holders.iter().enumerate() {
        expected += ledger.transfer(&payer, holder, 100 * (i as u64 + 1));
    }
    assert_eq!(expected, 5 + 10 + 15 + 20);

    let report = harvest(&mut ledger, &holders).unwrap();
    assert_eq!(report.amount, expected);
    assert_eq!(report.swept, 4);
    for holder in &holders {
        assert_eq!(ledger.holding(holder).withheld, 0);
    }
}

#[test]
fn overlapping_lists_never_double_count() {
    let mut ledger = MockLedger::new(five_percent());
    let payer = ledger.open_account();
    let a = ledger.open_account();
    let b = ledger.open_account();
    let c = ledger.open_account();
    ledger.mint_to(&payer, 10_000);
    ledger.transfer(&payer, &a, 100);
    ledger.transfer(&payer, &b, 200);
    ledger.transfer(&payer, &c, 300);

    let first = harvest(&mut ledger, &[a, b]).unwrap();
    let second = harvest(&mut ledger, &[b, c, c]).unwrap();

    assert_eq!(first.amount, 15);
    assert_eq!(second.amount, 15);
    assert_eq!(second.swept, 1);
    assert_eq!(ledger.treasury_balance(), 30);
}

// ============ SKIPPED SOURCES ============

#[test]
fn bad_candidates_are_skipped_not_fatal() {
    let mut ledger = MockLedger::new(five_percent());
    let payer = ledger.open_account();
    let bob = ledger.open_account();
    let foreign = ledger.open_foreign_account();
    let missing = Pubkey::new_unique();
    ledger.mint_to(&payer, 1_000);
    ledger.transfer(&payer, &bob, 100);

    let report = harvest(&mut ledger, &[missing, foreign, bob]).unwrap();

    assert_eq!(report.amount, 5);
    assert_eq!(report.swept, 1);
    assert_eq!(report.skipped, 2);
    assert_eq!(ledger.holding(&foreign).withheld, 9);
}

#[test]
fn empty_harvest_returns_zero_and_leaves_the_mint_alone() {
    let mut ledger = MockLedger::new(five_percent());
    let alice = ledger.open_account();
    ledger.mint_withheld = 42;

    let report = harvest(&mut ledger, &[]).unwrap();
    assert_eq!(report, HarvestReport::default());

    let report = harvest(&mut ledger, &[alice]).unwrap();
    assert_eq!(report.amount, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(ledger.mint_withheld, 42);
    assert_eq!(ledger.treasury_balance(), 0);
}

#[test]
fn balance_already_on_the_mint_is_reported_apart() {
    let mut ledger = MockLedger::new(five_percent());
    let payer = ledger.open_account();
    let bob = ledger.open_account();
    ledger.mint_to(&payer, 1_000);
    ledger.transfer(&payer, &bob, 100);
    ledger.mint_withheld = 7;

    let report = harvest(&mut ledger, &[bob]).unwrap();

    assert_eq!(report.amount, 5);
    assert_eq!(report.carried_over, 7);
    assert_eq!(ledger.treasury_balance(), 12);
    assert_eq!(ledger.mint_withheld, 0);
}

#[test]
fn fees_that_do_not_move_are_a_mismatch() {
    let mut ledger = MockLedger::new(five_percent());
    let payer = ledger.open_account();
    let bob = ledger.open_account();
    ledger.mint_to(&payer, 1_000);
    ledger.transfer(&payer, &bob, 100);
    ledger.inert = true;

    let err = harvest(&mut ledger, &[bob]).unwrap_err();
    assert_eq!(code_of(err), code(SchedulerError::HarvestMismatch));
    assert_eq!(ledger.treasury_balance(), 0);
}

#[test]
fn too_many_sources_is_rejected() {
    let mut ledger = MockLedger::new(five_percent());
    let candidates: Vec<Pubkey> = (0..=MAX_SOURCES).map(|_| Pubkey::new_unique()).collect();

    let err = harvest(&mut ledger, &candidates).unwrap_err();
    assert_eq!(code_of(err), code(SchedulerError::TooManySources));
}
