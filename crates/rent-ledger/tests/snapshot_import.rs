//! End-to-end pipeline: a normalized transaction export feeds the ledger
//! engine through the snapshot loader, exactly as the demo CLI does.

use std::io::Cursor;

use rust_decimal_macros::dec;

use rent_ledger::config::LedgerConfig;
use rent_ledger::ledger::{
    LedgerEngine, LedgerFacts, ObligorKind, PaymentStatus, Tenancy, TenancyId,
};
use rent_ledger::snapshot::{SnapshotImportError, TransactionSnapshot};

const EXPORT: &str = "\
id,tenancy_id,date,amount,purpose
tx-01,t-1,2025-01-02,650.00,MIETE JANUAR
tx-02,t-1,2025-02-26,650.00,MIETE MAERZ VORAB
tx-03,t-2,2025-01-05,480.00,Miete EG rechts
tx-04,,2025-01-09,55.00,NEBENKOSTEN UNKLAR
tx-05,t-2,2025-03-03,480.00,Miete EG rechts
";

fn tenancy(id: &str, rent: rust_decimal::Decimal) -> Tenancy {
    Tenancy {
        id: TenancyId(id.to_string()),
        name: format!("Tenant {id}"),
        unit_label: "EG".to_string(),
        contractual_rent: rent,
        move_in: chrono::NaiveDate::from_ymd_opt(2025, 1, 1),
        active: true,
        obligor: ObligorKind::Solo,
    }
}

#[test]
fn exported_snapshot_reconstructs_a_tenancy_ledger() {
    let snapshot = TransactionSnapshot::from_reader(Cursor::new(EXPORT)).expect("import parses");
    let bounds = snapshot.data_bounds();
    assert_eq!(bounds.earliest_observed.unwrap().to_string(), "2025-01");
    assert_eq!(bounds.latest_observed.unwrap().to_string(), "2025-03");

    let target = TenancyId("t-1".to_string());
    let transactions: Vec<_> = snapshot
        .transactions()
        .iter()
        .filter(|tx| tx.tenancy_id.as_ref() == Some(&target))
        .cloned()
        .collect();

    let facts = LedgerFacts {
        tenancy: tenancy("t-1", dec!(650.00)),
        reductions: Vec::new(),
        transactions,
        bounds,
    };
    let engine = LedgerEngine::new(LedgerConfig::default());
    let saldo = engine.saldo(&facts, chrono::NaiveDate::from_ymd_opt(2025, 3, 15).unwrap());

    // January and February are settled by the two transfers; March (the
    // current month) is still open.
    let statuses: Vec<PaymentStatus> = saldo.entries.iter().map(|entry| entry.status).collect();
    assert_eq!(
        statuses,
        [
            PaymentStatus::Paid,
            PaymentStatus::Paid,
            PaymentStatus::Open
        ]
    );
    assert_eq!(saldo.balance_excluding_current, dec!(0.00));

    // the February transfer is labeled as March rent by the cutoff rule
    assert!(saldo.entries[1].payments.is_empty());
    assert_eq!(saldo.entries[2].payments.len(), 1);
}

#[test]
fn unmatched_rows_never_reach_a_tenancy_ledger() {
    let snapshot = TransactionSnapshot::from_reader(Cursor::new(EXPORT)).expect("import parses");
    let unmatched: Vec<_> = snapshot
        .transactions()
        .iter()
        .filter(|tx| tx.tenancy_id.is_none())
        .collect();
    assert_eq!(unmatched.len(), 1);

    // observed periods come from classified rows only
    let observed: Vec<String> = snapshot
        .observed_periods()
        .iter()
        .map(ToString::to_string)
        .collect();
    assert_eq!(observed, ["2025-01", "2025-02", "2025-03"]);
}

#[test]
fn malformed_exports_fail_loudly() {
    let broken = "id,tenancy_id,date,amount,purpose\ntx-1,t-1,2025-01-02,650,EUR,extra\n";
    assert!(matches!(
        TransactionSnapshot::from_reader(Cursor::new(broken)),
        Err(SnapshotImportError::Csv(_))
    ));

    let bad_amount = "id,tenancy_id,date,amount,purpose\ntx-1,t-1,2025-01-02,~650,rent\n";
    assert!(matches!(
        TransactionSnapshot::from_reader(Cursor::new(bad_amount)),
        Err(SnapshotImportError::InvalidAmount { .. })
    ));
}
