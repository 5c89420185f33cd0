use crate::infra::{parse_amount, parse_date, InMemoryLedgerStore, InMemoryNoticePublisher};
use chrono::{Local, NaiveDate};
use clap::Args;
use rent_ledger::config::LedgerConfig;
use rent_ledger::error::AppError;
use rent_ledger::ledger::{
    LedgerEngine, LedgerFacts, LedgerService, ObligorKind, Period, RentReduction, Saldo, Tenancy,
    TenancyId, Transaction, TransactionId,
};
use rent_ledger::snapshot::TransactionSnapshot;
use rust_decimal::Decimal;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct SaldoReportArgs {
    /// Normalized transaction snapshot export (CSV)
    #[arg(long)]
    pub(crate) snapshot_csv: PathBuf,
    /// Tenancy whose ledger should be reconstructed
    #[arg(long)]
    pub(crate) tenancy_id: String,
    /// Contractual monthly rent for the tenancy
    #[arg(long, value_parser = parse_amount)]
    pub(crate) rent: Decimal,
    /// Move-in date (YYYY-MM-DD); without it the ledger starts at the
    /// earliest observed data
    #[arg(long, value_parser = parse_date)]
    pub(crate) move_in: Option<NaiveDate>,
    /// Reference date for the computation (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// List the payments displayed under each period
    #[arg(long)]
    pub(crate) list_payments: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Override the reporting date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
    /// List the payments displayed under each period
    #[arg(long)]
    pub(crate) list_payments: bool,
    /// Skip the escalation portion of the demo
    #[arg(long)]
    pub(crate) skip_escalation: bool,
}

pub(crate) fn run_saldo_report(args: SaldoReportArgs) -> Result<(), AppError> {
    let SaldoReportArgs {
        snapshot_csv,
        tenancy_id,
        rent,
        move_in,
        as_of,
        list_payments,
    } = args;

    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let snapshot = TransactionSnapshot::from_path(snapshot_csv)?;
    let bounds = snapshot.data_bounds();

    let target = TenancyId(tenancy_id.clone());
    let transactions: Vec<Transaction> = snapshot
        .transactions()
        .iter()
        .filter(|tx| tx.tenancy_id.as_ref() == Some(&target))
        .cloned()
        .collect();

    let tenancy = Tenancy {
        id: target,
        name: tenancy_id.clone(),
        unit_label: String::new(),
        contractual_rent: rent,
        move_in,
        active: true,
        obligor: ObligorKind::Solo,
    };

    let engine = LedgerEngine::new(LedgerConfig::default());
    let saldo = engine.saldo(
        &LedgerFacts {
            tenancy,
            reductions: Vec::new(),
            transactions,
            bounds,
        },
        as_of,
    );

    println!("Saldo for {tenancy_id} (as of {as_of})");
    render_saldo(&saldo, list_payments);

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        as_of,
        list_payments,
        skip_escalation,
    } = args;

    let as_of = as_of.unwrap_or_else(|| Local::now().date_naive());
    let current = Period::from_date(as_of);

    let store = Arc::new(InMemoryLedgerStore::default());
    let notices = Arc::new(InMemoryNoticePublisher::default());
    let service = Arc::new(LedgerService::new(
        store.clone(),
        notices.clone(),
        LedgerConfig::default(),
    ));

    seed_demo_property(&store, current);

    println!("Rent ledger demo (as of {as_of})");

    println!("\nSolo tenancy with a missed month");
    match service.saldo(&TenancyId("t-100".to_string()), as_of) {
        Ok(saldo) => render_saldo(&saldo, list_payments),
        Err(err) => println!("  Saldo unavailable: {}", err),
    }

    println!("\nShared apartment, pooled on the representative tenancy");
    match service.saldo(&TenancyId("wg-main".to_string()), as_of) {
        Ok(saldo) => render_saldo(&saldo, list_payments),
        Err(err) => println!("  Saldo unavailable: {}", err),
    }

    match service.member_payments(&TenancyId("wg-a".to_string())) {
        Ok(breakdown) if breakdown.is_empty() => {
            println!("  Member wg-a: no own payments recorded")
        }
        Ok(breakdown) => {
            println!("  Member wg-a, own payments by display period:");
            for (period, amount) in breakdown {
                println!("    - {period}: {amount}");
            }
        }
        Err(err) => println!("  Member breakdown unavailable: {}", err),
    }

    if skip_escalation {
        return Ok(());
    }

    println!("\nEscalation check for the solo tenancy");
    let tenant = TenancyId("t-100".to_string());
    let decision = match service.escalation(&tenant) {
        Ok(decision) => decision,
        Err(err) => {
            println!("  Escalation unavailable: {}", err);
            return Ok(());
        }
    };

    if !decision.in_arrears() {
        println!("  Nothing outstanding; no notice required");
        return Ok(());
    }

    println!(
        "  Next level: {} | months short: {} | total debt: {}",
        decision.next_level.label(),
        decision.open_periods.len(),
        decision.total_debt
    );
    for open in &decision.open_periods {
        println!(
            "    - {}: owed {} received {} short {}",
            open.period, open.obligation, open.received, open.diff
        );
    }

    match service.issue_notice(&tenant, as_of) {
        Ok(record) => println!(
            "  Issued {} over {} (deadline in {} days)",
            record.level.label(),
            record.amount,
            LedgerConfig::default().notice_deadline_days
        ),
        Err(err) => println!("  Notice not issued: {}", err),
    }

    for dispatch in notices.events() {
        println!(
            "  Dispatched to document generator: {} for {} ({}), pay by {}",
            dispatch.level_label, dispatch.tenant_name, dispatch.unit_label,
            dispatch.payment_deadline
        );
    }

    Ok(())
}

/// Seed a small two-unit property relative to the reporting period so the
/// demo shows every status at any wall-clock date.
fn seed_demo_property(store: &InMemoryLedgerStore, current: Period) {
    let start = current.previous().previous().previous();
    let months: Vec<Period> = start.through(current);

    let day = |period: Period, day: u32| {
        NaiveDate::from_ymd_opt(period.year(), period.month(), day).expect("valid demo date")
    };

    store.insert_tenancy(Tenancy {
        id: TenancyId("t-100".to_string()),
        name: "A. Meier".to_string(),
        unit_label: "1st floor left".to_string(),
        contractual_rent: Decimal::new(65000, 2),
        move_in: Some(day(start, 1)),
        active: true,
        obligor: ObligorKind::Solo,
    });

    // pays the first two months, then a late transfer, then nothing
    let mut transactions = vec![
        payment("tx-100", "t-100", day(months[0], 2), Decimal::new(65000, 2)),
        payment("tx-101", "t-100", day(months[1], 3), Decimal::new(65000, 2)),
        payment("tx-102", "t-100", day(months[1], 27), Decimal::new(32500, 2)),
    ];

    // heating outage: one month reduced by 150
    store.insert_reduction(RentReduction {
        tenancy_id: TenancyId("t-100".to_string()),
        period: months[2],
        amount: Decimal::new(15000, 2),
    });

    store.insert_tenancy(Tenancy {
        id: TenancyId("wg-main".to_string()),
        name: "WG Lindenhof".to_string(),
        unit_label: "2nd floor".to_string(),
        contractual_rent: Decimal::new(90000, 2),
        move_in: Some(day(start, 1)),
        active: true,
        obligor: ObligorKind::GroupRepresentative {
            members: vec![TenancyId("wg-a".to_string()), TenancyId("wg-b".to_string())],
        },
    });
    for (member, rep) in [("wg-a", "wg-main"), ("wg-b", "wg-main")] {
        store.insert_tenancy(Tenancy {
            id: TenancyId(member.to_string()),
            name: member.to_uppercase(),
            unit_label: "2nd floor".to_string(),
            contractual_rent: Decimal::ZERO,
            move_in: Some(day(start, 1)),
            active: true,
            obligor: ObligorKind::GroupMember {
                representative: TenancyId(rep.to_string()),
            },
        });
    }

    for (index, month) in months.iter().enumerate().take(3) {
        transactions.push(payment(
            &format!("tx-2{index:02}"),
            "wg-a",
            day(*month, 4),
            Decimal::new(45000, 2),
        ));
        transactions.push(payment(
            &format!("tx-3{index:02}"),
            "wg-b",
            day(*month, 5),
            Decimal::new(45000, 2),
        ));
    }

    store.load_snapshot(TransactionSnapshot::from_transactions(transactions));
}

fn payment(id: &str, tenancy: &str, date: NaiveDate, amount: Decimal) -> Transaction {
    Transaction {
        id: TransactionId(id.to_string()),
        tenancy_id: Some(TenancyId(tenancy.to_string())),
        date,
        amount,
        purpose: "MIETE".to_string(),
    }
}

fn render_saldo(saldo: &Saldo, list_payments: bool) {
    if saldo.entries.is_empty() {
        println!("  No ledger data for this tenancy");
        return;
    }

    for entry in &saldo.entries {
        println!(
            "  {} | owed {:>9} | covered {:>9} | {}",
            entry.period,
            entry.obligation,
            entry.covered,
            entry.status.label()
        );
        if list_payments {
            for payment in &entry.payments {
                println!(
                    "      received {} on {} ({})",
                    payment.amount, payment.date, payment.purpose
                );
            }
        }
    }

    println!(
        "  Totals: owed {} | paid {} | balance {} | balance excl. current {}",
        saldo.total_obligation, saldo.total_paid, saldo.balance, saldo.balance_excluding_current
    );
    println!(
        "  Current month: {} | last closed month: {}",
        saldo.current_period_status.label(),
        saldo.last_closed_period_status.label()
    );
}
