//! Integration tests for bondfolio-portfolio.
//!
//! These tests run the whole engine against an in-memory store double.

use std::collections::HashMap;

use approx::assert_relative_eq;
use bondfolio_portfolio::prelude::*;
use bondfolio_traits::{CurrencyRate, InstrumentStore, TraitError};

// =============================================================================
// TEST FIXTURES
// =============================================================================

#[derive(Default)]
struct TestStore {
    instruments: HashMap<InstrumentId, InstrumentRecord>,
    rates: HashMap<CurrencyCode, CurrencyRate>,
    fail: bool,
}

impl TestStore {
    fn with(mut self, record: InstrumentRecord) -> Self {
        self.instruments.insert(record.instrument_id.clone(), record);
        self
    }

    /// Adds a ruble-quoted fixing.
    fn with_rate(mut self, code: CurrencyCode, rate: f64) -> Self {
        self.rates
            .insert(code, CurrencyRate::new(code, CurrencyCode::RUB, rate));
        self
    }
}

impl InstrumentStore for TestStore {
    fn get_instrument(&self, id: &InstrumentId) -> Result<Option<InstrumentRecord>, TraitError> {
        if self.fail {
            return Err(TraitError::DatabaseError("disk on fire".into()));
        }
        Ok(self.instruments.get(id).cloned())
    }

    fn get_currency_rate(
        &self,
        code: &CurrencyCode,
    ) -> Result<Option<CurrencyRate>, TraitError> {
        Ok(self.rates.get(code).cloned())
    }
}

fn today() -> Date {
    Date::from_ymd(2025, 1, 15).unwrap()
}

fn config() -> AnalyticsConfig {
    AnalyticsConfig::sequential(today())
}

/// A plain RUB bond: face 1000, price 98, coupon 50 every 182 days, next
/// coupon in 20 days.
fn bond(isin: &str) -> InstrumentRecord {
    InstrumentRecord {
        secid: Some(isin.to_string()),
        trading_mode: Some("TQOB".into()),
        name: Some(format!("Bond {isin}")),
        face_value: Some(1000.0),
        lot_size: Some(1),
        face_currency: Some("RUB".into()),
        coupon_value: Some(50.0),
        coupon_percent: Some(10.0),
        coupon_period_days: Some(182),
        next_coupon_date: Some("2025-02-04".into()),
        maturity_date: Some("2026-08-04".into()),
        offer_date: Some("0000-00-00".into()),
        yield_calc_date: Some("2026-08-04".into()),
        issue_size: Some(1.0e10),
        last_price: Some(98.0),
        market_price: Some(97.9),
        effective_yield: Some(16.0),
        yield_to_maturity: Some(15.5),
        duration_days: Some(500.0),
        ..InstrumentRecord::new(isin)
    }
}

fn usd_bond(isin: &str) -> InstrumentRecord {
    InstrumentRecord {
        face_currency: Some("USD".into()),
        coupon_value: Some(20.0),
        effective_yield: Some(7.0),
        yield_to_maturity: Some(6.8),
        ..bond(isin)
    }
}

// =============================================================================
// SCENARIOS
// =============================================================================

#[test]
fn test_single_holding_value_matches_formula() {
    let store = TestStore::default().with(bond("RU000A0JX0J2"));
    let engine = PortfolioEngine::new(&store, config());
    let report = engine.run(&[Holding::new("RU000A0JX0J2", 10)]).unwrap();

    let h = &report.holdings[0];
    assert_eq!(h.days_to_next_coupon(), 20);
    assert_eq!(h.fx_status, FxStatus::Base);

    let expected = 1000.0 * 98.0 / 100.0 * 1.0 * 10.0 * 1.0 + (182.0 - 20.0) / 182.0 * 50.0 * 1.0;
    assert_relative_eq!(h.full_value_base, expected, epsilon = 1e-9);
    assert_relative_eq!(h.portfolio_share, 1.0);
    assert_relative_eq!(report.total_value_base, expected, epsilon = 1e-9);
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_zero_portfolio_value_gives_zero_shares() {
    let zero = |isin: &str| InstrumentRecord {
        last_price: Some(0.0),
        coupon_value: Some(0.0),
        ..bond(isin)
    };
    let store = TestStore::default().with(zero("A")).with(zero("B"));
    let engine = PortfolioEngine::new(&store, config());

    let mut diags = Diagnostics::new();
    let positions: Vec<(NormalizedInstrument, i64)> = ["A", "B"]
        .iter()
        .map(|id| {
            let record = store.instruments[&InstrumentId::new(*id)].clone();
            let row = engine.normalize_record(&record).unwrap().row;
            (NormalizedInstrument::from_row(&record.instrument_id, &row).unwrap(), 5)
        })
        .collect();
    let holdings = value_holdings(
        &positions,
        &FxTable::new(CurrencyCode::RUB),
        engine.config(),
        &mut diags,
    );

    assert!(holdings.iter().all(|h| h.portfolio_share == 0.0));
    assert_eq!(diags.count(DiagnosticKind::DivideByZeroGuard), 1);

    // Through the engine no currency qualifies, which is a run-level error.
    let err = engine
        .run(&[Holding::new("A", 5), Holding::new("B", 5)])
        .unwrap_err();
    assert_eq!(err, PortfolioError::NoNonzeroCurrency { currencies: 1 });
}

#[test]
fn test_zero_coupon_period_excluded() {
    let broken = InstrumentRecord {
        coupon_period_days: Some(0),
        ..bond("BROKEN")
    };
    let store = TestStore::default()
        .with(bond("A"))
        .with(bond("B"))
        .with(broken);
    let engine = PortfolioEngine::new(&store, config());
    let report = engine
        .run(&[
            Holding::new("A", 1),
            Holding::new("BROKEN", 4),
            Holding::new("B", 3),
        ])
        .unwrap();

    assert_eq!(report.holdings.len(), 2);
    assert!(report.holding(&InstrumentId::new("BROKEN")).is_none());
    assert!(report
        .diagnostics
        .has(DiagnosticKind::DivideByZeroGuard, &InstrumentId::new("BROKEN")));

    let sum: f64 = report.holdings.iter().map(|h| h.portfolio_share).sum();
    assert_relative_eq!(sum, 1.0, epsilon = 1e-12);
}

#[test]
fn test_implausible_coupon_period_dropped() {
    let runaway = InstrumentRecord {
        coupon_period_days: Some(200_000_000),
        ..bond("RUNAWAY")
    };
    let store = TestStore::default().with(bond("A")).with(runaway);
    let engine = PortfolioEngine::new(&store, config());
    let report = engine
        .run(&[Holding::new("A", 1), Holding::new("RUNAWAY", 2)])
        .unwrap();

    assert_eq!(report.holdings.len(), 1);
    assert!(report
        .diagnostics
        .has(DiagnosticKind::MissingField, &InstrumentId::new("RUNAWAY")));
    assert!(!report.calendar.is_empty());
}

#[test]
fn test_unresolved_currency_flagged() {
    let store = TestStore::default()
        .with(bond("RUB1"))
        .with(usd_bond("USD1"))
        .with(InstrumentRecord {
            face_currency: Some("CNY".into()),
            ..bond("CNY1")
        })
        .with_rate(CurrencyCode::USD, 90.0);
    let engine = PortfolioEngine::new(&store, config());
    let report = engine
        .run(&[
            Holding::new("RUB1", 10),
            Holding::new("USD1", 2),
            Holding::new("CNY1", 7),
        ])
        .unwrap();

    let cny = report.holding(&InstrumentId::new("CNY1")).unwrap();
    assert_eq!(cny.fx_status, FxStatus::Unresolved);
    assert_eq!(cny.fx_rate_to_base, 0.0);
    assert_eq!(cny.full_value_base, 0.0);
    assert!(report
        .diagnostics
        .has(DiagnosticKind::UnresolvedCurrency, &InstrumentId::new("CNY1")));

    let usd = report.holding(&InstrumentId::new("USD1")).unwrap();
    assert_eq!(usd.fx_status, FxStatus::Resolved);
    assert!(usd.full_value_base > 0.0);

    // CNY has no share and no metrics; USD metrics depend only on USD bonds.
    assert!(report.metrics_for(CurrencyCode::CNY).is_none());
    let usd_metrics = report.metrics_for(CurrencyCode::USD).unwrap();
    assert_relative_eq!(usd_metrics.weighted_effective_yield, 7.0, epsilon = 1e-12);
    assert_relative_eq!(usd_metrics.weighted_yield, 6.8, epsilon = 1e-12);
}

#[test]
fn test_dollar_base_crosses_ruble_fixings() {
    let in_currency = |isin: &str, currency: &str| InstrumentRecord {
        face_currency: Some(currency.into()),
        ..bond(isin)
    };
    let store = TestStore::default()
        .with(in_currency("USD1", "USD"))
        .with(in_currency("EUR1", "EUR"))
        .with(in_currency("RUB1", "RUB"))
        .with_rate(CurrencyCode::USD, 92.0)
        .with_rate(CurrencyCode::EUR, 100.0);
    let engine = PortfolioEngine::new(
        &store,
        config().with_base_currency(CurrencyCode::USD),
    );
    let report = engine
        .run(&[
            Holding::new("USD1", 1),
            Holding::new("EUR1", 1),
            Holding::new("RUB1", 1),
        ])
        .unwrap();

    let usd = report.holding(&InstrumentId::new("USD1")).unwrap();
    let eur = report.holding(&InstrumentId::new("EUR1")).unwrap();
    let rub = report.holding(&InstrumentId::new("RUB1")).unwrap();

    assert_eq!(usd.fx_status, FxStatus::Base);
    assert_eq!(eur.fx_status, FxStatus::Resolved);
    assert_relative_eq!(eur.fx_rate_to_base, 100.0 / 92.0, epsilon = 1e-12);
    assert_relative_eq!(rub.fx_rate_to_base, 1.0 / 92.0, epsilon = 1e-12);

    // Same bond in three currencies: values scale by the cross rate only
    assert_relative_eq!(
        eur.full_value_base,
        usd.full_value_base * 100.0 / 92.0,
        epsilon = 1e-9
    );
    assert_relative_eq!(
        rub.full_value_base,
        usd.full_value_base / 92.0,
        epsilon = 1e-9
    );
    assert!(report.diagnostics.is_empty());
}

#[test]
fn test_principal_omitted_when_maturity_month_has_no_coupon() {
    // coupons 2025-02-04, 2025-08-05; maturity 2025-06-30
    let short = InstrumentRecord {
        maturity_date: Some("2025-06-30".into()),
        ..bond("SHORT")
    };
    let store = TestStore::default().with(short);
    let engine = PortfolioEngine::new(&store, config());
    let report = engine.run(&[Holding::new("SHORT", 3)]).unwrap();

    let june = Date::from_ymd(2025, 6, 1).unwrap();
    assert_eq!(report.calendar.get(june), Some(0.0));
    assert_eq!(report.calendar.last_month(), Some(june));
    // only the February coupon falls inside the calendar
    assert_relative_eq!(report.calendar.total(), 50.0 * 3.0);
}

// =============================================================================
// PIPELINE BEHAVIOR
// =============================================================================

#[test]
fn test_calendar_spans_current_month_to_last_maturity() {
    let store = TestStore::default().with(bond("A")).with(InstrumentRecord {
        maturity_date: Some("2027-03-10".into()),
        ..bond("B")
    });
    let engine = PortfolioEngine::new(&store, config());
    let report = engine
        .run(&[Holding::new("A", 1), Holding::new("B", 1)])
        .unwrap();

    assert_eq!(report.calendar.first_month(), Some(Date::from_ymd(2025, 1, 1).unwrap()));
    assert_eq!(report.calendar.last_month(), Some(Date::from_ymd(2027, 3, 1).unwrap()));
    assert_eq!(report.calendar.len(), 27);

    // A matures 2026-08-04, exactly 3 * 182 days after its next coupon, so
    // its principal lands in August 2026.
    let aug = report.calendar.get(Date::from_ymd(2026, 8, 1).unwrap()).unwrap();
    assert!(aug >= 1000.0);
}

#[test]
fn test_duplicates_merged() {
    let store = TestStore::default().with(bond("A"));
    let engine = PortfolioEngine::new(&store, config());
    let report = engine
        .run(&[Holding::new("A", 4), Holding::new("A", 6)])
        .unwrap();

    assert_eq!(report.holdings.len(), 1);
    assert_eq!(report.holdings[0].lot_count, 10);
    assert_eq!(report.diagnostics.count(DiagnosticKind::DuplicateHolding), 1);
}

#[test]
fn test_missing_record_dropped() {
    let store = TestStore::default().with(bond("A"));
    let engine = PortfolioEngine::new(&store, config());
    let report = engine
        .run(&[Holding::new("A", 1), Holding::new("GONE", 1)])
        .unwrap();

    assert_eq!(report.holdings.len(), 1);
    assert!(report
        .diagnostics
        .has(DiagnosticKind::MissingRecord, &InstrumentId::new("GONE")));
}

#[test]
fn test_bad_date_dropped() {
    let bad = InstrumentRecord {
        maturity_date: Some("not a date".into()),
        ..bond("BAD")
    };
    let store = TestStore::default().with(bond("A")).with(bad);
    let engine = PortfolioEngine::new(&store, config());
    let report = engine
        .run(&[Holding::new("A", 1), Holding::new("BAD", 1)])
        .unwrap();

    assert_eq!(report.holdings.len(), 1);
    assert!(report
        .diagnostics
        .has(DiagnosticKind::DateParse, &InstrumentId::new("BAD")));
}

#[test]
fn test_missing_field_dropped() {
    let no_price = InstrumentRecord {
        last_price: None,
        market_price: None,
        ..bond("NOPRICE")
    };
    let store = TestStore::default().with(bond("A")).with(no_price);
    let engine = PortfolioEngine::new(&store, config());
    let report = engine
        .run(&[Holding::new("A", 1), Holding::new("NOPRICE", 1)])
        .unwrap();

    assert!(report
        .diagnostics
        .has(DiagnosticKind::MissingField, &InstrumentId::new("NOPRICE")));
}

#[test]
fn test_missing_drop_column_reported_once() {
    let store = TestStore::default().with(bond("A")).with(bond("B"));
    let engine = PortfolioEngine::new(
        &store,
        config().with_drop_columns(["secid", "board"]),
    );
    let report = engine
        .run(&[Holding::new("A", 1), Holding::new("B", 1)])
        .unwrap();

    assert_eq!(report.diagnostics.count(DiagnosticKind::MissingDropColumn), 1);
}

#[test]
fn test_run_level_errors() {
    let store = TestStore::default().with(bond("A"));
    let engine = PortfolioEngine::new(&store, config());

    assert_eq!(engine.run(&[]).unwrap_err(), PortfolioError::EmptyPortfolio);
    assert_eq!(
        engine.run(&[Holding::new("X", 1), Holding::new("Y", 1)]).unwrap_err(),
        PortfolioError::NoValuedHoldings { dropped: 2 }
    );

    let failing = TestStore {
        fail: true,
        ..TestStore::default()
    };
    let engine = PortfolioEngine::new(&failing, config());
    assert!(matches!(
        engine.run(&[Holding::new("A", 1)]),
        Err(PortfolioError::DataSource { .. })
    ));
}

#[test]
fn test_report_serializes() {
    let store = TestStore::default().with(bond("A"));
    let engine = PortfolioEngine::new(&store, config());
    let report = engine.run(&[Holding::new("A", 2)]).unwrap();

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["base_currency"], "RUB");
    assert_eq!(json["as_of"], "2025-01-15");
    assert_eq!(json["currency_metrics"][0]["currency"], "RUB");
    assert_eq!(json["calendar"][0]["month"], "2025-01-01");
    assert_eq!(json["holdings"][0]["fx_status"], "base");
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_matches_sequential() {
    let mut store = TestStore::default();
    let mut holdings = Vec::new();
    for i in 0..250 {
        let isin = format!("RU{i:010}");
        let record = InstrumentRecord {
            last_price: Some(90.0 + (i % 15) as f64),
            maturity_date: Some(format!("20{}-0{}-15", 26 + i % 10, 1 + i % 9)),
            ..bond(&isin)
        };
        store = store.with(record);
        holdings.push(Holding::new(isin, 1 + i64::from(i % 7)));
    }

    let seq = PortfolioEngine::new(&store, config()).run(&holdings).unwrap();
    let par = PortfolioEngine::new(&store, config().with_parallel(true).with_threshold(10))
        .run(&holdings)
        .unwrap();

    assert_relative_eq!(seq.total_value_base, par.total_value_base, epsilon = 1e-6);
    for ((m1, a1), (m2, a2)) in seq.calendar.iter().zip(par.calendar.iter()) {
        assert_eq!(m1, m2);
        assert_relative_eq!(a1, a2, epsilon = 1e-6);
    }
}
