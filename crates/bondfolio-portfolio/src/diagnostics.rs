//! Recoverable problems found during a run.
//!
//! Every instrument-level failure is recorded here rather than aborting the
//! run, so a user can audit which parts of the portfolio the numbers cover.
//! Recording a diagnostic also emits a `tracing` warning.

use std::fmt;

use bondfolio_core::types::CurrencyCode;
use bondfolio_traits::InstrumentId;
use serde::Serialize;
use tracing::warn;

/// Category of a recoverable problem.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// A designated date field could not be parsed. Instrument dropped.
    DateParse,
    /// Instrument not found upstream or in the store. Instrument dropped.
    MissingRecord,
    /// A required field is absent or malformed. Instrument dropped.
    MissingField,
    /// An optional weighting input is absent. Contributes zero.
    MissingMetric,
    /// Zero coupon period or zero portfolio total.
    DivideByZeroGuard,
    /// No usable FX rate. Holding valued at zero.
    UnresolvedCurrency,
    /// Instrument listed more than once. Lot counts merged.
    DuplicateHolding,
    /// A column to drop does not exist.
    MissingDropColumn,
    /// A data source call failed.
    FetchFailed,
}

impl DiagnosticKind {
    /// Stable snake_case name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DateParse => "date_parse",
            Self::MissingRecord => "missing_record",
            Self::MissingField => "missing_field",
            Self::MissingMetric => "missing_metric",
            Self::DivideByZeroGuard => "divide_by_zero_guard",
            Self::UnresolvedCurrency => "unresolved_currency",
            Self::DuplicateHolding => "duplicate_holding",
            Self::MissingDropColumn => "missing_drop_column",
            Self::FetchFailed => "fetch_failed",
        }
    }

    /// Returns true if this kind removes the instrument from valuation.
    #[must_use]
    pub fn drops_instrument(&self) -> bool {
        matches!(
            self,
            Self::DateParse | Self::MissingRecord | Self::MissingField
        )
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recoverable problem.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    /// Category.
    pub kind: DiagnosticKind,
    /// Instrument concerned, if any.
    pub instrument_id: Option<InstrumentId>,
    /// Currency concerned, if any.
    pub currency: Option<CurrencyCode>,
    /// Human-readable detail.
    pub message: String,
}

impl Diagnostic {
    /// Creates a diagnostic about one instrument.
    pub fn instrument(kind: DiagnosticKind, id: &InstrumentId, message: impl Into<String>) -> Self {
        Self {
            kind,
            instrument_id: Some(id.clone()),
            currency: None,
            message: message.into(),
        }
    }

    /// Creates a diagnostic about one currency.
    pub fn currency(kind: DiagnosticKind, currency: CurrencyCode, message: impl Into<String>) -> Self {
        Self {
            kind,
            instrument_id: None,
            currency: Some(currency),
            message: message.into(),
        }
    }

    /// Creates a portfolio-wide diagnostic.
    pub fn portfolio(kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            instrument_id: None,
            currency: None,
            message: message.into(),
        }
    }

    /// Attaches a currency.
    #[must_use]
    pub fn with_currency(mut self, currency: CurrencyCode) -> Self {
        self.currency = Some(currency);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.kind)?;
        if let Some(id) = &self.instrument_id {
            write!(f, " {id}")?;
        }
        if let Some(currency) = &self.currency {
            write!(f, " ({currency})")?;
        }
        write!(f, ": {}", self.message)
    }
}

/// Ordered collection of diagnostics for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a diagnostic and logs it.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        warn!(
            kind = diagnostic.kind.as_str(),
            instrument = diagnostic.instrument_id.as_ref().map(InstrumentId::as_str),
            currency = diagnostic.currency.as_ref().map(CurrencyCode::as_str),
            "{}",
            diagnostic.message
        );
        self.entries.push(diagnostic);
    }

    /// Appends all diagnostics from another collection without logging again.
    pub fn extend(&mut self, other: Diagnostics) {
        self.entries.extend(other.entries);
    }

    /// Number of diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates in recording order.
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Iterates over diagnostics of one kind.
    pub fn of_kind(&self, kind: DiagnosticKind) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter().filter(move |d| d.kind == kind)
    }

    /// Counts diagnostics of one kind.
    #[must_use]
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.of_kind(kind).count()
    }

    /// Returns true if any diagnostic of `kind` concerns `id`.
    #[must_use]
    pub fn has(&self, kind: DiagnosticKind, id: &InstrumentId) -> bool {
        self.of_kind(kind)
            .any(|d| d.instrument_id.as_ref() == Some(id))
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
