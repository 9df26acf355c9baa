//! Record types exchanged with collaborators.
//!
//! - [`InstrumentRecord`]: raw reference and market snapshot for one bond,
//!   as fetched and stored (dates are still the provider's text)
//! - [`Holding`]: one line of the user's portfolio
//! - [`CurrencyRate`]: latest rate of a currency against the base currency

use bondfolio_core::types::{CurrencyCode, Date, FieldValue, Row};
use serde::{Deserialize, Serialize};

use crate::ids::InstrumentId;

/// Column names used when an [`InstrumentRecord`] is turned into a [`Row`].
pub mod columns {
    /// Exchange security code.
    pub const SECID: &str = "secid";
    /// Trading mode (board).
    pub const TRADING_MODE: &str = "trading_mode";
    /// Coupon amount per bond, in face currency.
    pub const COUPON_VALUE: &str = "coupon_value";
    /// Next coupon date.
    pub const NEXT_COUPON_DATE: &str = "next_coupon_date";
    /// Bonds per trading lot.
    pub const LOT_SIZE: &str = "lot_size";
    /// Face value per bond.
    pub const FACE_VALUE: &str = "face_value";
    /// Listing status.
    pub const STATUS: &str = "status";
    /// Maturity date.
    pub const MATURITY_DATE: &str = "maturity_date";
    /// Days between coupons.
    pub const COUPON_PERIOD_DAYS: &str = "coupon_period_days";
    /// Issue size in bonds.
    pub const ISSUE_SIZE: &str = "issue_size";
    /// Security name.
    pub const NAME: &str = "name";
    /// Face currency.
    pub const FACE_CURRENCY: &str = "face_currency";
    /// ISIN.
    pub const ISIN: &str = "isin";
    /// Annual coupon rate in percent.
    pub const COUPON_PERCENT: &str = "coupon_percent";
    /// Put/call offer date.
    pub const OFFER_DATE: &str = "offer_date";
    /// Last trade price, percent of face.
    pub const LAST_PRICE: &str = "last_price";
    /// Exchange market price, percent of face.
    pub const MARKET_PRICE: &str = "market_price";
    /// Traded value today, in rubles.
    pub const TRADE_VALUE: &str = "trade_value";
    /// Quoted yield.
    pub const YIELD_TO_MATURITY: &str = "yield_to_maturity";
    /// Traded value today, in dollars.
    pub const TRADE_VALUE_USD: &str = "trade_value_usd";
    /// Duration in days.
    pub const DURATION_DAYS: &str = "duration_days";
    /// Yield to offer.
    pub const YIELD_TO_OFFER: &str = "yield_to_offer";
    /// Date the yield is calculated to.
    pub const YIELD_CALC_DATE: &str = "yield_calc_date";
    /// Event type at the yield calculation date.
    pub const YIELD_CALC_EVENT_TYPE: &str = "yield_calc_event_type";
    /// Effective yield to maturity.
    pub const EFFECTIVE_YIELD: &str = "effective_yield";
    /// Z-spread in basis points.
    pub const Z_SPREAD_BP: &str = "z_spread_bp";
    /// G-spread in basis points.
    pub const G_SPREAD_BP: &str = "g_spread_bp";

    /// Date columns parsed by default.
    pub const DEFAULT_DATE_COLUMNS: [&str; 4] =
        [NEXT_COUPON_DATE, MATURITY_DATE, YIELD_CALC_DATE, OFFER_DATE];

    /// Columns dropped by default after date parsing.
    pub const DEFAULT_DROP_COLUMNS: [&str; 3] = [SECID, TRADING_MODE, ISSUE_SIZE];

    /// Name of the delta column paired with a date column.
    #[must_use]
    pub fn delta_of(column: &str) -> String {
        format!("{column}_delta")
    }
}

/// Raw reference and market snapshot for one instrument.
///
/// Every field except the identifier is optional: the provider leaves
/// blocks out for illiquid or matured bonds, and deciding which fields are
/// required is the engine's job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InstrumentRecord {
    /// ISIN, the portfolio key.
    pub instrument_id: InstrumentId,
    /// Exchange security code.
    pub secid: Option<String>,
    /// Trading mode (board).
    pub trading_mode: Option<String>,
    /// Security name.
    pub name: Option<String>,
    /// Face value per bond.
    pub face_value: Option<f64>,
    /// Bonds per trading lot.
    pub lot_size: Option<i64>,
    /// Face currency code as published.
    pub face_currency: Option<String>,
    /// Coupon amount per bond.
    pub coupon_value: Option<f64>,
    /// Annual coupon rate in percent.
    pub coupon_percent: Option<f64>,
    /// Days between coupons.
    pub coupon_period_days: Option<i64>,
    /// Next coupon date (unparsed).
    pub next_coupon_date: Option<String>,
    /// Maturity date (unparsed).
    pub maturity_date: Option<String>,
    /// Offer date (unparsed).
    pub offer_date: Option<String>,
    /// Issue size in bonds.
    pub issue_size: Option<f64>,
    /// Listing status.
    pub status: Option<String>,
    /// Last trade price, percent of face.
    pub last_price: Option<f64>,
    /// Exchange market price, percent of face.
    pub market_price: Option<f64>,
    /// Traded value today, in rubles.
    pub trade_value: Option<f64>,
    /// Traded value today, in dollars.
    pub trade_value_usd: Option<f64>,
    /// Quoted yield.
    pub yield_to_maturity: Option<f64>,
    /// Effective yield to maturity.
    pub effective_yield: Option<f64>,
    /// Duration in days.
    pub duration_days: Option<f64>,
    /// Yield to offer.
    pub yield_to_offer: Option<f64>,
    /// Date the yield is calculated to (unparsed).
    pub yield_calc_date: Option<String>,
    /// Event type at the yield calculation date.
    pub yield_calc_event_type: Option<String>,
    /// Z-spread in basis points.
    pub z_spread_bp: Option<f64>,
    /// G-spread in basis points.
    pub g_spread_bp: Option<f64>,
}

impl InstrumentRecord {
    /// Creates an empty record for an instrument.
    pub fn new(instrument_id: impl Into<InstrumentId>) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            ..Self::default()
        }
    }

    /// Converts the record into a tabular row.
    ///
    /// Columns follow the order of the exchange's securities, marketdata and
    /// marketdata_yields blocks. Dates stay as text; the normalizer parses them.
    #[must_use]
    pub fn to_row(&self) -> Row {
        use columns::*;

        let text = |v: &Option<String>| FieldValue::from(v.clone());

        [
            (SECID, text(&self.secid)),
            (TRADING_MODE, text(&self.trading_mode)),
            (COUPON_VALUE, self.coupon_value.into()),
            (NEXT_COUPON_DATE, text(&self.next_coupon_date)),
            (LOT_SIZE, self.lot_size.into()),
            (FACE_VALUE, self.face_value.into()),
            (STATUS, text(&self.status)),
            (MATURITY_DATE, text(&self.maturity_date)),
            (COUPON_PERIOD_DAYS, self.coupon_period_days.into()),
            (ISSUE_SIZE, self.issue_size.into()),
            (NAME, text(&self.name)),
            (FACE_CURRENCY, text(&self.face_currency)),
            (ISIN, FieldValue::Text(self.instrument_id.to_string())),
            (COUPON_PERCENT, self.coupon_percent.into()),
            (OFFER_DATE, text(&self.offer_date)),
            (LAST_PRICE, self.last_price.into()),
            (MARKET_PRICE, self.market_price.into()),
            (TRADE_VALUE, self.trade_value.into()),
            (YIELD_TO_MATURITY, self.yield_to_maturity.into()),
            (TRADE_VALUE_USD, self.trade_value_usd.into()),
            (DURATION_DAYS, self.duration_days.into()),
            (YIELD_TO_OFFER, self.yield_to_offer.into()),
            (YIELD_CALC_DATE, text(&self.yield_calc_date)),
            (YIELD_CALC_EVENT_TYPE, text(&self.yield_calc_event_type)),
            (EFFECTIVE_YIELD, self.effective_yield.into()),
            (Z_SPREAD_BP, self.z_spread_bp.into()),
            (G_SPREAD_BP, self.g_spread_bp.into()),
        ]
        .into_iter()
        .collect()
    }
}

/// One portfolio line: an instrument and the number of lots held.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    /// Instrument held.
    pub instrument_id: InstrumentId,
    /// Number of trading lots.
    pub lot_count: i64,
}

impl Holding {
    /// Creates a holding.
    pub fn new(instrument_id: impl Into<InstrumentId>, lot_count: i64) -> Self {
        Self {
            instrument_id: instrument_id.into(),
            lot_count,
        }
    }
}

/// Latest rate of one currency, quoted in another.
///
/// Exchange fixings are published against a single quote currency (rubles
/// for ISS `XXXFIX` tickers). Converting to any other reporting currency
/// crosses through the quote.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyRate {
    /// Priced currency.
    pub currency: CurrencyCode,
    /// Currency the rate is expressed in.
    pub quote: CurrencyCode,
    /// Units of `quote` per unit of `currency`.
    pub rate: f64,
    /// Fixing date, if published.
    pub trade_date: Option<Date>,
}

impl CurrencyRate {
    /// Creates a rate without a fixing date.
    #[must_use]
    pub fn new(currency: CurrencyCode, quote: CurrencyCode, rate: f64) -> Self {
        Self {
            currency,
            quote,
            rate,
            trade_date: None,
        }
    }

    /// True for a positive finite rate.
    #[must_use]
    pub fn is_usable(&self) -> bool {
        self.rate.is_finite() && self.rate > 0.0
    }

    /// Sets the fixing date.
    #[must_use]
    pub fn with_trade_date(mut self, date: Date) -> Self {
        self.trade_date = Some(date);
        self
    }
}
