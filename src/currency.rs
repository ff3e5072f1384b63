//! Best-effort currency handling.
//!
//! This module sits outside the metrics core: ledgers are analysed in a
//! single base currency, and the helpers here only detect currency markers
//! in raw amount text, format amounts for display and convert foreign
//! amounts with a [`RateTable`].
//!
//! Rates come from, in order of preference, a fresh [`RateCache`] file, the
//! exchange-rate HTTP API (feature `rates`) and finally a built-in fallback
//! table. [`CurrencyConverter`] combines the three and never fails.

mod cache;
#[cfg(feature = "rates")]
mod fetch;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use cache::RateCache;
#[cfg(feature = "rates")]
pub use fetch::{DEFAULT_RATES_URL, RateClient, RateClientBuilder};

/// Supported ISO codes and their display symbols.
///
/// Symbols sharing a suffix (`$`, `C$`, `A$`, `R$`) are told apart by
/// [`detect_currency`], which tries longer symbols first.
const CURRENCIES: &[(&str, &str)] = &[
    ("USD", "$"),
    ("EUR", "\u{20ac}"),
    ("GBP", "\u{a3}"),
    ("EGP", "E\u{a3}"),
    ("JPY", "\u{a5}"),
    ("INR", "\u{20b9}"),
    ("BRL", "R$"),
    ("CAD", "C$"),
    ("AUD", "A$"),
    ("CHF", "CHF"),
    ("SAR", "SR"),
    ("AED", "AED"),
];

/// Currencies written with the symbol after the number.
const SUFFIX_SYMBOL: &[&str] = &["EUR", "INR", "BRL"];

/// Approximate USD-anchored rates used when no live or cached rates exist.
const FALLBACK_USD_RATES: &[(&str, f64)] = &[
    ("USD", 1.0),
    ("EUR", 0.92),
    ("GBP", 0.79),
    ("EGP", 48.5),
    ("JPY", 150.0),
    ("INR", 83.0),
    ("BRL", 5.0),
    ("CAD", 1.36),
    ("AUD", 1.52),
    ("CHF", 0.88),
    ("SAR", 3.75),
    ("AED", 3.67),
];

/// Returns the ISO codes of all supported currencies.
#[inline]
#[must_use]
pub fn supported_currencies() -> Vec<&'static str> {
    CURRENCIES.iter().map(|&(code, _)| code).collect()
}

/// Returns the display symbol of `code`, or the code itself if unknown.
#[inline]
#[must_use]
pub fn symbol_for(code: &str) -> &str {
    CURRENCIES
        .iter()
        .find(|&&(known, _)| known == code)
        .map_or(code, |&(_, symbol)| symbol)
}

/// Detects the currency named in free-form amount text.
///
/// ISO codes are matched first (case-insensitive), then symbols, longest
/// first. Returns `fallback` when nothing matches.
///
/// # Examples
///
/// ```
/// use ledger_report::currency::detect_currency;
///
/// assert_eq!(detect_currency("12.50 usd", "EGP"), "USD");
/// assert_eq!(detect_currency("R$ 40", "EGP"), "BRL");
/// assert_eq!(detect_currency("$40", "EGP"), "USD");
/// assert_eq!(detect_currency("1,200", "EGP"), "EGP");
/// ```
#[inline]
#[must_use]
pub fn detect_currency<'fallback>(text: &str, fallback: &'fallback str) -> &'fallback str {
    let upper = text.trim().to_uppercase();
    if let Some(&(code, _)) = CURRENCIES.iter().find(|&&(code, _)| upper.contains(code)) {
        return code;
    }

    let mut by_symbol: Vec<(&'static str, &'static str)> = CURRENCIES.to_vec();
    by_symbol.sort_by_key(|&(_, symbol)| core::cmp::Reverse(symbol.chars().count()));
    by_symbol
        .into_iter()
        .find(|&(_, symbol)| text.contains(symbol))
        .map_or(fallback, |(code, _)| code)
}

/// Removes currency codes, symbols and thousands separators from amount
/// text, leaving only the number.
pub(crate) fn strip_currency_markers(text: &str) -> String {
    let mut markers: Vec<&str> = CURRENCIES
        .iter()
        .flat_map(|&(code, symbol)| [code, symbol])
        .collect();
    markers.sort_by_key(|marker| core::cmp::Reverse(marker.chars().count()));
    let mut cleaned = text.to_uppercase();
    for marker in markers {
        cleaned = cleaned.replace(marker, "");
    }
    cleaned.replace(',', "").trim().to_owned()
}

/// Formats `amount` with two decimals, thousands separators and the
/// currency symbol.
///
/// EUR, INR and BRL place the symbol after the number; all others before.
///
/// # Examples
///
/// ```
/// use ledger_report::currency::format_amount;
///
/// assert_eq!(format_amount(1234.5, "USD"), "$1,234.50");
/// assert_eq!(format_amount(-99.0, "EUR"), "-99.00 \u{20ac}");
/// assert_eq!(format_amount(10.0, "XYZ"), "XYZ10.00");
/// ```
#[inline]
#[must_use]
pub fn format_amount(amount: f64, currency: &str) -> String {
    let symbol = symbol_for(currency);
    let digits = group_thousands(amount.abs());
    let sign = if amount < 0.0_f64 && digits != "0.00" {
        "-"
    } else {
        ""
    };
    if SUFFIX_SYMBOL.contains(&currency) {
        format!("{sign}{digits} {symbol}")
    } else {
        format!("{sign}{symbol}{digits}")
    }
}

/// Formats a non-negative value with two decimals and comma grouping.
fn group_thousands(value: f64) -> String {
    let fixed = format!("{value:.2}");
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    let digits = whole.chars().count();
    let mut grouped = String::with_capacity(fixed.len().saturating_add(digits));
    for (idx, digit) in whole.chars().enumerate() {
        if idx > 0 && (digits - idx) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped.push('.');
    grouped.push_str(fraction);
    grouped
}

/// Rounds to cents.
fn round_cents(value: f64) -> f64 {
    (value * 100.0_f64).round() / 100.0_f64
}

/// Exchange rates relative to one base currency.
///
/// `rates[code]` is the number of `code` units one unit of `base` buys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateTable {
    /// ISO code the rates are quoted against.
    pub base: String,
    /// Units of each currency per one unit of `base`.
    pub rates: BTreeMap<String, f64>,
    /// When the rates were obtained; `None` for built-in fallback rates.
    #[serde(default)]
    pub fetched_at: Option<DateTime<Utc>>,
}

impl RateTable {
    /// Creates a table from explicit rates.
    #[inline]
    #[must_use]
    pub fn new<B: Into<String>>(
        base: B,
        rates: BTreeMap<String, f64>,
        fetched_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            base: base.into(),
            rates,
            fetched_at,
        }
    }

    /// Built-in approximate rates re-anchored on `base`.
    ///
    /// An unknown base keeps the USD anchoring.
    #[inline]
    #[must_use]
    pub fn fallback(base: &str) -> Self {
        let anchor = FALLBACK_USD_RATES
            .iter()
            .find(|&&(code, _)| code == base)
            .map_or_else(
                || {
                    tracing::warn!(base, "no fallback rate for base currency, anchoring on USD");
                    1.0_f64
                },
                |&(_, rate)| rate,
            );
        let rates = FALLBACK_USD_RATES
            .iter()
            .map(|&(code, rate)| (code.to_owned(), rate / anchor))
            .collect();
        Self::new(base, rates, None)
    }

    /// Returns `true` if the rates come from the built-in fallback table.
    #[inline]
    #[must_use]
    pub const fn is_fallback(&self) -> bool {
        self.fetched_at.is_none()
    }

    /// Multiplier converting one unit of `from` into `to`.
    ///
    /// Unknown currencies are treated as having rate 1.0.
    #[inline]
    #[must_use]
    pub fn rate(&self, from: &str, to: &str) -> f64 {
        if from == to {
            1.0_f64
        } else if to == self.base {
            1.0_f64 / self.lookup(from)
        } else if from == self.base {
            self.lookup(to)
        } else {
            (1.0_f64 / self.lookup(from)) * self.lookup(to)
        }
    }

    /// Converts `amount` from `from` into `to`, rounded to cents.
    #[inline]
    #[must_use]
    pub fn convert(&self, amount: f64, from: &str, to: &str) -> f64 {
        if from == to {
            return amount;
        }
        round_cents(amount * self.rate(from, to))
    }

    /// Converts `amount` from `from` into the table's base currency.
    #[inline]
    #[must_use]
    pub fn to_base(&self, amount: f64, from: &str) -> f64 {
        self.convert(amount, from, &self.base)
    }

    /// Rate of `code` against the base, 1.0 when missing or unusable.
    fn lookup(&self, code: &str) -> f64 {
        self.rates
            .get(code)
            .copied()
            .filter(|rate| rate.is_finite() && *rate > 0.0_f64)
            .unwrap_or_else(|| {
                tracing::warn!(currency = code, base = %self.base, "no exchange rate, using 1.0");
                1.0_f64
            })
    }
}

/// Snapshot of the converter state for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionSummary {
    /// Base currency.
    pub base_currency: String,
    /// When the rates in use were fetched; `None` for fallback rates.
    pub last_updated: Option<DateTime<Utc>>,
    /// Whether a fresh cache entry exists.
    pub cache_valid: bool,
    /// Number of rates available.
    pub available_rates: usize,
    /// Supported ISO codes.
    pub supported_currencies: Vec<String>,
}

/// Resolves exchange rates from cache, network and fallback.
#[derive(Debug)]
pub struct CurrencyConverter {
    /// Base currency of the ledger.
    base: String,
    /// Optional on-disk cache.
    cache: Option<RateCache>,
    /// Optional HTTP client.
    #[cfg(feature = "rates")]
    client: Option<RateClient>,
}

impl CurrencyConverter {
    /// Creates a converter with neither cache nor network access.
    #[inline]
    #[must_use]
    pub fn new<B: Into<String>>(base: B) -> Self {
        Self {
            base: base.into(),
            cache: None,
            #[cfg(feature = "rates")]
            client: None,
        }
    }

    /// Attaches an on-disk rate cache.
    #[inline]
    #[must_use]
    pub fn with_cache(mut self, cache: RateCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Attaches an HTTP rate client.
    #[cfg(feature = "rates")]
    #[inline]
    #[must_use]
    pub fn with_client(mut self, client: RateClient) -> Self {
        self.client = Some(client);
        self
    }

    /// Base currency of the ledger.
    #[inline]
    #[must_use]
    pub fn base(&self) -> &str {
        &self.base
    }

    /// Returns the best available rates.
    ///
    /// A fresh cache entry wins; otherwise rates are fetched and cached;
    /// if that fails too the built-in fallback is used.
    #[inline]
    #[must_use]
    #[tracing::instrument(skip_all, fields(base = %self.base))]
    pub fn rates(&self) -> RateTable {
        if let Some(cached) = self.fresh_cache() {
            tracing::debug!("using cached exchange rates");
            return cached;
        }
        match self.refresh() {
            Ok(Some(table)) => table,
            Ok(None) => RateTable::fallback(&self.base),
            Err(err) => {
                tracing::warn!(error = %err, "could not fetch exchange rates, using fallback");
                RateTable::fallback(&self.base)
            }
        }
    }

    /// Fetches rates from the network and stores them in the cache.
    ///
    /// Returns `Ok(None)` when no client is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails. Failing to write the cache
    /// is only logged.
    #[inline]
    pub fn refresh(&self) -> Result<Option<RateTable>> {
        #[cfg(feature = "rates")]
        if let Some(client) = &self.client {
            let table = client.latest(&self.base)?;
            let saved = self.cache.as_ref().map(|cache| cache.save(&table));
            if let Some(Err(err)) = saved {
                tracing::warn!(error = %err, "could not save exchange rate cache");
            }
            return Ok(Some(table));
        }
        tracing::debug!("no rate client configured");
        Ok(None)
    }

    /// Reports base currency, cache state and rate count.
    #[inline]
    #[must_use]
    pub fn summary(&self) -> ConversionSummary {
        let table = self.rates();
        ConversionSummary {
            base_currency: self.base.clone(),
            last_updated: table.fetched_at,
            cache_valid: self.fresh_cache().is_some(),
            available_rates: table.rates.len(),
            supported_currencies: supported_currencies()
                .into_iter()
                .map(str::to_owned)
                .collect(),
        }
    }

    /// Cached rates for this base that are still within the validity window.
    fn fresh_cache(&self) -> Option<RateTable> {
        self.cache
            .as_ref()?
            .load_fresh(&self.base, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tolerance for rate arithmetic.
    const EPS: f64 = 1e-9;

    /// A USD-based table with two rates.
    fn usd_table() -> RateTable {
        let rates = BTreeMap::from([
            ("USD".to_owned(), 1.0),
            ("EUR".to_owned(), 0.5),
            ("EGP".to_owned(), 50.0),
        ]);
        RateTable::new("USD", rates, Some(Utc::now()))
    }

    #[test]
    fn detects_codes_before_symbols() {
        assert_eq!(detect_currency("EGP 1,200", "USD"), "EGP");
        assert_eq!(detect_currency("eur 5", "USD"), "EUR");
        assert_eq!(detect_currency("\u{20ac}5", "USD"), "EUR");
        assert_eq!(detect_currency("\u{a3}5", "USD"), "GBP");
    }

    #[test]
    fn longer_symbols_win() {
        assert_eq!(detect_currency("C$ 10", "EGP"), "CAD");
        assert_eq!(detect_currency("A$10", "EGP"), "AUD");
        assert_eq!(detect_currency("E\u{a3}10", "USD"), "EGP");
    }

    #[test]
    fn plain_numbers_use_fallback() {
        assert_eq!(detect_currency("-45.10", "EGP"), "EGP");
        assert_eq!(detect_currency("", "USD"), "USD");
    }

    #[test]
    fn format_groups_thousands() {
        assert_eq!(format_amount(0.0, "USD"), "$0.00");
        assert_eq!(format_amount(999.999, "USD"), "$1,000.00");
        assert_eq!(format_amount(1_234_567.891, "GBP"), "\u{a3}1,234,567.89");
        assert_eq!(format_amount(-0.001, "USD"), "$0.00");
    }

    #[test]
    fn format_suffix_currencies() {
        assert_eq!(format_amount(1500.0, "INR"), "1,500.00 \u{20b9}");
        assert_eq!(format_amount(2.5, "BRL"), "2.50 R$");
        assert_eq!(format_amount(-1500.0, "EGP"), "-E\u{a3}1,500.00");
    }

    #[test]
    fn rate_directions() {
        let table = usd_table();
        assert!((table.rate("USD", "USD") - 1.0).abs() < EPS);
        assert!((table.rate("EUR", "USD") - 2.0).abs() < EPS);
        assert!((table.rate("USD", "EGP") - 50.0).abs() < EPS);
        assert!((table.rate("EUR", "EGP") - 100.0).abs() < EPS);
    }

    #[test]
    fn unknown_currency_rate_is_one() {
        let table = usd_table();
        assert!((table.rate("XYZ", "USD") - 1.0).abs() < EPS);
        assert!((table.rate("USD", "XYZ") - 1.0).abs() < EPS);
    }

    #[test]
    fn convert_rounds_to_cents() {
        let table = usd_table();
        assert!((table.convert(10.0, "EGP", "USD") - 0.2).abs() < EPS);
        assert!((table.convert(1.0, "EGP", "EUR") - 0.01).abs() < EPS);
        assert!((table.convert(3.333, "USD", "USD") - 3.333).abs() < EPS);
        assert!((table.to_base(-7.0, "EUR") + 14.0).abs() < EPS);
    }

    #[test]
    fn fallback_reanchors_on_base() {
        let table = RateTable::fallback("EGP");
        assert!(table.is_fallback());
        assert!((table.rates["EGP"] - 1.0).abs() < EPS);
        assert!((table.rate("USD", "EGP") - 48.5).abs() < EPS);
    }

    #[test]
    fn fallback_with_unknown_base_keeps_usd() {
        let table = RateTable::fallback("XYZ");
        assert!((table.rates["USD"] - 1.0).abs() < EPS);
    }

    #[test]
    fn converter_without_sources_uses_fallback() {
        let converter = CurrencyConverter::new("USD");
        let table = converter.rates();
        assert!(table.is_fallback());
        assert_eq!(table.base, "USD");
        let summary = converter.summary();
        assert!(!summary.cache_valid);
        assert!(summary.last_updated.is_none());
        assert_eq!(summary.available_rates, FALLBACK_USD_RATES.len());
        assert!(summary.supported_currencies.contains(&"EGP".to_owned()));
    }

    #[test]
    fn converter_prefers_fresh_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = RateCache::new(dir.path().join("rates.json"));
        cache.save(&usd_table()).unwrap();
        let converter = CurrencyConverter::new("USD").with_cache(cache);
        let table = converter.rates();
        assert!(!table.is_fallback());
        assert!((table.rates["EGP"] - 50.0).abs() < EPS);
        assert!(converter.summary().cache_valid);
    }

    #[test]
    fn strips_markers_and_separators() {
        assert_eq!(strip_currency_markers(" $1,234.50 "), "1234.50");
        assert_eq!(strip_currency_markers("-1,200 EGP"), "-1200");
        assert_eq!(strip_currency_markers("E\u{a3}75"), "75");
        assert_eq!(strip_currency_markers("12 usd"), "12");
        assert_eq!(strip_currency_markers("R$ 9.99"), "9.99");
    }

    #[test]
    fn symbol_lookup() {
        assert_eq!(symbol_for("USD"), "$");
        assert_eq!(symbol_for("XYZ"), "XYZ");
        assert_eq!(supported_currencies().len(), CURRENCIES.len());
    }
}
