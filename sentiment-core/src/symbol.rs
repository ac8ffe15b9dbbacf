//! Financial symbol validation

use std::sync::LazyLock;

use regex::Regex;

/// Tickers, share classes (`BRK.B`), indices (`^GSPC`) and FX/futures (`EURUSD=X`)
static SYMBOL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Z0-9^][A-Z0-9.\-^=]{0,9}$").expect("symbol pattern is a valid regex")
});

/// Decides whether a string is an acceptable financial symbol
pub trait SymbolValidator: Send + Sync {
    /// `symbol` is expected to be normalized with [`normalize_symbol`]
    fn is_valid(&self, symbol: &str) -> bool;
}

/// Pattern-based validator for exchange tickers
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultSymbolValidator;

impl SymbolValidator for DefaultSymbolValidator {
    fn is_valid(&self, symbol: &str) -> bool {
        SYMBOL_PATTERN.is_match(symbol)
    }
}

/// Canonical form used for cache keys and rate-limit buckets
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}
