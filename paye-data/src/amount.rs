use rust_decimal::Decimal;
use thiserror::Error;

/// Error returned when a command-line amount cannot be parsed.
#[derive(Debug, Error)]
#[error("invalid amount '{input}': {source}")]
pub struct ParseAmountError {
    input: String,
    #[source]
    source: rust_decimal::Error,
}

/// Parses a money amount such as `"450,000"` or `"1,234.56"`.
///
/// Commas are treated as thousands separators. Blank input is zero.
/// Negative amounts parse here and are rejected by the engine.
pub fn parse_amount(s: &str) -> Result<Decimal, ParseAmountError> {
    let normalized = s.trim().replace(',', "");
    if normalized.is_empty() {
        return Ok(Decimal::ZERO);
    }
    normalized.parse().map_err(|source| {
        tracing::error!(input = %s, "invalid amount: {}", source);
        ParseAmountError {
            input: s.to_string(),
            source,
        }
    })
}
