use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculations::common::format_amount;

/// One marginal band of a progressive schedule.
///
/// A bracket covers income in `(min, max]`. The following bracket starts at
/// this bracket's `max`, so adjacent brackets share a boundary value.
/// `max == None` marks the terminal, unbounded bracket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub min: Decimal,
    pub max: Option<Decimal>,
    pub rate: Decimal,
    #[serde(default)]
    pub description: String,
}

impl TaxBracket {
    pub fn new(
        min: Decimal,
        max: Option<Decimal>,
        rate: Decimal,
        description: impl Into<String>,
    ) -> Self {
        Self {
            min,
            max,
            rate,
            description: description.into(),
        }
    }

    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }

    /// Width of the band, or `None` for the unbounded bracket.
    pub fn width(&self) -> Option<Decimal> {
        self.max.map(|max| max - self.min)
    }

    /// Human-readable label used in tax breakdowns.
    ///
    /// Falls back to a generated range label when no description is set.
    pub fn label(&self) -> String {
        if self.description.trim().is_empty() {
            self.to_string()
        } else {
            self.description.clone()
        }
    }
}

impl fmt::Display for TaxBracket {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        let pct = (self.rate * Decimal::ONE_HUNDRED).normalize();
        match self.max {
            Some(max) => write!(
                f,
                "{} - {} @ {}%",
                format_amount(self.min),
                format_amount(max),
                pct
            ),
            None => write!(f, "above {} @ {}%", format_amount(self.min), pct),
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn label_prefers_description() {
        let bracket = TaxBracket::new(dec!(0), Some(dec!(800000)), dec!(0), "First 800,000");

        assert_eq!(bracket.label(), "First 800,000");
    }

    #[test]
    fn label_generates_range_when_description_blank() {
        let bracket = TaxBracket::new(dec!(800000), Some(dec!(3000000)), dec!(0.15), "");

        assert_eq!(bracket.label(), "800,000 - 3,000,000 @ 15%");
    }

    #[test]
    fn label_for_unbounded_bracket() {
        let bracket = TaxBracket::new(dec!(50000000), None, dec!(0.25), " ");

        assert_eq!(bracket.label(), "above 50,000,000 @ 25%");
    }

    #[test]
    fn width_is_none_for_unbounded() {
        let finite = TaxBracket::new(dec!(100), Some(dec!(350)), dec!(0.1), "");
        let open = TaxBracket::new(dec!(350), None, dec!(0.2), "");

        assert_eq!(finite.width(), Some(dec!(250)));
        assert_eq!(open.width(), None);
        assert!(open.is_unbounded());
    }
}
