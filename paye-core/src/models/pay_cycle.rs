use serde::{Deserialize, Serialize};

/// Frequency at which an employee is paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayCycle {
    #[default]
    Monthly,
    Weekly,
    Annual,
}

impl PayCycle {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Monthly => "monthly",
            Self::Weekly => "weekly",
            Self::Annual => "annual",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "monthly" | "m" => Some(Self::Monthly),
            "weekly" | "w" => Some(Self::Weekly),
            "annual" | "annually" | "yearly" | "a" => Some(Self::Annual),
            _ => None,
        }
    }

    /// Number of pay periods that make up a full year.
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Self::Monthly => 12,
            Self::Weekly => 52,
            Self::Annual => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn parse_accepts_codes_and_aliases() {
        assert_eq!(PayCycle::parse("monthly"), Some(PayCycle::Monthly));
        assert_eq!(PayCycle::parse(" Weekly "), Some(PayCycle::Weekly));
        assert_eq!(PayCycle::parse("yearly"), Some(PayCycle::Annual));
        assert_eq!(PayCycle::parse("fortnightly"), None);
    }

    #[test]
    fn as_str_round_trips_through_parse() {
        for cycle in [PayCycle::Monthly, PayCycle::Weekly, PayCycle::Annual] {
            assert_eq!(PayCycle::parse(cycle.as_str()), Some(cycle));
        }
    }
}
