use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::InputError;

/// the tolerance band around a listing's departure time, ordered from
/// tightest to loosest. when two listings are compared, the looser of their
/// fuzziness values governs (see [`Fuzziness::loosest`]).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub enum Fuzziness {
    #[default]
    #[serde(rename = "1-hours")]
    OneHour,
    #[serde(rename = "2-hours")]
    TwoHours,
    #[serde(rename = "3-hours")]
    ThreeHours,
    #[serde(rename = "4-hours")]
    FourHours,
    #[serde(rename = "5-hours")]
    FiveHours,
    #[serde(rename = "day")]
    Day,
    #[serde(rename = "week")]
    Week,
    #[serde(rename = "anytime")]
    Anytime,
}

impl Fuzziness {
    pub const ALL: [Fuzziness; 8] = [
        Fuzziness::OneHour,
        Fuzziness::TwoHours,
        Fuzziness::ThreeHours,
        Fuzziness::FourHours,
        Fuzziness::FiveHours,
        Fuzziness::Day,
        Fuzziness::Week,
        Fuzziness::Anytime,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Fuzziness::OneHour => "1-hours",
            Fuzziness::TwoHours => "2-hours",
            Fuzziness::ThreeHours => "3-hours",
            Fuzziness::FourHours => "4-hours",
            Fuzziness::FiveHours => "5-hours",
            Fuzziness::Day => "day",
            Fuzziness::Week => "week",
            Fuzziness::Anytime => "anytime",
        }
    }

    /// the half-width of the window for the hour-based variants.
    pub fn hours(&self) -> Option<i64> {
        match self {
            Fuzziness::OneHour => Some(1),
            Fuzziness::TwoHours => Some(2),
            Fuzziness::ThreeHours => Some(3),
            Fuzziness::FourHours => Some(4),
            Fuzziness::FiveHours => Some(5),
            Fuzziness::Day | Fuzziness::Week | Fuzziness::Anytime => None,
        }
    }

    /// the more lenient of two tolerances.
    pub fn loosest(self, other: Fuzziness) -> Fuzziness {
        self.max(other)
    }
}

impl FromStr for Fuzziness {
    type Err = InputError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Fuzziness::ALL
            .into_iter()
            .find(|f| f.as_str() == trimmed)
            .ok_or_else(|| InputError::UnknownFuzziness(s.to_string()))
    }
}

impl std::fmt::Display for Fuzziness {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
