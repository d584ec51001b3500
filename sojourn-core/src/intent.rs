//! Intent classification for travel chat messages.
//!
//! Deterministic and memoryless: the intent depends on the current text only.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::directive::ProfileUpdates;
use crate::rules::{self, Utterance};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Intent {
    /// Explicit `update profile:` directive with the parsed fields.
    ProfileUpdate { fields: ProfileUpdates },
    DateWithMonthMention,
    CruiseSeattleFullySpecified,
    CruiseSeattleUnderspecified,
    FlightOrHotelGeneric,
    BareDateRange,
    Fallback,
}

impl Intent {
    /// Stable label for logs and JSON output.
    pub fn kind(&self) -> &'static str {
        match self {
            Intent::ProfileUpdate { .. } => "profile_update",
            Intent::DateWithMonthMention => "date_with_month_mention",
            Intent::CruiseSeattleFullySpecified => "cruise_seattle_fully_specified",
            Intent::CruiseSeattleUnderspecified => "cruise_seattle_underspecified",
            Intent::FlightOrHotelGeneric => "flight_or_hotel_generic",
            Intent::BareDateRange => "bare_date_range",
            Intent::Fallback => "fallback",
        }
    }
}

/// Classify a message. Total over all strings: anything unmatched is [`Intent::Fallback`].
///
/// Callers reject blank input before asking; blank text simply falls back.
pub fn classify(text: &str) -> Intent {
    let utterance = Utterance::new(text);
    match rules::first_match(&utterance) {
        Some(rule) => {
            let intent = (rule.build)(&utterance);
            debug!(rule = rule.name, intent = intent.kind(), "classified message");
            intent
        }
        None => {
            debug!(intent = "fallback", "no rule matched");
            Intent::Fallback
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_update_dominates_month() {
        let intent = classify("update profile: name=Jane, June trip 2025");
        match intent {
            Intent::ProfileUpdate { fields } => {
                assert_eq!(fields.len(), 1);
                assert_eq!(fields["name"], "Jane");
            }
            other => panic!("expected profile update, got {other:?}"),
        }
    }

    #[test]
    fn test_profile_update_dominates_cruise() {
        let intent = classify("Update Profile: address=Pier 91, my princess cruise is june 14");
        assert_eq!(intent.kind(), "profile_update");
    }

    #[test]
    fn test_cruise_fully_specified_any_case() {
        assert_eq!(
            classify("My Princess Cruise leaves Seattle June 14"),
            Intent::CruiseSeattleFullySpecified
        );
        assert_eq!(
            classify("JUNE 14!!! PRINCESS CRUISE"),
            Intent::CruiseSeattleFullySpecified
        );
    }

    #[test]
    fn test_cruise_underspecified() {
        assert_eq!(classify("a cruise from Seattle"), Intent::CruiseSeattleUnderspecified);
    }

    #[test]
    fn test_month_mention() {
        assert_eq!(classify("Somewhere warm, December 20-28"), Intent::DateWithMonthMention);
    }

    #[test]
    fn test_flight_or_hotel() {
        assert_eq!(classify("Find me a cheap flight"), Intent::FlightOrHotelGeneric);
    }

    #[test]
    fn test_bare_date_range() {
        assert_eq!(classify("5/10"), Intent::BareDateRange);
        assert_eq!(classify("the 12-15 works"), Intent::BareDateRange);
    }

    #[test]
    fn test_fallback() {
        assert_eq!(classify("I want to relax somewhere quiet"), Intent::Fallback);
        assert_eq!(classify("x"), Intent::Fallback);
    }

    #[test]
    fn test_intent_serializes_with_kind_tag() {
        let v = serde_json::to_value(Intent::BareDateRange).unwrap();
        assert_eq!(v["kind"], "bare_date_range");
    }
}
