//! Ordered pattern rules over chat text.
//!
//! Rules are evaluated top to bottom and the first match wins. Text that no
//! rule matches is a fallback; see [`crate::intent::classify`].

use std::sync::LazyLock;

use regex::Regex;

use crate::directive;
use crate::intent::Intent;

static MONTH_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(january|february|march|april|may|june|july|august|september|october|november|december)\b",
    )
    .expect("month pattern is valid")
});

static DAY_RANGE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]{1,2}\s*-\s*[0-9]{1,2}").expect("day range pattern is valid"));

static SLASH_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b[0-9]{1,2}/[0-9]{1,2}\b").expect("slash date pattern is valid"));

/// A chat message as seen by the rules: the raw text plus its lower-cased form.
#[derive(Debug, Clone)]
pub struct Utterance<'a> {
    pub raw: &'a str,
    pub normalized: String,
}

impl<'a> Utterance<'a> {
    pub fn new(raw: &'a str) -> Self {
        Self {
            raw,
            normalized: raw.to_lowercase(),
        }
    }

    fn mentions(&self, needle: &str) -> bool {
        self.normalized.contains(needle)
    }
}

/// One entry of the rule table.
pub struct Rule {
    pub name: &'static str,
    pub matches: fn(&Utterance) -> bool,
    pub build: fn(&Utterance) -> Intent,
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rule").field("name", &self.name).finish()
    }
}

static RULES: [Rule; 6] = [
    Rule {
        name: "profile_update",
        matches: |u| directive::contains_marker(u.raw),
        build: |u| Intent::ProfileUpdate {
            fields: directive::extract_updates(u.raw),
        },
    },
    // Ahead of the month rule: "june 14" always carries a month name and a digit.
    Rule {
        name: "cruise_fully_specified",
        matches: |u| u.mentions("june 14") && u.mentions("princess cruise"),
        build: |_| Intent::CruiseSeattleFullySpecified,
    },
    Rule {
        name: "month_with_digit",
        matches: |u| MONTH_RE.is_match(&u.normalized) && u.normalized.chars().any(|c| c.is_ascii_digit()),
        build: |_| Intent::DateWithMonthMention,
    },
    Rule {
        name: "cruise_or_seattle",
        matches: |u| u.mentions("cruise") || u.mentions("seattle"),
        build: |_| Intent::CruiseSeattleUnderspecified,
    },
    Rule {
        name: "flight_or_hotel",
        matches: |u| u.mentions("flight") || u.mentions("hotel"),
        build: |_| Intent::FlightOrHotelGeneric,
    },
    Rule {
        name: "bare_date_range",
        matches: |u| DAY_RANGE_RE.is_match(&u.normalized) || SLASH_DATE_RE.is_match(&u.normalized),
        build: |_| Intent::BareDateRange,
    },
];

/// The rule table in evaluation order.
pub fn rules() -> &'static [Rule] {
    &RULES
}

/// First rule matching the utterance, if any.
pub fn first_match(utterance: &Utterance) -> Option<&'static Rule> {
    RULES.iter().find(|r| (r.matches)(utterance))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule_for(text: &str) -> Option<&'static str> {
        first_match(&Utterance::new(text)).map(|r| r.name)
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let names: Vec<_> = rules().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "profile_update",
                "cruise_fully_specified",
                "month_with_digit",
                "cruise_or_seattle",
                "flight_or_hotel",
                "bare_date_range",
            ]
        );
    }

    #[test]
    fn test_month_requires_word_boundary_and_digit() {
        assert_eq!(rule_for("trip in June 2025"), Some("month_with_digit"));
        assert_eq!(rule_for("trip in june"), None);
        // "mayor" is not "may"
        assert_eq!(rule_for("the mayor has 3 dogs"), None);
    }

    #[test]
    fn test_month_rule_beats_cruise() {
        assert_eq!(rule_for("Seattle cruise on July 3"), Some("month_with_digit"));
    }

    #[test]
    fn test_fully_specified_cruise_beats_month() {
        assert_eq!(
            rule_for("My Princess Cruise leaves Seattle June 14"),
            Some("cruise_fully_specified")
        );
        assert_eq!(rule_for("princess cruise, june 1"), Some("month_with_digit"));
    }

    #[test]
    fn test_cruise_without_month_digit() {
        assert_eq!(rule_for("Thinking about a cruise"), Some("cruise_or_seattle"));
        assert_eq!(rule_for("SEATTLE please"), Some("cruise_or_seattle"));
    }

    #[test]
    fn test_flight_hotel_and_ranges() {
        assert_eq!(rule_for("need a hotel"), Some("flight_or_hotel"));
        assert_eq!(rule_for("23 - 27"), Some("bare_date_range"));
        assert_eq!(rule_for("5/10"), Some("bare_date_range"));
        assert_eq!(rule_for("just 7 days"), None);
    }

    #[test]
    fn test_non_ascii_digits_do_not_count() {
        assert_eq!(rule_for("٥/١٠"), None);
    }
}
