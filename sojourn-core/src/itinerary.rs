//! Itinerary model and the canned cruise itinerary.

use serde::{Deserialize, Serialize};

/// Closed set of segment categories the presentation layer maps to icons/colours.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SegmentCategory {
    Flight,
    Lodging,
    GroundTransport,
    Activity,
}

impl SegmentCategory {
    pub fn label(self) -> &'static str {
        match self {
            SegmentCategory::Flight => "flight",
            SegmentCategory::Lodging => "lodging",
            SegmentCategory::GroundTransport => "ground-transport",
            SegmentCategory::Activity => "activity",
        }
    }
}

impl std::fmt::Display for SegmentCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// One leg of a trip. Labels are display text and are not parsed further.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripSegment {
    pub category: SegmentCategory,
    pub title: String,
    pub date_label: String,
    pub time_label: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

/// Ordered segments, chronological by construction.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Itinerary {
    segments: Vec<TripSegment>,
}

impl Itinerary {
    pub fn new(segments: Vec<TripSegment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[TripSegment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TripSegment> {
        self.segments.iter()
    }

    pub fn categories(&self) -> Vec<SegmentCategory> {
        self.segments.iter().map(|s| s.category).collect()
    }
}

impl<'a> IntoIterator for &'a Itinerary {
    type Item = &'a TripSegment;
    type IntoIter = std::slice::Iter<'a, TripSegment>;

    fn into_iter(self) -> Self::IntoIter {
        self.segments.iter()
    }
}

fn segment(
    category: SegmentCategory,
    title: &str,
    date_label: &str,
    time_label: &str,
    description: &str,
    location: &str,
) -> TripSegment {
    TripSegment {
        category,
        title: title.to_string(),
        date_label: date_label.to_string(),
        time_label: time_label.to_string(),
        description: description.to_string(),
        location: Some(location.to_string()),
    }
}

/// The known-good Seattle Princess cruise trip: LAX -> SEA, one hotel night,
/// a 7-day Alaska sailing from June 14, and the flight home on June 21.
///
/// Stands in for a live itinerary search; a real search must keep this shape
/// (ordered, categorised segments).
pub fn synthesize_cruise_itinerary() -> Itinerary {
    use SegmentCategory::*;

    Itinerary::new(vec![
        segment(
            Flight,
            "Flight to Seattle",
            "June 13, 2025",
            "10:30 AM - 1:15 PM",
            "Alaska Airlines Flight AS123 from LAX to SEA",
            "Los Angeles International Airport (LAX)",
        ),
        segment(
            GroundTransport,
            "Airport Transfer",
            "June 13, 2025",
            "1:45 PM - 2:30 PM",
            "Pre-booked shuttle from Seattle Airport to Hotel",
            "Seattle-Tacoma International Airport",
        ),
        segment(
            Lodging,
            "Hotel Stay",
            "June 13, 2025",
            "Check-in: 3:00 PM",
            "Reservation at Seattle Waterfront Hotel",
            "Downtown Seattle",
        ),
        segment(
            GroundTransport,
            "Hotel to Cruise Port",
            "June 14, 2025",
            "12:30 PM - 1:00 PM",
            "Pre-arranged taxi to cruise terminal",
            "Seattle Cruise Terminal",
        ),
        segment(
            Activity,
            "Princess Cruise Boarding",
            "June 14, 2025",
            "1:00 PM - 3:00 PM",
            "Check-in and boarding process",
            "Seattle Cruise Terminal",
        ),
        segment(
            Activity,
            "Princess Cruise",
            "June 14-21, 2025",
            "Departure: 3:00 PM (June 14)",
            "7-day Alaska Cruise",
            "Alaska Route",
        ),
        segment(
            GroundTransport,
            "Cruise Terminal to Airport",
            "June 21, 2025",
            "8:00 AM - 9:00 AM",
            "Pre-arranged shuttle service",
            "Seattle Cruise Terminal",
        ),
        segment(
            Flight,
            "Flight to Los Angeles",
            "June 21, 2025",
            "11:45 AM - 2:30 PM",
            "Alaska Airlines Flight AS456 from SEA to LAX",
            "Seattle-Tacoma International Airport (SEA)",
        ),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use super::SegmentCategory::*;

    #[test]
    fn test_cruise_itinerary_shape() {
        let it = synthesize_cruise_itinerary();
        assert_eq!(it.len(), 8);
        assert_eq!(
            it.categories(),
            vec![
                Flight,
                GroundTransport,
                Lodging,
                GroundTransport,
                Activity,
                Activity,
                GroundTransport,
                Flight
            ]
        );
    }

    #[test]
    fn test_port_transfer_location() {
        let it = synthesize_cruise_itinerary();
        let fourth = &it.segments()[3];
        assert_eq!(fourth.category, GroundTransport);
        assert!(fourth.location.as_deref().unwrap().contains("Seattle Cruise Terminal"));
    }

    #[test]
    fn test_deterministic() {
        assert_eq!(synthesize_cruise_itinerary(), synthesize_cruise_itinerary());
    }

    #[test]
    fn test_category_wire_labels() {
        let json = serde_json::to_string(&GroundTransport).unwrap();
        assert_eq!(json, "\"ground-transport\"");
        for c in [Flight, Lodging, GroundTransport, Activity] {
            assert_eq!(serde_json::to_string(&c).unwrap(), format!("\"{}\"", c.label()));
        }
    }

    #[test]
    fn test_itinerary_serializes_as_list() {
        let v = serde_json::to_value(synthesize_cruise_itinerary()).unwrap();
        assert_eq!(v.as_array().unwrap().len(), 8);
        assert_eq!(v[0]["category"], "flight");
        assert_eq!(v[0]["date_label"], "June 13, 2025");
    }
}
