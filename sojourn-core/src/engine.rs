//! Classify -> synthesize -> compose, as one pure step.

use serde::Serialize;

use crate::compose::compose;
use crate::intent::{Intent, classify};
use crate::itinerary::{Itinerary, synthesize_cruise_itinerary};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Response {
    pub intent: Intent,
    /// Present only for a fully specified cruise.
    pub itinerary: Option<Itinerary>,
    pub reply: String,
}

pub fn respond(text: &str) -> Response {
    let intent = classify(text);
    let itinerary = match intent {
        Intent::CruiseSeattleFullySpecified => Some(synthesize_cruise_itinerary()),
        _ => None,
    };
    let reply = compose(&intent, itinerary.as_ref());
    Response {
        intent,
        itinerary,
        reply,
    }
}
