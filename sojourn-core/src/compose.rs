//! Assistant reply templates, one per intent.

use crate::intent::Intent;
use crate::itinerary::Itinerary;

pub const GREETING: &str = "Hi! I'm your Sojourn agent. Just tell me your travel goals, plans, or dates (like 'June 23-27'), and I'll check the internet for the best trip options, then handle every step for you: flights, transport, hotels, and more! How can I help you today?";

const PROFILE_ACK: &str = "Thanks! I've received your profile updates and am saving them now.";

const MONTH_DATES: &str = "Great! I'll check current vacation options and popular destinations online for those dates, then build an itinerary for you.\n\nAre you looking for a relaxing trip, an adventure, or something else? Any destination preferences or places to avoid?";

const CRUISE_ACK: &str = "I see you're planning a cruise from Seattle! I'll check online for the best travel options and help you with all arrangements. Please share requested details (dates, departure city, etc) if you haven't yet.";

const CRUISE_PLANNED: &str = "Based on what I found online for your Princess Cruise departing Seattle June 14 and returning June 21, here's a full itinerary: flights from LA, hotels, and all necessary transfers. Would you like to review and confirm?";

const CRUISE_NEEDS_DETAILS: &str = "(Just let me know your exact cruise dates and home city to get started with detailed plans!)";

const FLIGHT_OR_HOTEL: &str = "Absolutely! I'll check booked and available flights/hotels online. Can you provide more details about where and when you want to travel, and any preferences?";

const BARE_DATES: &str = "Thanks! I'll look up fresh recommendations and deals for those dates on the internet. Do you have a destination in mind, or should I suggest some trending vacation spots?";

const FALLBACK: &str = "Thanks for sharing your travel plans. I'll check for current travel trends online and start building your itinerary. Could you provide more details about your ideal trip, dates, or any wishes or needs you have?";

/// Reply text for a classified message.
///
/// Every template is fixed per intent; the itinerary is shown alongside the
/// reply, never spliced into it. The profile acknowledgement does not depend
/// on whether the save later succeeds.
pub fn compose(intent: &Intent, _itinerary: Option<&Itinerary>) -> String {
    match intent {
        Intent::ProfileUpdate { .. } => PROFILE_ACK.to_string(),
        Intent::DateWithMonthMention => MONTH_DATES.to_string(),
        Intent::CruiseSeattleFullySpecified => CRUISE_PLANNED.to_string(),
        Intent::CruiseSeattleUnderspecified => format!("{CRUISE_ACK}\n\n{CRUISE_NEEDS_DETAILS}"),
        Intent::FlightOrHotelGeneric => FLIGHT_OR_HOTEL.to_string(),
        Intent::BareDateRange => BARE_DATES.to_string(),
        Intent::Fallback => FALLBACK.to_string(),
    }
}
