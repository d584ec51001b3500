//! sojourn-core: intent classification and itinerary synthesis for the Sojourn travel chat.

pub mod compose;
pub mod directive;
pub mod engine;
pub mod intent;
pub mod itinerary;
pub mod profile;
pub mod rules;
pub mod session;

pub use compose::{GREETING, compose};
pub use directive::{PROFILE_UPDATE_MARKER, ProfileUpdates, extract_updates};
pub use engine::{Response, respond};
pub use intent::{Intent, classify};
pub use itinerary::{Itinerary, SegmentCategory, TripSegment, synthesize_cruise_itinerary};
pub use profile::{
    ALLOWED_PROFILE_FIELDS, Identity, InMemoryProfileStore, ProfileError, ProfileNotice, ProfilePatch,
    ProfileRecord, ProfileStore, ProfileUpdateRequest, apply_profile_update,
};
pub use session::{ConversationSession, Message, MessageId, PendingTurn, Sender, SessionState, TurnOutcome};
