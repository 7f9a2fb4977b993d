use serde::Serialize;

use crate::app::{
    db::{events::Event, participants::Participant},
    domain::metrics::attendance_rate,
};

/// Event as returned by list, create, update and transitions.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    #[serde(flatten)]
    pub event: Event,
    pub attendance_rate: i64,
    pub indicators: Vec<String>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            attendance_rate: attendance_rate(event.expected_participants, event.actual_participants),
            indicators: event.indicators(),
            event,
        }
    }
}

/// Event detail, with its participants.
#[derive(Debug, Serialize)]
pub struct EventDetailResponse {
    #[serde(flatten)]
    pub event: EventResponse,
    pub participants: Vec<Participant>,
}
