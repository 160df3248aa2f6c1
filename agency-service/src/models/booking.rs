use mongodb::bson::DateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle states of a booking. `Cancelled` and `Billed` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookingStatus {
    Pending,
    Assigned,
    Completed,
    Cancelled,
    Billed,
}

/// Operator actions that move a booking through its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingEvent {
    Assign,
    Complete,
    Cancel,
    Bill,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Assigned => "Assigned",
            BookingStatus::Completed => "Completed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Billed => "Billed",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(BookingStatus::Pending),
            "Assigned" => Some(BookingStatus::Assigned),
            "Completed" => Some(BookingStatus::Completed),
            "Cancelled" => Some(BookingStatus::Cancelled),
            "Billed" => Some(BookingStatus::Billed),
            _ => None,
        }
    }

    /// The full transition table. Returns the next state, or `None` when the
    /// event is not valid from the current state. Terminal states have no
    /// outgoing transitions; in particular a billed booking can never be
    /// cancelled and a cancelled one can never be billed.
    pub fn transition(self, event: BookingEvent) -> Option<BookingStatus> {
        match (self, event) {
            (BookingStatus::Pending, BookingEvent::Assign) => Some(BookingStatus::Assigned),
            (BookingStatus::Pending, BookingEvent::Cancel) => Some(BookingStatus::Cancelled),
            (BookingStatus::Assigned, BookingEvent::Complete) => Some(BookingStatus::Completed),
            (BookingStatus::Completed, BookingEvent::Bill) => Some(BookingStatus::Billed),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, BookingStatus::Cancelled | BookingStatus::Billed)
    }
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Trip categories offered by the agency. The wire names are the labels
/// operators see, so they stay human-readable rather than snake_case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TripType {
    #[serde(rename = "One Way")]
    OneWay,
    #[serde(rename = "Round Trip")]
    RoundTrip,
    #[serde(rename = "Rental (8hr/80km)")]
    Rental8h80km,
    #[serde(rename = "Rental (12hr/300km)")]
    Rental12h300km,
    #[serde(rename = "Outstation")]
    Outstation,
}

impl TripType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::OneWay => "One Way",
            TripType::RoundTrip => "Round Trip",
            TripType::Rental8h80km => "Rental (8hr/80km)",
            TripType::Rental12h300km => "Rental (12hr/300km)",
            TripType::Outstation => "Outstation",
        }
    }
}

/// Resolved assignment details, denormalized onto the booking at assignment
/// time. Later edits to the driver or vehicle roster do not rewrite history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignmentSnapshot {
    pub driver_id: Uuid,
    pub driver_name: String,
    pub driver_mobile: String,
    pub vehicle_id: Uuid,
    pub vehicle_number: String,
    pub vehicle_model: String,
    pub agent_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub agency_id: String,
    /// Short operator-facing handle, e.g. `TRIP-4217`. Not unique by design;
    /// `id` is the real identity.
    pub trip_id: String,
    pub client_id: Uuid,
    pub client_name: String,
    pub client_phone: String,
    pub pickup: String,
    #[serde(rename = "drop")]
    pub drop_location: String,
    pub date: String,
    pub time: String,
    pub trip_type: TripType,
    pub notes: Option<String>,
    pub status: BookingStatus,
    pub assignment: Option<AssignmentSnapshot>,
    pub created_at: DateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [BookingStatus; 5] = [
        BookingStatus::Pending,
        BookingStatus::Assigned,
        BookingStatus::Completed,
        BookingStatus::Cancelled,
        BookingStatus::Billed,
    ];

    const ALL_EVENTS: [BookingEvent; 4] = [
        BookingEvent::Assign,
        BookingEvent::Complete,
        BookingEvent::Cancel,
        BookingEvent::Bill,
    ];

    #[test]
    fn happy_path_reaches_billed() {
        let assigned = BookingStatus::Pending.transition(BookingEvent::Assign);
        assert_eq!(assigned, Some(BookingStatus::Assigned));
        let completed = BookingStatus::Assigned.transition(BookingEvent::Complete);
        assert_eq!(completed, Some(BookingStatus::Completed));
        let billed = BookingStatus::Completed.transition(BookingEvent::Bill);
        assert_eq!(billed, Some(BookingStatus::Billed));
    }

    #[test]
    fn pending_can_be_cancelled() {
        assert_eq!(
            BookingStatus::Pending.transition(BookingEvent::Cancel),
            Some(BookingStatus::Cancelled)
        );
    }

    #[test]
    fn only_four_transitions_are_legal() {
        let mut legal = 0;
        for status in ALL_STATUSES {
            for event in ALL_EVENTS {
                if status.transition(event).is_some() {
                    legal += 1;
                }
            }
        }
        assert_eq!(legal, 4);
    }

    #[test]
    fn terminal_states_have_no_exits() {
        for status in [BookingStatus::Cancelled, BookingStatus::Billed] {
            assert!(status.is_terminal());
            for event in ALL_EVENTS {
                assert_eq!(status.transition(event), None);
            }
        }
    }

    #[test]
    fn assigned_cannot_be_cancelled_or_billed() {
        assert_eq!(BookingStatus::Assigned.transition(BookingEvent::Cancel), None);
        assert_eq!(BookingStatus::Assigned.transition(BookingEvent::Bill), None);
    }

    #[test]
    fn status_parse_round_trips_as_str() {
        for status in ALL_STATUSES {
            assert_eq!(BookingStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(BookingStatus::parse("InFlight"), None);
    }

    #[test]
    fn status_serde_matches_as_str() {
        for status in ALL_STATUSES {
            let json = serde_json::to_string(&status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
        }
    }

    #[test]
    fn trip_type_wire_names_are_display_labels() {
        let json = serde_json::to_string(&TripType::Rental8h80km).unwrap();
        assert_eq!(json, "\"Rental (8hr/80km)\"");
        let parsed: TripType = serde_json::from_str("\"Round Trip\"").unwrap();
        assert_eq!(parsed, TripType::RoundTrip);
    }
}
