use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::TravelError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelType {
    Flight,
    Train,
    Bus,
}

impl TravelType {
    pub fn from_str_loose(s: &str) -> Result<Self, TravelError> {
        match s.trim().to_lowercase().as_str() {
            "flight" | "plane" => Ok(Self::Flight),
            "train" | "rail" => Ok(Self::Train),
            "bus" | "coach" => Ok(Self::Bus),
            _ => Err(TravelError::Validation(format!(
                "invalid travel type: {s} (expected flight, train or bus)"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Flight => "flight",
            Self::Train => "train",
            Self::Bus => "bus",
        }
    }
}

impl std::fmt::Display for TravelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bookable offering. Seeded once and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TravelOption {
    pub id: String,
    #[serde(rename = "type")]
    pub travel_type: TravelType,
    pub source: String,
    pub destination: String,
    pub date: NaiveDate,
    /// Departure time, `HH:MM` on a 24h clock.
    pub time: String,
    pub duration: String,
    pub price: f64,
    pub available_seats: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operator: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookingStatus {
    Confirmed,
    Cancelled,
    Completed,
}

impl std::fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Confirmed => "confirmed",
            Self::Cancelled => "cancelled",
            Self::Completed => "completed",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerDetail {
    pub name: String,
    pub age: u32,
}

impl PassengerDetail {
    pub fn new(name: impl Into<String>, age: u32) -> Self {
        Self {
            name: name.into(),
            age,
        }
    }

    /// Parses `"Name:age"`, the form accepted by `--passenger`.
    pub fn parse(s: &str) -> Result<Self, TravelError> {
        let (name, age) = s.rsplit_once(':').ok_or_else(|| {
            TravelError::Validation(format!(
                "passenger must be \"NAME:AGE\", got: \"{s}\""
            ))
        })?;
        let age: u32 = age.trim().parse().map_err(|_| {
            TravelError::Validation(format!("invalid passenger age in \"{s}\""))
        })?;
        Ok(Self::new(name.trim(), age))
    }
}

/// A confirmed reservation. Route and schedule fields are copied from the
/// travel option at confirmation time and never refreshed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub travel_id: String,
    #[serde(rename = "type")]
    pub travel_type: TravelType,
    pub source: String,
    pub destination: String,
    pub date: NaiveDate,
    pub time: String,
    pub passengers: u32,
    pub total_price: f64,
    pub status: BookingStatus,
    pub booking_date: NaiveDate,
    pub passenger_details: Vec<PassengerDetail>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancelled_on: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cancellation_reason: Option<String>,
}

impl Booking {
    /// Whether the UI should offer cancellation. Not enforced by the store.
    pub fn is_cancellable(&self, today: NaiveDate) -> bool {
        self.status == BookingStatus::Confirmed && self.date > today
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(alias = "name")]
    pub username: String,
    #[serde(default)]
    pub email: String,
}
