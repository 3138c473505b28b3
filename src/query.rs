use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::TravelError;
use crate::model::{TravelOption, TravelType};

/// Upper bound on passengers per booking imposed by the booking form.
pub const MAX_PASSENGERS: u32 = 4;

/// Optional search fields. An absent or empty field places no constraint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchCriteria {
    #[serde(rename = "type")]
    pub travel_type: Option<TravelType>,
    pub source: Option<String>,
    pub destination: Option<String>,
    pub date: Option<NaiveDate>,
    /// Collected for the booking form; the filter ignores it.
    pub passengers: u32,
    pub price_min: Option<f64>,
    pub price_max: Option<f64>,
    pub min_seats: Option<u32>,
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            travel_type: None,
            source: None,
            destination: None,
            date: None,
            passengers: 1,
            price_min: None,
            price_max: None,
            min_seats: None,
        }
    }
}

/// Turns a display city name into its catalog slug: `"New York"` -> `"new-york"`.
pub fn slugify(city: &str) -> String {
    city.split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-")
}

pub fn parse_date(date: &str) -> Result<NaiveDate, TravelError> {
    NaiveDate::parse_from_str(date.trim(), "%Y-%m-%d")
        .map_err(|_| TravelError::InvalidDate(date.to_string()))
}

fn filled(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.trim().is_empty())
}

/// Parses an optional type field. A blank value means any type.
pub fn parse_type_field(value: Option<&str>) -> Result<Option<TravelType>, TravelError> {
    filled(value).map(TravelType::from_str_loose).transpose()
}

/// Parses an optional date field. A blank value means any date.
pub fn parse_date_field(value: Option<&str>) -> Result<Option<NaiveDate>, TravelError> {
    filled(value).map(parse_date).transpose()
}

fn constraint(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.is_empty())
}

impl SearchCriteria {
    pub fn with_type(mut self, travel_type: TravelType) -> Self {
        self.travel_type = Some(travel_type);
        self
    }

    pub fn with_source(mut self, city: &str) -> Self {
        self.source = Some(slugify(city));
        self
    }

    pub fn with_destination(mut self, city: &str) -> Self {
        self.destination = Some(slugify(city));
        self
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    /// True when no field constrains the result.
    pub fn is_empty(&self) -> bool {
        self.travel_type.is_none()
            && constraint(&self.source).is_none()
            && constraint(&self.destination).is_none()
            && self.date.is_none()
            && self.price_min.is_none()
            && self.price_max.is_none()
            && self.min_seats.is_none()
    }

    pub fn validate(&self) -> Result<(), TravelError> {
        if self.passengers == 0 {
            return Err(TravelError::Validation(
                "at least one passenger required".into(),
            ));
        }

        if self.passengers > MAX_PASSENGERS {
            return Err(TravelError::Validation(format!(
                "passengers ({}) exceeds maximum of {MAX_PASSENGERS}",
                self.passengers
            )));
        }

        for (name, bound) in [("price-min", self.price_min), ("price-max", self.price_max)] {
            if let Some(p) = bound {
                if !p.is_finite() || p < 0.0 {
                    return Err(TravelError::Validation(format!(
                        "{name} must be a non-negative number, got {p}"
                    )));
                }
            }
        }

        if let (Some(min), Some(max)) = (self.price_min, self.price_max) {
            if min > max {
                return Err(TravelError::Validation(format!(
                    "price-min ({min}) cannot exceed price-max ({max})"
                )));
            }
        }

        Ok(())
    }

    pub fn matches(&self, option: &TravelOption) -> bool {
        if self.travel_type.is_some_and(|t| t != option.travel_type) {
            return false;
        }
        if constraint(&self.source).is_some_and(|s| s != option.source) {
            return false;
        }
        if constraint(&self.destination).is_some_and(|d| d != option.destination) {
            return false;
        }
        if self.date.is_some_and(|d| d != option.date) {
            return false;
        }
        if self.price_min.is_some_and(|p| option.price < p) {
            return false;
        }
        if self.price_max.is_some_and(|p| option.price > p) {
            return false;
        }
        if self.min_seats.is_some_and(|n| option.available_seats < n) {
            return false;
        }
        true
    }
}

/// Returns the options matching every supplied criterion, in catalog order.
pub fn filter(options: &[TravelOption], criteria: &SearchCriteria) -> Vec<TravelOption> {
    let matched: Vec<TravelOption> = options
        .iter()
        .filter(|o| criteria.matches(o))
        .cloned()
        .collect();
    debug!(
        scanned = options.len(),
        matched = matched.len(),
        "filtered catalog"
    );
    matched
}
