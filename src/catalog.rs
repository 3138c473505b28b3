use std::collections::HashSet;
use std::path::Path;

use chrono::{NaiveDate, NaiveTime};
use tracing::debug;

use crate::error::TravelError;
use crate::model::{TravelOption, TravelType};
use crate::query::slugify;

/// The fixed set of bookable offerings. Read-only once built.
#[derive(Debug, Clone)]
pub struct Catalog {
    options: Vec<TravelOption>,
}

struct Seed {
    id: &'static str,
    travel_type: TravelType,
    source: &'static str,
    destination: &'static str,
    date: (i32, u32, u32),
    time: &'static str,
    duration: &'static str,
    price: f64,
    available_seats: u32,
    operator: &'static str,
}

const SEEDS: [Seed; 3] = [
    Seed {
        id: "FL001",
        travel_type: TravelType::Flight,
        source: "new-york",
        destination: "los-angeles",
        date: (2024, 9, 15),
        time: "08:30",
        duration: "5h 30m",
        price: 299.0,
        available_seats: 12,
        operator: "American Airlines",
    },
    Seed {
        id: "TR002",
        travel_type: TravelType::Train,
        source: "chicago",
        destination: "denver",
        date: (2024, 9, 16),
        time: "14:15",
        duration: "18h 45m",
        price: 89.0,
        available_seats: 24,
        operator: "Amtrak",
    },
    Seed {
        id: "BS003",
        travel_type: TravelType::Bus,
        source: "san-francisco",
        destination: "los-angeles",
        date: (2024, 9, 17),
        time: "22:00",
        duration: "7h 45m",
        price: 45.0,
        available_seats: 3,
        operator: "Greyhound",
    },
];

impl Seed {
    fn to_option(&self) -> TravelOption {
        let (year, month, day) = self.date;
        TravelOption {
            id: self.id.to_string(),
            travel_type: self.travel_type,
            source: self.source.to_string(),
            destination: self.destination.to_string(),
            date: NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN),
            time: self.time.to_string(),
            duration: self.duration.to_string(),
            price: self.price,
            available_seats: self.available_seats,
            operator: Some(self.operator.to_string()),
        }
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::seeded()
    }
}

impl Catalog {
    /// The built-in offerings.
    pub fn seeded() -> Self {
        Self {
            options: SEEDS.iter().map(Seed::to_option).collect(),
        }
    }

    pub fn new(options: Vec<TravelOption>) -> Result<Self, TravelError> {
        let catalog = Self { options };
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json(json: &str) -> Result<Self, TravelError> {
        let options: Vec<TravelOption> = serde_json::from_str(json)
            .map_err(|e| TravelError::InvalidCatalog(e.to_string()))?;
        Self::new(options)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, TravelError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        debug!(path = %path.display(), options = catalog.len(), "loaded catalog");
        Ok(catalog)
    }

    fn validate(&self) -> Result<(), TravelError> {
        let mut seen = HashSet::new();
        for option in &self.options {
            if option.id.trim().is_empty() {
                return Err(TravelError::InvalidCatalog("empty travel id".into()));
            }
            if !seen.insert(option.id.as_str()) {
                return Err(TravelError::InvalidCatalog(format!(
                    "duplicate travel id {}",
                    option.id
                )));
            }
            if !(option.price.is_finite() && option.price > 0.0) {
                return Err(TravelError::InvalidCatalog(format!(
                    "{}: price must be positive, got {}",
                    option.id, option.price
                )));
            }
            for (field, city) in [("source", &option.source), ("destination", &option.destination)] {
                if city.is_empty() || slugify(city) != *city {
                    return Err(TravelError::InvalidCatalog(format!(
                        "{}: {field} must be a lowercase slug like new-york, got \"{city}\"",
                        option.id
                    )));
                }
            }
            if NaiveTime::parse_from_str(&option.time, "%H:%M").is_err() {
                return Err(TravelError::InvalidCatalog(format!(
                    "{}: time must be HH:MM, got \"{}\"",
                    option.id, option.time
                )));
            }
        }
        Ok(())
    }

    pub fn options(&self) -> &[TravelOption] {
        &self.options
    }

    pub fn find(&self, id: &str) -> Option<&TravelOption> {
        self.options.iter().find(|o| o.id == id)
    }

    pub fn get(&self, id: &str) -> Result<&TravelOption, TravelError> {
        self.find(id)
            .ok_or_else(|| TravelError::NoSuchTravel(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }
}
