use chrono::{Local, NaiveDate};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::TravelError;
use crate::model::{Booking, BookingStatus, PassengerDetail, TravelOption};
use crate::query::MAX_PASSENGERS;

/// Passenger data collected by the booking form.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub passengers: u32,
    pub passenger_details: Vec<PassengerDetail>,
}

impl BookingRequest {
    /// A request whose passenger count is taken from the detail list.
    pub fn for_passengers(passenger_details: Vec<PassengerDetail>) -> Self {
        Self {
            passengers: passenger_details.len() as u32,
            passenger_details,
        }
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

        if self.passenger_details.len() != self.passengers as usize {
            return Err(TravelError::Validation(format!(
                "incomplete details — expected {} passengers, got {}",
                self.passengers,
                self.passenger_details.len()
            )));
        }

        for (i, p) in self.passenger_details.iter().enumerate() {
            if p.name.trim().is_empty() {
                return Err(TravelError::Validation(format!(
                    "incomplete details — passenger {} has no name",
                    i + 1
                )));
            }
            if !(1..=120).contains(&p.age) {
                return Err(TravelError::Validation(format!(
                    "incomplete details — passenger {} age must be 1-120, got {}",
                    i + 1,
                    p.age
                )));
            }
        }

        Ok(())
    }
}

/// Bookings made during one session. Records are appended and never removed;
/// cancellation only flips the status.
#[derive(Debug, Default)]
pub struct BookingSession {
    bookings: Vec<Booking>,
}

fn booking_id(today: NaiveDate) -> String {
    let suffix = Uuid::new_v4().simple().to_string()[..6].to_uppercase();
    format!("BK{}{suffix}", today.format("%Y%m%d"))
}

impl BookingSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bookings(&self) -> &[Booking] {
        &self.bookings
    }

    pub fn get(&self, id: &str) -> Option<&Booking> {
        self.bookings.iter().find(|b| b.id == id)
    }

    pub fn len(&self) -> usize {
        self.bookings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookings.is_empty()
    }

    pub fn confirm(
        &mut self,
        travel: &TravelOption,
        request: BookingRequest,
    ) -> Result<&Booking, TravelError> {
        self.confirm_on(travel, request, Local::now().date_naive())
    }

    /// Validates the request against `travel` and appends a confirmed booking.
    /// Nothing is recorded when validation fails.
    pub fn confirm_on(
        &mut self,
        travel: &TravelOption,
        request: BookingRequest,
        today: NaiveDate,
    ) -> Result<&Booking, TravelError> {
        request.validate()?;

        if request.passengers > travel.available_seats {
            return Err(TravelError::Capacity {
                requested: request.passengers,
                available: travel.available_seats,
            });
        }

        let mut id = booking_id(today);
        while self.get(&id).is_some() {
            id = booking_id(today);
        }

        let booked_before: u32 = self
            .bookings
            .iter()
            .filter(|b| b.travel_id == travel.id && b.status == BookingStatus::Confirmed)
            .map(|b| b.passengers)
            .sum();
        if booked_before + request.passengers > travel.available_seats {
            // Seats are not decremented on confirmation.
            debug!(
                travel_id = %travel.id,
                booked = booked_before + request.passengers,
                available = travel.available_seats,
                "session bookings exceed listed seats"
            );
        }

        let passenger_details = request
            .passenger_details
            .into_iter()
            .map(|p| PassengerDetail::new(p.name.trim(), p.age))
            .collect();

        let booking = Booking {
            id,
            travel_id: travel.id.clone(),
            travel_type: travel.travel_type,
            source: travel.source.clone(),
            destination: travel.destination.clone(),
            date: travel.date,
            time: travel.time.clone(),
            passengers: request.passengers,
            total_price: travel.price * f64::from(request.passengers),
            status: BookingStatus::Confirmed,
            booking_date: today,
            passenger_details,
            cancelled_on: None,
            cancellation_reason: None,
        };

        info!(
            booking_id = %booking.id,
            travel_id = %booking.travel_id,
            passengers = booking.passengers,
            total_price = booking.total_price,
            "booking confirmed"
        );

        self.bookings.push(booking);
        Ok(&self.bookings[self.bookings.len() - 1])
    }

    pub fn cancel(
        &mut self,
        id: &str,
        reason: Option<String>,
    ) -> Result<BookingStatus, TravelError> {
        self.cancel_on(id, reason, Local::now().date_naive())
    }

    /// Moves a confirmed booking to cancelled. Any other status is left as is
    /// and returned unchanged.
    pub fn cancel_on(
        &mut self,
        id: &str,
        reason: Option<String>,
        today: NaiveDate,
    ) -> Result<BookingStatus, TravelError> {
        let booking = self
            .bookings
            .iter_mut()
            .find(|b| b.id == id)
            .ok_or_else(|| TravelError::NoSuchBooking(id.to_string()))?;

        if booking.status != BookingStatus::Confirmed {
            debug!(booking_id = %id, status = %booking.status, "cancel is a no-op");
            return Ok(booking.status);
        }

        booking.status = BookingStatus::Cancelled;
        booking.cancelled_on = Some(today);
        booking.cancellation_reason = reason.filter(|r| !r.trim().is_empty());
        info!(booking_id = %id, "booking cancelled");
        Ok(booking.status)
    }
}
