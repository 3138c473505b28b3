use chrono::NaiveDate;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};

use crate::model::{Booking, TravelOption};

pub fn format_price(price: f64) -> String {
    format!("${price:.2}")
}

/// `new-york` -> `New York`.
pub fn city_name(slug: &str) -> String {
    slug.split('-')
        .filter(|w| !w.is_empty())
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn route(source: &str, destination: &str) -> String {
    format!("{} → {}", city_name(source), city_name(destination))
}

pub fn render_options(options: &[TravelOption]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "ID", "Type", "Operator", "Route", "Date", "Depart", "Duration", "Seats", "Price",
        ]);

    for option in options {
        table.add_row(vec![
            option.id.clone(),
            option.travel_type.to_string(),
            option.operator.clone().unwrap_or_else(|| "—".to_string()),
            route(&option.source, &option.destination),
            option.date.to_string(),
            option.time.clone(),
            option.duration.clone(),
            option.available_seats.to_string(),
            format_price(option.price),
        ]);
    }

    table.to_string()
}

pub fn render_bookings(bookings: &[Booking], today: NaiveDate) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Booking", "Travel", "Route", "Depart", "Passengers", "Total", "Status", "Booked",
        ]);

    for booking in bookings {
        let names: Vec<String> = booking
            .passenger_details
            .iter()
            .map(|p| format!("{} ({})", p.name, p.age))
            .collect();

        let status = if booking.is_cancellable(today) {
            format!("{} (cancellable)", booking.status)
        } else {
            booking.status.to_string()
        };

        table.add_row(vec![
            booking.id.clone(),
            format!("{} {}", booking.travel_type, booking.travel_id),
            route(&booking.source, &booking.destination),
            format!("{} {}", booking.date, booking.time),
            names.join("\n"),
            format_price(booking.total_price),
            status,
            booking.booking_date.to_string(),
        ]);
    }

    table.to_string()
}

pub fn option_line(option: &TravelOption) -> String {
    format!(
        "{} | {} | {}>{} | {} {} | {} | {} seats | {}",
        option.id,
        option.travel_type,
        option.source,
        option.destination,
        option.date,
        option.time,
        option.duration,
        option.available_seats,
        format_price(option.price),
    )
}

pub fn booking_line(booking: &Booking) -> String {
    format!(
        "{} | {} | {}>{} | {} {} | {} pax | {} | {}",
        booking.id,
        booking.travel_id,
        booking.source,
        booking.destination,
        booking.date,
        booking.time,
        booking.passengers,
        format_price(booking.total_price),
        booking.status,
    )
}
