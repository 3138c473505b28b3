use std::io::{BufRead, Write};

use chrono::Local;

use crate::catalog::Catalog;
use crate::error::TravelError;
use crate::model::{PassengerDetail, TravelOption};
use crate::query::{self, SearchCriteria};
use crate::session::{BookingRequest, BookingSession};
use crate::table;

const HELP: &str = "\
Commands:
  search [type=T] [from=CITY] [to=CITY] [date=YYYY-MM-DD] [passengers=N]
         [min-price=P] [max-price=P] [min-seats=N]
  book ID \"NAME:AGE\" [\"NAME:AGE\" ...]
  cancel BOOKING_ID [REASON...]
  bookings
  view [search|bookings]
  help
  quit";

/// Which listing the shell is showing. Presentation state only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Search,
    Bookings,
}

#[derive(Debug, PartialEq, Eq)]
pub enum Outcome {
    Continue(String),
    Quit,
}

/// Splits on whitespace, keeping double-quoted runs together.
pub fn split_args(line: &str) -> Result<Vec<String>, TravelError> {
    let mut args = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut has_token = false;

    for c in line.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                has_token = true;
            }
            c if c.is_whitespace() && !in_quotes => {
                if has_token {
                    args.push(std::mem::take(&mut current));
                    has_token = false;
                }
            }
            c => {
                current.push(c);
                has_token = true;
            }
        }
    }

    if in_quotes {
        return Err(TravelError::Validation("unterminated quote".into()));
    }
    if has_token {
        args.push(current);
    }
    Ok(args)
}

fn parse_criteria(args: &[String]) -> Result<SearchCriteria, TravelError> {
    let mut criteria = SearchCriteria::default();
    for arg in args {
        let (key, value) = arg.split_once('=').ok_or_else(|| {
            TravelError::Validation(format!("expected KEY=VALUE, got \"{arg}\""))
        })?;
        let number = |v: &str| {
            v.parse::<f64>()
                .map_err(|_| TravelError::Validation(format!("{key} must be a number")))
        };
        let count = |v: &str| {
            v.parse::<u32>()
                .map_err(|_| TravelError::Validation(format!("{key} must be a whole number")))
        };
        match key {
            "type" => criteria.travel_type = query::parse_type_field(Some(value))?,
            "from" | "source" => criteria.source = Some(query::slugify(value)),
            "to" | "destination" => criteria.destination = Some(query::slugify(value)),
            "date" => criteria.date = query::parse_date_field(Some(value))?,
            "passengers" => criteria.passengers = count(value)?,
            "min-price" => criteria.price_min = Some(number(value)?),
            "max-price" => criteria.price_max = Some(number(value)?),
            "min-seats" => criteria.min_seats = Some(count(value)?),
            _ => {
                return Err(TravelError::Validation(format!(
                    "unknown search field \"{key}\""
                )))
            }
        }
    }
    Ok(criteria)
}

pub struct Shell<'a> {
    catalog: &'a Catalog,
    session: BookingSession,
    view: View,
    results: Option<Vec<TravelOption>>,
}

impl<'a> Shell<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self {
            catalog,
            session: BookingSession::new(),
            view: View::Search,
            results: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn session(&self) -> &BookingSession {
        &self.session
    }

    fn render_search(&self) -> String {
        match &self.results {
            None => {
                let lines: Vec<String> =
                    self.catalog.options().iter().map(table::option_line).collect();
                format!("All travel options:\n{}", lines.join("\n"))
            }
            Some(results) if results.is_empty() => "No travel options found.".to_string(),
            Some(results) => {
                let lines: Vec<String> = results.iter().map(table::option_line).collect();
                format!("Found {} travel options:\n{}", results.len(), lines.join("\n"))
            }
        }
    }

    fn render_bookings(&self) -> String {
        if self.session.is_empty() {
            return "No bookings yet.".to_string();
        }
        let lines: Vec<String> = self
            .session
            .bookings()
            .iter()
            .map(table::booking_line)
            .collect();
        lines.join("\n")
    }

    pub fn execute(&mut self, line: &str) -> Result<Outcome, TravelError> {
        let args = split_args(line)?;
        let Some((command, rest)) = args.split_first() else {
            return Ok(Outcome::Continue(String::new()));
        };

        let out = match command.as_str() {
            "quit" | "exit" => return Ok(Outcome::Quit),
            "help" => HELP.to_string(),
            "search" => {
                let criteria = parse_criteria(rest)?;
                self.results = Some(crate::search(self.catalog, &criteria)?);
                self.view = View::Search;
                self.render_search()
            }
            "book" => {
                let (id, passengers) = rest.split_first().ok_or_else(|| {
                    TravelError::Validation("usage: book ID \"NAME:AGE\" ...".into())
                })?;
                let details = passengers
                    .iter()
                    .map(|p| PassengerDetail::parse(p))
                    .collect::<Result<Vec<_>, _>>()?;
                let travel = self.catalog.get(id)?;
                let booking = self
                    .session
                    .confirm(travel, BookingRequest::for_passengers(details))?;
                format!(
                    "Booking confirmed: {} ({})",
                    booking.id,
                    table::format_price(booking.total_price)
                )
            }
            "cancel" => {
                let (id, reason) = rest.split_first().ok_or_else(|| {
                    TravelError::Validation("usage: cancel BOOKING_ID [REASON...]".into())
                })?;
                let reason = (!reason.is_empty()).then(|| reason.join(" "));
                let status = self.session.cancel(id, reason)?;
                format!("{id}: {status}")
            }
            "bookings" => {
                self.view = View::Bookings;
                self.render_bookings()
            }
            "view" => {
                match rest.first().map(String::as_str) {
                    Some("search") => self.view = View::Search,
                    Some("bookings") => self.view = View::Bookings,
                    Some(other) => {
                        return Err(TravelError::Validation(format!(
                            "unknown view \"{other}\""
                        )))
                    }
                    None => {}
                }
                match self.view {
                    View::Search => self.render_search(),
                    View::Bookings => self.render_bookings(),
                }
            }
            other => {
                return Err(TravelError::Validation(format!(
                    "unknown command \"{other}\" (try help)"
                )))
            }
        };
        Ok(Outcome::Continue(out))
    }

    /// Reads commands until `quit` or end of input. Command errors are
    /// reported and the session carries on.
    pub fn run<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> Result<(), TravelError> {
        writeln!(
            output,
            "travelbook shell — {} options, today is {}. Type help for commands.",
            self.catalog.len(),
            Local::now().date_naive()
        )?;
        write!(output, "> ")?;
        output.flush()?;

        for line in input.lines() {
            let line = line?;
            match self.execute(&line) {
                Ok(Outcome::Quit) => return Ok(()),
                Ok(Outcome::Continue(text)) => {
                    if !text.is_empty() {
                        writeln!(output, "{text}")?;
                    }
                }
                Err(e) => writeln!(output, "error: {e}")?,
            }
            write!(output, "> ")?;
            output.flush()?;
        }
        writeln!(output)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(outcome: Outcome) -> String {
        match outcome {
            Outcome::Continue(s) => s,
            Outcome::Quit => panic!("unexpected quit"),
        }
    }

    #[test]
    fn split_args_honours_quotes() {
        let args = split_args(r#"book FL001 "Ada Lovelace:36" Bob:40"#).unwrap();
        assert_eq!(args, vec!["book", "FL001", "Ada Lovelace:36", "Bob:40"]);
        assert!(split_args(r#"book "oops"#).is_err());
    }

    #[test]
    fn search_switches_view_and_filters() {
        let catalog = Catalog::seeded();
        let mut shell = Shell::new(&catalog);
        shell.execute("bookings").unwrap();
        assert_eq!(shell.view(), View::Bookings);

        let out = text(shell.execute("search from=\"New York\" type=flight").unwrap());
        assert_eq!(shell.view(), View::Search);
        assert!(out.starts_with("Found 1 travel options"));
        assert!(out.contains("FL001"));
    }

    #[test]
    fn blank_type_and_date_match_everything() {
        let catalog = Catalog::seeded();
        let mut shell = Shell::new(&catalog);
        let out = text(shell.execute("search type= date= from=").unwrap());
        assert!(out.starts_with("Found 3 travel options"));
    }

    #[test]
    fn empty_result_differs_from_no_search() {
        let catalog = Catalog::seeded();
        let mut shell = Shell::new(&catalog);
        assert!(text(shell.execute("view").unwrap()).starts_with("All travel options"));
        let out = text(shell.execute("search to=chicago").unwrap());
        assert_eq!(out, "No travel options found.");
    }

    #[test]
    fn book_then_cancel_twice() {
        let catalog = Catalog::seeded();
        let mut shell = Shell::new(&catalog);
        let out = text(shell.execute(r#"book TR002 "Ada Lovelace:36" Bob:40"#).unwrap());
        assert!(out.contains("$178.00"));

        let id = shell.session().bookings()[0].id.clone();
        assert_eq!(
            text(shell.execute(&format!("cancel {id} plans changed")).unwrap()),
            format!("{id}: cancelled")
        );
        assert_eq!(
            text(shell.execute(&format!("cancel {id}")).unwrap()),
            format!("{id}: cancelled")
        );
        assert_eq!(
            shell.session().bookings()[0].cancellation_reason.as_deref(),
            Some("plans changed")
        );
    }

    #[test]
    fn run_reports_errors_and_continues() {
        let catalog = Catalog::seeded();
        let mut shell = Shell::new(&catalog);
        let input = "book BS003 A:1 B:2 C:3 D:4\nbook BS003 :30\nbookings\nquit\n";
        let mut output = Vec::new();
        shell.run(input.as_bytes(), &mut output).unwrap();
        let output = String::from_utf8(output).unwrap();
        assert!(output.contains("error: not enough seats"));
        assert!(output.contains("error: incomplete details"));
        assert!(output.contains("No bookings yet."));
    }

    #[test]
    fn unknown_command_is_an_error() {
        let catalog = Catalog::seeded();
        let mut shell = Shell::new(&catalog);
        assert!(shell.execute("fly").is_err());
        assert_eq!(shell.execute("quit").unwrap(), Outcome::Quit);
    }
}
