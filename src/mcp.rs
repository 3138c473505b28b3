use std::sync::{Arc, Mutex};

use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::schemars;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler, ServiceExt};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::catalog::Catalog;
use crate::error::TravelError;
use crate::model::PassengerDetail;
use crate::query::{self, SearchCriteria};
use crate::session::{BookingRequest, BookingSession};

#[derive(Debug, Default, Deserialize, schemars::JsonSchema)]
struct SearchArgs {
    #[schemars(description = "One of: flight, train, bus. Omit for any type")]
    #[serde(rename = "type")]
    travel_type: Option<String>,
    #[schemars(description = "Departure city, slug or display name. Example: new-york or New York")]
    from: Option<String>,
    #[schemars(description = "Arrival city, slug or display name. Example: los-angeles")]
    to: Option<String>,
    #[schemars(description = "Travel date in YYYY-MM-DD format. Example: 2024-09-15")]
    date: Option<String>,
    #[schemars(description = "Number of travellers, 1-4. Default: 1")]
    passengers: Option<u32>,
    #[schemars(description = "Lowest acceptable price per passenger")]
    min_price: Option<f64>,
    #[schemars(description = "Highest acceptable price per passenger")]
    max_price: Option<f64>,
    #[schemars(description = "Only options with at least this many seats left")]
    min_seats: Option<u32>,
    #[schemars(description = "Return only the first N matches")]
    top: Option<usize>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct PassengerArg {
    #[schemars(description = "Passenger full name")]
    name: String,
    #[schemars(description = "Passenger age in years, 1-120")]
    age: u32,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct BookArgs {
    #[schemars(description = "Travel option id from travel_search. Example: FL001")]
    travel_id: String,
    #[schemars(description = "One entry per passenger, at most 4")]
    passengers: Vec<PassengerArg>,
}

#[derive(Debug, Deserialize, schemars::JsonSchema)]
struct CancelArgs {
    #[schemars(description = "Booking id returned by travel_book. Example: BK20240901A1B2C3")]
    booking_id: String,
    #[schemars(description = "Optional reason for cancelling")]
    reason: Option<String>,
}

fn tool_error(msg: impl Into<String>) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::error(vec![Content::text(msg.into())]))
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, McpError> {
    match serde_json::to_string_pretty(value) {
        Ok(json) => Ok(CallToolResult::success(vec![Content::text(json)])),
        Err(e) => tool_error(format!("failed to encode result: {e}")),
    }
}

fn build_criteria(args: &SearchArgs) -> Result<SearchCriteria, TravelError> {
    Ok(SearchCriteria {
        travel_type: query::parse_type_field(args.travel_type.as_deref())?,
        source: args.from.as_deref().map(query::slugify),
        destination: args.to.as_deref().map(query::slugify),
        date: query::parse_date_field(args.date.as_deref())?,
        passengers: args.passengers.unwrap_or(1),
        price_min: args.min_price,
        price_max: args.max_price,
        min_seats: args.min_seats,
    })
}

#[derive(Debug, Clone)]
struct TravelMcp {
    catalog: Arc<Catalog>,
    session: Arc<Mutex<BookingSession>>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl TravelMcp {
    fn new(catalog: Catalog) -> Self {
        Self {
            catalog: Arc::new(catalog),
            session: Arc::new(Mutex::new(BookingSession::new())),
            tool_router: Self::tool_router(),
        }
    }

    #[tool(
        description = "Search the travel catalog. Every supplied field must match exactly (cities compare as slugs); omitted fields place no constraint. Results keep catalog order. To book: call travel_book with an id from the results."
    )]
    async fn travel_search(
        &self,
        Parameters(args): Parameters<SearchArgs>,
    ) -> Result<CallToolResult, McpError> {
        let criteria = match build_criteria(&args) {
            Ok(c) => c,
            Err(e) => return tool_error(e.to_string()),
        };
        match crate::search(&self.catalog, &criteria) {
            Ok(mut results) => {
                if let Some(n) = args.top {
                    results.truncate(n);
                }
                json_result(&results)
            }
            Err(e) => tool_error(e.to_string()),
        }
    }

    #[tool(
        description = "Book a travel option for 1-4 passengers. Each passenger needs a non-empty name and an age of 1-120. Fails if more passengers than available seats. Returns the confirmed booking with its id and total price."
    )]
    async fn travel_book(
        &self,
        Parameters(args): Parameters<BookArgs>,
    ) -> Result<CallToolResult, McpError> {
        let travel = match self.catalog.get(&args.travel_id) {
            Ok(t) => t,
            Err(e) => return tool_error(e.to_string()),
        };
        let details = args
            .passengers
            .into_iter()
            .map(|p| PassengerDetail::new(p.name, p.age))
            .collect();

        let Ok(mut session) = self.session.lock() else {
            return tool_error("booking session unavailable");
        };
        match session.confirm(travel, BookingRequest::for_passengers(details)) {
            Ok(booking) => json_result(booking),
            Err(e) => tool_error(e.to_string()),
        }
    }

    #[tool(
        description = "Cancel a confirmed booking by id. Cancelling an already cancelled booking is a no-op. Returns the booking's resulting status."
    )]
    async fn travel_cancel(
        &self,
        Parameters(args): Parameters<CancelArgs>,
    ) -> Result<CallToolResult, McpError> {
        let Ok(mut session) = self.session.lock() else {
            return tool_error("booking session unavailable");
        };
        match session.cancel(&args.booking_id, args.reason) {
            Ok(status) => Ok(CallToolResult::success(vec![Content::text(format!(
                "{}: {status}",
                args.booking_id
            ))])),
            Err(e) => tool_error(e.to_string()),
        }
    }

    #[tool(description = "List every booking made in this session, including cancelled ones.")]
    async fn travel_bookings(&self) -> Result<CallToolResult, McpError> {
        let Ok(session) = self.session.lock() else {
            return tool_error("booking session unavailable");
        };
        json_result(&session.bookings())
    }
}

#[tool_handler]
impl ServerHandler for TravelMcp {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "travelbook".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            instructions: Some(
                "Travel booking tool. Workflow: (1) travel_search to find options. (2) travel_book with an option id and passenger list. (3) travel_bookings to review, travel_cancel to cancel. Bookings last only as long as this server process.".into(),
            ),
        }
    }
}

pub async fn run(catalog: Catalog) -> Result<(), TravelError> {
    info!(options = catalog.len(), "starting MCP server on stdio");
    let service = TravelMcp::new(catalog)
        .serve(rmcp::transport::stdio())
        .await
        .map_err(|e| TravelError::Io(std::io::Error::other(e.to_string())))?;
    service
        .waiting()
        .await
        .map_err(|e| TravelError::Io(std::io::Error::other(e.to_string())))?;
    Ok(())
}
