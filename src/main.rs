use std::path::PathBuf;
use std::process;

use chrono::Local;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use travelbook::auth::{AuthClient, Authenticated, LoginRequest, RegisterRequest};
use travelbook::catalog::Catalog;
use travelbook::config::Config;
use travelbook::error::TravelError;
use travelbook::model::{PassengerDetail, TravelOption};
use travelbook::query::{self, SearchCriteria};
use travelbook::session::{BookingRequest, BookingSession};
use travelbook::shell::Shell;
use travelbook::table;
use travelbook::token::TokenStore;

#[derive(Parser)]
#[command(
    name = "travelbook",
    about = "Search and book flights, trains and buses from the terminal",
    version,
    after_help = "\
Examples:
  travelbook search --type flight -f \"New York\"
  travelbook search -t los-angeles --max-price 100 --json --pretty
  travelbook book FL001 -p \"Ada Lovelace:36\" -p \"Bob Smith:40\"
  travelbook login --email ada@example.com --password s3cret!
  travelbook shell"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    #[command(
        about = "Search the travel catalog",
        long_about = "Search the travel catalog. Every supplied filter must match; \
            omitted filters place no constraint. Results keep catalog order.",
        after_help = "\
Examples:
  Everything:   travelbook search
  By type:      travelbook search --type train
  By route:     travelbook search -f \"New York\" -t \"Los Angeles\"
  By date:      travelbook search -d 2024-09-15
  Budget:       travelbook search --max-price 100 --min-seats 2
  JSON output:  travelbook search --type flight --json --pretty"
    )]
    Search(SearchArgs),
    #[command(
        about = "Book a travel option",
        long_about = "Book a travel option for 1-4 passengers. Bookings live only for the \
            current session; use `travelbook shell` to book and cancel in one session."
    )]
    Book(BookArgs),
    #[command(about = "Log in to the booking service and store the auth token")]
    Login(LoginArgs),
    #[command(about = "Create an account and store the auth token")]
    Register(RegisterArgs),
    #[command(about = "Log out and remove the stored auth token")]
    Logout(LogoutArgs),
    #[command(about = "Interactive session: search, book, list and cancel")]
    Shell(CatalogArgs),
    #[command(about = "Start MCP server for AI agents (stdio transport)")]
    Mcp(CatalogArgs),
}

#[derive(clap::Args)]
struct CatalogArgs {
    #[arg(
        long,
        value_name = "PATH",
        help = "Load travel options from a JSON file instead of the built-in set"
    )]
    catalog: Option<PathBuf>,
}

#[derive(clap::Args)]
struct OutputArgs {
    #[arg(long, help = "Output as JSON")]
    json: bool,

    #[arg(long, help = "Output as pretty-printed JSON")]
    pretty: bool,
}

impl OutputArgs {
    fn is_json(&self) -> bool {
        self.json || self.pretty
    }
}

#[derive(clap::Args)]
struct GatewayArgs {
    #[arg(long, value_name = "URL", help = "Booking service base URL")]
    api_url: Option<String>,

    #[arg(long, value_name = "URL", help = "HTTP or SOCKS5 proxy")]
    proxy: Option<String>,

    #[arg(long, value_name = "SECS", help = "Request timeout [default: 30]")]
    timeout: Option<u64>,
}

#[derive(clap::Args)]
struct SearchArgs {
    #[arg(
        long = "type",
        value_name = "TYPE",
        help = "Travel type [flight, train, bus]"
    )]
    travel_type: Option<String>,

    #[arg(
        short, long,
        value_name = "CITY",
        help = "Departure city",
        long_help = "Departure city, as a slug (new-york) or display name (\"New York\")."
    )]
    from: Option<String>,

    #[arg(
        short, long,
        value_name = "CITY",
        help = "Arrival city",
        long_help = "Arrival city, as a slug (los-angeles) or display name (\"Los Angeles\")."
    )]
    to: Option<String>,

    #[arg(short, long, value_name = "YYYY-MM-DD", help = "Travel date")]
    date: Option<String>,

    #[arg(long, default_value = "1", value_name = "N", help = "Number of passengers (1-4)")]
    passengers: u32,

    #[arg(long, value_name = "PRICE", help = "Minimum price per passenger")]
    min_price: Option<f64>,

    #[arg(long, value_name = "PRICE", help = "Maximum price per passenger")]
    max_price: Option<f64>,

    #[arg(long, value_name = "N", help = "Only options with at least N seats left")]
    min_seats: Option<u32>,

    #[arg(long, value_name = "N", help = "Show only the first N results")]
    top: Option<usize>,

    #[arg(long, help = "One-line-per-option output (recommended for scripts)")]
    compact: bool,

    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    catalog: CatalogArgs,
}

#[derive(clap::Args)]
struct BookArgs {
    #[arg(value_name = "TRAVEL_ID", help = "Travel option id (e.g. FL001)")]
    travel_id: String,

    #[arg(
        short = 'p',
        long = "passenger",
        value_name = "NAME:AGE",
        help = "Passenger (repeatable, 1-4)",
        num_args = 1
    )]
    passenger: Vec<String>,

    #[arg(
        long,
        value_name = "N",
        help = "Expected passenger count; must match the --passenger entries"
    )]
    passengers: Option<u32>,

    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    catalog: CatalogArgs,
}

#[derive(clap::Args)]
struct LoginArgs {
    #[arg(long, value_name = "EMAIL", help = "Account email")]
    email: Option<String>,

    #[arg(long, value_name = "PASSWORD", help = "Account password")]
    password: Option<String>,

    #[command(flatten)]
    gateway: GatewayArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(clap::Args)]
struct RegisterArgs {
    #[arg(long, value_name = "NAME", help = "Username")]
    username: Option<String>,

    #[arg(long, value_name = "EMAIL", help = "Account email")]
    email: Option<String>,

    #[arg(long, value_name = "PASSWORD", help = "Password (at least 6 characters)")]
    password: Option<String>,

    #[arg(long, value_name = "PASSWORD", help = "Repeat the password")]
    password_confirm: Option<String>,

    #[command(flatten)]
    gateway: GatewayArgs,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(clap::Args)]
struct LogoutArgs {
    #[command(flatten)]
    gateway: GatewayArgs,
}

fn die(err: &TravelError, json_mode: bool) -> ! {
    if json_mode {
        let json = serde_json::json!({
            "error": {
                "kind": err.kind(),
                "message": err.to_string(),
            }
        });
        println!("{json}");
    } else {
        eprintln!("error: {err}");
    }
    process::exit(err.exit_code());
}

fn print_json<T: serde::Serialize>(value: &T, output: &OutputArgs) {
    let encoded = if output.pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    match encoded {
        Ok(s) => println!("{s}"),
        Err(e) => die(&TravelError::Encode(e.to_string()), true),
    }
}

fn load_catalog(args: &CatalogArgs, config: &Config) -> Result<Catalog, TravelError> {
    match args.catalog.as_ref().or(config.catalog_path.as_ref()) {
        Some(path) => Catalog::from_json_file(path),
        None => Ok(Catalog::seeded()),
    }
}

fn gateway_client(args: &GatewayArgs, config: &Config) -> Result<AuthClient, TravelError> {
    let mut config = config.clone();
    if args.api_url.is_some() {
        config.api_url = args.api_url.clone();
    }
    if args.proxy.is_some() {
        config.proxy = args.proxy.clone();
    }
    if let Some(timeout) = args.timeout {
        config.timeout = Some(timeout.to_string());
    }
    AuthClient::new(&config.client_options()?)
}

fn build_criteria(args: &SearchArgs) -> Result<SearchCriteria, TravelError> {
    Ok(SearchCriteria {
        travel_type: query::parse_type_field(args.travel_type.as_deref())?,
        source: args.from.as_deref().map(query::slugify),
        destination: args.to.as_deref().map(query::slugify),
        date: query::parse_date_field(args.date.as_deref())?,
        passengers: args.passengers,
        price_min: args.min_price,
        price_max: args.max_price,
        min_seats: args.min_seats,
    })
}

fn build_request(args: &BookArgs) -> Result<BookingRequest, TravelError> {
    if args.passenger.is_empty() {
        return Err(TravelError::Validation(
            "at least one --passenger \"NAME:AGE\" is required".into(),
        ));
    }
    let details = args
        .passenger
        .iter()
        .map(|p| PassengerDetail::parse(p))
        .collect::<Result<Vec<_>, _>>()?;
    let mut request = BookingRequest::for_passengers(details);
    if let Some(n) = args.passengers {
        request.passengers = n;
    }
    Ok(request)
}

fn print_options(results: &[TravelOption], args: &SearchArgs) {
    if args.output.is_json() {
        print_json(&results, &args.output);
    } else if results.is_empty() {
        println!("No travel options found.");
    } else if args.compact {
        for option in results {
            println!("{}", table::option_line(option));
        }
    } else {
        println!("{}", table::render_options(results));
    }
}

fn print_authenticated(session: &Authenticated, store: &TokenStore, output: &OutputArgs) {
    if output.is_json() {
        print_json(&session.user, output);
    } else {
        println!("Welcome, {}!", session.user.username);
        if session.token.is_some() {
            println!("Token saved to {}", store.path().display());
        }
    }
}

fn save_token(session: &Authenticated, store: &TokenStore) -> Result<(), TravelError> {
    match session.token {
        Some(ref token) => store.save(token),
        None => Ok(()),
    }
}

fn init_logging(config: &Config) {
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::from_env() {
        Ok(c) => c,
        Err(e) => die(&e, false),
    };
    init_logging(&config);

    match cli.command {
        Commands::Search(args) => {
            let json_mode = args.output.is_json();
            let catalog = match load_catalog(&args.catalog, &config) {
                Ok(c) => c,
                Err(e) => die(&e, json_mode),
            };
            let criteria = match build_criteria(&args) {
                Ok(c) => c,
                Err(e) => die(&e, json_mode),
            };
            match travelbook::search(&catalog, &criteria) {
                Ok(mut results) => {
                    if let Some(n) = args.top {
                        results.truncate(n);
                    }
                    print_options(&results, &args);
                }
                Err(e) => die(&e, json_mode),
            }
        }
        Commands::Book(args) => {
            let json_mode = args.output.is_json();
            let catalog = match load_catalog(&args.catalog, &config) {
                Ok(c) => c,
                Err(e) => die(&e, json_mode),
            };
            let request = match build_request(&args) {
                Ok(r) => r,
                Err(e) => die(&e, json_mode),
            };
            let travel = match catalog.get(&args.travel_id) {
                Ok(t) => t,
                Err(e) => die(&e, json_mode),
            };
            let mut session = BookingSession::new();
            match session.confirm(travel, request) {
                Ok(booking) => {
                    if json_mode {
                        print_json(booking, &args.output);
                    } else {
                        println!("Booking confirmed: {}", booking.id);
                        println!(
                            "{}",
                            table::render_bookings(
                                std::slice::from_ref(booking),
                                Local::now().date_naive()
                            )
                        );
                    }
                }
                Err(e) => die(&e, json_mode),
            }
        }
        Commands::Login(args) => {
            let json_mode = args.output.is_json();
            let request = LoginRequest {
                email: args.email.clone().unwrap_or_default(),
                password: args.password.clone().unwrap_or_default(),
            };
            if let Err(e) = request.validate() {
                die(&e, json_mode);
            }
            let store = TokenStore::new(config.token_path.clone());
            let client = match gateway_client(&args.gateway, &config) {
                Ok(c) => c,
                Err(e) => die(&e, json_mode),
            };
            match client.login(&request).await {
                Ok(session) => {
                    if let Err(e) = save_token(&session, &store) {
                        die(&e, json_mode);
                    }
                    print_authenticated(&session, &store, &args.output);
                }
                Err(e) => die(&e, json_mode),
            }
        }
        Commands::Register(args) => {
            let json_mode = args.output.is_json();
            let request = RegisterRequest {
                username: args.username.clone().unwrap_or_default(),
                email: args.email.clone().unwrap_or_default(),
                password: args.password.clone().unwrap_or_default(),
                password_confirm: args.password_confirm.clone().unwrap_or_default(),
            };
            if let Err(e) = request.validate() {
                die(&e, json_mode);
            }
            let store = TokenStore::new(config.token_path.clone());
            let client = match gateway_client(&args.gateway, &config) {
                Ok(c) => c,
                Err(e) => die(&e, json_mode),
            };
            match client.register(&request).await {
                Ok(session) => {
                    if let Err(e) = save_token(&session, &store) {
                        die(&e, json_mode);
                    }
                    print_authenticated(&session, &store, &args.output);
                }
                Err(e) => die(&e, json_mode),
            }
        }
        Commands::Logout(args) => {
            let store = TokenStore::new(config.token_path.clone());
            let client = gateway_client(&args.gateway, &config);
            match travelbook::logout(client, &store).await {
                Ok(()) => println!("Logged out."),
                Err(e) => die(&e, false),
            }
        }
        Commands::Shell(args) => {
            let catalog = match load_catalog(&args, &config) {
                Ok(c) => c,
                Err(e) => die(&e, false),
            };
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            if let Err(e) = Shell::new(&catalog).run(stdin.lock(), stdout.lock()) {
                die(&e, false);
            }
        }
        Commands::Mcp(args) => {
            let catalog = match load_catalog(&args, &config) {
                Ok(c) => c,
                Err(e) => die(&e, false),
            };
            if let Err(e) = travelbook::mcp::run(catalog).await {
                die(&e, false);
            }
        }
    }
}
