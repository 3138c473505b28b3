use thiserror::Error;

#[derive(Debug, Error)]
pub enum TravelError {
    #[error("{0}")]
    Validation(String),

    #[error("not enough seats — requested {requested}, only {available} available")]
    Capacity { requested: u32, available: u32 },

    #[error("no booking with id \"{0}\"")]
    NoSuchBooking(String),

    #[error("no travel option with id \"{0}\"")]
    NoSuchTravel(String),

    #[error("invalid date \"{0}\" — must be YYYY-MM-DD format (e.g. 2024-09-15)")]
    InvalidDate(String),

    #[error("invalid catalog — {0}")]
    InvalidCatalog(String),

    #[error(
        "request timed out — the booking service may be slow or asleep. \
         Try increasing --timeout or check your connection"
    )]
    Timeout,

    #[error("connection failed — check your internet connection ({0})")]
    ConnectionFailed(String),

    #[error("proxy error — check your --proxy URL is correct ({0})")]
    ProxyError(String),

    #[error("TLS/SSL error — connection to the booking service failed ({0})")]
    TlsError(String),

    #[error("unexpected HTTP status {0} from the booking service")]
    HttpStatus(u16),

    #[error("failed to decode response from the booking service — {0}")]
    Decode(String),

    #[error("failed to encode output — {0}")]
    Encode(String),

    #[error("{0}")]
    Application(String),

    #[error("configuration error — {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TravelError {
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::Timeout
                | Self::ConnectionFailed(_)
                | Self::ProxyError(_)
                | Self::TlsError(_)
                | Self::HttpStatus(_)
                | Self::Decode(_)
        )
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::Capacity { .. } => "capacity_error",
            Self::NoSuchBooking(_) => "no_such_booking",
            Self::NoSuchTravel(_) => "no_such_travel",
            Self::InvalidDate(_) => "invalid_date",
            Self::InvalidCatalog(_) => "invalid_catalog",
            Self::Timeout => "timeout",
            Self::ConnectionFailed(_) => "connection_failed",
            Self::ProxyError(_) => "proxy_error",
            Self::TlsError(_) => "tls_error",
            Self::HttpStatus(_) => "http_error",
            Self::Decode(_) => "decode_error",
            Self::Encode(_) => "encode_error",
            Self::Application(_) => "application_error",
            Self::Config(_) => "config_error",
            Self::Io(_) => "io_error",
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) | Self::InvalidDate(_) => 2,
            Self::Capacity { .. } => 3,
            _ if self.is_remote() => 4,
            Self::Application(_) => 5,
            Self::NoSuchBooking(_) | Self::NoSuchTravel(_) => 6,
            _ => 7,
        }
    }
}

pub fn from_http_error(err: wreq::Error) -> TravelError {
    classify_http_error(err.to_string(), err.is_timeout(), err.is_connect())
}

fn classify_http_error(msg: String, timed_out: bool, connect: bool) -> TravelError {
    let lower = msg.to_lowercase();

    if timed_out {
        return TravelError::Timeout;
    }

    if connect {
        return TravelError::ConnectionFailed(msg);
    }

    if lower.contains("proxy") || lower.contains("socks") {
        return TravelError::ProxyError(msg);
    }

    if lower.contains("tls") || lower.contains("ssl") || lower.contains("certificate") {
        return TravelError::TlsError(msg);
    }

    if lower.contains("builder error") && lower.contains("uri") {
        return TravelError::ProxyError(msg);
    }

    TravelError::ConnectionFailed(msg)
}
