pub mod correlation;
pub mod error;
pub mod model;
pub mod time;

pub use correlation::{CORRELATION_HEADER, CorrelationId};
pub use error::{CoreError, Result};
pub use model::{Address, AuthorisedTestingFacility, Availability, GeoLocation, TokenPayload};
pub use time::{epoch_seconds_to_iso, now_iso_millis, parse_iso};
