pub mod diagnosis;
pub mod disease;
pub mod enums;
pub mod medication;
pub mod patient;
pub mod payment;
pub mod prescription;

pub use diagnosis::*;
pub use disease::*;
pub use medication::*;
pub use patient::*;
pub use payment::*;
pub use prescription::*;

/// Storage format for dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage format for timestamps (UTC).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
