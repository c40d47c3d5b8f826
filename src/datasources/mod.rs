pub mod advisory;
pub mod ipapi;
pub mod openmeteo;

pub use advisory::AdvisoryClient;
pub use ipapi::IpApiClient;
pub use openmeteo::OpenMeteoClient;
