pub mod details;
pub mod farm_type;
pub mod results;
pub mod weather;

pub use details::{DetailsField, DetailsScreen};
pub use farm_type::FarmTypeScreen;
pub use results::ResultsScreen;
pub use weather::{WeatherField, WeatherScreen};
