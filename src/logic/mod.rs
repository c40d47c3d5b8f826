pub mod region;
pub mod request_builder;
pub mod weather_resolver;
pub mod wizard;

pub use weather_resolver::{ConfiguredWeatherSource, LocationWeatherResolver, Resolution};
pub use wizard::{Effect, WizardState, WizardStep};
