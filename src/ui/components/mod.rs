pub mod gauge;
pub mod input;
pub mod progress;

pub use gauge::{humidity_gauge, soil_moisture_gauge, temperature_gauge};
pub use input::{FieldView, FormGrid};
pub use progress::StepProgress;
