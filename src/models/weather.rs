use super::region::RegionCode;
use serde::{Deserialize, Serialize};

pub const MIN_TEMPERATURE_C: f64 = -20.0;
pub const MAX_TEMPERATURE_C: f64 = 50.0;

/// Point-in-time weather reading sent with a recommendation request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default)]
    pub rainfall_last_24h: f64,
    #[serde(default)]
    pub rainfall_last_7days: f64,
    #[serde(default)]
    pub rainfall_forecast_48h: bool,
    #[serde(default)]
    pub rainfall_forecast_amount_mm: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub frost_warning: bool,
}

impl WeatherSnapshot {
    /// Clamp every reading into the range the advisory service accepts.
    pub fn normalized(mut self) -> Self {
        self.temperature = clamp_finite(self.temperature, MIN_TEMPERATURE_C, MAX_TEMPERATURE_C);
        self.humidity = clamp_finite(self.humidity, 0.0, 100.0);
        self.rainfall_last_24h = non_negative(self.rainfall_last_24h);
        self.rainfall_last_7days = non_negative(self.rainfall_last_7days);
        self.rainfall_forecast_amount_mm = non_negative(self.rainfall_forecast_amount_mm);
        self.wind_speed = non_negative(self.wind_speed);
        self
    }
}

impl Default for WeatherSnapshot {
    fn default() -> Self {
        Self {
            temperature: 25.0,
            humidity: 60.0,
            rainfall_last_24h: 0.0,
            rainfall_last_7days: 0.0,
            rainfall_forecast_48h: false,
            rainfall_forecast_amount_mm: 0.0,
            wind_speed: 10.0,
            frost_warning: false,
        }
    }
}

fn clamp_finite(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        min.max(0.0).min(max)
    } else {
        value.clamp(min, max)
    }
}

fn non_negative(value: f64) -> f64 {
    if value.is_nan() || value < 0.0 {
        0.0
    } else {
        value
    }
}

/// Location derived from the caller's network address.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationData {
    pub latitude: f64,
    pub longitude: f64,
    pub city: String,
    pub country: String,
    #[serde(default)]
    pub region: Option<String>,
}

impl LocationData {
    pub fn display(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}

/// Current conditions at a coordinate, as reported by a weather provider.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrentConditions {
    pub temperature: f64,
    pub humidity: f64,
    pub precipitation_mm: f64,
    pub wind_speed_kmh: f64,
}

/// Body of `GET /api/v1/weather/auto`, also produced locally by the direct
/// two-stage source (with `region` left empty).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AutoWeather {
    pub temperature: f64,
    pub humidity: f64,
    #[serde(default)]
    pub rainfall_last_24h: f64,
    #[serde(default)]
    pub wind_speed: f64,
    #[serde(default)]
    pub frost_warning: Option<bool>,
    pub location: LocationData,
    #[serde(default)]
    pub region: Option<RegionCode>,
    #[serde(default)]
    pub fallback: bool,
}

/// Where the session's weather values come from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherMode {
    #[default]
    Auto,
    Manual,
}

impl WeatherMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeatherMode::Auto => "Avtomatik",
            WeatherMode::Manual => "Əl ilə",
        }
    }
}

impl std::fmt::Display for WeatherMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalized_clamps_out_of_range_readings() {
        let snapshot = WeatherSnapshot {
            temperature: 63.0,
            humidity: -4.0,
            rainfall_last_24h: -1.0,
            wind_speed: f64::NAN,
            ..WeatherSnapshot::default()
        }
        .normalized();

        assert_eq!(snapshot.temperature, MAX_TEMPERATURE_C);
        assert_eq!(snapshot.humidity, 0.0);
        assert_eq!(snapshot.rainfall_last_24h, 0.0);
        assert_eq!(snapshot.wind_speed, 0.0);
    }

    #[test]
    fn normalized_keeps_valid_readings() {
        let snapshot = WeatherSnapshot {
            temperature: -3.5,
            humidity: 88.0,
            ..WeatherSnapshot::default()
        };
        assert_eq!(snapshot.clone().normalized(), snapshot);
    }

    #[test]
    fn auto_weather_parses_service_body() {
        let body = r#"{
            "temperature": 18,
            "humidity": 71,
            "rainfall_last_24h": 0.4,
            "wind_speed": 12,
            "frost_warning": false,
            "location": {"latitude": 40.68, "longitude": 46.36, "city": "Ganja", "country": "Azerbaijan", "region": "Ganja"},
            "region": "ganja_gazakh",
            "fallback": false
        }"#;
        let parsed: AutoWeather = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.region, Some(RegionCode::GanjaGazakh));
        assert_eq!(parsed.frost_warning, Some(false));
        assert_eq!(parsed.location.display(), "Ganja, Azerbaijan");
    }
}
