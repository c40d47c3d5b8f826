use super::region::map_location_to_region;
use crate::config::{Config, WeatherSourceKind};
use crate::datasources::{AdvisoryClient, IpApiClient, OpenMeteoClient};
use crate::error::Result;
use crate::models::{AutoWeather, CurrentConditions, LocationData, RegionCode, WeatherSnapshot};
use std::future::Future;
use std::time::Duration;

/// Stage 1: approximate location from the caller's network address.
pub trait GeoLocator: Send + Sync {
    fn locate(&self) -> impl Future<Output = Result<LocationData>> + Send;
}

/// Stage 2: current conditions at a coordinate.
pub trait ConditionsProvider: Send + Sync {
    fn current_conditions(
        &self,
        latitude: f64,
        longitude: f64,
    ) -> impl Future<Output = Result<CurrentConditions>> + Send;
}

/// Anything that can produce a combined location + weather reading.
pub trait WeatherSource: Send + Sync {
    fn fetch_auto_weather(&self) -> impl Future<Output = Result<AutoWeather>> + Send;
}

impl GeoLocator for IpApiClient {
    async fn locate(&self) -> Result<LocationData> {
        self.lookup().await
    }
}

impl ConditionsProvider for OpenMeteoClient {
    async fn current_conditions(&self, latitude: f64, longitude: f64) -> Result<CurrentConditions> {
        self.fetch_current(latitude, longitude).await
    }
}

/// The advisory service runs both stages itself and maps the region.
impl WeatherSource for AdvisoryClient {
    async fn fetch_auto_weather(&self) -> Result<AutoWeather> {
        self.auto_weather().await
    }
}

pub fn frost_warning(temperature_c: f64) -> bool {
    temperature_c < 0.0
}

/// Client-side two-stage chain: geolocate, then fetch conditions for the
/// resolved coordinates. Stage 2 never starts if stage 1 fails.
#[derive(Clone)]
pub struct DirectWeatherSource<G, C> {
    geo: G,
    conditions: C,
}

impl<G: GeoLocator, C: ConditionsProvider> DirectWeatherSource<G, C> {
    pub fn new(geo: G, conditions: C) -> Self {
        Self { geo, conditions }
    }
}

impl<G: GeoLocator, C: ConditionsProvider> WeatherSource for DirectWeatherSource<G, C> {
    async fn fetch_auto_weather(&self) -> Result<AutoWeather> {
        let location = self.geo.locate().await?;
        tracing::debug!(city = %location.city, country = %location.country, "Location resolved");

        let current = self
            .conditions
            .current_conditions(location.latitude, location.longitude)
            .await?;

        // Frost is judged on the raw reading, before rounding
        Ok(AutoWeather {
            temperature: current.temperature.round(),
            humidity: current.humidity.round(),
            rainfall_last_24h: current.precipitation_mm,
            wind_speed: current.wind_speed_kmh.round(),
            frost_warning: Some(frost_warning(current.temperature)),
            location,
            region: None,
            fallback: false,
        })
    }
}

/// Source selected by `weather.source` in the config.
#[derive(Clone)]
pub enum ConfiguredWeatherSource {
    Service(AdvisoryClient),
    Direct(DirectWeatherSource<IpApiClient, OpenMeteoClient>),
}

impl ConfiguredWeatherSource {
    pub fn from_config(config: &Config, advisory: &AdvisoryClient) -> Result<Self> {
        match config.weather.source {
            WeatherSourceKind::Service => Ok(Self::Service(advisory.clone())),
            WeatherSourceKind::Direct => {
                let timeout = config.api.timeout();
                Ok(Self::Direct(DirectWeatherSource::new(
                    IpApiClient::new(config.weather.ipapi_url.clone(), timeout)?,
                    OpenMeteoClient::new(config.weather.open_meteo_url.clone(), timeout)?,
                )))
            }
        }
    }
}

impl WeatherSource for ConfiguredWeatherSource {
    async fn fetch_auto_weather(&self) -> Result<AutoWeather> {
        match self {
            Self::Service(client) => client.fetch_auto_weather().await,
            Self::Direct(source) => source.fetch_auto_weather().await,
        }
    }
}

/// Fully resolved auto-mode reading, adopted by the session as a whole.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedWeather {
    pub weather: WeatherSnapshot,
    pub region: RegionCode,
    pub location: LocationData,
    /// The service degraded to its default location (VPN/proxy detected).
    pub fallback: bool,
}

impl ResolvedWeather {
    pub fn location_display(&self) -> String {
        if self.fallback {
            format!(
                "{} (VPN/proxy aşkarlandı, Bakı istifadə edilir)",
                self.location.display()
            )
        } else {
            self.location.display()
        }
    }
}

/// Outcome of one resolution attempt. `Degraded` is the expected
/// provider-unavailable path and sends the session to manual entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Resolved(ResolvedWeather),
    Degraded(String),
}

pub struct LocationWeatherResolver<S> {
    source: S,
    timeout: Duration,
}

impl<S: WeatherSource> LocationWeatherResolver<S> {
    pub fn new(source: S, timeout: Duration) -> Self {
        Self { source, timeout }
    }

    /// Run the full chain once. No retries; a stalled provider is abandoned
    /// after the configured timeout.
    pub async fn resolve(&self) -> Resolution {
        let outcome = tokio::time::timeout(self.timeout, self.source.fetch_auto_weather()).await;

        match outcome {
            Ok(Ok(auto)) => {
                let resolved = Self::adopt(auto);
                tracing::info!(
                    location = %resolved.location.display(),
                    region = %resolved.region,
                    fallback = resolved.fallback,
                    "Weather resolved"
                );
                Resolution::Resolved(resolved)
            }
            Ok(Err(e)) => {
                tracing::warn!("Weather resolution failed: {}", e);
                Resolution::Degraded(e.to_string())
            }
            Err(_) => {
                tracing::warn!("Weather resolution timed out after {:?}", self.timeout);
                Resolution::Degraded(format!(
                    "no response within {} seconds",
                    self.timeout.as_secs()
                ))
            }
        }
    }

    fn adopt(auto: AutoWeather) -> ResolvedWeather {
        // A region mapped upstream wins over local inference
        let region = auto.region.unwrap_or_else(|| {
            map_location_to_region(
                &auto.location.city,
                auto.location.region.as_deref().unwrap_or(""),
            )
        });

        let weather = WeatherSnapshot {
            temperature: auto.temperature,
            humidity: auto.humidity,
            rainfall_last_24h: auto.rainfall_last_24h,
            wind_speed: auto.wind_speed,
            frost_warning: auto
                .frost_warning
                .unwrap_or_else(|| frost_warning(auto.temperature)),
            // No history or forecast from the providers
            rainfall_last_7days: 0.0,
            rainfall_forecast_48h: false,
            rainfall_forecast_amount_mm: 0.0,
        }
        .normalized();

        ResolvedWeather {
            weather,
            region,
            location: auto.location,
            fallback: auto.fallback,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::YoncaError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedLocator {
        result: std::result::Result<LocationData, String>,
    }

    impl GeoLocator for FixedLocator {
        async fn locate(&self) -> Result<LocationData> {
            self.result.clone().map_err(YoncaError::ResolutionFailed)
        }
    }

    struct FixedConditions {
        result: std::result::Result<CurrentConditions, String>,
        calls: Arc<AtomicUsize>,
    }

    impl ConditionsProvider for FixedConditions {
        async fn current_conditions(&self, _lat: f64, _lon: f64) -> Result<CurrentConditions> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.result.clone().map_err(YoncaError::ResolutionFailed)
        }
    }

    struct StalledSource;

    impl WeatherSource for StalledSource {
        async fn fetch_auto_weather(&self) -> Result<AutoWeather> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Err(YoncaError::ResolutionFailed("unreachable".into()))
        }
    }

    struct CannedSource(AutoWeather);

    impl WeatherSource for CannedSource {
        async fn fetch_auto_weather(&self) -> Result<AutoWeather> {
            Ok(self.0.clone())
        }
    }

    fn ganja() -> LocationData {
        LocationData {
            latitude: 40.68,
            longitude: 46.36,
            city: "Ganja".into(),
            country: "Azerbaijan".into(),
            region: Some("Ganja".into()),
        }
    }

    fn conditions(temperature: f64) -> CurrentConditions {
        CurrentConditions {
            temperature,
            humidity: 54.6,
            precipitation_mm: 1.2,
            wind_speed_kmh: 8.4,
        }
    }

    fn direct(
        location: std::result::Result<LocationData, String>,
        current: std::result::Result<CurrentConditions, String>,
    ) -> (
        LocationWeatherResolver<DirectWeatherSource<FixedLocator, FixedConditions>>,
        Arc<AtomicUsize>,
    ) {
        let calls = Arc::new(AtomicUsize::new(0));
        let source = DirectWeatherSource::new(
            FixedLocator { result: location },
            FixedConditions {
                result: current,
                calls: calls.clone(),
            },
        );
        (
            LocationWeatherResolver::new(source, Duration::from_secs(10)),
            calls,
        )
    }

    #[tokio::test]
    async fn both_stages_succeed() {
        let (resolver, calls) = direct(Ok(ganja()), Ok(conditions(21.7)));

        let Resolution::Resolved(resolved) = resolver.resolve().await else {
            panic!("expected resolution");
        };
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(resolved.weather.temperature, 22.0);
        assert_eq!(resolved.weather.humidity, 55.0);
        assert_eq!(resolved.weather.rainfall_last_24h, 1.2);
        assert_eq!(resolved.weather.wind_speed, 8.0);
        assert!(!resolved.weather.frost_warning);
        assert_eq!(resolved.region, RegionCode::GanjaGazakh);
        assert_eq!(resolved.location_display(), "Ganja, Azerbaijan");
    }

    #[tokio::test]
    async fn location_failure_skips_weather_stage() {
        let (resolver, calls) = direct(Err("rate limited".into()), Ok(conditions(20.0)));

        let outcome = resolver.resolve().await;
        assert!(matches!(outcome, Resolution::Degraded(ref r) if r.contains("rate limited")));
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn weather_failure_after_location_degrades() {
        let (resolver, calls) = direct(Ok(ganja()), Err("503".into()));

        assert!(matches!(resolver.resolve().await, Resolution::Degraded(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn frost_uses_raw_temperature() {
        // -0.4 rounds to -0 but is still below freezing
        let (resolver, _) = direct(Ok(ganja()), Ok(conditions(-0.4)));
        let Resolution::Resolved(resolved) = resolver.resolve().await else {
            panic!("expected resolution");
        };
        assert!(resolved.weather.frost_warning);
    }

    #[tokio::test(start_paused = true)]
    async fn stalled_source_times_out() {
        let resolver = LocationWeatherResolver::new(StalledSource, Duration::from_secs(10));
        let outcome = resolver.resolve().await;
        assert!(matches!(outcome, Resolution::Degraded(ref r) if r.contains("10 seconds")));
    }

    #[tokio::test]
    async fn upstream_region_preferred_over_local_inference() {
        let auto = AutoWeather {
            temperature: 12.0,
            humidity: 70.0,
            rainfall_last_24h: 0.0,
            wind_speed: 5.0,
            frost_warning: None,
            location: ganja(),
            region: Some(RegionCode::Mountainous),
            fallback: false,
        };
        let resolver = LocationWeatherResolver::new(CannedSource(auto), Duration::from_secs(10));
        let Resolution::Resolved(resolved) = resolver.resolve().await else {
            panic!("expected resolution");
        };
        assert_eq!(resolved.region, RegionCode::Mountainous);
    }

    #[tokio::test]
    async fn missing_upstream_frost_is_derived() {
        let auto = AutoWeather {
            temperature: -3.0,
            humidity: 90.0,
            rainfall_last_24h: 0.0,
            wind_speed: 2.0,
            frost_warning: None,
            location: LocationData {
                city: "Bakı".into(),
                country: "Azerbaijan".into(),
                region: None,
                ..ganja()
            },
            region: None,
            fallback: true,
        };
        let resolver = LocationWeatherResolver::new(CannedSource(auto), Duration::from_secs(10));
        let Resolution::Resolved(resolved) = resolver.resolve().await else {
            panic!("expected resolution");
        };
        assert!(resolved.weather.frost_warning);
        assert_eq!(resolved.region, RegionCode::Aran);
        assert!(resolved.location_display().contains("VPN/proxy"));
    }

    #[tokio::test]
    async fn out_of_range_readings_are_clamped() {
        let (resolver, _) = direct(Ok(ganja()), Ok(conditions(57.0)));
        let Resolution::Resolved(resolved) = resolver.resolve().await else {
            panic!("expected resolution");
        };
        assert_eq!(resolved.weather.temperature, 50.0);
    }
}
