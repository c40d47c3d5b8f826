use super::request_builder;
use super::weather_resolver::{Resolution, ResolvedWeather};
use crate::config::Config;
use crate::error::{Result, YoncaError};
use crate::models::{
    AnimalType, CropType, FarmType, GrowingType, LivestockContext, RecommendationRequest,
    RecommendationResponse, RegionCode, SoilData, WeatherMode, WeatherSnapshot,
};

pub const RESOLUTION_FAILED_NOTICE: &str =
    "Avtomatik hava məlumatı alına bilmədi. Zəhmət olmasa əl ilə daxil edin.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardStep {
    FarmType,
    Weather,
    Details,
    Results,
}

impl WizardStep {
    pub fn all() -> &'static [WizardStep] {
        &[
            WizardStep::FarmType,
            WizardStep::Weather,
            WizardStep::Details,
            WizardStep::Results,
        ]
    }

    pub fn number(&self) -> usize {
        match self {
            WizardStep::FarmType => 1,
            WizardStep::Weather => 2,
            WizardStep::Details => 3,
            WizardStep::Results => 4,
        }
    }

    pub fn title_az(&self) -> &'static str {
        match self {
            WizardStep::FarmType => "Təsərrüfat",
            WizardStep::Weather => "Hava",
            WizardStep::Details => "Təfərrüatlar",
            WizardStep::Results => "Tövsiyələr",
        }
    }
}

/// Crop inputs as they are being filled in; promoted to a `CropContext` on submit.
#[derive(Debug, Clone, PartialEq)]
pub struct CropDraft {
    pub crop_type: Option<CropType>,
    pub stage: Option<String>,
    pub days_since_irrigation: u32,
    pub days_since_fertilization: u32,
    pub growing_type: GrowingType,
}

impl Default for CropDraft {
    fn default() -> Self {
        Self {
            crop_type: None,
            stage: None,
            days_since_irrigation: 0,
            days_since_fertilization: 0,
            growing_type: GrowingType::OpenField,
        }
    }
}

/// Identifies one outbound request. A completion is applied only if its
/// ticket is still the one the current snapshot is waiting on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket {
    pub epoch: u64,
    pub seq: u64,
}

/// Work the caller must perform on the controller's behalf.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    ResolveWeather(Ticket),
    Submit(Ticket, RecommendationRequest),
}

/// Starting values for a fresh session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionDefaults {
    pub region: RegionCode,
    pub weather: WeatherSnapshot,
    pub soil: SoilData,
    pub weather_mode: WeatherMode,
}

impl Default for SessionDefaults {
    fn default() -> Self {
        Self {
            region: RegionCode::default(),
            weather: WeatherSnapshot::default(),
            soil: SoilData::default(),
            weather_mode: WeatherMode::Auto,
        }
    }
}

impl SessionDefaults {
    pub fn from_config(config: &Config) -> Self {
        Self {
            region: config.defaults.region,
            weather: config.defaults.weather(),
            soil: config.defaults.soil(),
            weather_mode: if config.weather.auto_resolve {
                WeatherMode::Auto
            } else {
                WeatherMode::Manual
            },
        }
    }
}

/// One immutable snapshot of the intake session.
#[derive(Debug, Clone, PartialEq)]
pub struct WizardState {
    pub step: WizardStep,
    pub farm_type: Option<FarmType>,
    pub region: RegionCode,
    pub weather: WeatherSnapshot,
    pub weather_mode: WeatherMode,
    pub soil: SoilData,
    pub crop: CropDraft,
    pub livestock: LivestockContext,
    pub resolved: Option<ResolvedWeather>,
    pub result: Option<RecommendationResponse>,
    pub resolving: Option<Ticket>,
    pub submitting: Option<Ticket>,
    /// Dismissible notice after auto-resolution fell back to manual entry.
    pub notice: Option<String>,
    /// Inline validation message on the details step.
    pub validation_error: Option<String>,
    /// Page-level banner after a failed submission.
    pub error: Option<String>,
    /// Set once the session has moved past the weather step.
    pub details_entered: bool,
    /// Set once an automatic resolution has settled (either way).
    pub auto_settled: bool,
}

impl WizardState {
    pub fn new(defaults: &SessionDefaults) -> Self {
        Self {
            step: WizardStep::FarmType,
            farm_type: None,
            region: defaults.region,
            weather: defaults.weather.clone().normalized(),
            weather_mode: defaults.weather_mode,
            soil: defaults.soil.clone(),
            crop: CropDraft::default(),
            livestock: LivestockContext::default(),
            resolved: None,
            result: None,
            resolving: None,
            submitting: None,
            notice: None,
            validation_error: None,
            error: None,
            details_entered: false,
            auto_settled: false,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.resolving.is_some() || self.submitting.is_some()
    }

    pub fn location_display(&self) -> Option<String> {
        self.resolved.as_ref().map(ResolvedWeather::location_display)
    }
}

/// Four-step intake state machine. Every operation replaces the current
/// snapshot with a new one; network work is handed back as an `Effect`.
///
/// The snapshot's `resolving`/`submitting` name the request it is waiting
/// on. The controller separately tracks which request is still running, so
/// a request abandoned by back-out or reset keeps counting against the
/// one-in-flight limit until its completion is applied.
pub struct WizardController {
    defaults: SessionDefaults,
    state: WizardState,
    epoch: u64,
    seq: u64,
    running_resolution: Option<Ticket>,
    running_submission: Option<Ticket>,
}

impl WizardController {
    pub fn new(defaults: SessionDefaults) -> Self {
        let state = WizardState::new(&defaults);
        Self {
            defaults,
            state,
            epoch: 0,
            seq: 0,
            running_resolution: None,
            running_submission: None,
        }
    }

    pub fn state(&self) -> &WizardState {
        &self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    fn transition(&mut self, f: impl FnOnce(&mut WizardState)) {
        let mut next = self.state.clone();
        f(&mut next);
        self.state = next;
    }

    fn issue_ticket(&mut self) -> Ticket {
        self.seq += 1;
        Ticket {
            epoch: self.epoch,
            seq: self.seq,
        }
    }

    /// Wait on a weather lookup. A lookup that is still running from an
    /// earlier back-out is re-attached instead of issuing another.
    fn start_resolution(&mut self) -> Effect {
        let (ticket, effect) = match self.running_resolution {
            Some(ticket) => {
                tracing::debug!(seq = ticket.seq, "Re-attaching to running weather resolution");
                (ticket, Effect::None)
            }
            None => {
                let ticket = self.issue_ticket();
                tracing::debug!(seq = ticket.seq, "Starting weather resolution");
                self.running_resolution = Some(ticket);
                (ticket, Effect::ResolveWeather(ticket))
            }
        };
        self.transition(|s| {
            s.resolving = Some(ticket);
            s.weather_mode = WeatherMode::Auto;
            s.notice = None;
        });
        effect
    }

    fn ensure_weather_editable(&self) -> Result<()> {
        if self.state.resolving.is_some() {
            return Err(YoncaError::InvalidTransition(
                "weather is being resolved; wait for it to finish".into(),
            ));
        }
        Ok(())
    }

    fn should_auto_resolve(&self) -> bool {
        let s = &self.state;
        s.weather_mode == WeatherMode::Auto
            && s.resolved.is_none()
            && s.resolving.is_none()
            && !s.auto_settled
    }

    pub fn select_farm_type(&mut self, farm_type: FarmType) -> Result<()> {
        if self.state.step != WizardStep::FarmType {
            return Err(YoncaError::InvalidTransition(
                "farm type can only be chosen on the first step".into(),
            ));
        }
        if self.state.details_entered && self.state.farm_type != Some(farm_type) {
            return Err(YoncaError::InvalidTransition(
                "farm type is fixed once details are entered; restart to change it".into(),
            ));
        }
        if self.state.farm_type == Some(farm_type) {
            return Ok(());
        }

        self.transition(|s| {
            s.farm_type = Some(farm_type);
            s.crop = CropDraft::default();
            s.validation_error = None;
        });
        Ok(())
    }

    /// Advance one step if the current step's guard passes.
    pub fn next(&mut self) -> Result<Effect> {
        match self.state.step {
            WizardStep::FarmType => {
                if self.state.farm_type.is_none() {
                    return Err(YoncaError::IncompleteContext(
                        "Təsərrüfat növünü seçin".into(),
                    ));
                }
                self.transition(|s| s.step = WizardStep::Weather);
                if self.should_auto_resolve() {
                    return Ok(self.start_resolution());
                }
                Ok(Effect::None)
            }
            WizardStep::Weather => {
                if self.state.resolving.is_some() {
                    return Err(YoncaError::InvalidTransition(
                        "weather resolution still in progress".into(),
                    ));
                }
                self.transition(|s| {
                    s.step = WizardStep::Details;
                    s.details_entered = true;
                });
                Ok(Effect::None)
            }
            WizardStep::Details => {
                if self.state.submitting.is_some() {
                    return Err(YoncaError::InvalidTransition(
                        "submission already in progress".into(),
                    ));
                }
                if self.running_submission.is_some() {
                    return Err(YoncaError::InvalidTransition(
                        "previous submission has not finished yet".into(),
                    ));
                }
                match request_builder::build(&self.state) {
                    Ok(request) => {
                        let ticket = self.issue_ticket();
                        self.running_submission = Some(ticket);
                        self.transition(|s| {
                            s.submitting = Some(ticket);
                            s.validation_error = None;
                            s.error = None;
                        });
                        Ok(Effect::Submit(ticket, request))
                    }
                    Err(e) => {
                        let message = match &e {
                            YoncaError::IncompleteContext(m) => m.clone(),
                            other => other.to_string(),
                        };
                        self.transition(|s| s.validation_error = Some(message));
                        Err(e)
                    }
                }
            }
            WizardStep::Results => Err(YoncaError::InvalidTransition(
                "already on the last step".into(),
            )),
        }
    }

    /// Go back one step. Entered data is kept; the result of in-flight work
    /// for the step being left will be discarded.
    pub fn back(&mut self) -> Result<()> {
        let previous = match self.state.step {
            WizardStep::FarmType => {
                return Err(YoncaError::InvalidTransition(
                    "already on the first step".into(),
                ))
            }
            WizardStep::Weather => WizardStep::FarmType,
            WizardStep::Details => WizardStep::Weather,
            WizardStep::Results => WizardStep::Details,
        };

        if self.state.resolving.is_some() {
            tracing::debug!("Abandoning weather resolution on back-out");
        }
        self.transition(|s| {
            s.step = previous;
            s.resolving = None;
            s.submitting = None;
            s.validation_error = None;
        });
        Ok(())
    }

    /// Discard the whole session. Outstanding completions become stale.
    pub fn reset(&mut self) {
        self.epoch += 1;
        self.state = WizardState::new(&self.defaults);
    }

    /// Re-run auto resolution. A no-op while one is already in flight.
    pub fn refresh_weather(&mut self) -> Effect {
        if self.state.step != WizardStep::Weather || self.state.resolving.is_some() {
            return Effect::None;
        }
        self.start_resolution()
    }

    pub fn toggle_weather_mode(&mut self) -> Effect {
        if self.state.step != WizardStep::Weather || self.state.resolving.is_some() {
            return Effect::None;
        }
        match self.state.weather_mode {
            WeatherMode::Auto => {
                self.transition(|s| s.weather_mode = WeatherMode::Manual);
                Effect::None
            }
            WeatherMode::Manual if self.state.resolved.is_none() => self.start_resolution(),
            WeatherMode::Manual => {
                self.transition(|s| s.weather_mode = WeatherMode::Auto);
                Effect::None
            }
        }
    }

    /// Adopt a resolution result. Returns false when the ticket is stale.
    pub fn apply_resolution(&mut self, ticket: Ticket, resolution: Resolution) -> bool {
        if self.running_resolution == Some(ticket) {
            self.running_resolution = None;
        }
        if self.state.resolving != Some(ticket) {
            tracing::debug!(seq = ticket.seq, "Discarding stale weather resolution");
            return false;
        }

        self.transition(|s| {
            s.resolving = None;
            s.auto_settled = true;
            match resolution {
                Resolution::Resolved(resolved) => {
                    s.weather = resolved.weather.clone();
                    s.region = resolved.region;
                    s.resolved = Some(resolved);
                    s.notice = None;
                }
                Resolution::Degraded(reason) => {
                    tracing::info!("Falling back to manual weather entry: {}", reason);
                    s.weather_mode = WeatherMode::Manual;
                    s.notice = Some(RESOLUTION_FAILED_NOTICE.to_string());
                }
            }
        });
        true
    }

    /// Adopt a submission outcome. Returns false when the ticket is stale.
    pub fn apply_submission(
        &mut self,
        ticket: Ticket,
        outcome: Result<RecommendationResponse>,
    ) -> bool {
        if self.running_submission == Some(ticket) {
            self.running_submission = None;
        }
        if self.state.submitting != Some(ticket) {
            tracing::debug!(seq = ticket.seq, "Discarding stale submission result");
            return false;
        }

        self.transition(|s| {
            s.submitting = None;
            match outcome {
                Ok(response) => {
                    s.result = Some(response);
                    s.step = WizardStep::Results;
                    s.error = None;
                }
                Err(e) => {
                    tracing::warn!("Recommendation request failed: {}", e);
                    s.error = Some(e.to_string());
                }
            }
        });
        true
    }

    /// Rejected while a resolution is pending, since it would overwrite the region.
    pub fn set_region(&mut self, region: RegionCode) -> Result<()> {
        self.ensure_weather_editable()?;
        self.transition(|s| s.region = region);
        Ok(())
    }

    /// Edit weather fields. Typing values by hand makes this a manual
    /// session. Rejected while a resolution is pending.
    pub fn edit_weather(&mut self, f: impl FnOnce(&mut WeatherSnapshot)) -> Result<()> {
        self.ensure_weather_editable()?;
        self.transition(|s| {
            let mut weather = s.weather.clone();
            f(&mut weather);
            s.weather = weather.normalized();
            s.weather_mode = WeatherMode::Manual;
        });
        Ok(())
    }

    pub fn set_soil_moisture(&mut self, moisture: f64) {
        self.transition(|s| s.soil.soil_moisture = moisture.clamp(0.0, 100.0));
    }

    pub fn dismiss_notice(&mut self) {
        self.transition(|s| {
            s.notice = None;
            s.error = None;
        });
    }

    /// Choose a crop. Changing the crop clears the stage.
    pub fn set_crop_type(&mut self, crop_type: CropType) -> Result<()> {
        let allowed = self
            .state
            .farm_type
            .map(|ft| ft.crop_types().contains(&crop_type))
            .unwrap_or(false);
        if !allowed {
            return Err(YoncaError::InvalidData(format!(
                "{} is not grown on this farm type",
                crop_type.as_str()
            )));
        }

        self.transition(|s| {
            if s.crop.crop_type != Some(crop_type) {
                s.crop.stage = None;
            }
            s.crop.crop_type = Some(crop_type);
            s.validation_error = None;
        });
        Ok(())
    }

    pub fn set_stage(&mut self, stage: &str) -> Result<()> {
        let crop_type = self.state.crop.crop_type.ok_or_else(|| {
            YoncaError::InvalidData("choose a crop before its stage".into())
        })?;
        if !crop_type.has_stage(stage) {
            return Err(YoncaError::InvalidData(format!(
                "{} has no stage '{}'",
                crop_type.as_str(),
                stage
            )));
        }

        let stage = stage.to_string();
        self.transition(|s| {
            s.crop.stage = Some(stage);
            s.validation_error = None;
        });
        Ok(())
    }

    /// Edit irrigation/fertilization counters and growing type.
    pub fn edit_crop(&mut self, f: impl FnOnce(&mut u32, &mut u32, &mut GrowingType)) {
        self.transition(|s| {
            let crop = &mut s.crop;
            f(
                &mut crop.days_since_irrigation,
                &mut crop.days_since_fertilization,
                &mut crop.growing_type,
            );
        });
    }

    pub fn set_animal_type(&mut self, animal_type: AnimalType) {
        self.transition(|s| s.livestock.animal_type = animal_type);
    }

    pub fn edit_livestock(&mut self, f: impl FnOnce(&mut LivestockContext)) {
        self.transition(|s| {
            let mut livestock = s.livestock.clone();
            f(&mut livestock);
            livestock.barn_hygiene_score = livestock.barn_hygiene_score.clamp(1, 10);
            s.livestock = livestock;
            s.validation_error = None;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::LocationData;

    fn controller() -> WizardController {
        WizardController::new(SessionDefaults::default())
    }

    fn resolved_ganja() -> ResolvedWeather {
        ResolvedWeather {
            weather: WeatherSnapshot {
                temperature: 18.0,
                humidity: 40.0,
                ..WeatherSnapshot::default()
            },
            region: RegionCode::GanjaGazakh,
            location: LocationData {
                latitude: 40.68,
                longitude: 46.36,
                city: "Ganja".into(),
                country: "Azerbaijan".into(),
                region: None,
            },
            fallback: false,
        }
    }

    fn empty_response() -> RecommendationResponse {
        serde_json::from_str(r#"{"farm_type":"wheat","region":"aran"}"#).unwrap()
    }

    fn ticket_of(effect: Effect) -> Ticket {
        match effect {
            Effect::ResolveWeather(t) | Effect::Submit(t, _) => t,
            Effect::None => panic!("expected an effect"),
        }
    }

    /// Wheat farm at the details step, auto resolution settled.
    fn wheat_on_details() -> WizardController {
        let mut c = controller();
        c.select_farm_type(FarmType::Wheat).unwrap();
        let t = ticket_of(c.next().unwrap());
        c.apply_resolution(t, Resolution::Resolved(resolved_ganja()));
        c.next().unwrap();
        c
    }

    #[test]
    fn farm_type_required_to_leave_first_step() {
        let mut c = controller();
        assert!(matches!(c.next(), Err(YoncaError::IncompleteContext(_))));
        assert_eq!(c.state().step, WizardStep::FarmType);
    }

    #[test]
    fn entering_weather_triggers_resolution_once() {
        let mut c = controller();
        c.select_farm_type(FarmType::Mixed).unwrap();
        let effect = c.next().unwrap();
        assert!(matches!(effect, Effect::ResolveWeather(_)));
        assert!(c.state().resolving.is_some());

        c.apply_resolution(ticket_of(effect), Resolution::Resolved(resolved_ganja()));
        c.back().unwrap();
        assert_eq!(c.next().unwrap(), Effect::None);
    }

    #[test]
    fn manual_mode_skips_resolution() {
        let mut c = WizardController::new(SessionDefaults {
            weather_mode: WeatherMode::Manual,
            ..SessionDefaults::default()
        });
        c.select_farm_type(FarmType::Orchard).unwrap();
        assert_eq!(c.next().unwrap(), Effect::None);
    }

    #[test]
    fn forward_blocked_while_resolving() {
        let mut c = controller();
        c.select_farm_type(FarmType::Mixed).unwrap();
        let t = ticket_of(c.next().unwrap());
        assert!(matches!(c.next(), Err(YoncaError::InvalidTransition(_))));
        assert_eq!(c.state().step, WizardStep::Weather);

        c.apply_resolution(t, Resolution::Degraded("offline".into()));
        assert!(c.next().is_ok());
        assert_eq!(c.state().step, WizardStep::Details);
    }

    #[test]
    fn refresh_is_a_noop_while_in_flight() {
        let mut c = controller();
        c.select_farm_type(FarmType::Mixed).unwrap();
        let first = c.next().unwrap();
        assert!(matches!(first, Effect::ResolveWeather(_)));
        assert_eq!(c.refresh_weather(), Effect::None);
        assert_eq!(c.refresh_weather(), Effect::None);
        assert_eq!(c.state().resolving, Some(ticket_of(first)));
    }

    #[test]
    fn refresh_after_settling_issues_new_ticket() {
        let mut c = controller();
        c.select_farm_type(FarmType::Mixed).unwrap();
        let first = ticket_of(c.next().unwrap());
        c.apply_resolution(first, Resolution::Degraded("offline".into()));
        let second = ticket_of(c.refresh_weather());
        assert_ne!(first, second);
        assert_eq!(c.state().weather_mode, WeatherMode::Auto);
    }

    #[test]
    fn degraded_resolution_keeps_prior_weather_and_disables_auto() {
        let mut c = controller();
        c.select_farm_type(FarmType::Wheat).unwrap();
        let before = c.state().weather.clone();
        let region_before = c.state().region;
        let t = ticket_of(c.next().unwrap());

        assert!(c.apply_resolution(t, Resolution::Degraded("weather provider 503".into())));

        let s = c.state();
        assert_eq!(s.weather, before);
        assert_eq!(s.region, region_before);
        assert_eq!(s.weather_mode, WeatherMode::Manual);
        assert!(s.resolved.is_none());
        assert_eq!(s.notice.as_deref(), Some(RESOLUTION_FAILED_NOTICE));
    }

    #[test]
    fn resolution_adopts_weather_region_and_location() {
        let mut c = controller();
        c.select_farm_type(FarmType::Wheat).unwrap();
        let t = ticket_of(c.next().unwrap());
        c.apply_resolution(t, Resolution::Resolved(resolved_ganja()));

        let s = c.state();
        assert_eq!(s.weather.temperature, 18.0);
        assert_eq!(s.region, RegionCode::GanjaGazakh);
        assert_eq!(s.location_display().as_deref(), Some("Ganja, Azerbaijan"));
        assert_eq!(s.weather_mode, WeatherMode::Auto);
    }

    #[test]
    fn stale_resolution_after_back_out_is_discarded() {
        let mut c = controller();
        c.select_farm_type(FarmType::Mixed).unwrap();
        let t = ticket_of(c.next().unwrap());
        c.back().unwrap();

        assert!(!c.apply_resolution(t, Resolution::Resolved(resolved_ganja())));
        assert!(c.state().resolved.is_none());
        assert_eq!(c.state().region, RegionCode::Aran);
    }

    #[test]
    fn stale_submission_after_reset_is_discarded() {
        let mut c = wheat_on_details();
        c.set_crop_type(CropType::Wheat).unwrap();
        c.set_stage("tillering").unwrap();
        let t = ticket_of(c.next().unwrap());
        c.reset();

        assert!(!c.apply_submission(t, Ok(empty_response())));
        assert_eq!(c.state().step, WizardStep::FarmType);
        assert!(c.state().result.is_none());
        assert_eq!(c.epoch(), 1);
    }

    #[test]
    fn wheat_without_stage_is_rejected_inline() {
        let mut c = wheat_on_details();
        c.set_crop_type(CropType::Wheat).unwrap();
        c.edit_crop(|irrigation, fertilization, _| {
            *irrigation = 2;
            *fertilization = 10;
        });

        assert!(matches!(c.next(), Err(YoncaError::IncompleteContext(_))));
        assert_eq!(c.state().step, WizardStep::Details);
        assert!(c.state().validation_error.is_some());
        assert!(c.state().submitting.is_none());
    }

    #[test]
    fn successful_submission_reaches_results() {
        let mut c = wheat_on_details();
        c.set_crop_type(CropType::Wheat).unwrap();
        c.set_stage("tillering").unwrap();
        let effect = c.next().unwrap();
        let Effect::Submit(t, request) = effect else {
            panic!("expected submit");
        };
        assert!(request.crop_context.is_some());
        assert_eq!(c.state().step, WizardStep::Details);

        assert!(c.apply_submission(t, Ok(empty_response())));
        assert_eq!(c.state().step, WizardStep::Results);
        assert!(c.state().result.is_some());
    }

    #[test]
    fn transport_failure_stays_on_details_with_banner() {
        let mut c = wheat_on_details();
        c.set_crop_type(CropType::Barley).unwrap();
        c.set_stage("heading").unwrap();
        let t = ticket_of(c.next().unwrap());

        c.apply_submission(t, Err(YoncaError::Transport("503 Service Unavailable".into())));
        let s = c.state();
        assert_eq!(s.step, WizardStep::Details);
        assert!(s.error.as_deref().unwrap_or_default().contains("503"));
        assert!(s.submitting.is_none());

        // user may retry manually
        assert!(matches!(c.next().unwrap(), Effect::Submit(..)));
    }

    #[test]
    fn farm_type_locked_after_details_until_reset() {
        let mut c = wheat_on_details();
        c.back().unwrap();
        c.back().unwrap();
        assert!(c.select_farm_type(FarmType::Livestock).is_err());
        assert!(c.select_farm_type(FarmType::Wheat).is_ok());

        c.reset();
        assert!(c.select_farm_type(FarmType::Livestock).is_ok());
    }

    #[test]
    fn changing_crop_clears_stage() {
        let mut c = wheat_on_details();
        c.set_crop_type(CropType::Wheat).unwrap();
        c.set_stage("heading").unwrap();
        c.set_crop_type(CropType::Barley).unwrap();
        assert!(c.state().crop.stage.is_none());
    }

    #[test]
    fn crop_and_stage_must_match_farm() {
        let mut c = wheat_on_details();
        assert!(c.set_crop_type(CropType::Tomato).is_err());
        assert!(c.set_stage("tillering").is_err());
        c.set_crop_type(CropType::Wheat).unwrap();
        assert!(c.set_stage("veraison").is_err());
    }

    #[test]
    fn editing_weather_in_auto_mode_switches_to_manual() {
        let mut c = controller();
        c.select_farm_type(FarmType::Vegetable).unwrap();
        let t = ticket_of(c.next().unwrap());
        c.apply_resolution(t, Resolution::Resolved(resolved_ganja()));
        c.edit_weather(|w| w.temperature = 80.0).unwrap();

        let s = c.state();
        assert_eq!(s.weather_mode, WeatherMode::Manual);
        assert_eq!(s.weather.temperature, 50.0);
    }

    #[test]
    fn weather_and_region_locked_while_resolving() {
        let mut c = controller();
        c.select_farm_type(FarmType::Vegetable).unwrap();
        let first = ticket_of(c.next().unwrap());

        assert!(matches!(
            c.edit_weather(|w| w.temperature = 5.0),
            Err(YoncaError::InvalidTransition(_))
        ));
        assert!(c.set_region(RegionCode::Lankaran).is_err());
        assert_eq!(c.refresh_weather(), Effect::None);
        assert_eq!(c.state().resolving, Some(first));

        assert!(c.apply_resolution(first, Resolution::Resolved(resolved_ganja())));
        assert_eq!(c.state().region, RegionCode::GanjaGazakh);
        assert!(c.set_region(RegionCode::Lankaran).is_ok());
    }

    #[test]
    fn re_entering_weather_reattaches_running_lookup() {
        let mut c = controller();
        c.select_farm_type(FarmType::Mixed).unwrap();
        let first = ticket_of(c.next().unwrap());
        c.back().unwrap();

        assert_eq!(c.next().unwrap(), Effect::None);
        assert_eq!(c.state().resolving, Some(first));
        assert!(c.apply_resolution(first, Resolution::Resolved(resolved_ganja())));
        assert_eq!(c.state().region, RegionCode::GanjaGazakh);
    }

    #[test]
    fn lookup_discarded_while_backed_out_frees_the_slot() {
        let mut c = controller();
        c.select_farm_type(FarmType::Mixed).unwrap();
        let first = ticket_of(c.next().unwrap());
        c.back().unwrap();
        assert!(!c.apply_resolution(first, Resolution::Resolved(resolved_ganja())));

        let second = ticket_of(c.next().unwrap());
        assert_ne!(first, second);
    }

    #[test]
    fn no_resubmit_until_abandoned_submission_settles() {
        let mut c = wheat_on_details();
        c.set_crop_type(CropType::Wheat).unwrap();
        c.set_stage("tillering").unwrap();
        let first = ticket_of(c.next().unwrap());

        c.back().unwrap();
        c.next().unwrap();
        assert!(matches!(c.next(), Err(YoncaError::InvalidTransition(_))));
        assert!(c.state().submitting.is_none());

        assert!(!c.apply_submission(first, Ok(empty_response())));
        assert_eq!(c.state().step, WizardStep::Details);
        let second = ticket_of(c.next().unwrap());
        assert_ne!(first, second);
    }

    #[test]
    fn reset_does_not_allow_a_parallel_submission() {
        let mut c = wheat_on_details();
        c.set_crop_type(CropType::Wheat).unwrap();
        c.set_stage("tillering").unwrap();
        let first = ticket_of(c.next().unwrap());
        c.reset();

        c.select_farm_type(FarmType::Mixed).unwrap();
        let lookup = ticket_of(c.next().unwrap());
        c.apply_resolution(lookup, Resolution::Degraded("offline".into()));
        c.next().unwrap();
        assert!(c.next().is_err());

        c.apply_submission(first, Err(YoncaError::Transport("late".into())));
        assert!(matches!(c.next().unwrap(), Effect::Submit(..)));
    }

    #[test]
    fn toggle_to_auto_without_location_resolves() {
        let mut c = WizardController::new(SessionDefaults {
            weather_mode: WeatherMode::Manual,
            ..SessionDefaults::default()
        });
        c.select_farm_type(FarmType::Mixed).unwrap();
        c.next().unwrap();
        assert!(matches!(c.toggle_weather_mode(), Effect::ResolveWeather(_)));
        assert_eq!(c.toggle_weather_mode(), Effect::None);
        assert_eq!(c.state().weather_mode, WeatherMode::Auto);
    }

    #[test]
    fn livestock_editor_clamps_hygiene() {
        let mut c = controller();
        c.set_animal_type(AnimalType::Sheep);
        c.edit_livestock(|l| l.barn_hygiene_score = 14);
        assert_eq!(c.state().livestock.barn_hygiene_score, 10);
        assert_eq!(c.state().livestock.animal_type, AnimalType::Sheep);
    }

    #[test]
    fn snapshots_are_replaced_not_mutated() {
        let mut c = controller();
        let before = c.state().clone();
        c.select_farm_type(FarmType::Wheat).unwrap();
        assert_eq!(before.farm_type, None);
        assert_eq!(c.state().farm_type, Some(FarmType::Wheat));
    }
}
