use crate::config::Config;
use crate::error::Result;
use crate::logic::weather_resolver::Resolution;
use crate::logic::wizard::{Effect, SessionDefaults, Ticket, WizardController, WizardState, WizardStep};
use crate::models::{
    AnimalType, FarmType, RecommendationResponse, VENTILATION_OPTIONS, WATER_OPTIONS,
};
use crate::ui::screens::{DetailsField, WeatherField};

/// Result of a spawned effect, fed back into the event loop.
#[derive(Debug)]
pub enum Completion {
    Weather(Ticket, Resolution),
    Recommendation(Ticket, Result<RecommendationResponse>),
}

pub struct FarmTypeState {
    pub selected_index: usize,
}

impl FarmTypeState {
    pub fn new() -> Self {
        Self { selected_index: 0 }
    }

    pub fn next(&mut self) {
        if self.selected_index < FarmType::all().len() - 1 {
            self.selected_index += 1;
        }
    }

    pub fn prev(&mut self) {
        if self.selected_index > 0 {
            self.selected_index -= 1;
        }
    }

    pub fn selected(&self) -> FarmType {
        FarmType::all()[self.selected_index.min(FarmType::all().len() - 1)]
    }
}

pub struct FormState<F> {
    pub focused_field: F,
    pub editing: bool,
    pub edit_buffer: String,
}

impl<F: Copy + PartialEq> FormState<F> {
    pub fn new(first: F) -> Self {
        Self {
            focused_field: first,
            editing: false,
            edit_buffer: String::new(),
        }
    }

    pub fn next_field(&mut self, fields: &[F]) {
        self.focused_field = step_in(fields, self.focused_field, true);
    }

    pub fn prev_field(&mut self, fields: &[F]) {
        self.focused_field = step_in(fields, self.focused_field, false);
    }

    /// Keep focus on a field that exists for the current farm type.
    pub fn ensure_focus(&mut self, fields: &[F]) {
        if !fields.contains(&self.focused_field) {
            if let Some(first) = fields.first() {
                self.focused_field = *first;
            }
        }
    }

    pub fn start_editing(&mut self, current_value: &str) {
        self.editing = true;
        self.edit_buffer = current_value.to_string();
    }

    pub fn cancel_editing(&mut self) {
        self.editing = false;
        self.edit_buffer.clear();
    }

    pub fn finish_editing(&mut self) -> String {
        self.editing = false;
        std::mem::take(&mut self.edit_buffer)
    }
}

pub struct ResultsState {
    pub scroll: u16,
}

impl ResultsState {
    pub fn new() -> Self {
        Self { scroll: 0 }
    }
}

pub struct App {
    pub should_quit: bool,
    pub wizard: WizardController,

    // Screen states
    pub farm_state: FarmTypeState,
    pub weather_state: FormState<WeatherField>,
    pub details_state: FormState<DetailsField>,
    pub results_state: ResultsState,

    // UI state
    pub status_message: Option<String>,
    pending: Vec<Effect>,
}

impl App {
    pub fn new(config: &Config) -> Self {
        Self {
            should_quit: false,
            wizard: WizardController::new(SessionDefaults::from_config(config)),
            farm_state: FarmTypeState::new(),
            weather_state: FormState::new(WeatherField::Mode),
            details_state: FormState::new(DetailsField::CropType),
            results_state: ResultsState::new(),
            status_message: None,
            pending: Vec::new(),
        }
    }

    pub fn state(&self) -> &WizardState {
        self.wizard.state()
    }

    pub fn is_editing(&self) -> bool {
        match self.state().step {
            WizardStep::Weather => self.weather_state.editing,
            WizardStep::Details => self.details_state.editing,
            _ => false,
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn set_status(&mut self, message: &str) {
        self.status_message = Some(message.to_string());
    }

    pub fn clear_status(&mut self) {
        self.status_message = None;
    }

    fn dispatch(&mut self, effect: Effect) {
        match &effect {
            Effect::None => return,
            Effect::ResolveWeather(_) => self.set_status("Hava məlumatı alınır..."),
            Effect::Submit(..) => self.set_status("Tövsiyələr hazırlanır..."),
        }
        self.pending.push(effect);
    }

    /// Effects queued since the last call, for the event loop to spawn.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.pending)
    }

    pub fn complete(&mut self, completion: Completion) {
        match completion {
            Completion::Weather(ticket, resolution) => {
                if self.wizard.apply_resolution(ticket, resolution) {
                    match self.state().location_display() {
                        Some(location) => self.set_status(&format!("Məkan: {}", location)),
                        None => self.clear_status(),
                    }
                }
            }
            Completion::Recommendation(ticket, outcome) => {
                if self.wizard.apply_submission(ticket, outcome) {
                    self.results_state.scroll = 0;
                    self.clear_status();
                }
            }
        }
    }

    pub fn next_step(&mut self) {
        match self.wizard.next() {
            Ok(effect) => {
                self.clear_status();
                self.dispatch(effect);
            }
            Err(e) => self.set_status(&e.to_string()),
        }
        self.sync_focus();
    }

    pub fn back_step(&mut self) {
        if self.wizard.back().is_ok() {
            self.clear_status();
        }
        self.sync_focus();
    }

    pub fn reset(&mut self) {
        self.wizard.reset();
        tracing::debug!(epoch = self.wizard.epoch(), "Session reset");
        self.farm_state = FarmTypeState::new();
        self.weather_state = FormState::new(WeatherField::Mode);
        self.details_state = FormState::new(DetailsField::CropType);
        self.results_state = ResultsState::new();
        self.set_status("Yeni analiz");
    }

    pub fn choose_farm_type(&mut self) {
        let farm_type = self.farm_state.selected();
        match self.wizard.select_farm_type(farm_type) {
            Ok(()) => self.next_step(),
            Err(e) => self.set_status(&e.to_string()),
        }
    }

    pub fn refresh_weather(&mut self) {
        let effect = self.wizard.refresh_weather();
        self.dispatch(effect);
    }

    pub fn toggle_weather_mode(&mut self) {
        let effect = self.wizard.toggle_weather_mode();
        self.dispatch(effect);
    }

    pub fn dismiss_notice(&mut self) {
        self.wizard.dismiss_notice();
    }

    fn sync_focus(&mut self) {
        let farm_type = self.state().farm_type;
        self.weather_state
            .ensure_focus(WeatherField::for_farm(farm_type));
        self.details_state
            .ensure_focus(DetailsField::for_farm(farm_type));
    }

    pub fn weather_fields(&self) -> &'static [WeatherField] {
        WeatherField::for_farm(self.state().farm_type)
    }

    pub fn details_fields(&self) -> &'static [DetailsField] {
        DetailsField::for_farm(self.state().farm_type)
    }

    /// Left/right on the focused weather field.
    pub fn adjust_weather(&mut self, forward: bool) {
        let sign = if forward { 1.0 } else { -1.0 };
        let result = match self.weather_state.focused_field {
            WeatherField::Mode => {
                self.toggle_weather_mode();
                Ok(())
            }
            WeatherField::Region => {
                let region = self.state().region;
                let region = if forward { region.next() } else { region.prev() };
                self.wizard.set_region(region)
            }
            WeatherField::Temperature => self.wizard.edit_weather(|w| w.temperature += sign),
            WeatherField::Humidity => self.wizard.edit_weather(|w| w.humidity += 5.0 * sign),
            WeatherField::Rainfall24h => {
                self.wizard.edit_weather(|w| w.rainfall_last_24h += sign)
            }
            WeatherField::Rainfall7d => {
                self.wizard.edit_weather(|w| w.rainfall_last_7days += sign)
            }
            WeatherField::Forecast48h => self
                .wizard
                .edit_weather(|w| w.rainfall_forecast_48h = !w.rainfall_forecast_48h),
            WeatherField::ForecastAmount => self
                .wizard
                .edit_weather(|w| w.rainfall_forecast_amount_mm += sign),
            WeatherField::WindSpeed => self.wizard.edit_weather(|w| w.wind_speed += sign),
            WeatherField::Frost => self
                .wizard
                .edit_weather(|w| w.frost_warning = !w.frost_warning),
            WeatherField::SoilMoisture => {
                let moisture = self.state().soil.soil_moisture + 5.0 * sign;
                self.wizard.set_soil_moisture(moisture);
                Ok(())
            }
        };

        if let Err(e) = result {
            self.set_status(&e.to_string());
        }
    }

    /// Enter on a weather field: numeric fields open the editor, the rest toggle.
    pub fn activate_weather_field(&mut self) {
        let field = self.weather_state.focused_field;
        match weather_value(self.state(), field) {
            Some(_) if self.state().resolving.is_some() && field != WeatherField::SoilMoisture => {
                self.set_status("Hava məlumatı yüklənir, gözləyin");
            }
            Some(value) => self.weather_state.start_editing(&value),
            None => self.adjust_weather(true),
        }
    }

    pub fn commit_weather_edit(&mut self) {
        let field = self.weather_state.focused_field;
        let text = self.weather_state.finish_editing();
        let value = match parse_number(&text) {
            Some(v) => v,
            None => {
                self.set_status(&format!("Yanlış rəqəm: '{}'", text));
                return;
            }
        };

        let result = match field {
            WeatherField::Temperature => self.wizard.edit_weather(|w| w.temperature = value),
            WeatherField::Humidity => self.wizard.edit_weather(|w| w.humidity = value),
            WeatherField::Rainfall24h => self.wizard.edit_weather(|w| w.rainfall_last_24h = value),
            WeatherField::Rainfall7d => self.wizard.edit_weather(|w| w.rainfall_last_7days = value),
            WeatherField::ForecastAmount => self
                .wizard
                .edit_weather(|w| w.rainfall_forecast_amount_mm = value),
            WeatherField::WindSpeed => self.wizard.edit_weather(|w| w.wind_speed = value),
            WeatherField::SoilMoisture => {
                self.wizard.set_soil_moisture(value);
                Ok(())
            }
            _ => Ok(()),
        };

        if let Err(e) = result {
            self.set_status(&e.to_string());
        }
    }

    /// Left/right on the focused details field.
    pub fn adjust_details(&mut self, forward: bool) {
        let delta: i64 = if forward { 1 } else { -1 };
        let state = self.state();
        let result = match self.details_state.focused_field {
            DetailsField::CropType => {
                let options = state
                    .farm_type
                    .map(|ft| ft.crop_types())
                    .unwrap_or_default();
                match step_optional(options, state.crop.crop_type, forward) {
                    Some(crop) => self.wizard.set_crop_type(crop),
                    None => Ok(()),
                }
            }
            DetailsField::Stage => match state.crop.crop_type {
                Some(crop) => {
                    let stages = crop.stages();
                    let current = state
                        .crop
                        .stage
                        .as_deref()
                        .and_then(|s| stages.iter().copied().find(|stage| *stage == s));
                    match step_optional(stages, current, forward) {
                        Some(stage) => self.wizard.set_stage(stage),
                        None => Ok(()),
                    }
                }
                None => {
                    self.set_status("Əvvəlcə bitki növünü seçin");
                    Ok(())
                }
            },
            DetailsField::DaysSinceIrrigation => {
                self.wizard
                    .edit_crop(|irrigation, _, _| *irrigation = bump(*irrigation, delta));
                Ok(())
            }
            DetailsField::DaysSinceFertilization => {
                self.wizard
                    .edit_crop(|_, fertilization, _| *fertilization = bump(*fertilization, delta));
                Ok(())
            }
            DetailsField::GrowingType => {
                self.wizard.edit_crop(|_, _, growing| *growing = growing.toggle());
                Ok(())
            }
            DetailsField::AnimalType => {
                let animal = step_in(AnimalType::all(), state.livestock.animal_type, forward);
                self.wizard.set_animal_type(animal);
                Ok(())
            }
            DetailsField::Count => {
                self.wizard.edit_livestock(|l| l.count = bump(l.count, delta));
                Ok(())
            }
            DetailsField::Hygiene => {
                self.wizard.edit_livestock(|l| {
                    l.barn_hygiene_score = bump(l.barn_hygiene_score as u32, delta) as u8
                });
                Ok(())
            }
            DetailsField::DaysSinceVetCheck => {
                self.wizard
                    .edit_livestock(|l| l.days_since_vet_check = bump(l.days_since_vet_check, delta));
                Ok(())
            }
            DetailsField::Vaccination => {
                self.wizard
                    .edit_livestock(|l| l.vaccination_status = l.vaccination_status.next());
                Ok(())
            }
            DetailsField::DaysSinceDeworming => {
                self.wizard.edit_livestock(|l| {
                    l.days_since_deworming = bump(l.days_since_deworming, delta)
                });
                Ok(())
            }
            DetailsField::Ventilation => {
                let current = state.livestock.ventilation_quality.as_str();
                let next = step_in(VENTILATION_OPTIONS, current, forward).to_string();
                self.wizard.edit_livestock(|l| l.ventilation_quality = next);
                Ok(())
            }
            DetailsField::Water => {
                let current = state.livestock.water_availability.as_str();
                let next = step_in(WATER_OPTIONS, current, forward).to_string();
                self.wizard.edit_livestock(|l| l.water_availability = next);
                Ok(())
            }
        };

        if let Err(e) = result {
            self.set_status(&e.to_string());
        }
    }

    pub fn activate_details_field(&mut self) {
        let field = self.details_state.focused_field;
        match details_value(self.state(), field) {
            Some(value) => self.details_state.start_editing(&value),
            None => self.adjust_details(true),
        }
    }

    pub fn commit_details_edit(&mut self) {
        let field = self.details_state.focused_field;
        let text = self.details_state.finish_editing();
        let value: u32 = match text.trim().parse() {
            Ok(v) => v,
            Err(_) => {
                self.set_status(&format!("Yanlış rəqəm: '{}'", text));
                return;
            }
        };

        match field {
            DetailsField::DaysSinceIrrigation => {
                self.wizard.edit_crop(|irrigation, _, _| *irrigation = value)
            }
            DetailsField::DaysSinceFertilization => {
                self.wizard.edit_crop(|_, fertilization, _| *fertilization = value)
            }
            DetailsField::Count => self.wizard.edit_livestock(|l| l.count = value),
            DetailsField::Hygiene => self
                .wizard
                .edit_livestock(|l| l.barn_hygiene_score = value.min(10) as u8),
            DetailsField::DaysSinceVetCheck => {
                self.wizard.edit_livestock(|l| l.days_since_vet_check = value)
            }
            DetailsField::DaysSinceDeworming => {
                self.wizard.edit_livestock(|l| l.days_since_deworming = value)
            }
            _ => {}
        }
    }

    pub fn scroll_results(&mut self, down: bool) {
        let scroll = &mut self.results_state.scroll;
        *scroll = if down {
            scroll.saturating_add(1)
        } else {
            scroll.saturating_sub(1)
        };
    }
}

/// Editable text for numeric weather fields; `None` for toggles and selects.
fn weather_value(state: &WizardState, field: WeatherField) -> Option<String> {
    let w = &state.weather;
    let value = match field {
        WeatherField::Temperature => w.temperature,
        WeatherField::Humidity => w.humidity,
        WeatherField::Rainfall24h => w.rainfall_last_24h,
        WeatherField::Rainfall7d => w.rainfall_last_7days,
        WeatherField::ForecastAmount => w.rainfall_forecast_amount_mm,
        WeatherField::WindSpeed => w.wind_speed,
        WeatherField::SoilMoisture => state.soil.soil_moisture,
        WeatherField::Mode | WeatherField::Region | WeatherField::Forecast48h | WeatherField::Frost => {
            return None
        }
    };
    Some(format!("{}", value))
}

fn details_value(state: &WizardState, field: DetailsField) -> Option<String> {
    let value = match field {
        DetailsField::DaysSinceIrrigation => state.crop.days_since_irrigation,
        DetailsField::DaysSinceFertilization => state.crop.days_since_fertilization,
        DetailsField::Count => state.livestock.count,
        DetailsField::Hygiene => state.livestock.barn_hygiene_score as u32,
        DetailsField::DaysSinceVetCheck => state.livestock.days_since_vet_check,
        DetailsField::DaysSinceDeworming => state.livestock.days_since_deworming,
        _ => return None,
    };
    Some(value.to_string())
}

fn parse_number(text: &str) -> Option<f64> {
    text.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

fn bump(value: u32, delta: i64) -> u32 {
    (value as i64 + delta).max(0) as u32
}

/// Neighbour of `current` in `options`, wrapping at both ends.
fn step_in<T: Copy + PartialEq>(options: &[T], current: T, forward: bool) -> T {
    let len = options.len();
    match options.iter().position(|o| *o == current) {
        Some(i) if forward => options[(i + 1) % len],
        Some(i) => options[(i + len - 1) % len],
        None => options.first().copied().unwrap_or(current),
    }
}

/// Like `step_in`, but an unset value starts at the first option.
fn step_optional<T: Copy + PartialEq>(options: &[T], current: Option<T>, forward: bool) -> Option<T> {
    match current {
        Some(c) if options.contains(&c) => Some(step_in(options, c, forward)),
        _ => options.first().copied(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CropType, WeatherMode};

    fn app() -> App {
        App::new(&Config::default())
    }

    #[test]
    fn step_in_wraps() {
        let options = [1, 2, 3];
        assert_eq!(step_in(&options, 3, true), 1);
        assert_eq!(step_in(&options, 1, false), 3);
        assert_eq!(step_in(&options, 9, true), 1);
        assert_eq!(step_optional(&options, None, true), Some(1));
    }

    #[test]
    fn number_parsing_accepts_decimal_comma() {
        assert_eq!(parse_number("12,5"), Some(12.5));
        assert_eq!(parse_number(" -3 "), Some(-3.0));
        assert_eq!(parse_number("abc"), None);
        assert_eq!(parse_number("NaN"), None);
    }

    #[test]
    fn choosing_farm_type_queues_resolution() {
        let mut app = app();
        app.choose_farm_type();
        assert_eq!(app.state().step, WizardStep::Weather);
        let effects = app.take_effects();
        assert_eq!(effects.len(), 1);
        assert!(matches!(effects[0], Effect::ResolveWeather(_)));
        assert!(app.take_effects().is_empty());
    }

    #[test]
    fn weather_field_edit_goes_through_controller() {
        let mut app = app();
        app.choose_farm_type();
        app.weather_state.focused_field = WeatherField::Temperature;
        app.activate_weather_field();
        assert!(!app.weather_state.editing);
        let before = app.state().weather.temperature;
        app.adjust_weather(true);
        assert_eq!(app.state().weather.temperature, before);
        assert!(app.status_message.is_some());

        let effects = app.take_effects();
        if let Some(Effect::ResolveWeather(t)) = effects.first() {
            app.complete(Completion::Weather(*t, Resolution::Degraded("offline".into())));
        }
        app.activate_weather_field();
        assert!(app.weather_state.editing);
        app.weather_state.edit_buffer = "-35".into();
        app.commit_weather_edit();

        assert_eq!(app.state().weather.temperature, -20.0);
        assert_eq!(app.state().weather_mode, WeatherMode::Manual);
    }

    #[test]
    fn details_cycle_crop_then_stage() {
        let mut app = app();
        app.choose_farm_type(); // wheat is first
        let effects = app.take_effects();
        if let Some(Effect::ResolveWeather(t)) = effects.first() {
            app.complete(Completion::Weather(*t, Resolution::Degraded("offline".into())));
        }
        app.next_step();
        assert_eq!(app.state().step, WizardStep::Details);

        app.details_state.focused_field = DetailsField::CropType;
        app.adjust_details(true);
        assert_eq!(app.state().crop.crop_type, Some(CropType::Wheat));

        app.details_state.focused_field = DetailsField::Stage;
        app.adjust_details(true);
        assert_eq!(app.state().crop.stage.as_deref(), Some("germination"));
    }

    #[test]
    fn stale_completion_leaves_status_alone() {
        let mut app = app();
        app.choose_farm_type();
        let effects = app.take_effects();
        app.reset();
        if let Some(Effect::ResolveWeather(t)) = effects.first() {
            app.complete(Completion::Weather(*t, Resolution::Degraded("late".into())));
        }
        assert_eq!(app.status_message.as_deref(), Some("Yeni analiz"));
        assert_eq!(app.state().step, WizardStep::FarmType);
    }
}
