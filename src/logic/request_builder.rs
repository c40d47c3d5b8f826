use super::wizard::WizardState;
use crate::error::{Result, YoncaError};
use crate::models::{CropContext, FarmType, LivestockContext, RecommendationRequest};

pub const MISSING_CROP_MESSAGE: &str = "Bitki növü və inkişaf mərhələsini seçin";

/// Assemble the outbound request from a session snapshot.
///
/// Soil goes with every farm type except livestock. Crop context is attached
/// for wheat, orchard and vegetable farms, livestock context only for
/// livestock; mixed farms carry neither.
pub fn build(state: &WizardState) -> Result<RecommendationRequest> {
    let farm_type = state
        .farm_type
        .ok_or_else(|| YoncaError::IncompleteContext("Təsərrüfat növünü seçin".into()))?;

    let crop_context = if farm_type.requires_crop_context() {
        Some(crop_context(state, farm_type)?)
    } else {
        None
    };

    let livestock_context = if farm_type.requires_livestock_context() {
        Some(livestock_context(&state.livestock)?)
    } else {
        None
    };

    Ok(RecommendationRequest {
        farm_type,
        region: state.region,
        weather: state.weather.clone().normalized(),
        soil: farm_type.includes_soil().then(|| state.soil.clone()),
        crop_context,
        livestock_context,
    })
}

fn crop_context(state: &WizardState, farm_type: FarmType) -> Result<CropContext> {
    let draft = &state.crop;
    let (crop_type, stage) = match (draft.crop_type, draft.stage.as_deref()) {
        (Some(crop_type), Some(stage)) if !stage.is_empty() => (crop_type, stage),
        _ => return Err(YoncaError::IncompleteContext(MISSING_CROP_MESSAGE.into())),
    };

    if !farm_type.crop_types().contains(&crop_type) {
        return Err(YoncaError::IncompleteContext(format!(
            "{} is not a {} crop",
            crop_type.as_str(),
            farm_type.as_str()
        )));
    }
    if !crop_type.has_stage(stage) {
        return Err(YoncaError::IncompleteContext(format!(
            "'{}' is not a growth stage of {}",
            stage,
            crop_type.as_str()
        )));
    }

    Ok(CropContext {
        crop_type,
        stage: stage.to_string(),
        days_since_irrigation: draft.days_since_irrigation,
        days_since_fertilization: draft.days_since_fertilization,
        growing_type: draft.growing_type,
    })
}

fn livestock_context(livestock: &LivestockContext) -> Result<LivestockContext> {
    if livestock.count < 1 {
        return Err(YoncaError::IncompleteContext(
            "Heyvan sayı ən azı 1 olmalıdır".into(),
        ));
    }
    if !(1..=10).contains(&livestock.barn_hygiene_score) {
        return Err(YoncaError::IncompleteContext(
            "Tövlə gigiyenası 1-10 arasında olmalıdır".into(),
        ));
    }
    Ok(livestock.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::wizard::SessionDefaults;
    use crate::models::{AnimalType, CropType, RegionCode, WeatherSnapshot};

    fn state(farm_type: Option<FarmType>) -> WizardState {
        let mut state = WizardState::new(&SessionDefaults::default());
        state.farm_type = farm_type;
        state
    }

    #[test]
    fn wheat_request_carries_crop_and_soil() {
        let mut s = state(Some(FarmType::Wheat));
        s.region = RegionCode::Aran;
        s.weather = WeatherSnapshot {
            temperature: 22.0,
            humidity: 55.0,
            frost_warning: false,
            ..WeatherSnapshot::default()
        };
        s.crop.crop_type = Some(CropType::Wheat);
        s.crop.stage = Some("tillering".into());

        let request = build(&s).unwrap();
        let crop = request.crop_context.as_ref().unwrap();
        assert_eq!(crop.crop_type, CropType::Wheat);
        assert_eq!(crop.stage, "tillering");
        assert!(request.soil.is_some());
        assert!(request.livestock_context.is_none());

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["region"], "aran");
        assert_eq!(json["weather"]["temperature"], 22.0);
        assert!(json.get("livestock_context").is_none());
    }

    #[test]
    fn livestock_request_carries_herd_only() {
        let mut s = state(Some(FarmType::Livestock));
        s.livestock.animal_type = AnimalType::Cattle;
        s.livestock.count = 10;

        let request = build(&s).unwrap();
        assert_eq!(request.livestock_context.as_ref().unwrap().count, 10);
        assert!(request.crop_context.is_none());
        assert!(request.soil.is_none());
    }

    #[test]
    fn mixed_farm_needs_only_weather_and_soil() {
        let mut s = state(Some(FarmType::Mixed));
        // leftovers from other inputs must not leak in
        s.crop.crop_type = Some(CropType::Wheat);
        s.livestock.count = 0;

        let request = build(&s).unwrap();
        assert!(request.soil.is_some());
        assert!(request.crop_context.is_none());
        assert!(request.livestock_context.is_none());
    }

    #[test]
    fn missing_farm_type_is_incomplete() {
        assert!(matches!(
            build(&state(None)),
            Err(YoncaError::IncompleteContext(_))
        ));
    }

    #[test]
    fn crop_farms_need_crop_and_stage() {
        for farm_type in [FarmType::Wheat, FarmType::Orchard, FarmType::Vegetable] {
            let mut s = state(Some(farm_type));
            assert!(build(&s).is_err());

            s.crop.crop_type = farm_type.crop_types().first().copied();
            assert!(build(&s).is_err());

            s.crop.stage = Some(String::new());
            assert!(build(&s).is_err());
        }
    }

    #[test]
    fn stage_must_belong_to_crop() {
        let mut s = state(Some(FarmType::Orchard));
        s.crop.crop_type = Some(CropType::Apple);
        s.crop.stage = Some("veraison".into());
        assert!(build(&s).is_err());

        s.crop.stage = Some("harvest".into());
        assert!(build(&s).is_ok());
    }

    #[test]
    fn crop_must_belong_to_farm_type() {
        let mut s = state(Some(FarmType::Vegetable));
        s.crop.crop_type = Some(CropType::Wheat);
        s.crop.stage = Some("tillering".into());
        assert!(build(&s).is_err());
    }

    #[test]
    fn herd_bounds_are_enforced() {
        let mut s = state(Some(FarmType::Livestock));
        s.livestock.count = 0;
        assert!(build(&s).is_err());

        s.livestock.count = 3;
        s.livestock.barn_hygiene_score = 0;
        assert!(build(&s).is_err());

        s.livestock.barn_hygiene_score = 10;
        assert!(build(&s).is_ok());
    }
}
