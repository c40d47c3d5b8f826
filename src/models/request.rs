use super::farm::{AnimalType, CropType, FarmType};
use super::region::RegionCode;
use super::weather::WeatherSnapshot;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoilData {
    pub soil_moisture: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_temperature: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil_type: Option<String>,
}

impl Default for SoilData {
    fn default() -> Self {
        Self {
            soil_moisture: 50.0,
            soil_temperature: None,
            soil_type: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowingType {
    #[default]
    OpenField,
    Greenhouse,
}

impl GrowingType {
    pub fn label_az(&self) -> &'static str {
        match self {
            GrowingType::OpenField => "Açıq sahə",
            GrowingType::Greenhouse => "İstixana",
        }
    }

    pub fn toggle(&self) -> Self {
        match self {
            GrowingType::OpenField => GrowingType::Greenhouse,
            GrowingType::Greenhouse => GrowingType::OpenField,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CropContext {
    pub crop_type: CropType,
    pub stage: String,
    pub days_since_irrigation: u32,
    pub days_since_fertilization: u32,
    pub growing_type: GrowingType,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaccinationStatus {
    #[default]
    Current,
    Due,
    Overdue,
}

impl VaccinationStatus {
    pub fn label_az(&self) -> &'static str {
        match self {
            VaccinationStatus::Current => "Cari",
            VaccinationStatus::Due => "Vaxtı çatıb",
            VaccinationStatus::Overdue => "Gecikmiş",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            VaccinationStatus::Current => VaccinationStatus::Due,
            VaccinationStatus::Due => VaccinationStatus::Overdue,
            VaccinationStatus::Overdue => VaccinationStatus::Current,
        }
    }
}

pub const VENTILATION_OPTIONS: &[&str] = &["good", "adequate", "poor"];
pub const WATER_OPTIONS: &[&str] = &["adequate", "limited", "scarce"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivestockContext {
    pub animal_type: AnimalType,
    pub count: u32,
    pub barn_hygiene_score: u8,
    pub days_since_vet_check: u32,
    pub vaccination_status: VaccinationStatus,
    pub days_since_deworming: u32,
    pub ventilation_quality: String,
    pub water_availability: String,
}

impl Default for LivestockContext {
    fn default() -> Self {
        Self {
            animal_type: AnimalType::Cattle,
            count: 10,
            barn_hygiene_score: 7,
            days_since_vet_check: 30,
            vaccination_status: VaccinationStatus::Current,
            days_since_deworming: 60,
            ventilation_quality: "good".into(),
            water_availability: "adequate".into(),
        }
    }
}

/// Body of `POST /api/v1/recommendations`. Absent contexts are omitted from
/// the JSON rather than sent as null.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRequest {
    pub farm_type: FarmType,
    pub region: RegionCode,
    pub weather: WeatherSnapshot,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub soil: Option<SoilData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub crop_context: Option<CropContext>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub livestock_context: Option<LivestockContext>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_contexts_are_omitted() {
        let request = RecommendationRequest {
            farm_type: FarmType::Mixed,
            region: RegionCode::Aran,
            weather: WeatherSnapshot::default(),
            soil: Some(SoilData::default()),
            crop_context: None,
            livestock_context: None,
        };
        let value = serde_json::to_value(&request).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("soil"));
        assert!(!obj.contains_key("crop_context"));
        assert!(!obj.contains_key("livestock_context"));
        assert_eq!(obj["farm_type"], "mixed");
        assert!(!obj["soil"].as_object().unwrap().contains_key("soil_type"));
    }

    #[test]
    fn livestock_defaults_match_intake_form() {
        let ctx = LivestockContext::default();
        assert_eq!(ctx.animal_type, AnimalType::Cattle);
        assert_eq!(ctx.count, 10);
        assert_eq!(ctx.barn_hygiene_score, 7);
        let value = serde_json::to_value(&ctx).unwrap();
        assert_eq!(value["vaccination_status"], "current");
    }
}
