use super::farm::FarmType;
use super::region::RegionCode;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Urgency tier assigned by the advisory service; ordered `Info < ... < Critical`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Urgency {
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Info => "info",
            Urgency::Low => "low",
            Urgency::Medium => "medium",
            Urgency::High => "high",
            Urgency::Critical => "critical",
        }
    }

    pub fn label_az(&self) -> &'static str {
        match self {
            Urgency::Info => "Məlumat",
            Urgency::Low => "Aşağı",
            Urgency::Medium => "Orta",
            Urgency::High => "Yüksək",
            Urgency::Critical => "Kritik",
        }
    }

    pub fn color(&self) -> ratatui::style::Color {
        use ratatui::style::Color;
        match self {
            Urgency::Info => Color::Green,
            Urgency::Low => Color::LightBlue,
            Urgency::Medium => Color::Yellow,
            Urgency::High => Color::LightRed,
            Urgency::Critical => Color::Red,
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            Urgency::Info => "ℹ",
            Urgency::Low => "·",
            Urgency::Medium => "→",
            Urgency::High => "⚠",
            Urgency::Critical => "!",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationAction {
    pub rule_id: String,
    pub name_az: String,
    #[serde(default)]
    pub name_en: String,
    #[serde(default)]
    pub category: String,
    pub urgency: Urgency,
    #[serde(default)]
    pub urgency_score: u8,
    pub message_az: String,
    #[serde(default)]
    pub message_en: String,
    #[serde(default)]
    pub action_type: String,
    #[serde(default)]
    pub action_details: Option<HashMap<String, serde_json::Value>>,
    #[serde(default)]
    pub timing_az: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyScheduleItem {
    pub time_slot: String,
    pub task_az: String,
    #[serde(default)]
    pub task_en: String,
    pub priority: String,
    #[serde(default)]
    pub related_rule_id: Option<String>,
    #[serde(default)]
    pub urgency_score: u8,
}

/// Advisory result, pre-bucketed by the service. Read-only on the client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationResponse {
    pub farm_type: FarmType,
    pub region: RegionCode,
    #[serde(default)]
    pub response_date: Option<NaiveDate>,
    #[serde(default)]
    pub generated_at: Option<NaiveDateTime>,
    #[serde(default)]
    pub critical_alerts: Vec<RecommendationAction>,
    #[serde(default)]
    pub high_priority: Vec<RecommendationAction>,
    #[serde(default)]
    pub medium_priority: Vec<RecommendationAction>,
    #[serde(default)]
    pub low_priority: Vec<RecommendationAction>,
    #[serde(default)]
    pub info: Vec<RecommendationAction>,
    #[serde(default)]
    pub daily_schedule: Vec<DailyScheduleItem>,
    #[serde(default)]
    pub total_recommendations: u32,
    #[serde(default)]
    pub summary_az: String,
    #[serde(default)]
    pub summary_en: String,
}

impl RecommendationResponse {
    /// Buckets in tier order, most urgent first.
    pub fn buckets(&self) -> [(Urgency, &[RecommendationAction]); 5] {
        [
            (Urgency::Critical, self.critical_alerts.as_slice()),
            (Urgency::High, self.high_priority.as_slice()),
            (Urgency::Medium, self.medium_priority.as_slice()),
            (Urgency::Low, self.low_priority.as_slice()),
            (Urgency::Info, self.info.as_slice()),
        ]
    }

    pub fn is_empty(&self) -> bool {
        self.buckets().iter().all(|(_, actions)| actions.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "farm_type": "wheat",
        "region": "aran",
        "response_date": "2026-04-12",
        "generated_at": "2026-04-12T08:30:11.482913",
        "critical_alerts": [{
            "rule_id": "WHT_FROST_001",
            "name_az": "Şaxta riski",
            "name_en": "Frost risk",
            "category": "weather",
            "urgency": "critical",
            "urgency_score": 95,
            "message_az": "Şaxta gözlənilir",
            "message_en": "Frost expected",
            "action_type": "protect",
            "action_details": {"cover": true}
        }],
        "info": [{
            "rule_id": "WHT_INFO_002",
            "name_az": "Məlumat",
            "urgency": "info",
            "message_az": "Normal şərait"
        }],
        "daily_schedule": [{
            "time_slot": "morning",
            "task_az": "Sahəni yoxlayın",
            "task_en": "Inspect the field",
            "priority": "high",
            "urgency_score": 80
        }],
        "total_recommendations": 2,
        "summary_az": "2 tövsiyə",
        "summary_en": "2 recommendations"
    }"#;

    #[test]
    fn parses_service_response_with_missing_buckets() {
        let response: RecommendationResponse = serde_json::from_str(SAMPLE).unwrap();
        assert_eq!(response.farm_type, FarmType::Wheat);
        assert_eq!(response.critical_alerts.len(), 1);
        assert!(response.high_priority.is_empty());
        assert_eq!(response.info[0].urgency, Urgency::Info);
        assert_eq!(response.daily_schedule[0].time_slot, "morning");
        assert!(response.generated_at.is_some());
        assert!(!response.is_empty());
    }

    #[test]
    fn buckets_follow_tier_order() {
        let response: RecommendationResponse = serde_json::from_str(SAMPLE).unwrap();
        let tiers: Vec<Urgency> = response.buckets().iter().map(|(u, _)| *u).collect();
        assert_eq!(
            tiers,
            vec![
                Urgency::Critical,
                Urgency::High,
                Urgency::Medium,
                Urgency::Low,
                Urgency::Info
            ]
        );
        assert!(tiers.windows(2).all(|w| w[0] > w[1]));
    }
}
