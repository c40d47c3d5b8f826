use serde::{Deserialize, Serialize};

/// Agro-climatic zone of Azerbaijan used by the advisory service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionCode {
    #[default]
    Aran,
    Lankaran,
    ShekiZagatala,
    GanjaGazakh,
    Mountainous,
}

impl RegionCode {
    pub fn all() -> &'static [RegionCode] {
        &[
            RegionCode::Aran,
            RegionCode::Lankaran,
            RegionCode::ShekiZagatala,
            RegionCode::GanjaGazakh,
            RegionCode::Mountainous,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegionCode::Aran => "aran",
            RegionCode::Lankaran => "lankaran",
            RegionCode::ShekiZagatala => "sheki_zagatala",
            RegionCode::GanjaGazakh => "ganja_gazakh",
            RegionCode::Mountainous => "mountainous",
        }
    }

    pub fn name_az(&self) -> &'static str {
        match self {
            RegionCode::Aran => "Aran",
            RegionCode::Lankaran => "Lənkəran",
            RegionCode::ShekiZagatala => "Şəki-Zaqatala",
            RegionCode::GanjaGazakh => "Gəncə-Qazax",
            RegionCode::Mountainous => "Dağlıq",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            RegionCode::Aran => RegionCode::Lankaran,
            RegionCode::Lankaran => RegionCode::ShekiZagatala,
            RegionCode::ShekiZagatala => RegionCode::GanjaGazakh,
            RegionCode::GanjaGazakh => RegionCode::Mountainous,
            RegionCode::Mountainous => RegionCode::Aran,
        }
    }

    pub fn prev(&self) -> Self {
        match self {
            RegionCode::Aran => RegionCode::Mountainous,
            RegionCode::Lankaran => RegionCode::Aran,
            RegionCode::ShekiZagatala => RegionCode::Lankaran,
            RegionCode::GanjaGazakh => RegionCode::ShekiZagatala,
            RegionCode::Mountainous => RegionCode::GanjaGazakh,
        }
    }
}

impl std::fmt::Display for RegionCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_names_match_as_str() {
        for region in RegionCode::all() {
            let json = serde_json::to_string(region).unwrap();
            assert_eq!(json, format!("\"{}\"", region.as_str()));
            let parsed: RegionCode = serde_json::from_str(&json).unwrap();
            assert_eq!(parsed, *region);
        }
    }

    #[test]
    fn cycling_visits_every_region() {
        let mut region = RegionCode::default();
        for _ in 0..RegionCode::all().len() {
            region = region.next();
        }
        assert_eq!(region, RegionCode::Aran);
        assert_eq!(RegionCode::Aran.prev().next(), RegionCode::Aran);
    }
}
