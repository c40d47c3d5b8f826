use crate::models::RegionCode;

/// Ordered city-field rules; the first rule with a matching term wins.
const CITY_RULES: &[(RegionCode, &[&str])] = &[
    (RegionCode::GanjaGazakh, &["ganja", "gəncə", "gazakh"]),
    (RegionCode::Lankaran, &["lankaran", "lənkəran", "astara"]),
    (
        RegionCode::ShekiZagatala,
        &["sheki", "şəki", "zagatala", "zaqatala", "balakan", "qax"],
    ),
    (RegionCode::Mountainous, &["quba", "qusar", "xinaliq", "qabala"]),
];

/// Region-field rules: same categories in the same order, narrower terms.
const REGION_RULES: &[(RegionCode, &[&str])] = &[
    (RegionCode::GanjaGazakh, &["ganja", "gəncə", "gazakh"]),
    (RegionCode::Lankaran, &["lankaran", "lənkəran"]),
    (RegionCode::ShekiZagatala, &["sheki", "şəki", "zagatala"]),
    (RegionCode::Mountainous, &["quba", "mountain"]),
];

/// Map free-text location names to a region code.
///
/// Case-insensitive substring match. Every city rule is tried before any
/// region rule, so `("Ganja", "Lankaran")` maps to `ganja_gazakh`. Falls back
/// to `aran` (the central lowlands) when nothing matches.
pub fn map_location_to_region(city: &str, region: &str) -> RegionCode {
    let city = city.to_lowercase();
    let region = region.to_lowercase();

    first_match(&city, CITY_RULES)
        .or_else(|| first_match(&region, REGION_RULES))
        .unwrap_or_default()
}

fn first_match(text: &str, rules: &[(RegionCode, &[&str])]) -> Option<RegionCode> {
    if text.is_empty() {
        return None;
    }
    rules
        .iter()
        .find(|(_, terms)| terms.iter().any(|term| text.contains(term)))
        .map(|(code, _)| *code)
}
