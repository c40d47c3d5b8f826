use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FarmType {
    Wheat,
    Livestock,
    Orchard,
    Vegetable,
    Mixed,
}

impl FarmType {
    pub fn all() -> &'static [FarmType] {
        &[
            FarmType::Wheat,
            FarmType::Livestock,
            FarmType::Orchard,
            FarmType::Vegetable,
            FarmType::Mixed,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FarmType::Wheat => "wheat",
            FarmType::Livestock => "livestock",
            FarmType::Orchard => "orchard",
            FarmType::Vegetable => "vegetable",
            FarmType::Mixed => "mixed",
        }
    }

    pub fn name_az(&self) -> &'static str {
        match self {
            FarmType::Wheat => "Taxıl təsərrüfatı",
            FarmType::Livestock => "Heyvandarlıq",
            FarmType::Orchard => "Meyvə bağı",
            FarmType::Vegetable => "Tərəvəzçilik",
            FarmType::Mixed => "Qarışıq",
        }
    }

    pub fn name_en(&self) -> &'static str {
        match self {
            FarmType::Wheat => "Grain",
            FarmType::Livestock => "Livestock",
            FarmType::Orchard => "Orchard",
            FarmType::Vegetable => "Vegetables",
            FarmType::Mixed => "Mixed",
        }
    }

    pub fn description_az(&self) -> &'static str {
        match self {
            FarmType::Wheat => "Buğda, arpa",
            FarmType::Livestock => "Mal-qara, qoyun",
            FarmType::Orchard => "Üzüm, nar, alma",
            FarmType::Vegetable => "Pomidor, xiyar",
            FarmType::Mixed => "Bitkiçilik + heyvandarlıq",
        }
    }

    /// Crop context is mandatory for wheat, orchard and vegetable farms.
    pub fn requires_crop_context(&self) -> bool {
        matches!(
            self,
            FarmType::Wheat | FarmType::Orchard | FarmType::Vegetable
        )
    }

    pub fn requires_livestock_context(&self) -> bool {
        matches!(self, FarmType::Livestock)
    }

    pub fn includes_soil(&self) -> bool {
        !matches!(self, FarmType::Livestock)
    }

    pub fn crop_types(&self) -> &'static [CropType] {
        match self {
            FarmType::Wheat => &[CropType::Wheat, CropType::Barley],
            FarmType::Orchard => &[CropType::Grape, CropType::Pomegranate, CropType::Apple],
            FarmType::Vegetable => &[CropType::Tomato, CropType::Cucumber, CropType::Potato],
            FarmType::Livestock | FarmType::Mixed => &[],
        }
    }
}

impl std::fmt::Display for FarmType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CropType {
    Wheat,
    Barley,
    Grape,
    Pomegranate,
    Apple,
    Tomato,
    Cucumber,
    Potato,
}

const CEREAL_STAGES: &[&str] = &[
    "germination",
    "tillering",
    "stem_extension",
    "heading",
    "grain_filling",
    "maturity",
];

const FRUITING_VEGETABLE_STAGES: &[&str] = &["seedling", "vegetative", "flowering", "fruiting"];

impl CropType {
    pub fn as_str(&self) -> &'static str {
        match self {
            CropType::Wheat => "wheat",
            CropType::Barley => "barley",
            CropType::Grape => "grape",
            CropType::Pomegranate => "pomegranate",
            CropType::Apple => "apple",
            CropType::Tomato => "tomato",
            CropType::Cucumber => "cucumber",
            CropType::Potato => "potato",
        }
    }

    pub fn name_az(&self) -> &'static str {
        match self {
            CropType::Wheat => "Buğda",
            CropType::Barley => "Arpa",
            CropType::Grape => "Üzüm",
            CropType::Pomegranate => "Nar",
            CropType::Apple => "Alma",
            CropType::Tomato => "Pomidor",
            CropType::Cucumber => "Xiyar",
            CropType::Potato => "Kartof",
        }
    }

    /// Growth stages the advisory service recognises for this crop, in order.
    pub fn stages(&self) -> &'static [&'static str] {
        match self {
            CropType::Wheat | CropType::Barley => CEREAL_STAGES,
            CropType::Tomato | CropType::Cucumber => FRUITING_VEGETABLE_STAGES,
            CropType::Grape => &[
                "dormancy",
                "bud_break",
                "flowering",
                "fruit_set",
                "fruit_development",
                "veraison",
                "harvest",
            ],
            CropType::Pomegranate => &[
                "dormancy",
                "bud_break",
                "flowering",
                "fruit_set",
                "fruit_development",
                "maturity",
            ],
            CropType::Apple => &[
                "dormancy",
                "bud_break",
                "flowering",
                "fruit_set",
                "fruit_development",
                "harvest",
            ],
            CropType::Potato => &[
                "sprouting",
                "vegetative",
                "tuber_initiation",
                "tuber_bulking",
                "maturation",
            ],
        }
    }

    pub fn has_stage(&self, stage: &str) -> bool {
        self.stages().contains(&stage)
    }

    /// Azerbaijani label for one of this crop's stages; unknown codes pass through.
    pub fn stage_name_az<'a>(&self, stage: &'a str) -> &'a str {
        match (self, stage) {
            (CropType::Grape, "fruit_set") => "Gilə bağlama",
            (CropType::Grape, "fruit_development") => "Gilə böyüməsi",
            (_, "germination") | (_, "sprouting") => "Cücərmə",
            (_, "tillering") => "Kollanma",
            (_, "stem_extension") => "Gövdə uzanması",
            (_, "heading") => "Sünbülləmə",
            (_, "grain_filling") => "Dən dolması",
            (_, "maturity") | (_, "maturation") => "Yetişmə",
            (_, "seedling") => "Şitil",
            (_, "vegetative") => "Vegetativ",
            (_, "flowering") => "Çiçəkləmə",
            (_, "fruiting") => "Meyvə dövrü",
            (_, "dormancy") => "Qış yuxusu",
            (_, "bud_break") => "Tumurcuqlanma",
            (_, "fruit_set") => "Meyvə bağlama",
            (_, "fruit_development") => "Meyvə böyüməsi",
            (_, "veraison") => "Veraison",
            (_, "harvest") => "Yığım",
            (_, "tuber_initiation") => "Yumru başlanğıcı",
            (_, "tuber_bulking") => "Yumru böyüməsi",
            _ => stage,
        }
    }
}

impl std::fmt::Display for CropType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnimalType {
    #[default]
    Cattle,
    Sheep,
    Goat,
    Poultry,
}

impl AnimalType {
    pub fn all() -> &'static [AnimalType] {
        &[
            AnimalType::Cattle,
            AnimalType::Sheep,
            AnimalType::Goat,
            AnimalType::Poultry,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AnimalType::Cattle => "cattle",
            AnimalType::Sheep => "sheep",
            AnimalType::Goat => "goat",
            AnimalType::Poultry => "poultry",
        }
    }

    pub fn name_az(&self) -> &'static str {
        match self {
            AnimalType::Cattle => "Mal-qara",
            AnimalType::Sheep => "Qoyun",
            AnimalType::Goat => "Keçi",
            AnimalType::Poultry => "Quşçuluq",
        }
    }
}

impl std::fmt::Display for AnimalType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
