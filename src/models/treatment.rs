use serde::{Deserialize, Serialize};

/// Qualitative sky descriptions a treatment may prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SkyCondition {
    Clear,
    PartlyCloudy,
    Cloudy,
}

impl SkyCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkyCondition::Clear => "Clear",
            SkyCondition::PartlyCloudy => "Partly cloudy",
            SkyCondition::Cloudy => "Cloudy",
        }
    }

    /// Case-insensitive match against a free-form conditions label.
    pub fn matches(&self, conditions: &str) -> bool {
        conditions.trim().eq_ignore_ascii_case(self.as_str())
    }
}

impl std::fmt::Display for SkyCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Hard weather limits for one treatment type. Temperatures in °C, wind in km/h,
/// precipitation in mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TreatmentConditions {
    pub min_temp: f64,
    pub max_temp: f64,
    pub max_wind_speed: f64,
    pub max_precipitation: f64,
    pub ideal_conditions: &'static [SkyCondition],
}

const FERTILIZATION: TreatmentConditions = TreatmentConditions {
    min_temp: 10.0,
    max_temp: 30.0,
    max_wind_speed: 24.0,
    max_precipitation: 5.0,
    ideal_conditions: &[
        SkyCondition::Clear,
        SkyCondition::PartlyCloudy,
        SkyCondition::Cloudy,
    ],
};

// Herbicide drift makes wind the binding limit here.
const WEED_CONTROL: TreatmentConditions = TreatmentConditions {
    min_temp: 15.0,
    max_temp: 29.0,
    max_wind_speed: 16.0,
    max_precipitation: 0.0,
    ideal_conditions: &[SkyCondition::Clear, SkyCondition::PartlyCloudy],
};

const PEST_CONTROL: TreatmentConditions = TreatmentConditions {
    min_temp: 10.0,
    max_temp: 32.0,
    max_wind_speed: 16.0,
    max_precipitation: 0.0,
    ideal_conditions: &[SkyCondition::Clear, SkyCondition::PartlyCloudy],
};

const DISEASE_CONTROL: TreatmentConditions = TreatmentConditions {
    min_temp: 10.0,
    max_temp: 30.0,
    max_wind_speed: 16.0,
    max_precipitation: 2.0,
    ideal_conditions: &[SkyCondition::PartlyCloudy, SkyCondition::Cloudy],
};

const AERATION: TreatmentConditions = TreatmentConditions {
    min_temp: 10.0,
    max_temp: 27.0,
    max_wind_speed: 40.0,
    max_precipitation: 10.0,
    ideal_conditions: &[SkyCondition::PartlyCloudy, SkyCondition::Cloudy],
};

const OVERSEEDING: TreatmentConditions = TreatmentConditions {
    min_temp: 10.0,
    max_temp: 24.0,
    max_wind_speed: 24.0,
    max_precipitation: 5.0,
    ideal_conditions: &[SkyCondition::PartlyCloudy, SkyCondition::Cloudy],
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreatmentType {
    Fertilization,
    WeedControl,
    PestControl,
    DiseaseControl,
    Aeration,
    Overseeding,
}

impl TreatmentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreatmentType::Fertilization => "Fertilization",
            TreatmentType::WeedControl => "Weed Control",
            TreatmentType::PestControl => "Pest Control",
            TreatmentType::DiseaseControl => "Disease Control",
            TreatmentType::Aeration => "Aeration",
            TreatmentType::Overseeding => "Overseeding",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace(['-', ' ', '_'], "").as_str() {
            "fertilization" | "fertilizer" => Some(TreatmentType::Fertilization),
            "weedcontrol" => Some(TreatmentType::WeedControl),
            "pestcontrol" => Some(TreatmentType::PestControl),
            "diseasecontrol" => Some(TreatmentType::DiseaseControl),
            "aeration" => Some(TreatmentType::Aeration),
            "overseeding" | "overseed" => Some(TreatmentType::Overseeding),
            _ => None,
        }
    }

    pub fn all() -> &'static [TreatmentType] {
        &[
            TreatmentType::Fertilization,
            TreatmentType::WeedControl,
            TreatmentType::PestControl,
            TreatmentType::DiseaseControl,
            TreatmentType::Aeration,
            TreatmentType::Overseeding,
        ]
    }

    /// Row of the static threshold table for this treatment.
    pub fn conditions(&self) -> &'static TreatmentConditions {
        match self {
            TreatmentType::Fertilization => &FERTILIZATION,
            TreatmentType::WeedControl => &WEED_CONTROL,
            TreatmentType::PestControl => &PEST_CONTROL,
            TreatmentType::DiseaseControl => &DISEASE_CONTROL,
            TreatmentType::Aeration => &AERATION,
            TreatmentType::Overseeding => &OVERSEEDING,
        }
    }
}

/// Accepts any spelling `TreatmentType::from_str` does, e.g. `Weed Control` or
/// `WeedControl`.
pub fn deserialize_treatment_type<'de, D>(
    deserializer: D,
) -> std::result::Result<TreatmentType, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value = String::deserialize(deserializer)?;
    TreatmentType::from_str(&value)
        .ok_or_else(|| D::Error::custom(format!("unknown treatment type '{}'", value)))
}

impl std::fmt::Display for TreatmentType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn treatment_type_from_str_valid() {
        assert_eq!(
            TreatmentType::from_str("Weed Control"),
            Some(TreatmentType::WeedControl)
        );
        assert_eq!(
            TreatmentType::from_str("weed-control"),
            Some(TreatmentType::WeedControl)
        );
        assert_eq!(
            TreatmentType::from_str("fertilization"),
            Some(TreatmentType::Fertilization)
        );
        assert_eq!(
            TreatmentType::from_str("overseed"),
            Some(TreatmentType::Overseeding)
        );
    }

    #[test]
    fn treatment_type_from_str_invalid() {
        assert_eq!(TreatmentType::from_str("mowing"), None);
        assert_eq!(TreatmentType::from_str(""), None);
    }

    #[test]
    fn treatment_type_round_trip() {
        for treatment in TreatmentType::all() {
            assert_eq!(TreatmentType::from_str(treatment.as_str()), Some(*treatment));
            let debug_str = format!("{:?}", treatment);
            assert_eq!(TreatmentType::from_str(&debug_str), Some(*treatment));
        }
    }

    #[test]
    fn threshold_table_is_well_formed() {
        for treatment in TreatmentType::all() {
            let c = treatment.conditions();
            assert!(c.max_temp > c.min_temp, "{} temp range", treatment);
            assert!(c.max_wind_speed >= 0.0, "{} wind", treatment);
            assert!(c.max_precipitation >= 0.0, "{} precipitation", treatment);
            assert!(!c.ideal_conditions.is_empty(), "{} ideal", treatment);
        }
    }

    #[test]
    fn weed_control_wind_cap_is_stricter_than_fertilization() {
        assert!(
            TreatmentType::WeedControl.conditions().max_wind_speed
                < TreatmentType::Fertilization.conditions().max_wind_speed
        );
    }

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(deserialize_with = "deserialize_treatment_type")]
        treatment_type: TreatmentType,
    }

    #[test]
    fn deserializes_display_and_variant_names() {
        for name in ["Weed Control", "WeedControl", "weed-control"] {
            let row: Row = serde_yaml::from_str(&format!("treatment_type: {}", name)).unwrap();
            assert_eq!(row.treatment_type, TreatmentType::WeedControl);
        }
        let err = serde_yaml::from_str::<Row>("treatment_type: Mowing").unwrap_err();
        assert!(err.to_string().contains("unknown treatment type 'Mowing'"));
    }

    #[test]
    fn sky_condition_matches_ignoring_case() {
        assert!(SkyCondition::PartlyCloudy.matches("partly CLOUDY"));
        assert!(SkyCondition::Clear.matches(" Clear "));
        assert!(!SkyCondition::Cloudy.matches("Partly cloudy"));
    }
}
