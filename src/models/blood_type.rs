use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// ABO/Rh blood group
///
/// Serialised in the platform's storage form (`O_NEGATIVE`, `AB_POSITIVE`, ...)
/// and accepted in display form (`O-`, `AB+`) as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BloodType {
    #[serde(alias = "A+")]
    APositive,
    #[serde(alias = "A-")]
    ANegative,
    #[serde(alias = "B+")]
    BPositive,
    #[serde(alias = "B-")]
    BNegative,
    #[serde(alias = "AB+")]
    AbPositive,
    #[serde(alias = "AB-")]
    AbNegative,
    #[serde(alias = "O+")]
    OPositive,
    #[serde(alias = "O-")]
    ONegative,
}

impl BloodType {
    pub const ALL: [BloodType; 8] = [
        BloodType::APositive,
        BloodType::ANegative,
        BloodType::BPositive,
        BloodType::BNegative,
        BloodType::AbPositive,
        BloodType::AbNegative,
        BloodType::OPositive,
        BloodType::ONegative,
    ];

    /// Storage form used by the platform database, e.g. `AB_NEGATIVE`
    pub fn as_storage_str(&self) -> &'static str {
        match self {
            BloodType::APositive => "A_POSITIVE",
            BloodType::ANegative => "A_NEGATIVE",
            BloodType::BPositive => "B_POSITIVE",
            BloodType::BNegative => "B_NEGATIVE",
            BloodType::AbPositive => "AB_POSITIVE",
            BloodType::AbNegative => "AB_NEGATIVE",
            BloodType::OPositive => "O_POSITIVE",
            BloodType::ONegative => "O_NEGATIVE",
        }
    }

    pub fn is_rh_negative(&self) -> bool {
        matches!(
            self,
            BloodType::ANegative | BloodType::BNegative | BloodType::AbNegative | BloodType::ONegative
        )
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            BloodType::APositive => "A+",
            BloodType::ANegative => "A-",
            BloodType::BPositive => "B+",
            BloodType::BNegative => "B-",
            BloodType::AbPositive => "AB+",
            BloodType::AbNegative => "AB-",
            BloodType::OPositive => "O+",
            BloodType::ONegative => "O-",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown blood type: {0}")]
pub struct ParseBloodTypeError(pub String);

impl FromStr for BloodType {
    type Err = ParseBloodTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept the Unicode minus sign that some clients send
        let normalized = s.trim().replace('\u{2212}', "-").to_ascii_uppercase();

        let blood_type = match normalized.as_str() {
            "A+" | "A_POSITIVE" => BloodType::APositive,
            "A-" | "A_NEGATIVE" => BloodType::ANegative,
            "B+" | "B_POSITIVE" => BloodType::BPositive,
            "B-" | "B_NEGATIVE" => BloodType::BNegative,
            "AB+" | "AB_POSITIVE" => BloodType::AbPositive,
            "AB-" | "AB_NEGATIVE" => BloodType::AbNegative,
            "O+" | "O_POSITIVE" => BloodType::OPositive,
            "O-" | "O_NEGATIVE" => BloodType::ONegative,
            _ => return Err(ParseBloodTypeError(s.to_string())),
        };

        Ok(blood_type)
    }
}
