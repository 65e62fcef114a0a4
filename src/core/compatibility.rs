use crate::models::BloodType::{self, *};

/// How well a donor type suits a recipient type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompatibilityLevel {
    /// Same type
    Perfect,
    /// Different type, safe to transfuse
    Compatible,
    Incompatible,
}

const FOR_A_POSITIVE: &[BloodType] = &[APositive, ANegative, OPositive, ONegative];
const FOR_A_NEGATIVE: &[BloodType] = &[ANegative, ONegative];
const FOR_B_POSITIVE: &[BloodType] = &[BPositive, BNegative, OPositive, ONegative];
const FOR_B_NEGATIVE: &[BloodType] = &[BNegative, ONegative];
const FOR_AB_POSITIVE: &[BloodType] = &[
    APositive, ANegative, BPositive, BNegative, AbPositive, AbNegative, OPositive, ONegative,
];
const FOR_AB_NEGATIVE: &[BloodType] = &[AbNegative, ANegative, BNegative, ONegative];
const FOR_O_POSITIVE: &[BloodType] = &[OPositive, ONegative];
const FOR_O_NEGATIVE: &[BloodType] = &[ONegative];

/// Donor types that can safely supply a recipient of `required`
///
/// Hand-authored ABO/Rh table: O- gives to everyone, AB+ receives from everyone.
pub fn admissible_donor_types(required: BloodType) -> &'static [BloodType] {
    match required {
        APositive => FOR_A_POSITIVE,
        ANegative => FOR_A_NEGATIVE,
        BPositive => FOR_B_POSITIVE,
        BNegative => FOR_B_NEGATIVE,
        AbPositive => FOR_AB_POSITIVE,
        AbNegative => FOR_AB_NEGATIVE,
        OPositive => FOR_O_POSITIVE,
        ONegative => FOR_O_NEGATIVE,
    }
}

#[inline]
pub fn is_admissible(donor: BloodType, recipient: BloodType) -> bool {
    admissible_donor_types(recipient).contains(&donor)
}

/// Recipient types a donor of `donor` can give to (inverse of the table above)
pub fn compatible_recipients(donor: BloodType) -> Vec<BloodType> {
    BloodType::ALL
        .into_iter()
        .filter(|recipient| is_admissible(donor, *recipient))
        .collect()
}

pub fn compatibility_level(donor: BloodType, recipient: BloodType) -> CompatibilityLevel {
    if donor == recipient {
        CompatibilityLevel::Perfect
    } else if is_admissible(donor, recipient) {
        CompatibilityLevel::Compatible
    } else {
        CompatibilityLevel::Incompatible
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_admits_itself_and_o_negative() {
        for recipient in BloodType::ALL {
            let admissible = admissible_donor_types(recipient);
            assert!(admissible.contains(&recipient), "{} must admit itself", recipient);
            assert!(admissible.contains(&ONegative), "{} must admit O-", recipient);
        }
    }

    #[test]
    fn test_universal_recipient_and_donor() {
        assert_eq!(admissible_donor_types(AbPositive).len(), 8);
        assert_eq!(compatible_recipients(ONegative).len(), 8);
        assert_eq!(admissible_donor_types(ONegative), &[ONegative]);
        assert_eq!(compatible_recipients(AbPositive), vec![AbPositive]);
    }

    #[test]
    fn test_rh_positive_never_supplies_rh_negative() {
        for recipient in BloodType::ALL.into_iter().filter(|t| t.is_rh_negative()) {
            for donor in admissible_donor_types(recipient) {
                assert!(donor.is_rh_negative(), "{} cannot give to {}", donor, recipient);
            }
        }
    }

    #[test]
    fn test_known_pairs() {
        assert!(is_admissible(OPositive, APositive));
        assert!(!is_admissible(BPositive, APositive));
        assert!(!is_admissible(ANegative, BNegative));
        assert!(is_admissible(BNegative, AbNegative));
        assert!(!is_admissible(AbNegative, ANegative));
    }

    #[test]
    fn test_compatibility_level() {
        assert_eq!(compatibility_level(APositive, APositive), CompatibilityLevel::Perfect);
        assert_eq!(compatibility_level(ONegative, APositive), CompatibilityLevel::Compatible);
        assert_eq!(compatibility_level(BPositive, APositive), CompatibilityLevel::Incompatible);
    }
}
