//! Bounded 0–10 scales recorded in the journal.
//!
//! Each scale is its own type: a [`StressLevel`] can never be passed where a
//! [`MoodLevel`] is expected, even though both wrap the same range.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{TrackerError, ValidationError};

/// Lowest value accepted by every scale.
pub const SCALE_MIN: u8 = 0;
/// Highest value accepted by every scale.
pub const SCALE_MAX: u8 = 10;

macro_rules! define_scale {
    ($(#[doc = $doc:expr])* $name:ident, $field:literal) => {
        $(#[doc = $doc])*
        #[derive(
            Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(try_from = "i64", into = "u8")]
        pub struct $name(u8);

        impl $name {
            /// Validate `raw` into this scale.
            ///
            /// # Errors
            ///
            /// Returns [`TrackerError::Validation`] when `raw` is outside `0..=10`.
            pub fn new(raw: i64) -> Result<Self, TrackerError> {
                match u8::try_from(raw) {
                    Ok(value) if value <= SCALE_MAX => Ok(Self(value)),
                    _ => Err(ValidationError::new(
                        $field,
                        format!("must be between {SCALE_MIN} and {SCALE_MAX}, got {raw}"),
                    )
                    .into()),
                }
            }

            /// The raw integer on the scale.
            #[must_use]
            pub fn value(self) -> u8 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = TrackerError;

            fn try_from(raw: i64) -> Result<Self, Self::Error> {
                Self::new(raw)
            }
        }

        impl From<$name> for u8 {
            fn from(level: $name) -> Self {
                level.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

define_scale!(
    /// Perceived stress, recorded before and after a task.
    StressLevel,
    "stress_level"
);

define_scale!(
    /// Energy felt during the day.
    EnergyLevel,
    "energy_level"
);

define_scale!(
    /// Overall mood.
    MoodLevel,
    "mood_level"
);

define_scale!(
    /// Self-rated quality of a night's sleep.
    SleepQuality,
    "sleep_quality"
);

define_scale!(
    /// How sleepy one felt during the following day.
    DaytimeSleepiness,
    "daytime_sleepiness"
);

impl StressLevel {
    #[must_use]
    pub fn is_high(self) -> bool {
        self.0 >= 7
    }
}

impl EnergyLevel {
    #[must_use]
    pub fn is_low(self) -> bool {
        self.0 <= 3
    }
}

impl MoodLevel {
    #[must_use]
    pub fn is_positive(self) -> bool {
        self.0 >= 6
    }
}

impl SleepQuality {
    #[must_use]
    pub fn is_good(self) -> bool {
        self.0 >= 7
    }
}

impl DaytimeSleepiness {
    #[must_use]
    pub fn is_high(self) -> bool {
        self.0 >= 7
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn should_accept_exactly_zero_through_ten() {
        for raw in -50..=50 {
            let accepted = StressLevel::new(raw).is_ok();
            assert_eq!(accepted, (0..=10).contains(&raw), "raw = {raw}");
        }
    }

    #[test]
    fn should_reject_extreme_values() {
        assert!(MoodLevel::new(i64::MIN).is_err());
        assert!(MoodLevel::new(i64::MAX).is_err());
        assert!(MoodLevel::new(256).is_err());
    }

    #[test]
    fn should_report_scale_field_when_out_of_range() {
        let err = SleepQuality::new(11).unwrap_err();
        match err {
            TrackerError::Validation(ValidationError { field, .. }) => {
                assert_eq!(field, "sleep_quality");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn should_expose_raw_value_and_display() {
        let level = EnergyLevel::new(4).unwrap();
        assert_eq!(level.value(), 4);
        assert_eq!(level.to_string(), "4");
    }

    #[test]
    fn should_flag_high_stress_from_seven() {
        assert!(!StressLevel::new(6).unwrap().is_high());
        assert!(StressLevel::new(7).unwrap().is_high());
    }

    #[test]
    fn should_flag_low_energy_up_to_three() {
        assert!(EnergyLevel::new(3).unwrap().is_low());
        assert!(!EnergyLevel::new(4).unwrap().is_low());
    }

    #[test]
    fn should_flag_positive_mood_from_six() {
        assert!(!MoodLevel::new(5).unwrap().is_positive());
        assert!(MoodLevel::new(6).unwrap().is_positive());
    }

    #[test]
    fn should_flag_good_sleep_quality_from_seven() {
        assert!(!SleepQuality::new(6).unwrap().is_good());
        assert!(SleepQuality::new(7).unwrap().is_good());
    }

    #[test]
    fn should_flag_high_daytime_sleepiness_from_seven() {
        assert!(DaytimeSleepiness::new(10).unwrap().is_high());
        assert!(!DaytimeSleepiness::new(0).unwrap().is_high());
    }

    #[test]
    fn should_default_to_zero() {
        assert_eq!(StressLevel::default().value(), 0);
    }

    #[test]
    fn should_revalidate_when_deserializing() {
        let level: MoodLevel = serde_json::from_str("8").unwrap();
        assert_eq!(level.value(), 8);
        assert_eq!(serde_json::to_string(&level).unwrap(), "8");
        assert!(serde_json::from_str::<MoodLevel>("11").is_err());
        assert!(serde_json::from_str::<MoodLevel>("-1").is_err());
    }
}
