//! Clinical observation types and boundary validation.
//!
//! A [`ClinicalObservation`] holds the nine values entered in the form. Build
//! it through [`ClinicalObservation::new`] or
//! [`ObservationInput::into_observation`]; both reject out-of-range numbers
//! and the encoder does not re-check them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::InputError;
use crate::schema::LocationLevels;

/// Lowest accepted body-mass index
pub const BMI_MIN: f64 = 10.0;
/// Highest accepted body-mass index
pub const BMI_MAX: f64 = 50.0;

/// Anatomic site of the soft-tissue sarcoma resection.
///
/// Variants follow the seven-level list. Schema revisions with fewer levels
/// fold some of these together, see [`crate::schema::LocationLevels`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Location {
    #[serde(rename = "shoulder")]
    Shoulder,
    #[serde(rename = "upperarm or elbow")]
    UpperarmOrElbow,
    #[serde(rename = "forearm or wrist")]
    ForearmOrWrist,
    #[serde(rename = "hand")]
    Hand,
    #[serde(rename = "thigh or knee")]
    ThighOrKnee,
    #[serde(rename = "lower leg or ankle")]
    LowerLegOrAnkle,
    #[serde(rename = "foot or toe")]
    FootOrToe,
}

impl Location {
    /// All locations in form order.
    pub const ALL: [Location; 7] = [
        Location::Shoulder,
        Location::UpperarmOrElbow,
        Location::ForearmOrWrist,
        Location::Hand,
        Location::ThighOrKnee,
        Location::LowerLegOrAnkle,
        Location::FootOrToe,
    ];

    /// Option label shown in the form.
    pub fn option_name(&self) -> &'static str {
        match self {
            Self::Shoulder => "shoulder",
            Self::UpperarmOrElbow => "upperarm or elbow",
            Self::ForearmOrWrist => "forearm or wrist",
            Self::Hand => "hand",
            Self::ThighOrKnee => "thigh or knee",
            Self::LowerLegOrAnkle => "lower leg or ankle",
            Self::FootOrToe => "foot or toe",
        }
    }

    /// Parse from an option label (case and surrounding whitespace ignored).
    pub fn from_option(input: &str) -> Option<Self> {
        let input = input.trim().to_lowercase();
        Self::ALL.into_iter().find(|l| l.option_name() == input)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_name())
    }
}

/// Reconstructive ladder stage, simplest to most complex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum LadderStage {
    #[serde(rename = "primary closure")]
    PrimaryClosure,
    #[serde(rename = "complex repair")]
    ComplexRepair,
    #[serde(rename = "sg")]
    SkinGraft,
    #[serde(rename = "local flap")]
    LocalFlap,
    #[serde(rename = "pedicled flap")]
    PedicledFlap,
    #[serde(rename = "free flap")]
    FreeFlap,
}

impl LadderStage {
    /// All stages in ladder order.
    pub const ALL: [LadderStage; 6] = [
        LadderStage::PrimaryClosure,
        LadderStage::ComplexRepair,
        LadderStage::SkinGraft,
        LadderStage::LocalFlap,
        LadderStage::PedicledFlap,
        LadderStage::FreeFlap,
    ];

    pub fn option_name(&self) -> &'static str {
        match self {
            Self::PrimaryClosure => "primary closure",
            Self::ComplexRepair => "complex repair",
            Self::SkinGraft => "sg",
            Self::LocalFlap => "local flap",
            Self::PedicledFlap => "pedicled flap",
            Self::FreeFlap => "free flap",
        }
    }

    /// Position on the ladder (0 = primary closure).
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Parse from an option label. `skin graft` is accepted for `sg`.
    pub fn from_option(input: &str) -> Option<Self> {
        let input = input.trim().to_lowercase();
        if input == "skin graft" {
            return Some(Self::SkinGraft);
        }
        Self::ALL.into_iter().find(|s| s.option_name() == input)
    }
}

impl fmt::Display for LadderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_name())
    }
}

/// Neoadjuvant radiotherapy flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Radiotherapy {
    #[default]
    No,
    Yes,
}

impl Radiotherapy {
    pub const ALL: [Radiotherapy; 2] = [Radiotherapy::No, Radiotherapy::Yes];

    pub fn option_name(&self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Yes => "yes",
        }
    }

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn from_option(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "no" | "false" => Some(Self::No),
            "yes" | "true" => Some(Self::Yes),
            _ => None,
        }
    }
}

impl From<bool> for Radiotherapy {
    fn from(value: bool) -> Self {
        if value {
            Self::Yes
        } else {
            Self::No
        }
    }
}

impl fmt::Display for Radiotherapy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.option_name())
    }
}

/// The nine values from one form submission.
///
/// Fields are private so every instance has passed [`ClinicalObservation::validate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ClinicalObservation {
    location: Location,
    ladder: LadderStage,
    bmi: f64,
    /// Craniocaudal, cm
    tumor_length: f64,
    /// Mediolateral, cm
    tumor_width: f64,
    /// Anteroposterior, cm
    tumor_thickness: f64,
    radiotherapy: Radiotherapy,
    /// Craniocaudal, cm
    limb_segment_length: f64,
    /// Anteroposterior, cm
    limb_segment_thickness: f64,
}

/// Dimensions in cm, in the order the form asks for them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Dimensions {
    pub tumor_length: f64,
    pub tumor_width: f64,
    pub tumor_thickness: f64,
    pub limb_segment_length: f64,
    pub limb_segment_thickness: f64,
}

impl ClinicalObservation {
    /// Build a validated observation.
    pub fn new(
        location: Location,
        ladder: LadderStage,
        bmi: f64,
        dims: Dimensions,
        radiotherapy: Radiotherapy,
    ) -> Result<Self, InputError> {
        let observation = Self {
            location,
            ladder,
            bmi,
            tumor_length: dims.tumor_length,
            tumor_width: dims.tumor_width,
            tumor_thickness: dims.tumor_thickness,
            radiotherapy,
            limb_segment_length: dims.limb_segment_length,
            limb_segment_thickness: dims.limb_segment_thickness,
        };
        observation.validate()?;
        Ok(observation)
    }

    pub fn location(&self) -> Location {
        self.location
    }

    pub fn ladder(&self) -> LadderStage {
        self.ladder
    }

    pub fn bmi(&self) -> f64 {
        self.bmi
    }

    pub fn radiotherapy(&self) -> Radiotherapy {
        self.radiotherapy
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            tumor_length: self.tumor_length,
            tumor_width: self.tumor_width,
            tumor_thickness: self.tumor_thickness,
            limb_segment_length: self.limb_segment_length,
            limb_segment_thickness: self.limb_segment_thickness,
        }
    }

    /// Check numeric ranges: BMI in [10, 50], everything else finite and >= 0.
    pub fn validate(&self) -> Result<(), InputError> {
        check_range("bmi", self.bmi, BMI_MIN, BMI_MAX)?;
        for (field, value) in [
            ("tumor_length", self.tumor_length),
            ("tumor_width", self.tumor_width),
            ("tumor_thickness", self.tumor_thickness),
            ("limb_segment_length", self.limb_segment_length),
            ("limb_segment_thickness", self.limb_segment_thickness),
        ] {
            if !value.is_finite() {
                return Err(InputError::NotFinite { field });
            }
            if value < 0.0 {
                return Err(InputError::Negative { field, value });
            }
        }
        Ok(())
    }
}

fn check_range(field: &'static str, value: f64, min: f64, max: f64) -> Result<(), InputError> {
    if !value.is_finite() {
        return Err(InputError::NotFinite { field });
    }
    if value < min || value > max {
        return Err(InputError::OutOfRange {
            field,
            min,
            max,
            value,
        });
    }
    Ok(())
}

/// Raw form or JSON submission, categorical fields still as option labels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObservationInput {
    pub location: String,
    pub ladder: String,
    pub bmi: f64,
    pub tumor_length: f64,
    pub tumor_width: f64,
    pub tumor_thickness: f64,
    #[serde(default = "default_radiotherapy")]
    pub radiotherapy: String,
    pub limb_segment_length: f64,
    pub limb_segment_thickness: f64,
}

fn default_radiotherapy() -> String {
    Radiotherapy::No.option_name().to_string()
}

impl ObservationInput {
    /// Resolve option labels against the seven-level location list and
    /// validate ranges.
    pub fn into_observation(self) -> Result<ClinicalObservation, InputError> {
        self.into_observation_for(LocationLevels::Split7)
    }

    /// Resolve option labels against a revision's location list and validate
    /// ranges.
    pub fn into_observation_for(
        self,
        locations: LocationLevels,
    ) -> Result<ClinicalObservation, InputError> {
        let location = locations
            .parse(&self.location)
            .ok_or_else(|| InputError::UnknownOption {
                field: "location",
                value: self.location.clone(),
            })?;
        let ladder =
            LadderStage::from_option(&self.ladder).ok_or_else(|| InputError::UnknownOption {
                field: "ladder",
                value: self.ladder.clone(),
            })?;
        let radiotherapy = Radiotherapy::from_option(&self.radiotherapy).ok_or_else(|| {
            InputError::UnknownOption {
                field: "radiotherapy",
                value: self.radiotherapy.clone(),
            }
        })?;

        ClinicalObservation::new(
            location,
            ladder,
            self.bmi,
            Dimensions {
                tumor_length: self.tumor_length,
                tumor_width: self.tumor_width,
                tumor_thickness: self.tumor_thickness,
                limb_segment_length: self.limb_segment_length,
                limb_segment_thickness: self.limb_segment_thickness,
            },
            radiotherapy,
        )
    }
}
