//! Outcome schemas
//!
//! Each deployed classifier was trained on its own feature layout. The layout
//! is described here as data: an [`OutcomeSchema`] is an ordered list of
//! [`FeatureSpec`]s, and a [`SchemaRevision`] pins one schema per outcome
//! together with the location option list the models were trained with.

mod revision;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::observation::{LadderStage, Location, Radiotherapy};

pub use revision::{RevisionId, SchemaRevision};

/// The five independently modeled postoperative complications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Minor,
    Major,
    Ssi,
    ImplantDevice,
    Seroma,
}

impl Outcome {
    /// All outcomes in report order.
    pub const ALL: [Outcome; 5] = [
        Outcome::Minor,
        Outcome::Major,
        Outcome::Ssi,
        Outcome::ImplantDevice,
        Outcome::Seroma,
    ];

    /// Canonical name used in URLs and JSON.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Minor => "minor",
            Self::Major => "major",
            Self::Ssi => "ssi",
            Self::ImplantDevice => "implant-device",
            Self::Seroma => "seroma",
        }
    }

    /// Display label for the result page.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Minor => "Minor",
            Self::Major => "Major",
            Self::Ssi => "SSI",
            Self::ImplantDevice => "Implant/Device",
            Self::Seroma => "Seroma",
        }
    }

    /// Artifact file stem (`minor`, `major`, `ssi`, `id`, `seroma`).
    pub fn artifact_stem(&self) -> &'static str {
        match self {
            Self::ImplantDevice => "id",
            other => other.name(),
        }
    }

    /// Parse an outcome name. Accepts the short artifact stem `id` and a few
    /// spellings of implant-device.
    pub fn from_name(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "minor" => Some(Self::Minor),
            "major" => Some(Self::Major),
            "ssi" => Some(Self::Ssi),
            "implant-device" | "implant_device" | "implant/device" | "id" => {
                Some(Self::ImplantDevice)
            }
            "seroma" => Some(Self::Seroma),
            _ => None,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An observation field that can appear in a schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Location,
    Ladder,
    Bmi,
    TumorLength,
    TumorWidth,
    TumorThickness,
    Radiotherapy,
    LimbSegmentLength,
    LimbSegmentThickness,
}

impl Field {
    /// Feature name as it appears in artifacts.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Location => "location",
            Self::Ladder => "ladder",
            Self::Bmi => "bmi",
            Self::TumorLength => "tl",
            Self::TumorWidth => "tw",
            Self::TumorThickness => "tt",
            Self::Radiotherapy => "nart",
            Self::LimbSegmentLength => "limb_length",
            Self::LimbSegmentThickness => "limb_thickness",
        }
    }

    pub fn is_categorical(&self) -> bool {
        matches!(self, Self::Location | Self::Ladder | Self::Radiotherapy)
    }
}

/// How a field is turned into numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Encoding {
    /// Raw value for continuous fields, option index for categorical ones
    Ordinal,
    /// One slot per option, 1.0 at the selected option
    OneHot,
}

/// One entry in an outcome's feature layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub field: Field,
    pub encoding: Encoding,
}

impl FeatureSpec {
    pub const fn ordinal(field: Field) -> Self {
        Self {
            field,
            encoding: Encoding::Ordinal,
        }
    }

    pub const fn one_hot(field: Field) -> Self {
        Self {
            field,
            encoding: Encoding::OneHot,
        }
    }
}

/// Location option lists the models were trained on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationLevels {
    /// Shoulder, upper arm and elbow share one level
    Folded6,
    /// One level per [`Location`] variant
    Split7,
}

const FOLDED_6: [&str; 6] = [
    "shoulder or upperarm or elbow",
    "forearm or wrist",
    "hand",
    "thigh or knee",
    "lower leg or ankle",
    "foot or toe",
];

impl LocationLevels {
    pub fn levels(&self) -> Vec<&'static str> {
        match self {
            Self::Folded6 => FOLDED_6.to_vec(),
            Self::Split7 => Location::ALL.iter().map(|l| l.option_name()).collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Folded6 => FOLDED_6.len(),
            Self::Split7 => Location::ALL.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve an option label from this list.
    ///
    /// The folded list also accepts the seven-level labels it merges.
    pub fn parse(&self, label: &str) -> Option<Location> {
        let label = label.trim().to_lowercase();
        match self {
            Self::Folded6 if label == FOLDED_6[0] => Some(Location::Shoulder),
            _ => Location::from_option(&label),
        }
    }

    /// Index of a location in this option list.
    pub fn index_of(&self, location: Location) -> Option<usize> {
        let idx = Location::ALL.iter().position(|l| *l == location)?;
        match self {
            Self::Split7 => Some(idx),
            Self::Folded6 => Some(idx.saturating_sub(1)),
        }
    }
}

/// Option list for a categorical field, `None` for continuous ones.
pub(crate) fn categorical_levels(field: Field, locations: LocationLevels) -> Option<Vec<&'static str>> {
    match field {
        Field::Location => Some(locations.levels()),
        Field::Ladder => Some(LadderStage::ALL.iter().map(|s| s.option_name()).collect()),
        Field::Radiotherapy => Some(Radiotherapy::ALL.iter().map(|r| r.option_name()).collect()),
        _ => None,
    }
}

/// An outcome's ordered feature layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OutcomeSchema {
    pub outcome: Outcome,
    pub features: &'static [FeatureSpec],
}

impl OutcomeSchema {
    /// Number of numeric slots this schema produces.
    pub fn width(&self, locations: LocationLevels) -> usize {
        self.features
            .iter()
            .map(|spec| spec_width(spec, locations))
            .sum()
    }

    /// Expanded feature names, one per numeric slot.
    ///
    /// One-hot slots are named `field=option`, e.g. `ladder=free flap`.
    pub fn feature_names(&self, locations: LocationLevels) -> Vec<String> {
        let mut names = Vec::with_capacity(self.width(locations));
        for spec in self.features {
            match (spec.encoding, categorical_levels(spec.field, locations)) {
                (Encoding::OneHot, Some(levels)) => {
                    names.extend(levels.iter().map(|l| format!("{}={}", spec.field.name(), l)));
                }
                _ => names.push(spec.field.name().to_string()),
            }
        }
        names
    }

    /// Slot offset of a field within the encoded vector, with its width.
    pub fn slot_of(&self, field: Field, locations: LocationLevels) -> Option<(usize, usize)> {
        let mut offset = 0;
        for spec in self.features {
            let width = spec_width(spec, locations);
            if spec.field == field {
                return Some((offset, width));
            }
            offset += width;
        }
        None
    }

    /// Encoding used for a field, if it participates.
    pub fn encoding_of(&self, field: Field) -> Option<Encoding> {
        self.features
            .iter()
            .find(|spec| spec.field == field)
            .map(|spec| spec.encoding)
    }
}

fn spec_width(spec: &FeatureSpec, locations: LocationLevels) -> usize {
    match (spec.encoding, categorical_levels(spec.field, locations)) {
        (Encoding::OneHot, Some(levels)) => levels.len(),
        _ => 1,
    }
}
