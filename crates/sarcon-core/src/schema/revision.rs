//! Pinned schema revisions
//!
//! Model artifacts were exported from several training iterations that
//! disagree on field order, location levels, and encoding. Each iteration is
//! a named revision here; an artifact declares the revision it was trained
//! for and is only ever fed vectors built from that revision's table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{FeatureSpec, Field, LocationLevels, Outcome, OutcomeSchema};
use crate::error::SchemaError;

use Field::*;

/// Identifier of a pinned revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum RevisionId {
    /// Six location levels, every field ordinal
    #[serde(rename = "v2-ordinal")]
    V2Ordinal,
    /// Seven location levels, every field ordinal
    #[serde(rename = "v3-ordinal")]
    V3Ordinal,
    /// Seven location levels, categorical fields one-hot
    #[default]
    #[serde(rename = "v3-onehot")]
    V3OneHot,
}

impl RevisionId {
    pub const ALL: [RevisionId; 3] = [
        RevisionId::V2Ordinal,
        RevisionId::V3Ordinal,
        RevisionId::V3OneHot,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::V2Ordinal => "v2-ordinal",
            Self::V3Ordinal => "v3-ordinal",
            Self::V3OneHot => "v3-onehot",
        }
    }

    /// The pinned table for this revision.
    pub fn revision(&self) -> &'static SchemaRevision {
        match self {
            Self::V2Ordinal => &V2_ORDINAL,
            Self::V3Ordinal => &V3_ORDINAL,
            Self::V3OneHot => &V3_ONEHOT,
        }
    }
}

impl fmt::Display for RevisionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RevisionId {
    type Err = SchemaError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|id| id.name() == s)
            .ok_or(SchemaError::UnknownRevision(s))
    }
}

/// One schema per outcome, plus the location levels they share.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaRevision {
    pub id: RevisionId,
    pub locations: LocationLevels,
    schemas: [OutcomeSchema; 5],
}

impl SchemaRevision {
    /// Schema for an outcome.
    pub fn schema(&self, outcome: Outcome) -> &OutcomeSchema {
        // Tables are laid out in Outcome::ALL order.
        &self.schemas[outcome as usize]
    }

    /// Schema for an outcome name; unknown names are a schema mismatch.
    pub fn schema_by_name(&self, name: &str) -> Result<&OutcomeSchema, SchemaError> {
        Outcome::from_name(name)
            .map(|outcome| self.schema(outcome))
            .ok_or_else(|| {
                SchemaError::SchemaMismatch(format!(
                    "no {} schema for outcome '{}'",
                    self.id, name
                ))
            })
    }

    /// Encoded vector width for an outcome.
    pub fn width(&self, outcome: Outcome) -> usize {
        self.schema(outcome).width(self.locations)
    }

    /// Expanded feature names for an outcome.
    pub fn feature_names(&self, outcome: Outcome) -> Vec<String> {
        self.schema(outcome).feature_names(self.locations)
    }

    pub fn schemas(&self) -> impl Iterator<Item = &OutcomeSchema> {
        self.schemas.iter()
    }
}

const fn o(field: Field) -> FeatureSpec {
    FeatureSpec::ordinal(field)
}

const fn h(field: Field) -> FeatureSpec {
    FeatureSpec::one_hot(field)
}

// Ordinal layouts

const V2_MINOR: &[FeatureSpec] = &[
    o(Ladder),
    o(Location),
    o(Bmi),
    o(TumorThickness),
    o(TumorWidth),
    o(TumorLength),
    o(Radiotherapy),
];
const V3_MINOR: &[FeatureSpec] = &[
    o(Ladder),
    o(Bmi),
    o(Location),
    o(TumorThickness),
    o(TumorWidth),
    o(TumorLength),
    o(Radiotherapy),
];
const ORD_MAJOR: &[FeatureSpec] = &[
    o(Ladder),
    o(Location),
    o(TumorLength),
    o(Bmi),
    o(Radiotherapy),
    o(TumorWidth),
];
const ORD_SSI: &[FeatureSpec] = &[
    o(Ladder),
    o(Location),
    o(TumorLength),
    o(Radiotherapy),
    o(LimbSegmentLength),
    o(Bmi),
    o(LimbSegmentThickness),
];
const ORD_IMPLANT_DEVICE: &[FeatureSpec] = &[
    o(LimbSegmentThickness),
    o(Ladder),
    o(Location),
    o(Radiotherapy),
    o(TumorLength),
];
const ORD_SEROMA: &[FeatureSpec] = &[
    o(Ladder),
    o(Location),
    o(Bmi),
    o(TumorLength),
    o(TumorWidth),
];

// One-hot layouts

const OH_MINOR: &[FeatureSpec] = &[
    h(Ladder),
    h(Location),
    o(Bmi),
    o(TumorThickness),
    o(TumorWidth),
    o(TumorLength),
    h(Radiotherapy),
];
const OH_MAJOR: &[FeatureSpec] = &[
    h(Ladder),
    h(Location),
    o(TumorLength),
    o(Bmi),
    h(Radiotherapy),
    o(TumorWidth),
];
const OH_SSI: &[FeatureSpec] = &[
    h(Ladder),
    h(Location),
    o(TumorLength),
    h(Radiotherapy),
    o(LimbSegmentLength),
    o(Bmi),
    o(LimbSegmentThickness),
];
const OH_IMPLANT_DEVICE: &[FeatureSpec] = &[
    o(LimbSegmentThickness),
    h(Ladder),
    h(Location),
    h(Radiotherapy),
    o(TumorLength),
];
const OH_SEROMA: &[FeatureSpec] = &[
    h(Ladder),
    h(Location),
    o(Bmi),
    o(TumorLength),
    o(TumorWidth),
];

const fn table(features: [&'static [FeatureSpec]; 5]) -> [OutcomeSchema; 5] {
    [
        OutcomeSchema {
            outcome: Outcome::Minor,
            features: features[0],
        },
        OutcomeSchema {
            outcome: Outcome::Major,
            features: features[1],
        },
        OutcomeSchema {
            outcome: Outcome::Ssi,
            features: features[2],
        },
        OutcomeSchema {
            outcome: Outcome::ImplantDevice,
            features: features[3],
        },
        OutcomeSchema {
            outcome: Outcome::Seroma,
            features: features[4],
        },
    ]
}

static V2_ORDINAL: SchemaRevision = SchemaRevision {
    id: RevisionId::V2Ordinal,
    locations: LocationLevels::Folded6,
    schemas: table([V2_MINOR, ORD_MAJOR, ORD_SSI, ORD_IMPLANT_DEVICE, ORD_SEROMA]),
};

static V3_ORDINAL: SchemaRevision = SchemaRevision {
    id: RevisionId::V3Ordinal,
    locations: LocationLevels::Split7,
    schemas: table([V3_MINOR, ORD_MAJOR, ORD_SSI, ORD_IMPLANT_DEVICE, ORD_SEROMA]),
};

static V3_ONEHOT: SchemaRevision = SchemaRevision {
    id: RevisionId::V3OneHot,
    locations: LocationLevels::Split7,
    schemas: table([OH_MINOR, OH_MAJOR, OH_SSI, OH_IMPLANT_DEVICE, OH_SEROMA]),
};
