//! Feature encoder
//!
//! Turns one [`ClinicalObservation`] into the numeric vector a given
//! outcome's classifier expects, following the pinned [`SchemaRevision`].

use crate::error::SchemaError;
use crate::observation::{ClinicalObservation, LadderStage, Radiotherapy};
use crate::schema::{
    categorical_levels, Encoding, FeatureSpec, Field, LocationLevels, Outcome, OutcomeSchema,
    RevisionId, SchemaRevision,
};

/// Encoder bound to one schema revision.
#[derive(Debug, Clone, Copy)]
pub struct FeatureEncoder {
    revision: &'static SchemaRevision,
}

impl FeatureEncoder {
    pub fn new(revision: RevisionId) -> Self {
        Self {
            revision: revision.revision(),
        }
    }

    pub fn revision(&self) -> &'static SchemaRevision {
        self.revision
    }

    /// Encode for an outcome given by name.
    ///
    /// Fails with [`SchemaError::SchemaMismatch`] for a name outside the
    /// closed outcome set.
    pub fn encode(
        &self,
        observation: &ClinicalObservation,
        outcome: &str,
    ) -> Result<Vec<f64>, SchemaError> {
        let schema = self.revision.schema_by_name(outcome)?;
        encode_schema(observation, schema, self.revision.locations)
    }

    /// Encode for a known outcome.
    pub fn encode_outcome(
        &self,
        observation: &ClinicalObservation,
        outcome: Outcome,
    ) -> Result<Vec<f64>, SchemaError> {
        encode_schema(
            observation,
            self.revision.schema(outcome),
            self.revision.locations,
        )
    }

    /// Read a categorical field back out of an encoded vector.
    ///
    /// Returns the option label the slot (ordinal index or one-hot block)
    /// points at, or `None` if the field does not participate, is continuous,
    /// or the slot does not hold a valid encoding.
    pub fn decode_categorical(
        &self,
        vector: &[f64],
        outcome: Outcome,
        field: Field,
    ) -> Option<&'static str> {
        let locations = self.revision.locations;
        let schema = self.revision.schema(outcome);
        let levels = categorical_levels(field, locations)?;
        let (offset, width) = schema.slot_of(field, locations)?;
        let slot = vector.get(offset..offset + width)?;

        let index = match schema.encoding_of(field)? {
            Encoding::Ordinal => {
                let value = slot[0];
                if value < 0.0 || value.fract() != 0.0 {
                    return None;
                }
                value as usize
            }
            Encoding::OneHot => {
                let hot: Vec<usize> = slot
                    .iter()
                    .enumerate()
                    .filter(|(_, v)| **v == 1.0)
                    .map(|(i, _)| i)
                    .collect();
                let cold = slot.iter().filter(|v| **v == 0.0).count();
                if hot.len() != 1 || cold != width - 1 {
                    return None;
                }
                hot[0]
            }
        };
        levels.get(index).copied()
    }
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self::new(RevisionId::default())
    }
}

/// Encode an observation against one schema.
pub fn encode_schema(
    observation: &ClinicalObservation,
    schema: &OutcomeSchema,
    locations: LocationLevels,
) -> Result<Vec<f64>, SchemaError> {
    let mut vector = Vec::with_capacity(schema.width(locations));
    for spec in schema.features {
        push_feature(&mut vector, observation, spec, locations)?;
    }
    tracing::debug!(
        outcome = %schema.outcome,
        width = vector.len(),
        "Encoded feature vector"
    );
    Ok(vector)
}

/// What one field contributes before encoding.
enum Slot {
    Value(f64),
    Level { index: usize, len: usize },
}

fn push_feature(
    vector: &mut Vec<f64>,
    observation: &ClinicalObservation,
    spec: &FeatureSpec,
    locations: LocationLevels,
) -> Result<(), SchemaError> {
    let dims = observation.dimensions();
    let slot = match spec.field {
        Field::Bmi => Slot::Value(observation.bmi()),
        Field::TumorLength => Slot::Value(dims.tumor_length),
        Field::TumorWidth => Slot::Value(dims.tumor_width),
        Field::TumorThickness => Slot::Value(dims.tumor_thickness),
        Field::LimbSegmentLength => Slot::Value(dims.limb_segment_length),
        Field::LimbSegmentThickness => Slot::Value(dims.limb_segment_thickness),
        Field::Location => {
            let index = locations.index_of(observation.location()).ok_or_else(|| {
                SchemaError::SchemaMismatch(format!(
                    "location '{}' has no level in {:?}",
                    observation.location(), locations
                ))
            })?;
            Slot::Level {
                index,
                len: locations.len(),
            }
        }
        Field::Ladder => Slot::Level {
            index: observation.ladder().index(),
            len: LadderStage::ALL.len(),
        },
        Field::Radiotherapy => Slot::Level {
            index: observation.radiotherapy().index(),
            len: Radiotherapy::ALL.len(),
        },
    };

    match (slot, spec.encoding) {
        (Slot::Value(value), _) => vector.push(value),
        (Slot::Level { index, .. }, Encoding::Ordinal) => vector.push(index as f64),
        (Slot::Level { index, len }, Encoding::OneHot) => {
            vector.extend((0..len).map(|i| if i == index { 1.0 } else { 0.0 }))
        }
    }
    Ok(())
}
