//! Feature encoding integration tests

use rstest::rstest;
use sarcon_core::{
    ClinicalObservation, Dimensions, FeatureEncoder, Field, LadderStage, Location, ObservationInput,
    Outcome, Radiotherapy, RevisionId, SchemaError,
};

fn observation(location: Location, ladder: LadderStage, nart: Radiotherapy) -> ClinicalObservation {
    ClinicalObservation::new(
        location,
        ladder,
        24.5,
        Dimensions {
            tumor_length: 3.0,
            tumor_width: 2.0,
            tumor_thickness: 1.5,
            limb_segment_length: 10.0,
            limb_segment_thickness: 4.0,
        },
        nart,
    )
    .unwrap()
}

fn hand_local_flap() -> ClinicalObservation {
    observation(Location::Hand, LadderStage::LocalFlap, Radiotherapy::No)
}

// === Scenarios ===

#[test]
fn test_minor_ordinal_scenario() {
    let encoder = FeatureEncoder::new(RevisionId::V2Ordinal);
    let vector = encoder.encode(&hand_local_flap(), "minor").unwrap();
    assert_eq!(vector, vec![3.0, 2.0, 24.5, 1.5, 2.0, 3.0, 0.0]);
}

#[test]
fn test_minor_one_hot_scenario() {
    let encoder = FeatureEncoder::new(RevisionId::V3OneHot);
    let vector = encoder.encode(&hand_local_flap(), "minor").unwrap();
    assert_eq!(vector.len(), 19);

    // ladder one-hot(6): local flap is index 3
    assert_eq!(&vector[0..6], &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0]);
    // location one-hot(7): hand is index 3
    assert_eq!(&vector[6..13], &[0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0]);
    assert_eq!(&vector[13..17], &[24.5, 1.5, 2.0, 3.0]);
    // nart one-hot(2): no
    assert_eq!(&vector[17..19], &[1.0, 0.0]);
}

#[test]
fn test_unknown_outcome_is_schema_mismatch() {
    for id in RevisionId::ALL {
        let encoder = FeatureEncoder::new(id);
        let err = encoder.encode(&hand_local_flap(), "unknown").unwrap_err();
        assert!(matches!(err, SchemaError::SchemaMismatch(_)));
    }
}

#[test]
fn test_seroma_v2_ordinal() {
    let encoder = FeatureEncoder::new(RevisionId::V2Ordinal);
    let obs = observation(Location::Shoulder, LadderStage::FreeFlap, Radiotherapy::Yes);
    assert_eq!(
        encoder.encode(&obs, "seroma").unwrap(),
        vec![5.0, 0.0, 24.5, 3.0, 2.0]
    );
}

#[test]
fn test_major_v3_onehot_with_radiotherapy() {
    let encoder = FeatureEncoder::new(RevisionId::V3OneHot);
    let obs = observation(Location::FootOrToe, LadderStage::PrimaryClosure, Radiotherapy::Yes);
    let vector = encoder.encode(&obs, "major").unwrap();
    assert_eq!(vector.len(), 18);
    assert_eq!(vector[0], 1.0);
    assert_eq!(vector[12], 1.0);
    // tl, bmi
    assert_eq!(&vector[13..15], &[3.0, 24.5]);
    // nart one-hot: yes
    assert_eq!(&vector[15..17], &[0.0, 1.0]);
    // tw
    assert_eq!(vector[17], 2.0);
}

// === Width invariant ===

#[rstest]
fn test_width_matches_schema(
    #[values(RevisionId::V2Ordinal, RevisionId::V3Ordinal, RevisionId::V3OneHot)] id: RevisionId,
    #[values(Location::Shoulder, Location::UpperarmOrElbow, Location::Hand, Location::FootOrToe)]
    location: Location,
    #[values(LadderStage::PrimaryClosure, LadderStage::SkinGraft, LadderStage::FreeFlap)]
    ladder: LadderStage,
    #[values(Radiotherapy::No, Radiotherapy::Yes)] nart: Radiotherapy,
) {
    let encoder = FeatureEncoder::new(id);
    let obs = observation(location, ladder, nart);
    for outcome in Outcome::ALL {
        let vector = encoder.encode_outcome(&obs, outcome).unwrap();
        assert_eq!(vector.len(), encoder.revision().width(outcome));
        assert_eq!(vector.len(), encoder.revision().feature_names(outcome).len());
    }
}

#[rstest]
#[case(RevisionId::V2Ordinal, [7, 6, 7, 5, 5])]
#[case(RevisionId::V3Ordinal, [7, 6, 7, 5, 5])]
#[case(RevisionId::V3OneHot, [19, 18, 19, 17, 16])]
fn test_declared_widths(#[case] id: RevisionId, #[case] widths: [usize; 5]) {
    let revision = id.revision();
    for (outcome, width) in Outcome::ALL.into_iter().zip(widths) {
        assert_eq!(revision.width(outcome), width, "{} {}", id, outcome);
    }
}

// === Categorical round trip ===

#[rstest]
fn test_ladder_round_trip(
    #[values(RevisionId::V2Ordinal, RevisionId::V3Ordinal, RevisionId::V3OneHot)] id: RevisionId,
) {
    let encoder = FeatureEncoder::new(id);
    for ladder in LadderStage::ALL {
        let obs = observation(Location::ThighOrKnee, ladder, Radiotherapy::No);
        for outcome in Outcome::ALL {
            let vector = encoder.encode_outcome(&obs, outcome).unwrap();
            assert_eq!(
                encoder.decode_categorical(&vector, outcome, Field::Ladder),
                Some(ladder.option_name())
            );
        }
    }
}

#[rstest]
fn test_radiotherapy_round_trip(
    #[values(RevisionId::V2Ordinal, RevisionId::V3Ordinal, RevisionId::V3OneHot)] id: RevisionId,
) {
    let encoder = FeatureEncoder::new(id);
    for nart in Radiotherapy::ALL {
        let obs = observation(Location::Hand, LadderStage::LocalFlap, nart);
        for outcome in Outcome::ALL {
            let vector = encoder.encode_outcome(&obs, outcome).unwrap();
            let expected = encoder
                .revision()
                .schema(outcome)
                .encoding_of(Field::Radiotherapy)
                .map(|_| nart.option_name());
            assert_eq!(
                encoder.decode_categorical(&vector, outcome, Field::Radiotherapy),
                expected
            );
        }
        let seroma = encoder.encode_outcome(&obs, Outcome::Seroma).unwrap();
        assert_eq!(
            encoder.decode_categorical(&seroma, Outcome::Seroma, Field::Radiotherapy),
            None
        );
    }
}

#[rstest]
#[case(RevisionId::V3Ordinal)]
#[case(RevisionId::V3OneHot)]
fn test_location_round_trip_seven_levels(#[case] id: RevisionId) {
    let encoder = FeatureEncoder::new(id);
    for location in Location::ALL {
        let obs = observation(location, LadderStage::ComplexRepair, Radiotherapy::No);
        let vector = encoder.encode_outcome(&obs, Outcome::Ssi).unwrap();
        assert_eq!(
            encoder.decode_categorical(&vector, Outcome::Ssi, Field::Location),
            Some(location.option_name())
        );
    }
}

#[test]
fn test_location_round_trip_six_levels() {
    let encoder = FeatureEncoder::new(RevisionId::V2Ordinal);
    let decode = |location| {
        let obs = observation(location, LadderStage::ComplexRepair, Radiotherapy::No);
        let vector = encoder.encode_outcome(&obs, Outcome::Minor).unwrap();
        encoder.decode_categorical(&vector, Outcome::Minor, Field::Location)
    };

    assert_eq!(decode(Location::Shoulder), Some("shoulder or upperarm or elbow"));
    assert_eq!(decode(Location::UpperarmOrElbow), Some("shoulder or upperarm or elbow"));
    for location in &Location::ALL[2..] {
        assert_eq!(decode(*location), Some(location.option_name()));
    }
}

#[rstest]
fn test_advertised_location_labels_accepted(
    #[values(RevisionId::V2Ordinal, RevisionId::V3Ordinal, RevisionId::V3OneHot)] id: RevisionId,
) {
    let encoder = FeatureEncoder::new(id);
    let locations = encoder.revision().locations;
    for label in locations.levels() {
        let input = ObservationInput {
            location: label.to_string(),
            ladder: "local flap".to_string(),
            bmi: 24.5,
            tumor_length: 3.0,
            tumor_width: 2.0,
            tumor_thickness: 1.5,
            radiotherapy: "no".to_string(),
            limb_segment_length: 10.0,
            limb_segment_thickness: 4.0,
        };
        let obs = input.into_observation_for(locations).unwrap();
        for outcome in Outcome::ALL {
            let vector = encoder.encode_outcome(&obs, outcome).unwrap();
            assert_eq!(
                encoder.decode_categorical(&vector, outcome, Field::Location),
                Some(label)
            );
        }
    }
}

#[test]
fn test_decode_absent_field() {
    let encoder = FeatureEncoder::new(RevisionId::V3OneHot);
    let vector = encoder
        .encode_outcome(&hand_local_flap(), Outcome::Seroma)
        .unwrap();
    // seroma does not use radiotherapy
    assert_eq!(
        encoder.decode_categorical(&vector, Outcome::Seroma, Field::Radiotherapy),
        None
    );
}
