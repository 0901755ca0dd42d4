use interlace::algorithms::pattern::{generate, GridParams, Handedness, PatternMode};
use interlace::model::{PlainStrand, Point, Strand, StrandBase, StrandEnd};
use interlace::{LoadError, StrandDocument};
use serde_json::json;

#[test]
fn pattern_documents_round_trip() {
    for mode in [PatternMode::Stretch, PatternMode::Continuation] {
        let doc = generate(2, 2, 1, Handedness::Right, mode, &GridParams::default()).unwrap();
        let v = doc.to_json();
        let loaded = StrandDocument::from_json(&v).unwrap();
        assert_eq!(loaded.to_json(), v);
        assert_eq!(loaded.len(), doc.len());
    }
}

#[test]
fn edited_document_round_trips_with_groups_and_masks() {
    let mut doc = StrandDocument::new();
    doc.add_strand(Strand::Plain(PlainStrand {
        base: StrandBase::new("1_1", 1, Point::new(0.0, 0.0), Point::new(100.0, 0.0), 46.0),
    }))
    .unwrap();
    doc.add_strand(Strand::Plain(PlainStrand {
        base: StrandBase::new("2_1", 2, Point::new(50.0, -50.0), Point::new(50.0, 50.0), 46.0),
    }))
    .unwrap();
    doc.attach("1_1", StrandEnd::End, "1_2", 45.0, 30.0).unwrap();
    let mask = doc
        .add_mask("2_1", "1_1", interlace::algorithms::mask::MaskAnchor::Second)
        .unwrap()
        .unwrap();
    doc.add_deletion_rectangle(
        &mask,
        interlace::algorithms::mask::deletion_rect_for(doc.get("1_1").unwrap().base(), 2.0)
            .unwrap(),
    )
    .unwrap();
    doc.set_control_points("1_1", Point::new(10.0, 5.0), Point::new(90.0, -5.0), Some(Point::new(50.0, 9.0)))
        .unwrap();
    doc.create_group("weave", &["1_1", "1_2"]).unwrap();

    let v = doc.to_json();
    let loaded = StrandDocument::from_json(&v).unwrap();
    assert_eq!(loaded.to_json(), v);

    let b = loaded.get("1_1").unwrap().base();
    assert!(b.control_point_center_locked);
    assert_eq!(b.control_point_center, Point::new(50.0, 9.0));
    let m = loaded.get(&mask).unwrap().as_masked().unwrap();
    assert_eq!(m.deletion_rectangles.len(), 1);
    let g = loaded.groups().get("weave").unwrap();
    assert_eq!(g.strands, vec!["1_1", "1_2"]);
    assert_eq!(g.main_strands, vec!["1_1"]);
}

#[test]
fn deletion_rectangle_corners_serialize_as_pairs() {
    let mut doc = StrandDocument::new();
    doc.add_strand(Strand::Plain(PlainStrand {
        base: StrandBase::new("1_1", 1, Point::new(0.0, 0.0), Point::new(100.0, 0.0), 46.0),
    }))
    .unwrap();
    doc.add_strand(Strand::Plain(PlainStrand {
        base: StrandBase::new("2_1", 2, Point::new(50.0, -50.0), Point::new(50.0, 50.0), 46.0),
    }))
    .unwrap();
    let mask = doc
        .add_mask("2_1", "1_1", interlace::algorithms::mask::MaskAnchor::Second)
        .unwrap()
        .unwrap();
    doc.add_deletion_rectangle(
        &mask,
        interlace::algorithms::mask::deletion_rect_for(doc.get("1_1").unwrap().base(), 0.0)
            .unwrap(),
    )
    .unwrap();
    let v = doc.to_json();
    let rect = v["strands"]
        .as_array()
        .unwrap()
        .iter()
        .find(|s| s["type"] == "MaskedStrand")
        .unwrap()["deletion_rectangles"][0]
        .clone();
    assert!(rect["top_left"].as_array().unwrap().len() == 2);
    assert!(rect["bottom_right"].as_array().unwrap().len() == 2);
}

#[test]
fn absent_optionals_get_defaults() {
    let v = json!({
        "strands": [
            {"type": "Strand", "layer_name": "1_1",
             "start": {"x": 0.0, "y": 0.0}, "end": {"x": 10.0, "y": 0.0}}
        ]
    });
    let doc = StrandDocument::from_json(&v).unwrap();
    let b = doc.get("1_1").unwrap().base();
    assert_eq!(b.width, 46.0);
    assert_eq!(b.stroke_width, 4.0);
    assert_eq!(b.has_circles, [false, false]);
    assert!(!b.control_point_center_locked);
    assert!(!b.full_arrow_visible);
    // Control points default onto the chord.
    assert_eq!(b.control_point1, b.start);
    assert_eq!(b.control_point2, b.end);
    assert_eq!(b.control_point_center, Point::new(5.0, 0.0));
}

#[test]
fn duplicate_layer_names_are_refused() {
    let v = json!({
        "strands": [
            {"type": "Strand", "layer_name": "1_1",
             "start": {"x": 0.0, "y": 0.0}, "end": {"x": 10.0, "y": 0.0}},
            {"type": "Strand", "layer_name": "1_1",
             "start": {"x": 0.0, "y": 5.0}, "end": {"x": 10.0, "y": 5.0}}
        ]
    });
    let err = StrandDocument::from_json(&v).unwrap_err();
    assert!(matches!(err, LoadError::DuplicateLayer(ref n) if n == "1_1"));
}

#[test]
fn broken_attachment_reference_is_refused() {
    let v = json!({
        "strands": [
            {"type": "AttachedStrand", "layer_name": "1_2", "attached_to": "1_1",
             "attachment_side": 1, "angle": 0.0, "length": 10.0,
             "start": {"x": 0.0, "y": 0.0}, "end": {"x": 0.0, "y": 10.0}}
        ]
    });
    let err = StrandDocument::from_json(&v).unwrap_err();
    assert!(
        matches!(err, LoadError::BrokenReference { ref layer, ref missing }
            if layer == "1_2" && missing == "1_1")
    );
}

#[test]
fn broken_mask_reference_is_refused() {
    let v = json!({
        "strands": [
            {"type": "Strand", "layer_name": "1_1",
             "start": {"x": 0.0, "y": 0.0}, "end": {"x": 10.0, "y": 0.0}},
            {"type": "MaskedStrand", "layer_name": "1_1_2_1",
             "first_selected_strand": "1_1", "second_selected_strand": "2_1",
             "start": {"x": 0.0, "y": 0.0}, "end": {"x": 10.0, "y": 0.0}}
        ]
    });
    let err = StrandDocument::from_json(&v).unwrap_err();
    assert!(matches!(err, LoadError::BrokenReference { ref missing, .. } if missing == "2_1"));
}

#[test]
fn attached_record_without_a_parent_field_is_refused() {
    let v = json!({
        "strands": [
            {"type": "AttachedStrand", "layer_name": "1_2",
             "attachment_side": 1, "angle": 0.0, "length": 10.0,
             "start": {"x": 0.0, "y": 0.0}, "end": {"x": 0.0, "y": 10.0}}
        ]
    });
    let err = StrandDocument::from_json(&v).unwrap_err();
    assert!(matches!(err, LoadError::MissingField { ref layer, field }
        if layer == "1_2" && field == "attached_to"));
}

#[test]
fn mask_record_without_references_is_refused() {
    let v = json!({
        "strands": [
            {"type": "Strand", "layer_name": "1_1",
             "start": {"x": 0.0, "y": 0.0}, "end": {"x": 10.0, "y": 0.0}},
            {"type": "MaskedStrand", "layer_name": "1_1_2_1",
             "first_selected_strand": "1_1",
             "start": {"x": 0.0, "y": 0.0}, "end": {"x": 10.0, "y": 0.0}}
        ]
    });
    let err = StrandDocument::from_json(&v).unwrap_err();
    assert!(matches!(err, LoadError::MissingField { field, .. }
        if field == "second_selected_strand"));
}

#[test]
fn broken_group_member_is_refused() {
    let v = json!({
        "strands": [
            {"type": "Strand", "layer_name": "1_1",
             "start": {"x": 0.0, "y": 0.0}, "end": {"x": 10.0, "y": 0.0}}
        ],
        "groups": {"weave": {"strands": ["1_1", "9_9"]}}
    });
    let err = StrandDocument::from_json(&v).unwrap_err();
    assert!(matches!(err, LoadError::BrokenReference { ref missing, .. } if missing == "9_9"));
}

#[test]
fn out_of_bounds_values_are_refused() {
    let v = json!({
        "strands": [
            {"type": "Strand", "layer_name": "1_1",
             "start": {"x": 1e12, "y": 0.0}, "end": {"x": 10.0, "y": 0.0}}
        ]
    });
    assert!(matches!(
        StrandDocument::from_json(&v).unwrap_err(),
        LoadError::OutOfBounds(_)
    ));
    let v = json!({
        "strands": [
            {"type": "Strand", "layer_name": "1_1", "width": 0.0,
             "start": {"x": 0.0, "y": 0.0}, "end": {"x": 10.0, "y": 0.0}}
        ]
    });
    assert!(matches!(
        StrandDocument::from_json(&v).unwrap_err(),
        LoadError::OutOfBounds(_)
    ));
}

#[test]
fn malformed_json_is_a_parse_error() {
    assert!(matches!(
        StrandDocument::from_json_str("{\"strands\": 7}").unwrap_err(),
        LoadError::Json(_)
    ));
}

#[test]
fn history_export_loads_the_current_step() {
    let doc = generate(1, 1, 0, Handedness::Left, PatternMode::Stretch, &GridParams::default())
        .unwrap();
    let state = doc.to_json();
    let empty = StrandDocument::new().to_json();
    let history = json!({
        "type": "OpenStrandStudioHistory",
        "current_step": 2,
        "states": [
            {"step": 1, "data": empty},
            {"step": 2, "data": state}
        ]
    });
    let loaded = StrandDocument::from_json(&history).unwrap();
    assert_eq!(loaded.len(), doc.len());
    assert_eq!(loaded.to_json(), doc.to_json());
}

#[test]
fn history_without_the_current_step_is_refused() {
    let history = json!({
        "type": "OpenStrandStudioHistory",
        "current_step": 5,
        "states": [{"step": 1, "data": {"strands": []}}]
    });
    assert!(matches!(
        StrandDocument::from_json(&history).unwrap_err(),
        LoadError::MissingHistoryStep(5)
    ));
}
