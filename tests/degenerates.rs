use interlace::model::{PlainStrand, Point, Strand, StrandBase, StrandEnd};
use interlace::StrandDocument;

fn plain(name: &str, start: Point, end: Point) -> Strand {
    Strand::Plain(PlainStrand {
        base: StrandBase::new(name, 1, start, end, 46.0),
    })
}

#[test]
fn zero_length_strand_is_inert_but_kept() {
    let mut doc = StrandDocument::new();
    let p = Point::new(5.0, 5.0);
    doc.add_strand(plain("1_1", p, p)).unwrap();

    assert!(doc.get("1_1").is_some());
    assert!(doc.outline("1_1").unwrap().is_empty());
    assert!(!doc.contains_point("1_1", p));
    assert!(!doc.is_selectable("1_1"));
    // It still round-trips through the document format.
    let v = doc.to_json();
    let loaded = StrandDocument::from_json(&v).unwrap();
    assert!(loaded.get("1_1").is_some());
}

#[test]
fn non_finite_endpoint_is_tolerated() {
    let mut doc = StrandDocument::new();
    doc.add_strand(plain("1_1", Point::new(0.0, 0.0), Point::new(100.0, 0.0)))
        .unwrap();
    doc.attach("1_1", StrandEnd::End, "1_2", 90.0, 50.0).unwrap();

    doc.set_endpoint("1_1", StrandEnd::End, Point::new(f64::NAN, 0.0))
        .unwrap();

    // Nothing panics; the strand just stops participating in picking.
    assert!(doc.outline("1_1").unwrap().is_empty());
    assert!(!doc.is_selectable("1_1"));
    assert!(!doc.contains_point("1_1", Point::new(50.0, 0.0)));
    // The child inherited the poisoned anchor without blowing up.
    assert!(doc.get("1_2").unwrap().base().start.x.is_nan());
    assert!(!doc.is_selectable("1_2"));
}

#[test]
fn infinite_endpoint_is_tolerated() {
    let mut doc = StrandDocument::new();
    doc.add_strand(plain("1_1", Point::new(0.0, 0.0), Point::new(100.0, 0.0)))
        .unwrap();
    doc.set_endpoint("1_1", StrandEnd::End, Point::new(f64::INFINITY, 0.0))
        .unwrap();
    assert!(!doc.is_selectable("1_1"));
    assert!(doc.outline("1_1").unwrap().is_empty());
}

#[test]
fn screen_angle_convention_at_the_document_level() {
    let mut doc = StrandDocument::new();
    doc.add_strand(plain("1_1", Point::new(0.0, 0.0), Point::new(100.0, 100.0)))
        .unwrap();
    // 90 degrees steps along +x, 0 degrees along +y.
    doc.attach("1_1", StrandEnd::End, "1_2", 90.0, 50.0).unwrap();
    let end = doc.get("1_2").unwrap().base().end;
    assert!((end.x - 150.0).abs() < 1e-9);
    assert!((end.y - 100.0).abs() < 1e-9);
}

#[test]
fn parallel_strands_produce_no_mask() {
    let mut doc = StrandDocument::new();
    doc.add_strand(plain("1_1", Point::new(0.0, 0.0), Point::new(100.0, 0.0)))
        .unwrap();
    doc.add_strand(plain("2_1", Point::new(0.0, 10.0), Point::new(100.0, 10.0)))
        .unwrap();
    let made = doc
        .add_mask("1_1", "2_1", interlace::algorithms::mask::MaskAnchor::Second)
        .unwrap();
    assert!(made.is_none());
    assert_eq!(doc.len(), 2);
}

#[test]
fn zero_length_strand_never_masks() {
    let mut doc = StrandDocument::new();
    let p = Point::new(50.0, 0.0);
    doc.add_strand(plain("1_1", p, p)).unwrap();
    doc.add_strand(plain("2_1", Point::new(50.0, -50.0), Point::new(50.0, 50.0)))
        .unwrap();
    // The degenerate segment sits on the other strand, but a point has no
    // crossing direction.
    let made = doc
        .add_mask("1_1", "2_1", interlace::algorithms::mask::MaskAnchor::First)
        .unwrap();
    assert!(made.is_none());
}

#[test]
fn zero_length_attachment_keeps_the_chain_alive() {
    let mut doc = StrandDocument::new();
    doc.add_strand(plain("1_1", Point::new(0.0, 0.0), Point::new(100.0, 0.0)))
        .unwrap();
    doc.attach("1_1", StrandEnd::End, "1_2", 0.0, 0.0).unwrap();
    doc.attach("1_2", StrandEnd::End, "1_3", 90.0, 20.0).unwrap();

    doc.set_endpoint("1_1", StrandEnd::End, Point::new(40.0, 40.0))
        .unwrap();

    let mid = doc.get("1_2").unwrap().base();
    assert_eq!(mid.start, Point::new(40.0, 40.0));
    assert_eq!(mid.start, mid.end);
    assert!(!doc.is_selectable("1_2"));
    // The grandchild hangs off the collapsed point and still follows.
    let leaf = doc.get("1_3").unwrap().base();
    assert_eq!(leaf.start, Point::new(40.0, 40.0));
    assert!((leaf.end.x - 60.0).abs() < 1e-9);
    assert!((leaf.end.y - 40.0).abs() < 1e-9);
}
