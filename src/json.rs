// Persisted document schema. Strands serialize flat with a `type` tag and
// per-variant fields; deletion rectangle corners persist as [x, y] pairs.
// Loading is strict: caps, numeric bounds, layer-name uniqueness, and
// reference integrity are all checked before anything is committed, and a
// violation refuses the whole document. A history export wraps the same
// schema; loading one extracts the state at `current_step`.

use crate::error::LoadError;
use crate::geometry::limits;
use crate::groups::Group;
use crate::model::{
    AttachedStrand, Color, DeletionRect, MaskAnchor, MaskedStrand, PlainStrand, Point, Strand,
    StrandBase, StrandEnd,
};
use crate::StrandDocument;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const HISTORY_TYPE: &str = "OpenStrandStudioHistory";

#[derive(Serialize, Deserialize)]
struct RectSer {
    top_left: [f64; 2],
    top_right: [f64; 2],
    bottom_left: [f64; 2],
    bottom_right: [f64; 2],
}

impl From<&DeletionRect> for RectSer {
    fn from(r: &DeletionRect) -> RectSer {
        RectSer {
            top_left: [r.top_left.x, r.top_left.y],
            top_right: [r.top_right.x, r.top_right.y],
            bottom_left: [r.bottom_left.x, r.bottom_left.y],
            bottom_right: [r.bottom_right.x, r.bottom_right.y],
        }
    }
}

impl RectSer {
    fn into_rect(self) -> DeletionRect {
        let p = |c: [f64; 2]| Point::new(c[0], c[1]);
        DeletionRect {
            top_left: p(self.top_left),
            top_right: p(self.top_right),
            bottom_left: p(self.bottom_left),
            bottom_right: p(self.bottom_right),
        }
    }
}

pub fn to_json_impl(doc: &StrandDocument) -> Value {
    #[derive(Serialize)]
    struct StrandSer {
        #[serde(rename = "type")]
        ty: &'static str,
        index: usize,
        start: Point,
        end: Point,
        width: f64,
        color: Color,
        stroke_color: Color,
        stroke_width: f64,
        has_circles: [bool; 2],
        layer_name: String,
        set_number: i32,
        control_points: [Point; 2],
        control_point_center: Point,
        control_point_center_locked: bool,
        full_arrow_visible: bool,
        #[serde(skip_serializing_if = "Option::is_none")]
        attached_to: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        attachment_side: Option<u8>,
        #[serde(skip_serializing_if = "Option::is_none")]
        angle: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        length: Option<f64>,
        #[serde(skip_serializing_if = "Option::is_none")]
        first_selected_strand: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        second_selected_strand: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        mask_anchor: Option<MaskAnchor>,
        #[serde(skip_serializing_if = "Option::is_none")]
        base_center_point: Option<Point>,
        #[serde(skip_serializing_if = "Option::is_none")]
        edited_center_point: Option<Point>,
        #[serde(skip_serializing_if = "Option::is_none")]
        deletion_rectangles: Option<Vec<RectSer>>,
    }
    #[derive(Serialize)]
    struct GroupSer {
        strands: Vec<String>,
        main_strands: Vec<String>,
        center: Point,
    }
    #[derive(Serialize)]
    struct Doc {
        strands: Vec<StrandSer>,
        groups: std::collections::BTreeMap<String, GroupSer>,
    }

    let mut strands = Vec::new();
    for (index, s) in doc.strands().enumerate() {
        let b = s.base();
        let mut ser = StrandSer {
            ty: s.type_name(),
            index,
            start: b.start,
            end: b.end,
            width: b.width,
            color: b.color,
            stroke_color: b.stroke_color,
            stroke_width: b.stroke_width,
            has_circles: b.has_circles,
            layer_name: b.layer_name.clone(),
            set_number: b.set_number,
            control_points: [b.control_point1, b.control_point2],
            control_point_center: b.control_point_center,
            control_point_center_locked: b.control_point_center_locked,
            full_arrow_visible: b.full_arrow_visible,
            attached_to: None,
            attachment_side: None,
            angle: None,
            length: None,
            first_selected_strand: None,
            second_selected_strand: None,
            mask_anchor: None,
            base_center_point: None,
            edited_center_point: None,
            deletion_rectangles: None,
        };
        match s {
            Strand::Plain(_) => {}
            Strand::Attached(a) => {
                ser.attached_to = Some(a.attached_to.clone());
                ser.attachment_side = Some(a.attachment_side.index() as u8);
                ser.angle = Some(a.angle);
                ser.length = Some(a.length);
            }
            Strand::Masked(m) => {
                ser.first_selected_strand = Some(m.first_selected_strand.clone());
                ser.second_selected_strand = Some(m.second_selected_strand.clone());
                ser.mask_anchor = Some(m.anchor);
                ser.base_center_point = Some(m.base_center_point);
                ser.edited_center_point = Some(m.edited_center_point);
                ser.deletion_rectangles =
                    Some(m.deletion_rectangles.iter().map(RectSer::from).collect());
            }
        }
        strands.push(ser);
    }

    let groups = doc
        .groups
        .iter()
        .map(|(name, g)| {
            (
                name.clone(),
                GroupSer {
                    strands: g.strands.clone(),
                    main_strands: g.main_strands.clone(),
                    center: g.center,
                },
            )
        })
        .collect();

    // Doc holds only serializable plain data; serialization cannot fail.
    serde_json::to_value(Doc { strands, groups }).unwrap_or(Value::Null)
}

pub fn from_json_impl(v: &Value) -> Result<StrandDocument, LoadError> {
    // History export: unwrap to the state at current_step and load that.
    if v.get("type").and_then(Value::as_str) == Some(HISTORY_TYPE) {
        #[derive(Deserialize)]
        struct StateDe {
            step: i64,
            data: Value,
        }
        #[derive(Deserialize)]
        struct HistoryDe {
            current_step: i64,
            states: Vec<StateDe>,
        }
        let h: HistoryDe = serde_json::from_value(v.clone())?;
        let state = h
            .states
            .into_iter()
            .find(|s| s.step == h.current_step)
            .ok_or(LoadError::MissingHistoryStep(h.current_step))?;
        return from_json_impl(&state.data);
    }

    #[derive(Deserialize)]
    struct StrandDe {
        #[serde(rename = "type")]
        ty: String,
        start: Point,
        end: Point,
        width: Option<f64>,
        color: Option<Color>,
        stroke_color: Option<Color>,
        stroke_width: Option<f64>,
        has_circles: Option<[bool; 2]>,
        layer_name: String,
        set_number: Option<i32>,
        control_points: Option<[Point; 2]>,
        control_point_center: Option<Point>,
        control_point_center_locked: Option<bool>,
        full_arrow_visible: Option<bool>,
        attached_to: Option<String>,
        attachment_side: Option<u8>,
        angle: Option<f64>,
        length: Option<f64>,
        first_selected_strand: Option<String>,
        second_selected_strand: Option<String>,
        mask_anchor: Option<MaskAnchor>,
        base_center_point: Option<Point>,
        edited_center_point: Option<Point>,
        deletion_rectangles: Option<Vec<RectSer>>,
    }
    #[derive(Deserialize)]
    struct GroupDe {
        strands: Vec<String>,
        main_strands: Option<Vec<String>>,
        center: Option<Point>,
    }
    #[derive(Deserialize)]
    struct DocDe {
        strands: Vec<StrandDe>,
        groups: Option<std::collections::BTreeMap<String, GroupDe>>,
    }

    let parsed: DocDe = serde_json::from_value(v.clone())?;
    if parsed.strands.len() > limits::MAX_STRANDS {
        return Err(LoadError::CapsExceeded(format!(
            "strands>{}",
            limits::MAX_STRANDS
        )));
    }

    let check_point = |p: Point, what: &str| -> Result<(), LoadError> {
        if !limits::in_coord_bounds(p.x) || !limits::in_coord_bounds(p.y) {
            Err(LoadError::OutOfBounds(what.to_string()))
        } else {
            Ok(())
        }
    };

    let mut names: std::collections::HashSet<&str> = std::collections::HashSet::new();
    for s in &parsed.strands {
        if !names.insert(s.layer_name.as_str()) {
            return Err(LoadError::DuplicateLayer(s.layer_name.clone()));
        }
        check_point(s.start, "start")?;
        check_point(s.end, "end")?;
        if let Some(cps) = &s.control_points {
            check_point(cps[0], "control_points")?;
            check_point(cps[1], "control_points")?;
        }
        if let Some(c) = s.control_point_center {
            check_point(c, "control_point_center")?;
        }
        if let Some(w) = s.width {
            if !limits::in_width_bounds(w) {
                return Err(LoadError::OutOfBounds("width".into()));
            }
        }
        if let Some(rects) = &s.deletion_rectangles {
            if rects.len() > limits::MAX_DELETION_RECTS_PER_MASK {
                return Err(LoadError::CapsExceeded(format!(
                    "deletion_rectangles>{}",
                    limits::MAX_DELETION_RECTS_PER_MASK
                )));
            }
            for r in rects {
                for c in [r.top_left, r.top_right, r.bottom_left, r.bottom_right] {
                    check_point(Point::new(c[0], c[1]), "deletion_rectangle corner")?;
                }
            }
        }
    }

    // Reference integrity before any construction. Typed records must carry
    // their reference fields; an absent key is refused, never defaulted.
    for s in &parsed.strands {
        let check = |field: &'static str, value: &Option<String>| -> Result<(), LoadError> {
            let target = match value {
                Some(t) => t,
                None => {
                    return Err(LoadError::MissingField {
                        layer: s.layer_name.clone(),
                        field,
                    })
                }
            };
            if !names.contains(target.as_str()) {
                return Err(LoadError::BrokenReference {
                    layer: s.layer_name.clone(),
                    missing: target.clone(),
                });
            }
            Ok(())
        };
        match s.ty.as_str() {
            "AttachedStrand" => check("attached_to", &s.attached_to)?,
            "MaskedStrand" => {
                check("first_selected_strand", &s.first_selected_strand)?;
                check("second_selected_strand", &s.second_selected_strand)?;
            }
            _ => {}
        }
    }
    if let Some(groups) = &parsed.groups {
        for (name, g) in groups {
            for member in g.strands.iter().chain(g.main_strands.iter().flatten()) {
                if !names.contains(member.as_str()) {
                    return Err(LoadError::BrokenReference {
                        layer: name.clone(),
                        missing: member.clone(),
                    });
                }
            }
        }
    }

    let mut doc = StrandDocument::new();
    for s in parsed.strands {
        let mut base = StrandBase::new(
            &s.layer_name,
            s.set_number.unwrap_or(0),
            s.start,
            s.end,
            s.width.unwrap_or(46.0),
        );
        base.color = s.color.unwrap_or(Color::BLACK);
        base.stroke_color = s.stroke_color.unwrap_or(Color::BLACK);
        base.stroke_width = s.stroke_width.unwrap_or(4.0);
        base.has_circles = s.has_circles.unwrap_or([false, false]);
        base.control_point_center_locked = s.control_point_center_locked.unwrap_or(false);
        base.full_arrow_visible = s.full_arrow_visible.unwrap_or(false);
        match s.control_points {
            Some([cp1, cp2]) => {
                base.control_point1 = cp1;
                base.control_point2 = cp2;
                base.control_point_center = s
                    .control_point_center
                    .unwrap_or_else(|| Point::midpoint(cp1, cp2));
            }
            None => base.update_control_points(),
        }

        let strand = match s.ty.as_str() {
            "AttachedStrand" => Strand::Attached(AttachedStrand {
                attached_to: s.attached_to.unwrap_or_default(),
                attachment_side: StrandEnd::from_index(s.attachment_side.unwrap_or(0)),
                angle: s.angle.unwrap_or(0.0),
                length: s.length.unwrap_or_else(|| {
                    crate::geometry::math::distance(base.start, base.end)
                }),
                base,
            }),
            "MaskedStrand" => {
                let center = s.base_center_point.unwrap_or(base.control_point_center);
                Strand::Masked(MaskedStrand {
                    first_selected_strand: s.first_selected_strand.unwrap_or_default(),
                    second_selected_strand: s.second_selected_strand.unwrap_or_default(),
                    anchor: s.mask_anchor.unwrap_or(MaskAnchor::Second),
                    base_center_point: center,
                    edited_center_point: s.edited_center_point.unwrap_or(center),
                    deletion_rectangles: s
                        .deletion_rectangles
                        .unwrap_or_default()
                        .into_iter()
                        .map(RectSer::into_rect)
                        .collect(),
                    base,
                })
            }
            _ => Strand::Plain(PlainStrand { base }),
        };
        if let Err(crate::DocError::DuplicateLayer(n)) = doc.add_strand(strand) {
            return Err(LoadError::DuplicateLayer(n));
        }
    }

    if let Some(groups) = parsed.groups {
        for (name, g) in groups {
            let center = match g.center {
                Some(c) => c,
                None => Point::ZERO,
            };
            doc.groups.insert(
                &name,
                Group {
                    strands: g.strands,
                    main_strands: g.main_strands.unwrap_or_default(),
                    center,
                },
            );
        }
    }
    Ok(doc)
}
