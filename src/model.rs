use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub fn new(x: f64, y: f64) -> Point {
        Point { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    pub fn midpoint(a: Point, b: Point) -> Point {
        Point {
            x: (a.x + b.x) * 0.5,
            y: (a.y + b.y) * 0.5,
        }
    }

    pub fn translated(&self, dx: f64, dy: f64) -> Point {
        Point {
            x: self.x + dx,
            y: self.y + dy,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0,
        g: 0,
        b: 0,
        a: 255,
    };
}

/// Which endpoint of a strand. Also used as the attachment side of an
/// `AttachedStrand` (the parent endpoint its start is pinned to).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StrandEnd {
    Start,
    End,
}

impl StrandEnd {
    pub fn index(self) -> usize {
        match self {
            StrandEnd::Start => 0,
            StrandEnd::End => 1,
        }
    }

    pub fn from_index(i: u8) -> StrandEnd {
        if i == 0 {
            StrandEnd::Start
        } else {
            StrandEnd::End
        }
    }
}

/// Fields common to every strand variant. The centerline runs start -> end;
/// `control_point1`/`control_point2` bend it into a cubic, and
/// `control_point_center` is the draggable midpoint handle. Once
/// `control_point_center_locked` is set, automatic recomputation must leave
/// the center's absolute position alone.
#[derive(Clone, Debug)]
pub struct StrandBase {
    pub layer_name: String,
    pub set_number: i32,
    pub start: Point,
    pub end: Point,
    pub width: f64,
    pub color: Color,
    pub stroke_color: Color,
    pub stroke_width: f64,
    pub has_circles: [bool; 2],
    pub control_point1: Point,
    pub control_point2: Point,
    pub control_point_center: Point,
    pub control_point_center_locked: bool,
    pub full_arrow_visible: bool,
}

impl StrandBase {
    pub fn new(layer_name: &str, set_number: i32, start: Point, end: Point, width: f64) -> StrandBase {
        StrandBase {
            layer_name: layer_name.to_string(),
            set_number,
            start,
            end,
            width,
            color: Color::BLACK,
            stroke_color: Color::BLACK,
            stroke_width: 4.0,
            has_circles: [false, false],
            control_point1: start,
            control_point2: end,
            control_point_center: Point::midpoint(start, end),
            control_point_center_locked: false,
            full_arrow_visible: false,
        }
    }

    pub fn endpoint(&self, which: StrandEnd) -> Point {
        match which {
            StrandEnd::Start => self.start,
            StrandEnd::End => self.end,
        }
    }

    pub fn set_endpoint(&mut self, which: StrandEnd, p: Point) {
        match which {
            StrandEnd::Start => self.start = p,
            StrandEnd::End => self.end = p,
        }
    }

    pub fn length(&self) -> f64 {
        crate::geometry::math::distance(self.start, self.end)
    }

    /// Default control point placement along the chord. A locked center
    /// keeps its absolute position; everything else follows the endpoints.
    pub fn update_control_points(&mut self) {
        self.control_point1 = self.start;
        self.control_point2 = self.end;
        if !self.control_point_center_locked {
            self.control_point_center = Point::midpoint(self.control_point1, self.control_point2);
        }
    }

    /// Rigid translation of the whole strand, control points included.
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.start = self.start.translated(dx, dy);
        self.end = self.end.translated(dx, dy);
        self.control_point1 = self.control_point1.translated(dx, dy);
        self.control_point2 = self.control_point2.translated(dx, dy);
        self.control_point_center = self.control_point_center.translated(dx, dy);
    }

    /// Rigid rotation of the whole strand around `pivot`, in degrees.
    pub fn rotate_about(&mut self, pivot: Point, degrees: f64) {
        let rot = |p: Point| crate::geometry::math::rotate_about(p, pivot, degrees);
        self.start = rot(self.start);
        self.end = rot(self.end);
        self.control_point1 = rot(self.control_point1);
        self.control_point2 = rot(self.control_point2);
        self.control_point_center = rot(self.control_point_center);
    }
}

#[derive(Clone, Debug)]
pub struct PlainStrand {
    pub base: StrandBase,
}

#[derive(Clone, Debug)]
pub struct AttachedStrand {
    pub base: StrandBase,
    /// Layer name of the parent strand. A key into the owning document's
    /// arena, never an owning reference.
    pub attached_to: String,
    pub attachment_side: StrandEnd,
    /// Degrees in the screen polar convention (0 along +y, 90 along +x).
    pub angle: f64,
    pub length: f64,
}

impl AttachedStrand {
    /// Re-derive `end` from the pinned start plus the polar parameters.
    pub fn update_end(&mut self) {
        self.base.end = crate::geometry::math::point_at_angle(self.base.start, self.angle, self.length);
    }

    /// Re-derive the polar parameters from the current endpoints
    /// (after a direct end drag or a rigid transform).
    pub fn update_angle_length_from_geometry(&mut self) {
        self.length = crate::geometry::math::distance(self.base.start, self.base.end);
        self.angle = crate::geometry::math::angle_to(self.base.start, self.base.end);
    }
}

/// An erase region subtracted from a rendered mask. Corners are stored
/// explicitly because the rectangle is oriented, not axis-aligned.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeletionRect {
    pub top_left: Point,
    pub top_right: Point,
    pub bottom_left: Point,
    pub bottom_right: Point,
}

impl DeletionRect {
    pub fn translate(&mut self, dx: f64, dy: f64) {
        self.top_left = self.top_left.translated(dx, dy);
        self.top_right = self.top_right.translated(dx, dy);
        self.bottom_left = self.bottom_left.translated(dx, dy);
        self.bottom_right = self.bottom_right.translated(dx, dy);
    }
}

/// Which of a mask's two referenced strands its cached base geometry,
/// color, and set number mirror. Right-hand patterns anchor on the second
/// (horizontal) strand, left-hand patterns on the first (vertical) one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaskAnchor {
    First,
    Second,
}

/// Derived occlusion region between two referenced strands. Holds no
/// independent editable geometry beyond what is cached for redraw; the
/// centers are always recomputable from the two referenced strands.
#[derive(Clone, Debug)]
pub struct MaskedStrand {
    pub base: StrandBase,
    pub first_selected_strand: String,
    pub second_selected_strand: String,
    pub anchor: MaskAnchor,
    pub base_center_point: Point,
    pub edited_center_point: Point,
    pub deletion_rectangles: Vec<DeletionRect>,
}

#[derive(Clone, Debug)]
pub enum Strand {
    Plain(PlainStrand),
    Attached(AttachedStrand),
    Masked(MaskedStrand),
}

impl Strand {
    pub fn base(&self) -> &StrandBase {
        match self {
            Strand::Plain(s) => &s.base,
            Strand::Attached(s) => &s.base,
            Strand::Masked(s) => &s.base,
        }
    }

    pub fn base_mut(&mut self) -> &mut StrandBase {
        match self {
            Strand::Plain(s) => &mut s.base,
            Strand::Attached(s) => &mut s.base,
            Strand::Masked(s) => &mut s.base,
        }
    }

    pub fn layer_name(&self) -> &str {
        &self.base().layer_name
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Strand::Plain(_) => "Strand",
            Strand::Attached(_) => "AttachedStrand",
            Strand::Masked(_) => "MaskedStrand",
        }
    }

    pub fn as_attached(&self) -> Option<&AttachedStrand> {
        match self {
            Strand::Attached(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_attached_mut(&mut self) -> Option<&mut AttachedStrand> {
        match self {
            Strand::Attached(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_masked(&self) -> Option<&MaskedStrand> {
        match self {
            Strand::Masked(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_masked_mut(&mut self) -> Option<&mut MaskedStrand> {
        match self {
            Strand::Masked(s) => Some(s),
            _ => None,
        }
    }
}
