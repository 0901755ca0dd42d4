// MxN grid pattern generator. Lays out m vertical and n horizontal strand
// sets on a square grid, each a main strand with two attached tails, and
// masks every crossing the handedness dictates. Continuation mode then
// grows a second tier of attached strands off the tails and masks their
// crossings too.
//
// All coordinates follow the screen polar convention of
// `geometry::math::point_at_angle` (0 degrees along +y, 90 along +x).

use crate::algorithms::mask::MaskAnchor;
use crate::error::PatternError;
use crate::geometry::math::{angle_to, distance};
use crate::model::{Color, Point, PlainStrand, Strand, StrandBase, StrandEnd};
use crate::StrandDocument;

/// Grid metrics. Defaults reproduce the standard layout: a 28 px half-gap
/// between the two rails of a set, a stride of four gaps between grid
/// lines, and tails two gaps long.
#[derive(Clone, Copy, Debug)]
pub struct GridParams {
    pub gap: f64,
    pub origin: Point,
    pub strand_width: f64,
    pub stroke_width: f64,
    /// Base orientation for continuation tiers, degrees.
    pub tier_angle: f64,
    /// Continuation strands are their parent's length plus this.
    pub tier_length_extension: f64,
}

impl Default for GridParams {
    fn default() -> GridParams {
        GridParams {
            gap: 28.0,
            origin: Point::new(168.0, 168.0),
            strand_width: 46.0,
            stroke_width: 4.0,
            tier_angle: 24.0,
            tier_length_extension: 55.0,
        }
    }
}

impl GridParams {
    pub fn stride(&self) -> f64 {
        4.0 * self.gap
    }

    pub fn tail(&self) -> f64 {
        2.0 * self.gap
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Handedness {
    Right,
    Left,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PatternMode {
    Stretch,
    Continuation,
}

/// Everything that differs between the two hands: the slant sign of the
/// rails, which tail role runs the full row on the horizontal side, which
/// role pairs get masked, and which referenced strand anchors each mask.
#[derive(Clone, Copy, Debug)]
pub struct HandProfile {
    pub slant: f64,
    pub h_full_role: u8,
    pub h_stub_role: u8,
    pub crossing: [(u8, u8); 2],
    pub anchor: MaskAnchor,
}

impl HandProfile {
    pub fn right() -> HandProfile {
        HandProfile {
            slant: 1.0,
            h_full_role: 3,
            h_stub_role: 2,
            crossing: [(2, 3), (3, 2)],
            anchor: MaskAnchor::Second,
        }
    }

    pub fn left() -> HandProfile {
        HandProfile {
            slant: -1.0,
            h_full_role: 2,
            h_stub_role: 3,
            crossing: [(2, 2), (3, 3)],
            anchor: MaskAnchor::First,
        }
    }
}

impl Handedness {
    pub fn profile(self) -> HandProfile {
        match self {
            Handedness::Right => HandProfile::right(),
            Handedness::Left => HandProfile::left(),
        }
    }
}

/// Valid rotation indices for an m x n grid. Square grids have 2m slots,
/// rectangular ones 2(m+n).
pub fn valid_k_range(m: u32, n: u32) -> (i32, i32) {
    let m = m as i32;
    let n = n as i32;
    if m == n {
        (-(m - 1), m)
    } else {
        (-(m + n - 1), m + n)
    }
}

/// Deterministic per-set color: hue steps around the wheel by the golden
/// ratio fraction so neighboring sets stay far apart, at fixed lightness
/// and saturation. The same set number always maps to the same color.
pub fn set_color(set: i32) -> Color {
    const GOLDEN: f64 = 0.618_033_988_749_895;
    let h = (set as f64 * GOLDEN).fract().rem_euclid(1.0);
    let (r, g, b) = hls_to_rgb(h, 0.5, 0.9);
    Color {
        r: (r * 255.0).round() as u8,
        g: (g * 255.0).round() as u8,
        b: (b * 255.0).round() as u8,
        a: 255,
    }
}

fn hls_to_rgb(h: f64, l: f64, s: f64) -> (f64, f64, f64) {
    if s == 0.0 {
        return (l, l, l);
    }
    let m2 = if l <= 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let m1 = 2.0 * l - m2;
    (
        hue_component(m1, m2, h + 1.0 / 3.0),
        hue_component(m1, m2, h),
        hue_component(m1, m2, h - 1.0 / 3.0),
    )
}

fn hue_component(m1: f64, m2: f64, hue: f64) -> f64 {
    let hue = hue.rem_euclid(1.0);
    if hue < 1.0 / 6.0 {
        m1 + (m2 - m1) * hue * 6.0
    } else if hue < 0.5 {
        m2
    } else if hue < 2.0 / 3.0 {
        m1 + (m2 - m1) * (2.0 / 3.0 - hue) * 6.0
    } else {
        m1
    }
}

/// Generate an m x n pattern document. Vertical sets number 1..=m,
/// horizontal sets m+1..=m+n; within a set the main strand is `{set}_1`
/// and the tails `{set}_2` / `{set}_3`. Regenerating with the same inputs
/// yields an identical document.
pub fn generate(
    m: u32,
    n: u32,
    k: i32,
    hand: Handedness,
    mode: PatternMode,
    params: &GridParams,
) -> Result<StrandDocument, PatternError> {
    if m == 0 || n == 0 {
        return Err(PatternError::InvalidGrid { m, n });
    }
    let (k_min, k_max) = valid_k_range(m, n);
    if k < k_min || k > k_max {
        return Err(PatternError::InvalidK { k, min: k_min, max: k_max });
    }

    let hp = hand.profile();
    let mut doc = StrandDocument::new();
    build_stretch(&mut doc, m, n, &hp, params)?;
    add_crossing_masks(&mut doc, m, n, &hp, hp.crossing)?;

    if mode == PatternMode::Continuation {
        build_tiers(&mut doc, m, n, k, params)?;
        add_crossing_masks(&mut doc, m, n, &hp, [(4, 5), (5, 4)])?;
    }
    Ok(doc)
}

fn main_strand(name: &str, set: i32, start: Point, end: Point, params: &GridParams) -> Strand {
    let mut base = StrandBase::new(name, set, start, end, params.strand_width);
    base.stroke_width = params.stroke_width;
    base.color = set_color(set);
    base.has_circles = [true, true];
    base.update_control_points();
    Strand::Plain(PlainStrand { base })
}

/// Attach a tail from `side` of the parent toward `target`, converting the
/// target into the polar parameters the attachment model stores.
fn attach_toward(
    doc: &mut StrandDocument,
    parent: &str,
    side: StrandEnd,
    name: &str,
    target: Point,
) -> Result<(), PatternError> {
    let anchor = match doc.get(parent) {
        Some(s) => s.base().endpoint(side),
        None => return Err(PatternError::Doc(crate::DocError::UnknownLayer(parent.to_string()))),
    };
    doc.attach(parent, side, name, angle_to(anchor, target), distance(anchor, target))?;
    Ok(())
}

fn build_stretch(
    doc: &mut StrandDocument,
    m: u32,
    n: u32,
    hp: &HandProfile,
    params: &GridParams,
) -> Result<(), PatternError> {
    let g = params.gap;
    let s = params.stride();
    let tail = params.tail();
    let (ox, oy) = (params.origin.x, params.origin.y);
    let sl = hp.slant;

    let y_top = oy - s / 2.0;
    let y_bot = oy + (n - 1) as f64 * s + s / 2.0;
    let x_left = ox - s / 2.0;
    let x_right = ox + (m - 1) as f64 * s + s / 2.0;

    // Vertical sets: a slanted main rail through the grid, one tail running
    // the full column past the top edge, one short stub beyond the far end.
    for i in 0..m {
        let set = (i + 1) as i32;
        let x = ox + i as f64 * s;
        let start = Point::new(x + sl * g, y_bot);
        let end = Point::new(x - sl * g, y_top);
        doc.add_strand(main_strand(&format!("{set}_1"), set, start, end, params))?;
        attach_toward(
            doc,
            &format!("{set}_1"),
            StrandEnd::Start,
            &format!("{set}_2"),
            Point::new(x + sl * g, y_top - tail),
        )?;
        attach_toward(
            doc,
            &format!("{set}_1"),
            StrandEnd::End,
            &format!("{set}_3"),
            Point::new(x - sl * g, y_top - tail),
        )?;
    }

    // Horizontal sets: the near rail end depends on the hand, the full tail
    // crosses the whole grid and overshoots the far edge.
    let (h_near, h_far) = if sl > 0.0 { (x_left, x_right) } else { (x_right, x_left) };
    for j in 0..n {
        let set = (m + j + 1) as i32;
        let y = oy + j as f64 * s;
        let start = Point::new(h_near, y + sl * g);
        let end = Point::new(h_far, y - sl * g);
        doc.add_strand(main_strand(&format!("{set}_1"), set, start, end, params))?;
        attach_toward(
            doc,
            &format!("{set}_1"),
            StrandEnd::Start,
            &format!("{set}_{}", hp.h_full_role),
            Point::new(h_far + sl * tail, y + sl * g),
        )?;
        attach_toward(
            doc,
            &format!("{set}_1"),
            StrandEnd::End,
            &format!("{set}_{}", hp.h_stub_role),
            Point::new(h_far + sl * tail, y - sl * g),
        )?;
    }
    Ok(())
}

/// Second-tier strands hanging off each tail's free end, fanned out by k.
/// One rotation step is a full turn divided by the number of k slots.
fn build_tiers(
    doc: &mut StrandDocument,
    m: u32,
    n: u32,
    k: i32,
    params: &GridParams,
) -> Result<(), PatternError> {
    let (k_min, k_max) = valid_k_range(m, n);
    let slots = (k_max - k_min + 1) as f64;
    let step = 360.0 / slots;
    let ta = params.tier_angle;
    let ext = params.tier_length_extension;

    let v_angle = ta + k as f64 * step;
    let h4_angle = ta + 270.0 + k as f64 * step;
    let h5_angle = ta + 90.0 + k as f64 * step;

    for i in 0..m {
        let set = (i + 1) as i32;
        for (parent_role, tier_role, angle) in
            [(2, 4, v_angle), (3, 5, v_angle + 180.0)]
        {
            let parent = format!("{set}_{parent_role}");
            let length = match doc.get(&parent) {
                Some(s) => s.base().length() + ext,
                None => continue,
            };
            doc.attach(
                &parent,
                StrandEnd::End,
                &format!("{set}_{tier_role}"),
                angle.rem_euclid(360.0),
                length,
            )?;
            if let Some(s) = doc.get_mut(&format!("{set}_{tier_role}")) {
                s.base_mut().has_circles = [false, false];
            }
        }
    }
    for j in 0..n {
        let set = (m + j + 1) as i32;
        for (parent_role, tier_role, angle) in [(2, 4, h4_angle), (3, 5, h5_angle)] {
            let parent = format!("{set}_{parent_role}");
            let length = match doc.get(&parent) {
                Some(s) => s.base().length() + ext,
                None => continue,
            };
            doc.attach(
                &parent,
                StrandEnd::End,
                &format!("{set}_{tier_role}"),
                angle.rem_euclid(360.0),
                length,
            )?;
            if let Some(s) = doc.get_mut(&format!("{set}_{tier_role}")) {
                s.base_mut().has_circles = [false, false];
            }
        }
    }
    Ok(())
}

/// Mask the listed vertical-role x horizontal-role pairs over every grid
/// cell. Pairs whose strands never cross simply produce no mask.
fn add_crossing_masks(
    doc: &mut StrandDocument,
    m: u32,
    n: u32,
    hp: &HandProfile,
    pairs: [(u8, u8); 2],
) -> Result<(), PatternError> {
    for (v_role, h_role) in pairs {
        for i in 0..m {
            for j in 0..n {
                let v = format!("{}_{}", i + 1, v_role);
                let h = format!("{}_{}", m + j + 1, h_role);
                if doc.get(&v).is_none() || doc.get(&h).is_none() {
                    continue;
                }
                doc.add_mask(&v, &h, hp.anchor)?;
            }
        }
    }
    Ok(())
}
