// Document core for a strand (ribbon) pattern editor. Strands live in a
// slot arena in insertion order; a layer-name index gives O(1) lookup, and
// attachment references are layer names, never pointers. Every applied edit
// bumps `geom_ver` so a host can cheaply detect staleness.

pub mod error;
pub mod groups;
mod json;
pub mod model;
pub mod geometry {
    pub mod intersect;
    pub mod limits;
    pub mod math;
    pub mod ribbon;
    pub mod tolerance;
}
pub mod algorithms {
    pub mod mask;
    pub mod pattern;
    pub mod propagate;
}

use std::collections::HashMap;
use std::fmt;

pub use crate::error::{DiagSink, DocError, LoadError, NullSink, PatternError};

use crate::algorithms::mask::{derive_mask, MaskAnchor};
use crate::algorithms::propagate;
use crate::geometry::math::distance;
use crate::geometry::ribbon;
use crate::geometry::tolerance::EPS_LEN;
use crate::groups::{Group, GroupMap};
use crate::model::{AttachedStrand, Point, Strand, StrandBase, StrandEnd};

pub struct StrandDocument {
    pub(crate) strands: Vec<Option<Strand>>,
    pub(crate) index: HashMap<String, usize>,
    pub(crate) groups: GroupMap,
    geom_ver: u64,
    diag: Option<Box<dyn DiagSink>>,
}

impl Default for StrandDocument {
    fn default() -> StrandDocument {
        StrandDocument::new()
    }
}

// Manual impl: the diagnostics sink is an opaque trait object.
impl fmt::Debug for StrandDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StrandDocument")
            .field("strands", &self.strands)
            .field("groups", &self.groups)
            .field("geom_ver", &self.geom_ver)
            .finish_non_exhaustive()
    }
}

impl StrandDocument {
    pub fn new() -> StrandDocument {
        StrandDocument {
            strands: Vec::new(),
            index: HashMap::new(),
            groups: GroupMap::new(),
            geom_ver: 0,
            diag: None,
        }
    }

    /// Install an edit observer. Pass `None` to silence the document again.
    pub fn set_diag_sink(&mut self, sink: Option<Box<dyn DiagSink>>) {
        self.diag = sink;
    }

    pub(crate) fn emit(&self, op: &str, layer: &str, detail: &str) {
        if let Some(d) = &self.diag {
            d.event(op, layer, detail);
        }
    }

    pub fn geom_version(&self) -> u64 {
        self.geom_ver
    }

    pub(crate) fn bump(&mut self) {
        self.geom_ver += 1;
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Strands in insertion order, deleted slots skipped.
    pub fn strands(&self) -> impl Iterator<Item = &Strand> {
        self.strands.iter().filter_map(|s| s.as_ref())
    }

    pub fn get(&self, layer: &str) -> Option<&Strand> {
        self.index.get(layer).and_then(|&i| self.strands[i].as_ref())
    }

    pub(crate) fn get_mut(&mut self, layer: &str) -> Option<&mut Strand> {
        match self.index.get(layer) {
            Some(&i) => self.strands[i].as_mut(),
            None => None,
        }
    }

    pub fn groups(&self) -> &GroupMap {
        &self.groups
    }

    // ---- structural edits ----

    pub fn add_strand(&mut self, strand: Strand) -> Result<(), DocError> {
        let name = strand.layer_name().to_string();
        if self.index.contains_key(&name) {
            return Err(DocError::DuplicateLayer(name));
        }
        let slot = self.strands.len();
        self.strands.push(Some(strand));
        self.index.insert(name.clone(), slot);
        self.bump();
        self.emit("add", &name, "");
        Ok(())
    }

    /// Create an attached strand rooted at one endpoint of `parent`. The
    /// child inherits the parent's width and palette; the parent grows an
    /// attachment circle on that side.
    pub fn attach(
        &mut self,
        parent: &str,
        side: StrandEnd,
        layer_name: &str,
        angle: f64,
        length: f64,
    ) -> Result<(), DocError> {
        if self.index.contains_key(layer_name) {
            return Err(DocError::DuplicateLayer(layer_name.to_string()));
        }
        let p = match self.get(parent) {
            Some(s) => s,
            None => return Err(DocError::UnknownLayer(parent.to_string())),
        };
        if p.as_masked().is_some() {
            return Err(DocError::NotEditable(parent.to_string()));
        }
        let pb = p.base();
        let start = pb.endpoint(side);
        let mut base = StrandBase::new(layer_name, pb.set_number, start, start, pb.width);
        base.color = pb.color;
        base.stroke_color = pb.stroke_color;
        base.stroke_width = pb.stroke_width;
        base.has_circles = [true, false];
        let mut child = AttachedStrand {
            base,
            attached_to: parent.to_string(),
            attachment_side: side,
            angle,
            length,
        };
        child.update_end();
        child.base.update_control_points();
        if let Some(p) = self.get_mut(parent) {
            p.base_mut().has_circles[side.index()] = true;
        }
        self.add_strand(Strand::Attached(child))?;
        self.emit("attach", layer_name, parent);
        Ok(())
    }

    /// Derive and insert a masked strand over the crossing of `first` and
    /// `second`. Returns the new layer name, or `Ok(None)` when the two
    /// centerlines do not intersect.
    pub fn add_mask(
        &mut self,
        first: &str,
        second: &str,
        anchor: MaskAnchor,
    ) -> Result<Option<String>, DocError> {
        let a = match self.get(first) {
            Some(s) => s,
            None => return Err(DocError::UnknownLayer(first.to_string())),
        };
        let b = match self.get(second) {
            Some(s) => s,
            None => return Err(DocError::UnknownLayer(second.to_string())),
        };
        match derive_mask(first, a.base(), second, b.base(), anchor) {
            Some(m) => {
                let name = m.base.layer_name.clone();
                self.add_strand(Strand::Masked(m))?;
                self.emit("mask", &name, "");
                Ok(Some(name))
            }
            None => Ok(None),
        }
    }

    /// Delete a strand together with everything that depends on it: the
    /// whole attached subtree below it, and any mask referencing a removed
    /// layer. Group membership is purged as well.
    pub fn delete_strand(&mut self, layer: &str) -> Result<(), DocError> {
        if !self.index.contains_key(layer) {
            return Err(DocError::UnknownLayer(layer.to_string()));
        }
        let mut doomed = propagate::subtree_layers(self, layer);
        // Masks referencing any doomed layer go with it.
        loop {
            let mut extra = Vec::new();
            for s in self.strands() {
                if let Some(m) = s.as_masked() {
                    if doomed.contains(&m.base.layer_name) {
                        continue;
                    }
                    if doomed.contains(&m.first_selected_strand)
                        || doomed.contains(&m.second_selected_strand)
                    {
                        extra.push(m.base.layer_name.clone());
                    }
                }
            }
            if extra.is_empty() {
                break;
            }
            doomed.extend(extra);
        }
        for name in &doomed {
            if let Some(slot) = self.index.remove(name) {
                self.strands[slot] = None;
            }
            self.groups.purge_layer(name);
        }
        self.bump();
        self.emit("delete", layer, &format!("removed {}", doomed.len()));
        Ok(())
    }

    // ---- geometric edits ----

    /// Move one endpoint and re-solve the constraint network below the
    /// strand. Masked strands are derived and refuse the edit; an attached
    /// strand's start is owned by its parent.
    pub fn set_endpoint(&mut self, layer: &str, which: StrandEnd, p: Point) -> Result<(), DocError> {
        match self.get(layer) {
            None => return Err(DocError::UnknownLayer(layer.to_string())),
            Some(Strand::Masked(_)) => return Err(DocError::NotEditable(layer.to_string())),
            Some(Strand::Attached(_)) if which == StrandEnd::Start => {
                return Err(DocError::PinnedStart(layer.to_string()))
            }
            Some(_) => {}
        }
        if let Some(s) = self.get_mut(layer) {
            s.base_mut().set_endpoint(which, p);
            if let Some(a) = s.as_attached_mut() {
                a.update_angle_length_from_geometry();
            }
            s.base_mut().update_control_points();
        }
        let touched = propagate::propagate_from(self, layer)?;
        self.refresh_masks_referencing(&touched);
        self.bump();
        self.emit("set_endpoint", layer, "");
        Ok(())
    }

    /// Apply a rigid transform rooted at `layer`. A plain root carries its
    /// whole subtree rigidly. An attached root's start stays pinned to the
    /// parent endpoint, so only its free end takes the transform and the
    /// subtree below follows through propagation.
    fn rigid_transform(
        &mut self,
        layer: &str,
        f: &dyn Fn(&mut StrandBase),
    ) -> Result<std::collections::HashSet<String>, DocError> {
        if self.get(layer).and_then(|s| s.as_attached()).is_none() {
            return propagate::transform_subtree(self, layer, f);
        }
        if let Some(a) = self.get_mut(layer).and_then(|s| s.as_attached_mut()) {
            let mut scratch = a.base.clone();
            f(&mut scratch);
            a.base.end = scratch.end;
            a.update_angle_length_from_geometry();
            a.base.update_control_points();
        }
        propagate::propagate_from(self, layer)
    }

    /// Rigid translation of a strand and its whole attached subtree. An
    /// attached strand keeps its start welded to the parent; only the free
    /// end (and everything hanging off it) moves.
    pub fn move_strand(&mut self, layer: &str, dx: f64, dy: f64) -> Result<(), DocError> {
        match self.get(layer) {
            None => return Err(DocError::UnknownLayer(layer.to_string())),
            Some(Strand::Masked(_)) => return Err(DocError::NotEditable(layer.to_string())),
            Some(_) => {}
        }
        let touched = self.rigid_transform(layer, &|b| b.translate(dx, dy))?;
        self.refresh_masks_referencing(&touched);
        self.bump();
        self.emit("move", layer, "");
        Ok(())
    }

    /// Rigid rotation of a strand and its attached subtree around `pivot`.
    /// An attached strand keeps its start pinned; only its end swings.
    pub fn rotate_strand(&mut self, layer: &str, pivot: Point, degrees: f64) -> Result<(), DocError> {
        match self.get(layer) {
            None => return Err(DocError::UnknownLayer(layer.to_string())),
            Some(Strand::Masked(_)) => return Err(DocError::NotEditable(layer.to_string())),
            Some(_) => {}
        }
        let touched = self.rigid_transform(layer, &|b| b.rotate_about(pivot, degrees))?;
        self.refresh_masks_referencing(&touched);
        self.bump();
        self.emit("rotate", layer, "");
        Ok(())
    }

    /// Reset control points to their default chord placement. A locked
    /// center keeps its position.
    pub fn update_control_points(&mut self, layer: &str) -> Result<(), DocError> {
        match self.get_mut(layer) {
            Some(s) => {
                s.base_mut().update_control_points();
                self.bump();
                Ok(())
            }
            None => Err(DocError::UnknownLayer(layer.to_string())),
        }
    }

    /// Place control points explicitly. Passing a center implies the user
    /// took it over, so the lock engages.
    pub fn set_control_points(
        &mut self,
        layer: &str,
        cp1: Point,
        cp2: Point,
        center: Option<Point>,
    ) -> Result<(), DocError> {
        match self.get_mut(layer) {
            Some(s) => {
                let b = s.base_mut();
                b.control_point1 = cp1;
                b.control_point2 = cp2;
                if let Some(c) = center {
                    b.control_point_center = c;
                    b.control_point_center_locked = true;
                } else if !b.control_point_center_locked {
                    b.control_point_center = Point::midpoint(cp1, cp2);
                }
                self.bump();
                Ok(())
            }
            None => Err(DocError::UnknownLayer(layer.to_string())),
        }
    }

    pub fn lock_center(&mut self, layer: &str, locked: bool) -> Result<(), DocError> {
        match self.get_mut(layer) {
            Some(s) => {
                s.base_mut().control_point_center_locked = locked;
                self.bump();
                Ok(())
            }
            None => Err(DocError::UnknownLayer(layer.to_string())),
        }
    }

    pub fn add_deletion_rectangle(
        &mut self,
        layer: &str,
        rect: model::DeletionRect,
    ) -> Result<(), DocError> {
        match self.get_mut(layer) {
            Some(Strand::Masked(m)) => {
                m.deletion_rectangles.push(rect);
                self.bump();
                Ok(())
            }
            Some(_) => Err(DocError::NotEditable(layer.to_string())),
            None => Err(DocError::UnknownLayer(layer.to_string())),
        }
    }

    // ---- queries ----

    /// Layer names of the strands attached directly to `layer`.
    pub fn children_of(&self, layer: &str) -> Vec<String> {
        self.strands()
            .filter_map(|s| s.as_attached())
            .filter(|a| a.attached_to == layer)
            .map(|a| a.base.layer_name.clone())
            .collect()
    }

    /// Outline polygon of the thickened strand, empty when degenerate.
    pub fn outline(&self, layer: &str) -> Option<Vec<Point>> {
        self.get(layer).map(|s| ribbon::ribbon_outline(s.base()))
    }

    pub fn contains_point(&self, layer: &str, p: Point) -> bool {
        match self.get(layer) {
            Some(s) => ribbon::polygon_contains(&ribbon::ribbon_outline(s.base()), p),
            None => false,
        }
    }

    /// Degenerate strands (zero length or non-finite geometry) are kept in
    /// the document but cannot be picked.
    pub fn is_selectable(&self, layer: &str) -> bool {
        match self.get(layer) {
            Some(s) => {
                let b = s.base();
                b.start.is_finite() && b.end.is_finite() && distance(b.start, b.end) > EPS_LEN
            }
            None => false,
        }
    }

    // ---- mask maintenance ----

    /// Re-derive cached mask geometry after any referenced strand moved.
    /// The base center follows the new crossing; the edited center and the
    /// deletion rectangles ride along by the same delta.
    pub(crate) fn refresh_masks_referencing(&mut self, moved: &std::collections::HashSet<String>) {
        let mask_layers: Vec<String> = self
            .strands()
            .filter_map(|s| s.as_masked())
            .filter(|m| {
                moved.contains(&m.first_selected_strand) || moved.contains(&m.second_selected_strand)
            })
            .map(|m| m.base.layer_name.clone())
            .collect();
        for name in mask_layers {
            self.refresh_mask(&name);
        }
    }

    pub(crate) fn refresh_mask(&mut self, layer: &str) {
        let (first, second) = match self.get(layer).and_then(|s| s.as_masked()) {
            Some(m) => (m.first_selected_strand.clone(), m.second_selected_strand.clone()),
            None => return,
        };
        let (a, b) = match (self.get(&first), self.get(&second)) {
            (Some(a), Some(b)) => (a.base().clone(), b.base().clone()),
            _ => return,
        };
        let crossing = geometry::intersect::segment_intersection(a.start, a.end, b.start, b.end);
        if let Some(Strand::Masked(m)) = self.get_mut(layer) {
            // The mask base mirrors whichever referenced strand anchored it.
            let src = match m.anchor {
                MaskAnchor::First => &a,
                MaskAnchor::Second => &b,
            };
            m.base.start = src.start;
            m.base.end = src.end;
            m.base.update_control_points();
            if let Some(c) = crossing {
                let dx = c.x - m.base_center_point.x;
                let dy = c.y - m.base_center_point.y;
                m.base_center_point = c;
                m.edited_center_point = m.edited_center_point.translated(dx, dy);
                for r in &mut m.deletion_rectangles {
                    r.translate(dx, dy);
                }
            }
        }
    }

    // ---- groups ----

    /// Create a named group from existing layers. Main strands are the
    /// non-attached members; the center averages member endpoints.
    pub fn create_group(&mut self, name: &str, members: &[&str]) -> Result<(), DocError> {
        for m in members {
            if !self.index.contains_key(*m) {
                return Err(DocError::UnknownLayer(m.to_string()));
            }
        }
        let strands: Vec<String> = members.iter().map(|s| s.to_string()).collect();
        let main_strands: Vec<String> = members
            .iter()
            .copied()
            .filter(|m| matches!(self.get(m), Some(Strand::Plain(_))))
            .map(|s| s.to_string())
            .collect();
        let center = self.members_center(&strands);
        self.groups.insert(name, Group { strands, main_strands, center });
        self.bump();
        self.emit("group", name, "create");
        Ok(())
    }

    fn members_center(&self, members: &[String]) -> Point {
        let mut sx = 0.0;
        let mut sy = 0.0;
        let mut n = 0usize;
        for m in members {
            if let Some(s) = self.get(m) {
                let b = s.base();
                sx += b.start.x + b.end.x;
                sy += b.start.y + b.end.y;
                n += 2;
            }
        }
        if n == 0 {
            Point::ZERO
        } else {
            Point::new(sx / n as f64, sy / n as f64)
        }
    }

    /// Members whose attachment ancestry stays outside the group. Only
    /// these are transformed directly; the rest follow their parents.
    fn group_roots(&self, members: &[String]) -> Vec<String> {
        let member_set: std::collections::HashSet<&str> =
            members.iter().map(|s| s.as_str()).collect();
        let mut roots = Vec::new();
        'outer: for m in members {
            if self.get(m).and_then(|s| s.as_masked()).is_some() {
                continue; // derived, follows its references
            }
            let mut cur = m.clone();
            let mut hops = 0;
            while let Some(a) = self.get(&cur).and_then(|s| s.as_attached()) {
                if member_set.contains(a.attached_to.as_str()) {
                    continue 'outer;
                }
                cur = a.attached_to.clone();
                hops += 1;
                if hops > self.strands.len() {
                    break; // cyclic reference, treat as root
                }
            }
            roots.push(m.clone());
        }
        roots
    }

    pub fn move_group(&mut self, name: &str, dx: f64, dy: f64) -> Result<(), DocError> {
        let members = match self.groups.get(name) {
            Some(g) => g.strands.clone(),
            None => return Err(DocError::UnknownLayer(name.to_string())),
        };
        let mut touched = std::collections::HashSet::new();
        for root in self.group_roots(&members) {
            touched.extend(self.rigid_transform(&root, &|b| b.translate(dx, dy))?);
        }
        self.refresh_masks_referencing(&touched);
        if let Some(g) = self.groups.get_mut(name) {
            g.center = g.center.translated(dx, dy);
        }
        self.bump();
        self.emit("group", name, "move");
        Ok(())
    }

    pub fn rotate_group(&mut self, name: &str, degrees: f64) -> Result<(), DocError> {
        let (members, center) = match self.groups.get(name) {
            Some(g) => (g.strands.clone(), g.center),
            None => return Err(DocError::UnknownLayer(name.to_string())),
        };
        let mut touched = std::collections::HashSet::new();
        for root in self.group_roots(&members) {
            touched.extend(self.rigid_transform(&root, &|b| b.rotate_about(center, degrees))?);
        }
        self.refresh_masks_referencing(&touched);
        self.bump();
        self.emit("group", name, "rotate");
        Ok(())
    }

    // ---- persistence ----

    pub fn to_json(&self) -> serde_json::Value {
        json::to_json_impl(self)
    }

    pub fn to_json_string(&self) -> String {
        self.to_json().to_string()
    }

    pub fn from_json(v: &serde_json::Value) -> Result<StrandDocument, LoadError> {
        json::from_json_impl(v)
    }

    pub fn from_json_str(s: &str) -> Result<StrandDocument, LoadError> {
        let v: serde_json::Value = serde_json::from_str(s)?;
        json::from_json_impl(&v)
    }
}
