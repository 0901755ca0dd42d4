// Attachment constraint propagation. Attached strands pin their start to a
// parent endpoint and derive their end from stored polar parameters, so any
// geometry change walks the attachment tree breadth-first and re-solves each
// child from its (already updated) parent. A layer seen twice means the
// stored parent references form a cycle, and the walk aborts instead of
// looping.

use std::collections::{HashSet, VecDeque};

use crate::error::DocError;
use crate::StrandDocument;

/// Re-solve the attachment tree below `root`, which has already been
/// mutated. Returns every layer whose geometry is now current, `root`
/// included, so the caller can refresh dependent masks. Running this twice
/// in a row is a no-op the second time.
pub fn propagate_from(doc: &mut StrandDocument, root: &str) -> Result<HashSet<String>, DocError> {
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(root.to_string());
    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(root.to_string());
    while let Some(current) = queue.pop_front() {
        for child in doc.children_of(&current) {
            if !visited.insert(child.clone()) {
                return Err(DocError::AttachmentCycle(child));
            }
            refresh_attached(doc, &child, &current);
            queue.push_back(child);
        }
    }
    Ok(visited)
}

/// Pin `child`'s start to the live parent endpoint and re-derive its end
/// from the stored angle and length. Control points follow, except a locked
/// center which stays put.
fn refresh_attached(doc: &mut StrandDocument, child: &str, parent: &str) {
    let side = match doc.get(child).and_then(|s| s.as_attached()) {
        Some(a) => a.attachment_side,
        None => return,
    };
    let anchor = match doc.get(parent) {
        Some(p) => p.base().endpoint(side),
        None => return,
    };
    if let Some(a) = doc.get_mut(child).and_then(|s| s.as_attached_mut()) {
        // An unmoved anchor means the subtree already satisfies its
        // constraints; touching it anyway would churn dragged endpoints by
        // rounding error.
        if a.base.start == anchor {
            return;
        }
        a.base.start = anchor;
        a.update_end();
        a.base.update_control_points();
    }
}

/// All layers in the attached subtree rooted at `root`, root first.
/// Repeated layers (cyclic references) are skipped rather than rejected;
/// deletion wants the reachable set either way.
pub fn subtree_layers(doc: &StrandDocument, root: &str) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    seen.insert(root.to_string());
    let mut order = vec![root.to_string()];
    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(root.to_string());
    while let Some(current) = queue.pop_front() {
        for child in doc.children_of(&current) {
            if seen.insert(child.clone()) {
                order.push(child.clone());
                queue.push_back(child);
            }
        }
    }
    order
}

/// Apply a rigid transform to `root` and its whole attached subtree. Every
/// point of every strand moves, locked centers included; attached strands
/// then re-derive angle and length from their transformed endpoints so the
/// stored parameters stay consistent with the geometry.
pub fn transform_subtree(
    doc: &mut StrandDocument,
    root: &str,
    f: &dyn Fn(&mut crate::model::StrandBase),
) -> Result<HashSet<String>, DocError> {
    let mut visited: HashSet<String> = HashSet::new();
    visited.insert(root.to_string());
    let mut queue: VecDeque<String> = VecDeque::new();
    queue.push_back(root.to_string());
    while let Some(current) = queue.pop_front() {
        for child in doc.children_of(&current) {
            if !visited.insert(child.clone()) {
                return Err(DocError::AttachmentCycle(child));
            }
            queue.push_back(child);
        }
    }
    for name in &visited {
        if let Some(s) = doc.get_mut(name) {
            f(s.base_mut());
            if let Some(a) = s.as_attached_mut() {
                a.update_angle_length_from_geometry();
            }
        }
    }
    Ok(visited)
}
