// Named strand groups. A group is an ordered list of member layer names plus
// the subset that anchors transforms (main strands) and a cached center.
// Membership is by layer name; the document purges names on deletion.

use std::collections::BTreeMap;

use crate::model::Point;

#[derive(Clone, Debug, Default)]
pub struct Group {
    pub strands: Vec<String>,
    pub main_strands: Vec<String>,
    pub center: Point,
}

#[derive(Clone, Debug, Default)]
pub struct GroupMap {
    groups: BTreeMap<String, Group>,
}

impl GroupMap {
    pub fn new() -> GroupMap {
        GroupMap::default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Group> {
        self.groups.get(name)
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut Group> {
        self.groups.get_mut(name)
    }

    pub fn insert(&mut self, name: &str, group: Group) {
        self.groups.insert(name.to_string(), group);
    }

    pub fn remove(&mut self, name: &str) -> Option<Group> {
        self.groups.remove(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Group)> {
        self.groups.iter()
    }

    /// Drop a layer name from every group's membership. Groups left with no
    /// strands are removed entirely.
    pub fn purge_layer(&mut self, layer: &str) {
        for g in self.groups.values_mut() {
            g.strands.retain(|s| s != layer);
            g.main_strands.retain(|s| s != layer);
        }
        self.groups.retain(|_, g| !g.strands.is_empty());
    }

}
