use std::cmp::Ordering;

use crate::avl_tree::{AvlTree, Comparator};
use crate::common::{BinId, ObjectId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub object: ObjectId,
    pub bin: BinId,
}

#[derive(Debug, Clone, Copy, Default)]
struct ByObject;

impl Comparator<Location> for ByObject {
    fn compare(&self, a: &Location, b: &Location) -> Ordering {
        a.object.cmp(&b.object)
    }
}

/// Global object id -> bin id index, so deleting or locating an object never
/// has to scan the bins.
#[derive(Debug, Default)]
pub struct LocationDirectory {
    entries: AvlTree<Location, ByObject>,
}

impl LocationDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records where `object` lives. Returns false if it already had an entry,
    /// which is left unchanged.
    pub fn record(&mut self, object: ObjectId, bin: BinId) -> bool {
        self.entries.insert(Location { object, bin })
    }

    pub fn remove(&mut self, object: ObjectId) -> Option<BinId> {
        self.entries
            .remove_by(|entry| object.cmp(&entry.object))
            .map(|entry| entry.bin)
    }

    pub fn lookup(&self, object: ObjectId) -> Option<BinId> {
        self.entries
            .get_by(|entry| object.cmp(&entry.object))
            .map(|entry| entry.bin)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Location> + '_ {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
