use std::cmp::Ordering;

use crate::avl_tree::{AvlTree, Comparator};
use crate::common::{BinId, ObjectId};
use crate::error::{AllocError, AllocResult};
use crate::object::Object;

#[derive(Debug, Clone, Copy, Default)]
pub struct ByObjectId;

impl Comparator<Object> for ByObjectId {
    fn compare(&self, a: &Object, b: &Object) -> Ordering {
        a.id().cmp(&b.id())
    }
}

/// Objects resident in one bin, ordered by id.
#[derive(Debug)]
pub struct ObjectSet {
    bin: BinId,
    objects: AvlTree<Object, ByObjectId>,
    total_size: u64,
}

impl ObjectSet {
    pub fn new(bin: BinId) -> Self {
        ObjectSet {
            bin,
            objects: AvlTree::default(),
            total_size: 0,
        }
    }

    /// Admits `object` given the bin's current remaining capacity.
    pub fn add(&mut self, object: Object, remaining_capacity: u64) -> AllocResult<()> {
        if object.size() > remaining_capacity {
            return Err(AllocError::InsufficientCapacity {
                bin: self.bin,
                size: object.size(),
                remaining: remaining_capacity,
            });
        }
        if !self.objects.insert(object) {
            return Err(AllocError::DuplicateObjectId(object.id()));
        }
        self.total_size += object.size();
        Ok(())
    }

    pub fn remove(&mut self, id: ObjectId) -> Option<Object> {
        let object = self.objects.remove_by(|object| id.cmp(&object.id()))?;
        self.total_size -= object.size();
        Some(object)
    }

    pub fn get(&self, id: ObjectId) -> Option<&Object> {
        self.objects.get_by(|object| id.cmp(&object.id()))
    }

    /// Resident ids, ascending.
    pub fn ids(&self) -> Vec<ObjectId> {
        self.objects.iter().map(Object::id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Object> + '_ {
        self.objects.iter()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Sum of resident object sizes.
    pub fn total_size(&self) -> u64 {
        self.total_size
    }
}
