use std::cmp::Ordering;

use tracing::{debug, trace};

use crate::avl_tree::{AvlTree, Comparator, NaturalOrder};
use crate::common::{BinId, ObjectId};
use crate::error::{AllocError, AllocResult};
use crate::object::{Color, Fit, Object, TieBreak};
use crate::object_set::ObjectSet;

/// A capacity-bounded container. The registry holds the only copy.
#[derive(Debug)]
pub struct Bin {
    id: BinId,
    capacity: u64,
    members: ObjectSet,
}

impl Bin {
    fn new(id: BinId, capacity: u64) -> Self {
        Bin {
            id,
            capacity,
            members: ObjectSet::new(id),
        }
    }

    pub fn id(&self) -> BinId {
        self.id
    }

    /// Remaining free capacity.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Remaining capacity plus everything currently resident, saturating at
    /// `u64::MAX`.
    pub fn provisioned(&self) -> u64 {
        self.capacity.saturating_add(self.members.total_size())
    }

    pub fn members(&self) -> &ObjectSet {
        &self.members
    }

    fn key(&self) -> CapacityKey {
        CapacityKey {
            capacity: self.capacity,
            bin: self.id,
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ByBinId;

impl Comparator<Bin> for ByBinId {
    fn compare(&self, a: &Bin, b: &Bin) -> Ordering {
        a.id.cmp(&b.id)
    }
}

/// Entry of the capacity index. Field order makes the derived `Ord` sort by
/// capacity first and id second.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct CapacityKey {
    pub capacity: u64,
    pub bin: BinId,
}

/// Bins indexed two ways: by id, where the records live, and by
/// `(capacity, id)`, which only holds keys pointing back at those records.
#[derive(Debug, Default)]
pub struct BinRegistry {
    bins: AvlTree<Bin, ByBinId>,
    by_capacity: AvlTree<CapacityKey, NaturalOrder>,
}

impl BinRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_bin(&mut self, id: BinId, capacity: u64) -> AllocResult<()> {
        if self.find_by_id(id).is_some() {
            return Err(AllocError::DuplicateBinId(id));
        }
        let bin = Bin::new(id, capacity);
        self.by_capacity.insert(bin.key());
        self.bins.insert(bin);
        debug!(bin = %id, capacity, "created bin");
        Ok(())
    }

    pub fn remove_bin(&mut self, id: BinId) -> AllocResult<Bin> {
        let bin = self
            .bins
            .remove_by(|bin| id.cmp(&bin.id))
            .ok_or(AllocError::BinNotFound(id))?;
        self.by_capacity.remove(&bin.key());
        debug!(bin = %id, "removed bin");
        Ok(bin)
    }

    pub fn find_by_id(&self, id: BinId) -> Option<&Bin> {
        self.bins.get_by(|bin| id.cmp(&bin.id))
    }

    /// Sets a bin's remaining capacity and moves it within the capacity index.
    /// The record itself, members included, stays where it is.
    ///
    /// Members are not consulted, so calling this directly changes the bin's
    /// provisioned total. `admit` and `evict` are the conserving paths.
    pub fn resize(&mut self, id: BinId, new_capacity: u64) -> AllocResult<()> {
        let bin = self
            .bins
            .get_mut_by(|bin| id.cmp(&bin.id))
            .ok_or(AllocError::BinNotFound(id))?;
        let old_capacity = bin.capacity;
        bin.capacity = new_capacity;
        self.rekey(id, old_capacity, new_capacity);
        Ok(())
    }

    /// Moves `object` into bin `id`, charging its size against the bin.
    pub fn admit(&mut self, id: BinId, object: Object) -> AllocResult<()> {
        let bin = self
            .bins
            .get_mut_by(|bin| id.cmp(&bin.id))
            .ok_or(AllocError::BinNotFound(id))?;
        bin.members.add(object, bin.capacity)?;
        let new_capacity = bin.capacity - object.size();
        self.resize(id, new_capacity)
    }

    /// Takes object `object_id` out of bin `id` and gives its size back.
    pub fn evict(&mut self, id: BinId, object_id: ObjectId) -> AllocResult<Object> {
        let bin = self
            .bins
            .get_mut_by(|bin| id.cmp(&bin.id))
            .ok_or(AllocError::BinNotFound(id))?;
        let object = bin
            .members
            .remove(object_id)
            .ok_or(AllocError::ObjectNotFound(object_id))?;
        let new_capacity = bin.capacity + object.size();
        self.resize(id, new_capacity)?;
        Ok(object)
    }

    fn rekey(&mut self, id: BinId, old_capacity: u64, new_capacity: u64) {
        if old_capacity == new_capacity {
            return;
        }
        self.by_capacity.remove(&CapacityKey {
            capacity: old_capacity,
            bin: id,
        });
        self.by_capacity.insert(CapacityKey {
            capacity: new_capacity,
            bin: id,
        });
        trace!(bin = %id, old_capacity, new_capacity, "re-keyed bin");
    }

    /// Picks a bin for an object of `size` under `color`'s policy.
    ///
    /// Every case is at most two root-to-leaf walks of the capacity index:
    /// one to find the extreme capacity, one to reach the far end of the run of
    /// bins sharing it.
    pub fn find_by_policy(&self, size: u64, color: Color) -> Option<BinId> {
        let policy = color.policy();
        let key = match policy.fit {
            Fit::Best => {
                let smallest = self.by_capacity.first_where(|key| key.capacity >= size)?;
                match policy.tie_break {
                    TieBreak::LowestId => smallest,
                    TieBreak::HighestId => {
                        let capacity = smallest.capacity;
                        self.by_capacity
                            .last_where(|key| key.capacity <= capacity)?
                    }
                }
            }
            Fit::Worst => {
                let largest = self.by_capacity.max()?;
                if largest.capacity < size {
                    return None;
                }
                match policy.tie_break {
                    TieBreak::HighestId => largest,
                    TieBreak::LowestId => {
                        let capacity = largest.capacity;
                        self.by_capacity
                            .first_where(|key| key.capacity >= capacity)?
                    }
                }
            }
        };
        Some(key.bin)
    }

    /// Bins in id order.
    pub fn iter(&self) -> impl Iterator<Item = &Bin> + '_ {
        self.bins.iter()
    }

    /// Capacity index contents, ascending by `(capacity, id)`.
    pub fn capacity_order(&self) -> impl Iterator<Item = CapacityKey> + '_ {
        self.by_capacity.iter().copied()
    }

    /// Whether both indexes list the same bins with the same capacities.
    pub fn is_consistent(&self) -> bool {
        self.bins.len() == self.by_capacity.len()
            && self.bins.iter().all(|bin| self.by_capacity.contains(&bin.key()))
    }

    pub fn len(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bins.is_empty()
    }
}
