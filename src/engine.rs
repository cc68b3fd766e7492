use serde::Serialize;
use tracing::debug;

use crate::bin_registry::{Bin, BinRegistry};
use crate::common::{BinId, ObjectId};
use crate::config::{ConfigError, EngineConfig};
use crate::error::{AllocError, AllocResult};
use crate::location::LocationDirectory;
use crate::object::{Color, Object};

/// Snapshot of one bin, as reported by [`AllocationEngine::bin_info`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BinInfo {
    pub id: BinId,
    /// Remaining capacity.
    pub capacity: u64,
    /// Resident objects, ascending.
    pub objects: Vec<ObjectId>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct EngineStats {
    pub bins: usize,
    pub objects: usize,
    pub free_capacity: u64,
    pub used_capacity: u64,
}

/// Places objects into bins and keeps the bin registry, each bin's member set
/// and the location directory in step.
///
/// Each object id is either absent or placed; placing it again requires
/// deleting it first. Every call either completes or fails without touching
/// any index. The engine does no locking of its own: share it behind a single
/// `Mutex` if it has to be shared at all.
#[derive(Debug, Default)]
pub struct AllocationEngine {
    bins: BinRegistry,
    locations: LocationDirectory,
}

impl AllocationEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an engine with the configured bins already provisioned.
    ///
    /// `config.log_level` is not applied here; call
    /// [`EngineConfig::init_logging`] once at startup for that.
    pub fn from_config(config: &EngineConfig) -> Result<Self, ConfigError> {
        let mut engine = Self::new();
        for spec in &config.bins {
            engine.add_bin(spec.id, spec.capacity)?;
        }
        Ok(engine)
    }

    pub fn add_bin(&mut self, id: BinId, capacity: u64) -> AllocResult<()> {
        self.bins.create_bin(id, capacity)
    }

    /// Removes an empty bin.
    pub fn remove_bin(&mut self, id: BinId) -> AllocResult<()> {
        let bin = self.bins.find_by_id(id).ok_or(AllocError::BinNotFound(id))?;
        if !bin.members().is_empty() {
            return Err(AllocError::BinNotEmpty {
                bin: id,
                objects: bin.members().len(),
            });
        }
        self.bins.remove_bin(id).map(drop)
    }

    /// Places a new object and returns the bin it went to.
    pub fn add_object(&mut self, id: ObjectId, size: u64, color: Color) -> AllocResult<BinId> {
        if size == 0 {
            return Err(AllocError::InvalidSize(id));
        }
        if self.locations.lookup(id).is_some() {
            return Err(AllocError::DuplicateObjectId(id));
        }

        let bin = self
            .bins
            .find_by_policy(size, color)
            .ok_or(AllocError::NoBinFound { size, color })?;

        // admit validates before it mutates, so a failure here leaves no trace
        self.bins.admit(bin, Object::new(id, size, color))?;
        self.locations.record(id, bin);

        debug!(object = %id, size, %color, bin = %bin, "placed object");
        Ok(bin)
    }

    /// Deletes a placed object, returning it.
    pub fn delete_object(&mut self, id: ObjectId) -> AllocResult<Object> {
        let bin = self
            .locations
            .lookup(id)
            .ok_or(AllocError::ObjectNotFound(id))?;
        let object = self.bins.evict(bin, id)?;
        self.locations.remove(id);

        debug!(object = %id, size = object.size(), bin = %bin, "deleted object");
        Ok(object)
    }

    pub fn locate(&self, id: ObjectId) -> AllocResult<BinId> {
        self.locations
            .lookup(id)
            .ok_or(AllocError::ObjectNotFound(id))
    }

    pub fn bin_info(&self, id: BinId) -> AllocResult<BinInfo> {
        let bin = self.bins.find_by_id(id).ok_or(AllocError::BinNotFound(id))?;
        Ok(BinInfo {
            id,
            capacity: bin.capacity(),
            objects: bin.members().ids(),
        })
    }

    /// Read-only view of the bins.
    pub fn bins(&self) -> &BinRegistry {
        &self.bins
    }

    pub fn bin_count(&self) -> usize {
        self.bins.len()
    }

    pub fn object_count(&self) -> usize {
        self.locations.len()
    }

    /// Totals over all bins. Capacity sums saturate at `u64::MAX`.
    pub fn stats(&self) -> EngineStats {
        self.bins.iter().fold(
            EngineStats {
                bins: self.bins.len(),
                objects: self.locations.len(),
                ..EngineStats::default()
            },
            |mut stats, bin: &Bin| {
                stats.free_capacity = stats.free_capacity.saturating_add(bin.capacity());
                stats.used_capacity = stats
                    .used_capacity
                    .saturating_add(bin.members().total_size());
                stats
            },
        )
    }
}
