//! Errors returned by the allocator.
//!
//! None of these are fatal: a failed call leaves every index exactly as it was.

use thiserror::Error;

use crate::common::{BinId, ObjectId};
use crate::object::Color;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AllocError {
    #[error("bin {0} already exists")]
    DuplicateBinId(BinId),

    #[error("bin not found: {0}")]
    BinNotFound(BinId),

    /// Removing a bin that still holds objects would orphan their locations.
    #[error("bin {bin} still holds {objects} object(s)")]
    BinNotEmpty { bin: BinId, objects: usize },

    #[error("object not found: {0}")]
    ObjectNotFound(ObjectId),

    #[error("object {0} is already placed")]
    DuplicateObjectId(ObjectId),

    #[error("no bin can hold a {color} object of size {size}")]
    NoBinFound { size: u64, color: Color },

    #[error("bin {bin} has {remaining} left, cannot fit size {size}")]
    InsufficientCapacity { bin: BinId, size: u64, remaining: u64 },

    #[error("object {0} has zero size")]
    InvalidSize(ObjectId),
}

pub type AllocResult<T> = Result<T, AllocError>;
