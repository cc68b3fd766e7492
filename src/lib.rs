//! Bin allocator indexed by AVL trees.
//!
//! Objects of arbitrary size are placed into fixed-capacity bins. Where an
//! object goes is decided by its [`Color`]: best or worst fit over remaining
//! capacity, with ties broken towards the lowest or the highest bin id.
//! Bins, the objects inside each bin and the object -> bin directory are all
//! kept in [`AvlTree`]s, so every operation is logarithmic.
//!
//! ```
//! use binpack::{AllocationEngine, BinId, Color, ObjectId};
//!
//! let mut engine = AllocationEngine::new();
//! engine.add_bin(BinId(1), 10).unwrap();
//! engine.add_bin(BinId(2), 10).unwrap();
//!
//! let bin = engine.add_object(ObjectId(42), 8, Color::Yellow).unwrap();
//! assert_eq!(bin, BinId(2));
//! assert_eq!(engine.locate(ObjectId(42)), Ok(BinId(2)));
//! ```

pub mod avl_tree;
pub mod bin_registry;
pub mod common;
pub mod config;
pub mod engine;
pub mod error;
pub mod location;
pub mod object;
pub mod object_set;
pub mod telemetry;

pub use avl_tree::{AvlTree, Comparator, NaturalOrder};
pub use bin_registry::{Bin, BinRegistry, CapacityKey};
pub use common::{BinId, ObjectId};
pub use config::{BinSpec, ConfigError, EngineConfig};
pub use engine::{AllocationEngine, BinInfo, EngineStats};
pub use error::{AllocError, AllocResult};
pub use location::{Location, LocationDirectory};
pub use object::{Color, Fit, Object, Policy, TieBreak};
pub use object_set::ObjectSet;
pub use telemetry::{LogLevel, TelemetryError};
