#![warn(missing_docs)]
#![doc = include_str!("../README.md")]
#![cfg_attr(not(feature = "std"), no_std)]

extern crate alloc;

/// The deterministic polynomial hasher.
///
/// This module provides the crate's default hashing scheme: a base-31
/// polynomial over byte streams with staggered XOR folding for integer
/// fields.
pub mod hasher;

pub mod probe_table;

/// A self-keyed record set over the quadratic-probing table.
///
/// This module provides a `ProbeSet` that wraps the `ProbeTable` and
/// provides a standard set interface with configurable hashers, plus the
/// index-ordered slot report.
pub mod probe_set;

/// The tabletop miniature record type.
pub mod record;

pub use hasher::PolyHashBuilder;
pub use hasher::PolyHasher;
pub use probe_set::ProbeSet;
pub use probe_table::Entry;
pub use probe_table::ProbeTable;
pub use probe_table::SlotState;
pub use record::Miniature;
