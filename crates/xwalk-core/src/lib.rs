//! # Xwalk Core Library
//!
//! A library for computing solvent-accessible surface distances (SASD) between
//! candidate cross-linking sites on protein structures, following the Xwalk method.
//!
//! ## Architectural Philosophy
//!
//! The library is designed with a strict three-layer architecture to ensure a clear
//! separation of concerns, making it modular, testable, and extensible.
//!
//! - **[`core`]: The Foundation.** Contains stateless data models (`Atom`,
//!   `AtomList`), geometric primitives, van der Waals radius parameter sets,
//!   and PDB I/O utilities.
//!
//! - **[`engine`]: The Logic Core.** This stateful layer performs the distance
//!   computation. It includes the occupancy grid built over the molecular volume,
//!   the bounded multi-target shortest-path search over unoccupied grid cells,
//!   the candidate pair enumerator, and the tryptic digestion filter.
//!
//! - **[`workflows`]: The Public API.** This is the highest-level, user-facing
//!   layer. It ties the `engine` and `core` together to execute a complete
//!   distance calculation over a structure, emitting one record per candidate pair.

pub mod core;
pub mod engine;
pub mod workflows;
