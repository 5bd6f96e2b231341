//! # tracelens-outline
//!
//! Turns a flat, ordered trace into a navigable outline of steps.
//!
//! The only signal used is the sequence of source locations: a block of
//! consecutive locations that repeats back-to-back is reported as a loop,
//! and the body of every iteration is grouped again so nested loops show up
//! as nested groups.
//!
//! ## Key Types
//!
//! - [`Location`] - The `(line, file)` pair the engine compares
//! - [`StepGroup`] - A single step or a detected loop
//! - [`LoopIteration`] - One pass through a loop body
//!
//! Groups never own entries. They refer to positions in the caller's entry
//! slice, so building an outline only allocates the outline itself.

mod group;

pub use group::{flatten, group_steps, IndexRange, Location, LoopIteration, StepGroup};
