//! Placement generation: turns a [`crate::detail::Detail`] and a ground mesh into placements.
//!
//! - [selection]: alpha-blended group choice and cumulative prop choice.
//! - [runner]: the sampling loop, [`runner::ScatterConfig`], and [`runner::Placement`] records.
//! - [events]: observable events and sinks for a scattering pass.
pub mod events;
pub mod runner;
pub mod selection;

/// Stream draws consumed per surface sample, whichever branch the sample takes:
/// `u`, `v`, group, prop, facing angle, scale.
pub const DRAWS_PER_SAMPLE: u64 = 6;
