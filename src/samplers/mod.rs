//! Minimal-sample drawing strategies.
//!
//! Only uniform sampling without replacement is provided; the engine accepts
//! any [`Sampler`](crate::core::Sampler) so callers can plug in their own.

pub mod uniform;

pub use uniform::UniformRandomSampler;
