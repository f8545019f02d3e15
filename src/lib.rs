//! # ert - Robust 2D Transform Estimation
//!
//! `ert` estimates the similarity (rotation + uniform scale + translation) or
//! full affine transform that best maps one set of 2D points onto another,
//! while tolerating a large share of mismatched pairs. It is the geometric
//! primitive beneath frame-to-frame motion estimation for video
//! stabilization.
//!
//! ## Quick Start
//!
//! ```rust
//! use ert::{estimate_rigid_transform, RansacConfig};
//! use nalgebra::Point2;
//! use rand::{rngs::StdRng, SeedableRng};
//!
//! let src = [Point2::new(0.0, 0.0), Point2::new(10.0, 0.0), Point2::new(0.0, 10.0)];
//! let dst = [Point2::new(5.0, 5.0), Point2::new(15.0, 5.0), Point2::new(5.0, 15.0)];
//!
//! let mut rng = StdRng::seed_from_u64(0);
//! let t = estimate_rigid_transform(&src, &dst, true, &RansacConfig::default(), &mut rng).unwrap();
//! assert!((t.m[(0, 2)] - 5.0).abs() < 1e-9);
//! ```
//!
//! Two images can be used instead of point arrays through
//! [`estimate_rigid_transform_images`]; a grid of points is then tracked by a
//! caller-supplied [`SparseTracker`](correspondence::SparseTracker).
//!
//! ## Building Blocks
//!
//! The consensus engine is generic over a few traits in [`core`]:
//!
//! - **[`Estimator`](crate::core::Estimator)**: sample validation, model fitting, residuals
//! - **[`Sampler`](crate::core::Sampler)**: minimal sample drawing
//! - **[`Scoring<M>`](crate::core::Scoring)**: inlier counting
//! - **[`TerminationCriterion<S>`](crate::core::TerminationCriterion)**: consensus acceptance
//! - **[`LocalOptimizer<M>`](crate::core::LocalOptimizer)**: refit of the accepted hypothesis
//!
//! ```rust
//! use ert::core::RansacEngine;
//! use ert::estimators::SimilarityEstimator;
//! use ert::samplers::UniformRandomSampler;
//! use ert::types::pack_points;
//! use ert::RansacConfig;
//! use nalgebra::Point2;
//!
//! let src: Vec<_> = (0..12)
//!     .map(|i| Point2::new((i % 4) as f64 * 8.0, (i / 4) as f64 * 8.0))
//!     .collect();
//! let dst: Vec<_> = src.iter().map(|p| Point2::new(p.x + 1.0, p.y - 2.0)).collect();
//! let data = pack_points(&src, &dst).unwrap();
//!
//! let mut engine = RansacEngine::new(
//!     RansacConfig::default(),
//!     SimilarityEstimator::new(),
//!     UniformRandomSampler::from_seed(42),
//! );
//! let result = engine.run(&data).unwrap();
//! assert_eq!(result.inliers.len(), 12);
//! ```
//!
//! ## Modules
//!
//! - **[`api`](api)**: High-level estimation functions
//! - **[`core`](core)**: Core traits and the `RansacEngine`
//! - **[`estimators`](estimators)**: Closed-form similarity and affine solvers
//! - **[`correspondence`](correspondence)**: Correspondences from an image pair
//! - **[`motion`](motion)**: Trajectory smoothing for stabilization
//! - **[`settings`](settings)**: Configuration types

pub mod api;
pub mod core;
pub mod correspondence;
pub mod error;
pub mod estimators;
pub mod geometry;
pub mod models;
pub mod motion;
pub mod samplers;
pub mod scoring;
pub mod settings;
pub mod types;
pub mod utils;

pub use api::{
    estimate_correspondences, estimate_rigid_transform, estimate_rigid_transform_images,
};
pub use crate::core::{
    EstimationResult, Estimator, LocalOptimizer, Sampler, Scoring, TerminationCriterion,
};
pub use error::EstimationError;
pub use models::{MotionModel, TransformModel};
pub use settings::{ImageSamplingConfig, RansacConfig, TrackerParams};
