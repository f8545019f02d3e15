//! Core traits and the RANSAC consensus engine.
//!
//! The engine is assembled from small components:
//! - [`Estimator`]: validates minimal samples, fits models, measures residuals.
//! - [`Sampler`]: draws candidate minimal samples.
//! - [`Scoring`]: counts the consensus set of a hypothesis.
//! - [`TerminationCriterion`]: decides whether a consensus set is good enough.
//! - [`LocalOptimizer`]: refines the accepted hypothesis on its inliers.
//!
//! [`RansacEngine`] holds no state between runs beyond its components; the
//! sampler owns (or borrows) the only source of randomness.

use log::{debug, trace};

use crate::error::EstimationError;
use crate::geometry::bounding_box;
use crate::scoring::{RansacInlierCountScoring, Score};
use crate::settings::RansacConfig;
use crate::types::{destination, DataMatrix};

/// Estimator responsible for generating model hypotheses from samples.
pub trait Estimator {
    /// Model type produced by this estimator.
    type Model: Clone;

    /// Size of a minimal sample for this estimator.
    fn sample_size(&self) -> usize;

    /// Check whether a given sample is geometrically valid.
    fn is_valid_sample(&self, data: &DataMatrix, sample: &[usize]) -> bool;

    /// Fit a model to the given rows (minimal or not).
    fn estimate_model(
        &self,
        data: &DataMatrix,
        sample: &[usize],
    ) -> Result<Self::Model, EstimationError>;

    /// Non-negative residual of row `row` under `model`.
    fn residual(&self, data: &DataMatrix, model: &Self::Model, row: usize) -> f64;
}

/// Sampler responsible for drawing minimal samples from the data.
pub trait Sampler {
    /// Draw a sample of `sample_size` elements into `out_indices`.
    ///
    /// Returns `false` if a sample could not be drawn at all.
    fn sample(
        &mut self,
        data: &DataMatrix,
        sample_size: usize,
        out_indices: &mut [usize],
    ) -> bool;
}

impl<S: Sampler + ?Sized> Sampler for &mut S {
    fn sample(
        &mut self,
        data: &DataMatrix,
        sample_size: usize,
        out_indices: &mut [usize],
    ) -> bool {
        (**self).sample(data, sample_size, out_indices)
    }
}

/// Scoring strategy used to evaluate model quality and determine inliers.
pub trait Scoring<M> {
    /// Score type – must support ordering for "better than" comparisons.
    type Score: Clone + PartialOrd;

    /// Inlier/outlier threshold for residuals in the chosen domain.
    fn threshold(&self) -> f64;

    /// Score a model and write its inlier rows into `inliers_out`.
    fn score(&self, data: &DataMatrix, model: &M, inliers_out: &mut Vec<usize>) -> Self::Score;
}

/// Refinement of an accepted hypothesis using its consensus set.
pub trait LocalOptimizer<M> {
    fn run(
        &mut self,
        data: &DataMatrix,
        inliers: &[usize],
        model: &M,
    ) -> Result<M, EstimationError>;
}

/// Least-squares optimizer that refits the model on all inliers.
///
/// A consensus set smaller than a minimal sample cannot be refitted and is
/// reported as `InsufficientPoints` rather than passing the hypothesis through.
pub struct LeastSquaresOptimizer<'a, E>
where
    E: Estimator,
{
    estimator: &'a E,
}

impl<'a, E> LeastSquaresOptimizer<'a, E>
where
    E: Estimator,
{
    pub fn new(estimator: &'a E) -> Self {
        Self { estimator }
    }
}

impl<E> LocalOptimizer<E::Model> for LeastSquaresOptimizer<'_, E>
where
    E: Estimator,
{
    fn run(
        &mut self,
        data: &DataMatrix,
        inliers: &[usize],
        _model: &E::Model,
    ) -> Result<E::Model, EstimationError> {
        if inliers.len() < self.estimator.sample_size() {
            return Err(EstimationError::InsufficientPoints {
                count: inliers.len(),
            });
        }
        self.estimator.estimate_model(data, inliers)
    }
}

/// Stopping rule evaluated after every scored hypothesis.
pub trait TerminationCriterion<S> {
    /// Whether `score` is good enough to stop searching.
    fn check(&self, data: &DataMatrix, score: &S) -> bool;
}

/// Accept the first hypothesis whose inliers make up at least
/// `min_inlier_ratio` of all correspondences and are enough to refit the
/// model (`min_inliers`, the minimal sample size).
#[derive(Debug, Clone, Copy)]
pub struct InlierRatioTermination {
    pub min_inlier_ratio: f64,
    pub min_inliers: usize,
}

impl InlierRatioTermination {
    pub fn new(min_inlier_ratio: f64, min_inliers: usize) -> Self {
        Self {
            min_inlier_ratio,
            min_inliers,
        }
    }
}

impl TerminationCriterion<Score> for InlierRatioTermination {
    fn check(&self, data: &DataMatrix, score: &Score) -> bool {
        score.inlier_count >= self.min_inliers
            && score.inlier_count as f64 >= data.nrows() as f64 * self.min_inlier_ratio
    }
}

/// Successful outcome of one engine run.
#[derive(Debug, Clone)]
pub struct EstimationResult<M> {
    /// Model refitted on the full consensus set.
    pub model: M,
    /// Model fitted to the accepted minimal sample.
    pub hypothesis: M,
    /// Rows of the accepted minimal sample.
    pub sample: Vec<usize>,
    /// Rows that agreed with `hypothesis`, in input order.
    pub inliers: Vec<usize>,
    pub score: Score,
    /// Residual threshold used for the inlier test.
    pub threshold: f64,
    /// Number of outer iterations performed, including the accepted one.
    pub iterations: usize,
}

/// Progress of one outer iteration.
enum Step<M> {
    Accepted { hypothesis: M, score: Score },
    Retrying,
}

/// RANSAC consensus engine.
///
/// Each iteration draws a valid minimal sample (redrawing up to
/// `max_iters` times), fits a hypothesis and counts its inliers. The first
/// hypothesis passing the inlier-ratio test wins and is refitted on its
/// inliers.
pub struct RansacEngine<E, Sa>
where
    E: Estimator,
    Sa: Sampler,
{
    pub config: RansacConfig,
    pub estimator: E,
    pub sampler: Sa,
}

impl<E, Sa> RansacEngine<E, Sa>
where
    E: Estimator,
    Sa: Sampler,
{
    pub fn new(config: RansacConfig, estimator: E, sampler: Sa) -> Self {
        Self {
            config,
            estimator,
            sampler,
        }
    }

    /// Run the consensus search over `data` (one correspondence per row).
    pub fn run(
        &mut self,
        data: &DataMatrix,
    ) -> Result<EstimationResult<E::Model>, EstimationError> {
        let Self {
            config,
            estimator,
            sampler,
        } = self;
        let estimator = &*estimator;

        let count = data.nrows();
        let sample_size = estimator.sample_size();
        if count < sample_size {
            return Err(EstimationError::InsufficientPoints { count });
        }

        let extent = bounding_box((0..count).map(|r| destination(data, r))).max_extent();
        let threshold = extent * config.threshold_ratio;
        debug!(
            "ransac over {count} correspondences, inlier threshold {threshold:.4}, \
             at most {} sample draws",
            config.max_sample_draws()
        );

        let scoring = RansacInlierCountScoring::<E::Model, _>::new(threshold, |d, m, i| {
            estimator.residual(d, m, i)
        });
        let termination = InlierRatioTermination::new(config.min_inlier_ratio, sample_size);

        let mut sample = vec![0usize; sample_size];
        let mut inliers = Vec::with_capacity(count);

        for iteration in 0..config.max_iters {
            if !draw_valid_sample(estimator, sampler, data, config.max_iters, &mut sample) {
                debug!(
                    "no valid sample after {} draws at iteration {iteration}",
                    config.max_iters
                );
                return Err(EstimationError::DegenerateSampleExhausted { iteration });
            }

            let step = match estimator.estimate_model(data, &sample) {
                Ok(hypothesis) => {
                    let score = scoring.score(data, &hypothesis, &mut inliers);
                    trace!(
                        "iteration {iteration}: sample {sample:?} has {} inliers",
                        score.inlier_count
                    );
                    if termination.check(data, &score) {
                        Step::Accepted { hypothesis, score }
                    } else {
                        Step::Retrying
                    }
                }
                Err(err) => {
                    trace!("iteration {iteration}: fit failed: {err}");
                    Step::Retrying
                }
            };

            if let Step::Accepted { hypothesis, score } = step {
                debug!(
                    "accepted hypothesis at iteration {iteration} with {}/{count} inliers ({:.2})",
                    score.inlier_count,
                    score.inlier_ratio(count)
                );
                let model = LeastSquaresOptimizer::new(estimator).run(data, &inliers, &hypothesis)?;
                return Ok(EstimationResult {
                    model,
                    hypothesis,
                    sample,
                    inliers,
                    score,
                    threshold,
                    iterations: iteration + 1,
                });
            }
        }

        debug!("no consensus after {} iterations", config.max_iters);
        Err(EstimationError::RansacExhausted {
            iterations: config.max_iters,
        })
    }
}

/// Draw samples until the estimator accepts one, at most `budget` times.
fn draw_valid_sample<E, Sa>(
    estimator: &E,
    sampler: &mut Sa,
    data: &DataMatrix,
    budget: usize,
    sample: &mut [usize],
) -> bool
where
    E: Estimator,
    Sa: Sampler,
{
    let size = sample.len();
    (0..budget)
        .any(|_| sampler.sample(data, size, sample) && estimator.is_valid_sample(data, sample))
}
