use thiserror::Error;

/// Failure reasons surfaced by a single estimation call.
///
/// No variant is ever turned into a default or identity transform by the
/// library; fallback policy belongs to the caller.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EstimationError {
    #[error("need at least 3 correspondences, got {count}")]
    InsufficientPoints { count: usize },
    #[error("source and destination point arrays differ in length ({src} vs {dst})")]
    LengthMismatch { src: usize, dst: usize },
    #[error("input images differ in size ({a_width}x{a_height} vs {b_width}x{b_height})")]
    SizeMismatch {
        a_width: u32,
        a_height: u32,
        b_width: u32,
        b_height: u32,
    },
    #[error("input images differ in pixel format")]
    FormatMismatch,
    #[error("unsupported pixel format {0}; expected 8-bit single- or 3-channel")]
    UnsupportedFormat(String),
    #[error("input images are empty ({width}x{height})")]
    EmptyImage { width: u32, height: u32 },
    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),
    #[error("no non-degenerate sample found within the retry budget at iteration {iteration}")]
    DegenerateSampleExhausted { iteration: usize },
    #[error("no consensus reached after {iterations} iterations")]
    RansacExhausted { iterations: usize },
    #[error("least-squares solve failed: {0}")]
    SolveFailed(&'static str),
}
