use crate::genomics::GenomeError;
use crate::GenomeKey;

use thiserror::Error;

/// An error type stopping a population's run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PopulationError {
    /// The fitness function left a genome unevaluated.
    #[error("genome {0} was not assigned a fitness")]
    MissingFitness(GenomeKey),
    /// The fitness function assigned a NaN or infinite fitness.
    #[error("genome {0} was assigned a non-finite fitness ({1})")]
    InvalidFitness(GenomeKey, f32),
    /// A genome invariant was violated during reproduction.
    #[error(transparent)]
    Genome(#[from] GenomeError),
}
