//! Error taxonomy shared by all constructions.
//!
//! An empty Minkowski difference is not an error; it is reported as `Ok(None)`.

use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum GeomError {
    /// The swarm does not span its ambient space.
    #[error("degenerate input: {points} distinct point(s) span {rank} of {dim} dimensions")]
    DegenerateInput {
        dim: usize,
        points: usize,
        rank: usize,
    },

    /// A ray march from a vertex never met a bounding half-space.
    #[error("unbounded region: ray leaves {halfspaces} half-space(s) in dimension {dim}")]
    UnboundedRegion { dim: usize, halfspaces: usize },

    /// No vertex satisfies every half-space.
    #[error("infeasible system: {halfspaces} half-space(s) in dimension {dim} have no common vertex")]
    InfeasibleSystem { dim: usize, halfspaces: usize },

    /// Strict mode only: several candidates within tolerance of the winner.
    #[error("ambiguous tie between {candidates} candidate(s) in dimension {dim}")]
    AmbiguousTie { dim: usize, candidates: usize },

    #[error("dimension mismatch: expected {expected}, found {found}")]
    DimensionMismatch { expected: usize, found: usize },

    #[error("{op} is not supported in dimension {dim}")]
    UnsupportedDimension { op: &'static str, dim: usize },

    #[error("malformed face lattice: {reason}")]
    MalformedLattice { reason: String },
}

impl GeomError {
    pub(crate) fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedLattice {
            reason: reason.into(),
        }
    }
}
