pub mod d2;
pub mod d3;
pub mod global_variables;
pub mod io;
pub mod post;

pub use global_variables::*;

use std::error::Error;
use std::fmt;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Phase {
    One,
    Two,
}

impl Phase {
    // Phase 1 updates the odd checkerboard class, phase 2 the even one.
    pub fn parity(self) -> usize {
        match self {
            Phase::One => 1,
            Phase::Two => 0,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Outcome {
    Converged,
    IterationLimitReached,
}

impl Outcome {
    pub fn converged(self) -> bool {
        self == Outcome::Converged
    }
}

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum SolverError {
    InvalidDimensions { nx: usize, ny: usize, nz: usize },
}

impl fmt::Display for SolverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SolverError::InvalidDimensions { nx, ny, nz } => write!(
                f,
                "invalid lattice dimensions {nx} x {ny} x {nz}: every extent must be at least 1"
            ),
        }
    }
}

impl Error for SolverError {}
