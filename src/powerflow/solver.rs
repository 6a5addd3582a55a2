#[cfg(not(feature = "rsparse"))]
mod dense;
#[cfg(not(feature = "rsparse"))]
pub use dense::*;

#[cfg(feature = "rsparse")]
mod rsparse;
#[cfg(feature = "rsparse")]
pub use rsparse::*;

#[cfg(feature = "rsparse")]
pub type DefaultSolver = RSparseSolver;

#[cfg(not(feature = "rsparse"))]
pub type DefaultSolver = DenseLuSolver;

#[allow(non_snake_case)]
/// A trait for solving sparse linear systems.
pub trait Solve {
    /// Solves the sparse linear system `A x = b` in place.
    ///
    /// # Parameters
    ///
    /// * `Ap` - Column pointers of the matrix.
    /// * `Ai` - Row indices of the matrix.
    /// * `Ax` - Non-zero values of the matrix.
    /// * `b` - Right-hand side vector, overwritten with the solution.
    /// * `n` - Dimension of the system.
    fn solve(
        &mut self,
        Ap: &mut [usize],
        Ai: &mut [usize],
        Ax: &mut [f64],
        b: &mut [f64],
        n: usize,
    ) -> Result<(), &'static str>;

    /// Drops any cached factorization, e.g. when the sparsity pattern changes.
    fn reset(&mut self) {}
}
