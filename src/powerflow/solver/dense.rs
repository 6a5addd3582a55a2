use nalgebra::{DMatrix, DVector};

use super::Solve;

/// Dense LU fallback used when no sparse backend is compiled in.
#[derive(Default)]
pub struct DenseLuSolver;

#[allow(non_snake_case)]
impl Solve for DenseLuSolver {
    fn solve(
        &mut self,
        Ap: &mut [usize],
        Ai: &mut [usize],
        Ax: &mut [f64],
        b: &mut [f64],
        n: usize,
    ) -> Result<(), &'static str> {
        if Ap.len() != n + 1 || b.len() != n {
            return Err("dimension mismatch");
        }
        let mut a = DMatrix::<f64>::zeros(n, n);
        for col in 0..n {
            for idx in Ap[col]..Ap[col + 1] {
                a[(Ai[idx], col)] += Ax[idx];
            }
        }
        let rhs = DVector::from_column_slice(b);
        let x = a.lu().solve(&rhs).ok_or("singular Jacobian")?;
        b.copy_from_slice(x.as_slice());
        Ok(())
    }
}
