use std::f64::consts::PI;

use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CscMatrix};
use num_complex::Complex64;

use super::{
    dsbus_dv::dSbus_dV,
    solver::Solve,
};

/// Polar Newton-Raphson power flow.
///
/// Buses `0..npq` are PQ buses; every bus after them is a slack bus whose
/// voltage stays at `v_init`. `Sbus` is the specified injection in p.u.
///
/// Returns the converged voltages and the iteration count, or a reason and
/// the last iterate.
#[allow(non_snake_case)]
pub fn newton_pf<Solver: Solve>(
    Ybus: &CscMatrix<Complex64>,
    Sbus: &DVector<Complex64>,
    v_init: &DVector<Complex64>,
    npq: usize,
    tolerance: Option<f64>,
    max_iter: Option<usize>,
    solver: &mut Solver,
) -> Result<(DVector<Complex64>, usize), (String, DVector<Complex64>)> {
    let mut v = v_init.clone();
    let max_iter = max_iter.unwrap_or(100);
    let tol = tolerance.unwrap_or(1e-6);

    let num_state = 2 * npq;
    let mut v_m = v.map(|e| e.norm());
    let mut v_a = v.map(|e| e.arg());

    let mut mis = mismatch(Ybus, &v, Sbus);
    let mut F = DVector::zeros(num_state);
    assemble_f(&mut F, &mis, npq);
    if F.norm() < tol {
        return Ok((v, 0));
    }

    for iterations in 1..=max_iter {
        let v_norm = v_a.map(|a| Complex64::from_polar(1.0, a));
        let (dS_dVm, dS_dVa) = dSbus_dV(Ybus, &v, &v_norm);
        let jacobian = build_jacobian(&dS_dVm, &dS_dVa, npq);

        let (mut Ap, mut Ai, mut Ax) = jacobian.disassemble();
        if let Err(reason) = solver.solve(
            Ap.as_mut_slice(),
            Ai.as_mut_slice(),
            Ax.as_mut_slice(),
            F.as_mut_slice(),
            num_state,
        ) {
            return Err((reason.to_string(), v));
        }

        let dx = &F;
        update_v(&mut v_a, &mut v_m, dx, npq, &mut v);

        mis = mismatch(Ybus, &v, Sbus);
        assemble_f(&mut F, &mis, npq);

        if !F.iter().all(|f| f.is_finite()) {
            return Err((String::from("Diverged!"), v));
        }
        if F.norm() < tol {
            return Ok((v, iterations));
        }
    }
    Err((String::from("Did not converge!"), v))
}

#[inline(always)]
fn mismatch(
    ybus: &CscMatrix<Complex64>,
    v: &DVector<Complex64>,
    sbus: &DVector<Complex64>,
) -> DVector<Complex64> {
    v.component_mul(&(ybus * v).conjugate()) - sbus
}

#[inline(always)]
fn assemble_f(f: &mut DVector<f64>, mis: &DVector<Complex64>, npq: usize) {
    for i in 0..npq {
        f[i] = mis[i].re;
        f[npq + i] = mis[i].im;
    }
}

#[inline(always)]
fn update_v(
    v_a: &mut DVector<f64>,
    v_m: &mut DVector<f64>,
    dx: &DVector<f64>,
    npq: usize,
    v: &mut DVector<Complex64>,
) {
    for i in 0..npq {
        v_a[i] = (v_a[i] - dx[i]).rem_euclid(2.0 * PI);
        v_m[i] -= dx[npq + i];
        v[i] = Complex64::from_polar(v_m[i], v_a[i]);
    }
}

/// Assembles the real Jacobian restricted to the PQ buses:
///
/// ```text
/// | Re dS/dVa  Re dS/dVm |
/// | Im dS/dVa  Im dS/dVm |
/// ```
#[allow(non_snake_case)]
#[inline(always)]
fn build_jacobian(
    ds_dvm: &CscMatrix<Complex64>,
    ds_dva: &CscMatrix<Complex64>,
    npq: usize,
) -> CscMatrix<f64> {
    let mut J = CooMatrix::new(2 * npq, 2 * npq);
    for (i, k, d) in ds_dva.triplet_iter() {
        if i < npq && k < npq {
            J.push(i, k, d.re);
            J.push(npq + i, k, d.im);
        }
    }
    for (i, k, d) in ds_dvm.triplet_iter() {
        if i < npq && k < npq {
            J.push(i, npq + k, d.re);
            J.push(npq + i, npq + k, d.im);
        }
    }
    CscMatrix::from(&J)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::powerflow::solver::DefaultSolver;

    fn two_bus(y: Complex64) -> CscMatrix<Complex64> {
        let mut coo = CooMatrix::new(2, 2);
        coo.push(0, 0, y);
        coo.push(1, 1, y);
        coo.push(0, 1, -y);
        coo.push(1, 0, -y);
        CscMatrix::from(&coo)
    }

    #[test]
    fn converges_on_two_bus_system() {
        let ybus = two_bus(Complex64::new(4.0, -8.0));
        // bus 0 is PQ with a 0.5 + j0.2 p.u. load, bus 1 is the slack
        let sbus = DVector::from_vec(vec![Complex64::new(-0.5, -0.2), Complex64::new(0.0, 0.0)]);
        let v0 = DVector::from_element(2, Complex64::new(1.0, 0.0));
        let mut solver = DefaultSolver::default();
        let (v, iter) = newton_pf(&ybus, &sbus, &v0, 1, Some(1e-10), Some(20), &mut solver).unwrap();
        assert!(iter > 0 && iter < 10);
        assert!(v[0].norm() < 1.0);
        assert_eq!(v[1], Complex64::new(1.0, 0.0));
        let s = v.component_mul(&(&ybus * &v).conjugate());
        assert!((s[0] - sbus[0]).norm() < 1e-8);
        // slack covers the load plus the series loss
        assert!(s[1].re > 0.5);
    }

    #[test]
    fn only_slack_buses_return_immediately() {
        let ybus = two_bus(Complex64::new(1.0, -1.0));
        let sbus = DVector::from_element(2, Complex64::new(0.0, 0.0));
        let v0 = DVector::from_element(2, Complex64::new(1.0, 0.0));
        let mut solver = DefaultSolver::default();
        let (v, iter) = newton_pf(&ybus, &sbus, &v0, 0, None, None, &mut solver).unwrap();
        assert_eq!(iter, 0);
        assert_eq!(v, v0);
    }

    #[test]
    fn infeasible_load_does_not_converge() {
        let ybus = two_bus(Complex64::new(0.1, -0.2));
        let sbus = DVector::from_vec(vec![Complex64::new(-50.0, -20.0), Complex64::new(0.0, 0.0)]);
        let v0 = DVector::from_element(2, Complex64::new(1.0, 0.0));
        let mut solver = DefaultSolver::default();
        assert!(newton_pf(&ybus, &sbus, &v0, 1, Some(1e-8), Some(15), &mut solver).is_err());
    }
}
