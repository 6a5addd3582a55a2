use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CscMatrix};
use num_complex::Complex64;

/// Computes the partial derivatives of the complex bus power injections with
/// respect to voltage magnitudes and angles.
///
/// # Arguments
///
/// * `Ybus` - Nodal admittance matrix (CSC).
/// * `v` - Complex bus voltages.
/// * `Vnorm` - Unit phasors `v / |v|`.
///
/// # Returns
///
/// `(dS_dVm, dS_dVa)`, both sharing the sparsity pattern of `Ybus` plus its
/// diagonal.
///
/// # Notes
///
/// Element-wise form of the complex matrix expressions from MatPower:
///  R. D. Zimmerman, "AC Power Flows, Generalized OPF Costs and
///  their Derivatives using Complex Matrix Notation", MATPOWER
///  Technical Note 2, February 2010.
///
///  `dS_dVm = diag(V) conj(Ybus diag(Vnorm)) + conj(diag(Ibus)) diag(Vnorm)`
///  `dS_dVa = j diag(V) conj(diag(Ibus) - Ybus diag(V))`
#[allow(non_snake_case)]
pub(crate) fn dSbus_dV(
    Ybus: &CscMatrix<Complex64>,
    v: &DVector<Complex64>,
    Vnorm: &DVector<Complex64>,
) -> (CscMatrix<Complex64>, CscMatrix<Complex64>) {
    let n = v.len();
    let j = Complex64::i();
    let ibus = Ybus * v;

    let mut dS_dVm = CooMatrix::new(n, n);
    let mut dS_dVa = CooMatrix::new(n, n);
    for (i, k, y) in Ybus.triplet_iter() {
        dS_dVm.push(i, k, v[i] * (y * Vnorm[k]).conj());
        dS_dVa.push(i, k, j * v[i] * (-(y * v[k])).conj());
    }
    for i in 0..n {
        dS_dVm.push(i, i, ibus[i].conj() * Vnorm[i]);
        dS_dVa.push(i, i, j * v[i] * ibus[i].conj());
    }
    (CscMatrix::from(&dS_dVm), CscMatrix::from(&dS_dVa))
}
