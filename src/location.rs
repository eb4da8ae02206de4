//! Points in the search domain and the quantities cached at them.

use nalgebra::DMatrix;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::method::Needs;

/// Dense symmetric matrix used for Hessians.
///
/// The driver needs only a minimal capability surface from its Hessian
/// container: dimension, square allocation, symmetric element access, and
/// copying. Methods that want richer linear algebra can reach the backing
/// [`DMatrix`] through [`as_dmatrix`](Self::as_dmatrix).
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SymmetricMatrix {
    mat: DMatrix<f64>,
}

impl SymmetricMatrix {
    /// Allocate a `dim x dim` matrix of zeros.
    #[must_use]
    pub fn zeros(dim: usize) -> Self {
        Self {
            mat: DMatrix::zeros(dim, dim),
        }
    }

    /// The matrix dimension.
    #[must_use]
    pub fn dim(&self) -> usize {
        self.mat.nrows()
    }

    /// Set both `(i, j)` and `(j, i)` to `value`.
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.mat[(i, j)] = value;
        self.mat[(j, i)] = value;
    }

    /// The element at `(i, j)`.
    #[must_use]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.mat[(i, j)]
    }

    /// Copy `src` into `self`, reallocating if the dimensions differ.
    pub fn copy_from(&mut self, src: &Self) {
        if self.dim() == src.dim() {
            self.mat.copy_from(&src.mat);
        } else {
            self.mat = src.mat.clone();
        }
    }

    /// Borrow the backing dense matrix.
    #[must_use]
    pub fn as_dmatrix(&self) -> &DMatrix<f64> {
        &self.mat
    }
}

/// A point in the search domain together with the quantities evaluated there.
///
/// `x` always has the problem dimension. The gradient and Hessian slots are
/// allocated only when the method declares it needs them; workers write into
/// the slots in place.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Location {
    /// The point itself.
    pub x: Vec<f64>,
    /// The objective value at `x`.
    pub f: f64,
    /// The gradient at `x`, if the method uses gradients.
    pub gradient: Option<Vec<f64>>,
    /// The Hessian at `x`, if the method uses Hessians.
    pub hessian: Option<SymmetricMatrix>,
}

impl Location {
    /// Allocate a zeroed location for a `dim`-dimensional problem with the
    /// slots the method needs.
    pub(crate) fn sized(dim: usize, needs: Needs) -> Self {
        Self {
            x: vec![0.0; dim],
            f: 0.0,
            gradient: needs.gradient.then(|| vec![0.0; dim]),
            hessian: needs.hessian.then(|| SymmetricMatrix::zeros(dim)),
        }
    }

    /// Deep-copy `src` into `self`, resizing the slots as needed.
    pub(crate) fn copy_from(&mut self, src: &Self) {
        self.x.resize(src.x.len(), 0.0);
        self.x.copy_from_slice(&src.x);

        self.f = src.f;

        match &src.gradient {
            Some(g) => {
                let dst = self.gradient.get_or_insert_with(Vec::new);
                dst.resize(g.len(), 0.0);
                dst.copy_from_slice(g);
            }
            None => self.gradient = None,
        }

        if let Some(h) = &src.hessian {
            match &mut self.hessian {
                Some(dst) => dst.copy_from(h),
                None => self.hessian = Some(h.clone()),
            }
        }
    }

    /// The infinity-norm of the gradient, if one is present.
    #[must_use]
    pub fn gradient_inf_norm(&self) -> Option<f64> {
        self.gradient
            .as_ref()
            .map(|g| g.iter().fold(0.0f64, |acc, v| acc.max(v.abs())))
    }
}
