#![warn(missing_docs)]
//!
//! # Introduction
//!
//! Parametric inverse problems are rarely solved from the data misfit alone.
//! Because the inversion is typically ill-posed, the objective is stabilized
//! by one or more *regularization terms*: penalty functions of the candidate
//! model vector `$\vec{m}$` that encode prior preferences such as small,
//! flat or smooth models. This crate provides those penalty functions as
//! composable building blocks, each one evaluating
//!
//! * the scalar penalty `$r(\vec{m})$`,
//! * its gradient `$\nabla r(\vec{m})$` with respect to the model,
//! * and its Hessian `$\nabla^2 r(\vec{m})$`,
//!
//! so that a caller can add them onto a data misfit (or a log posterior) and
//! hand the sum to whatever optimization or sampling loop it drives. The
//! crate itself performs no optimization.
//!
//! ## The penalty family
//!
//! The workhorse is the generalized Tikhonov penalty
//!
//! ```math
//! r(\vec{m}) = ||\mathbf{D}(\vec{m}-\vec{m}_0)||_p^p,
//! ```
//!
//! where `$\vec{m}_0$` is an optional reference model and `$\mathbf{D}$` a
//! weighting matrix. The built-in weightings are the identity (*damping*,
//! penalizing model amplitude), a first order finite difference operator
//! (*flattening*, penalizing slope) and a second order one (*smoothing*,
//! penalizing curvature), over one or two dimensional model grids; a custom
//! matrix can be brought instead. Two engines evaluate this penalty:
//!
//! * [`LpNormRegularization`](crate::term::LpNormRegularization) for general
//!   order `$p > 0$`,
//! * [`QuadraticRegularization`](crate::term::QuadraticRegularization) for
//!   the ubiquitous `$p = 2$` case, with closed-form gradient and a
//!   model-independent Hessian,
//!
//! plus [`GaussianPriorRegularization`](crate::term::GaussianPriorRegularization)
//! for a correlated Gaussian prior expressed through an inverse model
//! covariance.
//!
//! ## The term algebra
//!
//! Every term implements the [`Regularization`](crate::term::Regularization)
//! trait, and terms compose: `t1 + t2` is the pointwise sum of two terms of
//! equal model size and `k * t` a scalar multiple, both again full-fledged
//! terms. This makes multi-objective setups like "damp towards the reference
//! and keep the model smooth" one-liners.
//!
//! # Usage
//!
//! ```rust
//! use nalgebra::DVector;
//! use tikhonov::prelude::*;
//!
//! # fn main() -> Result<(), tikhonov::errors::RegularizationError> {
//! // damping towards a reference model, plus a lighter curvature penalty
//! let damping = QuadraticRegularizationBuilder::new(1.0)
//!     .model_shape(16)
//!     .reference_model(DVector::from_element(16, 0.5))
//!     .build()?;
//! let smoothing = QuadraticRegularizationBuilder::new(0.1)
//!     .weighting(Weighting::Smoothing)
//!     .model_shape(16)
//!     .build()?;
//! let penalty = damping + smoothing;
//!
//! let model = DVector::from_fn(16, |index, _| (index as f64 / 4.0).sin());
//! let value = penalty.reg(&model)?;
//! let gradient = penalty.gradient(&model)?;
//! let hessian = penalty.hessian(&model)?;
//! assert!(value > 0.0);
//! assert_eq!(gradient.len(), 16);
//! assert_eq!(hessian.shape(), (16, 16));
//! # Ok(())
//! # }
//! ```
//!
//! Terms are immutable once built and every evaluation is a pure function of
//! the model vector, so terms can be shared across threads without locking.
//!
//! # References and Further Reading
//!
//! (Aster2018) Aster, R.C., Borchers, B., Thurber, C.H. *Parameter
//! Estimation and Inverse Problems*, 3rd ed., Elsevier (2018), chapters 4
//! and 7.
//!
//! (Menke2018) Menke, W. *Geophysical Data Analysis: Discrete Inverse
//! Theory*, 4th ed., Academic Press (2018).

/// the error type shared by all fallible operations of this crate
pub mod errors;
/// finite difference operators over one and two dimensional model grids
pub mod operators;
/// commonly useful imports
pub mod prelude;
/// the regularization terms and their algebra
pub mod term;
/// weighting kinds and the matrices they resolve to
pub mod weighting;
