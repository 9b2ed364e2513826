
mod gaussian_prior;
mod lp_norm;
mod quadratic;

pub use gaussian_prior::GaussianPriorRegularization;
pub use lp_norm::{LpNormRegularization, LpNormRegularizationBuilder};
pub use quadratic::{QuadraticRegularization, QuadraticRegularizationBuilder};

use crate::errors::RegularizationError;
use crate::operators::ModelShape;
use nalgebra::{DMatrix, DVector, RealField, Scalar};
use std::fmt::Debug;
use std::ops::{Add, Mul};

/// A regularization term: a function of a model vector producing a scalar
/// penalty together with its gradient and Hessian with respect to the model.
///
/// Terms are immutable after construction and every evaluation is a pure,
/// blocking computation on the given model vector, so a term can be shared
/// freely between threads once its constructor has returned.
///
/// Besides the three evaluators, every term reports the
/// [`model_shape`](Regularization::model_shape) it was built for. The
/// flattened size of that shape is the [`model_size`](Regularization::model_size),
/// and all evaluators reject models whose length differs from it.
///
/// Terms form a small algebra: any two terms of equal model size can be
/// added with `+`, and any term can be scaled with `*`, producing a
/// [`CompositeRegularization`] that satisfies this same trait.
pub trait Regularization: Debug {
    /// the scalar type of the models this term accepts
    type ScalarType: Scalar + RealField;

    /// the shape of the model grid that this term was constructed for.
    ///
    /// For a composite term this is the shape of the left (respectively
    /// base) operand of the expression tree. All operands of a valid
    /// composition share the same model size, so any one shape is
    /// representative for size purposes; callers that need the exact
    /// multi-dimensional shape of a particular operand should query that
    /// operand directly.
    fn model_shape(&self) -> &ModelShape;

    /// the number of model parameters this term accepts, i.e. the product
    /// of the model shape's axes
    fn model_size(&self) -> usize {
        self.model_shape().size()
    }

    /// the penalty value for the given model vector
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the model length differs from
    /// [`model_size`](Regularization::model_size).
    fn reg(
        &self,
        model: &DVector<Self::ScalarType>,
    ) -> Result<Self::ScalarType, RegularizationError>;

    /// the gradient of the penalty with respect to the model, a vector with
    /// [`model_size`](Regularization::model_size) elements
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the model length differs from
    /// [`model_size`](Regularization::model_size).
    fn gradient(
        &self,
        model: &DVector<Self::ScalarType>,
    ) -> Result<DVector<Self::ScalarType>, RegularizationError>;

    /// the Hessian of the penalty with respect to the model, a square
    /// matrix of dimension [`model_size`](Regularization::model_size)
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` if the model length differs from
    /// [`model_size`](Regularization::model_size).
    fn hessian(
        &self,
        model: &DVector<Self::ScalarType>,
    ) -> Result<DMatrix<Self::ScalarType>, RegularizationError>;
}

/// check a model vector against the size a term was built for
fn check_model_size<ScalarType>(
    model: &DVector<ScalarType>,
    expected: usize,
) -> Result<(), RegularizationError>
where
    ScalarType: Scalar + RealField,
{
    if model.len() == expected {
        Ok(())
    } else {
        Err(RegularizationError::DimensionMismatch {
            entered_name: "model",
            entered_size: model.len(),
            expected_size: expected,
            expected_source: "model shape of the regularization term",
        })
    }
}

/// combine an explicitly given model shape and an optional reference model
/// into the shape a term will be built for. The reference model provides the
/// shape (as a one dimensional grid of its length) when no shape is given,
/// and must agree with the shape otherwise.
fn resolve_model_shape<ScalarType>(
    model_shape: Option<ModelShape>,
    reference_model: Option<&DVector<ScalarType>>,
) -> Result<ModelShape, RegularizationError>
where
    ScalarType: Scalar + RealField,
{
    let shape = match (model_shape, reference_model) {
        (Some(shape), Some(reference)) => {
            if reference.len() != shape.size() {
                return Err(RegularizationError::DimensionMismatch {
                    entered_name: "reference model",
                    entered_size: reference.len(),
                    expected_size: shape.size(),
                    expected_source: "model shape",
                });
            }
            shape
        }
        (Some(shape), None) => shape,
        (None, Some(reference)) => ModelShape::from(reference.len()),
        (None, None) => {
            return Err(RegularizationError::configuration(
                "either a model shape or a reference model must be provided",
            ))
        }
    };
    if shape.size() == 0 {
        return Err(RegularizationError::configuration(
            "the model shape must contain at least one parameter",
        ));
    }
    Ok(shape)
}

/// A boxed term, as stored by the composite combinators. The children are
/// `Send + Sync` so that a composite stays shareable between threads the
/// same way the leaf terms are.
pub type BoxedRegularization<ScalarType> =
    Box<dyn Regularization<ScalarType = ScalarType> + Send + Sync>;

/// The composite term produced by the algebraic combinators: either the
/// pointwise sum of two terms of equal model size, or a scalar multiple of a
/// base term.
///
/// Composites satisfy [`Regularization`] recursively, so they compose
/// arbitrarily (`(t1 + t2) + k * t3` is valid). Every evaluation forwards to
/// the children; nothing is precomputed or cached across calls, so the
/// children may store their weighting matrices however they like.
#[derive(Debug)]
pub enum CompositeRegularization<ScalarType>
where
    ScalarType: Scalar + RealField,
{
    /// the pointwise sum of two terms of equal model size
    Sum {
        /// the left operand; the composite reports its model shape
        left: BoxedRegularization<ScalarType>,
        /// the right operand
        right: BoxedRegularization<ScalarType>,
    },
    /// a scalar multiple of a base term
    Scaled {
        /// the base term; the composite reports its model shape
        base: BoxedRegularization<ScalarType>,
        /// the scalar factor. Unlike the factor of a quadratic term this may
        /// be any real number, including a negative one.
        factor: ScalarType,
    },
}

impl<ScalarType> CompositeRegularization<ScalarType>
where
    ScalarType: Scalar + RealField,
{
    /// Combine two terms into their pointwise sum. This is the fallible
    /// counterpart of the `+` operator for callers that want the dimension
    /// check as an error value instead of a panic.
    ///
    /// # Errors
    ///
    /// `DimensionMismatch` naming both operand sizes if the model sizes of
    /// the two terms differ.
    pub fn sum(
        left: BoxedRegularization<ScalarType>,
        right: BoxedRegularization<ScalarType>,
    ) -> Result<Self, RegularizationError> {
        if left.model_size() != right.model_size() {
            return Err(RegularizationError::DimensionMismatch {
                entered_name: "second regularization term",
                entered_size: right.model_size(),
                expected_size: left.model_size(),
                expected_source: "first regularization term",
            });
        }
        Ok(Self::Sum { left, right })
    }

    /// Scale a term by a real factor. This is the named counterpart of the
    /// `*` operator; it cannot fail.
    pub fn scaled(base: BoxedRegularization<ScalarType>, factor: ScalarType) -> Self {
        Self::Scaled { base, factor }
    }
}

impl<ScalarType> Regularization for CompositeRegularization<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    type ScalarType = ScalarType;

    fn model_shape(&self) -> &ModelShape {
        match self {
            Self::Sum { left, .. } => left.model_shape(),
            Self::Scaled { base, .. } => base.model_shape(),
        }
    }

    fn reg(&self, model: &DVector<ScalarType>) -> Result<ScalarType, RegularizationError> {
        match self {
            Self::Sum { left, right } => Ok(left.reg(model)? + right.reg(model)?),
            Self::Scaled { base, factor } => Ok(base.reg(model)? * *factor),
        }
    }

    fn gradient(&self, model: &DVector<ScalarType>) -> Result<DVector<ScalarType>, RegularizationError> {
        match self {
            Self::Sum { left, right } => Ok(left.gradient(model)? + right.gradient(model)?),
            Self::Scaled { base, factor } => Ok(base.gradient(model)? * *factor),
        }
    }

    fn hessian(&self, model: &DVector<ScalarType>) -> Result<DMatrix<ScalarType>, RegularizationError> {
        match self {
            Self::Sum { left, right } => Ok(left.hessian(model)? + right.hessian(model)?),
            Self::Scaled { base, factor } => Ok(base.hessian(model)? * *factor),
        }
    }
}

/// Implements the term algebra operators for a term type: `+` between two
/// terms, `term * k`, and `k * term` for the primitive float scalars. The
/// left scalar multiplication needs one impl per scalar type, the same way
/// nalgebra implements its left scalar products.
macro_rules! impl_term_algebra_operators {
    ($term_type:ident) => {
        /// Add another regularization term to this one, producing a
        /// composite term that evaluates to the pointwise sum of both.
        ///
        /// # Panics
        ///
        /// Panics if the model sizes of the two terms differ. Use
        /// [`CompositeRegularization::sum`] to get the dimension check as an
        /// error value instead.
        impl<ScalarType, Rhs> Add<Rhs> for $term_type<ScalarType>
        where
            ScalarType: Scalar + RealField + Copy + Send + Sync,
            Rhs: Regularization<ScalarType = ScalarType> + Send + Sync + 'static,
            $term_type<ScalarType>: Send + Sync,
        {
            type Output = CompositeRegularization<ScalarType>;

            fn add(self, rhs: Rhs) -> Self::Output {
                match CompositeRegularization::sum(Box::new(self), Box::new(rhs)) {
                    Ok(sum) => sum,
                    Err(error) => panic!("{}", error),
                }
            }
        }

        /// Scale this term by a factor from the right, producing a composite
        /// term that evaluates to the scaled penalty, gradient and Hessian.
        impl<ScalarType> Mul<ScalarType> for $term_type<ScalarType>
        where
            ScalarType: Scalar + RealField + Copy + Send + Sync,
            $term_type<ScalarType>: Send + Sync,
        {
            type Output = CompositeRegularization<ScalarType>;

            fn mul(self, factor: ScalarType) -> Self::Output {
                CompositeRegularization::scaled(Box::new(self), factor)
            }
        }

        /// Scale a term by a factor from the left.
        impl Mul<$term_type<f64>> for f64 {
            type Output = CompositeRegularization<f64>;

            fn mul(self, term: $term_type<f64>) -> Self::Output {
                CompositeRegularization::scaled(Box::new(term), self)
            }
        }

        /// Scale a term by a factor from the left.
        impl Mul<$term_type<f32>> for f32 {
            type Output = CompositeRegularization<f32>;

            fn mul(self, term: $term_type<f32>) -> Self::Output {
                CompositeRegularization::scaled(Box::new(term), self)
            }
        }
    };
}

impl_term_algebra_operators!(LpNormRegularization);
impl_term_algebra_operators!(QuadraticRegularization);
impl_term_algebra_operators!(GaussianPriorRegularization);
impl_term_algebra_operators!(CompositeRegularization);
