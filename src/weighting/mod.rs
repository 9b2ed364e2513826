#[cfg(test)]
mod test;

use crate::errors::RegularizationError;
use crate::operators::{difference_operator, DifferenceOrder, ModelShape};
use nalgebra::{DMatrix, DVector, RealField, Scalar};
use num_traits::FromPrimitive;
use std::str::FromStr;

/// the closed set of recognized weighting kind strings, for error messages
const VALID_WEIGHTING_KINDS: &str = "'damping', 'flattening', 'roughening', 'smoothing'";

/// The family of weighting matrices `$D$` that a regularization term can be
/// built with.
///
/// The variants correspond to the zeroth, first and second order Tikhonov
/// regularization approaches, plus a bring-your-own matrix for everything
/// else. A `Weighting` is only a description; it is resolved into a concrete
/// [`WeightingMatrix`] against a model shape exactly once, when a term is
/// constructed, via [`resolve`](Weighting::resolve).
#[derive(Debug, Clone, PartialEq)]
pub enum Weighting<ScalarType>
where
    ScalarType: Scalar + RealField,
{
    /// identity weighting, penalizing the amplitude of the (reference
    /// shifted) model itself
    Damping,
    /// first order difference weighting, penalizing the slope of the model.
    /// Also known as roughening.
    Flattening,
    /// second order difference weighting, penalizing the curvature of the
    /// model
    Smoothing,
    /// a bring-your-own weighting matrix. It must have one column per model
    /// parameter, but may have any number of rows (e.g. stacked directional
    /// operators).
    Custom(DMatrix<ScalarType>),
}

/// Damping (identity weighting) is the default.
impl<ScalarType> Default for Weighting<ScalarType>
where
    ScalarType: Scalar + RealField,
{
    fn default() -> Self {
        Self::Damping
    }
}

/// Parse a weighting kind from its string name, which is useful for callers
/// driven by configuration files. Recognized are `"damping"`,
/// `"flattening"`, `"roughening"` (a synonym of flattening) and
/// `"smoothing"`. Parsing happens only at this boundary; evaluation never
/// looks at strings again.
impl<ScalarType> FromStr for Weighting<ScalarType>
where
    ScalarType: Scalar + RealField,
{
    type Err = RegularizationError;

    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind {
            "damping" => Ok(Self::Damping),
            "flattening" | "roughening" => Ok(Self::Flattening),
            "smoothing" => Ok(Self::Smoothing),
            _ => Err(RegularizationError::InvalidOption {
                name: "weighting kind",
                invalid_option: kind.into(),
                valid_options: VALID_WEIGHTING_KINDS,
            }),
        }
    }
}

impl<ScalarType> Weighting<ScalarType>
where
    ScalarType: Scalar + RealField + FromPrimitive,
{
    /// Resolve this weighting against a concrete model shape, producing the
    /// weighting matrix used by the evaluators.
    ///
    /// This is a pure factory: it can be called repeatedly with the same
    /// arguments and the result may be cached by the caller.
    ///
    /// # Errors
    ///
    /// `Configuration` if the shape is too small for the difference stencil
    /// or if a custom matrix does not have one column per model parameter,
    /// `NotSupported` if a difference weighting is requested for a grid of
    /// more than two dimensions.
    pub fn resolve(
        &self,
        model_shape: &ModelShape,
    ) -> Result<WeightingMatrix<ScalarType>, RegularizationError> {
        match self {
            Weighting::Damping => Ok(WeightingMatrix::Identity(model_shape.size())),
            Weighting::Flattening => {
                difference_operator(DifferenceOrder::First, model_shape).map(WeightingMatrix::Dense)
            }
            Weighting::Smoothing => difference_operator(DifferenceOrder::Second, model_shape)
                .map(WeightingMatrix::Dense),
            Weighting::Custom(matrix) => {
                if matrix.ncols() != model_shape.size() {
                    return Err(RegularizationError::configuration(format!(
                        "the custom weighting matrix must have one column per model parameter, but it has {} columns for {} parameters",
                        matrix.ncols(),
                        model_shape.size()
                    )));
                }
                Ok(WeightingMatrix::Dense(matrix.clone()))
            }
        }
    }
}

/// The two linear operations that qualify a type as a weighting operator:
/// the matrix-vector product and the transposed matrix-vector product.
/// Everything the penalty engines need from a weighting matrix `$D$` is
/// expressible through these (plus the Gram products assembled from them),
/// so any type that supports both operations at the right dimensions can
/// act as one.
pub trait WeightingOperator<ScalarType>
where
    ScalarType: Scalar + RealField,
{
    /// the matrix-vector product `$D v$`
    ///
    /// # Panics
    ///
    /// Panics if the vector length does not match the number of columns of
    /// the operator.
    fn apply(&self, vector: &DVector<ScalarType>) -> DVector<ScalarType>;

    /// the transposed matrix-vector product `$D^T v$`
    ///
    /// # Panics
    ///
    /// Panics if the vector length does not match the number of rows of the
    /// operator.
    fn apply_transpose(&self, vector: &DVector<ScalarType>) -> DVector<ScalarType>;
}

/// Any dense matrix is a weighting operator.
impl<ScalarType> WeightingOperator<ScalarType> for DMatrix<ScalarType>
where
    ScalarType: Scalar + RealField,
{
    fn apply(&self, vector: &DVector<ScalarType>) -> DVector<ScalarType> {
        self * vector
    }

    fn apply_transpose(&self, vector: &DVector<ScalarType>) -> DVector<ScalarType> {
        self.tr_mul(vector)
    }
}

/// A weighting resolved against a concrete model shape.
///
/// This is a variant type so that the identity weighting of the damping case
/// can be stored without its elements and applied without a matrix product;
/// the dense variant covers difference stencils and custom matrices alike.
/// Every term holds exactly one of these, built once at construction.
#[derive(Debug, Clone, PartialEq)]
pub enum WeightingMatrix<ScalarType>
where
    ScalarType: Scalar + RealField,
{
    /// the identity matrix of the given size
    Identity(usize),
    /// a dense stencil or custom matrix
    Dense(DMatrix<ScalarType>),
}

impl<ScalarType> WeightingMatrix<ScalarType>
where
    ScalarType: Scalar + RealField,
{
    /// the number of rows of the weighting matrix. This may exceed the
    /// number of columns for stacked directional operators.
    pub fn nrows(&self) -> usize {
        match self {
            WeightingMatrix::Identity(size) => *size,
            WeightingMatrix::Dense(matrix) => matrix.nrows(),
        }
    }

    /// the number of columns of the weighting matrix, which always equals
    /// the model size of the term it belongs to
    pub fn ncols(&self) -> usize {
        match self {
            WeightingMatrix::Identity(size) => *size,
            WeightingMatrix::Dense(matrix) => matrix.ncols(),
        }
    }

    /// materialize the weighting matrix as a dense matrix. For the identity
    /// variant this allocates, so prefer [`apply`](WeightingOperator::apply)
    /// and friends for computations.
    pub fn dense(&self) -> DMatrix<ScalarType> {
        match self {
            WeightingMatrix::Identity(size) => DMatrix::identity(*size, *size),
            WeightingMatrix::Dense(matrix) => matrix.clone(),
        }
    }

    /// the Gram matrix `$D^T D$` of the weighting matrix
    pub fn gram(&self) -> DMatrix<ScalarType> {
        match self {
            WeightingMatrix::Identity(size) => DMatrix::identity(*size, *size),
            WeightingMatrix::Dense(matrix) => matrix.tr_mul(matrix),
        }
    }

    /// the weighted Gram matrix `$D^T \mathrm{diag}(w) D$` for the given
    /// diagonal weights `$w$`, one per operator row
    ///
    /// # Panics
    ///
    /// Panics if the number of weights does not match the number of rows of
    /// the operator.
    pub fn weighted_gram(&self, weights: &DVector<ScalarType>) -> DMatrix<ScalarType> {
        assert_eq!(
            weights.len(),
            self.nrows(),
            "Diagonal weights must have one entry per weighting matrix row."
        );
        match self {
            WeightingMatrix::Identity(_) => DMatrix::from_diagonal(weights),
            WeightingMatrix::Dense(matrix) => {
                let mut scaled = matrix.clone();
                for (index, mut row) in scaled.row_iter_mut().enumerate() {
                    row *= weights[index].clone();
                }
                matrix.tr_mul(&scaled)
            }
        }
    }
}

/// The weighting matrix applies itself with a shortcut for the identity
/// variant, which is a clone instead of a matrix product.
impl<ScalarType> WeightingOperator<ScalarType> for WeightingMatrix<ScalarType>
where
    ScalarType: Scalar + RealField,
{
    fn apply(&self, vector: &DVector<ScalarType>) -> DVector<ScalarType> {
        match self {
            WeightingMatrix::Identity(size) => {
                assert_eq!(
                    vector.len(),
                    *size,
                    "Vector length incorrect for weighting matrix application."
                );
                vector.clone()
            }
            WeightingMatrix::Dense(matrix) => matrix * vector,
        }
    }

    fn apply_transpose(&self, vector: &DVector<ScalarType>) -> DVector<ScalarType> {
        match self {
            WeightingMatrix::Identity(size) => {
                assert_eq!(
                    vector.len(),
                    *size,
                    "Vector length incorrect for weighting matrix application."
                );
                vector.clone()
            }
            WeightingMatrix::Dense(matrix) => matrix.tr_mul(vector),
        }
    }
}
