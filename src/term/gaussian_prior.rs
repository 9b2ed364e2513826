use super::{check_model_size, Regularization};
use crate::errors::RegularizationError;
use crate::operators::ModelShape;
use nalgebra::{DMatrix, DVector, RealField, Scalar};

/// The negative log of an (unnormalized) Gaussian prior on the model,
///
/// ```math
/// L(m) = (m - \mu)^T C^{-1} (m - \mu),
/// ```
///
/// with the derivatives
///
/// ```math
/// \nabla L(m) = 2\, C^{-1} (m - \mu), \qquad
/// \nabla^2 L(m) = 2\, C^{-1},
/// ```
///
/// where `$\mu$` is the mean model and `$C^{-1}$` the inverse model
/// covariance. For `$C^{-1} = I$` this reduces to a damping term with
/// factor one and reference model `$\mu$`. A non-diagonal inverse
/// covariance expresses correlated prior knowledge between model
/// parameters, which the weighting-matrix terms cannot.
///
/// The inverse covariance is taken as given; it is validated to be square
/// and of matching dimension, but it is not checked for symmetry or
/// positive definiteness.
#[derive(Debug, Clone, PartialEq)]
pub struct GaussianPriorRegularization<ScalarType>
where
    ScalarType: Scalar + RealField,
{
    inverse_covariance: DMatrix<ScalarType>,
    mean_model: DVector<ScalarType>,
    model_shape: ModelShape,
}

impl<ScalarType> GaussianPriorRegularization<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// Create a Gaussian prior term from the inverse model covariance and
    /// the mean model. The model shape is the one dimensional grid of the
    /// mean model's length; use
    /// [`with_model_shape`](GaussianPriorRegularization::with_model_shape)
    /// for models flattened from a multi-dimensional grid.
    ///
    /// # Errors
    ///
    /// See [`with_model_shape`](GaussianPriorRegularization::with_model_shape).
    pub fn new(
        inverse_covariance: DMatrix<ScalarType>,
        mean_model: DVector<ScalarType>,
    ) -> Result<Self, RegularizationError> {
        let model_shape = ModelShape::from(mean_model.len());
        Self::with_model_shape(inverse_covariance, mean_model, model_shape)
    }

    /// Create a Gaussian prior term for models flattened from the given
    /// grid shape.
    ///
    /// # Errors
    ///
    /// `Configuration` if the shape has no parameters or the inverse
    /// covariance is not square, `DimensionMismatch` if the mean model or
    /// the inverse covariance do not match the model size.
    pub fn with_model_shape(
        inverse_covariance: DMatrix<ScalarType>,
        mean_model: DVector<ScalarType>,
        model_shape: impl Into<ModelShape>,
    ) -> Result<Self, RegularizationError> {
        let model_shape = model_shape.into();
        if model_shape.size() == 0 {
            return Err(RegularizationError::configuration(
                "the model shape must contain at least one parameter",
            ));
        }
        if mean_model.len() != model_shape.size() {
            return Err(RegularizationError::DimensionMismatch {
                entered_name: "mean model",
                entered_size: mean_model.len(),
                expected_size: model_shape.size(),
                expected_source: "model shape",
            });
        }
        if !inverse_covariance.is_square() {
            return Err(RegularizationError::configuration(format!(
                "the inverse model covariance must be a square matrix, but it has {} rows and {} columns",
                inverse_covariance.nrows(),
                inverse_covariance.ncols()
            )));
        }
        if inverse_covariance.nrows() != model_shape.size() {
            return Err(RegularizationError::DimensionMismatch {
                entered_name: "inverse model covariance",
                entered_size: inverse_covariance.nrows(),
                expected_size: model_shape.size(),
                expected_source: "model shape",
            });
        }
        Ok(Self {
            inverse_covariance,
            mean_model,
            model_shape,
        })
    }

    /// the inverse model covariance `$C^{-1}$` of this term
    pub fn matrix(&self) -> &DMatrix<ScalarType> {
        &self.inverse_covariance
    }

    /// the mean model `$\mu$` of this term
    pub fn mean_model(&self) -> &DVector<ScalarType> {
        &self.mean_model
    }
}

impl<ScalarType> Regularization for GaussianPriorRegularization<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    type ScalarType = ScalarType;

    fn model_shape(&self) -> &ModelShape {
        &self.model_shape
    }

    fn reg(&self, model: &DVector<ScalarType>) -> Result<ScalarType, RegularizationError> {
        check_model_size(model, self.model_size())?;
        let deviation = model - &self.mean_model;
        let weighted = &self.inverse_covariance * &deviation;
        Ok(deviation.dot(&weighted))
    }

    fn gradient(
        &self,
        model: &DVector<ScalarType>,
    ) -> Result<DVector<ScalarType>, RegularizationError> {
        check_model_size(model, self.model_size())?;
        let two = ScalarType::one() + ScalarType::one();
        let deviation = model - &self.mean_model;
        Ok(&self.inverse_covariance * deviation * two)
    }

    fn hessian(
        &self,
        model: &DVector<ScalarType>,
    ) -> Result<DMatrix<ScalarType>, RegularizationError> {
        check_model_size(model, self.model_size())?;
        let two = ScalarType::one() + ScalarType::one();
        Ok(&self.inverse_covariance * two)
    }
}
