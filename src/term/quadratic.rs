use super::{check_model_size, resolve_model_shape, Regularization};
use crate::errors::RegularizationError;
use crate::operators::ModelShape;
use crate::weighting::{Weighting, WeightingMatrix, WeightingOperator};
use nalgebra::{DMatrix, DVector, RealField, Scalar};
use num_traits::FromPrimitive;

/// The classic quadratic (`$p = 2$`) Tikhonov penalty
///
/// ```math
/// L(m) = \mathrm{factor} \cdot ||D(m - m_0)||_2^2,
/// ```
///
/// with the closed-form derivatives
///
/// ```math
/// \nabla L(m) = 2\,\mathrm{factor}\, D^T D (m - m_0), \qquad
/// \nabla^2 L(m) = 2\,\mathrm{factor}\, D^T D.
/// ```
///
/// This is the specialization of
/// [`LpNormRegularization`](crate::term::LpNormRegularization) to `$p = 2$`:
/// it produces the same values (up to the factor) but trades the elementwise
/// Hessian assembly of the general engine for the exact symmetric Gram
/// matrix. The Hessian is independent of the model, so callers driving an
/// optimization loop may evaluate it once per term and reuse it.
///
/// For the pure damping case `$D = I$` the penalty reduces to
/// `$\mathrm{factor} \cdot ||m - m_0||_2^2$` and no matrix product is
/// performed at all.
///
/// Use the [`QuadraticRegularizationBuilder`] to construct instances.
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticRegularization<ScalarType>
where
    ScalarType: Scalar + RealField,
{
    factor: ScalarType,
    matrix: WeightingMatrix<ScalarType>,
    reference_model: Option<DVector<ScalarType>>,
    model_shape: ModelShape,
}

impl<ScalarType> QuadraticRegularization<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// the non-negative scale factor of this term
    pub fn factor(&self) -> ScalarType {
        self.factor
    }

    /// the weighting matrix `$D$` of this term
    pub fn matrix(&self) -> &WeightingMatrix<ScalarType> {
        &self.matrix
    }

    /// the reference model `$m_0$`, if one was given
    pub fn reference_model(&self) -> Option<&DVector<ScalarType>> {
        self.reference_model.as_ref()
    }

    /// the deviation `$m - m_0$` of a size-checked model
    fn deviation(&self, model: &DVector<ScalarType>) -> DVector<ScalarType> {
        match &self.reference_model {
            Some(reference) => model - reference,
            None => model.clone(),
        }
    }
}

impl<ScalarType> Regularization for QuadraticRegularization<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    type ScalarType = ScalarType;

    fn model_shape(&self) -> &ModelShape {
        &self.model_shape
    }

    fn reg(&self, model: &DVector<ScalarType>) -> Result<ScalarType, RegularizationError> {
        check_model_size(model, self.model_size())?;
        let weighted = self.matrix.apply(&self.deviation(model));
        Ok(self.factor * weighted.norm_squared())
    }

    fn gradient(
        &self,
        model: &DVector<ScalarType>,
    ) -> Result<DVector<ScalarType>, RegularizationError> {
        check_model_size(model, self.model_size())?;
        let two = ScalarType::one() + ScalarType::one();
        let weighted = self
            .matrix
            .apply_transpose(&self.matrix.apply(&self.deviation(model)));
        Ok(weighted * (two * self.factor))
    }

    fn hessian(
        &self,
        model: &DVector<ScalarType>,
    ) -> Result<DMatrix<ScalarType>, RegularizationError> {
        check_model_size(model, self.model_size())?;
        let two = ScalarType::one() + ScalarType::one();
        Ok(self.matrix.gram() * (two * self.factor))
    }
}

/// A builder for [`QuadraticRegularization`] terms.
///
/// The scale factor is given up front, the weighting defaults to damping,
/// and the model shape can either be set explicitly or inferred from the
/// reference model.
///
/// # Usage
///
/// ```rust
/// use nalgebra::DVector;
/// use tikhonov::prelude::*;
/// # fn main() -> Result<(), tikhonov::errors::RegularizationError> {
/// let term = QuadraticRegularizationBuilder::new(1.0)
///     .model_shape(3)
///     .build()?;
/// assert_eq!(term.reg(&DVector::from(vec![1.0, 2.0, 3.0]))?, 14.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct QuadraticRegularizationBuilder<ScalarType>
where
    ScalarType: Scalar + RealField,
{
    factor: ScalarType,
    weighting: Weighting<ScalarType>,
    model_shape: Option<ModelShape>,
    reference_model: Option<DVector<ScalarType>>,
}

impl<ScalarType> QuadraticRegularizationBuilder<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// start building a term with the given non-negative scale factor
    pub fn new(factor: ScalarType) -> Self {
        Self {
            factor,
            weighting: Weighting::default(),
            model_shape: None,
            reference_model: None,
        }
    }

    /// use the given weighting instead of the default damping (identity)
    /// weighting
    pub fn weighting(mut self, weighting: Weighting<ScalarType>) -> Self {
        self.weighting = weighting;
        self
    }

    /// set the shape of the model grid this term accepts. Required unless a
    /// reference model is given, from which the shape is inferred.
    pub fn model_shape(mut self, model_shape: impl Into<ModelShape>) -> Self {
        self.model_shape = Some(model_shape.into());
        self
    }

    /// set the reference model `$m_0$` that deviations are measured from.
    /// Without it the penalty measures deviation from the origin.
    pub fn reference_model(mut self, reference_model: DVector<ScalarType>) -> Self {
        self.reference_model = Some(reference_model);
        self
    }
}

impl<ScalarType> QuadraticRegularizationBuilder<ScalarType>
where
    ScalarType: Scalar + RealField + Copy + FromPrimitive,
{
    /// Build the term, eagerly resolving the weighting matrix so the
    /// finished term is fully valid and immutable the moment it exists.
    ///
    /// # Errors
    ///
    /// `Configuration` if the factor is negative or not finite (a negative
    /// penalty is not a valid regularizer), if neither a model shape nor a
    /// reference model was given, or if the weighting cannot be resolved
    /// against the shape. `DimensionMismatch` if both a model shape and a
    /// reference model were given but disagree in size. `NotSupported` if a
    /// difference weighting is requested for a grid of more than two
    /// dimensions.
    pub fn build(self) -> Result<QuadraticRegularization<ScalarType>, RegularizationError> {
        if !(self.factor.is_finite() && self.factor >= ScalarType::zero()) {
            return Err(RegularizationError::configuration(format!(
                "the regularization factor must be a non-negative finite number, but {:?} was given",
                self.factor
            )));
        }
        let model_shape = resolve_model_shape(self.model_shape, self.reference_model.as_ref())?;
        let matrix = self.weighting.resolve(&model_shape)?;
        Ok(QuadraticRegularization {
            factor: self.factor,
            matrix,
            reference_model: self.reference_model,
            model_shape,
        })
    }
}
