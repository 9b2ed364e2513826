use super::{check_model_size, resolve_model_shape, Regularization};
use crate::errors::RegularizationError;
use crate::operators::ModelShape;
use crate::weighting::{Weighting, WeightingMatrix, WeightingOperator};
use nalgebra::{DMatrix, DVector, RealField, Scalar};
use num_traits::FromPrimitive;

/// A generalized Tikhonov penalty of order `$p$`,
///
/// ```math
/// L(m) = ||D(m - m_0)||_p^p = \sum_i |(D(m - m_0))_i|^p,
/// ```
///
/// where `$D$` is the weighting matrix, `$m_0$` an optional reference model
/// (absent means `$m_0 = 0$`) and `$p > 0$` the norm order. The gradient and
/// Hessian follow by the chain rule through the linear map `$D$`:
///
/// ```math
/// \nabla L(m) = D^T \left( p\,|d|^{p-1} \mathrm{sign}(d) \right), \qquad
/// \nabla^2 L(m) = D^T \mathrm{diag}\!\left( p (p-1) |d|^{p-2} \right) D,
/// ```
///
/// with `$d = D(m - m_0)$` and all element functions applied elementwise.
///
/// # Singular points
///
/// At an exactly zero element `$d_i = 0$` the gradient is singular for
/// `$p < 1$` and the Hessian for `$p < 2$`, since `$0^{\text{negative}}$`
/// occurs. These evaluations are intentionally not special-cased; the
/// arithmetic surfaces whatever IEEE special value it produces (infinity or
/// NaN). Callers operating near an exact reference match with small `$p$`
/// must be aware of this. (At `$p = 1$` the gradient uses the mathematical
/// sign with `$\mathrm{sign}(0) = 0$` and stays finite.)
///
/// Use the [`LpNormRegularizationBuilder`] to construct instances. For
/// `$p = 2$` the [`QuadraticRegularization`](crate::term::QuadraticRegularization)
/// term produces the same values in closed form without the elementwise
/// Hessian assembly.
#[derive(Debug, Clone, PartialEq)]
pub struct LpNormRegularization<ScalarType>
where
    ScalarType: Scalar + RealField,
{
    order: ScalarType,
    matrix: WeightingMatrix<ScalarType>,
    reference_model: Option<DVector<ScalarType>>,
    model_shape: ModelShape,
}

impl<ScalarType> LpNormRegularization<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// the norm order `$p$` of this term
    pub fn order(&self) -> ScalarType {
        self.order
    }

    /// the weighting matrix `$D$` of this term
    pub fn matrix(&self) -> &WeightingMatrix<ScalarType> {
        &self.matrix
    }

    /// the reference model `$m_0$`, if one was given
    pub fn reference_model(&self) -> Option<&DVector<ScalarType>> {
        self.reference_model.as_ref()
    }

    /// the weighted deviation `$d = D(m - m_0)$` of a size-checked model
    fn weighted_deviation(&self, model: &DVector<ScalarType>) -> DVector<ScalarType> {
        match &self.reference_model {
            Some(reference) => self.matrix.apply(&(model - reference)),
            None => self.matrix.apply(model),
        }
    }
}

impl<ScalarType> Regularization for LpNormRegularization<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    type ScalarType = ScalarType;

    fn model_shape(&self) -> &ModelShape {
        &self.model_shape
    }

    fn reg(&self, model: &DVector<ScalarType>) -> Result<ScalarType, RegularizationError> {
        check_model_size(model, self.model_size())?;
        let deviation = self.weighted_deviation(model);
        Ok(deviation.iter().fold(ScalarType::zero(), |sum, element| {
            sum + element.abs().powf(self.order)
        }))
    }

    fn gradient(
        &self,
        model: &DVector<ScalarType>,
    ) -> Result<DVector<ScalarType>, RegularizationError> {
        check_model_size(model, self.model_size())?;
        let deviation = self.weighted_deviation(model);
        let exponent = self.order - ScalarType::one();
        let elementwise =
            deviation.map(|element| self.order * element.abs().powf(exponent) * sign(element));
        Ok(self.matrix.apply_transpose(&elementwise))
    }

    fn hessian(
        &self,
        model: &DVector<ScalarType>,
    ) -> Result<DMatrix<ScalarType>, RegularizationError> {
        check_model_size(model, self.model_size())?;
        let deviation = self.weighted_deviation(model);
        let two = ScalarType::one() + ScalarType::one();
        let exponent = self.order - two;
        let scale = self.order * (self.order - ScalarType::one());
        let elementwise = deviation.map(|element| scale * element.abs().powf(exponent));
        Ok(self.matrix.weighted_gram(&elementwise))
    }
}

/// the mathematical sign with `sign(0) = 0`. The std `signum` reports
/// `1` at zero, which would break the `$p \leq 1$` gradients at exact
/// reference matches.
fn sign<ScalarType>(value: ScalarType) -> ScalarType
where
    ScalarType: Scalar + RealField + Copy,
{
    if value > ScalarType::zero() {
        ScalarType::one()
    } else if value < ScalarType::zero() {
        -ScalarType::one()
    } else {
        ScalarType::zero()
    }
}

/// A builder for [`LpNormRegularization`] terms.
///
/// The norm order is given up front (or defaulted to `$p = 2$` via
/// [`Default`]), the weighting defaults to damping, and the model shape can
/// either be set explicitly or inferred from the reference model.
///
/// # Usage
///
/// ```rust
/// use nalgebra::DVector;
/// use tikhonov::prelude::*;
/// # fn main() -> Result<(), tikhonov::errors::RegularizationError> {
/// let term = LpNormRegularizationBuilder::new(1.0)
///     .weighting(Weighting::Flattening)
///     .model_shape(8)
///     .build()?;
/// // a constant model has zero slope, so the flattening penalty vanishes
/// assert_eq!(term.reg(&DVector::from_element(8, 1.0))?, 0.0);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LpNormRegularizationBuilder<ScalarType>
where
    ScalarType: Scalar + RealField,
{
    order: ScalarType,
    weighting: Weighting<ScalarType>,
    model_shape: Option<ModelShape>,
    reference_model: Option<DVector<ScalarType>>,
}

/// A builder for the default norm order `$p = 2$` with damping weighting.
impl<ScalarType> Default for LpNormRegularizationBuilder<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    fn default() -> Self {
        Self::new(ScalarType::one() + ScalarType::one())
    }
}

impl<ScalarType> LpNormRegularizationBuilder<ScalarType>
where
    ScalarType: Scalar + RealField + Copy,
{
    /// start building a term with the given norm order `$p$`
    pub fn new(order: ScalarType) -> Self {
        Self {
            order,
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

impl<ScalarType> LpNormRegularizationBuilder<ScalarType>
where
    ScalarType: Scalar + RealField + Copy + FromPrimitive,
{
    /// Build the term, eagerly resolving the weighting matrix so the
    /// finished term is fully valid and immutable the moment it exists.
    ///
    /// # Errors
    ///
    /// `Configuration` if the norm order is not a positive finite number,
    /// if neither a model shape nor a reference model was given, or if the
    /// weighting cannot be resolved against the shape (grid too small,
    /// malformed custom matrix). `DimensionMismatch` if both a model shape
    /// and a reference model were given but disagree in size.
    /// `NotSupported` if a difference weighting is requested for a grid of
    /// more than two dimensions.
    pub fn build(self) -> Result<LpNormRegularization<ScalarType>, RegularizationError> {
        if !(self.order.is_finite() && self.order > ScalarType::zero()) {
            return Err(RegularizationError::configuration(format!(
                "the norm order must be a positive finite number, but {:?} was given",
                self.order
            )));
        }
        let model_shape = resolve_model_shape(self.model_shape, self.reference_model.as_ref())?;
        let matrix = self.weighting.resolve(&model_shape)?;
        Ok(LpNormRegularization {
            order: self.order,
            matrix,
            reference_model: self.reference_model,
            model_shape,
        })
    }
}
