pub use crate::operators::ModelShape;
pub use crate::term::CompositeRegularization;
pub use crate::term::GaussianPriorRegularization;
pub use crate::term::LpNormRegularization;
pub use crate::term::LpNormRegularizationBuilder;
pub use crate::term::QuadraticRegularization;
pub use crate::term::QuadraticRegularizationBuilder;
pub use crate::term::Regularization;
pub use crate::weighting::Weighting;
