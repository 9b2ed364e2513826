use thiserror::Error as ThisError;

/// An error structure containing the error variants that can occur when
/// building or evaluating regularization terms.
///
/// All of these are detected eagerly, either while a term is constructed
/// (invalid parameters) or at the top of an evaluator (mismatched model
/// dimensions). Nothing is retried or silently recovered.
#[derive(Debug, Clone, PartialEq, Eq, ThisError)]
pub enum RegularizationError {
    /// Construction parameters do not describe a valid term, e.g. a
    /// non-positive norm order, a negative scale factor, a model grid too
    /// small for the requested difference stencil, or a malformed custom
    /// weighting matrix.
    #[error("invalid term configuration: {}", reason)]
    Configuration {
        /// what was wrong with the given parameters
        reason: String,
    },

    /// An option string was given that is not part of the closed set of
    /// recognized values.
    #[error(
        "the {} '{}' is invalid, please choose from the following: {}.",
        name,
        invalid_option,
        valid_options
    )]
    InvalidOption {
        /// name of the item that was handed the invalid option
        name: &'static str,
        /// the invalid option that was entered
        invalid_option: String,
        /// the closed set of valid options to choose from
        valid_options: &'static str,
    },

    /// A model, reference model or operand term does not match the
    /// dimensions that an existing term was constructed for.
    #[error(
        "the {} has {} element(s), which does not match the {} element(s) expected from the {}.",
        entered_name,
        entered_size,
        expected_size,
        expected_source
    )]
    DimensionMismatch {
        /// name of the item whose dimension conflicts with the expectation
        entered_name: &'static str,
        /// the flattened size of that item
        entered_size: usize,
        /// the size expected based on existing information
        expected_size: usize,
        /// name of the existing component that implies the expected size
        expected_source: &'static str,
    },

    /// A difference operator was requested for a grid dimensionality that
    /// this crate does not implement.
    #[error(
        "difference operators are only implemented for one and two dimensional model grids, but a {} dimensional grid was given.",
        dimensions
    )]
    NotSupported {
        /// the number of grid dimensions that was requested
        dimensions: usize,
    },
}

impl RegularizationError {
    /// shorthand for a [`RegularizationError::Configuration`] with the given reason
    pub(crate) fn configuration(reason: impl Into<String>) -> Self {
        Self::Configuration {
            reason: reason.into(),
        }
    }
}
