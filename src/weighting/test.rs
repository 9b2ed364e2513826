use crate::errors::RegularizationError;
use crate::operators::ModelShape;
use crate::weighting::{Weighting, WeightingMatrix, WeightingOperator};
use approx::assert_relative_eq;
use assert_matches::assert_matches;
use nalgebra::{DMatrix, DVector};

#[test]
fn parsing_recognizes_the_closed_set_of_weighting_kinds() {
    assert_eq!("damping".parse(), Ok(Weighting::<f64>::Damping));
    assert_eq!("flattening".parse(), Ok(Weighting::<f64>::Flattening));
    assert_eq!("roughening".parse(), Ok(Weighting::<f64>::Flattening));
    assert_eq!("smoothing".parse(), Ok(Weighting::<f64>::Smoothing));
}

#[test]
fn unknown_weighting_kinds_are_rejected_naming_the_valid_options() {
    let error = "sharpening".parse::<Weighting<f64>>().unwrap_err();
    assert_matches!(
        error,
        RegularizationError::InvalidOption {
            ref invalid_option, ..
        } if invalid_option.as_str() == "sharpening"
    );
    // the error message spells out the closed set of choices
    assert!(error.to_string().contains("'damping'"));
    assert!(error.to_string().contains("'smoothing'"));
}

#[test]
fn damping_resolves_to_the_identity_of_the_model_size() {
    let matrix = Weighting::<f64>::Damping
        .resolve(&ModelShape::from((2, 3)))
        .unwrap();
    assert_eq!(matrix, WeightingMatrix::Identity(6));
    assert_eq!(matrix.dense(), DMatrix::identity(6, 6));
    assert_eq!(matrix.nrows(), 6);
    assert_eq!(matrix.ncols(), 6);
}

#[test]
fn difference_weightings_resolve_to_the_stencil_operators() {
    let flattening = Weighting::<f64>::Flattening
        .resolve(&ModelShape::from(5))
        .unwrap();
    assert_eq!(flattening.nrows(), 5);
    // interior stencil row of the first derivative
    assert_relative_eq!(
        flattening.dense().row(2).transpose(),
        DVector::from(vec![0.0, -0.5, 0.0, 0.5, 0.0])
    );

    let smoothing = Weighting::<f64>::Smoothing
        .resolve(&ModelShape::from(4))
        .unwrap();
    assert_eq!(smoothing.dense().shape(), (4, 4));
}

#[test]
fn custom_matrices_must_have_one_column_per_model_parameter() {
    let matrix = DMatrix::from_element(7, 4, 1.0);
    // row count is unconstrained
    assert!(Weighting::Custom(matrix.clone())
        .resolve(&ModelShape::from(4))
        .is_ok());
    assert_matches!(
        Weighting::Custom(matrix).resolve(&ModelShape::from(5)),
        Err(RegularizationError::Configuration { .. })
    );
}

#[test]
#[allow(non_snake_case)]
fn application_matches_the_dense_matrix_products() {
    let D = DMatrix::from_row_slice(
        2,
        3,
        &[
            1.0, -2.0, 0.5, //
            0.0, 3.0, -1.0,
        ],
    );
    let weighting = WeightingMatrix::Dense(D.clone());
    let v = DVector::from(vec![1.0, 2.0, 3.0]);
    let w = DVector::from(vec![2.0, -1.0]);

    assert_relative_eq!(weighting.apply(&v), &D * &v);
    assert_relative_eq!(weighting.apply_transpose(&w), D.transpose() * &w);
    assert_relative_eq!(weighting.gram(), D.transpose() * &D);
    assert_relative_eq!(
        weighting.weighted_gram(&w),
        D.transpose() * DMatrix::from_diagonal(&w) * &D
    );
}

#[test]
fn identity_application_is_a_clone_and_its_weighted_gram_the_diagonal() {
    let weighting = WeightingMatrix::<f64>::Identity(3);
    let v = DVector::from(vec![1.0, 2.0, 3.0]);
    assert_eq!(weighting.apply(&v), v);
    assert_eq!(weighting.apply_transpose(&v), v);
    assert_eq!(weighting.gram(), DMatrix::identity(3, 3));
    assert_eq!(weighting.weighted_gram(&v), DMatrix::from_diagonal(&v));
}

#[test]
#[should_panic]
fn identity_application_panics_for_an_incorrectly_sized_vector() {
    let weighting = WeightingMatrix::<f64>::Identity(3);
    let _ = weighting.apply(&DVector::from(vec![1.0, 2.0]));
}

#[test]
fn a_plain_dense_matrix_is_itself_a_weighting_operator() {
    let matrix = DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]);
    let v = DVector::from(vec![1.0, -1.0]);
    assert_relative_eq!(
        WeightingOperator::apply(&matrix, &v),
        DVector::from(vec![-1.0, -1.0])
    );
    assert_relative_eq!(
        WeightingOperator::apply_transpose(&matrix, &v),
        DVector::from(vec![-2.0, -2.0])
    );
}
