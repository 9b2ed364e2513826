use crate::errors::RegularizationError;
use crate::operators::{difference_operator, DifferenceOrder, ModelShape};
use approx::assert_relative_eq;
use assert_matches::assert_matches;
use nalgebra::{DMatrix, DVector};

#[test]
fn model_shape_reports_the_product_of_its_axes_as_size() {
    assert_eq!(ModelShape::from(7).size(), 7);
    assert_eq!(ModelShape::from((3, 5)).size(), 15);
    assert_eq!(ModelShape::from(vec![2, 3, 4]).size(), 24);
    assert_eq!(ModelShape::from((3, 5)).dimensions(), 2);
    assert_eq!(ModelShape::from((3, 5)).axes(), &[3, 5]);
}

#[test]
#[allow(non_snake_case)]
fn first_order_operator_reproduces_the_exact_stencil_coefficients() {
    let D = difference_operator::<f64>(DifferenceOrder::First, &ModelShape::from(5)).unwrap();
    #[rustfmt::skip]
    let expected = DMatrix::from_row_slice(5, 5, &[
        -1.5,  2.0, -0.5,  0.0,  0.0,
        -0.5,  0.0,  0.5,  0.0,  0.0,
         0.0, -0.5,  0.0,  0.5,  0.0,
         0.0,  0.0, -0.5,  0.0,  0.5,
         0.0,  0.0,  0.5, -2.0,  1.5,
    ]);
    assert_relative_eq!(D, expected);
}

#[test]
#[allow(non_snake_case)]
fn second_order_operator_reproduces_the_exact_stencil_coefficients() {
    let D = difference_operator::<f64>(DifferenceOrder::Second, &ModelShape::from(4)).unwrap();
    #[rustfmt::skip]
    let expected = DMatrix::from_row_slice(4, 4, &[
         2.0, -5.0,  4.0, -1.0,
         1.0, -2.0,  1.0,  0.0,
         0.0,  1.0, -2.0,  1.0,
        -1.0,  4.0, -5.0,  2.0,
    ]);
    assert_relative_eq!(D, expected);
}

#[test]
fn operators_annihilate_the_functions_of_one_degree_less() {
    // a first derivative stencil must be exact on linear functions and a
    // second derivative stencil exact on quadratics, boundary rows included
    let linear = DVector::from_fn(8, |index, _| 3.0 * index as f64 + 1.0);
    let first = difference_operator::<f64>(DifferenceOrder::First, &ModelShape::from(8)).unwrap();
    assert_relative_eq!(
        &first * &linear,
        DVector::from_element(8, 3.0),
        epsilon = 1e-12
    );

    let quadratic = DVector::from_fn(8, |index, _| (index * index) as f64);
    let second = difference_operator::<f64>(DifferenceOrder::Second, &ModelShape::from(8)).unwrap();
    assert_relative_eq!(
        &second * &quadratic,
        DVector::from_element(8, 2.0),
        epsilon = 1e-12
    );
}

#[test]
fn grid_axes_below_the_minimum_length_are_rejected() {
    assert_matches!(
        difference_operator::<f64>(DifferenceOrder::First, &ModelShape::from(2)),
        Err(RegularizationError::Configuration { .. })
    );
    assert_matches!(
        difference_operator::<f64>(DifferenceOrder::Second, &ModelShape::from(3)),
        Err(RegularizationError::Configuration { .. })
    );
    // the minimum lengths themselves are fine
    assert!(difference_operator::<f64>(DifferenceOrder::First, &ModelShape::from(3)).is_ok());
    assert!(difference_operator::<f64>(DifferenceOrder::Second, &ModelShape::from(4)).is_ok());
}

#[test]
fn two_dimensional_grids_are_checked_on_both_axes() {
    assert_matches!(
        difference_operator::<f64>(DifferenceOrder::Second, &ModelShape::from((3, 8))),
        Err(RegularizationError::Configuration { .. })
    );
    assert_matches!(
        difference_operator::<f64>(DifferenceOrder::Second, &ModelShape::from((8, 3))),
        Err(RegularizationError::Configuration { .. })
    );
}

#[test]
#[allow(non_snake_case)]
fn two_dimensional_operator_stacks_the_directional_derivatives() {
    let (nx, ny) = (4, 5);
    let size = nx * ny;
    let D = difference_operator::<f64>(DifferenceOrder::First, &ModelShape::from((nx, ny))).unwrap();
    assert_eq!(D.shape(), (2 * size, size));

    // a model that is linear in x and constant in y, flattened row-major
    let model = DVector::from_fn(size, |index, _| (index / ny) as f64);
    let derivative = &D * &model;
    // x-direction block sees slope one everywhere, y-direction block sees zero
    assert_relative_eq!(
        derivative.rows(0, size).into_owned(),
        DVector::from_element(size, 1.0),
        epsilon = 1e-12
    );
    assert_relative_eq!(
        derivative.rows(size, size).into_owned(),
        DVector::from_element(size, 0.0),
        epsilon = 1e-12
    );
}

#[test]
fn grids_beyond_two_dimensions_are_not_supported() {
    assert_matches!(
        difference_operator::<f64>(DifferenceOrder::First, &ModelShape::from(vec![4, 4, 4])),
        Err(RegularizationError::NotSupported { dimensions: 3 })
    );
    assert_matches!(
        difference_operator::<f64>(DifferenceOrder::First, &ModelShape::from(Vec::new())),
        Err(RegularizationError::NotSupported { dimensions: 0 })
    );
}
