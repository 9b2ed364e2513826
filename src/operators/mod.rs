#[cfg(test)]
mod test;

use crate::errors::RegularizationError;
use nalgebra::{DMatrix, RealField, Scalar};
use num_traits::FromPrimitive;

/// The shape of the model grid that model vectors handed to a term are
/// flattened from.
///
/// A model vector is always a flat sequence of `$M$` real numbers, but it may
/// originate from a multi-dimensional grid. In that case `$M$` is the product
/// of the axis lengths and the flattening order is **row-major** (the last
/// axis varies fastest), i.e. the element at grid position `$(i_x, i_y)$` of
/// an `$(n_x, n_y)$` grid sits at flat index `$i_x \cdot n_y + i_y$`. This
/// order is fixed once and for all; the difference operators of this module
/// are built against it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelShape {
    axes: Vec<usize>,
}

impl ModelShape {
    /// the lengths of the individual grid axes
    pub fn axes(&self) -> &[usize] {
        &self.axes
    }

    /// the number of grid axes
    pub fn dimensions(&self) -> usize {
        self.axes.len()
    }

    /// the total number of model parameters, i.e. the product of all axis
    /// lengths
    pub fn size(&self) -> usize {
        self.axes.iter().product()
    }
}

/// a one dimensional model of the given length
impl From<usize> for ModelShape {
    fn from(length: usize) -> Self {
        Self { axes: vec![length] }
    }
}

/// a two dimensional model grid with `$(n_x, n_y)$` points
impl From<(usize, usize)> for ModelShape {
    fn from((nx, ny): (usize, usize)) -> Self {
        Self { axes: vec![nx, ny] }
    }
}

/// a one dimensional model of the given length
impl From<[usize; 1]> for ModelShape {
    fn from(axes: [usize; 1]) -> Self {
        Self {
            axes: axes.to_vec(),
        }
    }
}

/// a two dimensional model grid with `$(n_x, n_y)$` points
impl From<[usize; 2]> for ModelShape {
    fn from(axes: [usize; 2]) -> Self {
        Self {
            axes: axes.to_vec(),
        }
    }
}

/// a model grid with arbitrary axes. Note that only one and two dimensional
/// grids admit difference operators.
impl From<Vec<usize>> for ModelShape {
    fn from(axes: Vec<usize>) -> Self {
        Self { axes }
    }
}

/// a model grid with arbitrary axes. Note that only one and two dimensional
/// grids admit difference operators.
impl From<&[usize]> for ModelShape {
    fn from(axes: &[usize]) -> Self {
        Self {
            axes: axes.to_vec(),
        }
    }
}

/// The derivative order of a finite difference operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifferenceOrder {
    /// the first derivative, which penalizes the slope of the model when
    /// used as a weighting (flattening / roughening)
    First,
    /// the second derivative, which penalizes the curvature of the model
    /// when used as a weighting (smoothing)
    Second,
}

impl DifferenceOrder {
    /// the derivative order as a number
    pub fn order(&self) -> usize {
        match self {
            DifferenceOrder::First => 1,
            DifferenceOrder::Second => 2,
        }
    }

    /// the smallest axis length that admits a stencil of this order
    pub fn minimum_axis_length(&self) -> usize {
        self.order() + 2
    }
}

/// Construct the finite difference operator of the given derivative order
/// over a one or two dimensional model grid.
///
/// For a one dimensional grid of `$M$` points this is the `$M \times M$`
/// stencil matrix approximating the derivative along the single axis, with
/// central coefficients in the interior and one-sided stencils of matching
/// accuracy on the boundary rows, so the operator has the same shape as a
/// fully central scheme. For a two dimensional `$(n_x, n_y)$` grid the
/// operator is built independently along each axis and the two blocks are
/// stacked vertically (x-direction block first), giving a
/// `$(2 n_x n_y) \times (n_x n_y)$` matrix acting on row-major flattened
/// models.
///
/// # Errors
///
/// `Configuration` if any axis has fewer than
/// [`minimum_axis_length`](DifferenceOrder::minimum_axis_length) points,
/// `NotSupported` if the grid has more than two (or zero) dimensions.
pub fn difference_operator<ScalarType>(
    order: DifferenceOrder,
    shape: &ModelShape,
) -> Result<DMatrix<ScalarType>, RegularizationError>
where
    ScalarType: Scalar + RealField + FromPrimitive,
{
    match *shape.axes() {
        [length] => one_dimensional(order, length),
        [nx, ny] => {
            let along_x =
                one_dimensional::<ScalarType>(order, nx)?.kronecker(&DMatrix::identity(ny, ny));
            let along_y =
                DMatrix::identity(nx, nx).kronecker(&one_dimensional::<ScalarType>(order, ny)?);
            let size = nx * ny;
            let mut stacked = DMatrix::zeros(2 * size, size);
            stacked.view_mut((0, 0), (size, size)).copy_from(&along_x);
            stacked.view_mut((size, 0), (size, size)).copy_from(&along_y);
            Ok(stacked)
        }
        ref axes => Err(RegularizationError::NotSupported {
            dimensions: axes.len(),
        }),
    }
}

/// the stencil matrix along a single axis of the given length
fn one_dimensional<ScalarType>(
    order: DifferenceOrder,
    length: usize,
) -> Result<DMatrix<ScalarType>, RegularizationError>
where
    ScalarType: Scalar + RealField + FromPrimitive,
{
    if length < order.minimum_axis_length() {
        return Err(RegularizationError::configuration(format!(
            "a model grid axis of length {} is too small for an order {} difference operator, which needs at least {} points",
            length,
            order.order(),
            order.minimum_axis_length()
        )));
    }
    let mut matrix = DMatrix::zeros(length, length);
    match order {
        DifferenceOrder::First => {
            fill_row(&mut matrix, 0, 0, &[-1.5, 2.0, -0.5]);
            for row in 1..length - 1 {
                fill_row(&mut matrix, row, row - 1, &[-0.5, 0.0, 0.5]);
            }
            fill_row(&mut matrix, length - 1, length - 3, &[0.5, -2.0, 1.5]);
        }
        DifferenceOrder::Second => {
            fill_row(&mut matrix, 0, 0, &[2.0, -5.0, 4.0, -1.0]);
            for row in 1..length - 1 {
                fill_row(&mut matrix, row, row - 1, &[1.0, -2.0, 1.0]);
            }
            fill_row(&mut matrix, length - 1, length - 4, &[-1.0, 4.0, -5.0, 2.0]);
        }
    }
    Ok(matrix)
}

/// write a contiguous run of stencil coefficients into the given row,
/// starting at the given column
fn fill_row<ScalarType>(
    matrix: &mut DMatrix<ScalarType>,
    row: usize,
    first_column: usize,
    coefficients: &[f64],
) where
    ScalarType: Scalar + RealField + FromPrimitive,
{
    for (offset, &coefficient) in coefficients.iter().enumerate() {
        matrix[(row, first_column + offset)] = ScalarType::from_f64(coefficient)
            .expect("stencil coefficients must be representable in the scalar type");
    }
}
