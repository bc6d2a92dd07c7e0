use crate::{
    error::Error,
    point::Point,
    pose::{constants::NUM_EDGES, NUM_KEYPOINTS},
};
use ndarray::{ArrayView3, ArrayView4, Axis, ErrorKind, ShapeError};
use num_traits::cast::ToPrimitive;

/// A cell of the network output grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridCell {
    pub row: usize,
    pub col: usize,
}

impl GridCell {
    pub const fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }

    /// Input-space coordinate of the cell's origin.
    pub fn to_image(self, output_stride: f32) -> Result<Point, Error> {
        Ok(Point::new(
            self.col.to_f32().ok_or(Error::ConvertToF32)? * output_stride,
            self.row.to_f32().ok_or(Error::ConvertToF32)? * output_stride,
        ))
    }
}

fn clip_to_axis(coord: f32, output_stride: f32, len: usize) -> Result<usize, Error> {
    let max = (len - 1).to_f32().ok_or(Error::ConvertToF32)?;
    // NaN has no cell; it lands on the first one
    Ok((coord / output_stride)
        .round()
        .clamp(0.0, max)
        .to_usize()
        .unwrap_or_default())
}

/// Read-only `(channel, row, col)` view over one batch of a network output.
#[derive(Debug, Clone, Copy)]
pub struct TensorView<'a> {
    name: &'static str,
    data: ArrayView3<'a, f32>,
}

impl<'a> TensorView<'a> {
    /// View a contiguous `[1, channels, height, width]` buffer.
    pub fn from_slice(
        name: &'static str,
        data: &'a [f32],
        shape: (usize, usize, usize),
    ) -> Result<Self, Error> {
        let (channels, height, width) = shape;
        let construct_error = |source| Error::ConstructTensorView {
            source,
            name,
            shape,
        };
        if data.len() != channels * height * width {
            return Err(construct_error(ShapeError::from_kind(
                ErrorKind::IncompatibleShape,
            )));
        }
        let data = ArrayView3::from_shape(shape, data).map_err(construct_error)?;
        Self::new(name, data)
    }

    /// View a `[batch, channels, height, width]` array with any strides. The batch
    /// axis must have length one.
    pub fn from_view(name: &'static str, data: ArrayView4<'a, f32>) -> Result<Self, Error> {
        let batch = data.len_of(Axis(0));
        if batch != 1 {
            return Err(Error::BatchSize { name, batch });
        }
        Self::new(name, data.index_axis_move(Axis(0), 0))
    }

    fn new(name: &'static str, data: ArrayView3<'a, f32>) -> Result<Self, Error> {
        let (_, height, width) = data.dim();
        if height == 0 || width == 0 {
            return Err(Error::EmptyGrid { name });
        }
        Ok(Self { name, data })
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn channels(&self) -> usize {
        self.data.len_of(Axis(0))
    }

    pub fn height(&self) -> usize {
        self.data.len_of(Axis(1))
    }

    pub fn width(&self) -> usize {
        self.data.len_of(Axis(2))
    }

    /// `(height, width)` of the grid.
    pub fn grid(&self) -> (usize, usize) {
        (self.height(), self.width())
    }

    /// Value at `cell`.
    ///
    /// # Panics
    ///
    /// When `channel` or `cell` are outside the tensor. Cells produced by
    /// [`TensorView::cell_at`] are always inside.
    #[inline]
    pub fn read(&self, channel: usize, cell: GridCell) -> f32 {
        self.data[(channel, cell.row, cell.col)]
    }

    #[inline]
    pub fn get(&self, channel: usize, row: usize, col: usize) -> Option<f32> {
        self.data.get((channel, row, col)).copied()
    }

    /// Two-channel vector at `cell`. The first half of the channels holds the row (y)
    /// component and the second half the column (x) component.
    #[inline]
    pub fn vector(&self, channel: usize, cell: GridCell) -> Point {
        let half = self.channels() / 2;
        Point::new(self.read(channel + half, cell), self.read(channel, cell))
    }

    /// Grid cell nearest to an input-space point, clipped to the grid.
    pub fn cell_at(&self, point: Point, output_stride: f32) -> Result<GridCell, Error> {
        Ok(GridCell {
            row: clip_to_axis(point.y(), output_stride, self.height())?,
            col: clip_to_axis(point.x(), output_stride, self.width())?,
        })
    }
}

/// The four network outputs a decode runs over.
#[derive(Debug, Clone, Copy)]
pub struct ModelOutputs<'a> {
    pub heatmaps: TensorView<'a>,
    pub offsets: TensorView<'a>,
    pub displacements_fwd: TensorView<'a>,
    pub displacements_bwd: TensorView<'a>,
}

impl<'a> ModelOutputs<'a> {
    pub fn new(
        heatmaps: TensorView<'a>,
        offsets: TensorView<'a>,
        displacements_fwd: TensorView<'a>,
        displacements_bwd: TensorView<'a>,
    ) -> Result<Self, Error> {
        let grid = heatmaps.grid();
        for (tensor, expected) in [
            (heatmaps, NUM_KEYPOINTS),
            (offsets, 2 * NUM_KEYPOINTS),
            (displacements_fwd, 2 * NUM_EDGES),
            (displacements_bwd, 2 * NUM_EDGES),
        ] {
            let actual = tensor.channels();
            if actual != expected {
                return Err(Error::ChannelCount {
                    name: tensor.name(),
                    expected,
                    actual,
                });
            }
            if tensor.grid() != grid {
                return Err(Error::GridMismatch {
                    name: tensor.name(),
                    expected: grid,
                    actual: tensor.grid(),
                });
            }
        }
        Ok(Self {
            heatmaps,
            offsets,
            displacements_fwd,
            displacements_bwd,
        })
    }
}
