//! Dense 2-D pixel grid

use crate::linearization::common::error::{LinearizationError, Result};

/// A single-channel image stored row-major.
///
/// `x` is the column and `y` the row; pixel `(x, y)` lives at
/// `data[y * width + x]`.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame<T> {
    width: usize,
    height: usize,
    data: Vec<T>,
}

impl<T> Frame<T> {
    pub fn new(width: usize, height: usize, data: Vec<T>) -> Result<Self> {
        if width == 0 || height == 0 || data.len() != width * height {
            return Err(LinearizationError::InvalidDimensions(width, height));
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Result<Self> {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self::new(width, height, data)
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    pub fn shape(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x)
    }

    /// Coordinates of a flat buffer index.
    pub fn coords(&self, index: usize) -> (usize, usize) {
        (index % self.width, index / self.width)
    }

    pub fn ensure_shape(&self, shape: (usize, usize)) -> Result<()> {
        if self.shape() != shape {
            return Err(LinearizationError::ShapeMismatch {
                expected: shape,
                found: self.shape(),
            });
        }
        Ok(())
    }

    pub fn map<U>(&self, f: impl FnMut(&T) -> U) -> Frame<U> {
        Frame {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T: Copy + Into<f64>> Frame<T> {
    pub fn mean(&self) -> f64 {
        self.data.iter().map(|&v| v.into()).sum::<f64>() / self.data.len() as f64
    }

    pub fn to_f64(&self) -> Frame<f64> {
        self.map(|&v| v.into())
    }
}
