use std::ops::{Deref, DerefMut};

/// A fixed length buffer of `f32` values.
///
/// The length is set at construction and never changes, the buffer can only be read
/// and written in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    data: Box<[f32]>,
}

impl Tensor {
    /// Creates a new `Tensor` filled with zeros.
    ///
    /// # Arguments
    /// * `len` - The amount of values this tensor should hold.
    ///
    /// # Returns
    /// A new `Tensor` instance.
    pub fn zeros(len: usize) -> Self {
        Self {
            data: vec![0.; len].into_boxed_slice(),
        }
    }

    /// Tries to create a new `Tensor` filled with zeros without aborting on allocation failure.
    ///
    /// # Arguments
    /// * `len` - The amount of values this tensor should hold.
    ///
    /// # Returns
    /// A new `Tensor` or `None` if the buffer couldn't be allocated.
    pub fn try_zeros(len: usize) -> Option<Self> {
        let mut data = Vec::new();
        data.try_reserve_exact(len).ok()?;
        data.resize(len, 0.);

        Some(Self {
            data: data.into_boxed_slice(),
        })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [f32] {
        &mut self.data
    }
}

impl From<Vec<f32>> for Tensor {
    fn from(value: Vec<f32>) -> Self {
        Self {
            data: value.into_boxed_slice(),
        }
    }
}

impl From<&[f32]> for Tensor {
    fn from(value: &[f32]) -> Self {
        Self { data: value.into() }
    }
}

impl From<Box<[f32]>> for Tensor {
    fn from(data: Box<[f32]>) -> Self {
        Self { data }
    }
}

impl Deref for Tensor {
    type Target = [f32];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl DerefMut for Tensor {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zeros() {
        let tensor = Tensor::zeros(3);
        assert_eq!(tensor.as_slice(), [0., 0., 0.]);
        assert_eq!(tensor.len(), 3);
    }

    #[test]
    fn try_zeros_matches_zeros() {
        assert_eq!(Tensor::try_zeros(4), Some(Tensor::zeros(4)));
    }

    #[test]
    fn in_place_writes() {
        let mut tensor = Tensor::from(vec![1., 2.]);
        tensor[1] = 5.;
        tensor.as_mut_slice()[0] = 3.;

        assert_eq!(*tensor, [3., 5.]);
    }
}
