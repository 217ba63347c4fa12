use super::{
    Optimizer,
    optimizer::{check_len, decayed_grad},
};
use crate::{error::Result, tensor::Tensor};

/// Adaptive gradient, scales each step by the inverse root of the accumulated squared gradients.
#[derive(Debug)]
pub struct Adagrad {
    epsilon: f32,
    decay: f32,
    sum_of_squares: Tensor,
}

impl Adagrad {
    /// Creates a new `Adagrad` optimizer.
    ///
    /// # Arguments
    /// * `sum_of_squares` - The zeroed accumulator, as long as the parameter.
    /// * `epsilon` - Added to the denominator for numerical stability.
    /// * `decay` - The L2 weight decay coefficient, `0` disables it.
    ///
    /// # Returns
    /// A new `Adagrad` instance.
    pub fn new(sum_of_squares: Tensor, epsilon: f32, decay: f32) -> Self {
        Self {
            epsilon,
            decay,
            sum_of_squares,
        }
    }
}

impl Optimizer for Adagrad {
    fn update_params(
        &mut self,
        learning_rate: f32,
        _step: u64,
        grad: &[f32],
        params: &mut [f32],
    ) -> Result<()> {
        check_len(grad, params)?;

        let Self {
            epsilon: eps,
            decay,
            ..
        } = *self;
        let lr = learning_rate;

        params
            .iter_mut()
            .zip(grad)
            .zip(self.sum_of_squares.iter_mut())
            .for_each(|((p, g), g2)| {
                let g = decayed_grad(*g, *p, decay);
                *g2 += g * g;
                *p -= lr * g / (g2.sqrt() + eps);
            });

        Ok(())
    }

    fn state(&self) -> Vec<&[f32]> {
        vec![self.sum_of_squares.as_slice()]
    }

    fn state_mut(&mut self) -> Vec<&mut [f32]> {
        vec![self.sum_of_squares.as_mut_slice()]
    }
}
