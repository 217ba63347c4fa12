use super::{
    Optimizer,
    optimizer::{check_len, decayed_grad},
};
use crate::error::Result;

/// Plain gradient descent, `p -= lr * g`.
#[derive(Debug)]
pub struct GradientDescent {
    decay: f32,
}

impl GradientDescent {
    /// Creates a new `GradientDescent` optimizer.
    ///
    /// # Arguments
    /// * `decay` - The L2 weight decay coefficient, `0` disables it.
    ///
    /// # Returns
    /// A new `GradientDescent` instance.
    pub fn new(decay: f32) -> Self {
        Self { decay }
    }
}

impl Optimizer for GradientDescent {
    fn update_params(
        &mut self,
        learning_rate: f32,
        _step: u64,
        grad: &[f32],
        params: &mut [f32],
    ) -> Result<()> {
        check_len(grad, params)?;

        let lr = learning_rate;
        let decay = self.decay;

        for (p, g) in params.iter_mut().zip(grad) {
            *p -= lr * decayed_grad(*g, *p, decay);
        }

        Ok(())
    }

    fn state(&self) -> Vec<&[f32]> {
        Vec::new()
    }

    fn state_mut(&mut self) -> Vec<&mut [f32]> {
        Vec::new()
    }
}
