use super::{
    Optimizer,
    optimizer::{check_len, decayed_grad},
};
use crate::{error::Result, tensor::Tensor};

/// Gradient descent with a velocity term, optionally in it's Nesterov form.
#[derive(Debug)]
pub struct GradientDescentWithMomentum {
    momentum: f32,
    nesterov: bool,
    decay: f32,
    velocity: Tensor,
}

impl GradientDescentWithMomentum {
    /// Creates a new `GradientDescentWithMomentum` optimizer.
    ///
    /// # Arguments
    /// * `velocity` - The zeroed velocity buffer, as long as the parameter.
    /// * `momentum` - Hyperparameter to the optimization algorithm.
    /// * `nesterov` - Whether to apply Nesterov's lookahead.
    /// * `decay` - The L2 weight decay coefficient, `0` disables it.
    ///
    /// # Returns
    /// A new `GradientDescentWithMomentum` instance.
    pub fn new(velocity: Tensor, momentum: f32, nesterov: bool, decay: f32) -> Self {
        Self {
            momentum,
            nesterov,
            decay,
            velocity,
        }
    }
}

impl Optimizer for GradientDescentWithMomentum {
    fn update_params(
        &mut self,
        learning_rate: f32,
        _step: u64,
        grad: &[f32],
        params: &mut [f32],
    ) -> Result<()> {
        check_len(grad, params)?;

        let lr = learning_rate;
        let mu = self.momentum;
        let decay = self.decay;
        let nesterov = self.nesterov;

        params
            .iter_mut()
            .zip(grad)
            .zip(self.velocity.iter_mut())
            .for_each(|((p, g), v)| {
                let g = decayed_grad(*g, *p, decay);
                *v = (mu * *v) + g;

                if nesterov {
                    *p -= lr * (g + mu * *v);
                } else {
                    *p -= lr * *v;
                }
            });

        Ok(())
    }

    fn state(&self) -> Vec<&[f32]> {
        vec![self.velocity.as_slice()]
    }

    fn state_mut(&mut self) -> Vec<&mut [f32]> {
        vec![self.velocity.as_mut_slice()]
    }
}
