use super::{
    Optimizer,
    optimizer::{check_len, decayed_grad},
};
use crate::{error::Result, tensor::Tensor};

/// Adadelta, adapts each step by the ratio of running averages of squared updates and
/// squared gradients.
#[derive(Debug)]
pub struct Adadelta {
    rho: f32,
    epsilon: f32,
    decay: f32,
    accum_gradient: Tensor,
    accum_delta: Tensor,
}

impl Adadelta {
    /// Creates a new `Adadelta` optimizer.
    ///
    /// # Arguments
    /// * `accum_gradient` - The zeroed running average of squared gradients.
    /// * `accum_delta` - The zeroed running average of squared updates.
    /// * `rho` - The decay of both running averages.
    /// * `epsilon` - Added inside the square roots for numerical stability.
    /// * `decay` - The L2 weight decay coefficient, `0` disables it.
    ///
    /// # Returns
    /// A new `Adadelta` instance.
    pub fn new(
        accum_gradient: Tensor,
        accum_delta: Tensor,
        rho: f32,
        epsilon: f32,
        decay: f32,
    ) -> Self {
        Self {
            rho,
            epsilon,
            decay,
            accum_gradient,
            accum_delta,
        }
    }
}

impl Optimizer for Adadelta {
    fn update_params(
        &mut self,
        learning_rate: f32,
        _step: u64,
        grad: &[f32],
        params: &mut [f32],
    ) -> Result<()> {
        check_len(grad, params)?;

        let Self {
            rho,
            epsilon: eps,
            decay,
            ..
        } = *self;
        let lr = learning_rate;

        params
            .iter_mut()
            .zip(grad)
            .zip(self.accum_gradient.iter_mut())
            .zip(self.accum_delta.iter_mut())
            .for_each(|(((p, g), eg2), edx2)| {
                let g = decayed_grad(*g, *p, decay);
                *eg2 = rho * *eg2 + (1. - rho) * g * g;

                let dx = (*edx2 + eps).sqrt() / (*eg2 + eps).sqrt() * g;
                *edx2 = rho * *edx2 + (1. - rho) * dx * dx;

                *p -= lr * dx;
            });

        Ok(())
    }

    fn state(&self) -> Vec<&[f32]> {
        vec![self.accum_gradient.as_slice(), self.accum_delta.as_slice()]
    }

    fn state_mut(&mut self) -> Vec<&mut [f32]> {
        vec![
            self.accum_gradient.as_mut_slice(),
            self.accum_delta.as_mut_slice(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step() {
        let (rho, eps) = (0.5_f32, 1e-2_f32);
        let mut params = [1.0];
        let mut optimizer = Adadelta::new(Tensor::zeros(1), Tensor::zeros(1), rho, eps, 0.);

        optimizer.update_params(1.0, 1, &[2.0], &mut params).unwrap();

        let eg2 = rho * 0. + (1. - rho) * 2. * 2.;
        let dx = (0. + eps).sqrt() / (eg2 + eps).sqrt() * 2.;
        let edx2 = rho * 0. + (1. - rho) * dx * dx;

        assert_eq!(*optimizer.accum_gradient, [eg2]);
        assert_eq!(*optimizer.accum_delta, [edx2]);
        assert_eq!(params, [1.0 - 1.0 * dx]);
    }
}
