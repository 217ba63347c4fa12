use super::{
    Optimizer,
    optimizer::{check_len, decayed_grad},
};
use crate::{error::Result, tensor::Tensor};

/// Adam, momentum on the first and second moments of the gradient with bias correction.
///
/// The bias corrections are derived from the step number, so the moments are the only
/// auxiliary state.
#[derive(Debug)]
pub struct Adam {
    beta1: f32,
    beta2: f32,
    epsilon: f32,
    decay: f32,
    m: Tensor,
    v: Tensor,
}

impl Adam {
    /// Creates a new `Adam` optimizer.
    ///
    /// # Arguments
    /// * `m` - The zeroed first moment buffer, as long as the parameter.
    /// * `v` - The zeroed second moment buffer, as long as the parameter.
    /// * `beta1` - Decay of the first moment.
    /// * `beta2` - Decay of the second moment.
    /// * `epsilon` - Added to the denominator for numerical stability.
    /// * `decay` - The L2 weight decay coefficient, `0` disables it.
    ///
    /// # Returns
    /// A new `Adam` instance.
    pub fn new(m: Tensor, v: Tensor, beta1: f32, beta2: f32, epsilon: f32, decay: f32) -> Self {
        Self {
            beta1,
            beta2,
            epsilon,
            decay,
            m,
            v,
        }
    }
}

impl Optimizer for Adam {
    fn update_params(
        &mut self,
        learning_rate: f32,
        step: u64,
        grad: &[f32],
        params: &mut [f32],
    ) -> Result<()> {
        check_len(grad, params)?;

        let Self {
            beta1: b1,
            beta2: b2,
            epsilon: eps,
            decay,
            ..
        } = *self;

        let t = step as f64;
        let bc1 = 1. - (b1 as f64).powf(t);
        let bc2 = 1. - (b2 as f64).powf(t);
        let step_size = (learning_rate as f64 * (bc2.sqrt() / bc1)) as f32;

        params
            .iter_mut()
            .zip(grad)
            .zip(self.m.iter_mut())
            .zip(self.v.iter_mut())
            .for_each(|(((p, g), m), v)| {
                let g = decayed_grad(*g, *p, decay);
                *m = b1 * *m + (1. - b1) * g;
                *v = b2 * *v + (1. - b2) * g * g;
                *p -= step_size * *m / (v.sqrt() + eps);
            });

        Ok(())
    }

    fn state(&self) -> Vec<&[f32]> {
        vec![self.m.as_slice(), self.v.as_slice()]
    }

    fn state_mut(&mut self) -> Vec<&mut [f32]> {
        vec![self.m.as_mut_slice(), self.v.as_mut_slice()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_moves_by_learning_rate() {
        let mut params = [1.0, -1.0];
        let mut optimizer = Adam::new(Tensor::zeros(2), Tensor::zeros(2), 0.9, 0.999, 1e-8, 0.);

        optimizer
            .update_params(0.01, 1, &[0.3, -2.0], &mut params)
            .unwrap();

        // The first bias corrected step is close to `lr * sign(g)`.
        assert!((params[0] - 0.99).abs() < 1e-5);
        assert!((params[1] + 0.99).abs() < 1e-5);
    }

    #[test]
    fn zero_gradient_keeps_params() {
        let mut params = [0.5];
        let mut optimizer = Adam::new(Tensor::zeros(1), Tensor::zeros(1), 0.9, 0.999, 1e-8, 0.);

        optimizer.update_params(0.01, 1, &[0.0], &mut params).unwrap();
        assert_eq!(params, [0.5]);
    }
}
