use crate::error::{OptimizerErr, Result};

/// Defines the strategy for updating a parameter based on it's gradient.
///
/// The `Optimizer` trait is responsible for the mathematical transition of the parameter from
/// state `t` to `t+1`, alongside whatever auxiliary state the algorithm accumulates.
pub trait Optimizer {
    /// Updates the provided parameter in place using a gradient.
    ///
    /// # Arguments
    /// * `learning_rate` - The learning rate for this step.
    /// * `step` - The amount of samples processed including this one, starts at 1.
    /// * `grad` - The gradient corresponding to `params`.
    /// * `params` - The parameter to update.
    ///
    /// # Returns
    /// An error if there's a mismatch in the sizes of `grad` and `params`, in which case
    /// nothing is modified.
    fn update_params(
        &mut self,
        learning_rate: f32,
        step: u64,
        grad: &[f32],
        params: &mut [f32],
    ) -> Result<()>;

    /// The auxiliary tensors of this optimizer, always in the same order.
    fn state(&self) -> Vec<&[f32]>;

    /// Mutable access to the auxiliary tensors, in the same order as `state`.
    fn state_mut(&mut self) -> Vec<&mut [f32]>;
}

/// Checks that a gradient can be applied to a parameter.
///
/// # Arguments
/// * `grad` - The incoming gradient.
/// * `params` - The parameter to update.
///
/// # Returns
/// `OptimizerErr::DimensionMismatch` if the lengths differ.
pub(super) fn check_len(grad: &[f32], params: &[f32]) -> Result<()> {
    if grad.len() != params.len() {
        return Err(OptimizerErr::DimensionMismatch {
            got: grad.len(),
            expected: params.len(),
        });
    }

    Ok(())
}

/// Applies L2 weight decay to a gradient value.
#[inline]
pub(super) fn decayed_grad(g: f32, p: f32, decay: f32) -> f32 {
    if decay == 0. { g } else { g + decay * p }
}
