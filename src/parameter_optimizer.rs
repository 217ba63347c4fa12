use log::{debug, warn};

use crate::{
    builder::OptimizerBuilder,
    checkpoint,
    error::{OptimizerErr, Result},
    lr_policy::LrPolicy,
    optimization::{Optimizer, RuleKind, UpdateRule},
    tensor::Tensor,
};

/// Owns a parameter and applies gradients to it following an update rule and a learning
/// rate policy.
///
/// Mutating calls take `&mut self`, so a single instance is never updated concurrently.
#[derive(Debug)]
pub struct ParameterOptimizer {
    parameter: Tensor,
    lr_policy: LrPolicy,
    rule: UpdateRule,
    samples_passed: u64,
}

impl ParameterOptimizer {
    /// Creates a new `ParameterOptimizer` from already resolved parts.
    ///
    /// # Arguments
    /// * `parameter` - The parameter to optimize.
    /// * `lr_policy` - The learning rate policy.
    /// * `rule` - The update rule, with it's auxiliary state sized to `parameter`.
    ///
    /// # Returns
    /// A new `ParameterOptimizer` that hasn't processed any sample yet.
    pub(crate) fn new(parameter: Tensor, lr_policy: LrPolicy, rule: UpdateRule) -> Self {
        Self {
            parameter,
            lr_policy,
            rule,
            samples_passed: 0,
        }
    }

    /// Creates a new `ParameterOptimizer` from a configuration descriptor.
    ///
    /// # Arguments
    /// * `config` - A JSON encoded `OptimizerConfig`.
    /// * `parameter` - The parameter to optimize, owned by the optimizer from now on.
    ///
    /// # Returns
    /// A new optimizer, `OptimizerErr::Config` if the descriptor is invalid or
    /// `OptimizerErr::Shape` if the auxiliary state can't be sized to `parameter`.
    pub fn create(config: &[u8], parameter: Tensor) -> Result<Self> {
        OptimizerBuilder::new().build(config, parameter)
    }

    /// Creates a new `ParameterOptimizer` and restores a checkpoint into it.
    ///
    /// # Arguments
    /// * `config` - A JSON encoded `OptimizerConfig`.
    /// * `parameter` - The parameter to optimize, owned by the optimizer from now on.
    /// * `state` - A blob produced by `serialize_state`.
    ///
    /// # Returns
    /// The restored optimizer or the first error found building or restoring it.
    pub fn create_with_state(config: &[u8], parameter: Tensor, state: &[u8]) -> Result<Self> {
        let mut optimizer = Self::create(config, parameter)?;
        optimizer.deserialize_state(state)?;
        Ok(optimizer)
    }

    /// Applies a gradient to the parameter.
    ///
    /// # Arguments
    /// * `grad` - The gradient, as long as the parameter.
    ///
    /// # Returns
    /// `OptimizerErr::DimensionMismatch` if the lengths differ, or `OptimizerErr::CorruptState`
    /// if the sample counter is already at `u64::MAX`. Nothing changes on error.
    pub fn update(&mut self, grad: &[f32]) -> Result<()> {
        let Some(step) = self.samples_passed.checked_add(1) else {
            warn!(samples_passed = self.samples_passed; "rejected gradient");
            return Err(OptimizerErr::CorruptState("the sample counter is exhausted".to_string()));
        };

        let learning_rate = self.lr_policy.rate(step);

        if let Err(e) =
            self.rule
                .update_params(learning_rate, step, grad, self.parameter.as_mut_slice())
        {
            warn!(got = grad.len(), expected = self.parameter.len(); "rejected gradient");
            return Err(e);
        }

        self.samples_passed = step;
        Ok(())
    }

    /// A read only view of the current parameter values, it's length is the parameter count.
    pub fn weights(&self) -> &[f32] {
        &self.parameter
    }

    /// The amount of successful updates applied so far, or the restored count.
    ///
    /// The counter never wraps: once it reaches `u64::MAX` every further `update` fails.
    pub fn samples_passed(&self) -> u64 {
        self.samples_passed
    }

    /// The learning rate the next update will apply.
    pub fn learning_rate(&self) -> f32 {
        self.lr_policy.rate(self.samples_passed.saturating_add(1))
    }

    /// The update rule this optimizer runs.
    ///
    /// # Returns
    /// The rule's kind, it's tag is the one written in checkpoints.
    pub fn kind(&self) -> RuleKind {
        self.rule.kind()
    }

    /// Releases the parameter, dropping the rest of the optimizer's state.
    pub fn into_parameter(self) -> Tensor {
        self.parameter
    }

    /// Encodes the sample counter and the auxiliary state into a checkpoint.
    ///
    /// The parameter itself isn't part of the checkpoint.
    ///
    /// # Returns
    /// The checkpoint blob, it's length is the blob length.
    pub fn serialize_state(&self) -> Vec<u8> {
        checkpoint::encode(self.kind().tag(), self.samples_passed, &self.rule.state())
    }

    /// Restores a checkpoint produced by `serialize_state`.
    ///
    /// # Arguments
    /// * `state` - The checkpoint blob.
    ///
    /// # Returns
    /// `OptimizerErr::CorruptState` if the blob is malformed, has an unknown version, belongs
    /// to another update rule or it's tensors don't match the parameter's length. Nothing is
    /// modified on error.
    pub fn deserialize_state(&mut self, state: &[u8]) -> Result<()> {
        let decoded = checkpoint::decode(state).inspect_err(|e| warn!("rejected state: {e}"))?;
        self.check_state(&decoded).inspect_err(|e| warn!("rejected state: {e}"))?;

        for (dst, src) in self.rule.state_mut().into_iter().zip(&decoded.tensors) {
            dst.copy_from_slice(src);
        }
        self.samples_passed = decoded.samples_passed;

        debug!(
            kind = decoded.kind,
            samples_passed = decoded.samples_passed;
            "restored optimizer state"
        );
        Ok(())
    }

    /// Checks that a decoded checkpoint fits this optimizer.
    fn check_state(&self, state: &checkpoint::State) -> Result<()> {
        let kind = self.kind();
        if RuleKind::from_tag(state.kind) != Some(kind) {
            return Err(OptimizerErr::CorruptState(format!(
                "state kind {} doesn't match {kind:?}",
                state.kind
            )));
        }

        let expected = self.rule.state().len();
        if state.tensors.len() != expected {
            return Err(OptimizerErr::CorruptState(format!(
                "state has {} tensors, expected {expected}",
                state.tensors.len()
            )));
        }

        let len = self.parameter.len();
        if let Some((i, t)) = state.tensors.iter().enumerate().find(|(_, t)| t.len() != len) {
            return Err(OptimizerErr::CorruptState(format!(
                "state tensor {i} has {} values, expected {len}",
                t.len()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient_descent(params: Vec<f32>) -> ParameterOptimizer {
        let config = br#"{
            "optimizer": { "gradient_descent": {} },
            "lr_policy": { "constant": { "learning_rate": 0.1 } }
        }"#;

        ParameterOptimizer::create(config, Tensor::from(params)).unwrap()
    }

    fn momentum(params: Vec<f32>) -> ParameterOptimizer {
        let config = br#"{
            "optimizer": { "momentum": { "momentum": 0.9 } },
            "lr_policy": { "constant": { "learning_rate": 0.1 } }
        }"#;

        ParameterOptimizer::create(config, Tensor::from(params)).unwrap()
    }

    #[test]
    fn gradient_descent_scenario() {
        let mut optimizer = gradient_descent(vec![1.0, 2.0]);

        optimizer.update(&[0.5, 0.5]).unwrap();

        assert_eq!(optimizer.weights(), [1.0 - 0.1 * 0.5, 2.0 - 0.1 * 0.5]);
        assert!((optimizer.weights()[0] - 0.95).abs() < 1e-6);
        assert!((optimizer.weights()[1] - 1.95).abs() < 1e-6);
        assert_eq!(optimizer.samples_passed(), 1);
    }

    #[test]
    fn momentum_scenario() {
        let mut optimizer = momentum(vec![0.0]);

        optimizer.update(&[1.0]).unwrap();
        assert_eq!(optimizer.rule.state(), [[1.0_f32].as_slice()]);
        assert_eq!(optimizer.weights(), [-0.1]);

        optimizer.update(&[1.0]).unwrap();
        let v = 0.9_f32 * 1.0 + 1.0;
        assert_eq!(optimizer.rule.state(), [[v].as_slice()]);
        assert_eq!(optimizer.weights(), [-0.1 - 0.1 * v]);
        assert!((optimizer.weights()[0] + 0.29).abs() < 1e-6);
        assert_eq!(optimizer.samples_passed(), 2);
    }

    #[test]
    fn mismatch_leaves_state_untouched() {
        let mut optimizer = momentum(vec![1.0, 2.0]);
        optimizer.update(&[1.0, 1.0]).unwrap();

        let weights = optimizer.weights().to_vec();
        let state = optimizer.serialize_state();

        let res = optimizer.update(&[1.0, 1.0, 1.0]);
        assert!(matches!(
            res,
            Err(OptimizerErr::DimensionMismatch {
                got: 3,
                expected: 2
            })
        ));

        assert_eq!(optimizer.weights(), weights);
        assert_eq!(optimizer.serialize_state(), state);
        assert_eq!(optimizer.samples_passed(), 1);
    }

    #[test]
    fn serialize_before_any_update() {
        let optimizer = momentum(vec![1.0, 2.0]);
        let state = optimizer.serialize_state();

        let mut restored = momentum(vec![1.0, 2.0]);
        restored.deserialize_state(&state).unwrap();
        assert_eq!(restored.samples_passed(), 0);
        assert_eq!(restored.rule.state(), [[0.0_f32, 0.0].as_slice()]);
    }

    #[test]
    fn rejects_state_of_another_rule() {
        let mut source = gradient_descent(vec![1.0]);
        source.update(&[1.0]).unwrap();

        let mut target = momentum(vec![1.0]);
        let res = target.deserialize_state(&source.serialize_state());

        assert!(matches!(res, Err(OptimizerErr::CorruptState(_))));
        assert_eq!(target.samples_passed(), 0);
    }

    #[test]
    fn rejects_state_of_another_shape() {
        let mut source = momentum(vec![1.0, 2.0, 3.0]);
        source.update(&[1.0, 1.0, 1.0]).unwrap();

        let mut target = momentum(vec![1.0, 2.0]);
        let res = target.deserialize_state(&source.serialize_state());

        assert!(matches!(res, Err(OptimizerErr::CorruptState(_))));
        assert_eq!(target.rule.state(), [[0.0_f32, 0.0].as_slice()]);
    }

    #[test]
    fn rejects_wrong_tensor_count() {
        let mut target = momentum(vec![1.0]);
        let state = checkpoint::encode(RuleKind::Momentum.tag(), 4, &[]);

        let res = target.deserialize_state(&state);
        assert!(matches!(res, Err(OptimizerErr::CorruptState(_))));
    }

    #[test]
    fn learning_rate_follows_counter() {
        let config = br#"{
            "optimizer": { "gradient_descent": {} },
            "lr_policy": { "step": { "learning_rate": 1.0, "factor": 0.5, "thresholds": [2] } }
        }"#;
        let mut optimizer = ParameterOptimizer::create(config, Tensor::from(vec![0.0])).unwrap();

        // The first update is sample 1.
        assert_eq!(optimizer.learning_rate(), 1.0);
        optimizer.update(&[1.0]).unwrap();
        assert_eq!(optimizer.weights(), [-1.0]);

        assert_eq!(optimizer.learning_rate(), 0.5);
        optimizer.update(&[1.0]).unwrap();
        assert_eq!(optimizer.weights(), [-1.5]);
    }

    #[test]
    fn exhausted_counter_rejects_updates() {
        let mut optimizer = gradient_descent(vec![1.0]);
        let state = checkpoint::encode(RuleKind::GradientDescent.tag(), u64::MAX, &[]);
        optimizer.deserialize_state(&state).unwrap();

        let res = optimizer.update(&[1.0]);
        assert!(matches!(res, Err(OptimizerErr::CorruptState(_))));
        assert_eq!(optimizer.weights(), [1.0]);
        assert_eq!(optimizer.samples_passed(), u64::MAX);
    }

    #[test]
    fn into_parameter_releases_weights() {
        let mut optimizer = gradient_descent(vec![1.0]);
        optimizer.update(&[1.0]).unwrap();

        let parameter = optimizer.into_parameter();
        assert_eq!(parameter.as_slice(), [1.0 - 0.1 * 1.0]);
    }
}
