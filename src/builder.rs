use log::debug;

use crate::{
    error::{OptimizerErr, Result},
    lr_policy::LrPolicy,
    optimization::{
        Adadelta, Adagrad, Adam, GradientDescent, GradientDescentWithMomentum, UpdateRule,
    },
    parameter_optimizer::ParameterOptimizer,
    specs::{OptimizerConfig, OptimizerSpec},
    tensor::Tensor,
};

/// Builds `ParameterOptimizer`s given a configuration descriptor.
///
/// This is the only place where the set of update rules and learning rate policies is
/// resolved to concrete types.
#[derive(Debug, Default)]
pub struct OptimizerBuilder;

impl OptimizerBuilder {
    /// Creates a new `OptimizerBuilder`.
    ///
    /// # Returns
    /// A new `OptimizerBuilder` instance.
    pub fn new() -> Self {
        Self
    }

    /// Builds a new `ParameterOptimizer` from an encoded configuration.
    ///
    /// # Arguments
    /// * `config` - A JSON encoded `OptimizerConfig`.
    /// * `parameter` - The parameter the optimizer will own.
    ///
    /// # Returns
    /// A new optimizer, `OptimizerErr::Config` if the descriptor can't be decoded or is
    /// invalid and `OptimizerErr::Shape` if the auxiliary state can't be sized.
    pub fn build(&self, config: &[u8], parameter: Tensor) -> Result<ParameterOptimizer> {
        let config: OptimizerConfig = serde_json::from_slice(config)?;
        self.build_from_config(config, parameter)
    }

    /// Builds a new `ParameterOptimizer` from an already decoded configuration.
    ///
    /// # Arguments
    /// * `config` - The optimizer configuration.
    /// * `parameter` - The parameter the optimizer will own.
    ///
    /// # Returns
    /// A new optimizer or the first configuration or shape error found.
    pub fn build_from_config(
        &self,
        config: OptimizerConfig,
        parameter: Tensor,
    ) -> Result<ParameterOptimizer> {
        let OptimizerConfig {
            optimizer,
            lr_policy,
            param_size,
        } = config;

        self.validate_optimizer(&optimizer)?;
        let lr_policy = LrPolicy::from_spec(lr_policy)?;

        let len = parameter.len();
        if len == 0 {
            return Err(OptimizerErr::Shape("the parameter is empty".to_string()));
        }

        if let Some(expected) = param_size.filter(|expected| *expected != len) {
            return Err(OptimizerErr::Shape(format!(
                "the parameter has {len} values, the config expects {expected}"
            )));
        }

        let rule = self.resolve_rule(optimizer, len)?;
        debug!(kind = rule.kind().tag(), len = len; "created optimizer");

        Ok(ParameterOptimizer::new(parameter, lr_policy, rule))
    }

    /// Checks the hyperparameters of an update rule specification.
    ///
    /// # Arguments
    /// * `spec` - The update rule specification.
    ///
    /// # Returns
    /// `OptimizerErr::Config` naming the first out of range hyperparameter.
    fn validate_optimizer(&self, spec: &OptimizerSpec) -> Result<()> {
        match *spec {
            OptimizerSpec::GradientDescent { decay } => check_decay(decay),
            OptimizerSpec::Momentum {
                momentum, decay, ..
            } => {
                check_unit("momentum", momentum)?;
                check_decay(decay)
            }
            OptimizerSpec::Adagrad { epsilon, decay } => {
                check_epsilon(epsilon)?;
                check_decay(decay)
            }
            OptimizerSpec::Adadelta {
                rho,
                epsilon,
                decay,
            } => {
                check_unit("rho", rho)?;
                check_epsilon(epsilon)?;
                check_decay(decay)
            }
            OptimizerSpec::Adam {
                beta1,
                beta2,
                epsilon,
                decay,
            } => {
                check_unit("beta1", beta1)?;
                check_unit("beta2", beta2)?;
                check_epsilon(epsilon)?;
                check_decay(decay)
            }
        }
    }

    /// Resolves the `UpdateRule`, allocating it's auxiliary state.
    ///
    /// # Arguments
    /// * `spec` - The validated update rule specification.
    /// * `len` - The length of the parameter.
    ///
    /// # Returns
    /// A new update rule or `OptimizerErr::Shape` if the auxiliary state can't be allocated.
    fn resolve_rule(&self, spec: OptimizerSpec, len: usize) -> Result<UpdateRule> {
        let rule = match spec {
            OptimizerSpec::GradientDescent { decay } => {
                UpdateRule::GradientDescent(GradientDescent::new(decay))
            }
            OptimizerSpec::Momentum {
                momentum,
                nesterov,
                decay,
            } => UpdateRule::Momentum(GradientDescentWithMomentum::new(
                aux_tensor(len)?,
                momentum,
                nesterov,
                decay,
            )),
            OptimizerSpec::Adagrad { epsilon, decay } => {
                UpdateRule::Adagrad(Adagrad::new(aux_tensor(len)?, epsilon, decay))
            }
            OptimizerSpec::Adadelta {
                rho,
                epsilon,
                decay,
            } => UpdateRule::Adadelta(Adadelta::new(
                aux_tensor(len)?,
                aux_tensor(len)?,
                rho,
                epsilon,
                decay,
            )),
            OptimizerSpec::Adam {
                beta1,
                beta2,
                epsilon,
                decay,
            } => UpdateRule::Adam(Adam::new(
                aux_tensor(len)?,
                aux_tensor(len)?,
                beta1,
                beta2,
                epsilon,
                decay,
            )),
        };

        Ok(rule)
    }
}

fn aux_tensor(len: usize) -> Result<Tensor> {
    Tensor::try_zeros(len).ok_or_else(|| {
        OptimizerErr::Shape(format!("couldn't allocate {len} values of auxiliary state"))
    })
}

/// Checks a coefficient lies in `[0, 1)`.
fn check_unit(name: &str, value: f32) -> Result<()> {
    if (0. ..1.).contains(&value) {
        return Ok(());
    }

    Err(OptimizerErr::Config(format!(
        "{name} must be in [0, 1), got {value}"
    )))
}

fn check_epsilon(epsilon: f32) -> Result<()> {
    if epsilon.is_finite() && epsilon > 0. {
        return Ok(());
    }

    Err(OptimizerErr::Config(format!(
        "epsilon must be finite and > 0, got {epsilon}"
    )))
}

fn check_decay(decay: f32) -> Result<()> {
    if decay.is_finite() && decay >= 0. {
        return Ok(());
    }

    Err(OptimizerErr::Config(format!(
        "decay must be finite and >= 0, got {decay}"
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{optimization::RuleKind, specs::LrPolicySpec};

    fn config(optimizer: OptimizerSpec) -> OptimizerConfig {
        OptimizerConfig {
            optimizer,
            lr_policy: LrPolicySpec::Constant { learning_rate: 0.1 },
            param_size: None,
        }
    }

    fn build(optimizer: OptimizerSpec) -> Result<ParameterOptimizer> {
        OptimizerBuilder::new().build_from_config(config(optimizer), Tensor::zeros(3))
    }

    #[test]
    fn resolves_every_kind() {
        let cases = [
            (
                OptimizerSpec::GradientDescent { decay: 0. },
                RuleKind::GradientDescent,
            ),
            (
                OptimizerSpec::Momentum {
                    momentum: 0.9,
                    nesterov: true,
                    decay: 0.,
                },
                RuleKind::Momentum,
            ),
            (
                OptimizerSpec::Adagrad {
                    epsilon: 1e-6,
                    decay: 0.,
                },
                RuleKind::Adagrad,
            ),
            (
                OptimizerSpec::Adadelta {
                    rho: 0.95,
                    epsilon: 1e-6,
                    decay: 0.,
                },
                RuleKind::Adadelta,
            ),
            (
                OptimizerSpec::Adam {
                    beta1: 0.9,
                    beta2: 0.999,
                    epsilon: 1e-8,
                    decay: 0.01,
                },
                RuleKind::Adam,
            ),
        ];

        for (spec, kind) in cases {
            assert_eq!(build(spec).unwrap().kind(), kind);
        }
    }

    #[test]
    fn rejects_out_of_range_hyperparameters() {
        let specs = [
            OptimizerSpec::GradientDescent { decay: -1. },
            OptimizerSpec::Momentum {
                momentum: 1.,
                nesterov: false,
                decay: 0.,
            },
            OptimizerSpec::Adagrad {
                epsilon: 0.,
                decay: 0.,
            },
            OptimizerSpec::Adadelta {
                rho: f32::NAN,
                epsilon: 1e-6,
                decay: 0.,
            },
            OptimizerSpec::Adam {
                beta1: 0.9,
                beta2: -0.1,
                epsilon: 1e-8,
                decay: 0.,
            },
        ];

        for spec in specs {
            assert!(
                matches!(build(spec), Err(OptimizerErr::Config(_))),
                "{spec:?} should be rejected"
            );
        }
    }

    #[test]
    fn rejects_undecodable_config() {
        let builder = OptimizerBuilder::new();

        for raw in [&b"not json"[..], br#"{ "optimizer": { "sgd": {} } }"#] {
            let res = builder.build(raw, Tensor::zeros(1));
            assert!(matches!(res, Err(OptimizerErr::Config(_))));
        }
    }

    #[test]
    fn rejects_empty_parameter() {
        let res = OptimizerBuilder::new().build_from_config(
            config(OptimizerSpec::GradientDescent { decay: 0. }),
            Tensor::zeros(0),
        );

        assert!(matches!(res, Err(OptimizerErr::Shape(_))));
    }

    #[test]
    fn rejects_param_size_mismatch() {
        let mut config = config(OptimizerSpec::Adagrad {
            epsilon: 1e-6,
            decay: 0.,
        });
        config.param_size = Some(4);

        let res = OptimizerBuilder::new().build_from_config(config, Tensor::zeros(3));
        assert!(matches!(res, Err(OptimizerErr::Shape(_))));
    }

    #[test]
    fn config_errors_win_over_shape_errors() {
        let res = OptimizerBuilder::new().build_from_config(
            config(OptimizerSpec::Adagrad {
                epsilon: -1.,
                decay: 0.,
            }),
            Tensor::zeros(0),
        );

        assert!(matches!(res, Err(OptimizerErr::Config(_))));
    }
}
