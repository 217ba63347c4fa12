use serde::{Deserialize, Serialize};

/// The specification for the update rule of a `ParameterOptimizer`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum OptimizerSpec {
    GradientDescent {
        #[serde(default)]
        decay: f32,
    },
    Momentum {
        momentum: f32,
        #[serde(default)]
        nesterov: bool,
        #[serde(default)]
        decay: f32,
    },
    Adagrad {
        epsilon: f32,
        #[serde(default)]
        decay: f32,
    },
    Adadelta {
        rho: f32,
        epsilon: f32,
        #[serde(default)]
        decay: f32,
    },
    Adam {
        beta1: f32,
        beta2: f32,
        epsilon: f32,
        #[serde(default)]
        decay: f32,
    },
}

/// The specification for the `LrPolicy` of a `ParameterOptimizer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub enum LrPolicySpec {
    Constant {
        learning_rate: f32,
    },
    Linear {
        learning_rate: f32,
        decay_a: f32,
        decay_b: f32,
    },
    Step {
        learning_rate: f32,
        factor: f32,
        thresholds: Vec<u64>,
    },
    Exponential {
        learning_rate: f32,
        factor: f32,
        interval: u64,
    },
}

/// The configuration descriptor handed to the `OptimizerBuilder`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OptimizerConfig {
    pub optimizer: OptimizerSpec,
    pub lr_policy: LrPolicySpec,
    /// The parameter length the caller expects, checked against the handed off tensor.
    #[serde(default)]
    pub param_size: Option<usize>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_default() {
        let json = r#"{
            "optimizer": { "momentum": { "momentum": 0.9 } },
            "lr_policy": { "constant": { "learning_rate": 0.1 } }
        }"#;

        let config: OptimizerConfig = serde_json::from_str(json).unwrap();
        assert_eq!(
            config.optimizer,
            OptimizerSpec::Momentum {
                momentum: 0.9,
                nesterov: false,
                decay: 0.
            }
        );
        assert_eq!(config.param_size, None);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let json = r#"{
            "optimizer": { "rmsprop": { "rho": 0.9 } },
            "lr_policy": { "constant": { "learning_rate": 0.1 } }
        }"#;

        assert!(serde_json::from_str::<OptimizerConfig>(json).is_err());
    }

    #[test]
    fn missing_required_field_is_rejected() {
        let json = r#"{
            "optimizer": { "adagrad": {} },
            "lr_policy": { "constant": { "learning_rate": 0.1 } }
        }"#;

        assert!(serde_json::from_str::<OptimizerConfig>(json).is_err());
    }
}
