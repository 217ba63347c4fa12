use crate::{
    error::{OptimizerErr, Result},
    specs::LrPolicySpec,
};

/// Maps the amount of samples processed so far to a learning rate.
///
/// Policies are immutable once built, the optimizer only queries them. Every decaying
/// variant is non increasing in the amount of samples passed.
#[derive(Debug, Clone, PartialEq)]
pub enum LrPolicy {
    /// Always the same rate.
    Constant { learning_rate: f32 },
    /// `max(learning_rate - decay_a * t, decay_b)`.
    Linear {
        learning_rate: f32,
        decay_a: f32,
        decay_b: f32,
    },
    /// Multiplies the rate by `factor` once per threshold reached, the new rate applies
    /// starting at the threshold itself.
    Step {
        learning_rate: f32,
        factor: f32,
        thresholds: Box<[u64]>,
    },
    /// Multiplies the rate by `factor` every `interval` samples.
    Exponential {
        learning_rate: f32,
        factor: f32,
        interval: u64,
    },
}

impl LrPolicy {
    /// Creates a new `LrPolicy` from it's specification, validating it's parameters.
    ///
    /// # Arguments
    /// * `spec` - The learning rate policy specification.
    ///
    /// # Returns
    /// A new `LrPolicy` or `OptimizerErr::Config` if a parameter is out of range.
    pub fn from_spec(spec: LrPolicySpec) -> Result<Self> {
        let policy = match spec {
            LrPolicySpec::Constant { learning_rate } => {
                check_learning_rate(learning_rate)?;
                Self::Constant { learning_rate }
            }
            LrPolicySpec::Linear {
                learning_rate,
                decay_a,
                decay_b,
            } => {
                check_learning_rate(learning_rate)?;

                if !(decay_a.is_finite() && decay_a >= 0.) {
                    return config_err(format!("decay_a must be finite and >= 0, got {decay_a}"));
                }

                if !(decay_b > 0. && decay_b <= learning_rate) {
                    return config_err(format!(
                        "decay_b must be in (0, {learning_rate}], got {decay_b}"
                    ));
                }

                Self::Linear {
                    learning_rate,
                    decay_a,
                    decay_b,
                }
            }
            LrPolicySpec::Step {
                learning_rate,
                factor,
                thresholds,
            } => {
                check_learning_rate(learning_rate)?;
                check_factor(factor)?;

                if thresholds.windows(2).any(|w| w[0] >= w[1]) {
                    return config_err("step thresholds must be strictly ascending".to_string());
                }

                Self::Step {
                    learning_rate,
                    factor,
                    thresholds: thresholds.into_boxed_slice(),
                }
            }
            LrPolicySpec::Exponential {
                learning_rate,
                factor,
                interval,
            } => {
                check_learning_rate(learning_rate)?;
                check_factor(factor)?;

                if interval == 0 {
                    return config_err("exponential interval must be greater than 0".to_string());
                }

                Self::Exponential {
                    learning_rate,
                    factor,
                    interval,
                }
            }
        };

        Ok(policy)
    }

    /// The learning rate after `samples_passed` samples.
    ///
    /// # Arguments
    /// * `samples_passed` - The amount of samples processed so far.
    ///
    /// # Returns
    /// The learning rate to apply.
    pub fn rate(&self, samples_passed: u64) -> f32 {
        match self {
            LrPolicy::Constant { learning_rate } => *learning_rate,
            LrPolicy::Linear {
                learning_rate,
                decay_a,
                decay_b,
            } => (learning_rate - decay_a * samples_passed as f32).max(*decay_b),
            LrPolicy::Step {
                learning_rate,
                factor,
                thresholds,
            } => {
                // Thresholds are ascending, so the ones reached form a prefix.
                let reached = thresholds.partition_point(|th| *th <= samples_passed);
                decayed(*learning_rate, *factor, reached as u64)
            }
            LrPolicy::Exponential {
                learning_rate,
                factor,
                interval,
            } => decayed(*learning_rate, *factor, samples_passed / interval),
        }
    }
}

/// `learning_rate * factor^times`, computed in `f64` and rounded once so the result stays
/// monotonic in `times`. Never smaller than `f32::MIN_POSITIVE`.
fn decayed(learning_rate: f32, factor: f32, times: u64) -> f32 {
    if times == 0 {
        return learning_rate;
    }

    let rate = (learning_rate as f64 * (factor as f64).powf(times as f64)) as f32;
    rate.max(f32::MIN_POSITIVE)
}

fn check_learning_rate(learning_rate: f32) -> Result<()> {
    if learning_rate.is_finite() && learning_rate > 0. {
        return Ok(());
    }

    config_err(format!(
        "learning_rate must be finite and > 0, got {learning_rate}"
    ))
}

fn check_factor(factor: f32) -> Result<()> {
    if factor > 0. && factor <= 1. {
        return Ok(());
    }

    config_err(format!("decay factor must be in (0, 1], got {factor}"))
}

fn config_err<T>(msg: String) -> Result<T> {
    Err(OptimizerErr::Config(msg))
}
