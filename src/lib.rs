//! Parameter update core of a training runtime.
//!
//! A `ParameterOptimizer` owns one parameter `Tensor`, applies gradients to it with one of
//! the update rules in `optimization`, scales them with an `LrPolicy` and can checkpoint
//! it's internal state to a versioned binary blob.
//!
//! ```
//! use parameter_optimizer::{ParameterOptimizer, Tensor};
//!
//! let config = br#"{
//!     "optimizer": { "gradient_descent": {} },
//!     "lr_policy": { "constant": { "learning_rate": 0.1 } }
//! }"#;
//!
//! let mut optimizer = ParameterOptimizer::create(config, Tensor::from(vec![1.0, 2.0]))?;
//! optimizer.update(&[0.5, 0.5])?;
//!
//! assert_eq!(optimizer.samples_passed(), 1);
//! # Ok::<(), parameter_optimizer::OptimizerErr>(())
//! ```

mod builder;
pub mod checkpoint;
mod error;
pub mod ffi;
mod lr_policy;
pub mod optimization;
mod parameter_optimizer;
pub mod specs;
mod tensor;

pub use builder::OptimizerBuilder;
pub use error::{OptimizerErr, Result};
pub use lr_policy::LrPolicy;
pub use parameter_optimizer::ParameterOptimizer;
pub use specs::{LrPolicySpec, OptimizerConfig, OptimizerSpec};
pub use tensor::Tensor;
