mod adadelta;
mod adagrad;
mod adam;
mod gradient_descent;
mod gradient_descent_with_momentum;
mod optimizer;
mod update_rule;

pub use adadelta::Adadelta;
pub use adagrad::Adagrad;
pub use adam::Adam;
pub use gradient_descent::GradientDescent;
pub use gradient_descent_with_momentum::GradientDescentWithMomentum;
pub use optimizer::Optimizer;
pub use update_rule::{RuleKind, UpdateRule};
