use super::{Adadelta, Adagrad, Adam, GradientDescent, GradientDescentWithMomentum, Optimizer};
use crate::error::Result;

/// Identifies an update rule inside a checkpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum RuleKind {
    GradientDescent = 0,
    Momentum = 1,
    Adagrad = 2,
    Adadelta = 3,
    Adam = 4,
}

impl RuleKind {
    /// The tag written to checkpoints.
    pub fn tag(self) -> u32 {
        self as u32
    }

    /// Resolves a checkpoint tag.
    ///
    /// # Arguments
    /// * `tag` - The tag read from a checkpoint.
    ///
    /// # Returns
    /// The matching kind, or `None` if the tag is unknown.
    pub fn from_tag(tag: u32) -> Option<Self> {
        let kind = match tag {
            0 => Self::GradientDescent,
            1 => Self::Momentum,
            2 => Self::Adagrad,
            3 => Self::Adadelta,
            4 => Self::Adam,
            _ => return None,
        };

        Some(kind)
    }
}

/// The closed set of update rules a `ParameterOptimizer` can run.
#[derive(Debug)]
pub enum UpdateRule {
    GradientDescent(GradientDescent),
    Momentum(GradientDescentWithMomentum),
    Adagrad(Adagrad),
    Adadelta(Adadelta),
    Adam(Adam),
}

impl UpdateRule {
    pub fn kind(&self) -> RuleKind {
        match self {
            UpdateRule::GradientDescent(_) => RuleKind::GradientDescent,
            UpdateRule::Momentum(_) => RuleKind::Momentum,
            UpdateRule::Adagrad(_) => RuleKind::Adagrad,
            UpdateRule::Adadelta(_) => RuleKind::Adadelta,
            UpdateRule::Adam(_) => RuleKind::Adam,
        }
    }

    fn inner(&self) -> &dyn Optimizer {
        match self {
            UpdateRule::GradientDescent(o) => o,
            UpdateRule::Momentum(o) => o,
            UpdateRule::Adagrad(o) => o,
            UpdateRule::Adadelta(o) => o,
            UpdateRule::Adam(o) => o,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Optimizer {
        match self {
            UpdateRule::GradientDescent(o) => o,
            UpdateRule::Momentum(o) => o,
            UpdateRule::Adagrad(o) => o,
            UpdateRule::Adadelta(o) => o,
            UpdateRule::Adam(o) => o,
        }
    }
}

impl Optimizer for UpdateRule {
    fn update_params(
        &mut self,
        learning_rate: f32,
        step: u64,
        grad: &[f32],
        params: &mut [f32],
    ) -> Result<()> {
        self.inner_mut()
            .update_params(learning_rate, step, grad, params)
    }

    fn state(&self) -> Vec<&[f32]> {
        self.inner().state()
    }

    fn state_mut(&mut self) -> Vec<&mut [f32]> {
        self.inner_mut().state_mut()
    }
}
