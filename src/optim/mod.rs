//! Parameter update rules.
//!
//! An optimizer owns whatever per-parameter state its rule needs and applies
//! one update per call to [`Optimizer::step`]. Parameters are handed over as
//! an ordered list of tensors ("slots"); the order must be the same on every
//! call so slot state lines up with the tensor it belongs to.

pub mod adam;
pub mod sgd;

use std::fmt;

pub use adam::Adam;
pub use sgd::MomentumSgd;

pub trait Optimizer {
    /// Short name used in reports (`adam`, `momentumsgd`).
    fn name(&self) -> &'static str;

    /// Applies one update. `grads[k]` is the gradient of `params[k]`.
    ///
    /// # Panics
    /// Panics if the slot count or any slot length differs from `grads`.
    fn step(&mut self, params: &mut [&mut [f32]], grads: &[Vec<f32>]);
}

/// Which optimizer to train with, and its one hyperparameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OptimizerKind {
    Adam { alpha: f32 },
    MomentumSgd { learning_rate: f32 },
}

impl OptimizerKind {
    pub fn name(&self) -> &'static str {
        match self {
            OptimizerKind::Adam { .. } => "adam",
            OptimizerKind::MomentumSgd { .. } => "momentumsgd",
        }
    }

    pub fn build(&self) -> Box<dyn Optimizer> {
        match *self {
            OptimizerKind::Adam { alpha } => Box::new(Adam::new(alpha)),
            OptimizerKind::MomentumSgd { learning_rate } => Box::new(MomentumSgd::new(learning_rate)),
        }
    }
}

impl fmt::Display for OptimizerKind {
    /// Settings-summary lines: the optimizer name, then its hyperparameter.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "- optimizer: {}", self.name())?;
        match self {
            OptimizerKind::Adam { alpha } => write!(f, "- alpha: {:.6}", alpha),
            OptimizerKind::MomentumSgd { learning_rate } => {
                write!(f, "- learning rate: {:.6}", learning_rate)
            }
        }
    }
}

/// Creates zeroed state buffers matching `params` on first use.
fn ensure_state(state: &mut Vec<Vec<f32>>, params: &[&mut [f32]]) {
    if state.is_empty() {
        *state = params.iter().map(|p| vec![0.0; p.len()]).collect();
    }
}

fn check_slots(params: &[&mut [f32]], grads: &[Vec<f32>]) {
    assert_eq!(params.len(), grads.len(), "parameter and gradient slot counts differ");
    for (p, g) in params.iter().zip(grads.iter()) {
        assert_eq!(p.len(), g.len(), "parameter and gradient lengths differ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_resolves_to_matching_optimizer() {
        let adam = OptimizerKind::Adam { alpha: 0.001 };
        let sgd = OptimizerKind::MomentumSgd { learning_rate: 0.01 };
        assert_eq!(adam.build().name(), "adam");
        assert_eq!(sgd.build().name(), "momentumsgd");
    }

    #[test]
    fn summary_prints_only_the_relevant_hyperparameter() {
        let adam = OptimizerKind::Adam { alpha: 0.001 }.to_string();
        assert_eq!(adam, "- optimizer: adam\n- alpha: 0.001000");

        let sgd = OptimizerKind::MomentumSgd { learning_rate: 0.01 }.to_string();
        assert_eq!(sgd, "- optimizer: momentumsgd\n- learning rate: 0.010000");
    }
}
