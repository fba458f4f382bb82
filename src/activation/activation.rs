use serde::{Deserialize, Serialize};

/// Element-wise activation attached to a layer.
///
/// Derivatives are expressed in terms of the *activated* output so a layer
/// only has to keep its output around for the backward pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationFunction {
    ReLU,
    Identity,
}

impl ActivationFunction {
    pub fn function(&self, x: f32) -> f32 {
        match self {
            ActivationFunction::ReLU => if x > 0.0 { x } else { 0.0 },
            ActivationFunction::Identity => x,
        }
    }

    /// σ'(z) evaluated from y = σ(z).
    pub fn derivative_from_output(&self, y: f32) -> f32 {
        match self {
            ActivationFunction::ReLU => if y > 0.0 { 1.0 } else { 0.0 },
            ActivationFunction::Identity => 1.0,
        }
    }

    pub fn apply_inplace(&self, values: &mut [f32]) {
        if *self == ActivationFunction::Identity {
            return;
        }
        for v in values.iter_mut() {
            *v = self.function(*v);
        }
    }

    /// Turns ∂L/∂y into ∂L/∂z in place: δ = error ⊙ σ'(z).
    pub fn backprop_inplace(&self, grad: &mut [f32], output: &[f32]) {
        if *self == ActivationFunction::Identity {
            return;
        }
        for (g, &y) in grad.iter_mut().zip(output.iter()) {
            *g *= self.derivative_from_output(y);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relu_masks_gradient_where_inactive() {
        let mut values = vec![-1.0, 0.0, 2.5];
        ActivationFunction::ReLU.apply_inplace(&mut values);
        assert_eq!(values, vec![0.0, 0.0, 2.5]);

        let mut grad = vec![1.0, 1.0, 1.0];
        ActivationFunction::ReLU.backprop_inplace(&mut grad, &values);
        assert_eq!(grad, vec![0.0, 0.0, 1.0]);
    }

    #[test]
    fn identity_is_a_no_op() {
        let mut grad = vec![0.5, -0.5];
        ActivationFunction::Identity.backprop_inplace(&mut grad, &[-3.0, 3.0]);
        assert_eq!(grad, vec![0.5, -0.5]);
    }
}
