use crate::optim::{check_slots, ensure_state, Optimizer};

/// Adam with bias correction folded into the step size:
///
/// ```text
/// m = β1·m + (1 − β1)·g
/// v = β2·v + (1 − β2)·g²
/// lr_t = α·√(1 − β2ᵗ) / (1 − β1ᵗ)
/// p = p − lr_t · m / (√v + ε)
/// ```
pub struct Adam {
    pub alpha: f32,
    pub beta1: f32,
    pub beta2: f32,
    pub eps: f32,
    m: Vec<Vec<f32>>,
    v: Vec<Vec<f32>>,
    t: i32,
}

impl Adam {
    /// Adam with β1 = 0.9, β2 = 0.999, ε = 1e-8.
    pub fn new(alpha: f32) -> Adam {
        Adam::with_params(alpha, 0.9, 0.999, 1e-8)
    }

    pub fn with_params(alpha: f32, beta1: f32, beta2: f32, eps: f32) -> Adam {
        Adam { alpha, beta1, beta2, eps, m: Vec::new(), v: Vec::new(), t: 0 }
    }

    /// Number of updates applied so far.
    pub fn steps(&self) -> i32 {
        self.t
    }
}

impl Optimizer for Adam {
    fn name(&self) -> &'static str {
        "adam"
    }

    fn step(&mut self, params: &mut [&mut [f32]], grads: &[Vec<f32>]) {
        check_slots(params, grads);
        ensure_state(&mut self.m, params);
        ensure_state(&mut self.v, params);

        self.t += 1;
        let fix1 = 1.0 - self.beta1.powi(self.t);
        let fix2 = 1.0 - self.beta2.powi(self.t);
        let lr = self.alpha * fix2.sqrt() / fix1;

        let slots = params.iter_mut().zip(grads).zip(self.m.iter_mut().zip(self.v.iter_mut()));
        for ((param, grad), (m_slot, v_slot)) in slots {
            for (((p, &g), m), v) in param
                .iter_mut()
                .zip(grad)
                .zip(m_slot.iter_mut())
                .zip(v_slot.iter_mut())
            {
                *m += (1.0 - self.beta1) * (g - *m);
                *v += (1.0 - self.beta2) * (g * g - *v);
                *p -= lr * *m / (v.sqrt() + self.eps);
            }
        }
    }
}
