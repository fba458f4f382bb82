use crate::optim::{check_slots, ensure_state, Optimizer};

/// SGD with classical momentum:
///
/// ```text
/// v = μ·v − lr·g
/// p = p + v
/// ```
pub struct MomentumSgd {
    pub learning_rate: f32,
    pub momentum: f32,
    velocity: Vec<Vec<f32>>,
}

impl MomentumSgd {
    pub fn new(learning_rate: f32) -> MomentumSgd {
        MomentumSgd::with_momentum(learning_rate, 0.9)
    }

    pub fn with_momentum(learning_rate: f32, momentum: f32) -> MomentumSgd {
        MomentumSgd { learning_rate, momentum, velocity: Vec::new() }
    }
}

impl Optimizer for MomentumSgd {
    fn name(&self) -> &'static str {
        "momentumsgd"
    }

    fn step(&mut self, params: &mut [&mut [f32]], grads: &[Vec<f32>]) {
        check_slots(params, grads);
        ensure_state(&mut self.velocity, params);

        for ((param, grad), vel) in params.iter_mut().zip(grads).zip(self.velocity.iter_mut()) {
            for ((p, &g), v) in param.iter_mut().zip(grad).zip(vel.iter_mut()) {
                *v = self.momentum * *v - self.learning_rate * g;
                *p += *v;
            }
        }
    }
}
