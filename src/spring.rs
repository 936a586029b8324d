//! Critically damped spring simulator (spec §4.1).
//!
//! Closed-form, unconditionally stable, frame-rate independent — the same
//! "solve analytically, never Euler-integrate" approach as the teacher's
//! `rendering/spring_physics.rs`, but reparameterized from
//! tension/mass/friction to a single half-life, per the closed form:
//!
//! y = 4·ln2 / max(h, ε); y½ = y/2; j0 = p − g; j1 = v + j0·y½;
//! e = exp(−y½·dt); p' = e·(j0 + j1·dt) + g; v' = e·(v − j1·y½·dt)

const EPSILON: f64 = 1e-5;

/// One degree of freedom of critically damped motion.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spring {
    pub position: f64,
    pub velocity: f64,
    pub target: f64,
}

impl Spring {
    pub fn new(initial: f64) -> Self {
        Spring {
            position: initial,
            velocity: 0.0,
            target: initial,
        }
    }

    /// Sets position = target = value, velocity = 0.
    pub fn snap(&mut self, value: f64) {
        self.position = value;
        self.target = value;
        self.velocity = 0.0;
    }

    /// Advances the spring toward `self.target` by `dt` seconds at the given
    /// half-life (seconds). `dt` must be non-negative — a negative dt is a
    /// programming error in the caller, not a recoverable input condition.
    pub fn update(&mut self, half_life: f64, dt: f64) {
        debug_assert!(dt >= 0.0, "spring dt must be non-negative");
        let (p, v) = solve(self.position, self.velocity, self.target, half_life, dt);
        self.position = p;
        self.velocity = v;
    }

    /// Non-mutating lookahead: what `update` would produce.
    pub fn predict(&self, half_life: f64, dt: f64) -> (f64, f64) {
        solve(self.position, self.velocity, self.target, half_life, dt)
    }

    pub fn is_settled(&self, threshold: f64) -> bool {
        (self.position - self.target).abs() <= threshold && self.velocity.abs() <= threshold
    }
}

fn solve(position: f64, velocity: f64, target: f64, half_life: f64, dt: f64) -> (f64, f64) {
    let dt = dt.max(0.0);
    let y = 4.0 * std::f64::consts::LN_2 / half_life.max(EPSILON);
    let y_half = y / 2.0;
    let j0 = position - target;
    let j1 = velocity + j0 * y_half;
    let e = (-y_half * dt).exp();
    let p = e * (j0 + j1 * dt) + target;
    let v = e * (velocity - j1 * y_half * dt);
    (p, v)
}
