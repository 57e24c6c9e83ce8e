//! Fixed-step time integrators for the two-body system
//!
//! Provides velocity-Verlet (kick-drift-kick), a single-evaluation
//! leapfrog (drift-kick-drift) and classical RK4. Each call advances
//! `sys` by exactly `dt` and updates `sys.t` in place; choosing `dt`
//! (including the shortened final step) is the caller's job.

use super::forces::AccelSet;
use super::states::{NVec3, System};
use crate::configuration::config::IntegratorConfig;

/// Advance by one step of `dt` with the selected method
pub fn step(method: &IntegratorConfig, sys: &mut System, forces: &AccelSet, dt: f64) {
    match method {
        IntegratorConfig::Verlet => verlet_integrator(sys, forces, dt),
        IntegratorConfig::Leapfrog => leapfrog_integrator(sys, forces, dt),
        IntegratorConfig::Rk4 => rk4_integrator(sys, forces, dt),
    }
}

/// Advance the system by one step using velocity-Verlet
/// Uses two force evaluations per step
pub fn verlet_integrator(sys: &mut System, forces: &AccelSet, dt: f64) {
    let n = sys.bodies.len();
    if n == 0 { // no bodies, only time moves
        sys.t += dt;
        return;
    }
    let half_dt = 0.5 * dt;

    // a_n from x_n at time t_n
    let mut a_old = vec![NVec3::zeros(); n];
    forces.accumulate_accels(sys.t, &*sys, &mut a_old);

    // Kick: v_n+1/2 = v_n + (dt/2) a_n
    for (b, a) in sys.bodies.iter_mut().zip(a_old.iter()) {
        b.v += half_dt * *a;
    }

    // Drift: x_n+1 = x_n + dt v_n+1/2
    for b in sys.bodies.iter_mut() {
        b.x += dt * b.v;
    }

    sys.t += dt;

    // a_n+1 from x_n+1 at time t_n+1
    let mut a_new = vec![NVec3::zeros(); n];
    forces.accumulate_accels(sys.t, &*sys, &mut a_new);

    // Second kick: v_n+1 = v_n+1/2 + (dt/2) a_n+1
    for (b, a) in sys.bodies.iter_mut().zip(a_new.iter()) {
        b.v += half_dt * *a;
    }
}

/// Advance the system by one step using a single-force-eval leapfrog
pub fn leapfrog_integrator(sys: &mut System, forces: &AccelSet, dt: f64) {
    let n = sys.bodies.len();
    if n == 0 {
        sys.t += dt;
        return;
    }
    let half_dt = 0.5 * dt;

    // Drift: x_half = x_n + (dt/2) v_n
    for b in sys.bodies.iter_mut() {
        b.x += half_dt * b.v;
    }

    let t_mid = sys.t + half_dt;

    // Kick: v_n+1 = v_n + dt a(x_half)
    let mut a_mid = vec![NVec3::zeros(); n];
    forces.accumulate_accels(t_mid, &*sys, &mut a_mid);
    for (b, a) in sys.bodies.iter_mut().zip(a_mid.iter()) {
        b.v += dt * *a;
    }

    // Second drift: x_n+1 = x_half + (dt/2) v_n+1
    for b in sys.bodies.iter_mut() {
        b.x += half_dt * b.v;
    }

    sys.t += dt;
}

/// Advance the system by one step using classical fourth-order Runge-Kutta
/// on the first-order form x' = v, v' = a(x)
pub fn rk4_integrator(sys: &mut System, forces: &AccelSet, dt: f64) {
    let n = sys.bodies.len();
    if n == 0 {
        sys.t += dt;
        return;
    }
    let t0 = sys.t;
    let x0: Vec<NVec3> = sys.bodies.iter().map(|b| b.x).collect();
    let v0: Vec<NVec3> = sys.bodies.iter().map(|b| b.v).collect();

    // Scratch copy evaluated at the intermediate stages
    let mut stage = sys.clone();

    // Accelerations at x0 + scale * dx, time t
    let accel_at = |stage: &mut System, t: f64, dx: &[NVec3], scale: f64| -> Vec<NVec3> {
        for (i, b) in stage.bodies.iter_mut().enumerate() {
            b.x = x0[i] + scale * dx[i];
        }
        stage.t = t;
        let mut a = vec![NVec3::zeros(); n];
        forces.accumulate_accels(t, &*stage, &mut a);
        a
    };

    let kx1 = v0.clone();
    let kv1 = accel_at(&mut stage, t0, &kx1, 0.0);

    let kx2: Vec<NVec3> = (0..n).map(|i| v0[i] + 0.5 * dt * kv1[i]).collect();
    let kv2 = accel_at(&mut stage, t0 + 0.5 * dt, &kx1, 0.5 * dt);

    let kx3: Vec<NVec3> = (0..n).map(|i| v0[i] + 0.5 * dt * kv2[i]).collect();
    let kv3 = accel_at(&mut stage, t0 + 0.5 * dt, &kx2, 0.5 * dt);

    let kx4: Vec<NVec3> = (0..n).map(|i| v0[i] + dt * kv3[i]).collect();
    let kv4 = accel_at(&mut stage, t0 + dt, &kx3, dt);

    let sixth = dt / 6.0;
    for (i, b) in sys.bodies.iter_mut().enumerate() {
        b.x = x0[i] + sixth * (kx1[i] + 2.0 * kx2[i] + 2.0 * kx3[i] + kx4[i]);
        b.v = v0[i] + sixth * (kv1[i] + 2.0 * kv2[i] + 2.0 * kv3[i] + kv4[i]);
    }
    sys.t = t0 + dt;
}
