//! Analytic force field and per-particle integrator
//!
//! NOTE: These are reference implementations for documentation and testing.
//! The actual simulation runs the same math in a GPU compute shader
//! (`galaxy-simulation/src/shaders/step.wgsl`); the two must stay in sync.

use crate::constants::*;
use crate::particle::Particle;
use glam::Vec2;

/// Per-step scalar parameters, the CPU twin of the GPU uniform record.
#[derive(Debug, Clone, Copy)]
pub struct StepParams {
    pub delta_time: f32,
    pub field_strength: f32,
    pub damping: f32,
    pub pointer_pos: Vec2,
    pub pointer_active: bool,
}

impl Default for StepParams {
    fn default() -> Self {
        Self {
            delta_time: NOMINAL_DT,
            field_strength: DEFAULT_FIELD_STRENGTH,
            damping: DEFAULT_DAMPING,
            pointer_pos: Vec2::ZERO,
            pointer_active: false,
        }
    }
}

/// Softened inverse-square pull toward the galactic core.
/// F = CENTRAL_PULL / (d² + CENTRAL_SOFTENING); finite at d = 0.
pub fn central_pull(position: Vec2, field_strength: f32) -> Vec2 {
    let to_center = -position;
    let d = to_center.length();
    let magnitude = CENTRAL_PULL / (d * d + CENTRAL_SOFTENING) * field_strength;
    to_center.normalize_or_zero() * magnitude
}

/// Tangential drive perpendicular to the radial direction; this is what
/// keeps the distribution spiral-shaped instead of collapsing onto the
/// core. Disabled inside SPIRAL_CORE_RADIUS where the direction becomes
/// numerically meaningless.
pub fn spiral_drive(position: Vec2, field_strength: f32) -> Vec2 {
    let to_center = -position;
    let d = to_center.length();
    if d <= SPIRAL_CORE_RADIUS {
        return Vec2::ZERO;
    }

    let radial = to_center / d;
    let tangent = Vec2::new(-radial.y, radial.x);
    tangent * (SPIRAL_DRIVE / (d + 1.0)) * field_strength
}

/// Near-field pull toward the pointer ("black hole"). Only active within
/// POINTER_CAPTURE_RADIUS; the POINTER_SOFTENING term guards the
/// singularity when a particle sits on the pointer.
pub fn pointer_pull(position: Vec2, pointer: Vec2) -> Vec2 {
    let to_pointer = pointer - position;
    let d = to_pointer.length();
    if d >= POINTER_CAPTURE_RADIUS || d == 0.0 {
        return Vec2::ZERO;
    }

    (to_pointer / d) * (POINTER_PULL / (d * d + POINTER_SOFTENING))
}

/// Total force on a test particle at `position`. Mass-independent: every
/// particle falls through the same field regardless of its own mass.
pub fn total_force(position: Vec2, params: &StepParams) -> Vec2 {
    let mut force = central_pull(position, params.field_strength)
        + spiral_drive(position, params.field_strength);

    if params.pointer_active {
        force += pointer_pull(position, params.pointer_pos);
    }

    force
}

/// Advance one particle by one semi-implicit Euler step: velocity first,
/// then damping, then position from the already-updated velocity. Mass and
/// color seed pass through unchanged.
pub fn step_particle(p: &Particle, params: &StepParams) -> Particle {
    let position = Vec2::from_array(p.position);
    let mut velocity = Vec2::from_array(p.velocity);

    velocity += total_force(position, params) * params.delta_time;
    velocity *= params.damping;
    let position = position + velocity * params.delta_time;

    Particle {
        position: position.to_array(),
        velocity: velocity.to_array(),
        mass: p.mass,
        color_seed: p.color_seed,
    }
}

/// CPU mirror of one compute dispatch over `count` particles.
///
/// The invocation range is padded up to whole workgroups exactly as the GPU
/// dispatch is; invocations with index ≥ `count` must not touch the output.
pub fn step_slice(
    src: &[Particle],
    dst: &mut [Particle],
    count: usize,
    params: &StepParams,
    workgroup_size: usize,
) {
    let workgroups = (count + workgroup_size - 1) / workgroup_size;
    let invocations = workgroups * workgroup_size;

    for index in 0..invocations {
        if index >= count {
            continue;
        }
        dst[index] = step_particle(&src[index], params);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::galaxy::spawn_galaxy;
    use bytemuck::Zeroable;

    const WORKGROUP_SIZE: usize = 64;

    fn sentinel() -> Particle {
        Particle {
            position: [777.0, 777.0],
            velocity: [777.0, 777.0],
            mass: 777.0,
            color_seed: 777.0,
        }
    }

    #[test]
    fn central_pull_bounded_at_origin() {
        // At d = 0 the direction is undefined but the magnitude formula
        // tends to CENTRAL_PULL / CENTRAL_SOFTENING; nothing may diverge.
        let at_origin = central_pull(Vec2::ZERO, 1.0);
        assert!(at_origin.is_finite());

        let near_origin = central_pull(Vec2::new(1e-4, 0.0), 1.0);
        assert!((near_origin.length() - 10.0).abs() < 1e-3);

        let scaled = central_pull(Vec2::new(1e-4, 0.0), 2.5);
        assert!((scaled.length() - 25.0).abs() < 1e-2);
    }

    #[test]
    fn spiral_drive_inactive_near_core() {
        assert_eq!(spiral_drive(Vec2::new(0.05, 0.0), 1.0), Vec2::ZERO);
        assert_ne!(spiral_drive(Vec2::new(0.2, 0.0), 1.0), Vec2::ZERO);
    }

    #[test]
    fn spiral_drive_is_perpendicular_to_radius() {
        let pos = Vec2::new(1.3, -2.1);
        let drive = spiral_drive(pos, 1.0);
        assert!(pos.normalize().dot(drive.normalize()).abs() < 1e-6);
    }

    #[test]
    fn pointer_pull_respects_capture_radius() {
        let pointer = Vec2::new(1.0, 1.0);
        assert_eq!(pointer_pull(Vec2::new(2.0, 1.0), pointer), Vec2::ZERO);
        assert_ne!(pointer_pull(Vec2::new(1.2, 1.0), pointer), Vec2::ZERO);
        // A particle sitting on the pointer has no defined direction.
        assert_eq!(pointer_pull(pointer, pointer), Vec2::ZERO);
    }

    #[test]
    fn step_is_deterministic() {
        let p = Particle {
            position: [1.5, -0.7],
            velocity: [0.2, 0.4],
            mass: 0.8,
            color_seed: 0.3,
        };
        let params = StepParams {
            pointer_pos: Vec2::new(1.4, -0.7),
            pointer_active: true,
            ..StepParams::default()
        };

        let a = step_particle(&p, &params);
        let b = step_particle(&p, &params);
        assert_eq!(a, b);
    }

    #[test]
    fn mass_and_seed_pass_through() {
        let p = Particle {
            position: [2.0, 0.5],
            velocity: [0.1, -0.1],
            mass: 0.62,
            color_seed: 0.91,
        };
        let stepped = step_particle(&p, &StepParams::default());
        assert_eq!(stepped.mass, p.mass);
        assert_eq!(stepped.color_seed, p.color_seed);
    }

    #[test]
    fn damping_shrinks_velocity_without_field() {
        let params = StepParams {
            field_strength: 0.0,
            pointer_active: false,
            ..StepParams::default()
        };
        let mut p = Particle {
            position: [1.0, 1.0],
            velocity: [3.0, -2.0],
            mass: 1.0,
            color_seed: 0.0,
        };

        let mut last_speed = f32::INFINITY;
        for _ in 0..200 {
            p = step_particle(&p, &params);
            let speed =
                (p.velocity[0] * p.velocity[0] + p.velocity[1] * p.velocity[1]).sqrt();
            assert!(speed < last_speed);
            last_speed = speed;
        }
        assert!(last_speed < 0.5);
    }

    #[test]
    fn out_of_range_invocations_leave_output_untouched() {
        // 100 is not a multiple of the workgroup size, so the dispatch is
        // padded to 128 invocations; the tail must stay sentinel.
        let count = 100;
        let padded = 128;
        let src = vec![Particle::zeroed(); padded];
        let mut dst = vec![sentinel(); padded];

        step_slice(&src, &mut dst, count, &StepParams::default(), WORKGROUP_SIZE);

        for (i, p) in dst.iter().enumerate() {
            if i < count {
                assert_ne!(*p, sentinel(), "index {} not written", i);
            } else {
                assert_eq!(*p, sentinel(), "index {} written past count", i);
            }
        }
    }

    #[test]
    fn system_stays_bounded_over_100_steps() {
        let mut rng = rand::rng();
        let mut current = spawn_galaxy(1000, &mut rng);
        let mut next = vec![Particle::zeroed(); 1000];
        let params = StepParams::default();

        for _ in 0..100 {
            step_slice(&current, &mut next, 1000, &params, WORKGROUP_SIZE);
            std::mem::swap(&mut current, &mut next);
        }

        let mut radius_sum = 0.0;
        for p in &current {
            assert!(p.position[0].is_finite() && p.position[1].is_finite());
            assert!(p.velocity[0].is_finite() && p.velocity[1].is_finite());
            radius_sum +=
                (p.position[0] * p.position[0] + p.position[1] * p.position[1]).sqrt();
        }
        let mean_radius = radius_sum / 1000.0;
        assert!((0.0..=10.0).contains(&mean_radius), "mean radius {}", mean_radius);
    }
}
