use glam::Vec3;
use parry3d::math::{Pose3, Vector};
use parry3d::query::{Ray, RayCast};
use parry3d::shape::TriMesh;

use crate::config::*;

/// Static collision world: one triangle mesh queried with raycasts. Built
/// once at setup from the extracted arena geometry.
pub struct PhysicsWorld {
    trimesh: TriMesh,
}

impl PhysicsWorld {
    pub fn new(collision_vertices: &[Vec3], collision_indices: &[[u32; 3]]) -> Option<Self> {
        if collision_vertices.is_empty() || collision_indices.is_empty() {
            return None;
        }

        let vertices: Vec<Vector> = collision_vertices
            .iter()
            .map(|v| Vector::new(v.x, v.y, v.z))
            .collect();

        let trimesh = TriMesh::new(vertices, collision_indices.to_vec()).ok()?;
        Some(Self { trimesh })
    }

    fn cast_ray(&self, origin: Vec3, dir: Vec3, max_dist: f32) -> Option<f32> {
        let ray = Ray::new(
            Vector::new(origin.x, origin.y, origin.z),
            Vector::new(dir.x, dir.y, dir.z),
        );
        self.trimesh
            .cast_ray(&Pose3::IDENTITY, &ray, max_dist, true)
    }

    /// Downward ray hit reported as (distance, |normal.y| / |normal|), the
    /// latter being the cosine of the surface's slope angle.
    fn cast_floor_ray(&self, origin: Vec3, max_dist: f32) -> Option<(f32, f32)> {
        let ray = Ray::new(
            Vector::new(origin.x, origin.y, origin.z),
            Vector::new(0.0, -1.0, 0.0),
        );
        let hit = self
            .trimesh
            .cast_ray_and_get_normal(&Pose3::IDENTITY, &ray, max_dist, true)?;
        let n = hit.normal;
        let len = (n.x * n.x + n.y * n.y + n.z * n.z).sqrt();
        if len <= 1e-6 {
            return None;
        }
        Some((hit.time_of_impact, n.y.abs() / len))
    }

    /// Kinematic move-and-collide: resolves `desired_position` against the
    /// mesh and reports whether the body stands on a floor. A downward hit
    /// counts as floor only while not moving upward and only when the surface
    /// is within the max slope angle; steeper geometry is handled by the wall
    /// rays instead, so slopes beyond the limit stop the body rather than
    /// letting it climb.
    pub fn move_player(&self, desired_position: Vec3, velocity: Vec3) -> (Vec3, bool) {
        let mut final_pos = desired_position;
        let mut on_ground = false;
        let half_width = PLAYER_WIDTH / 2.0;

        // Ground check
        if velocity.y <= 0.0 {
            let ground_origin = desired_position + Vec3::new(0.0, STEP_OVER_HEIGHT, 0.0);
            if let Some((toi, slope_cos)) = self.cast_floor_ray(ground_origin, PLAYER_HEIGHT) {
                if toi < STEP_OVER_HEIGHT + GROUND_SNAP_MARGIN && slope_cos >= FLOOR_MAX_ANGLE.cos()
                {
                    on_ground = true;
                    let ground_y = ground_origin.y - toi;
                    // Snapping to the hit keeps speed constant on walkable slopes.
                    if final_pos.y < ground_y {
                        final_pos.y = ground_y;
                    }
                }
            }
        }

        // Wall checks (4 directions, 2 heights: step-over and head)
        for height in [STEP_OVER_HEIGHT, PLAYER_HEIGHT] {
            let wall_origin = final_pos + Vec3::new(0.0, height, 0.0);
            for (dx, dz) in [(1.0, 0.0), (-1.0, 0.0), (0.0, 1.0), (0.0, -1.0)] {
                let dir = Vec3::new(dx, 0.0, dz);
                if let Some(toi) = self.cast_ray(wall_origin, dir, half_width) {
                    if toi < half_width {
                        final_pos.x -= dx * (half_width - toi);
                        final_pos.z -= dz * (half_width - toi);
                    }
                }
            }
        }

        // Ceiling check (from eye position, only when moving up)
        if velocity.y > 0.0 {
            let head_clearance = PLAYER_HEIGHT - EYE_HEIGHT;
            let eye_origin = desired_position + Vec3::new(0.0, EYE_HEIGHT, 0.0);
            if let Some(toi) = self.cast_ray(eye_origin, Vec3::Y, head_clearance) {
                if toi < head_clearance {
                    final_pos.y -= head_clearance - toi;
                }
            }
        }

        (final_pos, on_ground)
    }
}
