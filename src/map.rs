use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::config::{ARENA_RADIUS, ARENA_SEGMENTS, WALL_HEIGHT};

#[repr(C)]
#[derive(Copy, Clone, Pod, Zeroable, Debug)]
pub struct ArenaVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub color: [f32; 3],
}

impl ArenaVertex {
    pub const ATTRIBS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x3,
        1 => Float32x3,
        2 => Float32x3
    ];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<ArenaVertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

/// The generated arena: a render mesh and the collision triangles extracted
/// from it. Built once at startup; never mutated afterwards.
pub struct Arena {
    pub vertices: Vec<ArenaVertex>,
    pub indices: Vec<u32>,
    pub collision_vertices: Vec<Vec3>,
    pub collision_indices: Vec<[u32; 3]>,
    pub spawn: Vec3,
}

impl Arena {
    fn new() -> Self {
        Self {
            vertices: Vec::new(),
            indices: Vec::new(),
            collision_vertices: Vec::new(),
            collision_indices: Vec::new(),
            spawn: Vec3::ZERO,
        }
    }

    fn push_triangle(&mut self, a: Vec3, b: Vec3, c: Vec3, color: [f32; 3]) {
        let normal = (b - a).cross(c - a).normalize_or_zero().to_array();
        let base = self.vertices.len() as u32;
        for p in [a, b, c] {
            self.vertices.push(ArenaVertex {
                position: p.to_array(),
                normal,
                color,
            });
        }
        self.indices.extend([base, base + 1, base + 2]);

        let cbase = self.collision_vertices.len() as u32;
        self.collision_vertices.extend([a, b, c]);
        self.collision_indices.push([cbase, cbase + 1, cbase + 2]);
    }

    fn push_quad(&mut self, a: Vec3, b: Vec3, c: Vec3, d: Vec3, color: [f32; 3]) {
        self.push_triangle(a, b, c, color);
        self.push_triangle(a, c, d, color);
    }

    fn push_box(&mut self, center: Vec3, half: Vec3, color: [f32; 3]) {
        let min = center - half;
        let max = center + half;
        let corner = |x: f32, y: f32, z: f32| Vec3::new(x, y, z);
        // +Y
        self.push_quad(
            corner(min.x, max.y, min.z),
            corner(min.x, max.y, max.z),
            corner(max.x, max.y, max.z),
            corner(max.x, max.y, min.z),
            color,
        );
        // -Y
        self.push_quad(
            corner(min.x, min.y, min.z),
            corner(max.x, min.y, min.z),
            corner(max.x, min.y, max.z),
            corner(min.x, min.y, max.z),
            color,
        );
        // +X
        self.push_quad(
            corner(max.x, min.y, min.z),
            corner(max.x, max.y, min.z),
            corner(max.x, max.y, max.z),
            corner(max.x, min.y, max.z),
            color,
        );
        // -X
        self.push_quad(
            corner(min.x, min.y, min.z),
            corner(min.x, min.y, max.z),
            corner(min.x, max.y, max.z),
            corner(min.x, max.y, min.z),
            color,
        );
        // +Z
        self.push_quad(
            corner(min.x, min.y, max.z),
            corner(max.x, min.y, max.z),
            corner(max.x, max.y, max.z),
            corner(min.x, max.y, max.z),
            color,
        );
        // -Z
        self.push_quad(
            corner(min.x, min.y, min.z),
            corner(min.x, max.y, min.z),
            corner(max.x, max.y, min.z),
            corner(max.x, min.y, min.z),
            color,
        );
    }
}

fn ring_point(segment: u32, radius: f32, y: f32) -> Vec3 {
    let angle = segment as f32 / ARENA_SEGMENTS as f32 * std::f32::consts::TAU;
    Vec3::new(angle.cos() * radius, y, angle.sin() * radius)
}

/// One-time arena setup: floor disc, perimeter wall and scattered boulders.
/// The same triangles feed the renderer and the collision mesh.
pub fn generate(seed: u64) -> Arena {
    let mut arena = Arena::new();

    const FLOOR_A: [f32; 3] = [0.36, 0.42, 0.32];
    const FLOOR_B: [f32; 3] = [0.32, 0.38, 0.29];
    const WALL: [f32; 3] = [0.45, 0.40, 0.36];
    const ROCK: [f32; 3] = [0.50, 0.48, 0.46];

    // Floor: triangle fan around the arena axis.
    for i in 0..ARENA_SEGMENTS {
        let color = if i % 2 == 0 { FLOOR_A } else { FLOOR_B };
        arena.push_triangle(
            Vec3::ZERO,
            ring_point(i + 1, ARENA_RADIUS, 0.0),
            ring_point(i, ARENA_RADIUS, 0.0),
            color,
        );
    }

    // Perimeter wall: one inward-facing quad per segment.
    for i in 0..ARENA_SEGMENTS {
        let low_a = ring_point(i, ARENA_RADIUS, 0.0);
        let low_b = ring_point(i + 1, ARENA_RADIUS, 0.0);
        let high_a = ring_point(i, ARENA_RADIUS, WALL_HEIGHT);
        let high_b = ring_point(i + 1, ARENA_RADIUS, WALL_HEIGHT);
        arena.push_quad(low_a, low_b, high_b, high_a, WALL);
    }

    // Boulders: deterministic scatter, kept away from the spawn point.
    let mut rng = SmallRng::seed_from_u64(seed);
    for _ in 0..12 {
        let radius = rng.random_range(6.0..40.0f32);
        let angle = rng.random_range(0.0..std::f32::consts::TAU);
        let half = Vec3::new(
            rng.random_range(0.4..1.5f32),
            rng.random_range(0.4..1.5f32),
            rng.random_range(0.4..1.5f32),
        );
        let center = Vec3::new(angle.cos() * radius, half.y, angle.sin() * radius);
        arena.push_box(center, half, ROCK);
    }

    log::info!(
        "generated arena: {} render vertices, {} collision triangles",
        arena.vertices.len(),
        arena.collision_indices.len()
    );
    arena
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::PhysicsWorld;

    #[test]
    fn mesh_indices_are_consistent() {
        let arena = generate(7);
        assert_eq!(arena.indices.len() % 3, 0);
        let max = *arena.indices.iter().max().unwrap();
        assert!((max as usize) < arena.vertices.len());
        for tri in &arena.collision_indices {
            for &i in tri {
                assert!((i as usize) < arena.collision_vertices.len());
            }
        }
    }

    #[test]
    fn geometry_stays_inside_the_arena() {
        let arena = generate(7);
        for v in &arena.collision_vertices {
            let planar = (v.x * v.x + v.z * v.z).sqrt();
            assert!(planar <= ARENA_RADIUS + 1e-3);
        }
    }

    #[test]
    fn generation_is_deterministic_per_seed() {
        let a = generate(42);
        let b = generate(42);
        assert_eq!(a.collision_vertices.len(), b.collision_vertices.len());
        for (va, vb) in a.collision_vertices.iter().zip(&b.collision_vertices) {
            assert_eq!(va, vb);
        }
    }

    #[test]
    fn spawn_point_stands_on_the_floor() {
        let arena = generate(7);
        let world = PhysicsWorld::new(&arena.collision_vertices, &arena.collision_indices)
            .expect("arena collision mesh");
        let (pos, on_ground) =
            world.move_player(arena.spawn + Vec3::new(0.0, -0.02, 0.0), Vec3::NEG_Y);
        assert!(on_ground);
        assert!(pos.y.abs() < 1e-3);
    }
}
