use rand::{Rng, SeedableRng, XorShiftRng};

use crate::bvh::Bvh;
use crate::intersect::{scene_intersect, Intersection};
use crate::math::*;
use crate::mesh::Mesh;
use crate::warp;

/// Offset of occlusion-ray origins along the surface normal, keeps them
/// from immediately re-hitting the surface they start on.
const NORMAL_OFFSET: f32 = 1.0 / 100_000.0;

fn occluded(bvh: &Bvh, mesh: &Mesh, origin: Vec3, direction: Vec3, max_distance: f32) -> bool {
	let ray = Ray::new(origin, direction);
	scene_intersect(bvh, mesh, &ray, max_distance, &mut Intersection::none())
}

/// Deterministic hemisphere sampling: `circles` rings of directions
/// between the `alpha_min` and `alpha_max` elevation angles (degrees),
/// each ring carrying rays in proportion to its circumference. Returns
/// the unoccluded fraction in [0, 1].
///
/// A ring whose computed ray count is zero contributes no samples; with
/// every ring starved the point counts as fully unoccluded.
pub fn ambient_occlusion_uniform(
	bvh: &Bvh,
	mesh: &Mesh,
	point: Vec3,
	normal: Vec3,
	max_distance: f32,
	circles: u32,
	alpha_min: f32,
	alpha_max: f32,
) -> f32 {
	let origin = point + normal * NORMAL_OFFSET;
	let frame = Frame::from_up(normal);

	let alpha_min = alpha_min.to_radians();
	let alpha_max = alpha_max.to_radians();
	let step = alpha_max / circles as f32;

	let mut rays = 0u32;
	let mut hits = 0u32;
	for circle in 0..circles {
		let angle = step * circle as f32 + alpha_min;
		let ray_count = (2.0 * PI * angle.cos() / step) as u32;
		if ray_count == 0 {
			continue;
		}
		// elevation above the horizon -> polar angle from the normal
		let theta = FRAC_PI_2 - angle;
		for k in 0..ray_count {
			let phi = 2.0 * PI * k as f32 / ray_count as f32;
			let direction = frame.to_world(Vec3::new(
				theta.sin() * phi.cos(),
				theta.cos(),
				theta.sin() * phi.sin(),
			));
			rays += 1;
			if occluded(bvh, mesh, origin, direction, max_distance) {
				hits += 1;
			}
		}
	}

	if rays == 0 {
		return 1.0;
	}
	1.0 - hits as f32 / rays as f32
}

/// Randomized hemisphere sampling: one ray straight along the normal plus
/// `samples` cosine-weighted directions. The generator is seeded from the
/// pixel index, so a pixel always sees the same sample sequence.
pub fn ambient_occlusion_random(
	bvh: &Bvh,
	mesh: &Mesh,
	point: Vec3,
	normal: Vec3,
	max_distance: f32,
	samples: u32,
	pixel_index: u32,
) -> f32 {
	let origin = point + normal * NORMAL_OFFSET;
	let frame = Frame::from_up(normal);
	let mut rng = seeded_rng(pixel_index.wrapping_mul(536_870_923));

	let mut hits = 0u32;
	if occluded(bvh, mesh, origin, normal, max_distance) {
		hits += 1;
	}
	for _ in 0..samples {
		let direction = frame.to_world(warp::cosine_hemisphere((rng.gen(), rng.gen())));
		if occluded(bvh, mesh, origin, direction, max_distance) {
			hits += 1;
		}
	}

	1.0 - hits as f32 / (samples + 1) as f32
}

/// Spread one seed over the four words of xorshift state; never all zero.
fn seeded_rng(seed: u32) -> XorShiftRng {
	XorShiftRng::from_seed([
		(123_456_789 ^ seed).wrapping_mul(88_675_123),
		(362_436_069 ^ seed).wrapping_mul(123_456_789),
		(521_288_629 ^ seed).wrapping_mul(362_436_069),
		(88_675_123 ^ seed).wrapping_mul(521_288_629),
	])
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::bvh::SplitStrategy;

	/// Cube of the given half-extent centered on the origin, faces
	/// pointing whichever way; occlusion only needs hits.
	fn cube(half: f32) -> Mesh {
		let h = half;
		let mut mesh = Mesh::default();
		for &z in &[-h, h] {
			for &y in &[-h, h] {
				for &x in &[-h, h] {
					mesh.vertices.push(Vec3::new(x, y, z));
				}
			}
		}
		mesh.faces = vec![
			0, 1, 2, 1, 3, 2, // z = -h
			4, 6, 5, 5, 6, 7, // z = +h
			0, 4, 1, 1, 4, 5, // y = -h
			2, 3, 6, 3, 7, 6, // y = +h
			0, 2, 4, 2, 6, 4, // x = -h
			1, 5, 3, 3, 5, 7, // x = +h
		];
		mesh
	}

	fn floor_triangle() -> Mesh {
		Mesh {
			vertices: vec![
				Vec3::new(-10.0, 0.0, -10.0),
				Vec3::new(10.0, 0.0, -10.0),
				Vec3::new(0.0, 0.0, 10.0),
			],
			vnormals: Vec::new(),
			faces: vec![0, 1, 2],
		}
	}

	fn up() -> Vec3 {
		Vec3::new(0.0, 1.0, 0.0)
	}

	#[test]
	fn open_sky_is_unoccluded() {
		let mesh = floor_triangle();
		let bvh = Bvh::build(&mesh, SplitStrategy::LongestAxis);
		let point = Vec3::zero();

		let uniform = ambient_occlusion_uniform(&bvh, &mesh, point, up(), 1.0, 3, 4.0, 90.0);
		assert_eq!(uniform, 1.0);

		let random = ambient_occlusion_random(&bvh, &mesh, point, up(), 1.0, 16, 0);
		assert_eq!(random, 1.0);
	}

	#[test]
	fn enclosed_point_is_fully_occluded() {
		let mesh = cube(1.0);
		let bvh = Bvh::build(&mesh, SplitStrategy::SurfaceAreaHeuristic);
		let point = Vec3::zero();

		let uniform = ambient_occlusion_uniform(&bvh, &mesh, point, up(), 10.0, 3, 4.0, 90.0);
		assert!(uniform < 0.05, "uniform occlusion factor was {}", uniform);

		let random = ambient_occlusion_random(&bvh, &mesh, point, up(), 10.0, 16, 7);
		assert!(random < 0.05, "random occlusion factor was {}", random);
	}

	#[test]
	fn walls_beyond_the_max_distance_do_not_occlude() {
		let mesh = cube(1.0);
		let bvh = Bvh::build(&mesh, SplitStrategy::LongestAxis);
		let point = Vec3::zero();

		// the nearest wall is a full unit away, farther than the cap
		let uniform = ambient_occlusion_uniform(&bvh, &mesh, point, up(), 0.5, 3, 4.0, 90.0);
		assert_eq!(uniform, 1.0);

		let random = ambient_occlusion_random(&bvh, &mesh, point, up(), 0.5, 16, 3);
		assert_eq!(random, 1.0);
	}

	#[test]
	fn random_sampling_is_deterministic_per_pixel() {
		let mesh = cube(1.0);
		let bvh = Bvh::build(&mesh, SplitStrategy::LongestAxis);
		// an offset point makes some rays graze the corners, so the
		// factor is not pinned at an extreme for every seed
		let point = Vec3::new(0.3, -0.2, 0.4);

		let a = ambient_occlusion_random(&bvh, &mesh, point, up(), 0.9, 32, 42);
		let b = ambient_occlusion_random(&bvh, &mesh, point, up(), 0.9, 32, 42);
		assert_eq!(a, b);
	}

	#[test]
	fn factor_stays_in_range() {
		let mesh = cube(1.0);
		let bvh = Bvh::build(&mesh, SplitStrategy::LongestAxis);
		for i in 0..8u32 {
			let point = Vec3::new(0.1 * i as f32 - 0.4, 0.05 * i as f32 - 0.2, 0.0);
			let uniform = ambient_occlusion_uniform(&bvh, &mesh, point, up(), 0.8, 4, 4.0, 90.0);
			assert!((0.0..=1.0).contains(&uniform), "factor {} out of range", uniform);
			let random = ambient_occlusion_random(&bvh, &mesh, point, up(), 0.8, 8, i);
			assert!((0.0..=1.0).contains(&random), "factor {} out of range", random);
		}
	}

	#[test]
	fn starved_rings_contribute_no_samples() {
		let mesh = cube(1.0);
		let bvh = Bvh::build(&mesh, SplitStrategy::LongestAxis);
		// one ring hugging the pole: its circumference rounds to zero rays
		let f = ambient_occlusion_uniform(&bvh, &mesh, Vec3::zero(), up(), 10.0, 1, 89.0, 90.0);
		assert_eq!(f, 1.0);
	}
}
