use crate::math::*;

/// Pinhole camera fixed at (0, 0, 2), looking down -z. The projection
/// scale is the focal length times the larger image dimension, so the
/// mesh framing is independent of the aspect ratio.
pub struct Camera {
	pos: Vec3,
	resolution: (usize, usize),
	scale: f32,
}

impl Camera {
	pub fn new(resolution: (usize, usize), focal_length: f32) -> Camera {
		Camera {
			pos: Vec3::new(0.0, 0.0, 2.0),
			resolution,
			scale: focal_length * resolution.0.max(resolution.1) as f32,
		}
	}

	pub fn make_ray(&self, (x, y): (usize, usize)) -> Ray {
		let (w, h) = (self.resolution.0 as f32, self.resolution.1 as f32);
		let a = self.scale;
		let direction = Vec3::new(
			(x as f32 + 0.5) / a - w / (2.0 * a),
			-((y as f32 + 0.5) / a - h / (2.0 * a)),
			-1.0,
		);
		Ray::new(self.pos, direction.normalized())
	}

	pub fn resolution(&self) -> (usize, usize) {
		self.resolution
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn rays_start_at_the_eye_and_look_forward() {
		let camera = Camera::new((64, 64), 1.0);
		let ray = camera.make_ray((10, 50));
		assert_eq!(ray.origin, Vec3::new(0.0, 0.0, 2.0));
		assert!(ray.direction.z < 0.0);
		assert!((ray.direction.length() - 1.0).abs() < EPSILON);
	}

	#[test]
	fn the_grid_center_maps_to_the_axis() {
		// with an even resolution the axis passes between the two
		// central pixels; their directions mirror each other in x
		let camera = Camera::new((64, 64), 1.0);
		let left = camera.make_ray((31, 31));
		let right = camera.make_ray((32, 31));
		assert!((left.direction.x + right.direction.x).abs() < EPSILON);

		// image y grows downwards, world y grows upwards
		let top = camera.make_ray((31, 0));
		assert!(top.direction.y > 0.0);
	}
}
