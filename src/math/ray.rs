use crate::math::Vec3;

#[derive(Copy, Clone, Debug)]
pub struct Ray {
	pub origin: Vec3,
	/// Normalized by convention before any intersection test.
	pub direction: Vec3,
}

impl Ray {
	pub fn new(origin: Vec3, direction: Vec3) -> Ray {
		Ray { origin, direction }
	}

	pub fn point_at(&self, t: f32) -> Vec3 {
		self.origin + self.direction * t
	}
}
