use crate::math::Vec3;

/// Right-handed orthonormal basis -- Y is up
pub struct Frame(Vec3, Vec3, Vec3);

impl Frame {
	/// Build a basis around a unit normal. The cross product is seeded with
	/// the world axis least aligned with the normal so it never degenerates.
	pub fn from_up(normal: Vec3) -> Frame {
		let mut h = normal;
		if normal.x.abs() <= normal.y.abs() && normal.x.abs() <= normal.z.abs() {
			h.x = 1.0;
		} else if normal.y.abs() <= normal.x.abs() && normal.y.abs() <= normal.z.abs() {
			h.y = 1.0;
		} else {
			h.z = 1.0;
		}
		let tangent = Vec3::cross(h, normal).normalized();
		let bitangent = Vec3::cross(tangent, normal).normalized();
		Frame(tangent, normal, bitangent)
	}

	#[inline(always)]
	pub fn to_world(&self, v: Vec3) -> Vec3 {
		self.0 * v.x + self.1 * v.y + self.2 * v.z
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::math::EPSILON;

	fn assert_orthonormal(n: Vec3) {
		let frame = Frame::from_up(n);
		let Frame(t, u, b) = frame;
		assert_eq!(u, n);
		assert!(Vec3::dot(t, u).abs() < EPSILON);
		assert!(Vec3::dot(t, b).abs() < EPSILON);
		assert!(Vec3::dot(u, b).abs() < EPSILON);
		assert!((t.length() - 1.0).abs() < EPSILON);
		assert!((b.length() - 1.0).abs() < EPSILON);
	}

	#[test]
	fn basis_is_orthonormal() {
		assert_orthonormal(Vec3::new(0.0, 1.0, 0.0));
		assert_orthonormal(Vec3::new(1.0, 0.0, 0.0));
		assert_orthonormal(Vec3::new(0.0, 0.0, -1.0));
		assert_orthonormal(Vec3::new(0.577_350_3, 0.577_350_3, 0.577_350_3));
	}

	#[test]
	fn up_axis_maps_to_the_normal() {
		let n = Vec3::new(0.0, 0.0, 1.0);
		let frame = Frame::from_up(n);
		let v = frame.to_world(Vec3::new(0.0, 1.0, 0.0));
		assert!((v - n).length() < EPSILON);
	}
}
