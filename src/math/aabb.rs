use serde_derive::{Deserialize, Serialize};
use crate::math::*;

/// Axis-Aligned Bounding Box
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AABB {
	pub min: Vec3,
	pub max: Vec3,
}

impl AABB {
	/// Inverted box, the neutral element for merging.
	pub fn empty() -> AABB {
		AABB { min: Vec3::thrice(INFINITY), max: Vec3::thrice(NEG_INFINITY) }
	}

	pub fn from_point(p: Vec3) -> AABB {
		AABB { min: p, max: p }
	}

	pub fn merge(&mut self, b: &AABB) {
		self.min = Vec3::min(self.min, b.min);
		self.max = Vec3::max(self.max, b.max);
	}

	pub fn merge_point(&mut self, p: Vec3) {
		self.min = Vec3::min(self.min, p);
		self.max = Vec3::max(self.max, p);
	}

	pub fn extent(&self) -> Vec3 {
		self.max - self.min
	}

	/// Longest axis; ties go to the lower axis index.
	pub fn longest_axis(&self) -> Axis {
		let d = self.extent();
		if d.x >= d.y && d.x >= d.z {
			Axis::X
		} else if d.y >= d.z {
			Axis::Y
		} else {
			Axis::Z
		}
	}

	/// Closed-interval containment on all three axes.
	pub fn contains(&self, p: Vec3) -> bool {
		p.x >= self.min.x && p.x <= self.max.x
			&& p.y >= self.min.y && p.y <= self.max.y
			&& p.z >= self.min.z && p.z <= self.max.z
	}

	pub fn surface_area(&self) -> f32 {
		let d = self.extent();
		2.0 * (d.x * d.y + d.x * d.z + d.y * d.z)
	}
}
