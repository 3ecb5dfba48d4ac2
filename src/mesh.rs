use serde_derive::{Deserialize, Serialize};
use crate::math::*;

/// Represent vertex indices in face data; 2^32 vertices should be enough
pub type Index = u32;

// N.B. There is a 1-1 correspondence between vertices and normals once
// compute_vertex_normals has run. Face f occupies faces[3f..3f+3].
#[derive(Default, Serialize, Deserialize)]
pub struct Mesh {
	pub vertices: Vec<Vec3>,
	pub vnormals: Vec<Vec3>,
	pub faces: Vec<Index>,
}

impl Mesh {
	pub fn face_count(&self) -> usize {
		self.faces.len() / 3
	}

	pub fn triangle(&self, face_id: Index) -> Triangle {
		Triangle { mesh: self, face_id }
	}
}

/// Borrowed view of a single mesh face.
#[derive(Copy, Clone)]
pub struct Triangle<'a> {
	mesh: &'a Mesh,
	face_id: Index,
}

impl<'a> Triangle<'a> {
	pub fn face_id(&self) -> Index {
		self.face_id
	}

	pub fn vertex(&self, k: usize) -> Vec3 {
		self.mesh.vertices[self.mesh.faces[self.face_id as usize * 3 + k] as usize]
	}

	pub fn centroid(&self) -> Vec3 {
		(self.vertex(0) + self.vertex(1) + self.vertex(2)) / 3.0
	}

	/// Geometric face normal (not normalized).
	pub fn normal(&self) -> Vec3 {
		Vec3::cross(self.vertex(1) - self.vertex(0), self.vertex(2) - self.vertex(0))
	}

	pub fn aabb(&self) -> AABB {
		let mut bb = AABB::from_point(self.vertex(0));
		bb.merge_point(self.vertex(1));
		bb.merge_point(self.vertex(2));
		bb
	}
}

/// Zero-length normals encountered while computing vertex normals.
#[derive(Default, Debug)]
pub struct NormalStats {
	pub zero_face_normals: usize,
	pub zero_vertex_normals: usize,
}

impl NormalStats {
	pub fn any(&self) -> bool {
		self.zero_face_normals > 0 || self.zero_vertex_normals > 0
	}
}

/// Compute smooth per-vertex normals by averaging area-weighted face
/// normals. Degenerate faces contribute nothing; a vertex whose normal
/// stays zero-length is left at zero rather than normalized.
pub fn compute_vertex_normals(mesh: &mut Mesh) -> NormalStats {
	let mut stats = NormalStats::default();
	mesh.vnormals.clear();
	mesh.vnormals.resize(mesh.vertices.len(), Vec3::zero());

	for f in 0..mesh.face_count() {
		let normal = mesh.triangle(f as Index).normal();
		if normal.length() == 0.0 {
			stats.zero_face_normals += 1;
			continue;
		}
		for k in 0..3 {
			let v = mesh.faces[f * 3 + k] as usize;
			mesh.vnormals[v] += normal;
		}
	}

	for n in &mut mesh.vnormals {
		let length = n.length();
		if length > 0.0 {
			*n = *n / length;
		} else {
			stats.zero_vertex_normals += 1;
		}
	}

	stats
}

#[cfg(test)]
mod tests {
	use super::*;

	pub fn unit_triangle() -> Mesh {
		Mesh {
			vertices: vec![
				Vec3::new(0.0, 0.0, 0.0),
				Vec3::new(1.0, 0.0, 0.0),
				Vec3::new(0.0, 1.0, 0.0),
			],
			vnormals: Vec::new(),
			faces: vec![0, 1, 2],
		}
	}

	#[test]
	fn triangle_accessors() {
		let mesh = unit_triangle();
		let tri = mesh.triangle(0);
		assert_eq!(tri.vertex(2), Vec3::new(0.0, 1.0, 0.0));
		assert!((tri.centroid() - Vec3::new(1.0 / 3.0, 1.0 / 3.0, 0.0)).length() < EPSILON);
		assert_eq!(tri.normal(), Vec3::new(0.0, 0.0, 1.0));
		let bb = tri.aabb();
		assert_eq!(bb.min, Vec3::zero());
		assert_eq!(bb.max, Vec3::new(1.0, 1.0, 0.0));
	}

	#[test]
	fn vertex_normals_of_a_flat_triangle() {
		let mut mesh = unit_triangle();
		let stats = compute_vertex_normals(&mut mesh);
		assert!(!stats.any());
		for n in &mesh.vnormals {
			assert_eq!(*n, Vec3::new(0.0, 0.0, 1.0));
		}
	}

	#[test]
	fn degenerate_faces_are_counted_not_fatal() {
		// second face is collinear and has no normal
		let mut mesh = Mesh {
			vertices: vec![
				Vec3::new(0.0, 0.0, 0.0),
				Vec3::new(1.0, 0.0, 0.0),
				Vec3::new(0.0, 1.0, 0.0),
				Vec3::new(2.0, 0.0, 0.0),
				Vec3::new(3.0, 0.0, 0.0),
				Vec3::new(4.0, 0.0, 0.0),
			],
			vnormals: Vec::new(),
			faces: vec![0, 1, 2, 3, 4, 5],
		};
		let stats = compute_vertex_normals(&mut mesh);
		assert_eq!(stats.zero_face_normals, 1);
		assert_eq!(stats.zero_vertex_normals, 3);
		assert_eq!(mesh.vnormals[4], Vec3::zero());
		assert_eq!(mesh.vnormals[0], Vec3::new(0.0, 0.0, 1.0));
	}
}
