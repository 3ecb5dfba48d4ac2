use crate::bvh::Bvh;
use crate::math::*;
use crate::mesh::{Index, Mesh};

/// Rays closer than this to a triangle's plane count as parallel.
const PARALLEL_EPSILON: f32 = 1e-6;
/// Slack permitted on barycentric coordinates, keeps edge-adjacent hits.
const BARY_EPSILON: f32 = 1e-5;

/// Closest hit recorded along a ray. `distance` starts at the sentinel
/// maximum; whether anything was hit at all is tracked separately by the
/// traversal's return value, never inferred from the sentinel.
#[derive(Copy, Clone, Debug)]
pub struct Intersection {
	pub face_id: Index,
	pub bary: Vec3,
	pub position: Vec3,
	pub distance: f32,
}

impl Intersection {
	pub fn none() -> Intersection {
		Intersection {
			face_id: 0,
			bary: Vec3::zero(),
			position: Vec3::zero(),
			distance: f32::MAX,
		}
	}
}

/// Slab test of a ray against a box given as min/max corners. Tolerates
/// non-unit directions; only the sign and magnitude of each component
/// matter. Accepts only intervals that start before `max_distance` and
/// end in front of the origin.
fn aabb_intersect(bb_min: Vec3, bb_max: Vec3, ray: &Ray, max_distance: f32) -> bool {
	let mut tmin = NEG_INFINITY;
	let mut tmax = INFINITY;
	for axis in Axis::all() {
		let div = 1.0 / ray.direction[axis];
		let (near, far) = if div >= 0.0 {
			((bb_min[axis] - ray.origin[axis]) * div, (bb_max[axis] - ray.origin[axis]) * div)
		} else {
			((bb_max[axis] - ray.origin[axis]) * div, (bb_min[axis] - ray.origin[axis]) * div)
		};
		if near > tmax || tmin > far {
			return false;
		}
		tmin = tmin.max(near);
		tmax = tmax.min(far);
	}
	tmin < max_distance && tmax > 0.0
}

/// Plane/barycentric triangle test. A hit within `max_distance` returns
/// true and replaces `nearest` if strictly closer; a geometric hit beyond
/// the cutoff is a miss.
fn triangle_intersect(mesh: &Mesh, face_id: Index, ray: &Ray, max_distance: f32, nearest: &mut Intersection) -> bool {
	let tri = mesh.triangle(face_id);
	let v0 = tri.vertex(0);
	let u = tri.vertex(1) - v0;
	let v = tri.vertex(2) - v0;
	let n = Vec3::cross(u, v);

	let b = Vec3::dot(n, ray.direction);
	if b.abs() < PARALLEL_EPSILON {
		return false;
	}

	// ray parameter at the plane; negative means behind the origin
	let a = -Vec3::dot(n, ray.origin - v0);
	let r = a / b;
	if r < 0.0 {
		return false;
	}

	let point = ray.point_at(r);

	let uu = Vec3::dot(u, u);
	let uv = Vec3::dot(u, v);
	let vv = Vec3::dot(v, v);
	let w = point - v0;
	let wu = Vec3::dot(w, u);
	let wv = Vec3::dot(w, v);
	let d = uv * uv - uu * vv;

	let s = (uv * wv - vv * wu) / d;
	if s < -BARY_EPSILON || s > 1.0 + BARY_EPSILON {
		return false;
	}
	let t = (uv * wu - uu * wv) / d;
	if t < -BARY_EPSILON || s + t > 1.0 + BARY_EPSILON {
		return false;
	}

	let distance = (point - ray.origin).length();
	if distance >= max_distance {
		return false;
	}
	if distance < nearest.distance {
		*nearest = Intersection {
			face_id,
			bary: Vec3::new(1.0 - s - t, s, t),
			position: point,
			distance,
		};
	}
	true
}

/// Walk the flattened hierarchy front to back. A node whose box misses is
/// skipped together with its whole subtree; the parallel triangle cursor
/// advances by the subtree's leaf count, (size + 1) / 2, so leaves keep
/// lining up with `order`.
pub fn scene_intersect(bvh: &Bvh, mesh: &Mesh, ray: &Ray, max_distance: f32, nearest: &mut Intersection) -> bool {
	let node_count = bvh.node_count();
	let mut any_hit = false;
	let mut tri_cursor = 0;
	let mut i = 0;
	while i < node_count {
		let subtree = bvh.nodes[i] as usize;
		if !aabb_intersect(bvh.aabbs[2 * i], bvh.aabbs[2 * i + 1], ray, max_distance) {
			tri_cursor += (subtree + 1) / 2;
			i += subtree;
		} else {
			if subtree == 1 {
				any_hit |= triangle_intersect(mesh, bvh.order[tri_cursor], ray, max_distance, nearest);
				tri_cursor += 1;
			}
			i += 1;
		}
	}
	any_hit
}

/// Interpolate the three vertex normals at a hit and re-normalize. A
/// zero-length result (degenerate geometry all around) is returned as-is;
/// normalizing it would produce NaNs.
pub fn smooth_normal(mesh: &Mesh, its: &Intersection) -> Vec3 {
	let f = its.face_id as usize * 3;
	let n0 = mesh.vnormals[mesh.faces[f] as usize];
	let n1 = mesh.vnormals[mesh.faces[f + 1] as usize];
	let n2 = mesh.vnormals[mesh.faces[f + 2] as usize];
	let n = n0 * its.bary.x + n1 * its.bary.y + n2 * its.bary.z;

	let length = n.length();
	if length > 0.0 { n / length } else { n }
}

/// Headlamp diffuse term: the primary ray doubles as the light direction.
pub fn shading(ray: &Ray, normal: Vec3) -> f32 {
	Vec3::dot(normal, ray.direction).abs().min(1.0)
}
