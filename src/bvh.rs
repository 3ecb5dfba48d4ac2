use crate::math::*;
use crate::mesh::{Index, Mesh};

const TRAVERSAL_COST: f32 = 1.0;
const INTERSECTION_COST: f32 = 1.0;

/// How to partition a face set at each interior node.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum SplitStrategy {
	/// Bisect the centroid bounding box along its longest axis.
	LongestAxis,
	/// Full-sweep surface area heuristic over all three axes.
	SurfaceAreaHeuristic,
}

/// Flattened bounding volume hierarchy.
///
/// `nodes[i]` is the node count of the subtree rooted at slot `i` (a leaf
/// iff it is 1); the subtree occupies slots `i..i+nodes[i]`, left child
/// first. `aabbs` stores every node's box as two consecutive `Vec3`s
/// (min at `2i`, max at `2i+1`). `order` lists the leaf triangles' face
/// IDs in leaf order, which parallels the in-order position of leaves in
/// `nodes`.
pub struct Bvh {
	pub order: Vec<Index>,
	pub nodes: Vec<u32>,
	pub aabbs: Vec<Vec3>,
}

impl Bvh {
	/// Build the hierarchy for a mesh, one triangle per leaf.
	pub fn build(mesh: &Mesh, strategy: SplitStrategy) -> Bvh {
		let n = mesh.face_count();
		let face_ids: Vec<Index> = (0..n as Index).collect();

		// a binary tree over n leaves has 2n-1 nodes; trimmed below
		let slots = if n == 0 { 1 } else { 2 * n - 1 };
		let mut bvh = Bvh {
			order: Vec::with_capacity(n),
			nodes: vec![0; slots],
			aabbs: vec![Vec3::zero(); slots * 2],
		};
		build_node(mesh, strategy, face_ids, 0, &mut bvh);

		let used = bvh.nodes[0] as usize;
		bvh.nodes.truncate(used);
		bvh.aabbs.truncate(used * 2);
		bvh
	}

	pub fn node_count(&self) -> usize {
		self.nodes[0] as usize
	}

	pub fn node_aabb(&self, i: usize) -> AABB {
		AABB { min: self.aabbs[2 * i], max: self.aabbs[2 * i + 1] }
	}
}

/// Write the node for `face_ids` into `slot` and return its subtree size.
fn build_node(mesh: &Mesh, strategy: SplitStrategy, face_ids: Vec<Index>, slot: usize, out: &mut Bvh) -> u32 {
	if face_ids.len() <= 1 {
		let mut bb = AABB::empty();
		for &f in &face_ids {
			let tri = mesh.triangle(f);
			bb.merge(&tri.aabb());
			out.order.push(tri.face_id());
		}
		out.aabbs[2 * slot] = bb.min;
		out.aabbs[2 * slot + 1] = bb.max;
		out.nodes[slot] = 1;
		return 1;
	}

	let (left, right, bb) = match strategy {
		SplitStrategy::LongestAxis => split_longest_axis(mesh, face_ids),
		SplitStrategy::SurfaceAreaHeuristic => split_sah(mesh, face_ids),
	};
	assert!(
		!left.is_empty() && !right.is_empty(),
		"BVH split produced an empty side"
	);

	out.aabbs[2 * slot] = bb.min;
	out.aabbs[2 * slot + 1] = bb.max;

	let l = build_node(mesh, strategy, left, slot + 1, out);
	let r = build_node(mesh, strategy, right, slot + 1 + l as usize, out);
	out.nodes[slot] = l + r + 1;
	l + r + 1
}

/// Bisect along the longest axis of the centroid box. Returns the two face
/// sets and the box of the triangles themselves (which bounds the node).
fn split_longest_axis(mesh: &Mesh, face_ids: Vec<Index>) -> (Vec<Index>, Vec<Index>, AABB) {
	let mut bb = AABB::empty();
	let mut bb_centroid = AABB::empty();
	for &f in &face_ids {
		let tri = mesh.triangle(f);
		bb.merge(&tri.aabb());
		bb_centroid.merge_point(tri.centroid());
	}

	// shrink the centroid box to its lower half along the split axis
	let axis = bb_centroid.longest_axis();
	bb_centroid.max[axis] = (bb_centroid.max[axis] + bb_centroid.min[axis]) / 2.0;

	let mut left = Vec::with_capacity(face_ids.len());
	let mut right = Vec::with_capacity(face_ids.len());
	for &f in &face_ids {
		if bb_centroid.contains(mesh.triangle(f).centroid()) {
			left.push(f);
		} else {
			right.push(f);
		}
	}

	// a degenerate centroid spread can starve one side; move one face over
	if left.is_empty() {
		if let Some(f) = right.pop() {
			left.push(f);
		}
	} else if right.is_empty() {
		if let Some(f) = left.pop() {
			right.push(f);
		}
	}

	(left, right, bb)
}

/// Sweep all split positions on all three axes and cut at the cheapest
/// one, where cost is the surface-area-weighted count of triangle tests.
fn split_sah(mesh: &Mesh, mut face_ids: Vec<Index>) -> (Vec<Index>, Vec<Index>, AABB) {
	let n = face_ids.len();
	let mut left_areas = vec![0.0f32; n];

	let mut bb = AABB::empty();
	let mut best_cost = INFINITY;
	let mut best_axis = Axis::X;
	let mut best_pos = 1;

	for axis in Axis::all() {
		sort_by_centroid(mesh, &mut face_ids, axis);

		// left-to-right pass: surface areas of the growing prefix box
		let mut left_bb = AABB::empty();
		for (i, &f) in face_ids.iter().enumerate() {
			left_bb.merge(&mesh.triangle(f).aabb());
			left_areas[i] = left_bb.surface_area();
		}
		// the full prefix box bounds the node; identical on every axis
		if axis == Axis::X {
			bb = left_bb;
		}
		let inv_area = 1.0 / bb.surface_area();

		// right-to-left pass: grow the suffix box and score each split
		// position, leaving at least one face on each side
		let mut right_bb = mesh.triangle(face_ids[n - 1]).aabb();
		for i in (1..n - 1).rev() {
			right_bb.merge(&mesh.triangle(face_ids[i]).aabb());
			let cost = TRAVERSAL_COST
				+ left_areas[i - 1] * inv_area * i as f32 * INTERSECTION_COST
				+ right_bb.surface_area() * inv_area * (n - i) as f32 * INTERSECTION_COST;
			if cost < best_cost {
				best_cost = cost;
				best_axis = axis;
				best_pos = i;
			}
		}
	}

	// the face list is still sorted by the last axis swept
	if best_axis != Axis::Z {
		sort_by_centroid(mesh, &mut face_ids, best_axis);
	}
	let right = face_ids.split_off(best_pos);
	(face_ids, right, bb)
}

fn sort_by_centroid(mesh: &Mesh, face_ids: &mut [Index], axis: Axis) {
	face_ids.sort_by(|&a, &b| {
		let ca = mesh.triangle(a).centroid()[axis];
		let cb = mesh.triangle(b).centroid()[axis];
		ca.partial_cmp(&cb).expect("centroid is NaN")
	});
}
