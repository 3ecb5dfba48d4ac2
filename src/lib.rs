pub mod ao;
pub mod bvh;
pub mod camera;
pub mod intersect;
pub mod math;
pub mod mesh;
pub mod off;

mod warp;

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use rayon::prelude::*;

use crate::ao::{ambient_occlusion_random, ambient_occlusion_uniform};
use crate::bvh::{Bvh, SplitStrategy};
use crate::camera::Camera;
use crate::intersect::{scene_intersect, shading, smooth_normal, Intersection};
use crate::math::Vec3;
use crate::mesh::Mesh;

/// Primary rays are cut off here; scenes are expected to fit well within.
const MAX_SCENE_DISTANCE: f32 = 100_000.0;

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum AoMethod {
	Uniform,
	Random,
}

/// Render configuration, externally supplied (see the render_off binary).
#[derive(Copy, Clone, Debug)]
pub struct Options {
	pub width: usize,
	pub height: usize,
	pub focal_length: f32,
	pub supersamples: u32,
	pub shading: bool,
	pub ao: bool,
	pub ao_max_distance: f32,
	pub ao_samples: u32,
	pub ao_method: AoMethod,
	pub ao_alpha_min: f32,
	pub ao_alpha_max: f32,
	pub bvh_strategy: SplitStrategy,
}

impl Default for Options {
	fn default() -> Options {
		Options {
			width: 600,
			height: 600,
			focal_length: 1.0,
			supersamples: 4,
			shading: true,
			ao: true,
			ao_max_distance: 0.2,
			ao_samples: 3,
			ao_method: AoMethod::Uniform,
			ao_alpha_min: 4.0,
			ao_alpha_max: 90.0,
			bvh_strategy: SplitStrategy::LongestAxis,
		}
	}
}

impl Options {
	/// Side length of the supersample block within each output pixel.
	pub fn supersample_grid(&self) -> usize {
		((self.supersamples as f32).sqrt() as usize).max(1)
	}

	pub fn total_width(&self) -> usize {
		self.width * self.supersample_grid()
	}

	pub fn total_height(&self) -> usize {
		self.height * self.supersample_grid()
	}
}

/// Shade every pixel of the supersampled grid in parallel, one row per
/// work item. Pixels only read the mesh and the hierarchy, so rows are
/// fully independent.
pub fn render(opts: &Options, mesh: &Mesh, bvh: &Bvh) -> Vec<f32> {
	let (width, height) = (opts.total_width(), opts.total_height());
	let camera = Camera::new((width, height), opts.focal_length);
	let mut values = vec![0.0f32; width * height];

	values.par_chunks_mut(width).enumerate().for_each(|(y, row)| {
		for (x, value) in row.iter_mut().enumerate() {
			*value = shade_pixel(opts, mesh, bvh, &camera, x, y);
		}
	});

	values
}

/// Sequential twin of `render`, for tests and debugging.
pub fn render_seq(opts: &Options, mesh: &Mesh, bvh: &Bvh) -> Vec<f32> {
	let (width, height) = (opts.total_width(), opts.total_height());
	let camera = Camera::new((width, height), opts.focal_length);
	let mut values = vec![0.0f32; width * height];

	values.chunks_mut(width).enumerate().for_each(|(y, row)| {
		for (x, value) in row.iter_mut().enumerate() {
			*value = shade_pixel(opts, mesh, bvh, &camera, x, y);
		}
	});

	values
}

fn shade_pixel(opts: &Options, mesh: &Mesh, bvh: &Bvh, camera: &Camera, x: usize, y: usize) -> f32 {
	let ray = camera.make_ray((x, y));

	let mut nearest = Intersection::none();
	if !scene_intersect(bvh, mesh, &ray, MAX_SCENE_DISTANCE, &mut nearest) {
		return 0.0;
	}

	let normal = smooth_normal(mesh, &nearest);
	let mut value = if opts.shading { shading(&ray, normal) } else { 1.0 };

	// a zero-length normal (degenerate geometry) gets no occlusion pass
	if opts.ao && opts.ao_samples > 0 && Vec3::dot(normal, normal) > 0.0 {
		let width = camera.resolution().0;
		let occlusion = match opts.ao_method {
			AoMethod::Uniform => ambient_occlusion_uniform(
				bvh,
				mesh,
				nearest.position,
				normal,
				opts.ao_max_distance,
				opts.ao_samples,
				opts.ao_alpha_min,
				opts.ao_alpha_max,
			),
			AoMethod::Random => ambient_occlusion_random(
				bvh,
				mesh,
				nearest.position,
				normal,
				opts.ao_max_distance,
				opts.ao_samples,
				(y * width + x) as u32,
			),
		};
		value *= occlusion;
	}

	value
}

/// Average each supersample block down to one 8-bit output pixel.
pub fn downsample(opts: &Options, values: &[f32]) -> Vec<u8> {
	let n = opts.supersample_grid();
	let total_width = opts.total_width();
	let mut image = vec![0u8; opts.width * opts.height];

	for y in 0..opts.height {
		for x in 0..opts.width {
			let mut total = 0.0;
			for ss_y in 0..n {
				for ss_x in 0..n {
					total += values[(y * n + ss_y) * total_width + (x * n + ss_x)];
				}
			}
			image[y * opts.width + x] = (total / (n * n) as f32 * 255.0) as u8;
		}
	}

	image
}

/// Write a grayscale image. A `.pgm`/`.ppm` extension gets a netpbm file
/// written directly; everything else goes through the image crate.
pub fn write_image<P: AsRef<Path>>(path: P, width: usize, height: usize, pixels: &[u8]) -> Result<()> {
	let path = path.as_ref();
	match path.extension().and_then(|e| e.to_str()) {
		Some("pgm") | Some("ppm") => write_pgm(path, width, height, pixels),
		_ => image::save_buffer(path, pixels, width as u32, height as u32, image::ColorType::L8)
			.with_context(|| format!("cannot write image {}", path.display())),
	}
}

fn write_pgm(path: &Path, width: usize, height: usize, pixels: &[u8]) -> Result<()> {
	let f = File::create(path)
		.with_context(|| format!("cannot write image {}", path.display()))?;
	let mut f = BufWriter::new(f);
	write!(f, "P5 {} {} 255\n", width, height)?;
	f.write_all(pixels)?;
	Ok(())
}
