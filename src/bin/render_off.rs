use anyhow::Result;
use clap::{Parser, ValueEnum};
use time::PreciseTime;

use aotrace::bvh::{Bvh, SplitStrategy};
use aotrace::mesh::compute_vertex_normals;
use aotrace::{downsample, off, render, write_image, AoMethod, Options};

/// Renders an ambient-occlusion shaded view of a triangle mesh in OFF format.
#[derive(Parser)]
#[command(name = "render_off")]
struct Cli {
	/// Input mesh in OFF format
	input_mesh: String,
	/// Output image; .pgm/.ppm are written directly, other extensions go
	/// through the image crate
	output_image: String,
	/// Width of the output image
	#[arg(short, long, default_value_t = 600)]
	width: usize,
	/// Height of the output image
	#[arg(short = 'H', long, default_value_t = 600)]
	height: usize,
	/// Number of samples used for ambient occlusion; 0 disables it
	#[arg(short = 'a', long = "ambient-occlusion-samples", default_value_t = 3)]
	ao_samples: u32,
	/// Maximum distance allowed for ambient occlusion rays; about 10% of
	/// the scene extent works well
	#[arg(short = 'd', long = "ambient-occlusion-max-distance", default_value_t = 0.2)]
	ao_max_distance: f32,
	/// Method of ambient occlusion
	#[arg(short = 'm', long = "ambient-occlusion-method", value_enum, default_value = "uniform")]
	ao_method: MethodArg,
	/// Focal length of the virtual camera
	#[arg(short, long, default_value_t = 1.0)]
	focal_length: f32,
	/// Number of supersamples per output pixel
	#[arg(short, long, default_value_t = 4)]
	supersamples: u32,
	/// Strategy of BVH construction
	#[arg(short = 'r', long = "bvh-strategy", value_enum, default_value = "longest")]
	bvh_strategy: StrategyArg,
	/// Disable the diffuse shading term
	#[arg(long)]
	no_shading: bool,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum MethodArg {
	Uniform,
	Random,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum StrategyArg {
	Longest,
	Sah,
}

fn seconds(start: PreciseTime) -> f32 {
	start.to(PreciseTime::now()).num_milliseconds() as f32 / 1000.0
}

/// Rays the uniform method will cast per shading point, mirroring the
/// ring geometry of the sampler.
fn uniform_ray_count(circles: u32, alpha_min: f32, alpha_max: f32) -> u32 {
	let step = alpha_max.to_radians() / circles as f32;
	(0..circles)
		.map(|c| {
			let angle = step * c as f32 + alpha_min.to_radians();
			(2.0 * std::f32::consts::PI * angle.cos() / step) as u32
		})
		.sum()
}

fn main() -> Result<()> {
	let cli = Cli::parse();

	let opts = Options {
		width: cli.width,
		height: cli.height,
		focal_length: cli.focal_length,
		supersamples: cli.supersamples,
		shading: !cli.no_shading,
		ao: cli.ao_samples != 0,
		ao_max_distance: cli.ao_max_distance,
		ao_samples: cli.ao_samples,
		ao_method: match cli.ao_method {
			MethodArg::Uniform => AoMethod::Uniform,
			MethodArg::Random => AoMethod::Random,
		},
		bvh_strategy: match cli.bvh_strategy {
			StrategyArg::Longest => SplitStrategy::LongestAxis,
			StrategyArg::Sah => SplitStrategy::SurfaceAreaHeuristic,
		},
		..Options::default()
	};

	println!("Reading input mesh {}...", cli.input_mesh);
	let mut mesh = off::load(&cli.input_mesh)?;
	let stats = compute_vertex_normals(&mut mesh);
	if stats.any() {
		println!(
			"Warning: zero-length normals: {} face normals, {} vertex normals",
			stats.zero_face_normals, stats.zero_vertex_normals
		);
	}
	println!("- Vertices:  {}", mesh.vertices.len());
	println!("- Triangles: {}", mesh.face_count());

	if opts.ao && opts.ao_method == AoMethod::Uniform {
		let rays = uniform_ray_count(opts.ao_samples, opts.ao_alpha_min, opts.ao_alpha_max);
		println!(
			"Note: uniform AO with {} circles casts about {} rays per shading point; \
			 it converges with far fewer rays than the randomized method needs",
			opts.ao_samples, rays
		);
	}

	let start = PreciseTime::now();
	let bvh = Bvh::build(&mesh, opts.bvh_strategy);
	println!("Built BVH with {} nodes in {:.3}s", bvh.node_count(), seconds(start));

	let start = PreciseTime::now();
	println!(
		"Rendering {}x{} pixels with {} supersamples...",
		opts.width, opts.height, opts.supersamples
	);
	let values = render(&opts, &mesh, &bvh);
	println!("Rendered in {:.3}s", seconds(start));

	let image = downsample(&opts, &values);
	write_image(&cli.output_image, opts.width, opts.height, &image)?;
	println!("Wrote {}", cli.output_image);

	Ok(())
}
