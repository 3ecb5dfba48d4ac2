use std::collections::hash_map::DefaultHasher;
use std::env::temp_dir;
use std::fs::{create_dir, read_to_string, File};
use std::hash::{Hash, Hasher};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use anyhow::{anyhow, bail, ensure, Context, Result};

use crate::math::Vec3;
use crate::mesh::{Index, Mesh};

/// Load a triangle mesh in OFF format.
///
/// Parsed meshes are cached in the temp directory, keyed by a hash of the
/// file path; a stale or unreadable cache entry falls through to a fresh
/// parse.
pub fn load<P: AsRef<Path>>(path: P) -> Result<Mesh> {
	let path = path.as_ref();

	let hash = {
		let mut hasher = DefaultHasher::new();
		path.hash(&mut hasher);
		hasher.finish()
	};
	let cache_dir = temp_dir().join("off_cache");
	let cache_file = cache_dir.join(hash.to_string());

	if let Ok(f) = File::open(&cache_file) {
		let mut br = BufReader::new(f);
		if let Ok(mesh) = bincode::deserialize_from(&mut br) {
			println!("Mesh {} found in cache", path.display());
			return Ok(mesh);
		}
		println!("Failed to load cached mesh, re-parsing");
	}

	let text = read_to_string(path)
		.with_context(|| format!("cannot read mesh {}", path.display()))?;
	let mesh = parse(&text)?;

	let _ = create_dir(&cache_dir);
	if let Ok(f) = File::create(&cache_file) {
		let _ = bincode::serialize_into(&mut BufWriter::new(f), &mesh);
	}

	Ok(mesh)
}

/// Write a mesh back out in OFF format.
pub fn save<P: AsRef<Path>>(mesh: &Mesh, path: P) -> Result<()> {
	let f = File::create(path.as_ref())
		.with_context(|| format!("cannot write mesh {}", path.as_ref().display()))?;
	write_off(mesh, &mut BufWriter::new(f))
}

fn parse_token<T: FromStr>(token: Option<&str>) -> Result<T> {
	let token = token.context("truncated OFF file")?;
	token.parse().map_err(|_| anyhow!("invalid OFF token {:?}", token))
}

fn parse(text: &str) -> Result<Mesh> {
	let mut tokens = text.split_whitespace();

	match tokens.next() {
		Some("OFF") => {}
		_ => bail!("file not recognized as an OFF model"),
	}
	let num_vertices: usize = parse_token(tokens.next())?;
	let num_faces: usize = parse_token(tokens.next())?;
	let _num_edges: usize = parse_token(tokens.next())?;

	let mut mesh = Mesh::default();
	mesh.vertices.reserve(num_vertices);
	mesh.faces.reserve(num_faces * 3);

	for _ in 0..num_vertices {
		let x = parse_token(tokens.next())?;
		let y = parse_token(tokens.next())?;
		let z = parse_token(tokens.next())?;
		mesh.vertices.push(Vec3::new(x, y, z));
	}

	for i in 0..num_faces {
		let n: usize = parse_token(tokens.next())?;
		ensure!(n == 3, "face {} has {} vertices, only triangles are supported", i, n);
		let mut vidx = [0 as Index; 3];
		let mut indices_good = true;
		for v in vidx.iter_mut() {
			*v = parse_token(tokens.next())?;
			if *v as usize >= num_vertices {
				println!("Warning: face {} has invalid vertex {}, skipping face", i, *v);
				indices_good = false;
			}
		}
		if indices_good {
			mesh.faces.extend_from_slice(&vidx);
		}
	}

	Ok(mesh)
}

fn write_off<W: Write>(mesh: &Mesh, w: &mut W) -> Result<()> {
	writeln!(w, "OFF")?;
	writeln!(w, "{} {} 0", mesh.vertices.len(), mesh.face_count())?;
	for v in &mesh.vertices {
		writeln!(w, "{:.7} {:.7} {:.7}", v.x, v.y, v.z)?;
	}
	for f in mesh.faces.chunks(3) {
		writeln!(w, "3 {} {} {}", f[0], f[1], f[2])?;
	}
	Ok(())
}
