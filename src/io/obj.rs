//! Wavefront OBJ format support.
//!
//! Reading understands `v`, `vt`, `vn`, `f`, `o` and `g` statements. Faces
//! with more than three corners are fan-triangulated, and negative (relative)
//! indices are resolved. Each `o` or `g` statement starts a new geometry.
//!
//! OBJ indexes positions, texture coordinates and normals separately, while a
//! [`Geometry`] shares one index across all attributes, so every distinct
//! `v/vt/vn` triple becomes one vertex.
//!
//! Writing emits one `o` block per geometry and, optionally, a `mtllib` /
//! `usemtl` pair pointing at a material written with [`write_mtl`].

use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::{GeometryError, Result};
use crate::geometry::{BufferAttribute, Geometry};

/// Material name used by [`save_with_mtl`] and [`write_mtl`].
pub const MATERIAL_NAME: &str = "triplanar";

/// Load every object from an OBJ file.
///
/// # Example
///
/// ```no_run
/// use triplanar::io::obj;
///
/// let geometries = obj::load("stall.obj").unwrap();
/// ```
pub fn load<P: AsRef<Path>>(path: P) -> Result<Vec<Geometry>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    parse(BufReader::new(file), path)
}

/// Read every object from OBJ text.
pub fn read<R: BufRead>(reader: R) -> Result<Vec<Geometry>> {
    parse(reader, Path::new("<stream>"))
}

pub(crate) fn read_from(bytes: &[u8], source: &Path) -> Result<Vec<Geometry>> {
    parse(bytes, source)
}

/// A `v/vt/vn` corner with zero-based indices.
type Corner = (usize, Option<usize>, Option<usize>);

/// The object currently being assembled.
#[derive(Default)]
struct Group {
    name: Option<String>,
    corners: HashMap<Corner, u32>,
    positions: Vec<f64>,
    uvs: Vec<f64>,
    normals: Vec<f64>,
    indices: Vec<u32>,
    all_uv: bool,
    all_normal: bool,
}

impl Group {
    fn named(name: Option<String>) -> Self {
        Self {
            name,
            all_uv: true,
            all_normal: true,
            ..Default::default()
        }
    }

    fn vertex(&mut self, corner: Corner, pools: &Pools) -> u32 {
        if let Some(&index) = self.corners.get(&corner) {
            return index;
        }

        let (v, vt, vn) = corner;
        let index = (self.positions.len() / 3) as u32;
        self.positions.extend_from_slice(&pools.positions[v]);
        match vt {
            Some(vt) => self.uvs.extend_from_slice(&pools.tex_coords[vt]),
            None => {
                self.all_uv = false;
                self.uvs.extend_from_slice(&[0.0, 0.0]);
            }
        }
        match vn {
            Some(vn) => self.normals.extend_from_slice(&pools.normals[vn]),
            None => {
                self.all_normal = false;
                self.normals.extend_from_slice(&[0.0, 0.0, 0.0]);
            }
        }
        self.corners.insert(corner, index);
        index
    }

    fn finish(self) -> Result<Option<Geometry>> {
        if self.indices.is_empty() {
            return Ok(None);
        }

        let mut geometry = Geometry::new(BufferAttribute::new(self.positions, 3)?)?;
        if self.all_normal {
            geometry = geometry.with_normal(BufferAttribute::new(self.normals, 3)?);
        }
        if self.all_uv {
            geometry = geometry.with_uv(BufferAttribute::new(self.uvs, 2)?);
        }
        geometry = geometry.with_index(self.indices);
        geometry.set_name(self.name);
        Ok(Some(geometry))
    }
}

/// File-wide attribute pools; OBJ indices refer to these across objects.
#[derive(Default)]
struct Pools {
    positions: Vec<[f64; 3]>,
    tex_coords: Vec<[f64; 2]>,
    normals: Vec<[f64; 3]>,
}

fn parse<R: BufRead>(reader: R, source: &Path) -> Result<Vec<Geometry>> {
    let mut pools = Pools::default();
    let mut group = Group::named(None);
    let mut geometries = Vec::new();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let error = |message: String| {
            GeometryError::load(source, format!("line {}: {}", line_number + 1, message))
        };

        let mut parts = line.split_whitespace();
        let keyword = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        match keyword {
            "v" => pools.positions.push(parse_floats::<3>(&args).map_err(error)?),
            "vt" => pools.tex_coords.push(parse_tex_coord(&args).map_err(error)?),
            "vn" => pools.normals.push(parse_floats::<3>(&args).map_err(error)?),
            "o" | "g" => {
                let name = (!args.is_empty()).then(|| args.join(" "));
                let previous = std::mem::replace(&mut group, Group::named(name));
                if let Some(geometry) = previous.finish()? {
                    geometries.push(geometry);
                }
            }
            "f" => {
                if args.len() < 3 {
                    return Err(error(format!("face has {} corners", args.len())));
                }
                let corners = args
                    .iter()
                    .map(|token| parse_corner(token, &pools))
                    .collect::<std::result::Result<Vec<Corner>, String>>()
                    .map_err(error)?;

                let first = group.vertex(corners[0], &pools);
                for pair in corners[1..].windows(2) {
                    let b = group.vertex(pair[0], &pools);
                    let c = group.vertex(pair[1], &pools);
                    group.indices.extend_from_slice(&[first, b, c]);
                }
            }
            _ => {
                // Materials, smoothing groups, lines and curves do not affect geometry.
            }
        }
    }

    if let Some(geometry) = group.finish()? {
        geometries.push(geometry);
    }

    if geometries.is_empty() {
        return Err(GeometryError::load(source, "OBJ file contains no faces"));
    }

    for geometry in &geometries {
        geometry.validate()?;
    }
    Ok(geometries)
}

fn parse_floats<const N: usize>(args: &[&str]) -> std::result::Result<[f64; N], String> {
    if args.len() < N {
        return Err(format!("expected {} components, found {}", N, args.len()));
    }
    let mut out = [0.0; N];
    for (slot, arg) in out.iter_mut().zip(args) {
        *slot = arg
            .parse()
            .map_err(|_| format!("invalid number `{}`", arg))?;
    }
    Ok(out)
}

/// Parse `vt u [v [w]]`; a missing `v` is 0 and `w` is dropped.
fn parse_tex_coord(args: &[&str]) -> std::result::Result<[f64; 2], String> {
    match args.len() {
        1 => Ok([parse_floats::<1>(args)?[0], 0.0]),
        2 | 3 => parse_floats::<2>(args),
        n => Err(format!("expected 1 to 3 components, found {}", n)),
    }
}

/// Parse one `v`, `v/vt`, `v//vn` or `v/vt/vn` face token.
fn parse_corner(token: &str, pools: &Pools) -> std::result::Result<Corner, String> {
    let mut fields = token.split('/');
    let v = fields
        .next()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| format!("face corner `{}` has no position", token))?;
    let v = resolve_index(v, pools.positions.len())?;

    let vt = match fields.next().filter(|s| !s.is_empty()) {
        Some(s) => Some(resolve_index(s, pools.tex_coords.len())?),
        None => None,
    };
    let vn = match fields.next().filter(|s| !s.is_empty()) {
        Some(s) => Some(resolve_index(s, pools.normals.len())?),
        None => None,
    };
    Ok((v, vt, vn))
}

/// Convert a one-based (or negative, relative) OBJ index to zero-based.
fn resolve_index(token: &str, len: usize) -> std::result::Result<usize, String> {
    let raw: i64 = token
        .parse()
        .map_err(|_| format!("invalid index `{}`", token))?;
    let resolved = if raw > 0 {
        raw - 1
    } else if raw < 0 {
        len as i64 + raw
    } else {
        -1
    };
    if resolved < 0 || resolved >= len as i64 {
        return Err(format!("index {} out of range (have {})", raw, len));
    }
    Ok(resolved as usize)
}

/// Write geometries as OBJ text.
///
/// When `mtl` names a material library, the output references it and assigns
/// [`MATERIAL_NAME`] to every object.
pub fn write<W: Write>(writer: &mut W, geometries: &[Geometry], mtl: Option<&str>) -> Result<()> {
    for geometry in geometries {
        geometry.validate()?;
    }

    writeln!(writer, "# triplanar OBJ export")?;
    if let Some(mtl) = mtl {
        writeln!(writer, "mtllib {}", mtl)?;
    }

    let mut v_offset = 1;
    let mut vt_offset = 1;
    let mut vn_offset = 1;

    for (i, geometry) in geometries.iter().enumerate() {
        match geometry.name() {
            Some(name) => writeln!(writer, "o {}", name)?,
            None => writeln!(writer, "o geometry{}", i)?,
        }
        if mtl.is_some() {
            writeln!(writer, "usemtl {}", MATERIAL_NAME)?;
        }

        let position = geometry.position();
        for v in 0..position.count() {
            writeln!(
                writer,
                "v {} {} {}",
                position.get_x(v),
                position.get_y(v),
                position.get_z(v)
            )?;
        }
        if let Some(uv) = geometry.uv() {
            for v in 0..uv.count() {
                writeln!(writer, "vt {} {}", uv.get_x(v), uv.get_y(v))?;
            }
        }
        if let Some(normal) = geometry.normal() {
            for v in 0..normal.count() {
                writeln!(
                    writer,
                    "vn {} {} {}",
                    normal.get_x(v),
                    normal.get_y(v),
                    normal.get_z(v)
                )?;
            }
        }

        let has_uv = geometry.uv().is_some();
        let has_normal = geometry.normal().is_some();
        let corner = |v: usize| match (has_uv, has_normal) {
            (true, true) => format!("{}/{}/{}", v + v_offset, v + vt_offset, v + vn_offset),
            (true, false) => format!("{}/{}", v + v_offset, v + vt_offset),
            (false, true) => format!("{}//{}", v + v_offset, v + vn_offset),
            (false, false) => format!("{}", v + v_offset),
        };
        for [a, b, c] in geometry.triangles() {
            writeln!(writer, "f {} {} {}", corner(a), corner(b), corner(c))?;
        }

        let count = geometry.vertex_count();
        v_offset += count;
        if has_uv {
            vt_offset += count;
        }
        if has_normal {
            vn_offset += count;
        }
    }

    Ok(())
}

/// Save geometries to an OBJ file.
pub fn save<P: AsRef<Path>>(geometries: &[Geometry], path: P) -> Result<()> {
    save_impl(geometries, path.as_ref(), None)
}

/// Save geometries to an OBJ file that references a material library.
///
/// The `.mtl` file itself is written separately with [`write_mtl`].
pub fn save_with_mtl<P: AsRef<Path>>(geometries: &[Geometry], path: P, mtl: &str) -> Result<()> {
    save_impl(geometries, path.as_ref(), Some(mtl))
}

fn save_impl(geometries: &[Geometry], path: &Path, mtl: Option<&str>) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write(&mut writer, geometries, mtl)?;
    writer.flush()?;

    log::info!(
        "saved {} geometries to {}",
        geometries.len(),
        path.display()
    );
    Ok(())
}

/// Write a material library with a single repeating diffuse texture.
///
/// `texture` is written verbatim, so it should be relative to the `.mtl` file.
///
/// # Example
///
/// ```no_run
/// use triplanar::io::obj;
///
/// obj::write_mtl("stall.mtl", "images/concrete.jpg").unwrap();
/// ```
pub fn write_mtl<P: AsRef<Path>>(path: P, texture: &str) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    writeln!(writer, "# triplanar material")?;
    writeln!(writer, "newmtl {}", MATERIAL_NAME)?;
    writeln!(writer, "Ka 1.0 1.0 1.0")?;
    writeln!(writer, "Kd 1.0 1.0 1.0")?;
    writeln!(writer, "Ks 0.0 0.0 0.0")?;
    writeln!(writer, "map_Kd {}", texture)?;
    writer.flush()?;
    Ok(())
}
