//! Mesh output implementation
use super::Mesh;
use serde::Deserialize;
use std::io::{BufWriter, Write};

/// File format written by [`Mesh::write`]
#[derive(
    Copy,
    Clone,
    Debug,
    Default,
    Eq,
    PartialEq,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    /// Stereolithography
    #[default]
    Stl,
    /// Wavefront OBJ
    Obj,
    /// Stanford polygon file
    Ply,
}

impl ExportFormat {
    /// Typical file extension
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Stl => "stl",
            ExportFormat::Obj => "obj",
            ExportFormat::Ply => "ply",
        }
    }
}

impl Mesh {
    /// Writes the mesh in the given format
    ///
    /// `binary` selects between the binary and ASCII flavors of STL and PLY;
    /// OBJ is always ASCII.
    pub fn write<F: std::io::Write>(
        &self,
        out: &mut F,
        format: ExportFormat,
        binary: bool,
    ) -> Result<(), crate::Error> {
        match (format, binary) {
            (ExportFormat::Stl, true) => self.write_stl(out),
            (ExportFormat::Stl, false) => self.write_stl_ascii(out),
            (ExportFormat::Obj, _) => self.write_obj(out),
            (ExportFormat::Ply, b) => self.write_ply(out, b),
        }
    }

    fn normal(&self, t: &nalgebra::Vector3<usize>) -> nalgebra::Vector3<f32> {
        // Not the _best_ way to calculate a normal, but good enough
        let a = self.vertices[t.x];
        let b = self.vertices[t.y];
        let c = self.vertices[t.z];
        let ab = b - a;
        let ac = c - a;
        ab.cross(&ac)
    }

    /// Writes a binary STL to the given output
    pub fn write_stl<F: std::io::Write>(
        &self,
        out: &mut F,
    ) -> Result<(), crate::Error> {
        // We're going to do many small writes and will typically be writing to
        // a file, so using a `BufWriter` saves excessive syscalls.
        let mut out = BufWriter::new(out);
        const HEADER: &[u8] = b"This is a binary STL file exported by vrmlx";
        static_assertions::const_assert!(HEADER.len() <= 80);
        out.write_all(HEADER)?;
        out.write_all(&[0u8; 80 - HEADER.len()])?;
        out.write_all(&(self.triangles.len() as u32).to_le_bytes())?;
        for t in &self.triangles {
            for p in &self.normal(t) {
                out.write_all(&p.to_le_bytes())?;
            }
            for v in t {
                for p in &self.vertices[*v] {
                    out.write_all(&p.to_le_bytes())?;
                }
            }
            out.write_all(&[0u8; std::mem::size_of::<u16>()])?; // attributes
        }
        out.flush()?;
        Ok(())
    }

    /// Writes an ASCII STL to the given output
    pub fn write_stl_ascii<F: std::io::Write>(
        &self,
        out: &mut F,
    ) -> Result<(), crate::Error> {
        let mut out = BufWriter::new(out);
        writeln!(out, "solid vrmlx")?;
        for t in &self.triangles {
            let n = self.normal(t);
            writeln!(out, "  facet normal {} {} {}", n.x, n.y, n.z)?;
            writeln!(out, "    outer loop")?;
            for v in t {
                let p = self.vertices[*v];
                writeln!(out, "      vertex {} {} {}", p.x, p.y, p.z)?;
            }
            writeln!(out, "    endloop")?;
            writeln!(out, "  endfacet")?;
        }
        writeln!(out, "endsolid vrmlx")?;
        out.flush()?;
        Ok(())
    }

    /// Writes a Wavefront OBJ to the given output
    pub fn write_obj<F: std::io::Write>(
        &self,
        out: &mut F,
    ) -> Result<(), crate::Error> {
        let mut out = BufWriter::new(out);
        writeln!(out, "# exported by vrmlx")?;
        for p in &self.vertices {
            writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
        }
        // OBJ indices are 1-based
        for t in &self.triangles {
            writeln!(out, "f {} {} {}", t.x + 1, t.y + 1, t.z + 1)?;
        }
        out.flush()?;
        Ok(())
    }

    /// Writes a PLY file to the given output
    ///
    /// The binary flavor is little-endian.
    pub fn write_ply<F: std::io::Write>(
        &self,
        out: &mut F,
        binary: bool,
    ) -> Result<(), crate::Error> {
        let mut out = BufWriter::new(out);
        let format = if binary {
            "binary_little_endian"
        } else {
            "ascii"
        };
        writeln!(out, "ply")?;
        writeln!(out, "format {format} 1.0")?;
        writeln!(out, "comment exported by vrmlx")?;
        writeln!(out, "element vertex {}", self.vertices.len())?;
        for axis in ["x", "y", "z"] {
            writeln!(out, "property float {axis}")?;
        }
        writeln!(out, "element face {}", self.triangles.len())?;
        writeln!(out, "property list uchar int vertex_indices")?;
        writeln!(out, "end_header")?;
        if binary {
            for p in &self.vertices {
                for c in p {
                    out.write_all(&c.to_le_bytes())?;
                }
            }
            for t in &self.triangles {
                out.write_all(&[3u8])?;
                for v in t {
                    out.write_all(&(*v as i32).to_le_bytes())?;
                }
            }
        } else {
            for p in &self.vertices {
                writeln!(out, "{} {} {}", p.x, p.y, p.z)?;
            }
            for t in &self.triangles {
                writeln!(out, "3 {} {} {}", t.x, t.y, t.z)?;
            }
        }
        out.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use nalgebra::Vector3;

    fn quad() -> Mesh {
        Mesh {
            triangles: vec![Vector3::new(0, 1, 2), Vector3::new(0, 2, 3)],
            vertices: vec![
                Vector3::new(0.0, 0.0, 0.0),
                Vector3::new(1.0, 0.0, 0.0),
                Vector3::new(1.0, 1.0, 0.0),
                Vector3::new(0.0, 1.0, 0.0),
            ],
        }
    }

    #[test]
    fn test_binary_stl_size() {
        let mut out = vec![];
        quad().write_stl(&mut out).unwrap();
        assert_eq!(out.len(), 84 + 50 * 2);
        assert_eq!(&out[80..84], &2u32.to_le_bytes());
    }

    #[test]
    fn test_ascii_stl() {
        let mut out = vec![];
        quad().write(&mut out, ExportFormat::Stl, false).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert!(s.starts_with("solid vrmlx"));
        assert_eq!(s.matches("facet normal").count(), 2);
        assert_eq!(s.matches("vertex").count(), 6);
    }

    #[test]
    fn test_obj() {
        let mut out = vec![];
        quad().write_obj(&mut out).unwrap();
        let s = String::from_utf8(out).unwrap();
        assert_eq!(s.lines().filter(|l| l.starts_with("v ")).count(), 4);
        assert!(s.contains("f 1 3 4"));
    }

    #[test]
    fn test_ply() {
        let mut ascii = vec![];
        quad().write_ply(&mut ascii, false).unwrap();
        let s = String::from_utf8(ascii).unwrap();
        assert!(s.contains("element vertex 4"));
        assert!(s.contains("element face 2"));
        assert!(s.trim_end().ends_with("3 0 2 3"));

        let mut binary = vec![];
        quad().write_ply(&mut binary, true).unwrap();
        let header_end = binary
            .windows(11)
            .position(|w| w == b"end_header\n")
            .unwrap()
            + 11;
        assert_eq!(binary.len() - header_end, 4 * 12 + 2 * 13);
    }

    #[test]
    fn test_format_names() {
        assert_eq!(ExportFormat::Ply.to_string(), "ply");
        assert_eq!("obj".parse::<ExportFormat>().unwrap(), ExportFormat::Obj);
        assert_eq!(ExportFormat::default().extension(), "stl");
    }
}
