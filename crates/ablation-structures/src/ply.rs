//! PLY import and export of triangle meshes.
//!
//! Meshes are written as ASCII PLY with a `vertex` element (`x`, `y`, `z` as
//! float) and a `face` element (`vertex_indices` as a uchar-counted list of
//! uint). Reading accepts any scalar type for coordinates and either
//! `vertex_indices` or `vertex_index` for faces; faces with more than three
//! corners are fan-triangulated.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use ablation_core::error::{PlannerError, Result};
use ablation_core::mesh::TriMesh;
use glam::Vec3;
use ply_rs::parser::Parser;
use ply_rs::ply::{
    Addable, DefaultElement, ElementDef, Encoding, Ply, Property, PropertyDef, PropertyType,
    ScalarType,
};
use ply_rs::writer::Writer;

const FACE_PROPERTY: &str = "vertex_indices";

/// Writes `mesh` as ASCII PLY. Returns the number of bytes written.
pub fn write_ply<W: Write>(mesh: &TriMesh, out: &mut W, comment: Option<&str>) -> Result<usize> {
    let mut ply = Ply::<DefaultElement>::new();
    ply.header.encoding = Encoding::Ascii;
    if let Some(comment) = comment {
        ply.header.comments.push(comment.to_string());
    }

    let mut vertex_element = ElementDef::new("vertex".to_string());
    for axis in ["x", "y", "z"] {
        vertex_element.properties.add(PropertyDef::new(
            axis.to_string(),
            PropertyType::Scalar(ScalarType::Float),
        ));
    }
    ply.header.elements.add(vertex_element);

    let mut face_element = ElementDef::new("face".to_string());
    face_element.properties.add(PropertyDef::new(
        FACE_PROPERTY.to_string(),
        PropertyType::List(ScalarType::UChar, ScalarType::UInt),
    ));
    ply.header.elements.add(face_element);

    let vertices = mesh
        .vertices()
        .iter()
        .map(|v| {
            let mut element = DefaultElement::new();
            element.insert("x".to_string(), Property::Float(v.x));
            element.insert("y".to_string(), Property::Float(v.y));
            element.insert("z".to_string(), Property::Float(v.z));
            element
        })
        .collect();
    ply.payload.insert("vertex".to_string(), vertices);

    let faces = mesh
        .triangles()
        .iter()
        .map(|tri| {
            let mut element = DefaultElement::new();
            element.insert(FACE_PROPERTY.to_string(), Property::ListUInt(tri.to_vec()));
            element
        })
        .collect();
    ply.payload.insert("face".to_string(), faces);

    ply.make_consistent()
        .map_err(|e| PlannerError::PlyError(format!("{e:?}")))?;

    let writer = Writer::new();
    Ok(writer.write_ply(out, &mut ply)?)
}

/// Reads a triangle mesh from PLY (ASCII or binary).
pub fn read_ply<R: Read>(source: &mut R) -> Result<TriMesh> {
    let parser = Parser::<DefaultElement>::new();
    let ply = parser.read_ply(source)?;

    let vertices = ply
        .payload
        .get("vertex")
        .ok_or_else(|| PlannerError::PlyError("missing 'vertex' element".to_string()))?
        .iter()
        .map(|element| {
            Ok(Vec3::new(
                scalar(element, "x")?,
                scalar(element, "y")?,
                scalar(element, "z")?,
            ))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut triangles = Vec::new();
    if let Some(faces) = ply.payload.get("face") {
        for element in faces {
            let corners = indices(element)?;
            if corners.len() < 3 {
                continue;
            }
            for i in 1..corners.len() - 1 {
                triangles.push([corners[0], corners[i], corners[i + 1]]);
            }
        }
    }

    let mesh = TriMesh::new(vertices, triangles);
    if !mesh.indices_in_bounds() {
        return Err(PlannerError::PlyError(
            "face index out of range".to_string(),
        ));
    }
    Ok(mesh)
}

/// Saves a mesh to a PLY file.
pub fn save_ply(mesh: &TriMesh, path: impl AsRef<Path>, comment: Option<&str>) -> Result<usize> {
    let path = path.as_ref();
    let mut out = BufWriter::new(File::create(path)?);
    let written = write_ply(mesh, &mut out, comment)?;
    out.flush()?;
    log::info!("wrote {} ({written} bytes)", path.display());
    Ok(written)
}

/// Loads a mesh from a PLY file.
pub fn load_ply(path: impl AsRef<Path>) -> Result<TriMesh> {
    let mut reader = BufReader::new(File::open(path)?);
    read_ply(&mut reader)
}

#[allow(clippy::cast_possible_truncation)]
fn scalar(element: &DefaultElement, key: &str) -> Result<f32> {
    let value = match element.get(key) {
        Some(Property::Float(v)) => *v,
        Some(Property::Double(v)) => *v as f32,
        Some(Property::Int(v)) => *v as f32,
        Some(Property::UInt(v)) => *v as f32,
        Some(Property::Short(v)) => f32::from(*v),
        Some(Property::UShort(v)) => f32::from(*v),
        Some(Property::Char(v)) => f32::from(*v),
        Some(Property::UChar(v)) => f32::from(*v),
        _ => {
            return Err(PlannerError::PlyError(format!(
                "vertex property '{key}' missing or not a scalar"
            )))
        }
    };
    Ok(value)
}

fn indices(element: &DefaultElement) -> Result<Vec<u32>> {
    let property = element
        .get(FACE_PROPERTY)
        .or_else(|| element.get("vertex_index"));
    let negative = || PlannerError::PlyError("negative face index".to_string());
    match property {
        Some(Property::ListUInt(v)) => Ok(v.clone()),
        Some(Property::ListInt(v)) => v
            .iter()
            .map(|&i| u32::try_from(i).map_err(|_| negative()))
            .collect(),
        Some(Property::ListUShort(v)) => Ok(v.iter().map(|&i| u32::from(i)).collect()),
        Some(Property::ListUChar(v)) => Ok(v.iter().map(|&i| u32::from(i)).collect()),
        _ => Err(PlannerError::PlyError(
            "face element has no vertex index list".to_string(),
        )),
    }
}
