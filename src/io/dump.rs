//! Plain-text field dumps for offline visualization.
//!
//! Each dump writes one line per entity: the entity's representative
//! position (circumcenter for cells, midpoint for edges, the node itself
//! for nodes) followed by the field value. The triplot export writes the
//! `<prefix>T.txt` / `<prefix>P.txt` / `<prefix>C.txt` triple (1-based
//! connectivity, node coordinates, per-cell values) that Octave/gnuplot
//! triplot scripts consume.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use thiserror::Error;

use crate::fields::{Field, Location};
use crate::geometry::GeometricFactors;
use crate::mesh::TriMesh;

/// Errors from writing dump files.
#[derive(Debug, Error)]
pub enum DumpError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Field attached to the wrong entity class for this dump.
    #[error("expected a {expected:?} field, got a {got:?} field")]
    WrongLocation { expected: Location, got: Location },
}

fn expect_location(field: &Field, expected: Location) -> Result<(), DumpError> {
    if field.location() == expected {
        Ok(())
    } else {
        Err(DumpError::WrongLocation {
            expected,
            got: field.location(),
        })
    }
}

/// Write a cell field at cell circumcenters: `x y value` per line.
pub fn dump_cell_field(
    path: impl AsRef<Path>,
    geom: &GeometricFactors,
    field: &Field,
    level: usize,
) -> Result<(), DumpError> {
    expect_location(field, Location::Cell)?;
    let mut out = BufWriter::new(File::create(path)?);
    for cell in 0..field.n_entities() {
        let p = geom.circumcenter[cell];
        writeln!(out, "{} {} {}", p.x, p.y, field.get(cell, level))?;
    }
    Ok(())
}

/// Write an edge field at edge midpoints: `x y value` per line.
///
/// Non-finite values (possible on boundary edges of fields that are only
/// meaningful on interior edges) are written as 0.
pub fn dump_edge_field(
    path: impl AsRef<Path>,
    geom: &GeometricFactors,
    field: &Field,
    level: usize,
) -> Result<(), DumpError> {
    expect_location(field, Location::Edge)?;
    let mut out = BufWriter::new(File::create(path)?);
    for edge in 0..field.n_entities() {
        let p = geom.edge_midpoint[edge];
        let v = field.get(edge, level);
        let v = if v.is_finite() { v } else { 0.0 };
        writeln!(out, "{} {} {}", p.x, p.y, v)?;
    }
    Ok(())
}

/// Write per-node values: `x y value` per line.
///
/// The slice must hold one value per node.
pub fn dump_node_field(
    path: impl AsRef<Path>,
    mesh: &TriMesh,
    values: &[f64],
) -> Result<(), DumpError> {
    let mut out = BufWriter::new(File::create(path)?);
    for (node, &v) in values.iter().enumerate() {
        let p = mesh.positions[node];
        writeln!(out, "{} {} {}", p.x, p.y, v)?;
    }
    Ok(())
}

/// Average a cell field onto nodes and write one value per line.
pub fn dump_cell_field_on_nodes(
    path: impl AsRef<Path>,
    mesh: &TriMesh,
    field: &Field,
    level: usize,
) -> Result<(), DumpError> {
    expect_location(field, Location::Cell)?;
    let mut out = BufWriter::new(File::create(path)?);
    for cells in &mesh.node_cells {
        let mut v = 0.0;
        for &c in cells {
            v += field.get(c, level);
        }
        if !cells.is_empty() {
            v /= cells.len() as f64;
        }
        writeln!(out, "{}", v)?;
    }
    Ok(())
}

/// Write the triplot triple for a cell field.
///
/// Produces `<prefix>T.txt` (1-based cell-node connectivity),
/// `<prefix>P.txt` (node coordinates) and `<prefix>C.txt` (cell values at
/// `level`).
pub fn dump_mesh_triplot(
    prefix: &str,
    mesh: &TriMesh,
    field: &Field,
    level: usize,
) -> Result<(), DumpError> {
    expect_location(field, Location::Cell)?;

    let mut t = BufWriter::new(File::create(format!("{}T.txt", prefix))?);
    for nodes in &mesh.cell_nodes {
        writeln!(t, "{} {} {}", nodes[0] + 1, nodes[1] + 1, nodes[2] + 1)?;
    }

    let mut p = BufWriter::new(File::create(format!("{}P.txt", prefix))?);
    for pos in &mesh.positions {
        writeln!(p, "{} {}", pos.x, pos.y)?;
    }

    let mut c = BufWriter::new(File::create(format!("{}C.txt", prefix))?);
    for cell in 0..field.n_entities() {
        writeln!(c, "{}", field.get(cell, level))?;
    }

    Ok(())
}
