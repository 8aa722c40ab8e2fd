use std::{
    fs::File,
    io::{BufWriter, Write},
    path::Path,
};

use pcd_core::pointcloud::point::PointCloud;

use crate::ExportError;

pub mod csv;
pub mod ply;
pub mod xyz;

pub trait PointCloudWriter {
    fn write(&self, point_cloud: &PointCloud, out: &mut dyn Write) -> Result<(), ExportError>;
}

/// Picks a writer from the extension of `path`.
pub fn writer_for(path: &Path) -> Result<Box<dyn PointCloudWriter>, ExportError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.to_ascii_lowercase())
        .ok_or_else(|| ExportError::UnsupportedExtension(path.display().to_string()))?;

    let writer: Box<dyn PointCloudWriter> = match extension.as_str() {
        "ply" => Box::new(ply::PlyWriter::default()),
        "xyz" => Box::new(xyz::XyzWriter::new(xyz::XyzColumns::Positions)),
        "xyzn" => Box::new(xyz::XyzWriter::new(xyz::XyzColumns::PositionsNormals)),
        "xyzrgb" => Box::new(xyz::XyzWriter::new(xyz::XyzColumns::PositionsColors)),
        "csv" => Box::new(csv::CsvWriter),
        other => return Err(ExportError::UnsupportedExtension(other.to_string())),
    };
    Ok(writer)
}

/// Writes `point_cloud` to `path`, replacing any existing file.
pub fn write_point_cloud(path: &Path, point_cloud: &PointCloud) -> Result<(), ExportError> {
    let writer = writer_for(path)?;
    let file = File::create(path).map_err(|e| ExportError::open(path, e))?;
    let mut out = BufWriter::new(file);
    writer.write(point_cloud, &mut out)?;
    out.flush()?;
    log::info!("wrote {} points to {}", point_cloud.len(), path.display());
    Ok(())
}
