use std::{fs::File, io::BufReader, path::Path, path::PathBuf};

use pcd_core::pointcloud::point::PointCloud;

use crate::ParseError;

pub mod csv;
pub mod las;
pub mod ply;
pub mod xyz;

pub trait ParserProvider {
    fn get_parser(&self) -> Box<dyn Parser>;
}

pub trait Parser {
    fn parse(&self) -> Result<PointCloud, ParseError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extension {
    Ply,
    Xyz,
    Xyzn,
    Xyzrgb,
    Csv,
    Txt,
    Las,
    Laz,
}

pub fn get_extension(extension: &str) -> Result<Extension, ParseError> {
    match extension.to_ascii_lowercase().as_str() {
        "ply" => Ok(Extension::Ply),
        "xyz" => Ok(Extension::Xyz),
        "xyzn" => Ok(Extension::Xyzn),
        "xyzrgb" => Ok(Extension::Xyzrgb),
        "csv" => Ok(Extension::Csv),
        "txt" => Ok(Extension::Txt),
        "las" => Ok(Extension::Las),
        "laz" => Ok(Extension::Laz),
        other => Err(ParseError::UnsupportedExtension(other.to_string())),
    }
}

pub fn extension_of(path: &Path) -> Result<Extension, ParseError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| ParseError::UnsupportedExtension(path.display().to_string()))?;
    get_extension(extension)
}

pub fn provider_for(path: &Path) -> Result<Box<dyn ParserProvider>, ParseError> {
    let filename = path.to_path_buf();
    let provider: Box<dyn ParserProvider> = match extension_of(path)? {
        Extension::Ply => Box::new(ply::PlyParserProvider { filename }),
        Extension::Xyz => Box::new(xyz::XyzParserProvider {
            filename,
            layout: xyz::XyzLayout::Positions,
        }),
        Extension::Xyzn => Box::new(xyz::XyzParserProvider {
            filename,
            layout: xyz::XyzLayout::PositionsNormals,
        }),
        Extension::Xyzrgb => Box::new(xyz::XyzParserProvider {
            filename,
            layout: xyz::XyzLayout::PositionsColors,
        }),
        Extension::Csv | Extension::Txt => Box::new(csv::CsvParserProvider { filename }),
        Extension::Las | Extension::Laz => Box::new(las::LasParserProvider { filename }),
    };
    Ok(provider)
}

/// Loads a point cloud, picking the format from the file extension.
pub fn read_point_cloud(path: &Path) -> Result<PointCloud, ParseError> {
    let parser = provider_for(path)?.get_parser();
    let point_cloud = parser.parse()?;
    log::debug!(
        "parsed {} points from {:?} (colors: {}, normals: {})",
        point_cloud.len(),
        path,
        point_cloud.has_colors(),
        point_cloud.has_normals()
    );
    Ok(point_cloud)
}

pub(crate) fn open_buffered(filename: &PathBuf) -> Result<BufReader<File>, ParseError> {
    let file = File::open(filename).map_err(|e| ParseError::io(filename, e))?;
    Ok(BufReader::new(file))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extensions_are_case_insensitive() {
        assert_eq!(get_extension("PLY").unwrap(), Extension::Ply);
        assert_eq!(get_extension("XyzRgb").unwrap(), Extension::Xyzrgb);
    }

    #[test]
    fn unknown_extension_is_rejected() {
        assert!(matches!(
            extension_of(Path::new("cloud.obj")),
            Err(ParseError::UnsupportedExtension(_))
        ));
        assert!(extension_of(Path::new("no_extension")).is_err());
    }

    #[test]
    fn missing_file_reports_its_path() {
        let err = read_point_cloud(Path::new("/nonexistent/cloud.ply")).unwrap_err();
        assert!(matches!(err, ParseError::Io { .. }));
        assert!(err.to_string().contains("/nonexistent/cloud.ply"));
    }

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn reads_ply_file_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "cloud.PLY",
            "ply\nformat ascii 1.0\nelement vertex 2\nproperty double x\nproperty double y\nproperty double z\nproperty uchar red\nproperty uchar green\nproperty uchar blue\nend_header\n0 0 0 255 255 255\n1 2 3 0 0 0\n",
        );

        let pc = read_point_cloud(&path).unwrap();
        assert_eq!(pc.len(), 2);
        assert!(pc.has_colors());
        assert!(!pc.has_normals());
        assert_eq!(pc.points[1].position(), [1.0, 2.0, 3.0]);
        assert_eq!(pc.points[0].color.r, 1.0);
    }

    #[test]
    fn ply_file_with_impossible_vertex_count_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "huge.ply",
            "ply\nformat binary_little_endian 1.0\nelement vertex 18446744073709551615\nproperty float x\nproperty float y\nproperty float z\nend_header\n",
        );

        assert!(matches!(
            read_point_cloud(&path),
            Err(ParseError::Malformed(_))
        ));
    }
}
