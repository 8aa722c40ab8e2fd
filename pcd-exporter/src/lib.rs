mod error;
pub mod results;
pub mod writers;

pub use error::ExportError;
pub use results::{split_file_name, OutputMode, ResultWriter};
pub use writers::write_point_cloud;
