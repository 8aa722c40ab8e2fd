mod error;
pub mod parsers;

pub use error::ParseError;
pub use parsers::read_point_cloud;
