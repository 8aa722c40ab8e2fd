pub mod decimation;
pub mod index;
pub mod point;
