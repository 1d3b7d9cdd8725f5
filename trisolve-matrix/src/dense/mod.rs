mod mat;
pub use mat::Mat;

pub mod triang;
