pub mod normalizer;
pub mod pipeline;

pub use normalizer::normalize;
pub use pipeline::process;
