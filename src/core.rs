pub mod flatten;
pub mod sample;
pub mod sampler;
