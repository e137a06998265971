pub mod gate;
pub mod step;
pub mod transform;
pub mod validate;
pub mod writer;
