//! Filesystem adapter writing generated models.

mod model_writer;

pub use model_writer::CapStdModelWriter;
