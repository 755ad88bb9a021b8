pub mod fiber_file;
pub mod synthetic;

pub use fiber_file::{encode_fiber_file, write_fiber_file};
pub use synthetic::generate_fiber_grid;
