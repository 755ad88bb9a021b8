pub mod cross_section;
pub mod snapshot;
pub mod stl;
