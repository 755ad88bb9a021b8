pub mod neighbor_filter;
pub mod triangulate;
