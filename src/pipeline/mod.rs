pub mod dashboard;
pub mod polyline;
pub mod render;
pub mod stats;
