pub mod render;
pub mod scan;
pub mod script;

pub use render::{render, RenderArgs};
pub use scan::{scan, ScanArgs};
