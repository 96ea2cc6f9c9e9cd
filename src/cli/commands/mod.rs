pub mod list;
pub mod predict;
pub mod serve;
pub mod train;

pub use list::list;
pub use predict::predict;
pub use serve::serve;
pub use train::train;
