pub mod binned;
pub mod predict;
pub mod unbinned;
pub mod version;
