pub mod registry;

pub use registry::JobRegistry;
