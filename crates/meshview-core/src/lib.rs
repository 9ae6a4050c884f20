pub mod bounds;
pub mod components;
pub mod error;
pub mod loader;
pub mod math;

// Re-exports
pub use bounds::BoundingBox;
pub use components::{DisplayFlags, MeshObject, Name, ObjectInfo};
pub use error::LoadError;
pub use loader::{LoadedMesh, Triangle};
