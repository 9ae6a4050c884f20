mod name;
mod object;

pub use name::Name;
pub use object::{DisplayFlags, MeshObject, ObjectInfo};
