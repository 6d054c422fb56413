//! GPU resource management: meshes and models.

pub mod model;

pub use model::{MeshData, Model};
