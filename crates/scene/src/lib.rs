//! Scene representation: objects, transforms, and the camera.

pub mod camera;
pub mod object;
pub mod transform;

pub use camera::Camera;
pub use object::{GameObject, ObjectId, ObjectMap, PointLight};
pub use transform::Transform;
