//! Scene objects.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use glam::Vec3;

use lantern_resources::Model;

use crate::transform::Transform;

/// Stable identifier for a [`GameObject`].
pub type ObjectId = u32;

/// Objects keyed by id, iterated in id order.
pub type ObjectMap = BTreeMap<ObjectId, GameObject>;

static NEXT_ID: AtomicU32 = AtomicU32::new(0);

/// Point light parameters, attached to objects without a model.
#[derive(Debug, Clone, Copy)]
pub struct PointLight {
    pub intensity: f32,
}

/// An entity in the scene: a transform plus optional model and light
/// components.
pub struct GameObject {
    id: ObjectId,
    pub transform: Transform,
    pub color: Vec3,
    pub model: Option<Arc<Model>>,
    pub point_light: Option<PointLight>,
}

impl GameObject {
    /// Create an empty object with a process-unique id.
    pub fn new() -> Self {
        let id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
        Self {
            id,
            transform: Transform::default(),
            color: Vec3::ONE,
            model: None,
            point_light: None,
        }
    }

    /// Create an object carrying a point light.
    pub fn point_light(intensity: f32, radius: f32, color: Vec3) -> Self {
        let mut object = Self::new();
        object.color = color;
        object.transform.scale.x = radius;
        object.point_light = Some(PointLight { intensity });
        object
    }

    #[inline]
    pub fn id(&self) -> ObjectId {
        self.id
    }
}

impl Default for GameObject {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = GameObject::new();
        let b = GameObject::new();
        let c = GameObject::new();
        assert_ne!(a.id(), b.id());
        assert_ne!(b.id(), c.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn ids_are_unique_across_threads() {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                std::thread::spawn(|| {
                    (0..100).map(|_| GameObject::new().id()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<ObjectId> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        let count = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), count);
    }

    #[test]
    fn point_light_sets_components() {
        let light = GameObject::point_light(0.8, 0.05, Vec3::new(1.0, 0.9, 0.7));
        assert!(light.model.is_none());
        let params = light.point_light.expect("light component missing");
        assert!((params.intensity - 0.8).abs() < f32::EPSILON);
        assert!((light.transform.scale.x - 0.05).abs() < f32::EPSILON);
    }

    #[test]
    fn object_map_iterates_in_id_order() {
        let mut map = ObjectMap::new();
        let a = GameObject::new();
        let b = GameObject::new();
        let (id_a, id_b) = (a.id(), b.id());
        map.insert(id_b, b);
        map.insert(id_a, a);

        let ids: Vec<_> = map.keys().copied().collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }
}
