//! The pool of free objects in the world.

use std::collections::HashMap;

use game_common::UniqueId;
use glam::Vec2;
use slotmap::{new_key_type, SlotMap};

use crate::attachable::Attachable;
use crate::particle::Particle;

new_key_type! {
    pub struct ObjectKey;
}

/// An object owned by the world rather than by a parent body.
#[derive(Clone, Debug)]
pub enum PoolObject {
    Particle(Particle),
    Body(Attachable),
}

impl PoolObject {
    pub fn id(&self) -> UniqueId {
        match self {
            Self::Particle(particle) => particle.id(),
            Self::Body(body) => body.id(),
        }
    }

    pub fn pos(&self) -> Vec2 {
        match self {
            Self::Particle(particle) => particle.pos,
            Self::Body(body) => body.pos,
        }
    }

    pub fn to_delete(&self) -> bool {
        match self {
            Self::Particle(particle) => particle.to_delete(),
            Self::Body(body) => body.to_delete(),
        }
    }

    pub fn as_body(&self) -> Option<&Attachable> {
        match self {
            Self::Body(body) => Some(body),
            Self::Particle(_) => None,
        }
    }

    pub fn as_body_mut(&mut self) -> Option<&mut Attachable> {
        match self {
            Self::Body(body) => Some(body),
            Self::Particle(_) => None,
        }
    }

    pub fn as_particle(&self) -> Option<&Particle> {
        match self {
            Self::Particle(particle) => Some(particle),
            Self::Body(_) => None,
        }
    }
}

impl From<Particle> for PoolObject {
    fn from(particle: Particle) -> Self {
        Self::Particle(particle)
    }
}

impl From<Attachable> for PoolObject {
    fn from(body: Attachable) -> Self {
        Self::Body(body)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ObjectPool {
    objects: SlotMap<ObjectKey, PoolObject>,
    ids: HashMap<UniqueId, ObjectKey>,
}

impl ObjectPool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: impl Into<PoolObject>) -> ObjectKey {
        let object = object.into();
        let id = object.id();
        let key = self.objects.insert(object);

        if let Some(old) = self.ids.insert(id, key) {
            tracing::error!("object {} was added to the pool twice", id);
            self.objects.remove(old);
        }

        key
    }

    pub fn remove(&mut self, id: UniqueId) -> Option<PoolObject> {
        let key = self.ids.remove(&id)?;
        self.objects.remove(key)
    }

    pub fn get(&self, id: UniqueId) -> Option<&PoolObject> {
        let key = self.ids.get(&id)?;
        self.objects.get(*key)
    }

    pub fn get_mut(&mut self, id: UniqueId) -> Option<&mut PoolObject> {
        let key = self.ids.get(&id)?;
        self.objects.get_mut(*key)
    }

    pub fn contains(&self, id: UniqueId) -> bool {
        self.ids.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoolObject> {
        self.objects.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut PoolObject> {
        self.objects.values_mut()
    }

    /// Returns the free bodies in the pool.
    pub fn bodies(&self) -> impl Iterator<Item = &Attachable> {
        self.iter().filter_map(PoolObject::as_body)
    }

    /// Returns the particles in the pool.
    pub fn particles(&self) -> impl Iterator<Item = &Particle> {
        self.iter().filter_map(PoolObject::as_particle)
    }

    /// Keeps only the objects for which `f` returns `true`.
    pub fn retain<F>(&mut self, mut f: F)
    where
        F: FnMut(&mut PoolObject) -> bool,
    {
        let ids = &mut self.ids;
        self.objects.retain(|_, object| {
            let keep = f(object);
            if !keep {
                ids.remove(&object.id());
            }
            keep
        });
    }

    /// Moves all objects of `other` into this pool.
    pub fn append(&mut self, other: &mut Self) {
        other.ids.clear();
        for (_, object) in other.objects.drain() {
            self.insert(object);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ObjectPool, PoolObject};
    use crate::attachable::Attachable;
    use crate::particle::Particle;

    #[test]
    fn insert_and_lookup() {
        let mut pool = ObjectPool::new();
        let particle = Particle::new();
        let body = Attachable::new();
        let (particle_id, body_id) = (particle.id(), body.id());

        pool.insert(particle);
        pool.insert(body);

        assert_eq!(pool.len(), 2);
        assert!(matches!(pool.get(particle_id), Some(PoolObject::Particle(_))));
        assert!(matches!(pool.get(body_id), Some(PoolObject::Body(_))));
        assert_eq!(pool.bodies().count(), 1);
        assert_eq!(pool.particles().count(), 1);

        assert!(pool.remove(body_id).is_some());
        assert!(!pool.contains(body_id));
        assert_eq!(pool.len(), 1);
    }

    #[test]
    fn retain_removes_ids() {
        let mut pool = ObjectPool::new();
        let mut particle = Particle::new();
        particle.set_to_delete();
        let id = particle.id();

        pool.insert(particle);
        pool.insert(Particle::new());
        pool.retain(|object| !object.to_delete());

        assert_eq!(pool.len(), 1);
        assert!(!pool.contains(id));
    }

    #[test]
    fn append_moves_objects() {
        let mut pool = ObjectPool::new();
        let mut other = ObjectPool::new();
        let particle = Particle::new();
        let id = particle.id();
        other.insert(particle);

        pool.append(&mut other);

        assert!(other.is_empty());
        assert!(pool.contains(id));
    }
}
