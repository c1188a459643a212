//! Terrain collision points of a body.

use game_common::math::Rotation;
use game_common::UniqueId;
use glam::Vec2;

/// A single terrain collision point.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Atom {
    /// Offset from the center of mass of the owning group, unrotated.
    pub offset: Vec2,
    /// The attachable that contributed this atom, `None` for the group owner's own atoms.
    pub subgroup: Option<UniqueId>,
}

/// The collision points of a body, including the points merged in from its attachables.
///
/// Merged points are kept in subgroups keyed by the id of the contributing attachable so they
/// can be updated and removed as a whole when the attachable moves or detaches.
#[derive(Clone, Debug, Default)]
pub struct AtomGroup {
    atoms: Vec<Vec2>,
    subgroups: Vec<Subgroup>,
}

#[derive(Clone, Debug)]
struct Subgroup {
    id: UniqueId,
    atoms: Vec<Vec2>,
}

impl AtomGroup {
    pub fn new(atoms: Vec<Vec2>) -> Self {
        Self {
            atoms,
            subgroups: Vec::new(),
        }
    }

    /// Returns the group owner's own atoms.
    pub fn own_atoms(&self) -> &[Vec2] {
        &self.atoms
    }

    pub fn set_own_atoms(&mut self, atoms: Vec<Vec2>) {
        self.atoms = atoms;
    }

    /// Merges `atoms` into this group as the subgroup `id`.
    ///
    /// Each atom is rotated by `rotation` and then moved by `translation` into the frame of
    /// this group. An existing subgroup with the same id is replaced.
    pub fn add_subgroup<I>(&mut self, id: UniqueId, translation: Vec2, rotation: Rotation, atoms: I)
    where
        I: IntoIterator<Item = Vec2>,
    {
        let atoms = atoms
            .into_iter()
            .map(|atom| rotation.rotate(atom) + translation)
            .collect();

        match self.subgroups.iter_mut().find(|group| group.id == id) {
            Some(group) => group.atoms = atoms,
            None => self.subgroups.push(Subgroup { id, atoms }),
        }
    }

    /// Replaces the atoms of an existing subgroup. Returns `false` if no such subgroup exists.
    pub fn update_subgroup<I>(&mut self, id: UniqueId, translation: Vec2, rotation: Rotation, atoms: I) -> bool
    where
        I: IntoIterator<Item = Vec2>,
    {
        if !self.contains_subgroup(id) {
            return false;
        }

        self.add_subgroup(id, translation, rotation, atoms);
        true
    }

    /// Removes the subgroup `id`. Returns `false` if no such subgroup exists.
    pub fn remove_subgroup(&mut self, id: UniqueId) -> bool {
        let len = self.subgroups.len();
        self.subgroups.retain(|group| group.id != id);
        self.subgroups.len() != len
    }

    pub fn contains_subgroup(&self, id: UniqueId) -> bool {
        self.subgroups.iter().any(|group| group.id == id)
    }

    pub fn clear_subgroups(&mut self) {
        self.subgroups.clear();
    }

    /// Returns every atom of this group, own atoms first.
    pub fn iter(&self) -> impl Iterator<Item = Atom> + '_ {
        let own = self.atoms.iter().map(|offset| Atom {
            offset: *offset,
            subgroup: None,
        });

        let merged = self.subgroups.iter().flat_map(|group| {
            group.atoms.iter().map(move |offset| Atom {
                offset: *offset,
                subgroup: Some(group.id),
            })
        });

        own.chain(merged)
    }

    /// Returns the offsets of every atom of this group.
    pub fn flattened(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.iter().map(|atom| atom.offset)
    }

    pub fn len(&self) -> usize {
        self.atoms.len() + self.subgroups.iter().map(|group| group.atoms.len()).sum::<usize>()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Approximates the moment of inertia of a body with the given `mass` whose mass is spread
    /// evenly over the atoms. Falls back to a disc of `radius` for empty groups.
    pub fn moment_of_inertia(&self, mass: f32, radius: f32) -> f32 {
        let count = self.len();
        if count == 0 {
            return 0.5 * mass * radius * radius;
        }

        let sum: f32 = self.flattened().map(|offset| offset.length_squared()).sum();
        (mass * sum / count as f32).max(f32::EPSILON)
    }
}
