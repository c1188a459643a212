use game_common::math::{Rotation, Vec2Ext};
use game_common::UniqueId;
use glam::Vec2;

use super::Body;
use crate::attachable::{Attachable, JointOverrides, JointStatus, MergedAtoms};
use crate::context::WorldContext;

/// Change of the relative angle of an attachable, in radians, after which its merged atoms are
/// rebuilt.
const ATOM_ANGLE_THRESHOLD: f32 = 1.0 * std::f32::consts::PI / 180.0;

impl Body {
    /// Attaches `child` to this body.
    ///
    /// The child is positioned at its joint immediately. Its mass, collision atoms and reach
    /// are added to the caches of this body.
    pub fn add_attachable(&mut self, mut child: Attachable) {
        child.detach();
        child.attach_to(&self.parent_state(true));

        self.update_attachable_and_wound_mass(child.mass());
        self.attachables.push(child);

        let index = self.attachables.len() - 1;
        self.sync_attachable_atoms(index);
        self.handle_potential_radius_affecting_attachable(index);
    }

    /// Removes the attachable `id` from this body.
    ///
    /// If `add_break_wounds` is set, the break wounds of the joint are added to both sides.
    /// Attachables that gib or delete on removal never come back. All others are moved into
    /// the world's object pool if `add_to_pool` is set and returned otherwise.
    pub fn remove_attachable<C>(
        &mut self,
        id: UniqueId,
        add_to_pool: bool,
        add_break_wounds: bool,
        ctx: &mut C,
    ) -> Option<Attachable>
    where
        C: WorldContext + ?Sized,
    {
        let Some(index) = self.attachable_index(id) else {
            tracing::warn!("cannot remove unknown attachable {} from {}", id, self.id());
            return None;
        };

        let child = self.detach_at(index, add_break_wounds, ctx);
        let child = Self::dispose(child, ctx)?;

        if add_to_pool {
            ctx.add_object(child);
            None
        } else {
            Some(child)
        }
    }

    /// Removes the attachable `id` without any side effects on the world.
    pub fn take_attachable(&mut self, id: UniqueId) -> Option<Attachable> {
        let index = self.attachable_index(id)?;
        Some(self.unlink_at(index))
    }

    /// Mutates the attachable `id` through `f` and updates the caches of this body to match.
    pub fn with_attachable_mut<F, R>(&mut self, id: UniqueId, f: F) -> Option<R>
    where
        F: FnOnce(&mut Attachable) -> R,
    {
        let index = self.attachable_index(id)?;

        let child = &mut self.attachables[index];
        let old_mass = child.mass();
        let result = f(child);
        let delta = child.mass() - old_mass;

        self.update_attachable_and_wound_mass(delta);
        self.sync_attachable_atoms(index);
        self.handle_potential_radius_affecting_attachable(index);

        Some(result)
    }

    /// Returns the ids of this body and everything attached to it in the order they are drawn.
    pub fn draw_order(&self) -> Vec<UniqueId> {
        let mut order = Vec::with_capacity(self.attachables.len() + self.wounds.len() + 1);
        self.push_draw_order(&mut order);
        order
    }

    fn push_draw_order(&self, order: &mut Vec<UniqueId>) {
        let children = self.attachables.iter().chain(self.wounds.iter());

        for child in children.clone().filter(|child| !child.draw_after_parent) {
            child.push_draw_order(order);
        }

        order.push(self.id());

        for child in children.filter(|child| child.draw_after_parent) {
            child.push_draw_order(order);
        }
    }

    fn attachable_index(&self, id: UniqueId) -> Option<usize> {
        self.attachables.iter().position(|child| child.id() == id)
    }

    /// Updates every attachable and reconciles the forces and impulses at their joints.
    pub(super) fn update_attachables<C>(&mut self, ctx: &mut C, can_collide: bool)
    where
        C: WorldContext + ?Sized,
    {
        let state = self.parent_state(can_collide);

        let mut index = 0;
        while index < self.attachables.len() {
            let child = &mut self.attachables[index];
            let old_mass = child.mass();
            child.apply_parent_state(&state);
            child.update(ctx);
            let delta = child.mass() - old_mass;
            let deleted = child.to_delete();

            self.update_attachable_and_wound_mass(delta);

            if deleted {
                self.unlink_at(index);
                continue;
            }

            self.sync_attachable_atoms(index);
            self.handle_potential_radius_affecting_attachable(index);

            let child = &mut self.attachables[index];
            let mut joint_forces = Vec2::ZERO;
            let mut joint_impulses = Vec2::ZERO;
            child.transfer_joint_forces(&mut joint_forces);
            let status = child.transfer_joint_impulses(&mut joint_impulses, JointOverrides::default());
            let offset = child.joint_pos().unwrap_or(child.pos) - self.pos;

            if joint_forces != Vec2::ZERO {
                self.forces.push(joint_forces, offset);
            }
            if joint_impulses != Vec2::ZERO {
                self.impulses.push(joint_impulses, offset);
            }

            match status {
                JointStatus::Held | JointStatus::Unattached => index += 1,
                JointStatus::Broken => {
                    let child = self.detach_at(index, true, ctx);
                    if let Some(child) = Self::dispose(child, ctx) {
                        ctx.add_object(child);
                    }
                }
                JointStatus::Gibbed => {
                    let mut child = self.detach_at(index, false, ctx);
                    let impulse = child.last_impulse;
                    child.gib_this(impulse, None, ctx);
                }
            }
        }
    }

    /// Detaches the attachable at `index` and optionally adds the break wounds of its joint.
    pub(super) fn detach_at<C>(&mut self, index: usize, add_break_wounds: bool, ctx: &mut C) -> Attachable
    where
        C: WorldContext + ?Sized,
    {
        let mut child = self.unlink_at(index);

        if !add_break_wounds {
            return child;
        }

        if let Some(name) = child.break_wound.clone() {
            if let Some(wound) = instantiate_wound(&name, ctx) {
                let offset = child.joint_offset();
                child.add_wound(wound, offset, false, ctx);
            }
        }

        if let Some(name) = child.parent_break_wound.clone() {
            if let Some(wound) = instantiate_wound(&name, ctx) {
                self.add_wound(wound, child.parent_offset(), true, ctx);
            }
        }

        child
    }

    /// Removes the attachable at `index` and its share of the caches of this body.
    fn unlink_at(&mut self, index: usize) -> Attachable {
        let mut child = self.attachables.remove(index);
        let id = child.id();

        self.update_attachable_and_wound_mass(-child.mass());

        if self.atoms.remove_subgroup(id) {
            self.atoms_dirty = true;
        }

        if matches!(self.farthest_attachable, Some((farthest, _)) if farthest == id) {
            self.rescan_farthest_attachable();
        }

        child.detach();
        child.vel = self.vel;
        child.ang_vel = self.ang_vel;
        child
    }

    /// Applies the removal flags of a detached attachable. Returns the attachable if it stays
    /// in the world.
    pub(super) fn dispose<C>(mut child: Attachable, ctx: &mut C) -> Option<Attachable>
    where
        C: WorldContext + ?Sized,
    {
        if child.gib_when_removed_from_parent {
            let impulse = child.last_impulse;
            child.gib_this(impulse, None, ctx);
            return None;
        }

        if child.delete_when_removed_from_parent {
            return None;
        }

        Some(child)
    }

    /// Merges the collision atoms of the attachable at `index` into the atoms of this body,
    /// rebuilding the subgroup only if the attachable moved or its atoms changed.
    pub(super) fn sync_attachable_atoms(&mut self, index: usize) {
        let child = &mut self.attachables[index];
        let id = child.id();

        if !child.can_collide_with_terrain() {
            if self.atoms.remove_subgroup(id) {
                self.atoms_dirty = true;
            }
            child.merged_atoms = None;
            return;
        }

        let current = MergedAtoms {
            relative_angle: child.rotation.angle() - self.rotation.angle(),
            parent_offset: child.parent_offset(),
            joint_offset: child.joint_offset(),
        };

        let stale = match child.merged_atoms {
            Some(merged) => {
                child.atoms_dirty
                    || merged.parent_offset != current.parent_offset
                    || merged.joint_offset != current.joint_offset
                    || (merged.relative_angle - current.relative_angle).abs() > ATOM_ANGLE_THRESHOLD
            }
            None => true,
        };

        if !stale {
            return;
        }

        let rotation = Rotation::new(current.relative_angle);
        let translation = current.parent_offset - rotation.rotate(current.joint_offset);
        self.atoms
            .add_subgroup(id, translation, rotation, child.atoms.flattened());

        child.atoms_dirty = false;
        child.merged_atoms = Some(current);
        self.atoms_dirty = true;
    }

    /// Updates the cached farthest attachable after the attachable at `index` was added or
    /// moved.
    pub(super) fn handle_potential_radius_affecting_attachable(&mut self, index: usize) {
        let child = &self.attachables[index];
        let id = child.id();
        let reach = child.reach_from_parent();

        match self.farthest_attachable {
            Some((farthest, current)) if farthest == id => {
                self.farthest_attachable = Some((id, reach));
                if reach < current {
                    self.rescan_farthest_attachable();
                }
            }
            Some((_, current)) if reach <= current => (),
            _ => self.farthest_attachable = Some((id, reach)),
        }
    }

    fn rescan_farthest_attachable(&mut self) {
        self.farthest_attachable = self
            .attachables
            .iter()
            .map(|child| (child.id(), child.reach_from_parent()))
            .max_by(|(_, a), (_, b)| a.total_cmp(b));
    }

    /// Detaches the attachable nearest to the side hit by `impulse` if the impulse exceeds its
    /// joint strength. Returns the impulse left for this body.
    pub(super) fn detach_attachables_from_impulse<C>(&mut self, impulse: Vec2, ctx: &mut C) -> Vec2
    where
        C: WorldContext + ?Sized,
    {
        let magnitude = impulse.length();
        let radius = self.radius();
        let impact = self
            .rotation
            .unrotate(-impulse.with_magnitude(radius))
            .flip_x(self.h_flipped);

        let Some(index) = self.nearest_detachable_attachable(impact, radius * 2.0) else {
            return impulse;
        };

        let strength = self.attachables[index].joint_strength;
        if magnitude <= strength {
            return impulse;
        }

        let mut child = self.detach_at(index, true, ctx);
        let blow = impulse.with_magnitude(strength);
        tracing::debug!("{} lost {} to impulse {}", self.id, child.id(), magnitude);

        if child.gib_impulse_limit > 0.0 && child.gib_impulse_limit < strength {
            child.gib_this(blow, None, ctx);
        } else if let Some(mut child) = Self::dispose(child, ctx) {
            let mass = child.mass().max(f32::EPSILON);
            child.vel += blow / mass;
            ctx.add_object(child);
        }

        impulse.with_magnitude(magnitude - strength)
    }

    /// Returns the index of the detachable attachable whose joint is nearest to `local_point`.
    pub(super) fn nearest_detachable_attachable(&self, local_point: Vec2, max_distance: f32) -> Option<usize> {
        self.attachables
            .iter()
            .enumerate()
            .filter(|(_, child)| child.joint_strength > 0.0)
            .map(|(index, child)| (index, child.parent_offset().distance(local_point)))
            .filter(|(_, distance)| *distance <= max_distance)
            .min_by(|(_, a), (_, b)| a.total_cmp(b))
            .map(|(index, _)| index)
    }
}

fn instantiate_wound<C>(name: &str, ctx: &mut C) -> Option<Attachable>
where
    C: WorldContext + ?Sized,
{
    let wound = ctx.presets().instantiate_attachable(name);
    if wound.is_none() {
        tracing::warn!("requested unknown wound preset {}", name);
    }

    wound
}

#[cfg(test)]
mod tests {
    use game_common::assert_approx_eq;
    use game_common::UniqueId;
    use glam::Vec2;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use crate::attachable::Attachable;
    use crate::body::Body;
    use crate::config::Config;
    use crate::emitter::Emitter;
    use crate::world::World;

    fn world() -> World {
        World::new(Config {
            rng_seed: Some(3),
            ..Default::default()
        })
    }

    fn random_tree(rng: &mut StdRng, depth: u32) -> Attachable {
        let mut node = Attachable::new();
        node.set_individual_mass(rng.gen_range(0.1..5.0));
        node.set_parent_offset(Vec2::new(rng.gen_range(-10.0..10.0), rng.gen_range(-10.0..10.0)));

        if depth > 1 {
            for _ in 0..rng.gen_range(0..3) {
                node.add_attachable(random_tree(rng, depth - 1));
            }
        }

        node
    }

    fn random_child(body: &Body, rng: &mut StdRng) -> Option<UniqueId> {
        if body.attachables().is_empty() {
            return None;
        }

        let index = rng.gen_range(0..body.attachables().len());
        Some(body.attachables()[index].id())
    }

    fn assert_mass_consistent(body: &Body) {
        let children: f32 = body
            .attachables()
            .iter()
            .chain(body.wounds())
            .map(|child| child.mass())
            .sum();

        assert_approx_eq!(
            body.mass(),
            body.individual_mass() + children,
            epsilon = 1e-4 * body.mass().max(1.0)
        );

        for child in body.attachables().iter().chain(body.wounds()) {
            assert_mass_consistent(child);
        }
    }

    #[test]
    fn mass_stays_additive() {
        let mut world = world();
        let mut rng = StdRng::seed_from_u64(7);
        let mut root = Body::new();

        for _ in 0..200 {
            match rng.gen_range(0..6) {
                0 => root.add_attachable(random_tree(&mut rng, 5)),
                1 => {
                    if let Some(id) = random_child(&root, &mut rng) {
                        assert!(root.take_attachable(id).is_some());
                    }
                }
                2 => {
                    if let Some(id) = random_child(&root, &mut rng) {
                        let subtree = random_tree(&mut rng, 3);
                        root.with_attachable_mut(id, |child| child.add_attachable(subtree));
                    }
                }
                3 => {
                    if let Some(id) = random_child(&root, &mut rng) {
                        let grandchild = root.attachable(id).and_then(|child| random_child(child, &mut rng));
                        if let Some(grandchild) = grandchild {
                            root.with_attachable_mut(id, |child| child.take_attachable(grandchild));
                        }
                    }
                }
                4 => {
                    let mut wound = Attachable::emitter(Emitter::new());
                    wound.set_individual_mass(rng.gen_range(0.1..1.0));
                    assert!(root.add_wound(wound, Vec2::ZERO, false, &mut world));
                }
                _ => root.update(&mut world),
            }

            assert_mass_consistent(&root);
        }
    }

    #[test]
    fn mass_follows_nested_changes() {
        let mut root = Body::new();
        let mut child = Attachable::new();
        child.set_individual_mass(2.0);
        let id = child.id();
        root.add_attachable(child);

        assert_approx_eq!(root.mass(), 3.0);

        root.with_attachable_mut(id, |child| child.set_individual_mass(5.0));
        assert_approx_eq!(root.mass(), 6.0);

        root.take_attachable(id);
        assert_approx_eq!(root.mass(), 1.0);
    }

    #[test]
    fn radius_tracks_farthest_attachable() {
        let mut root = Body::new();

        let mut far = Attachable::new();
        far.set_parent_offset(Vec2::new(10.0, 0.0));
        far.set_joint_offset(Vec2::new(-2.0, 0.0));
        far.set_individual_radius(3.0);
        let far_id = far.id();

        let mut near = Attachable::new();
        near.set_parent_offset(Vec2::new(0.0, 4.0));
        let near_id = near.id();

        root.add_attachable(near);
        assert_approx_eq!(root.radius(), 5.0);

        root.add_attachable(far);
        assert_approx_eq!(root.radius(), 15.0);

        root.take_attachable(far_id);
        assert_approx_eq!(root.radius(), 5.0);

        root.take_attachable(near_id);
        assert_approx_eq!(root.radius(), root.individual_radius());
    }

    #[test]
    fn radius_shrinks_when_attachable_moves_in() {
        let mut root = Body::new();
        let mut child = Attachable::new();
        child.set_parent_offset(Vec2::new(20.0, 0.0));
        let id = child.id();
        root.add_attachable(child);

        assert_approx_eq!(root.radius(), 21.0);

        root.with_attachable_mut(id, |child| child.set_parent_offset(Vec2::new(4.0, 0.0)));
        assert_approx_eq!(root.radius(), 5.0);
    }

    #[test]
    fn joint_holds_below_strength() {
        let mut world = world();
        let mut root = Body::new();
        let child = Attachable::new();
        let id = child.id();
        let strength = child.joint_strength;
        root.add_attachable(child);

        root.attachable(id)
            .unwrap()
            .add_impulse(Vec2::new(strength - 0.01, 0.0), Vec2::ZERO);
        root.update(&mut world);

        assert!(root.attachable(id).is_some());
        assert_approx_eq!(root.pending_impulse().x, strength - 0.01, epsilon = 1e-4);
        assert!(world.pool().is_empty());
    }

    #[test]
    fn joint_breaks_above_strength() {
        let mut world = world();
        let mut root = Body::new();
        let child = Attachable::new();
        let id = child.id();
        let strength = child.joint_strength;
        root.add_attachable(child);

        root.attachable(id)
            .unwrap()
            .add_impulse(Vec2::new(strength + 0.01, 0.0), Vec2::ZERO);
        root.update(&mut world);

        assert!(root.attachable(id).is_none());
        assert!(root.pending_impulse().length() <= strength + 1e-4);
        assert_approx_eq!(root.pending_impulse().length(), strength, epsilon = 1e-4);
        assert_approx_eq!(root.mass(), root.individual_mass());

        let released = world.pool().get(id).and_then(|object| object.as_body()).unwrap();
        assert!(!released.is_attached());
        assert_eq!(released.root_id(), id);
    }

    #[test]
    fn joint_gibs_above_gib_limit() {
        let mut world = world();
        let mut root = Body::new();
        let mut child = Attachable::new();
        child.gib_impulse_limit = 15.0;
        let id = child.id();
        root.add_attachable(child);

        root.attachable(id).unwrap().add_impulse(Vec2::new(0.0, 20.0), Vec2::ZERO);
        root.update(&mut world);

        assert!(root.attachable(id).is_none());
        assert!(!world.pool().contains(id));
        assert_approx_eq!(root.pending_impulse().length(), 10.0, epsilon = 1e-4);
    }

    #[test]
    fn impulse_detaches_nearest_attachable() {
        let mut world = world();
        let mut root = Body::new();
        root.gib_impulse_limit = 50.0;

        let mut near = Attachable::new();
        near.set_parent_offset(Vec2::new(5.0, 0.0));
        near.set_individual_mass(2.0);
        near.joint_strength = 30.0;
        let mut far = Attachable::new();
        far.set_parent_offset(Vec2::new(-5.0, 0.0));
        far.joint_strength = 30.0;
        let (near_id, far_id) = (near.id(), far.id());
        root.add_attachable(near);
        root.add_attachable(far);

        // Hit from the right side.
        root.add_impulse(Vec2::new(-70.0, 0.0), Vec2::ZERO);
        root.apply_impulses(&mut world);

        assert!(!root.to_delete());
        assert!(root.attachable(near_id).is_none());
        assert!(root.attachable(far_id).is_some());

        let released = world.pool().get(near_id).and_then(|object| object.as_body()).unwrap();
        assert!(!released.is_attached());
        assert_approx_eq!(released.vel.x, -15.0, epsilon = 1e-4);
    }

    #[test]
    fn unbreakable_joint_transfers_everything() {
        let mut world = world();
        let mut root = Body::new();
        let mut child = Attachable::new();
        child.joint_strength = 0.0;
        let id = child.id();
        root.add_attachable(child);

        root.attachable(id).unwrap().add_impulse(Vec2::new(1000.0, 0.0), Vec2::ZERO);
        root.update(&mut world);

        assert!(root.attachable(id).is_some());
        assert_approx_eq!(root.pending_impulse().x, 1000.0, epsilon = 1e-2);
    }

    #[test]
    fn break_wounds_are_added_to_both_sides() {
        let mut world = world();
        let mut wound = Attachable::emitter(Emitter::new());
        wound.set_preset_name("Blood Wound");
        world.presets_mut().add_attachable(wound).unwrap();

        let mut root = Body::new();
        let mut child = Attachable::new();
        child.break_wound = Some(String::from("Blood Wound"));
        child.parent_break_wound = Some(String::from("Blood Wound"));
        child.set_parent_offset(Vec2::new(3.0, 0.0));
        let id = child.id();
        root.add_attachable(child);

        let child = root.remove_attachable(id, false, true, &mut world).unwrap();

        assert_eq!(child.wounds().len(), 1);
        assert_eq!(root.wounds().len(), 1);
        assert_eq!(root.wounds()[0].parent_offset(), Vec2::new(3.0, 0.0));
        assert!(root.wounds()[0].is_wound());
    }

    #[test]
    fn unknown_break_wound_is_skipped() {
        let mut world = world();
        let mut root = Body::new();
        let mut child = Attachable::new();
        child.parent_break_wound = Some(String::from("Missing"));
        let id = child.id();
        root.add_attachable(child);

        let child = root.remove_attachable(id, false, true, &mut world);

        assert!(child.is_some());
        assert!(root.wounds().is_empty());
    }

    #[test]
    fn removed_attachables_go_to_pool() {
        let mut world = world();
        let mut root = Body::new();
        let kept = Attachable::new();
        let mut deleted = Attachable::new();
        deleted.delete_when_removed_from_parent = true;
        let (kept_id, deleted_id) = (kept.id(), deleted.id());
        root.add_attachable(kept);
        root.add_attachable(deleted);

        assert!(root.remove_attachable(kept_id, true, false, &mut world).is_none());
        assert!(root.remove_attachable(deleted_id, true, false, &mut world).is_none());

        assert!(world.pool().contains(kept_id));
        assert!(!world.pool().contains(deleted_id));
        assert!(root.attachables().is_empty());
    }

    #[test]
    fn draw_order_honors_draw_after_parent() {
        let mut root = Body::new();
        let mut behind = Attachable::new();
        behind.draw_after_parent = false;
        let mut front = Attachable::new();
        let mut nested = Attachable::new();
        nested.draw_after_parent = false;
        let nested_id = nested.id();
        front.add_attachable(nested);

        let (behind_id, front_id) = (behind.id(), front.id());
        root.add_attachable(front);
        root.add_attachable(behind);

        assert_eq!(root.draw_order(), vec![behind_id, root.id(), nested_id, front_id]);
    }

    #[test]
    fn atoms_of_colliding_attachables_are_merged() {
        let mut root = Body::new();
        root.set_atoms(vec![Vec2::ZERO]);

        let mut child = Attachable::new();
        child.set_atoms(vec![Vec2::ZERO, Vec2::new(1.0, 0.0)]);
        child.set_parent_offset(Vec2::new(5.0, 0.0));
        let id = child.id();

        let mut ghost = Attachable::new();
        ghost.set_atoms(vec![Vec2::ZERO]);
        ghost.collides_with_terrain_while_attached = false;

        root.add_attachable(child);
        root.add_attachable(ghost);

        assert_eq!(root.atoms().flattened().count(), 3);
        assert!(root.atoms().flattened().any(|atom| atom == Vec2::new(6.0, 0.0)));

        root.take_attachable(id);
        assert_eq!(root.atoms().flattened().count(), 1);
    }
}
