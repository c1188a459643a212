use game_common::math::Rotation;
use glam::Vec2;
use rand::{Rng, RngCore};

use super::Body;
use crate::attachable::Attachable;
use crate::context::WorldContext;

/// Returns `true` if an attachable with the given damage multiplier is included by the filter.
fn matches_damage_filter(multiplier: f32, positive: bool, negative: bool, no_damage: bool) -> bool {
    (positive && multiplier > 0.0) || (negative && multiplier < 0.0) || (no_damage && multiplier == 0.0)
}

impl Body {
    /// Adds `wound` at `offset` from the center of this body.
    ///
    /// If `check_gib_wound_limit` is set and the wound reaches the gib wound limit, this body
    /// either detaches the attachable nearest to the wound instead or gibs. Only the wound that
    /// reaches the limit can be taken by an attachable, so a checked body never holds more
    /// wounds than its limit and the wound after it gibs the body. Returns `false` if the wound
    /// was not added.
    pub fn add_wound<C>(&mut self, wound: Attachable, offset: Vec2, check_gib_wound_limit: bool, ctx: &mut C) -> bool
    where
        C: WorldContext + ?Sized,
    {
        if self.to_delete {
            return false;
        }

        let limit = self.gib_wound_limit as usize;
        if check_gib_wound_limit && limit > 0 && self.wounds.len() + 1 >= limit {
            if self.detach_attachables_before_gibbing_from_wounds && self.wounds.len() + 1 == limit {
                if let Some(index) = self.nearest_detachable_attachable(offset, f32::INFINITY) {
                    let child = self.detach_at(index, false, ctx);
                    if let Some(child) = Self::dispose(child, ctx) {
                        ctx.add_object(child);
                    }

                    self.push_wound(wound, offset);
                    return true;
                }
            }

            let emit_angle = wound.as_emitter().map_or(0.0, |emitter| emitter.emit_angle);
            let impulse = Rotation::new(emit_angle).rotate(Vec2::new(-5.0, 0.0));
            tracing::debug!("{} reached its gib wound limit of {}", self.id, limit);
            self.gib_this(impulse, None, ctx);
            return false;
        }

        self.push_wound(wound, offset);
        true
    }

    /// Adds `wound` without checking the gib wound limit.
    pub(crate) fn push_wound(&mut self, mut wound: Attachable, offset: Vec2) {
        wound.detach();
        wound.set_parent_offset(offset);
        wound.collides_with_terrain_while_attached = false;
        wound.attach_to(&self.parent_state(false));
        wound.is_wound = true;

        self.update_attachable_and_wound_mass(wound.mass());
        self.wounds.push(wound);
    }

    /// Removes up to `count` wounds from this body and the attachables matching the damage
    /// filter, picking randomly among them. Returns the damage the removed wounds represent.
    pub fn remove_wounds(
        &mut self,
        count: usize,
        positive: bool,
        negative: bool,
        no_damage: bool,
        rng: &mut dyn RngCore,
    ) -> f32 {
        let mut damage = 0.0;

        for _ in 0..count {
            let mut candidates = Vec::new();
            if !self.wounds.is_empty() {
                candidates.push(None);
            }

            for (index, child) in self.attachables.iter().enumerate() {
                if matches_damage_filter(child.damage_multiplier, positive, negative, no_damage)
                    && child.wound_count(positive, negative, no_damage) > 0
                {
                    candidates.push(Some(index));
                }
            }

            if candidates.is_empty() {
                break;
            }

            match candidates[rng.gen_range(0..candidates.len())] {
                None => {
                    let Some(wound) = self.wounds.pop() else {
                        break;
                    };

                    self.update_attachable_and_wound_mass(-wound.mass());
                    damage += wound.as_emitter().map_or(0.0, |emitter| emitter.wound_damage());
                }
                Some(index) => {
                    let child = &mut self.attachables[index];
                    let old_mass = child.mass();
                    let removed = child.remove_wounds(1, positive, negative, no_damage, rng);
                    damage += removed * child.damage_multiplier;
                    let delta = child.mass() - old_mass;
                    self.update_attachable_and_wound_mass(delta);
                }
            }
        }

        damage
    }

    /// Returns the number of wounds of this body and of the attachables matching the damage
    /// filter.
    pub fn wound_count(&self, positive: bool, negative: bool, no_damage: bool) -> usize {
        let children: usize = self
            .attachables
            .iter()
            .filter(|child| matches_damage_filter(child.damage_multiplier, positive, negative, no_damage))
            .map(|child| child.wound_count(positive, negative, no_damage))
            .sum();

        self.wounds.len() + children
    }

    /// Returns the gib wound limit of this body plus the limits of the attachables matching the
    /// damage filter.
    pub fn total_gib_wound_limit(&self, positive: bool, negative: bool, no_damage: bool) -> u32 {
        let children: u32 = self
            .attachables
            .iter()
            .filter(|child| matches_damage_filter(child.damage_multiplier, positive, negative, no_damage))
            .map(|child| child.total_gib_wound_limit(positive, negative, no_damage))
            .sum();

        self.gib_wound_limit + children
    }

    /// Takes the damage accumulated by this body and its attachables, each scaled by the
    /// attachable's damage multiplier.
    pub fn collect_damage(&mut self) -> f32 {
        let mut damage = std::mem::take(&mut self.damage);

        for child in &mut self.attachables {
            damage += child.collect_damage() * child.damage_multiplier;
        }

        damage
    }

    pub(super) fn update_wounds<C>(&mut self, ctx: &mut C)
    where
        C: WorldContext + ?Sized,
    {
        let state = self.parent_state(false);
        let dt = ctx.frame_time().as_secs_f32();

        let mut index = 0;
        while index < self.wounds.len() {
            let wound = &mut self.wounds[index];
            wound.apply_parent_state(&state);
            wound.update(ctx);
            wound.forces.clear();
            wound.impulses.clear();

            if wound.to_delete() {
                let wound = self.wounds.remove(index);
                self.update_attachable_and_wound_mass(-wound.mass());
                continue;
            }

            if let Some(emitter) = wound.as_emitter() {
                self.damage += emitter.damage_over(dt);
            }

            index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use game_common::assert_approx_eq;
    use glam::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::attachable::Attachable;
    use crate::body::Body;
    use crate::config::Config;
    use crate::emitter::Emitter;
    use crate::world::World;

    fn world() -> World {
        World::new(Config {
            rng_seed: Some(5),
            ..Default::default()
        })
    }

    fn wound(burst_damage: f32) -> Attachable {
        let mut emitter = Emitter::new();
        emitter.burst_damage = burst_damage;
        Attachable::emitter(emitter)
    }

    #[test]
    fn wound_limit_gibs_on_last_wound() {
        let mut world = world();
        let mut body = Body::new();
        body.gib_wound_limit = 3;

        assert!(body.add_wound(wound(0.0), Vec2::ZERO, true, &mut world));
        assert!(body.add_wound(wound(0.0), Vec2::ZERO, true, &mut world));
        assert!(!body.to_delete());
        assert_eq!(body.wounds().len(), 2);

        assert!(!body.add_wound(wound(0.0), Vec2::ZERO, true, &mut world));
        assert!(body.to_delete());
        assert!(body.flash_white());
    }

    #[test]
    fn wound_limit_is_ignored_without_check() {
        let mut world = world();
        let mut body = Body::new();
        body.gib_wound_limit = 1;

        assert!(body.add_wound(wound(0.0), Vec2::ZERO, false, &mut world));
        assert!(!body.to_delete());
    }

    #[test]
    fn wounds_on_gibbed_body_are_rejected() {
        let mut world = world();
        let mut body = Body::new();
        body.gib_this(Vec2::ZERO, None, &mut world);

        assert!(!body.add_wound(wound(0.0), Vec2::ZERO, false, &mut world));
        assert!(body.wounds().is_empty());
    }

    #[test]
    fn wound_limit_detaches_nearest_attachable_first() {
        let mut world = world();
        let mut body = Body::new();
        body.gib_wound_limit = 2;

        let mut left = Attachable::new();
        left.set_parent_offset(Vec2::new(-5.0, 0.0));
        let mut right = Attachable::new();
        right.set_parent_offset(Vec2::new(5.0, 0.0));
        let (left_id, right_id) = (left.id(), right.id());
        body.add_attachable(left);
        body.add_attachable(right);

        assert!(body.add_wound(wound(0.0), Vec2::new(4.0, 0.0), true, &mut world));
        assert!(body.add_wound(wound(0.0), Vec2::new(4.0, 0.0), true, &mut world));

        assert!(!body.to_delete());
        assert!(body.attachable(left_id).is_some());
        assert!(body.attachable(right_id).is_none());
        assert!(world.pool().contains(right_id));
        assert_eq!(body.wounds().len(), 2);
    }

    #[test]
    fn wound_after_detaching_attachable_gibs() {
        let mut world = world();
        let mut body = Body::new();
        body.gib_wound_limit = 2;

        for x in [-5.0, 5.0] {
            let mut child = Attachable::new();
            child.set_parent_offset(Vec2::new(x, 0.0));
            body.add_attachable(child);
        }

        assert!(body.add_wound(wound(0.0), Vec2::ZERO, true, &mut world));
        assert!(body.add_wound(wound(0.0), Vec2::new(5.0, 0.0), true, &mut world));
        assert_eq!(body.attachables().len(), 1);
        assert_eq!(body.wounds().len(), 2);
        assert!(!body.to_delete());

        assert!(!body.add_wound(wound(0.0), Vec2::new(-5.0, 0.0), true, &mut world));
        assert!(body.to_delete());
        assert_eq!(body.wounds().len(), 2);
    }

    #[test]
    fn wound_limit_gibs_without_detachable_attachables() {
        let mut world = world();
        let mut body = Body::new();
        body.gib_wound_limit = 1;

        let mut fixed = Attachable::new();
        fixed.joint_strength = 0.0;
        let id = fixed.id();
        body.add_attachable(fixed);

        assert!(!body.add_wound(wound(0.0), Vec2::ZERO, true, &mut world));
        assert!(body.to_delete());
        assert!(world.pool().contains(id));
    }

    #[test]
    fn wounds_lower_impulse_limit() {
        let mut world = world();
        let mut body = Body::new();
        body.gib_impulse_limit = 100.0;
        body.gib_wound_limit = 10;
        body.wound_count_affects_impulse_limit_ratio = 0.5;

        for _ in 0..4 {
            body.add_wound(wound(0.0), Vec2::ZERO, true, &mut world);
        }

        assert_approx_eq!(body.effective_gib_impulse_limit(), 80.0, epsilon = 1e-4);
    }

    #[test]
    fn remove_wounds_reports_damage() {
        let mut world = world();
        let mut rng = StdRng::seed_from_u64(11);
        let mut body = Body::new();
        body.add_wound(wound(5.0), Vec2::ZERO, false, &mut world);
        body.add_wound(wound(5.0), Vec2::ZERO, false, &mut world);

        let damage = body.remove_wounds(1, true, false, false, &mut rng);

        assert_approx_eq!(damage, 5.0);
        assert_eq!(body.wounds().len(), 1);
        assert_approx_eq!(body.mass(), 1.0 + body.wounds()[0].mass());
    }

    #[test]
    fn remove_wounds_scales_attachable_damage() {
        let mut world = world();
        let mut rng = StdRng::seed_from_u64(13);
        let mut body = Body::new();
        body.add_wound(wound(5.0), Vec2::ZERO, false, &mut world);

        let mut child = Attachable::new();
        child.damage_multiplier = 0.5;
        child.add_wound(wound(4.0), Vec2::ZERO, false, &mut world);
        let mut healer = Attachable::new();
        healer.damage_multiplier = -1.0;
        healer.add_wound(wound(3.0), Vec2::ZERO, false, &mut world);
        body.add_attachable(child);
        body.add_attachable(healer);

        assert_eq!(body.wound_count(true, false, false), 2);
        assert_eq!(body.wound_count(true, true, false), 3);

        let damage = body.remove_wounds(10, true, false, false, &mut rng);

        assert_approx_eq!(damage, 7.0, epsilon = 1e-5);
        assert_eq!(body.wound_count(true, false, false), 0);
        assert_eq!(body.wound_count(false, true, false), 1);
        assert_approx_eq!(body.mass(), 4.0, epsilon = 1e-4);
    }

    #[test]
    fn total_gib_wound_limit_filters_by_damage_multiplier() {
        let mut body = Body::new();
        body.gib_wound_limit = 4;

        let mut armor = Attachable::new();
        armor.gib_wound_limit = 2;
        armor.damage_multiplier = 0.0;
        body.add_attachable(armor);

        assert_eq!(body.total_gib_wound_limit(true, false, false), 4);
        assert_eq!(body.total_gib_wound_limit(true, false, true), 6);
    }

    #[test]
    fn emitting_wounds_damage_their_body() {
        let mut world = world();
        let mut body = Body::new();
        let mut emitter = Emitter::new();
        emitter.emit_damage = 6.0;
        emitter.enable_emission(true);
        body.add_wound(Attachable::emitter(emitter), Vec2::ZERO, false, &mut world);

        body.update(&mut world);

        let dt = world.config().timestep().as_secs_f32();
        assert_approx_eq!(body.damage(), 6.0 * dt, epsilon = 1e-5);
    }

    #[test]
    fn collect_damage_drains_tree() {
        let mut body = Body::new();
        body.add_damage(2.0);

        let mut child = Attachable::new();
        child.damage_multiplier = 0.5;
        child.add_damage(10.0);
        body.add_attachable(child);

        assert_approx_eq!(body.collect_damage(), 7.0);
        assert_approx_eq!(body.collect_damage(), 0.0);
    }
}
