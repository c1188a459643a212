//! Rotating bodies owning trees of attachables.
//!
//! A [`Body`] owns its attachables and wounds exclusively. Aggregates over the tree (total mass,
//! radius and merged collision atoms) are cached on every body and kept current with deltas
//! whenever a child is added, removed or changed.

mod attachables;
mod collision;
mod gibbing;
mod wounds;

use std::collections::HashMap;

use game_common::math::Rotation;
use game_common::units::{METERS_PER_PIXEL, PIXELS_PER_METER};
use game_common::values::ValueMap;
use game_common::{Team, UniqueId};
use game_data::{Error, Property, Serializable, Writer};
use game_physics::{AtomGroup, ForceQueue};
use game_tracing::trace_span;
use glam::Vec2;

use crate::attachable::{Attachable, ParentState};
use crate::context::WorldContext;
use crate::gib::Gib;
use crate::sound::SoundRef;

#[derive(Clone, Debug)]
pub struct Body {
    id: UniqueId,
    pub(crate) root_id: UniqueId,
    preset_name: String,
    pub pos: Vec2,
    /// Velocity in m/s.
    pub vel: Vec2,
    pub(crate) prev_vel: Vec2,
    pub(crate) rotation: Rotation,
    /// Angular velocity in rad/s.
    pub ang_vel: f32,
    pub(crate) h_flipped: bool,
    pub(crate) frame: u32,
    pub(crate) frame_count: u32,
    pub team: Team,
    /// Mass of this body alone, in kg.
    mass: f32,
    /// Cached sum of the total masses of all attachables and wounds.
    attachable_and_wound_mass: f32,
    individual_radius: f32,
    /// The attachable reaching farthest from the center, with its reach.
    farthest_attachable: Option<(UniqueId, f32)>,
    pub(crate) atoms: AtomGroup,
    pub(crate) atoms_dirty: bool,
    pub(crate) forces: ForceQueue,
    pub(crate) impulses: ForceQueue,
    pub(crate) attachables: Vec<Attachable>,
    pub(crate) wounds: Vec<Attachable>,
    pub gibs: Vec<Gib>,
    /// Impulse magnitude in kg·m/s that gibs this body. `0` disables gibbing from impulses.
    pub gib_impulse_limit: f32,
    /// Number of wounds that gibs this body. `0` disables gibbing from wounds.
    pub gib_wound_limit: u32,
    /// How much the wound count lowers the impulse limit.
    pub wound_count_affects_impulse_limit_ratio: f32,
    pub gib_blast_strength: f32,
    pub gib_sound: Option<SoundRef>,
    /// Screen shake added when gibbing. Derived from the gib energy if `None`.
    pub gib_screen_shake_amount: Option<f32>,
    pub detach_attachables_before_gibbing_from_wounds: bool,
    /// The last impulse that broke the joint of this body.
    pub(crate) last_impulse: Vec2,
    damage: f32,
    to_delete: bool,
    flash_white: bool,
    pub values: ValueMap,
}

impl Body {
    pub fn new() -> Self {
        let id = UniqueId::new();

        Self {
            id,
            root_id: id,
            preset_name: String::new(),
            pos: Vec2::ZERO,
            vel: Vec2::ZERO,
            prev_vel: Vec2::ZERO,
            rotation: Rotation::IDENTITY,
            ang_vel: 0.0,
            h_flipped: false,
            frame: 0,
            frame_count: 1,
            team: Team::NONE,
            mass: 1.0,
            attachable_and_wound_mass: 0.0,
            individual_radius: 1.0,
            farthest_attachable: None,
            atoms: AtomGroup::default(),
            atoms_dirty: false,
            forces: ForceQueue::new(),
            impulses: ForceQueue::new(),
            attachables: Vec::new(),
            wounds: Vec::new(),
            gibs: Vec::new(),
            gib_impulse_limit: 0.0,
            gib_wound_limit: 0,
            wound_count_affects_impulse_limit_ratio: 0.25,
            gib_blast_strength: 10.0,
            gib_sound: None,
            gib_screen_shake_amount: None,
            detach_attachables_before_gibbing_from_wounds: true,
            last_impulse: Vec2::ZERO,
            damage: 0.0,
            to_delete: false,
            flash_white: false,
            values: ValueMap::new(),
        }
    }

    #[inline]
    pub fn id(&self) -> UniqueId {
        self.id
    }

    pub fn preset_name(&self) -> &str {
        &self.preset_name
    }

    pub fn set_preset_name(&mut self, name: impl Into<String>) {
        self.preset_name = name.into();
    }

    /// Returns the total mass of this body and everything attached to it.
    #[inline]
    pub fn mass(&self) -> f32 {
        self.mass + self.attachable_and_wound_mass
    }

    /// Returns the mass of this body alone.
    #[inline]
    pub fn individual_mass(&self) -> f32 {
        self.mass
    }

    /// Sets the mass of this body alone.
    ///
    /// If this body is attached, the cached mass of its parent is only updated when the change
    /// is made through [`Body::with_attachable_mut`].
    pub fn set_individual_mass(&mut self, mass: f32) {
        self.mass = mass.max(0.0);
    }

    /// Returns the radius enclosing this body and all of its attachables.
    #[inline]
    pub fn radius(&self) -> f32 {
        match self.farthest_attachable {
            Some((_, reach)) => self.individual_radius.max(reach),
            None => self.individual_radius,
        }
    }

    #[inline]
    pub fn individual_radius(&self) -> f32 {
        self.individual_radius
    }

    pub fn set_individual_radius(&mut self, radius: f32) {
        self.individual_radius = radius.max(0.0);
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn set_rotation(&mut self, angle: f32) {
        self.rotation = Rotation::new(angle);
    }

    #[inline]
    pub fn is_h_flipped(&self) -> bool {
        self.h_flipped
    }

    pub fn set_h_flipped(&mut self, flipped: bool) {
        self.h_flipped = flipped;
    }

    pub fn frame(&self) -> u32 {
        self.frame
    }

    pub fn set_frame(&mut self, frame: u32) {
        self.frame = frame.min(self.frame_count.saturating_sub(1));
    }

    pub fn frame_count(&self) -> u32 {
        self.frame_count
    }

    pub fn atoms(&self) -> &AtomGroup {
        &self.atoms
    }

    /// Replaces the collision atoms of this body alone.
    pub fn set_atoms(&mut self, atoms: Vec<Vec2>) {
        self.atoms.set_own_atoms(atoms);
        self.atoms_dirty = true;
    }

    #[inline]
    pub fn to_delete(&self) -> bool {
        self.to_delete
    }

    pub fn set_to_delete(&mut self) {
        self.to_delete = true;
    }

    /// Returns `true` if this body flashed white when it was gibbed.
    pub fn flash_white(&self) -> bool {
        self.flash_white
    }

    /// Returns the damage accumulated by this body alone since it was last collected.
    pub fn damage(&self) -> f32 {
        self.damage
    }

    pub fn add_damage(&mut self, damage: f32) {
        self.damage += damage;
    }

    /// Returns the moment of inertia in kg·m².
    pub fn moment_of_inertia(&self) -> f32 {
        let moment = self.atoms.moment_of_inertia(self.mass(), self.radius());
        (moment * METERS_PER_PIXEL * METERS_PER_PIXEL).max(f32::EPSILON)
    }

    /// Queues a force in N acting at `offset` pixels from the center, in scene orientation.
    pub fn add_force(&self, force: Vec2, offset: Vec2) {
        self.forces.push(force, offset);
    }

    /// Queues an impulse in kg·m/s acting at `offset` pixels from the center, in scene
    /// orientation.
    pub fn add_impulse(&self, impulse: Vec2, offset: Vec2) {
        self.impulses.push(impulse, offset);
    }

    /// Returns the sum of all impulses queued this tick.
    pub fn pending_impulse(&self) -> Vec2 {
        self.impulses.sum()
    }

    /// Returns the sum of all forces queued this tick.
    pub fn pending_force(&self) -> Vec2 {
        self.forces.sum()
    }

    pub fn attachables(&self) -> &[Attachable] {
        &self.attachables
    }

    pub fn wounds(&self) -> &[Attachable] {
        &self.wounds
    }

    /// Returns the directly owned attachable with the given `id`.
    pub fn attachable(&self, id: UniqueId) -> Option<&Attachable> {
        self.attachables.iter().find(|child| child.id() == id)
    }

    /// Returns the attachable with the given `id` anywhere in the tree below this body.
    pub fn find_attachable(&self, id: UniqueId) -> Option<&Attachable> {
        self.attachables.iter().find_map(|child| {
            if child.id() == id {
                Some(child)
            } else {
                child.find_attachable(id)
            }
        })
    }

    pub(crate) fn parent_state(&self, can_collide: bool) -> ParentState {
        ParentState {
            id: self.id,
            root_id: self.root_id,
            pos: self.pos,
            vel: self.vel,
            rotation: self.rotation,
            flipped: self.h_flipped,
            frame: self.frame,
            can_collide,
        }
    }

    /// Adds `delta` to the cached mass of attachables and wounds.
    fn update_attachable_and_wound_mass(&mut self, delta: f32) {
        self.attachable_and_wound_mass = (self.attachable_and_wound_mass + delta).max(0.0);
    }

    /// Runs one tick for this body and everything attached to it.
    pub fn update<C>(&mut self, ctx: &mut C)
    where
        C: WorldContext + ?Sized,
    {
        self.update_tick(ctx, true);
    }

    pub(crate) fn update_tick<C>(&mut self, ctx: &mut C, can_collide: bool)
    where
        C: WorldContext + ?Sized,
    {
        let _span = trace_span!("Body::update").entered();

        if self.to_delete {
            return;
        }

        self.update_wounds(ctx);
        self.update_attachables(ctx, can_collide);
    }

    /// Integrates the motion of this body over one frame.
    ///
    /// Only free bodies travel. Attached bodies are positioned by their parents.
    pub fn travel<C>(&mut self, ctx: &mut C)
    where
        C: WorldContext + ?Sized,
    {
        let _span = trace_span!("Body::travel").entered();

        if self.to_delete {
            return;
        }

        let dt = ctx.frame_time().as_secs_f32();

        self.prev_vel = self.vel;
        self.apply_forces(dt);
        self.vel += ctx.gravity() * dt;

        self.apply_impulses(ctx);
        if self.to_delete {
            return;
        }

        self.pos = ctx.scene_wrap().wrap(self.pos + self.vel * dt * PIXELS_PER_METER);
        self.rotation = Rotation::new(self.rotation.angle() + self.ang_vel * dt);

        if self.move_out_of_terrain(ctx.terrain(), 0.0) > 0 {
            self.vel = Vec2::ZERO;
            self.ang_vel = 0.0;
        }
    }

    /// Applies all queued forces over `dt` seconds.
    pub fn apply_forces(&mut self, dt: f32) {
        let forces = self.forces.drain();
        if forces.is_empty() {
            return;
        }

        let mass = self.mass().max(f32::EPSILON);
        let moment_of_inertia = self.moment_of_inertia();

        for force in forces {
            self.vel += force.vector / mass * dt;
            let torque = (force.offset * METERS_PER_PIXEL).perp_dot(force.vector);
            self.ang_vel += torque / moment_of_inertia * dt;
        }
    }

    /// Applies all queued impulses, gibbing this body if they exceed its gib impulse limit.
    pub fn apply_impulses<C>(&mut self, ctx: &mut C)
    where
        C: WorldContext + ?Sized,
    {
        let impulses = self.impulses.drain();
        if impulses.is_empty() {
            return;
        }

        let total: Vec2 = impulses.iter().map(|impulse| impulse.vector).sum();
        let limit = self.effective_gib_impulse_limit();

        if limit > 0.0 && total.length() > limit {
            let remaining = self.detach_attachables_from_impulse(total, ctx);
            if remaining.length() > limit {
                self.gib_this(total, None, ctx);
                return;
            }
        }

        let mass = self.mass().max(f32::EPSILON);
        let moment_of_inertia = self.moment_of_inertia();

        for impulse in impulses {
            self.vel += impulse.vector / mass;
            let torque = (impulse.offset * METERS_PER_PIXEL).perp_dot(impulse.vector);
            self.ang_vel += torque / moment_of_inertia;
        }
    }

    /// Returns the gib impulse limit lowered by the current wound count.
    pub fn effective_gib_impulse_limit(&self) -> f32 {
        let ratio = self.wound_count_affects_impulse_limit_ratio;
        if ratio == 0.0 || self.gib_wound_limit == 0 {
            return self.gib_impulse_limit;
        }

        let wounds = self.wounds.len() as f32 / self.gib_wound_limit as f32;
        (self.gib_impulse_limit * (1.0 - wounds * ratio)).max(0.0)
    }

    /// Gives this body and everything it owns new ids. Returns the new ids of the direct
    /// children keyed by their old ids.
    pub(crate) fn reassign_ids(&mut self) -> HashMap<UniqueId, UniqueId> {
        self.id = UniqueId::new();
        self.root_id = self.id;
        self.atoms.clear_subgroups();
        self.atoms_dirty = true;

        let id = self.id;
        let mut mapping = HashMap::new();
        for child in self.attachables.iter_mut().chain(self.wounds.iter_mut()) {
            let old = child.id();
            child.reassign_ids();
            child.merged_atoms = None;
            if let Some(link) = &mut child.parent {
                link.id = id;
                link.root_id = id;
            }
            mapping.insert(old, child.id());
        }

        if let Some((old, reach)) = self.farthest_attachable {
            self.farthest_attachable = mapping.get(&old).map(|new| (*new, reach));
        }

        for index in 0..self.attachables.len() {
            self.sync_attachable_atoms(index);
        }

        mapping
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::new()
    }
}

impl Serializable for Body {
    const CLASS: &'static str = "MOSRotating";

    fn read_property(&mut self, prop: &Property) -> Result<bool, Error> {
        match prop.name.as_str() {
            "PresetName" => self.preset_name = prop.value.clone(),
            "Mass" => self.set_individual_mass(prop.parse()?),
            "Radius" => self.set_individual_radius(prop.parse()?),
            "FrameCount" => self.frame_count = prop.parse::<u32>()?.max(1),
            "HFlipped" => self.h_flipped = prop.as_bool()?,
            "Team" => self.team = Team(prop.parse()?),
            "AddAtom" => {
                self.atoms.set_own_atoms({
                    let mut atoms = self.atoms.own_atoms().to_vec();
                    atoms.push(prop.as_vec2()?);
                    atoms
                });
                self.atoms_dirty = true;
            }
            "AddAttachable" => self.add_attachable(Attachable::from_property(prop)?),
            "AddWound" => {
                let wound = Attachable::from_property(prop)?;
                let offset = wound.parent_offset();
                self.push_wound(wound, offset);
            }
            "AddGib" => self.gibs.push(game_data::read_object(prop)?),
            "GibImpulseLimit" => self.gib_impulse_limit = prop.parse()?,
            "GibWoundLimit" => self.gib_wound_limit = prop.parse()?,
            "WoundCountAffectsImpulseLimitRatio" => self.wound_count_affects_impulse_limit_ratio = prop.parse()?,
            "GibBlastStrength" => self.gib_blast_strength = prop.parse()?,
            "GibSound" => self.gib_sound = Some(SoundRef::read(prop)?),
            "GibScreenShakeAmount" => self.gib_screen_shake_amount = Some(prop.parse()?),
            "DetachAttachablesBeforeGibbingFromWounds" => {
                self.detach_attachables_before_gibbing_from_wounds = prop.as_bool()?;
            }
            _ => return Ok(false),
        }

        Ok(true)
    }

    fn save(&self, writer: &mut Writer) {
        if !self.preset_name.is_empty() {
            writer.property("PresetName", &self.preset_name);
        }

        writer.property("Mass", self.mass);
        writer.property("Radius", self.individual_radius);
        writer.property("FrameCount", self.frame_count);
        writer.bool("HFlipped", self.h_flipped);
        writer.property("Team", self.team.0);

        for atom in self.atoms.own_atoms() {
            writer.vec2("AddAtom", *atom);
        }

        for child in &self.attachables {
            child.write(writer, "AddAttachable");
        }

        for wound in &self.wounds {
            wound.write(writer, "AddWound");
        }

        for gib in &self.gibs {
            game_data::write_object(writer, "AddGib", gib);
        }

        writer.property("GibImpulseLimit", self.gib_impulse_limit);
        writer.property("GibWoundLimit", self.gib_wound_limit);
        writer.property(
            "WoundCountAffectsImpulseLimitRatio",
            self.wound_count_affects_impulse_limit_ratio,
        );
        writer.property("GibBlastStrength", self.gib_blast_strength);
        if let Some(sound) = &self.gib_sound {
            sound.write(writer, "GibSound");
        }
        if let Some(amount) = self.gib_screen_shake_amount {
            writer.property("GibScreenShakeAmount", amount);
        }
        writer.bool(
            "DetachAttachablesBeforeGibbingFromWounds",
            self.detach_attachables_before_gibbing_from_wounds,
        );
    }
}
