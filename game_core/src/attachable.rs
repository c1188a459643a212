//! Rigid parts joined to a parent body.
//!
//! An [`Attachable`] is a [`Body`] with a joint. While attached, the parent owns it in its
//! attachable list and positions it every tick; the attachable only keeps the id of its parent.
//! Forces and impulses acting on the attachable are handed to the parent through the joint,
//! which breaks once the transferred impulse exceeds the joint strength.

use std::ops::{Deref, DerefMut};

use game_common::math::{Rotation, Vec2Ext};
use game_common::units::METERS_PER_PIXEL;
use game_common::UniqueId;
use game_data::{Error, Property, Serializable, Writer};
use game_physics::HitData;
use glam::Vec2;

use crate::arm::Arm;
use crate::body::Body;
use crate::context::WorldContext;
use crate::emitter::{Emitter, EmitterHost};
use crate::leg::Leg;

/// How the horizontal flip of the parent is inherited.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FlipInheritance {
    /// The flip is never copied from the parent.
    None,
    /// The flip always equals the flip of the parent.
    #[default]
    Normal,
    /// The flip is always the opposite of the flip of the parent.
    Reversed,
}

impl FlipInheritance {
    fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Normal),
            -1 => Some(Self::Reversed),
            _ => None,
        }
    }

    fn value(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Normal => 1,
            Self::Reversed => -1,
        }
    }
}

/// The non-owning link from an attachable to its parent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct ParentLink {
    pub id: UniqueId,
    /// The topmost body of the tree the attachable belongs to.
    pub root_id: UniqueId,
    /// Whether the parent is able to collide with terrain.
    pub(crate) chain_collides: bool,
}

/// The state of a parent that is inherited by its attachables every tick.
#[derive(Copy, Clone, Debug)]
pub(crate) struct ParentState {
    pub id: UniqueId,
    pub root_id: UniqueId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: Rotation,
    pub flipped: bool,
    pub frame: u32,
    pub can_collide: bool,
}

/// The specialized behavior of an attachable.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Role {
    #[default]
    Plain,
    Emitter(Emitter),
    Arm(Arm),
    Leg(Leg),
}

/// The outcome of transferring the impulses of an attachable through its joint.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum JointStatus {
    /// The joint held. The full impulse was transferred.
    Held,
    /// The impulse exceeded the joint strength. The attachable must be detached.
    Broken,
    /// The impulse exceeded the gib impulse limit. The attachable must be gibbed.
    Gibbed,
    /// The attachable has no parent. Nothing was transferred.
    Unattached,
}

impl JointStatus {
    #[inline]
    pub fn is_held(self) -> bool {
        matches!(self, Self::Held)
    }
}

/// Values replacing the joint parameters of an attachable for a single transfer.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct JointOverrides {
    pub stiffness: Option<f32>,
    pub strength: Option<f32>,
    pub gib_impulse_limit: Option<f32>,
}

/// The atom subgroup merged into the parent, as of the last merge.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct MergedAtoms {
    pub relative_angle: f32,
    pub parent_offset: Vec2,
    pub joint_offset: Vec2,
}

#[derive(Clone, Debug)]
pub struct Attachable {
    pub(crate) body: Body,
    pub(crate) parent: Option<ParentLink>,
    /// Offset from the parent's center to the joint, in the parent's unrotated frame.
    pub(crate) parent_offset: Vec2,
    /// Offset from this body's center to the joint, in its unrotated frame.
    pub(crate) joint_offset: Vec2,
    joint_pos: Vec2,
    parent_angle: f32,
    /// Impulse magnitude in kg·m/s that breaks the joint. `0` never breaks.
    pub joint_strength: f32,
    /// Fraction of forces and impulses transferred to the parent.
    pub joint_stiffness: f32,
    pub inherits_h_flipped: FlipInheritance,
    pub inherits_rot_angle: bool,
    pub inherited_rot_angle_offset: f32,
    pub inherits_frame: bool,
    pub delete_when_removed_from_parent: bool,
    pub gib_when_removed_from_parent: bool,
    /// Chance in `[0, 1]` to be gibbed together with the parent instead of being released.
    pub gib_with_parent_chance: f32,
    pub parent_gib_blast_strength_multiplier: f32,
    pub draw_after_parent: bool,
    pub collides_with_terrain_while_attached: bool,
    pub ignores_particles_while_attached: bool,
    /// Multiplier for damage passed on to the parent. Negative values heal the parent.
    pub damage_multiplier: f32,
    /// Name of the emitter preset added to this attachable when its joint breaks.
    pub break_wound: Option<String>,
    /// Name of the emitter preset added to the parent when the joint breaks.
    pub parent_break_wound: Option<String>,
    pub(crate) is_wound: bool,
    pub(crate) merged_atoms: Option<MergedAtoms>,
    role: Role,
}

impl Attachable {
    pub fn new() -> Self {
        Self::with_role(Role::Plain)
    }

    pub fn with_role(role: Role) -> Self {
        let inherits_rot_angle = matches!(role, Role::Plain | Role::Emitter(_));

        Self {
            body: Body::new(),
            parent: None,
            parent_offset: Vec2::ZERO,
            joint_offset: Vec2::ZERO,
            joint_pos: Vec2::ZERO,
            parent_angle: 0.0,
            joint_strength: 10.0,
            joint_stiffness: 1.0,
            inherits_h_flipped: FlipInheritance::Normal,
            inherits_rot_angle,
            inherited_rot_angle_offset: 0.0,
            inherits_frame: false,
            delete_when_removed_from_parent: false,
            gib_when_removed_from_parent: false,
            gib_with_parent_chance: 0.0,
            parent_gib_blast_strength_multiplier: 1.0,
            draw_after_parent: true,
            collides_with_terrain_while_attached: true,
            ignores_particles_while_attached: false,
            damage_multiplier: 1.0,
            break_wound: None,
            parent_break_wound: None,
            is_wound: false,
            merged_atoms: None,
            role,
        }
    }

    /// Creates a new emitter.
    pub fn emitter(emitter: Emitter) -> Self {
        let mut attachable = Self::with_role(Role::Emitter(emitter));
        attachable.collides_with_terrain_while_attached = false;
        attachable.joint_strength = 0.0;
        attachable
    }

    /// Reads an attachable from a property whose value names its class.
    ///
    /// # Errors
    ///
    /// Returns an [`Error`] if the class is unknown or any child property is invalid.
    pub fn from_property(prop: &Property) -> Result<Self, Error> {
        let role = match prop.value.as_str() {
            "Attachable" => Role::Plain,
            "AEmitter" => Role::Emitter(Emitter::new()),
            "Arm" => Role::Arm(Arm::new()),
            "Leg" => Role::Leg(Leg::new()),
            _ => return Err(prop.unknown_class()),
        };

        let mut attachable = match role {
            Role::Emitter(emitter) => Self::emitter(emitter),
            role => Self::with_role(role),
        };

        game_data::apply(&mut attachable, &prop.children)?;
        Ok(attachable)
    }

    /// Returns the class name of this attachable in preset files.
    pub fn class_name(&self) -> &'static str {
        match self.role {
            Role::Plain => <Self as Serializable>::CLASS,
            Role::Emitter(_) => Emitter::CLASS,
            Role::Arm(_) => Arm::CLASS,
            Role::Leg(_) => Leg::CLASS,
        }
    }

    /// Writes this attachable as a nested block named `name`.
    pub fn write(&self, writer: &mut Writer, name: &str) {
        writer.begin(name, self.class_name());
        self.save(writer);
        writer.end();
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn role(&self) -> &Role {
        &self.role
    }

    pub fn as_emitter(&self) -> Option<&Emitter> {
        match &self.role {
            Role::Emitter(emitter) => Some(emitter),
            _ => None,
        }
    }

    pub fn as_emitter_mut(&mut self) -> Option<&mut Emitter> {
        match &mut self.role {
            Role::Emitter(emitter) => Some(emitter),
            _ => None,
        }
    }

    pub fn as_arm(&self) -> Option<&Arm> {
        match &self.role {
            Role::Arm(arm) => Some(arm),
            _ => None,
        }
    }

    pub fn as_arm_mut(&mut self) -> Option<&mut Arm> {
        match &mut self.role {
            Role::Arm(arm) => Some(arm),
            _ => None,
        }
    }

    pub fn as_leg(&self) -> Option<&Leg> {
        match &self.role {
            Role::Leg(leg) => Some(leg),
            _ => None,
        }
    }

    pub fn as_leg_mut(&mut self) -> Option<&mut Leg> {
        match &mut self.role {
            Role::Leg(leg) => Some(leg),
            _ => None,
        }
    }

    pub fn parent(&self) -> Option<ParentLink> {
        self.parent
    }

    pub fn is_attached(&self) -> bool {
        self.parent.is_some()
    }

    /// Returns the id of the topmost body this attachable belongs to, its own id if unattached.
    pub fn root_id(&self) -> UniqueId {
        match self.parent {
            Some(link) => link.root_id,
            None => self.body.id(),
        }
    }

    pub fn is_wound(&self) -> bool {
        self.is_wound
    }

    pub fn parent_offset(&self) -> Vec2 {
        self.parent_offset
    }

    pub fn set_parent_offset(&mut self, offset: Vec2) {
        self.parent_offset = offset;
    }

    pub fn joint_offset(&self) -> Vec2 {
        self.joint_offset
    }

    pub fn set_joint_offset(&mut self, offset: Vec2) {
        self.joint_offset = offset;
    }

    /// Returns the scene position of the joint.
    ///
    /// This is only meaningful while attached, after the parent positioned this attachable.
    pub fn joint_pos(&self) -> Option<Vec2> {
        self.parent.map(|_| self.joint_pos)
    }

    /// Returns the distance from the center of the parent to the far edge of this attachable.
    pub(crate) fn reach_from_parent(&self) -> f32 {
        (self.parent_offset - self.joint_offset).length() + self.body.radius()
    }

    /// Returns `true` if this attachable takes part in terrain collisions.
    ///
    /// Attached attachables only collide if they are configured to and every parent up to the
    /// root collides as well.
    pub fn can_collide_with_terrain(&self) -> bool {
        match self.parent {
            Some(link) => self.collides_with_terrain_while_attached && link.chain_collides,
            None => true,
        }
    }

    pub(crate) fn attach_to(&mut self, parent: &ParentState) {
        debug_assert!(self.parent.is_none(), "attachable {} is already attached", self.body.id());

        self.parent = Some(ParentLink {
            id: parent.id,
            root_id: parent.root_id,
            chain_collides: parent.can_collide,
        });
        self.merged_atoms = None;
        self.apply_parent_state(parent);
    }

    pub(crate) fn detach(&mut self) {
        self.parent = None;
        self.is_wound = false;
        self.merged_atoms = None;
        self.body.root_id = self.body.id();
    }

    /// Copies the inherited state of the parent and moves this attachable to its joint.
    pub(crate) fn apply_parent_state(&mut self, parent: &ParentState) {
        if let Some(link) = &mut self.parent {
            link.root_id = parent.root_id;
            link.chain_collides = parent.can_collide;
        }
        self.body.root_id = parent.root_id;

        match self.inherits_h_flipped {
            FlipInheritance::None => (),
            FlipInheritance::Normal => self.body.h_flipped = parent.flipped,
            FlipInheritance::Reversed => self.body.h_flipped = !parent.flipped,
        }

        if self.inherits_rot_angle {
            let offset = if self.body.h_flipped {
                -self.inherited_rot_angle_offset
            } else {
                self.inherited_rot_angle_offset
            };

            self.body.rotation = Rotation::new(parent.rotation.angle() + offset);
            self.body.ang_vel = 0.0;
        }

        if self.inherits_frame {
            self.body.frame = parent.frame;
        }

        self.parent_angle = parent.rotation.angle();
        self.joint_pos = parent.pos + parent.rotation.rotate(self.parent_offset.flip_x(parent.flipped));
        self.body.vel = parent.vel;
        self.move_to_joint();
    }

    fn move_to_joint(&mut self) {
        let flipped = self.body.h_flipped;
        self.body.pos = self.joint_pos - self.body.rotation.rotate(self.joint_offset.flip_x(flipped));
    }

    /// Runs one tick for this attachable and all of its own attachables.
    pub fn update<C>(&mut self, ctx: &mut C)
    where
        C: WorldContext + ?Sized,
    {
        if self.body.to_delete() {
            return;
        }

        self.update_role(ctx);

        let can_collide = self.can_collide_with_terrain();
        self.body.update_tick(ctx, can_collide);
    }

    fn update_role<C>(&mut self, ctx: &mut C)
    where
        C: WorldContext + ?Sized,
    {
        let attached = self.parent.is_some();
        let flipped = self.body.h_flipped;
        let frame = Rotation::new(self.parent_angle);

        match &mut self.role {
            Role::Plain => (),
            Role::Emitter(emitter) => {
                let host = EmitterHost {
                    id: self.body.id(),
                    pos: self.body.pos,
                    vel: self.body.vel,
                    rotation: self.body.rotation,
                    flipped,
                    team: self.body.team,
                };
                emitter.update(&host, ctx);
            }
            Role::Arm(arm) => {
                if !attached {
                    return;
                }

                if let Some(device) = arm.held_device {
                    if self.body.attachable(device).is_none() {
                        arm.held_device = None;
                    }
                }

                let hand = arm.update(self.joint_pos, frame, flipped, ctx.frame_time());
                let hand_pos = self.joint_pos + frame.rotate(hand.flip_x(flipped));

                if !self.inherits_rot_angle && hand != Vec2::ZERO {
                    let angle = (hand_pos - self.joint_pos).abs_angle() - Vec2::X.flip_x(flipped).abs_angle();
                    self.body.rotation = Rotation::new(angle);
                }

                let held_device = arm.held_device;
                self.move_to_joint();

                if let Some(device) = held_device {
                    let offset = self.body.rotation.unrotate(hand_pos - self.body.pos).flip_x(flipped);
                    self.body.with_attachable_mut(device, |device| device.parent_offset = offset);
                }
            }
            Role::Leg(leg) => {
                if !attached {
                    return;
                }

                if let Some(foot) = leg.foot {
                    if self.body.attachable(foot).is_none() {
                        leg.foot = None;
                    }
                }

                let ankle = leg.update(self.joint_pos, frame, flipped);
                let ankle_pos = self.joint_pos + frame.rotate(ankle.flip_x(flipped));

                if !self.inherits_rot_angle && ankle != Vec2::ZERO {
                    let rest = leg.extended_offset().flip_x(flipped);
                    let angle = (ankle_pos - self.joint_pos).abs_angle() - rest.abs_angle();
                    self.body.rotation = Rotation::new(angle);
                }

                let frame_count = self.body.frame_count;
                if frame_count > 1 {
                    let ratio = leg.extension_ratio();
                    self.body.frame = (ratio * (frame_count - 1) as f32).round() as u32;
                }

                let foot = leg.foot;
                self.move_to_joint();

                if let Some(foot) = foot {
                    let offset = self.body.rotation.unrotate(ankle_pos - self.body.pos).flip_x(flipped);
                    self.body.with_attachable_mut(foot, |foot| foot.parent_offset = offset);
                }
            }
        }
    }

    /// Integrates the motion of this attachable if it is free. Attached attachables are moved
    /// by their parent.
    pub fn travel<C>(&mut self, ctx: &mut C)
    where
        C: WorldContext + ?Sized,
    {
        if self.parent.is_none() {
            self.body.travel(ctx);
        }
    }

    /// Hands the forces accumulated this tick to the parent, scaled by the joint stiffness.
    ///
    /// Returns `false` if this attachable is not attached.
    pub fn transfer_joint_forces(&mut self, joint_forces: &mut Vec2) -> bool {
        if self.parent.is_none() {
            return false;
        }

        let forces = self.body.forces.drain();
        let total: Vec2 = forces.iter().map(|force| force.vector).sum();
        *joint_forces += total * self.joint_stiffness;
        true
    }

    /// Hands the impulses accumulated this tick to the parent.
    ///
    /// The summed impulse is scaled by the joint stiffness. If it exceeds the joint strength,
    /// only an impulse of exactly the joint strength is added to `joint_impulses` and the
    /// joint breaks. If it also exceeds the gib impulse limit the attachable is to be gibbed.
    /// The parent performs the detachment for both outcomes.
    pub fn transfer_joint_impulses(&mut self, joint_impulses: &mut Vec2, overrides: JointOverrides) -> JointStatus {
        if self.parent.is_none() {
            return JointStatus::Unattached;
        }

        let stiffness = overrides.stiffness.unwrap_or(self.joint_stiffness);
        let strength = overrides.strength.unwrap_or(self.joint_strength);
        let gib_limit = overrides.gib_impulse_limit.unwrap_or(self.body.gib_impulse_limit);

        let impulses = self.body.impulses.drain();
        if impulses.is_empty() {
            return JointStatus::Held;
        }

        let total = impulses.iter().map(|impulse| impulse.vector).sum::<Vec2>() * stiffness;

        if !self.inherits_rot_angle && stiffness < 1.0 {
            let moment_of_inertia = self.body.moment_of_inertia();
            for impulse in &impulses {
                let torque = (impulse.offset * METERS_PER_PIXEL).perp_dot(impulse.vector);
                self.body.ang_vel += torque / moment_of_inertia * (1.0 - stiffness);
            }
        }

        let magnitude = total.length();

        if gib_limit > 0.0 && magnitude > gib_limit.max(strength) {
            let transferred = if strength > 0.0 { strength.min(gib_limit) } else { gib_limit };
            *joint_impulses += total.with_magnitude(transferred);
            self.body.last_impulse = total;
            tracing::debug!("joint of {} gibbed by impulse {}", self.body.id(), magnitude);
            return JointStatus::Gibbed;
        }

        if strength > 0.0 && magnitude > strength {
            *joint_impulses += total.with_magnitude(strength);
            self.body.last_impulse = total;
            tracing::debug!("joint of {} broke at impulse {}", self.body.id(), magnitude);
            return JointStatus::Broken;
        }

        *joint_impulses += total;
        JointStatus::Held
    }

    /// Applies a collision to this attachable.
    pub fn collide_at_point(&mut self, hit: &mut HitData) -> bool {
        if self.parent.is_some() && self.ignores_particles_while_attached && hit.is_particle {
            return false;
        }

        self.body.collide_at_point(hit)
    }

    /// Drains the damage accumulated by this attachable and its own attachables.
    pub fn collect_damage(&mut self) -> f32 {
        self.body.collect_damage()
    }

    /// Puts `device` into the hand of this arm and returns the previously held device.
    ///
    /// If this attachable is not an arm, `device` is handed back unchanged.
    pub fn set_held_device(&mut self, device: Option<Attachable>) -> Option<Attachable> {
        let Role::Arm(arm) = &mut self.role else {
            tracing::warn!("cannot hold a device with {} which is not an arm", self.body.id());
            return device;
        };

        let previous = arm.held_device.take().and_then(|id| self.body.take_attachable(id));

        if let Some(mut device) = device {
            device.parent_offset = Vec2::ZERO;
            arm.held_device = Some(device.body.id());
            self.body.add_attachable(device);
        }

        previous
    }

    /// Puts `foot` onto the ankle of this leg and returns the previous foot.
    ///
    /// If this attachable is not a leg, `foot` is handed back unchanged.
    pub fn set_foot(&mut self, foot: Option<Attachable>) -> Option<Attachable> {
        let Role::Leg(leg) = &mut self.role else {
            tracing::warn!("cannot attach a foot to {} which is not a leg", self.body.id());
            return foot;
        };

        let previous = leg.foot.take().and_then(|id| self.body.take_attachable(id));

        if let Some(mut foot) = foot {
            foot.parent_offset = leg.ankle_offset();
            leg.foot = Some(foot.body.id());
            self.body.add_attachable(foot);
        }

        previous
    }

    /// Returns a copy of this attachable with new ids for itself and everything it owns.
    pub fn instantiate(&self) -> Self {
        let mut copy = self.clone();
        copy.parent = None;
        copy.is_wound = false;
        copy.merged_atoms = None;
        copy.reassign_ids();
        copy
    }

    pub(crate) fn reassign_ids(&mut self) {
        let mapping = self.body.reassign_ids();

        match &mut self.role {
            Role::Arm(arm) => arm.held_device = arm.held_device.and_then(|id| mapping.get(&id).copied()),
            Role::Leg(leg) => leg.foot = leg.foot.and_then(|id| mapping.get(&id).copied()),
            _ => (),
        }
    }
}

impl Default for Attachable {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Attachable {
    type Target = Body;

    #[inline]
    fn deref(&self) -> &Body {
        &self.body
    }
}

impl DerefMut for Attachable {
    #[inline]
    fn deref_mut(&mut self) -> &mut Body {
        &mut self.body
    }
}

impl Serializable for Attachable {
    const CLASS: &'static str = "Attachable";

    fn read_property(&mut self, prop: &Property) -> Result<bool, Error> {
        match prop.name.as_str() {
            "ParentOffset" => self.parent_offset = prop.as_vec2()?,
            "JointOffset" => self.joint_offset = prop.as_vec2()?,
            "JointStrength" => self.joint_strength = prop.parse()?,
            "JointStiffness" => self.joint_stiffness = prop.parse::<f32>()?.clamp(0.0, 1.0),
            "InheritsHFlipped" => {
                self.inherits_h_flipped = FlipInheritance::from_value(prop.parse()?).ok_or_else(|| prop.invalid())?;
            }
            "InheritsRotAngle" => self.inherits_rot_angle = prop.as_bool()?,
            "InheritedRotAngleOffset" => self.inherited_rot_angle_offset = prop.parse()?,
            "InheritsFrame" => self.inherits_frame = prop.as_bool()?,
            "DeleteWhenRemovedFromParent" => self.delete_when_removed_from_parent = prop.as_bool()?,
            "GibWhenRemovedFromParent" => self.gib_when_removed_from_parent = prop.as_bool()?,
            "GibWithParentChance" => self.gib_with_parent_chance = prop.parse()?,
            "ParentGibBlastStrengthMultiplier" => self.parent_gib_blast_strength_multiplier = prop.parse()?,
            "DrawAfterParent" => self.draw_after_parent = prop.as_bool()?,
            "CollidesWithTerrainWhileAttached" => self.collides_with_terrain_while_attached = prop.as_bool()?,
            "IgnoresParticlesWhileAttached" => self.ignores_particles_while_attached = prop.as_bool()?,
            "DamageMultiplier" => self.damage_multiplier = prop.parse()?,
            "BreakWound" => {
                self.break_wound = Some(prop.preset_reference().ok_or_else(|| prop.invalid())?.to_owned());
            }
            "ParentBreakWound" => {
                self.parent_break_wound = Some(prop.preset_reference().ok_or_else(|| prop.invalid())?.to_owned());
            }
            _ => {
                let known = match &mut self.role {
                    Role::Plain => false,
                    Role::Emitter(emitter) => emitter.read_property(prop)?,
                    Role::Arm(arm) => arm.read_property(prop)?,
                    Role::Leg(leg) => leg.read_property(prop)?,
                };

                if known {
                    return Ok(true);
                }

                return self.body.read_property(prop);
            }
        }

        Ok(true)
    }

    fn save(&self, writer: &mut Writer) {
        self.body.save(writer);

        writer.vec2("ParentOffset", self.parent_offset);
        writer.vec2("JointOffset", self.joint_offset);
        writer.property("JointStrength", self.joint_strength);
        writer.property("JointStiffness", self.joint_stiffness);
        writer.property("InheritsHFlipped", self.inherits_h_flipped.value());
        writer.bool("InheritsRotAngle", self.inherits_rot_angle);
        writer.property("InheritedRotAngleOffset", self.inherited_rot_angle_offset);
        writer.bool("InheritsFrame", self.inherits_frame);
        writer.bool("DeleteWhenRemovedFromParent", self.delete_when_removed_from_parent);
        writer.bool("GibWhenRemovedFromParent", self.gib_when_removed_from_parent);
        writer.property("GibWithParentChance", self.gib_with_parent_chance);
        writer.property(
            "ParentGibBlastStrengthMultiplier",
            self.parent_gib_blast_strength_multiplier,
        );
        writer.bool("DrawAfterParent", self.draw_after_parent);
        writer.bool(
            "CollidesWithTerrainWhileAttached",
            self.collides_with_terrain_while_attached,
        );
        writer.bool(
            "IgnoresParticlesWhileAttached",
            self.ignores_particles_while_attached,
        );
        writer.property("DamageMultiplier", self.damage_multiplier);
        if let Some(wound) = &self.break_wound {
            writer.reference("BreakWound", Emitter::CLASS, wound);
        }
        if let Some(wound) = &self.parent_break_wound {
            writer.reference("ParentBreakWound", Emitter::CLASS, wound);
        }

        match &self.role {
            Role::Plain => (),
            Role::Emitter(emitter) => emitter.save(writer),
            Role::Arm(arm) => arm.save(writer),
            Role::Leg(leg) => leg.save(writer),
        }
    }
}
