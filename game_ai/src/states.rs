//! Locomotion state axes of an actor.
//!
//! Movement, device handling, sweeping, digging and jumping are independent. Each axis has
//! its own state enum and transition rules, and [`LocomotionStates`] only bundles them.

use crate::controller::{ControlState, ControlStates};

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum MovementState {
    NoMove,
    #[default]
    Stand,
    Walk,
    Jump,
    Dislodge,
    Crouch,
    Crawl,
    ArmCrawl,
    Climb,
}

impl MovementState {
    /// Returns the movement state following `self` for the given controls.
    pub fn next(self, controls: ControlStates, grounded: bool) -> Self {
        let moving = controls.contains(ControlState::MoveLeft) || controls.contains(ControlState::MoveRight);
        let crouching = controls.contains(ControlState::BodyCrouch);

        if !grounded {
            return match self {
                Self::Jump | Self::Climb => self,
                _ => Self::NoMove,
            };
        }

        if controls.contains(ControlState::BodyJump) {
            return Self::Jump;
        }

        match (moving, crouching) {
            (true, true) => match self {
                Self::Crawl | Self::ArmCrawl => self,
                _ => Self::Crawl,
            },
            (false, true) => Self::Crouch,
            (true, false) => Self::Walk,
            (false, false) => Self::Stand,
        }
    }

    #[inline]
    pub fn is_moving(self) -> bool {
        matches!(self, Self::Walk | Self::Crawl | Self::ArmCrawl | Self::Climb)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DeviceHandlingState {
    #[default]
    Still,
    Pointing,
    Scanning,
    Aiming,
    Firing,
    Thrown,
    Digging,
}

impl DeviceHandlingState {
    pub fn next(self, controls: ControlStates, holds_device: bool, digging: bool) -> Self {
        if !holds_device {
            return Self::Still;
        }

        if digging {
            return Self::Digging;
        }

        if controls.contains(ControlState::WeaponFire) {
            return Self::Firing;
        }

        if controls.contains(ControlState::AimSharp) {
            Self::Aiming
        } else if controls.contains(ControlState::AimUp) || controls.contains(ControlState::AimDown) {
            Self::Scanning
        } else {
            Self::Pointing
        }
    }
}

/// The state of a sweeping aim, e.g. of a scanning sentry.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum SweepState {
    #[default]
    NoSweep,
    SweepingUp,
    SweepUpPause,
    SweepingDown,
    SweepDownPause,
}

impl SweepState {
    /// Returns the next phase of the sweep cycle. [`NoSweep`] stays.
    ///
    /// [`NoSweep`]: Self::NoSweep
    pub fn advance(self) -> Self {
        match self {
            Self::NoSweep => Self::NoSweep,
            Self::SweepingUp => Self::SweepUpPause,
            Self::SweepUpPause => Self::SweepingDown,
            Self::SweepingDown => Self::SweepDownPause,
            Self::SweepDownPause => Self::SweepingUp,
        }
    }

    pub fn is_paused(self) -> bool {
        matches!(self, Self::SweepUpPause | Self::SweepDownPause)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum DigState {
    #[default]
    NotDigging,
    PreDig,
    StartingDig,
    TunnelingDig,
    FinishingDig,
    PauseDig,
}

impl DigState {
    /// Returns the dig state following `self` while digging is requested or not.
    pub fn next(self, digging: bool) -> Self {
        match (self, digging) {
            (Self::NotDigging, true) => Self::PreDig,
            (Self::NotDigging, false) => Self::NotDigging,
            (Self::PreDig, true) => Self::StartingDig,
            (Self::PreDig, false) => Self::NotDigging,
            (Self::StartingDig | Self::PauseDig, true) => Self::TunnelingDig,
            (Self::TunnelingDig, true) => Self::TunnelingDig,
            (Self::StartingDig | Self::TunnelingDig, false) => Self::FinishingDig,
            (Self::FinishingDig, true) => Self::PauseDig,
            (Self::FinishingDig | Self::PauseDig, false) => Self::NotDigging,
        }
    }

    pub fn is_digging(self) -> bool {
        !matches!(self, Self::NotDigging)
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum JumpState {
    #[default]
    NotJumping,
    ForwardJump,
    PrepareJump,
    UpJump,
    ApexJump,
    LandJump,
}

impl JumpState {
    /// Returns the jump state following `self`.
    ///
    /// `vertical_vel` is the vertical velocity of the actor in m/s, positive downwards.
    pub fn next(self, controls: ControlStates, grounded: bool, vertical_vel: f32) -> Self {
        let jump = controls.contains(ControlState::BodyJump);
        let moving = controls.contains(ControlState::MoveLeft) || controls.contains(ControlState::MoveRight);

        match self {
            Self::NotJumping if jump && grounded => Self::PrepareJump,
            Self::NotJumping => Self::NotJumping,
            Self::PrepareJump if moving => Self::ForwardJump,
            Self::PrepareJump => Self::UpJump,
            Self::ForwardJump | Self::UpJump if vertical_vel >= 0.0 && !grounded => Self::ApexJump,
            Self::ForwardJump | Self::UpJump if grounded && vertical_vel >= 0.0 => Self::LandJump,
            Self::ForwardJump | Self::UpJump => self,
            Self::ApexJump if grounded => Self::LandJump,
            Self::ApexJump => Self::ApexJump,
            Self::LandJump => Self::NotJumping,
        }
    }

    /// Returns `true` while the actor rises from the ground.
    pub fn is_takeoff(self) -> bool {
        matches!(self, Self::UpJump | Self::ForwardJump)
    }
}

/// The current state of every locomotion axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct LocomotionStates {
    pub movement: MovementState,
    pub device: DeviceHandlingState,
    pub sweep: SweepState,
    pub dig: DigState,
    pub jump: JumpState,
}

impl LocomotionStates {
    /// Advances all axes except the sweep, which is driven by its own timer.
    pub fn update(&mut self, controls: ControlStates, grounded: bool, vertical_vel: f32, holds_device: bool) {
        let digging = holds_device && controls.contains(ControlState::PrimaryAction);

        self.movement = self.movement.next(controls, grounded);
        self.dig = self.dig.next(digging);
        self.device = self.device.next(controls, holds_device, self.dig.is_digging());
        self.jump = self.jump.next(controls, grounded, vertical_vel);
    }
}

#[cfg(test)]
mod tests {
    use super::{DeviceHandlingState, DigState, JumpState, LocomotionStates, MovementState, SweepState};
    use crate::controller::{ControlState, ControlStates};

    fn controls(states: &[ControlState]) -> ControlStates {
        states.iter().copied().collect()
    }

    #[test]
    fn movement_follows_controls() {
        let state = MovementState::Stand;

        assert_eq!(state.next(controls(&[ControlState::MoveLeft]), true), MovementState::Walk);
        assert_eq!(state.next(controls(&[ControlState::BodyCrouch]), true), MovementState::Crouch);
        assert_eq!(
            state.next(controls(&[ControlState::BodyCrouch, ControlState::MoveRight]), true),
            MovementState::Crawl
        );
        assert_eq!(state.next(controls(&[ControlState::BodyJump]), true), MovementState::Jump);
        assert_eq!(state.next(ControlStates::empty(), true), MovementState::Stand);
    }

    #[test]
    fn airborne_keeps_jump() {
        assert_eq!(
            MovementState::Jump.next(controls(&[ControlState::MoveLeft]), false),
            MovementState::Jump
        );
        assert_eq!(MovementState::Walk.next(ControlStates::empty(), false), MovementState::NoMove);
    }

    #[test]
    fn jump_cycle() {
        let jump = controls(&[ControlState::BodyJump]);
        let none = ControlStates::empty();

        let mut state = JumpState::NotJumping.next(jump, true, 0.0);
        assert_eq!(state, JumpState::PrepareJump);
        state = state.next(jump, true, 0.0);
        assert_eq!(state, JumpState::UpJump);
        assert!(state.is_takeoff());
        state = state.next(none, false, -3.0);
        assert_eq!(state, JumpState::UpJump);
        state = state.next(none, false, 0.5);
        assert_eq!(state, JumpState::ApexJump);
        state = state.next(none, false, 2.0);
        assert_eq!(state, JumpState::ApexJump);
        state = state.next(none, true, 0.0);
        assert_eq!(state, JumpState::LandJump);
        state = state.next(none, true, 0.0);
        assert_eq!(state, JumpState::NotJumping);
    }

    #[test]
    fn moving_jump_is_forward() {
        let state = JumpState::PrepareJump.next(controls(&[ControlState::MoveRight]), true, 0.0);
        assert_eq!(state, JumpState::ForwardJump);
    }

    #[test]
    fn no_jump_while_airborne() {
        let state = JumpState::NotJumping.next(controls(&[ControlState::BodyJump]), false, 1.0);
        assert_eq!(state, JumpState::NotJumping);
    }

    #[test]
    fn dig_cycle() {
        let mut state = DigState::NotDigging;
        for expected in [DigState::PreDig, DigState::StartingDig, DigState::TunnelingDig, DigState::TunnelingDig] {
            state = state.next(true);
            assert_eq!(state, expected);
        }

        state = state.next(false);
        assert_eq!(state, DigState::FinishingDig);
        state = state.next(true);
        assert_eq!(state, DigState::PauseDig);
        state = state.next(true);
        assert_eq!(state, DigState::TunnelingDig);
        state = state.next(false).next(false);
        assert_eq!(state, DigState::NotDigging);
    }

    #[test]
    fn sweep_cycle() {
        assert_eq!(SweepState::NoSweep.advance(), SweepState::NoSweep);

        let mut state = SweepState::SweepingUp;
        let mut pauses = 0;
        for _ in 0..4 {
            state = state.advance();
            if state.is_paused() {
                pauses += 1;
            }
        }

        assert_eq!(state, SweepState::SweepingUp);
        assert_eq!(pauses, 2);
    }

    #[test]
    fn device_handling_needs_device() {
        let fire = controls(&[ControlState::WeaponFire]);

        assert_eq!(DeviceHandlingState::Still.next(fire, false, false), DeviceHandlingState::Still);
        assert_eq!(DeviceHandlingState::Still.next(fire, true, false), DeviceHandlingState::Firing);
        assert_eq!(
            DeviceHandlingState::Firing.next(ControlStates::empty(), true, false),
            DeviceHandlingState::Pointing
        );
        assert_eq!(
            DeviceHandlingState::Pointing.next(controls(&[ControlState::AimSharp]), true, false),
            DeviceHandlingState::Aiming
        );
        assert_eq!(
            DeviceHandlingState::Pointing.next(ControlStates::empty(), true, true),
            DeviceHandlingState::Digging
        );
    }

    #[test]
    fn axes_are_orthogonal() {
        let mut states = LocomotionStates::default();
        states.sweep = SweepState::SweepingDown;

        let walk_and_fire = controls(&[ControlState::MoveLeft, ControlState::WeaponFire]);
        states.update(walk_and_fire, true, 0.0, true);

        assert_eq!(states.movement, MovementState::Walk);
        assert_eq!(states.device, DeviceHandlingState::Firing);
        assert_eq!(states.dig, DigState::NotDigging);
        assert_eq!(states.jump, JumpState::NotJumping);
        assert_eq!(states.sweep, SweepState::SweepingDown);
    }
}
