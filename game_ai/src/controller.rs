//! Input state of an actor.

use glam::Vec2;

/// Who is driving an actor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum InputMode {
    /// No input. All control states stay cleared.
    None,
    Player,
    #[default]
    Ai,
}

impl InputMode {
    pub(crate) fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::None),
            1 => Some(Self::Player),
            2 => Some(Self::Ai),
            _ => None,
        }
    }

    pub(crate) fn value(self) -> i32 {
        match self {
            Self::None => 0,
            Self::Player => 1,
            Self::Ai => 2,
        }
    }
}

/// A single control an actor can be given.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ControlState {
    PrimaryAction,
    SecondaryAction,
    MoveLeft,
    MoveRight,
    MoveUp,
    MoveDown,
    MoveFast,
    BodyJumpStart,
    BodyJump,
    BodyCrouch,
    AimUp,
    AimDown,
    AimSharp,
    WeaponFire,
    WeaponReload,
    WeaponChangeNext,
    WeaponChangePrev,
    WeaponPickup,
    WeaponDrop,
}

impl ControlState {
    pub const ALL: [Self; 19] = [
        Self::PrimaryAction,
        Self::SecondaryAction,
        Self::MoveLeft,
        Self::MoveRight,
        Self::MoveUp,
        Self::MoveDown,
        Self::MoveFast,
        Self::BodyJumpStart,
        Self::BodyJump,
        Self::BodyCrouch,
        Self::AimUp,
        Self::AimDown,
        Self::AimSharp,
        Self::WeaponFire,
        Self::WeaponReload,
        Self::WeaponChangeNext,
        Self::WeaponChangePrev,
        Self::WeaponPickup,
        Self::WeaponDrop,
    ];

    #[inline]
    const fn bit(self) -> u32 {
        1 << self as u8
    }
}

/// A set of [`ControlState`]s.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ControlStates(u32);

impl ControlStates {
    pub const fn empty() -> Self {
        Self(0)
    }

    #[inline]
    pub const fn contains(self, state: ControlState) -> bool {
        self.0 & state.bit() != 0
    }

    #[inline]
    pub fn insert(&mut self, state: ControlState) {
        self.0 |= state.bit();
    }

    #[inline]
    pub fn remove(&mut self, state: ControlState) {
        self.0 &= !state.bit();
    }

    pub fn set(&mut self, state: ControlState, enabled: bool) {
        if enabled {
            self.insert(state);
        } else {
            self.remove(state);
        }
    }

    #[inline]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn clear(&mut self) {
        self.0 = 0;
    }

    pub fn iter(self) -> impl Iterator<Item = ControlState> {
        ControlState::ALL.into_iter().filter(move |state| self.contains(*state))
    }
}

impl FromIterator<ControlState> for ControlStates {
    fn from_iter<T: IntoIterator<Item = ControlState>>(iter: T) -> Self {
        let mut states = Self::empty();
        for state in iter {
            states.insert(state);
        }
        states
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Controller {
    input_mode: InputMode,
    states: ControlStates,
    /// Analog movement in `[-1, 1]` on both axes.
    pub analog_move: Vec2,
    /// Aim angle in radians relative to the facing direction.
    pub aim_angle: f32,
}

impl Controller {
    pub fn new(input_mode: InputMode) -> Self {
        Self {
            input_mode,
            ..Default::default()
        }
    }

    pub fn input_mode(&self) -> InputMode {
        self.input_mode
    }

    /// Switches the input mode. All current states are released.
    pub fn set_input_mode(&mut self, input_mode: InputMode) {
        if self.input_mode != input_mode {
            self.input_mode = input_mode;
            self.release_all();
        }
    }

    #[inline]
    pub fn is_ai_controlled(&self) -> bool {
        self.input_mode == InputMode::Ai
    }

    #[inline]
    pub fn is_player_controlled(&self) -> bool {
        self.input_mode == InputMode::Player
    }

    #[inline]
    pub fn is_disabled(&self) -> bool {
        self.input_mode == InputMode::None
    }

    pub fn states(&self) -> ControlStates {
        self.states
    }

    #[inline]
    pub fn is_state(&self, state: ControlState) -> bool {
        self.states.contains(state)
    }

    /// Sets `state`. Ignored while input is disabled.
    pub fn set_state(&mut self, state: ControlState, enabled: bool) {
        if self.is_disabled() {
            return;
        }

        self.states.set(state, enabled);
    }

    pub fn release_all(&mut self) {
        self.states.clear();
        self.analog_move = Vec2::ZERO;
    }

    /// Derives the movement states from the vector pointing at the current move target.
    ///
    /// `threshold` is the horizontal distance in pixels below which no walking is requested.
    /// Targets higher above the actor than `jump_height` request a jump.
    pub fn steer_towards(&mut self, move_vector: Vec2, threshold: f32, jump_height: f32) {
        for state in [
            ControlState::MoveLeft,
            ControlState::MoveRight,
            ControlState::BodyJump,
            ControlState::BodyCrouch,
        ] {
            self.states.remove(state);
        }

        if self.is_disabled() {
            self.analog_move = Vec2::ZERO;
            return;
        }

        if move_vector.x < -threshold {
            self.states.insert(ControlState::MoveLeft);
        } else if move_vector.x > threshold {
            self.states.insert(ControlState::MoveRight);
        }

        if move_vector.y < -jump_height {
            self.states.insert(ControlState::BodyJump);
        }

        self.analog_move = move_vector.normalize_or_zero();
    }
}
