/// The physical state of an actor.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Status {
    #[default]
    Stable,
    /// Spinning too fast to act.
    Unstable,
    /// Disabled from the outside.
    Inactive,
    Dying,
    Dead,
}

impl Status {
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            0 => Some(Self::Stable),
            1 => Some(Self::Unstable),
            2 => Some(Self::Inactive),
            3 => Some(Self::Dying),
            4 => Some(Self::Dead),
            _ => None,
        }
    }

    pub fn value(self) -> i32 {
        match self {
            Self::Stable => 0,
            Self::Unstable => 1,
            Self::Inactive => 2,
            Self::Dying => 3,
            Self::Dead => 4,
        }
    }

    /// Returns `true` if the actor still acts on its controls.
    #[inline]
    pub fn can_act(self) -> bool {
        matches!(self, Self::Stable | Self::Unstable)
    }

    #[inline]
    pub fn is_dead_or_dying(self) -> bool {
        matches!(self, Self::Dying | Self::Dead)
    }
}

/// The goal an AI controlled actor pursues.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum AiMode {
    #[default]
    None,
    Sentry,
    Patrol,
    GoTo,
    BrainHunt,
    GoldDig,
    Return,
    Stay,
    Scuttle,
    Deliver,
    Bomb,
    Squad,
}

impl AiMode {
    const ALL: [Self; 12] = [
        Self::None,
        Self::Sentry,
        Self::Patrol,
        Self::GoTo,
        Self::BrainHunt,
        Self::GoldDig,
        Self::Return,
        Self::Stay,
        Self::Scuttle,
        Self::Deliver,
        Self::Bomb,
        Self::Squad,
    ];

    pub fn from_value(value: i32) -> Option<Self> {
        usize::try_from(value).ok().and_then(|index| Self::ALL.get(index).copied())
    }

    pub fn value(self) -> i32 {
        self as i32
    }
}
