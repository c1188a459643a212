use std::fmt::{self, Display, Formatter};

use game_data::{Error, Property};

/// A reference to a sound effect by name.
///
/// Playback is owned by the audio system behind
/// [`WorldContext::play_sound`](crate::context::WorldContext::play_sound).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SoundRef {
    name: String,
}

impl SoundRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Reads a `SoundContainer` reference.
    pub fn read(prop: &Property) -> Result<Self, Error> {
        match prop.preset_reference() {
            Some(name) => Ok(Self::new(name)),
            None => Err(prop.invalid()),
        }
    }

    pub fn write(&self, writer: &mut game_data::Writer, name: &str) {
        writer.reference(name, "SoundContainer", &self.name);
    }
}

impl Display for SoundRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        Display::fmt(&self.name, f)
    }
}
