//! Physics primitives shared by bodies and limbs.
//!
//! The actual collision detection against the terrain grid is not part of this crate. It is
//! reached through the narrow [`TerrainQuery`] interface.

pub mod atoms;
pub mod forces;
pub mod hit;
pub mod limb_path;
pub mod terrain;

pub use atoms::{Atom, AtomGroup};
pub use forces::{Force, ForceQueue, MAX_FORCE_MAGNITUDE};
pub use hit::HitData;
pub use limb_path::{LimbPath, Speed};
pub use terrain::{FlatGround, OpenTerrain, QueryFilter, TerrainQuery};
