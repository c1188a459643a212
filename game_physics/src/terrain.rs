//! The terrain collaborator.

use game_common::{Team, UniqueId};
use glam::Vec2;

/// Filter for terrain and obstacle queries.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryFilter {
    /// An object that is never considered an obstacle.
    pub ignore: Option<UniqueId>,
    /// Objects of this team are never considered obstacles.
    pub ignore_team: Option<Team>,
}

impl QueryFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ignore(mut self, id: UniqueId) -> Self {
        self.ignore = Some(id);
        self
    }

    pub fn ignore_team(mut self, team: Team) -> Self {
        if !team.is_none() {
            self.ignore_team = Some(team);
        }

        self
    }
}

/// Read access to the terrain of a scene.
pub trait TerrainQuery {
    /// Returns the strength of the material at `pos`. Air has a strength of `0`.
    fn material_strength(&self, pos: Vec2) -> f32;

    /// Returns `true` if `pos` is blocked by terrain or by an object not excluded by `filter`.
    fn is_obstructed(&self, pos: Vec2, filter: &QueryFilter) -> bool {
        let _ = filter;
        self.material_strength(pos) > 0.0
    }
}

/// A scene without any terrain.
#[derive(Copy, Clone, Debug, Default)]
pub struct OpenTerrain;

impl TerrainQuery for OpenTerrain {
    fn material_strength(&self, _pos: Vec2) -> f32 {
        0.0
    }
}

/// A solid, infinitely wide floor. Everything at or below `ground_y` is solid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FlatGround {
    pub ground_y: f32,
    pub strength: f32,
}

impl FlatGround {
    pub const DEFAULT_STRENGTH: f32 = 100.0;

    pub fn new(ground_y: f32) -> Self {
        Self {
            ground_y,
            strength: Self::DEFAULT_STRENGTH,
        }
    }
}

impl TerrainQuery for FlatGround {
    fn material_strength(&self, pos: Vec2) -> f32 {
        if pos.y >= self.ground_y {
            self.strength
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use game_common::Team;
    use glam::Vec2;

    use super::{FlatGround, OpenTerrain, QueryFilter, TerrainQuery};

    #[test]
    fn flat_ground() {
        let ground = FlatGround::new(100.0);
        let filter = QueryFilter::new();

        assert!(!ground.is_obstructed(Vec2::new(5.0, 99.0), &filter));
        assert!(ground.is_obstructed(Vec2::new(-500.0, 100.0), &filter));
        assert_eq!(ground.material_strength(Vec2::new(0.0, 150.0)), FlatGround::DEFAULT_STRENGTH);
    }

    #[test]
    fn open_terrain() {
        assert!(!OpenTerrain.is_obstructed(Vec2::new(0.0, 1.0e6), &QueryFilter::new()));
    }

    #[test]
    fn ignore_team_none() {
        let filter = QueryFilter::new().ignore_team(Team::NONE);
        assert_eq!(filter.ignore_team, None);
        assert_eq!(QueryFilter::new().ignore_team(Team(1)).ignore_team, Some(Team(1)));
    }
}
