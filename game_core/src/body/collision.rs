use game_common::math::Vec2Ext;
use game_physics::{HitData, TerrainQuery};
use glam::Vec2;

use super::Body;

/// Maximum number of pixels a body is pushed to leave the terrain in a single call.
const MAX_TERRAIN_ESCAPE_STEPS: u32 = 64;

impl Body {
    /// Applies the impulse of `hit` to this body at the hit point.
    ///
    /// Returns `true` if the hit was accepted.
    pub fn collide_at_point(&mut self, hit: &mut HitData) -> bool {
        hit.resulting_impulse = hit.impulse();
        self.impulses.push(hit.resulting_impulse, hit.point - self.pos);
        true
    }

    /// Returns the scene positions of all collision atoms, or the center if there are none.
    pub fn atom_positions(&self) -> Vec<Vec2> {
        if self.atoms.is_empty() {
            return vec![self.pos];
        }

        self.atoms
            .flattened()
            .map(|offset| self.pos + self.rotation.rotate(offset.flip_x(self.h_flipped)))
            .collect()
    }

    /// Moves this body out of any terrain with a material strength above `threshold`, one
    /// pixel at a time. Returns the number of pixels moved.
    pub fn move_out_of_terrain(&mut self, terrain: &dyn TerrainQuery, threshold: f32) -> u32 {
        let mut steps = 0;

        while steps < MAX_TERRAIN_ESCAPE_STEPS {
            let embedded: Vec<Vec2> = self
                .atom_positions()
                .into_iter()
                .filter(|pos| terrain.material_strength(*pos) > threshold)
                .collect();

            if embedded.is_empty() {
                break;
            }

            let center = embedded.iter().sum::<Vec2>() / embedded.len() as f32;
            let direction = (self.pos - center).normalize_or_zero();
            self.pos += if direction == Vec2::ZERO {
                Vec2::NEG_Y
            } else {
                direction
            };

            steps += 1;
        }

        if steps == MAX_TERRAIN_ESCAPE_STEPS {
            tracing::warn!("{} is still stuck in terrain after moving {} pixels", self.id, steps);
        }

        steps
    }
}
