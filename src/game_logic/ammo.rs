use crate::game_logic::errors::{GunnerError, GunnerResult};
use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Aim vectors shorter than this use the player's aim angle instead of the
/// weapon's, since the cursor is too close to the muzzle to be reliable
pub const USE_AIM_ANGLE_DISTANCE: f32 = 3.5;

/// Static description of a type of ammo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct AmmoDetails {
    pub name: String,
    #[validate(range(min = 0.0, max = 1000.0))]
    pub damage: f32,
    #[validate(range(min = 0.1, max = 100.0))]
    pub speed: f32,
    /// Distance travelled before the ammo disappears
    #[validate(range(min = 0.1, max = 200.0))]
    pub range: f32,
    /// Seconds the ammo sits still before it starts moving
    #[validate(range(min = 0.0, max = 10.0))]
    pub charge_time: f32,
    /// Spread bounds in degrees
    #[validate(range(min = 0.0, max = 90.0))]
    pub spread_min: f32,
    #[validate(range(min = 0.0, max = 90.0))]
    pub spread_max: f32,
    pub is_player_ammo: bool,
}

impl Default for AmmoDetails {
    fn default() -> Self {
        Self {
            name: "pistol round".to_string(),
            damage: 1.0,
            speed: 12.0,
            range: 20.0,
            charge_time: 0.0,
            spread_min: 0.0,
            spread_max: 2.0,
            is_player_ammo: true,
        }
    }
}

impl AmmoDetails {
    /// Check field ranges and spread ordering
    pub fn validated(self) -> GunnerResult<Self> {
        self.validate()
            .map_err(|errors| GunnerError::InvalidAmmoDetails {
                reason: format!("{}: {errors}", self.name),
            })?;

        if self.spread_min > self.spread_max {
            return Err(GunnerError::InvalidAmmoDetails {
                reason: format!(
                    "{}: spread_min {} exceeds spread_max {}",
                    self.name, self.spread_min, self.spread_max
                ),
            });
        }

        Ok(self)
    }
}

/// Unit vector pointing along an angle given in degrees
pub fn direction_from_angle(degrees: f32) -> Vec2 {
    let radians = degrees.to_radians();
    Vec2::new(radians.cos(), radians.sin())
}

/// Angle in degrees a new piece of ammo flies along
///
/// Picks the aim angle or the weapon angle depending on how far the aim
/// point is, then deflects it by a random spread to a random side.
pub fn fire_direction_angle<R: Rng + ?Sized>(
    details: &AmmoDetails,
    aim_angle: f32,
    weapon_aim_angle: f32,
    weapon_aim_direction: Vec2,
    rng: &mut R,
) -> f32 {
    let spread = if details.spread_max > details.spread_min {
        rng.gen_range(details.spread_min..details.spread_max)
    } else {
        details.spread_min
    };
    let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };

    let base_angle = if weapon_aim_direction.length() < USE_AIM_ANGLE_DISTANCE {
        aim_angle
    } else {
        weapon_aim_angle
    };

    base_angle + side * spread
}

/// What a fired piece of ammo collided with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Struck {
    Enemy,
    /// Something with health that is not an enemy, e.g. the player
    Damageable,
    /// Walls and props
    Scenery,
}

/// Effect of a registered collision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitReport {
    /// Damage to apply, `None` when the struck object has no health
    pub damage: Option<f32>,
    /// Multiplier outcome for player ammo, `Some(true)` on an enemy hit
    pub multiplier: Option<bool>,
}

/// Result of advancing a piece of ammo by one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmmoStep {
    Charging,
    /// Movement is driven externally, e.g. by a firing pattern
    Held,
    Flying(Vec2),
    /// Range used up; player ammo reports a missed multiplier
    Expired { multiplier: Option<bool> },
}

/// Runtime state of one fired piece of ammo
#[derive(Component, Debug, Clone, PartialEq)]
pub struct AmmoFlight {
    direction: Vec2,
    angle: f32,
    speed: f32,
    damage: f32,
    range_remaining: f32,
    charge_timer: f32,
    override_movement: bool,
    is_player_ammo: bool,
    spent: bool,
}

impl AmmoFlight {
    pub fn new(details: &AmmoDetails, fire_angle: f32, speed: f32, override_movement: bool) -> Self {
        Self {
            direction: direction_from_angle(fire_angle),
            angle: fire_angle,
            speed,
            damage: details.damage,
            range_remaining: details.range,
            charge_timer: details.charge_time.max(0.0),
            override_movement,
            is_player_ammo: details.is_player_ammo,
            spent: false,
        }
    }

    pub fn direction(&self) -> Vec2 {
        self.direction
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn range_remaining(&self) -> f32 {
        self.range_remaining
    }

    pub fn is_player_ammo(&self) -> bool {
        self.is_player_ammo
    }

    pub fn is_charging(&self) -> bool {
        self.charge_timer > 0.0
    }

    /// True once the ammo hit something or ran out of range
    pub fn is_spent(&self) -> bool {
        self.spent
    }

    pub fn advance(&mut self, dt: f32) -> AmmoStep {
        if self.spent {
            return AmmoStep::Expired { multiplier: None };
        }

        if self.charge_timer > 0.0 {
            self.charge_timer -= dt;
            return AmmoStep::Charging;
        }

        if self.override_movement {
            return AmmoStep::Held;
        }

        let displacement = self.direction * self.speed * dt;
        self.range_remaining -= displacement.length();

        if self.range_remaining < 0.0 {
            self.spent = true;
            return AmmoStep::Expired {
                multiplier: self.is_player_ammo.then_some(false),
            };
        }

        AmmoStep::Flying(displacement)
    }

    /// Register a collision, only the first one counts
    pub fn register_hit(&mut self, struck: Struck) -> Option<HitReport> {
        if self.spent {
            return None;
        }
        self.spent = true;

        let damage = match struck {
            Struck::Enemy | Struck::Damageable => Some(self.damage),
            Struck::Scenery => None,
        };
        let multiplier = self
            .is_player_ammo
            .then_some(struck == Struck::Enemy);

        Some(HitReport { damage, multiplier })
    }
}
