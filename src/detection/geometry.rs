//! Shot-chart pixel geometry.
//!
//! The shot chart is 368 px wide for a 94 ft court. Each side attacks the
//! basket on the far end of the chart.

use crate::timeline::models::{PixelPos, Side};

/// Feet per shot-chart pixel.
pub const FT_PER_PX: f64 = 94.0 / 368.0;

/// Basket attacked by the home side.
pub const HOME_ATTACK_BASKET: PixelPos = PixelPos { x: 347, y: 96 };

/// Basket attacked by the away side.
pub const AWAY_ATTACK_BASKET: PixelPos = PixelPos { x: 21, y: 96 };

/// Corner three-point distance, in feet.
pub const CORNER_THREE_FT: f64 = 22.0;

/// Three-point arc distance at the top of the key, in feet.
pub const THREE_POINT_ARC_FT: f64 = 23.75;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotGeometry {
    pub distance_px: f64,
    pub distance_ft: f64,
}

pub fn basket_for(attacking: Side) -> PixelPos {
    match attacking {
        Side::Home => HOME_ATTACK_BASKET,
        Side::Away => AWAY_ATTACK_BASKET,
    }
}

pub fn resolve(position: PixelPos, attacking: Side) -> ShotGeometry {
    let basket = basket_for(attacking);
    let dx = f64::from(position.x) - f64::from(basket.x);
    let dy = f64::from(position.y) - f64::from(basket.y);
    let distance_px = dx.hypot(dy);
    ShotGeometry {
        distance_px,
        distance_ft: distance_px * FT_PER_PX,
    }
}

/// Whether a shot type label or code carries the dunk marker.
pub fn is_dunk(label: Option<&str>) -> bool {
    label.is_some_and(|l| l.to_uppercase().contains("DUNK"))
}

/// Geometry worth reporting: absent without a position, and for dunks.
pub fn reported(
    position: Option<PixelPos>,
    attacking: Side,
    label: Option<&str>,
) -> Option<ShotGeometry> {
    if is_dunk(label) {
        return None;
    }
    position.map(|pos| resolve(pos, attacking))
}
