use crate::utils::vector2d::Vector2D;

/// Planar position and velocity. `position.y` is altitude, `position.x`
/// is downrange distance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Kinematics {
    pub position: Vector2D,
    pub velocity: Vector2D,
}

impl Kinematics {
    pub fn new(position: Vector2D, velocity: Vector2D) -> Self {
        Kinematics { position, velocity }
    }

    /// Explicit Euler: velocity is advanced first, position then moves with
    /// the updated velocity.
    pub fn step(self, acceleration: Vector2D, delta_time: f64) -> Self {
        let velocity = self.velocity + acceleration * delta_time;
        let position = self.position + velocity * delta_time;
        Kinematics { position, velocity }
    }

    /// Keeps the vehicle at or above the ground. Returns `true` when the
    /// ground was reached; downward velocity is removed on contact.
    pub fn clamp_to_ground(self) -> (Self, bool) {
        if self.position.y > 0.0 {
            return (self, false);
        }
        let position = Vector2D::new(self.position.x, 0.0);
        let velocity = Vector2D::new(self.velocity.x, self.velocity.y.max(0.0));
        (Kinematics { position, velocity }, true)
    }
}
