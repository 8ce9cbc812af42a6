use super::installation::*;
use super::location::*;

/// Debug drawing hook for operators. Rendering is a side effect only and
/// never feeds back into planning.
pub trait RoomVisualizer {
    fn render(&mut self, location: Location, installation: InstallationType);
}

#[cfg(feature = "screeps")]
impl RoomVisualizer for screeps::RoomVisual {
    fn render(&mut self, location: Location, installation: InstallationType) {
        let (fill, radius) = match installation {
            InstallationType::Road => ("#666666", 0.15),
            InstallationType::Wall => ("#111111", 0.45),
            InstallationType::Rampart => ("#2e7d32", 0.45),
            t if t.min_separation() > 1 => ("#ffaa00", 0.4),
            _ => ("#ffffff", 0.3),
        };
        let style = screeps::CircleStyle::default()
            .radius(radius)
            .opacity(0.6)
            .fill(fill);
        self.circle(location.x() as f32, location.y() as f32, Some(style));
    }
}
