use crate::constants::*;
use serde::*;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Ord, PartialOrd)]
#[repr(transparent)]
pub struct Location {
    packed: u16,
}

impl Location {
    /// Build a location from coordinates already known to be inside the grid.
    pub fn from_coords(x: u32, y: u32) -> Self {
        debug_assert!(x < ROOM_WIDTH as u32 && y < ROOM_HEIGHT as u32);
        Location {
            packed: ((y << 8) | x) as u16,
        }
    }

    /// Build a location, returning `None` for coordinates outside [0, 49].
    pub fn checked(x: i32, y: i32) -> Option<Self> {
        if (0..ROOM_WIDTH as i32).contains(&x) && (0..ROOM_HEIGHT as i32).contains(&y) {
            Some(Location::from_coords(x as u32, y as u32))
        } else {
            None
        }
    }

    #[inline]
    pub fn x(self) -> u8 {
        (self.packed & 0xFF) as u8
    }

    #[inline]
    pub fn y(self) -> u8 {
        ((self.packed >> 8) & 0xFF) as u8
    }

    /// Row-major index into a 50x50 buffer.
    #[inline]
    pub fn index(self) -> usize {
        self.y() as usize * ROOM_WIDTH as usize + self.x() as usize
    }

    #[inline]
    pub fn packed_repr(self) -> u16 {
        self.packed
    }

    #[inline]
    pub fn from_packed(packed: u16) -> Self {
        Location { packed }
    }

    pub fn distance_to(self, other: Self) -> u8 {
        let dx = (self.x() as i8) - (other.x() as i8);
        let dy = (self.y() as i8) - (other.y() as i8);

        dx.abs().max(dy.abs()) as u8
    }

    /// Neighbour at the given offset, if it is still inside the grid.
    pub fn offset(self, dx: i8, dy: i8) -> Option<Location> {
        Location::checked(self.x() as i32 + dx as i32, self.y() as i32 + dy as i32)
    }

    /// True for tiles on the outermost ring of the grid.
    pub fn is_boundary(self) -> bool {
        self.x() == 0 || self.y() == 0 || self.x() == ROOM_WIDTH - 1 || self.y() == ROOM_HEIGHT - 1
    }

    /// True when the tile lies at least `margin` tiles inside the grid edge.
    pub fn is_inside_margin(self, margin: u8) -> bool {
        self.x() >= margin
            && self.y() >= margin
            && self.x() < ROOM_WIDTH.saturating_sub(margin)
            && self.y() < ROOM_HEIGHT.saturating_sub(margin)
    }
}

impl Serialize for Location {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.packed_repr().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Location {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let packed = u16::deserialize(deserializer)?;
        let location = Location::from_packed(packed);
        if location.x() >= ROOM_WIDTH || location.y() >= ROOM_HEIGHT {
            return Err(de::Error::custom("Location outside of the grid"));
        }
        Ok(location)
    }
}
