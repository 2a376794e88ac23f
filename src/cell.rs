use serde::{Deserialize, Serialize};

/// One byte per cell so the backing buffer can be handed out as `&[u8]` without copying.
#[repr(u8)]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, bytemuck::NoUninit,
)]
pub enum Cell {
    #[default]
    Dead = 0,
    Alive = 1,
}

impl Cell {
    #[inline]
    pub fn is_alive(self) -> bool {
        self == Cell::Alive
    }

    #[inline]
    pub fn toggled(self) -> Cell {
        match self {
            Cell::Dead => Cell::Alive,
            Cell::Alive => Cell::Dead,
        }
    }

    /// Decode a byte read from an external buffer. Only exactly 1 is Alive.
    #[inline]
    pub fn from_byte(b: u8) -> Cell {
        if b == Cell::Alive as u8 {
            Cell::Alive
        } else {
            Cell::Dead
        }
    }
}

impl From<bool> for Cell {
    fn from(alive: bool) -> Self {
        if alive { Cell::Alive } else { Cell::Dead }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encoding() {
        assert_eq!(Cell::Dead as u8, 0);
        assert_eq!(Cell::Alive as u8, 1);
        assert_eq!(std::mem::size_of::<Cell>(), 1);
    }

    #[test]
    fn test_from_byte_exact_one() {
        assert_eq!(Cell::from_byte(0), Cell::Dead);
        assert_eq!(Cell::from_byte(1), Cell::Alive);
        assert_eq!(Cell::from_byte(2), Cell::Dead);
        assert_eq!(Cell::from_byte(255), Cell::Dead);
    }

    #[test]
    fn test_toggled() {
        assert_eq!(Cell::Dead.toggled(), Cell::Alive);
        assert_eq!(Cell::Alive.toggled().toggled(), Cell::Alive);
    }
}
