//! Cell records, activity flags and porosity modes

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitAnd, BitOr};

/// A point in model coordinates (x, y, depth)
pub type Point = [f64; 3];

/// Number of corners per cell
pub const NUM_CORNERS: usize = 8;

/// Activity bits of a cell
///
/// Mirrors the ACTNUM codes: 0 inactive, 1 matrix, 2 fracture, 3 both.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActiveFlag(u8);

impl ActiveFlag {
    /// Inactive cell
    pub const NONE: Self = Self(0);
    /// Matrix active
    pub const MATRIX: Self = Self(1);
    /// Fracture active
    pub const FRACTURE: Self = Self(2);
    /// Matrix and fracture active
    pub const BOTH: Self = Self(3);

    /// Convert an ACTNUM code; bits above the fracture bit are ignored
    pub const fn from_code(code: i32) -> Self {
        if code <= 0 {
            Self::NONE
        } else {
            Self((code & 3) as u8)
        }
    }

    /// ACTNUM code of this flag
    pub const fn code(self) -> i32 {
        self.0 as i32
    }

    /// True if every bit of `other` is set
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if any bit is set
    pub const fn is_active(self) -> bool {
        self.0 != 0
    }
}

impl BitAnd for ActiveFlag {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self(self.0 & rhs.0)
    }
}

impl BitOr for ActiveFlag {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl fmt::Debug for ActiveFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.0 {
            0 => "NONE",
            1 => "MATRIX",
            2 => "FRACTURE",
            _ => "BOTH",
        };
        write!(f, "ActiveFlag({label})")
    }
}

/// Porosity model of a grid, from FILEHEAD item 5
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Porosity {
    /// One porosity system per cell
    #[default]
    Single,
    /// Matrix and fracture, flow through fractures only
    DualPorosity,
    /// Matrix and fracture, flow through both
    DualPermeability,
}

impl Porosity {
    /// Decode the FILEHEAD flag; unknown values read as single porosity
    pub const fn from_filehead(flag: i32) -> Self {
        match flag {
            1 => Self::DualPorosity,
            2 => Self::DualPermeability,
            _ => Self::Single,
        }
    }

    /// FILEHEAD flag value
    pub const fn filehead_flag(self) -> i32 {
        match self {
            Self::Single => 0,
            Self::DualPorosity => 1,
            Self::DualPermeability => 2,
        }
    }

    /// True for either dual mode
    pub const fn is_dual(self) -> bool {
        !matches!(self, Self::Single)
    }
}

/// One hexahedral cell
///
/// Corners are numbered with i fastest, then j, then k:
///
/// ```text
///   top (k)        bottom (k+1)
///   2---3          6---7
///   |   |          |   |
///   0---1          4---5
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Cell {
    pub(crate) corners: [Point; NUM_CORNERS],
    pub(crate) active: ActiveFlag,
}

impl Cell {
    pub(crate) const fn new(corners: [Point; NUM_CORNERS], active: ActiveFlag) -> Self {
        Self { corners, active }
    }

    /// All eight corners
    pub const fn corners(&self) -> &[Point; NUM_CORNERS] {
        &self.corners
    }

    /// Activity flag
    pub const fn active(&self) -> ActiveFlag {
        self.active
    }

    /// Mean of the eight corners
    pub fn center(&self) -> Point {
        let mut center = [0.0; 3];
        for corner in &self.corners {
            for axis in 0..3 {
                center[axis] += corner[axis];
            }
        }
        center.map(|v| v / NUM_CORNERS as f64)
    }

    /// Mean top-to-bottom z extent over the four pillars
    pub fn dz(&self) -> f64 {
        let sum: f64 = (0..4)
            .map(|c| self.corners[c + 4][2] - self.corners[c][2])
            .sum();
        sum * 0.25
    }

    /// Length of the mean edge vector along i
    pub fn dx(&self) -> f64 {
        let (mut dx, mut dy) = (0.0, 0.0);
        for c in (1..NUM_CORNERS).step_by(2) {
            dx += self.corners[c][0] - self.corners[c - 1][0];
            dy += self.corners[c][1] - self.corners[c - 1][1];
        }
        (dx * 0.25).hypot(dy * 0.25)
    }

    /// Length of the mean edge vector along j
    pub fn dy(&self) -> f64 {
        let (mut dx, mut dy) = (0.0, 0.0);
        for k in 0..2 {
            for i in 0..2 {
                let c1 = i + k * 4;
                let c2 = c1 + 2;
                dx += self.corners[c2][0] - self.corners[c1][0];
                dy += self.corners[c2][1] - self.corners[c1][1];
            }
        }
        (dx * 0.25).hypot(dy * 0.25)
    }

    /// Mean depth of the top face
    pub fn top(&self) -> f64 {
        (0..4).map(|c| self.corners[c][2]).sum::<f64>() * 0.25
    }

    /// Mean depth of the bottom face
    pub fn bottom(&self) -> f64 {
        (4..8).map(|c| self.corners[c][2]).sum::<f64>() * 0.25
    }
}
