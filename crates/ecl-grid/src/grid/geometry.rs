//! Pillar geometry and the MAPAXES coordinate transform

use super::cell::{NUM_CORNERS, Point};
use crate::error::{GridError, GridResult};

/// Number of values in a MAPAXES keyword
pub const MAPAXES_LEN: usize = 6;

/// Local-to-map transform from a MAPAXES keyword
///
/// MAPAXES holds three points: a point on the y axis, the origin and a
/// point on the x axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapAxes {
    raw: [f64; MAPAXES_LEN],
    origin: [f64; 2],
    unit_x: [f64; 2],
    unit_y: [f64; 2],
}

impl MapAxes {
    /// Parse the six MAPAXES values
    pub fn new(values: &[f64]) -> GridResult<Self> {
        let raw: [f64; MAPAXES_LEN] =
            values
                .try_into()
                .map_err(|_| GridError::SizeMismatch {
                    name: "MAPAXES".to_string(),
                    expected: MAPAXES_LEN,
                    actual: values.len(),
                })?;

        let unit_y = normalize([raw[0] - raw[2], raw[1] - raw[3]]);
        let unit_x = normalize([raw[4] - raw[2], raw[5] - raw[3]]);
        Ok(Self {
            raw,
            origin: [raw[2], raw[3]],
            unit_x,
            unit_y,
        })
    }

    /// The values as read
    pub const fn values(&self) -> &[f64; MAPAXES_LEN] {
        &self.raw
    }

    /// Map origin
    pub const fn origin(&self) -> [f64; 2] {
        self.origin
    }

    /// Local to map coordinates; depth is untouched
    pub fn transform(&self, p: Point) -> Point {
        [
            self.origin[0] + p[0] * self.unit_x[0] + p[1] * self.unit_y[0],
            self.origin[1] + p[0] * self.unit_x[1] + p[1] * self.unit_y[1],
            p[2],
        ]
    }

    /// Map to local coordinates
    pub fn inverse(&self, p: Point) -> Point {
        let norm = 1.0 / self.unit_x[0].mul_add(self.unit_y[1], -(self.unit_x[1] * self.unit_y[0]));
        let dx = p[0] - self.origin[0];
        let dy = p[1] - self.origin[1];
        [
            dx.mul_add(self.unit_y[1], -(dy * self.unit_y[0])) * norm,
            (-dx).mul_add(self.unit_x[1], dy * self.unit_x[0]) * norm,
            p[2],
        ]
    }
}

fn normalize(v: [f64; 2]) -> [f64; 2] {
    let len = v[0].hypot(v[1]);
    [v[0] / len, v[1] / len]
}

/// Expected COORD length for an `nx` by `ny` grid
pub const fn coord_len(nx: usize, ny: usize) -> usize {
    6 * (nx + 1) * (ny + 1)
}

/// Expected ZCORN length
pub const fn zcorn_len(nx: usize, ny: usize, nz: usize) -> usize {
    8 * nx * ny * nz
}

/// Corners of cell `(i, j, k)` from COORD pillars and ZCORN depths
///
/// Each corner lies on its pillar line at the ZCORN depth. A pillar with
/// no vertical extent is treated as vertical through its top point.
pub fn pillar_corners(
    nx: usize,
    ny: usize,
    (i, j, k): (usize, usize, usize),
    coord: &[f64],
    zcorn: &[f64],
) -> [Point; NUM_CORNERS] {
    let pillars = [
        6 * (j * (nx + 1) + i),
        6 * (j * (nx + 1) + i + 1),
        6 * ((j + 1) * (nx + 1) + i),
        6 * ((j + 1) * (nx + 1) + i + 1),
    ];
    let layer = k * 8 * nx * ny + j * 4 * nx + 2 * i;
    let z_offsets = [0, 1, 2 * nx, 2 * nx + 1];

    std::array::from_fn(|c| {
        let ip = c & 3;
        let bottom = c >> 2;
        let z = zcorn[layer + z_offsets[ip] + bottom * 4 * nx * ny];

        let p = pillars[ip];
        let top = [coord[p], coord[p + 1], coord[p + 2]];
        let base = [coord[p + 3], coord[p + 4], coord[p + 5]];
        let ez = base[2] - top[2];
        if ez == 0.0 {
            [top[0], top[1], z]
        } else {
            let t = (z - top[2]) / ez;
            [
                t.mul_add(base[0] - top[0], top[0]),
                t.mul_add(base[1] - top[1], top[1]),
                z,
            ]
        }
    })
}

/// Relative difference test used when checking cell dimensions
pub(crate) fn within_tolerance(computed: f64, reference: f64, rel_tol: f64) -> bool {
    let scale = computed.abs().max(reference.abs());
    scale == 0.0 || (computed - reference).abs() <= rel_tol * scale
}

#[cfg(test)]
#[allow(clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_mapaxes_round_trip() {
        // y axis points north-west, x axis north-east
        let axes = MapAxes::new(&[400.0, 1100.0, 500.0, 1000.0, 600.0, 1100.0])
            .expect("Test operation should succeed");
        assert_eq!(axes.origin(), [500.0, 1000.0]);

        let local = [10.0, 20.0, 1500.0];
        let mapped = axes.transform(local);
        assert_eq!(mapped[2], 1500.0);
        let back = axes.inverse(mapped);
        for axis in 0..3 {
            assert!((back[axis] - local[axis]).abs() < 1e-9);
        }
    }

    #[test]
    fn test_identity_mapaxes() {
        let axes = MapAxes::new(&[0.0, 1.0, 0.0, 0.0, 1.0, 0.0])
            .expect("Test operation should succeed");
        assert_eq!(axes.transform([3.0, 4.0, 5.0]), [3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_mapaxes_length() {
        assert!(matches!(
            MapAxes::new(&[0.0; 5]),
            Err(GridError::SizeMismatch { expected: 6, actual: 5, .. })
        ));
    }

    #[test]
    fn test_sloped_pillar() {
        // One cell with pillars leaning +1 in x per unit depth
        let mut coord = Vec::new();
        for j in 0..2 {
            for i in 0..2 {
                let (x, y) = (f64::from(i), f64::from(j));
                coord.extend_from_slice(&[x, y, 0.0, x + 10.0, y, 10.0]);
            }
        }
        let zcorn = [2.0, 2.0, 2.0, 2.0, 3.0, 3.0, 3.0, 3.0];
        let corners = pillar_corners(1, 1, (0, 0, 0), &coord, &zcorn);
        assert_eq!(corners[0], [2.0, 0.0, 2.0]);
        assert_eq!(corners[3], [3.0, 1.0, 2.0]);
        assert_eq!(corners[4], [3.0, 0.0, 3.0]);
    }

    #[test]
    fn test_tolerance() {
        assert!(within_tolerance(100.0, 100.001, 1e-4));
        assert!(!within_tolerance(100.0, 101.0, 1e-4));
        assert!(within_tolerance(0.0, 0.0, 0.0));
    }
}
