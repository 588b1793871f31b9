//! The fixed partition-function temperature grid.

/// Temperatures (K) at which partition functions are tabulated. The list is
/// shared by every record and never configurable.
pub const TEMPERATURES: [f64; 110] = [
    1.072, 1.148, 1.230, 1.318, 1.413, 1.514, 1.622, 1.738, 1.862, 1.995, 2.138, 2.291, 2.455,
    2.630, 2.725, 2.818, 3.020, 3.236, 3.467, 3.715, 3.981, 4.266, 4.571, 4.898, 5.000, 5.248,
    5.623, 6.026, 6.457, 6.918, 7.413, 7.943, 8.511, 9.120, 9.375, 9.772, 10.471, 11.220,
    12.023, 12.882, 13.804, 14.791, 15.849, 16.982, 18.197, 18.750, 19.498, 20.893, 22.387,
    23.988, 25.704, 27.542, 29.512, 31.623, 33.884, 36.308, 37.500, 38.905, 41.687, 44.668,
    47.863, 51.286, 54.954, 58.884, 63.096, 67.608, 72.444, 75.000, 77.625, 83.176, 89.125,
    95.499, 102.329, 109.648, 117.490, 125.893, 134.896, 144.544, 150.000, 154.882, 165.959,
    177.828, 190.546, 204.174, 218.776, 225.000, 234.423, 251.189, 269.153, 288.403, 300.000,
    309.030, 331.131, 354.813, 380.189, 407.380, 436.516, 467.735, 500.000, 501.187, 537.032,
    575.440, 616.595, 660.693, 707.946, 758.578, 812.831, 870.964, 933.254, 1000.000,
];

/// Grid values are given to three decimals; anything closer than this is the
/// same grid point.
const GRID_TOLERANCE: f64 = 5e-4;

/// Position of `temperature` in [`TEMPERATURES`], if it is a grid point.
pub fn grid_index(temperature: f64) -> Option<usize> {
    TEMPERATURES
        .iter()
        .position(|t| (t - temperature).abs() < GRID_TOLERANCE)
}

/// One optional value per grid temperature.
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionFunction {
    values: Vec<Option<f64>>,
}

impl Default for PartitionFunction {
    fn default() -> Self {
        Self {
            values: vec![None; TEMPERATURES.len()],
        }
    }
}

impl PartitionFunction {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.values.get(index).copied().flatten()
    }

    /// Set the value at a grid index. Out-of-range indices are ignored.
    pub fn set(&mut self, index: usize, value: f64) {
        if let Some(slot) = self.values.get_mut(index) {
            *slot = Some(value);
        }
    }

    /// Set the value at a grid temperature. Returns `false` if the temperature
    /// is not on the grid.
    pub fn set_at(&mut self, temperature: f64, value: f64) -> bool {
        match grid_index(temperature) {
            Some(i) => {
                self.values[i] = Some(value);
                true
            }
            None => false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.iter().all(Option::is_none)
    }

    /// Number of grid points that carry a value.
    pub fn filled(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }

    /// `(grid index, temperature, value)` for every filled grid point.
    pub fn iter(&self) -> impl Iterator<Item = (usize, f64, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter_map(|(i, v)| v.map(|v| (i, TEMPERATURES[i], v)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_is_sorted_and_spans_range() {
        assert!(TEMPERATURES.windows(2).all(|w| w[0] < w[1]));
        assert_eq!(TEMPERATURES[0], 1.072);
        assert_eq!(TEMPERATURES[TEMPERATURES.len() - 1], 1000.0);
    }

    #[test]
    fn grid_index_matches_within_tolerance() {
        assert_eq!(grid_index(300.0), Some(90));
        assert_eq!(grid_index(9.3752), Some(34));
        assert_eq!(grid_index(301.0), None);
    }

    #[test]
    fn set_at_ignores_off_grid() {
        let mut pf = PartitionFunction::new();
        assert!(pf.set_at(300.0, 1234.5));
        assert!(!pf.set_at(299.0, 1.0));
        assert_eq!(pf.filled(), 1);
        assert_eq!(pf.get(90), Some(1234.5));
        let points: Vec<_> = pf.iter().collect();
        assert_eq!(points, vec![(90, 300.0, 1234.5)]);
    }
}
