//! Scalar field storage keyed by (entity index, vertical level).
//!
//! A [`Field`] holds one `f64` per (entity, level) pair, where entities are
//! either mesh cells or mesh edges. Storage is level-major: all values of
//! one vertical level form a contiguous slice, and the solver kernels operate
//! on these slices directly.
//!
//! The solver core runs at a single vertical level (level 0), but the store
//! keeps the level dimension so diagnostic consumers and future multi-layer
//! extensions address values the same way.

/// Mesh entity class a field is attached to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Location {
    /// One value per cell.
    Cell,
    /// One value per edge.
    Edge,
}

/// A scalar field over mesh entities with a vertical level dimension.
#[derive(Clone, Debug)]
pub struct Field {
    location: Location,
    n_entities: usize,
    n_levels: usize,
    /// Level-major: `data[level * n_entities + entity]`.
    data: Vec<f64>,
}

impl Field {
    /// Create a zero-initialized field.
    pub fn zeros(location: Location, n_entities: usize, n_levels: usize) -> Self {
        assert!(n_levels > 0, "Field needs at least one vertical level");
        Self {
            location,
            n_entities,
            n_levels,
            data: vec![0.0; n_entities * n_levels],
        }
    }

    /// Create a field with every entry set to `value`.
    pub fn constant(location: Location, n_entities: usize, n_levels: usize, value: f64) -> Self {
        let mut f = Self::zeros(location, n_entities, n_levels);
        f.data.fill(value);
        f
    }

    /// Entity class this field lives on.
    #[inline]
    pub fn location(&self) -> Location {
        self.location
    }

    /// Number of entities (cells or edges).
    #[inline]
    pub fn n_entities(&self) -> usize {
        self.n_entities
    }

    /// Number of vertical levels.
    #[inline]
    pub fn n_levels(&self) -> usize {
        self.n_levels
    }

    /// Value at (entity, level).
    #[inline]
    pub fn get(&self, entity: usize, level: usize) -> f64 {
        debug_assert!(entity < self.n_entities && level < self.n_levels);
        self.data[level * self.n_entities + entity]
    }

    /// Set the value at (entity, level).
    #[inline]
    pub fn set(&mut self, entity: usize, level: usize, value: f64) {
        debug_assert!(entity < self.n_entities && level < self.n_levels);
        self.data[level * self.n_entities + entity] = value;
    }

    /// All values of one vertical level as a contiguous slice.
    #[inline]
    pub fn level(&self, level: usize) -> &[f64] {
        debug_assert!(level < self.n_levels);
        &self.data[level * self.n_entities..(level + 1) * self.n_entities]
    }

    /// Mutable slice of one vertical level.
    #[inline]
    pub fn level_mut(&mut self, level: usize) -> &mut [f64] {
        debug_assert!(level < self.n_levels);
        &mut self.data[level * self.n_entities..(level + 1) * self.n_entities]
    }

    /// Overwrite every entry.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Maximum absolute value over all entries.
    pub fn max_abs(&self) -> f64 {
        self.data.iter().fold(0.0, |m, v| m.max(v.abs()))
    }

    /// Minimum value over all entries of one level, with its entity index.
    ///
    /// Returns `None` for a field over zero entities.
    pub fn min_with_index(&self, level: usize) -> Option<(usize, f64)> {
        self.level(level)
            .iter()
            .enumerate()
            .fold(None, |acc, (i, &v)| match acc {
                Some((_, m)) if m <= v => acc,
                _ => Some((i, v)),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_level_major_layout() {
        let mut f = Field::zeros(Location::Cell, 3, 2);
        f.set(1, 0, 5.0);
        f.set(1, 1, 7.0);

        assert_eq!(f.get(1, 0), 5.0);
        assert_eq!(f.get(1, 1), 7.0);
        assert_eq!(f.level(0), &[0.0, 5.0, 0.0]);
        assert_eq!(f.level(1), &[0.0, 7.0, 0.0]);
    }

    #[test]
    fn test_constant_and_fill() {
        let mut f = Field::constant(Location::Edge, 4, 1, 2.5);
        assert!(f.level(0).iter().all(|&v| v == 2.5));

        f.fill(-1.0);
        assert_eq!(f.max_abs(), 1.0);
    }

    #[test]
    fn test_min_with_index() {
        let mut f = Field::constant(Location::Cell, 4, 1, 3.0);
        f.set(2, 0, -1.0);

        let (i, v) = f.min_with_index(0).unwrap();
        assert_eq!(i, 2);
        assert_eq!(v, -1.0);

        let empty = Field::zeros(Location::Cell, 0, 1);
        assert!(empty.min_with_index(0).is_none());
    }
}
