use rayon::prelude::*;

/// A dense 2D grid of values, stored row-major.
///
/// The grid does not wrap: every lookup must be in range, and an
/// out-of-range coordinate is a bug in the caller.
#[derive(Clone, Debug)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T> Tilemap<T> {
    /// Build a map by evaluating `f(x, y)` for every cell, row by row.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> T) -> Self {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                data.push(f(x, y));
            }
        }
        Self { width, height, data }
    }

    /// Like [`Tilemap::from_fn`], evaluating cells in parallel.
    pub fn par_from_fn<F>(width: usize, height: usize, f: F) -> Self
    where
        T: Send,
        F: Fn(usize, usize) -> T + Sync,
    {
        let data = (0..width * height)
            .into_par_iter()
            .map(|i| f(i % width, i / width))
            .collect();
        Self { width, height, data }
    }

    fn index(&self, x: usize, y: usize) -> usize {
        assert!(
            x < self.width && y < self.height,
            "tilemap index ({}, {}) out of range for {}x{} map",
            x,
            y,
            self.width,
            self.height
        );
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % self.width;
            let y = idx / self.width;
            (x, y, val)
        })
    }
}
