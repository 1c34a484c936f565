/// A 2D grid stored row-major (`index = y * width + x`).
///
/// Island fields never wrap: out-of-range neighbor lookups clamp to the edge.
#[derive(Clone, Debug, PartialEq)]
pub struct Tilemap<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone> Tilemap<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    /// Square `n x n` grid filled with `value`.
    pub fn square(n: usize, value: T) -> Self {
        Self::new_with(n, n, value)
    }

    /// Wrap an existing row-major buffer. Returns `None` when the length does
    /// not match `width * height`.
    pub fn from_vec(width: usize, height: usize, data: Vec<T>) -> Option<Self> {
        if data.len() != width * height {
            return None;
        }
        Some(Self { width, height, data })
    }

    fn index(&self, x: usize, y: usize) -> usize {
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Lookup with coordinates clamped into the grid.
    pub fn get_clamped(&self, x: isize, y: isize) -> &T {
        let cx = x.clamp(0, self.width as isize - 1) as usize;
        let cy = y.clamp(0, self.height as isize - 1) as usize;
        self.get(cx, cy)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// New map of the same shape with `f` applied to every cell.
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Tilemap<U> {
        Tilemap {
            width: self.width,
            height: self.height,
            data: self.data.iter().map(f).collect(),
        }
    }

    /// Cell-wise combination of two maps of identical shape.
    pub fn zip_map<U: Clone, V, F: FnMut(&T, &U) -> V>(&self, other: &Tilemap<U>, mut f: F) -> Tilemap<V> {
        debug_assert_eq!(self.width, other.width);
        debug_assert_eq!(self.height, other.height);
        Tilemap {
            width: self.width,
            height: self.height,
            data: self
                .data
                .iter()
                .zip(other.data.iter())
                .map(|(a, b)| f(a, b))
                .collect(),
        }
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        let width = self.width;
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % width;
            let y = idx / width;
            (x, y, val)
        })
    }
}

impl Tilemap<f32> {
    /// Minimum and maximum value, or `None` for an empty map.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        if self.data.is_empty() {
            return None;
        }
        let mut min_v = f32::INFINITY;
        let mut max_v = f32::NEG_INFINITY;
        for &v in &self.data {
            if v < min_v {
                min_v = v;
            }
            if v > max_v {
                max_v = v;
            }
        }
        Some((min_v, max_v))
    }

    /// Central-difference gradient at a cell; edges use one-sided clamped
    /// neighbors and the result is halved like an interior difference.
    pub fn gradient(&self, x: usize, y: usize) -> (f32, f32) {
        let (xi, yi) = (x as isize, y as isize);
        let left = *self.get_clamped(xi - 1, yi);
        let right = *self.get_clamped(xi + 1, yi);
        let down = *self.get_clamped(xi, yi - 1);
        let up = *self.get_clamped(xi, yi + 1);
        ((right - left) * 0.5, (up - down) * 0.5)
    }

    /// Sample using bilinear interpolation at fractional grid coordinates,
    /// clamped to the grid.
    pub fn sample_bilinear(&self, x: f32, y: f32) -> f32 {
        let x0 = x.floor() as isize;
        let y0 = y.floor() as isize;
        let fx = x - x.floor();
        let fy = y - y.floor();

        let v00 = *self.get_clamped(x0, y0);
        let v10 = *self.get_clamped(x0 + 1, y0);
        let v01 = *self.get_clamped(x0, y0 + 1);
        let v11 = *self.get_clamped(x0 + 1, y0 + 1);

        let v0 = v00 * (1.0 - fx) + v10 * fx;
        let v1 = v01 * (1.0 - fx) + v11 * fx;
        v0 * (1.0 - fy) + v1 * fy
    }
}
