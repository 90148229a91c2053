/// Bin layout along one grid axis: bounds, bin count, and periodicity.
///
/// The interval is half-open, `[min, max)`; bin `b` covers
/// `[min + b*width, min + (b+1)*width)` with its center at the midpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridAxis {
    pub min: f64,
    pub max: f64,
    pub nbins: usize,
    pub periodic: bool,
}

impl GridAxis {
    pub fn new(min: f64, max: f64, nbins: usize, periodic: bool) -> Self {
        Self {
            min,
            max,
            nbins,
            periodic,
        }
    }

    pub fn extent(&self) -> f64 {
        self.max - self.min
    }

    pub fn width(&self) -> f64 {
        self.extent() / self.nbins as f64
    }

    pub fn center(&self, bin: usize) -> f64 {
        self.min + (bin as f64 + 0.5) * self.width()
    }

    /// The bin holding coordinate `x`, wrapping periodic axes; `None` when a
    /// coordinate falls outside a non-periodic axis.
    pub fn bin_of(&self, x: f64) -> Option<usize> {
        let raw = ((x - self.min) / self.width()).floor() as isize;
        self.fold(raw)
    }

    /// Folds a raw (possibly out-of-range) bin index onto the axis.
    pub fn fold(&self, bin: isize) -> Option<usize> {
        let n = self.nbins as isize;
        if self.periodic {
            Some(bin.rem_euclid(n) as usize)
        } else if (0..n).contains(&bin) {
            Some(bin as usize)
        } else {
            None
        }
    }

    /// Minimum-image displacement between two coordinates along this axis.
    pub fn displacement(&self, from: f64, to: f64) -> f64 {
        let mut d = to - from;
        if self.periodic {
            let l = self.extent();
            d -= (d / l).round() * l;
        }
        d
    }
}
