use crate::core::models::sample::ParticleSample;

/// The upstream particle-value store the engine pulls from each frame.
///
/// The engine treats the store as an external collaborator: it only needs the
/// active task subset for the frame, the stored `(value, position)` pair per
/// slot, and the "was cleared since last read" signal that drives grid
/// rebinding.
pub trait SampleSource {
    /// Number of currently stored particle values.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Indices of the particles to process this frame. May be a strict subset
    /// of all stored slots when upstream filters are active.
    fn active(&self) -> Vec<usize>;

    /// The stored sample for one slot.
    fn sample(&self, index: usize) -> Option<ParticleSample>;

    /// Whether the store was cleared since the last call; consumes the signal.
    fn take_reset(&mut self) -> bool;
}

/// A Vec-backed [`SampleSource`] for drivers that assemble frames in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    samples: Vec<ParticleSample>,
    cleared: bool,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the stored samples with the current frame's data.
    pub fn replace(&mut self, samples: Vec<ParticleSample>) {
        self.samples = samples;
    }

    pub fn push(&mut self, sample: ParticleSample) {
        self.samples.push(sample);
    }

    /// Drops all stored samples and raises the cleared signal.
    pub fn clear(&mut self) {
        self.samples.clear();
        self.cleared = true;
    }
}

impl SampleSource for MemorySource {
    fn len(&self) -> usize {
        self.samples.len()
    }

    fn active(&self) -> Vec<usize> {
        (0..self.samples.len()).collect()
    }

    fn sample(&self, index: usize) -> Option<ParticleSample> {
        self.samples.get(index).copied()
    }

    fn take_reset(&mut self) -> bool {
        std::mem::take(&mut self.cleared)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Point3;

    #[test]
    fn memory_source_exposes_all_slots_as_active() {
        let mut source = MemorySource::new();
        source.push(ParticleSample::new(1.0, Point3::origin()));
        source.push(ParticleSample::new(2.0, Point3::new(1.0, 0.0, 0.0)));
        assert_eq!(source.len(), 2);
        assert_eq!(source.active(), vec![0, 1]);
        assert_eq!(source.sample(1).unwrap().value, 2.0);
        assert!(source.sample(2).is_none());
    }

    #[test]
    fn clear_raises_the_reset_signal_once() {
        let mut source = MemorySource::new();
        source.push(ParticleSample::new(1.0, Point3::origin()));
        assert!(!source.take_reset());
        source.clear();
        assert!(source.is_empty());
        assert!(source.take_reset());
        assert!(!source.take_reset());
    }
}
