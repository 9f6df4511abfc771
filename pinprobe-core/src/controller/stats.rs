//! Per-trial current statistics

/// Running statistics over the readings taken during one trial
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrialStats {
    samples: u16,
    faults: u16,
    sum: f32,
    min: f32,
    peak: f32,
}

impl TrialStats {
    /// Empty statistics
    pub const fn new() -> Self {
        Self {
            samples: 0,
            faults: 0,
            sum: 0.0,
            min: 0.0,
            peak: 0.0,
        }
    }

    /// Add a successful reading (amps)
    pub fn record(&mut self, amps: f32) {
        if self.samples == 0 {
            self.min = amps;
            self.peak = amps;
        } else {
            self.min = self.min.min(amps);
            self.peak = self.peak.max(amps);
        }
        self.sum += amps;
        self.samples = self.samples.saturating_add(1);
    }

    /// Count a reading that failed
    pub fn record_fault(&mut self) {
        self.faults = self.faults.saturating_add(1);
    }

    /// Successful readings
    pub fn samples(&self) -> u16 {
        self.samples
    }

    /// Failed readings
    pub fn faults(&self) -> u16 {
        self.faults
    }

    pub fn mean(&self) -> Option<f32> {
        (self.samples > 0).then(|| self.sum / f32::from(self.samples))
    }

    pub fn min(&self) -> Option<f32> {
        (self.samples > 0).then_some(self.min)
    }

    /// Highest reading
    pub fn peak(&self) -> Option<f32> {
        (self.samples > 0).then_some(self.peak)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats() {
        let stats = TrialStats::new();
        assert_eq!(stats.samples(), 0);
        assert_eq!(stats.mean(), None);
        assert_eq!(stats.peak(), None);
        assert_eq!(stats.min(), None);
    }

    #[test]
    fn test_record() {
        let mut stats = TrialStats::new();
        for amps in [0.010, 0.030, 0.020] {
            stats.record(amps);
        }
        stats.record_fault();

        assert_eq!(stats.samples(), 3);
        assert_eq!(stats.faults(), 1);
        assert_eq!(stats.min(), Some(0.010));
        assert_eq!(stats.peak(), Some(0.030));
        assert!((stats.mean().unwrap() - 0.020).abs() < 1e-6);
    }

    #[test]
    fn test_negative_readings() {
        let mut stats = TrialStats::new();
        stats.record(-0.002);
        stats.record(-0.001);
        assert_eq!(stats.peak(), Some(-0.001));
        assert_eq!(stats.min(), Some(-0.002));
    }

    #[test]
    fn test_faults_only() {
        let mut stats = TrialStats::new();
        stats.record_fault();
        stats.record_fault();
        assert_eq!(stats.faults(), 2);
        assert_eq!(stats.mean(), None);
    }
}
