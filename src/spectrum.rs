//! Shared result store and the processing cycle.
//!
//! [`spectrograph`] builds the three handles that share one analyzer:
//! the gyro task gets a [`SampleProducer`], the processing task gets the one
//! [`SpectrumProcessor`], and the OSD task gets a [`SpectrumReader`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use log::{debug, trace};
use crate::axis::Axis;
use crate::fft_analysis::SpectralEngine;
use crate::peak_hold::AxisCurves;
use crate::sample_staging::{SampleProducer, SampleStaging};
use crate::utils::{display_len, peak_search_bins};
use crate::window::{FftLength, SupportedLength};

const STATS_EVERY_CYCLES: u64 = 500;

/// Curves for all three axes behind a single lock, plus the readiness
/// indicator.
struct SharedSpectrum {
    curves: Mutex<[AxisCurves; 3]>,
    // Completed cycles; anything above zero means the curves hold real data
    generation: AtomicU64,
}

impl SharedSpectrum {
    fn new(len: usize) -> Self {
        Self {
            curves: Mutex::new(std::array::from_fn(|_| AxisCurves::new(len))),
            generation: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, [AxisCurves; 3]> {
        self.curves.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Creates an analyzer for transform length `N` and returns its producer,
/// processor and reader handles.
pub fn spectrograph<const N: usize>() -> (SampleProducer<N>, SpectrumProcessor<N>, SpectrumReader<N>)
where
    FftLength<N>: SupportedLength,
{
    let staging = Arc::new(SampleStaging::new());
    let shared = Arc::new(SharedSpectrum::new(display_len::<N>()));

    let producer = SampleProducer::new(Arc::clone(&staging));
    let processor = SpectrumProcessor::new(staging, Arc::clone(&shared));
    let reader = SpectrumReader { shared };
    (producer, processor, reader)
}

/// Outcome of one [`SpectrumProcessor::process_cycle`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Axes whose staging buffer was filled and got processed.
    pub processed: [bool; 3],
    /// Readiness generation after the cycle.
    pub generation: u64,
}

impl CycleReport {
    pub fn processed_count(&self) -> usize {
        self.processed.iter().filter(|&&p| p).count()
    }
}

/// Sole writer of the curves. Runs on the processing task.
pub struct SpectrumProcessor<const N: usize> {
    staging: Arc<SampleStaging<N>>,
    shared: Arc<SharedSpectrum>,
    engine: SpectralEngine<N>,
    work: [Box<[f32; N]>; 3],
    magnitudes: [Vec<f32>; 3],
    cycles: u64,
}

impl<const N: usize> SpectrumProcessor<N>
where
    FftLength<N>: SupportedLength,
{
    fn new(staging: Arc<SampleStaging<N>>, shared: Arc<SharedSpectrum>) -> Self {
        // One bin past the last display byte: byte i shows bin i + 1
        let bins = display_len::<N>() + 1;
        Self {
            staging,
            shared,
            engine: SpectralEngine::new(),
            work: std::array::from_fn(|_| Box::new([0.0; N])),
            magnitudes: std::array::from_fn(|_| vec![0.0; bins]),
            cycles: 0,
        }
    }

    /// Runs one processing cycle over every axis the producer has refilled.
    ///
    /// Filled buffers are taken under the staging lock and transformed
    /// outside any lock. The curve update for all taken axes then happens
    /// under one hold of the result lock, after which the readiness
    /// generation is bumped. Axes without fresh samples keep their curves.
    pub fn process_cycle(&mut self) -> CycleReport {
        let mut processed = [false; 3];

        for axis in Axis::ALL {
            let i = axis.index();
            if !self.staging.take_filled(axis, &mut self.work[i]) {
                trace!(target: "spectrograph", "{} not refilled, skipping", axis);
                continue;
            }
            self.engine.compute_magnitudes(&mut self.work[i], &mut self.magnitudes[i]);
            processed[i] = true;
        }

        if !processed.iter().any(|&p| p) {
            return CycleReport {
                processed,
                generation: self.shared.generation.load(Ordering::Acquire),
            };
        }

        {
            let mut curves = self.shared.lock();
            for axis in Axis::ALL {
                let i = axis.index();
                if processed[i] {
                    curves[i].update(&self.magnitudes[i], peak_search_bins::<N>());
                }
            }

            self.cycles += 1;
            if self.cycles % STATS_EVERY_CYCLES == 0 {
                debug!(target: "spectrograph",
                       "{} cycles processed, running peaks roll={:.1} pitch={:.1} yaw={:.1}",
                       self.cycles,
                       curves[0].running_peak(),
                       curves[1].running_peak(),
                       curves[2].running_peak());
            }
        }

        let generation = self.shared.generation.fetch_add(1, Ordering::AcqRel) + 1;
        CycleReport { processed, generation }
    }

    /// Clears running peaks and both curves on every axis.
    pub fn reset(&mut self) {
        let mut curves = self.shared.lock();
        curves.iter_mut().for_each(AxisCurves::reset);
        debug!(target: "spectrograph", "running peaks and curves reset");
    }

    /// Cycles completed by this processor.
    pub fn cycles(&self) -> u64 {
        self.cycles
    }
}

/// Copy of one axis' curves taken under the result lock.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AxisSnapshot {
    pub display: Vec<u8>,
    pub max_hold: Vec<u8>,
    pub running_peak: f32,
}

/// Read side of the result store, used by the renderer.
#[derive(Clone)]
pub struct SpectrumReader<const N: usize> {
    shared: Arc<SharedSpectrum>,
}

impl<const N: usize> SpectrumReader<N> {
    /// Copies the curves and running peak of `axis`.
    pub fn read_snapshot(&self, axis: Axis) -> AxisSnapshot {
        let mut snapshot = AxisSnapshot::default();
        self.read_snapshot_into(axis, &mut snapshot);
        snapshot
    }

    /// Like [`read_snapshot`](Self::read_snapshot) but reuses `snapshot`'s
    /// allocations. The lock is held only for the copy.
    pub fn read_snapshot_into(&self, axis: Axis, snapshot: &mut AxisSnapshot) {
        let curves = self.shared.lock();
        let axis_curves = &curves[axis.index()];
        snapshot.display.clear();
        snapshot.display.extend_from_slice(axis_curves.display());
        snapshot.max_hold.clear();
        snapshot.max_hold.extend_from_slice(axis_curves.max_hold());
        snapshot.running_peak = axis_curves.running_peak();
    }

    /// True once at least one cycle has completed.
    pub fn is_ready(&self) -> bool {
        self.generation() > 0
    }

    /// Number of completed cycles; changes whenever new curves are available.
    pub fn generation(&self) -> u64 {
        self.shared.generation.load(Ordering::Acquire)
    }

    /// Transform length the curves were computed with.
    pub fn fft_length(&self) -> usize {
        N
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    fn tone(bin: usize) -> Box<[f32; 1024]> {
        let mut samples = Box::new([0.0f32; 1024]);
        for (i, s) in samples.iter_mut().enumerate() {
            *s = (2.0 * PI * bin as f32 * i as f32 / 1024.0).sin();
        }
        samples
    }

    #[test]
    fn nothing_filled_means_no_cycle() {
        let (_producer, mut processor, reader) = spectrograph::<1024>();
        let report = processor.process_cycle();
        assert_eq!(report.processed_count(), 0);
        assert_eq!(report.generation, 0);
        assert!(!reader.is_ready());
    }

    #[test]
    fn zero_input_for_ten_cycles() {
        let (producer, mut processor, reader) = spectrograph::<512>();
        for _ in 0..10 {
            for axis in Axis::ALL {
                producer.fill(axis, &[0.0; 512]);
            }
            let report = processor.process_cycle();
            assert_eq!(report.processed, [true; 3]);
        }

        assert_eq!(reader.generation(), 10);
        for axis in Axis::ALL {
            let snap = reader.read_snapshot(axis);
            assert_eq!(snap.running_peak, 0.0);
            assert_eq!(snap.display.len(), 128);
            assert!(snap.display.iter().all(|&v| v == 0));
            assert!(snap.max_hold.iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn tone_shows_on_its_axis_only() {
        let (producer, mut processor, reader) = spectrograph::<1024>();
        producer.fill(Axis::Roll, &tone(64));
        producer.fill(Axis::Pitch, &[0.0; 1024]);
        producer.fill(Axis::Yaw, &[0.0; 1024]);
        processor.process_cycle();

        let roll = reader.read_snapshot(Axis::Roll);
        assert!(roll.running_peak > 0.0);
        assert_eq!(roll.display[63], 255);
        assert_eq!(roll.max_hold[63], 255);

        let pitch = reader.read_snapshot(Axis::Pitch);
        assert_eq!(pitch.running_peak, 0.0);
        assert!(pitch.display.iter().all(|&v| v == 0));
    }

    #[test]
    fn unfilled_axis_keeps_previous_curves() {
        let (producer, mut processor, reader) = spectrograph::<1024>();
        for axis in Axis::ALL {
            producer.fill(axis, &tone(100));
        }
        processor.process_cycle();
        let before = reader.read_snapshot(Axis::Yaw);

        // Only roll gets fresh data
        producer.fill(Axis::Roll, &[0.0; 1024]);
        let report = processor.process_cycle();
        assert_eq!(report.processed, [true, false, false]);
        assert_eq!(report.generation, 2);
        assert_eq!(reader.read_snapshot(Axis::Yaw), before);
        assert_eq!(reader.read_snapshot(Axis::Roll).display[99], 0);
    }

    #[test]
    fn reset_clears_curves() {
        let (producer, mut processor, reader) = spectrograph::<1024>();
        producer.fill(Axis::Yaw, &tone(30));
        processor.process_cycle();
        assert!(reader.read_snapshot(Axis::Yaw).running_peak > 0.0);

        processor.reset();
        let snap = reader.read_snapshot(Axis::Yaw);
        assert_eq!(snap.running_peak, 0.0);
        assert!(snap.max_hold.iter().all(|&v| v == 0));
    }

    #[test]
    fn snapshot_into_reuses_buffer() {
        let (_producer, _processor, reader) = spectrograph::<512>();
        let mut snap = AxisSnapshot::default();
        reader.read_snapshot_into(Axis::Pitch, &mut snap);
        reader.read_snapshot_into(Axis::Pitch, &mut snap);
        assert_eq!(snap.display.len(), 128);
        assert_eq!(snap.max_hold.len(), 128);
        assert_eq!(reader.fft_length(), 512);
    }
}
