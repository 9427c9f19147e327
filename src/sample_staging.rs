use std::mem;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use crate::axis::Axis;

/// Whether a staging buffer holds a complete, unprocessed capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferState {
    /// Contents were handed to the processor (or never written). Must be
    /// refilled in full before the next cycle can use this axis.
    Consumed,
    /// Holds `N` fresh samples.
    Filled,
}

struct StagingSlot<const N: usize> {
    samples: Box<[f32; N]>,
    state: BufferState,
}

impl<const N: usize> StagingSlot<N> {
    fn new() -> Self {
        Self {
            samples: Box::new([0.0; N]),
            state: BufferState::Consumed,
        }
    }
}

/// Raw per-axis sample buffers shared between the gyro producer and the
/// processing cycle.
///
/// This lock is separate from the result store lock: the producer never
/// touches the curves and the renderer never touches raw samples.
pub(crate) struct SampleStaging<const N: usize> {
    slots: Mutex<[StagingSlot<N>; 3]>,
}

impl<const N: usize> SampleStaging<N> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Mutex::new(std::array::from_fn(|_| StagingSlot::new())),
        }
    }

    fn lock(&self) -> MutexGuard<'_, [StagingSlot<N>; 3]> {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Hands a filled buffer to the processor by swapping it with `work`.
    ///
    /// Returns `false` and leaves `work` untouched when the axis has not been
    /// refilled since the last hand-off.
    pub(crate) fn take_filled(&self, axis: Axis, work: &mut Box<[f32; N]>) -> bool {
        let mut slots = self.lock();
        let slot = &mut slots[axis.index()];
        if slot.state != BufferState::Filled {
            return false;
        }
        mem::swap(&mut slot.samples, work);
        slot.state = BufferState::Consumed;
        true
    }
}

/// Producer side of the staging buffers, used by the gyro sampling task.
#[derive(Clone)]
pub struct SampleProducer<const N: usize> {
    staging: Arc<SampleStaging<N>>,
}

impl<const N: usize> SampleProducer<N> {
    pub(crate) fn new(staging: Arc<SampleStaging<N>>) -> Self {
        Self { staging }
    }

    /// Copies a complete capture for `axis` into its staging buffer.
    pub fn fill(&self, axis: Axis, samples: &[f32; N]) {
        self.fill_with(axis, |buf| buf.copy_from_slice(samples));
    }

    /// Lets `write` populate the staging buffer in place.
    ///
    /// `write` must set every sample; whatever the buffer held before is left
    /// over from an earlier cycle. The staging lock is held while it runs.
    pub fn fill_with<F>(&self, axis: Axis, write: F)
    where
        F: FnOnce(&mut [f32; N]),
    {
        let mut slots = self.staging.lock();
        let slot = &mut slots[axis.index()];
        write(&mut *slot.samples);
        slot.state = BufferState::Filled;
    }

    pub fn state(&self, axis: Axis) -> BufferState {
        self.staging.lock()[axis.index()].state
    }

    /// True while the last fill for `axis` has not been picked up yet.
    pub fn is_filled(&self, axis: Axis) -> bool {
        self.state(axis) == BufferState::Filled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_start_consumed() {
        let producer = SampleProducer::<512>::new(Arc::new(SampleStaging::new()));
        for axis in Axis::ALL {
            assert_eq!(producer.state(axis), BufferState::Consumed);
        }
    }

    #[test]
    fn fill_then_take_moves_samples_and_consumes() {
        let staging = Arc::new(SampleStaging::<512>::new());
        let producer = SampleProducer::new(Arc::clone(&staging));

        producer.fill(Axis::Pitch, &[0.25; 512]);
        assert_eq!(producer.state(Axis::Pitch), BufferState::Filled);
        assert_eq!(producer.state(Axis::Roll), BufferState::Consumed);
        assert!(producer.is_filled(Axis::Pitch));

        let mut work = Box::new([0.0f32; 512]);
        assert!(staging.take_filled(Axis::Pitch, &mut work));
        assert!(work.iter().all(|&s| s == 0.25));
        assert_eq!(producer.state(Axis::Pitch), BufferState::Consumed);

        // A second take without a refill gets nothing
        let mut again = Box::new([9.0f32; 512]);
        assert!(!staging.take_filled(Axis::Pitch, &mut again));
        assert!(again.iter().all(|&s| s == 9.0));
    }

    #[test]
    fn fill_with_writes_in_place() {
        let staging = Arc::new(SampleStaging::<1024>::new());
        let producer = SampleProducer::new(Arc::clone(&staging));
        producer.fill_with(Axis::Yaw, |buf| {
            for (i, s) in buf.iter_mut().enumerate() {
                *s = i as f32;
            }
        });

        let mut work = Box::new([0.0f32; 1024]);
        assert!(staging.take_filled(Axis::Yaw, &mut work));
        assert_eq!(work[1023], 1023.0);
    }
}
