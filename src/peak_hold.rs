//! Running-peak normalization and the max-hold envelope.
//!
//! Every axis keeps one running peak that only ever grows. Both byte curves
//! are normalized against it, and the held curve is re-expressed in absolute
//! units with the previous peak before being normalized again. When the peak
//! later grows, held bins therefore shrink on screen in proportion, which is
//! the only "decay" the envelope has.

use std::ops::RangeInclusive;

/// Per-axis analysis state: running peak plus the two display curves.
#[derive(Debug, Clone, PartialEq)]
pub struct AxisCurves {
    running_peak: f32,
    display: Box<[u8]>,
    max_hold: Box<[u8]>,
}

impl AxisCurves {
    /// Fresh state with `len` bytes per curve, all zero.
    pub fn new(len: usize) -> Self {
        Self {
            running_peak: 0.0,
            display: vec![0; len].into_boxed_slice(),
            max_hold: vec![0; len].into_boxed_slice(),
        }
    }

    pub fn running_peak(&self) -> f32 {
        self.running_peak
    }

    pub fn display(&self) -> &[u8] {
        &self.display
    }

    pub fn max_hold(&self) -> &[u8] {
        &self.max_hold
    }

    pub fn len(&self) -> usize {
        self.display.len()
    }

    pub fn is_empty(&self) -> bool {
        self.display.is_empty()
    }

    /// Back to the post-init state.
    pub fn reset(&mut self) {
        self.running_peak = 0.0;
        self.display.iter_mut().for_each(|v| *v = 0);
        self.max_hold.iter_mut().for_each(|v| *v = 0);
    }

    /// Folds one cycle's magnitude spectrum into the curves.
    ///
    /// `magnitudes[0]` is DC; curve byte `i` shows `magnitudes[i + 1]`, so the
    /// spectrum must hold at least `len() + 1` bins. `search` selects the bins
    /// allowed to raise the running peak.
    pub fn update(&mut self, magnitudes: &[f32], search: RangeInclusive<usize>) {
        debug_assert!(magnitudes.len() > self.display.len());

        let frame_max = magnitudes
            .get(search)
            .unwrap_or(&[])
            .iter()
            .copied()
            .fold(0.0f32, f32::max);

        let old_peak = self.running_peak;
        let peak = old_peak.max(frame_max);
        self.running_peak = peak;

        for ((shown, held), &magnitude) in self
            .display
            .iter_mut()
            .zip(self.max_hold.iter_mut())
            .zip(&magnitudes[1..])
        {
            let value = magnitude.min(peak);
            let old_physical = old_peak * *held as f32 / 255.0;
            *shown = normalize(value, peak);
            *held = normalize(value.max(old_physical), peak);
        }
    }
}

/// `round(255 * value / peak)` clamped to a byte, 0 while the peak is still 0.
pub fn normalize(value: f32, peak: f32) -> u8 {
    if peak <= 0.0 {
        return 0;
    }
    (255.0 * value / peak).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use crate::utils::{display_len, peak_search_bins};

    const LEN: usize = display_len::<1024>();

    fn spectrum() -> Vec<f32> {
        vec![0.0; LEN + 1]
    }

    fn curves() -> AxisCurves {
        AxisCurves::new(LEN)
    }

    #[test]
    fn all_zero_input_stays_flat() {
        let mut axis = curves();
        for _ in 0..10 {
            axis.update(&spectrum(), peak_search_bins::<1024>());
        }
        assert_eq!(axis.running_peak(), 0.0);
        assert!(axis.display().iter().all(|&v| v == 0));
        assert!(axis.max_hold().iter().all(|&v| v == 0));
    }

    #[test]
    fn single_bin_sets_peak_and_saturates() {
        let mut axis = curves();
        let mut mags = spectrum();
        mags[21] = 100.0;
        axis.update(&mags, peak_search_bins::<1024>());

        assert_eq!(axis.running_peak(), 100.0);
        assert_eq!(axis.display()[20], 255);
        assert_eq!(axis.max_hold()[20], 255);
        assert_eq!(axis.display().iter().filter(|&&v| v != 0).count(), 1);
    }

    #[test]
    fn bins_below_search_window_do_not_raise_peak() {
        let mut axis = curves();
        let mut mags = spectrum();
        mags[3] = 100.0;
        mags[40] = 20.0;
        axis.update(&mags, peak_search_bins::<1024>());

        // Peak comes from the in-window bin; the low bin is clamped to it
        assert_eq!(axis.running_peak(), 20.0);
        assert_eq!(axis.display()[2], 255);
        assert_eq!(axis.display()[39], 255);
    }

    #[test]
    fn held_value_is_rescaled_when_peak_grows() {
        let mut axis = curves();

        let mut first = spectrum();
        first[6] = 50.0;
        first[30] = 50.0;
        axis.update(&first, peak_search_bins::<1024>());
        assert_eq!(axis.running_peak(), 50.0);
        assert_eq!(axis.display()[5], 255);
        assert_eq!(axis.max_hold()[5], 255);

        let mut second = spectrum();
        second[30] = 100.0;
        axis.update(&second, peak_search_bins::<1024>());
        assert_eq!(axis.running_peak(), 100.0);
        assert_eq!(axis.display()[5], 0);
        // round(255 * 50 / 100)
        assert_eq!(axis.max_hold()[5], 128);
        assert_eq!(axis.max_hold()[29], 255);
    }

    #[test]
    fn constant_input_reaches_a_fixed_point() {
        let mut axis = curves();
        let mut mags = spectrum();
        for (i, m) in mags.iter_mut().enumerate() {
            *m = (i % 17) as f32 * 3.0;
        }
        axis.update(&mags, peak_search_bins::<1024>());
        let display = axis.display().to_vec();
        let held = axis.max_hold().to_vec();
        let peak = axis.running_peak();

        for _ in 0..5 {
            axis.update(&mags, peak_search_bins::<1024>());
            assert_eq!(axis.running_peak(), peak);
            assert_eq!(axis.display(), &display[..]);
            assert_eq!(axis.max_hold(), &held[..]);
        }
    }

    #[test]
    fn invariants_hold_over_random_cycles() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut axis = curves();
        let mut previous_peak = 0.0;

        for cycle in 0..200 {
            // Occasional loud frames so the peak keeps moving
            let scale = if cycle % 23 == 0 { 400.0 } else { 80.0 };
            let mags: Vec<f32> = (0..=LEN).map(|_| rng.gen::<f32>() * scale).collect();
            axis.update(&mags, peak_search_bins::<1024>());

            let peak = axis.running_peak();
            assert!(peak >= previous_peak);
            previous_peak = peak;

            for i in 0..LEN {
                let shown = axis.display()[i];
                let held = axis.max_hold()[i];
                assert!(held >= shown, "cycle {} bin {}", cycle, i);

                let reading = mags[i + 1].min(peak);
                let held_physical = held as f32 * peak / 255.0;
                // One rounding step of slack
                assert!(held_physical + peak / 510.0 + 1e-3 >= reading);
            }
        }
    }

    #[test]
    fn reset_returns_to_initial_state() {
        let mut axis = curves();
        let mut mags = spectrum();
        mags[100] = 12.0;
        axis.update(&mags, peak_search_bins::<1024>());
        axis.reset();
        assert_eq!(axis, curves());
    }

    #[test]
    fn normalize_handles_zero_peak() {
        assert_eq!(normalize(0.0, 0.0), 0);
        assert_eq!(normalize(5.0, 0.0), 0);
        assert_eq!(normalize(10.0, 10.0), 255);
        assert_eq!(normalize(50.0, 100.0), 128);
        assert_eq!(normalize(1000.0, 10.0), 255);
    }
}
