use std::marker::PhantomData;
use std::sync::Arc;
use log::error;
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::num_complex::Complex;
use crate::window::{FftLength, SupportedLength};

/// Windowed real FFT producing per-bin magnitudes for one axis at a time.
///
/// The engine keeps no analysis state between calls, only the planned
/// transform and its scratch memory, so one instance serves all three axes.
pub struct SpectralEngine<const N: usize> {
    fft: Arc<dyn RealToComplex<f32>>,
    spectrum: Vec<Complex<f32>>,
    scratch: Vec<Complex<f32>>,
    _length: PhantomData<FftLength<N>>,
}

impl<const N: usize> SpectralEngine<N>
where
    FftLength<N>: SupportedLength,
{
    pub fn new() -> Self {
        let mut planner = RealFftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(N);
        let spectrum = fft.make_output_vec();
        let scratch = fft.make_scratch_vec();
        Self {
            fft,
            spectrum,
            scratch,
            _length: PhantomData,
        }
    }

    /// Number of complex bins the transform produces (`N/2 + 1`).
    pub fn bin_count(&self) -> usize {
        self.spectrum.len()
    }

    /// Windows `samples` in place, transforms them and writes the modulus of
    /// bins `0..magnitudes.len()` into `magnitudes`.
    ///
    /// The sample buffer is consumed: afterwards it holds neither the raw nor
    /// the windowed input and has to be refilled before it means anything.
    pub fn compute_magnitudes(&mut self, samples: &mut [f32; N], magnitudes: &mut [f32]) {
        apply_window::<N>(samples);

        if let Err(e) = self.fft.process_with_scratch(samples, &mut self.spectrum, &mut self.scratch) {
            error!("FFT computation error: {:?}", e);
            magnitudes.iter_mut().for_each(|m| *m = 0.0);
            return;
        }

        let bins = magnitudes.len().min(self.spectrum.len());
        for (mag, bin) in magnitudes.iter_mut().zip(&self.spectrum[..bins]) {
            *mag = bin.norm();
        }
        magnitudes[bins..].iter_mut().for_each(|m| *m = 0.0);
    }
}

impl<const N: usize> Default for SpectralEngine<N>
where
    FftLength<N>: SupportedLength,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Multiplies each sample by the taper for this transform length.
pub fn apply_window<const N: usize>(samples: &mut [f32; N])
where
    FftLength<N>: SupportedLength,
{
    for (sample, &w) in samples.iter_mut().zip(FftLength::<N>::window()) {
        *sample *= w;
    }
}
