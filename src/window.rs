//! Precomputed Hann tapers, one per supported transform length.
//!
//! The tables are generated by `build.rs`. A transform length without a table
//! has no [`SupportedLength`] impl, so asking for one is a compile error rather
//! than a runtime failure.

include!(concat!(env!("OUT_DIR"), "/hann_tables.rs"));

/// Type-level transform length.
#[derive(Debug, Clone, Copy, Default)]
pub struct FftLength<const N: usize>;

mod sealed {
    pub trait Sealed {}
    impl Sealed for super::FftLength<512> {}
    impl Sealed for super::FftLength<1024> {}
}

/// Transform lengths the analyzer has a window table for.
pub trait SupportedLength: sealed::Sealed {
    /// Window coefficients, one per input sample.
    fn window() -> &'static [f32];
}

impl SupportedLength for FftLength<512> {
    fn window() -> &'static [f32] {
        &HANN_512
    }
}

impl SupportedLength for FftLength<1024> {
    fn window() -> &'static [f32] {
        &HANN_1024
    }
}
