pub const SAMPLE_RATE_HZ: u32 = 3200;  // Gyro sampling rate feeding the analyzer
pub const MAX_DISPLAY_FREQ_HZ: u32 = 800;  // Right edge of the graph
pub const PEAK_SEARCH_START_HZ: u32 = 50;  // Below this, drift and DC never set the scale
pub const FREQ_TICKS: u32 = 4;  // Frequency axis is labeled in quarters

/// Maps a frequency to its spectral bin for a transform of length `N`.
///
/// `floor((N/2 - 1) * freq / (SAMPLE_RATE_HZ / 2))`. The processing stage and
/// the renderer both go through this function, so a pixel column and the
/// bin it shows can never disagree. Frequencies above Nyquist map to the
/// Nyquist bin.
pub const fn fft_bin<const N: usize>(freq_hz: u32) -> usize {
    let nyquist = SAMPLE_RATE_HZ / 2;
    let freq = if freq_hz > nyquist { nyquist } else { freq_hz };
    ((N / 2 - 1) * freq as usize) / nyquist as usize
}

/// Last bin shown on the graph (`S`).
pub const fn max_display_bin<const N: usize>() -> usize {
    fft_bin::<N>(MAX_DISPLAY_FREQ_HZ)
}

/// Number of bytes in a display or max-hold curve (`S + 1`).
pub const fn display_len<const N: usize>() -> usize {
    max_display_bin::<N>() + 1
}

/// Spectrum bins searched when updating the running peak.
pub fn peak_search_bins<const N: usize>() -> std::ops::RangeInclusive<usize> {
    fft_bin::<N>(PEAK_SEARCH_START_HZ)..=max_display_bin::<N>()
}

/// Frequency shown at pixel column `x` of a graph `width` pixels wide.
pub fn column_frequency(x: i32, width: i32) -> u32 {
    if width <= 0 || x <= 0 {
        return 0;
    }
    (x as i64 * MAX_DISPLAY_FREQ_HZ as i64 / width as i64) as u32
}
