use std::env;
use std::f64::consts::PI;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

// Transform lengths that get a precomputed taper. Adding one here also needs a
// matching `SupportedLength` impl in src/window.rs.
const SUPPORTED_FFT_LENGTHS: [usize; 2] = [512, 1024];

fn main() {
    let out_dir = env::var("OUT_DIR").expect("OUT_DIR is set by cargo");

    let mut source = String::new();
    for len in SUPPORTED_FFT_LENGTHS {
        // Symmetric Hann: both end points are zero
        writeln!(source, "pub(crate) static HANN_{len}: [f32; {len}] = [").unwrap();
        for i in 0..len {
            let x = 2.0 * PI * i as f64 / (len - 1) as f64;
            let w = 0.5 * (1.0 - x.cos());
            writeln!(source, "    {:.8},", w).unwrap();
        }
        writeln!(source, "];").unwrap();
    }

    fs::write(Path::new(&out_dir).join("hann_tables.rs"), source)
        .expect("failed to write window tables");

    println!("cargo:rerun-if-changed=build.rs");
}
