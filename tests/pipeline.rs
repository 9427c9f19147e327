use std::f32::consts::PI;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use gyro_spectrograph::make_waves::{GyroSimulator, SimulationConfig};
use gyro_spectrograph::text_canvas::TextCanvas;
use gyro_spectrograph::utils::{display_len, fft_bin, SAMPLE_RATE_HZ};
use gyro_spectrograph::{
    spectrograph, Axis, BufferState, GraphicsArea, NotchFilters, NotchSlot, SpecCommand, ViewController,
    ViewState,
};

#[test]
fn sine_peaks_at_its_display_byte() {
    let (producer, mut processor, reader) = spectrograph::<1024>();

    // 400 Hz is exactly transform bin 128, shown by display byte 127
    let mut samples = [0.0f32; 1024];
    for (i, s) in samples.iter_mut().enumerate() {
        *s = 10.0 * (2.0 * PI * 400.0 * i as f32 / SAMPLE_RATE_HZ as f32).sin();
    }
    for axis in Axis::ALL {
        producer.fill(axis, &samples);
    }
    let report = processor.process_cycle();
    assert_eq!(report.processed_count(), 3);
    assert!(reader.is_ready());

    for axis in Axis::ALL {
        let snap = reader.read_snapshot(axis);
        assert_eq!(snap.display.len(), display_len::<1024>());
        assert_eq!(snap.display[127], 255);
        assert_eq!(snap.max_hold[127], 255);
        // Hann leakage stays within a couple of bins
        assert!(snap.display[100] < 5);
        assert!(snap.display[160] < 5);
        assert_eq!(producer.state(axis), BufferState::Consumed);
    }
}

#[test]
fn concurrent_producer_processor_and_reader() {
    let (producer, mut processor, reader) = spectrograph::<512>();
    let stop = Arc::new(AtomicBool::new(false));

    let gyro = thread::spawn({
        let stop = Arc::clone(&stop);
        let mut sim = GyroSimulator::new(SimulationConfig::default());
        move || {
            let mut captures = 0u32;
            while !stop.load(Ordering::SeqCst) {
                for axis in Axis::ALL {
                    producer.fill_with(axis, |buf| sim.fill(axis, &mut buf[..]));
                }
                sim.advance(512);
                captures += 1;
                thread::sleep(Duration::from_micros(200));
            }
            captures
        }
    });

    let processing = thread::spawn({
        let stop = Arc::clone(&stop);
        move || {
            while !stop.load(Ordering::SeqCst) {
                processor.process_cycle();
                thread::yield_now();
            }
            processor.cycles()
        }
    });

    let area = GraphicsArea::new(360, 288);
    let mut canvas = TextCanvas::new(360, 288, 4, 8);
    let mut view = ViewController::new();
    let notches = NotchFilters {
        slots: [NotchSlot { center_hz: 320, cutoff_hz: 240 }, NotchSlot::default()],
    };

    let mut last_generation = 0;
    let mut last_peaks = [0.0f32; 3];
    for frame in 0..200 {
        let command = if frame % 50 == 49 { SpecCommand::SwitchAxis } else { SpecCommand::None };
        canvas.clear();
        view.osd_frame(command, &reader, &notches, &area, &mut canvas);

        let generation = reader.generation();
        assert!(generation >= last_generation);
        last_generation = generation;

        for axis in Axis::ALL {
            let snap = reader.read_snapshot(axis);
            assert_eq!(snap.display.len(), 128);
            assert_eq!(snap.max_hold.len(), 128);
            // Peak never shrinks between reads
            assert!(snap.running_peak >= last_peaks[axis.index()]);
            last_peaks[axis.index()] = snap.running_peak;
            for (shown, held) in snap.display.iter().zip(&snap.max_hold) {
                assert!(held >= shown);
            }
        }
        thread::sleep(Duration::from_micros(300));
    }

    stop.store(true, Ordering::SeqCst);
    let captures = gyro.join().unwrap();
    let cycles = processing.join().unwrap();

    assert!(captures > 0);
    assert!(cycles > 0);
    assert!(reader.is_ready());
    // Four switches: roll, pitch, yaw, then back to roll
    assert_eq!(view.state(), ViewState::Single(Axis::Roll));
    assert!(canvas.to_string().contains("GYRO SPECTRUM"));
}

#[test]
fn simulated_motor_dominates_the_curve() {
    let config = SimulationConfig {
        motor_base_hz: 250.0,
        motor_sweep_hz: 0.0,
        sweep_period_s: 0.0,
        harmonics: 1,
        frame_amplitude: 0.0,
        noise_amplitude: 0.5,
        ..SimulationConfig::default()
    };
    let mut sim = GyroSimulator::new(config);
    let (producer, mut processor, reader) = spectrograph::<1024>();

    for _ in 0..5 {
        for axis in Axis::ALL {
            producer.fill_with(axis, |buf| sim.fill(axis, &mut buf[..]));
        }
        sim.advance(1024);
        processor.process_cycle();
    }

    // 250 Hz is transform bin 80, display byte 79
    let roll = reader.read_snapshot(Axis::Roll);
    let loudest = roll
        .display
        .iter()
        .enumerate()
        .max_by_key(|&(_, &v)| v)
        .map(|(i, _)| i);
    assert_eq!(loudest, Some(79));
    assert!(fft_bin::<1024>(250) < display_len::<1024>());
}
