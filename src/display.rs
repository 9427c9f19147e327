use serde::{Deserialize, Serialize};
use crate::axis::Axis;
use crate::osd::{Font, HAlign, Level, Mask, OsdCanvas, VAlign};
use crate::spectrum::{AxisSnapshot, SpectrumReader};
use crate::utils::{column_frequency, fft_bin, FREQ_TICKS, MAX_DISPLAY_FREQ_HZ};

pub const GRAPH_HEIGHT_TOTAL: i32 = 200;
pub const GRAPH_HEIGHT_SPACING: i32 = 10;
pub const GRAPH_HEIGHT_SINGLE: i32 = GRAPH_HEIGHT_TOTAL / 3 - GRAPH_HEIGHT_SPACING;
// Vertical axis stops this far below the graph top, leaving room for labels
const AXIS_TOP_MARGIN: i32 = 10;

pub const PAGE_TITLE: &str = "GYRO SPECTRUM";
pub const PAGE_HINT: &str = "ROLL RIGHT: SWITCH   ROLL LEFT: EXIT";

/// One software notch filter as configured for the gyro. Zero centre means
/// the slot is unused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotchSlot {
    pub center_hz: u32,
    pub cutoff_hz: u32,
}

impl NotchSlot {
    pub fn is_active(&self) -> bool {
        self.center_hz != 0
    }
}

/// Notch settings overlaid on the graphs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotchFilters {
    pub slots: [NotchSlot; 2],
}

/// Drawable region of the OSD in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphicsArea {
    pub left: i32,
    pub right: i32,
    pub bottom: i32,
    pub x_middle: i32,
}

impl GraphicsArea {
    /// Area covering a `width` x `height` pixel screen.
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            left: 0,
            right: width - 1,
            bottom: height - 1,
            x_middle: width / 2,
        }
    }

    fn graph_left(&self) -> i32 {
        self.left + 20
    }

    fn graph_bottom(&self) -> i32 {
        self.bottom - 30
    }

    fn graph_width(&self) -> i32 {
        self.right - self.left - 40
    }
}

/// Command events delivered to the spectrograph page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpecCommand {
    #[default]
    None,
    SwitchAxis,
}

/// Which graphs are on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewState {
    /// All three axes stacked; only ever the entry state.
    #[default]
    AllAxes,
    Single(Axis),
}

impl ViewState {
    pub fn next(self) -> ViewState {
        match self {
            ViewState::AllAxes => ViewState::Single(Axis::Roll),
            ViewState::Single(axis) => ViewState::Single(axis.next()),
        }
    }
}

/// Position and size of one graph. `(x0, y0)` is the bottom-left origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphRect {
    pub x0: i32,
    pub y0: i32,
    pub width: i32,
    pub height: i32,
}

/// Selects the visible axes and turns snapshots into draw calls.
#[derive(Debug, Default)]
pub struct ViewController {
    state: ViewState,
    snapshot: AxisSnapshot,
}

impl ViewController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn switch_axis(&mut self) {
        self.state = self.state.next();
    }

    pub fn apply(&mut self, command: SpecCommand) {
        match command {
            SpecCommand::SwitchAxis => self.switch_axis(),
            SpecCommand::None => {}
        }
    }

    /// Graph placement for the current state.
    pub fn layout(&self, area: &GraphicsArea) -> Vec<(Axis, GraphRect)> {
        let x0 = area.graph_left();
        let bottom = area.graph_bottom();
        let width = area.graph_width();

        match self.state {
            ViewState::AllAxes => {
                let step = GRAPH_HEIGHT_SINGLE + GRAPH_HEIGHT_SPACING;
                Axis::ALL
                    .iter()
                    .enumerate()
                    .map(|(slot, &axis)| {
                        let y0 = bottom - (2 - slot as i32) * step;
                        (axis, GraphRect { x0, y0, width, height: GRAPH_HEIGHT_SINGLE })
                    })
                    .collect()
            }
            ViewState::Single(axis) => vec![(
                axis,
                GraphRect { x0, y0: bottom, width, height: GRAPH_HEIGHT_TOTAL - 20 },
            )],
        }
    }

    /// Draws the graphs for the current state.
    ///
    /// Each axis is copied out of the store before any drawing, so the
    /// result lock is never held while the canvas works.
    pub fn render<const N: usize, C: OsdCanvas>(
        &mut self,
        reader: &SpectrumReader<N>,
        notches: &NotchFilters,
        area: &GraphicsArea,
        canvas: &mut C,
    ) {
        for (axis, rect) in self.layout(area) {
            reader.read_snapshot_into(axis, &mut self.snapshot);
            draw_graph::<N, C>(canvas, &self.snapshot, axis, rect, notches);
        }
    }

    /// One OSD frame of the spectrograph page: draws the current view and the
    /// page text, then applies `command` for the next frame.
    pub fn osd_frame<const N: usize, C: OsdCanvas>(
        &mut self,
        command: SpecCommand,
        reader: &SpectrumReader<N>,
        notches: &NotchFilters,
        area: &GraphicsArea,
        canvas: &mut C,
    ) {
        self.render(reader, notches, area, canvas);
        self.apply(command);

        canvas.text(
            PAGE_TITLE,
            area.x_middle,
            area.bottom - GRAPH_HEIGHT_TOTAL - 30,
            VAlign::Top,
            HAlign::Center,
            Font::Font8x10,
        );
        canvas.text(PAGE_HINT, area.x_middle, area.bottom - 18, VAlign::Top, HAlign::Center, Font::Font8x10);
    }
}

/// Draws one axis graph: frame, labels, curves, peak readout and notch
/// markers.
pub fn draw_graph<const N: usize, C: OsdCanvas>(
    canvas: &mut C,
    snapshot: &AxisSnapshot,
    axis: Axis,
    rect: GraphRect,
    notches: &NotchFilters,
) {
    let GraphRect { x0, y0, width, height } = rect;
    if width <= 0 || height <= 0 {
        return;
    }
    let top = y0 - height;
    let axis_top = top + AXIS_TOP_MARGIN;

    canvas.hline(x0, x0 + width, y0, Level::White, Mask::Opaque);
    canvas.hline(x0, x0 + width, y0 + 1, Level::Black, Mask::Opaque);
    canvas.vline(x0, y0, axis_top, Level::White, Mask::Opaque);
    canvas.vline(x0 - 1, y0 + 1, axis_top, Level::Black, Mask::Opaque);

    canvas.text(axis.name(), x0 + width, top, VAlign::Top, HAlign::Right, Font::Outlined8x8);

    for tick in 0..=FREQ_TICKS {
        let label = (tick * MAX_DISPLAY_FREQ_HZ / FREQ_TICKS).to_string();
        let x = x0 + tick as i32 * width / FREQ_TICKS as i32;
        canvas.text(&label, x, y0 + 2, VAlign::Top, HAlign::Center, Font::Outlined8x8);
    }

    for x in 0..width {
        let bin = fft_bin::<N>(column_frequency(x, width));
        let column = x0 + x;

        let bar = curve_height(height, snapshot.display.get(bin).copied());
        canvas.vline(column, y0, y0 - bar, Level::White, Mask::Opaque);
        canvas.pixel(column, y0 - bar, Level::White, Mask::Transparent);

        let held = curve_height(height, snapshot.max_hold.get(bin).copied());
        canvas.pixel(column, y0 - held, Level::White, Mask::Transparent);
        canvas.pixel(column, y0 - held + 1, Level::White, Mask::Opaque);
        canvas.pixel(column, y0 - held - 1, Level::White, Mask::Opaque);
    }

    // Rough physical units: the transform gain grows with N
    let readout = (snapshot.running_peak as i64 / N as i64).to_string();
    canvas.text(&readout, x0, top, VAlign::Top, HAlign::Center, Font::Outlined8x8);

    for (index, slot) in notches.slots.iter().enumerate() {
        if !slot.is_active() {
            continue;
        }
        let label = format!("N{}", index + 1);
        for freq in [slot.center_hz, slot.cutoff_hz] {
            if let Some(offset) = frequency_column(freq, width) {
                let pos = x0 + offset;
                canvas.vline(pos, y0, axis_top, Level::Black, Mask::Opaque);
                canvas.text(&label, pos, top, VAlign::Top, HAlign::Center, Font::Outlined8x8);
            }
        }
    }
}

/// Pixel height of a curve byte within a graph `height` pixels tall.
fn curve_height(height: i32, value: Option<u8>) -> i32 {
    (height * value.unwrap_or(0) as i32) >> 8
}

/// Column offset of `freq_hz`, or `None` when it lies past the right edge.
fn frequency_column(freq_hz: u32, width: i32) -> Option<i32> {
    let offset = freq_hz as i64 * width as i64 / MAX_DISPLAY_FREQ_HZ as i64;
    (offset <= width as i64).then_some(offset as i32)
}
