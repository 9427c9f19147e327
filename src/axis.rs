use std::fmt;

/// Gyro axis analysed by the spectrograph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Roll,
    Pitch,
    Yaw,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::Roll, Axis::Pitch, Axis::Yaw];

    pub fn index(self) -> usize {
        match self {
            Axis::Roll => 0,
            Axis::Pitch => 1,
            Axis::Yaw => 2,
        }
    }

    /// Label drawn on the graph.
    pub fn name(self) -> &'static str {
        match self {
            Axis::Roll => "ROLL",
            Axis::Pitch => "PITCH",
            Axis::Yaw => "YAW",
        }
    }

    /// Next axis in display order, wrapping from yaw back to roll.
    pub fn next(self) -> Axis {
        match self {
            Axis::Roll => Axis::Pitch,
            Axis::Pitch => Axis::Yaw,
            Axis::Yaw => Axis::Roll,
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
