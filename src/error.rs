use std::fmt;

#[derive(Debug)]
pub enum Error {
    /// Sum of requested arc segment values is larger than the progress max.
    SegmentSumExceedsMax { sum: f32, max: f32 },
    /// A sweep gradient needs at least two colors.
    GradientColors { count: usize },
    /// Gradient position list does not line up with the color list.
    GradientPositions { colors: usize, positions: usize },
    Io(std::io::Error),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::SegmentSumExceedsMax { sum, max } => {
                write!(f, "segment sum ({sum}) is greater than max value ({max})")
            }
            Error::GradientColors { count } => {
                write!(f, "sweep gradient needs at least 2 colors, got {count}")
            }
            Error::GradientPositions { colors, positions } => {
                write!(
                    f,
                    "gradient has {colors} colors but {positions} positions"
                )
            }
            Error::Io(e) => write!(f, "IO error: {e}"),
        }
    }
}

impl std::error::Error for Error {}

impl From<std::io::Error> for Error {
    fn from(e: std::io::Error) -> Self {
        Error::Io(e)
    }
}
