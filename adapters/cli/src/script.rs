//! Parsing of scripted pointer input given on the command line.

use std::{error::Error, fmt, num::ParseFloatError, num::ParseIntError};

use towers_core::GridPoint;

/// Separates the position from the tick in a click argument.
const TICK_DELIMITER: char = '@';
/// Separates the two coordinates of a position.
const AXIS_DELIMITER: char = ',';

/// Click scheduled for a given tick, in grid coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ScriptedClick {
    /// Tick during which the click is delivered, counted from zero.
    pub(crate) tick: u64,
    /// Grid position of the click.
    pub(crate) position: GridPoint,
}

/// Parses `X,Y` into a grid position.
pub(crate) fn parse_point(value: &str) -> Result<GridPoint, ScriptError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ScriptError::Empty);
    }

    let (x, y) = trimmed
        .split_once(AXIS_DELIMITER)
        .ok_or_else(|| ScriptError::MissingAxis(trimmed.to_owned()))?;
    let x = parse_axis(x)?;
    let y = parse_axis(y)?;

    Ok(GridPoint::new(x, y))
}

/// Parses `X,Y@TICK` into a scripted click.
pub(crate) fn parse_click(value: &str) -> Result<ScriptedClick, ScriptError> {
    let trimmed = value.trim();
    let (position, tick) = trimmed
        .split_once(TICK_DELIMITER)
        .ok_or_else(|| ScriptError::MissingTick(trimmed.to_owned()))?;
    let tick = tick.trim().parse().map_err(ScriptError::InvalidTick)?;

    Ok(ScriptedClick {
        tick,
        position: parse_point(position)?,
    })
}

fn parse_axis(value: &str) -> Result<f64, ScriptError> {
    let coordinate: f64 = value.trim().parse().map_err(ScriptError::InvalidCoordinate)?;
    if coordinate.is_finite() {
        Ok(coordinate)
    } else {
        Err(ScriptError::NonFinite(value.trim().to_owned()))
    }
}

/// Errors that can occur while parsing scripted input.
#[derive(Debug, PartialEq)]
pub(crate) enum ScriptError {
    /// The value was empty.
    Empty,
    /// The position lacked the `,` separating its coordinates.
    MissingAxis(String),
    /// The click lacked the `@` introducing its tick.
    MissingTick(String),
    /// A coordinate was not a number.
    InvalidCoordinate(ParseFloatError),
    /// A coordinate was infinite or NaN.
    NonFinite(String),
    /// The tick was not a non-negative integer.
    InvalidTick(ParseIntError),
}

impl fmt::Display for ScriptError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "expected a position such as 1.5,1.5"),
            Self::MissingAxis(value) => write!(f, "position `{value}` must be written as X,Y"),
            Self::MissingTick(value) => write!(f, "click `{value}` must be written as X,Y@TICK"),
            Self::InvalidCoordinate(error) => write!(f, "invalid coordinate: {error}"),
            Self::NonFinite(value) => write!(f, "coordinate `{value}` must be finite"),
            Self::InvalidTick(error) => write!(f, "invalid tick: {error}"),
        }
    }
}

impl Error for ScriptError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidCoordinate(error) => Some(error),
            Self::InvalidTick(error) => Some(error),
            Self::Empty | Self::MissingAxis(_) | Self::MissingTick(_) | Self::NonFinite(_) => None,
        }
    }
}
