//! Error types for the fallible edges of the crate: configuration and pattern text.
//!
//! Engine operations themselves never fail; see [`crate::universe::Universe`].

use thiserror::Error;

/// Errors raised while parsing a pasted pattern.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PatternError {
    /// RLE input had no `x = .., y = ..` header line.
    #[error("missing RLE header")]
    MissingHeader,

    /// Header line was present but malformed.
    #[error("invalid RLE header: {0}")]
    InvalidHeader(String),

    /// Only B3/S23 patterns are accepted.
    #[error("unsupported rule: {0}")]
    UnsupportedRule(String),

    /// Character not allowed in the pattern body.
    #[error("invalid character {ch:?} at line {line}")]
    InvalidChar {
        /// Offending character.
        ch: char,
        /// 1-based line number in the input.
        line: usize,
    },

    /// Live cell outside the declared header bounds.
    #[error("cell out of bounds: row {row}, col {col}")]
    OutOfBounds {
        /// Row of the cell.
        row: usize,
        /// Column of the cell.
        col: usize,
    },

    /// Run count or running position does not fit in `usize`.
    #[error("run too long at line {line}")]
    RunTooLong {
        /// 1-based line number in the input.
        line: usize,
    },

    /// Header declares more cells than a pattern may hold.
    #[error("pattern too large: {width} x {height}")]
    TooLarge {
        /// Declared width.
        width: usize,
        /// Declared height.
        height: usize,
    },

    /// No catalogue pattern has this name.
    #[error("unknown pattern: {0}")]
    UnknownPattern(String),
}

/// Errors raised while loading or validating [`crate::config::Params`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Fill probability outside `[0, 1]`.
    #[error("fill probability must be within [0, 1], got {0}")]
    FillProbability(f64),

    /// `width * height` does not fit in `usize`.
    #[error("grid area overflows: {width} x {height}")]
    AreaOverflow {
        /// Requested width.
        width: usize,
        /// Requested height.
        height: usize,
    },

    /// JSON could not be decoded.
    #[error("invalid config json: {0}")]
    Json(#[from] serde_json::Error),
}
