use std::num::ParseIntError;

use tactics_core::CellCoord;
use thiserror::Error;

/// Delimiter separating the column and row of a tapped cell.
const FIELD_DELIMITER: char = ',';

/// Errors that can occur while parsing a `column,row` tap argument.
#[derive(Debug, Error)]
pub(crate) enum TapParseError {
    /// The argument did not contain exactly one delimiter.
    #[error("expected `column,row`, got `{0}`")]
    MissingDelimiter(String),
    /// One of the coordinates was not a non-negative integer.
    #[error("invalid coordinate `{value}`: {source}")]
    InvalidCoordinate {
        /// Offending coordinate text.
        value: String,
        /// Underlying integer parse failure.
        source: ParseIntError,
    },
}

/// Parses a tapped grid cell written as `column,row`.
pub(crate) fn parse_cell(value: &str) -> Result<CellCoord, TapParseError> {
    let trimmed = value.trim();
    let (column, row) = trimmed
        .split_once(FIELD_DELIMITER)
        .ok_or_else(|| TapParseError::MissingDelimiter(trimmed.to_owned()))?;
    Ok(CellCoord::new(parse_coordinate(column)?, parse_coordinate(row)?))
}

fn parse_coordinate(value: &str) -> Result<u32, TapParseError> {
    let value = value.trim();
    value
        .parse()
        .map_err(|source| TapParseError::InvalidCoordinate {
            value: value.to_owned(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_column_then_row() {
        assert_eq!(parse_cell("4,5").ok(), Some(CellCoord::new(4, 5)));
        assert_eq!(parse_cell(" 12 , 0 ").ok(), Some(CellCoord::new(12, 0)));
    }

    #[test]
    fn rejects_missing_delimiter() {
        assert!(matches!(
            parse_cell("45"),
            Err(TapParseError::MissingDelimiter(_))
        ));
    }

    #[test]
    fn rejects_negative_coordinates() {
        assert!(matches!(
            parse_cell("-1,3"),
            Err(TapParseError::InvalidCoordinate { .. })
        ));
    }
}
