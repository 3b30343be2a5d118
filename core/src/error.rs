use chrono::NaiveDate;
use thiserror::Error;

use crate::model::coordinate::CellCoordinate;

/// Domain failures of the merge pipeline. Each one aborts the whole batch before anything
/// is written.
///
/// These travel inside `anyhow::Error` so transport failures from the repositories are
/// never wrapped; use `err.downcast_ref::<MergeError>()` to tell them apart.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum MergeError {
    #[error("Couldn't find {0} date in spreadsheet.")]
    DateNotFound(NaiveDate),

    #[error("Error in value of cell {cell}: value '{value}' cannot be cast to float.")]
    UnexpectedCellValue { cell: CellCoordinate, value: String },

    #[error("Unknown alias '{0}'.")]
    UnknownAlias(String),
}

/// What the host sees when a push cannot go through because of the data.
#[derive(Debug, Error, Clone, PartialEq)]
#[error("{0}")]
pub struct PushEntryFailed(pub String);

impl From<MergeError> for PushEntryFailed {
    fn from(err: MergeError) -> Self {
        PushEntryFailed(err.to_string())
    }
}
