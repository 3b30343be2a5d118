pub mod config;
pub mod error;
pub mod input;
pub mod model;
pub mod repository;
pub mod service;
pub mod time;

pub use config::Config;
pub use error::{MergeError, PushEntryFailed};
pub use input::{parse_entry_args, ParsedInput};
pub use model::coordinate::{CellCoordinate, RangeSpec};
pub use model::entry::{Entry, PendingEntry};
pub use model::ledger::{DateRowIndex, LedgerLayout};
pub use model::mapping::{Activity, ActivityMapping, Project};
pub use repository::{
    FileLedgerRepository, FilePendingRepository, LedgerRepository, PendingRepository,
};
pub use service::merge::MergeEngine;
pub use service::push_service::{PushReport, PushService};
pub use service::resolver::CoordinateResolver;
pub use time::{parse_entry_date, parse_hours};
