use std::collections::BTreeMap;

use anyhow::{anyhow, Context, Result};
use tracing::{info, warn};

use crate::error::{MergeError, PushEntryFailed};
use crate::model::coordinate::CellCoordinate;
use crate::model::entry::{Entry, PendingEntry};
use crate::model::ledger::LedgerLayout;
use crate::model::mapping::{ActivityMapping, Project};
use crate::repository::{LedgerRepository, PendingRepository};
use crate::service::merge::MergeEngine;

#[derive(Debug, Clone, PartialEq)]
pub struct PushReport {
    pub entries: usize,
    pub cells: BTreeMap<CellCoordinate, String>,
    pub dry_run: bool,
}

/// Host-facing surface: queue entries locally, then push them as one batch.
pub struct PushService<L: LedgerRepository, P: PendingRepository> {
    ledger: L,
    pending: P,
    mapping: ActivityMapping,
    layout: LedgerLayout,
}

impl<L: LedgerRepository, P: PendingRepository> PushService<L, P> {
    pub fn new(ledger: L, pending: P, mapping: ActivityMapping, layout: LedgerLayout) -> Self {
        Self {
            ledger,
            pending,
            mapping,
            layout,
        }
    }

    pub fn push_entry(&self, entry: Entry) -> Result<PendingEntry> {
        // Catch typos now instead of at push time.
        self.mapping.duration_column(&entry.alias)?;
        let pending = PendingEntry::new(entry);
        self.pending.push(pending.clone())?;
        Ok(pending)
    }

    pub fn pending(&self) -> Result<Vec<PendingEntry>> {
        self.pending.list()
    }

    /// Drops the pending entry whose id starts with `id_prefix`.
    pub fn discard(&self, id_prefix: &str) -> Result<PendingEntry> {
        let matches: Vec<PendingEntry> = self
            .pending
            .list()?
            .into_iter()
            .filter(|p| p.id.to_string().starts_with(id_prefix))
            .collect();

        match matches.as_slice() {
            [one] => {
                self.pending.remove(&one.id)?;
                Ok(one.clone())
            }
            [] => Err(anyhow!("No pending entry matches '{}'", id_prefix)),
            _ => Err(anyhow!(
                "'{}' matches {} pending entries, use a longer prefix",
                id_prefix,
                matches.len()
            )),
        }
    }

    /// Pushes the whole pending batch. The batch is only cleared once the write went
    /// through; data problems come back as [`PushEntryFailed`], transport errors as they are.
    pub fn flush_pending_entries(&self, dry_run: bool) -> Result<PushReport> {
        let entries: Vec<Entry> = self.pending.list()?.into_iter().map(|p| p.entry).collect();
        let engine = MergeEngine::new(&self.ledger, &self.mapping, &self.layout);

        let result = if dry_run {
            engine.plan(&entries)
        } else {
            engine.apply(&entries)
        };
        let cells = result.map_err(|err| {
            if let Some(merge_err) = err.downcast_ref::<MergeError>() {
                warn!(error = %merge_err, "push rejected");
                return anyhow::Error::new(PushEntryFailed::from(merge_err.clone()));
            }
            err
        })?;

        if !dry_run && !entries.is_empty() {
            self.pending
                .clear()
                .context("Cells were written but the pending batch could not be cleared")?;
            info!(entries = entries.len(), "pending batch cleared");
        }

        Ok(PushReport {
            entries: entries.len(),
            cells,
            dry_run,
        })
    }

    pub fn list_projects(&self) -> &[Project] {
        self.mapping.projects()
    }
}
