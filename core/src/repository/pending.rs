use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use uuid::Uuid;

use crate::config::default_data_dir;
use crate::model::entry::PendingEntry;
use crate::repository::traits::PendingRepository;

const PENDING_FILE_NAME: &str = "pending.json";

#[derive(Clone)]
pub struct FilePendingRepository {
    file_path: PathBuf,
}

impl FilePendingRepository {
    pub fn new(base_dir: Option<PathBuf>) -> Result<Self> {
        let mut path = match base_dir {
            Some(dir) => dir,
            None => default_data_dir()?,
        };
        fs::create_dir_all(&path)?;
        path.push(PENDING_FILE_NAME);

        let repo = FilePendingRepository { file_path: path };
        if !repo.file_path.exists() {
            repo.write_entries(&[])?;
        }
        Ok(repo)
    }

    fn read_entries(&self) -> Result<Vec<PendingEntry>> {
        let file = File::open(&self.file_path)?;
        let reader = BufReader::new(file);
        let entries = serde_json::from_reader(reader)?;
        Ok(entries)
    }

    fn write_entries(&self, entries: &[PendingEntry]) -> Result<()> {
        let file = File::create(&self.file_path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, entries)?;
        writer.flush()?;
        Ok(())
    }
}

impl PendingRepository for FilePendingRepository {
    fn list(&self) -> Result<Vec<PendingEntry>> {
        self.read_entries()
    }

    fn push(&self, entry: PendingEntry) -> Result<()> {
        let mut entries = self.read_entries()?;
        entries.push(entry);
        self.write_entries(&entries)
    }

    fn remove(&self, id: &Uuid) -> Result<()> {
        let mut entries = self.read_entries()?;
        let initial_len = entries.len();
        entries.retain(|e| e.id != *id);

        if entries.len() == initial_len {
            return Err(anyhow!("Pending entry with ID {} not found", id));
        }
        self.write_entries(&entries)
    }

    fn clear(&self) -> Result<()> {
        self.write_entries(&[])
    }
}
