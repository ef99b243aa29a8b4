// src/persistence.rs
use crate::core::types::{Basket, CurriculumPosition};
use crate::error::EngineError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::Path;
use tempfile::NamedTempFile;

/// Committed baskets for one curriculum run, keyed and iterated in
/// curriculum order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasketStore {
    baskets: BTreeMap<CurriculumPosition, Basket>,
}

impl BasketStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, basket: Basket) {
        self.baskets.insert(basket.position, basket);
    }

    pub fn get(&self, position: CurriculumPosition) -> Option<&Basket> {
        self.baskets.get(&position)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurriculumPosition, &Basket)> {
        self.baskets.iter()
    }

    pub fn len(&self) -> usize {
        self.baskets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.baskets.is_empty()
    }
}

/// One JSON export row. Keeps the record layout of `BasketEntry`
/// (`side_a`, `side_b`, `bucket_id`, `unit_count`) under a position label.
#[derive(Serialize)]
struct ExportedBasket<'a> {
    position: String,
    records: &'a [crate::core::types::BasketEntry],
}

/// Atomically writes the store: serialize into a temp file in the target
/// directory, then persist over the destination.
pub fn save_to_disk(store: &BasketStore, path: &Path) -> Result<(), EngineError> {
    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    let writer = BufWriter::new(&temp_file);
    bincode::serialize_into(writer, store)?;
    temp_file
        .persist(path)
        .map_err(|e| EngineError::Io(e.error))?;
    Ok(())
}

pub fn load_from_disk(path: &Path) -> Result<BasketStore, EngineError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);
    let store: BasketStore = bincode::deserialize_from(reader)?;
    Ok(store)
}

/// Human-readable export of every basket's records, in curriculum order.
pub fn export_json(store: &BasketStore, path: &Path) -> Result<(), EngineError> {
    let rows: Vec<ExportedBasket<'_>> = store
        .iter()
        .map(|(position, basket)| ExportedBasket {
            position: position.to_string(),
            records: &basket.entries,
        })
        .collect();

    let parent_dir = path.parent().unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(parent_dir)?;
    let temp_file = NamedTempFile::new_in(parent_dir)?;
    let writer = BufWriter::new(&temp_file);
    serde_json::to_writer_pretty(writer, &rows)?;
    temp_file
        .persist(path)
        .map_err(|e| EngineError::Io(e.error))?;
    Ok(())
}
