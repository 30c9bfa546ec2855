use crate::error::{AppError, RouteError};
use crate::processor::{self, ImageRecord};
use crate::route::{self, Route, RouteOrder};
use serde::Serialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RecordId(u64);

#[derive(Debug)]
pub struct ImportFailure {
    pub path: PathBuf,
    pub error: AppError,
}

#[derive(Debug, Default)]
pub struct ImportReport {
    pub imported: Vec<RecordId>,
    pub failures: Vec<ImportFailure>,
}

/// Owns the imported records. Records are only ever appended or removed.
#[derive(Debug, Default)]
pub struct GallerySession {
    records: Vec<(RecordId, ImageRecord)>,
    next_id: u64,
    parallel_import: bool,
}

impl GallerySession {
    pub fn new(parallel_import: bool) -> Self {
        Self { parallel_import, ..Self::default() }
    }

    /// Imports every path, appending successes in input order. The same
    /// path imported twice yields two records.
    pub fn import(&mut self, paths: &[PathBuf]) -> ImportReport {
        let mut report = ImportReport::default();
        for (path, result) in processor::build_records(paths, self.parallel_import) {
            match result {
                Ok(record) => {
                    let id = RecordId(self.next_id);
                    self.next_id += 1;
                    self.records.push((id, record));
                    report.imported.push(id);
                }
                Err(error) => report.failures.push(ImportFailure { path, error }),
            }
        }
        log::info!(
            "Imported {} image(s), {} failure(s)",
            report.imported.len(),
            report.failures.len()
        );
        report
    }

    pub fn records(&self) -> impl Iterator<Item = (RecordId, &ImageRecord)> {
        self.records.iter().map(|(id, record)| (*id, record))
    }

    pub fn get(&self, id: RecordId) -> Option<&ImageRecord> {
        self.records.iter().find(|(rid, _)| *rid == id).map(|(_, r)| r)
    }

    pub fn remove(&mut self, id: RecordId) -> Option<ImageRecord> {
        let index = self.records.iter().position(|(rid, _)| *rid == id)?;
        Some(self.records.remove(index).1)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn route(&self, order: RouteOrder) -> Result<Route, RouteError> {
        route::build_route(self.records.iter().map(|(_, r)| r), order)
    }
}
