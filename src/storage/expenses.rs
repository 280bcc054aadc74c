//! Expense repository for JSON storage
//!
//! Keeps the expense ledger in memory behind an `RwLock` and mirrors every
//! insert to `expenses.json`.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ExpenseError, ExpenseResult};
use crate::models::{Expense, ExpenseId, NewExpense, TimeRange};

use super::file_io::{read_json, write_json_atomic};
use super::notify::{ChangeNotifier, StoreEvent};
use super::ExpenseStore;

/// On-disk layout of expenses.json
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ExpenseData {
    /// Highest id ever handed out
    #[serde(default)]
    last_id: i64,
    #[serde(default)]
    expenses: Vec<Expense>,
}

/// Repository for expense persistence
pub struct ExpenseRepository {
    /// Backing file; `None` keeps everything in memory
    path: Option<PathBuf>,
    data: RwLock<ExpenseData>,
    revision: AtomicU64,
    notifier: ChangeNotifier,
}

impl ExpenseRepository {
    /// Create a repository backed by the given file
    ///
    /// Call [`ExpenseRepository::load`] before use.
    pub fn new(path: PathBuf) -> Self {
        Self::with_path(Some(path))
    }

    /// Create a repository that never touches the disk
    pub fn in_memory() -> Self {
        Self::with_path(None)
    }

    fn with_path(path: Option<PathBuf>) -> Self {
        Self {
            path,
            data: RwLock::new(ExpenseData::default()),
            revision: AtomicU64::new(0),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Load expenses from disk, replacing whatever is in memory
    pub fn load(&self) -> ExpenseResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let mut file_data: ExpenseData = read_json(path)?;
        let max_id = file_data
            .expenses
            .iter()
            .map(|e| e.id.get())
            .max()
            .unwrap_or(0);
        file_data.last_id = file_data.last_id.max(max_id);

        debug!(
            path = %path.display(),
            count = file_data.expenses.len(),
            "loaded expenses"
        );

        *self.write()? = file_data;
        Ok(())
    }

    /// Get an expense by id
    pub fn get(&self, id: ExpenseId) -> ExpenseResult<Option<Expense>> {
        Ok(self.read()?.expenses.iter().find(|e| e.id == id).cloned())
    }

    /// All expenses, newest first
    pub fn get_all(&self) -> ExpenseResult<Vec<Expense>> {
        self.query_by_range(TimeRange::all())
    }

    /// Count expenses
    pub fn count(&self) -> ExpenseResult<usize> {
        Ok(self.read()?.expenses.len())
    }

    fn persist(&self, data: &ExpenseData) -> ExpenseResult<()> {
        match &self.path {
            Some(path) => write_json_atomic(path, data),
            None => Ok(()),
        }
    }

    fn read(&self) -> ExpenseResult<RwLockReadGuard<'_, ExpenseData>> {
        self.data
            .read()
            .map_err(|e| ExpenseError::Store(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> ExpenseResult<RwLockWriteGuard<'_, ExpenseData>> {
        self.data
            .write()
            .map_err(|e| ExpenseError::Store(format!("Failed to acquire write lock: {}", e)))
    }
}

impl ExpenseStore for ExpenseRepository {
    fn insert(&self, expense: NewExpense) -> ExpenseResult<Expense> {
        let mut data = self.write()?;

        let id = ExpenseId::new(data.last_id + 1);
        let expense = expense.into_expense(id);
        data.last_id = id.get();
        data.expenses.push(expense.clone());

        if let Err(err) = self.persist(&data) {
            data.expenses.pop();
            data.last_id -= 1;
            warn!(error = %err, "insert rolled back");
            return Err(err);
        }

        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        info!(id = %id, revision, "expense recorded");

        // Published under the write lock so subscribers see events in commit order
        self.notifier.publish(StoreEvent::Inserted {
            id,
            occurred_at: expense.occurred_at,
            revision,
        });

        Ok(expense)
    }

    fn query_by_range(&self, range: TimeRange) -> ExpenseResult<Vec<Expense>> {
        let data = self.read()?;
        let mut expenses: Vec<_> = data
            .expenses
            .iter()
            .filter(|e| range.contains(e.occurred_at))
            .cloned()
            .collect();
        expenses.sort_by(|a, b| {
            b.occurred_at
                .cmp(&a.occurred_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(expenses)
    }

    fn subscribe(&self) -> Receiver<StoreEvent> {
        self.notifier.subscribe()
    }

    fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }
}
