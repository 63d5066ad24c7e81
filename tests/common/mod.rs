#![allow(dead_code)]

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use pg_tx_middleware::prelude::*;

/// Everything a scripted handle observed, in order. The `usize` is the handle id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Acquire(usize),
    Begin(usize),
    Run(usize, String),
    Commit(usize),
    Rollback(usize),
    Release(usize),
}

/// Canned response for one `run` call.
#[derive(Debug, Clone)]
pub enum Page {
    Ids(Vec<i64>),
    Fail { code: String, message: String },
}

#[derive(Debug, Default)]
struct Script {
    pages: VecDeque<Page>,
    fail_acquire: Option<SqlMiddlewareDbError>,
    fail_begin: bool,
    fail_commit: bool,
    fail_rollback: bool,
}

#[derive(Debug, Default)]
struct Shared {
    events: Mutex<Vec<Event>>,
    script: Mutex<Script>,
    committed: Mutex<BTreeMap<String, i64>>,
    next_id: AtomicUsize,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// In-memory connection provider that records every call and applies staged writes
/// only on `COMMIT`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedProvider {
    shared: Arc<Shared>,
}

pub struct ScriptedHandle {
    id: usize,
    staged: BTreeMap<String, i64>,
    shared: Arc<Shared>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_page(&self, page: Page) {
        lock(&self.shared.script).pages.push_back(page);
    }

    pub fn fail_acquire_with(&self, err: SqlMiddlewareDbError) {
        lock(&self.shared.script).fail_acquire = Some(err);
    }

    pub fn fail_begin(&self) {
        lock(&self.shared.script).fail_begin = true;
    }

    pub fn fail_commit(&self) {
        lock(&self.shared.script).fail_commit = true;
    }

    pub fn fail_rollback(&self) {
        lock(&self.shared.script).fail_rollback = true;
    }

    pub fn events(&self) -> Vec<Event> {
        lock(&self.shared.events).clone()
    }

    pub fn committed(&self) -> BTreeMap<String, i64> {
        lock(&self.shared.committed).clone()
    }

    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events().iter().filter(|e| pred(e)).count()
    }

    pub fn acquires(&self) -> usize {
        self.count(|e| matches!(e, Event::Acquire(_)))
    }

    pub fn begins(&self) -> usize {
        self.count(|e| matches!(e, Event::Begin(_)))
    }

    pub fn commits(&self) -> usize {
        self.count(|e| matches!(e, Event::Commit(_)))
    }

    pub fn rollbacks(&self) -> usize {
        self.count(|e| matches!(e, Event::Rollback(_)))
    }

    pub fn releases(&self) -> usize {
        self.count(|e| matches!(e, Event::Release(_)))
    }
}

impl ScriptedHandle {
    fn record(&self, event: Event) {
        lock(&self.shared.events).push(event);
    }

    /// Stage a write that becomes visible only if the transaction commits.
    pub fn stage(&mut self, key: &str, value: i64) {
        self.staged.insert(key.to_string(), value);
    }

    pub fn id(&self) -> usize {
        self.id
    }
}

fn scripted_failure() -> SqlMiddlewareDbError {
    SqlMiddlewareDbError::ExecutionError("scripted failure".into())
}

#[async_trait]
impl StatementExecutor for ScriptedHandle {
    async fn run(
        &mut self,
        statement: &str,
        _params: &[RowValues],
    ) -> Result<ResultSet, SqlMiddlewareDbError> {
        self.record(Event::Run(self.id, statement.to_string()));
        let page = lock(&self.shared.script).pages.pop_front();
        match page {
            Some(Page::Fail { code, message }) => Err(SqlMiddlewareDbError::statement(code, message)),
            Some(Page::Ids(ids)) => Ok(id_rows(&ids)),
            None => Ok(id_rows(&[])),
        }
    }

    async fn execute_batch(&mut self, sql: &str) -> Result<(), SqlMiddlewareDbError> {
        let script = lock(&self.shared.script);
        let (fail_begin, fail_commit, fail_rollback) =
            (script.fail_begin, script.fail_commit, script.fail_rollback);
        drop(script);

        match sql {
            "BEGIN" => {
                self.record(Event::Begin(self.id));
                if fail_begin {
                    return Err(scripted_failure());
                }
            }
            "COMMIT" => {
                self.record(Event::Commit(self.id));
                if fail_commit {
                    return Err(scripted_failure());
                }
                let staged = std::mem::take(&mut self.staged);
                lock(&self.shared.committed).extend(staged);
            }
            "ROLLBACK" => {
                self.record(Event::Rollback(self.id));
                self.staged.clear();
                if fail_rollback {
                    return Err(scripted_failure());
                }
            }
            other => self.record(Event::Run(self.id, other.to_string())),
        }
        Ok(())
    }
}

#[async_trait]
impl ConnectionProvider for ScriptedProvider {
    type Handle = ScriptedHandle;

    const NAME: &'static str = "scripted";

    async fn acquire(&self) -> Result<Self::Handle, SqlMiddlewareDbError> {
        let id = self.shared.next_id.fetch_add(1, Ordering::SeqCst);
        lock(&self.shared.events).push(Event::Acquire(id));
        if let Some(err) = lock(&self.shared.script).fail_acquire.take() {
            return Err(err);
        }
        Ok(ScriptedHandle {
            id,
            staged: BTreeMap::new(),
            shared: Arc::clone(&self.shared),
        })
    }

    async fn release(&self, handle: Self::Handle) {
        lock(&self.shared.events).push(Event::Release(handle.id));
    }
}

pub fn id_rows(ids: &[i64]) -> ResultSet {
    let mut rs = ResultSet::with_capacity(ids.len());
    rs.set_column_names(Arc::new(vec!["id".to_string()]));
    for id in ids {
        rs.add_row_values(vec![RowValues::Int(*id)]);
    }
    rs
}

pub fn conflict() -> SqlMiddlewareDbError {
    SqlMiddlewareDbError::statement(
        "40001",
        "could not serialize access due to concurrent update",
    )
}

pub fn unique_violation() -> SqlMiddlewareDbError {
    SqlMiddlewareDbError::statement(
        "23505",
        "duplicate key value violates unique constraint \"users_pkey\"",
    )
}

pub fn syntax_error() -> SqlMiddlewareDbError {
    SqlMiddlewareDbError::statement("42601", "syntax error at or near \"SELEC\"")
}
