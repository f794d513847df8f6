use crate::domain_port::*;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum StoreOp {
    Get,
    Set,
    Delete,
    Query,
}

struct Fault {
    op: StoreOp,
    path: String,
    error: StoreError,
}

/// Wraps a store and fails chosen calls, for exercising torn writes.
pub struct FaultInjectingStore {
    inner: Arc<dyn DocumentStore>,
    faults: Mutex<Vec<Fault>>,
    calls: Mutex<Vec<(StoreOp, String)>>,
}

impl FaultInjectingStore {
    pub fn new(inner: Arc<dyn DocumentStore>) -> Self {
        FaultInjectingStore {
            inner,
            faults: Mutex::new(Vec::new()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// The next `op` on `path` (a document or collection path) fails with `error`.
    pub fn fail_next(&self, op: StoreOp, path: impl ToString, error: StoreError) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.push(Fault {
                op,
                path: path.to_string(),
                error,
            });
        }
    }

    /// Calls seen so far, in order, including failed ones.
    pub fn calls(&self) -> Vec<(StoreOp, String)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn check(&self, op: StoreOp, path: String) -> Result<(), StoreError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((op, path.clone()));
        }
        let Ok(mut faults) = self.faults.lock() else {
            return Ok(());
        };
        match faults.iter().position(|f| f.op == op && f.path == path) {
            Some(index) => Err(faults.remove(index).error),
            None => Ok(()),
        }
    }
}

#[async_trait::async_trait]
impl DocumentStore for FaultInjectingStore {
    async fn get(
        &self,
        caller: &Principal,
        path: &DocPath,
    ) -> Result<Option<Document>, StoreError> {
        self.check(StoreOp::Get, path.to_string())?;
        self.inner.get(caller, path).await
    }

    async fn set(
        &self,
        caller: &Principal,
        path: &DocPath,
        doc: Document,
        mode: WriteMode,
    ) -> Result<(), StoreError> {
        self.check(StoreOp::Set, path.to_string())?;
        self.inner.set(caller, path, doc, mode).await
    }

    async fn delete(&self, caller: &Principal, path: &DocPath) -> Result<(), StoreError> {
        self.check(StoreOp::Delete, path.to_string())?;
        self.inner.delete(caller, path).await
    }

    async fn query(
        &self,
        caller: &Principal,
        collection: &CollectionPath,
        filters: &[FieldFilter],
    ) -> Result<Vec<(String, Document)>, StoreError> {
        self.check(StoreOp::Query, collection.to_string())?;
        self.inner.query(caller, collection, filters).await
    }
}
