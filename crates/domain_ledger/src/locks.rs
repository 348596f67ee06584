//! Per-student serialization locks
//!
//! Every read-modify-write against a student's ledger entries or invoices
//! runs while holding that student's lock, so concurrent callers can never
//! both observe the same remaining amount and both spend it. Different
//! students stay independent, which keeps batch invoice generation
//! parallelizable.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use core_kernel::StudentId;

/// Registry of lazily-allocated per-student mutexes
#[derive(Debug, Default)]
pub struct StudentLocks {
    locks: Mutex<HashMap<StudentId, Arc<Mutex<()>>>>,
}

impl StudentLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the lock for a student, allocating it on first use
    ///
    /// Callers hold the returned mutex for the duration of the operation:
    ///
    /// ```rust,ignore
    /// let lock = locks.for_student(student_id);
    /// let _guard = lock.lock().expect("student lock poisoned");
    /// // read-modify-write entries and invoices
    /// ```
    pub fn for_student(&self, student_id: StudentId) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().expect("lock registry poisoned");
        locks.entry(student_id).or_default().clone()
    }
}
