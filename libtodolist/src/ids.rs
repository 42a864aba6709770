//! Todo id generation
//!
//! The default scheme keeps the creation-time derived ids of stored
//! collections (decimal milliseconds since the epoch) but never hands out a
//! duplicate: a candidate that does not advance past the last issued id, or
//! that is already present, is bumped until it is free.

use std::sync::atomic::{AtomicI64, Ordering};

use crate::config::IdScheme;

pub struct IdGenerator {
    scheme: IdScheme,
    last_issued: AtomicI64,
}

impl IdGenerator {
    pub fn new(scheme: IdScheme) -> Self {
        Self {
            scheme,
            last_issued: AtomicI64::new(0),
        }
    }

    pub fn scheme(&self) -> IdScheme {
        self.scheme
    }

    /// Produce an id that `is_taken` rejects for no existing record
    pub fn next_id<F>(&self, is_taken: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        match self.scheme {
            IdScheme::Uuid => loop {
                let id = uuid::Uuid::new_v4().to_string();
                if !is_taken(&id) {
                    return id;
                }
            },
            IdScheme::Timestamp => {
                self.next_timestamp_id(chrono::Utc::now().timestamp_millis(), is_taken)
            }
        }
    }

    fn next_timestamp_id<F>(&self, now_millis: i64, is_taken: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        let mut candidate = now_millis.max(self.last_issued.load(Ordering::SeqCst) + 1);
        while is_taken(&candidate.to_string()) {
            candidate += 1;
        }
        self.last_issued.fetch_max(candidate, Ordering::SeqCst);
        candidate.to_string()
    }
}
