//! Timestamped page titles.
//!
//! Pages are never updated, so every title must be new. A local timestamp is
//! appended; two titles stamped within the same second get a ` (n)` suffix.

use chrono::{Local, NaiveDateTime};
use std::collections::HashMap;
use std::sync::Mutex;

/// Human-readable timestamp appended to every title.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Appends timestamps to titles, never handing out the same title twice.
#[derive(Debug, Default)]
pub struct TitleStamper {
    // (current second, issue count per stamped title within it)
    issued: Mutex<(String, HashMap<String, u32>)>,
}

impl TitleStamper {
    pub fn new() -> Self {
        Self::default()
    }

    /// `"{title} – {now}"`, unique for this stamper.
    pub fn stamp(&self, title: &str) -> String {
        self.stamp_at(title, Local::now().naive_local())
    }

    /// Like [`stamp`](Self::stamp) with an explicit clock reading.
    pub fn stamp_at(&self, title: &str, now: NaiveDateTime) -> String {
        let second = now.format(TIMESTAMP_FORMAT).to_string();
        let stamped = format!("{title} – {second}");

        let mut guard = self.issued.lock().unwrap_or_else(|e| e.into_inner());
        let (current, counts) = &mut *guard;
        if *current != second {
            *current = second;
            counts.clear();
        }

        let n = counts.entry(stamped.clone()).or_insert(0);
        *n += 1;
        if *n == 1 {
            stamped
        } else {
            format!("{stamped} ({n})")
        }
    }
}
