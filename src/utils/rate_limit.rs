use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::Local;
use tracing::{error, warn};

use crate::config::countries::DOMESTIC_CALLING_CODE;
use crate::models::lead_models::{RateLimitDecision, SubmissionRecord};

const STORAGE_KEY: &str = "phone_submissions";
const MAX_SUBMISSIONS_PER_DAY: u32 = 2;

/// One namespaced key holding a JSON-encoded list of submission records.
/// Injected so tests can swap the file on disk for an in-memory map.
pub trait SubmissionStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        FileStore { dir: dir.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl SubmissionStore for FileStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

#[cfg(test)]
pub struct MemoryStore {
    entries: std::sync::Mutex<std::collections::HashMap<String, String>>,
}

#[cfg(test)]
impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            entries: std::sync::Mutex::new(std::collections::HashMap::new()),
        }
    }

    pub fn put(&self, key: &str, value: &str) {
        self.entries
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
    }
}

#[cfg(test)]
impl SubmissionStore for MemoryStore {
    fn load(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.lock().unwrap().get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<()> {
        self.put(key, value);
        Ok(())
    }
}

/// Daily submission cap per phone number, calendar-day window in local time.
/// Applies only to domestic (+1) numbers; everything else bypasses. That is
/// the product's scoping decision, carried over as-is.
pub struct PhoneRateLimiter {
    store: Arc<dyn SubmissionStore>,
    cap: u32,
}

impl PhoneRateLimiter {
    pub fn new(store: Arc<dyn SubmissionStore>) -> Self {
        PhoneRateLimiter {
            store,
            cap: MAX_SUBMISSIONS_PER_DAY,
        }
    }

    /// Storage trouble must never block a legitimate lead, so every error
    /// path here logs and allows.
    pub fn can_submit(&self, phone: &str) -> RateLimitDecision {
        if !phone.starts_with(DOMESTIC_CALLING_CODE) {
            return RateLimitDecision::allow(None);
        }
        match self.check(phone) {
            Ok(decision) => decision,
            Err(e) => {
                error!("rate limit check failed, allowing submission: {:#}", e);
                RateLimitDecision::allow(None)
            }
        }
    }

    pub fn record_submission(&self, phone: &str) {
        if !phone.starts_with(DOMESTIC_CALLING_CODE) {
            return;
        }
        if let Err(e) = self.record(phone) {
            error!("failed to record phone submission: {:#}", e);
        }
    }

    /// How many times this number submitted today. Zero for non-domestic
    /// numbers, which are never tracked.
    pub fn submission_count(&self, phone: &str) -> u32 {
        if !phone.starts_with(DOMESTIC_CALLING_CODE) {
            return 0;
        }
        match self.load_today() {
            Ok(records) => count_for(&records, phone),
            Err(e) => {
                error!("failed to read submission count: {:#}", e);
                0
            }
        }
    }

    fn check(&self, phone: &str) -> Result<RateLimitDecision> {
        let records = self.load_today()?;
        let count = count_for(&records, phone);
        if count >= self.cap {
            return Ok(RateLimitDecision {
                allowed: false,
                reason: Some(format!(
                    "You have reached the daily submission limit of {} submissions. Please try again tomorrow.",
                    self.cap
                )),
                count: Some(count),
            });
        }
        Ok(RateLimitDecision::allow(Some(count)))
    }

    fn record(&self, phone: &str) -> Result<()> {
        let mut records = self.load_today()?;
        records.push(SubmissionRecord {
            phone: phone.to_string(),
            timestamp: Local::now().timestamp_millis(),
            date: today_date(),
        });
        self.store.save(STORAGE_KEY, &serde_json::to_string(&records)?)
    }

    /// Reads the stored list, drops anything not from today and persists the
    /// pruned list back. After this the store never holds stale records.
    fn load_today(&self) -> Result<Vec<SubmissionRecord>> {
        let today = today_date();
        let records: Vec<SubmissionRecord> = match self.store.load(STORAGE_KEY)? {
            Some(raw) => match serde_json::from_str(&raw) {
                Ok(records) => records,
                Err(e) => {
                    // Unparseable state gets reset rather than wedging the form.
                    warn!("discarding corrupt submission records: {}", e);
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        let kept: Vec<SubmissionRecord> =
            records.into_iter().filter(|r| r.date == today).collect();
        self.store.save(STORAGE_KEY, &serde_json::to_string(&kept)?)?;
        Ok(kept)
    }
}

fn count_for(records: &[SubmissionRecord], phone: &str) -> u32 {
    records.iter().filter(|r| r.phone == phone).count() as u32
}

fn today_date() -> String {
    Local::now().format("%Y-%m-%d").to_string()
}
