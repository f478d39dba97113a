//! In-memory collaborators and record generators shared by integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use fake::faker::company::en::CompanyName;
use fake::faker::lorem::en::Word;
use fake::Fake;
use skusync::adapters::{AuditStore, CatalogSource, MessageQueue};
use skusync::core::pipeline::{PipelineSettings, RetryPolicy, SkuPipeline};
use skusync::domain::{
    AuditEntry, AuditId, AuditStoreError, CanonicalRecord, QueueError, RawRecord, Result, Sku,
};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Catalog backed by a fixed record list
pub struct MemoryCatalog {
    records: Vec<RawRecord>,
    pub window_calls: AtomicUsize,
    pub id_calls: AtomicUsize,
}

impl MemoryCatalog {
    pub fn new(records: Vec<RawRecord>) -> Self {
        Self {
            records,
            window_calls: AtomicUsize::new(0),
            id_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CatalogSource for MemoryCatalog {
    async fn fetch_by_ids(&self, ids: &[Sku]) -> Result<Vec<RawRecord>> {
        self.id_calls.fetch_add(1, Ordering::SeqCst);
        let wanted: HashSet<&str> = ids.iter().map(Sku::as_str).collect();
        Ok(self
            .records
            .iter()
            .filter(|r| r.sku.as_deref().is_some_and(|s| wanted.contains(s)))
            .cloned()
            .collect())
    }

    async fn fetch_by_window(
        &self,
        _from: DateTime<Utc>,
        _to: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<RawRecord>> {
        self.window_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.records.iter().take(limit as usize).cloned().collect())
    }

    fn source_name(&self) -> &str {
        "memory"
    }
}

enum Staged {
    Insert(AuditEntry),
    SetSent(Vec<AuditId>, bool, Option<String>),
    Update(AuditEntry),
}

/// Audit store whose mutations only land on `commit`
#[derive(Default)]
pub struct MemoryAuditStore {
    next_id: AtomicI64,
    staged: Mutex<Vec<Staged>>,
    rows: Mutex<BTreeMap<AuditId, AuditEntry>>,
    pub appends: AtomicUsize,
    pub commits: AtomicUsize,
    /// Commit number (1-based) that fails, if any
    pub fail_commit_at: Option<usize>,
}

impl MemoryAuditStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_commit_at(n: usize) -> Self {
        Self {
            fail_commit_at: Some(n),
            ..Self::default()
        }
    }

    /// Committed rows in id order
    pub fn rows(&self) -> Vec<AuditEntry> {
        self.rows.lock().unwrap().values().cloned().collect()
    }

    /// Committed rows keyed by id, timestamps cleared for comparison
    pub fn terminal_state(&self) -> Vec<(AuditId, String, bool, Option<String>)> {
        self.rows
            .lock()
            .unwrap()
            .iter()
            .map(|(id, e)| (*id, e.sku.clone(), e.is_sent, e.errors.clone()))
            .collect()
    }

    pub fn staged_len(&self) -> usize {
        self.staged.lock().unwrap().len()
    }
}

#[async_trait]
impl AuditStore for MemoryAuditStore {
    async fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    async fn append_all(&self, entries: &[AuditEntry]) -> Result<Vec<AuditId>> {
        self.appends.fetch_add(1, Ordering::SeqCst);
        let mut staged = self.staged.lock().unwrap();
        let mut ids = Vec::with_capacity(entries.len());
        for entry in entries {
            let id = AuditId::new(self.next_id.fetch_add(1, Ordering::SeqCst) + 1);
            let mut entry = entry.clone();
            entry.id = Some(id);
            staged.push(Staged::Insert(entry));
            ids.push(id);
        }
        Ok(ids)
    }

    async fn bulk_set_sent(&self, ids: &[AuditId], sent: bool, error: Option<String>) -> Result<()> {
        self.staged
            .lock()
            .unwrap()
            .push(Staged::SetSent(ids.to_vec(), sent, error));
        Ok(())
    }

    async fn update_one(&self, entry: &AuditEntry) -> Result<()> {
        self.staged.lock().unwrap().push(Staged::Update(entry.clone()));
        Ok(())
    }

    async fn find_by_ids(&self, ids: &[AuditId]) -> Result<Vec<AuditEntry>> {
        let rows = self.rows.lock().unwrap();
        Ok(ids.iter().filter_map(|id| rows.get(id).cloned()).collect())
    }

    async fn commit(&self) -> Result<()> {
        let n = self.commits.fetch_add(1, Ordering::SeqCst) + 1;
        let ops = std::mem::take(&mut *self.staged.lock().unwrap());

        if self.fail_commit_at == Some(n) {
            return Err(AuditStoreError::CommitFailed("injected failure".to_string()).into());
        }

        let mut rows = self.rows.lock().unwrap();
        for op in ops {
            match op {
                Staged::Insert(entry) => {
                    if let Some(id) = entry.id {
                        rows.insert(id, entry);
                    }
                }
                Staged::SetSent(ids, sent, error) => {
                    for id in ids {
                        if let Some(row) = rows.get_mut(&id) {
                            row.mark_sent(sent, error.clone());
                        }
                    }
                }
                Staged::Update(entry) => {
                    if let Some(id) = entry.id {
                        rows.insert(id, entry);
                    }
                }
            }
        }
        Ok(())
    }

    fn store_name(&self) -> &str {
        "memory"
    }
}

/// Queue that records every delivered SKU
///
/// SKUs in `rejected` always fail. Every other SKU fails its first
/// `transient_failures` attempts.
#[derive(Default)]
pub struct RecordingQueue {
    pub rejected: HashSet<String>,
    pub transient_failures: usize,
    attempts: Mutex<HashMap<String, usize>>,
    delivered: Mutex<Vec<String>>,
}

impl RecordingQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting(skus: &[&str]) -> Self {
        Self {
            rejected: skus.iter().map(|s| s.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn flaky(transient_failures: usize) -> Self {
        Self {
            transient_failures,
            ..Self::default()
        }
    }

    pub fn delivered(&self) -> Vec<String> {
        self.delivered.lock().unwrap().clone()
    }

    pub fn attempts_for(&self, sku: &str) -> usize {
        self.attempts.lock().unwrap().get(sku).copied().unwrap_or(0)
    }
}

#[async_trait]
impl MessageQueue for RecordingQueue {
    async fn send(&self, record: &CanonicalRecord) -> std::result::Result<String, QueueError> {
        let sku = record.sku_label().to_string();
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            let n = attempts.entry(sku.clone()).or_insert(0);
            *n += 1;
            *n
        };

        if self.rejected.contains(&sku) {
            return Err(QueueError::SendFailed(format!("queue rejected {sku}")));
        }
        if attempt <= self.transient_failures {
            return Err(QueueError::SendFailed("throttled".to_string()));
        }

        self.delivered.lock().unwrap().push(sku.clone());
        Ok(format!("msg-{sku}-{attempt}"))
    }

    fn queue_name(&self) -> &str {
        "recording"
    }
}

/// Settings with no inter-chunk delay
pub fn settings(parallel_degree: usize, batch_size: usize) -> PipelineSettings {
    PipelineSettings {
        parallel_degree,
        batch_size,
        batch_delay: Duration::ZERO,
        lookback_hours: 1,
        window_limit: 1000,
    }
}

pub fn fast_retry(max_attempts: u32) -> RetryPolicy {
    RetryPolicy {
        max_attempts,
        base_delay: Duration::from_millis(1),
        max_delay: Duration::from_millis(2),
    }
}

/// Pipeline wired to in-memory collaborators
pub fn pipeline(
    records: Vec<RawRecord>,
    audit: Arc<MemoryAuditStore>,
    queue: Arc<RecordingQueue>,
    batch_size: usize,
) -> SkuPipeline {
    SkuPipeline::new(
        Arc::new(MemoryCatalog::new(records)),
        audit,
        queue,
        settings(8, batch_size),
        fast_retry(3),
    )
}

/// A record that passes validation
pub fn valid_record(sku: &str) -> RawRecord {
    let brand: String = CompanyName().fake();
    let title: String = Word().fake();
    RawRecord {
        sku: Some(sku.to_string()),
        barcode: Some(format!("{:013}", (1_000_000u64..9_999_999_999_999).fake::<u64>())),
        product_title: Some(title),
        hts: Some("6205200000".to_string()),
        country_of_origin: Some("VN".to_string()),
        size: Some(["XS", "S", "M", "L", "XL"][(0..5usize).fake::<usize>()].to_string()),
        color: Some(Word().fake()),
        brand: Some(brand),
        fabric_content: Some("Cotton".to_string()),
        fabric_composition: Some("100% Cotton".to_string()),
        gender: Some("Unisex".to_string()),
        inventory_sync_flag: Some("Y".to_string()),
        price: Some((10.0..200.0).fake::<f64>()),
        landed_cost: Some((1.0..50.0).fake::<f64>()),
        cost: Some((1.0..50.0).fake::<f64>()),
        latest_po_created_date: Some(Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap()),
        updated_at_snowflake: Some(Utc::now()),
        ..Default::default()
    }
}

/// A record missing its price and title
pub fn invalid_record(sku: &str) -> RawRecord {
    RawRecord {
        product_title: None,
        price: None,
        ..valid_record(sku)
    }
}

/// `count` records where every `invalid_every`-th one is invalid
pub fn mixed_records(count: usize, invalid_every: usize) -> Vec<RawRecord> {
    (1..=count)
        .map(|i| {
            let sku = format!("SKU-{i:04}");
            if invalid_every > 0 && i % invalid_every == 0 {
                invalid_record(&sku)
            } else {
                valid_record(&sku)
            }
        })
        .collect()
}
