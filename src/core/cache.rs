//! 單一來源的 TTL 快照快取。
//!
//! - 讀取走 `RwLock` 快速路徑，快照只會整份替換，讀者拿到的是 `Arc<T>`。
//! - 刷新以 async `Mutex` 串行化（single-flight）：等待中的呼叫者會共用
//!   進行中那次抓取的結果，不會各自再打一次上游。
//! - 刷新失敗時保留舊快照並回傳舊值；完全沒有快照才把錯誤往上丟。
//! - TTL 為 0 代表永遠即時抓取，不保留任何快照。

use crate::utils::error::{AggregatorError, Result};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio::time::Instant;

#[derive(Debug)]
pub struct Snapshot<T> {
    pub value: Arc<T>,
    pub fetched_at: Instant,
}

impl<T> Clone for Snapshot<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            fetched_at: self.fetched_at,
        }
    }
}

/// 最近一次刷新嘗試的結果，給排隊等鎖的呼叫者參考
#[derive(Debug, Default)]
struct RefreshState {
    last_error: Option<String>,
}

pub struct SnapshotCache<T> {
    name: String,
    ttl: Duration,
    current: RwLock<Option<Snapshot<T>>>,
    refresh: Mutex<RefreshState>,
    // 每完成一次刷新嘗試（成功或失敗）就加一，只在持有 `refresh` 時寫入
    generation: AtomicU64,
}

impl<T: Send + Sync> SnapshotCache<T> {
    pub fn new(name: impl Into<String>, ttl: Duration) -> Self {
        Self {
            name: name.into(),
            ttl,
            current: RwLock::new(None),
            refresh: Mutex::new(RefreshState::default()),
            generation: AtomicU64::new(0),
        }
    }

    /// 目前快照的值，不觸發刷新
    pub fn peek(&self) -> Option<Arc<T>> {
        self.snapshot().map(|s| s.value)
    }

    pub fn age(&self) -> Option<Duration> {
        self.snapshot().map(|s| s.fetched_at.elapsed())
    }

    fn snapshot(&self) -> Option<Snapshot<T>> {
        match self.current.read() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    fn store(&self, snapshot: Snapshot<T>) {
        match self.current.write() {
            Ok(mut guard) => *guard = Some(snapshot),
            Err(poisoned) => *poisoned.into_inner() = Some(snapshot),
        }
    }

    fn is_fresh(&self, snapshot: &Snapshot<T>) -> bool {
        snapshot.fetched_at.elapsed() <= self.ttl
    }

    pub async fn get_or_refresh<F, Fut>(&self, fetch: F) -> Result<Arc<T>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        if self.ttl.is_zero() {
            return fetch().await.map(Arc::new);
        }

        if let Some(snapshot) = self.snapshot() {
            if self.is_fresh(&snapshot) {
                return Ok(snapshot.value);
            }
        }

        let seen = self.generation.load(Ordering::Acquire);
        let mut state = self.refresh.lock().await;

        // 排隊期間已經有人完成一次刷新，直接共用那次的結果
        if self.generation.load(Ordering::Acquire) != seen {
            if let Some(snapshot) = self.snapshot() {
                if self.is_fresh(&snapshot) {
                    return Ok(snapshot.value);
                }
            }
            let message = state
                .last_error
                .clone()
                .unwrap_or_else(|| "refresh failed".to_string());
            return self.fall_back(AggregatorError::DataUnavailable { message });
        }

        // 另一條路徑可能剛好在我們拿鎖前寫入新快照
        if let Some(snapshot) = self.snapshot() {
            if self.is_fresh(&snapshot) {
                return Ok(snapshot.value);
            }
        }

        tracing::debug!("Refreshing {} snapshot", self.name);
        let outcome = fetch().await;
        self.generation.fetch_add(1, Ordering::Release);

        match outcome {
            Ok(value) => {
                let value = Arc::new(value);
                self.store(Snapshot {
                    value: Arc::clone(&value),
                    fetched_at: Instant::now(),
                });
                state.last_error = None;
                tracing::info!("[{}] snapshot updated successfully", self.name);
                Ok(value)
            }
            Err(e) => {
                state.last_error = Some(e.to_string());
                self.fall_back(e)
            }
        }
    }

    fn fall_back(&self, err: AggregatorError) -> Result<Arc<T>> {
        match self.snapshot() {
            Some(stale) => {
                tracing::warn!(
                    "[{}] refresh failed, serving snapshot aged {:?}: {}",
                    self.name,
                    stale.fetched_at.elapsed(),
                    err
                );
                Ok(stale.value)
            }
            None => {
                tracing::error!("[{}] refresh failed with no snapshot to fall back on: {}", self.name, err);
                Err(err)
            }
        }
    }
}
