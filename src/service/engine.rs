use crate::models::{normalize, ExcessEntry, MasterCatalog, ReconciliationReport, ScanTally};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// record 的返回信号: 调用方据此清空输入框或提示重扫
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanOutcome {
    /// 命中目录条目, 该编号计数 +1
    Matched { primary_id: String },
    /// 目录中不存在; 空输入不记录, 其余记入多余桶
    Unmatched,
}

impl ScanOutcome {
    pub fn is_matched(&self) -> bool {
        matches!(self, ScanOutcome::Matched { .. })
    }
}

#[derive(Debug, Error)]
pub enum ReconError {
    /// 目录已有条目时禁止重新装载, 须先开新会话
    #[error("master list already loaded ({existing} items), start a new session before reloading")]
    CatalogAlreadyLoaded { existing: usize },
}

/// 会话状态: 目录与计数必须整体替换, 不允许旧计数挂在新目录上
#[derive(Debug, Default)]
struct SessionState {
    catalog: MasterCatalog,
    tally: ScanTally,
}

/// 对账引擎
///
/// 每会话装载一次期望清单, 逐条记录扫描, 按需推导四分类报告。
/// 多个输入面并发调用时 (摄像头 + 手工录入), record 在同一把锁上
/// 串行化, 保证计数单调递增。
pub struct ReconciliationEngine {
    state: Mutex<SessionState>,
}

impl ReconciliationEngine {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(SessionState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().expect("session state lock poisoned")
    }

    /// 装载期望清单, 返回去重后的条目数 (供确认提示)
    ///
    /// 目录非空时拒绝重载; 构建出 0 个条目视同未装载, 可以重试。
    /// 装载同时清空计数。
    pub fn load_catalog(&self, rows: &[Vec<String>]) -> Result<usize, ReconError> {
        let mut state = self.lock();
        if !state.catalog.is_empty() {
            return Err(ReconError::CatalogAlreadyLoaded {
                existing: state.catalog.len(),
            });
        }

        let catalog = MasterCatalog::build(rows);
        let count = catalog.len();
        state.catalog = catalog;
        state.tally = ScanTally::new();

        tracing::info!("Master list loaded: {} unique items", count);
        Ok(count)
    }

    /// 记录一次扫描或手工录入
    ///
    /// 1. 去空白; 空输入不落账, 直接返回 Unmatched。
    /// 2. 规范化后在目录里解析。
    /// 3. 命中: 所属器械编号计数 +1。
    /// 4. 未命中: 按去空白后的原文计入多余桶, 报告里可见, 不丢失。
    ///
    /// 目录本身永不被 record 改动。
    pub fn record(&self, raw: &str) -> ScanOutcome {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return ScanOutcome::Unmatched;
        }
        let normalized = normalize(trimmed);

        let mut state = self.lock();
        match state.catalog.resolve(&normalized).map(str::to_owned) {
            Some(primary_id) => {
                let count = state.tally.bump(&primary_id);
                tracing::debug!("scan '{}' -> {} (count {})", trimmed, primary_id, count);
                ScanOutcome::Matched { primary_id }
            }
            None => {
                state.tally.bump(trimmed);
                tracing::debug!("scan '{}' not in master list, recorded as excess", trimmed);
                ScanOutcome::Unmatched
            }
        }
    }

    /// 当前会话的对账报告 (全新值对象, 调用方只读)
    pub fn report(&self) -> ReconciliationReport {
        let state = self.lock();
        derive_report(&state.catalog, &state.tally)
    }

    /// 开新会话: 目录与计数一并原子替换
    pub fn new_session(&self) {
        let mut state = self.lock();
        *state = SessionState::default();
        tracing::info!("New session started, master list and tally cleared");
    }
}

impl Default for ReconciliationEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// 从目录与计数推导报告, 每次从头算
/// (目录规模几百到几千, 不值得做增量维护)
fn derive_report(catalog: &MasterCatalog, tally: &ScanTally) -> ReconciliationReport {
    let mut matched = Vec::new();
    let mut short: IndexMap<String, u64> = IndexMap::new();
    let mut missing = Vec::new();

    // 按目录顺序三分: 0 次缺失 / 1 次匹配 / 多次重复
    for item in catalog.items() {
        match tally.count(&item.primary_id) {
            0 => missing.push(item.primary_id.clone()),
            1 => matched.push(item.primary_id.clone()),
            n => {
                short.insert(item.primary_id.clone(), n);
            }
        }
    }

    // 计数里不属于任何目录编号的键, 按首次扫描顺序进多余桶
    let primary_ids: HashSet<&str> = catalog
        .items()
        .iter()
        .map(|i| i.primary_id.as_str())
        .collect();
    let excess: Vec<ExcessEntry> = tally
        .entries()
        .filter(|(key, _)| !primary_ids.contains(key))
        .map(|(key, count)| ExcessEntry {
            identifier: key.to_string(),
            count,
        })
        .collect();

    ReconciliationReport {
        total_expected: catalog.len(),
        total_scanned: tally.total(),
        matched,
        short,
        missing,
        excess,
    }
}
