use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// 多余扫描条目: 目录中不存在的标识符
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExcessEntry {
    pub identifier: String,
    pub count: u64,
}

/// 对账报告: 每次按需从目录与计数重新推导, 不持久化
///
/// 不变式: matched、short 的键、missing 三者恰好划分整个目录,
/// 每个器械编号只出现在其中一个桶里。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub total_expected: usize,
    pub total_scanned: u64,
    /// 恰好扫描一次的器械编号, 按目录顺序
    pub matched: Vec<String>,
    /// 扫描两次及以上 (源术语 "short", 实为重复扫描), 编号 -> 次数
    pub short: IndexMap<String, u64>,
    /// 从未扫描的器械编号, 按目录顺序
    pub missing: Vec<String>,
    /// 目录外标识符, 按首次扫描顺序
    pub excess: Vec<ExcessEntry>,
}
