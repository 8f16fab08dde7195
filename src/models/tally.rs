use indexmap::IndexMap;

/// 扫描计数 (多重集)
///
/// 已解析的扫描按所属器械编号计数; 未解析的按操作员实际扫到的
/// 原文 (去空白, 不大写) 计数, 供多余桶按首次扫描顺序输出。
/// 只增不减, 仅随新会话整体重置。
#[derive(Debug, Clone, Default)]
pub struct ScanTally {
    counts: IndexMap<String, u64>, // 保序: 多余条目按插入顺序报告
}

impl ScanTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// 计数 +1, 返回累计值
    pub fn bump(&mut self, key: &str) -> u64 {
        let count = self.counts.entry(key.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// 某标识符的当前计数 (未出现过为 0)
    pub fn count(&self, key: &str) -> u64 {
        self.counts.get(key).copied().unwrap_or(0)
    }

    /// 全部计数项, 按插入顺序
    pub fn entries(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(k, &v)| (k.as_str(), v))
    }

    /// 全部扫描次数之和 (已解析 + 多余)
    pub fn total(&self) -> u64 {
        self.counts.values().sum()
    }
}
