use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};

/// 期望清单条目: 一件序列化器械
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedItem {
    pub primary_id: String,           // 器械编号 (必填)
    pub secondary_id: Option<String>, // 厂商序列号 (可选)
}

/// 规范化标识符: 去空白 + 大写 (仅用于匹配, 展示仍用原文)
pub fn normalize(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// 期望清单目录: 装载一次, 会话内不可变
///
/// 每个规范化标识符 (器械编号或序列号) 恰好解析到一个条目;
/// 跨条目冲突时先注册者优先, 与插入顺序一致。
#[derive(Debug, Clone, Default)]
pub struct MasterCatalog {
    items: Vec<ExpectedItem>,        // 保留插入顺序, 报告按此顺序输出
    lookup: IndexMap<String, usize>, // 规范化标识符 -> items 下标
    // 规范化器械编号 -> items 下标。合并判定只能查这张表:
    // lookup 里的编号可能被更早条目的序列号占用
    primary_index: IndexMap<String, usize>,
}

impl MasterCatalog {
    /// 从外部解析器产出的行序列构建目录
    ///
    /// 行规则: 0 个可用字段丢弃; 1 个字段 => 无序列号; 2 个及以上 =>
    /// (器械编号, 序列号), 多余字段忽略。字段一律去空白;
    /// 器械编号去空白后为空的行丢弃。
    pub fn build(rows: &[Vec<String>]) -> Self {
        let mut catalog = Self::default();
        // 行级去重: 按规范化的 "器械编号,序列号" 组合串
        let mut seen_rows: IndexSet<String> = IndexSet::new();

        for row in rows {
            let mut fields = row.iter().map(|f| f.trim());
            let Some(primary) = fields.next() else {
                continue;
            };
            if primary.is_empty() {
                continue;
            }
            let secondary = fields.next().filter(|s| !s.is_empty());

            let dedup_key = format!(
                "{},{}",
                normalize(primary),
                secondary.map(normalize).unwrap_or_default()
            );
            if !seen_rows.insert(dedup_key) {
                continue;
            }

            catalog.insert(primary, secondary);
        }

        catalog
    }

    /// 登记一行。器械编号重复的行合并到首次注册的条目:
    /// 原条目尚无序列号时补上新行的序列号, 否则忽略。
    fn insert(&mut self, primary: &str, secondary: Option<&str>) {
        let pkey = normalize(primary);

        if let Some(&idx) = self.primary_index.get(&pkey) {
            if let Some(sec) = secondary {
                let skey = normalize(sec);
                if self.items[idx].secondary_id.is_none() && !self.lookup.contains_key(&skey) {
                    self.items[idx].secondary_id = Some(sec.to_string());
                    self.lookup.insert(skey, idx);
                }
            }
            return;
        }

        let idx = self.items.len();
        self.items.push(ExpectedItem {
            primary_id: primary.to_string(),
            secondary_id: secondary.map(|s| s.to_string()),
        });
        self.primary_index.insert(pkey.clone(), idx);
        // 标识符被更早条目占用时先注册者优先,
        // 新条目照常登记, 只是无法经由该标识符解析到
        self.lookup.entry(pkey).or_insert(idx);
        if let Some(sec) = secondary {
            self.lookup.entry(normalize(sec)).or_insert(idx);
        }
    }

    /// 解析规范化标识符, 返回所属条目的器械编号 (存储原文)
    pub fn resolve(&self, normalized: &str) -> Option<&str> {
        self.lookup
            .get(normalized)
            .map(|&idx| self.items[idx].primary_id.as_str())
    }

    /// 目录条目, 按插入顺序
    pub fn items(&self) -> &[ExpectedItem] {
        &self.items
    }

    /// 去重后的条目数
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(raw: &[&[&str]]) -> Vec<Vec<String>> {
        raw.iter()
            .map(|row| row.iter().map(|f| f.to_string()).collect())
            .collect()
    }

    #[test]
    fn build_drops_blank_and_whitespace_rows() {
        let catalog = MasterCatalog::build(&rows(&[
            &[],
            &["   "],
            &["", "SN-1"],
            &["INST-1"],
        ]));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.items()[0].primary_id, "INST-1");
        assert_eq!(catalog.items()[0].secondary_id, None);
    }

    #[test]
    fn build_dedupes_identical_rows() {
        let catalog = MasterCatalog::build(&rows(&[
            &["INST-1", "SN-9"],
            &[" inst-1 ", "sn-9"],
            &["INST-2"],
            &["INST-2"],
        ]));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn extra_fields_are_ignored() {
        let catalog = MasterCatalog::build(&rows(&[&["INST-1", "SN-9", "junk", "more"]]));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.items()[0].secondary_id.as_deref(), Some("SN-9"));
    }

    #[test]
    fn fields_are_trimmed_and_empty_secondary_is_absent() {
        let catalog = MasterCatalog::build(&rows(&[&["  INST-1  ", "   "]]));
        assert_eq!(catalog.items()[0].primary_id, "INST-1");
        assert_eq!(catalog.items()[0].secondary_id, None);
    }

    #[test]
    fn resolve_matches_either_identifier_case_insensitive() {
        let catalog = MasterCatalog::build(&rows(&[&["INST-1", "SN-99"]]));
        assert_eq!(catalog.resolve(&normalize("  inst-1 ")), Some("INST-1"));
        assert_eq!(catalog.resolve(&normalize("sn-99")), Some("INST-1"));
        assert_eq!(catalog.resolve(&normalize("GHOST-404")), None);
    }

    #[test]
    fn duplicate_primary_rows_merge_into_first_entry() {
        let catalog = MasterCatalog::build(&rows(&[
            &["INST-1"],
            &["INST-1", "SN-1"],
            &["INST-1", "SN-2"],
        ]));
        // 合并后仍是一个条目, 首个非空序列号生效
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.items()[0].secondary_id.as_deref(), Some("SN-1"));
        assert_eq!(catalog.resolve("SN-1"), Some("INST-1"));
        assert_eq!(catalog.resolve("SN-2"), None);
    }

    #[test]
    fn identifier_collisions_keep_first_registered_owner() {
        // INST-2 的序列号与 INST-1 的编号同名: 先注册者优先
        let catalog = MasterCatalog::build(&rows(&[
            &["INST-1"],
            &["INST-2", "INST-1"],
        ]));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.resolve("INST-1"), Some("INST-1"));
        assert_eq!(catalog.resolve("INST-2"), Some("INST-2"));
    }

    #[test]
    fn repeated_primary_claimed_as_anothers_secondary_still_merges() {
        // "X" 先被 A 的序列号占用, 随后两行都以 X 为器械编号:
        // 两行必须合并成一个条目, 编号唯一性不受标识符归属影响
        let catalog = MasterCatalog::build(&rows(&[
            &["A", "X"],
            &["X", "P"],
            &["X", "Q"],
        ]));
        assert_eq!(catalog.len(), 2);
        let primaries: Vec<&str> = catalog.items().iter().map(|i| i.primary_id.as_str()).collect();
        assert_eq!(primaries, vec!["A", "X"]);
        // 标识符 "X" 仍归先注册的 A; 第二个条目经由序列号 P 解析
        assert_eq!(catalog.resolve("X"), Some("A"));
        assert_eq!(catalog.resolve("P"), Some("X"));
        assert_eq!(catalog.resolve("Q"), None);
    }

    #[test]
    fn insertion_order_is_preserved() {
        let catalog = MasterCatalog::build(&rows(&[&["C"], &["A"], &["B"]]));
        let order: Vec<&str> = catalog.items().iter().map(|i| i.primary_id.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
    }
}
