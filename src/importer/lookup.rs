// ==========================================
// 训练档案系统 - 名称查找表
// ==========================================
// 职责: 前一阶段产出的 name → id，供后续阶段按名称解析引用
// 生命周期: 仅在一次事务内，随事务结束丢弃
// ==========================================

use crate::domain::document::name_key;
use std::collections::HashMap;

#[derive(Debug, Default, Clone)]
pub struct NameLookup {
    ids: HashMap<String, i64>,
}

impl NameLookup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, id: i64) {
        self.ids.insert(name_key(name), id);
    }

    pub fn get(&self, name: &str) -> Option<i64> {
        self.ids.get(&name_key(name)).copied()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.ids.contains_key(&name_key(name))
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_ignores_case() {
        let mut lookup = NameLookup::new();
        lookup.insert("Trap Bar", 3);

        assert_eq!(lookup.get("trap bar"), Some(3));
        assert!(lookup.contains("TRAP BAR"));
        assert_eq!(lookup.get("Trap-Bar"), None);
        assert_eq!(lookup.len(), 1);
    }
}
