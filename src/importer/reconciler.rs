// ==========================================
// 训练档案系统 - 实体对账器
// ==========================================
// 职责: 将导入名称与已有目录比对，逐条决定复用或新建
// 规则: 名称精确匹配、忽略大小写；不做模糊匹配
// 红线: 不访问数据库，快照由调用方提供
// ==========================================

use crate::domain::document::{name_key, ParsedDocument};
use crate::domain::mapping::{CatalogSnapshot, EntityKind, EntityMapping, ExistingEntity, MappingSet};
use std::collections::HashMap;
use tracing::debug;

pub struct EntityReconciler;

impl EntityReconciler {
    /// 对一类实体逐条生成映射
    ///
    /// # 参数
    /// - kind: 实体类型
    /// - imported: 导入名称列表（顺序保留，一条名称对应一条映射）
    /// - existing: 已有实体快照
    ///
    /// # 返回
    /// - 命中: target_id = 已有 ID，create = false
    /// - 未命中: target_id = None，create = true
    pub fn reconcile<'n, I>(kind: EntityKind, imported: I, existing: &[ExistingEntity]) -> Vec<EntityMapping>
    where
        I: IntoIterator<Item = &'n str>,
    {
        let mut index: HashMap<String, i64> = HashMap::with_capacity(existing.len());
        for entity in existing {
            // 同键保留第一条
            index.entry(name_key(&entity.name)).or_insert(entity.id);
        }

        imported
            .into_iter()
            .map(|name| match index.get(&name_key(name)) {
                Some(&id) => EntityMapping::reuse(kind, name, id),
                None => EntityMapping::create(kind, name),
            })
            .collect()
    }

    /// 从文档与目录快照构建完整映射集
    pub fn build_mapping_set<'a>(document: &'a ParsedDocument, snapshot: &CatalogSnapshot) -> MappingSet<'a> {
        let mut mappings = MappingSet::new(document);

        mappings.equipment = Self::reconcile(
            EntityKind::Equipment,
            document.equipment.iter().map(|e| e.name.as_str()),
            &snapshot.equipment,
        );
        mappings.exercises = Self::reconcile(
            EntityKind::Exercise,
            document.exercises.iter().map(|e| e.name.as_str()),
            &snapshot.exercises,
        );
        mappings.program_templates = Self::reconcile(
            EntityKind::ProgramTemplate,
            document.all_templates().into_iter().map(|t| t.name.as_str()),
            &snapshot.program_templates,
        );

        debug!(
            equipment = mappings.equipment.len(),
            exercises = mappings.exercises.len(),
            program_templates = mappings.program_templates.len(),
            "映射集构建完成"
        );

        mappings
    }
}
