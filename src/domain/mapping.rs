// ==========================================
// 训练档案系统 - 实体映射模型
// ==========================================
// 职责: 每个导入实体的"复用已有 / 新建"决策
// 红线: 每条映射必须恰好满足 {已解析 ID, 新建标记} 之一
// 生命周期: 由对账器构建，经预览只读消费后交给落库器，不持久化
// ==========================================

use crate::domain::document::{name_key, ParsedDocument};
use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// EntityKind - 可对账的实体类型
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Exercise,
    Equipment,
    ProgramTemplate,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Exercise => "exercise",
            EntityKind::Equipment => "equipment",
            EntityKind::ProgramTemplate => "program_template",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 数据库中已存在的目录实体（对账输入）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingEntity {
    pub id: i64,
    pub name: String,
}

/// 目录快照：三类可对账实体的 (id, name) 列表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    pub exercises: Vec<ExistingEntity>,
    pub equipment: Vec<ExistingEntity>,
    pub program_templates: Vec<ExistingEntity>,
}

// ==========================================
// EntityMapping - 单条映射
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMapping {
    pub kind: EntityKind,
    pub name: String,
    pub target_id: Option<i64>, // 复用已有行时有效
    pub create: bool,           // 与 target_id 互斥
}

/// 运营人员覆写映射时的目标
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MappingTarget {
    Existing(i64),
    Create,
}

impl EntityMapping {
    pub fn reuse(kind: EntityKind, name: impl Into<String>, id: i64) -> Self {
        Self {
            kind,
            name: name.into(),
            target_id: Some(id),
            create: false,
        }
    }

    pub fn create(kind: EntityKind, name: impl Into<String>) -> Self {
        Self {
            kind,
            name: name.into(),
            target_id: None,
            create: true,
        }
    }

    /// 恰好满足 {已解析 ID, 新建标记} 之一
    pub fn is_valid(&self) -> bool {
        self.target_id.is_some() != self.create
    }

    pub fn set_target(&mut self, target: MappingTarget) {
        match target {
            MappingTarget::Existing(id) => {
                self.target_id = Some(id);
                self.create = false;
            }
            MappingTarget::Create => {
                self.target_id = None;
                self.create = true;
            }
        }
    }
}

// ==========================================
// MappingSet - 一次导入的完整映射集
// ==========================================
#[derive(Debug, Clone, Serialize)]
pub struct MappingSet<'a> {
    #[serde(skip)]
    pub document: &'a ParsedDocument,
    pub exercises: Vec<EntityMapping>,
    pub equipment: Vec<EntityMapping>,
    pub program_templates: Vec<EntityMapping>,
}

impl<'a> MappingSet<'a> {
    pub fn new(document: &'a ParsedDocument) -> Self {
        Self {
            document,
            exercises: Vec::new(),
            equipment: Vec::new(),
            program_templates: Vec::new(),
        }
    }

    pub fn mappings(&self, kind: EntityKind) -> &[EntityMapping] {
        match kind {
            EntityKind::Exercise => &self.exercises,
            EntityKind::Equipment => &self.equipment,
            EntityKind::ProgramTemplate => &self.program_templates,
        }
    }

    fn mappings_mut(&mut self, kind: EntityKind) -> &mut Vec<EntityMapping> {
        match kind {
            EntityKind::Exercise => &mut self.exercises,
            EntityKind::Equipment => &mut self.equipment,
            EntityKind::ProgramTemplate => &mut self.program_templates,
        }
    }

    /// 按名称查找映射（忽略大小写）
    pub fn find(&self, kind: EntityKind, name: &str) -> Option<&EntityMapping> {
        let key = name_key(name);
        self.mappings(kind).iter().find(|m| name_key(&m.name) == key)
    }

    /// 运营人员覆写某条映射的决策
    ///
    /// # 返回
    /// - true: 找到并已覆写（同名的所有条目）
    /// - false: 没有该名称的映射
    pub fn override_mapping(&mut self, kind: EntityKind, name: &str, target: MappingTarget) -> bool {
        let key = name_key(name);
        let mut found = false;
        for mapping in self
            .mappings_mut(kind)
            .iter_mut()
            .filter(|m| name_key(&m.name) == key)
        {
            mapping.set_target(target);
            found = true;
        }
        found
    }

    /// 全部映射（依 equipment → exercise → program_template 顺序）
    pub fn iter_all(&self) -> impl Iterator<Item = &EntityMapping> {
        self.equipment
            .iter()
            .chain(self.exercises.iter())
            .chain(self.program_templates.iter())
    }

    /// 第一条违反互斥约束的映射
    pub fn first_invalid(&self) -> Option<&EntityMapping> {
        self.iter_all().find(|m| !m.is_valid())
    }

    /// (新建数, 复用数)
    pub fn counts(&self, kind: EntityKind) -> (usize, usize) {
        let mappings = self.mappings(kind);
        let new = mappings.iter().filter(|m| m.create).count();
        (new, mappings.len() - new)
    }
}
