// ==========================================
// 训练档案系统 - 导入API
// ==========================================
// 职责: 封装一次导入的完整调用流程，供请求处理层调用
// 流程: load_document → build_mappings →（运营覆写）→ preview
//       → import_personal / import_catalog
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::config::{ConfigManager, ImportConfigReader};
use crate::domain::document::ParsedDocument;
use crate::domain::mapping::MappingSet;
use crate::domain::report::{CatalogImportResult, ImportPreview, ImportResult};
use crate::importer::{
    CatalogImporter, EntityReconciler, ImportValidator, PersonalImporter, PreviewBuilder,
};
use crate::repository::ImportStore;
use rusqlite::Connection;
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

/// 导入API
pub struct ImportApi {
    store: ImportStore,
    config: Arc<dyn ImportConfigReader>,
}

impl ImportApi {
    /// 创建新的ImportApi实例（导入与配置共用同一连接）
    pub fn new(db_path: &str) -> ApiResult<Self> {
        let store = ImportStore::new(db_path)?;
        Self::from_store(store)
    }

    /// 从已有连接创建
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> ApiResult<Self> {
        let store = ImportStore::from_connection(conn)?;
        Self::from_store(store)
    }

    fn from_store(store: ImportStore) -> ApiResult<Self> {
        let config = ConfigManager::from_connection(store.connection())
            .map_err(|e| ApiError::ConfigError(format!("创建配置管理器失败: {}", e)))?;

        Ok(Self {
            store,
            config: Arc::new(config),
        })
    }

    /// 使用自定义配置读取器（测试或外部配置源）
    pub fn with_config(mut self, config: Arc<dyn ImportConfigReader>) -> Self {
        self.config = config;
        self
    }

    /// 解析器输出（JSON）转为文档
    pub fn load_document(&self, raw: &str) -> ApiResult<ParsedDocument> {
        ParsedDocument::from_json_str(raw)
            .map_err(|e| ApiError::InvalidInput(format!("导入文档格式错误: {}", e)))
    }

    /// 读取目录快照并生成映射集
    ///
    /// # 返回
    /// - MappingSet: 运营人员可在确认前通过 override_mapping 修改
    pub fn build_mappings<'a>(&self, document: &'a ParsedDocument) -> ApiResult<MappingSet<'a>> {
        let snapshot = self.store.catalog_snapshot()?;
        let mappings = EntityReconciler::build_mapping_set(document, &snapshot);

        debug!(
            exercises = mappings.exercises.len(),
            equipment = mappings.equipment.len(),
            program_templates = mappings.program_templates.len(),
            "映射集已生成"
        );
        Ok(mappings)
    }

    /// 生成导入预览（只读）
    pub fn preview(&self, athlete_id: i64, mappings: &MappingSet<'_>) -> ApiResult<ImportPreview> {
        let grace_days = self
            .config
            .get_future_date_grace_days()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;
        let surface_unresolved = self
            .config
            .get_surface_unresolved_references()
            .map_err(|e| ApiError::ConfigError(e.to_string()))?;

        let validator = ImportValidator::for_today().with_grace_days(grace_days);
        let builder = PreviewBuilder::new(self.store.clone(), Box::new(validator))
            .with_unresolved_references(surface_unresolved);

        Ok(builder.build(athlete_id, mappings)?)
    }

    /// 个人导入
    ///
    /// # 参数
    /// - reviewer_id: 点评教练；None 时使用配置 import.default_reviewer_id
    pub fn import_personal(
        &self,
        athlete_id: i64,
        mappings: &MappingSet<'_>,
        reviewer_id: Option<i64>,
    ) -> ApiResult<ImportResult> {
        let reviewer_id = match reviewer_id {
            Some(id) => Some(id),
            None => self
                .config
                .get_default_reviewer_id()
                .map_err(|e| ApiError::ConfigError(e.to_string()))?,
        };

        let importer = PersonalImporter::new(self.store.clone());
        let result = importer.import(athlete_id, mappings, reviewer_id)?;

        info!(
            athlete_id,
            workouts_created = result.workouts_created,
            workouts_skipped = result.workouts_skipped,
            "个人导入成功"
        );
        Ok(result)
    }

    /// 目录导入
    ///
    /// # 参数
    /// - athlete_scope: Some(id) 时新模板归属该运动员并立即激活
    pub fn import_catalog(
        &self,
        mappings: &MappingSet<'_>,
        athlete_scope: Option<i64>,
    ) -> ApiResult<CatalogImportResult> {
        let importer = CatalogImporter::new(self.store.clone());
        let result = importer.import(mappings, athlete_scope)?;

        info!(
            created_programs = ?result.created_program_ids,
            "目录导入成功"
        );
        Ok(result)
    }
}
