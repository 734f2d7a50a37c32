// ==========================================
// 训练档案系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 唯一约束冲突在各阶段内部转为"跳过"计数，不会出现在这里；
//       能到达这里的都是致命错误，整个事务回滚
// ==========================================

use crate::domain::mapping::EntityKind;
use crate::repository::RepositoryError;
use std::fmt;
use thiserror::Error;

// ==========================================
// ImportPhase - 落库阶段
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportPhase {
    Equipment,
    Exercises,
    AthleteEquipment,
    Assignments,
    TrainingMaxes,
    BodyWeights,
    Workouts,
    ProgramTemplates,
    Programs,
}

impl ImportPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportPhase::Equipment => "equipment",
            ImportPhase::Exercises => "exercises",
            ImportPhase::AthleteEquipment => "athlete_equipment",
            ImportPhase::Assignments => "assignments",
            ImportPhase::TrainingMaxes => "training_maxes",
            ImportPhase::BodyWeights => "body_weights",
            ImportPhase::Workouts => "workouts",
            ImportPhase::ProgramTemplates => "program_templates",
            ImportPhase::Programs => "programs",
        }
    }
}

impl fmt::Display for ImportPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 调用方约定错误（事务开启前） =====
    #[error("映射无效 (kind={kind}, name={name}): 必须恰好满足 已解析ID / 新建标记 之一")]
    InvalidMapping { kind: EntityKind, name: String },

    #[error("运动员不存在: athlete_id={0}")]
    AthleteNotFound(i64),

    #[error("点评教练不存在: coach_id={0}")]
    CoachNotFound(i64),

    // ===== 落库阶段错误（整个事务回滚） =====
    #[error("导入阶段失败 (phase={phase}, record={record}): {source}")]
    Phase {
        phase: ImportPhase,
        record: String,
        #[source]
        source: RepositoryError,
    },

    #[error("映射目标缺失 (kind={kind}, name={name})")]
    MissingTarget { kind: EntityKind, name: String },

    // ===== 数据库错误 =====
    #[error(transparent)]
    Repository(#[from] RepositoryError),

    // ===== 通用错误 =====
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ImportError {
    /// 包装某阶段某条记录的仓储错误
    pub fn phase(phase: ImportPhase, record: impl Into<String>, source: RepositoryError) -> Self {
        ImportError::Phase {
            phase,
            record: record.into(),
            source,
        }
    }
}

/// Result 类型别名
pub type ImportOutcome<T> = Result<T, ImportError>;
