// ==========================================
// 训练档案系统 - 导入文档模型
// ==========================================
// 职责: 解析器输出的标准化内存结构（只读快照）
// 红线: 各列表之间只按名称互相引用，不携带数据库 ID
// ==========================================

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

// ==========================================
// ParsedDocument - 导入文件的完整快照
// ==========================================
// 生命周期: 仅在一次导入流程内
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedDocument {
    pub exercises: Vec<ParsedExercise>,
    pub equipment: Vec<ParsedEquipment>,
    pub program_templates: Vec<ParsedProgramTemplate>,
    pub programs: Vec<ParsedProgram>,
    pub assignments: Vec<ParsedAssignment>,
    pub training_maxes: Vec<ParsedTrainingMax>,
    pub body_weights: Vec<ParsedBodyWeight>,
    pub workouts: Vec<ParsedWorkout>,
    pub athlete_equipment: Vec<String>, // 运动员个人器械清单（按名称）
}

impl ParsedDocument {
    /// 从 JSON 文本还原文档（解析器以 JSON 交付时使用）
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// 文档内出现的全部训练计划模板
    ///
    /// 独立模板在前，programs 内嵌模板在后；按名称（忽略大小写）去重，保留首次出现
    pub fn all_templates(&self) -> Vec<&ParsedProgramTemplate> {
        let mut seen = HashSet::new();
        self.program_templates
            .iter()
            .chain(self.programs.iter().map(|p| &p.template))
            .filter(|t| seen.insert(name_key(&t.name)))
            .collect()
    }

    /// 按名称查找模板定义（忽略大小写）
    pub fn find_template(&self, name: &str) -> Option<&ParsedProgramTemplate> {
        let key = name_key(name);
        self.all_templates()
            .into_iter()
            .find(|t| name_key(&t.name) == key)
    }

    pub fn find_equipment(&self, name: &str) -> Option<&ParsedEquipment> {
        let key = name_key(name);
        self.equipment.iter().find(|e| name_key(&e.name) == key)
    }

    pub fn find_exercise(&self, name: &str) -> Option<&ParsedExercise> {
        let key = name_key(name);
        self.exercises.iter().find(|e| name_key(&e.name) == key)
    }

    /// 所有训练组的总数
    pub fn total_sets(&self) -> usize {
        self.workouts.iter().map(|w| w.sets.len()).sum()
    }

    /// 携带点评的训练课数量
    pub fn review_count(&self) -> usize {
        self.workouts.iter().filter(|w| w.review.is_some()).count()
    }
}

/// 名称比较键（精确匹配，仅忽略 ASCII 大小写）
///
/// 与 name 列的 COLLATE NOCASE 口径一致
pub fn name_key(name: &str) -> String {
    name.to_ascii_lowercase()
}

// ==========================================
// 目录类实体
// ==========================================

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedExercise {
    pub name: String,
    pub tier: Option<String>,
    pub form_notes: Option<String>,
    pub demo_url: Option<String>,
    pub rest_seconds: Option<i32>, // 组间休息覆盖值
    pub featured: bool,
    pub required_equipment: Vec<String>,
    pub optional_equipment: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedEquipment {
    pub name: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedProgramTemplate {
    pub name: String,
    pub description: Option<String>,
    pub num_weeks: i32,
    pub num_days: i32,
    pub is_loop: bool,
    pub audience: Option<String>,
    pub prescribed_sets: Vec<ParsedPrescribedSet>,
    pub progression_rules: Vec<ParsedProgressionRule>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedPrescribedSet {
    pub exercise_name: String,
    pub week: i32,
    pub day: i32,
    pub set_number: i32,
    pub reps: Option<i32>,
    pub rep_type: String,
    pub percentage: Option<f64>, // 训练最大重量百分比
    pub rpe: Option<f64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedProgressionRule {
    pub exercise_name: String,
    pub strategy: String,
    pub increment: f64,
    pub cadence_weeks: Option<i32>,
}

// ==========================================
// 运动员类记录
// ==========================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedProgram {
    pub template: ParsedProgramTemplate,
    pub start_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
    #[serde(default)]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedAssignment {
    pub exercise_name: String,
    #[serde(default)]
    pub target_reps: Option<i32>,
    #[serde(default = "default_true")]
    pub active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedTrainingMax {
    pub exercise_name: String,
    pub weight: f64,
    pub effective_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedBodyWeight {
    pub date: NaiveDate,
    pub weight: f64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParsedWorkout {
    pub date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub sets: Vec<ParsedSet>,
    #[serde(default)]
    pub review: Option<ParsedReview>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedSet {
    pub exercise_name: String,
    pub set_number: i32,
    pub reps: Option<i32>,
    pub rep_type: String, // 空字符串 = 默认计次方式
    pub weight: Option<f64>, // 0 = 自重动作
    pub rpe: Option<f64>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ParsedReview {
    pub rating: Option<i32>,
    pub comment: Option<String>,
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn template(name: &str) -> ParsedProgramTemplate {
        ParsedProgramTemplate {
            name: name.to_string(),
            num_weeks: 4,
            num_days: 3,
            ..Default::default()
        }
    }

    #[test]
    fn test_all_templates_dedup_case_insensitive() {
        let doc = ParsedDocument {
            program_templates: vec![template("5/3/1")],
            programs: vec![
                ParsedProgram {
                    template: template("5/3/1"),
                    start_date: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
                    notes: None,
                    goal: None,
                    active: true,
                },
                ParsedProgram {
                    template: template("Starting Strength"),
                    start_date: NaiveDate::from_ymd_opt(2026, 2, 1).unwrap(),
                    notes: None,
                    goal: None,
                    active: false,
                },
            ],
            ..Default::default()
        };

        let names: Vec<&str> = doc.all_templates().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["5/3/1", "Starting Strength"]);
        assert!(doc.find_template("starting strength").is_some());
    }

    #[test]
    fn test_from_json_str_defaults() {
        let raw = r#"{
            "exercises": [{"name": "Squat"}],
            "workouts": [{"date": "2026-01-01", "sets": [{"exercise_name": "Squat", "reps": 5}]}]
        }"#;

        let doc = ParsedDocument::from_json_str(raw).unwrap();

        assert_eq!(doc.exercises.len(), 1);
        assert_eq!(doc.total_sets(), 1);
        assert_eq!(doc.workouts[0].sets[0].rep_type, "");
        assert!(doc.workouts[0].review.is_none());
        assert!(doc.athlete_equipment.is_empty());
    }

    #[test]
    fn test_name_key_folds_ascii_only() {
        assert_eq!(name_key("Back SQUAT"), name_key("back squat"));
        assert_ne!(name_key("Écarté"), name_key("écarté"));
        assert_eq!(name_key("Écarté"), "Écarté");
    }
}
