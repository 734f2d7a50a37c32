// ==========================================
// 训练档案系统 - 数据质量校验器
// ==========================================
// 职责: 标记取值越界、未知枚举、未来日期等问题
// 红线: 所有规则只产生警告，不阻断导入；逐条记录独立判定
// ==========================================

use crate::domain::document::{ParsedDocument, ParsedSet};
use crate::domain::report::ValidationWarning;
use crate::importer::importer_trait::DocumentValidator;
use chrono::{Days, Local, NaiveDate};
use tracing::warn;

/// 合法的计次方式（空字符串视为默认值，不告警）
pub const VALID_REP_TYPES: [&str; 3] = ["reps", "seconds", "each_side"];

/// RPE 合法闭区间
pub const RPE_MIN: f64 = 0.0;
pub const RPE_MAX: f64 = 10.0;

pub struct ImportValidator {
    today: NaiveDate,
}

impl ImportValidator {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// 以本地日期为"今天"
    pub fn for_today() -> Self {
        Self::new(Local::now().date_naive())
    }

    /// 在"今天"基础上放宽若干天
    pub fn with_grace_days(mut self, days: i64) -> Self {
        if days > 0 {
            self.today = self
                .today
                .checked_add_days(Days::new(days.unsigned_abs()))
                .unwrap_or_else(|| {
                    warn!(days, "宽限天数超出日期范围，按最大日期处理");
                    NaiveDate::MAX
                });
        }
        self
    }

    fn validate_set(&self, workout_index: usize, set_index: usize, set: &ParsedSet) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();
        let locator = format!("第 {} 组 ({})", set_index + 1, set.exercise_name);

        // 重量：0 为自重动作，合法
        if let Some(weight) = set.weight {
            if weight < 0.0 {
                warnings.push(warning(
                    "set",
                    "weight",
                    workout_index,
                    format!("{} 重量为负数: {}", locator, weight),
                ));
            }
        }

        if let Some(reps) = set.reps {
            if reps < 0 {
                warnings.push(warning(
                    "set",
                    "reps",
                    workout_index,
                    format!("{} 次数为负数: {}", locator, reps),
                ));
            }
        }

        if let Some(rpe) = set.rpe {
            if !(RPE_MIN..=RPE_MAX).contains(&rpe) {
                warnings.push(warning(
                    "set",
                    "rpe",
                    workout_index,
                    format!("{} RPE 超出范围 [{}, {}]: {}", locator, RPE_MIN, RPE_MAX, rpe),
                ));
            }
        }

        if !set.rep_type.is_empty() && !VALID_REP_TYPES.contains(&set.rep_type.as_str()) {
            warnings.push(warning(
                "set",
                "rep_type",
                workout_index,
                format!("{} 未知计次方式: {}", locator, set.rep_type),
            ));
        }

        warnings
    }
}

impl DocumentValidator for ImportValidator {
    fn validate(&self, document: &ParsedDocument) -> Vec<ValidationWarning> {
        let mut warnings = Vec::new();

        for (idx, workout) in document.workouts.iter().enumerate() {
            if workout.date > self.today {
                warnings.push(warning(
                    "workout",
                    "date",
                    idx,
                    format!("训练日期晚于今天 ({}): {}", self.today, workout.date),
                ));
            }

            for (set_idx, set) in workout.sets.iter().enumerate() {
                warnings.extend(self.validate_set(idx, set_idx, set));
            }
        }

        for (idx, training_max) in document.training_maxes.iter().enumerate() {
            if training_max.weight < 0.0 {
                warnings.push(warning(
                    "training_max",
                    "weight",
                    idx,
                    format!(
                        "训练最大重量为负数 ({}): {}",
                        training_max.exercise_name, training_max.weight
                    ),
                ));
            }
        }

        for (idx, body_weight) in document.body_weights.iter().enumerate() {
            if body_weight.weight <= 0.0 {
                warnings.push(warning(
                    "body_weight",
                    "weight",
                    idx,
                    format!("体重 <= 0 ({}): {}", body_weight.date, body_weight.weight),
                ));
            }
        }

        warnings
    }
}

fn warning(entity: &str, field: &str, record_index: usize, message: String) -> ValidationWarning {
    ValidationWarning {
        entity: entity.to_string(),
        field: field.to_string(),
        record_index,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::document::{ParsedBodyWeight, ParsedTrainingMax, ParsedWorkout};

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn validator() -> ImportValidator {
        ImportValidator::new(date("2026-06-01"))
    }

    fn workout(d: &str, sets: Vec<ParsedSet>) -> ParsedWorkout {
        ParsedWorkout {
            date: date(d),
            notes: None,
            sets,
            review: None,
        }
    }

    fn set(reps: Option<i32>, weight: Option<f64>, rpe: Option<f64>, rep_type: &str) -> ParsedSet {
        ParsedSet {
            exercise_name: "Squat".to_string(),
            set_number: 1,
            reps,
            rep_type: rep_type.to_string(),
            weight,
            rpe,
            notes: None,
        }
    }

    #[test]
    fn test_total_coverage_example() {
        let document = ParsedDocument {
            workouts: vec![workout(
                "2099-12-31",
                vec![set(Some(-1), Some(-10.0), Some(15.0), "bad")],
            )],
            training_maxes: vec![ParsedTrainingMax {
                exercise_name: "Squat".to_string(),
                weight: -50.0,
                effective_date: date("2026-01-01"),
                notes: None,
            }],
            body_weights: vec![ParsedBodyWeight {
                date: date("2026-01-01"),
                weight: -10.0,
                notes: None,
            }],
            ..Default::default()
        };

        let warnings = validator().validate(&document);

        let tags: Vec<(&str, &str)> = warnings
            .iter()
            .map(|w| (w.entity.as_str(), w.field.as_str()))
            .collect();
        assert_eq!(warnings.len(), 7);
        assert_eq!(
            tags,
            vec![
                ("workout", "date"),
                ("set", "weight"),
                ("set", "reps"),
                ("set", "rpe"),
                ("set", "rep_type"),
                ("training_max", "weight"),
                ("body_weight", "weight"),
            ]
        );
    }

    #[test]
    fn test_zero_weight_is_bodyweight_exercise() {
        let document = ParsedDocument {
            workouts: vec![workout("2026-01-01", vec![set(Some(10), Some(0.0), None, "reps")])],
            ..Default::default()
        };

        assert!(validator().validate(&document).is_empty());
    }

    #[test]
    fn test_missing_weight_and_rpe_do_not_warn() {
        let document = ParsedDocument {
            workouts: vec![workout("2026-01-01", vec![set(Some(5), None, None, "")])],
            ..Default::default()
        };

        assert!(validator().validate(&document).is_empty());
    }

    #[test]
    fn test_rpe_bounds_inclusive() {
        let document = ParsedDocument {
            workouts: vec![workout(
                "2026-01-01",
                vec![
                    set(None, None, Some(0.0), "seconds"),
                    set(None, None, Some(10.0), "each_side"),
                    set(None, None, Some(-0.5), ""),
                    set(None, None, Some(10.5), ""),
                ],
            )],
            ..Default::default()
        };

        let warnings = validator().validate(&document);

        assert_eq!(warnings.len(), 2);
        assert!(warnings.iter().all(|w| w.field == "rpe"));
    }

    #[test]
    fn test_today_is_not_future() {
        let document = ParsedDocument {
            workouts: vec![workout("2026-06-01", vec![]), workout("2026-06-02", vec![])],
            ..Default::default()
        };

        let warnings = validator().validate(&document);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].record_index, 1);

        let relaxed = validator().with_grace_days(1);
        assert!(relaxed.validate(&document).is_empty());
    }

    #[test]
    fn test_huge_grace_days_saturate() {
        let document = ParsedDocument {
            workouts: vec![workout("9999-12-31", vec![])],
            ..Default::default()
        };

        let relaxed = validator().with_grace_days(i64::MAX);
        assert!(relaxed.validate(&document).is_empty());

        let relaxed = validator().with_grace_days(100_000_000);
        assert!(relaxed.validate(&document).is_empty());
    }

    #[test]
    fn test_zero_body_weight_warns_but_zero_training_max_does_not() {
        let document = ParsedDocument {
            training_maxes: vec![ParsedTrainingMax {
                exercise_name: "Press".to_string(),
                weight: 0.0,
                effective_date: date("2026-01-01"),
                notes: None,
            }],
            body_weights: vec![ParsedBodyWeight {
                date: date("2026-01-01"),
                weight: 0.0,
                notes: None,
            }],
            ..Default::default()
        };

        let warnings = validator().validate(&document);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].entity, "body_weight");
    }
}
