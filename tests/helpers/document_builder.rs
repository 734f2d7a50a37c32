// ==========================================
// 测试数据构建器 - 用于集成测试
// ==========================================

use chrono::NaiveDate;
use coach_import::domain::{
    ParsedAssignment, ParsedBodyWeight, ParsedDocument, ParsedEquipment, ParsedExercise,
    ParsedPrescribedSet, ParsedProgram, ParsedProgramTemplate, ParsedProgressionRule,
    ParsedReview, ParsedSet, ParsedTrainingMax, ParsedWorkout,
};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").expect("invalid test date")
}

// ==========================================
// ParsedDocument 构建器
// ==========================================

#[derive(Default)]
pub struct DocumentBuilder {
    document: ParsedDocument,
}

impl DocumentBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn equipment(mut self, name: &str) -> Self {
        self.document.equipment.push(ParsedEquipment {
            name: name.to_string(),
            description: Some(format!("{} description", name)),
        });
        self
    }

    pub fn exercise(mut self, name: &str) -> Self {
        self.document.exercises.push(ParsedExercise {
            name: name.to_string(),
            ..Default::default()
        });
        self
    }

    /// 带器械要求的动作
    pub fn exercise_with_equipment(mut self, name: &str, required: &[&str], optional: &[&str]) -> Self {
        self.document.exercises.push(ParsedExercise {
            name: name.to_string(),
            required_equipment: required.iter().map(|s| s.to_string()).collect(),
            optional_equipment: optional.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        });
        self
    }

    pub fn athlete_equipment(mut self, name: &str) -> Self {
        self.document.athlete_equipment.push(name.to_string());
        self
    }

    pub fn assignment(mut self, exercise: &str, target_reps: Option<i32>) -> Self {
        self.document.assignments.push(ParsedAssignment {
            exercise_name: exercise.to_string(),
            target_reps,
            active: true,
        });
        self
    }

    pub fn training_max(mut self, exercise: &str, weight: f64, effective: &str) -> Self {
        self.document.training_maxes.push(ParsedTrainingMax {
            exercise_name: exercise.to_string(),
            weight,
            effective_date: date(effective),
            notes: None,
        });
        self
    }

    pub fn body_weight(mut self, day: &str, weight: f64) -> Self {
        self.document.body_weights.push(ParsedBodyWeight {
            date: date(day),
            weight,
            notes: None,
        });
        self
    }

    /// 训练课：每个动作一组 5 次 100kg
    pub fn workout(self, day: &str, exercises: &[&str]) -> Self {
        self.workout_with_review(day, exercises, None)
    }

    pub fn workout_with_review(mut self, day: &str, exercises: &[&str], review: Option<&str>) -> Self {
        let sets = exercises
            .iter()
            .enumerate()
            .map(|(idx, name)| ParsedSet {
                exercise_name: name.to_string(),
                set_number: idx as i32 + 1,
                reps: Some(5),
                rep_type: "reps".to_string(),
                weight: Some(100.0),
                rpe: Some(8.0),
                notes: None,
            })
            .collect();

        self.document.workouts.push(ParsedWorkout {
            date: date(day),
            notes: None,
            sets,
            review: review.map(|comment| ParsedReview {
                rating: Some(4),
                comment: Some(comment.to_string()),
            }),
        });
        self
    }

    /// 独立模板（目录导入用）
    pub fn template(mut self, name: &str, exercises: &[&str]) -> Self {
        self.document.program_templates.push(template(name, exercises));
        self
    }

    /// 运动员训练计划（内嵌模板）
    pub fn program(mut self, name: &str, exercises: &[&str], start: &str, active: bool) -> Self {
        self.document.programs.push(ParsedProgram {
            template: template(name, exercises),
            start_date: date(start),
            notes: None,
            goal: Some("strength".to_string()),
            active,
        });
        self
    }

    pub fn build(self) -> ParsedDocument {
        self.document
    }
}

/// 每个动作一条处方组 + 一条线性进阶规则
fn template(name: &str, exercises: &[&str]) -> ParsedProgramTemplate {
    ParsedProgramTemplate {
        name: name.to_string(),
        description: None,
        num_weeks: 4,
        num_days: 3,
        is_loop: false,
        audience: None,
        prescribed_sets: exercises
            .iter()
            .map(|e| ParsedPrescribedSet {
                exercise_name: e.to_string(),
                week: 1,
                day: 1,
                set_number: 1,
                reps: Some(5),
                rep_type: "reps".to_string(),
                percentage: Some(0.75),
                rpe: None,
            })
            .collect(),
        progression_rules: exercises
            .iter()
            .map(|e| ParsedProgressionRule {
                exercise_name: e.to_string(),
                strategy: "linear".to_string(),
                increment: 2.5,
                cadence_weeks: Some(1),
            })
            .collect(),
    }
}
