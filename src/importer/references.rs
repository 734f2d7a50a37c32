// ==========================================
// 训练档案系统 - 名称引用检查
// ==========================================
// 职责: 找出文档中无法由映射集解析的名称引用（预览用，只读）
// 说明: 与落库时的跳过口径一致：映射集中存在的名称即可解析
// ==========================================

use crate::domain::document::name_key;
use crate::domain::mapping::{EntityKind, MappingSet};
use crate::domain::report::UnresolvedReference;
use std::collections::HashSet;

pub fn find_unresolved_references(mappings: &MappingSet<'_>) -> Vec<UnresolvedReference> {
    let document = mappings.document;
    let mut unresolved: Vec<UnresolvedReference> = Vec::new();

    let mut check = |kind: EntityKind, name: &str, context: String| {
        if mappings.find(kind, name).is_some() {
            return;
        }
        let reference = UnresolvedReference {
            kind,
            name: name.to_string(),
            context,
        };
        if !unresolved.contains(&reference) {
            unresolved.push(reference);
        }
    };

    // 器械关联只在新建动作时写入
    for exercise in created(mappings, EntityKind::Exercise)
        .into_iter()
        .filter_map(|name| document.find_exercise(name))
    {
        for name in exercise
            .required_equipment
            .iter()
            .chain(exercise.optional_equipment.iter())
        {
            check(EntityKind::Equipment, name, format!("exercise {}", exercise.name));
        }
    }

    for name in &document.athlete_equipment {
        check(EntityKind::Equipment, name, "athlete inventory".to_string());
    }

    for assignment in &document.assignments {
        check(EntityKind::Exercise, &assignment.exercise_name, "assignment".to_string());
    }

    for training_max in &document.training_maxes {
        check(EntityKind::Exercise, &training_max.exercise_name, "training_max".to_string());
    }

    for workout in &document.workouts {
        for set in &workout.sets {
            check(EntityKind::Exercise, &set.exercise_name, format!("workout {}", workout.date));
        }
    }

    // 处方组与进阶规则只在新建模板时写入
    for template in created(mappings, EntityKind::ProgramTemplate)
        .into_iter()
        .filter_map(|name| document.find_template(name))
    {
        let context = format!("program {}", template.name);
        for set in &template.prescribed_sets {
            check(EntityKind::Exercise, &set.exercise_name, context.clone());
        }
        for rule in &template.progression_rules {
            check(EntityKind::Exercise, &rule.exercise_name, context.clone());
        }
    }

    for program in &document.programs {
        check(EntityKind::ProgramTemplate, &program.template.name, "program".to_string());
    }

    unresolved
}

/// 落库时会新建的名称（同名只取首条映射）
fn created<'a>(mappings: &'a MappingSet<'_>, kind: EntityKind) -> Vec<&'a str> {
    let mut seen = HashSet::new();
    mappings
        .mappings(kind)
        .iter()
        .filter(|m| seen.insert(name_key(&m.name)))
        .filter(|m| m.create)
        .map(|m| m.name.as_str())
        .collect()
}
