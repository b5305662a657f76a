//! Stable skill grouping shared by the category-based layouts.

use std::collections::HashMap;

use serde::Serialize;

use crate::models::generated_cv::CvSkill;

pub const DEFAULT_CATEGORY: &str = "Other";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SkillGroup<'a> {
    pub category: &'a str,
    pub skills: Vec<&'a CvSkill>,
}

/// Groups skills by category.
///
/// Categories appear in first-seen order and skills keep their original order inside
/// each group. A missing or blank category falls under "Other".
pub fn group_skills_by_category(skills: &[CvSkill]) -> Vec<SkillGroup<'_>> {
    let mut groups: Vec<SkillGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for skill in skills {
        let category = skill
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .unwrap_or(DEFAULT_CATEGORY);

        match index.get(category).copied() {
            Some(i) => groups[i].skills.push(skill),
            None => {
                index.insert(category, groups.len());
                groups.push(SkillGroup {
                    category,
                    skills: vec![skill],
                });
            }
        }
    }

    groups
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(name: &str, category: Option<&str>) -> CvSkill {
        CvSkill {
            name: name.to_string(),
            category: category.map(str::to_string),
            proficiency: None,
        }
    }

    fn names<'a>(group: &SkillGroup<'a>) -> Vec<&'a str> {
        group.skills.iter().map(|s| s.name.as_str()).collect()
    }

    #[test]
    fn test_grouping_is_stable() {
        let skills = vec![
            skill("Go", Some("Backend")),
            skill("React", Some("Frontend")),
            skill("Rust", Some("Backend")),
        ];
        let groups = group_skills_by_category(&skills);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].category, "Backend");
        assert_eq!(names(&groups[0]), vec!["Go", "Rust"]);
        assert_eq!(groups[1].category, "Frontend");
        assert_eq!(names(&groups[1]), vec!["React"]);
    }

    #[test]
    fn test_missing_category_goes_to_other() {
        let skills = vec![
            skill("Writing", None),
            skill("Go", Some("Backend")),
            skill("Mentoring", Some("   ")),
        ];
        let groups = group_skills_by_category(&skills);
        assert_eq!(groups[0].category, "Other");
        assert_eq!(names(&groups[0]), vec!["Writing", "Mentoring"]);
        assert_eq!(groups[1].category, "Backend");
    }

    #[test]
    fn test_empty_input() {
        assert!(group_skills_by_category(&[]).is_empty());
    }
}
