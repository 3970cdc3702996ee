//! Multi-step builder form state.
//!
//! `ResumeData` is the full form value; mutation happens only through
//! `apply`, a pure reducer over an explicit `ResumeUpdate`. Handlers fold a
//! batch of updates over the stored draft, so there is no ambient mutable
//! form state anywhere and each field-level operation is unit-testable.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersonalInfo {
    pub full_name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: String,
    pub school: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(rename = "CGPA")]
    pub cgpa: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Experience {
    pub id: String,
    pub company: String,
    pub position: String,
    pub start_date: String,
    pub end_date: String,
    pub description: String,
    pub bullet_points: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub live_link: String,
    pub bullet_points: Vec<String>,
}

/// A position of responsibility (club lead, society officer, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub id: String,
    pub title: String,
    pub organization: String,
    pub start_date: String,
    pub end_date: String,
    pub bullet_points: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub id: String,
    pub category: String,
    pub name: String,
}

/// The complete builder form value, one section per guided step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeData {
    pub personal_info: PersonalInfo,
    pub education: Vec<Education>,
    pub experience: Vec<Experience>,
    pub projects: Vec<Project>,
    pub positions: Vec<Position>,
    pub skills: Vec<Skill>,
}

/// One field-level update to the form state. `Replace*` variants match an
/// existing entry by id; a miss leaves the state unchanged.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", content = "value", rename_all = "camelCase")]
pub enum ResumeUpdate {
    SetPersonalInfo(PersonalInfo),
    AddEducation(Education),
    ReplaceEducation(Education),
    RemoveEducation { id: String },
    AddExperience(Experience),
    ReplaceExperience(Experience),
    RemoveExperience { id: String },
    AddProject(Project),
    ReplaceProject(Project),
    RemoveProject { id: String },
    AddPosition(Position),
    ReplacePosition(Position),
    RemovePosition { id: String },
    AddSkill(Skill),
    ReplaceSkill(Skill),
    RemoveSkill { id: String },
}

/// Applies one update, returning the next state. Never mutates in place.
pub fn apply(data: &ResumeData, update: ResumeUpdate) -> ResumeData {
    let mut next = data.clone();
    match update {
        ResumeUpdate::SetPersonalInfo(info) => next.personal_info = info,
        ResumeUpdate::AddEducation(e) => next.education.push(e),
        ResumeUpdate::ReplaceEducation(e) => replace_by_id(&mut next.education, e, |x| &x.id),
        ResumeUpdate::RemoveEducation { id } => next.education.retain(|x| x.id != id),
        ResumeUpdate::AddExperience(e) => next.experience.push(e),
        ResumeUpdate::ReplaceExperience(e) => replace_by_id(&mut next.experience, e, |x| &x.id),
        ResumeUpdate::RemoveExperience { id } => next.experience.retain(|x| x.id != id),
        ResumeUpdate::AddProject(p) => next.projects.push(p),
        ResumeUpdate::ReplaceProject(p) => replace_by_id(&mut next.projects, p, |x| &x.id),
        ResumeUpdate::RemoveProject { id } => next.projects.retain(|x| x.id != id),
        ResumeUpdate::AddPosition(p) => next.positions.push(p),
        ResumeUpdate::ReplacePosition(p) => replace_by_id(&mut next.positions, p, |x| &x.id),
        ResumeUpdate::RemovePosition { id } => next.positions.retain(|x| x.id != id),
        ResumeUpdate::AddSkill(s) => next.skills.push(s),
        ResumeUpdate::ReplaceSkill(s) => replace_by_id(&mut next.skills, s, |x| &x.id),
        ResumeUpdate::RemoveSkill { id } => next.skills.retain(|x| x.id != id),
    }
    next
}

fn replace_by_id<T>(items: &mut [T], replacement: T, id: impl Fn(&T) -> &str) {
    let target = id(&replacement).to_string();
    if let Some(slot) = items.iter_mut().find(|x| id(x) == target) {
        *slot = replacement;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skill(id: &str, name: &str) -> Skill {
        Skill {
            id: id.to_string(),
            category: "Programming Languages".to_string(),
            name: name.to_string(),
        }
    }

    #[test]
    fn apply_does_not_mutate_the_input() {
        let before = ResumeData::default();
        let after = apply(&before, ResumeUpdate::AddSkill(skill("1", "Rust")));
        assert!(before.skills.is_empty());
        assert_eq!(after.skills.len(), 1);
    }

    #[test]
    fn set_personal_info_replaces_the_section() {
        let data = ResumeData::default();
        let info = PersonalInfo {
            full_name: "A".to_string(),
            email: "a@x.com".to_string(),
            ..Default::default()
        };
        let next = apply(&data, ResumeUpdate::SetPersonalInfo(info.clone()));
        assert_eq!(next.personal_info, info);
    }

    #[test]
    fn replace_matches_by_id() {
        let data = apply(
            &ResumeData::default(),
            ResumeUpdate::AddSkill(skill("1", "Rust")),
        );
        let next = apply(&data, ResumeUpdate::ReplaceSkill(skill("1", "Go")));
        assert_eq!(next.skills[0].name, "Go");

        // Replacing an unknown id is a no-op.
        let unchanged = apply(&next, ResumeUpdate::ReplaceSkill(skill("9", "C")));
        assert_eq!(unchanged, next);
    }

    #[test]
    fn remove_filters_by_id() {
        let data = apply(
            &apply(
                &ResumeData::default(),
                ResumeUpdate::AddSkill(skill("1", "Rust")),
            ),
            ResumeUpdate::AddSkill(skill("2", "Go")),
        );
        let next = apply(
            &data,
            ResumeUpdate::RemoveSkill {
                id: "1".to_string(),
            },
        );
        assert_eq!(next.skills.len(), 1);
        assert_eq!(next.skills[0].id, "2");
    }

    #[test]
    fn updates_serialize_with_op_tag() {
        let update = ResumeUpdate::RemoveSkill {
            id: "1".to_string(),
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json["op"], "removeSkill");
    }
}
