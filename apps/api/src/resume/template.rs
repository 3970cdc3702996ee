//! Styled resume templates.
//!
//! Template choice is a tagged variant dispatched through one `render`
//! capability: adding a template means adding a variant and its renderer,
//! not editing a name-matching branch. Output is a self-contained HTML
//! document with all user text escaped.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::resume::builder::ResumeData;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Template {
    Modern,
    Classic,
}

impl Template {
    pub fn parse(name: &str) -> Result<Self, AppError> {
        match name {
            "modern" => Ok(Template::Modern),
            "classic" => Ok(Template::Classic),
            other => Err(AppError::Validation(format!(
                "Unknown template '{other}', expected 'modern' or 'classic'"
            ))),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Template::Modern => "modern",
            Template::Classic => "classic",
        }
    }

    /// Renders the form state into a styled document.
    pub fn render(&self, data: &ResumeData) -> Document {
        match self {
            Template::Modern => render_modern(data),
            Template::Classic => render_classic(data),
        }
    }
}

/// A rendered resume document.
#[derive(Debug, Clone, Serialize)]
pub struct Document {
    pub html: String,
}

/// Two-column accent header, sans-serif, left-aligned section rules.
fn render_modern(data: &ResumeData) -> Document {
    let mut html = String::new();
    html.push_str("<div style=\"font-family: sans-serif; color: #1f2937;\">");
    html.push_str(&format!(
        "<header style=\"border-left: 4px solid #2563eb; padding-left: 12px;\">\
         <h1 style=\"margin: 0;\">{}</h1><p style=\"margin: 2px 0; color: #2563eb;\">{}</p>{}</header>",
        escape(&data.personal_info.full_name),
        escape(&data.personal_info.title),
        contact_line(data),
    ));
    if !data.personal_info.summary.is_empty() {
        html.push_str(&section_modern("Summary"));
        html.push_str(&format!("<p>{}</p>", escape(&data.personal_info.summary)));
    }
    render_body(&mut html, data, section_modern);
    html.push_str("</div>");
    Document { html }
}

/// Serif, centered name and uppercase centered section headings.
fn render_classic(data: &ResumeData) -> Document {
    let mut html = String::new();
    html.push_str("<div style=\"font-family: serif; color: #1f2937;\">");
    html.push_str(&format!(
        "<header style=\"text-align: center;\">\
         <h1 style=\"margin: 0;\">{}</h1><p style=\"margin: 2px 0;\">{}</p>{}</header>",
        escape(&data.personal_info.full_name),
        escape(&data.personal_info.title),
        contact_line(data),
    ));
    if !data.personal_info.summary.is_empty() {
        html.push_str(&section_classic("Summary"));
        html.push_str(&format!("<p>{}</p>", escape(&data.personal_info.summary)));
    }
    render_body(&mut html, data, section_classic);
    html.push_str("</div>");
    Document { html }
}

fn section_modern(title: &str) -> String {
    format!(
        "<h2 style=\"border-bottom: 1px solid #d1d5db; margin-top: 18px;\">{}</h2>",
        escape(title)
    )
}

fn section_classic(title: &str) -> String {
    format!(
        "<h2 style=\"text-align: center; text-transform: uppercase; margin-top: 18px;\">{}</h2>",
        escape(title)
    )
}

/// The template-independent body sections, with the heading style injected.
fn render_body(html: &mut String, data: &ResumeData, section: fn(&str) -> String) {
    if !data.experience.is_empty() {
        html.push_str(&section("Experience"));
        for exp in &data.experience {
            html.push_str(&format!(
                "<div><strong>{}</strong> — {} <em>({} – {})</em><p>{}</p>{}</div>",
                escape(&exp.position),
                escape(&exp.company),
                escape(&exp.start_date),
                escape(&exp.end_date),
                escape(&exp.description),
                bullet_list(&exp.bullet_points),
            ));
        }
    }
    if !data.projects.is_empty() {
        html.push_str(&section("Projects"));
        for project in &data.projects {
            let title = if project.live_link.is_empty() {
                format!("<strong>{}</strong>", escape(&project.title))
            } else {
                format!(
                    "<strong><a href=\"{}\">{}</a></strong>",
                    escape(&project.live_link),
                    escape(&project.title)
                )
            };
            html.push_str(&format!(
                "<div>{}{}</div>",
                title,
                bullet_list(&project.bullet_points)
            ));
        }
    }
    if !data.education.is_empty() {
        html.push_str(&section("Education"));
        for edu in &data.education {
            html.push_str(&format!(
                "<div><strong>{}</strong>, {} in {} <em>({} – {})</em>{}</div>",
                escape(&edu.school),
                escape(&edu.degree),
                escape(&edu.field_of_study),
                escape(&edu.start_date),
                escape(&edu.end_date),
                if edu.cgpa.is_empty() {
                    String::new()
                } else {
                    format!(" — CGPA: {}", escape(&edu.cgpa))
                },
            ));
        }
    }
    if !data.positions.is_empty() {
        html.push_str(&section("Positions of Responsibility"));
        for pos in &data.positions {
            html.push_str(&format!(
                "<div><strong>{}</strong>, {} <em>({} – {})</em>{}</div>",
                escape(&pos.title),
                escape(&pos.organization),
                escape(&pos.start_date),
                escape(&pos.end_date),
                bullet_list(&pos.bullet_points),
            ));
        }
    }
    if !data.skills.is_empty() {
        html.push_str(&section("Skills"));
        html.push_str("<ul>");
        for skill in &data.skills {
            html.push_str(&format!(
                "<li>{}: {}</li>",
                escape(&skill.category),
                escape(&skill.name)
            ));
        }
        html.push_str("</ul>");
    }
}

fn contact_line(data: &ResumeData) -> String {
    let parts: Vec<String> = [
        &data.personal_info.email,
        &data.personal_info.phone,
        &data.personal_info.location,
    ]
    .iter()
    .filter(|s| !s.is_empty())
    .map(|s| escape(s))
    .collect();
    if parts.is_empty() {
        String::new()
    } else {
        format!("<p style=\"margin: 2px 0;\">{}</p>", parts.join(" · "))
    }
}

fn bullet_list(bullets: &[String]) -> String {
    let items: Vec<String> = bullets
        .iter()
        .filter(|b| !b.is_empty())
        .map(|b| format!("<li>{}</li>", escape(b)))
        .collect();
    if items.is_empty() {
        String::new()
    } else {
        format!("<ul>{}</ul>", items.concat())
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resume::builder::{PersonalInfo, Skill};

    fn sample_data() -> ResumeData {
        ResumeData {
            personal_info: PersonalInfo {
                full_name: "Ada Lovelace".to_string(),
                email: "ada@x.com".to_string(),
                title: "Engineer".to_string(),
                summary: "Analytical engine programmer".to_string(),
                ..Default::default()
            },
            skills: vec![Skill {
                id: "1".to_string(),
                category: "Programming Languages".to_string(),
                name: "Rust".to_string(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn parse_accepts_known_names_only() {
        assert_eq!(Template::parse("modern").unwrap(), Template::Modern);
        assert_eq!(Template::parse("classic").unwrap(), Template::Classic);
        assert!(Template::parse("fancy").is_err());
    }

    #[test]
    fn variants_render_distinct_documents() {
        let data = sample_data();
        let modern = Template::Modern.render(&data);
        let classic = Template::Classic.render(&data);
        assert_ne!(modern.html, classic.html);
        assert!(modern.html.contains("sans-serif"));
        assert!(classic.html.contains("text-transform: uppercase"));
        for doc in [&modern, &classic] {
            assert!(doc.html.contains("Ada Lovelace"));
            assert!(doc.html.contains("Rust"));
        }
    }

    #[test]
    fn user_text_is_escaped() {
        let mut data = sample_data();
        data.personal_info.full_name = "<script>alert(1)</script>".to_string();
        let doc = Template::Modern.render(&data);
        assert!(!doc.html.contains("<script>"));
        assert!(doc.html.contains("&lt;script&gt;"));
    }

    #[test]
    fn empty_sections_are_omitted() {
        let doc = Template::Classic.render(&ResumeData::default());
        assert!(!doc.html.contains("Experience"));
        assert!(!doc.html.contains("Education"));
    }
}
