//! Template context: display-ready values derived from a CV and its profile.
//!
//! Everything a template prints is computed here (date ranges, contact links, entry
//! metadata). Templates only lay it out; Tera escapes every value on output.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::generated_cv::{
    CvCertification, CvEducation, CvLanguage, CvProject, CvSection, CvWorkExperience,
};
use crate::models::profile::Profile;
use crate::render::{RenderContext, Template};

#[derive(Debug, Serialize)]
pub struct PageView<'a> {
    pub template_class: String,
    pub full_name: &'a str,
    pub headline: Option<&'a str>,
    pub photo_url: Option<&'a str>,
    pub contacts: Vec<ContactView>,
    /// Section key (see `CvSection::key`) → display title.
    pub titles: BTreeMap<&'static str, &'a str>,
    pub summary: &'a str,
    pub experience: Vec<EntryView>,
    pub education: Vec<EntryView>,
    pub projects: Vec<EntryView>,
    pub certifications: Vec<EntryView>,
    pub skill_names: Vec<&'a str>,
    pub languages: Vec<LanguageView<'a>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContactView {
    /// CSS class, e.g. `email`, `linkedin`.
    pub kind: &'static str,
    pub label: String,
    /// Present for items rendered as links; the export re-creates these as link regions.
    pub href: Option<String>,
}

/// One dated entry; shared by experience, education, projects and certifications.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntryView {
    pub heading: String,
    pub url: Option<String>,
    pub dates: String,
    pub meta: Vec<String>,
    pub description: Option<String>,
    pub tech: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageView<'a> {
    pub name: &'a str,
    pub proficiency: Option<&'a str>,
}

impl<'a> PageView<'a> {
    pub fn new(template: Template, ctx: &RenderContext<'a>) -> Self {
        let content = ctx.content;
        let profile = ctx.profile;
        Self {
            template_class: template.as_str().to_ascii_lowercase(),
            full_name: &profile.full_name,
            headline: non_empty(profile.headline.as_deref()),
            photo_url: ctx.photo_url,
            contacts: contact_items(profile),
            titles: CvSection::ALL
                .into_iter()
                .map(|section| (section.key(), content.title(section)))
                .collect(),
            summary: &content.professional_summary,
            experience: content.work_experience.iter().map(experience_entry).collect(),
            education: content.education.iter().map(education_entry).collect(),
            projects: content.projects.iter().map(project_entry).collect(),
            certifications: content.certifications.iter().map(certification_entry).collect(),
            skill_names: content.skills.iter().map(|s| s.name.as_str()).collect(),
            languages: content.languages.iter().map(language_item).collect(),
        }
    }
}

pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn owned(value: Option<&str>) -> Option<String> {
    non_empty(value).map(str::to_string)
}

fn month(date: NaiveDate) -> String {
    date.format("%b %Y").to_string()
}

/// "Mar 2020 – Present", "Sep 2010 – Jun 2014" or "Mar 2020" style ranges.
pub fn date_range(start: Option<NaiveDate>, end: Option<NaiveDate>, is_current: bool) -> String {
    let end_label = if is_current {
        Some("Present".to_string())
    } else {
        end.map(month)
    };
    match (start.map(month), end_label) {
        (Some(s), Some(e)) => format!("{s} – {e}"),
        (Some(s), None) => s,
        (None, Some(e)) => e,
        (None, None) => String::new(),
    }
}

fn display_url(url: &str) -> &str {
    let bare = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))
        .unwrap_or(url);
    bare.strip_prefix("www.").unwrap_or(bare).trim_end_matches('/')
}

pub fn contact_items(profile: &Profile) -> Vec<ContactView> {
    let mut items = Vec::new();
    if let Some(email) = non_empty(profile.email.as_deref()) {
        items.push(ContactView {
            kind: "email",
            label: email.to_string(),
            href: Some(format!("mailto:{email}")),
        });
    }
    for (kind, value) in [
        ("phone", profile.phone.as_deref()),
        ("location", profile.location.as_deref()),
    ] {
        if let Some(value) = non_empty(value) {
            items.push(ContactView {
                kind,
                label: value.to_string(),
                href: None,
            });
        }
    }
    for (kind, url) in [
        ("website", profile.website.as_deref()),
        ("linkedin", profile.linkedin_url.as_deref()),
        ("github", profile.github_url.as_deref()),
    ] {
        if let Some(url) = non_empty(url) {
            items.push(ContactView {
                kind,
                label: display_url(url).to_string(),
                href: Some(url.to_string()),
            });
        }
    }
    items
}

fn experience_entry(job: &CvWorkExperience) -> EntryView {
    let mut meta = vec![job.company.clone()];
    meta.extend(owned(job.location.as_deref()));
    EntryView {
        heading: job.job_title.clone(),
        url: None,
        dates: date_range(Some(job.start_date), job.end_date, job.is_current),
        meta,
        description: owned(job.description.as_deref()),
        tech: None,
    }
}

fn education_entry(edu: &CvEducation) -> EntryView {
    let heading = match non_empty(edu.field_of_study.as_deref()) {
        Some(field) => format!("{}, {}", edu.degree, field),
        None => edu.degree.clone(),
    };
    let mut meta = vec![edu.institution.clone()];
    meta.extend(owned(edu.grade.as_deref()));
    EntryView {
        heading,
        url: None,
        dates: date_range(edu.start_date, edu.end_date, false),
        meta,
        description: owned(edu.description.as_deref()),
        tech: None,
    }
}

fn project_entry(project: &CvProject) -> EntryView {
    EntryView {
        heading: project.name.clone(),
        url: owned(project.project_url.as_deref()),
        dates: date_range(project.start_date, project.end_date, false),
        meta: Vec::new(),
        description: owned(project.description.as_deref()),
        tech: (!project.technologies.is_empty()).then(|| project.technologies.join(" · ")),
    }
}

fn certification_entry(cert: &CvCertification) -> EntryView {
    let mut meta = vec![cert.issuing_organization.clone()];
    meta.extend(non_empty(cert.credential_id.as_deref()).map(|id| format!("ID {id}")));
    EntryView {
        heading: cert.name.clone(),
        url: owned(cert.credential_url.as_deref()),
        dates: date_range(cert.issue_date, cert.expiration_date, false),
        meta,
        description: None,
        tech: None,
    }
}

fn language_item(language: &CvLanguage) -> LanguageView<'_> {
    LanguageView {
        name: &language.name,
        proficiency: non_empty(language.proficiency.as_deref()),
    }
}
