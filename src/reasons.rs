// src/reasons.rs
//! Reason Synthesizer: one templated sentence per (role, candidate).
//!
//! Templates read pre-normalization values and text fields only, never
//! normalized features. Counts are quoted raw (`CandidateAggregate::display`);
//! a capped field quoted as a lower bound reads the capped value
//! (`CandidateAggregate::feature`). Free text is quoted in full.

use std::collections::BTreeMap;

use crate::aggregate::CandidateAggregate;
use crate::rank::FieldValue;
use crate::role::Role;
use crate::source::Source;

/// Sizes above this many megabytes are shown in gigabytes.
pub const GB_DISPLAY_THRESHOLD_MB: f64 = 1024.0;

/// Fields each template quotes, in template order.
pub fn evidence(source: Source, role: Role) -> &'static [&'static str] {
    match (source, role) {
        (Source::GitHub, Role::Developer) => &["commits_12m", "public_repos"],
        (Source::GitHub, Role::SeniorDeveloper) => &["total_stars"],
        (Source::GitHub, Role::SolutionArchitect) => &["total_forks", "has_cicd"],
        (Source::Kaggle, Role::Developer) => &["usability", "datasets"],
        (Source::Kaggle, Role::SeniorDeveloper) => &["medal_points", "upvotes"],
        (Source::Kaggle, Role::SolutionArchitect) => &["files", "size_mb"],
        (Source::StackOverflow, Role::Developer) => &["accepted_answer_ratio"],
        (Source::StackOverflow, Role::SeniorDeveloper) => &["reputation"],
        (Source::StackOverflow, Role::SolutionArchitect) => &["tag_breadth", "top_tags"],
    }
}

/// The quoted fields with their values, for structured output next to the sentence.
pub fn evidence_fields(
    source: Source,
    role: Role,
    c: &CandidateAggregate,
) -> BTreeMap<String, FieldValue> {
    evidence(source, role)
        .iter()
        .filter_map(|&name| {
            let quoted = if quotes_capped(source, role, name) {
                c.feature(name)
            } else {
                c.display(name)
            };
            let v = match quoted {
                Some(n) => FieldValue::Number(n),
                None => FieldValue::Text(c.text(name)?.to_string()),
            };
            Some((name.to_string(), v))
        })
        .collect()
}

/// StackOverflow reputation is quoted as "<cap>+", so it reads the capped value.
fn quotes_capped(source: Source, role: Role, name: &str) -> bool {
    matches!(
        (source, role, name),
        (Source::StackOverflow, Role::SeniorDeveloper, "reputation")
    )
}

fn number(c: &CandidateAggregate, name: &str) -> f64 {
    c.display(name).unwrap_or(0.0)
}

/// Integer rendering of a count; truncates toward zero.
fn whole(c: &CandidateAggregate, name: &str) -> i64 {
    number(c, name).trunc() as i64
}

/// `"2.0 GB"` above the threshold, `"512.0 MB"` otherwise.
pub fn format_size(mb: f64) -> String {
    if mb > GB_DISPLAY_THRESHOLD_MB {
        format!("{:.1} GB", mb / 1024.0)
    } else {
        format!("{mb:.1} MB")
    }
}

/// Build the justification sentence.
pub fn synthesize(source: Source, role: Role, c: &CandidateAggregate) -> String {
    match (source, role) {
        (Source::GitHub, Role::Developer) => format!(
            "Selected for high shipping frequency. Contributed {} commits across {} repositories.",
            whole(c, "commits_12m"),
            whole(c, "public_repos")
        ),
        (Source::GitHub, Role::SeniorDeveloper) => format!(
            "Selected for community authority. Work has earned {} stars, indicating industry trust.",
            whole(c, "total_stars")
        ),
        (Source::GitHub, Role::SolutionArchitect) => {
            let status = if number(c, "has_cicd") >= 1.0 {
                "Integrated"
            } else {
                "Not Found"
            };
            format!(
                "Selected for architectural reuse. Systems forked {} times with CI/CD status: {status}.",
                whole(c, "total_forks")
            )
        }
        (Source::Kaggle, Role::Developer) => format!(
            "Selected for high documentation standards. Avg Usability: {:.1}/10 across {} projects.",
            number(c, "usability"),
            whole(c, "datasets")
        ),
        (Source::Kaggle, Role::SeniorDeveloper) => format!(
            "Selected for peer vetting. Earned {} medal points and {} peer upvotes.",
            whole(c, "medal_points"),
            whole(c, "upvotes")
        ),
        (Source::Kaggle, Role::SolutionArchitect) => format!(
            "Selected for scale mastery. Managed {} files across {} of data.",
            whole(c, "files"),
            format_size(number(c, "size_mb"))
        ),
        (Source::StackOverflow, Role::Developer) => format!(
            "High execution reliability. {:.0}% acceptance rate for code solutions.",
            number(c, "accepted_answer_ratio") * 100.0
        ),
        (Source::StackOverflow, Role::SeniorDeveloper) => format!(
            "Established technical authority. {}+ reputation points via peer validation.",
            c.feature("reputation").unwrap_or(0.0).trunc() as i64
        ),
        (Source::StackOverflow, Role::SolutionArchitect) => format!(
            "Vast technical breadth. Specialized in {} domains. Key tags: {}",
            whole(c, "tag_breadth"),
            c.text("top_tags").unwrap_or_default()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_switches_unit_above_one_gigabyte() {
        assert_eq!(format_size(2048.0), "2.0 GB");
        assert_eq!(format_size(1024.0), "1024.0 MB");
        assert_eq!(format_size(0.5), "0.5 MB");
    }

    #[test]
    fn github_templates() {
        let c = CandidateAggregate::new("octo")
            .with_raw("commits_12m", 412.0)
            .with_raw("public_repos", 17.0)
            .with_raw("total_stars", 1500.0)
            .with_raw("total_forks", 88.0)
            .with_raw("has_cicd", 1.0)
            .with_derived("log_total_stars", 7.3);
        assert_eq!(
            synthesize(Source::GitHub, Role::Developer, &c),
            "Selected for high shipping frequency. Contributed 412 commits across 17 repositories."
        );
        assert_eq!(
            synthesize(Source::GitHub, Role::SeniorDeveloper, &c),
            "Selected for community authority. Work has earned 1500 stars, indicating industry trust."
        );
        assert!(synthesize(Source::GitHub, Role::SolutionArchitect, &c)
            .ends_with("forked 88 times with CI/CD status: Integrated."));
        let no_ci = c.clone().with_raw("has_cicd", 0.0);
        assert!(synthesize(Source::GitHub, Role::SolutionArchitect, &no_ci).ends_with("Not Found."));
    }

    #[test]
    fn kaggle_templates_format_units() {
        let c = CandidateAggregate::new("kg")
            .with_raw("usability", 8.8235)
            .with_raw("datasets", 4.0)
            .with_raw("medal_points", 9.0)
            .with_raw("upvotes", 321.0)
            .with_raw("files", 12.0)
            .with_raw("size_mb", 3072.0);
        assert_eq!(
            synthesize(Source::Kaggle, Role::Developer, &c),
            "Selected for high documentation standards. Avg Usability: 8.8/10 across 4 projects."
        );
        assert_eq!(
            synthesize(Source::Kaggle, Role::SeniorDeveloper, &c),
            "Selected for peer vetting. Earned 9 medal points and 321 peer upvotes."
        );
        assert_eq!(
            synthesize(Source::Kaggle, Role::SolutionArchitect, &c),
            "Selected for scale mastery. Managed 12 files across 3.0 GB of data."
        );
    }

    #[test]
    fn stackoverflow_templates_quote_capped_reputation_and_full_tags() {
        let tags = "python,pandas,numpy,azure,kubernetes,sql-server,database,asynchronous";
        let c = CandidateAggregate::new("so")
            .with_raw("accepted_answer_ratio", 0.634)
            .with_raw("reputation", 250_000.0)
            .with_derived("reputation", 90_000.0)
            .with_derived("tag_breadth", 8.0)
            .with_text("top_tags", tags);
        assert_eq!(
            synthesize(Source::StackOverflow, Role::Developer, &c),
            "High execution reliability. 63% acceptance rate for code solutions."
        );
        assert_eq!(
            synthesize(Source::StackOverflow, Role::SeniorDeveloper, &c),
            "Established technical authority. 90000+ reputation points via peer validation."
        );
        let f = evidence_fields(Source::StackOverflow, Role::SeniorDeveloper, &c);
        assert_eq!(f["reputation"], FieldValue::Number(90_000.0));
        let arch = synthesize(Source::StackOverflow, Role::SolutionArchitect, &c);
        assert!(arch.ends_with(tags), "{arch}");
        assert!(arch.contains("Specialized in 8 domains."));
    }

    #[test]
    fn evidence_fields_mix_numbers_and_text() {
        let c = CandidateAggregate::new("so")
            .with_derived("tag_breadth", 2.0)
            .with_text("top_tags", "aws,go");
        let f = evidence_fields(Source::StackOverflow, Role::SolutionArchitect, &c);
        assert_eq!(f["tag_breadth"], FieldValue::Number(2.0));
        assert_eq!(f["top_tags"], FieldValue::Text("aws,go".into()));
    }

    #[test]
    fn every_pair_has_a_template() {
        let c = CandidateAggregate::new("empty");
        for s in Source::ALL {
            for r in Role::ALL {
                assert!(!synthesize(s, r, &c).is_empty());
                assert!(!evidence(s, r).is_empty());
            }
        }
    }
}
