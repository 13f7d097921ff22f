use std::io::IsTerminal;

use anyhow::{Context, Result};
use chrono::{DateTime, Duration, Utc};
use owo_colors::OwoColorize;
use serde::Serialize;
use terminal_size::{terminal_size, Width};

use crate::rating::{IndexBreakdown, RatingExplanation, RatingResult};
use crate::store::ClinicRecord;

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate name to fit available width, accounting for Unicode
fn truncate_name(name: &str, max_width: usize) -> String {
    let chars: Vec<char> = name.chars().collect();
    if chars.len() <= max_width {
        name.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

/// Format an index value, "-" when the clinic has not been rated
pub fn format_index(value: Option<u32>) -> String {
    value.map_or_else(|| "-".to_string(), |v| v.to_string())
}

fn ratings_of(record: &ClinicRecord) -> Option<&RatingResult> {
    record.ratings.as_ref().map(|r| &r.result)
}

/// Format ranked clinics as a table with columns:
/// Index, Composite, Reviews, Trust, Access, Price, Name, City
/// No headers (minimal format)
pub fn format_ranked_table(clinics: &[&ClinicRecord], use_colors: bool) -> String {
    if clinics.is_empty() {
        return "No clinics found.".to_string();
    }

    let term_width = get_terminal_width();

    // Index: 3 chars + 1 space, composite: 4 chars, four sub-indices: 4 chars each
    let index_width = 3;
    let score_width = 4;
    let separator = "  ";

    clinics
        .iter()
        .enumerate()
        .map(|(idx, record)| {
            let index_str = format!("{:>2}.", idx + 1);
            let ratings = ratings_of(record);
            let composite = format!(
                "{:>width$}",
                format_index(ratings.map(|r| r.composite_score)),
                width = score_width
            );
            let subs = [
                ratings.map(|r| r.reviews_index),
                ratings.map(|r| r.trust_index),
                ratings.map(|r| r.access_index),
                ratings.map(|r| r.price_index),
            ]
            .iter()
            .map(|v| format!("{:>width$}", format_index(*v), width = score_width))
            .collect::<Vec<_>>()
            .join("");

            let city = record.city.as_deref().unwrap_or("");
            let fixed_width = index_width
                + 1
                + score_width * 5
                + separator.len() * 2
                + city.chars().count();

            let name = if let Some(width) = term_width {
                if width > fixed_width + 10 {
                    truncate_name(&record.name, width - fixed_width)
                } else {
                    // Very narrow terminal, show truncated
                    truncate_name(&record.name, 20)
                }
            } else {
                // No terminal (pipe), don't truncate
                record.name.clone()
            };

            let line = if use_colors {
                format!(
                    "{} {}{}{}{}{}{}",
                    index_str.dimmed(),
                    composite.bold(),
                    subs.dimmed(),
                    separator,
                    name,
                    separator,
                    city.cyan()
                )
            } else {
                format!(
                    "{} {}{}{}{}{}{}",
                    index_str, composite, subs, separator, name, separator, city
                )
            };
            line.trim_end().to_string()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format clinics as tab-separated values for scripting
/// Columns: composite, reviews, trust, access, price, slug, name (no headers, no colors)
pub fn format_tsv(clinics: &[&ClinicRecord]) -> String {
    clinics
        .iter()
        .map(|record| {
            let ratings = ratings_of(record);
            format!(
                "{}\t{}\t{}\t{}\t{}\t{}\t{}",
                format_index(ratings.map(|r| r.composite_score)),
                format_index(ratings.map(|r| r.reviews_index)),
                format_index(ratings.map(|r| r.trust_index)),
                format_index(ratings.map(|r| r.access_index)),
                format_index(ratings.map(|r| r.price_index)),
                record.slug,
                record.name
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Clinic resource as served to API consumers
#[derive(Debug, Serialize)]
pub struct ClinicResource<'a> {
    pub rank: usize,
    pub slug: &'a str,
    pub name: &'a str,
    pub city: Option<&'a str>,
    pub ratings: Option<&'a RatingResult>,
    pub rated_at: Option<DateTime<Utc>>,
}

impl<'a> ClinicResource<'a> {
    pub fn new(rank: usize, record: &'a ClinicRecord) -> Self {
        Self {
            rank,
            slug: &record.slug,
            name: &record.name,
            city: record.city.as_deref(),
            ratings: ratings_of(record),
            rated_at: record.ratings.as_ref().map(|r| r.rated_at),
        }
    }
}

/// Format ranked clinics as a pretty JSON array of clinic resources
pub fn format_json(clinics: &[&ClinicRecord]) -> Result<String> {
    let resources: Vec<ClinicResource> = clinics
        .iter()
        .enumerate()
        .map(|(idx, record)| ClinicResource::new(idx + 1, record))
        .collect();
    serde_json::to_string_pretty(&resources).context("Failed to serialize clinics")
}

fn format_breakdown(label: &str, index: &IndexBreakdown, use_colors: bool) -> String {
    let mut lines = Vec::new();
    let clamp_note = if index.clamped { " (capped)" } else { "" };
    let header = format!("{:<8}{:>4}{}", label, index.value, clamp_note);
    lines.push(if use_colors {
        header.bold().to_string()
    } else {
        header
    });
    lines.push(format!("    base {}", index.base));
    for c in &index.contributions {
        lines.push(format!("    +{:<3} {}", c.points, c.label));
    }
    lines.join("\n")
}

/// Format a rating explanation: composite first, then each sub-index with
/// the points it was awarded
pub fn format_explanation(explanation: &RatingExplanation, use_colors: bool) -> String {
    let composite = format!(
        "Composite {} ({:.2} before rounding)",
        explanation.result.composite_score, explanation.composite_raw
    );
    let composite = if use_colors {
        composite.bold().green().to_string()
    } else {
        composite
    };

    [
        composite,
        format_breakdown("Trust", &explanation.trust, use_colors),
        format_breakdown("Reviews", &explanation.reviews, use_colors),
        format_breakdown("Price", &explanation.price, use_colors),
        format_breakdown("Access", &explanation.access, use_colors),
    ]
    .join("\n")
}

/// Format one clinic with identity, rating age, and full breakdown
pub fn format_clinic_detail(
    record: &ClinicRecord,
    explanation: &RatingExplanation,
    use_colors: bool,
) -> String {
    let rated = match &record.ratings {
        Some(r) => match format_age(Utc::now() - r.rated_at).as_str() {
            "now" => "just now".to_string(),
            age => format!("{} ago", age),
        },
        None => "never".to_string(),
    };
    let city = record.city.as_deref().unwrap_or("-");

    let header = if use_colors {
        format!(
            "{}\n  Slug: {}\n  City: {}\n  Rated: {}",
            record.name.bold(),
            record.slug.underline(),
            city.cyan(),
            rated
        )
    } else {
        format!(
            "{}\n  Slug: {}\n  City: {}\n  Rated: {}",
            record.name, record.slug, city, rated
        )
    };

    format!("{}\n\n{}", header, format_explanation(explanation, use_colors))
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rating::{explain_ratings, ClinicSignals, RatingConfig};
    use crate::store::ClinicStore;

    fn sample_store() -> ClinicStore {
        let mut store = ClinicStore::new();
        let config = RatingConfig::default();
        let mut dent_art = ClinicRecord::new(
            "dent-art",
            "Dent Art",
            ClinicSignals {
                external_rating: Some(4.5),
                external_rating_count: Some(250),
                published_pricing: true,
                ..Default::default()
            },
        );
        dent_art.city = Some("Chișinău".to_string());
        store.upsert(dent_art, &config, Utc::now()).unwrap();
        store
            .upsert(
                ClinicRecord::new("smile", "Smile", ClinicSignals::default()),
                &config,
                Utc::now(),
            )
            .unwrap();
        store
    }

    #[test]
    fn test_format_ranked_table_empty() {
        let result = format_ranked_table(&[], false);
        assert_eq!(result, "No clinics found.");
    }

    #[test]
    fn test_format_ranked_table_rows() {
        let store = sample_store();
        let ranked = store.ranked(&Default::default());
        let result = format_ranked_table(&ranked, false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        // 1-based index with trailing dot
        assert!(lines[0].starts_with(" 1."));
        assert!(lines[1].starts_with(" 2."));
        assert!(lines[0].contains("Dent Art"));
        assert!(lines[0].contains("Chișinău"));
        assert!(lines[0].contains("  84"));
        assert!(lines[1].contains("Smile"));
        assert!(lines[1].contains("  65"));
    }

    #[test]
    fn test_format_ranked_table_unrated() {
        let record = ClinicRecord::new("x", "Unrated", ClinicSignals::default());
        let result = format_ranked_table(&[&record], false);
        assert!(result.contains("   -"));
        assert!(result.contains("Unrated"));
    }

    #[test]
    fn test_format_tsv_empty() {
        assert_eq!(format_tsv(&[]), "");
    }

    #[test]
    fn test_format_tsv_rows() {
        let store = sample_store();
        let ranked = store.ranked(&Default::default());
        let result = format_tsv(&ranked);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].split('\t').count(), 7);
        assert_eq!(lines[1], "65\t70\t70\t70\t50\tsmile\tSmile");
    }

    #[test]
    fn test_format_json_resources() {
        let store = sample_store();
        let ranked = store.ranked(&Default::default());
        let json = format_json(&ranked).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let items = value.as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["rank"], 1);
        assert_eq!(items[0]["slug"], "dent-art");
        assert_eq!(items[0]["city"], "Chișinău");
        assert_eq!(items[0]["ratings"]["reviews_index"], 84);
        assert_eq!(items[0]["ratings"]["price_index"], 65);
        assert!(items[0]["rated_at"].is_string());
        assert_eq!(items[1]["city"], serde_json::Value::Null);
    }

    #[test]
    fn test_format_explanation_lists_contributions() {
        let signals = ClinicSignals {
            has_licenses: true,
            doctor_experience_years: 40,
            ..Default::default()
        };
        let explanation = explain_ratings(&signals, &RatingConfig::default());
        let result = format_explanation(&explanation, false);
        assert!(result.starts_with("Composite "));
        assert!(result.contains("Trust     95"));
        assert!(result.contains("+5   Licenses"));
        assert!(result.contains("+20  40 years experience"));
        assert!(!result.contains("(capped)"));
    }

    #[test]
    fn test_format_explanation_marks_capped() {
        let mut config = RatingConfig::default();
        config.trust.experience_cap = 40;
        let signals = ClinicSignals {
            doctor_experience_years: 40,
            ..Default::default()
        };
        let explanation = explain_ratings(&signals, &config);
        let result = format_explanation(&explanation, false);
        assert!(result.contains("Trust    100 (capped)"));
    }

    #[test]
    fn test_format_clinic_detail() {
        let store = sample_store();
        let record = store.get("dent-art").unwrap();
        let explanation = explain_ratings(&record.signals, &RatingConfig::default());
        let result = format_clinic_detail(record, &explanation, false);
        assert!(result.starts_with("Dent Art"));
        assert!(result.contains("Slug: dent-art"));
        assert!(result.contains("City: Chișinău"));
        assert!(result.contains("Rated: just now"));
        assert!(result.contains("Published pricing"));
    }

    #[test]
    fn test_format_index() {
        assert_eq!(format_index(Some(84)), "84");
        assert_eq!(format_index(None), "-");
    }

    #[test]
    fn test_format_age_hours() {
        assert_eq!(format_age(Duration::hours(3)), "3h");
    }

    #[test]
    fn test_format_age_days() {
        assert_eq!(format_age(Duration::days(2)), "2d");
    }

    #[test]
    fn test_format_age_weeks() {
        assert_eq!(format_age(Duration::weeks(2)), "2w");
    }

    #[test]
    fn test_format_age_now() {
        assert_eq!(format_age(Duration::seconds(30)), "now");
    }

    #[test]
    fn test_truncate_name_short() {
        assert_eq!(truncate_name("Dent Art", 20), "Dent Art");
    }

    #[test]
    fn test_truncate_name_long() {
        assert_eq!(truncate_name("Centrul Stomatologic Nr. 1", 15), "Centrul Stom...");
    }

    #[test]
    fn test_truncate_name_unicode() {
        // Counted by char, not by byte
        assert_eq!(truncate_name("Zâmbet Dental Clinic", 10), "Zâmbet ...");
    }

    #[test]
    fn test_truncate_name_very_narrow() {
        assert_eq!(truncate_name("Dent Art", 3), "Den");
    }
}
