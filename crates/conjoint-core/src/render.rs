//! Display rendering
//!
//! Turns profile labels into an HTML comparison table and fills
//! `{{profile.N.Factor}}` display targets in page text.

use crate::profile::ProfileSet;
use html_escape::encode_text;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::fmt::Write;

static TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{\s*profile\.(\d+)\.([^{}]+?)\s*\}\}").expect("display target pattern is valid")
});

/// A placeholder naming a 1-based profile number and a factor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayTarget {
    /// 1-based profile number, `None` when it does not fit in `usize`
    pub profile: Option<usize>,
    /// Factor name
    pub factor: String,
}

/// Page text with targets filled in
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    /// Text after replacement
    pub text: String,
    /// Targets left untouched
    pub unresolved: Vec<DisplayTarget>,
}

/// Render profiles side by side: one column per profile, one row per factor
#[must_use]
pub fn render_table(profiles: &ProfileSet) -> String {
    let mut html = String::from("<table class=\"conjoint\">\n<thead><tr><th></th>");
    for n in 1..=profiles.len() {
        let _ = write!(html, "<th>Profile {n}</th>");
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    let factors = profiles.get(0).map(|p| p.factors()).unwrap_or_default();
    for factor in factors {
        let _ = write!(html, "<tr><th scope=\"row\">{}</th>", encode_text(factor));
        for profile in profiles {
            let label = profile.get(factor).map_or("", |s| s.label.as_str());
            let _ = write!(html, "<td>{}</td>", encode_text(label));
        }
        html.push_str("</tr>\n");
    }

    html.push_str("</tbody>\n</table>");
    html
}

/// Replace every `{{profile.N.Factor}}` in `template` with the label
///
/// Targets pointing past the end of `profiles` or at an unknown factor are
/// logged and left as written.
#[must_use]
pub fn replace_targets(template: &str, profiles: &ProfileSet) -> Rendered {
    let mut unresolved = Vec::new();

    let text = TARGET.replace_all(template, |caps: &Captures<'_>| {
        let whole = caps[0].to_string();
        let factor = caps[2].trim().to_string();
        let Ok(number) = caps[1].parse::<usize>() else {
            tracing::warn!(placeholder = %whole, "display target number does not fit");
            unresolved.push(DisplayTarget {
                profile: None,
                factor,
            });
            return whole;
        };

        let label = number
            .checked_sub(1)
            .and_then(|i| profiles.get(i))
            .and_then(|p| p.get(&factor));
        match label {
            Some(selection) => encode_text(&selection.label).into_owned(),
            None => {
                tracing::warn!(
                    placeholder = %whole,
                    profiles = profiles.len(),
                    "display target does not match any profile, leaving it unmodified"
                );
                unresolved.push(DisplayTarget {
                    profile: Some(number),
                    factor,
                });
                whole
            }
        }
    });

    Rendered {
        text: text.into_owned(),
        unresolved,
    }
}
