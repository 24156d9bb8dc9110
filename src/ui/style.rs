use console::style;
use std::fmt::Display;

/// Green bold: completion markers, saved files
pub fn success<D: Display>(text: D) -> String {
    style(text).green().bold().to_string()
}

/// Red bold: per-question failures
pub fn failure<D: Display>(text: D) -> String {
    style(text).red().bold().to_string()
}

/// White bold: banners, section labels
pub fn header<D: Display>(text: D) -> String {
    style(text).white().bold().to_string()
}

/// Dim: rules, hints, secondary text
pub fn dim<D: Display>(text: D) -> String {
    style(text).dim().to_string()
}

/// Yellow: tool names, example questions
pub fn yellow<D: Display>(text: D) -> String {
    style(text).yellow().to_string()
}

/// Green: paths
pub fn value<D: Display>(text: D) -> String {
    style(text).green().to_string()
}

/// Cyan bold: prompt ordinals, category names
pub fn accent<D: Display>(text: D) -> String {
    style(text).cyan().bold().to_string()
}
