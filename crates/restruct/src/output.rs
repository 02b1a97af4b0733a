use std::path::{Path, PathBuf};

use colored::Colorize;
use restruct_core::{Section, TocEntry};
use serde::Serialize;

use crate::prelude::{println, *};

/// `<dir>/<stem>.json`, or `<dir>/<stem>_nested.json` for the hierarchy.
pub fn default_output_path(input: &Path, nested: bool) -> Result<PathBuf> {
    let stem = input
        .file_stem()
        .ok_or_else(|| Error::NoFileName(input.to_path_buf()))?;
    let mut name = stem.to_os_string();
    name.push(if nested { "_nested.json" } else { ".json" });
    Ok(input.with_file_name(name))
}

/// Refuse to write to `target` when it names the same file as `input`.
pub fn ensure_not_input(target: &Path, input: &Path) -> Result<()> {
    if same_file(target, input) {
        return Err(Error::OutputIsInput(target.to_path_buf()).into());
    }
    Ok(())
}

/// Compares resolved paths. A target that does not exist yet is resolved
/// through its parent directory.
fn same_file(a: &Path, b: &Path) -> bool {
    match (resolve(a), resolve(b)) {
        (Some(a), Some(b)) => a == b,
        _ => a == b,
    }
}

fn resolve(path: &Path) -> Option<PathBuf> {
    if let Ok(resolved) = path.canonicalize() {
        return Some(resolved);
    }
    let name = path.file_name()?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Some(parent.canonicalize().ok()?.join(name))
}

/// Pretty-printed UTF-8 JSON, non-ASCII left unescaped.
pub fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut json = serde_json::to_string_pretty(value)?;
    json.push('\n');
    std::fs::write(path, json).wrap_err_with(|| format!("failed to write {}", path.display()))
}

pub fn print_toc(toc: &[TocEntry]) {
    if toc.is_empty() {
        return;
    }
    println!("{}", format!("Found {} TOC entries:", toc.len()).green());
    for entry in toc {
        let page = entry
            .page
            .map_or_else(|| "?".to_string(), |p| p.to_string());
        println!(
            "  {} {} {}",
            format!("Level {}:", entry.level).dimmed(),
            entry.title,
            format!("(Page {page})").dimmed()
        );
    }
}

/// One line per section, indented by level.
pub fn print_summary(sections: &[Section]) {
    for section in sections {
        println!("{}", summary_line(section));
    }
}

fn summary_line(section: &Section) -> String {
    let indent = "  ".repeat(section.level.saturating_sub(1));
    format!(
        "{indent}{} {} {}",
        section.number.cyan().bold(),
        section.title,
        format!("(Page {})", section.page).dimmed()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section(number: &str, title: &str) -> Section {
        Section {
            number: number.to_string(),
            title: title.to_string(),
            level: number.split('.').count(),
            page: 4,
            content: String::new(),
        }
    }

    #[test]
    fn test_default_output_path() {
        let input = Path::new("/data/specs/report.v2.pdf");
        assert_eq!(
            default_output_path(input, false).unwrap(),
            PathBuf::from("/data/specs/report.v2.json")
        );
        assert_eq!(
            default_output_path(input, true).unwrap(),
            PathBuf::from("/data/specs/report.v2_nested.json")
        );
        assert_eq!(
            default_output_path(Path::new("plain"), false).unwrap(),
            PathBuf::from("plain.json")
        );
        assert!(default_output_path(Path::new("/"), false).is_err());
    }

    #[test]
    fn test_same_file_resolves_paths() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("manual.json");
        std::fs::write(&input, "[]").unwrap();

        let dotted = dir.path().join(".").join("manual.json");
        assert!(same_file(&dotted, &input));
        assert!(ensure_not_input(&dotted, &input).is_err());

        let fresh = dir.path().join("sub").join("..").join("out.json");
        assert!(!same_file(&fresh, &input));
        assert!(ensure_not_input(&dir.path().join("out.json"), &input).is_ok());
    }

    #[test]
    fn test_write_json_keeps_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&path, &[section("1", "Übersicht")]).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("\"title\": \"Übersicht\""));
        assert!(text.starts_with("[\n  {\n"));
        assert!(text.ends_with("]\n"));
    }

    #[test]
    fn test_summary_line_indents_by_level() {
        colored::control::set_override(false);
        assert_eq!(summary_line(&section("2", "Scope")), "2 Scope (Page 4)");
        assert_eq!(summary_line(&section("2.1.3", "Limits")), "    2.1.3 Limits (Page 4)");
    }
}
