use std::path::PathBuf;

use crate::prelude::{eprintln, println, *};
use clap::Parser;
use restruct_core::{build_hierarchy, Extractor};

mod config;
mod error;
mod input;
mod output;
mod prelude;

#[derive(Debug, clap::Parser)]
#[command(
    author,
    version,
    about,
    long_about = "Recover the numbered section outline (1, 1.1, 1.2, 2, ...) of a PDF and write it as JSON"
)]
pub struct App {
    /// PDF file, or a JSON span stream with --spans
    path: PathBuf,

    #[clap(flatten)]
    extract: config::ExtractArgs,

    /// Write the nested hierarchy instead of the flat section list
    #[arg(long, env = "RESTRUCT_NESTED")]
    nested: bool,

    /// Output file (default: <stem>.json or <stem>_nested.json next to the input)
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// TOML configuration file (default: ./restruct.toml when present)
    #[arg(long, env = "RESTRUCT_CONFIG", value_name = "PATH")]
    config: Option<PathBuf>,

    /// Read PATH as a JSON span stream instead of a PDF
    #[arg(long)]
    spans: bool,

    /// Also write the extracted span stream as JSON
    #[arg(long, value_name = "PATH")]
    dump_spans: Option<PathBuf>,

    /// Print document metadata and outline as JSON, then exit
    #[arg(long, conflicts_with_all = ["nested", "output", "dump_spans", "spans"])]
    info: bool,

    #[clap(flatten)]
    global: Global,
}

#[derive(Debug, Clone, clap::Args)]
pub struct Global {
    /// Do not print the outline summary.
    #[clap(short, long, env = "RESTRUCT_QUIET")]
    quiet: bool,

    /// Whether to display additional information.
    #[clap(long, env = "RESTRUCT_VERBOSE")]
    verbose: bool,
}

fn main() -> Result<()> {
    let app = App::parse();

    let default_filter = if app.global.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();
    color_eyre::install()?;

    run(app)
}

fn run(app: App) -> Result<()> {
    if app.info {
        let bytes = std::fs::read(&app.path).wrap_err_with(|| format!("failed to read {}", app.path.display()))?;
        let info = pdf::info(&bytes)?;
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    let cwd = std::env::current_dir()?;
    let file = config::load(app.config.as_deref(), &cwd)?;
    let nested = app.nested || file.nested;
    let extractor = Extractor::new(app.extract.apply(file.extract))?;

    let output_path = match app.output {
        Some(path) => path,
        None => output::default_output_path(&app.path, nested)?,
    };
    output::ensure_not_input(&output_path, &app.path)?;
    if let Some(path) = &app.dump_spans {
        output::ensure_not_input(path, &app.path)?;
    }

    let kind = input::InputKind::detect(&app.path, app.spans);
    let doc = input::load_document(&app.path, kind, extractor.options().page_range()?)?;
    if let Some(path) = &app.dump_spans {
        output::write_json(path, &doc)?;
        log::info!("span stream written to {}", path.display());
    }

    let sections = extractor.extract(&doc);
    if nested {
        output::write_json(&output_path, &build_hierarchy(sections.clone()))?;
    } else {
        output::write_json(&output_path, &sections)?;
    }

    if !app.global.quiet {
        output::print_toc(&doc.toc);
        output::print_summary(&sections);
        eprintln!("{} sections written to {}", sections.len(), output_path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use restruct_core::{Block, Document, Fragment, Line, Page, Rect, Section};

    #[test]
    fn verify_cli() {
        App::command().debug_assert();
    }

    fn line(text: &str, size: f32, y: f32) -> Line {
        Line::new(vec![Fragment::new(text, size, Rect::new(72.0, y, 400.0, y + size))])
    }

    /// Writes a two-page span stream and an empty config into a temp dir.
    fn fixture() -> (tempfile::TempDir, PathBuf, PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let doc = Document::new(vec![
            Page::new(1, 842.0).with_block(Block::from_lines(vec![
                line("1 Introduction", 14.0, 100.0),
                line("Intro body text.", 10.0, 120.0),
                line("1.1 Background", 12.0, 140.0),
                line("More body.", 10.0, 160.0),
            ])),
            Page::new(2, 842.0).with_block(Block::from_lines(vec![line("2 Next", 14.0, 100.0)])),
        ]);
        let input = dir.path().join("manual.json");
        std::fs::write(&input, serde_json::to_vec(&doc).unwrap()).unwrap();
        let config = dir.path().join("empty.toml");
        std::fs::write(&config, "").unwrap();
        (dir, input, config)
    }

    fn run_with(args: &[&str]) {
        let app = App::try_parse_from(args.iter().copied()).unwrap();
        run(app).unwrap();
    }

    #[test]
    fn test_flat_output() {
        let (dir, input, config) = fixture();
        let out = dir.path().join("out.json");
        run_with(&[
            "restruct",
            input.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "-o",
            out.to_str().unwrap(),
            "--quiet",
        ]);

        let sections: Vec<Section> = serde_json::from_slice(&std::fs::read(&out).unwrap()).unwrap();
        let summary: Vec<_> = sections
            .iter()
            .map(|s| (s.number.as_str(), s.title.as_str(), s.level, s.page, s.content.as_str()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("1", "Introduction", 1, 1, "Intro body text.\n"),
                ("1.1", "Background", 2, 1, "More body.\n"),
                ("2", "Next", 1, 2, ""),
            ]
        );
    }

    #[test]
    fn test_nested_default_path_and_flags() {
        let (dir, input, config) = fixture();
        run_with(&[
            "restruct",
            input.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--nested",
            "--start-header-number",
            "1.1",
            "--quiet",
        ]);

        let out = dir.path().join("manual_nested.json");
        let forest: serde_json::Value = serde_json::from_slice(&std::fs::read(out).unwrap()).unwrap();
        let roots = forest.as_array().unwrap();
        assert_eq!(roots.len(), 2);
        assert_eq!(roots[0]["number"], "1.1");
        assert_eq!(roots[1]["number"], "2");
        assert_eq!(roots[1]["children"], serde_json::json!([]));
    }

    #[test]
    fn test_refuses_to_overwrite_input() {
        let (_dir, input, config) = fixture();
        let app = App::try_parse_from([
            "restruct",
            input.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "-o",
            input.to_str().unwrap(),
        ])
        .unwrap();
        let err = run(app).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::OutputIsInput(_))));
    }

    #[test]
    fn test_refuses_to_dump_over_input() {
        let (dir, input, config) = fixture();
        let original = std::fs::read(&input).unwrap();
        let dotted = dir.path().join(".").join("manual.json");
        let app = App::try_parse_from([
            "restruct",
            input.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "-o",
            dir.path().join("sections.json").to_str().unwrap(),
            "--dump-spans",
            dotted.to_str().unwrap(),
        ])
        .unwrap();
        let err = run(app).unwrap_err();
        assert!(matches!(err.downcast_ref::<Error>(), Some(Error::OutputIsInput(_))));
        assert_eq!(std::fs::read(&input).unwrap(), original);
        assert!(!dir.path().join("sections.json").exists());
    }

    #[test]
    fn test_invalid_pattern_is_reported() {
        let (_dir, input, config) = fixture();
        let app = App::try_parse_from([
            "restruct",
            input.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--heading-regex",
            r"^(\d+)",
            "--quiet",
        ])
        .unwrap();
        let err = run(app).unwrap_err();
        assert!(err.downcast_ref::<restruct_core::ConfigError>().is_some());
    }

    #[test]
    fn test_dump_spans() {
        let (dir, input, config) = fixture();
        let dump = dir.path().join("spans.json");
        run_with(&[
            "restruct",
            input.to_str().unwrap(),
            "--config",
            config.to_str().unwrap(),
            "--dump-spans",
            dump.to_str().unwrap(),
            "-o",
            dir.path().join("sections.json").to_str().unwrap(),
            "--quiet",
        ]);
        let doc: Document = serde_json::from_slice(&std::fs::read(dump).unwrap()).unwrap();
        assert_eq!(doc.pages.len(), 2);
        assert!(dir.path().join("sections.json").exists());
    }
}
