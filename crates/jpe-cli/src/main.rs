//! JPE command-line driver.
//!
//! Builds, checks and translates JPE mod projects.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{ArgAction, Parser, Subcommand};
use miette::{IntoDiagnostic, WrapErr};
use notify_debouncer_mini::notify::{RecursiveMode, Watcher};
use notify_debouncer_mini::{new_debouncer, DebounceEventResult};
use tracing_subscriber::EnvFilter;

use jpe_compiler::build::{CONFIG_FILE_NAME, MANIFEST_FILE_NAME};
use jpe_compiler::diagnostic::DiagnosticsExt;
use jpe_compiler::{
    api, BuildOptions, BuildOrchestrator, BuildReport, BuildResult, Compiler, CompilerConfig,
    ValidationResult,
};

mod render;
mod ui;

/// Output directory used when neither a flag nor `jpe.json` names one.
const DEFAULT_OUT_DIR: &str = "build";

#[derive(Parser)]
#[command(name = "jpe", version)]
#[command(about = "Translate JPE mod descriptions to game tuning XML and back")]
struct Cli {
    /// Log more (-v debug, -vv trace). JPE_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build JPE files into tuning XML plus a build manifest
    Build {
        /// JPE source files
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Output directory (one subdirectory per file when several are given)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,

        /// Build options file (defaults to jpe.json next to the first input)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print build results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Validate a JPE file without generating anything
    Check {
        /// JPE source file
        #[arg(default_value = "mod.jpe")]
        file: PathBuf,

        /// Print the validation result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Translate a JPE file into tuning XML files
    Translate {
        /// JPE source file
        file: PathBuf,

        /// Directory to write the XML files to
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },

    /// Translate tuning XML back into JPE
    Decompile {
        /// XML files, or directories searched for *.xml
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Write JPE to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Scaffold a new JPE project
    Init {
        /// Project directory (created if it doesn't exist)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Rebuild a JPE file whenever it changes
    Watch {
        /// JPE source file
        #[arg(default_value = "mod.jpe")]
        file: PathBuf,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Treat warnings as errors
        #[arg(long)]
        strict: bool,
    },
}

#[tokio::main]
async fn main() -> miette::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ok = match cli.command {
        Commands::Build {
            files,
            output,
            strict,
            config,
            json,
        } => build_files(files, output, strict, config, json).await?,
        Commands::Check { file, json } => check_file(&file, json)?,
        Commands::Translate { file, output } => translate_file(&file, &output)?,
        Commands::Decompile { paths, output } => decompile(&paths, output.as_deref())?,
        Commands::Init { path } => {
            init_project(&path)?;
            true
        }
        Commands::Watch {
            file,
            output,
            strict,
        } => {
            run_watch_mode(&file, output, strict).await?;
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}

/// Logs go to stderr so `--json` output on stdout stays machine readable.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_env("JPE_LOG")
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,jpe={level},jpe_compiler={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads build options and applies command-line overrides.
fn resolve_options(
    config: Option<&Path>,
    base: &Path,
    output: Option<PathBuf>,
    strict: bool,
) -> miette::Result<BuildOptions> {
    let mut options = match config {
        Some(path) => BuildOptions::load(path)?,
        None => BuildOptions::discover(base)?,
    };
    if let Some(output) = output {
        options.out_dir = Some(output);
    }
    if strict {
        options.strict = true;
    }
    if options.out_dir.is_none() {
        options.out_dir = Some(base.join(DEFAULT_OUT_DIR));
    }
    Ok(options)
}

fn parent_dir(file: &Path) -> &Path {
    file.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."))
}

fn display_name(file: &Path) -> String {
    file.display().to_string()
}

/// Reads and builds one file. Returns the source alongside the report so
/// diagnostics can be rendered against it.
fn build_one(file: &Path, options: BuildOptions) -> miette::Result<(String, BuildReport)> {
    let source = jpe_compiler::read_source(file)?;
    let report = BuildOrchestrator::new(options).run(source.as_str());
    Ok((source, report))
}

/// Build several files concurrently.
async fn build_files(
    files: Vec<PathBuf>,
    output: Option<PathBuf>,
    strict: bool,
    config: Option<PathBuf>,
    json: bool,
) -> miette::Result<bool> {
    let start = Instant::now();
    let base = parent_dir(&files[0]).to_path_buf();
    let options = resolve_options(config.as_deref(), &base, output, strict)?;
    let many = files.len() > 1;

    let spinner = ui::spinner(&format!("Building {} file(s)...", files.len()), json);

    let mut tasks = Vec::with_capacity(files.len());
    for file in files {
        let mut options = options.clone();
        if many {
            let stem = file
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_else(|| "mod".to_string());
            options.out_dir = options.out_dir.map(|dir| dir.join(stem));
        }
        let task_file = file.clone();
        let handle = tokio::task::spawn_blocking(move || build_one(&task_file, options));
        tasks.push((file, handle));
    }

    let mut outcomes = Vec::with_capacity(tasks.len());
    for (file, handle) in tasks {
        let outcome = handle
            .await
            .into_diagnostic()
            .wrap_err_with(|| format!("build task for {} did not finish", file.display()))??;
        outcomes.push((file, outcome));
    }
    spinner.finish_and_clear();

    let ok = outcomes.iter().all(|(_, (_, report))| report.is_success());

    if json {
        let results: Vec<BuildResult> = outcomes
            .into_iter()
            .map(|(_, (_, report))| BuildResult::from(report))
            .collect();
        println!("{}", serde_json::to_string_pretty(&results).into_diagnostic()?);
        return Ok(ok);
    }

    for (file, (source, report)) in &outcomes {
        print_build(file, source, report);
    }
    ui::timing(if ok { "Done" } else { "Finished with errors" }, start.elapsed().as_millis());
    Ok(ok)
}

fn print_build(file: &Path, source: &str, report: &BuildReport) {
    let name = display_name(file);
    if !report.is_success() {
        ui::nope_header();
        ui::error(&format!(
            "{} failed with {} error(s)",
            name,
            report.diagnostics.error_count()
        ));
        println!();
        render::print_all(&report.diagnostics, &name, Some(source));
        return;
    }

    ui::box_header(&format!("{} {}", ui::symbols::ARROW, name));
    ui::box_line("");
    for artifact in &report.artifacts {
        ui::artifact_line(&artifact.id, &artifact.kind.to_string(), artifact.bytes.len());
    }
    if report.artifacts.is_empty() {
        ui::box_line("  nothing to generate");
    }
    ui::box_line("");
    ui::box_line(&format!("  build {}", report.build_id));
    ui::box_footer();

    let warnings: Vec<_> = report.warnings().cloned().collect();
    if !warnings.is_empty() {
        ui::warning(&format!("{} warning(s)", warnings.len()));
        render::print_all(&warnings, &name, Some(source));
    }
    println!();
}

fn check_file(file: &Path, json: bool) -> miette::Result<bool> {
    let spinner = ui::spinner("Checking...", json);
    let source = jpe_compiler::read_source(file)?;
    let diagnostics = api::diagnose(&source);
    spinner.finish_and_clear();

    let result = ValidationResult::from_diagnostics(&diagnostics);
    if json {
        println!("{}", serde_json::to_string_pretty(&result).into_diagnostic()?);
        return Ok(result.is_valid);
    }

    let name = display_name(file);
    if result.is_valid {
        ui::looking_good();
    } else {
        ui::nope_header();
    }
    render::print_all(&diagnostics, &name, Some(&source));
    println!(
        "    {} error(s) {} {} warning(s)",
        diagnostics.error_count(),
        ui::symbols::DOT,
        diagnostics.warning_count()
    );
    Ok(result.is_valid)
}

fn translate_file(file: &Path, output: &Path) -> miette::Result<bool> {
    let source = jpe_compiler::read_source(file)?;
    let result = api::translate_to_xml(&source);
    let name = display_name(file);

    if !result.success {
        ui::nope_header();
        render::print_all(&result.diagnostics, &name, Some(&source));
        return Ok(false);
    }

    std::fs::create_dir_all(output)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to create {}", output.display()))?;
    for artifact in &result.artifacts {
        let path = output.join(&artifact.id);
        std::fs::write(&path, &artifact.content)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
        ui::success(&format!("{} {}", ui::symbols::ARROW, path.display()));
    }
    if result.artifacts.is_empty() {
        ui::dim("Nothing to translate.");
    }
    render::print_all(&result.diagnostics, &name, Some(&source));
    Ok(true)
}

fn decompile(paths: &[PathBuf], output: Option<&Path>) -> miette::Result<bool> {
    let compiler = Compiler::new(CompilerConfig::default());
    let result = compiler.decompile(paths)?;

    for error in &result.errors {
        eprintln!("{}", error);
    }
    for warning in &result.warnings {
        eprintln!("{}", warning);
    }

    if let Some(content) = &result.content {
        match output {
            Some(path) => {
                std::fs::write(path, content)
                    .into_diagnostic()
                    .wrap_err_with(|| format!("Failed to write {}", path.display()))?;
                ui::success(&format!("{} {}", ui::symbols::ARROW, path.display()));
            }
            None => print!("{}", content),
        }
    }
    Ok(result.success)
}

const EXAMPLE_JPE: &str = "\
[Project]
name: My First Mod
id: my_first_mod
version: 0.1.0
author: you
end

[Buffs]
id: happy_buff
display_name: STR_HAPPY_BUFF
description: STR_HAPPY_BUFF_DESC
duration: 120
trait: cheerful
end

[Traits]
id: cheerful
display_name: STR_CHEERFUL
buff: happy_buff
end

[Interactions]
id: tell_joke
display_name: STR_TELL_JOKE
participant: role:initiator
participant: role:target
loot: type:buff, buff:happy_buff
end

[Strings]
key: STR_HAPPY_BUFF
text: Happy
end

[Strings]
key: STR_HAPPY_BUFF_DESC
text: Something made this sim smile.
end

[Strings]
key: STR_CHEERFUL
text: Cheerful
end

[Strings]
key: STR_TELL_JOKE
text: Tell a Joke
end
";

const EXAMPLE_CONFIG: &str = "{
  \"outDir\": \"build\",
  \"strict\": false,
  \"writeManifest\": true
}
";

/// Initialize a new JPE project.
fn init_project(path: &Path) -> miette::Result<()> {
    let source_path = path.join("mod.jpe");
    if source_path.exists() {
        return Err(miette::miette!(
            help = "Pick an empty directory or remove the existing file",
            "{} already exists",
            source_path.display()
        ));
    }

    std::fs::create_dir_all(path)
        .into_diagnostic()
        .wrap_err("Failed to create project directory")?;
    std::fs::write(&source_path, EXAMPLE_JPE)
        .into_diagnostic()
        .wrap_err("Failed to write mod.jpe")?;

    let config_path = path.join(CONFIG_FILE_NAME);
    if !config_path.exists() {
        std::fs::write(&config_path, EXAMPLE_CONFIG)
            .into_diagnostic()
            .wrap_err_with(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;
    }

    ui::success("Done. Here's what you got:");
    println!();
    ui::tree_dir("", &path.display().to_string());
    ui::tree_item("  ", "mod.jpe", Some("Your mod"), false);
    ui::tree_item("  ", CONFIG_FILE_NAME, Some("Build options"), true);

    ui::divider();

    println!("  Now do this:");
    println!();
    println!("    cd {}", path.display());
    println!("    jpe build mod.jpe");
    println!();
    ui::info(&format!(
        "Artifacts and {} land in {}/",
        MANIFEST_FILE_NAME, DEFAULT_OUT_DIR
    ));
    println!();
    Ok(())
}

/// Rebuild whenever `file` changes.
async fn run_watch_mode(file: &Path, output: Option<PathBuf>, strict: bool) -> miette::Result<()> {
    let base = parent_dir(file).to_path_buf();
    let options = resolve_options(None, &base, output, strict)?;
    let file_name = file
        .file_name()
        .map(|name| name.to_os_string())
        .ok_or_else(|| miette::miette!("{} is not a file", file.display()))?;

    let (tx, mut rx) = tokio::sync::mpsc::channel::<()>(1);
    let watched = file_name.clone();
    let mut debouncer = new_debouncer(
        Duration::from_millis(300),
        move |result: DebounceEventResult| {
            if let Ok(events) = result {
                if events.iter().any(|e| e.path.file_name() == Some(watched.as_os_str())) {
                    let _ = tx.try_send(());
                }
            }
        },
    )
    .into_diagnostic()
    .wrap_err("Failed to create file watcher")?;
    debouncer
        .watcher()
        .watch(&base, RecursiveMode::NonRecursive)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to watch {}", base.display()))?;

    ui::info(&format!("Watching {}", file.display()));
    rebuild(file, &options).await;
    ui::info("Ready! Waiting for changes...");

    loop {
        tokio::select! {
            Some(()) = rx.recv() => {
                println!();
                rebuild(file, &options).await;
                ui::info("Ready! Waiting for changes...");
            }
            _ = tokio::signal::ctrl_c() => {
                println!();
                ui::dim("Stopping watch mode.");
                break;
            }
        }
    }

    Ok(())
}

async fn rebuild(file: &Path, options: &BuildOptions) {
    let start = Instant::now();
    let task_file = file.to_path_buf();
    let task_options = options.clone();
    match tokio::task::spawn_blocking(move || build_one(&task_file, task_options)).await {
        Ok(Ok((source, report))) => {
            print_build(file, &source, &report);
            if report.is_success() {
                ui::timing("Rebuilt", start.elapsed().as_millis());
            }
        }
        Ok(Err(report)) => ui::error(&format!("{}", report)),
        Err(e) => ui::error(&format!("build task failed: {}", e)),
    }
}
