//! vaultline CLI
//!
//! Entry point for the `vaultline` command-line tool.

use clap::{Parser, Subcommand, ValueEnum};
use globset::{Glob, GlobSetBuilder};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use vaultline::checksum::{ChecksumSync, DriftStatus, SyncSource};
use vaultline::config::Settings;
use vaultline::graph::{self, GraphAnalysis, LineageGraph};
use vaultline::ident::ArtifactId;
use vaultline::render;
use vaultline::vault::{Direction, VaultManager};
use vaultline::SIDECAR_SUFFIX;

#[derive(Parser)]
#[command(name = "vaultline")]
#[command(about = "Checksum and lineage integrity vault", version)]
struct Cli {
    /// Path to the vault directory (default: from .vaultline.toml or .vault)
    #[arg(long, global = true)]
    vault: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Register an artifact with checksum and lineage
    Register {
        /// Artifact identifier (vault://domain/resource/version)
        #[arg(long = "id")]
        vault_id: String,

        /// Path to the artifact file
        #[arg(long)]
        file: PathBuf,

        /// Identifier of the predecessor artifact
        #[arg(long)]
        predecessor: Option<String>,
    },

    /// Verify a registered artifact against its recorded checksum
    Verify {
        /// Artifact identifier to verify
        #[arg(long = "id")]
        vault_id: String,
    },

    /// Trace the lineage chain from an artifact
    Trace {
        /// Artifact identifier to start from
        #[arg(long = "id")]
        vault_id: String,

        /// Trace direction
        #[arg(long, value_enum, default_value = "backward")]
        direction: TraceDirection,
    },

    /// Validate the backward lineage chain of an artifact
    Validate {
        /// Artifact identifier to validate
        #[arg(long = "id")]
        vault_id: String,
    },

    /// Generate the lineage report
    Report {
        /// Output as JSON instead of a human-readable summary
        #[arg(long)]
        json: bool,
    },

    /// Export the complete vault state with its canonical hash
    Export {
        /// Output file (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Reconcile frontmatter and sidecar checksums
    Sync {
        /// Check for drift without modifying anything
        #[arg(long)]
        check: bool,

        /// Copy checksums from this source to the other location
        #[arg(long, value_enum, conflicts_with = "check")]
        source: Option<CliSyncSource>,

        /// Recalculate checksums from content and update both locations
        #[arg(long, conflicts_with_all = ["check", "source"])]
        recalculate: bool,

        /// Specific files or glob patterns (default: sync_globs setting)
        #[arg(long, num_args = 1..)]
        files: Vec<String>,

        /// Preview changes without writing files
        #[arg(long)]
        dry_run: bool,
    },

    /// Build and render the lineage graph from sidecar files
    Graph {
        /// Scan a directory for sidecar files (default: scan_dir setting)
        #[arg(long)]
        scan: Option<PathBuf>,

        /// Build the graph from a single sidecar file
        #[arg(long, conflicts_with = "scan")]
        sidecar: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value = "dot")]
        format: GraphFormat,

        /// Output file (default: stdout for dot, lineage.<format> otherwise)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum TraceDirection {
    Backward,
    Forward,
}

impl From<TraceDirection> for Direction {
    fn from(direction: TraceDirection) -> Self {
        match direction {
            TraceDirection::Backward => Direction::Backward,
            TraceDirection::Forward => Direction::Forward,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliSyncSource {
    Frontmatter,
    Sidecar,
}

impl From<CliSyncSource> for SyncSource {
    fn from(source: CliSyncSource) -> Self {
        match source {
            CliSyncSource::Frontmatter => SyncSource::Frontmatter,
            CliSyncSource::Sidecar => SyncSource::Sidecar,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum GraphFormat {
    Dot,
    Svg,
    Html,
}

fn main() {
    let cli = Cli::parse();

    let settings = match Settings::load(Path::new(".")) {
        Ok(settings) => settings.with_overrides(cli.vault, None),
        Err(err) => {
            eprintln!("Error loading settings: {}", err);
            process::exit(1);
        }
    };

    match cli.command {
        Commands::Register {
            vault_id,
            file,
            predecessor,
        } => run_register(&settings, &vault_id, &file, predecessor.as_deref()),
        Commands::Verify { vault_id } => run_verify(&settings, &vault_id),
        Commands::Trace {
            vault_id,
            direction,
        } => run_trace(&settings, &vault_id, direction.into()),
        Commands::Validate { vault_id } => run_validate(&settings, &vault_id),
        Commands::Report { json } => run_report(&settings, json),
        Commands::Export { output } => run_export(&settings, output),
        Commands::Sync {
            check,
            source,
            recalculate,
            files,
            dry_run,
        } => run_sync(&settings, check, source, recalculate, &files, dry_run),
        Commands::Graph {
            scan,
            sidecar,
            format,
            output,
        } => run_graph(&settings, scan, sidecar, format, output),
    }
}

fn open_vault(settings: &Settings) -> VaultManager {
    match VaultManager::open(&settings.vault_dir) {
        Ok(manager) => manager,
        Err(err) => {
            eprintln!("Error opening vault {}: {}", settings.vault_dir.display(), err);
            process::exit(1);
        }
    }
}

fn parse_id(raw: &str) -> ArtifactId {
    match ArtifactId::parse(raw) {
        Ok(id) => id,
        Err(err) => {
            eprintln!("Invalid identifier: {}", err);
            process::exit(1);
        }
    }
}

fn run_register(settings: &Settings, vault_id: &str, file: &Path, predecessor: Option<&str>) {
    let id = parse_id(vault_id);
    let predecessor = predecessor.map(parse_id);
    let mut manager = open_vault(settings);

    match manager.register(&id, file, predecessor.as_ref(), None) {
        Ok(checksum) => {
            println!("Registered {}", id);
            println!("  checksum: {}", checksum);
        }
        Err(err) => {
            eprintln!("Error registering {}: {}", id, err);
            process::exit(1);
        }
    }
}

fn run_verify(settings: &Settings, vault_id: &str) {
    let manager = open_vault(settings);
    let outcome = manager.verify(vault_id);

    if outcome.valid {
        println!("{} verified", vault_id);
    } else {
        println!("{} verification failed:", vault_id);
        for issue in &outcome.issues {
            println!("  - {}", issue);
        }
        process::exit(1);
    }
}

fn run_trace(settings: &Settings, vault_id: &str, direction: Direction) {
    let manager = open_vault(settings);

    match manager.trace(vault_id, direction) {
        Ok(chain) => {
            println!("Lineage chain ({}):", direction);
            for (i, id) in chain.iter().enumerate() {
                println!("  {}. {}", i, id);
            }
        }
        Err(err) => {
            eprintln!("Error tracing {}: {}", vault_id, err);
            process::exit(1);
        }
    }
}

fn run_validate(settings: &Settings, vault_id: &str) {
    let manager = open_vault(settings);
    let outcome = manager.validate_chain(vault_id);

    if outcome.valid {
        println!("{} lineage chain valid", vault_id);
    } else {
        println!("{} lineage chain invalid:", vault_id);
        for issue in &outcome.issues {
            println!("  - {}", issue);
        }
        process::exit(1);
    }
}

fn run_report(settings: &Settings, json: bool) {
    let manager = open_vault(settings);
    let report = manager.report();

    if json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(err) => {
                eprintln!("Error serializing report: {}", err);
                process::exit(1);
            }
        }
        return;
    }

    println!("Lineage report:");
    println!("  Artifacts: {}", report.total_artifacts);
    println!("  Roots: {}", report.root_nodes.len());
    println!("  Leaves: {}", report.leaf_nodes.len());
    println!("  Forks: {}", report.fork_points.len());
    for (root, chain) in &report.chains {
        println!("  {}", root);
        for id in chain.iter().skip(1) {
            println!("    -> {}", id);
        }
    }
}

fn run_export(settings: &Settings, output: Option<PathBuf>) {
    let manager = open_vault(settings);

    let state = match manager.export_state() {
        Ok(state) => state,
        Err(err) => {
            eprintln!("Error exporting vault state: {}", err);
            process::exit(1);
        }
    };
    let json = match serde_json::to_string_pretty(&state) {
        Ok(mut json) => {
            json.push('\n');
            json
        }
        Err(err) => {
            eprintln!("Error serializing vault state: {}", err);
            process::exit(1);
        }
    };

    match output {
        Some(path) => {
            if let Err(err) = fs::write(&path, json) {
                eprintln!("Error writing {}: {}", path.display(), err);
                process::exit(1);
            }
            println!("Vault state exported to {}", path.display());
            println!("  state hash: {}", state.state_hash);
        }
        None => print!("{}", json),
    }
}

fn run_sync(
    settings: &Settings,
    check: bool,
    source: Option<CliSyncSource>,
    recalculate: bool,
    files: &[String],
    dry_run: bool,
) {
    let targets = collect_sync_targets(settings, files);
    if targets.is_empty() {
        eprintln!("No files to process");
        process::exit(1);
    }
    println!("Processing {} file(s)...", targets.len());

    let tool = if dry_run {
        ChecksumSync::dry_run()
    } else {
        ChecksumSync::new()
    };

    if check {
        let mut drifted = 0usize;
        let mut incorrect = 0usize;

        for path in &targets {
            match tool.detect_drift(path) {
                Ok(report) => match report.status() {
                    DriftStatus::Drift => {
                        drifted += 1;
                        println!("{}: DRIFT", path.display());
                        println!(
                            "  frontmatter: {}",
                            report
                                .frontmatter
                                .as_ref()
                                .map(|f| f.value().to_string())
                                .unwrap_or_else(|| "none".to_string())
                        );
                        println!(
                            "  sidecar:     {}",
                            report.sidecar.as_deref().unwrap_or("none")
                        );
                    }
                    DriftStatus::Incorrect => {
                        incorrect += 1;
                        println!("{}: INCORRECT", path.display());
                        println!("  expected: {}", report.computed);
                    }
                    DriftStatus::Pending => println!("{}: pending", path.display()),
                    DriftStatus::Ok => println!("{}: ok", path.display()),
                },
                Err(err) => {
                    incorrect += 1;
                    println!("{}: error: {}", path.display(), err);
                }
            }
        }

        println!();
        println!("Summary:");
        println!("  Total files: {}", targets.len());
        println!("  Drift detected: {}", drifted);
        println!("  Incorrect checksums: {}", incorrect);
        if drifted > 0 || incorrect > 0 {
            process::exit(1);
        }
        return;
    }

    if let Some(source) = source {
        let source: SyncSource = source.into();
        let mut synced = 0usize;
        for path in &targets {
            match tool.sync(path, source) {
                Ok(_) => {
                    synced += 1;
                    println!("{}: synced", path.display());
                }
                Err(err) => println!("{}: failed: {}", path.display(), err),
            }
        }
        println!();
        println!("Synced {}/{} file(s)", synced, targets.len());
        return;
    }

    if recalculate {
        let mut updated = 0usize;
        for path in &targets {
            match tool.recalculate(path) {
                Ok(checksum) => {
                    updated += 1;
                    println!("{}: updated [{}...]", path.display(), &checksum[..12]);
                }
                Err(err) => println!("{}: failed: {}", path.display(), err),
            }
        }
        println!();
        println!("Updated {}/{} file(s)", updated, targets.len());
        return;
    }

    eprintln!("Specify --check, --source, or --recalculate");
    process::exit(1);
}

/// Expand explicit paths and glob patterns into a sorted file list.
fn collect_sync_targets(settings: &Settings, files: &[String]) -> Vec<PathBuf> {
    let mut patterns: Vec<String> = Vec::new();
    let mut targets: Vec<PathBuf> = Vec::new();

    let selectors: &[String] = if files.is_empty() {
        &settings.sync_globs
    } else {
        files
    };
    for selector in selectors {
        if selector.contains('*') || selector.contains('?') || selector.contains('[') {
            patterns.push(selector.clone());
        } else {
            targets.push(PathBuf::from(selector));
        }
    }

    if !patterns.is_empty() {
        let mut builder = GlobSetBuilder::new();
        for pattern in &patterns {
            match Glob::new(pattern) {
                Ok(glob) => {
                    builder.add(glob);
                }
                Err(err) => {
                    eprintln!("Invalid glob pattern {}: {}", pattern, err);
                    process::exit(1);
                }
            }
        }
        let glob_set = match builder.build() {
            Ok(set) => set,
            Err(err) => {
                eprintln!("Error building glob set: {}", err);
                process::exit(1);
            }
        };

        for entry in walkdir::WalkDir::new(&settings.scan_dir)
            .follow_links(false)
            .sort_by(|a, b| a.file_name().cmp(b.file_name()))
        {
            let Ok(entry) = entry else { continue };
            if !entry.file_type().is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy();
            if name.ends_with(SIDECAR_SUFFIX) {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&settings.scan_dir)
                .unwrap_or(entry.path());
            if glob_set.is_match(relative) {
                targets.push(entry.path().to_path_buf());
            }
        }
    }

    targets.sort();
    targets.dedup();
    targets
}

fn run_graph(
    settings: &Settings,
    scan: Option<PathBuf>,
    sidecar: Option<PathBuf>,
    format: GraphFormat,
    output: Option<PathBuf>,
) {
    let mut lineage_graph = LineageGraph::new();

    if let Some(sidecar) = sidecar {
        if let Err(err) = graph::load_sidecar(&mut lineage_graph, &sidecar) {
            eprintln!("Error reading {}: {}", sidecar.display(), err);
            process::exit(1);
        }
    } else {
        let scan_dir = scan.unwrap_or_else(|| settings.scan_dir.clone());
        match graph::scan_directory(&mut lineage_graph, &scan_dir) {
            Ok(outcome) => {
                println!("Loaded {} sidecar file(s)", outcome.loaded);
                for skipped in &outcome.skipped {
                    eprintln!(
                        "Warning: skipped {}: {}",
                        skipped.path.display(),
                        skipped.reason
                    );
                }
            }
            Err(err) => {
                eprintln!("Error scanning {}: {}", scan_dir.display(), err);
                process::exit(1);
            }
        }
    }

    if lineage_graph.is_empty() {
        eprintln!("No lineage data found");
        process::exit(1);
    }

    // Classification happens once; every format projects the same analysis
    let analysis = GraphAnalysis::of(&lineage_graph);
    let dot = render::to_dot(&lineage_graph, &analysis);

    match format {
        GraphFormat::Dot => match output {
            Some(path) => write_output(&path, &dot),
            None => println!("{}", dot),
        },
        GraphFormat::Svg => {
            let svg = match render::render_svg(&dot) {
                Ok(svg) => svg,
                Err(err) => {
                    eprintln!("{}", err);
                    process::exit(1);
                }
            };
            let path = output.unwrap_or_else(|| PathBuf::from("lineage.svg"));
            write_output(&path, &svg);
        }
        GraphFormat::Html => {
            let html = render::to_html(&lineage_graph, &analysis);
            let path = output.unwrap_or_else(|| PathBuf::from("lineage.html"));
            write_output(&path, &html);
        }
    }

    println!();
    println!("Lineage graph summary:");
    println!("  Nodes: {}", lineage_graph.len());
    println!("  Roots: {}", analysis.roots.len());
    println!("  Leaves: {}", analysis.leaves.len());
    if !analysis.cycles.is_empty() {
        println!("  Cycles detected: {}", analysis.cycles.len());
        for cycle in &analysis.cycles {
            println!("    {}", cycle.join(" -> "));
        }
    }
    if !analysis.broken_links.is_empty() {
        println!("  Broken links: {}", analysis.broken_links.len());
        for (from, to) in &analysis.broken_links {
            println!("    {} -> {}", from, to);
        }
    }
}

fn write_output(path: &Path, content: &str) {
    if let Err(err) = fs::write(path, content) {
        eprintln!("Error writing {}: {}", path.display(), err);
        process::exit(1);
    }
    println!("Output saved to {}", path.display());
}
