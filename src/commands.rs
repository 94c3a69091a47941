use crate::{OutputMode, Reported, emit_failure, emit_success};
use buildorder::adapter::default_registry;
use buildorder::config::{self, BuildorderConfig};
use buildorder::project::{self, SkippedFile};
use buildorder::ui::{self, DependencyRow, ExternalRow, Icons, ProgressManager, Spinner, TableBuilder};
use buildorder::{Analysis, Analyzer, Error};
use owo_colors::OwoColorize;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Settings for one analysis run: config file values with CLI overrides
pub struct Context {
    pub root: PathBuf,
    pub config: BuildorderConfig,
    pub output_mode: OutputMode,
}

impl Context {
    pub fn load(root: &Path, config_path: Option<&Path>, strict: bool, output_mode: OutputMode) -> anyhow::Result<Self> {
        if !root.is_dir() {
            anyhow::bail!("{} is not a directory", root.display());
        }

        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| config::default_config_path_in(root));
        let mut config = config::load_config(Some(&config_path))?.unwrap_or_default();
        if strict {
            config.strict = true;
        }
        tracing::debug!(?config, "effective configuration");

        Ok(Self {
            root: root.to_path_buf(),
            config,
            output_mode,
        })
    }
}

/// Discover, load and analyze the project
fn analyze(ctx: &Context) -> anyhow::Result<(Analysis, Vec<SkippedFile>)> {
    let started = Instant::now();
    let decorated = ctx.output_mode.is_decorated();
    let registry = default_registry(Some(&ctx.config.ruby));

    let spinner = decorated.then(|| Spinner::new("Reading source files"));
    let loaded = project::load_project(&ctx.root, &ctx.config, &registry);
    if let Some(spinner) = &spinner {
        spinner.finish_and_clear();
    }
    let loaded = loaded?;

    if decorated {
        for skipped in &loaded.skipped {
            ui::warn(&format!("Skipped {}: {}", skipped.unit, skipped.reason));
        }
    }

    let analyzer = Analyzer::from_config(&ctx.config);
    let analysis = if decorated {
        let (mut progress, tx) = ProgressManager::new(loaded.units.len());
        let result = analyzer.analyze_with_progress(&loaded.units, Some(&tx));
        drop(tx);
        match result {
            Ok(analysis) => {
                progress.finish_with_summary(
                    started.elapsed(),
                    loaded.units.len(),
                    analysis.symbols.len(),
                    analysis.graph.edge_count(),
                );
                analysis
            }
            Err(e) => {
                progress.join();
                progress.clear();
                return Err(e.into());
            }
        }
    } else {
        analyzer.analyze(&loaded.units)?
    };

    Ok((analysis, loaded.skipped))
}

fn show_diagnostics(ctx: &Context, analysis: &Analysis) {
    if !ctx.output_mode.is_decorated() {
        return;
    }
    let diagnostics = analysis.diagnostics();
    if diagnostics.is_empty() {
        return;
    }
    ui::section(&format!("Diagnostics ({})", diagnostics.len()));
    for diagnostic in diagnostics {
        ui::diagnostic(diagnostic);
    }
}

pub fn run_order(ctx: &Context) -> anyhow::Result<()> {
    let (analysis, skipped) = analyze(ctx)?;

    let order = match analysis.build_order() {
        Ok(order) => order,
        Err(Error::CircularDependency { waiting, placed }) => {
            let cycle = analysis
                .graph
                .find_cycle(&waiting.iter().cloned().collect())
                .unwrap_or_default();
            let message = format!("circular dependency among {} file(s)", waiting.len());

            if ctx.output_mode.is_human() {
                ui::error(&format!("Circular dependency: {} file(s) cannot be ordered", waiting.len()));
                if !cycle.is_empty() {
                    ui::path_line(&cycle);
                }
                ui::section("Waiting");
                for unit in &waiting {
                    println!("  {}", unit);
                }
                if !placed.is_empty() {
                    ui::section("Ordered before the cycle");
                    for (i, unit) in placed.iter().enumerate() {
                        ui::order_line(i, unit);
                    }
                }
            } else {
                let data = serde_json::json!({
                    "waiting": waiting,
                    "placed": placed,
                    "cycle": cycle,
                });
                emit_failure(ctx.output_mode, "order", &message, Some(data))?;
            }
            return Err(Reported(message).into());
        }
        Err(e) => return Err(e.into()),
    };

    if ctx.output_mode.is_human() {
        show_diagnostics(ctx, &analysis);
        if ctx.output_mode.is_decorated() {
            ui::section(&format!("Build order ({} files)", order.len()));
            for (i, unit) in order.iter().enumerate() {
                ui::order_line(i, unit);
            }
        } else {
            print!("{}", order);
        }
    } else {
        let data = serde_json::json!({
            "order": order,
            "diagnostics": analysis.diagnostics(),
            "skipped": skipped,
        });
        emit_success(ctx.output_mode, "order", data)?;
    }
    Ok(())
}

pub fn run_graph(ctx: &Context) -> anyhow::Result<()> {
    let (analysis, _) = analyze(ctx)?;
    let graph_stats = analysis.graph.stats();

    if ctx.output_mode.is_human() {
        show_diagnostics(ctx, &analysis);

        let mut table = TableBuilder::new();
        table.add_row("Files", graph_stats.units);
        table.add_row("Files with dependencies", graph_stats.dependent_units);
        table.add_row("Dependencies", graph_stats.edges);
        table.add_row("Constants defined", analysis.symbols.len());
        table.add_row("References", analysis.stats.total);
        table.add_row("Resolved to another file", analysis.stats.resolved);
        table.add_row("Resolved locally", analysis.stats.local);
        table.add_row("External", analysis.stats.external);
        ui::section("Dependency graph");
        println!("{}", table.build());

        let rows: Vec<DependencyRow> = analysis
            .graph
            .iter()
            .map(|(unit, deps)| DependencyRow {
                unit: unit.clone(),
                dependencies: deps.iter().cloned().collect::<Vec<_>>().join(", "),
            })
            .collect();
        if rows.is_empty() {
            ui::success("No file depends on another");
        } else {
            println!("{}", ui::table::render(&rows));
        }
    } else {
        let data = serde_json::json!({
            "graph": analysis.graph,
            "stats": graph_stats,
            "links": analysis.stats,
        });
        emit_success(ctx.output_mode, "graph", data)?;
    }
    Ok(())
}

pub fn run_externals(ctx: &Context) -> anyhow::Result<()> {
    let (analysis, _) = analyze(ctx)?;

    if ctx.output_mode.is_human() {
        if analysis.externals.is_empty() {
            ui::success("Every referenced constant is defined in the project");
            return Ok(());
        }

        let rows: Vec<ExternalRow> = analysis
            .externals
            .iter()
            .map(|(name, units)| ExternalRow {
                name: name.clone(),
                units: units.iter().cloned().collect::<Vec<_>>().join(", "),
            })
            .collect();
        ui::section(&format!("{} External constants ({})", Icons::GLOBE, rows.len()));
        println!("{}", ui::table::render(&rows));
    } else {
        emit_success(ctx.output_mode, "externals", &analysis.externals)?;
    }
    Ok(())
}

pub fn run_cycle(ctx: &Context, from: &str, to: &str) -> anyhow::Result<()> {
    let (analysis, _) = analyze(ctx)?;
    let would_cycle = analysis.would_create_cycle(from, to)?;

    if ctx.output_mode.is_human() {
        let edge = format!("{} {} {}", from, Icons::ARROW, to);
        if would_cycle {
            ui::warn(&format!("{} would create a cycle", edge));
        } else {
            ui::success(&format!("{} is safe", edge));
        }
    } else {
        let data = serde_json::json!({
            "from": from,
            "to": to,
            "would_create_cycle": would_cycle,
        });
        emit_success(ctx.output_mode, "cycle", data)?;
    }
    Ok(())
}

pub fn run_init(output_mode: OutputMode, path: &Path, force: bool) -> anyhow::Result<()> {
    let config = BuildorderConfig::default();
    config::write_config(path, &config, force)?;

    if output_mode.is_human() {
        ui::success(&format!("Wrote {}", path.display()));
    } else {
        let data = serde_json::json!({
            "path": path.display().to_string(),
            "config": config,
        });
        emit_success(output_mode, "init", data)?;
    }
    Ok(())
}

pub fn run_version(output_mode: OutputMode) -> anyhow::Result<()> {
    if output_mode.is_human() {
        ui::banner(
            &format!("{}", "Buildorder".bold().style(ui::theme().info.clone())),
            &format!("Version {}", env!("CARGO_PKG_VERSION").bold()),
        );
    } else {
        let data = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
        });
        emit_success(output_mode, "version", data)?;
    }
    Ok(())
}
