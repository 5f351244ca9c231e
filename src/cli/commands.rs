//! Command dispatch

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use itertools::Itertools;
use tracing::{debug, instrument};

use crate::application::services::Frame;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::{PathKey, RenderItem};
use crate::infrastructure::di::ServiceContainer;
use crate::infrastructure::InfraError;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    let Some(command) = &cli.command else {
        return Ok(());
    };

    if let Commands::Completion { shell } = command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(*shell, &mut cmd, name, &mut io::stdout());
        return Ok(());
    }

    let config_dir = resolve_config_dir(cli.config_dir.as_deref())?;
    let settings = Settings::load(Some(&config_dir))?;
    let container = ServiceContainer::new(settings);

    match command {
        Commands::Tree { table } => cmd_tree(&container, table),
        Commands::Layout { table, focus, json } => {
            cmd_layout(&container, table, focus.as_deref(), *json)
        }
        Commands::Breadcrumbs { table, focus } => cmd_breadcrumbs(&container, table, focus),
        Commands::Zoom {
            table,
            focus,
            frames,
            json,
        } => cmd_zoom(container, table, focus, *frames, *json),
        Commands::Strategies => cmd_strategies(&container),
        Commands::Config { command } => cmd_config(&container, &config_dir, command),
        Commands::Completion { .. } => Ok(()),
    }
}

fn resolve_config_dir(dir: Option<&Path>) -> CliResult<PathBuf> {
    match dir {
        Some(d) => Ok(d.to_path_buf()),
        None => std::env::current_dir()
            .map_err(|e| CliError::Infra(InfraError::io("determine current directory", e))),
    }
}

#[instrument(skip(container))]
fn cmd_tree(container: &ServiceContainer, table: &Path) -> CliResult<()> {
    let chart = container.sunburst.open(table)?;
    let partition = chart.state.partition();
    let tree = partition.tree();
    debug!("strategy={}, stats={:?}", chart.strategy, chart.stats);

    output::info(&tree.to_display_tree());
    output::action(
        "Summary",
        &format!(
            "{} leaves, depth {}, total weight {} ({} rows via {}, {} skipped)",
            tree.leaf_count(),
            partition.max_depth(),
            tree.root_node().weight,
            chart.stats.contributed,
            chart.strategy,
            chart.stats.skipped
        ),
    );
    Ok(())
}

#[instrument(skip(container))]
fn cmd_layout(
    container: &ServiceContainer,
    table: &Path,
    focus: Option<&str>,
    json: bool,
) -> CliResult<()> {
    let mut chart = container.sunburst.open(table)?;
    if let Some(focus) = focus {
        let requested = PathKey::parse(focus);
        let focused = chart.state.focus_on(&requested);
        warn_on_fallback(&requested, &focused);
        chart.state.finish();
    }

    let items = chart.state.render_list();
    if json {
        output::info(&serde_json::to_string_pretty(&items).map_err(InfraError::from)?);
    } else {
        output::header(&format!("focus: {}", display_key(chart.state.focus())));
        print_items(&items);
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_breadcrumbs(container: &ServiceContainer, table: &Path, focus: &str) -> CliResult<()> {
    let mut chart = container.sunburst.open(table)?;
    let requested = PathKey::parse(focus);
    let focused = chart.state.focus_on(&requested);
    warn_on_fallback(&requested, &focused);

    let trail = chart.state.breadcrumbs();
    if trail.is_empty() {
        output::info("(root)");
    } else {
        output::info(&trail.iter().filter_map(PathKey::last).join(" > "));
    }
    Ok(())
}

#[instrument(skip(container))]
fn cmd_zoom(
    container: ServiceContainer,
    table: &Path,
    focus: &str,
    frames: Option<usize>,
    json: bool,
) -> CliResult<()> {
    let container = match frames {
        Some(0) => return Err(CliError::InvalidArgs("--frames must be at least 1".into())),
        Some(n) => {
            let mut settings = (*container.settings).clone();
            settings.frames = n;
            debug!("frames override: {}", n);
            ServiceContainer::new(settings)
        }
        None => container,
    };

    let mut chart = container.sunburst.open(table)?;
    let requested = PathKey::parse(focus);
    let (focused, frames) = container.sunburst.zoom(&mut chart, &requested);
    warn_on_fallback(&requested, &focused);

    if json {
        let doc: Vec<serde_json::Value> = frames
            .iter()
            .map(|f| serde_json::json!({ "progress": f.progress, "items": f.items }))
            .collect();
        output::info(&serde_json::to_string_pretty(&doc).map_err(InfraError::from)?);
    } else {
        print_frames(&frames);
    }
    Ok(())
}

fn cmd_strategies(container: &ServiceContainer) -> CliResult<()> {
    output::header("Extraction strategies (priority order)");
    for (i, strategy) in container.sunburst.extractor().strategies().enumerate() {
        output::detail(&format!(
            "{}. {:<15} {}",
            i + 1,
            strategy.name(),
            strategy.description()
        ));
    }
    Ok(())
}

fn cmd_config(
    container: &ServiceContainer,
    config_dir: &Path,
    command: &ConfigCommands,
) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&container.settings.to_toml()?);
        }
        ConfigCommands::Path => {
            match global_config_path() {
                Some(p) => output::action("global", &p.display()),
                None => output::warning("no config directory available on this platform"),
            }
            output::action("local", &local_config_path(config_dir).display());
        }
    }
    Ok(())
}

fn warn_on_fallback(requested: &PathKey, focused: &PathKey) {
    if requested != focused {
        output::warning(&format!(
            "'{}' not found, focusing root",
            display_key(requested)
        ));
    }
}

fn display_key(key: &PathKey) -> String {
    if key.is_root() {
        "(root)".to_string()
    } else {
        key.to_string()
    }
}

fn format_item(item: &RenderItem) -> String {
    format!(
        "{:<32} fill={:<12} angle=[{:.4}, {:.4}] radius=[{:.2}, {:.2}]",
        item.path.to_string(),
        item.fill_key,
        item.rect.angle_start,
        item.rect.angle_end,
        item.rect.radius_inner,
        item.rect.radius_outer
    )
}

fn print_items(items: &[RenderItem]) {
    for item in items {
        if item.label_visible {
            output::detail(&format_item(item));
        } else {
            output::detail_dim(&format_item(item));
        }
    }
}

fn print_frames(frames: &[Frame]) {
    for frame in frames {
        output::header(&format!("progress {:.3}", frame.progress));
        print_items(&frame.items);
    }
}
