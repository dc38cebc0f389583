//! Command implementations
//!
//! Each subcommand loads settings, builds a container and calls one service.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::services::Renderer;
use crate::cli::args::{Cli, Commands, ConfigCommands, TreeCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, project_config_path, Settings, ALL_VIEWS};
use crate::domain::{Point, TreeNodeConvert};
use crate::infrastructure::di::ServiceContainer;

/// Run the parsed command line.
pub fn execute(cli: &Cli) -> CliResult<()> {
    let project_dir = resolve_project_dir(cli.project_dir.as_deref())?;
    match &cli.command {
        Some(Commands::Render {
            out,
            views,
            offline,
        }) => cmd_render(&project_dir, out.as_deref(), views, *offline),
        Some(Commands::Tree { command }) => match command {
            TreeCommands::Show { collapse, depth } => cmd_tree_show(&project_dir, collapse, *depth),
            TreeCommands::Toggle { nodes, out } => {
                cmd_tree_toggle(&project_dir, nodes, out.as_deref())
            }
        },
        Some(Commands::Map { offline, zoom, out }) => {
            cmd_map(&project_dir, *offline, *zoom, out.as_deref())
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cmd_config_show(&project_dir),
            ConfigCommands::Template => {
                output::info(&Settings::template());
                Ok(())
            }
            ConfigCommands::Path => cmd_config_path(&project_dir),
        },
        Some(Commands::Info) => cmd_info(&project_dir),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `portviz --help`".into(),
        )),
    }
}

fn resolve_project_dir(dir: Option<&Path>) -> CliResult<PathBuf> {
    match dir {
        Some(d) => Ok(d.to_path_buf()),
        None => std::env::current_dir()
            .map_err(|e| crate::infrastructure::InfraError::io("current directory", e).into()),
    }
}

fn load_settings(project_dir: &Path) -> CliResult<Settings> {
    Ok(Settings::load(Some(project_dir))?)
}

/// Relative output paths resolve against the project directory.
fn output_dir(project_dir: &Path, settings: &Settings, out: Option<&Path>) -> PathBuf {
    let dir = out.unwrap_or(settings.output_dir.as_path());
    if dir.is_absolute() {
        dir.to_path_buf()
    } else {
        project_dir.join(dir)
    }
}

#[instrument(level = "debug", skip(views))]
fn cmd_render(
    project_dir: &Path,
    out: Option<&Path>,
    views: &[String],
    offline: bool,
) -> CliResult<()> {
    let settings = load_settings(project_dir)?;
    let views = if views.is_empty() {
        settings.views.clone()
    } else {
        views.to_vec()
    };
    let dir = output_dir(project_dir, &settings, out);
    let container = ServiceContainer::new(settings, offline);
    let report = container.portfolio().render(&dir, &views)?;

    for path in &report.written {
        output::success_detail(&path.display());
    }
    for mount in &report.skipped {
        output::warning(&format!("view '#{mount}' skipped: mount missing"));
    }
    output::action("Rendered", &dir.display());
    Ok(())
}

fn cmd_tree_show(project_dir: &Path, collapse: &[String], depth: Option<usize>) -> CliResult<()> {
    let settings = load_settings(project_dir)?;
    let container = ServiceContainer::new(settings, true);
    let mut view = container.portfolio().tree_view()?;
    if let Some(depth) = depth {
        view.collapse_from_depth(depth, 0)?;
    }
    for (i, label) in collapse.iter().enumerate() {
        let key = view.find_by_label(label)?;
        view.collapse_all(key, i as u64)?;
    }
    output::info(&view.hierarchy().to_tree_string());
    Ok(())
}

#[instrument(level = "debug", skip(nodes))]
fn cmd_tree_toggle(project_dir: &Path, nodes: &[String], out: Option<&Path>) -> CliResult<()> {
    let settings = load_settings(project_dir)?;
    let path = match out {
        Some(p) => p.to_path_buf(),
        None => output_dir(project_dir, &settings, None).join("tree.svg"),
    };
    let container = ServiceContainer::new(settings, true);
    let portfolio = container.portfolio();
    let mut view = portfolio.tree_view()?;
    let step = view.config().duration;

    // each toggle starts after the previous animation finished
    let mut now = 0;
    view.render(now)?;
    for label in nodes {
        now += step;
        let key = view.find_by_label(label)?;
        match view.toggle(key, now)? {
            Some(pass) => debug!(pass = pass.number, nodes = pass.rendered.len(), "toggled"),
            None => output::warning(&format!("'{label}' is a leaf, nothing to toggle")),
        }
    }

    let element = view.draw(now)?;
    portfolio.write_svg(&path, &element)?;
    output::info(&view.hierarchy().to_tree_string());
    output::action("Wrote", &path.display());
    Ok(())
}

fn cmd_map(
    project_dir: &Path,
    offline: bool,
    zoom: Option<f64>,
    out: Option<&Path>,
) -> CliResult<()> {
    let settings = load_settings(project_dir)?;
    let path = match out {
        Some(p) => p.to_path_buf(),
        None => output_dir(project_dir, &settings, None).join("map.svg"),
    };
    if let Some(k) = zoom {
        if !(k.is_finite() && k > 0.0) {
            return Err(CliError::InvalidArgs(format!("zoom must be positive, got {k}")));
        }
    }
    let center = Point::new(settings.map.width / 2.0, settings.map.height / 2.0);
    let container = ServiceContainer::new(settings, offline);
    let portfolio = container.portfolio();

    let mut map = portfolio.interactive_map();
    if map.load_failed() {
        output::warning("map boundaries unavailable, drawing markers only");
    }
    if let Some(k) = zoom {
        map.zoom_by(k, center);
    }
    let element = map.draw(0)?;
    portfolio.write_svg(&path, &element)?;
    output::action("Wrote", &path.display());
    Ok(())
}

fn cmd_config_show(project_dir: &Path) -> CliResult<()> {
    let settings = load_settings(project_dir)?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_path(project_dir: &Path) -> CliResult<()> {
    let exists = |p: &Path| if p.exists() { "" } else { " (not found)" };
    match global_config_path() {
        Some(global) => output::detail(&format!(
            "global:  {}{}",
            global.display(),
            exists(&global)
        )),
        None => output::detail(&"global:  (no config directory)"),
    }
    let project = project_config_path(project_dir);
    output::detail(&format!("project: {}{}", project.display(), exists(&project)));
    Ok(())
}

fn cmd_info(project_dir: &Path) -> CliResult<()> {
    let settings = load_settings(project_dir)?;
    let cmd = Cli::command();
    output::header(&format!(
        "{} {}",
        cmd.get_name(),
        cmd.get_version().unwrap_or("unknown")
    ));
    output::detail(&format!("project dir: {}", project_dir.display()));
    output::detail(&format!(
        "output dir:  {}",
        output_dir(project_dir, &settings, None).display()
    ));
    output::detail(&format!("views:       {}", settings.views.join(", ")));
    output::detail(&format!("known views: {}", ALL_VIEWS.join(", ")));
    output::detail(&format!("boundaries:  {}", settings.map.boundary_url));
    Ok(())
}
