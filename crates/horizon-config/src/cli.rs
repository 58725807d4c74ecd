//! `horizon` command line.

use std::path::PathBuf;

use clap::Parser;
use horizon_raymarch::SceneMode;

use crate::Config;

/// Flags layered on top of `config.ron`; anything left unset keeps the file's value.
#[derive(Parser, Debug, Default)]
#[command(name = "horizon", about = "Raymarched black hole, AGN and lighthouse viewer")]
pub struct CliArgs {
    #[arg(long)]
    pub width: Option<u32>,

    #[arg(long)]
    pub height: Option<u32>,

    #[arg(long)]
    pub fullscreen: Option<bool>,

    /// Scene shown first: black-hole, agn or far-away.
    #[arg(long, value_name = "MODE")]
    pub mode: Option<SceneMode>,

    /// Animation speed multiplier; 0 holds the first frame.
    #[arg(long)]
    pub time_scale: Option<f64>,

    /// Start with the animation clock frozen.
    #[arg(long)]
    pub paused: bool,

    /// Level or filter directives, as in `RUST_LOG`.
    #[arg(long)]
    pub log_level: Option<String>,

    /// Directory holding `config.ron` and `logs/`.
    #[arg(long, value_name = "DIR")]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Layers `args` over this config. Call [`Config::validate`] afterwards.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        let window = &mut self.window;
        window.width = args.width.unwrap_or(window.width);
        window.height = args.height.unwrap_or(window.height);
        window.fullscreen = args.fullscreen.unwrap_or(window.fullscreen);

        let scene = &mut self.scene;
        scene.initial_mode = args.mode.unwrap_or(scene.initial_mode);
        scene.time_scale = args.time_scale.unwrap_or(scene.time_scale);
        scene.paused |= args.paused;

        if let Some(level) = &args.log_level {
            self.debug.log_level.clone_from(level);
        }
    }
}
