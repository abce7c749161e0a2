use std::process::ExitCode;

use log::{error, info, warn};

use crate::app_error::AppResult;
use crate::app_window::AppWindow;
use crate::config::Config;
use crate::renderer::FramePresenter;
use crate::vk_ctx::vk_ctx_initialize;

mod app_error;
mod app_input;
mod app_timer;
mod app_window;
mod config;
mod renderer;
mod utils;
mod vk_ctx;
mod vk_utils;

// glslangValidator -V shaders/triangle.vert -o vert.spv
// glslangValidator -V shaders/triangle.frag -o frag.spv
// spirv-dis vert.spv

fn init_logger(config: &Config) -> AppResult<()> {
  simple_logger::SimpleLogger::new()
    .with_level(config.log_level)
    .init()?;
  log::set_max_level(config.log_level);
  Ok(())
}

/// Returns number of presented frames
fn run(config: &Config) -> AppResult<u64> {
  // init window
  let mut app_window = AppWindow::new(config)?;

  // init renderer
  let mut vk_ctx = vk_ctx_initialize(app_window.window(), config)?;
  info!("Render init went OK!");

  // start render loop
  info!("Starting render loop");
  let mut presenter = FramePresenter::new(&mut vk_ctx, config.frames_in_flight)?
    .with_stats_interval(config.stats_interval_frames);
  let max_frames = config.max_frames();

  presenter.run_until(|frames| {
    app_window.poll_close_requested() || max_frames.map_or(false, |max| frames >= max)
  })?;

  let presented = presenter.frame_count();
  info!("Render loop finished after {} frames", presented);
  presenter.destroy()?;
  Ok(presented)
}

fn main() -> ExitCode {
  let config = Config::new();
  if let Err(e) = init_logger(&config) {
    eprintln!("{}", e);
    return ExitCode::FAILURE;
  }
  info!("-- Start --");

  match run(&config) {
    Ok(_) => {
      info!("-- End --");
      ExitCode::SUCCESS
    }
    Err(e) if e.is_recoverable() => {
      warn!("Stopped rendering: {}", e);
      ExitCode::FAILURE
    }
    Err(e) => {
      error!("{}", e);
      ExitCode::FAILURE
    }
  }
}
