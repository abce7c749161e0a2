use std::path::PathBuf;

use ash::vk;
use glam::Vec3;
use log::LevelFilter;

use crate::utils::color_hex_to_vec;

pub struct Config {
  /// stop after first frame to read init logs
  pub only_first_frame: bool,
  /// dump properties of every physical device during init
  pub print_device_stats: bool,
  pub log_level: LevelFilter,
  /// log fps every _this many_ frames
  pub stats_interval_frames: u64,
  // window
  pub window_title: String,
  pub window_width: f64,
  pub window_height: f64,
  // rendering
  pub clear_color: Vec3,
  pub vsync: bool,
  /// Number of (image_available, rendering_done) semaphore pairs the render loop cycles through.
  /// `1` means a single pair reused every frame.
  /// There are no fences, so a pair can come back round while the GPU still has a
  /// pending wait on its `image_available`. Reusing it then breaks the
  /// `vkAcquireNextImageKHR` rule (semaphore must have no pending operations),
  /// for `1` and for bigger values alike. More pairs do not buy more frames in flight.
  pub frames_in_flight: usize,
  // shaders, relative to working directory
  pub vertex_shader_path: PathBuf,
  pub fragment_shader_path: PathBuf,
}

impl Config {
  const ONLY_FIRST_FRAME: bool = false;

  pub fn new() -> Config {
    let clear_col: u8 = 51;

    Config {
      only_first_frame: Self::ONLY_FIRST_FRAME,
      print_device_stats: true,
      log_level: LevelFilter::Info,
      stats_interval_frames: 600,
      // window
      window_title: String::from("VulkanHelloWorld"),
      window_width: 800f64,
      window_height: 600f64,
      // rendering
      clear_color: color_hex_to_vec(clear_col, clear_col, clear_col),
      vsync: true,
      frames_in_flight: 1,
      // shaders
      vertex_shader_path: PathBuf::from("./vert.spv"),
      fragment_shader_path: PathBuf::from("./frag.spv"),
    }
  }

  pub fn window_size(&self) -> vk::Extent2D {
    vk::Extent2D {
      width: self.window_width as u32,
      height: self.window_height as u32,
    }
  }

  pub fn clear_color(&self) -> vk::ClearValue {
    let cc = self.clear_color;
    vk::ClearValue {
      color: vk::ClearColorValue {
        float32: [cc[0], cc[1], cc[2], 1f32],
      },
    }
  }

  /// Frame limit for `FramePresenter::run_until`, `None` means "until window closes".
  pub fn max_frames(&self) -> Option<u64> {
    if self.only_first_frame {
      Some(1)
    } else {
      None
    }
  }
}
