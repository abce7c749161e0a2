use std::path::PathBuf;

use ash::vk;
use thiserror::Error;

/// Everything that can go wrong between opening the window and presenting a frame.
#[derive(Error, Debug)]
pub enum AppError {
  /// Non-success code from a Vulkan call that we have no way to recover from.
  #[error("{call} failed: {result:?}")]
  Vulkan {
    call: &'static str,
    result: vk::Result,
  },

  /// Swapchain no longer matches the surface (e.g. window was resized).
  #[error("{call}: swapchain is out of date")]
  SwapchainOutOfDate { call: &'static str },

  /// Surface was destroyed under us (e.g. window closed by the OS).
  #[error("{call}: surface lost")]
  SurfaceLost { call: &'static str },

  #[error("Failed to load Vulkan library: {0}")]
  Loading(#[from] ash::LoadingError),

  /// Presentation engine handed us an image we never created a frame slot for.
  #[error("Acquired swapchain image {index}, but there are only {image_count} images")]
  InvalidImageIndex { index: u32, image_count: usize },

  #[error("No physical device can render and present to this window")]
  NoSuitableDevice,

  #[error("Surface does not report any usable format")]
  NoSurfaceFormat,

  #[error("Could not read shader '{path}': {source}")]
  ShaderIo {
    path: PathBuf,
    source: std::io::Error,
  },

  #[error("Shader '{path}' is not SPIR-V: {reason}")]
  ShaderInvalid { path: PathBuf, reason: &'static str },

  #[error("Window creation failed: {0}")]
  Window(#[from] winit::error::OsError),

  #[error("Logger init failed: {0}")]
  Logger(#[from] log::SetLoggerError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
  /// Classify a raw `vk::Result` returned from `call`.
  pub fn vk(call: &'static str, result: vk::Result) -> Self {
    match result {
      vk::Result::ERROR_OUT_OF_DATE_KHR => AppError::SwapchainOutOfDate { call },
      vk::Result::ERROR_SURFACE_LOST_KHR => AppError::SurfaceLost { call },
      _ => AppError::Vulkan { call, result },
    }
  }

  /// Helper for `.map_err(AppError::vk_err("vkFoo"))`
  pub fn vk_err(call: &'static str) -> impl Fn(vk::Result) -> Self {
    move |result| AppError::vk(call, result)
  }

  /// Recoverable means "recreate the swapchain and carry on". We do not do that,
  /// but the caller decides how loud to be about it.
  pub fn is_recoverable(&self) -> bool {
    matches!(
      self,
      AppError::SwapchainOutOfDate { .. } | AppError::SurfaceLost { .. }
    )
  }
}
