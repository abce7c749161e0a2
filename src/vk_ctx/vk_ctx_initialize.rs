use log::{info, trace};

use ash;
use ash::extensions::khr::{Surface, Swapchain};
use ash::vk;
use raw_window_handle::HasRawDisplayHandle;

use crate::app_error::{AppError, AppResult};
use crate::config::Config;
use crate::vk_ctx::vk_ctx::VkCtx;
use crate::vk_ctx::vk_ctx_command_buffers::VkCtxCommandBuffers;
use crate::vk_ctx::vk_ctx_device::{VkCtxDevice, VkCtxInstance, VkCtxSurface};
use crate::vk_ctx::vk_ctx_pipelines::VkCtxPipelines;
use crate::vk_ctx::vk_ctx_render_passes::VkCtxRenderPasses;
use crate::vk_ctx::vk_ctx_swapchain::VkCtxSwapchain;

use crate::vk_utils::*;

fn get_window_size(window: &winit::window::Window) -> vk::Extent2D {
  let size = window.inner_size();
  vk::Extent2D {
    width: size.width,
    height: size.height,
  }
}

fn create_swapchain(
  instance: &ash::Instance,
  device: &VkCtxDevice,
  surface: &VkCtxSurface,
  window_size: &vk::Extent2D,
  vsync: bool,
) -> AppResult<VkCtxSwapchain> {
  let phys_device = device.phys_device;
  let surface_loader = &surface.surface_loader;
  let surface_khr = surface.surface_khr;

  // swapchain - prepare
  let formats = get_surface_formats(surface_loader, surface_khr, phys_device)?;
  let surface_format = choose_surface_format(&formats).ok_or(AppError::NoSurfaceFormat)?;
  let present_modes = get_present_modes(surface_loader, surface_khr, phys_device)?;
  let present_mode = choose_present_mode(&present_modes, vsync);
  let capabilities = get_surface_capabilities(phys_device, surface_loader, surface_khr)?;
  let size = choose_extent(&capabilities, window_size);
  trace!(
    "Swapchain: {:?}, {:?}, size {:?}",
    surface_format,
    present_mode,
    size
  );

  // swapchain
  let swapchain_loader = Swapchain::new(instance, &device.device);
  let swapchain = create_swapchain_khr(
    &swapchain_loader,
    &SwapchainCreateParams {
      surface_khr,
      surface_format: &surface_format,
      capabilities: &capabilities,
      size: &size,
      queue_family_idx: device.queue_family_index,
      present_mode,
    },
  )?;
  let images = create_swapchain_images(
    &swapchain_loader,
    swapchain,
    &device.device,
    surface_format.format,
  );
  let (images, image_views) = match images {
    Ok(r) => r,
    Err(e) => {
      unsafe { swapchain_loader.destroy_swapchain(swapchain, None) };
      return Err(e);
    }
  };
  info!("Swapchain has {} images", images.len());

  Ok(VkCtxSwapchain {
    device: device.device.clone(),
    swapchain_loader,
    swapchain,
    size,
    surface_format,
    image_views,
    images,
  })
}

fn create_pipelines(
  device: &ash::Device,
  render_pass: vk::RenderPass,
  size: &vk::Extent2D,
  config: &Config,
) -> AppResult<VkCtxPipelines> {
  let layout = create_pipeline_layout(device)?;
  let shaders = TriangleShaders {
    vertex: &config.vertex_shader_path,
    fragment: &config.fragment_shader_path,
  };
  match create_triangle_pipeline(device, render_pass, layout, size, shaders) {
    Ok(pipeline) => Ok(VkCtxPipelines {
      device: device.clone(),
      pipeline_triangle: pipeline,
      pipeline_triangle_layout: layout,
    }),
    Err(e) => {
      unsafe { device.destroy_pipeline_layout(layout, None) };
      Err(e)
    }
  }
}

fn create_command_buffers_per_image(
  device: &ash::Device,
  queue_family_index: u32,
  render_passes: &VkCtxRenderPasses,
  pipelines: &VkCtxPipelines,
  size: vk::Extent2D,
  clear_value: vk::ClearValue,
) -> AppResult<VkCtxCommandBuffers> {
  let pool = create_command_pool(device, queue_family_index)?;
  // from now on, the pool is released by `Drop` even if something below fails
  let mut command_buffers = VkCtxCommandBuffers {
    device: device.clone(),
    pool,
    cmd_buffers: Vec::new(),
  };
  command_buffers.cmd_buffers =
    create_command_buffers(device, pool, render_passes.framebuffers.len())?;

  let params = TriangleDrawParams {
    render_pass: render_passes.render_pass_triangle,
    pipeline: pipelines.pipeline_triangle,
    size,
    clear_value,
  };
  for (&cmd_buf, &framebuffer) in command_buffers
    .cmd_buffers
    .iter()
    .zip(render_passes.framebuffers.iter())
  {
    record_triangle_commands(device, cmd_buf, framebuffer, &params)?;
  }
  trace!(
    "Recorded {} command buffers",
    command_buffers.cmd_buffers.len()
  );

  Ok(command_buffers)
}

// https://github.com/MaikKlein/ash/blob/master/examples/src/lib.rs#L332
//
// Every step is wrapped as soon as it is created, so an error halfway through
// drops what was built so far in reverse order.
pub fn vk_ctx_initialize(window: &winit::window::Window, config: &Config) -> AppResult<VkCtx> {
  let (entry, instance) = create_instance(window.raw_display_handle())?;
  let instance = VkCtxInstance { instance, entry };
  let vk_instance = &instance.instance;

  // surface data
  let surface = VkCtxSurface {
    surface_loader: Surface::new(&instance.entry, vk_instance), // generic OS-independent thing
    surface_khr: create_surface_khr(&instance.entry, vk_instance, window)?, // real OS-backed thing
  };

  // devices
  let phys_devices = enumerate_physical_devices(vk_instance)?;
  if config.print_device_stats {
    log_physical_device_stats(vk_instance, &phys_devices);
  }
  let (phys_device, queue_family_index) = pick_physical_device_and_queue_family_idx(
    vk_instance,
    &phys_devices,
    &surface.surface_loader,
    surface.surface_khr,
  )?;
  let (device, queue) = pick_device_and_queue(vk_instance, phys_device, queue_family_index)?;
  let device = VkCtxDevice {
    phys_device,
    queue_family_index,
    device,
    queue,
  };
  let vk_device = &device.device;

  // swapchain
  let window_size = get_window_size(window);
  trace!("window_size {:?}", window_size);
  let swapchain = create_swapchain(vk_instance, &device, &surface, &window_size, config.vsync)?;
  let size = swapchain.size;

  ///////////////////////////////////////
  ///////////////////////////////////////
  // TRIANGLE SPECIFIC STUFF STARTS HERE

  // render pass + framebuffers
  let render_pass = create_render_pass(vk_device, swapchain.surface_format.format)?;
  let mut render_passes = VkCtxRenderPasses {
    device: vk_device.clone(),
    render_pass_triangle: render_pass,
    framebuffers: Vec::new(),
  };
  render_passes.framebuffers =
    create_framebuffers_with_one_attachment(vk_device, render_pass, &swapchain.image_views, &size)?;

  // pipeline
  let pipelines = create_pipelines(vk_device, render_pass, &size, config)?;

  // command buffers
  let command_buffers = create_command_buffers_per_image(
    vk_device,
    queue_family_index,
    &render_passes,
    &pipelines,
    size,
    config.clear_color(),
  )?;

  ///////////////////////////////////////
  ///////////////////////////////////////
  Ok(VkCtx {
    command_buffers,
    pipelines,
    render_passes,
    swapchain,
    device,
    surface,
    instance,
  })
}
