use log::{error, info};

use ash;
use ash::vk;

use super::*;

/** Kitchen sink for Vulkan stuff.
 *
 * Fields are dropped top to bottom, which is the reverse of creation order.
 * Semaphores are not here, they are owned by `FramePresenter` which
 * borrows this struct and so is always gone first.
 */
pub struct VkCtx {
  pub command_buffers: VkCtxCommandBuffers,
  pub pipelines: VkCtxPipelines,
  pub render_passes: VkCtxRenderPasses,
  pub swapchain: VkCtxSwapchain,
  pub device: VkCtxDevice,
  pub surface: VkCtxSurface,
  pub instance: VkCtxInstance,
}

impl VkCtx {
  pub fn vk_device(&self) -> &ash::Device {
    &self.device.device
  }

  pub fn swapchain_images_count(&self) -> usize {
    self.swapchain.image_count()
  }

  pub fn cmd_buffer_for_image(&self, image_index: u32) -> Option<vk::CommandBuffer> {
    self
      .command_buffers
      .cmd_buffers
      .get(image_index as usize)
      .copied()
  }
}

impl Drop for VkCtx {
  fn drop(&mut self) {
    info!("VkCtx::drop()");
    let result = unsafe { self.device.device.device_wait_idle() };
    if let Err(e) = result {
      error!("vkDeviceWaitIdle failed before destroy: {:?}", e);
    }
    // fields are destroyed after this
  }
}
