use ash::vk;
use log::trace;

use crate::app_error::{AppError, AppResult};
use crate::vk_ctx::VkCtx;
use crate::vk_utils::create_semaphore;

use super::{FrameBackend, SyncPair};

impl FrameBackend for VkCtx {
  fn image_count(&self) -> usize {
    self.swapchain_images_count()
  }

  fn command_buffer(&self, image_index: u32) -> Option<vk::CommandBuffer> {
    self.cmd_buffer_for_image(image_index)
  }

  fn create_sync_pair(&mut self) -> AppResult<SyncPair> {
    let device = self.vk_device();
    let image_available = create_semaphore(device)?;
    let rendering_done = match create_semaphore(device) {
      Ok(s) => s,
      Err(e) => {
        unsafe { device.destroy_semaphore(image_available, None) };
        return Err(e);
      }
    };
    Ok(SyncPair {
      image_available,
      rendering_done,
    })
  }

  fn destroy_sync_pair(&mut self, sync: SyncPair) {
    let device = self.vk_device();
    unsafe {
      device.destroy_semaphore(sync.image_available, None);
      device.destroy_semaphore(sync.rendering_done, None);
    }
  }

  fn acquire_next_image(&mut self, timeout_ns: u64, signal: vk::Semaphore) -> AppResult<u32> {
    let swapchain = &self.swapchain;
    let (image_index, suboptimal) = unsafe {
      swapchain
        .swapchain_loader
        .acquire_next_image(swapchain.swapchain, timeout_ns, signal, vk::Fence::null())
        .map_err(AppError::vk_err("vkAcquireNextImageKHR"))?
    };
    if suboptimal {
      trace!("Swapchain is suboptimal for the surface (acquire)");
    }
    Ok(image_index)
  }

  fn submit(
    &mut self,
    command_buffer: vk::CommandBuffer,
    wait: vk::Semaphore,
    wait_stage: vk::PipelineStageFlags,
    signal: vk::Semaphore,
  ) -> AppResult<()> {
    let wait_semaphores = [wait];
    let wait_stages = [wait_stage];
    let command_buffers = [command_buffer];
    let signal_semaphores = [signal];
    let submit_info = vk::SubmitInfo::builder()
      .wait_semaphores(&wait_semaphores)
      .wait_dst_stage_mask(&wait_stages)
      .command_buffers(&command_buffers)
      .signal_semaphores(&signal_semaphores)
      .build();
    let submits = [submit_info];

    unsafe {
      self
        .vk_device()
        .queue_submit(self.device.queue, &submits, vk::Fence::null())
        .map_err(AppError::vk_err("vkQueueSubmit"))
    }
  }

  fn present(&mut self, image_index: u32, wait: vk::Semaphore) -> AppResult<()> {
    let swapchain = &self.swapchain;
    let wait_semaphores = [wait];
    let swapchains = [swapchain.swapchain];
    let image_indices = [image_index];
    let present_info = vk::PresentInfoKHR::builder()
      .wait_semaphores(&wait_semaphores)
      .swapchains(&swapchains)
      .image_indices(&image_indices)
      .build();

    let suboptimal = unsafe {
      swapchain
        .swapchain_loader
        .queue_present(self.device.queue, &present_info)
        .map_err(AppError::vk_err("vkQueuePresentKHR"))?
    };
    if suboptimal {
      trace!("Swapchain is suboptimal for the surface (present)");
    }
    Ok(())
  }

  fn wait_idle(&mut self) -> AppResult<()> {
    unsafe {
      self
        .vk_device()
        .device_wait_idle()
        .map_err(AppError::vk_err("vkDeviceWaitIdle"))
    }
  }
}
