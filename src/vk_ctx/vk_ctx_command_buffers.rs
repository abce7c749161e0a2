use ash;
use ash::vk;

pub struct VkCtxCommandBuffers {
  pub device: ash::Device,
  pub pool: vk::CommandPool,
  // one per each swapchain image, recorded once during init:
  pub cmd_buffers: Vec<vk::CommandBuffer>,
}

impl Drop for VkCtxCommandBuffers {
  /// Also frees `cmd_buffers`
  fn drop(&mut self) {
    unsafe {
      self.device.destroy_command_pool(self.pool, None);
    }
  }
}
