use ash;
use ash::vk;

/// Render pass and one framebuffer per swapchain image.
pub struct VkCtxRenderPasses {
  pub device: ash::Device,
  pub render_pass_triangle: vk::RenderPass,
  pub framebuffers: Vec<vk::Framebuffer>,
}

impl Drop for VkCtxRenderPasses {
  fn drop(&mut self) {
    unsafe {
      for &framebuffer in &self.framebuffers {
        self.device.destroy_framebuffer(framebuffer, None);
      }
      self
        .device
        .destroy_render_pass(self.render_pass_triangle, None);
    }
  }
}
