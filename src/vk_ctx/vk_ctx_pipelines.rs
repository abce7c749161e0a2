use ash;
use ash::vk;

pub struct VkCtxPipelines {
  pub device: ash::Device,
  // app specific:
  pub pipeline_triangle: vk::Pipeline,
  pub pipeline_triangle_layout: vk::PipelineLayout,
}

impl Drop for VkCtxPipelines {
  fn drop(&mut self) {
    unsafe {
      self.device.destroy_pipeline(self.pipeline_triangle, None);
      self
        .device
        .destroy_pipeline_layout(self.pipeline_triangle_layout, None);
    }
  }
}
