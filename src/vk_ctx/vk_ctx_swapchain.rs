use ash;
use ash::extensions::khr::Swapchain;
use ash::vk;
use log::trace;

pub struct VkCtxSwapchain {
  pub device: ash::Device,
  pub swapchain_loader: Swapchain,
  pub swapchain: vk::SwapchainKHR,
  pub size: vk::Extent2D,
  pub surface_format: vk::SurfaceFormatKHR,

  // All fields below have one entry per swapchain image
  pub image_views: Vec<vk::ImageView>,
  pub images: Vec<vk::Image>,
}

impl VkCtxSwapchain {
  pub fn image_count(&self) -> usize {
    self.images.len()
  }
}

/// Will also destroy images. From validation layers:
/// VK_OBJECT_TYPE_IMAGE; is a presentable image and it is controlled by the implementation and is destroyed with vkDestroySwapchainKHR.
impl Drop for VkCtxSwapchain {
  fn drop(&mut self) {
    trace!("Destroying {} swapchain image views", self.image_views.len());
    unsafe {
      for &image_view in &self.image_views {
        self.device.destroy_image_view(image_view, None);
      }

      self
        .swapchain_loader
        .destroy_swapchain(self.swapchain, None);
    }
  }
}
