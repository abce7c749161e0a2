use ash;
use ash::extensions::khr::Surface;
use ash::vk;
use log::trace;

/// Entry must outlive the instance, so it is declared (and dropped) after it.
pub struct VkCtxInstance {
  pub instance: ash::Instance,
  pub entry: ash::Entry,
}

impl Drop for VkCtxInstance {
  fn drop(&mut self) {
    trace!("Destroying instance");
    unsafe {
      self.instance.destroy_instance(None);
    }
  }
}

pub struct VkCtxSurface {
  pub surface_loader: Surface,
  pub surface_khr: vk::SurfaceKHR,
}

impl Drop for VkCtxSurface {
  fn drop(&mut self) {
    trace!("Destroying surface");
    unsafe {
      self.surface_loader.destroy_surface(self.surface_khr, None);
    }
  }
}

pub struct VkCtxDevice {
  pub phys_device: vk::PhysicalDevice,
  pub queue_family_index: u32,
  pub device: ash::Device,
  pub queue: vk::Queue,
}

impl Drop for VkCtxDevice {
  fn drop(&mut self) {
    trace!("Destroying logical device");
    unsafe {
      self.device.destroy_device(None);
    }
  }
}
