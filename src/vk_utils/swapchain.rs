use log::trace;

use ash::extensions::khr::{Surface, Swapchain};
use ash::vk;
use raw_window_handle::{HasRawDisplayHandle, HasRawWindowHandle};

use crate::app_error::{AppError, AppResult};
use crate::vk_utils::create_image_view;

/*
// https://github.com/zeux/niagara/blob/master/src/swapchain.cpp#L78
struct Swapchain
{
  VkSwapchainKHR swapchain;

  std::vector<VkImage> images;

  uint32_t width, height;
  uint32_t imageCount;
};
*/

/// Gets surface from OS window
pub fn create_surface_khr(
  entry: &ash::Entry,
  instance: &ash::Instance,
  window: &winit::window::Window,
) -> AppResult<vk::SurfaceKHR> {
  let surface_khr = unsafe {
    ash_window::create_surface(
      entry,
      instance,
      window.raw_display_handle(),
      window.raw_window_handle(),
      None,
    )
    .map_err(AppError::vk_err("vkCreateSurfaceKHR"))?
  };
  trace!("Surface created");
  Ok(surface_khr)
}

pub fn get_surface_formats(
  surface_loader: &Surface,
  surface_khr: vk::SurfaceKHR,
  phys_device: vk::PhysicalDevice,
) -> AppResult<Vec<vk::SurfaceFormatKHR>> {
  unsafe {
    surface_loader
      .get_physical_device_surface_formats(phys_device, surface_khr)
      .map_err(AppError::vk_err("vkGetPhysicalDeviceSurfaceFormatsKHR"))
  }
}

pub fn get_present_modes(
  surface_loader: &Surface,
  surface_khr: vk::SurfaceKHR,
  phys_device: vk::PhysicalDevice,
) -> AppResult<Vec<vk::PresentModeKHR>> {
  unsafe {
    surface_loader
      .get_physical_device_surface_present_modes(phys_device, surface_khr)
      .map_err(AppError::vk_err("vkGetPhysicalDeviceSurfacePresentModesKHR"))
  }
}

pub fn get_surface_capabilities(
  phys_device: vk::PhysicalDevice,
  surface_loader: &Surface,
  surface_khr: vk::SurfaceKHR,
) -> AppResult<vk::SurfaceCapabilitiesKHR> {
  let surface_capabilities = unsafe {
    surface_loader
      .get_physical_device_surface_capabilities(phys_device, surface_khr)
      .map_err(AppError::vk_err("vkGetPhysicalDeviceSurfaceCapabilitiesKHR"))?
  };
  trace!("Surface_capabilities {:?}", surface_capabilities);
  Ok(surface_capabilities)
}

/// https://registry.khronos.org/vulkan/specs/1.3-extensions/man/html/VkSurfaceFormatKHR.html
///
/// Prefer B8G8R8A8_UNORM + SRGB_NONLINEAR. A single UNDEFINED entry means
/// the surface has no preference at all.
pub fn choose_surface_format(formats: &[vk::SurfaceFormatKHR]) -> Option<vk::SurfaceFormatKHR> {
  let preferred = vk::SurfaceFormatKHR {
    format: vk::Format::B8G8R8A8_UNORM,
    color_space: vk::ColorSpaceKHR::SRGB_NONLINEAR,
  };

  match formats {
    [] => None,
    [only] if only.format == vk::Format::UNDEFINED => Some(preferred),
    _ => formats
      .iter()
      .find(|f| f.format == preferred.format && f.color_space == preferred.color_space)
      .or_else(|| formats.first())
      .copied(),
  }
}

/// https://registry.khronos.org/vulkan/specs/1.3-extensions/man/html/VkPresentModeKHR.html
/// https://github.com/EmbarkStudios/kajiya/blob/main/crates/lib/kajiya-backend/src/vulkan/swapchain.rs#L85
pub fn choose_present_mode(present_modes: &[vk::PresentModeKHR], vsync: bool) -> vk::PresentModeKHR {
  let present_mode_preference: &[vk::PresentModeKHR] = if vsync {
    &[]
  } else {
    &[vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::IMMEDIATE]
  };

  present_mode_preference
    .iter()
    .copied()
    .find(|mode| present_modes.contains(mode))
    .unwrap_or(vk::PresentModeKHR::FIFO) // FIFO is guaranteed
}

/// One more than the minimum, so we do not have to wait on the driver
/// before acquiring. `max_image_count == 0` means no upper limit.
pub fn choose_image_count(capabilities: &vk::SurfaceCapabilitiesKHR) -> u32 {
  let image_count = capabilities.min_image_count + 1;
  if capabilities.max_image_count > 0 {
    image_count.min(capabilities.max_image_count)
  } else {
    image_count
  }
}

/// Surface decides, unless it reports `u32::MAX` which means we pick
/// (within the allowed range).
pub fn choose_extent(
  capabilities: &vk::SurfaceCapabilitiesKHR,
  window_size: &vk::Extent2D,
) -> vk::Extent2D {
  if capabilities.current_extent.width != u32::MAX {
    return capabilities.current_extent;
  }

  let min = capabilities.min_image_extent;
  let max = capabilities.max_image_extent;
  vk::Extent2D {
    width: window_size.width.clamp(min.width, max.width.max(min.width)),
    height: window_size.height.clamp(min.height, max.height.max(min.height)),
  }
}

fn get_pre_transform(
  surface_capabilities: &vk::SurfaceCapabilitiesKHR,
) -> vk::SurfaceTransformFlagsKHR {
  let can_identity = surface_capabilities
    .supported_transforms
    .contains(vk::SurfaceTransformFlagsKHR::IDENTITY);
  if can_identity {
    vk::SurfaceTransformFlagsKHR::IDENTITY
  } else {
    surface_capabilities.current_transform
  }
}

pub struct SwapchainCreateParams<'a> {
  pub surface_khr: vk::SurfaceKHR,
  pub surface_format: &'a vk::SurfaceFormatKHR,
  pub capabilities: &'a vk::SurfaceCapabilitiesKHR,
  pub size: &'a vk::Extent2D,
  pub queue_family_idx: u32,
  pub present_mode: vk::PresentModeKHR,
}

/// Creates OS-dependent swapchain
pub fn create_swapchain_khr(
  swapchain_loader: &Swapchain,
  params: &SwapchainCreateParams,
) -> AppResult<vk::SwapchainKHR> {
  let image_count = choose_image_count(params.capabilities);
  let queue_family_indices = [params.queue_family_idx];

  let create_info = vk::SwapchainCreateInfoKHR::builder()
    .surface(params.surface_khr)
    .min_image_count(image_count)
    .image_format(params.surface_format.format)
    .image_color_space(params.surface_format.color_space)
    .image_extent(*params.size)
    .image_array_layers(1)
    .image_usage(vk::ImageUsageFlags::COLOR_ATTACHMENT)
    .image_sharing_mode(vk::SharingMode::EXCLUSIVE)
    .queue_family_indices(&queue_family_indices)
    .present_mode(params.present_mode)
    .composite_alpha(vk::CompositeAlphaFlagsKHR::OPAQUE)
    .pre_transform(get_pre_transform(params.capabilities))
    .clipped(true)
    .old_swapchain(vk::SwapchainKHR::null())
    .build();

  let swapchain = unsafe {
    swapchain_loader
      .create_swapchain(&create_info, None)
      .map_err(AppError::vk_err("vkCreateSwapchainKHR"))?
  };
  trace!(
    "Swapchain created (min {} images, {:?})",
    image_count,
    params.present_mode
  );
  Ok(swapchain)
}

/// Images are owned by the swapchain, only the views have to be destroyed.
/// On error, views created so far are destroyed.
pub fn create_swapchain_images(
  swapchain_loader: &Swapchain,
  swapchain: vk::SwapchainKHR,
  device: &ash::Device,
  image_format: vk::Format,
) -> AppResult<(Vec<vk::Image>, Vec<vk::ImageView>)> {
  let swapchain_images = unsafe {
    swapchain_loader
      .get_swapchain_images(swapchain)
      .map_err(AppError::vk_err("vkGetSwapchainImagesKHR"))?
  };
  trace!("Will create {} swapchain images", swapchain_images.len());

  let mut image_views = Vec::with_capacity(swapchain_images.len());
  for &image in &swapchain_images {
    match create_image_view(device, image, image_format, vk::ImageAspectFlags::COLOR) {
      Ok(view) => image_views.push(view),
      Err(e) => {
        for &view in &image_views {
          unsafe { device.destroy_image_view(view, None) };
        }
        return Err(e);
      }
    }
  }

  trace!("Swapchain images created");
  Ok((swapchain_images, image_views))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn fmt(format: vk::Format, color_space: vk::ColorSpaceKHR) -> vk::SurfaceFormatKHR {
    vk::SurfaceFormatKHR {
      format,
      color_space,
    }
  }

  fn capabilities(min: u32, max: u32) -> vk::SurfaceCapabilitiesKHR {
    vk::SurfaceCapabilitiesKHR {
      min_image_count: min,
      max_image_count: max,
      ..Default::default()
    }
  }

  #[test]
  fn surface_format_prefers_bgra_srgb() {
    let formats = [
      fmt(vk::Format::R8G8B8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
      fmt(vk::Format::B8G8R8A8_UNORM, vk::ColorSpaceKHR::SRGB_NONLINEAR),
    ];
    let chosen = choose_surface_format(&formats).unwrap();
    assert_eq!(chosen.format, vk::Format::B8G8R8A8_UNORM);
    assert_eq!(chosen.color_space, vk::ColorSpaceKHR::SRGB_NONLINEAR);
  }

  #[test]
  fn surface_format_undefined_means_anything() {
    let formats = [fmt(vk::Format::UNDEFINED, vk::ColorSpaceKHR::SRGB_NONLINEAR)];
    let chosen = choose_surface_format(&formats).unwrap();
    assert_eq!(chosen.format, vk::Format::B8G8R8A8_UNORM);
  }

  #[test]
  fn surface_format_falls_back_to_first() {
    let formats = [
      fmt(vk::Format::R8G8B8A8_SRGB, vk::ColorSpaceKHR::SRGB_NONLINEAR),
      fmt(vk::Format::A2B10G10R10_UNORM_PACK32, vk::ColorSpaceKHR::SRGB_NONLINEAR),
    ];
    let chosen = choose_surface_format(&formats).unwrap();
    assert_eq!(chosen.format, vk::Format::R8G8B8A8_SRGB);
  }

  #[test]
  fn surface_format_none_when_empty() {
    assert!(choose_surface_format(&[]).is_none());
  }

  #[test]
  fn present_mode_vsync_is_fifo() {
    let modes = [vk::PresentModeKHR::MAILBOX, vk::PresentModeKHR::FIFO];
    assert_eq!(choose_present_mode(&modes, true), vk::PresentModeKHR::FIFO);
  }

  #[test]
  fn present_mode_no_vsync_preference() {
    let all = [
      vk::PresentModeKHR::FIFO,
      vk::PresentModeKHR::IMMEDIATE,
      vk::PresentModeKHR::MAILBOX,
    ];
    assert_eq!(choose_present_mode(&all, false), vk::PresentModeKHR::MAILBOX);

    let no_mailbox = [vk::PresentModeKHR::FIFO, vk::PresentModeKHR::IMMEDIATE];
    assert_eq!(
      choose_present_mode(&no_mailbox, false),
      vk::PresentModeKHR::IMMEDIATE
    );

    let fifo_only = [vk::PresentModeKHR::FIFO];
    assert_eq!(choose_present_mode(&fifo_only, false), vk::PresentModeKHR::FIFO);
  }

  #[test]
  fn image_count_one_above_min() {
    assert_eq!(choose_image_count(&capabilities(2, 8)), 3);
  }

  #[test]
  fn image_count_clamped_to_max() {
    assert_eq!(choose_image_count(&capabilities(3, 3)), 3);
  }

  #[test]
  fn image_count_unbounded() {
    assert_eq!(choose_image_count(&capabilities(2, 0)), 3);
  }

  #[test]
  fn extent_from_surface() {
    let caps = vk::SurfaceCapabilitiesKHR {
      current_extent: vk::Extent2D {
        width: 1024,
        height: 768,
      },
      ..Default::default()
    };
    let window = vk::Extent2D {
      width: 800,
      height: 600,
    };
    let extent = choose_extent(&caps, &window);
    assert_eq!((extent.width, extent.height), (1024, 768));
  }

  #[test]
  fn extent_from_window_when_surface_undecided() {
    let caps = vk::SurfaceCapabilitiesKHR {
      current_extent: vk::Extent2D {
        width: u32::MAX,
        height: u32::MAX,
      },
      min_image_extent: vk::Extent2D {
        width: 1,
        height: 1,
      },
      max_image_extent: vk::Extent2D {
        width: 640,
        height: 4096,
      },
      ..Default::default()
    };
    let window = vk::Extent2D {
      width: 800,
      height: 600,
    };
    let extent = choose_extent(&caps, &window);
    assert_eq!((extent.width, extent.height), (640, 600));
  }

  #[test]
  fn pre_transform_identity_when_supported() {
    let caps = vk::SurfaceCapabilitiesKHR {
      supported_transforms: vk::SurfaceTransformFlagsKHR::IDENTITY
        | vk::SurfaceTransformFlagsKHR::ROTATE_90,
      current_transform: vk::SurfaceTransformFlagsKHR::ROTATE_90,
      ..Default::default()
    };
    assert_eq!(
      get_pre_transform(&caps),
      vk::SurfaceTransformFlagsKHR::IDENTITY
    );

    let rotated_only = vk::SurfaceCapabilitiesKHR {
      supported_transforms: vk::SurfaceTransformFlagsKHR::ROTATE_90,
      current_transform: vk::SurfaceTransformFlagsKHR::ROTATE_90,
      ..Default::default()
    };
    assert_eq!(
      get_pre_transform(&rotated_only),
      vk::SurfaceTransformFlagsKHR::ROTATE_90
    );
  }
}
