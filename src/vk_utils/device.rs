use log::{info, trace};
use std::ffi::CStr;

use ash::extensions::khr::{Surface, Swapchain};
use ash::vk;
use raw_window_handle::RawDisplayHandle;

use crate::app_error::{AppError, AppResult};
use crate::utils::vk_str;

fn app_name() -> &'static CStr {
  unsafe { CStr::from_bytes_with_nul_unchecked(b"VulkanHelloWorld\0") }
}

fn engine_name() -> &'static CStr {
  unsafe { CStr::from_bytes_with_nul_unchecked(b"Vulkan Engine\0") }
}

/// Vulkan 1.0 instance with only the extensions needed to present to this display.
/// No layers.
pub fn create_instance(display_handle: RawDisplayHandle) -> AppResult<(ash::Entry, ash::Instance)> {
  let entry = unsafe { ash::Entry::load()? };

  let app_info = vk::ApplicationInfo::builder()
    .application_name(app_name())
    .application_version(vk::make_api_version(0, 0, 0, 0))
    .engine_name(engine_name())
    .engine_version(vk::make_api_version(0, 0, 0, 0))
    .api_version(vk::API_VERSION_1_0)
    .build();

  let extension_names_raw = ash_window::enumerate_required_extensions(display_handle)
    .map_err(AppError::vk_err("vkEnumerateInstanceExtensionProperties"))?;
  trace!("Instance extensions: {}", extension_names_raw.len());

  let create_info = vk::InstanceCreateInfo::builder()
    .application_info(&app_info)
    .enabled_extension_names(extension_names_raw)
    .build();

  let instance: ash::Instance = unsafe {
    entry
      .create_instance(&create_info, None)
      .map_err(AppError::vk_err("vkCreateInstance"))?
  };

  trace!("Ash instance created");
  Ok((entry, instance))
}

pub fn enumerate_physical_devices(instance: &ash::Instance) -> AppResult<Vec<vk::PhysicalDevice>> {
  let phys_devices = unsafe {
    instance
      .enumerate_physical_devices()
      .map_err(AppError::vk_err("vkEnumeratePhysicalDevices"))?
  };
  trace!("Found {} physical devices", phys_devices.len());
  Ok(phys_devices)
}

/// First queue family that can both draw and present to `surface_khr`.
fn find_queue_family(
  instance: &ash::Instance,
  surface_loader: &Surface,
  surface_khr: vk::SurfaceKHR,
  phys_device: vk::PhysicalDevice,
) -> AppResult<Option<u32>> {
  let q_props = unsafe { instance.get_physical_device_queue_family_properties(phys_device) };

  for (index, q) in q_props.iter().enumerate() {
    let index = index as u32;
    if q.queue_count == 0 || !q.queue_flags.contains(vk::QueueFlags::GRAPHICS) {
      continue;
    }

    let is_present_support = unsafe {
      surface_loader
        .get_physical_device_surface_support(phys_device, index, surface_khr)
        .map_err(AppError::vk_err("vkGetPhysicalDeviceSurfaceSupportKHR"))?
    };
    if is_present_support {
      return Ok(Some(index));
    }
  }

  Ok(None)
}

/// Picks first physical device that has a graphic queue family able to present
/// to our surface. No scoring, no feature checks.
pub fn pick_physical_device_and_queue_family_idx(
  instance: &ash::Instance,
  phys_devices: &[vk::PhysicalDevice],
  surface_loader: &Surface,
  surface_khr: vk::SurfaceKHR,
) -> AppResult<(vk::PhysicalDevice, u32)> {
  for &phys_device in phys_devices {
    if let Some(idx) = find_queue_family(instance, surface_loader, surface_khr, phys_device)? {
      let props = unsafe { instance.get_physical_device_properties(phys_device) };
      info!(
        "Using physical device: {:?} (queue family #{})",
        vk_str(&props.device_name),
        idx
      );
      return Ok((phys_device, idx));
    }
  }

  Err(AppError::NoSuitableDevice)
}

/// Logical device with one queue and swapchain extension, no optional features.
pub fn pick_device_and_queue(
  instance: &ash::Instance,
  phys_device: vk::PhysicalDevice,
  queue_family_index: u32,
) -> AppResult<(ash::Device, vk::Queue)> {
  trace!("Will pick logical device");
  let queue_prio = [1.0f32]; // only one queue
  let queue_create_infos = [vk::DeviceQueueCreateInfo::builder()
    .queue_family_index(queue_family_index)
    .queue_priorities(&queue_prio)
    .build()];

  let device_extension_names_raw = [Swapchain::name().as_ptr()];
  let features = vk::PhysicalDeviceFeatures::default();

  let device_create_info = vk::DeviceCreateInfo::builder()
    .queue_create_infos(&queue_create_infos)
    .enabled_extension_names(&device_extension_names_raw)
    .enabled_features(&features)
    .build();

  let device: ash::Device = unsafe {
    instance
      .create_device(phys_device, &device_create_info, None)
      .map_err(AppError::vk_err("vkCreateDevice"))?
  };
  trace!("Logical device created");

  let queue = unsafe { device.get_device_queue(queue_family_index, 0) }; // only one queue created above
  trace!("Queue on logical device selected");

  Ok((device, queue))
}
