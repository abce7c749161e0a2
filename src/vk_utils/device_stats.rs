use std::fmt;

use ash::vk;
use log::info;

use crate::utils::vk_str;

/// Human readable dump of what a physical device can do.
/// Only for logging, nothing is decided based on this.
#[derive(Debug, Clone, PartialEq)]
pub struct PhysicalDeviceReport {
  pub name: String,
  pub api_version: (u32, u32, u32),
  pub driver_version: u32,
  pub vendor_id: u32,
  pub device_id: u32,
  pub device_type: vk::PhysicalDeviceType,
  /// needed for the queue priorities in `vk::DeviceQueueCreateInfo`
  pub discrete_queue_priorities: u32,
  pub geometry_shader: bool,
  pub memory_heap_count: u32,
  pub memory_type_count: u32,
  pub queue_families: Vec<QueueFamilyReport>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueueFamilyReport {
  pub graphics: bool,
  pub compute: bool,
  pub transfer: bool,
  pub sparse_binding: bool,
  pub queue_count: u32,
  pub timestamp_valid_bits: u32,
  pub min_image_transfer_granularity: vk::Extent3D,
}

impl QueueFamilyReport {
  pub fn new(props: &vk::QueueFamilyProperties) -> Self {
    let flags = props.queue_flags;
    Self {
      graphics: flags.contains(vk::QueueFlags::GRAPHICS),
      compute: flags.contains(vk::QueueFlags::COMPUTE),
      transfer: flags.contains(vk::QueueFlags::TRANSFER),
      sparse_binding: flags.contains(vk::QueueFlags::SPARSE_BINDING),
      queue_count: props.queue_count,
      timestamp_valid_bits: props.timestamp_valid_bits,
      min_image_transfer_granularity: props.min_image_transfer_granularity,
    }
  }
}

impl PhysicalDeviceReport {
  pub fn new(
    properties: &vk::PhysicalDeviceProperties,
    features: &vk::PhysicalDeviceFeatures,
    memory: &vk::PhysicalDeviceMemoryProperties,
    queue_families: &[vk::QueueFamilyProperties],
  ) -> Self {
    let api = properties.api_version;
    Self {
      name: vk_str(&properties.device_name).into_owned(),
      api_version: (
        vk::api_version_major(api),
        vk::api_version_minor(api),
        vk::api_version_patch(api),
      ),
      driver_version: properties.driver_version,
      vendor_id: properties.vendor_id,
      device_id: properties.device_id,
      device_type: properties.device_type,
      discrete_queue_priorities: properties.limits.discrete_queue_priorities,
      geometry_shader: features.geometry_shader != vk::FALSE,
      memory_heap_count: memory.memory_heap_count,
      memory_type_count: memory.memory_type_count,
      queue_families: queue_families.iter().map(QueueFamilyReport::new).collect(),
    }
  }

  pub fn query(instance: &ash::Instance, phys_device: vk::PhysicalDevice) -> Self {
    unsafe {
      let properties = instance.get_physical_device_properties(phys_device);
      let features = instance.get_physical_device_features(phys_device);
      let memory = instance.get_physical_device_memory_properties(phys_device);
      let queue_families = instance.get_physical_device_queue_family_properties(phys_device);
      Self::new(&properties, &features, &memory, &queue_families)
    }
  }
}

impl fmt::Display for PhysicalDeviceReport {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let (major, minor, patch) = self.api_version;
    writeln!(f, "Name:                    {}", self.name)?;
    writeln!(f, "API version:             {}.{}.{}", major, minor, patch)?;
    writeln!(f, "Driver version:          {}", self.driver_version)?;
    writeln!(f, "Vendor id:               {}", self.vendor_id)?;
    writeln!(f, "Device id:               {}", self.device_id)?;
    writeln!(f, "Device type:             {:?}", self.device_type)?;
    writeln!(f, "DiscreteQueuePriorities: {}", self.discrete_queue_priorities)?;
    writeln!(f, "Geometry shader:         {}", self.geometry_shader)?;
    writeln!(f, "Memory heaps:            {}", self.memory_heap_count)?;
    writeln!(f, "Memory types:            {}", self.memory_type_count)?;
    writeln!(f)?;
    write!(f, "Amount of queue families:    {}", self.queue_families.len())?;

    for (i, q) in self.queue_families.iter().enumerate() {
      let g = q.min_image_transfer_granularity;
      writeln!(f)?;
      writeln!(f)?;
      writeln!(f, "Queue family #{}", i)?;
      writeln!(f, "VK_QUEUE_GRAPHICS_BIT:       {}", q.graphics)?;
      writeln!(f, "VK_QUEUE_COMPUTE_BIT:        {}", q.compute)?;
      writeln!(f, "VK_QUEUE_TRANSFER_BIT:       {}", q.transfer)?;
      writeln!(f, "VK_QUEUE_SPARSE_BINDING_BIT: {}", q.sparse_binding)?;
      writeln!(f, "Queue count:                 {}", q.queue_count)?;
      writeln!(f, "Timestamp valid bits:        {}", q.timestamp_valid_bits)?;
      write!(
        f,
        "Image transfer granularity:  {}, {}, {}",
        g.width, g.height, g.depth
      )?;
    }

    Ok(())
  }
}

pub fn log_physical_device_stats(instance: &ash::Instance, phys_devices: &[vk::PhysicalDevice]) {
  for (i, &phys_device) in phys_devices.iter().enumerate() {
    let report = PhysicalDeviceReport::query(instance, phys_device);
    info!("Physical device #{}:\n{}", i, report);
  }
}
