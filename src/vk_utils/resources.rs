use ash;
use ash::vk;

use crate::app_error::{AppError, AppResult};

// https://github.com/zeux/niagara/blob/master/src/resources.cpp

pub fn create_image_view(
  device: &ash::Device,
  image: vk::Image,
  image_format: vk::Format,
  aspect_mask_flags: vk::ImageAspectFlags,
) -> AppResult<vk::ImageView> {
  let subresource_range = vk::ImageSubresourceRange::builder()
    .aspect_mask(aspect_mask_flags)
    .base_array_layer(0)
    .layer_count(1)
    .base_mip_level(0)
    .level_count(1)
    .build();

  let create_info = vk::ImageViewCreateInfo::builder()
    .image(image)
    .view_type(vk::ImageViewType::TYPE_2D)
    .format(image_format)
    .subresource_range(subresource_range)
    .build();

  unsafe {
    device
      .create_image_view(&create_info, None)
      .map_err(AppError::vk_err("vkCreateImageView"))
  }
}

pub fn create_semaphore(device: &ash::Device) -> AppResult<vk::Semaphore> {
  let semaphore_create_info = vk::SemaphoreCreateInfo::builder()
    .flags(vk::SemaphoreCreateFlags::empty())
    .build();
  unsafe {
    device
      .create_semaphore(&semaphore_create_info, None)
      .map_err(AppError::vk_err("vkCreateSemaphore"))
  }
}

/// Plain viewport, origin top-left. Vulkan 1.0 only, so no negative-height flip.
pub fn create_viewport(size: &vk::Extent2D) -> vk::Viewport {
  vk::Viewport {
    x: 0f32,
    y: 0f32,
    width: size.width as f32,
    height: size.height as f32,
    min_depth: 0f32,
    max_depth: 1.0f32,
  }
}

pub fn size_to_rect_vk(size: &vk::Extent2D) -> vk::Rect2D {
  vk::Rect2D {
    offset: vk::Offset2D { x: 0, y: 0 },
    extent: *size,
  }
}

pub fn create_command_pool(
  device: &ash::Device,
  queue_family_index: u32,
) -> AppResult<vk::CommandPool> {
  // command buffers are recorded once and never reset
  let cmd_pool_create_info = vk::CommandPoolCreateInfo::builder()
    .queue_family_index(queue_family_index)
    .flags(vk::CommandPoolCreateFlags::empty())
    .build();

  unsafe {
    device
      .create_command_pool(&cmd_pool_create_info, None)
      .map_err(AppError::vk_err("vkCreateCommandPool"))
  }
}

pub fn create_command_buffers(
  device: &ash::Device,
  cmd_pool: vk::CommandPool,
  count: usize,
) -> AppResult<Vec<vk::CommandBuffer>> {
  let cmd_buf_create_info = vk::CommandBufferAllocateInfo::builder()
    .command_buffer_count(count as u32)
    .command_pool(cmd_pool)
    .level(vk::CommandBufferLevel::PRIMARY)
    .build();

  unsafe {
    device
      .allocate_command_buffers(&cmd_buf_create_info)
      .map_err(AppError::vk_err("vkAllocateCommandBuffers"))
  }
}
