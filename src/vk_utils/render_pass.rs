use ash;
use ash::vk;
use log::trace;

use crate::app_error::{AppError, AppResult};

/// Raw Vulkan objects used to create vk::RenderPass
pub type AttachmentDefinition = (vk::AttachmentDescription, vk::AttachmentReference);

/// Swapchain image as color attachment. Contents are cleared on load,
/// so we do not care about the previous layout.
pub fn create_present_color_attachment(
  attachment_idx: u32,
  image_format: vk::Format,
) -> AttachmentDefinition {
  let attachment = vk::AttachmentDescription::builder()
    .format(image_format)
    .samples(vk::SampleCountFlags::TYPE_1) // single sampled
    .load_op(vk::AttachmentLoadOp::CLEAR)
    .store_op(vk::AttachmentStoreOp::STORE)
    .stencil_load_op(vk::AttachmentLoadOp::DONT_CARE)
    .stencil_store_op(vk::AttachmentStoreOp::DONT_CARE)
    .initial_layout(vk::ImageLayout::UNDEFINED)
    .final_layout(vk::ImageLayout::PRESENT_SRC_KHR)
    .build();

  let attachment_reference = vk::AttachmentReference {
    attachment: attachment_idx,
    layout: vk::ImageLayout::COLOR_ATTACHMENT_OPTIMAL,
  };

  (attachment, attachment_reference)
}

/// Layout transition of the swapchain image has to wait for the same stage the
/// queue submit waits on for `image_available` semaphore.
pub fn external_color_dependency() -> vk::SubpassDependency {
  vk::SubpassDependency::builder()
    .src_subpass(vk::SUBPASS_EXTERNAL)
    .dst_subpass(0)
    .src_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
    .src_access_mask(vk::AccessFlags::empty())
    .dst_stage_mask(vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT)
    .dst_access_mask(vk::AccessFlags::COLOR_ATTACHMENT_WRITE)
    .build()
}

/// Single subpass that writes to a single presentable color attachment.
pub fn create_render_pass(
  device: &ash::Device,
  image_format: vk::Format,
) -> AppResult<vk::RenderPass> {
  let (attachment, attachment_ref) = create_present_color_attachment(0, image_format);
  let attachments = [attachment];
  let color_refs = [attachment_ref];

  let subpass = vk::SubpassDescription::builder()
    .pipeline_bind_point(vk::PipelineBindPoint::GRAPHICS)
    .color_attachments(&color_refs) // OUTPUT
    .build();
  let subpasses = [subpass];
  trace!("Subpass created, will be used to create render pass");

  let dependencies = [external_color_dependency()];

  let create_info = vk::RenderPassCreateInfo::builder()
    .dependencies(&dependencies)
    .attachments(&attachments)
    .subpasses(&subpasses)
    .build();
  unsafe {
    device
      .create_render_pass(&create_info, None)
      .map_err(AppError::vk_err("vkCreateRenderPass"))
  }
}
