use ash;
use ash::vk;
use log::trace;

use crate::app_error::{AppError, AppResult};

/// One framebuffer per image view, each with the image view as its only attachment.
pub fn create_framebuffers_with_one_attachment(
  device: &ash::Device,
  render_pass: vk::RenderPass,
  image_views: &[vk::ImageView],
  size: &vk::Extent2D,
) -> AppResult<Vec<vk::Framebuffer>> {
  trace!("Will create {} framebuffers {:?}", image_views.len(), size);
  let mut framebuffers = Vec::with_capacity(image_views.len());

  for &iv in image_views {
    match create_framebuffer(device, render_pass, &[iv], size) {
      Ok(fbo) => framebuffers.push(fbo),
      Err(e) => {
        for fbo in framebuffers {
          unsafe { device.destroy_framebuffer(fbo, None) };
        }
        return Err(e);
      }
    }
  }

  Ok(framebuffers)
}

pub fn create_framebuffer(
  device: &ash::Device,
  render_pass: vk::RenderPass,
  image_views: &[vk::ImageView],
  size: &vk::Extent2D,
) -> AppResult<vk::Framebuffer> {
  let create_info = vk::FramebufferCreateInfo::builder()
    .render_pass(render_pass)
    .attachments(image_views)
    .width(size.width)
    .height(size.height)
    .layers(1)
    .build();
  unsafe {
    device
      .create_framebuffer(&create_info, None)
      .map_err(AppError::vk_err("vkCreateFramebuffer"))
  }
}
