use ash;
use ash::vk;

use crate::app_error::{AppError, AppResult};

use super::size_to_rect_vk;

pub struct TriangleDrawParams {
  pub render_pass: vk::RenderPass,
  pub pipeline: vk::Pipeline,
  pub size: vk::Extent2D,
  pub clear_value: vk::ClearValue,
}

/// Record (once, at init) the triangle draw into `framebuffer`.
///
/// `SIMULTANEOUS_USE` since the same command buffer is resubmitted every time its
/// swapchain image is acquired, and nothing waits on the CPU for the previous submit.
pub fn record_triangle_commands(
  device: &ash::Device,
  command_buffer: vk::CommandBuffer,
  framebuffer: vk::Framebuffer,
  params: &TriangleDrawParams,
) -> AppResult<()> {
  let cmd_buf_begin_info = vk::CommandBufferBeginInfo::builder()
    .flags(vk::CommandBufferUsageFlags::SIMULTANEOUS_USE)
    .build();

  let clear_values = [params.clear_value];
  let render_pass_begin_info = vk::RenderPassBeginInfo::builder()
    .render_pass(params.render_pass)
    .framebuffer(framebuffer)
    .render_area(size_to_rect_vk(&params.size))
    .clear_values(&clear_values)
    .build();

  unsafe {
    device
      .begin_command_buffer(command_buffer, &cmd_buf_begin_info)
      .map_err(AppError::vk_err("vkBeginCommandBuffer"))?;

    device.cmd_begin_render_pass(
      command_buffer,
      &render_pass_begin_info,
      vk::SubpassContents::INLINE,
    );
    device.cmd_bind_pipeline(
      command_buffer,
      vk::PipelineBindPoint::GRAPHICS,
      params.pipeline,
    );
    // 3 vertices (1 triangle), 1 instance, no special offset
    device.cmd_draw(command_buffer, 3, 1, 0, 0);
    device.cmd_end_render_pass(command_buffer);

    device
      .end_command_buffer(command_buffer)
      .map_err(AppError::vk_err("vkEndCommandBuffer"))
  }
}
