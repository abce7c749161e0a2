use ash;
use ash::vk;
use log::trace;

use crate::app_error::{AppError, AppResult};

use super::{create_viewport, load_shader, size_to_rect_vk};

pub fn create_pipeline_layout(device: &ash::Device) -> AppResult<vk::PipelineLayout> {
  // no descriptor sets, no push constants
  let create_info = vk::PipelineLayoutCreateInfo::builder().build();
  unsafe {
    device
      .create_pipeline_layout(&create_info, None)
      .map_err(AppError::vk_err("vkCreatePipelineLayout"))
  }
}

pub struct TriangleShaders<'a> {
  pub vertex: &'a std::path::Path,
  pub fragment: &'a std::path::Path,
}

/// Pipeline that draws the hardcoded triangle from the vertex shader into `render_pass`.
/// Shader modules only live for the duration of this call.
pub fn create_triangle_pipeline(
  device: &ash::Device,
  render_pass: vk::RenderPass,
  layout: vk::PipelineLayout,
  size: &vk::Extent2D,
  shaders: TriangleShaders,
) -> AppResult<vk::Pipeline> {
  trace!("Will create pipeline for a (device, render pass) based on shaders");

  let (module_vs, stage_vs) = load_shader(device, vk::ShaderStageFlags::VERTEX, shaders.vertex)?;
  let (module_fs, stage_fs) =
    match load_shader(device, vk::ShaderStageFlags::FRAGMENT, shaders.fragment) {
      Ok(r) => r,
      Err(e) => {
        unsafe { device.destroy_shader_module(module_vs, None) };
        return Err(e);
      }
    };

  let stages = [stage_vs, stage_fs];
  let vertex_input_state = ps_vertex_empty();
  let input_assembly_state = ps_ia_triangle_list();
  let viewports = [create_viewport(size)];
  let scissors = [size_to_rect_vk(size)];
  let viewport_state = vk::PipelineViewportStateCreateInfo::builder()
    .viewports(&viewports)
    .scissors(&scissors)
    .build();
  let rasterization_state = ps_raster_polygons(vk::CullModeFlags::NONE);
  let multisample_state = ps_multisample_disabled();
  let color_attachments = ps_color_attachments_write_all(1);
  let color_blend_state = vk::PipelineColorBlendStateCreateInfo::builder()
    .logic_op_enable(false)
    .attachments(&color_attachments)
    .build();

  let create_info = vk::GraphicsPipelineCreateInfo::builder()
    .stages(&stages)
    .vertex_input_state(&vertex_input_state)
    .input_assembly_state(&input_assembly_state)
    .viewport_state(&viewport_state)
    .rasterization_state(&rasterization_state)
    .multisample_state(&multisample_state)
    .color_blend_state(&color_blend_state)
    .layout(layout)
    .render_pass(render_pass)
    .subpass(0)
    .build();

  let pipelines = unsafe {
    let pipelines =
      device.create_graphics_pipelines(vk::PipelineCache::null(), &[create_info], None);
    device.destroy_shader_module(module_vs, None);
    device.destroy_shader_module(module_fs, None);
    pipelines
  };

  match pipelines {
    Ok(ps) => ps
      .first()
      .copied()
      .ok_or_else(|| AppError::vk("vkCreateGraphicsPipelines", vk::Result::ERROR_UNKNOWN)),
    Err((_, result)) => Err(AppError::vk("vkCreateGraphicsPipelines", result)),
  }
}

// Presets for `vk::GraphicsPipelineCreateInfo`.

/// No data for vertices provided by the app, it will all be handled in the shader.
pub fn ps_vertex_empty() -> vk::PipelineVertexInputStateCreateInfo {
  vk::PipelineVertexInputStateCreateInfo::builder().build()
}

/// PipelineInputAssembly-TRIANGLE_LIST
pub fn ps_ia_triangle_list() -> vk::PipelineInputAssemblyStateCreateInfo {
  vk::PipelineInputAssemblyStateCreateInfo::builder()
    .topology(vk::PrimitiveTopology::TRIANGLE_LIST)
    .primitive_restart_enable(false)
    .build()
}

pub fn ps_raster_polygons(
  cull_mode: vk::CullModeFlags,
) -> vk::PipelineRasterizationStateCreateInfo {
  vk::PipelineRasterizationStateCreateInfo::builder()
    .depth_clamp_enable(false)
    .rasterizer_discard_enable(false)
    .polygon_mode(vk::PolygonMode::FILL)
    .cull_mode(cull_mode)
    .front_face(vk::FrontFace::CLOCKWISE)
    .depth_bias_enable(false)
    .line_width(1.0) // validation layers: has to be 1.0 if not dynamic
    .build()
}

pub fn ps_multisample_disabled() -> vk::PipelineMultisampleStateCreateInfo {
  vk::PipelineMultisampleStateCreateInfo::builder()
    .rasterization_samples(vk::SampleCountFlags::TYPE_1)
    .sample_shading_enable(false)
    .build()
}

/// Write result to all color attachments, disable blending
pub fn ps_color_attachments_write_all(
  attachment_count: usize,
) -> Vec<vk::PipelineColorBlendAttachmentState> {
  let write_all = vk::PipelineColorBlendAttachmentState::builder()
    .color_write_mask(vk::ColorComponentFlags::RGBA)
    .blend_enable(false)
    .src_color_blend_factor(vk::BlendFactor::ONE) // shader output
    .dst_color_blend_factor(vk::BlendFactor::ZERO) // existing value on destination attachment
    .src_alpha_blend_factor(vk::BlendFactor::ONE)
    .dst_alpha_blend_factor(vk::BlendFactor::ZERO)
    .build();

  vec![write_all; attachment_count]
}
