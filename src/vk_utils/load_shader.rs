use std::ffi::CStr;
use std::io::Cursor;
use std::path::Path;

use ash;
use ash::vk;
use log::trace;

use crate::app_error::{AppError, AppResult};

// https://github.com/zeux/niagara/blob/master/src/shaders.cpp

const SPIRV_MAGIC: u32 = 0x0723_0203;

fn shader_entry_point() -> &'static CStr {
  unsafe { CStr::from_bytes_with_nul_unchecked(b"main\0") }
}

/// Read a compiled SPIR-V binary into words.
pub fn read_spirv(path: &Path) -> AppResult<Vec<u32>> {
  trace!("Loading shader from {}", path.to_string_lossy());

  let bytes = std::fs::read(path).map_err(|source| AppError::ShaderIo {
    path: path.to_path_buf(),
    source,
  })?;
  parse_spirv(path, &bytes)
}

fn parse_spirv(path: &Path, bytes: &[u8]) -> AppResult<Vec<u32>> {
  let invalid = |reason: &'static str| AppError::ShaderInvalid {
    path: path.to_path_buf(),
    reason,
  };

  if bytes.is_empty() {
    return Err(invalid("file is empty"));
  }
  if bytes.len() % 4 != 0 {
    return Err(invalid("size is not a multiple of 4 bytes"));
  }

  // magic may be in either byte order, `read_spv` swaps the words if needed
  let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
  if u32::from_le_bytes(magic) != SPIRV_MAGIC && u32::from_be_bytes(magic) != SPIRV_MAGIC {
    return Err(invalid("missing SPIR-V magic number"));
  }

  ash::util::read_spv(&mut Cursor::new(bytes)).map_err(|source| AppError::ShaderIo {
    path: path.to_path_buf(),
    source,
  })
}

fn load_shader_module(device: &ash::Device, path: &Path) -> AppResult<vk::ShaderModule> {
  let spirv_code = read_spirv(path)?;
  let create_info = vk::ShaderModuleCreateInfo::builder()
    .code(&spirv_code)
    .build();

  unsafe {
    device
      .create_shader_module(&create_info, None)
      .map_err(AppError::vk_err("vkCreateShaderModule"))
  }
}

/// Caller owns the returned module, destroy it once the pipeline is created.
pub fn load_shader(
  device: &ash::Device,
  stage: vk::ShaderStageFlags,
  path: &Path,
) -> AppResult<(vk::ShaderModule, vk::PipelineShaderStageCreateInfo)> {
  let shader_module = load_shader_module(device, path)?;

  let stage_info = vk::PipelineShaderStageCreateInfo::builder()
    .stage(stage)
    .module(shader_module)
    .name(shader_entry_point())
    .build();
  trace!("Shader {:?} loaded from {}", stage, path.to_string_lossy());

  Ok((shader_module, stage_info))
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::io::Write;

  fn spirv_bytes(words: &[u32]) -> Vec<u8> {
    words.iter().flat_map(|w| w.to_le_bytes()).collect()
  }

  #[test]
  fn reads_spirv_file() {
    // magic, version 1.0, generator, bound, schema
    let words = [SPIRV_MAGIC, 0x0001_0000, 0, 1, 0];
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(&spirv_bytes(&words)).unwrap();

    let result = read_spirv(file.path()).unwrap();
    assert_eq!(result, words.to_vec());
  }

  #[test]
  fn missing_file_names_path() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("vert.spv");
    let err = read_spirv(&path).unwrap_err();
    assert!(matches!(err, AppError::ShaderIo { .. }));
    assert!(err.to_string().contains("vert.spv"), "{}", err);
  }

  #[test]
  fn rejects_truncated_file() {
    let mut bytes = spirv_bytes(&[SPIRV_MAGIC, 0x0001_0000]);
    bytes.pop();
    let err = parse_spirv(Path::new("frag.spv"), &bytes).unwrap_err();
    assert!(matches!(err, AppError::ShaderInvalid { .. }));
  }

  #[test]
  fn rejects_empty_file() {
    let err = parse_spirv(Path::new("frag.spv"), &[]).unwrap_err();
    assert!(matches!(
      err,
      AppError::ShaderInvalid {
        reason: "file is empty",
        ..
      }
    ));
  }

  #[test]
  fn rejects_glsl_source() {
    let glsl = b"#version 450\nvoid main() {}\n";
    assert_eq!(glsl.len() % 4, 0);
    let err = parse_spirv(Path::new("triangle.vert"), glsl).unwrap_err();
    assert!(matches!(
      err,
      AppError::ShaderInvalid {
        reason: "missing SPIR-V magic number",
        ..
      }
    ));
  }

  #[test]
  fn rejects_zero_filled_file() {
    let err = parse_spirv(Path::new("vert.spv"), &[0u8; 20]).unwrap_err();
    assert!(matches!(err, AppError::ShaderInvalid { .. }), "{:?}", err);
  }

  #[test]
  fn reads_big_endian_spirv() {
    let words = [SPIRV_MAGIC, 0x0001_0000, 0, 1, 0];
    let bytes: Vec<u8> = words.iter().flat_map(|w| w.to_be_bytes()).collect();
    let result = parse_spirv(Path::new("vert.spv"), &bytes).unwrap();
    assert_eq!(result, words.to_vec());
  }

  #[test]
  fn entry_point_is_main() {
    assert_eq!(shader_entry_point().to_str().unwrap(), "main");
  }
}
