use std::borrow::Cow;
use std::ffi::CStr;

use glam::{vec3, Vec3};

/// Convert u8 [0..255) into float
pub fn color_u8_to_float(col_u8: u8) -> f32 {
  (col_u8 as f32) / 255.0
}

/// Convert u8 [0..255) into float vector
pub fn color_hex_to_vec(c0: u8, c1: u8, c2: u8) -> Vec3 {
  vec3(
    color_u8_to_float(c0),
    color_u8_to_float(c1),
    color_u8_to_float(c2),
  )
}

/// Fixed-size, nul-padded `c_char` arrays from vulkan structs (e.g. `device_name`).
/// Stops at first nul or at the end of the array, whichever comes first.
pub fn vk_str(chars: &[std::os::raw::c_char]) -> Cow<'_, str> {
  let bytes: &[u8] =
    unsafe { std::slice::from_raw_parts(chars.as_ptr() as *const u8, chars.len()) };
  match CStr::from_bytes_until_nul(bytes) {
    Ok(s) => s.to_string_lossy(),
    Err(_) => String::from_utf8_lossy(bytes),
  }
}

pub fn get_simple_type_name<T>() -> &'static str {
  let name = std::any::type_name::<T>();
  match name.rfind("::") {
    Some(idx) => &name[idx + 2..],
    None => name,
  }
}
