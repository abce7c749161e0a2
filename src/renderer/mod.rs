mod frame_presenter;
mod vk_frame_backend;

pub use frame_presenter::*;
