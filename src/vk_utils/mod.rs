// mostly inspired by:
// - https://github.com/zeux/niagara/tree/master/src
// - https://github.com/MaikKlein/ash/blob/master/examples/src/lib.rs#L256
mod command_buffers;
mod create_framebuffer;
mod device;
mod device_stats;
mod load_shader;
mod pipeline;
mod render_pass;
mod resources;
mod swapchain;

pub use command_buffers::*;
pub use create_framebuffer::*;
pub use device::*;
pub use device_stats::*;
pub use load_shader::*;
pub use pipeline::*;
pub use render_pass::*;
pub use resources::*;
pub use swapchain::*;
