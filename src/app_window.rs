use log::info;
use winit::{
  dpi::LogicalSize,
  event::Event,
  event_loop::{ControlFlow, EventLoop},
  platform::run_return::EventLoopExtRunReturn,
  window::{Window, WindowBuilder},
};

use crate::app_error::AppResult;
use crate::app_input::AppInput;
use crate::config::Config;

/// OS window and its event loop. Events are pumped manually once per frame,
/// so the render loop stays in our hands instead of winit's callback.
pub struct AppWindow {
  event_loop: EventLoop<()>,
  window: Window,
  input: AppInput,
}

impl AppWindow {
  pub fn new(config: &Config) -> AppResult<Self> {
    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
      .with_title(config.window_title.as_str())
      .with_resizable(false)
      .with_inner_size(LogicalSize::new(config.window_width, config.window_height))
      .build(&event_loop)?;
    info!("Window created: {:?}", window.inner_size());

    Ok(Self {
      event_loop,
      window,
      input: AppInput::new(),
    })
  }

  pub fn window(&self) -> &Window {
    &self.window
  }

  /// Process all pending window events without blocking.
  /// Returns true once user asked to close the window (stays true afterwards).
  pub fn poll_close_requested(&mut self) -> bool {
    let input = &mut self.input;
    self
      .event_loop
      .run_return(|event, _, control_flow| {
        *control_flow = ControlFlow::Poll;
        input.handle_event(&event);
        if input.close_requested || matches!(event, Event::MainEventsCleared) {
          *control_flow = ControlFlow::Exit;
        }
      });
    self.input.close_requested
  }
}
