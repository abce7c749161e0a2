use log::info;
use winit::event::{Event, VirtualKeyCode, WindowEvent};

/// Other implementations:
/// * https://github.com/rukai/winit_input_helper/blob/main/src/current_input.rs
pub struct AppInput {
  pub close_requested: bool,
}

impl AppInput {
  pub fn new() -> Self {
    Self {
      close_requested: false,
    }
  }

  pub fn handle_event<T>(&mut self, event: &Event<T>) {
    if let Event::WindowEvent { event, .. } = &event {
      self.handle_window_event(event);
    }
  }

  fn handle_window_event(&mut self, event: &WindowEvent) {
    match event {
      // on clicked 'x'
      WindowEvent::CloseRequested => {
        info!("Window close requested");
        self.close_requested = true;
      }
      // keyboard
      WindowEvent::KeyboardInput { input, .. } => {
        if input.virtual_keycode == Some(VirtualKeyCode::Escape) {
          info!("Escape pressed, closing");
          self.close_requested = true;
        }
      }
      _ => {}
    }
  }
}
