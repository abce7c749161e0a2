use std::{collections::VecDeque, time::Instant};

use crate::utils::get_simple_type_name;

// Delta times are averaged over _this many_ frames.
const DT_FILTER_WIDTH: usize = 20;

pub type FrameIdx = u64;

/// Frame counter + moving average of frame time. Only used for stats logging,
/// the render loop itself does not depend on time.
///
/// Heavily inspired by:
/// - https://github.com/EmbarkStudios/kajiya/blob/main/crates/lib/kajiya-simple/src/main_loop.rs#L329
pub struct AppTimer {
  frame_idx: FrameIdx,
  last_frame_start: Instant,
  /// Circular buffer for delta times
  dt_queue: VecDeque<f32>,
}

impl AppTimer {
  pub fn new() -> Self {
    Self {
      frame_idx: 0,
      last_frame_start: Instant::now(),
      dt_queue: VecDeque::with_capacity(DT_FILTER_WIDTH),
    }
  }

  /// Number of frames marked so far
  pub fn frame_count(&self) -> FrameIdx {
    self.frame_idx
  }

  /// @return delta time in seconds since previous call
  pub fn mark_frame(&mut self) -> f32 {
    let now = Instant::now();
    let dt_raw = (now - self.last_frame_start).as_secs_f32();
    self.last_frame_start = now;
    self.push_delta_time(dt_raw);
    dt_raw
  }

  fn push_delta_time(&mut self, dt: f32) {
    self.inc_frame_idx();
    while self.dt_queue.len() >= DT_FILTER_WIDTH {
      self.dt_queue.pop_front();
    }
    self.dt_queue.push_back(dt);
  }

  /// Average over last `DT_FILTER_WIDTH` frames, in milliseconds
  pub fn average_frame_time_ms(&self) -> f32 {
    let count = self.dt_queue.len();
    if count == 0 {
      return 0.0;
    }
    let sum = self.dt_queue.iter().copied().sum::<f32>();
    sum / (count as f32) * 1000.0
  }

  /// Should we log stats this frame?
  pub fn is_stats_frame(&self, interval: u64) -> bool {
    interval > 0 && self.frame_idx > 0 && self.frame_idx % interval == 0
  }

  fn inc_frame_idx(&mut self) {
    match self.frame_idx.checked_add(1) {
      Some(e) => self.frame_idx = e,
      _ => panic!(
        "Integer overflow in {}.inc_frame_idx(). How long did the app run?!",
        get_simple_type_name::<Self>()
      ),
    }
  }
}
