use ash::vk;
use log::{error, info};

use crate::app_error::{AppError, AppResult};
use crate::app_timer::AppTimer;

/// Wait forever for the presentation engine to give us an image.
pub const ACQUIRE_TIMEOUT_NS: u64 = u64::MAX;

/// Stage at which the submitted work waits for the acquired image.
/// Must match the external subpass dependency of the render pass.
pub const IMAGE_AVAILABLE_WAIT_STAGE: vk::PipelineStageFlags =
  vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT;

/// Semaphores ordering one frame on the GPU:
/// acquire -> `image_available` -> submit -> `rendering_done` -> present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyncPair {
  pub image_available: vk::Semaphore,
  pub rendering_done: vk::Semaphore,
}

/// Everything the frame loop needs from the graphics API.
///
/// Implemented by `VkCtx`. Tests use a recording fake.
pub trait FrameBackend {
  /// Swapchain image count. Fixed for the process lifetime.
  fn image_count(&self) -> usize;

  /// Command buffer recorded for this swapchain image (draws into its framebuffer).
  /// `None` if no command buffer was recorded for `image_index`.
  fn command_buffer(&self, image_index: u32) -> Option<vk::CommandBuffer>;

  fn create_sync_pair(&mut self) -> AppResult<SyncPair>;

  /// Caller guarantees the GPU no longer uses the semaphores.
  fn destroy_sync_pair(&mut self, sync: SyncPair);

  /// Blocks (up to `timeout_ns`) until an image is available,
  /// `signal` is signaled when the presentation engine is done reading it.
  fn acquire_next_image(&mut self, timeout_ns: u64, signal: vk::Semaphore) -> AppResult<u32>;

  /// Exactly one command buffer per submission, no fence.
  fn submit(
    &mut self,
    command_buffer: vk::CommandBuffer,
    wait: vk::Semaphore,
    wait_stage: vk::PipelineStageFlags,
    signal: vk::Semaphore,
  ) -> AppResult<()>;

  fn present(&mut self, image_index: u32, wait: vk::Semaphore) -> AppResult<()>;

  /// Blocks until all submitted GPU work is done.
  fn wait_idle(&mut self) -> AppResult<()>;
}

/// Drives acquire -> submit -> present. Owns the semaphores.
///
/// Host never waits on GPU inside the loop. Ordering between the 3 steps is
/// only enforced on the GPU queue through `SyncPair`. Pairs are reused without
/// a fence, see `Config::frames_in_flight`.
pub struct FramePresenter<'a, B: FrameBackend> {
  backend: &'a mut B,
  /// ring of semaphore pairs, `next_sync` is used for next frame
  sync_pairs: Vec<SyncPair>,
  next_sync: usize,
  timer: AppTimer,
  stats_interval_frames: u64,
  destroyed: bool,
}

impl<'a, B: FrameBackend> FramePresenter<'a, B> {
  pub fn new(backend: &'a mut B, frames_in_flight: usize) -> AppResult<Self> {
    let count = frames_in_flight.max(1);
    let mut presenter = Self {
      backend,
      sync_pairs: Vec::with_capacity(count),
      next_sync: 0,
      timer: AppTimer::new(),
      stats_interval_frames: 0,
      destroyed: false,
    };

    // on error, `Drop` releases the pairs created so far
    for _ in 0..count {
      let sync = presenter.backend.create_sync_pair()?;
      presenter.sync_pairs.push(sync);
    }
    info!("Will use {} frames in flight", count);

    Ok(presenter)
  }

  /// Log fps every `frames` frames. `0` disables.
  pub fn with_stats_interval(mut self, frames: u64) -> Self {
    self.stats_interval_frames = frames;
    self
  }

  pub fn frame_count(&self) -> u64 {
    self.timer.frame_count()
  }

  /// Acquire an image, submit its command buffer, present it.
  /// Returns index of the presented swapchain image.
  pub fn run_frame(&mut self) -> AppResult<u32> {
    let sync = self.sync_pairs[self.next_sync];

    // 1. acquire
    let image_index = self
      .backend
      .acquire_next_image(ACQUIRE_TIMEOUT_NS, sync.image_available)?;
    let image_count = self.backend.image_count();
    let command_buffer = match self.backend.command_buffer(image_index) {
      Some(cmd_buf) if (image_index as usize) < image_count => cmd_buf,
      _ => {
        return Err(AppError::InvalidImageIndex {
          index: image_index,
          image_count,
        })
      }
    };

    // 2. submit work for _this_ image
    self.backend.submit(
      command_buffer,
      sync.image_available,
      IMAGE_AVAILABLE_WAIT_STAGE,
      sync.rendering_done,
    )?;

    // 3. present once rendering is done
    self.backend.present(image_index, sync.rendering_done)?;

    self.next_sync = (self.next_sync + 1) % self.sync_pairs.len();
    self.timer.mark_frame();
    if self.timer.is_stats_frame(self.stats_interval_frames) {
      info!(
        "Frame {}: {:.2} ms avg",
        self.timer.frame_count(),
        self.timer.average_frame_time_ms()
      );
    }

    Ok(image_index)
  }

  /// Checks `should_close` once before every frame, `should_close` receives number
  /// of frames presented so far. Returns number of frames presented by this call.
  pub fn run_until(&mut self, mut should_close: impl FnMut(u64) -> bool) -> AppResult<u64> {
    let mut presented = 0u64;
    while !should_close(self.timer.frame_count()) {
      self.run_frame()?;
      presented += 1;
    }
    Ok(presented)
  }

  /// Wait for GPU, then release semaphores. Errors from the wait are returned,
  /// semaphores are released regardless.
  pub fn destroy(mut self) -> AppResult<()> {
    self.release()
  }

  fn release(&mut self) -> AppResult<()> {
    if self.destroyed {
      return Ok(());
    }
    self.destroyed = true;

    info!("FramePresenter::destroy()");
    let idle = self.backend.wait_idle();
    for sync in self.sync_pairs.drain(..) {
      self.backend.destroy_sync_pair(sync);
    }
    idle
  }
}

impl<'a, B: FrameBackend> Drop for FramePresenter<'a, B> {
  fn drop(&mut self) {
    if let Err(e) = self.release() {
      error!("Device wait idle failed during cleanup: {}", e);
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use ash::vk::Handle;

  #[derive(Debug, Clone, PartialEq)]
  enum Call {
    CreateSync(SyncPair),
    DestroySync(SyncPair),
    Acquire {
      timeout_ns: u64,
      signal: vk::Semaphore,
      image_index: u32,
    },
    Submit {
      command_buffer: vk::CommandBuffer,
      wait: vk::Semaphore,
      wait_stage: vk::PipelineStageFlags,
      signal: vk::Semaphore,
    },
    Present {
      image_index: u32,
      wait: vk::Semaphore,
    },
    WaitIdle,
  }

  /// Presentation engine that hands out images round-robin and records every call.
  struct FakeBackend {
    image_count: usize,
    calls: Vec<Call>,
    next_handle: u64,
    acquired: u32,
    /// return this from n-th (0-based) acquire
    acquire_error_at: Option<(usize, vk::Result)>,
    submit_error_at: Option<(usize, vk::Result)>,
    present_error_at: Option<(usize, vk::Result)>,
    /// image whose command buffer was never recorded
    unrecorded_image: Option<u32>,
    /// hand out this index instead of the round-robin one
    bogus_index: Option<u32>,
  }

  impl FakeBackend {
    fn new(image_count: usize) -> Self {
      Self {
        image_count,
        calls: Vec::new(),
        next_handle: 1,
        acquired: 0,
        acquire_error_at: None,
        submit_error_at: None,
        present_error_at: None,
        unrecorded_image: None,
        bogus_index: None,
      }
    }

    /// Each image gets a distinct command buffer handle: 1000 + idx
    fn cmd_buf_for(image_index: u32) -> vk::CommandBuffer {
      vk::CommandBuffer::from_raw(1000 + image_index as u64)
    }

    fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
      self.calls.iter().filter(|c| pred(c)).count()
    }

    fn acquires(&self) -> usize {
      self.count(|c| matches!(c, Call::Acquire { .. }))
    }

    fn submits(&self) -> usize {
      self.count(|c| matches!(c, Call::Submit { .. }))
    }

    fn presents(&self) -> usize {
      self.count(|c| matches!(c, Call::Present { .. }))
    }

    fn semaphore(&mut self) -> vk::Semaphore {
      let s = vk::Semaphore::from_raw(self.next_handle);
      self.next_handle += 1;
      s
    }
  }

  impl FrameBackend for FakeBackend {
    fn image_count(&self) -> usize {
      self.image_count
    }

    fn command_buffer(&self, image_index: u32) -> Option<vk::CommandBuffer> {
      if (image_index as usize) >= self.image_count || self.unrecorded_image == Some(image_index) {
        return None;
      }
      Some(FakeBackend::cmd_buf_for(image_index))
    }

    fn create_sync_pair(&mut self) -> AppResult<SyncPair> {
      let sync = SyncPair {
        image_available: self.semaphore(),
        rendering_done: self.semaphore(),
      };
      self.calls.push(Call::CreateSync(sync));
      Ok(sync)
    }

    fn destroy_sync_pair(&mut self, sync: SyncPair) {
      self.calls.push(Call::DestroySync(sync));
    }

    fn acquire_next_image(&mut self, timeout_ns: u64, signal: vk::Semaphore) -> AppResult<u32> {
      if let Some((n, err)) = self.acquire_error_at {
        if self.acquires() == n {
          return Err(AppError::vk("vkAcquireNextImageKHR", err));
        }
      }
      let image_index = self
        .bogus_index
        .unwrap_or(self.acquired % self.image_count as u32);
      self.acquired += 1;
      self.calls.push(Call::Acquire {
        timeout_ns,
        signal,
        image_index,
      });
      Ok(image_index)
    }

    fn submit(
      &mut self,
      command_buffer: vk::CommandBuffer,
      wait: vk::Semaphore,
      wait_stage: vk::PipelineStageFlags,
      signal: vk::Semaphore,
    ) -> AppResult<()> {
      if let Some((n, err)) = self.submit_error_at {
        if self.submits() == n {
          return Err(AppError::vk("vkQueueSubmit", err));
        }
      }
      self.calls.push(Call::Submit {
        command_buffer,
        wait,
        wait_stage,
        signal,
      });
      Ok(())
    }

    fn present(&mut self, image_index: u32, wait: vk::Semaphore) -> AppResult<()> {
      if let Some((n, err)) = self.present_error_at {
        if self.presents() == n {
          return Err(AppError::vk("vkQueuePresentKHR", err));
        }
      }
      self.calls.push(Call::Present { image_index, wait });
      Ok(())
    }

    fn wait_idle(&mut self) -> AppResult<()> {
      self.calls.push(Call::WaitIdle);
      Ok(())
    }
  }

  /// Only acquire/submit/present, in order
  fn frame_calls(calls: &[Call]) -> Vec<Call> {
    calls
      .iter()
      .filter(|c| {
        matches!(
          c,
          Call::Acquire { .. } | Call::Submit { .. } | Call::Present { .. }
        )
      })
      .cloned()
      .collect()
  }

  #[test]
  fn five_frames_on_three_images() {
    let mut backend = FakeBackend::new(3);
    {
      let mut presenter = FramePresenter::new(&mut backend, 1).unwrap();
      let presented = presenter.run_until(|frames| frames >= 5).unwrap();
      assert_eq!(presented, 5);
      assert_eq!(presenter.frame_count(), 5);
      presenter.destroy().unwrap();
    }

    assert_eq!(backend.acquires(), 5);
    assert_eq!(backend.submits(), 5);
    assert_eq!(backend.presents(), 5);

    let indices: Vec<u32> = backend
      .calls
      .iter()
      .filter_map(|c| match c {
        Call::Present { image_index, .. } => Some(*image_index),
        _ => None,
      })
      .collect();
    assert_eq!(indices, vec![0, 1, 2, 0, 1]);
    assert!(indices.iter().all(|&i| i < 3));
  }

  #[test]
  fn submit_targets_acquired_image() {
    let mut backend = FakeBackend::new(3);
    {
      let mut presenter = FramePresenter::new(&mut backend, 1).unwrap();
      presenter.run_until(|frames| frames >= 7).unwrap();
    }

    let calls = frame_calls(&backend.calls);
    assert_eq!(calls.len(), 7 * 3);
    for frame in calls.chunks(3) {
      match frame {
        [Call::Acquire { image_index: acquired, .. }, Call::Submit { command_buffer, .. }, Call::Present { image_index: presented, .. }] =>
        {
          assert_eq!(*command_buffer, FakeBackend::cmd_buf_for(*acquired));
          assert_eq!(presented, acquired);
        }
        _ => panic!("Unexpected call order: {:?}", frame),
      }
    }
  }

  #[test]
  fn semaphores_chain_acquire_submit_present() {
    let mut backend = FakeBackend::new(2);
    {
      let mut presenter = FramePresenter::new(&mut backend, 1).unwrap();
      presenter.run_frame().unwrap();
    }

    let sync = match backend.calls[0] {
      Call::CreateSync(sync) => sync,
      ref c => panic!("Expected semaphores to be created first, got {:?}", c),
    };
    assert_ne!(sync.image_available, sync.rendering_done);

    let calls = frame_calls(&backend.calls);
    assert_eq!(
      calls,
      vec![
        Call::Acquire {
          timeout_ns: u64::MAX,
          signal: sync.image_available,
          image_index: 0,
        },
        Call::Submit {
          command_buffer: FakeBackend::cmd_buf_for(0),
          wait: sync.image_available,
          wait_stage: vk::PipelineStageFlags::COLOR_ATTACHMENT_OUTPUT,
          signal: sync.rendering_done,
        },
        Call::Present {
          image_index: 0,
          wait: sync.rendering_done,
        },
      ]
    );
  }

  #[test]
  fn single_sync_pair_is_reused_every_frame() {
    let mut backend = FakeBackend::new(3);
    {
      let mut presenter = FramePresenter::new(&mut backend, 1).unwrap();
      presenter.run_until(|frames| frames >= 4).unwrap();
    }

    let created = backend.count(|c| matches!(c, Call::CreateSync(_)));
    assert_eq!(created, 1);
    let signals: Vec<vk::Semaphore> = backend
      .calls
      .iter()
      .filter_map(|c| match c {
        Call::Acquire { signal, .. } => Some(*signal),
        _ => None,
      })
      .collect();
    assert!(signals.windows(2).all(|w| w[0] == w[1]));
  }

  #[test]
  fn sync_pairs_rotate_when_more_frames_in_flight() {
    let mut backend = FakeBackend::new(3);
    {
      let mut presenter = FramePresenter::new(&mut backend, 2).unwrap();
      presenter.run_until(|frames| frames >= 4).unwrap();
    }

    let pairs: Vec<SyncPair> = backend
      .calls
      .iter()
      .filter_map(|c| match c {
        Call::CreateSync(s) => Some(*s),
        _ => None,
      })
      .collect();
    assert_eq!(pairs.len(), 2);

    let waits: Vec<vk::Semaphore> = backend
      .calls
      .iter()
      .filter_map(|c| match c {
        Call::Present { wait, .. } => Some(*wait),
        _ => None,
      })
      .collect();
    let expected: Vec<vk::Semaphore> = (0..4).map(|i| pairs[i % 2].rendering_done).collect();
    assert_eq!(waits, expected);
  }

  #[test]
  fn close_condition_checked_once_per_frame() {
    let mut backend = FakeBackend::new(3);
    let mut checks = 0;
    {
      let mut presenter = FramePresenter::new(&mut backend, 1).unwrap();
      presenter
        .run_until(|_| {
          checks += 1;
          checks > 3
        })
        .unwrap();
    }
    // 3 frames + the final check that said "close"
    assert_eq!(checks, 4);
    assert_eq!(backend.presents(), 3);
  }

  #[test]
  fn closed_window_renders_nothing() {
    let mut backend = FakeBackend::new(3);
    {
      let mut presenter = FramePresenter::new(&mut backend, 1).unwrap();
      assert_eq!(presenter.run_until(|_| true).unwrap(), 0);
    }
    assert_eq!(backend.acquires(), 0);
  }

  #[test]
  fn wait_idle_before_semaphores_destroyed() {
    let mut backend = FakeBackend::new(3);
    {
      let mut presenter = FramePresenter::new(&mut backend, 2).unwrap();
      presenter.run_until(|frames| frames >= 2).unwrap();
      presenter.destroy().unwrap();
    }

    let tail = &backend.calls[backend.calls.len() - 3..];
    assert_eq!(tail[0], Call::WaitIdle);
    assert!(matches!(tail[1], Call::DestroySync(_)));
    assert!(matches!(tail[2], Call::DestroySync(_)));
    // `destroy` + `Drop` must not release twice
    assert_eq!(backend.count(|c| *c == Call::WaitIdle), 1);
  }

  #[test]
  fn acquire_out_of_date_is_surfaced_and_cleaned_up() {
    let mut backend = FakeBackend::new(3);
    backend.acquire_error_at = Some((2, vk::Result::ERROR_OUT_OF_DATE_KHR));
    {
      let mut presenter = FramePresenter::new(&mut backend, 1).unwrap();
      let err = presenter.run_until(|_| false).unwrap_err();
      assert!(err.is_recoverable());
      assert_eq!(presenter.frame_count(), 2);
      // dropped without `destroy()`
    }

    assert_eq!(backend.submits(), 2);
    assert_eq!(backend.presents(), 2);
    let last = backend.calls.len() - 1;
    assert_eq!(backend.calls[last - 1], Call::WaitIdle);
    assert!(matches!(backend.calls[last], Call::DestroySync(_)));
  }

  #[test]
  fn present_device_lost_is_fatal() {
    let mut backend = FakeBackend::new(3);
    backend.present_error_at = Some((0, vk::Result::ERROR_DEVICE_LOST));
    let mut presenter = FramePresenter::new(&mut backend, 1).unwrap();
    let err = presenter.run_frame().unwrap_err();
    assert!(!err.is_recoverable());
    assert_eq!(presenter.frame_count(), 0);
  }

  #[test]
  fn rejects_image_index_past_image_count() {
    let mut backend = FakeBackend::new(3);
    backend.bogus_index = Some(3);
    {
      let mut presenter = FramePresenter::new(&mut backend, 1).unwrap();
      let err = presenter.run_frame().unwrap_err();
      assert!(matches!(
        err,
        AppError::InvalidImageIndex {
          index: 3,
          image_count: 3
        }
      ));
    }
    assert_eq!(backend.submits(), 0);
    assert_eq!(backend.presents(), 0);
  }

  #[test]
  fn submit_error_skips_present() {
    let mut backend = FakeBackend::new(3);
    backend.submit_error_at = Some((1, vk::Result::ERROR_DEVICE_LOST));
    {
      let mut presenter = FramePresenter::new(&mut backend, 1).unwrap();
      let err = presenter.run_until(|_| false).unwrap_err();
      assert!(!err.is_recoverable());
      assert!(matches!(
        err,
        AppError::Vulkan {
          call: "vkQueueSubmit",
          ..
        }
      ));
      assert_eq!(presenter.frame_count(), 1);
    }

    // 2nd frame acquired its image, but never got presented
    assert_eq!(backend.acquires(), 2);
    assert_eq!(backend.submits(), 1);
    assert_eq!(backend.presents(), 1);
    let last = backend.calls.len() - 1;
    assert_eq!(backend.calls[last - 1], Call::WaitIdle);
    assert!(matches!(backend.calls[last], Call::DestroySync(_)));
  }

  #[test]
  fn unrecorded_image_is_not_submitted() {
    let mut backend = FakeBackend::new(3);
    backend.unrecorded_image = Some(1);
    {
      let mut presenter = FramePresenter::new(&mut backend, 1).unwrap();
      presenter.run_frame().unwrap();
      let err = presenter.run_frame().unwrap_err();
      assert!(matches!(
        err,
        AppError::InvalidImageIndex {
          index: 1,
          image_count: 3
        }
      ));
    }
    assert_eq!(backend.submits(), 1);
    assert_eq!(backend.presents(), 1);
  }

  #[test]
  fn zero_frames_in_flight_still_gets_one_pair() {
    let mut backend = FakeBackend::new(3);
    {
      let _presenter = FramePresenter::new(&mut backend, 0).unwrap();
    }
    assert_eq!(backend.count(|c| matches!(c, Call::CreateSync(_))), 1);
  }
}
