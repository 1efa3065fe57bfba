use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared stop flag for a frame loop. Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Display-driven frame loop.
///
/// The host calls [`FrameLoop::run_frame`] once per refresh and only asks for
/// the next refresh while the loop is running. The token is checked on every
/// iteration, so cancelling it stops all future frames.
#[derive(Debug, Default)]
pub struct FrameLoop {
    token: Option<CancellationToken>,
    frames: u64,
}

impl FrameLoop {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) the loop and hand out its token.
    pub fn start(&mut self) -> CancellationToken {
        if let Some(token) = &self.token {
            if !token.is_cancelled() {
                return token.clone();
            }
        }
        let token = CancellationToken::new();
        self.token = Some(token.clone());
        token
    }

    pub fn stop(&mut self) {
        if let Some(token) = self.token.take() {
            token.cancel();
        }
    }

    pub fn is_running(&self) -> bool {
        self.token.as_ref().is_some_and(|t| !t.is_cancelled())
    }

    /// Run one frame if the loop is live. Returns whether `frame` ran.
    pub fn run_frame<F: FnOnce()>(&mut self, frame: F) -> bool {
        if !self.is_running() {
            return false;
        }
        frame();
        self.frames += 1;
        true
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

/// Seconds elapsed between redraws, clamped so a stalled window does not
/// fast-forward animations.
#[derive(Debug)]
pub struct FrameClock {
    #[cfg(not(target_arch = "wasm32"))]
    last: Option<std::time::Instant>,
}

const MAX_FRAME_SECONDS: f32 = 0.1;
#[cfg(target_arch = "wasm32")]
const WEB_FRAME_SECONDS: f32 = 1.0 / 60.0;

impl FrameClock {
    pub fn new() -> Self {
        Self {
            #[cfg(not(target_arch = "wasm32"))]
            last: None,
        }
    }

    #[cfg(not(target_arch = "wasm32"))]
    pub fn tick(&mut self) -> f32 {
        let now = std::time::Instant::now();
        let dt = self
            .last
            .map(|last| now.duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last = Some(now);
        dt.min(MAX_FRAME_SECONDS)
    }

    // std::time::Instant is unavailable on the web target
    #[cfg(target_arch = "wasm32")]
    pub fn tick(&mut self) -> f32 {
        WEB_FRAME_SECONDS.min(MAX_FRAME_SECONDS)
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
