//! Per-frame driver. The host supplies a clock, a drawing surface, a capture
//! sink and a way to request the next frame; the loop itself never blocks.

use crate::camera::PerspectiveCamera;
use crate::capture::{CaptureStatus, CaptureSummary, FrameSink, Recorder};
use crate::config::DemoConfig;
use crate::controls::OrbitControls;
use crate::error::Result;
use crate::material::{Axis, MaterialUniforms};
use crate::panel::{PanelAction, PanelEvent};
use crate::scene::Mesh;
use crate::viewport::{SurfaceSize, Viewport};

pub trait Clock {
    /// Seconds since the loop started. The first call starts the clock.
    fn elapsed_seconds(&mut self) -> f64;
    /// Wall-clock milliseconds, used to stamp captures.
    fn now_ms(&self) -> f64;
}

pub trait Surface {
    fn set_size(&mut self, size: SurfaceSize);
    fn draw(&mut self, mesh: &Mesh, camera: &PerspectiveCamera) -> Result<()>;
}

pub trait FrameScheduler {
    fn request_frame(&mut self) -> Result<()>;
}

/// Everything the frame, resize and panel callbacks mutate.
pub struct RenderState {
    pub viewport: Viewport,
    pub camera: PerspectiveCamera,
    pub controls: OrbitControls,
    pub mesh: Mesh,
}

impl RenderState {
    pub fn uniforms(&self) -> &MaterialUniforms {
        &self.mesh.material.uniforms
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameInfo {
    pub index: u64,
    pub time: f32,
    pub captured: bool,
}

pub struct RenderLoop<S, K, C> {
    state: RenderState,
    surface: S,
    recorder: Recorder<K>,
    clock: C,
    time_scale: f32,
    max_pixel_ratio: f64,
    frames: u64,
    /// Added to the clock so time carries on from the last captured frame.
    time_offset: f64,
}

impl<S: Surface, K: FrameSink, C: Clock> RenderLoop<S, K, C> {
    /// Sets up camera and controls for the given window size and sizes the
    /// surface once before the first frame.
    pub fn new(
        config: &DemoConfig,
        mesh: Mesh,
        window: (f64, f64, f64),
        mut surface: S,
        sink: K,
        clock: C,
    ) -> Self {
        let (width, height, dpr) = window;
        let viewport = Viewport::new(width, height, dpr, config.max_pixel_ratio);
        let camera = PerspectiveCamera::new(&config.camera, viewport.aspect());
        let controls = OrbitControls::new(&config.controls, &camera);
        surface.set_size(viewport.surface_size());

        Self {
            state: RenderState {
                viewport,
                camera,
                controls,
                mesh,
            },
            surface,
            recorder: Recorder::new(sink, config.capture.clone()),
            clock,
            time_scale: config.time_scale,
            max_pixel_ratio: config.max_pixel_ratio,
            frames: 0,
            time_offset: 0.0,
        }
    }

    pub fn state(&self) -> &RenderState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut RenderState {
        &mut self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn recorder(&self) -> &Recorder<K> {
        &self.recorder
    }

    pub fn capture_status(&self) -> CaptureStatus {
        self.recorder.status()
    }

    fn elapsed(&mut self) -> f64 {
        self.clock.elapsed_seconds() + self.time_offset
    }

    /// One frame: advance time, step the controls, draw, capture. While
    /// capturing, time advances by exactly one frame interval per frame.
    pub fn tick(&mut self) -> Result<FrameInfo> {
        let elapsed = match self.recorder.locked_elapsed() {
            Some(locked) => locked,
            None => self.elapsed(),
        };
        let time = (elapsed * self.time_scale as f64) as f32;
        self.state.mesh.material.uniforms.time = time;

        let RenderState {
            camera,
            controls,
            mesh,
            ..
        } = &mut self.state;
        controls.update(camera);
        self.surface.draw(mesh, camera)?;

        let captured = self.recorder.capture_frame()?;
        let info = FrameInfo {
            index: self.frames,
            time,
            captured,
        };
        self.frames += 1;
        Ok(info)
    }

    /// Runs [`tick`](Self::tick) and then asks for the next frame. The next
    /// frame is requested even when this one failed.
    pub fn run_frame<F: FrameScheduler>(&mut self, scheduler: &mut F) -> Result<FrameInfo> {
        let frame = self.tick();
        scheduler.request_frame()?;
        frame
    }

    pub fn resize(&mut self, width: f64, height: f64, device_pixel_ratio: f64) {
        let size = self.state.viewport.resize(
            width,
            height,
            device_pixel_ratio,
            self.max_pixel_ratio,
            &mut self.state.camera,
        );
        self.surface.set_size(size);
        log::debug!(
            "resized to {}x{} (buffer {}x{})",
            size.css_width,
            size.css_height,
            size.buffer_width,
            size.buffer_height
        );
    }

    pub fn set_frequency(&mut self, axis: Axis, value: f32) -> f32 {
        self.state.mesh.material.uniforms.set_frequency(axis, value)
    }

    pub fn start_capture(&mut self) -> Result<bool> {
        if self.recorder.is_capturing() {
            return Ok(false);
        }
        let now = self.clock.now_ms();
        let elapsed = self.elapsed();
        self.recorder.start(now, elapsed)
    }

    /// Stops the capture. The clock is rebased so the animation resumes
    /// where the recording ended instead of jumping to wall time.
    pub fn stop_capture(&mut self) -> Result<Option<CaptureSummary>> {
        let Some(resume_at) = self.recorder.locked_elapsed() else {
            return Ok(None);
        };
        self.time_offset = resume_at - self.clock.elapsed_seconds();
        let now = self.clock.now_ms();
        self.recorder.stop(now)
    }

    /// Single entry point for everything the debug panel can do.
    pub fn apply(&mut self, event: PanelEvent) -> Result<()> {
        match event {
            PanelEvent::Frequency { axis, value } => {
                self.set_frequency(axis, value);
            }
            PanelEvent::Action(PanelAction::StartCapture) => {
                self.start_capture()?;
            }
            PanelEvent::Action(PanelAction::StopCapture) => {
                self.stop_capture()?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::tests::MemorySink;
    use crate::error::DemoError;
    use crate::scene::build_mesh;
    use glam::Vec2;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[derive(Default)]
    struct ManualClock {
        seconds: f64,
        wall_ms: f64,
    }

    impl Clock for ManualClock {
        fn elapsed_seconds(&mut self) -> f64 {
            self.seconds
        }
        fn now_ms(&self) -> f64 {
            self.wall_ms
        }
    }

    #[derive(Default)]
    struct FakeSurface {
        sizes: Vec<SurfaceSize>,
        draws: Vec<f32>,
        fail_next: bool,
    }

    impl Surface for FakeSurface {
        fn set_size(&mut self, size: SurfaceSize) {
            self.sizes.push(size);
        }
        fn draw(&mut self, mesh: &Mesh, _camera: &PerspectiveCamera) -> Result<()> {
            if std::mem::take(&mut self.fail_next) {
                return Err(DemoError::Js("context lost".into()));
            }
            self.draws.push(mesh.material.uniforms.time);
            Ok(())
        }
    }

    #[derive(Default)]
    struct CountingScheduler {
        requests: usize,
    }

    impl FrameScheduler for CountingScheduler {
        fn request_frame(&mut self) -> Result<()> {
            self.requests += 1;
            Ok(())
        }
    }

    fn make_loop(clock: ManualClock) -> RenderLoop<FakeSurface, MemorySink, ManualClock> {
        make_loop_with(DemoConfig::default(), clock)
    }

    fn make_loop_with(
        config: DemoConfig,
        clock: ManualClock,
    ) -> RenderLoop<FakeSurface, MemorySink, ManualClock> {
        let mesh = build_mesh(&config, &mut StdRng::seed_from_u64(3));
        RenderLoop::new(
            &config,
            mesh,
            (800.0, 600.0, 1.0),
            FakeSurface::default(),
            MemorySink::default(),
            clock,
        )
    }

    #[test]
    fn time_uniform_is_three_times_elapsed() {
        let mut lp = make_loop(ManualClock::default());
        lp.clock.seconds = 2.0;
        let frame = lp.tick().unwrap();
        assert_eq!(frame.time, 6.0);
        assert_eq!(lp.state().uniforms().time, 6.0);
        assert_eq!(lp.surface().draws, vec![6.0]);
    }

    #[test]
    fn surface_sized_at_startup_and_on_resize() {
        let mut lp = make_loop(ManualClock::default());
        assert_eq!(lp.surface().sizes.len(), 1);

        lp.resize(1920.0, 1080.0, 2.5);
        let last = *lp.surface().sizes.last().unwrap();
        assert_eq!((last.css_width, last.css_height), (1920, 1080));
        assert_eq!((last.buffer_width, last.buffer_height), (3840, 2160));
        assert_eq!(lp.state().camera.aspect, (1920.0f64 / 1080.0) as f32);
        assert_eq!(lp.state().viewport.pixel_ratio, 2.0);
    }

    #[test]
    fn every_frame_schedules_the_next() {
        let mut lp = make_loop(ManualClock::default());
        let mut scheduler = CountingScheduler::default();
        for i in 0..5 {
            lp.clock.seconds = i as f64 / 60.0;
            let frame = lp.run_frame(&mut scheduler).unwrap();
            assert_eq!(frame.index, i);
            assert!(!frame.captured);
        }
        assert_eq!(scheduler.requests, 5);
    }

    #[test]
    fn failed_draw_still_schedules_next_frame() {
        let mut lp = make_loop(ManualClock::default());
        let mut scheduler = CountingScheduler::default();
        lp.surface.fail_next = true;
        assert!(lp.run_frame(&mut scheduler).is_err());
        assert_eq!(scheduler.requests, 1);
        assert!(lp.run_frame(&mut scheduler).is_ok());
    }

    #[test]
    fn start_render_ten_stop_yields_ten_frames() {
        let mut lp = make_loop(ManualClock {
            seconds: 0.0,
            wall_ms: 1_700_000_000_000.0,
        });
        let mut scheduler = CountingScheduler::default();

        lp.run_frame(&mut scheduler).unwrap();
        lp.apply(PanelEvent::Action(PanelAction::StartCapture)).unwrap();
        lp.apply(PanelEvent::Action(PanelAction::StartCapture)).unwrap();
        for _ in 0..10 {
            assert!(lp.run_frame(&mut scheduler).unwrap().captured);
        }
        lp.clock.wall_ms += 1_000.0;
        let summary = lp.stop_capture().unwrap().expect("was capturing");
        assert_eq!(summary.frames, 10);
        assert_eq!(summary.wall_ms, 1_000.0);
        assert!((summary.duration_ms - 10_000.0 / 60.0).abs() < 1e-9);
        assert_eq!(lp.recorder().sink().saved[0].1.len(), 10);
        assert_eq!(lp.recorder().sink().starts, 1);

        assert!(!lp.run_frame(&mut scheduler).unwrap().captured);
        lp.apply(PanelEvent::Action(PanelAction::StopCapture)).unwrap();
        assert_eq!(lp.recorder().sink().saved.len(), 1);
        assert_eq!(lp.capture_status(), CaptureStatus::Idle);
    }

    #[test]
    fn panel_frequency_is_clamped_into_live_uniform() {
        let mut lp = make_loop(ManualClock::default());
        lp.apply(PanelEvent::Frequency {
            axis: Axis::X,
            value: 42.0,
        })
        .unwrap();
        lp.apply(PanelEvent::Frequency {
            axis: Axis::Y,
            value: -1.0,
        })
        .unwrap();
        assert_eq!(lp.state().uniforms().frequency(), Vec2::new(20.0, 0.0));
    }

    fn captured_times(framerate: u32) -> (Vec<f32>, CaptureSummary) {
        let mut config = DemoConfig::default();
        config.capture.framerate = framerate;
        let mut lp = make_loop_with(config, ManualClock::default());
        lp.clock.seconds = 1.0;
        lp.start_capture().unwrap();
        for _ in 0..10 {
            // Rendering is slow and uneven; the recording must not notice.
            lp.clock.seconds += 0.25;
            lp.tick().unwrap();
        }
        let summary = lp.stop_capture().unwrap().unwrap();
        (lp.surface().draws.clone(), summary)
    }

    #[test]
    fn capture_time_is_locked_to_framerate() {
        let (at_60, summary_60) = captured_times(60);
        let (at_1, summary_1) = captured_times(1);

        for (i, (fast, slow)) in at_60.iter().zip(&at_1).enumerate() {
            let expected_fast = ((1.0 + i as f64 / 60.0) * 3.0) as f32;
            let expected_slow = ((1.0 + i as f64) * 3.0) as f32;
            assert!((fast - expected_fast).abs() < 1e-5, "frame {i}: {fast}");
            assert!((slow - expected_slow).abs() < 1e-5, "frame {i}: {slow}");
        }
        assert_ne!(at_60, at_1);
        assert!((summary_60.duration_ms - 10_000.0 / 60.0).abs() < 1e-9);
        assert_eq!(summary_1.duration_ms, 10_000.0);
        assert_eq!(summary_60.frames, summary_1.frames);
    }

    #[test]
    fn time_resumes_from_last_captured_frame() {
        let mut lp = make_loop(ManualClock::default());
        lp.clock.seconds = 1.0;
        lp.start_capture().unwrap();
        for _ in 0..60 {
            lp.clock.seconds += 0.5;
            lp.tick().unwrap();
        }
        lp.stop_capture().unwrap();

        // 60 frames at 60 fps: the recording covered one second.
        let frame = lp.tick().unwrap();
        assert!((frame.time - 6.0).abs() < 1e-5, "{}", frame.time);
        lp.clock.seconds += 1.0;
        let frame = lp.tick().unwrap();
        assert!((frame.time - 9.0).abs() < 1e-5, "{}", frame.time);
        assert!(!frame.captured);
    }
}
