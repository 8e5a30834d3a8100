//! Per-frame orchestration of the graph viewer.
//!
//! Stage order within a frame is fixed: camera, frustum flags, LOD,
//! visibility, animation, adaptive monitor, draw list. Layout snapshots are
//! merged only in [`Viewer::between_frames`].

use glam::{Vec2, Vec3};
use lumen_camera::{FlyCamera, FlySettings, KeyboardState, PointerState, RawKeyEvent};
use lumen_config::Config;
use lumen_lod::{DistanceBand, LodEngine, LodPassStats, LodThresholds, QualityAnimator};
use lumen_render::{
    AdaptivePerformanceMonitor, Camera, DrawList, FpsCounter, Frustum, MonitorConfig, PresetChange, ProfileStage,
    QualityMode, QualityPresetManager, RendererCapabilities, VisibilityController, VisibilityStats, build_draw_list,
};
use lumen_scene::{EntityId, EntityKind, EntityRegistry, Highlight, LodTier, ResourceCounts};
use winit::event::ElementState;
use winit::keyboard::{KeyCode, PhysicalKey};

use crate::error::ViewerError;
use crate::ingest::{IngestStep, SnapshotIngestor};
use crate::layout::{LayoutRequest, LayoutSnapshot, LayoutWorker};
use crate::picking::{PICK_LINE_THRESHOLD, pick};
use crate::selection::SelectionInfo;

/// Offset from an object to the camera position `focus_on_object` flies to.
const FOCUS_OFFSET: Vec3 = Vec3::new(0.0, 20.0, 500.0);

/// Seed for decorations that are not part of the graph (starfield).
const DECORATION_SEED: u64 = 0x5eed;

/// Counters describing one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameStats {
    pub frame: u64,
    /// Last completed one-second FPS reading; 0 until the first second ends.
    pub fps: u32,
    pub mode: QualityMode,
    pub visibility: VisibilityStats,
    pub lod: LodPassStats,
    pub draw_items: usize,
    pub instances: u64,
    pub labels: usize,
    pub resources: ResourceCounts,
    /// Node count per tier, indexed none/far/medium/close.
    pub tiers: [usize; 4],
}

pub struct Viewer {
    config: Config,
    registry: EntityRegistry,
    lod: LodEngine,
    presets: QualityPresetManager,
    visibility: VisibilityController,
    monitor: AdaptivePerformanceMonitor,
    animator: QualityAnimator,
    fps: FpsCounter,
    camera: Camera,
    fly: FlyCamera,
    keyboard: KeyboardState,
    pointer: PointerState,
    ingestor: SnapshotIngestor,
    layout: Option<LayoutWorker>,
    draw_list: DrawList,
    selected: Option<EntityId>,
    hovered: Option<EntityId>,
    frame: u64,
}

impl Viewer {
    pub fn new(config: &Config) -> Result<Self, ViewerError> {
        Self::with_capabilities(config, RendererCapabilities::default())
    }

    /// Build a viewer for a renderer with the given optional effects.
    ///
    /// The configured preset is applied first, then the configured render
    /// distance on top of it. An invalid config is rejected before anything
    /// is built.
    pub fn with_capabilities(config: &Config, capabilities: RendererCapabilities) -> Result<Self, ViewerError> {
        config.validate()?;
        let render = &config.render;
        let mut lod = LodEngine::new(
            LodThresholds::new(config.lod.far_distance, config.lod.medium_distance, config.lod.hysteresis)?,
            DistanceBand::new(config.lod.max_visible_distance, config.lod.performance_max_visible_distance),
        );
        lod.set_enabled(render.use_lod);
        lod.set_visible_only(render.lod_visible_only);

        let mut presets = QualityPresetManager::new(
            capabilities,
            render.device_pixel_ratio,
            render.space_size,
            DECORATION_SEED,
        )?
        .with_simplify_meshes(render.simplify_meshes)
        .with_labels(render.show_labels);
        presets.set_profiler(config.debug.profiler);

        let mut registry = EntityRegistry::new();
        let fly = FlyCamera::new(Vec3::new(0.0, 0.0, 1_000.0), fly_settings(config));
        presets.set_quality_preset_by_name(&render.quality_preset, &mut registry, &mut lod, fly.position)?;
        presets.set_render_distance(render.render_distance)?;

        let camera = Camera {
            fov_y: config.camera.fov_degrees.to_radians(),
            near: config.camera.near,
            far: presets.settings().render_distance,
            ..Camera::default()
        };

        let perf = &config.performance;
        let monitor = AdaptivePerformanceMonitor::new(MonitorConfig {
            enabled: perf.adaptive,
            sample_interval_frames: perf.sample_interval_frames,
            window: perf.sample_window,
            low_fps: perf.low_fps,
            high_fps: perf.high_fps,
        });

        let mut viewer = Self {
            config: config.clone(),
            registry,
            lod,
            visibility: VisibilityController::new(render.dynamic_rendering, presets.labels_enabled()),
            presets,
            monitor,
            animator: QualityAnimator::default(),
            fps: FpsCounter::new(),
            camera,
            fly,
            keyboard: KeyboardState::new(),
            pointer: PointerState::new(),
            ingestor: SnapshotIngestor::new(),
            layout: None,
            draw_list: DrawList::new(),
            selected: None,
            hovered: None,
            frame: 0,
        };
        viewer.sync_mode_flags();
        tracing::info!(mode = %viewer.presets.mode(), "viewer ready");
        Ok(viewer)
    }

    // --- Layout ---

    pub fn attach_layout_worker(&mut self, worker: LayoutWorker) {
        self.layout = Some(worker);
    }

    /// Send a raw graph to the attached layout worker.
    pub fn request_layout(&self, request: LayoutRequest) -> Result<(), ViewerError> {
        self.layout
            .as_ref()
            .ok_or(ViewerError::LayoutDisconnected)?
            .request(request)
    }

    /// Queue an already laid-out snapshot for ingestion.
    pub fn load_snapshot(&mut self, snapshot: LayoutSnapshot) {
        self.ingestor.enqueue(snapshot);
    }

    /// Poll the layout worker and merge one batch of queued entities.
    pub fn between_frames(&mut self) -> Result<IngestStep, ViewerError> {
        if let Some(worker) = &self.layout
            && let Some(snapshot) = worker.poll()?
        {
            self.ingestor.enqueue(snapshot);
        }
        let step = self.ingestor.step(&mut self.registry);
        if step.registered > 0 {
            self.presets.refresh_batch(&mut self.registry);
        }
        Ok(step)
    }

    pub fn ingest_pending(&self) -> usize {
        self.ingestor.pending()
    }

    // --- Frame ---

    /// Run one frame. `dt` is in seconds, `now_ms` a monotonic clock.
    pub fn frame(&mut self, dt: f32, now_ms: f64) -> FrameStats {
        self.frame += 1;
        self.presets.profiler_mut().begin(ProfileStage::Frame);

        self.fly.update(&self.keyboard, &self.pointer, dt, now_ms);
        self.fly.apply_to(&mut self.camera);
        self.camera.far = self.presets.settings().render_distance;
        let eye = self.camera.position;

        let frustum = Frustum::from_view_projection(&self.camera.view_projection_matrix());
        self.visibility.update_frustum_flags(&mut self.registry, &frustum);

        self.presets.profiler_mut().begin(ProfileStage::Lod);
        let lod = self
            .lod
            .evaluate(&mut self.registry.parts_mut(), self.presets.context(), eye);
        self.presets.profiler_mut().end(ProfileStage::Lod);

        self.presets.profiler_mut().begin(ProfileStage::Visibility);
        let visibility = self.visibility.resolve(&mut self.registry, &frustum, eye);
        self.presets.profiler_mut().end(ProfileStage::Visibility);

        self.presets.profiler_mut().begin(ProfileStage::Animations);
        if self.animator.tick(self.presets.context()) {
            let mut parts = self.registry.parts_mut();
            for object in parts.objects.values_mut() {
                self.animator.apply(object, parts.resources);
            }
        }
        self.presets.profiler_mut().end(ProfileStage::Animations);

        self.fps.frame(now_ms);
        let fps = self.fps.fps();
        if fps > 0
            && let Some(event) = self.monitor.on_frame(fps as f32, self.presets.context().is_performance())
        {
            self.presets.on_monitor_event(
                event,
                self.config.performance.degraded_render_distance,
                &mut self.registry,
                &mut self.lod,
                eye,
            );
            self.sync_mode_flags();
        }

        self.presets.profiler_mut().begin(ProfileStage::Rendering);
        self.draw_list = build_draw_list(&self.registry, self.presets.batch());
        self.presets.profiler_mut().end(ProfileStage::Rendering);

        self.keyboard.clear_transients();
        self.pointer.clear_transients();
        self.presets.profiler_mut().end(ProfileStage::Frame);

        FrameStats {
            frame: self.frame,
            fps,
            mode: self.presets.mode(),
            visibility,
            lod,
            draw_items: self.draw_list.len(),
            instances: self.draw_list.instance_count(),
            labels: self.draw_list.label_count(),
            resources: self.registry.resources().counts(),
            tiers: self.tier_histogram(),
        }
    }

    fn tier_histogram(&self) -> [usize; 4] {
        let mut tiers = [0; 4];
        for node in self.registry.nodes() {
            let slot = match node.current_lod() {
                LodTier::None => 0,
                LodTier::Far => 1,
                LodTier::Medium => 2,
                LodTier::Close => 3,
            };
            tiers[slot] += 1;
        }
        tiers
    }

    fn sync_mode_flags(&mut self) {
        self.visibility.labels_enabled = self.presets.labels_enabled();
        self.animator.set_enabled(self.presets.animations_enabled());
    }

    // --- Input ---

    pub fn key_event(&mut self, event: RawKeyEvent, now_ms: f64) {
        self.keyboard.process_raw(event);
        if event.repeat || event.state != ElementState::Pressed {
            return;
        }
        let PhysicalKey::Code(code) = event.key else {
            return;
        };
        let target = match code {
            KeyCode::KeyF => self.selected.clone(),
            KeyCode::ArrowLeft | KeyCode::ArrowRight => self.selected_endpoint(code == KeyCode::ArrowLeft),
            _ => None,
        };
        if let Some(id) = target
            && let Err(e) = self.focus_on_object(&id, now_ms)
        {
            tracing::warn!("focus failed: {e}");
        }
    }

    fn selected_endpoint(&self, start: bool) -> Option<EntityId> {
        let entity = self.registry.entity(self.selected.as_ref()?)?;
        match &entity.kind {
            EntityKind::Relationship { start_id, end_id } => {
                Some(if start { start_id.clone() } else { end_id.clone() })
            }
            EntityKind::Node { .. } => None,
        }
    }

    pub fn keyboard_mut(&mut self) -> &mut KeyboardState {
        &mut self.keyboard
    }

    pub fn pointer_mut(&mut self) -> &mut PointerState {
        &mut self.pointer
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.camera.set_aspect_ratio(width, height);
    }

    /// Hover test at `ndc`. Suppressed while something is selected or the
    /// pointer is locked.
    pub fn pointer_moved(&mut self, ndc: Vec2) -> Option<SelectionInfo> {
        if self.selected.is_some() || self.pointer.locked() {
            return None;
        }
        let ray = self.camera.ray_from_ndc(ndc);
        let hit = pick(&self.registry, &ray, PICK_LINE_THRESHOLD).map(|h| h.id);
        if hit != self.hovered {
            let previous = std::mem::replace(&mut self.hovered, hit.clone());
            self.set_highlight(previous, Highlight::None);
            self.set_highlight(hit, Highlight::Hovered);
        }
        self.hover()
    }

    /// Select whatever is under `ndc`, or clear the selection on a miss.
    pub fn click(&mut self, ndc: Vec2) -> Option<SelectionInfo> {
        let ray = self.camera.ray_from_ndc(ndc);
        match pick(&self.registry, &ray, PICK_LINE_THRESHOLD) {
            Some(hit) => {
                self.select(hit.id);
                self.selection()
            }
            None => {
                self.clear_selection();
                None
            }
        }
    }

    pub fn select(&mut self, id: EntityId) {
        if let Some(hovered) = self.hovered.take() {
            self.set_highlight(Some(hovered), Highlight::None);
        }
        let previous = self.selected.take();
        self.set_highlight(previous, Highlight::None);
        self.set_highlight(Some(id.clone()), Highlight::Selected);
        tracing::debug!(%id, "selected");
        self.selected = Some(id);
    }

    pub fn clear_selection(&mut self) {
        let previous = self.selected.take();
        self.set_highlight(previous, Highlight::None);
    }

    fn set_highlight(&mut self, id: Option<EntityId>, highlight: Highlight) {
        if let Some(object) = id.and_then(|id| self.registry.get_mut(&id)) {
            object.highlight = highlight;
        }
    }

    pub fn selection(&self) -> Option<SelectionInfo> {
        self.registry
            .entity(self.selected.as_ref()?)
            .map(SelectionInfo::from_entity)
    }

    pub fn selection_json(&self) -> Result<Option<String>, ViewerError> {
        Ok(self.selection().map(|s| s.to_json()).transpose()?)
    }

    pub fn hover(&self) -> Option<SelectionInfo> {
        self.registry
            .entity(self.hovered.as_ref()?)
            .map(SelectionInfo::from_entity)
    }

    /// Fly to a point in front of the object, looking at it.
    pub fn focus_on_object(&mut self, id: &EntityId, now_ms: f64) -> Result<(), ViewerError> {
        let object = self
            .registry
            .get(id)
            .ok_or_else(|| ViewerError::UnknownObject(id.clone()))?;
        let center = object.position();
        let radius = object.bounding_radius(self.registry.resources());
        let settings = self.fly.settings();
        let min_distance = settings.min_focus_distance.max(radius);
        let duration = settings.focus_duration_ms;
        self.fly
            .focus_on(center + FOCUS_OFFSET, center, duration, now_ms, min_distance);
        Ok(())
    }

    // --- Runtime controls ---

    pub fn set_quality_preset(&mut self, name: &str) -> Result<PresetChange, ViewerError> {
        let change = self.presets.set_quality_preset_by_name(
            name,
            &mut self.registry,
            &mut self.lod,
            self.camera.position,
        )?;
        self.sync_mode_flags();
        Ok(change)
    }

    pub fn set_render_distance(&mut self, distance: f32) -> Result<(), ViewerError> {
        self.presets.set_render_distance(distance)?;
        self.camera.far = self.presets.settings().render_distance;
        Ok(())
    }

    pub fn set_space_size(&mut self, space_size: f32) -> Result<(), ViewerError> {
        self.presets.set_space_size(space_size)?;
        self.config.render.space_size = space_size;
        Ok(())
    }

    pub fn set_use_lod(&mut self, enabled: bool) {
        self.lod.set_enabled(enabled);
    }

    pub fn set_dynamic_rendering(&mut self, enabled: bool) {
        self.visibility.dynamic = enabled;
    }

    pub fn set_adaptive_performance(&mut self, enabled: bool) {
        self.monitor.set_enabled(enabled);
    }

    /// Force performance mode on, or return to the user preset.
    pub fn set_performance_mode(&mut self, enabled: bool) -> Option<PresetChange> {
        let change = self.presets.set_performance_mode(
            enabled,
            &mut self.registry,
            &mut self.lod,
            self.camera.position,
        );
        self.sync_mode_flags();
        change
    }

    pub fn set_simplify_meshes(&mut self, simplify: bool) {
        self.presets.set_simplify_meshes(simplify, &mut self.registry);
    }

    /// Start or stop stage timing.
    pub fn set_profiler(&mut self, active: bool) {
        self.presets.set_profiler(active);
        self.config.debug.profiler = active;
    }

    /// Latest stage timings with the current FPS rating, while profiling.
    pub fn profiler_report(&self) -> Option<String> {
        let profiler = self.presets.profiler();
        profiler.is_active().then(|| profiler.report(self.fps.fps()))
    }

    // --- Accessors ---

    pub fn registry(&self) -> &EntityRegistry {
        &self.registry
    }

    pub fn presets(&self) -> &QualityPresetManager {
        &self.presets
    }

    pub fn monitor(&self) -> &AdaptivePerformanceMonitor {
        &self.monitor
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn fly_camera(&self) -> &FlyCamera {
        &self.fly
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    pub fn status_line(&self) -> String {
        let base = self.presets.describe();
        if self.config.debug.show_fps {
            format!("{base} | {} fps", self.fps.fps())
        } else {
            base
        }
    }

    /// Release the batch, stop the layout worker and dispose every resource.
    /// Returns the counts that were live beforehand.
    pub fn teardown(&mut self) -> ResourceCounts {
        self.presets.release(&mut self.registry);
        if let Some(mut worker) = self.layout.take() {
            worker.shutdown();
        }
        self.selected = None;
        self.hovered = None;
        self.draw_list.clear();
        self.registry.teardown()
    }
}

fn fly_settings(config: &Config) -> FlySettings {
    let camera = &config.camera;
    FlySettings {
        move_speed: camera.move_speed,
        boost_factor: camera.boost_factor,
        mouse_sensitivity: camera.mouse_sensitivity,
        speed_multiplier_min: camera.speed_multiplier_min,
        speed_multiplier_max: camera.speed_multiplier_max,
        speed_multiplier_step: camera.speed_multiplier_step,
        indicator_ms: f64::from(camera.speed_indicator_seconds) * 1_000.0,
        focus_duration_ms: f64::from(camera.focus_duration_ms),
        min_focus_distance: camera.min_focus_distance,
    }
}
