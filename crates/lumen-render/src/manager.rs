//! Owner of the global quality mode.
//!
//! The manager is the only writer of the [`QualityContext`]. Everything a
//! preset switch touches (renderer settings, LOD bias, node rebuilds, the
//! instanced batch, background decoration, label and animation switches)
//! happens inside [`QualityPresetManager::apply`], in that order.

use glam::Vec3;
use lumen_lod::LodEngine;
use lumen_scene::{EntityRegistry, QualityContext, QualityMode};

use crate::capabilities::{Effect, RendererCapabilities};
use crate::error::{RenderError, positive};
use crate::instancing::InstancedBatch;
use crate::monitor::MonitorEvent;
use crate::preset::QualityPreset;
use crate::profiler::{ProfileStage, StageProfiler};
use crate::settings::RendererSettings;
use crate::starfield::{GroundLight, Starfield};

/// Outcome of one preset application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PresetChange {
    /// Mode actually applied, after capability fallback.
    pub mode: QualityMode,
    pub mode_changed: bool,
    /// Nodes rebuilt under the new mode.
    pub rebuilt: usize,
}

pub struct QualityPresetManager {
    ctx: QualityContext,
    user_preset: QualityMode,
    /// Performance mode was forced by the monitor or a runtime toggle.
    forced: bool,
    settings: RendererSettings,
    capabilities: RendererCapabilities,
    device_pixel_ratio: f32,
    simplify_meshes: bool,
    show_labels: bool,
    labels_enabled: bool,
    animations_enabled: bool,
    batch: Option<InstancedBatch>,
    starfield: Starfield,
    ground: GroundLight,
    space_size: f32,
    seed: u64,
    profiler: StageProfiler,
}

impl QualityPresetManager {
    /// Create a manager in standard mode. Nothing is applied to the scene until
    /// the first [`QualityPresetManager::set_quality_preset`].
    pub fn new(
        capabilities: RendererCapabilities,
        device_pixel_ratio: f32,
        space_size: f32,
        seed: u64,
    ) -> Result<Self, RenderError> {
        let device_pixel_ratio = positive("device pixel ratio", device_pixel_ratio)?;
        let ground = GroundLight::for_space_size(space_size)?;
        Ok(Self {
            ctx: QualityContext::default(),
            user_preset: QualityMode::Standard,
            forced: false,
            settings: RendererSettings::default(),
            capabilities,
            device_pixel_ratio,
            simplify_meshes: false,
            show_labels: true,
            labels_enabled: true,
            animations_enabled: true,
            batch: None,
            starfield: Starfield::default(),
            ground,
            space_size,
            seed,
            profiler: StageProfiler::default(),
        })
    }

    pub fn with_simplify_meshes(mut self, simplify: bool) -> Self {
        self.simplify_meshes = simplify;
        self
    }

    pub fn with_labels(mut self, show: bool) -> Self {
        self.show_labels = show;
        self.labels_enabled = show && !self.ctx.is_performance();
        self
    }

    /// Read access to the global mode for the other stages.
    pub fn context(&self) -> &QualityContext {
        &self.ctx
    }

    pub fn mode(&self) -> QualityMode {
        self.ctx.mode()
    }

    pub fn user_preset(&self) -> QualityMode {
        self.user_preset
    }

    pub fn is_forced(&self) -> bool {
        self.forced
    }

    pub fn settings(&self) -> &RendererSettings {
        &self.settings
    }

    pub fn capabilities(&self) -> &RendererCapabilities {
        &self.capabilities
    }

    pub fn batch(&self) -> Option<&InstancedBatch> {
        self.batch.as_ref()
    }

    pub fn starfield(&self) -> &Starfield {
        &self.starfield
    }

    pub fn ground_light(&self) -> &GroundLight {
        &self.ground
    }

    pub fn space_size(&self) -> f32 {
        self.space_size
    }

    pub fn labels_enabled(&self) -> bool {
        self.labels_enabled
    }

    pub fn animations_enabled(&self) -> bool {
        self.animations_enabled
    }

    pub fn simplify_meshes(&self) -> bool {
        self.simplify_meshes
    }

    pub fn profiler(&self) -> &StageProfiler {
        &self.profiler
    }

    /// Stage timings shared with the frame loop.
    pub fn profiler_mut(&mut self) -> &mut StageProfiler {
        &mut self.profiler
    }

    pub fn set_profiler(&mut self, active: bool) {
        self.profiler.set_active(active);
    }

    /// Select a preset on behalf of the user. Clears any forced performance mode.
    pub fn set_quality_preset(
        &mut self,
        mode: QualityMode,
        registry: &mut EntityRegistry,
        lod: &mut LodEngine,
        camera: Vec3,
    ) -> PresetChange {
        self.user_preset = mode;
        self.forced = false;
        self.apply(mode, registry, lod, camera)
    }

    /// Like [`QualityPresetManager::set_quality_preset`], taking a preset name.
    pub fn set_quality_preset_by_name(
        &mut self,
        name: &str,
        registry: &mut EntityRegistry,
        lod: &mut LodEngine,
        camera: Vec3,
    ) -> Result<PresetChange, RenderError> {
        let mode = name
            .parse::<QualityMode>()
            .map_err(|_| RenderError::UnknownPreset(name.to_string()))?;
        Ok(self.set_quality_preset(mode, registry, lod, camera))
    }

    /// Enter performance mode without touching the user preset.
    /// No-op when performance mode is already active.
    pub fn force_performance(
        &mut self,
        registry: &mut EntityRegistry,
        lod: &mut LodEngine,
        camera: Vec3,
    ) -> Option<PresetChange> {
        if self.ctx.is_performance() {
            return None;
        }
        self.forced = true;
        Some(self.apply(QualityMode::Performance, registry, lod, camera))
    }

    /// Return to the user preset after a forced performance mode.
    pub fn restore(&mut self, registry: &mut EntityRegistry, lod: &mut LodEngine, camera: Vec3) -> Option<PresetChange> {
        if !self.forced {
            return None;
        }
        self.forced = false;
        Some(self.apply(self.user_preset, registry, lod, camera))
    }

    pub fn set_performance_mode(
        &mut self,
        enabled: bool,
        registry: &mut EntityRegistry,
        lod: &mut LodEngine,
        camera: Vec3,
    ) -> Option<PresetChange> {
        if enabled {
            self.force_performance(registry, lod, camera)
        } else {
            self.restore(registry, lod, camera)
        }
    }

    /// React to the adaptive monitor. A degrade also lowers the render distance
    /// to at most `degraded_render_distance`.
    pub fn on_monitor_event(
        &mut self,
        event: MonitorEvent,
        degraded_render_distance: f32,
        registry: &mut EntityRegistry,
        lod: &mut LodEngine,
        camera: Vec3,
    ) -> Option<PresetChange> {
        match event {
            MonitorEvent::Degrade => {
                let change = self.force_performance(registry, lod, camera);
                self.settings.clamp_render_distance(degraded_render_distance);
                change
            }
            MonitorEvent::Restore => self.restore(registry, lod, camera),
        }
    }

    /// Apply `mode` to renderer, LOD engine and scene.
    ///
    /// Re-applying the active mode only re-applies renderer settings; nodes
    /// built under the current mode and epoch are left alone.
    pub fn apply(
        &mut self,
        mode: QualityMode,
        registry: &mut EntityRegistry,
        lod: &mut LodEngine,
        camera: Vec3,
    ) -> PresetChange {
        self.profiler.begin(ProfileStage::ApplyPreset);
        let mode = self.resolve(mode);
        let preset = QualityPreset::for_mode(mode);

        self.settings
            .apply_preset(&preset, self.device_pixel_ratio, &mut self.capabilities);
        lod.set_bias(preset.lod_bias);

        let mode_changed = self.ctx.switch(mode);
        let stats = lod.rebuild_stale(&mut registry.parts_mut(), &self.ctx, camera);

        self.sync_batch(registry);

        let (stars, enhanced) = preset.star_density();
        if self.starfield.len() != stars as usize || self.starfield.enhanced != enhanced {
            self.starfield = Starfield::generate(self.seed, stars, self.space_size, enhanced);
        }

        let performance = mode == QualityMode::Performance;
        self.labels_enabled = self.show_labels && !performance;
        self.animations_enabled = !performance;

        if mode_changed {
            log::info!(
                "Quality mode {} (epoch {}, {} nodes rebuilt)",
                mode,
                self.ctx.epoch(),
                stats.rebuilt
            );
        }

        self.profiler.end(ProfileStage::ApplyPreset);
        PresetChange {
            mode,
            mode_changed,
            rebuilt: stats.rebuilt,
        }
    }

    /// Quality needs the environment map; without it we fall back to standard.
    fn resolve(&mut self, mode: QualityMode) -> QualityMode {
        if mode == QualityMode::Quality
            && !self
                .capabilities
                .check_and_warn(Effect::EnvironmentMap, "the standard preset")
        {
            QualityMode::Standard
        } else {
            mode
        }
    }

    fn sync_batch(&mut self, registry: &mut EntityRegistry) {
        let wanted = self.ctx.is_performance() && self.simplify_meshes;
        match (wanted, self.batch.is_some()) {
            (true, false) => self.batch = Some(InstancedBatch::build(registry)),
            (false, true) => {
                if let Some(batch) = self.batch.take() {
                    batch.dispose(registry);
                }
            }
            _ => {}
        }
    }

    /// Rebuild the batch from the current registry, e.g. after new nodes arrived.
    pub fn refresh_batch(&mut self, registry: &mut EntityRegistry) {
        if let Some(batch) = self.batch.take() {
            batch.dispose(registry);
        }
        self.sync_batch(registry);
    }

    pub fn set_simplify_meshes(&mut self, simplify: bool, registry: &mut EntityRegistry) {
        self.simplify_meshes = simplify;
        self.sync_batch(registry);
    }

    pub fn set_render_distance(&mut self, distance: f32) -> Result<(), RenderError> {
        self.settings.set_render_distance(distance)
    }

    /// Resize the layout cube: regenerates the starfield and ground light.
    pub fn set_space_size(&mut self, space_size: f32) -> Result<(), RenderError> {
        let ground = GroundLight::for_space_size(space_size)?;
        self.ground = ground;
        self.space_size = space_size;
        let (stars, enhanced) = QualityPreset::for_mode(self.ctx.mode()).star_density();
        self.starfield = Starfield::generate(self.seed, stars, space_size, enhanced);
        log::info!("Space size set to {space_size}");
        Ok(())
    }

    /// Status line text for the current mode.
    pub fn describe(&self) -> String {
        let base = match self.ctx.mode() {
            QualityMode::Quality => "High quality: bloom, ambient occlusion, detailed nodes",
            QualityMode::Standard => "Standard: balanced detail",
            QualityMode::Performance if self.batch.is_some() => "Performance: instanced nodes",
            QualityMode::Performance => "Performance: flat nodes",
        };
        if self.forced {
            format!("{base} (auto, user preset {})", self.user_preset)
        } else {
            base.to_string()
        }
    }

    /// Dispose the instanced batch, if any.
    pub fn release(&mut self, registry: &mut EntityRegistry) {
        if let Some(batch) = self.batch.take() {
            batch.dispose(registry);
        }
    }
}
