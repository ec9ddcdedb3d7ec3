use std::{cell::RefCell, rc::Rc};

use super::*;
use crate::{
    pipeline::{params::PassParams, passes::PassKind},
    raster::{BufferId, PixelFormat},
    render::backend::PassInputs,
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct Call {
    kind: PassKind,
    heightmap: Option<BufferId>,
}

/// Copies source to target and logs every invocation into a shared journal.
#[derive(Clone, Default)]
struct Journal(Rc<RefCell<Vec<Call>>>);

impl Journal {
    fn take(&self) -> Vec<Call> {
        std::mem::take(&mut *self.0.borrow_mut())
    }

    fn kinds(&self) -> Vec<PassKind> {
        self.take().into_iter().map(|c| c.kind).collect()
    }
}

impl PassBackend for Journal {
    fn execute(
        &mut self,
        kind: PassKind,
        _params: &PassParams,
        inputs: PassInputs<'_>,
        target: &mut Image,
    ) -> PrettifierResult<()> {
        self.0.borrow_mut().push(Call {
            kind,
            heightmap: inputs.heightmap.map(Image::id),
        });
        target.samples_mut().copy_from_slice(inputs.source.samples());
        Ok(())
    }
}

fn session(cfg: PrettifierConfig) -> (Prettifier<Journal>, Journal) {
    let journal = Journal::default();
    let mut s = Prettifier::with_backends(
        cfg,
        journal.clone(),
        journal.clone(),
        PrettifierOpts::default(),
    )
    .unwrap();
    s.set_heightmap(Some(
        Image::from_fn(8, 8, PixelFormat::R32Float, |x, y, _| (x * y) as f32 / 64.0).unwrap(),
    ))
    .unwrap();
    s.set_satellite(Some(
        Image::filled(8, 8, PixelFormat::Rgba8Unorm, 0.5).unwrap(),
    ));
    (s, journal)
}

fn simple_config() -> PrettifierConfig {
    let mut cfg = PrettifierConfig::default();
    cfg.heightmap.denoise.strength = 1.0;
    cfg.satellite.shadow_removal.passes = 1;
    cfg
}

#[test]
fn missing_inputs_produce_nothing() {
    let journal = Journal::default();
    let mut s = Prettifier::with_backends(
        PrettifierConfig::default(),
        journal.clone(),
        journal.clone(),
        PrettifierOpts::default(),
    )
    .unwrap();
    assert!(s.process_heightmap().unwrap().is_none());
    assert!(s.process_satellite().unwrap().is_none());
    assert!(s.render_preview().unwrap().is_none());
    assert!(journal.take().is_empty());
}

#[test]
fn process_all_runs_both_tables_in_order() {
    let (mut s, journal) = session(simple_config());
    s.process_all().unwrap();
    assert_eq!(
        journal.kinds(),
        [
            PassKind::Denoise,
            PassKind::RidgeSynthesis,
            PassKind::Erosion,
            PassKind::ShadowRemoval,
            PassKind::CavityShading,
        ]
    );
    assert_eq!(s.satellite_output().unwrap().format(), PixelFormat::Rgba8Unorm);
    assert_eq!(s.heightmap_stats().passes_executed, 3);
}

#[test]
fn cavity_prefers_processed_heightmap() {
    let (mut s, journal) = session(simple_config());
    s.process_satellite().unwrap();
    let raw = journal.take();
    assert!(raw.iter().all(|c| c.heightmap == Some(BufferId::DETACHED)));

    s.process_heightmap().unwrap();
    s.process_satellite().unwrap();
    let calls = journal.take();
    let cavity = calls
        .iter()
        .find(|c| c.kind == PassKind::CavityShading)
        .unwrap();
    assert_eq!(cavity.heightmap, s.heightmap_output().map(Image::id));
    assert_ne!(cavity.heightmap, Some(BufferId::DETACHED));
}

#[test]
fn renderer_changes_trigger_nothing() {
    let (mut s, journal) = session(simple_config());
    s.process_all().unwrap();
    journal.take();

    let mut cfg = s.config().clone();
    cfg.renderer.sun_azimuth = 120.0;
    cfg.renderer.shadows = false;
    assert_eq!(s.apply_config(cfg).unwrap(), Retrigger::NONE);
    assert!(journal.take().is_empty());
    assert_eq!(s.config().renderer.sun_azimuth, 120.0);
}

#[test]
fn heightmap_changes_follow_cavity_state() {
    let (mut s, journal) = session(simple_config());

    let mut cfg = s.config().clone();
    cfg.heightmap.ridges.strength = 9.0;
    assert_eq!(s.apply_config(cfg).unwrap(), Retrigger::ALL);
    assert_eq!(journal.kinds().len(), 5);

    let mut cfg = s.config().clone();
    cfg.satellite.cavity.enabled = false;
    let what = s.apply_config(cfg).unwrap();
    assert_eq!(
        what,
        Retrigger {
            heightmap: false,
            satellite: true
        }
    );
    assert_eq!(journal.kinds(), [PassKind::ShadowRemoval]);

    let mut cfg = s.config().clone();
    cfg.heightmap.erosion.octaves = 3;
    let what = s.apply_config(cfg).unwrap();
    assert!(what.heightmap && !what.satellite);
    assert_eq!(journal.kinds().len(), 3);
}

#[test]
fn terrain_bounds_invalidate_heightmap() {
    let old = PrettifierConfig::default();
    let mut new = old.clone();
    new.terrain.max.y = 900.0;
    assert_eq!(Retrigger::between(&old, &new), Retrigger::ALL);

    let mut new = old.clone();
    new.seed = 5;
    assert_eq!(Retrigger::between(&old, &new), Retrigger::ALL);
}

#[test]
fn invalid_config_is_rejected_without_side_effects() {
    let (mut s, journal) = session(simple_config());
    let before = s.config().clone();
    let mut cfg = before.clone();
    cfg.heightmap.denoise.strength = 40.0;
    assert!(s.apply_config(cfg).is_err());
    assert_eq!(s.config(), &before);
    assert!(!s.history().can_undo());
    assert!(journal.take().is_empty());
}

#[test]
fn undo_and_redo_retrigger() {
    let (mut s, journal) = session(simple_config());
    assert_eq!(s.undo().unwrap(), None);

    let mut cfg = s.config().clone();
    cfg.satellite.shadow_removal.passes = 4;
    s.apply_config(cfg).unwrap();
    journal.take();

    let what = s.undo().unwrap().unwrap();
    assert!(what.satellite && !what.heightmap);
    assert_eq!(s.config().satellite.shadow_removal.passes, 1);
    assert_eq!(journal.take().len(), 2);

    s.redo().unwrap().unwrap();
    assert_eq!(s.config().satellite.shadow_removal.passes, 4);
    let kinds = journal.kinds();
    assert_eq!(kinds.iter().filter(|k| **k == PassKind::ShadowRemoval).count(), 4);
}

#[test]
fn seed_change_rebuilds_directions() {
    let (mut s, _journal) = session(simple_config());
    assert_eq!(s.directions().seed(), 123);
    let mut cfg = s.config().clone();
    cfg.seed = 77;
    s.apply_config(cfg).unwrap();
    assert_eq!(s.directions().seed(), 77);
}

#[test]
fn color_heightmap_input_is_rejected() {
    let (mut s, _journal) = session(simple_config());
    let color = Image::filled(2, 2, PixelFormat::Rgba8Unorm, 0.0).unwrap();
    assert!(s.set_heightmap(Some(color)).is_err());
    assert!(s.heightmap_input().is_some());
}

#[test]
fn preview_uses_heightmap_resolution() {
    let (mut s, _journal) = session(simple_config());
    s.process_all().unwrap();
    let preview = s.render_preview().unwrap().unwrap();
    assert_eq!((preview.width(), preview.height()), (8, 8));
    assert_eq!(preview.format(), PixelFormat::Rgba8Unorm);
}

#[test]
fn cpu_session_processes_real_data() {
    let mut s = Prettifier::new(simple_config(), PrettifierOpts::default()).unwrap();
    s.set_heightmap(Some(
        Image::from_fn(16, 16, PixelFormat::R32Float, |x, y, _| {
            ((x as f32 * 0.7).sin() + (y as f32 * 0.4).cos()) * 0.25 + 0.5
        })
        .unwrap(),
    ))
    .unwrap();
    s.process_all().unwrap();
    let out = s.heightmap_output().unwrap();
    assert_ne!(out.fingerprint(), s.heightmap_input().unwrap().fingerprint());
    assert!(s.satellite_output().is_none());
}

#[test]
fn replacing_inputs_withdraws_derived_outputs() {
    let (mut s, _journal) = session(simple_config());
    s.process_all().unwrap();
    assert!(s.heightmap_output().is_some());
    assert!(s.satellite_output().is_some());

    s.set_heightmap(None).unwrap();
    assert!(s.heightmap_output().is_none());
    assert!(s.satellite_output().is_none());
    assert!(s.current_heightmap().is_none());
    assert!(s.process_heightmap().unwrap().is_none());
    assert!(s.render_preview().unwrap().is_none());
    let dir = std::env::temp_dir().join(format!("tp_withdrawn_{}", std::process::id()));
    assert!(!s.export_heightmap(&dir.join("h.png")).unwrap());

    let replacement = Image::filled(4, 4, PixelFormat::R32Float, 0.25).unwrap();
    s.set_heightmap(Some(replacement)).unwrap();
    assert_eq!(s.current_heightmap().unwrap().width(), 4);
    s.process_heightmap().unwrap();
    assert_eq!(s.heightmap_output().unwrap().width(), 4);

    s.process_satellite().unwrap();
    s.set_satellite(None);
    assert!(s.satellite_output().is_none());
    assert!(s.heightmap_output().is_some());
}

#[test]
fn heightmap_swap_keeps_satellite_without_cavity() {
    let mut cfg = simple_config();
    cfg.satellite.cavity.enabled = false;
    let (mut s, _journal) = session(cfg);
    s.process_all().unwrap();
    s.set_heightmap(Some(Image::filled(8, 8, PixelFormat::R32Float, 0.5).unwrap()))
        .unwrap();
    assert!(s.heightmap_output().is_none());
    assert!(s.satellite_output().is_some());
}
