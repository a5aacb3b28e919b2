use super::*;
use crate::render::recording::{DrawCommand, RecordingBackend};

fn root(mode: FrameloopMode) -> RootState<RecordingBackend> {
    let mut gfx = RecordingBackend::new();
    let surface = gfx.make_surface(10, 10).unwrap();
    RootState::new(gfx, surface, &MountOpts::default().with_frameloop(mode))
}

#[test]
fn invalidate_caps_pending_frames() {
    let mut r = root(FrameloopMode::Demand);
    for _ in 0..100 {
        assert!(r.invalidate());
    }
    assert_eq!(r.frames(), MAX_PENDING_FRAMES);
}

#[test]
fn never_and_inactive_roots_ignore_invalidate() {
    let mut r = root(FrameloopMode::Never);
    assert!(!r.invalidate());
    assert_eq!(r.frames(), 0);

    let mut r = root(FrameloopMode::Demand);
    r.active = false;
    assert!(!r.invalidate());
}

#[test]
fn subscribe_counts_manual_and_invalidates() {
    let mut r = root(FrameloopMode::Demand);
    let unsub = r.subscribe(
        CallbackCell::new(|_, _| Ok(())),
        FrameOpts {
            priority: 1,
            ..FrameOpts::default()
        },
    );
    assert_eq!(r.manual_count(), 1);
    assert_eq!(r.frames(), 1);
    assert!(unsub.unsubscribe());
    assert_eq!(r.manual_count(), 0);
    assert_eq!(r.subscriber_count(), 0);
}

#[test]
fn manual_render_flushes_root_surface() {
    let mut r = root(FrameloopMode::Always);
    r.render().unwrap();
    assert_eq!(
        r.gfx().commands().last().map(|c| c.command.clone()),
        Some(DrawCommand::Flush)
    );
}

#[test]
fn render_after_release_is_structural() {
    let mut r = root(FrameloopMode::Always);
    r.release();
    assert!(r.surface().is_none());
    assert!(r.render().unwrap_err().is_structural());
    assert_eq!(
        r.gfx().live(crate::render::backend::ResourceKind::Surface),
        0
    );
}
