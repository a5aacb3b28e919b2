use super::*;
use crate::render::recording::RecordingBackend;

fn noop() -> CallbackCell<RecordingBackend> {
    CallbackCell::new(|_, _| Ok(()))
}

fn opts(priority: i32) -> FrameOpts {
    FrameOpts {
        priority,
        ..FrameOpts::default()
    }
}

#[test]
fn sorted_by_priority_with_stable_ties() {
    let mut s = Subscribers::<RecordingBackend>::default();
    let a = s.add(noop(), opts(0));
    let b = s.add(noop(), opts(2));
    let c = s.add(noop(), opts(-1));
    let d = s.add(noop(), opts(0));
    assert_eq!(s.priorities(), vec![-1, 0, 0, 2]);
    let ids: Vec<u64> = s.snapshot(Sequence::Before).iter().map(|(id, _)| *id).collect();
    assert_eq!(ids, vec![c, a, d, b]);
}

#[test]
fn manual_counter_tracks_nonzero_priorities() {
    let mut s = Subscribers::<RecordingBackend>::default();
    let a = s.add(noop(), opts(1));
    let b = s.add(noop(), opts(-3));
    s.add(noop(), opts(0));
    assert_eq!(s.manual(), 2);
    assert!(s.remove(a));
    assert!(!s.remove(a));
    assert!(s.remove(b));
    assert_eq!(s.manual(), 0);
    assert_eq!(s.len(), 1);
}

#[test]
fn snapshot_filters_by_sequence() {
    let mut s = Subscribers::<RecordingBackend>::default();
    s.add(noop(), opts(0));
    s.add(
        noop(),
        FrameOpts {
            priority: 0,
            sequence: Sequence::After,
        },
    );
    assert_eq!(s.snapshot(Sequence::Before).len(), 1);
    assert_eq!(s.snapshot(Sequence::After).len(), 1);
}

#[test]
fn unsubscribe_is_weak() {
    let list = Rc::new(RefCell::new(Subscribers::<RecordingBackend>::default()));
    let id = list.borrow_mut().add(noop(), opts(0));
    let unsub = Unsubscribe::new(&list, id);
    assert_eq!(unsub.id(), id);
    assert!(unsub.unsubscribe());
    assert!(!unsub.unsubscribe());

    let id = list.borrow_mut().add(noop(), opts(0));
    let unsub = Unsubscribe::new(&list, id);
    drop(list);
    assert!(!unsub.unsubscribe());
}

#[test]
fn frame_opts_deserialize_with_defaults() {
    let o: FrameOpts = serde_json::from_str(r#"{"sequence": "after"}"#).unwrap();
    assert_eq!(o.priority, 0);
    assert_eq!(o.sequence, Sequence::After);
}
