mod common;

use std::cell::RefCell;
use std::rc::Rc;

use common::{display_frames, ManualScheduler};
use shaderbg::{AnimationLoop, FrameContext, FrameInputs, HarnessError};

fn recording_loop(
    scheduler: &Rc<ManualScheduler>,
    inputs: &FrameInputs,
    interval_ms: f64,
) -> (shaderbg::CancelHandle, Rc<RefCell<Vec<FrameContext>>>) {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&seen);
    let handle = AnimationLoop::start(Rc::clone(scheduler), inputs.clone(), interval_ms, move |ctx| {
        sink.borrow_mut().push(ctx);
        Ok(())
    })
    .expect("start");
    (handle, seen)
}

#[test]
fn tick_count_is_bounded_by_interval() {
    for interval in [0.0, 1000.0 / 24.0, 50.0, 100.0, 250.0] {
        for hz in [30.0, 60.0, 144.0] {
            let scheduler = Rc::new(ManualScheduler::new());
            let (_handle, seen) = recording_loop(&scheduler, &FrameInputs::new(), interval);

            let frames = display_frames(1000.0, hz, 600);
            scheduler.run_frames(frames.iter().copied());

            let window = frames.last().unwrap() - frames.first().unwrap();
            let bound = if interval == 0.0 {
                frames.len()
            } else {
                (window / interval).floor() as usize + 1
            };
            let ticks = seen.borrow().len();
            assert!(ticks > 0, "interval {interval} @ {hz}Hz never ticked");
            assert!(ticks <= bound, "{ticks} ticks > bound {bound} (interval {interval} @ {hz}Hz)");
        }
    }
}

#[test]
fn ticks_are_sequential_and_strictly_increasing() {
    let scheduler = Rc::new(ManualScheduler::new());
    let (_handle, seen) = recording_loop(&scheduler, &FrameInputs::new(), 20.0);

    scheduler.run_frames(display_frames(0.0, 60.0, 120));

    let seen = seen.borrow();
    assert!(seen.len() > 10);
    for (index, pair) in seen.windows(2).enumerate() {
        assert!(pair[1].elapsed_seconds > pair[0].elapsed_seconds);
        assert_eq!(pair[0].frame_index, index as u64);
    }
}

#[test]
fn elapsed_time_is_measured_from_the_first_frame() {
    let scheduler = Rc::new(ManualScheduler::new());
    let (_handle, seen) = recording_loop(&scheduler, &FrameInputs::new(), 10.0);

    scheduler.run_frame(5000.0);
    assert!(seen.borrow().is_empty());
    scheduler.run_frame(5250.0);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 1);
    assert!((seen[0].elapsed_seconds - 0.25).abs() < 1e-9);
}

#[test]
fn reduced_motion_suspends_and_resumes_without_restart() {
    let scheduler = Rc::new(ManualScheduler::new());
    let inputs = FrameInputs::new();
    let (handle, seen) = recording_loop(&scheduler, &inputs, 10.0);

    scheduler.run_frames([0.0, 20.0, 40.0]);
    assert_eq!(seen.borrow().len(), 2);

    inputs.set_reduced_motion(true);
    scheduler.run_frames([60.0, 80.0, 100.0]);
    assert_eq!(seen.borrow().len(), 2, "no ticks while motion is reduced");
    assert_eq!(scheduler.pending(), 1, "loop keeps scheduling while suspended");
    assert!(!handle.is_cancelled());

    inputs.set_reduced_motion(false);
    scheduler.run_frame(120.0);

    let seen = seen.borrow();
    assert_eq!(seen.len(), 3);
    assert!((seen[2].elapsed_seconds - 0.120).abs() < 1e-9);
    assert!(seen[2].motion_enabled);
}

#[test]
fn cancel_twice_is_harmless_and_final() {
    let scheduler = Rc::new(ManualScheduler::new());
    let (handle, seen) = recording_loop(&scheduler, &FrameInputs::new(), 10.0);

    scheduler.run_frames([0.0, 20.0]);
    assert_eq!(seen.borrow().len(), 1);

    handle.cancel();
    handle.cancel();
    assert!(handle.is_cancelled());
    assert_eq!(scheduler.cancellations(), 1);
    assert_eq!(scheduler.pending(), 0);

    scheduler.run_frames([40.0, 60.0, 80.0]);
    assert_eq!(seen.borrow().len(), 1);
}

#[test]
fn cancel_from_inside_a_tick_stops_the_loop() {
    let scheduler = Rc::new(ManualScheduler::new());
    let slot: Rc<RefCell<Option<shaderbg::CancelHandle>>> = Rc::new(RefCell::new(None));
    let ticks = Rc::new(RefCell::new(0));

    let handle = {
        let slot = Rc::clone(&slot);
        let ticks = Rc::clone(&ticks);
        AnimationLoop::start(Rc::clone(&scheduler), FrameInputs::new(), 0.0, move |_| {
            *ticks.borrow_mut() += 1;
            if let Some(handle) = slot.borrow().as_ref() {
                handle.cancel();
            }
            Ok(())
        })
        .expect("start")
    };
    *slot.borrow_mut() = Some(handle.clone());

    scheduler.run_frames([0.0, 16.0, 32.0, 48.0]);
    assert_eq!(*ticks.borrow(), 1);
    assert_eq!(scheduler.pending(), 0);
    assert!(handle.is_cancelled());
}

#[test]
fn failing_tick_keeps_scheduling() {
    let scheduler = Rc::new(ManualScheduler::new());
    let calls = Rc::new(RefCell::new(0));
    let counter = Rc::clone(&calls);
    let handle = AnimationLoop::start(Rc::clone(&scheduler), FrameInputs::new(), 0.0, move |_| {
        *counter.borrow_mut() += 1;
        Err(HarnessError::Host("lost context".into()))
    })
    .expect("start");

    scheduler.run_frames([0.0, 16.0, 32.0, 48.0]);
    assert_eq!(*calls.borrow(), 3);
    assert_eq!(handle.ticks(), 3);
    assert_eq!(scheduler.pending(), 1);
}

#[test]
fn pointer_is_sampled_each_tick() {
    let scheduler = Rc::new(ManualScheduler::new());
    let inputs = FrameInputs::new();
    let (_handle, seen) = recording_loop(&scheduler, &inputs, 0.0);

    scheduler.run_frame(0.0);
    inputs.set_pointer([10.0, 590.0]);
    scheduler.run_frame(16.0);
    inputs.set_pointer([400.0, 300.0]);
    scheduler.run_frame(32.0);

    let seen = seen.borrow();
    assert_eq!(seen[0].pointer, [10.0, 590.0]);
    assert_eq!(seen[1].pointer, [400.0, 300.0]);
}

#[test]
fn refused_first_request_fails_start() {
    let scheduler = Rc::new(ManualScheduler::new());
    scheduler.refuse_requests();
    let result = AnimationLoop::start(scheduler, FrameInputs::new(), 10.0, |_| Ok(()));
    assert!(matches!(result, Err(HarnessError::Host(_))));
}

#[test]
fn non_finite_interval_is_rejected() {
    let scheduler = Rc::new(ManualScheduler::new());
    let result = AnimationLoop::start(Rc::clone(&scheduler), FrameInputs::new(), f64::NAN, |_| Ok(()));
    assert!(result.is_err());
    assert_eq!(scheduler.pending(), 0);
}
