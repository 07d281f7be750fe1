// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Wires the stages together: schedule, render in a bounded pool,
//! collect and order, assemble, encode.

use crossbeam::channel;

use animation::{AnimationEncoder, Assembler, Delays};
use collector::{Collector, Progress};
use config::Config;
use error::{Error, Result};
use pool::{CancelToken, WorkerPool};
use render::{FrameResult, Raster, Renderer};
use scheduler::{FrameTask, Scheduler};

/// The join point of the pool.  Submits every task from a scoped
/// thread while the calling thread collects, and returns only once
/// every worker has finished.  Should collection fail, the pool is
/// cancelled so that the remaining workers wind down.
pub fn execute<I, F, P>(
    pool: &WorkerPool,
    tasks: I,
    work: &F,
    collector: &Collector,
    progress: &mut P,
) -> Result<Vec<Raster>>
where
    I: IntoIterator + Send,
    I::Item: Send,
    F: Fn(I::Item, &CancelToken) -> Result<FrameResult> + Sync,
    P: Progress + ?Sized,
{
    let (sink, results) = channel::unbounded();
    let outcome = crossbeam::scope(|scope| {
        scope.spawn(move |scope| {
            let submitted = pool.run(scope, tasks, work, sink);
            debug!("submitted {} tasks", submitted);
        });
        let collected = collector.collect(&results, progress);
        if collected.is_err() {
            pool.cancel();
        }
        collected
    });
    match outcome {
        Ok(collected) => collected,
        Err(_) => Err(Error::WorkerPanicked),
    }
}

/// Renders every frame `config` describes and returns them in order.
/// An inverted sweep fails here, before any frame is scheduled.
pub fn render_frames<P>(config: &Config, progress: &mut P) -> Result<Vec<Raster>>
where
    P: Progress + ?Sized,
{
    let scheduler = Scheduler::new(config)?;
    if scheduler.is_empty() {
        return Ok(Vec::new());
    }
    info!(
        "rendering {} frames of {}x{} on up to {} threads",
        scheduler.len(),
        config.dimension,
        config.dimension,
        config.threads.max(1)
    );

    let renderer = Renderer::new(&config.palette, config.bailout, config.endpoints);
    let pool = WorkerPool::new(config.threads);
    let collector = Collector::new(scheduler.len()).with_timeout(config.frame_timeout);
    let work = |task: FrameTask, cancel: &CancelToken| {
        debug!("frame {}: exponent {}", task.sequence_index, task.exponent);
        renderer.render_until(&task, cancel)
    };
    let frames = execute(&pool, scheduler.tasks(), &work, &collector, progress)?;
    info!("rendered {} frames", frames.len());
    Ok(frames)
}

/// Runs the whole pipeline and hands the animation to `encoder`.
/// Returns the number of frames encoded, or `None` for a run with no
/// frames, in which case the encoder is never called.
pub fn run<E, P>(config: &Config, encoder: &mut E, progress: &mut P) -> Result<Option<usize>>
where
    E: AnimationEncoder + ?Sized,
    P: Progress + ?Sized,
{
    let frames = render_frames(config, progress)?;
    Assembler::new(Delays::Constant(config.delay), config.loop_count()).deliver(frames, encoder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use animation::{Animation, LoopCount};
    use planes::Endpoints;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::thread;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        calls: usize,
        frames: usize,
        loop_count: Option<LoopCount>,
    }

    impl AnimationEncoder for Recorder {
        fn encode(&mut self, animation: &Animation) -> Result<()> {
            self.calls += 1;
            self.frames = animation.frames.len();
            self.loop_count = Some(animation.loop_count);
            Ok(())
        }
    }

    fn small(frames: usize) -> Config {
        Config {
            dimension: 12,
            frames,
            iterations: 30,
            power_start: 2.0,
            power_end: 8.0,
            threads: 2,
            ..Config::default()
        }
    }

    #[test]
    fn inverted_range_renders_and_writes_nothing() {
        let config = Config {
            power_start: 8.0,
            power_end: 2.0,
            ..small(5)
        };
        let mut rec = Recorder::default();
        let mut updates = 0;
        match run(&config, &mut rec, &mut |_: usize, _: usize| updates += 1) {
            Err(Error::InvalidParameterRange { .. }) => {}
            other => panic!("expected InvalidParameterRange, got {:?}", other),
        }
        assert_eq!(updates, 0);
        assert_eq!(rec.calls, 0);
    }

    #[test]
    fn zero_frames_never_reach_the_encoder() {
        let mut rec = Recorder::default();
        let encoded = run(&small(0), &mut rec, &mut |_: usize, _: usize| {}).unwrap();
        assert_eq!(encoded, None);
        assert_eq!(rec.calls, 0);
    }

    #[test]
    fn every_frame_is_rendered_once() {
        let mut rec = Recorder::default();
        let mut last = (0, 0);
        let encoded = run(&small(6), &mut rec, &mut |done: usize, total: usize| {
            last = (done, total)
        })
        .unwrap();
        assert_eq!(encoded, Some(6));
        assert_eq!(rec.calls, 1);
        assert_eq!(rec.frames, 6);
        assert_eq!(rec.loop_count, Some(LoopCount::Finite(6)));
        assert_eq!(last, (6, 6));
    }

    #[test]
    fn pooled_frames_match_direct_renders() {
        let config = small(4);
        let frames = render_frames(&config, &mut |_: usize, _: usize| {}).unwrap();
        let scheduler = Scheduler::new(&config).unwrap();
        let renderer = Renderer::new(&config.palette, config.bailout, config.endpoints);
        for (task, frame) in scheduler.tasks().zip(frames) {
            let direct = renderer.render(&task).unwrap();
            assert_eq!(direct.raster.into_raw(), frame.into_raw());
        }
    }

    // Later frames finish first; the output order must not care.
    #[test]
    fn late_early_frames_still_come_out_in_order() {
        let config = Config {
            endpoints: Endpoints::Inclusive,
            ..small(4)
        };
        let scheduler = Scheduler::new(&config).unwrap();
        let renderer = Renderer::new(&config.palette, config.bailout, config.endpoints);
        let arrivals = Mutex::new(vec![]);
        let work = |task: FrameTask, cancel: &CancelToken| {
            thread::sleep(Duration::from_millis(40 * (4 - task.sequence_index) as u64));
            let result = renderer.render_until(&task, cancel);
            arrivals.lock().unwrap().push(task.sequence_index);
            result
        };
        let pool = WorkerPool::new(4);
        let frames = execute(
            &pool,
            scheduler.tasks(),
            &work,
            &Collector::new(4),
            &mut |_: usize, _: usize| {},
        )
        .unwrap();
        assert_eq!(*arrivals.lock().unwrap(), vec![3, 2, 1, 0]);
        assert_eq!(frames.len(), 4);
        for (task, frame) in scheduler.tasks().zip(frames) {
            let direct = renderer.render(&task).unwrap();
            assert_eq!(direct.raster.into_raw(), frame.into_raw());
        }
    }

    #[test]
    fn concurrency_stays_within_the_limit() {
        for limit in 1..4 {
            let config = small(8);
            let scheduler = Scheduler::new(&config).unwrap();
            let renderer = Renderer::new(&config.palette, config.bailout, config.endpoints);
            let running = AtomicUsize::new(0);
            let peak = AtomicUsize::new(0);
            let work = |task: FrameTask, cancel: &CancelToken| {
                let now = running.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(10));
                let result = renderer.render_until(&task, cancel);
                running.fetch_sub(1, Ordering::SeqCst);
                result
            };
            let pool = WorkerPool::new(limit);
            let frames = execute(
                &pool,
                scheduler.tasks(),
                &work,
                &Collector::new(8),
                &mut |_: usize, _: usize| {},
            )
            .unwrap();
            assert_eq!(frames.len(), 8);
            assert!(peak.load(Ordering::SeqCst) <= limit);
            assert!(pool.permits().high_water() <= limit);
        }
    }

    #[test]
    fn a_panicking_worker_is_reported() {
        let config = small(3);
        let scheduler = Scheduler::new(&config).unwrap();
        let renderer = Renderer::new(&config.palette, config.bailout, config.endpoints);
        let work = |task: FrameTask, cancel: &CancelToken| {
            if task.sequence_index == 1 {
                panic!("boom");
            }
            renderer.render_until(&task, cancel)
        };
        let pool = WorkerPool::new(2);
        let result = execute(
            &pool,
            scheduler.tasks(),
            &work,
            &Collector::new(3),
            &mut |_: usize, _: usize| {},
        );
        match result {
            Err(Error::WorkerPanicked) => {}
            other => panic!("expected WorkerPanicked, got {:?}", other),
        }
    }

    #[test]
    fn a_stuck_frame_times_out_and_the_rest_wind_down() {
        let config = Config {
            frame_timeout: Some(Duration::from_millis(50)),
            ..small(3)
        };
        let scheduler = Scheduler::new(&config).unwrap();
        let renderer = Renderer::new(&config.palette, config.bailout, config.endpoints);
        let work = |task: FrameTask, cancel: &CancelToken| {
            if task.sequence_index == 0 {
                while !cancel.is_cancelled() {
                    thread::sleep(Duration::from_millis(5));
                }
            }
            renderer.render_until(&task, cancel)
        };
        let pool = WorkerPool::new(3);
        let collector = Collector::new(3).with_timeout(config.frame_timeout);
        let result = execute(
            &pool,
            scheduler.tasks(),
            &work,
            &collector,
            &mut |_: usize, _: usize| {},
        );
        match result {
            Err(Error::StalledTask { total: 3, .. }) => {}
            other => panic!("expected StalledTask, got {:?}", other),
        }
        assert!(pool.cancel_token().is_cancelled());
    }
}
