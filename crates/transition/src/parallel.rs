//! Scoped worker pool for phase work

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use crossbeam::queue::SegQueue;
use varia_errors::Error;
use varia_graph::{ExecutionPlan, ModuleId};

fn worker_panicked() -> Error {
    Error::internal("mutator worker panicked")
}

/// Apply `f` to every item, splitting the slice across `workers` threads.
/// Results keep item order.
pub(crate) fn map<T, R, F>(items: &[T], workers: usize, f: F) -> Result<Vec<R>, Error>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    if workers <= 1 || items.len() <= 1 {
        return Ok(items.iter().map(f).collect());
    }

    let chunk_size = items.len().div_ceil(workers);
    let f = &f;
    let chunks = crossbeam::thread::scope(|s| {
        let handles: Vec<_> = items
            .chunks(chunk_size)
            .map(|chunk| s.spawn(move |_| chunk.iter().map(f).collect::<Vec<R>>()))
            .collect();
        handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
    })
    .map_err(|_| worker_panicked())?;

    let mut results = Vec::with_capacity(items.len());
    for chunk in chunks {
        results.extend(chunk.map_err(|_| worker_panicked())?);
    }
    Ok(results)
}

/// Like [`map`], with exclusive access to each item
pub(crate) fn map_mut<T, R, F>(items: &mut [T], workers: usize, f: F) -> Result<Vec<R>, Error>
where
    T: Send,
    R: Send,
    F: Fn(&mut T) -> R + Sync,
{
    if workers <= 1 || items.len() <= 1 {
        return Ok(items.iter_mut().map(f).collect());
    }

    let chunk_size = items.len().div_ceil(workers);
    let len = items.len();
    let f = &f;
    let chunks = crossbeam::thread::scope(|s| {
        let handles: Vec<_> = items
            .chunks_mut(chunk_size)
            .map(|chunk| s.spawn(move |_| chunk.iter_mut().map(f).collect::<Vec<R>>()))
            .collect();
        handles.into_iter().map(|h| h.join()).collect::<Vec<_>>()
    })
    .map_err(|_| worker_panicked())?;

    let mut results = Vec::with_capacity(len);
    for chunk in chunks {
        results.extend(chunk.map_err(|_| worker_panicked())?);
    }
    Ok(results)
}

/// Sets the abort flag if a worker unwinds
struct AbortOnPanic<'a>(&'a AtomicBool);

impl Drop for AbortOnPanic<'_> {
    fn drop(&mut self) {
        if std::thread::panicking() {
            self.0.store(true, Ordering::SeqCst);
        }
    }
}

/// Visit every module of `plan` after all of its dependencies, results
/// sorted by module id
pub(crate) fn visit_bottom_up<R, F>(
    plan: &ExecutionPlan,
    workers: usize,
    visit: F,
) -> Result<Vec<(ModuleId, R)>, Error>
where
    R: Send,
    F: Fn(ModuleId) -> R + Sync,
{
    let mut results = Vec::with_capacity(plan.module_count());

    if workers <= 1 {
        for batch in plan.batches() {
            for id in batch {
                results.push((*id, visit(*id)));
            }
        }
        return Ok(results);
    }

    let ready = SegQueue::new();
    for id in plan.ready_modules() {
        ready.push(id);
    }
    let remaining = AtomicUsize::new(plan.module_count());
    let aborted = AtomicBool::new(false);
    let done = SegQueue::new();

    crossbeam::thread::scope(|s| {
        for _ in 0..workers.min(plan.module_count()) {
            s.spawn(|_| {
                let _guard = AbortOnPanic(&aborted);
                while remaining.load(Ordering::SeqCst) > 0 && !aborted.load(Ordering::SeqCst) {
                    let Some(id) = ready.pop() else {
                        std::thread::yield_now();
                        continue;
                    };
                    done.push((id, visit(id)));
                    for parent in plan.complete_module(id) {
                        ready.push(parent);
                    }
                    remaining.fetch_sub(1, Ordering::SeqCst);
                }
            });
        }
    })
    .map_err(|_| worker_panicked())?;

    while let Some(result) = done.pop() {
        results.push(result);
    }
    results.sort_by_key(|(id, _)| *id);
    Ok(results)
}
