//! Cooperative round-robin scheduler and yield primitives (§4.2, §4.3).
//!
//! Nothing here is interrupt- or timer-driven: the scheduler only ever
//! runs because some thread yielded into it, and a thread only ever runs
//! again because the scheduler (or a peer, via `yield_to`) switched into
//! it. There is no preemption anywhere in this module.

use super::{arch, guard, log, runtime, ThreadState, SlotRef, MAX_THREADS, INVALID_ID};

/// Dispatch into `target` from the current context, checking the outgoing
/// thread's stack canaries first and logging the `"yielding"`/`"resuming"`
/// pair around the switch. Shared by the scheduler's own dispatch loop and
/// every user-facing yield entry point except `thread_wait`, which bypasses
/// both the guard check and the logging (see `thread_wait` below).
fn thread_yield(target: SlotRef) {
    guard::check_current_stack();

    let should_log = {
        let rt = runtime();
        let cur = rt.current;
        rt.slot(cur).id != INVALID_ID || rt.config.log_scheduler
    };

    if should_log {
        log::log_event("yielding");
    }

    let (cur_ptr, next_ptr) = {
        let rt = runtime();
        let current = rt.current;
        rt.next = target;
        let cur_ptr = rt.stack_ptr_mut(current);
        let next_ptr = rt.stack_ptr_const(target);
        rt.current = target;
        (cur_ptr, next_ptr)
    };
    unsafe { arch::switch(cur_ptr, next_ptr) };

    if should_log {
        log::log_event("resuming");
    }
}

fn can_schedule(rt: &super::Runtime, tid: i32) -> bool {
    tid >= 0
        && (tid as usize) < MAX_THREADS
        && rt.table[tid as usize].id != INVALID_ID
        && matches!(rt.table[tid as usize].state, ThreadState::Init | ThreadState::Suspended)
}

/// Yield back to the scheduler.
pub fn yield_now() {
    thread_yield(SlotRef::Scheduler);
}

/// Yield directly to thread `tid`, bypassing the scheduler. Returns `false`
/// without switching if `tid` is not schedulable, is the caller itself, or
/// is out of range.
pub fn yield_to(tid: i32) -> bool {
    if tid == super::get_thread_id() {
        return false;
    }
    let ok = {
        let rt = runtime();
        can_schedule(rt, tid)
    };
    if !ok {
        return false;
    }
    thread_yield(SlotRef::Table(tid as usize));
    true
}

/// Yield to the next schedulable thread after the caller in table order,
/// wrapping around, never revisiting the caller itself. Returns `false`
/// (without switching) if no other thread is schedulable.
pub fn yield_next() -> bool {
    let id = super::get_thread_id();
    if id == INVALID_ID {
        return false;
    }
    for step in 1..MAX_THREADS {
        let idx = (id as usize + step) % MAX_THREADS;
        let ok = {
            let rt = runtime();
            can_schedule(rt, idx as i32)
        };
        if ok {
            thread_yield(SlotRef::Table(idx));
            return true;
        }
    }
    false
}

/// Mark the current thread waiting and switch straight to the scheduler,
/// bypassing both the stack-guard check and the yield log pair — the
/// thread's own state transition is the only bookkeeping this performs.
pub fn thread_wait() {
    let (cur_ptr, next_ptr) = {
        let rt = runtime();
        let cur = rt.current;
        rt.slot_mut(cur).state = ThreadState::Waiting;
        rt.next = SlotRef::Scheduler;
        let cur_ptr = rt.stack_ptr_mut(cur);
        let next_ptr = rt.stack_ptr_const(SlotRef::Scheduler);
        rt.current = SlotRef::Scheduler;
        (cur_ptr, next_ptr)
    };
    unsafe { arch::switch(cur_ptr, next_ptr) };
}

/// Move `tid` from waiting back to suspended so the scheduler may run it
/// again. Returns `false` if `tid` is not a valid slot.
pub fn thread_wake(tid: i32) -> bool {
    set_thread_state(tid, ThreadState::Suspended)
}

/// Mark `tid` cancelled; it will not be scheduled again. Returns `false`
/// if `tid` is not a valid slot.
pub fn thread_cancel(tid: i32) -> bool {
    set_thread_state(tid, ThreadState::Cancelled)
}

fn set_thread_state(tid: i32, state: ThreadState) -> bool {
    if !super::is_valid_thread(tid) {
        return false;
    }
    runtime().table[tid as usize].state = state;
    true
}

/// Block the caller (by repeatedly yielding to the scheduler) until `tid`
/// reaches a terminal state, then report which one. Returns `None` if
/// `tid` was never a valid slot.
pub fn thread_join(tid: i32) -> Option<ThreadState> {
    loop {
        if !super::is_valid_thread(tid) {
            return None;
        }
        let state = runtime().table[tid as usize].state;
        if matches!(state, ThreadState::Finished | ThreadState::Cancelled) {
            return Some(state);
        }
        yield_now();
    }
}

/// Finalize the current thread after its work function returns: log
/// `"exiting"`, mark it finished, and switch to the scheduler directly
/// (no guard check, no `"yielding"`/`"resuming"` pair — mirrors
/// `thread_wait`'s bypass, since there is nothing left to resume).
pub(crate) fn finish_current() -> ! {
    log::log_event("exiting");
    let (cur_ptr, next_ptr) = {
        let rt = runtime();
        let cur = rt.current;
        rt.slot_mut(cur).state = ThreadState::Finished;
        rt.next = SlotRef::Scheduler;
        let cur_ptr = rt.stack_ptr_mut(cur);
        let next_ptr = rt.stack_ptr_const(SlotRef::Scheduler);
        rt.current = SlotRef::Scheduler;
        (cur_ptr, next_ptr)
    };
    unsafe { arch::switch(cur_ptr, next_ptr) };
    loop {
        core::hint::spin_loop();
    }
}

/// Bootstrap the scheduler and dummy singleton records and switch into the
/// scheduler for the first time. Called once, by `thread::entry`. Never
/// returns to its caller.
pub(crate) fn start_scheduler() -> ! {
    {
        let rt = runtime();
        rt.scheduler_slot = super::ThreadSlot::hidden_singleton(Some("<scheduler>"), do_scheduler_entry);
        rt.dummy_slot = super::ThreadSlot::hidden_singleton(None, dummy_entry);
        rt.current = SlotRef::Dummy;
        rt.next = SlotRef::Scheduler;
    }

    // Logged while `current == Dummy` (id == -1, name == None), so this
    // always renders as `<HIDDEN>` regardless of the scheduler's own name.
    log::log_event("starting scheduler");

    let next_ptr = {
        let rt = runtime();
        rt.current = SlotRef::Scheduler;
        rt.stack_ptr_const(SlotRef::Scheduler)
    };
    unsafe { arch::switch_initial(next_ptr) };

    unreachable!("scheduler entry never returns control to start_scheduler")
}

/// The scheduler's own perpetual work function (§4.2 Do-Scheduler Loop):
/// sweep the table in order, dispatch every schedulable slot once per
/// pass, and exit when a pass finds nothing left to run.
extern "C" fn do_scheduler_entry() -> ! {
    loop {
        let mut ran_any = false;

        for idx in 0..MAX_THREADS {
            let schedulable = {
                let rt = runtime();
                can_schedule(rt, idx as i32)
            };
            if !schedulable {
                continue;
            }

            let consistent = runtime().table[idx].id == idx as i32;
            if !consistent {
                log::log_event("thread ID and position inconsistent!");
                super::exit(1);
            }

            let log_scheduler = runtime().config.log_scheduler;
            if log_scheduler {
                log::log_event("scheduling new thread");
            }

            ran_any = true;
            thread_yield(SlotRef::Table(idx));

            let log_scheduler = runtime().config.log_scheduler;
            if log_scheduler {
                log::log_event("thread yielded");
            }
        }

        let exit_when_no_threads = runtime().config.exit_when_no_threads;
        if !ran_any && exit_when_no_threads {
            if runtime().config.log_scheduler {
                log::log_event("all threads finished");
            }
            super::exit(0);
        }
    }
}

/// The dummy thread never does real work; it only ever exists as a nominal
/// "current" identity during bootstrap and stack-guard recovery, and is
/// never itself switched into. This stub is here only so its slot has a
/// seeded, safely-abandonable stack rather than a null entry point.
extern "C" fn dummy_entry() -> ! {
    loop {
        core::hint::spin_loop();
    }
}
