//! Stack-canary guard (§4.6): checked on every yield before a switch away
//! from the current thread, never on the way back in.

use super::{arch, log, runtime, SlotRef, INVALID_ID, STACK_CANARY};

/// Check the current thread's two canary words. If both are intact this
/// returns normally. If either has been overwritten, the slot is
/// invalidated and either the process aborts (`destroy_on_stack_err ==
/// false`, the default) or the dummy is installed as current and control
/// is switched straight to the scheduler (`destroy_on_stack_err == true`),
/// in which case this function never returns.
pub(crate) fn check_current_stack() {
    let (underflow, overflow, destroy_on_err) = {
        let rt = runtime();
        let cur = rt.current;
        let slot = rt.slot(cur);
        (
            slot.bottom_canary != STACK_CANARY,
            slot.top_canary != STACK_CANARY,
            rt.config.destroy_on_stack_err,
        )
    };

    if !underflow && !overflow {
        return;
    }

    {
        let rt = runtime();
        let cur = rt.current;
        let slot = rt.slot_mut(cur);
        slot.id = INVALID_ID;
        slot.name = None;
    }

    if underflow {
        log::log_event("Stack underflow!");
    }
    if overflow {
        log::log_event("Stack overflow!");
    }

    if !destroy_on_err {
        super::exit(1);
    }

    let next_ptr = {
        let rt = runtime();
        rt.dummy_slot.stack_ptr = arch::reset_stack_top(&mut rt.dummy_slot.stack);
        rt.current = SlotRef::Dummy;
        rt.next = SlotRef::Scheduler;
        rt.stack_ptr_const(SlotRef::Scheduler)
    };
    unsafe { arch::switch_initial(next_ptr) };

    // The corrupted stack is never scheduled again; nothing resumes here.
    loop {
        core::hint::spin_loop();
    }
}
