//! Per-thread bounded mailbox: a small ring buffer of fixed-size integer
//! messages (§4.4). No allocation, no blocking — `send_msg` fails instead
//! of growing the queue, `get_msg` returns `None` instead of waiting.

use super::{runtime, INVALID_ID, THREAD_MSG_QUEUE_SIZE};

#[derive(Debug, Clone, Copy)]
pub struct Message {
    pub src: i32,
    pub content: i32,
}

pub(crate) struct Mailbox {
    messages: [Message; THREAD_MSG_QUEUE_SIZE],
    next_msg: usize,
    end_msgs: usize,
    full: bool,
}

impl Mailbox {
    pub(crate) const fn new() -> Self {
        Mailbox {
            messages: [Message { src: 0, content: 0 }; THREAD_MSG_QUEUE_SIZE],
            next_msg: 0,
            end_msgs: 0,
            full: false,
        }
    }

    fn push(&mut self, msg: Message) {
        self.messages[self.end_msgs] = msg;
        self.end_msgs = (self.end_msgs + 1) % THREAD_MSG_QUEUE_SIZE;
        self.full = self.end_msgs == self.next_msg;
    }

    fn pop(&mut self) -> Option<Message> {
        if self.next_msg == self.end_msgs && !self.full {
            return None;
        }
        let msg = self.messages[self.next_msg];
        self.next_msg = (self.next_msg + 1) % THREAD_MSG_QUEUE_SIZE;
        self.full = false;
        Some(msg)
    }
}

/// Send `content` to thread `dst`'s mailbox, tagged with the caller's own
/// thread id. Fails if `dst` is out of range, unoccupied, or its mailbox
/// is already full — never blocks, never overwrites.
pub fn send_msg(dst: i32, content: i32) -> bool {
    if dst < 0 || (dst as usize) >= super::MAX_THREADS {
        return false;
    }
    let src = super::get_thread_id();
    let rt = runtime();
    let idx = dst as usize;
    if rt.table[idx].id == INVALID_ID || rt.table[idx].mailbox.full {
        return false;
    }
    rt.table[idx].mailbox.push(Message { src, content });
    true
}

/// Pop the oldest unread message addressed to the current thread, if any.
pub fn get_msg() -> Option<Message> {
    let rt = runtime();
    let cur = rt.current;
    rt.slot_mut(cur).mailbox.pop()
}
