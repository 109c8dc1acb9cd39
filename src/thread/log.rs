//! Scheduler event logging (§6 Log event format): `Thread {NAME}: {event}`,
//! where `{NAME}` is always exactly `THREAD_NAME_SIZE` characters — either
//! the current thread's registered name (first 12 characters if longer),
//! its decimal id right-aligned in the field if unnamed, or `<HIDDEN>`
//! right-aligned if there is no current thread identity at all (id == -1).

use super::{THREAD_NAME_SIZE, INVALID_ID};

pub(crate) fn log_event(event: &str) {
    let mut buf = [b' '; THREAD_NAME_SIZE];
    format_thread_name(&mut buf);
    let name = core::str::from_utf8(&buf).unwrap_or("?");
    crate::serial_println!("Thread {}: {}", name, event);
}

fn format_thread_name(out: &mut [u8; THREAD_NAME_SIZE]) {
    match super::get_thread_name() {
        Some(name) => {
            let bytes = name.as_bytes();
            let len = bytes.len().min(THREAD_NAME_SIZE);
            let padding = THREAD_NAME_SIZE - len;
            out[padding..].copy_from_slice(&bytes[..len]);
        }
        None => {
            let tid = super::get_thread_id();
            if tid == INVALID_ID {
                let hidden = b"<HIDDEN>";
                let padding = THREAD_NAME_SIZE - hidden.len();
                out[padding..].copy_from_slice(hidden);
            } else {
                write_decimal(out, tid);
            }
        }
    }
}

fn write_decimal(out: &mut [u8; THREAD_NAME_SIZE], mut n: i32) {
    let mut digits = [0u8; THREAD_NAME_SIZE];
    let mut i = digits.len();
    if n == 0 {
        i -= 1;
        digits[i] = b'0';
    } else {
        while n > 0 && i > 0 {
            i -= 1;
            digits[i] = b'0' + (n % 10) as u8;
            n /= 10;
        }
    }
    let used = &digits[i..];
    let padding = THREAD_NAME_SIZE - used.len();
    out[padding..].copy_from_slice(used);
}
