//! Integration test: mailbox fills to capacity and drains in FIFO order.

#![no_std]
#![no_main]

use bootloader_api::{entry_point, BootInfo};
use core::panic::PanicInfo;

use cothread::thread;

entry_point!(main);

fn main(_boot_info: &'static mut BootInfo) -> ! {
    cothread::serial::init();
    cothread::init();
    cothread::serial_println!("scheduler_mailbox...\t");
    thread::entry(setup)
}

const RECEIVER: i32 = 1;

fn setup() {
    let sender = thread::add_named_thread(sender_fn, Some("sender"));
    let receiver = thread::add_named_thread(receiver_fn, Some("receiver"));
    assert_eq!(sender, 0);
    assert_eq!(receiver, RECEIVER);
}

extern "C" fn sender_fn(_a1: i32, _a2: i32, _a3: i32, _a4: i32) {
    // The queue holds THREAD_MSG_QUEUE_SIZE (5) messages; the 6th and 7th
    // sends must fail without disturbing the first five.
    for i in 0..7 {
        let ok = thread::send_msg(RECEIVER, i);
        if i < 5 {
            assert!(ok, "send {} should have succeeded", i);
        } else {
            assert!(!ok, "send {} should have failed (mailbox full)", i);
        }
    }
    thread::yield_now();
}

extern "C" fn receiver_fn(_a1: i32, _a2: i32, _a3: i32, _a4: i32) {
    let mut received = [0i32; 5];
    let mut count = 0;
    while let Some(msg) = thread::get_msg() {
        assert_eq!(msg.src, 0);
        received[count] = msg.content;
        count += 1;
    }
    assert_eq!(count, 5);
    assert_eq!(received, [0, 1, 2, 3, 4]);
    assert!(thread::get_msg().is_none());
    cothread::serial_println!("[ok]");
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    cothread::test_panic_handler(info)
}
