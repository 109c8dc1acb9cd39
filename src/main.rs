#![no_std]
#![no_main]
#![feature(abi_x86_interrupt)]

use bootloader_api::{entry_point, BootInfo, BootloaderConfig};
use core::panic::PanicInfo;

use cothread::thread;

#[allow(deprecated)]
pub static BOOTLOADER_CONFIG: BootloaderConfig = {
    let mut config = BootloaderConfig::new_default();
    config.kernel_stack_size = 256 * 1024;
    config
};

entry_point!(kernel_main, config = &BOOTLOADER_CONFIG);

fn kernel_main(_boot_info: &'static mut BootInfo) -> ! {
    cothread::serial::init();
    cothread::serial_println!("Serial initialized");

    cothread::init();
    cothread::serial_println!("GDT, IDT initialized");

    // Entry never returns: it invalidates the table, runs `setup`, then
    // drives the scheduler until no schedulable thread remains.
    thread::entry(setup)
}

/// User setup: registers the demo threads for this boot image. A real
/// embedder would call `thread::add_named_thread` with its own workers
/// instead — this is the "user demo program" the core treats as external.
fn setup() {
    thread::add_named_thread(worker_a, Some("worker-a"));
    thread::add_named_thread(worker_b, Some("worker-b"));
}

extern "C" fn worker_a(_a1: i32, _a2: i32, _a3: i32, _a4: i32) {
    for _ in 0..4 {
        cothread::serial_println!("[worker-a] working");
        thread::yield_now();
    }
}

extern "C" fn worker_b(_a1: i32, _a2: i32, _a3: i32, _a4: i32) {
    for _ in 0..2 {
        cothread::serial_println!("[worker-b] working");
        thread::yield_now();
    }
    cothread::serial_println!("[worker-b] exiting");
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    cothread::serial_println!("{}", info);
    cothread::hlt_loop()
}
