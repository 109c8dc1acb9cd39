//! Integration test: verify the kernel boots and serial logging works.

#![no_std]
#![no_main]
#![feature(custom_test_frameworks)]
#![test_runner(cothread::test_runner)]
#![reexport_test_harness_main = "test_main"]

use bootloader_api::{entry_point, BootInfo};
use core::panic::PanicInfo;
use cothread::serial_println;

entry_point!(main);

fn main(_boot_info: &'static mut BootInfo) -> ! {
    cothread::init();
    test_main();
    cothread::hlt_loop();
}

#[panic_handler]
fn panic(info: &PanicInfo) -> ! {
    cothread::test_panic_handler(info)
}

#[test_case]
fn test_serial_println() {
    serial_println!("test_serial_println output");
}

#[test_case]
fn test_serial_println_many() {
    for i in 0..200 {
        serial_println!("test_serial_println_many output {}", i);
    }
}
