//! LED and attribute adapters sharing one lamp.

mod common;

use std::sync::Arc;
use std::thread;

use common::fast_config;
use smartlamp_hardware::mock::SimulatedLamp;
use smartlamp_hardware::{AttributeTable, LedBrightness, SmartLamp};
use smartlamp_protocol::Attribute;

#[test]
fn test_adapters_share_device_state() {
    let lamp = Arc::new(SmartLamp::new(SimulatedLamp::new(), fast_config()).unwrap());
    let led = LedBrightness::new(Arc::clone(&lamp));
    let table = AttributeTable::new(Arc::clone(&lamp));

    led.set_brightness(45).unwrap();
    assert_eq!(table.show(Attribute::Led), "45\n");

    table.store(Attribute::Led, "90").unwrap();
    assert_eq!(led.brightness(), 90);
    assert_eq!(led.cached_brightness(), Some(45));
}

#[test]
fn test_concurrent_adapters_never_interleave() {
    let device = SimulatedLamp::new()
        .with_ldr(512)
        .with_temp(22)
        .with_chunk_size(2);
    let lamp = Arc::new(SmartLamp::new(device, fast_config()).unwrap());

    let readers: Vec<_> = [Attribute::Ldr, Attribute::Temp]
        .into_iter()
        .map(|attribute| {
            let table = AttributeTable::new(Arc::clone(&lamp));
            thread::spawn(move || {
                (0..20)
                    .map(|_| table.show(attribute))
                    .collect::<Vec<_>>()
            })
        })
        .collect();

    let led = LedBrightness::new(Arc::clone(&lamp));
    for level in 0..20 {
        led.set_brightness(level).unwrap();
    }

    let results = readers.into_iter().map(|h| h.join().unwrap()).collect::<Vec<_>>();
    assert!(results[0].iter().all(|v| v == "512\n"));
    assert!(results[1].iter().all(|v| v == "22\n"));
    assert_eq!(lamp.get(Attribute::Led).unwrap(), 19);
}
