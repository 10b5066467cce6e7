//! Load, use and unload the driver against the simulated platform, the way a
//! caller holding the device nodes would.

use gpiodev::{
    dev::{chrdev::Major, endpoint::EndpointKind, endpoint::LedState},
    error::errno,
    sim::{FaultyBuffer, SimFault, SimPlatform},
    DriverConfig, Error, GpioDevices, Level, PinId,
};

fn load(sim: &SimPlatform) -> GpioDevices {
    GpioDevices::load(&DriverConfig::default(), sim.chip(), sim.registrar()).unwrap()
}

#[test]
fn nodes_appear_under_dynamic_majors() {
    let sim = SimPlatform::new();
    let devices = load(&sim);
    let led = sim.devices().node("myled0").unwrap();
    let switch = sim.devices().node("myswitch0").unwrap();
    assert_eq!(led.major(), Major::new(254));
    assert_eq!(switch.major(), Major::new(253));
    assert_eq!(devices.major(EndpointKind::Led), Some(led.major()));
    assert_eq!(devices.major(EndpointKind::Switch), Some(switch.major()));
}

#[test]
fn led_follows_written_commands() {
    let sim = SimPlatform::new();
    let devices = load(&sim);
    let pin = DriverConfig::default().led_pin;
    let mut file = sim.devices().open("myled0").unwrap();

    assert_eq!(file.write_bytes(b"1"), Ok(1));
    assert_eq!(sim.gpio().level(pin), Level::High);
    assert_eq!(file.endpoint().led_state(), Some(LedState::Lit));

    // Only the first byte counts.
    assert_eq!(file.write_bytes(b"0\n"), Ok(1));
    assert_eq!(sim.gpio().level(pin), Level::Low);

    assert_eq!(file.write_bytes(b"2"), Ok(1));
    assert_eq!(sim.gpio().level(pin), Level::Low);
    assert_eq!(file.write_bytes(b""), Ok(0));

    file.close();
    drop(devices);
}

#[test]
fn switch_reports_level_once_per_rewind() {
    let sim = SimPlatform::new();
    let _devices = load(&sim);
    let pin = DriverConfig::default().switch_pin;
    let mut file = sim.devices().open("myswitch0").unwrap();
    let mut buf = [0u8; 16];

    assert_eq!(file.read_bytes(&mut buf), Ok(2));
    assert_eq!(&buf[..2], b"0\n");
    assert_eq!(file.pos(), 2);
    assert_eq!(file.read_bytes(&mut buf), Ok(0));

    sim.gpio().drive(pin, Level::High);
    assert_eq!(file.read_bytes(&mut buf), Ok(0));
    assert_eq!(file.seek(0), 0);
    assert_eq!(file.read_bytes(&mut buf), Ok(2));
    assert_eq!(&buf[..2], b"1\n");
}

#[test]
fn unusable_caller_buffers() {
    let sim = SimPlatform::new();
    let _devices = load(&sim);

    let mut led = sim.devices().open("myled0").unwrap();
    assert_eq!(led.write(&mut FaultyBuffer::new(1)), Err(Error::IoFault));
    assert_eq!(Error::IoFault.errno(), -errno::EFAULT);

    let mut switch = sim.devices().open("myswitch0").unwrap();
    assert_eq!(switch.read(&mut FaultyBuffer::new(16)), Ok(0));
    assert_eq!(switch.pos(), 0);

    // A buffer too small for the record is a failed copy as well.
    let mut tiny = [0u8; 1];
    assert_eq!(switch.read_bytes(&mut tiny), Ok(0));
    assert_eq!(switch.pos(), 0);
}

#[test]
fn missing_handlers_are_rejected() {
    let sim = SimPlatform::new();
    let _devices = load(&sim);
    let mut buf = [0u8; 4];

    let mut led = sim.devices().open("myled0").unwrap();
    let err = led.read_bytes(&mut buf).unwrap_err();
    assert_eq!(err, Error::NotSupported);
    assert_eq!(err.errno(), -errno::EINVAL);

    let mut switch = sim.devices().open("myswitch0").unwrap();
    assert_eq!(switch.write_bytes(b"1"), Err(Error::NotSupported));
}

#[test]
fn open_count_tracks_live_sessions() {
    let sim = SimPlatform::new();
    let devices = load(&sim);

    let a = sim.devices().open("myled0").unwrap();
    let b = sim.devices().open("myled0").unwrap();
    let c = sim.devices().open("myswitch0").unwrap();
    assert_eq!(devices.open_count(), 3);
    assert_ne!(a.token(), b.token());

    a.close();
    drop(c);
    assert_eq!(devices.open_count(), 1);
    drop(b);
    assert_eq!(devices.open_count(), 0);
    assert_eq!(devices.sessions().live_sessions(), 0);
}

#[test]
fn unload_turns_led_off_and_removes_nodes() {
    let sim = SimPlatform::new();
    let devices = load(&sim);
    let config = DriverConfig::default();
    sim.devices().open("myled0").unwrap().write_bytes(b"1").unwrap();
    assert_eq!(sim.gpio().level(config.led_pin), Level::High);

    devices.unload();
    assert_eq!(sim.gpio().level(config.led_pin), Level::Low);
    assert!(!sim.gpio().is_claimed(config.led_pin));
    assert!(!sim.gpio().is_exported(config.led_pin));
    assert!(!sim.gpio().is_claimed(config.switch_pin));
    assert!(sim.devices().is_clean());
    assert_eq!(sim.devices().open("myled0").err(), Some(Error::NoDevice));
}

#[test]
fn reload_after_unload() {
    let sim = SimPlatform::new();
    load(&sim).unload();
    let devices = load(&sim);
    assert_eq!(sim.devices().node_names(), ["myled0", "myswitch0"]);
    drop(devices);
    assert!(sim.devices().is_clean());
}

#[test]
fn load_failures_leave_nothing_behind() {
    let config = DriverConfig::default();

    let sim = SimPlatform::new();
    sim.gpio().set_ngpio(config.switch_pin.value());
    let err = GpioDevices::load(&config, sim.chip(), sim.registrar()).err().unwrap();
    assert_eq!(err.errno(), -errno::ENODEV);
    assert!(!sim.gpio().is_claimed(config.led_pin));

    let sim = SimPlatform::new();
    sim.gpio().claim_externally(config.led_pin, "other");
    let err = GpioDevices::load(&config, sim.chip(), sim.registrar()).err().unwrap();
    assert_eq!(err.errno(), -errno::EBUSY);
    assert!(!sim.gpio().is_claimed(config.switch_pin));

    let sim = SimPlatform::new();
    sim.gpio().reject_direction(config.switch_pin);
    let err = GpioDevices::load(&config, sim.chip(), sim.registrar()).err().unwrap();
    assert_eq!(err.errno(), -errno::EBUSY);
    assert!(!sim.gpio().is_claimed(config.led_pin));
    assert!(!sim.gpio().is_claimed(config.switch_pin));

    let sim = SimPlatform::new();
    sim.devices().fail_on(SimFault::AllocRegion("myswitch"));
    assert!(GpioDevices::load(&config, sim.chip(), sim.registrar()).is_err());
    assert!(sim.devices().is_clean());
    assert_eq!(sim.devices().region_count(), 0);
    assert!(!sim.gpio().is_claimed(config.led_pin));
}

#[test]
fn unsupported_debounce_still_loads() {
    let sim = SimPlatform::new();
    sim.gpio().set_debounce_supported(false);
    let devices = load(&sim);
    let switch = devices.pin(EndpointKind::Switch).unwrap();
    assert_eq!(switch.debounce_ms(), None);
    assert!(sim.devices().open("myswitch0").is_ok());
}

#[test]
fn custom_wiring() {
    let sim = SimPlatform::new();
    let config = DriverConfig {
        led_pin: PinId::new(5),
        switch_pin: PinId::new(6),
        ..DriverConfig::default()
    };
    let devices = GpioDevices::load(&config, sim.chip(), sim.registrar()).unwrap();
    assert_eq!(devices.pin(EndpointKind::Led).map(|pin| pin.pin()), Some(PinId::new(5)));
    assert_eq!(sim.gpio().owner(PinId::new(6)).as_deref(), Some(config.label));
}

#[test]
fn sessions_left_open_cannot_touch_released_lines() {
    let sim = SimPlatform::new();
    let devices = load(&sim);
    let config = DriverConfig::default();
    let mut led = sim.devices().open("myled0").unwrap();
    let mut switch = sim.devices().open("myswitch0").unwrap();
    let led_dev = led.dev();

    devices.unload();
    assert_eq!(led.write_bytes(b"1"), Err(Error::NoDevice));
    assert_eq!(sim.gpio().level(config.led_pin), Level::Low);
    assert!(!sim.gpio().is_claimed(config.led_pin));
    assert_eq!(led.endpoint().led_state(), None);

    let mut buf = [0u8; 4];
    assert_eq!(switch.read_bytes(&mut buf), Err(Error::NoDevice));
    assert_eq!(sim.devices().open_dev(led_dev).err(), Some(Error::NoDevice));
}

#[test]
fn full_session_table_refuses_open() {
    let sim = SimPlatform::new();
    let config = DriverConfig {
        max_sessions: 2,
        ..DriverConfig::default()
    };
    let devices = GpioDevices::load(&config, sim.chip(), sim.registrar()).unwrap();
    let _led = sim.devices().open("myled0").unwrap();
    let switch = sim.devices().open("myswitch0").unwrap();

    let err = sim.devices().open("myled0").err().unwrap();
    assert_eq!(err, Error::OutOfMemory);
    assert_eq!(err.errno(), -errno::ENOMEM);
    assert_eq!(devices.open_count(), 2);

    drop(switch);
    assert!(sim.devices().open("myled0").is_ok());
}
