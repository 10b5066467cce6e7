//! Registration manager: brings both lines up, registers the LED and switch
//! endpoints, and tears everything down in a fixed order.
//!
//! Setup order:
//! 1. Validate both lines.
//! 2. Claim the LED line as an output (low) and the switch line as a
//!    debounced input.
//! 3. Reserve control-block storage for every endpoint instance.
//! 4. Register the LED class: identity range, class, then one cdev and node
//!    per instance.
//! 5. Register the switch class the same way.
//!
//! Teardown runs from [Drop], whether setup completed or stopped half-way:
//! 1. Retire every endpoint so sessions left open cannot reach the lines,
//!    then drive the LED low and release both lines.
//! 2. Delete every added cdev.
//! 3. Per class, destroy each node, then give back the identity range.
//! 4. Destroy both classes.
//! 5. Free the control-block storage.
//!
//! A failing setup step therefore never leaks what the earlier steps
//! acquired: [GpioDevices] is built incrementally and dropped on the error
//! path.

use crate::{
    debug_ex,
    dev::{
        chrdev::{CharDevRegistrar, ClassId, DevNum, Major, RegistrationError},
        endpoint::{Endpoint, EndpointKind, FileCaps},
        gpio::{ClaimedPin, GpioChip, PinController},
        handle::Handle,
        session::SessionTracker,
    },
    error::{Error, Result},
    params::DriverConfig,
};
use alloc::{sync::Arc, vec::Vec};
use config::dev::MAX_BUFLEN;
use core::fmt::Write;

/// One registered endpoint instance.
struct ControlBlock {
    dev: DevNum,
    endpoint: Handle<Endpoint>,
    /// The platform accepted the cdev; only then does it need deleting.
    added: bool,
}

/// Everything allocated for one endpoint kind.
struct ClassRegistration {
    kind: EndpointKind,
    first: DevNum,
    count: u32,
    class: Option<ClassId>,
    nodes: Vec<DevNum>,
}

/// Loaded driver state. Dropping it unloads the driver.
pub struct GpioDevices {
    registrar: Arc<dyn CharDevRegistrar>,
    pins: PinController,
    sessions: Arc<SessionTracker>,
    led_pin: Option<ClaimedPin>,
    switch_pin: Option<ClaimedPin>,
    cdevs: Vec<ControlBlock>,
    classes: Vec<ClassRegistration>,
}

impl GpioDevices {
    /// Bring the devices up. On error, everything acquired so far has
    /// already been released when this returns.
    pub fn load(
        config: &DriverConfig,
        chip: Arc<dyn GpioChip>,
        registrar: Arc<dyn CharDevRegistrar>,
    ) -> Result<GpioDevices> {
        let total = config.total()?;
        log::info!("loading {} devices...", total);
        let pins = PinController::new(chip, config.label);
        pins.validate(config.led_pin)
            .inspect_err(|_| log::error!("GPIO: invalid LED GPIO {}", config.led_pin))?;
        pins.validate(config.switch_pin)
            .inspect_err(|_| log::error!("GPIO: invalid SW GPIO {}", config.switch_pin))?;

        let mut devices = GpioDevices {
            registrar,
            pins,
            sessions: Arc::new(SessionTracker::with_limit(config.max_sessions)),
            led_pin: None,
            switch_pin: None,
            cdevs: Vec::new(),
            classes: Vec::new(),
        };
        devices.claim_pins(config)?;

        devices
            .cdevs
            .try_reserve_exact(total as usize)
            .map_err(|_| Error::OutOfMemory)?;
        devices
            .classes
            .try_reserve_exact(2)
            .map_err(|_| Error::OutOfMemory)?;

        devices
            .register(EndpointKind::Led, config)
            .inspect_err(|err| log::error!("LED driver register failed: {}", err))?;
        devices
            .register(EndpointKind::Switch, config)
            .inspect_err(|err| log::error!("switch driver register failed: {}", err))?;
        log::info!("{} devices loaded.", devices.cdevs.len());
        Ok(devices)
    }

    /// Tear the devices down. Same as dropping the value.
    pub fn unload(self) {}

    /// Opens minus releases across all endpoints.
    pub fn open_count(&self) -> isize {
        self.sessions.open_count()
    }

    pub fn sessions(&self) -> &SessionTracker {
        &self.sessions
    }

    /// Identities of every registered instance of `kind`.
    pub fn devs(&self, kind: EndpointKind) -> impl Iterator<Item = DevNum> + '_ {
        self.cdevs
            .iter()
            .filter(move |cb| cb.added && cb.endpoint.kind() == kind)
            .map(|cb| cb.dev)
    }

    /// Dynamically allocated major of `kind`'s class.
    pub fn major(&self, kind: EndpointKind) -> Option<Major> {
        self.classes
            .iter()
            .find(|reg| reg.kind == kind)
            .map(|reg| reg.first.major())
    }

    pub fn endpoint(&self, dev: DevNum) -> Option<&Endpoint> {
        self.cdevs
            .iter()
            .find(|cb| cb.dev == dev)
            .map(|cb| &*cb.endpoint)
    }

    pub fn pin(&self, kind: EndpointKind) -> Option<&ClaimedPin> {
        match kind {
            EndpointKind::Led => self.led_pin.as_ref(),
            EndpointKind::Switch => self.switch_pin.as_ref(),
        }
    }

    fn claim_pins(&mut self, config: &DriverConfig) -> Result<()> {
        let led = self
            .pins
            .configure_output(config.led_pin)
            .inspect_err(|err| log::error!("Can not use GPIO registers: {}", err))?;
        self.led_pin = Some(led);
        let switch = self
            .pins
            .configure_input(config.switch_pin, config.debounce_ms)
            .inspect_err(|err| log::error!("Can not use GPIO registers: {}", err))?;
        self.switch_pin = Some(switch);
        Ok(())
    }

    fn register(&mut self, kind: EndpointKind, config: &DriverConfig) -> Result<()> {
        let caps = kind.caps();
        if !caps.contains(FileCaps::OPEN | FileCaps::RELEASE) {
            return Err(Error::NotSupported);
        }
        let name = kind.name();
        let count = config.count(kind);
        let mut nodes = Vec::new();
        nodes
            .try_reserve_exact(count as usize)
            .map_err(|_| Error::OutOfMemory)?;

        let first = self
            .registrar
            .alloc_region(config.base_minor, count, name)
            .inspect_err(|_| log::error!("alloc_chrdev_region failed."))?;
        debug_ex!("{}: major {}, {} minors, caps {:?}.", name, first.major(), count, caps);
        self.classes.push(ClassRegistration {
            kind,
            first,
            count,
            class: None,
            nodes,
        });
        let class = self.registrar.create_class(name)?;
        let index = self.classes.len() - 1;
        self.classes[index].class = Some(class);

        for i in 0..count {
            let dev = first.offset(i).ok_or(RegistrationError::NoSpace)?;
            let endpoint = Handle::new(Endpoint::new(
                kind,
                config.pin(kind),
                self.pins.clone(),
                self.sessions.clone(),
            ));
            let added = match self.registrar.add_cdev(dev, endpoint.create_ref()) {
                Ok(()) => true,
                Err(err) => {
                    log::error!("cdev_add failed minor = {} ({:?})", dev.minor(), err);
                    false
                }
            };
            self.cdevs.push(ControlBlock {
                dev,
                endpoint,
                added,
            });
            if !added {
                continue;
            }
            let mut node = heapless::String::<MAX_BUFLEN>::new();
            write!(node, "{}{}", name, dev.minor()).map_err(|_| Error::OutOfMemory)?;
            match self.registrar.create_device(class, dev, &node) {
                Ok(()) => self.classes[index].nodes.push(dev),
                Err(err) => log::warn!("device_create failed for {} ({:?})", node.as_str(), err),
            }
        }
        Ok(())
    }
}

impl Drop for GpioDevices {
    fn drop(&mut self) {
        for cb in &self.cdevs {
            cb.endpoint.retire();
        }
        if let Some(led) = self.led_pin.take() {
            led.release();
        }
        if let Some(switch) = self.switch_pin.take() {
            switch.release();
        }

        for cb in self.cdevs.iter().filter(|cb| cb.added) {
            self.registrar.del_cdev(cb.dev);
        }

        for reg in &self.classes {
            if let Some(class) = reg.class {
                for dev in &reg.nodes {
                    self.registrar.destroy_device(class, *dev);
                }
            }
            self.registrar.unregister_region(reg.first, reg.count);
        }

        for reg in &self.classes {
            if let Some(class) = reg.class {
                self.registrar.destroy_class(class);
            }
        }

        let released = self.cdevs.len();
        self.cdevs = Vec::new();
        self.classes = Vec::new();
        log::info!("gpio devices removed ({} control blocks freed).", released);
    }
}
