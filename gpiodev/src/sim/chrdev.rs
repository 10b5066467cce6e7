use super::{EventLog, SimEvent};
use crate::{
    dev::{
        chrdev::{CharDevRegistrar, ClassId, DevNum, Major, Minor, RegistrationError},
        endpoint::Endpoint,
        file::File,
        handle::HandleRef,
    },
    error::{Error, Result},
};
use alloc::{collections::btree_map::BTreeMap, string::String, sync::Arc, vec::Vec};
use spin::Mutex;

/// Dynamic majors are handed out downwards from here.
const DYNAMIC_MAJOR_TOP: u32 = 254;
const DYNAMIC_MAJOR_BOTTOM: u32 = 234;

/// A registration step the simulated platform refuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimFault {
    /// `alloc_region` for this name.
    AllocRegion(&'static str),
    /// `create_class` for this name.
    CreateClass(&'static str),
    /// `add_cdev` for any identity in the region of this name.
    AddCdev(&'static str),
    /// `create_device` for a node of this name.
    CreateDevice(&'static str),
}

struct Region {
    first: DevNum,
    count: u32,
    name: String,
}

impl Region {
    fn contains(&self, dev: DevNum) -> bool {
        dev.major() == self.first.major()
            && dev
                .minor()
                .value()
                .checked_sub(self.first.minor().value())
                .is_some_and(|index| index < self.count)
    }
}

struct Node {
    class: ClassId,
    dev: DevNum,
    name: String,
}

struct DevState {
    next_major: u32,
    next_class: usize,
    regions: Vec<Region>,
    classes: BTreeMap<ClassId, String>,
    cdevs: BTreeMap<DevNum, HandleRef<Endpoint>>,
    nodes: Vec<Node>,
    faults: Vec<SimFault>,
}

impl DevState {
    fn region_name(&self, dev: DevNum) -> Option<&str> {
        self.regions
            .iter()
            .find(|region| region.contains(dev))
            .map(|region| region.name.as_str())
    }
}

/// Simulated character-device registry and dispatcher.
///
/// Besides implementing [CharDevRegistrar] it plays the caller's side:
/// [SimCharDevs::open] resolves a node name to its endpoint the way opening a
/// device file would.
pub struct SimCharDevs {
    state: Mutex<DevState>,
    events: Arc<EventLog>,
}

impl SimCharDevs {
    pub(super) fn new(events: Arc<EventLog>) -> SimCharDevs {
        SimCharDevs {
            state: Mutex::new(DevState {
                next_major: DYNAMIC_MAJOR_TOP,
                next_class: 0,
                regions: Vec::new(),
                classes: BTreeMap::new(),
                cdevs: BTreeMap::new(),
                nodes: Vec::new(),
                faults: Vec::new(),
            }),
            events,
        }
    }

    pub fn fail_on(&self, fault: SimFault) {
        self.state.lock().faults.push(fault);
    }

    /// Open the node called `name`.
    pub fn open(&self, name: &str) -> Result<File> {
        let dev = self.node(name).ok_or(Error::NoDevice)?;
        self.open_dev(dev)
    }

    /// Open by identity, bypassing node lookup.
    pub fn open_dev(&self, dev: DevNum) -> Result<File> {
        let endpoint = self
            .state
            .lock()
            .cdevs
            .get(&dev)
            .cloned()
            .ok_or(Error::NoDevice)?;
        let endpoint = endpoint.get_handle().ok_or(Error::NoDevice)?;
        File::open(endpoint, dev)
    }

    pub fn node(&self, name: &str) -> Option<DevNum> {
        self.state
            .lock()
            .nodes
            .iter()
            .find(|node| node.name == name)
            .map(|node| node.dev)
    }

    pub fn node_names(&self) -> Vec<String> {
        self.state.lock().nodes.iter().map(|node| node.name.clone()).collect()
    }

    pub fn class_names(&self) -> Vec<String> {
        self.state.lock().classes.values().cloned().collect()
    }

    pub fn class_of(&self, name: &str) -> Option<ClassId> {
        self.state
            .lock()
            .classes
            .iter()
            .find(|(_, class)| class.as_str() == name)
            .map(|(id, _)| *id)
    }

    pub fn region_count(&self) -> usize {
        self.state.lock().regions.len()
    }

    pub fn cdev_count(&self) -> usize {
        self.state.lock().cdevs.len()
    }

    /// Nothing is registered any more.
    pub fn is_clean(&self) -> bool {
        let state = self.state.lock();
        state.regions.is_empty()
            && state.classes.is_empty()
            && state.cdevs.is_empty()
            && state.nodes.is_empty()
    }

    fn faulted(&self, pred: impl Fn(&SimFault) -> bool) -> bool {
        self.state.lock().faults.iter().any(pred)
    }
}

impl CharDevRegistrar for SimCharDevs {
    fn alloc_region(&self, base_minor: Minor, count: u32, name: &str) -> core::result::Result<DevNum, RegistrationError> {
        if name.is_empty() {
            return Err(RegistrationError::InvalidName);
        }
        let first = {
            let mut state = self.state.lock();
            let faulted = state
                .faults
                .iter()
                .any(|fault| matches!(fault, SimFault::AllocRegion(n) if *n == name));
            if faulted || state.next_major < DYNAMIC_MAJOR_BOTTOM
            {
                return Err(RegistrationError::NoSpace);
            }
            let first = DevNum::new(Major::new(state.next_major), base_minor);
            state.next_major -= 1;
            state.regions.push(Region {
                first,
                count,
                name: String::from(name),
            });
            first
        };
        self.events.push(SimEvent::AllocRegion(first, count));
        Ok(first)
    }

    fn unregister_region(&self, first: DevNum, count: u32) {
        self.state
            .lock()
            .regions
            .retain(|region| !(region.first == first && region.count == count));
        self.events.push(SimEvent::UnregisterRegion(first, count));
    }

    fn create_class(&self, name: &str) -> core::result::Result<ClassId, RegistrationError> {
        if self.faulted(|fault| matches!(fault, SimFault::CreateClass(n) if *n == name)) {
            return Err(RegistrationError::OutOfMemory);
        }
        let id = {
            let mut state = self.state.lock();
            if state.classes.values().any(|class| class == name) {
                return Err(RegistrationError::AlreadyExists);
            }
            let id = ClassId::new(state.next_class);
            state.next_class += 1;
            state.classes.insert(id, String::from(name));
            id
        };
        self.events.push(SimEvent::CreateClass(id));
        Ok(id)
    }

    fn destroy_class(&self, class: ClassId) {
        self.state.lock().classes.remove(&class);
        self.events.push(SimEvent::DestroyClass(class));
    }

    fn add_cdev(&self, dev: DevNum, endpoint: HandleRef<Endpoint>) -> core::result::Result<(), RegistrationError> {
        {
            let mut state = self.state.lock();
            let faulted = match state.region_name(dev) {
                Some(name) => state
                    .faults
                    .iter()
                    .any(|fault| matches!(fault, SimFault::AddCdev(n) if *n == name)),
                None => true,
            };
            if faulted {
                return Err(RegistrationError::NoSpace);
            }
            if state.cdevs.contains_key(&dev) {
                return Err(RegistrationError::AlreadyExists);
            }
            state.cdevs.insert(dev, endpoint);
        }
        self.events.push(SimEvent::AddCdev(dev));
        Ok(())
    }

    fn del_cdev(&self, dev: DevNum) {
        self.state.lock().cdevs.remove(&dev);
        self.events.push(SimEvent::DelCdev(dev));
    }

    fn create_device(&self, class: ClassId, dev: DevNum, name: &str) -> core::result::Result<(), RegistrationError> {
        {
            let mut state = self.state.lock();
            let faulted = state
                .faults
                .iter()
                .any(|fault| matches!(fault, SimFault::CreateDevice(n) if *n == name));
            if faulted {
                return Err(RegistrationError::OutOfMemory);
            }
            if !state.classes.contains_key(&class) {
                return Err(RegistrationError::InvalidName);
            }
            if state.nodes.iter().any(|node| node.name == name) {
                return Err(RegistrationError::AlreadyExists);
            }
            state.nodes.push(Node {
                class,
                dev,
                name: String::from(name),
            });
        }
        self.events.push(SimEvent::CreateDevice(class, dev));
        Ok(())
    }

    fn destroy_device(&self, class: ClassId, dev: DevNum) {
        self.state
            .lock()
            .nodes
            .retain(|node| !(node.class == class && node.dev == dev));
        self.events.push(SimEvent::DestroyDevice(class, dev));
    }
}
