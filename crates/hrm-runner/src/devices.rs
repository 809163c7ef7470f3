//! Registry of paired devices.

use hrm_protocol::{HrmError, HrmResult, ReadyStateListener};

use crate::config::{LinkAddress, PairedDevice, RunnerConfig};

/// Devices that can be connected to by name.
#[derive(Debug, Clone, Default)]
pub struct PairedDevices {
    devices: Vec<PairedDevice>,
}

impl PairedDevices {
    pub fn new(devices: Vec<PairedDevice>) -> Self {
        PairedDevices { devices }
    }

    /// Find a paired device by its exact name.
    pub fn get_by_name(&self, name: &str) -> Option<&PairedDevice> {
        self.devices.iter().find(|d| d.name == name)
    }

    /// Like [`get_by_name`](Self::get_by_name), failing with
    /// [`HrmError::DeviceNotFound`].
    pub fn resolve(&self, name: &str) -> HrmResult<&PairedDevice> {
        self.get_by_name(name)
            .ok_or_else(|| HrmError::DeviceNotFound(name.to_string()))
    }

    /// Add a device, replacing any existing one with the same name.
    pub fn pair(&mut self, device: PairedDevice) {
        self.devices.retain(|d| d.name != device.name);
        self.devices.push(device);
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.devices.iter().map(|d| d.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }
}

/// An unnamed device for a link given directly on the command line.
pub fn ad_hoc_device(link: LinkAddress) -> PairedDevice {
    PairedDevice {
        name: link.to_string(),
        link,
    }
}

/// Pick the device to connect to.
///
/// A link given directly wins. Otherwise `name`, falling back to the
/// configured device name, is looked up among the paired devices.
pub fn resolve_target(
    direct: Option<LinkAddress>,
    name: Option<&str>,
    config: &RunnerConfig,
) -> HrmResult<PairedDevice> {
    if let Some(link) = direct {
        return Ok(ad_hoc_device(link));
    }
    let name = name.or(config.device.as_deref()).ok_or_else(|| {
        HrmError::InvalidConfig("no device given; use --device, --file or --tcp".to_string())
    })?;
    let devices = PairedDevices::new(config.paired_devices.clone());
    devices.resolve(name).cloned()
}

/// Like [`resolve_target`], reporting an unknown device to `ready` through
/// `on_error` before returning the error.
pub fn resolve_target_reporting<R>(
    direct: Option<LinkAddress>,
    name: Option<&str>,
    config: &RunnerConfig,
    ready: &mut R,
) -> HrmResult<PairedDevice>
where
    R: ReadyStateListener + ?Sized,
{
    resolve_target(direct, name, config).inspect_err(|e| {
        if let HrmError::DeviceNotFound(device) = e {
            ready.on_error(device, e);
        }
    })
}
