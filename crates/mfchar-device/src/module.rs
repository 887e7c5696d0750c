use std::sync::Arc;

use tracing::{error, info, warn};

use crate::config::DeviceConfig;
use crate::device::CharDevice;
use crate::error::{RegistrationError, Result};
use crate::registry::{DevNum, Registrar, Registration};

/// Load/unload host for one [`CharDevice`].
///
/// `init` publishes the device through a [`Registrar`]; `exit` revokes it once
/// every handle has been released.
pub struct Module {
    device: Arc<CharDevice>,
    registrar: Arc<dyn Registrar>,
    registration: Option<Registration>,
}

impl Module {
    /// Build the device described by `config` and publish it.
    ///
    /// A registration failure is returned unchanged; nothing is published.
    pub fn init(registrar: Arc<dyn Registrar>, config: DeviceConfig) -> Result<Self> {
        let device = Arc::new(CharDevice::new(config));
        let registration = match registrar.register(device.name(), device.clone()) {
            Ok(registration) => registration,
            Err(err) => {
                error!(device = %device.name(), %err, "could not register char device");
                return Err(err.into());
            }
        };

        let devnum = registration.devnum();
        info!(
            device = %device.name(),
            major = devnum.major,
            minor = devnum.minor,
            mode = device.buffer_mode().as_str(),
            "activated"
        );

        Ok(Self {
            device,
            registrar,
            registration: Some(registration),
        })
    }

    pub fn device(&self) -> &Arc<CharDevice> {
        &self.device
    }

    /// Device number while published.
    pub fn devnum(&self) -> Option<DevNum> {
        self.registration.as_ref().map(Registration::devnum)
    }

    /// Node path while published.
    pub fn path(&self) -> Option<String> {
        self.registration.as_ref().map(Registration::path)
    }

    pub fn is_loaded(&self) -> bool {
        self.registration.is_some()
    }

    /// Revoke the device. Fails with `Busy` while handles remain open.
    ///
    /// Calling `exit` on an already unloaded module is a no-op, even if handles
    /// were opened through [`Module::device`] afterwards.
    ///
    /// The open-handle check and the unregister are not atomic: an open that
    /// lands between them gets a handle on a node that is then revoked. That
    /// handle keeps working until it is released.
    pub fn exit(&mut self) -> Result<()> {
        let Some(registration) = self.registration.take() else {
            return Ok(());
        };

        let open = self.device.open_handles();
        if open > 0 {
            self.registration = Some(registration);
            return Err(RegistrationError::Busy { open }.into());
        }

        self.revoke(registration)
    }

    fn revoke(&self, registration: Registration) -> Result<()> {
        self.registrar.unregister(registration)?;
        info!(device = %self.device.name(), "deactivated");
        Ok(())
    }
}

impl Drop for Module {
    // Unpublish unconditionally. Open sessions hold their own reference to the
    // device and stay usable until closed.
    fn drop(&mut self) {
        let Some(registration) = self.registration.take() else {
            return;
        };

        let open = self.device.open_handles();
        if open > 0 {
            warn!(device = %self.device.name(), open, "module dropped with open handles");
        }
        if let Err(err) = self.revoke(registration) {
            warn!(device = %self.device.name(), %err, "module dropped without clean exit");
        }
    }
}

impl std::fmt::Debug for Module {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Module")
            .field("device", &self.device)
            .field("devnum", &self.devnum())
            .finish()
    }
}
