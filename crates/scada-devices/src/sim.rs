use scada_types::{DeviceError, InductionMatrix, MatrixSnapshot, Reactor, RedstoneIo};

/// An in-memory reactor model used in tests and standalone demo runs.
///
/// Burn rate is applied instantly (no thermal model); fault injection is a
/// plain field so tests can flip it mid-scenario.
#[derive(Debug, Clone, PartialEq)]
pub struct SimReactor {
    pub fault: bool,
    pub force_disabled: bool,
    pub status_ok: bool,
    pub temperature_k: f64,
    pub fuel_fill: f64,
    pub coolant_fill: f64,
    pub waste_fill: f64,
    pub heated_coolant_fill: f64,
    pub damage_pct: f64,
    pub burn_rate: f64,
    pub boil_rate: f64,
    pub environmental_loss: f64,
    scrammed: bool,
}

impl Default for SimReactor {
    fn default() -> Self {
        Self {
            fault: false,
            force_disabled: false,
            status_ok: true,
            temperature_k: 300.0,
            fuel_fill: 1.0,
            coolant_fill: 1.0,
            waste_fill: 0.0,
            heated_coolant_fill: 0.0,
            damage_pct: 0.0,
            burn_rate: 0.0,
            boil_rate: 0.0,
            environmental_loss: 0.0,
            scrammed: false,
        }
    }
}

impl SimReactor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn was_scrammed(&self) -> bool {
        self.scrammed
    }
}

impl Reactor for SimReactor {
    fn scram(&mut self) -> Result<(), DeviceError> {
        if self.fault {
            return Err(DeviceError::Faulted("reactor unreadable".into()));
        }
        self.scrammed = true;
        self.burn_rate = 0.0;
        Ok(())
    }

    fn set_burn_rate(&mut self, mb_per_tick: f64) -> Result<(), DeviceError> {
        if self.fault {
            return Err(DeviceError::Faulted("reactor unreadable".into()));
        }
        self.burn_rate = mb_per_tick.max(0.0);
        self.scrammed = false;
        Ok(())
    }

    fn activate(&mut self) -> Result<(), DeviceError> {
        if self.fault {
            return Err(DeviceError::Faulted("reactor unreadable".into()));
        }
        self.scrammed = false;
        Ok(())
    }

    fn get_temperature(&self) -> Result<f64, DeviceError> {
        self.read(self.temperature_k)
    }

    fn get_fuel(&self) -> Result<f64, DeviceError> {
        self.read(self.fuel_fill)
    }

    fn get_coolant(&self) -> Result<f64, DeviceError> {
        self.read(self.coolant_fill)
    }

    fn get_waste(&self) -> Result<f64, DeviceError> {
        self.read(self.waste_fill)
    }

    fn get_heated_coolant(&self) -> Result<f64, DeviceError> {
        self.read(self.heated_coolant_fill)
    }

    fn get_damage_percent(&self) -> Result<f64, DeviceError> {
        self.read(self.damage_pct)
    }

    fn get_burn_rate(&self) -> Result<f64, DeviceError> {
        self.read(self.burn_rate)
    }

    fn get_boil_rate(&self) -> Result<f64, DeviceError> {
        self.read(self.boil_rate)
    }

    fn get_environmental_loss(&self) -> Result<f64, DeviceError> {
        self.read(self.environmental_loss)
    }

    fn get_status(&self) -> Result<bool, DeviceError> {
        self.read(self.status_ok)
    }

    fn is_force_disabled(&self) -> Result<bool, DeviceError> {
        self.read(self.force_disabled)
    }
}

impl SimReactor {
    fn read<T>(&self, value: T) -> Result<T, DeviceError> {
        if self.fault {
            Err(DeviceError::Faulted("reactor unreadable".into()))
        } else {
            Ok(value)
        }
    }
}

/// An in-memory induction matrix model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SimInductionMatrix {
    pub snapshot: MatrixSnapshot,
}

impl SimInductionMatrix {
    pub fn new(snapshot: MatrixSnapshot) -> Self {
        Self { snapshot }
    }
}

impl InductionMatrix for SimInductionMatrix {
    fn snapshot(&self) -> Result<MatrixSnapshot, DeviceError> {
        Ok(self.snapshot)
    }
}

/// An in-memory redstone I/O backplane, channels addressed 0..16.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimRedstoneIo {
    channels: [bool; 16],
}

impl Default for SimRedstoneIo {
    fn default() -> Self {
        Self { channels: [false; 16] }
    }
}

impl RedstoneIo for SimRedstoneIo {
    fn get(&self, channel: u8) -> Result<bool, DeviceError> {
        self.channels
            .get(channel as usize)
            .copied()
            .ok_or_else(|| DeviceError::Faulted(format!("channel {channel} out of range")))
    }

    fn set(&mut self, channel: u8, value: bool) -> Result<(), DeviceError> {
        let slot = self
            .channels
            .get_mut(channel as usize)
            .ok_or_else(|| DeviceError::Faulted(format!("channel {channel} out of range")))?;
        *slot = value;
        Ok(())
    }
}
