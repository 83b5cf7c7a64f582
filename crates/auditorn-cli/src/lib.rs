use auditorn_core::options::{FormFactor, ThrottlingProfile};
use clap::ValueEnum;

pub mod commands;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Device {
    Desktop,
    Mobile,
}

impl From<Device> for FormFactor {
    fn from(device: Device) -> Self {
        match device {
            Device::Desktop => FormFactor::Desktop,
            Device::Mobile => FormFactor::Mobile,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Throttling {
    No,
    Lte,
    #[value(name = "3g-fast")]
    ThreeGFast,
}

impl From<Throttling> for ThrottlingProfile {
    fn from(throttling: Throttling) -> Self {
        match throttling {
            Throttling::No => ThrottlingProfile::None,
            Throttling::Lte => ThrottlingProfile::Lte,
            Throttling::ThreeGFast => ThrottlingProfile::ThreeGFast,
        }
    }
}
