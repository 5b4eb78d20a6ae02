//! Six parallel demand sector models (spec §4.4). Each sector is a value
//! type with an immutable config and a `step` method returning its MW draw;
//! [`Demand`] steps all six and sums them into a [`DemandBreakdown`].

mod grid_losses;
mod industry;
mod residential_heating;
mod residential_other;
mod services;
mod transport;

pub use grid_losses::{GridLossesConfig, GridLossesModel};
pub use industry::{IndustryConfig, IndustryModel};
pub use residential_heating::{ResidentialHeatingConfig, ResidentialHeatingModel};
pub use residential_other::{ResidentialOtherConfig, ResidentialOtherModel};
pub use services::{ServicesConfig, ServicesModel};
pub use transport::{TransportConfig, TransportModel};

use serde::Deserialize;

use crate::clock::Clock;
use crate::weather::SynopticState;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DemandConfig {
    pub residential_heating: ResidentialHeatingConfig,
    pub residential_other: ResidentialOtherConfig,
    pub services: ServicesConfig,
    pub transport: TransportConfig,
    pub industry: IndustryConfig,
    pub grid_losses: GridLossesConfig,
}

/// Per-tick inputs shared by every demand sector.
pub struct DemandContext<'a> {
    pub clock: &'a Clock,
    pub synoptic: &'a SynopticState,
    pub curtailment01: f32,
    pub grid_stress01: f32,
}

#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "api", derive(serde::Serialize))]
pub struct DemandBreakdown {
    pub residential_heating_mw: f32,
    pub residential_other_mw: f32,
    pub services_mw: f32,
    pub transport_mw: f32,
    pub industry_mw: f32,
    pub grid_losses_mw: f32,
}

impl DemandBreakdown {
    /// Total consumption before grid losses are added back (losses model
    /// reads this via [`Demand::step`]'s two-phase call).
    pub fn pre_losses_mw(self) -> f32 {
        self.residential_heating_mw
            + self.residential_other_mw
            + self.services_mw
            + self.transport_mw
            + self.industry_mw
    }

    pub fn total_mw(self) -> f32 {
        self.pre_losses_mw() + self.grid_losses_mw
    }
}

pub struct Demand {
    residential_heating: ResidentialHeatingModel,
    residential_other: ResidentialOtherModel,
    services: ServicesModel,
    transport: TransportModel,
    industry: IndustryModel,
    grid_losses: GridLossesModel,
}

impl Demand {
    pub fn new(config: DemandConfig) -> Self {
        Self {
            residential_heating: ResidentialHeatingModel::new(config.residential_heating),
            residential_other: ResidentialOtherModel::new(config.residential_other),
            services: ServicesModel::new(config.services),
            transport: TransportModel::new(config.transport),
            industry: IndustryModel::new(config.industry),
            grid_losses: GridLossesModel::new(config.grid_losses),
        }
    }

    /// Steps every sector and feeds their sum through the grid-losses model
    /// (which itself smooths the incoming flow, per §4.4).
    pub fn step(&mut self, ctx: &DemandContext) -> DemandBreakdown {
        let mut breakdown = DemandBreakdown {
            residential_heating_mw: self.residential_heating.step(ctx),
            residential_other_mw: self.residential_other.step(ctx),
            services_mw: self.services.step(ctx),
            transport_mw: self.transport.step(ctx),
            industry_mw: self.industry.step(ctx),
            grid_losses_mw: 0.0,
        };
        breakdown.grid_losses_mw = self.grid_losses.step(breakdown.pre_losses_mw());
        breakdown
    }
}

/// Smooths `x` toward `target` with time constant `tau_s` over `dt_s`
/// seconds, shared by every sector's schedule/temperature smoothing.
pub(crate) fn low_pass(x: f32, target: f32, tau_s: f32, dt_s: f32) -> f32 {
    x + (target - x) * (dt_s / tau_s).min(1.0)
}

/// Gaussian pulse centred on `mean_hour` with standard deviation `std_hours`,
/// evaluated at `hour_of_day` (wrapping across midnight).
pub(crate) fn gaussian_pulse(hour_of_day: f32, mean_hour: f32, std_hours: f32) -> f32 {
    let mut d = (hour_of_day - mean_hour).abs();
    if d > 12.0 {
        d = 24.0 - d;
    }
    (-(d * d) / (2.0 * std_hours * std_hours)).exp()
}
