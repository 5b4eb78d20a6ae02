//! Orchestrator: wires every subsystem together and advances one tick in
//! the exact order spec §2/§5 requires (spec §6 "Orchestration API").

use serde::Deserialize;

use crate::bess::{Bids, BessFleet, BessFleetConfig, Market, Mode};
use crate::clock::Clock;
use crate::demand::{Demand, DemandConfig, DemandContext};
use crate::dispatch::{
    compute_plan, compute_reserve_availability, compute_setpoints, DispatchPlan, DispatcherConfig,
    HeadroomInputs, PlanInputs, RealTimeInputs,
};
use crate::forecast::{Forecast, ForecastConfig};
use crate::frequency::{
    equivalent_inertia, AfrrConfig, AfrrController, FcrNConfig, FcrNController, FfrConfig, FfrController,
    FrequencyConfig, FrequencyModel, InertiaContribution, MfrrConfig, MfrrController,
};
use crate::grid::{GridAggregator, GridSnapshot};
use crate::settlement::{Settlement, SettlementConfig, SettlementPrices};
use crate::supply::{
    ChpConfig, ChpFleet, HydroReservoirConfig, HydroReservoirFleet, InterconnectorConfig, InterconnectorFleet,
    InterconnectorMode, NuclearConfig, NuclearDispatchMode, NuclearFleet, PeakersConfig, PeakersFleet,
    RunOfRiverConfig, RunOfRiverFleet, SolarFleet, SolarFleetConfig, SupplyBreakdown, WindFleet, WindFleetConfig,
};
use crate::weather::{Weather, WeatherConfig};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Toggles {
    pub nuclear: bool,
    pub hydro_reservoir: bool,
    pub hydro_ror: bool,
    pub wind: bool,
    pub solar: bool,
    pub chp: bool,
    pub peakers: bool,
    pub interconnectors: bool,
    pub demand_response: bool,
}

impl Default for Toggles {
    fn default() -> Self {
        Self {
            nuclear: true,
            hydro_reservoir: true,
            hydro_ror: true,
            wind: true,
            solar: true,
            chp: true,
            peakers: true,
            interconnectors: true,
            demand_response: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
#[allow(clippy::struct_excessive_bools)]
pub struct WorldConfig {
    pub seed: u64,
    pub start_day_of_year: u16,
    pub toggles: Toggles,
    pub weather: WeatherConfig,
    pub forecast: ForecastConfig,
    pub demand: DemandConfig,
    pub nuclear: NuclearConfig,
    pub hydro_reservoir: HydroReservoirConfig,
    pub run_of_river: RunOfRiverConfig,
    pub wind: WindFleetConfig,
    pub solar: SolarFleetConfig,
    pub chp: ChpConfig,
    pub peakers: PeakersConfig,
    pub interconnector: InterconnectorConfig,
    pub dispatcher: DispatcherConfig,
    pub frequency: FrequencyConfig,
    pub fcr_n: FcrNConfig,
    pub afrr: AfrrConfig,
    pub mfrr: MfrrConfig,
    pub ffr: FfrConfig,
    pub bess: BessFleetConfig,
    pub settlement: SettlementConfig,
    pub warmup_hours: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            start_day_of_year: 1,
            toggles: Toggles::default(),
            weather: WeatherConfig::default(),
            forecast: ForecastConfig::default(),
            demand: DemandConfig::default(),
            nuclear: NuclearConfig::default(),
            hydro_reservoir: HydroReservoirConfig::default(),
            run_of_river: RunOfRiverConfig::default(),
            wind: WindFleetConfig::default(),
            solar: SolarFleetConfig::default(),
            chp: ChpConfig::default(),
            peakers: PeakersConfig::default(),
            interconnector: InterconnectorConfig::default(),
            dispatcher: DispatcherConfig::default(),
            frequency: FrequencyConfig::default(),
            fcr_n: FcrNConfig::default(),
            afrr: AfrrConfig::default(),
            mfrr: MfrrConfig::default(),
            ffr: FfrConfig::default(),
            bess: BessFleetConfig::default(),
            settlement: SettlementConfig::default(),
            warmup_hours: 12.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    WarmingUp,
    Running,
    DayComplete,
}

/// Every reserve product's 1 s market price, supplied externally (the core
/// only consumes prices at ISP rollover; it never computes them).
#[derive(Debug, Clone, Copy, Default)]
#[cfg_attr(feature = "api", derive(serde::Serialize))]
pub struct MarketPrices {
    pub day_ahead_eur_per_mwh: f32,
    pub fcrn_eur_per_mwh: f32,
    pub imbalance_up_eur_per_mwh: f32,
    pub imbalance_down_eur_per_mwh: f32,
}

pub struct World {
    config: WorldConfig,
    clock: Clock,
    weather: Weather,
    forecast: Forecast,
    demand: Demand,

    nuclear: NuclearFleet,
    hydro: HydroReservoirFleet,
    ror: RunOfRiverFleet,
    wind: WindFleet,
    solar: SolarFleet,
    chp: ChpFleet,
    peakers: PeakersFleet,
    interconnector: InterconnectorFleet,

    plan: DispatchPlan,
    last_plan_recompute_minute: Option<i32>,

    frequency: FrequencyModel,
    fcr_n: FcrNController,
    afrr: AfrrController,
    mfrr: MfrrController,
    ffr: FfrController,
    last_frequency_hz: f32,
    last_fcr_saturation01: f32,
    last_afrr_saturation01: f32,
    last_hydro_reservoir_mw: f32,
    last_peakers_mw: f32,
    last_net_import_mw: f32,

    bess: BessFleet,
    bids: Bids,
    settlement: Settlement,
    prices: MarketPrices,

    grid: GridAggregator,
    history: Vec<GridSnapshot>,
    phase: Phase,
    numeric_bound_warnings: Vec<String>,
}

impl World {
    pub fn new(config: WorldConfig) -> Self {
        let clock = Clock::new(config.start_day_of_year);
        let weather = Weather::new(config.seed, config.weather.clone());
        let forecast = Forecast::new(config.forecast.clone());
        let demand = Demand::new(config.demand.clone());

        let nuclear = NuclearFleet::new(config.nuclear.clone());
        let hydro = HydroReservoirFleet::new(config.hydro_reservoir.clone());
        let ror = RunOfRiverFleet::new(config.run_of_river.clone());
        let wind = WindFleet::new(config.wind.clone());
        let solar = SolarFleet::new(config.solar.clone());
        let chp = ChpFleet::new(config.chp.clone());
        let peakers = PeakersFleet::new(config.peakers.clone());
        let interconnector = InterconnectorFleet::new(config.interconnector.clone());

        let frequency = FrequencyModel::new(config.frequency.clone());
        let fcr_n = FcrNController::new(config.fcr_n.clone());
        let afrr = AfrrController::new(config.afrr.clone());
        let mfrr = MfrrController::new(config.mfrr.clone());
        let ffr = FfrController::new(config.ffr.clone());

        let bess = BessFleet::new(&config.bess);
        let settlement = Settlement::new(config.settlement.clone());

        Self {
            clock,
            weather,
            forecast,
            demand,
            nuclear,
            hydro,
            ror,
            wind,
            solar,
            chp,
            peakers,
            interconnector,
            plan: DispatchPlan::default(),
            last_plan_recompute_minute: None,
            frequency,
            fcr_n,
            afrr,
            mfrr,
            ffr,
            last_frequency_hz: 50.0,
            last_fcr_saturation01: 0.0,
            last_afrr_saturation01: 0.0,
            last_hydro_reservoir_mw: 0.0,
            last_peakers_mw: 0.0,
            last_net_import_mw: 0.0,
            bess,
            bids: Bids::default(),
            settlement,
            prices: MarketPrices::default(),
            grid: GridAggregator::new(),
            history: Vec::new(),
            phase: Phase::WarmingUp,
            numeric_bound_warnings: Vec::new(),
            config,
        }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn history(&self) -> &[GridSnapshot] {
        &self.history
    }

    pub fn bids(&self) -> Bids {
        self.bids
    }

    pub fn market_prices(&self) -> MarketPrices {
        self.prices
    }

    pub fn settlement(&self) -> &Settlement {
        &self.settlement
    }

    pub fn set_market_prices(&mut self, prices: MarketPrices) {
        self.prices = prices;
    }

    pub fn set_da_bid(&mut self, hour: usize, mw: f32) {
        if hour < 24 {
            self.bids.da_mw[hour] = mw;
        } else {
            self.numeric_bound_warnings
                .push(format!("set_da_bid: hour {hour} out of range 0..24, bid ignored"));
        }
    }

    pub fn set_fcr_bid(&mut self, hour: usize, mw: f32) {
        if hour >= 24 {
            self.numeric_bound_warnings
                .push(format!("set_fcr_bid: hour {hour} out of range 0..24, bid ignored"));
            return;
        }
        let clamped = mw.max(0.0);
        if clamped != mw {
            self.numeric_bound_warnings
                .push(format!("set_fcr_bid: mw {mw} is negative, clamped to {clamped}"));
        }
        self.bids.fcr_mw[hour] = clamped;
    }

    pub fn set_unit_mode(&mut self, id: usize, mode: Option<Mode>) {
        if self.bess.set_unit_mode(id, mode.unwrap_or(Mode::None)).is_none() {
            self.numeric_bound_warnings
                .push(format!("set_unit_mode: unit id {id} does not exist, ignored"));
        }
    }

    pub fn set_unit_market(&mut self, id: usize, market: Market) {
        if self.bess.set_unit_market(id, market).is_none() {
            self.numeric_bound_warnings
                .push(format!("set_unit_market: unit id {id} does not exist, ignored"));
        }
    }

    pub fn reset_to_start_of_day(&mut self) {
        self.clock.reset_to_start_of_day();
        self.history.clear();
        self.phase = Phase::Running;
    }

    pub fn reset(&mut self) {
        let config = self.config.clone();
        *self = World::new(config);
    }

    fn recompute_plan_if_due(&mut self, demand_total_mw: f32, supply: SupplyBreakdown) {
        let minute = self.clock.time_s().div_euclid(60);
        if self.last_plan_recompute_minute == Some(minute) {
            return;
        }
        self.last_plan_recompute_minute = Some(minute);

        let inputs = PlanInputs {
            demand_mw: demand_total_mw,
            must_take_mw: supply.must_take_mw(),
            nuclear_plan_mw: self.nuclear.capacity_mw() * self.config.nuclear.must_run_fraction,
            reservoir_storage_mwh: self.hydro.reservoir_storage_mwh(),
            reservoir_capacity_mwh: self.config.hydro_reservoir.storage_capacity_mwh,
        };
        self.plan = compute_plan(&self.config.dispatcher.plan, &inputs);
        for h in 0..24 {
            self.hydro.set_hourly_budget_mwh(self.plan.hydro_budget_mwh[h]);
        }
    }

    /// Advances the simulation by exactly one second, in the order spec §2
    /// mandates: Clock → Weather → Forecast → Dispatcher (reading last
    /// tick's frequency/reserves) → supply/demand → frequency pass 1 →
    /// reserve controllers → frequency pass 2 → BESS → settlement → history.
    pub fn tick(&mut self) {
        if self.phase == Phase::DayComplete {
            return;
        }

        self.numeric_bound_warnings.clear();

        let hour = self.clock.local_hour() as usize;
        let seconds_into_hour = self.clock.time_s().rem_euclid(3600) as f32;
        let seconds_remaining_in_hour = 3600.0 - seconds_into_hour;
        let remaining_day_s = (86_400 - self.clock.time_s().rem_euclid(86_400)).max(0) as f32;

        let weather = self.weather.step(&self.clock);
        self.forecast.step(&self.clock, &weather.synoptic);

        let demand_ctx = DemandContext {
            clock: &self.clock,
            synoptic: &weather.synoptic,
            curtailment01: 0.0,
            grid_stress01: (self.last_fcr_saturation01 + self.last_afrr_saturation01) / 2.0,
        };
        let demand = self.demand.step(&demand_ctx);

        let mut supply = SupplyBreakdown::default();
        if self.config.toggles.nuclear {
            let next_hour_target = self.plan.nuclear_mw[(hour + 1) % 24];
            supply.nuclear_mw = self.nuclear.step(NuclearDispatchMode::MustRun, self.plan.nuclear_mw[hour], next_hour_target, 1.0);
        }
        if self.config.toggles.hydro_ror {
            supply.run_of_river_mw = self.ror.step(self.clock.day_of_year(), 1.0);
        }
        if self.config.toggles.wind {
            supply.wind_mw = self.wind.step(&weather.wind_regions, 1.0);
        }
        if self.config.toggles.solar {
            supply.solar_mw = self.solar.step(&weather.solar_sites, 1.0);
        }
        if self.config.toggles.chp {
            let heat_load_fraction01 = (1.0 - (weather.synoptic.temperature_c + 10.0) / 30.0).clamp(0.0, 1.0);
            supply.chp_mw = self.chp.step(heat_load_fraction01, 1.0);
        }

        self.recompute_plan_if_due(demand.total_mw(), supply);

        // Headroom and the real-time correction read last tick's committed
        // output, matching the one-tick delay already used for frequency and
        // reserve saturation.
        let headroom = HeadroomInputs {
            hydro_up_mw: (self.config.hydro_reservoir.available_mw() - self.last_hydro_reservoir_mw).max(0.0),
            hydro_down_mw: self.last_hydro_reservoir_mw,
            import_up_mw: (self.config.interconnector.import_cap_mw - self.last_net_import_mw).max(0.0),
            import_down_mw: (self.config.interconnector.export_cap_mw + self.last_net_import_mw).max(0.0),
            peakers_up_mw: (self.config.peakers.capacity_mw - self.last_peakers_mw).max(0.0),
            dr_up_mw: if self.config.toggles.demand_response { 500.0 } else { 0.0 },
            hour,
        };
        let reserve_availability = compute_reserve_availability(&self.plan, &headroom);

        let setpoints = compute_setpoints(
            &self.config.dispatcher.realtime,
            &self.plan,
            &RealTimeInputs {
                hour,
                frequency_hz: self.last_frequency_hz,
                fcr_saturation01: self.last_fcr_saturation01,
                afrr_saturation01: self.last_afrr_saturation01,
                hydro_headroom_mw: headroom.hydro_up_mw,
                import_headroom_mw: headroom.import_up_mw,
            },
        );

        if self.config.toggles.hydro_reservoir {
            supply.hydro_reservoir_mw = self.hydro.step(setpoints.hydro_reservoir_mw, 0.0, remaining_day_s, 1.0);
        }
        if self.config.toggles.peakers {
            supply.peakers_mw = self.peakers.step(setpoints.peakers_mw, 1.0);
        }
        if self.config.toggles.interconnectors {
            let mode = InterconnectorMode::Follow(setpoints.net_import_mw);
            supply.net_import_mw = self.interconnector.step(mode, self.last_frequency_hz, 0.0, 1.0, 1.0);
        }
        self.last_hydro_reservoir_mw = supply.hydro_reservoir_mw;
        self.last_peakers_mw = supply.peakers_mw;
        self.last_net_import_mw = supply.net_import_mw;

        let load_shed_mw = if self.config.toggles.demand_response { setpoints.dr_shed_mw } else { 0.0 };

        let synchronous_mw = supply.nuclear_mw + supply.hydro_reservoir_mw + supply.chp_mw + supply.peakers_mw;
        let motor_load_mw = 0.35 * (demand.industry_mw + demand.transport_mw);
        let contributions = [
            InertiaContribution { mw: supply.nuclear_mw, inertia_constant_s: 6.0 },
            InertiaContribution { mw: supply.hydro_reservoir_mw, inertia_constant_s: 3.5 },
            InertiaContribution { mw: supply.chp_mw, inertia_constant_s: 4.0 },
            InertiaContribution { mw: supply.peakers_mw, inertia_constant_s: 2.5 },
            InertiaContribution { mw: motor_load_mw, inertia_constant_s: 1.5 },
        ];
        let (h_equiv, inertial_base_mw) = equivalent_inertia(&self.config.frequency, &contributions);
        let inertial_base_mw = inertial_base_mw.max(synchronous_mw.max(1.0));

        let p_raw_mw = supply.total_mw() - demand.total_mw();

        let preview_hz = self.frequency.pass1(p_raw_mw, 0.0, load_shed_mw, h_equiv, inertial_base_mw, 1.0);

        let fcr_mw = self.fcr_n.step(preview_hz, reserve_availability.fcr_up_mw, reserve_availability.fcr_down_mw, 1.0);
        let net_imbalance_mw = p_raw_mw;
        let afrr_mw = self.afrr.step(preview_hz, net_imbalance_mw, reserve_availability.afrr_up_mw, reserve_availability.afrr_down_mw, 1.0);
        let band_preview = crate::frequency::classify_band(preview_hz);
        let mfrr_mw = self.mfrr.step(band_preview, net_imbalance_mw, self.last_afrr_saturation01, reserve_availability.mfrr_up_mw, reserve_availability.mfrr_down_mw, 1.0);
        let rocof_hz_per_s = (preview_hz - self.frequency.frequency_hz()) / 1.0;
        let ffr_mw = self.ffr.step(preview_hz, rocof_hz_per_s, 1.0);

        let reserve_injection_mw = fcr_mw + afrr_mw + mfrr_mw;
        let frequency_breakdown = self.frequency.pass2(p_raw_mw, ffr_mw, load_shed_mw, reserve_injection_mw, h_equiv, inertial_base_mw, 1.0);

        self.last_frequency_hz = frequency_breakdown.frequency_hz;
        self.last_fcr_saturation01 = self.fcr_n.saturation01(reserve_availability.fcr_up_mw, reserve_availability.fcr_down_mw);
        self.last_afrr_saturation01 = self.afrr.saturation01(reserve_availability.afrr_up_mw, reserve_availability.afrr_down_mw);

        let bess_breakdown = self.bess.step(&self.bids, hour, seconds_remaining_in_hour, frequency_breakdown.frequency_hz, 1.0);

        let settlement_prices = SettlementPrices {
            day_ahead_eur_per_mwh: self.prices.day_ahead_eur_per_mwh,
            imbalance_up_eur_per_mwh: self.prices.imbalance_up_eur_per_mwh,
            imbalance_down_eur_per_mwh: self.prices.imbalance_down_eur_per_mwh,
        };
        self.settlement.step(self.bids.da_mw[hour], bess_breakdown.total_power_mw, net_imbalance_mw, frequency_breakdown.frequency_hz, &settlement_prices, 1.0);

        let snapshot = self.grid.step(self.clock.time_s(), demand, supply, bess_breakdown.total_power_mw, ffr_mw, load_shed_mw, frequency_breakdown);
        self.history.push(snapshot);

        self.clock.advance();

        if self.phase == Phase::WarmingUp && self.clock.time_s() >= (self.config.warmup_hours * 3600.0) as i32 {
            self.reset_to_start_of_day();
        } else if self.phase == Phase::Running && self.clock.day_complete() {
            self.phase = Phase::DayComplete;
        }
    }

    /// Diagnostic trail of out-of-range inputs clamped or rejected by the
    /// `set_*` setters since the start of the current tick. Cleared at the
    /// top of every `tick()`; internal per-tick physical clamps (SoC, ramp
    /// rates, frequency bounds) are not reported here — only externally
    /// supplied `NumericBound` inputs (spec §7).
    pub fn last_numeric_bound_warnings(&self) -> &[String] {
        &self.numeric_bound_warnings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warmup_then_reset_starts_real_day_at_zero() {
        let mut config = WorldConfig::default();
        config.warmup_hours = 0.01;
        let mut world = World::new(config);
        for _ in 0..40 {
            world.tick();
        }
        assert_eq!(world.phase(), Phase::Running);
        assert_eq!(world.clock().time_s(), (world.history().len()) as i32 - 0);
    }

    #[test]
    fn day_completes_after_86400_ticks() {
        let mut config = WorldConfig::default();
        config.warmup_hours = 0.0;
        let mut world = World::new(config);
        world.reset_to_start_of_day();
        for _ in 0..86_400 {
            world.tick();
        }
        assert_eq!(world.phase(), Phase::DayComplete);
    }

    #[test]
    fn all_toggles_off_and_no_bids_keeps_bess_idle() {
        let mut config = WorldConfig::default();
        config.warmup_hours = 0.0;
        config.toggles = Toggles {
            nuclear: false, hydro_reservoir: false, hydro_ror: false, wind: false, solar: false,
            chp: false, peakers: false, interconnectors: false, demand_response: false,
        };
        let mut world = World::new(config);
        world.reset_to_start_of_day();
        for _ in 0..10 {
            world.tick();
        }
        let last = world.history().last().unwrap();
        assert_eq!(last.bess_power_mw, 0.0);
    }

    #[test]
    fn out_of_range_setters_populate_numeric_bound_warnings() {
        let mut world = World::new(WorldConfig::default());
        assert!(world.last_numeric_bound_warnings().is_empty());

        world.set_da_bid(24, 10.0);
        world.set_fcr_bid(0, -5.0);
        world.set_unit_mode(99, Some(Mode::Discharge));
        world.set_unit_market(99, Market::Da);
        assert_eq!(world.last_numeric_bound_warnings().len(), 4);

        world.tick();
        assert!(world.last_numeric_bound_warnings().is_empty());
    }

    #[test]
    fn in_range_setters_leave_warnings_empty() {
        let mut world = World::new(WorldConfig::default());
        world.set_da_bid(3, 10.0);
        world.set_fcr_bid(0, 5.0);
        world.set_unit_mode(0, Some(Mode::Discharge));
        world.set_unit_market(0, Market::Da);
        assert!(world.last_numeric_bound_warnings().is_empty());
    }
}
