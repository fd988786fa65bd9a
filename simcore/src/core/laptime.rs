use crate::core::tires::{weather_grip_multiplier, TireCompound, TireTable};
use crate::core::weather::Weather;
use rand::Rng;

/// * `top_speed` - Effective car top speed rating (mode modifiers already applied)
/// * `driver_speed` - Driver pace rating (0-100)
/// * `tire_management` - Driver tire conservation rating (0-100)
/// * `compound` - Mounted tire compound
/// * `laps_on_tire` - Tire age in laps (mode degradation scaling already applied)
/// * `fuel_load` - Remaining fuel fraction, 1.0 at the start and 0.0 at the flag
/// * `weather` - Current session weather
/// * `base_lap_time` - (s) Track reference lap time
/// * `top_speed_weight` - Track archetype weighting of the top speed rating,
/// 1.0 when no archetype modifier applies
#[derive(Debug, Clone, Copy)]
pub struct LapTimeParams {
    pub top_speed: f64,
    pub driver_speed: f64,
    pub tire_management: f64,
    pub compound: TireCompound,
    pub laps_on_tire: u32,
    pub fuel_load: f64,
    pub weather: Weather,
    pub base_lap_time: f64,
    pub top_speed_weight: f64,
}

/// calculate_lap_time combines car, driver, fuel and tire state into one
/// lap's time. All factors are multiplicative on the base time, the model is
/// intentionally coarse: there is no sector or position dynamic, only a
/// uniform +-0.3s noise term on top.
pub fn calculate_lap_time<R: Rng>(params: &LapTimeParams, tires: &TireTable, rng: &mut R) -> f64 {
    let effective_top_speed = params.top_speed * params.top_speed_weight;
    let car_factor = 1.0 - effective_top_speed * 0.002;
    let driver_factor = 1.0 - params.driver_speed * 0.001;
    let fuel_factor = 1.0 + params.fuel_load * 0.03;
    let tire_grip = tires.grip(params.compound, params.laps_on_tire, params.tire_management);
    let tire_factor = 1.0 + (tire_grip - 1.0) * 4.0;
    let weather_factor = weather_grip_multiplier(params.compound, params.weather);
    let noise = rng.gen_range(-0.3..0.3);

    params.base_lap_time * car_factor * driver_factor * fuel_factor * tire_factor * weather_factor
        + noise
}
