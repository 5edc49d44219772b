// src/climate.rs
//! Аналитическая атмосфера: зональный ветер, параметр Кориолиса и равновесная температура
//!
//! Всё здесь — чистые функции широты и внешних параметров, определённые на всём
//! отрезке [-90°, 90°].

use crate::config::SimParams;
use std::f64::consts::PI;

/// Радиус Земли, м
pub const EARTH_RADIUS_M: f64 = 6.371e6;

/// Угловая скорость вращения Земли, рад/с
pub const EARTH_ROTATION_RATE: f64 = 7.2921e-5;

/// Средняя температура поверхности, °C
pub const MEAN_TEMPERATURE_C: f64 = 15.0;

/// Разница температур экватор–полюс при множителе 1.0, °C
pub const EQUATOR_POLE_DIFFERENCE_C: f64 = 40.0;

/// Число циркуляционных ячеек в полушарии
///
/// Быстрее вращение → больше и уже полосы ветра. Для Земли 3 (Хэдли, Феррел, полярная).
#[must_use]
pub fn wind_band_count(rotation_ratio: f64) -> u32 {
    (3.0 * rotation_ratio.max(0.0).sqrt()).round().max(1.0) as u32
}

/// Зональная скорость ветра на широте, м/с (положительная — на восток)
///
/// Ноль на экваторе и на каждой границе 90°/n. У экватора дуют восточные ветра (пассаты),
/// в следующей полосе — западные. Ретроградное вращение меняет знак.
#[must_use]
pub fn wind_u(lat_deg: f64, params: &SimParams) -> f64 {
    let amplitude = params.base_wind_speed * params.temp_gradient_ratio;
    let direction = if params.prograde { 1.0 } else { -1.0 };
    let n = f64::from(wind_band_count(params.rotation_ratio));
    -amplitude * direction * (n * PI * lat_deg.abs() / 90.0).sin()
}

/// Параметр Кориолиса f = 2Ω·sin(φ), 1/с
#[must_use]
pub fn coriolis_parameter(lat_deg: f64, rotation_ratio: f64) -> f64 {
    2.0 * EARTH_ROTATION_RATE * rotation_ratio * lat_deg.to_radians().sin()
}

/// Равновесная (солнечная) температура на широте, °C
#[must_use]
pub fn equilibrium_temperature(lat_deg: f64, temp_gradient_ratio: f64) -> f64 {
    MEAN_TEMPERATURE_C
        + (temp_gradient_ratio * EQUATOR_POLE_DIFFERENCE_C / 2.0) * lat_deg.to_radians().cos()
}
