// src/config.rs
//! Конфигурация симуляции
//!
//! Этот модуль определяет все параметры, управляющие прогоном:
//! - Пресеты суши (водный мир, экваториальный континент и т.д.)
//! - Параметры атмосферы, которые вызывающий код может менять на каждом шаге (`SimParams`)
//! - Численные константы шага физики (`PhysicsSettings`)
//! - Настройки трассеров и планировщика кадров
//!
//! Все структуры поддерживают сериализацию в TOML для удобной настройки через конфигурационные файлы.

use crate::error::{SimError, SimResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Пресет распределения суши
///
/// Применяется один раз при создании прогона; после этого маска суши неизменна.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum LandPreset {
    /// Сплошной океан без суши
    #[default]
    WaterWorld,
    /// Прямоугольный континент на экваторе (|широта| < 35°, |долгота| < 30°)
    EquatorialContinent,
    /// Меридиональный континент от 80° ю.ш. до 80° с.ш. с проливами у полюсов
    NorthSouthContinent,
    /// Береговая линия Земли из растра 5°
    EarthLike,
}

impl LandPreset {
    pub const ALL: [LandPreset; 4] = [
        LandPreset::WaterWorld,
        LandPreset::EquatorialContinent,
        LandPreset::NorthSouthContinent,
        LandPreset::EarthLike,
    ];

    /// Имя пресета в конфигурации и в командной строке
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            LandPreset::WaterWorld => "water-world",
            LandPreset::EquatorialContinent => "equatorial-continent",
            LandPreset::NorthSouthContinent => "north-south-continent",
            LandPreset::EarthLike => "earth-like",
        }
    }
}

impl fmt::Display for LandPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LandPreset {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LandPreset::ALL
            .into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| SimError::UnknownPreset(s.to_string()))
    }
}

/// Внешние параметры атмосферы
///
/// Передаются в каждый вызов шага; симулятор их не хранит, поэтому вызывающий код
/// (панель управления, сценарий) может менять их между шагами.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimParams {
    /// Скорость вращения планеты относительно Земли
    #[serde(default = "default_rotation_ratio")]
    pub rotation_ratio: f64,

    /// Направление вращения: `true` — как у Земли
    #[serde(default = "default_prograde")]
    pub prograde: bool,

    /// Базовая скорость ветра, м/с
    #[serde(default = "default_base_wind_speed")]
    pub base_wind_speed: f64,

    /// Множитель разницы температур экватор–полюс (1.0 = земная)
    #[serde(default = "default_temp_gradient_ratio")]
    pub temp_gradient_ratio: f64,
}

fn default_rotation_ratio() -> f64 {
    1.0
}
fn default_prograde() -> bool {
    true
}
fn default_base_wind_speed() -> f64 {
    10.0
}
fn default_temp_gradient_ratio() -> f64 {
    1.0
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            rotation_ratio: 1.0,
            prograde: true,
            base_wind_speed: 10.0,
            temp_gradient_ratio: 1.0,
        }
    }
}

impl SimParams {
    pub fn validate(&self) -> SimResult<()> {
        ensure_non_negative("params.rotation_ratio", self.rotation_ratio)?;
        ensure_non_negative("params.base_wind_speed", self.base_wind_speed)?;
        ensure_non_negative("params.temp_gradient_ratio", self.temp_gradient_ratio)
    }
}

/// Численные константы шага физики
///
/// Ни одна из них не выведена из первых принципов: коэффициенты трения и береговое
/// усиление подобраны так, чтобы схема оставалась устойчивой на сетке 5° при шаге в
/// несколько часов. Поэтому все они вынесены в конфигурацию.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsSettings {
    /// Шаг по времени, с
    #[serde(default = "default_dt")]
    pub dt: f64,

    /// Ускорение свободного падения в градиенте давления, м/с²
    #[serde(default = "default_gravity")]
    pub gravity: f64,

    /// Линейное трение, 1/с
    #[serde(default = "default_drag")]
    pub drag: f64,

    /// Перевод скорости ветра в ускорение течения, 1/с
    #[serde(default = "default_wind_coupling")]
    pub wind_coupling: f64,

    /// Во сколько раз усиливается трение у берега в высоких широтах
    #[serde(default = "default_coastal_drag_multiplier")]
    pub coastal_drag_multiplier: f64,

    /// Широта (по модулю), выше которой включается береговое усиление трения
    #[serde(default = "default_coastal_drag_latitude")]
    pub coastal_drag_latitude: f64,

    /// Ограничение каждой компоненты скорости, м/с
    #[serde(default = "default_max_velocity")]
    pub max_velocity: f64,

    /// Ограничение отклонения уровня моря, м
    #[serde(default = "default_max_eta")]
    pub max_eta: f64,

    /// Время релаксации температуры к равновесному профилю, с
    #[serde(default = "default_relaxation_timescale")]
    pub relaxation_timescale: f64,
}

fn default_dt() -> f64 {
    10_800.0
}
fn default_gravity() -> f64 {
    9.81
}
fn default_drag() -> f64 {
    1.0e-4
}
fn default_wind_coupling() -> f64 {
    1.0e-6
}
fn default_coastal_drag_multiplier() -> f64 {
    5.0
}
fn default_coastal_drag_latitude() -> f64 {
    60.0
}
fn default_max_velocity() -> f64 {
    2.0
}
fn default_max_eta() -> f64 {
    20.0
}
fn default_relaxation_timescale() -> f64 {
    30.0 * 86_400.0
}

impl Default for PhysicsSettings {
    fn default() -> Self {
        Self {
            dt: 10_800.0,
            gravity: 9.81,
            drag: 1.0e-4,
            wind_coupling: 1.0e-6,
            coastal_drag_multiplier: 5.0,
            coastal_drag_latitude: 60.0,
            max_velocity: 2.0,
            max_eta: 20.0,
            relaxation_timescale: 30.0 * 86_400.0,
        }
    }
}

impl PhysicsSettings {
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive("physics.dt", self.dt)?;
        ensure_positive("physics.gravity", self.gravity)?;
        ensure_non_negative("physics.drag", self.drag)?;
        ensure_non_negative("physics.wind_coupling", self.wind_coupling)?;
        ensure_positive("physics.coastal_drag_multiplier", self.coastal_drag_multiplier)?;
        ensure_non_negative("physics.coastal_drag_latitude", self.coastal_drag_latitude)?;
        ensure_positive("physics.max_velocity", self.max_velocity)?;
        ensure_positive("physics.max_eta", self.max_eta)?;
        ensure_positive("physics.relaxation_timescale", self.relaxation_timescale)
    }
}

/// Настройки трассеров для визуализации течений
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleSettings {
    /// Количество трассеров
    #[serde(default = "default_particle_count")]
    pub count: usize,

    /// Нижняя граница времени жизни, тики визуализации
    #[serde(default = "default_min_age")]
    pub min_age: f32,

    /// Верхняя граница времени жизни, тики визуализации
    #[serde(default = "default_max_age")]
    pub max_age: f32,

    /// Трассер в более медленной воде, м/с, перерождается
    #[serde(default = "default_min_speed")]
    pub min_speed: f64,

    /// Сколько случайных позиций пробовать при поиске воды
    #[serde(default = "default_spawn_attempts")]
    pub spawn_attempts: usize,

    /// Ускорение движения трассеров относительно модельного времени
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,

    /// Сид генератора случайных чисел (детерминированное размещение)
    #[serde(default = "default_particle_seed")]
    pub seed: u64,
}

fn default_particle_count() -> usize {
    5000
}
fn default_min_age() -> f32 {
    60.0
}
fn default_max_age() -> f32 {
    240.0
}
fn default_min_speed() -> f64 {
    1.0e-3
}
fn default_spawn_attempts() -> usize {
    30
}
fn default_time_scale() -> f64 {
    1.0
}
fn default_particle_seed() -> u64 {
    7
}

impl Default for ParticleSettings {
    fn default() -> Self {
        Self {
            count: 5000,
            min_age: 60.0,
            max_age: 240.0,
            min_speed: 1.0e-3,
            spawn_attempts: 30,
            time_scale: 1.0,
            seed: 7,
        }
    }
}

impl ParticleSettings {
    pub fn validate(&self) -> SimResult<()> {
        ensure_positive("particles.min_age", f64::from(self.min_age))?;
        if self.max_age <= self.min_age {
            return Err(SimError::invalid(
                "particles.max_age",
                format!("должно быть больше min_age ({})", self.min_age),
            ));
        }
        ensure_non_negative("particles.min_speed", self.min_speed)?;
        if self.spawn_attempts == 0 {
            return Err(SimError::invalid("particles.spawn_attempts", "должно быть ≥ 1"));
        }
        ensure_positive("particles.time_scale", self.time_scale)
    }
}

/// Настройки развязки шагов физики и кадров отрисовки
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchedulerSettings {
    /// Целевое число шагов физики в секунду реального времени
    #[serde(default = "default_steps_per_second")]
    pub steps_per_second: f64,

    /// Больше этого за один кадр не выполняется, остаток отбрасывается
    #[serde(default = "default_max_steps_per_frame")]
    pub max_steps_per_frame: u32,

    /// Коэффициент экспоненциального сглаживания измеренной частоты (0..1]
    #[serde(default = "default_rate_smoothing")]
    pub rate_smoothing: f64,
}

fn default_steps_per_second() -> f64 {
    30.0
}
fn default_max_steps_per_frame() -> u32 {
    240
}
fn default_rate_smoothing() -> f64 {
    0.1
}

impl Default for SchedulerSettings {
    fn default() -> Self {
        Self {
            steps_per_second: 30.0,
            max_steps_per_frame: 240,
            rate_smoothing: 0.1,
        }
    }
}

impl SchedulerSettings {
    pub fn validate(&self) -> SimResult<()> {
        ensure_non_negative("scheduler.steps_per_second", self.steps_per_second)?;
        if self.max_steps_per_frame == 0 {
            return Err(SimError::invalid("scheduler.max_steps_per_frame", "должно быть ≥ 1"));
        }
        if !(self.rate_smoothing > 0.0 && self.rate_smoothing <= 1.0) {
            return Err(SimError::invalid(
                "scheduler.rate_smoothing",
                format!("ожидается (0, 1], получено {}", self.rate_smoothing),
            ));
        }
        Ok(())
    }
}

/// Полное описание прогона
///
/// Загружается из TOML-файла; все секции необязательны.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioConfig {
    /// Шаг сетки в градусах (по умолчанию 5° → 36×72)
    #[serde(default = "default_resolution_deg")]
    pub resolution_deg: f64,

    /// Пресет суши (по умолчанию `water-world`)
    #[serde(default)]
    pub preset: LandPreset,

    #[serde(default)]
    pub params: SimParams,

    #[serde(default)]
    pub physics: PhysicsSettings,

    #[serde(default)]
    pub particles: ParticleSettings,

    #[serde(default)]
    pub scheduler: SchedulerSettings,
}

fn default_resolution_deg() -> f64 {
    5.0
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            resolution_deg: 5.0,
            preset: LandPreset::WaterWorld,
            params: SimParams::default(),
            physics: PhysicsSettings::default(),
            particles: ParticleSettings::default(),
            scheduler: SchedulerSettings::default(),
        }
    }
}

impl ScenarioConfig {
    /// Загружает сценарий из TOML-файла
    ///
    /// # Пример
    /// ```toml
    /// # scenario.toml
    /// resolution_deg = 5.0
    /// preset = "earth-like"
    ///
    /// [params]
    /// rotation_ratio = 2.0
    ///
    /// [physics]
    /// dt = 7200.0
    /// ```
    pub fn from_toml_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| SimError::io(path, e))?;
        Self::from_toml_str(&contents)
    }

    pub fn from_toml_str(contents: &str) -> SimResult<Self> {
        let config: Self = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Проверяет все секции; разрешение проверяется при создании сетки
    pub fn validate(&self) -> SimResult<()> {
        self.params.validate()?;
        self.physics.validate()?;
        self.particles.validate()?;
        self.scheduler.validate()
    }
}

fn ensure_positive(name: &'static str, value: f64) -> SimResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid(name, format!("ожидается конечное число > 0, получено {value}")))
    }
}

fn ensure_non_negative(name: &'static str, value: f64) -> SimResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(SimError::invalid(name, format!("ожидается конечное число ≥ 0, получено {value}")))
    }
}
