// src/scheduler.rs
//! Развязка шагов физики и кадров отрисовки
//!
//! Счётчик накапливает дробные «задолженные» шаги по прошедшему реальному времени
//! и целевой частоте; за кадр выполняется целая часть, остаток переносится.

use crate::config::SchedulerSettings;

#[derive(Debug, Clone)]
pub struct FrameScheduler {
    steps_per_second: f64,
    max_steps_per_frame: u32,
    smoothing: f64,
    accumulator: f64,
    paused: bool,
    measured_rate: Option<f64>,
}

impl FrameScheduler {
    #[must_use]
    pub fn new(settings: &SchedulerSettings) -> Self {
        Self {
            steps_per_second: settings.steps_per_second,
            max_steps_per_frame: settings.max_steps_per_frame,
            smoothing: settings.rate_smoothing,
            accumulator: 0.0,
            paused: false,
            measured_rate: None,
        }
    }

    /// Сколько шагов выполнить за кадр длиной `elapsed_seconds`
    ///
    /// Больше `max_steps_per_frame` не выдаётся; долг сверх предела отбрасывается,
    /// чтобы после долгого кадра симуляция не пыталась его догнать. На паузе
    /// возвращает 0, а счётчик и измеренная частота не меняются.
    pub fn advance(&mut self, elapsed_seconds: f64) -> u32 {
        if self.paused || !elapsed_seconds.is_finite() || elapsed_seconds <= 0.0 {
            return 0;
        }

        self.accumulator += elapsed_seconds * self.steps_per_second;
        let owed = self.accumulator.floor();
        self.accumulator -= owed;
        let steps = if owed >= f64::from(self.max_steps_per_frame) {
            self.max_steps_per_frame
        } else {
            owed as u32
        };

        let instant = f64::from(steps) / elapsed_seconds;
        self.measured_rate = Some(match self.measured_rate {
            None => instant,
            Some(rate) => rate + (instant - rate) * self.smoothing,
        });

        steps
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Сглаженная фактическая частота шагов, шаг/с (0 до первого кадра)
    #[must_use]
    pub fn measured_rate(&self) -> f64 {
        self.measured_rate.unwrap_or(0.0)
    }

    #[must_use]
    pub fn steps_per_second(&self) -> f64 {
        self.steps_per_second
    }

    /// Меняет целевую частоту; отрицательные и нечисловые значения дают 0
    pub fn set_steps_per_second(&mut self, rate: f64) {
        self.steps_per_second = if rate.is_finite() { rate.max(0.0) } else { 0.0 };
    }
}
