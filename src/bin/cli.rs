use clap::Parser;
use gyre::{
    FieldKind, FrameScheduler, LandPreset, ParticleSystem, RunSummary, ScenarioConfig, Simulation,
    StepStats, save_field_png,
};
use log::LevelFilter;
use std::fs;
use std::io::Write;
use std::path::PathBuf;

/// Порог установившегося состояния: max(|Δu|, |Δv|, |Δη|)
const STEADY_TOLERANCE: f64 = 1.0e-6;

/// Частота виртуальных кадров в режиме `--seconds`
const FRAME_RATE: f64 = 60.0;

/// Симулятор ветровой циркуляции океана
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Путь к сценарию в формате TOML (без него — настройки по умолчанию)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Пресет суши, заменяет указанный в сценарии
    #[arg(short, long)]
    preset: Option<LandPreset>,

    /// Выполнить ровно N шагов физики
    #[arg(long, conflicts_with = "seconds")]
    steps: Option<u64>,

    /// Прогнать S секунд реального времени через планировщик кадров и трассеры
    #[arg(long)]
    seconds: Option<f64>,

    /// Остановиться раньше, если течение установилось
    #[arg(long)]
    until_steady: bool,

    /// Каталог для снимков и summary.json
    #[arg(short, long, default_value = "out")]
    output_dir: PathBuf,

    /// Увеличение снимков: пикселей на клетку
    #[arg(long, default_value_t = 8)]
    scale: u32,

    /// Уровень логирования (error, warn, info, debug, trace); иначе RUST_LOG
    #[arg(long)]
    log_level: Option<String>,
}

fn init_logging(level: Option<&str>) {
    let level = level
        .and_then(|l| l.parse::<LevelFilter>().ok())
        .or_else(|| std::env::var("RUST_LOG").ok().and_then(|v| v.parse().ok()))
        .unwrap_or(LevelFilter::Info);
    env_logger::Builder::new()
        .filter_level(level)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{} {:5}] {}",
                buf.timestamp_seconds(),
                record.level(),
                record.args()
            )
        })
        .init();
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(cli.log_level.as_deref());

    let mut config = match &cli.config {
        Some(path) => {
            log::info!("Загрузка сценария {}", path.display());
            ScenarioConfig::from_toml_file(path)?
        }
        None => ScenarioConfig::default(),
    };
    if let Some(preset) = cli.preset {
        config.preset = preset;
    }
    config.validate()?;

    let mut sim = Simulation::new(config.resolution_deg, config.preset, config.physics.clone())?;
    log::info!(
        "Сетка {}×{} ({}°), пресет `{}`, шаг {} с",
        sim.grid().rows,
        sim.grid().cols,
        config.resolution_deg,
        config.preset,
        config.physics.dt
    );

    let last = match cli.seconds {
        Some(seconds) => run_frames(&mut sim, &config, seconds, cli.until_steady)?,
        None => run_steps(&mut sim, &config, cli.steps.unwrap_or(1000), cli.until_steady)?,
    };

    fs::create_dir_all(&cli.output_dir)?;
    for kind in FieldKind::ALL {
        let path = cli.output_dir.join(kind.file_name());
        save_field_png(sim.grid(), kind, cli.scale, &path)?;
        log::debug!("Снимок {}", path.display());
    }
    let summary = RunSummary::collect(&sim, config.preset, &last, STEADY_TOLERANCE);
    summary.write_json(cli.output_dir.join("summary.json"))?;

    log::info!(
        "Готово: {} шагов ({:.1} сут), η ∈ [{:.3}, {:.3}] м, макс. скорость {:.3} м/с{}",
        summary.steps,
        summary.simulated_days,
        summary.eta_min,
        summary.eta_max,
        summary.max_speed,
        if summary.converged { ", установилось" } else { "" }
    );
    log::info!("Результаты в {}", cli.output_dir.display());
    Ok(())
}

/// Прогон фиксированного числа шагов без трассеров
fn run_steps(
    sim: &mut Simulation,
    config: &ScenarioConfig,
    steps: u64,
    until_steady: bool,
) -> Result<StepStats, Box<dyn std::error::Error>> {
    let report_every = (steps / 10).max(1);
    let mut last = StepStats::default();

    for n in 1..=steps {
        last = sim.step(&config.params);
        sim.grid().check_finite()?;
        if n % report_every == 0 {
            log::info!("Шаг {n}/{steps}: max|Δ| = {:.3e}", last.max_change());
        }
        if until_steady && last.is_steady(STEADY_TOLERANCE) {
            log::info!("Течение установилось на шаге {n}");
            break;
        }
    }
    Ok(last)
}

/// Прогон в реальном времени: планировщик решает, сколько шагов на кадр, трассеры следуют
fn run_frames(
    sim: &mut Simulation,
    config: &ScenarioConfig,
    seconds: f64,
    until_steady: bool,
) -> Result<StepStats, Box<dyn std::error::Error>> {
    let mut scheduler = FrameScheduler::new(&config.scheduler);
    let mut particles = ParticleSystem::new(sim.grid(), &config.particles)?;
    let frame = 1.0 / FRAME_RATE;
    let frames = (seconds.max(0.0) * FRAME_RATE).ceil() as u64;
    let mut last = StepStats::default();

    for n in 1..=frames {
        let steps = scheduler.advance(frame);
        for _ in 0..steps {
            last = sim.step(&config.params);
        }
        particles.update(sim.grid(), steps, config.physics.dt);
        sim.grid().check_finite()?;

        if n % FRAME_RATE as u64 == 0 {
            log::info!(
                "Кадр {n}/{frames}: {} шагов, {:.1} шаг/с, max|Δ| = {:.3e}, трассеров {}",
                sim.steps_taken(),
                scheduler.measured_rate(),
                last.max_change(),
                particles.len()
            );
        }
        if until_steady && sim.steps_taken() > 0 && last.is_steady(STEADY_TOLERANCE) {
            log::info!("Течение установилось на шаге {}", sim.steps_taken());
            break;
        }
    }
    Ok(last)
}
