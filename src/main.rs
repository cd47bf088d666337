//! Arena Survival headless runner
//!
//! Plays one run with a scripted player: it circles the arena centre and
//! always takes the first upgrade offered. Usage:
//!
//! ```text
//! arena-survival [tuning.json] [seed]
//! ```

use arena_survival::consts::{MAX_SUBSTEPS, SIM_DT};
use arena_survival::sim::{Phase, SimEvent, SimState, TickInput, tick};
use arena_survival::{SimResult, Tuning};
use glam::Vec2;

/// Frame time the runner pretends to render at
const FRAME_DT: f32 = 1.0 / 30.0;
/// Hard stop in frames, far past any survival time
const MAX_FRAMES: u64 = 30 * 60 * 30;

struct Runner {
    state: SimState,
    accumulator: f32,
    input: TickInput,
}

impl Runner {
    fn new(state: SimState) -> Self {
        Self {
            state,
            accumulator: 0.0,
            input: TickInput::default(),
        }
    }

    /// Circle the arena centre, a little wider than the spawn safe radius
    fn steer(&mut self) {
        let theta = self.state.time_ticks as f32 * SIM_DT * 0.6;
        let goal = Vec2::new(theta.cos(), theta.sin()) * 120.0;
        let pos = self.state.player().map_or(Vec2::ZERO, |p| p.pos);
        self.input.movement = goal - pos;
        self.input.choose_upgrade = (self.state.phase == Phase::ChoosingUpgrade).then_some(0);
    }

    /// Fixed-step accumulator with a substep ceiling
    fn update(&mut self, dt: f32) -> SimResult<()> {
        self.accumulator += dt.min(0.1);
        let mut substeps = 0;
        while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
            self.steer();
            tick(&mut self.state, &self.input, SIM_DT)?;
            self.accumulator -= SIM_DT;
            substeps += 1;
        }
        for event in self.state.drain_events() {
            report(&event);
        }
        Ok(())
    }
}

fn report(event: &SimEvent) {
    match event {
        SimEvent::UpgradeOffered { options } => {
            let titles: Vec<&str> = options.iter().map(|u| u.title()).collect();
            log::info!("Offered: {}", titles.join(", "));
        }
        SimEvent::PlayerHurt { damage, hp } => log::debug!("Player hit for {damage}, {hp} hp left"),
        SimEvent::HostileKilled { id, ai, by, .. } => log::trace!("{ai:?} {id} killed by {by:?}"),
        SimEvent::WaveReleased { wave, count } => log::info!("Wave {wave} released: {count} hostiles"),
        SimEvent::LevelCleared => log::info!("Level cleared"),
        _ => {}
    }
}

fn run() -> SimResult<()> {
    let mut args = std::env::args().skip(1);
    let tuning = match args.next() {
        Some(path) => Tuning::load(path)?,
        None => Tuning::default(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(0x5EED);

    let mut runner = Runner::new(SimState::with_tuning(seed, tuning)?);
    let mut frames = 0;
    while !runner.state.is_over() && frames < MAX_FRAMES {
        runner.update(FRAME_DT)?;
        frames += 1;
    }

    let summary = runner.state.summary();
    match serde_json::to_string_pretty(&summary) {
        Ok(json) => log::info!("Run summary:\n{json}"),
        Err(err) => log::warn!("Could not serialise run summary: {err}"),
    }
    Ok(())
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Arena Survival (headless) starting...");

    if let Err(err) = run() {
        log::error!("Run aborted: {err}");
        std::process::exit(1);
    }
}
