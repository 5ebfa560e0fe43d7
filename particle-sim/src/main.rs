// Copyright 2025 John Brosnihan
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Command-line runner
//!
//! Logs go to stderr through `env_logger`; set `RUST_LOG=info` to see setup
//! messages. The end-of-run report is printed after the terminal has been
//! restored.

use std::process::ExitCode;

use clap::Parser;

use particle_sim::config::{self, SimulationConfig, DEFAULT_ENTITY_COUNT};
use particle_sim::frame::{FrameOrchestrator, MonotonicClock, RunStats};
use particle_sim::init::{Randomizer, SpawnRanges};
use particle_sim::integration::MotionIntegrator;
use particle_sim::render::{DisplaySink, FrameRenderer, GridConfig, MemorySink, TerminalSink};
use particle_sim::simd::{detect_cpu_features, LaneWidth};
use particle_sim::store::EntityStore;
use particle_sim::SimError;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of entities to simulate
    #[arg(short, long, default_value_t = DEFAULT_ENTITY_COUNT)]
    entities: usize,

    /// Run length in seconds
    #[arg(short, long, default_value_t = 10.0)]
    seconds: f32,

    /// Integrator lane width: auto, 1, 4 or 8
    #[arg(short, long, default_value = "auto")]
    lanes: LaneWidth,

    /// Seed for the initial state
    #[arg(long)]
    seed: Option<u64>,

    /// Stop after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Render into memory instead of the terminal
    #[arg(long)]
    headless: bool,

    /// World width in cells
    #[arg(long, default_value_t = 83)]
    width: usize,

    /// World height in cells
    #[arg(long, default_value_t = 39)]
    height: usize,
}

impl Args {
    fn into_config(self) -> Result<SimulationConfig, SimError> {
        let config = SimulationConfig {
            entity_count: self.entities,
            run_duration: config::duration_from_secs(self.seconds)?,
            lane_width: self.lanes,
            grid: GridConfig::new(self.width, self.height),
            spawn: SpawnRanges::default(),
            seed: self.seed,
            frame_limit: self.frames,
            headless: self.headless,
        };
        config.validate()?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let result = Args::parse().into_config().and_then(|config| {
        if config.headless {
            run(&config, MemorySink::new())
        } else {
            run(&config, TerminalSink::new())
        }
    });

    match result {
        Ok(stats) => {
            println!("{}", stats);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run<S: DisplaySink>(config: &SimulationConfig, sink: S) -> Result<RunStats, SimError> {
    log::info!("cpu features: {}", detect_cpu_features());

    let mut store = EntityStore::new(config.entity_count)?;
    let randomizer = Randomizer::new(config.spawn, config.seed)?;
    randomizer.populate(&mut store);
    log::info!("initial state seed: {}", randomizer.seed());

    let integrator = MotionIntegrator::new(config.lane_width);
    let renderer = FrameRenderer::new(store.velocities(), config.grid, sink)?;

    let mut orchestrator =
        FrameOrchestrator::new(store, integrator, renderer, MonotonicClock, config.budget())?;
    orchestrator.run()
}
