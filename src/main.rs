//! Color Cascade entry point
//!
//! Native builds run a headless autoplay session: a scripted player draws
//! barriers under falling orbs, events are logged, and the best score is kept
//! in a JSON file. Web builds are driven from JS via `platform::web`.

#[cfg(not(target_arch = "wasm32"))]
mod autoplay {
    use color_cascade::sim::{GameEvent, GamePhase, GameState};
    use color_cascade::{ScoreStore, Session};
    use glam::Vec2;

    /// Ticks between scripted barrier attempts
    const DRAW_EVERY: u64 = 90;

    /// Pick a barrier that nudges the lowest falling orb toward resting orbs of its color
    pub fn plan_barrier(state: &GameState) -> Option<(Vec2, Vec2)> {
        let orb = state
            .orbs
            .iter()
            .filter(|o| !o.is_locked() && o.pos.y > 0.0)
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))?;

        let target_x = state
            .orbs
            .iter()
            .filter(|o| o.is_locked() && !o.pending_removal && o.color == orb.color)
            .map(|o| o.pos.x)
            .min_by(|a, b| (a - orb.pos.x).abs().total_cmp(&(b - orb.pos.x).abs()))
            .unwrap_or(state.board.width / 2.0);

        let below = orb.pos.y + orb.radius() * 3.0;
        if below > state.board.floor_y - orb.radius() * 2.0 {
            return None;
        }
        // Slope downhill toward the target
        let tilt = if target_x > orb.pos.x { 20.0 } else { -20.0 };
        Some((
            Vec2::new(orb.pos.x - 35.0, below - tilt / 2.0),
            Vec2::new(orb.pos.x + 35.0, below + tilt / 2.0),
        ))
    }

    pub fn play<S: ScoreStore>(session: &mut Session<S>, max_ticks: u64) {
        session.start_new_game();

        while session.state().time_ticks < max_ticks && session.phase() == GamePhase::Running {
            let tick = session.state().time_ticks;
            if tick % DRAW_EVERY == 0 {
                if let Some((a, b)) = plan_barrier(session.state()) {
                    session.pointer_down(a.x, a.y);
                    session.pointer_move((a.x + b.x) / 2.0, (a.y + b.y) / 2.0);
                    if let Err(reason) = session.pointer_up(b.x, b.y) {
                        log::trace!("Scripted barrier rejected: {:?}", reason);
                    }
                }
            }

            session.advance(color_cascade::consts::TICK_MS as f32);

            for event in session.drain_events() {
                match event {
                    GameEvent::Matched { size, color, points } => {
                        log::info!("Matched {} x color {} for {} points", size, color, points)
                    }
                    GameEvent::NewBestScore { score } => log::info!("New best score: {}", score),
                    GameEvent::OrbSpawned { .. }
                    | GameEvent::OrbLocked { .. }
                    | GameEvent::BarrierExpired { .. } => log::trace!("{:?}", event),
                    GameEvent::LevelUp { .. } | GameEvent::GameOver { .. } => {}
                }
            }
        }
    }
}


#[cfg(not(target_arch = "wasm32"))]
fn main() -> anyhow::Result<()> {
    use anyhow::Context;
    use color_cascade::{Difficulty, JsonFileStore, Session, Settings};

    env_logger::init();
    log::info!("Color Cascade (native, headless) starting...");

    let mut args = std::env::args().skip(1);
    let max_ticks = args
        .next()
        .map(|s| s.parse::<u64>())
        .transpose()
        .context("ticks must be a whole number")?
        .unwrap_or(60 * 60 * 5);
    let seed = args
        .next()
        .map(|s| s.parse::<u64>())
        .transpose()
        .context("seed must be a whole number")?
        .unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_secs())
                .unwrap_or(0)
        });

    let mut settings = Settings::load_file(std::path::Path::new("color_cascade_settings.json"));
    if let Some(name) = args.next() {
        let preset = Difficulty::from_str(&name)
            .with_context(|| format!("unknown difficulty {name:?} (relaxed, normal, frantic)"))?;
        settings.apply_preset(preset);
    }

    let store = JsonFileStore::new("color_cascade_best.json");
    log::info!("Best score kept in {}", store.path().display());
    let mut session = Session::new(settings, store, seed);
    autoplay::play(&mut session, max_ticks);

    let snapshot = session.snapshot();
    let c = snapshot.counters;
    println!(
        "{} {:?} after {:.1}s: score {} (best {}), level {}, {} matches, {} orbs on board",
        session.settings().difficulty.as_str(),
        snapshot.phase,
        c.game_time_ms as f64 / 1000.0,
        c.score,
        c.best_score,
        c.level,
        c.matches,
        snapshot.orbs.len()
    );
    Ok(())
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry points live in color_cascade::platform::web
}
