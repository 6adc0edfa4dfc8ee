use std::fmt;
use std::time::{Duration, Instant};

use tracing::info;

/// Counts emitted games and periodically reports games per second.
///
/// Reports go through `tracing` (stderr), never the data channel.
#[derive(Debug, Clone)]
pub struct Throughput {
    started: Instant,
    games: u64,
    interval: u64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub games: u64,
    pub elapsed: Duration,
    pub games_per_sec: f64,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} games in {:.2}s ({:.0} games/sec)",
            self.games,
            self.elapsed.as_secs_f64(),
            self.games_per_sec
        )
    }
}

impl Throughput {
    pub fn new(interval: u64) -> Self {
        Self {
            started: Instant::now(),
            games: 0,
            interval,
        }
    }

    pub fn record(&mut self) {
        self.games += 1;
        if self.interval > 0 && self.games.is_multiple_of(self.interval) {
            info!(games = self.games, rate = self.rate().round(), "games/sec");
        }
    }

    pub fn games(&self) -> u64 {
        self.games
    }

    pub fn rate(&self) -> f64 {
        rate(self.games, self.started.elapsed())
    }

    pub fn summary(&self) -> Summary {
        let elapsed = self.started.elapsed();
        Summary {
            games: self.games,
            elapsed,
            games_per_sec: rate(self.games, elapsed),
        }
    }
}

fn rate(games: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs > 0.0 { games as f64 / secs } else { 0.0 }
}
