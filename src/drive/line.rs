// Open-loop polling for light/dark edges under the color sensor

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::{EDGE_MAX_TICKS, POLL_MS};
use crate::hub::{Clock, Color, ColorSensor, Result};

/// Tick budget for one edge wait
///
/// Tuned per approach speed: a slower approach needs more ticks to cross the same edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EdgePoll {
    pub max_ticks: u32,
    pub tick_ms: u32,
}

impl Default for EdgePoll {
    fn default() -> Self {
        Self {
            max_ticks: EDGE_MAX_TICKS,
            tick_ms: POLL_MS,
        }
    }
}

/// Result of one edge wait
///
/// The edge counts as found either way; `matched` tells whether the sensor
/// actually saw it or the budget ran out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub ticks: u32,
    pub matched: bool,
}

/// Wait until the sensor reports a color satisfying `target`, or the budget runs out
pub fn wait_for_color_transition<P>(
    sensor: &mut dyn ColorSensor,
    clock: &dyn Clock,
    target: P,
    poll: EdgePoll,
) -> Result<Edge>
where
    P: Fn(Color) -> bool,
{
    for tick in 1..=poll.max_ticks {
        clock.wait(poll.tick_ms);
        if target(sensor.color()?) {
            return Ok(Edge {
                ticks: tick,
                matched: true,
            });
        }
    }

    warn!(
        "No color edge within {} ticks of {}ms, assuming it was crossed",
        poll.max_ticks, poll.tick_ms
    );
    Ok(Edge {
        ticks: poll.max_ticks,
        matched: false,
    })
}

/// The three edges crossed while driving over a white stripe
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stripe {
    pub leading: Edge,
    pub trailing: Edge,
    pub next: Edge,
}

/// Localize against a stripe: white, then not white, then white again
pub fn find_stripe(sensor: &mut dyn ColorSensor, clock: &dyn Clock, poll: EdgePoll) -> Result<Stripe> {
    let leading = wait_for_color_transition(sensor, clock, Color::is_white, poll)?;
    let trailing = wait_for_color_transition(sensor, clock, |c| !c.is_white(), poll)?;
    let next = wait_for_color_transition(sensor, clock, Color::is_white, poll)?;

    debug!("Stripe edges: {:?} {:?} {:?}", leading, trailing, next);
    Ok(Stripe {
        leading,
        trailing,
        next,
    })
}
