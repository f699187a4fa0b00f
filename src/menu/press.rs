// Short / long press discrimination on the front buttons

use tracing::debug;

use crate::config::POLL_MS;
use crate::hub::{ButtonSet, Buttons, Clock, Result};

/// How a button press was classified
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Press {
    /// Released before the threshold
    Short(ButtonSet),
    /// LEFT or RIGHT held past the threshold; reported before release
    Long(ButtonSet),
    /// Any other button held past the threshold; does nothing
    Overheld(ButtonSet),
}

/// Block until every button is released
pub fn wait_release(buttons: &mut dyn Buttons, clock: &dyn Clock) -> Result<()> {
    while !buttons.pressed()?.is_empty() {
        clock.wait(POLL_MS);
    }
    Ok(())
}

/// Block until some button is down and return the set held at that moment
pub fn wait_press(buttons: &mut dyn Buttons, clock: &dyn Clock) -> Result<ButtonSet> {
    loop {
        let pressed = buttons.pressed()?;
        if !pressed.is_empty() {
            return Ok(pressed);
        }
        clock.wait(POLL_MS);
    }
}

/// Wait for the next press and classify it by how long it is held
///
/// The buttons captured at press-down decide what the press means. A long
/// LEFT/RIGHT press is reported as soon as it crosses `threshold_ms`, while
/// the button is still held.
pub fn await_press(
    buttons: &mut dyn Buttons,
    clock: &dyn Clock,
    threshold_ms: u64,
) -> Result<Press> {
    let captured = wait_press(buttons, clock)?;
    let started = clock.now_ms();

    while !buttons.pressed()?.is_empty() {
        let held = clock.now_ms() - started;
        if held >= threshold_ms && captured.has_arrow() {
            debug!("Long press {:?} after {}ms", captured, held);
            return Ok(Press::Long(captured));
        }
        clock.wait(POLL_MS);
    }

    let held = clock.now_ms() - started;
    debug!("Press {:?} released after {}ms", captured, held);
    if held < threshold_ms {
        Ok(Press::Short(captured))
    } else {
        Ok(Press::Overheld(captured))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{SimConfig, SimHub};

    fn classify(button: ButtonSet, hold_ms: u64) -> (Press, u64) {
        let hub = SimHub::new(SimConfig::default());
        hub.press_at(100, hold_ms, button);
        let mut buttons = hub.buttons();
        let clock = hub.clock();

        let press = await_press(&mut buttons, &clock, 2000).unwrap();
        (press, hub.time_ms())
    }

    #[test]
    fn test_long_left_enters_before_release() {
        let (press, now) = classify(ButtonSet::LEFT, 2500);
        assert_eq!(press, Press::Long(ButtonSet::LEFT));
        // Reported at the threshold, not at release
        assert_eq!(now, 100 + 2000);
    }

    #[test]
    fn test_short_left_waits_for_release() {
        let (press, now) = classify(ButtonSet::LEFT, 1500);
        assert_eq!(press, Press::Short(ButtonSet::LEFT));
        assert_eq!(now, 100 + 1500);
    }

    #[test]
    fn test_long_right_is_long() {
        let (press, _) = classify(ButtonSet::RIGHT, 3000);
        assert_eq!(press, Press::Long(ButtonSet::RIGHT));
    }

    #[test]
    fn test_long_center_is_ignored() {
        let (press, now) = classify(ButtonSet::CENTER, 2500);
        assert_eq!(press, Press::Overheld(ButtonSet::CENTER));
        assert_eq!(now, 100 + 2500);
    }

    #[test]
    fn test_combined_press_keeps_press_down_set() {
        let hub = SimHub::new(SimConfig::default());
        hub.press_at(10, 300, ButtonSet::CENTER);
        hub.press_at(10, 300, ButtonSet::LEFT);
        let mut buttons = hub.buttons();
        let clock = hub.clock();

        let press = await_press(&mut buttons, &clock, 2000).unwrap();
        assert_eq!(
            press,
            Press::Short(ButtonSet::CENTER | ButtonSet::LEFT)
        );
    }
}
