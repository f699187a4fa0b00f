// Simulated sensors, buttons, panel and clock

use tracing::{debug, info};

use super::SimHub;
use crate::hub::{ButtonSet, Buttons, Clock, Color, ColorSensor, Imu, Panel, Pattern, Result};

pub struct SimImu {
    hub: SimHub,
}

impl SimImu {
    pub(crate) fn new(hub: SimHub) -> Self {
        Self { hub }
    }
}

impl Imu for SimImu {
    fn heading(&mut self) -> Result<f32> {
        let world = self.hub.lock();
        Ok(world.heading - world.heading_offset)
    }

    fn reset_heading(&mut self, angle: f32) -> Result<()> {
        let mut world = self.hub.lock();
        world.heading_offset = world.heading - angle;
        Ok(())
    }

    fn ready(&mut self) -> Result<bool> {
        let world = self.hub.lock();
        Ok(world.time_ms >= world.imu_ready_at)
    }
}

/// Reads white over a field stripe and black everywhere else
pub struct SimColorSensor {
    hub: SimHub,
}

impl SimColorSensor {
    pub(crate) fn new(hub: SimHub) -> Self {
        Self { hub }
    }
}

impl ColorSensor for SimColorSensor {
    fn color(&mut self) -> Result<Color> {
        if self.hub.lock().on_stripe() {
            Ok(Color::White)
        } else {
            Ok(Color::Black)
        }
    }
}

/// Buttons replayed from the hub's press script
pub struct SimButtons {
    hub: SimHub,
}

impl SimButtons {
    pub(crate) fn new(hub: SimHub) -> Self {
        Self { hub }
    }
}

impl Buttons for SimButtons {
    fn pressed(&mut self) -> Result<ButtonSet> {
        self.hub.lock().pressed()
    }
}

/// Everything the operator would see or hear
#[derive(Debug, Clone, PartialEq)]
pub enum PanelEvent {
    Pattern(Pattern),
    Char(char),
    DisplayOff,
    Light(Color),
    Blink(Vec<Color>),
    Beep { frequency: u32, duration_ms: u32 },
}

/// Render a light-matrix pattern as text rows
fn render(pattern: &Pattern) -> String {
    pattern
        .iter()
        .map(|row| {
            row.iter()
                .map(|&px| if px > 0 { '#' } else { '.' })
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub struct SimPanel {
    hub: SimHub,
}

impl SimPanel {
    pub(crate) fn new(hub: SimHub) -> Self {
        Self { hub }
    }

    fn record(&self, event: PanelEvent) {
        self.hub.lock().record_panel(event);
    }
}

impl Panel for SimPanel {
    fn show_pattern(&mut self, pattern: &Pattern) -> Result<()> {
        info!("Display:\n{}", render(pattern));
        self.record(PanelEvent::Pattern(*pattern));
        Ok(())
    }

    fn show_char(&mut self, c: char) -> Result<()> {
        info!("Display: {}", c);
        self.record(PanelEvent::Char(c));
        Ok(())
    }

    fn display_off(&mut self) -> Result<()> {
        debug!("Display off");
        self.record(PanelEvent::DisplayOff);
        Ok(())
    }

    fn light(&mut self, color: Color) -> Result<()> {
        info!("Status light: {:?}", color);
        self.record(PanelEvent::Light(color));
        Ok(())
    }

    fn blink(&mut self, colors: &[Color], interval_ms: u32) -> Result<()> {
        info!("Status light blinking {:?} every {}ms", colors, interval_ms);
        self.record(PanelEvent::Blink(colors.to_vec()));
        Ok(())
    }

    fn beep(&mut self, frequency: u32, duration_ms: u32) -> Result<()> {
        debug!("Beep {}Hz for {}ms", frequency, duration_ms);
        self.record(PanelEvent::Beep {
            frequency,
            duration_ms,
        });
        self.hub.advance(u64::from(duration_ms));
        Ok(())
    }

    fn battery_voltage(&mut self) -> Result<u32> {
        Ok(self.hub.lock().battery_mv)
    }
}

pub struct SimClock {
    hub: SimHub,
}

impl SimClock {
    pub(crate) fn new(hub: SimHub) -> Self {
        Self { hub }
    }
}

impl Clock for SimClock {
    fn wait(&self, ms: u32) {
        self.hub.advance(u64::from(ms));
    }

    fn now_ms(&self) -> u64 {
        self.hub.time_ms()
    }
}
