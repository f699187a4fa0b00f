// End-to-end: power on, edit the field config, pick a run and launch it

use masterpiece_runtime::config::{LONG_PRESS_MS, RobotConfig};
use masterpiece_runtime::hub::{ButtonSet, Color, Storage};
use masterpiece_runtime::menu::{FieldConfig, MenuEvent, Selector};
use masterpiece_runtime::runs::competition_runs;
use masterpiece_runtime::runtime::startup;
use masterpiece_runtime::sim::{MemoryStorage, PanelEvent, SimConfig, SimHub};

#[test]
fn test_menu_session_end_to_end() {
    let hub = SimHub::new(SimConfig {
        imu_ready_at_ms: 300,
        ..SimConfig::default()
    });
    let storage = MemoryStorage::new();
    let mut robot = hub
        .robot(Box::new(storage.clone()), RobotConfig::default())
        .unwrap();
    startup(&mut robot).unwrap();

    let mut selector = Selector::new(competition_runs(), LONG_PRESS_MS);

    // Long RIGHT opens the config sub-mode, one RIGHT picks Magenta, CENTER leaves
    let t = hub.time_ms();
    hub.press_at(t + 100, 2500, ButtonSet::RIGHT);
    hub.press_at(t + 3000, 100, ButtonSet::RIGHT);
    hub.press_at(t + 4000, 100, ButtonSet::CENTER);
    let event = selector.step(&mut robot).unwrap();
    assert_eq!(event, MenuEvent::Configured(FieldConfig::Magenta));
    assert_eq!(selector.selection().number(), 1);

    // A power cycle keeps the value
    let mut reopened = storage.clone();
    assert_eq!(FieldConfig::load(&mut reopened).unwrap(), FieldConfig::Magenta);
    assert_eq!(reopened.read(0, 1).unwrap(), vec![1]);

    // RIGHT arms run 2
    let t = hub.time_ms();
    hub.press_at(t + 100, 150, ButtonSet::RIGHT);
    let event = selector.step(&mut robot).unwrap();
    assert!(matches!(event, MenuEvent::Moved(s) if s.number() == 2));
    assert!(hub.panel_events().contains(&PanelEvent::Light(Color::Red)));

    // CENTER launches it and the menu moves on to run 3
    let t = hub.time_ms();
    hub.press_at(t + 100, 150, ButtonSet::CENTER);
    match selector.step(&mut robot).unwrap() {
        MenuEvent::Ran(report) => {
            assert_eq!(report.run, "run 2");
            assert!(report.elapsed_ms > 10_000, "elapsed {}", report.elapsed_ms);
        }
        other => panic!("expected a run, got {:?}", other),
    }
    assert_eq!(selector.selection().number(), 3);

    // No more input: the loop winds down cleanly
    selector.run(&mut robot).unwrap();
}

#[test]
fn test_every_run_from_the_menu_in_one_session() {
    let hub = SimHub::new(SimConfig::default());
    let mut robot = hub
        .robot(Box::new(MemoryStorage::new()), RobotConfig::default())
        .unwrap();
    startup(&mut robot).unwrap();
    let mut selector = Selector::new(competition_runs(), LONG_PRESS_MS);

    let mut ran = Vec::new();
    for _ in 0..3 {
        let t = hub.time_ms();
        hub.press_at(t + 100, 150, ButtonSet::CENTER);
        if let MenuEvent::Ran(report) = selector.step(&mut robot).unwrap() {
            ran.push(report.run);
        }
    }
    assert_eq!(ran, vec!["run 1", "run 2", "run 3"]);
    assert_eq!(selector.selection().number(), 1, "wrapped back to the first run");
}
