//! Poll every pad at ~60 Hz and print what changes.
//!
//! ```text
//! cargo run --example poll            # info-level lifecycle logs
//! cargo run --example poll -- -v      # plus probe/open details
//! cargo run --example poll -- --json  # dump a JSON snapshot on every A press
//! ```
//!
//! Press A to rumble, hold Back + Start to quit.

use std::time::Duration;

use fern::Dispatch;
use padlink::{Button, Manager, Stick, StickDirection, Trigger};

fn setup_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    Dispatch::new()
        .format(|out, message, record| {
            let now = chrono::Local::now().format("%Y.%m.%d %H:%M:%S");
            out.finish(format_args!("[{now}] {:<5} {message}", record.level()))
        })
        .level(log::LevelFilter::Warn)
        .level_for("padlink", level)
        .level_for("poll", level)
        .chain(std::io::stdout())
        .apply()
        .expect("Unable to set up logger");
}

fn main() {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let verbose = args.iter().any(|a| a == "-v" || a == "--verbose");
    let json = args.iter().any(|a| a == "--json");
    setup_logging(verbose);

    let mut pads = Manager::native();
    pads.init();
    log::info!("watching {} slots", pads.slot_count());

    loop {
        pads.update();

        for slot in pads.connected_slots().collect::<Vec<_>>() {
            for button in Button::ALL {
                if pads.button_triggered(slot, button) {
                    log::info!("slot {slot}: {button:?} down");
                }
                if pads.button_released(slot, button) {
                    log::info!("slot {slot}: {button:?} up");
                }
            }

            for stick in Stick::ALL {
                for dir in [
                    StickDirection::Up,
                    StickDirection::Down,
                    StickDirection::Left,
                    StickDirection::Right,
                ] {
                    if pads.stick_dir_triggered(slot, stick, dir) {
                        log::info!(
                            "slot {slot}: {stick:?} stick {dir:?} ({:.2} @ {:.0} deg)",
                            pads.stick_length(slot, stick),
                            pads.stick_angle(slot, stick).to_degrees()
                        );
                    }
                }
            }

            for trigger in Trigger::ALL {
                if pads.trigger_triggered(slot, trigger) {
                    log::info!(
                        "slot {slot}: {trigger:?} trigger pulled ({})",
                        pads.trigger_value(slot, trigger)
                    );
                }
            }

            if pads.button_triggered(slot, Button::A) {
                pads.set_rumble(slot, 0.6, 0.3, 250);
                if json {
                    if let Some(snap) = pads.snapshot(slot) {
                        match serde_json::to_string_pretty(&snap) {
                            Ok(text) => println!("{text}"),
                            Err(e) => log::warn!("snapshot: {e}"),
                        }
                    }
                }
            }

            if pads.button_down(slot, Button::Back) && pads.button_down(slot, Button::Start) {
                pads.shutdown();
                return;
            }
        }

        std::thread::sleep(Duration::from_millis(16));
    }
}
