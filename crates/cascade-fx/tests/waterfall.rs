//! End-to-end runs against an in-memory screen.

use std::time::Duration;

use cascade_fx::pipeline::RowPhase;
use cascade_fx::{
    AnimationLoop, DoneTrigger, IndicatorConfig, IndicatorKind, LoopConfig, RowConfig, RunOutcome,
    TickOutcome,
};
use cascade_term::cell::Attr;
use cascade_term::surface::HeadlessSurface;
use pretty_assertions::assert_eq;

const WIDTH: u16 = 48;
const NOISE_LEN: u16 = 4;
/// Text column for rows without an indicator: noise, one blank column.
const TEXT_X: usize = NOISE_LEN as usize + 1;

fn loop_config() -> LoopConfig {
    LoopConfig {
        tick_interval: Duration::ZERO,
        seed: Some(2024),
        ..LoopConfig::default()
    }
}

fn row(y: u16, text: &str, trigger: DoneTrigger) -> RowConfig {
    let mut cfg = RowConfig::new(y, text);
    cfg.noise.length = NOISE_LEN;
    cfg.reveal_cadence = 2;
    cfg.done_trigger = trigger;
    cfg
}

fn text_at(line: &str, x: usize) -> &str {
    line.get(x..).unwrap_or("").trim_end()
}

#[test]
fn rows_unblock_top_to_bottom() {
    let rows = ["Hi", "Ok", "Go"]
        .iter()
        .zip(0u16..)
        .map(|(text, y)| row(y, text, DoneTrigger::AfterFrames(3)))
        .collect();
    let mut anim =
        AnimationLoop::new(WIDTH, 3, rows, loop_config(), HeadlessSurface::new(WIDTH, 3)).unwrap();

    let mut ticks = 0;
    loop {
        let outcome = anim.tick().unwrap();
        ticks += 1;
        assert!(ticks < 100, "animation never finished");

        let rows = anim.pipelines();
        for i in 1..rows.len() {
            if !rows[i - 1].noise_done() {
                assert_eq!(rows[i].phase(), RowPhase::Waiting, "row {i} at tick {ticks}");
                assert_eq!(rows[i].streamer().revealed_len(), 0);
                let line = anim.surface().screen().row_text(rows[i].row()).unwrap();
                assert_eq!(line.trim_end(), "", "row {i} painted while blocked");
            }
        }

        if outcome == TickOutcome::Finished {
            break;
        }
    }

    anim.settle().unwrap();

    let lines = anim.surface().screen().text_lines();
    assert_eq!(text_at(&lines[0], TEXT_X), "Hi");
    assert_eq!(text_at(&lines[1], TEXT_X), "Ok");
    assert_eq!(text_at(&lines[2], TEXT_X), "Go");
    assert!(anim.pipelines().iter().all(|p| p.phase() == RowPhase::Done));
}

#[test]
fn default_trigger_waits_for_the_text() {
    let rows = vec![
        row(0, "Hello", DoneTrigger::StreamComplete),
        row(1, "world", DoneTrigger::StreamComplete),
    ];
    let mut anim =
        AnimationLoop::new(WIDTH, 2, rows, loop_config(), HeadlessSurface::new(WIDTH, 2)).unwrap();

    while anim.tick().unwrap() == TickOutcome::Running {
        let rows = anim.pipelines();
        if rows[1].phase() != RowPhase::Waiting {
            assert!(rows[0].is_finalized());
        }
    }
}

#[test]
fn finished_rows_show_completion_message() {
    let rows = ["one", "two"]
        .iter()
        .zip(0u16..)
        .map(|(text, y)| {
            let mut cfg = row(y, text, DoneTrigger::StreamComplete);
            cfg.indicator = Some(IndicatorConfig {
                kind: IndicatorKind::Pendulum,
                length: 4,
                cadence: 1,
                message: "Message generated!".to_owned(),
            });
            cfg
        })
        .collect::<Vec<_>>();
    let layout = rows[0].resolved_layout();
    let mut anim =
        AnimationLoop::new(WIDTH, 2, rows, loop_config(), HeadlessSurface::new(WIDTH, 2)).unwrap();

    let outcome = anim.run().unwrap();
    assert!(matches!(outcome, RunOutcome::Completed { .. }));
    assert_eq!(anim.surface().acks_waited(), 1);

    let screen = anim.surface().screen();
    for y in 0..2 {
        let line = screen.row_text(y).unwrap();
        let message_x = usize::from(layout.indicator_x) + 1;
        assert_eq!(text_at(&line[..usize::from(layout.text_x)], message_x), "Message generated!");
        assert!(screen.get(layout.indicator_x + 1, y).unwrap().attrs.contains(Attr::BOLD));
    }
    assert_eq!(text_at(&screen.row_text(0).unwrap(), usize::from(layout.text_x)), "one");
    assert_eq!(text_at(&screen.row_text(1).unwrap(), usize::from(layout.text_x)), "two");
}

#[test]
fn traveling_laps_drive_the_waterfall() {
    let rows = ["abcdefgh", "ij"]
        .iter()
        .zip(0u16..)
        .map(|(text, y)| {
            let mut cfg = row(y, text, DoneTrigger::IndicatorLaps(1));
            cfg.reveal_cadence = 1;
            cfg.indicator = Some(IndicatorConfig {
                kind: IndicatorKind::Traveling,
                length: 3,
                cadence: 1,
                ..IndicatorConfig::default()
            });
            cfg
        })
        .collect();
    let mut anim =
        AnimationLoop::new(WIDTH, 2, rows, loop_config(), HeadlessSurface::new(WIDTH, 2)).unwrap();

    // A lap of three slots takes three ticks.
    anim.tick().unwrap();
    anim.tick().unwrap();
    assert_eq!(anim.pipelines()[1].phase(), RowPhase::Waiting);

    // The waiting row already shows its idle indicator, and nothing else.
    let waiting = anim.surface().screen().row_text(1).unwrap();
    let ind = usize::from(anim.pipelines()[1].layout().indicator_x);
    assert_eq!(waiting[..ind].trim(), "");
    assert_eq!(text_at(&waiting, ind), "Generating...");
    anim.tick().unwrap();
    assert!(anim.pipelines()[0].noise_done());
    assert_eq!(anim.pipelines()[1].phase(), RowPhase::Animating);
}

#[test]
fn interrupt_skips_the_acknowledgement() {
    let rows = vec![row(0, "a long line of text", DoneTrigger::StreamComplete)];
    let surface = HeadlessSurface::new(WIDTH, 1)
        .with_input_after(5, cascade_term::reader::Input::Interrupt);
    let mut anim = AnimationLoop::new(WIDTH, 1, rows, loop_config(), surface).unwrap();

    assert_eq!(anim.run().unwrap(), RunOutcome::Cancelled { frames: 5 });
    let surface = anim.into_surface();
    assert_eq!(surface.acks_waited(), 0);
    assert!(surface.is_closed());
}
