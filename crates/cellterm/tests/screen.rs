// SPDX-License-Identifier: MIT
//
// End-to-end behavior of the public `Screen` handle against in-memory sinks.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};
use std::thread;

use cellterm::{Cell, Color, ColorDepth, Error, RenderOp, Screen, ScreenOptions, Style, TextAdvance};
use pretty_assertions::assert_eq;

/// A cloneable in-memory sink, so a test can read what a shared screen wrote.
#[derive(Clone, Default)]
struct SharedSink(Arc<Mutex<Vec<u8>>>);

impl SharedSink {
    fn take(&self) -> String {
        let bytes = std::mem::take(&mut *self.0.lock().unwrap());
        String::from_utf8(bytes).unwrap()
    }
}

impl Write for SharedSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Accepts writes, fails every flush.
struct StuckSink;

impl Write for StuckSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Err(io::Error::other("device gone"))
    }
}

fn screen(w: i32, h: i32) -> (Screen<SharedSink>, SharedSink) {
    let sink = SharedSink::default();
    let screen = Screen::with_writer(w, h, sink.clone(), ScreenOptions::default());
    (screen, sink)
}

fn plain(ch: char) -> Cell {
    Cell::new(ch, Color::DEFAULT, Color::DEFAULT, Style::NONE)
}

// ── Buffer semantics ────────────────────────────────────────────────────────

#[test]
fn clear_wipes_what_was_set() {
    let (screen, _) = screen(80, 24);
    screen.set_cell(0, 0, Cell::new('X', Color::RED, Color::BLUE, Style::BOLD));
    screen.clear();
    assert_eq!(screen.get_cell(0, 0), Cell::default());
    assert_ne!(screen.get_cell(0, 0).ch, 'X');
}

#[test]
fn resize_with_negative_width_is_ignored() {
    let (screen, _) = screen(10, 5);
    screen.set_cell(9, 4, plain('c'));
    screen.resize(-1, 5);
    assert_eq!(screen.size(), (10, 5));
    assert_eq!(screen.get_cell(9, 4), plain('c'));
}

#[test]
fn resize_preserves_overlap_and_defaults_the_rest() {
    let (screen, _) = screen(6, 3);
    for y in 0..3 {
        for x in 0..6 {
            let ch = char::from(b'a' + u8::try_from(y * 6 + x).unwrap());
            screen.set_cell(x, y, plain(ch));
        }
    }

    screen.resize(4, 5);
    assert_eq!(screen.size(), (4, 5));
    for y in 0..5 {
        for x in 0..4 {
            let expected = if y < 3 {
                plain(char::from(b'a' + u8::try_from(y * 6 + x).unwrap()))
            } else {
                Cell::default()
            };
            assert_eq!(screen.get_cell(x, y), expected, "at ({x}, {y})");
        }
    }
    assert_eq!(screen.get_cell(4, 0), Cell::default());
}

#[test]
fn draw_text_clips_at_right_edge() {
    let (screen, _) = screen(4, 1);
    screen.draw_text(2, 0, "ABCD", Color::YELLOW, Color::BLACK, Style::DIM);
    assert_eq!(screen.get_cell(2, 0), Cell::new('A', Color::YELLOW, Color::BLACK, Style::DIM));
    assert_eq!(screen.get_cell(3, 0), Cell::new('B', Color::YELLOW, Color::BLACK, Style::DIM));
    assert_eq!(screen.get_cell(4, 0), Cell::default());
}

#[test]
fn draw_text_one_cell_per_codepoint_by_default() {
    let (screen, _) = screen(4, 1);
    screen.draw_text(0, 0, "日本", Color::DEFAULT, Color::DEFAULT, Style::NONE);
    assert_eq!(screen.get_cell(0, 0).ch, '日');
    assert_eq!(screen.get_cell(1, 0).ch, '本');
}

#[test]
fn draw_text_by_display_width() {
    let sink = SharedSink::default();
    let opts = ScreenOptions::new().text_advance(TextAdvance::DisplayWidth);
    let screen = Screen::with_writer(5, 1, sink.clone(), opts);
    screen.draw_text(0, 0, "日本x", Color::DEFAULT, Color::DEFAULT, Style::NONE);
    assert_eq!(screen.get_cell(2, 0).ch, '本');
    assert_eq!(screen.get_cell(4, 0).ch, 'x');

    screen.show().unwrap();
    assert_eq!(sink.take(), "\x1b[H\x1b[0m日本x\x1b[0m");
}

// ── Rendering ───────────────────────────────────────────────────────────────

#[test]
fn show_renders_styled_frame() {
    let (screen, sink) = screen(4, 2);
    screen.draw_text(0, 0, "ok", Color::GREEN, Color::DEFAULT, Style::BOLD);
    screen.set_cell(3, 1, Cell::new('!', Color::DEFAULT, Color::rgb(10, 20, 30), Style::NONE));

    let stats = screen.show().unwrap();
    assert_eq!(
        sink.take(),
        "\x1b[H\
         \x1b[0m\x1b[32m\x1b[1mok\
         \x1b[0m  \r\n   \
         \x1b[0m\x1b[48;2;10;20;30m!\
         \x1b[0m"
    );
    assert_eq!(stats.cells, 8);
    assert_eq!(stats.attribute_changes, 3);
}

#[test]
fn show_at_reduced_depth() {
    let sink = SharedSink::default();
    let opts = ScreenOptions::new().color_depth(ColorDepth::Indexed16);
    let screen = Screen::with_writer(1, 1, sink.clone(), opts);
    screen.set_cell(0, 0, Cell::new('g', Color::index(244), Color::DEFAULT, Style::NONE));
    screen.show().unwrap();
    assert_eq!(sink.take(), "\x1b[H\x1b[0m\x1b[37mg\x1b[0m");
}

#[test]
fn show_failure_names_the_flush() {
    let screen = Screen::with_writer(2, 2, StuckSink, ScreenOptions::default());
    let err = screen.show().unwrap_err();
    assert_eq!(err.render_op(), Some(RenderOp::Flush));
    assert_eq!(err.to_string(), "failed to flush output: device gone");
}

#[test]
fn sync_failure_is_reported() {
    let screen = Screen::with_writer(2, 2, StuckSink, ScreenOptions::default());
    assert!(matches!(screen.sync(), Err(Error::Sync(_))));
}

#[test]
fn render_does_not_disturb_cells() {
    let (screen, _) = screen(3, 1);
    screen.draw_text(0, 0, "abc", Color::RED, Color::DEFAULT, Style::NONE);
    screen.show().unwrap();
    screen.show().unwrap();
    assert_eq!(screen.get_cell(1, 0), Cell::new('b', Color::RED, Color::DEFAULT, Style::NONE));
}

#[test]
fn close_then_write_out() {
    let (mut screen, sink) = screen(1, 1);
    screen.show().unwrap();
    sink.take();
    screen.close().unwrap();
    assert_eq!(sink.take(), "\x1b[0m\x1b[?25h");
}

// ── Concurrency ─────────────────────────────────────────────────────────────

#[test]
fn concurrent_writers_each_land() {
    let (screen, _) = screen(8, 8);
    let screen = Arc::new(screen);

    let handles: Vec<_> = (0..8)
        .map(|y| {
            let screen = Arc::clone(&screen);
            thread::spawn(move || {
                for x in 0..8 {
                    screen.set_cell(x, y, plain('#'));
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }

    for y in 0..8 {
        for x in 0..8 {
            assert_eq!(screen.get_cell(x, y).ch, '#');
        }
    }
}

#[test]
fn show_never_mixes_two_buffer_states() {
    // The writer repaints the row left to right, alternating 'a' and 'b'
    // passes. Any single buffer state is one run of the current pass
    // followed by one run of the previous pass, so a frame with more than
    // one change of character was read across several states.
    const WIDTH: i32 = 16;
    let (screen, sink) = screen(WIDTH, 1);
    for x in 0..WIDTH {
        screen.set_cell(x, 0, plain('b'));
    }
    let screen = Arc::new(screen);

    let writer = {
        let screen = Arc::clone(&screen);
        thread::spawn(move || {
            for pass in 0..2000 {
                let ch = if pass % 2 == 0 { 'a' } else { 'b' };
                for x in 0..WIDTH {
                    screen.set_cell(x, 0, plain(ch));
                }
            }
        })
    };
    let mut frames = 0;
    while !writer.is_finished() || frames < 50 {
        screen.show().unwrap();
        frames += 1;
    }
    writer.join().unwrap();

    let out = sink.take();
    let mut seen = 0;
    for frame in out.split("\x1b[H").filter(|f| !f.is_empty()) {
        let row = frame
            .strip_prefix("\x1b[0m")
            .and_then(|f| f.strip_suffix("\x1b[0m"))
            .unwrap_or_else(|| panic!("unexpected framing: {frame:?}"));
        assert_eq!(row.chars().count(), 16, "row {row:?}");
        assert!(row.chars().all(|c| c == 'a' || c == 'b'), "row {row:?}");
        let changes = row.as_bytes().windows(2).filter(|w| w[0] != w[1]).count();
        assert!(changes <= 1, "torn frame: {row:?}");
        seen += 1;
    }
    assert_eq!(seen, frames);
}

#[test]
fn draw_text_lets_readers_in_between_characters() {
    // The buffer lock is released after every character, so a reader racing
    // a long draw can catch the start of the string drawn and the end not.
    const WIDTH: i32 = 4096;
    let text = "x".repeat(4096);
    let (screen, _) = screen(WIDTH, 1);
    let screen = Arc::new(screen);

    let mut caught_midway = false;
    for _ in 0..50 {
        screen.clear();
        let writer = {
            let screen = Arc::clone(&screen);
            let text = text.clone();
            thread::spawn(move || {
                screen.draw_text(0, 0, &text, Color::DEFAULT, Color::DEFAULT, Style::NONE);
            })
        };
        while !writer.is_finished() {
            let first = screen.get_cell(0, 0).ch;
            let last = screen.get_cell(WIDTH - 1, 0).ch;
            if first == 'x' && last != 'x' {
                caught_midway = true;
                break;
            }
            thread::yield_now();
        }
        writer.join().unwrap();
        assert_eq!(screen.get_cell(WIDTH - 1, 0).ch, 'x');
        if caught_midway {
            break;
        }
    }
    assert!(caught_midway, "draw_text never exposed a partially drawn string");
}
