//! A tiny stand-in for the out-of-scope transport/shell (spec.md §1,
//! "Deliberately out of scope"). Reads a draw-command buffer — from a file
//! path given as the first argument, or a built-in canned buffer otherwise —
//! runs it through [`ninedraw::Rasterizer::process`], and prints the
//! resulting refresh rectangle and any response bytes.
//!
//! Grounded on the teacher's `kernel/src/main.rs` role as the thin entry
//! point that wires subsystems together and nothing else.

use std::{env, fs, process};

use ninedraw::{Channel, Color32, EngineConfig, Rasterizer};

fn main() {
    env_logger::init();

    let buf = match env::args().nth(1) {
        Some(path) => fs::read(&path).unwrap_or_else(|e| {
            eprintln!("mock-host: failed to read {path}: {e}");
            process::exit(1);
        }),
        None => canned_buffer(),
    };

    let mut engine = Rasterizer::new(EngineConfig::default());
    match engine.process(&buf) {
        Ok(response) => {
            if !response.is_empty() {
                println!("response: {} byte(s): {:02x?}", response.len(), response);
            }
            match engine.take_refresh() {
                Some(r) => println!(
                    "refresh: ({},{})-({},{})",
                    r.0.min.x, r.0.min.y, r.0.max.x, r.0.max.y
                ),
                None => println!("refresh: none"),
            }
        }
        Err(e) => {
            eprintln!("mock-host: command buffer aborted: {e}");
            process::exit(1);
        }
    }
}

/// Scenario 1 from spec.md §8: alloc a 1x1 replicated red image, blit it
/// across the whole (default 640x480) display.
fn canned_buffer() -> Vec<u8> {
    use draw9_codec::Writer;
    use draw9_proto::{Point, Rect};

    let mut w = Writer::new();

    w.write_u8(b'b'); // alloc
    w.write_i32(1);
    w.write_i32(0);
    w.write_u8(0);
    w.write_u32(Channel::Xrgb32.to_u32());
    w.write_u8(1); // repl
    w.write_point(Point::new(0, 0));
    w.write_point(Point::new(1, 1));
    w.write_point(Point::new(0, 0));
    w.write_point(Point::new(1, 1));
    w.write_u32(Color32::new(0xFF, 0, 0, 0xFF).to_u32());

    w.write_u8(b'd'); // draw
    w.write_i32(0);
    w.write_i32(1);
    w.write_i32(0);
    let r = Rect::from_xyxy(0, 0, 640, 480);
    w.write_point(r.min);
    w.write_point(r.max);
    w.write_point(Point::ZERO);
    w.write_point(Point::ZERO);

    w.into_bytes()
}
