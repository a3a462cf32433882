//! CRTC-driven interrupts and board snapshots.

use emu_core::testing::{Op, ScriptedCpu};
use emu_core::{Observable, Ticks, Value};
use emu_docastle::{BoardSnapshot, DoCastle, DoCastleConfig, DoCastleVariant};

/// 39 characters x 264 lines: one CRTC frame per video frame. Rows are
/// 32 characters apart, so MA6 at HSYNC rises every fourth row.
const CRTC_SETUP: [(u8, u8); 9] = [
    (0, 38),
    (1, 32),
    (2, 34),
    (3, 0x24),
    (4, 32),
    (5, 0),
    (6, 28),
    (7, 30),
    (9, 7),
];

fn program_crtc() -> Vec<Op> {
    CRTC_SETUP
        .iter()
        .flat_map(|&(reg, value)| [Op::IoWrite(0x00, reg), Op::IoWrite(0x02, value)])
        .collect()
}

fn board() -> DoCastle<ScriptedCpu> {
    let _ = env_logger::builder().is_test(true).try_init();
    let config =
        DoCastleConfig::new(DoCastleVariant::DoCastle, vec![0; 0x8000], vec![0; 0x4000]);
    // The main CPU never re-enables interrupts; the sub CPU does at the
    // end of every handler.
    let main = ScriptedCpu::new(program_crtc());
    let sub = ScriptedCpu::new(Vec::new()).with_irq_handler(vec![Op::EnableInterrupts]);
    DoCastle::new(config, main, sub).expect("valid config")
}

#[test]
fn crtc_registers_written_through_io_ports() {
    let mut board = board();
    board.run_for(Ticks::new(100));
    assert_eq!(board.query("crtc.r0"), Some(Value::U8(38)));
    assert_eq!(board.query("crtc.r3"), Some(Value::U8(0x24)));
    assert_eq!(board.query("crtc.r9"), Some(Value::U8(7)));
}

#[test]
fn ma6_edges_interrupt_the_sub_cpu() {
    let mut board = board();
    board.run_frame();
    board.run_frame();
    // Rows 1, 5, 9 ... 29 of each frame.
    assert_eq!(board.sub_cpu().interrupts_taken(), 16);
}

#[test]
fn vsync_interrupts_the_main_cpu() {
    let mut board = board();
    board.run_frame();
    assert_eq!(board.main_cpu().interrupts_taken(), 1);
    assert_eq!(board.query("main.irq"), Some(Value::Bool(false)));
}

#[test]
fn reset_returns_raster_detector_low() {
    let mut board = board();
    // Into row 1, where MA6 is high at HSYNC.
    board.run_for(Ticks::new(2_500));
    assert_eq!(board.query("raster.level"), Some(Value::Bool(true)));
    board.reset();
    assert_eq!(board.query("raster.level"), Some(Value::Bool(false)));
    // The 6845 restarts its counters but keeps its programming.
    assert_eq!(board.query("crtc.r0"), Some(Value::U8(38)));
    assert_eq!(board.query("crtc.hcount"), Some(Value::U8(0)));
    assert_eq!(board.query("crtc.row"), Some(Value::U8(0)));
}

#[test]
fn beam_outputs_are_observable() {
    let mut board = board();
    board.run_for(Ticks::new(100));

    // HSYNC is four characters of a 39-character line.
    let mut hsync = Vec::new();
    for _ in 0..64 {
        board.run_for(Ticks::new(8));
        hsync.push(board.query("crtc.hsync") == Some(Value::Bool(true)));
    }
    assert!(hsync.contains(&true));
    assert!(hsync.contains(&false));

    let mut rows = Vec::new();
    for _ in 0..8 {
        board.run_for(Ticks::new(250));
        match board.query("crtc.ra") {
            Some(Value::U8(ra)) => rows.push(ra),
            other => panic!("crtc.ra gave {other:?}"),
        }
    }
    assert!(rows.iter().all(|&ra| ra <= 7));
    assert!(rows.windows(2).any(|pair| pair[0] != pair[1]));
}

#[test]
fn snapshot_survives_json() {
    let mut board = board();
    board.set_input(emu_docastle::inputs::PORT_SYSTEM, 0xDF);
    board.run_for(Ticks::new(5_000));

    let snapshot = board.snapshot();
    let json = serde_json::to_string(&snapshot).expect("serialise");
    let restored: BoardSnapshot = serde_json::from_str(&json).expect("deserialise");
    assert_eq!(restored, snapshot);
    assert_eq!(restored.crtc.register(2), 34);
}
