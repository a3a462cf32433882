//! Sub CPU reads through the input multiplexers.

use emu_core::testing::{Op, ScriptedCpu};
use emu_core::{Observable, Ticks, Value};
use emu_docastle::inputs::{PORT_BUTTONS, PORT_DSW1, PORT_JOYS, PORT_JOYS_RIGHT, PORT_SYSTEM};
use emu_docastle::{DoCastle, DoCastleConfig, DoCastleVariant};

fn board(variant: DoCastleVariant, sub: Vec<Op>) -> DoCastle<ScriptedCpu> {
    let _ = env_logger::builder().is_test(true).try_init();
    let config = DoCastleConfig::new(variant, vec![0; 0x8000], vec![0; 0x4000]);
    DoCastle::new(config, ScriptedCpu::new(Vec::new()), ScriptedCpu::new(sub))
        .expect("valid config")
}

/// Read `ports` in order, then one more access to collect the last one.
fn scan(ports: &[usize]) -> Vec<Op> {
    ports
        .iter()
        .chain([&0])
        .map(|&port| Op::Read(0xC000 + port as u16))
        .collect()
}

fn values(board: &DoCastle<ScriptedCpu>) -> Vec<u8> {
    board.sub_cpu().reads().iter().map(|&(_, value)| value).collect()
}

#[test]
fn each_read_returns_the_previous_selection() {
    let mut board = board(
        DoCastleVariant::DoCastle,
        scan(&[PORT_JOYS, PORT_BUTTONS, PORT_SYSTEM, PORT_DSW1]),
    );
    board.set_input(PORT_JOYS, 0xEF);
    board.set_input(PORT_BUTTONS, 0xFE);
    board.set_input(PORT_SYSTEM, 0x7F);
    board.set_input(PORT_DSW1, 0xC3);

    board.run_for(Ticks::new(40));

    // Power-on select is the unconnected port 0.
    assert_eq!(values(&board), [0xFF, 0xEF, 0xFE, 0x7F, 0xC3]);
}

#[test]
fn indoor_soccer_second_joystick() {
    let mut board = board(
        DoCastleVariant::IdSoccer,
        scan(&[PORT_JOYS, PORT_JOYS_RIGHT]),
    );
    board.set_input(PORT_JOYS, 0xFB);
    board.set_input(PORT_JOYS_RIGHT, 0xF7);

    board.run_for(Ticks::new(40));

    assert_eq!(values(&board)[1..], [0xFB, 0xF7]);
}

#[test]
fn bit7_of_the_address_sets_flip_screen() {
    let mut board = board(
        DoCastleVariant::DoCastle,
        vec![Op::Read(0xC080 + PORT_BUTTONS as u16), Op::Idle(4)],
    );
    board.run_for(Ticks::new(8));
    assert!(board.flip_screen());
    assert_eq!(board.query("flip_screen"), Some(Value::Bool(true)));
    assert_eq!(board.snapshot().inputs.select(), PORT_BUTTONS as u8);
}
