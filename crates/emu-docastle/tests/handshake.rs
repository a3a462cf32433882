//! Latch handshake between the main and sub CPUs, run through the
//! scheduler with scripted CPUs.

use emu_core::testing::{ACCESS_CYCLES, Op, ScriptedCpu};
use emu_core::{Observable, Resume, Ticks, Value};
use emu_docastle::{DoCastle, DoCastleConfig, DoCastleVariant, LATCH_SIZE};

const REQUEST: [u8; LATCH_SIZE] = [0x10, 0x21, 0x32, 0x43, 0x54, 0x65, 0x76, 0x87, 0x98];
const REPLY: [u8; LATCH_SIZE] = [0xA0, 0xB1, 0xC2, 0xD3, 0xE4, 0xF5, 0x06, 0x17, 0x28];

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn board(
    variant: DoCastleVariant,
    main: ScriptedCpu,
    sub: ScriptedCpu,
    timeout: Option<u64>,
) -> DoCastle<ScriptedCpu> {
    init_logging();
    let mut config = DoCastleConfig::new(variant, vec![0; 0x8000], vec![0; 0x4000]);
    if let Some(timeout) = timeout {
        config.latch_timeout = Ticks::new(timeout);
    }
    DoCastle::new(config, main, sub).expect("valid config")
}

/// Main CPU side: NMI the sub CPU, send a request, read the reply.
fn main_program(nmi: u16) -> Vec<Op> {
    let mut ops = vec![Op::Write(nmi, 0)];
    ops.extend((0..LATCH_SIZE).map(|i| Op::Write(0xA000 + i as u16, REQUEST[i])));
    ops.extend((0..LATCH_SIZE).map(|i| Op::Read(0xA000 + i as u16)));
    ops
}

/// Sub CPU NMI handler: read the request, write the reply.
fn sub_handler(base: u16) -> Vec<Op> {
    let mut ops: Vec<Op> = (0..LATCH_SIZE).map(|i| Op::Read(base + i as u16)).collect();
    ops.extend((0..LATCH_SIZE).map(|i| Op::Write(base + i as u16, REPLY[i])));
    ops
}

fn received(cpu: &ScriptedCpu, base: u16) -> Vec<u8> {
    (0..LATCH_SIZE)
        .flat_map(|i| cpu.reads_from(base + i as u16))
        .collect()
}

#[test]
fn request_and_reply_cross_intact() {
    let main = ScriptedCpu::new(main_program(0xE000));
    let sub = ScriptedCpu::new(Vec::new()).with_nmi_handler(sub_handler(0xA000));
    let mut board = board(DoCastleVariant::DoCastle, main, sub, None);

    board.run_for(Ticks::new(400));

    assert_eq!(board.sub_cpu().nmis_taken(), 1);
    assert_eq!(received(board.sub_cpu(), 0xA000), REQUEST);
    assert_eq!(received(board.main_cpu(), 0xA000), REPLY);
    assert_eq!(board.main_last_resume(), Some(Resume::Triggered));
}

#[test]
fn sub_commit_wakes_main_before_timeout() {
    let main = ScriptedCpu::new(main_program(0xE000));
    let sub = ScriptedCpu::new(Vec::new()).with_nmi_handler(sub_handler(0xA000));
    let mut board = board(DoCastleVariant::DoCastle, main, sub, None);

    // Main commits on its 10th write; the sub CPU answers on the 18th
    // access of its NMI handler.
    let main_commit = u64::from(10 * ACCESS_CYCLES);
    board.run_until(Ticks::new(main_commit));
    assert!(board.is_main_suspended());

    let sub_commit = u64::from(18 * ACCESS_CYCLES);
    board.run_until(Ticks::new(sub_commit + 1));
    assert!(!board.is_main_suspended());
    assert_eq!(board.main_last_resume(), Some(Resume::Triggered));
    assert!(board.main_time() < Ticks::new(main_commit + 500));
}

#[test]
fn main_resumes_after_timeout_without_reply() {
    let main = ScriptedCpu::new(vec![Op::Write(0xA008, 0x01), Op::Read(0xA000)]);
    let sub = ScriptedCpu::new(Vec::new());
    let mut board = board(DoCastleVariant::DoCastle, main, sub, None);

    board.run_until(Ticks::new(300));
    assert!(board.is_main_suspended());
    assert!(board.main_cpu().reads().is_empty());

    board.run_until(Ticks::new(1_000));
    assert!(!board.is_main_suspended());
    assert_eq!(board.main_last_resume(), Some(Resume::TimedOut));
    assert_eq!(board.main_cpu().reads(), &[(0xA000, 0)]);
}

#[test]
fn board_time_runs_on_while_main_waits() {
    let main = ScriptedCpu::new(vec![Op::Write(0xA008, 0x01)]);
    let mut board = board(
        DoCastleVariant::DoCastle,
        main,
        ScriptedCpu::new(Vec::new()),
        None,
    );

    board.run_until(Ticks::new(300));
    assert!(board.is_main_suspended());
    assert_eq!(board.main_time(), Ticks::new(u64::from(ACCESS_CYCLES)));
    assert_eq!(board.now(), Ticks::new(300));
    assert_eq!(board.snapshot().time, board.now());
    assert_eq!(board.query("time"), Some(Value::U64(300)));
}

#[test]
fn timeout_is_configurable() {
    let main = ScriptedCpu::new(vec![Op::Write(0xA008, 0x01)]);
    let mut board = board(
        DoCastleVariant::DoCastle,
        main,
        ScriptedCpu::new(Vec::new()),
        Some(100),
    );

    board.run_until(Ticks::new(u64::from(ACCESS_CYCLES) + 99));
    assert!(board.is_main_suspended());
    board.run_until(Ticks::new(u64::from(ACCESS_CYCLES) + 101));
    assert!(!board.is_main_suspended());
    assert_eq!(board.main_last_resume(), Some(Resume::TimedOut));
}

#[test]
fn payload_writes_never_suspend() {
    let main: Vec<Op> = (0..8).map(|i| Op::Write(0xA000 + i, 0xEE)).collect();
    let mut board = board(
        DoCastleVariant::DoCastle,
        ScriptedCpu::new(main),
        ScriptedCpu::new(Vec::new()),
        None,
    );

    for _ in 0..8 {
        board.run_for(Ticks::new(u64::from(ACCESS_CYCLES)));
        assert!(!board.is_main_suspended());
    }
    assert_eq!(board.main_last_resume(), None);
    assert_eq!(board.latch().to_sub()[..8], [0xEE; 8]);
}

#[test]
fn sub_payload_writes_do_not_wake_main() {
    let main = ScriptedCpu::new(vec![Op::Write(0xA008, 0x01)]);
    let sub: Vec<Op> = (0..8).map(|i| Op::Write(0xA000 + i, 0x11)).collect();
    let mut board = board(
        DoCastleVariant::DoCastle,
        main,
        ScriptedCpu::new(sub),
        None,
    );

    board.run_until(Ticks::new(200));
    assert!(board.is_main_suspended());
    assert_eq!(board.latch().to_main()[..8], [0x11; 8]);
}

#[test]
fn dorunrun_handshake_uses_its_own_windows() {
    let main = ScriptedCpu::new(main_program(0xB800));
    let sub = ScriptedCpu::new(Vec::new()).with_nmi_handler(sub_handler(0xE000));
    let mut board = board(DoCastleVariant::DoRunRun, main, sub, None);

    board.run_for(Ticks::new(400));

    assert_eq!(received(board.sub_cpu(), 0xE000), REQUEST);
    assert_eq!(received(board.main_cpu(), 0xA000), REPLY);
    assert_eq!(board.main_last_resume(), Some(Resume::Triggered));
}

#[test]
fn reset_clears_latches_and_scheduler() {
    let main = ScriptedCpu::new(main_program(0xE000));
    let sub = ScriptedCpu::new(Vec::new()).with_nmi_handler(sub_handler(0xA000));
    let mut board = board(DoCastleVariant::DoCastle, main, sub, None);
    board.run_for(Ticks::new(400));

    board.reset();

    assert_eq!(board.latch().to_sub(), &[0; LATCH_SIZE]);
    assert_eq!(board.latch().to_main(), &[0; LATCH_SIZE]);
    assert!(!board.raster().level());
    assert!(!board.is_main_suspended());
    assert_eq!(board.now(), Ticks::ZERO);
    assert_eq!(board.query("latch.to_sub"), Some(Value::Bytes(vec![0; 9])));
}
