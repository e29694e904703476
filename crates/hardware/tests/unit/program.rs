//! # Program Navigator Tests
//!
//! Fetch order across sections, control-flow redirection and the lookahead queue.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tomasim_core::core::Program;
use tomasim_core::core::program::InstructionQueue;
use tomasim_core::isa::parse;

fn program(source: &str, window: Option<usize>) -> Program {
    Program::new(Arc::new(parse(source).unwrap()), window)
}

fn next(program: &Program) -> Option<usize> {
    program.next_instruction().map(|inst| inst.code_order)
}

#[test]
fn test_fetch_walks_sections_in_source_order() {
    let mut p = program("add x1, x2, x3\nsecond:\nsub x4, x1, x2\nthird:\nmul x5, x4, x4", None);
    for expected in 0..3 {
        assert_eq!(next(&p), Some(expected));
        p.advance(None);
    }
    assert!(p.is_exhausted());
    assert_eq!(next(&p), None);
    assert_eq!(p.fetched(), 3);
    assert_eq!(p.execution_order(), &[0, 1, 2]);
}

#[test]
fn test_advancing_an_exhausted_program_is_a_no_op() {
    let mut p = program("add x1, x2, x3", None);
    p.advance(None);
    p.advance(None);
    assert_eq!(p.fetched(), 1);
}

#[test]
fn test_jump_moves_to_the_start_of_the_target_section() {
    let mut p = program("loop:\naddi x1, x1, 1\nblt x1, x2, loop\nadd x3, x1, x2", None);
    p.advance(None);
    p.advance(Some("loop"));
    assert_eq!(next(&p), Some(0));
    assert_eq!(p.fetched(), 2);
    assert_eq!(p.execution_order(), &[0, 1]);

    p.advance(None);
    assert_eq!(p.at_execution_order(2).map(|i| i.code_order), Some(0));
    assert_eq!(p.at_code_order(2).map(|i| i.mnemonic.as_str()), Some("add"));
}

#[test]
fn test_unknown_label_falls_through() {
    let mut p = program("j nowhere\nadd x1, x2, x3", None);
    p.advance(Some("nowhere"));
    assert_eq!(next(&p), Some(1));
}

#[test]
fn test_empty_sections_are_skipped() {
    let p = program("a:\nb:\nadd x1, x2, x3", None);
    assert_eq!(p.shared_listing().section_order, vec!["a", "b"]);
    assert_eq!(next(&p), Some(0));

    let mut p = program("j a\na:\nb:\nadd x1, x2, x3", None);
    p.advance(Some("a"));
    assert_eq!(next(&p), Some(1));
}

#[test]
fn test_queue_splits_after_the_first_control_instruction() {
    let p = program(
        "add x1, x2, x3\nblt x1, x2, main\nsub x4, x1, x2\nj main\nmul x5, x1, x1",
        None,
    );
    assert_eq!(
        p.instruction_queue(),
        InstructionQueue {
            visible: vec![0, 1],
            remaining: vec![2, 3, 4],
        }
    );
}

#[test]
fn test_queue_follows_the_cursor_and_the_window() {
    let source = "add x1, x2, x3\nsub x4, x1, x2\nnext:\nmul x5, x1, x1\ndiv x6, x5, x1";
    let mut p = program(source, Some(2));
    assert_eq!(p.instruction_queue().visible, vec![0, 1]);

    p.advance(None);
    p.advance(None);
    let queue = p.instruction_queue();
    assert_eq!(queue.visible, vec![2, 3]);
    assert!(queue.remaining.is_empty());

    p.advance(None);
    p.advance(None);
    assert_eq!(p.instruction_queue(), InstructionQueue::default());
}

#[test]
fn test_clones_share_the_listing_but_not_the_cursor() {
    let mut a = program("add x1, x2, x3\nsub x4, x1, x2", None);
    let b = a.clone();
    a.advance(None);
    assert_eq!(next(&a), Some(1));
    assert_eq!(next(&b), Some(0));
    assert!(Arc::ptr_eq(&a.shared_listing(), &b.shared_listing()));
}
