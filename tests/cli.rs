extern crate assert_cmd;
extern crate predicates;

use assert_cmd::prelude::*;
use predicates::prelude::*;
use std::process::Command;

fn multibrot() -> Command {
    Command::cargo_bin("multibrot").unwrap()
}

#[test]
fn inverted_sweep_is_refused_without_output() {
    let output = multibrot()
        .args(&["--powerStart", "8", "--powerEnd", "2", "--frames", "3"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(predicate::str::contains("powerEnd").eval(&stderr));
    assert!(predicate::str::contains("Frame:").not().eval(&stderr));
}

#[test]
fn small_run_writes_a_gif_and_reports_progress() {
    let output = multibrot()
        .args(&[
            "--dimension",
            "16",
            "--frames",
            "3",
            "--iterations",
            "20",
            "--threads",
            "2",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.starts_with(b"GIF89a"));
    assert_eq!(output.stdout.last(), Some(&0x3b));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(predicate::str::contains("\rFrame:    3 / 3").eval(&stderr));
}

#[test]
fn zero_frames_write_nothing() {
    let output = multibrot()
        .args(&["--dimension", "8", "--frames", "0"])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn extent_sweep_with_fixed_bailout() {
    let output = multibrot()
        .args(&[
            "--dimension",
            "8",
            "--frames",
            "2",
            "--iterations",
            "10",
            "--sweep",
            "extent",
            "--powerStart",
            "1.5",
            "--powerEnd",
            "2.5",
            "--bailout",
            "2",
            "--endpoints",
            "exclusive",
            "--loops",
            "0",
        ])
        .output()
        .unwrap();
    assert!(output.status.success());
    assert!(output.stdout.starts_with(b"GIF89a"));
}

#[test]
fn bad_numbers_are_rejected_by_the_parser() {
    multibrot()
        .args(&["--dimension", "0"])
        .assert()
        .failure();
}
