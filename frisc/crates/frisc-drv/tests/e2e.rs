//! Black-box tests of the `friscc` binary: a parse-tree dump on stdin,
//! assembly or a semantic diagnostic on stdout.

mod common;

use assert_cmd::Command;
use predicates::prelude::*;

fn friscc() -> Command {
    Command::cargo_bin("friscc").unwrap()
}

#[test]
fn compiles_a_trivial_program_to_stdout() {
    friscc()
        .write_stdin(common::trivial_main())
        .assert()
        .success()
        .stdout(predicate::str::starts_with("\tMOVE 40000, R7"))
        .stdout(predicate::str::contains("F_main"));
}

#[test]
fn missing_main_prints_the_marker_and_fails() {
    friscc()
        .write_stdin(common::missing_main())
        .assert()
        .code(1)
        .stdout("main\n");
}

#[test]
fn semantic_violation_prints_the_production_and_fails() {
    friscc()
        .write_stdin(common::const_reassignment())
        .assert()
        .code(1)
        .stdout(predicate::str::starts_with("<izraz_pridruzivanja> ::="));
}

#[test]
fn garbage_input_is_an_error_not_a_diagnostic() {
    friscc().write_stdin("not a tree").assert().failure().stdout(predicate::str::is_empty());
}
