//! Black-box tests of the frisct binary: spawn it, feed stdin, assert on
//! stdout/stderr and the exit code.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn frisct() -> Command {
    Command::cargo_bin("frisct").unwrap()
}

const LEX_SPEC: &str = "{znamenka}0|1|2|3|4|5|6|7|8|9\n\
% S_pocetno\n\
BROJ\n\
<S_pocetno>{znamenka}{znamenka}*\n\
{\n\
BROJ\n\
}\n\
<S_pocetno>\\_\n\
{\n\
-\n\
}\n";

const TRIVIAL_MAIN: &str = "<prijevodna_jedinica>
  <vanjska_deklaracija>
    <definicija_funkcije>
      <ime_tipa>
        <specifikator_tipa>
          KR_INT 1 int
      IDN 1 main
      L_ZAGRADA 1 (
      KR_VOID 1 void
      D_ZAGRADA 1 )
      <slozena_naredba>
        L_VIT_ZAGRADA 1 {
        <lista_naredbi>
          <naredba>
            <naredba_skoka>
              KR_RETURN 2 return
              <izraz>
                <izraz_pridruzivanja>
                  <log_ili_izraz>
                    <log_i_izraz>
                      <bin_ili_izraz>
                        <bin_xili_izraz>
                          <bin_i_izraz>
                            <jednakosni_izraz>
                              <odnosni_izraz>
                                <aditivni_izraz>
                                  <multiplikativni_izraz>
                                    <cast_izraz>
                                      <unarni_izraz>
                                        <postfiks_izraz>
                                          <primarni_izraz>
                                            BROJ 2 0
              TOCKAZAREZ 2 ;
        D_VIT_ZAGRADA 3 }
";

const NO_MAIN: &str = "<prijevodna_jedinica>
  <vanjska_deklaracija>
    <definicija_funkcije>
      <ime_tipa>
        <specifikator_tipa>
          KR_INT 1 int
      IDN 1 f
      L_ZAGRADA 1 (
      KR_VOID 1 void
      D_ZAGRADA 1 )
      <slozena_naredba>
        L_VIT_ZAGRADA 1 {
        D_VIT_ZAGRADA 1 }
";

#[test]
fn lexgen_then_lex_tokenizes_source() {
    let dir = TempDir::new().unwrap();
    let table = dir.path().join("enfa.txt");

    frisct()
        .args(["lexgen", "--output"])
        .arg(&table)
        .write_stdin(LEX_SPEC)
        .assert()
        .success()
        .stderr(predicate::str::contains("wrote"));

    frisct()
        .args(["lex", "--table"])
        .arg(&table)
        .write_stdin("12 34")
        .assert()
        .success()
        .stdout("BROJ 1 12\nBROJ 1 34\n");
}

#[test]
fn lex_reports_unknown_bytes_on_stderr() {
    let dir = TempDir::new().unwrap();
    let table = dir.path().join("enfa.txt");
    frisct().args(["lexgen", "--output"]).arg(&table).write_stdin(LEX_SPEC).assert().success();

    frisct()
        .args(["lex", "--table"])
        .arg(&table)
        .write_stdin("1x2")
        .assert()
        .success()
        .stdout("BROJ 1 1\nBROJ 1 2\n")
        .stderr(predicate::str::contains("unrecognized byte 'x'"));
}

#[test]
fn lex_rejects_an_unknown_starting_state() {
    let dir = TempDir::new().unwrap();
    let table = dir.path().join("enfa.txt");
    frisct().args(["lexgen", "--output"]).arg(&table).write_stdin(LEX_SPEC).assert().success();

    frisct()
        .args(["lex", "--table"])
        .arg(&table)
        .args(["--starting-state", "S_nepostojece"])
        .write_stdin("1")
        .assert()
        .failure()
        .stderr(predicate::str::contains("S_nepostojece"));
}

#[test]
fn check_accepts_a_well_typed_program_silently() {
    frisct()
        .arg("check")
        .write_stdin(TRIVIAL_MAIN)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());
}

#[test]
fn check_prints_main_for_a_missing_main() {
    frisct().arg("check").write_stdin(NO_MAIN).assert().code(1).stdout("main\n");
}

#[test]
fn build_writes_assembly_to_stdout() {
    frisct()
        .arg("build")
        .write_stdin(TRIVIAL_MAIN)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("\tMOVE 40000, R7"))
        .stdout(predicate::str::contains("F_main"));
}

#[test]
fn build_writes_assembly_to_a_file() {
    let dir = TempDir::new().unwrap();
    let out = dir.path().join("a.frisc");

    frisct()
        .args(["build", "--output"])
        .arg(&out)
        .write_stdin(TRIVIAL_MAIN)
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let asm = std::fs::read_to_string(&out).unwrap();
    assert!(asm.contains("\tHALT\n"));
}

#[test]
fn version_flag_prints_and_exits() {
    frisct().arg("--version").assert().success();
}
