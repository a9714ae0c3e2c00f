//! End-to-end tests against the `cross` binary

use std::fs;
use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, Output, Stdio};

use tempfile::TempDir;

const CLEAR: &str = "\x1b[2J";

/// Isolated home + config for one run
struct Sandbox {
    dir: TempDir,
}

impl Sandbox {
    fn new(config: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let base = "[log]\nlevel = \"off\"\n";
        fs::write(dir.path().join("config.toml"), format!("{}{}", base, config)).unwrap();
        Self { dir }
    }

    fn path(&self) -> &Path {
        self.dir.path()
    }

    fn command(&self, args: &[&str]) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_cross"));
        cmd.args(args)
            .current_dir(self.path())
            .env("HOME", self.path())
            .env("USERPROFILE", self.path())
            .env("CROSS_CONFIG", self.path().join("config.toml"))
            .env_remove("CROSS_LOG")
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        cmd
    }

    fn run(&self, args: &[&str], input: &str) -> Output {
        let mut child = self.command(args).spawn().unwrap();
        // The child may exit without reading
        let _ = child.stdin.take().unwrap().write_all(input.as_bytes());
        child.wait_with_output().unwrap()
    }
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

/// Read child stdout until `needle` shows up
fn read_until(child: &mut Child, needle: &str) -> String {
    let out = child.stdout.as_mut().unwrap();
    let mut seen = Vec::new();
    let mut buf = [0u8; 256];
    while !String::from_utf8_lossy(&seen).contains(needle) {
        let n = out.read(&mut buf).unwrap();
        assert!(n > 0, "stdout closed before {:?}", needle);
        seen.extend_from_slice(&buf[..n]);
    }
    String::from_utf8_lossy(&seen).into_owned()
}

#[test]
fn test_version_flag() {
    let sandbox = Sandbox::new("");
    let output = sandbox.run(&["--version"], "");
    assert!(output.status.success());
    assert!(stderr(&output).starts_with(&format!("cross {}", env!("CARGO_PKG_VERSION"))));
    assert!(stdout(&output).is_empty());
}

#[test]
fn test_help_flag() {
    let sandbox = Sandbox::new("");
    let output = sandbox.run(&["foo.src", "-h"], "");
    assert!(output.status.success());
    assert!(stderr(&output).contains("[<modules..>] [<-flags..>]"));
    assert!(!stderr(&output).contains("Module Not Found"));
}

#[test]
fn test_repl_echoes_piped_input() {
    let sandbox = Sandbox::new("");
    let output = sandbox.run(&[], "hello\n\n   \nworld \n");
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("Cross Interactive Command-Line Compiler Shell"));
    assert!(out.contains("Press CTRL+C to exit"));
    assert!(out.contains(">> => hello\n"));
    assert!(out.contains(">> => world \n"));
    assert_eq!(out.matches("=> ").count(), 2);
    // Not a terminal: no escape sequences at all
    assert!(!out.contains('\x1b'));
    assert!(stderr(&output).is_empty());
}

#[test]
fn test_end_of_input_detaches_once() {
    let sandbox = Sandbox::new("[shell]\nclear_screen = \"always\"\n");
    let output = sandbox.run(&[], "x\n");
    assert!(output.status.success());
    assert_eq!(stdout(&output).matches(CLEAR).count(), 3);
}

#[test]
fn test_batch_missing_module() {
    let sandbox = Sandbox::new("");
    let output = sandbox.run(&["foo.src"], "");
    assert!(output.status.success());

    let err = stderr(&output);
    assert!(err.starts_with("!> foo.src(1,1) IO Error [Module Not Found]\n"));
    assert!(err.contains("The module foo.src cannot be found.\n"));
    assert!(err.contains("   1| foo.src\n      ^\n"));
    assert!(!stdout(&output).contains("Press ENTER"));
}

#[test]
fn test_fatal_exit_code_is_configurable() {
    let sandbox = Sandbox::new("[diagnostics]\nfatal_exit_code = 3\n");
    let output = sandbox.run(&["foo.src"], "");
    assert_eq!(output.status.code(), Some(3));
    assert!(stderr(&output).contains("Module Not Found"));
}

#[test]
fn test_placeholder_module() {
    let sandbox = Sandbox::new("[loader]\nplaceholder_module = \"test.cross\"\n");
    let output = sandbox.run(&["foo.src"], "");
    let err = stderr(&output);
    assert!(err.contains("The module test.cross cannot be found."));
    assert!(!err.contains("foo.src"));
}

#[test]
fn test_batch_existing_module_pauses() {
    let sandbox = Sandbox::new("[shell]\nclear_screen = \"always\"\n");
    fs::write(sandbox.path().join("main.cross"), "print 1\n").unwrap();
    let output = sandbox.run(&["main.cross", "-O"], "\n");
    assert!(output.status.success());

    let out = stdout(&output);
    assert!(out.contains("Press ENTER to continue..."));
    assert_eq!(out.matches(CLEAR).count(), 3);
    assert!(stderr(&output).is_empty());
}

#[test]
fn test_flags_without_module() {
    let sandbox = Sandbox::new("");
    let output = sandbox.run(&["-O"], "");
    assert!(stderr(&output).contains("System Error [No Module Given]"));
}

#[test]
fn test_bad_config_falls_back_to_defaults() {
    let sandbox = Sandbox::new("[shell\n");
    let output = sandbox.run(&[], "hi\n");
    assert!(output.status.success());
    assert!(stderr(&output).contains("using default configuration"));
    assert!(stdout(&output).contains("=> hi\n"));
}

#[test]
#[cfg(unix)]
fn test_interrupt_exits_cleanly() {
    let sandbox = Sandbox::new("[shell]\nclear_screen = \"always\"\n");
    let mut child = sandbox.command(&[]).spawn().unwrap();
    // Keep stdin open so the REPL blocks on input
    let stdin = child.stdin.take().unwrap();

    let before = read_until(&mut child, ">> ");
    let status = Command::new("kill")
        .args(["-INT", &child.id().to_string()])
        .status()
        .unwrap();
    assert!(status.success());

    let mut rest = String::new();
    child
        .stdout
        .as_mut()
        .unwrap()
        .read_to_string(&mut rest)
        .unwrap();
    let exit = child.wait().unwrap();
    drop(stdin);

    assert!(exit.success());
    let all = format!("{}{}", before, rest);
    assert_eq!(all.matches(CLEAR).count(), 3);
}
