// Drives the compiled binary through a PTY, exercising the real event loop
// and crossterm input handling.
//
// Requires a TTY, so it is Unix-only and ignored by default.
// Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_starts_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("keystride");
    let dir = tempfile::tempdir()?;
    let cmd = format!(
        "{} -p hi -s 15 --config {}",
        bin.display(),
        dir.path().join("config.json").display()
    );

    let mut p = spawn(cmd)?;

    // Let the app set up the alternate screen
    std::thread::sleep(Duration::from_millis(200));

    p.send("hi")?;
    std::thread::sleep(Duration::from_millis(200));

    p.send("\x1b")?; // ESC
    p.expect(Eof)?;
    Ok(())
}
