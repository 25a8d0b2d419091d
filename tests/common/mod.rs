//! Shared helpers for the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::fs;
use std::path::PathBuf;
use std::rc::Rc;

use verity::channel::{BufferSink, SharedSink};
use verity::config::RunConfig;
use verity::session::Session;
use verity::Result;

/// A session whose messages land in a buffer the test can inspect.
pub fn buffered_session(config: RunConfig) -> (Session, Rc<RefCell<BufferSink>>) {
    let buffer = BufferSink::shared();
    let session = Session::new(config, SharedSink::from_rc(buffer.clone()));
    (session, buffer)
}

/// Declares a full `assert()` with `output()` and `expect()` blocks.
pub fn assert_rendered(session: &mut Session, description: &str, output: &str, expected: &str) -> Result<()> {
    session.assert_output(Some(description), |s| {
        s.output(|s| {
            s.emit(output);
            Ok(())
        })?;
        s.expect(|s| {
            s.emit(expected);
            Ok(())
        })
    })?;
    Ok(())
}

/// Writes `contents` to a uniquely named file under the system temp dir.
pub fn write_temp(name: &str, contents: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("verity-tests-{}", std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}
