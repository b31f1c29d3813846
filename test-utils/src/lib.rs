use std::{
    error::Error,
    io,
    path::Path,
    process::{Command, Output},
    str,
};

const SCRIPTLANG_PATH: &str = "./target/debug/scriptlang";

pub struct Expected<'a> {
    pub stdout: &'a str,
    pub stderr: &'a str,
    pub code: i32,
}

impl<'a> Expected<'a> {
    fn assert_matches(self, output: &Output) -> Result<(), Box<dyn Error>> {
        assert_eq!(str::from_utf8(&output.stdout)?, self.stdout);
        assert_eq!(str::from_utf8(&output.stderr)?, self.stderr);
        assert_eq!(output.status.code(), Some(self.code));
        Ok(())
    }
}

fn run_script(src_path: &Path) -> Result<Output, io::Error> {
    Command::new(SCRIPTLANG_PATH).arg(src_path).output()
}

/// Run the scriptlang binary against a source file and assert stdout,
/// stderr and the process exit code all match.
pub fn check_run(src_path: &Path, expected: Expected) -> Result<(), Box<dyn Error>> {
    let output = run_script(src_path)?;
    expected.assert_matches(&output)?;
    Ok(())
}
