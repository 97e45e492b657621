use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

// Shared helpers for the binary-level tests. Each test gets its own
// disposable system root and payload tree, wired up via the XBOX_EXTRA_*
// environment overrides, so nothing touches the real /userdata.
#[allow(dead_code)]
pub struct TestContext {
    pub _temp_dir: TempDir,
    pub system_root: PathBuf,
    pub payload_dir: PathBuf,
    pub bin_path: PathBuf,
}

#[allow(dead_code)]
impl TestContext {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let system_root = temp_dir.path().join("system");
        let payload_dir = temp_dir.path().join("configgen");

        fs::create_dir_all(&system_root).expect("Failed to create system root");
        fs::create_dir_all(payload_dir.join("generators/cxbxr"))
            .expect("Failed to create payload dirs");
        fs::write(
            payload_dir.join("xboxlauncher.py"),
            "#!/usr/bin/env python3\n",
        )
        .expect("Failed to write payload launcher");
        fs::write(
            payload_dir.join("generators/cxbxr/cxbxrGenerator.py"),
            "# generator\n",
        )
        .expect("Failed to write payload generator");

        let bin_path = PathBuf::from(env!("CARGO_BIN_EXE_xbox-extra"));

        Self {
            _temp_dir: temp_dir,
            system_root,
            payload_dir,
            bin_path,
        }
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::new(&self.bin_path);
        cmd.env("XBOX_EXTRA_SYSTEM_ROOT", &self.system_root);
        cmd.env("XBOX_EXTRA_PAYLOAD_DIR", &self.payload_dir);
        cmd
    }

    pub fn seed_installed_tree(&self) {
        let xbox_extra = self.system_root.join("xbox-extra");
        fs::create_dir_all(xbox_extra.join("cxbx-r/app")).unwrap();
        fs::create_dir_all(xbox_extra.join("xemu-wine/app")).unwrap();
        fs::create_dir_all(xbox_extra.join("configgen")).unwrap();
        fs::write(xbox_extra.join("cxbx-r/app/cxbx.exe"), "binary").unwrap();
        fs::write(xbox_extra.join("configgen/xboxlauncher.py"), "launcher").unwrap();

        let es_dir = self.system_root.join("configs/emulationstation");
        fs::create_dir_all(&es_dir).unwrap();
        fs::write(es_dir.join("es_systems_xbox.cfg"), "<systemList/>").unwrap();
    }
}

#[allow(dead_code)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        Self {
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
            status: output.status,
        }
    }
}

#[allow(dead_code)]
impl CommandOutput {
    pub fn assert_success(&self) -> &Self {
        if !self.status.success() {
            panic!(
                "Command failed with status {:?}\nstdout: {}\nstderr: {}",
                self.status.code(),
                self.stdout,
                self.stderr
            );
        }
        self
    }

    pub fn assert_failure(&self) -> &Self {
        if self.status.success() {
            panic!(
                "Command unexpectedly succeeded\nstdout: {}\nstderr: {}",
                self.stdout, self.stderr
            );
        }
        self
    }

    pub fn assert_stdout_contains(&self, text: &str) -> &Self {
        assert!(
            self.stdout.contains(text),
            "Stdout did not contain '{}'\nActual stdout: {}",
            text,
            self.stdout
        );
        self
    }

    pub fn assert_stderr_contains(&self, text: &str) -> &Self {
        assert!(
            self.stderr.contains(text),
            "Stderr did not contain '{}'\nActual stderr: {}",
            text,
            self.stderr
        );
        self
    }
}
