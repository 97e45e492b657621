use std::env;
use std::path::{Path, PathBuf};

pub const DEFAULT_SYSTEM_ROOT: &str = "/userdata/system";

/// Pre-built emulator archives, both plain zip files. Fixed: the add-on
/// tracks specific builds known to work under the bundled Wine runner.
pub const CXBXR_ARCHIVE_URL: &str =
    "https://github.com/Cxbx-Reloaded/Cxbx-Reloaded/releases/download/CI-4b6a79c/CxbxReloaded-Release-VS2022.zip";
pub const XEMU_ARCHIVE_URL: &str =
    "https://github.com/xemu-project/xemu/releases/download/v0.7.131/xemu-win-release.zip";

pub const CXBXR_ARCHIVE_NAME: &str = "CxbxReloaded-Release-VS2022.zip";
pub const XEMU_ARCHIVE_NAME: &str = "xemu-win-release.zip";

/// File the front-end invokes to start a game.
pub const LAUNCHER_ENTRY_POINT: &str = "xboxlauncher.py";

pub const EMULATOR_KEY: &str = "xbox.emulator";
pub const CORE_KEY: &str = "xbox.core";
pub const CXBXR_KEY_PREFIX: &str = "xbox.cxbxr_";

/// Emulator batocera falls back to once the add-on is gone.
pub const STOCK_EMULATOR: &str = "xemu";

/// Every path the installer touches, derived from a single system root so
/// tests can point the whole tree somewhere disposable.
#[derive(Debug, Clone)]
pub struct Layout {
    pub system_root: PathBuf,
}

impl Layout {
    pub fn from_env() -> Self {
        let system_root = env::var("XBOX_EXTRA_SYSTEM_ROOT")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_SYSTEM_ROOT));
        tracing::debug!("System root: {}", system_root.display());
        Self { system_root }
    }

    pub fn xbox_extra_dir(&self) -> PathBuf {
        self.system_root.join("xbox-extra")
    }

    pub fn configgen_dir(&self) -> PathBuf {
        self.xbox_extra_dir().join("configgen")
    }

    pub fn launcher_entry_point(&self) -> PathBuf {
        self.configgen_dir().join(LAUNCHER_ENTRY_POINT)
    }

    pub fn cxbxr_app_dir(&self) -> PathBuf {
        self.xbox_extra_dir().join("cxbx-r").join("app")
    }

    pub fn xemu_app_dir(&self) -> PathBuf {
        self.xbox_extra_dir().join("xemu-wine").join("app")
    }

    pub fn es_config_path(&self) -> PathBuf {
        self.system_root
            .join("configs")
            .join("emulationstation")
            .join("es_systems_xbox.cfg")
    }

    pub fn batocera_conf_path(&self) -> PathBuf {
        self.system_root.join("batocera.conf")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.system_root.join("xbox-extra.lock")
    }

    /// Directories the install run must provision up front.
    pub fn provisioned_dirs(&self) -> Vec<PathBuf> {
        vec![
            self.xbox_extra_dir(),
            self.configgen_dir(),
            self.cxbxr_app_dir(),
            self.xemu_app_dir(),
            self.es_config_path()
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.system_root.clone()),
        ]
    }
}

/// Source tree holding the launcher payload (the configgen scripts shipped
/// alongside the binary), overridable for tests and custom packaging.
pub fn payload_dir() -> PathBuf {
    if let Ok(dir) = env::var("XBOX_EXTRA_PAYLOAD_DIR") {
        return PathBuf::from(dir);
    }
    env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|p| p.join("configgen")))
        .unwrap_or_else(|| PathBuf::from("configgen"))
}
