use crate::confstore::ConfStore;
use crate::fetch;
use crate::fsops;
use crate::layout::{
    self, Layout, CORE_KEY, CXBXR_ARCHIVE_NAME, CXBXR_ARCHIVE_URL, CXBXR_KEY_PREFIX, EMULATOR_KEY,
    STOCK_EMULATOR, XEMU_ARCHIVE_NAME, XEMU_ARCHIVE_URL,
};
use crate::runner::{self, Step};
use anyhow::{anyhow, Context, Result};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// System definition EmulationStation reads to learn how to launch xbox
/// roms. Both emulators route through the same launcher entry point.
const ES_SYSTEMS_XBOX: &str = r#"<?xml version="1.0"?>
<systemList>
  <system>
    <name>xbox</name>
    <fullname>Microsoft Xbox</fullname>
    <path>/userdata/roms/xbox</path>
    <extension>.iso .ISO .xbe .XBE</extension>
    <command>python3 {launcher} -system xbox -rom %ROM% -emulator %EMULATOR% -core %CORE%</command>
    <platform>xbox</platform>
    <theme>xbox</theme>
    <emulators>
      <emulator name="cxbxr">
        <cores>
          <core default="true">cxbxr</core>
        </cores>
      </emulator>
      <emulator name="xemu-wine">
        <cores>
          <core>xemu-wine</core>
        </cores>
      </emulator>
    </emulators>
  </system>
</systemList>
"#;

/// Guard against two installer runs mutating the same tree. Created with
/// `create_new` so the second run fails instead of interleaving; removed
/// when the run ends, normally or not.
struct InstallLock {
    path: PathBuf,
}

impl InstallLock {
    fn acquire(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        match fs::OpenOptions::new().write(true).create_new(true).open(path) {
            Ok(_) => Ok(Self {
                path: path.to_path_buf(),
            }),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Err(anyhow!(
                "another xbox-extra run appears to be in progress (lock file {} exists); \
                 remove it if that run crashed",
                path.display()
            )),
            Err(e) => {
                Err(e).with_context(|| format!("could not create lock file {}", path.display()))
            }
        }
    }
}

impl Drop for InstallLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn write_es_config(layout: &Layout) -> Result<()> {
    let content = ES_SYSTEMS_XBOX.replace(
        "{launcher}",
        &layout.launcher_entry_point().to_string_lossy(),
    );
    let path = layout.es_config_path();
    fs::write(&path, content).with_context(|| format!("could not write {}", path.display()))?;
    tracing::info!("Registered xbox system at {}", path.display());
    Ok(())
}

/// Fail-fast install pipeline. Any failing step aborts the run; a
/// half-populated tree is left as-is and a re-run overwrites it.
pub async fn install(layout: &Layout) -> Result<()> {
    let _lock = InstallLock::acquire(&layout.lock_path())?;

    let payload = layout::payload_dir();
    if !payload.is_dir() {
        return Err(anyhow!(
            "launcher payload not found at {} (set XBOX_EXTRA_PAYLOAD_DIR to its location)",
            payload.display()
        ));
    }

    // Downloads land in a temp dir that is removed on any exit path; the
    // explicit cleanup step just reports them gone early.
    let downloads = TempDir::new()?;
    let cxbxr_zip = downloads.path().join(CXBXR_ARCHIVE_NAME);
    let xemu_zip = downloads.path().join(XEMU_ARCHIVE_NAME);

    let steps = vec![
        Step::new("provision directory tree", async {
            fsops::provision_dirs(&layout.provisioned_dirs())
        }),
        Step::new("download Cxbx-Reloaded", async {
            fetch::download_file(CXBXR_ARCHIVE_URL, &cxbxr_zip).await
        }),
        Step::new("download xemu", async {
            fetch::download_file(XEMU_ARCHIVE_URL, &xemu_zip).await
        }),
        Step::new("extract Cxbx-Reloaded", async {
            fetch::extract_zip(&cxbxr_zip, &layout.cxbxr_app_dir())
        }),
        Step::new("extract xemu", async {
            fetch::extract_zip(&xemu_zip, &layout.xemu_app_dir())
        }),
        Step::new("install launcher files", async {
            fsops::copy_tree(&payload, &layout.configgen_dir())?;
            fsops::set_executable(&layout.launcher_entry_point())
        }),
        Step::new("register EmulationStation system", async {
            write_es_config(layout)
        }),
        Step::new("clean up downloaded archives", async {
            fsops::remove_files(&[&cxbxr_zip, &xemu_zip])
        }),
    ];

    runner::run(steps).await?;
    runner::banner("Xbox emulation add-on installed");
    eprintln!("Restart EmulationStation to pick up the new system.");
    Ok(())
}

/// Best-effort removal: artifacts that are already gone are warnings, not
/// errors, and the run continues to the end.
pub fn uninstall(layout: &Layout) -> Result<()> {
    let _lock = InstallLock::acquire(&layout.lock_path())?;

    if fsops::remove_tree_if_exists(&layout.xbox_extra_dir())? {
        tracing::info!("Removed {}", layout.xbox_extra_dir().display());
    } else {
        tracing::warn!(
            "{} not found, nothing to remove",
            layout.xbox_extra_dir().display()
        );
    }

    if fsops::remove_file_if_exists(&layout.es_config_path())? {
        tracing::info!("Removed {}", layout.es_config_path().display());
    } else {
        tracing::warn!(
            "{} not found, nothing to remove",
            layout.es_config_path().display()
        );
    }

    patch_batocera_conf(layout)?;

    runner::banner("Xbox emulation add-on removed");
    Ok(())
}

/// Point the xbox system back at the stock emulator and drop the cxbxr key
/// family. A missing batocera.conf or missing keys are warnings only.
fn patch_batocera_conf(layout: &Layout) -> Result<()> {
    let conf_path = layout.batocera_conf_path();
    let Some(mut store) = ConfStore::load(&conf_path)? else {
        tracing::warn!(
            "{} not found, skipping configuration patch",
            conf_path.display()
        );
        return Ok(());
    };

    for key in [EMULATOR_KEY, CORE_KEY] {
        if store.set(key, STOCK_EMULATOR) {
            tracing::info!("Reset {} to {}", key, STOCK_EMULATOR);
        } else {
            tracing::warn!("Key {} not present in {}", key, conf_path.display());
        }
    }

    let dropped = store.delete_prefix(CXBXR_KEY_PREFIX);
    tracing::info!("Dropped {} {}* line(s)", dropped, CXBXR_KEY_PREFIX);

    store.save()?;
    Ok(())
}

pub fn status(layout: &Layout) {
    println!("--- xbox-extra status ---");
    let artifacts = [
        ("Cxbx-Reloaded app", layout.cxbxr_app_dir()),
        ("xemu app", layout.xemu_app_dir()),
        ("launcher entry point", layout.launcher_entry_point()),
        ("ES system config", layout.es_config_path()),
    ];
    for (name, path) in artifacts {
        let state = if path.exists() { "present" } else { "absent" };
        println!("  {:<22} {:<8} {}", name, state, path.display());
    }
    println!("-------------------------");
}
