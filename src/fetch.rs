use anyhow::{anyhow, Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs;
use std::io::{self, Write};
use std::path::Path;

/// Download a remote archive to `local_path`, overwriting any existing file.
/// Fatal on transport errors and on non-2xx responses; no retry, no resume.
pub async fn download_file(url: &str, local_path: &Path) -> Result<()> {
    let filename = local_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| url.to_string());
    tracing::info!("Downloading {}...", filename);

    let response = reqwest::get(url)
        .await
        .with_context(|| format!("request to {} failed", url))?;

    if !response.status().is_success() {
        return Err(anyhow!(
            "download of {} failed with HTTP status {}",
            url,
            response.status()
        ));
    }

    let total_size = response.content_length().unwrap_or(0);

    let pb = ProgressBar::new(total_size);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} {spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})")
            .expect("valid progress template")
            .progress_chars("#>-")
    );
    pb.set_message(format!("Downloading {}", filename));

    let mut file = fs::File::create(local_path)
        .with_context(|| format!("could not create {}", local_path.display()))?;
    let mut downloaded = 0u64;
    let mut stream = response.bytes_stream();

    use futures_util::StreamExt;
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        file.write_all(&chunk)?;
        downloaded += chunk.len() as u64;
        pb.set_position(downloaded);
    }

    pb.finish_with_message(format!("Downloaded {}", filename));
    Ok(())
}

/// Unpack a zip archive into `extract_dir`, creating it if absent. Entries
/// already present at the destination are overwritten, so a reinstall over
/// an existing app directory yields the union with collisions won by the
/// archive. Corrupt input is fatal.
pub fn extract_zip(archive_path: &Path, extract_dir: &Path) -> Result<()> {
    tracing::info!(
        "Extracting {} to {}...",
        archive_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default(),
        extract_dir.display()
    );

    fs::create_dir_all(extract_dir)?;

    let file = fs::File::open(archive_path)
        .with_context(|| format!("could not open {}", archive_path.display()))?;
    let mut archive = zip::ZipArchive::new(file)
        .with_context(|| format!("{} is not a valid zip archive", archive_path.display()))?;

    for i in 0..archive.len() {
        let mut file = archive.by_index(i)?;

        // enclosed_name rejects entries that would land outside extract_dir
        // (absolute paths, `..` components)
        let Some(relative) = file.enclosed_name().map(Path::to_path_buf) else {
            tracing::warn!("Skipping malicious path in zip: {}", file.name());
            continue;
        };
        let outpath = extract_dir.join(relative);

        if file.name().ends_with('/') {
            fs::create_dir_all(&outpath)?;
        } else {
            if let Some(parent) = outpath.parent() {
                fs::create_dir_all(parent)?;
            }
            let mut outfile = fs::File::create(&outpath)?;
            io::copy(&mut file, &mut outfile)?;
        }
    }

    Ok(())
}
