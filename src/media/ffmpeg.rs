use anyhow::{Context, Result};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::process::Command;

#[cfg(windows)]
const EXE_SUFFIX: &str = ".exe";
#[cfg(not(windows))]
const EXE_SUFFIX: &str = "";

/// Locate an ffmpeg-suite binary (`ffmpeg`, `ffprobe`).
///
/// Looks next to the executable first (bundled builds), then on PATH.
pub fn find_tool(name: &str) -> Result<String> {
    let file_name = format!("{}{}", name, EXE_SUFFIX);

    let exe_dir = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()));

    if let Some(ref dir) = exe_dir {
        let candidates: [PathBuf; 2] = [dir.join("ffmpeg").join(&file_name), dir.join(&file_name)];
        for candidate in &candidates {
            if candidate.exists() {
                return Ok(candidate.to_string_lossy().to_string());
            }
        }
    }

    if Command::new(name).arg("-version").output().is_ok() {
        return Ok(name.to_string());
    }

    Err(anyhow::anyhow!(
        "{} not found. Please install FFmpeg or place it in the ffmpeg/ directory.",
        name
    ))
}

/// Width and height of the first video stream.
pub fn probe_dimensions(path: &Path) -> Result<(u32, u32)> {
    let ffprobe = find_tool("ffprobe")?;
    let output = Command::new(&ffprobe)
        .args(["-v", "error"])
        .args(["-select_streams", "v:0"])
        .args(["-show_entries", "stream=width,height"])
        .args(["-of", "csv=s=x:p=0"])
        .arg(path)
        .output()
        .context("running ffprobe")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow::anyhow!("ffprobe failed: {}", stderr.trim()));
    }

    parse_dimensions(&String::from_utf8_lossy(&output.stdout))
}

fn parse_dimensions(text: &str) -> Result<(u32, u32)> {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or_else(|| anyhow::anyhow!("ffprobe reported no video stream"))?;
    let (w, h) = line
        .split_once('x')
        .ok_or_else(|| anyhow::anyhow!("unexpected ffprobe output: {}", line))?;
    let w: u32 = w.trim().parse().context("parsing width")?;
    let h: u32 = h.trim().parse().context("parsing height")?;
    if w == 0 || h == 0 {
        return Err(anyhow::anyhow!("video reports zero size ({}x{})", w, h));
    }
    Ok((w, h))
}

/// Decode the first frame of a clip as RGBA.
pub fn extract_poster_frame(path: &Path) -> Result<RgbaImage> {
    let ffmpeg = find_tool("ffmpeg")?;
    let output = Command::new(&ffmpeg)
        .args(["-v", "error", "-i"])
        .arg(path)
        .args(["-frames:v", "1"])
        .args(["-f", "image2pipe", "-vcodec", "png", "-"])
        .output()
        .context("running ffmpeg")?;

    if !output.status.success() || output.stdout.is_empty() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(anyhow::anyhow!("ffmpeg frame extraction failed: {}", stderr.trim()));
    }

    let img = image::load_from_memory_with_format(&output.stdout, image::ImageFormat::Png)
        .context("decoding poster frame")?;
    Ok(img.to_rgba8())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_dimensions() {
        assert_eq!(parse_dimensions("1920x1080\n").unwrap(), (1920, 1080));
        assert_eq!(parse_dimensions("\n 640x360 \n").unwrap(), (640, 360));
    }

    #[test]
    fn test_parse_dimensions_rejects_garbage() {
        assert!(parse_dimensions("").is_err());
        assert!(parse_dimensions("N/A").is_err());
        assert!(parse_dimensions("0x0").is_err());
    }
}
