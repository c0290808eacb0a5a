//! FFmpeg video encoder and probe wrappers
//!
//! Frames are streamed to an `ffmpeg` child process as raw RGBA over stdin.
//! Pipe writes block while the encoder catches up.

use super::types::{EncodeError, VideoQuality};
use crate::utils::paths::ensure_parent_dir;
use image::RgbaImage;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, ChildStdin, Command, Stdio};

/// Locate an executable on PATH (or accept an explicit path)
pub fn locate(program: &str) -> Result<PathBuf, EncodeError> {
    which::which(program)
        .map_err(|e| EncodeError::Ffmpeg(format!("{} not found: {}", program, e)))
}

/// Video encoder using FFmpeg
pub struct VideoEncoder {
    process: Child,
    stdin: ChildStdin,
    width: u32,
    height: u32,
    frame_count: u64,
    skipped: u64,
}

impl VideoEncoder {
    /// Build the ffmpeg argument vector for an H.264 `.mov`
    fn args(output: &Path, width: u32, height: u32, fps: u32, quality: VideoQuality) -> Vec<String> {
        vec![
            "-hide_banner".to_string(),
            "-loglevel".to_string(),
            "error".to_string(),
            "-y".to_string(),
            "-f".to_string(),
            "rawvideo".to_string(),
            "-pix_fmt".to_string(),
            "rgba".to_string(),
            "-s".to_string(),
            format!("{}x{}", width, height),
            // Input rate: frame N gets pts N/fps
            "-r".to_string(),
            fps.to_string(),
            "-i".to_string(),
            "-".to_string(),
            // yuv420p needs even dimensions; odd sides gain one padded row or column
            "-vf".to_string(),
            "pad=ceil(iw/2)*2:ceil(ih/2)*2".to_string(),
            "-c:v".to_string(),
            "libx264".to_string(),
            "-preset".to_string(),
            quality.h264_preset().to_string(),
            "-crf".to_string(),
            quality.crf().to_string(),
            "-pix_fmt".to_string(),
            "yuv420p".to_string(),
            "-movflags".to_string(),
            "+faststart".to_string(),
            output.to_string_lossy().to_string(),
        ]
    }

    /// Start an encoder sized to the first frame
    pub fn start(
        ffmpeg: &str,
        output: &Path,
        width: u32,
        height: u32,
        fps: u32,
        quality: VideoQuality,
    ) -> Result<Self, EncodeError> {
        if width == 0 || height == 0 || fps == 0 {
            return Err(EncodeError::Encoding(format!(
                "Invalid video geometry {}x{} @ {}fps",
                width, height, fps
            )));
        }

        let args = Self::args(output, width, height, fps, quality);
        tracing::info!("Starting FFmpeg encoder: {} {:?}", ffmpeg, args);

        let mut process = Command::new(ffmpeg)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| EncodeError::Ffmpeg(format!("Failed to start FFmpeg encoder: {}", e)))?;

        let stdin = process
            .stdin
            .take()
            .ok_or_else(|| EncodeError::Ffmpeg("Failed to capture FFmpeg stdin".to_string()))?;

        Ok(Self {
            process,
            stdin,
            width,
            height,
            frame_count: 0,
            skipped: 0,
        })
    }

    /// Append a frame. Frames that do not match the container size are
    /// skipped with a warning instead of failing the whole encode.
    pub fn write_frame(&mut self, frame: &RgbaImage) -> Result<(), EncodeError> {
        if frame.dimensions() != (self.width, self.height) {
            tracing::warn!(
                "Skipping frame of {}x{}, container is {}x{}",
                frame.width(),
                frame.height(),
                self.width,
                self.height
            );
            self.skipped += 1;
            return Ok(());
        }

        self.stdin
            .write_all(frame.as_raw())
            .map_err(|e| EncodeError::Encoding(format!("Failed to write frame: {}", e)))?;
        self.frame_count += 1;
        Ok(())
    }

    /// Get number of frames written
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Get number of frames skipped
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    /// Close the stream and wait for FFmpeg to finalize the container
    pub fn finish(self) -> Result<u64, EncodeError> {
        // EOF on stdin ends the stream
        drop(self.stdin);

        let output = self
            .process
            .wait_with_output()
            .map_err(|e| EncodeError::Ffmpeg(format!("Failed to wait for FFmpeg: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(EncodeError::Ffmpeg(format!(
                "FFmpeg exited with error: {}",
                stderr.trim()
            )));
        }

        if self.frame_count == 0 {
            return Err(EncodeError::NoFrames);
        }

        tracing::info!(
            "FFmpeg encoder finished: {} frames written, {} skipped",
            self.frame_count,
            self.skipped
        );
        Ok(self.frame_count)
    }
}

/// Encode frames into a video container at `output`.
///
/// Blocking; run it on the blocking pool. A failed encode removes whatever
/// partial file FFmpeg left behind.
pub fn encode_video(
    ffmpeg: &str,
    frames: Vec<RgbaImage>,
    fps: u32,
    quality: VideoQuality,
    output: &Path,
) -> Result<u64, EncodeError> {
    let (width, height) = frames
        .first()
        .map(|frame| frame.dimensions())
        .ok_or(EncodeError::NoFrames)?;

    ensure_parent_dir(output)?;

    let result = feed(ffmpeg, frames, width, height, fps, quality, output);
    if result.is_err() && output.exists() {
        if let Err(e) = std::fs::remove_file(output) {
            tracing::warn!("Failed to remove partial output {:?}: {}", output, e);
        }
    }
    result
}

fn feed(
    ffmpeg: &str,
    frames: Vec<RgbaImage>,
    width: u32,
    height: u32,
    fps: u32,
    quality: VideoQuality,
    output: &Path,
) -> Result<u64, EncodeError> {
    let mut encoder = VideoEncoder::start(ffmpeg, output, width, height, fps, quality)?;
    for frame in &frames {
        if let Err(e) = encoder.write_frame(frame) {
            // Surface FFmpeg's own diagnostics rather than the broken pipe
            return match encoder.finish() {
                Err(EncodeError::Ffmpeg(message)) => Err(EncodeError::Ffmpeg(message)),
                _ => Err(e),
            };
        }
    }
    encoder.finish()
}

/// Basic stream metadata
#[derive(Debug, Clone, PartialEq)]
pub struct VideoProbe {
    pub width: u32,
    pub height: u32,
    pub frame_count: u64,
    pub fps: f64,
}

/// Probe a video file for dimensions, frame count and rate
pub fn probe_video(ffprobe: &str, video_path: &Path) -> Result<VideoProbe, EncodeError> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-count_packets",
            "-show_entries",
            "stream=width,height,r_frame_rate,nb_read_packets",
            "-of",
            "csv=p=0",
        ])
        .arg(video_path)
        .output()
        .map_err(|e| EncodeError::Ffmpeg(format!("Failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EncodeError::Ffmpeg(format!("ffprobe failed: {}", stderr)));
    }

    parse_stream_line(&String::from_utf8_lossy(&output.stdout))
}

/// Parse `width,height,r_frame_rate,nb_read_packets`
fn parse_stream_line(stdout: &str) -> Result<VideoProbe, EncodeError> {
    let parts: Vec<&str> = stdout.trim().split(',').collect();
    if parts.len() < 4 {
        return Err(EncodeError::Ffmpeg(format!(
            "Unexpected ffprobe output: {}",
            stdout
        )));
    }

    let width: u32 = parts[0]
        .parse()
        .map_err(|_| EncodeError::Ffmpeg("Invalid width".to_string()))?;
    let height: u32 = parts[1]
        .parse()
        .map_err(|_| EncodeError::Ffmpeg("Invalid height".to_string()))?;

    // Frame rate comes as "10/1" or "30000/1001"
    let fps = match parts[2].split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.parse().unwrap_or(0.0);
            let den: f64 = den.parse().unwrap_or(1.0);
            if den > 0.0 {
                num / den
            } else {
                0.0
            }
        }
        None => parts[2].parse().unwrap_or(0.0),
    };

    let frame_count: u64 = parts[3].parse().unwrap_or(0);

    Ok(VideoProbe {
        width,
        height,
        frame_count,
        fps,
    })
}

/// Presentation times of every video packet, in seconds, ascending
pub fn probe_frame_times(ffprobe: &str, video_path: &Path) -> Result<Vec<f64>, EncodeError> {
    let output = Command::new(ffprobe)
        .args([
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "packet=pts_time",
            "-of",
            "csv=p=0",
        ])
        .arg(video_path)
        .output()
        .map_err(|e| EncodeError::Ffmpeg(format!("Failed to run ffprobe: {}", e)))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(EncodeError::Ffmpeg(format!("ffprobe failed: {}", stderr)));
    }

    Ok(parse_times(&String::from_utf8_lossy(&output.stdout)))
}

/// Packets come in decode order; sort them into presentation order
fn parse_times(stdout: &str) -> Vec<f64> {
    let mut times: Vec<f64> = stdout
        .lines()
        .filter_map(|line| line.trim().trim_end_matches(',').parse().ok())
        .collect();
    times.sort_by(|a, b| a.total_cmp(b));
    times
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use tempfile::tempdir;

    fn ffmpeg_tools() -> bool {
        which::which("ffmpeg").is_ok() && which::which("ffprobe").is_ok()
    }

    #[test]
    fn test_args_describe_raw_rgba_input() {
        let args = VideoEncoder::args(Path::new("/tmp/out.mov"), 640, 480, 10, VideoQuality::High);
        let joined = args.join(" ");
        assert!(joined.contains("-f rawvideo -pix_fmt rgba -s 640x480 -r 10 -i -"));
        assert!(joined.contains("-crf 18"));
        assert!(joined.contains("-vf pad=ceil(iw/2)*2:ceil(ih/2)*2"));
        assert_eq!(args.last().map(String::as_str), Some("/tmp/out.mov"));
    }

    #[test]
    fn test_parse_stream_line() {
        let probe = parse_stream_line("14,10,10/1,3\n").unwrap();
        assert_eq!(
            probe,
            VideoProbe {
                width: 14,
                height: 10,
                frame_count: 3,
                fps: 10.0
            }
        );
        assert!(parse_stream_line("garbage").is_err());
    }

    #[test]
    fn test_parse_times_sorts_packets() {
        let times = parse_times("0.000000\n0.200000\n0.100000\nN/A\n");
        assert_eq!(times, vec![0.0, 0.1, 0.2]);
    }

    #[test]
    fn test_empty_sequence_is_rejected() {
        let dir = tempdir().unwrap();
        let result = encode_video("ffmpeg", Vec::new(), 10, VideoQuality::Low, &dir.path().join("a.mov"));
        assert!(matches!(result, Err(EncodeError::NoFrames)));
    }

    #[test]
    fn test_missing_encoder_fails_to_start() {
        let dir = tempdir().unwrap();
        let output = dir.path().join("a.mov");
        let frames = vec![RgbaImage::new(4, 4)];
        let result = encode_video("macosrec-no-such-ffmpeg", frames, 10, VideoQuality::Low, &output);
        assert!(matches!(result, Err(EncodeError::Ffmpeg(_))));
        assert!(!output.exists());
    }

    #[test]
    fn test_encode_round_trip_timestamps() {
        if !ffmpeg_tools() {
            eprintln!("ffmpeg/ffprobe not installed, skipping");
            return;
        }

        let dir = tempdir().unwrap();
        let output = dir.path().join("clip.mov");
        let frames: Vec<RgbaImage> = (0..3u8)
            .map(|i| RgbaImage::from_pixel(16, 12, Rgba([i * 80, 0, 0, 255])))
            .collect();

        let written = encode_video("ffmpeg", frames, 10, VideoQuality::Low, &output).unwrap();
        assert_eq!(written, 3);

        let probe = probe_video("ffprobe", &output).unwrap();
        assert_eq!((probe.width, probe.height), (16, 12));
        assert_eq!(probe.frame_count, 3);

        let times = probe_frame_times("ffprobe", &output).unwrap();
        let expected = [0.0, 0.1, 0.2];
        assert_eq!(times.len(), expected.len());
        for (actual, expected) in times.iter().zip(expected) {
            assert!((actual - expected).abs() < 1e-3, "{} != {}", actual, expected);
        }
    }

    #[test]
    fn test_mismatched_frames_are_skipped() {
        if !ffmpeg_tools() {
            eprintln!("ffmpeg/ffprobe not installed, skipping");
            return;
        }

        let dir = tempdir().unwrap();
        let output = dir.path().join("mixed.mov");
        let frames = vec![
            RgbaImage::new(16, 12),
            RgbaImage::new(8, 8),
            RgbaImage::new(16, 12),
        ];

        let written = encode_video("ffmpeg", frames, 10, VideoQuality::Low, &output).unwrap();
        assert_eq!(written, 2);
        assert_eq!(probe_video("ffprobe", &output).unwrap().frame_count, 2);
    }

    #[test]
    fn test_odd_sized_frames_are_padded() {
        if !ffmpeg_tools() {
            eprintln!("ffmpeg/ffprobe not installed, skipping");
            return;
        }

        let dir = tempdir().unwrap();
        for (width, height, expected) in [(1, 1, (2, 2)), (15, 9, (16, 10))] {
            let output = dir.path().join(format!("odd-{}x{}.mov", width, height));
            let frames = vec![RgbaImage::new(width, height), RgbaImage::new(width, height)];

            let written = encode_video("ffmpeg", frames, 10, VideoQuality::Low, &output).unwrap();
            assert_eq!(written, 2);

            let probe = probe_video("ffprobe", &output).unwrap();
            assert_eq!((probe.width, probe.height), expected);
            assert_eq!(probe.frame_count, 2);
        }
    }
}
