use std::{
    borrow::Cow,
    path::{Path, PathBuf},
    process::{Command, Stdio},
};

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "bootanim_cli_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

fn exe() -> PathBuf {
    std::env::var_os("CARGO_BIN_EXE_bootanim")
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            let mut p = PathBuf::from("target").join("debug");
            p.push(if cfg!(windows) {
                "bootanim.exe"
            } else {
                "bootanim"
            });
            p
        })
}

fn write_gif(path: &Path, frames: usize) {
    let palette = [0u8, 0, 0, 255, 255, 255];
    let mut out = Vec::new();
    {
        let mut enc = gif::Encoder::new(&mut out, 8, 8, &palette).unwrap();
        for i in 0..frames {
            let frame = gif::Frame {
                width: 8,
                height: 8,
                buffer: Cow::Owned(vec![(i % 2) as u8; 64]),
                ..gif::Frame::default()
            };
            enc.write_frame(&frame).unwrap();
        }
    }
    std::fs::write(path, out).unwrap();
}

#[test]
fn cli_gif_with_flags_writes_archive() {
    let dir = temp_dir("gif");
    std::fs::create_dir_all(&dir).unwrap();
    let gif_path = dir.join("anim.gif");
    write_gif(&gif_path, 3);
    let out = dir.join("bootanimation.zip");

    let output = Command::new(exe())
        .arg("gif")
        .arg(&gif_path)
        .arg(&out)
        .arg("--work-dir")
        .arg(dir.join("work"))
        .args(["--width", "480", "--height", "854", "--fps", "30"])
        .args(["--resize", "stretch"])
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("successfully produced"));
    assert_eq!(
        std::fs::read_to_string(dir.join("work").join("desc.txt")).unwrap(),
        "480 854 30\np 0 0 part0\n"
    );
    let entries = bootanim::inspect(&out).unwrap();
    assert_eq!(entries[0].name, "desc.txt");
    assert_eq!(entries.len(), 5);

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn cli_gif_reads_spec_file() {
    let dir = temp_dir("gif_spec");
    std::fs::create_dir_all(&dir).unwrap();
    let gif_path = dir.join("anim.gif");
    write_gif(&gif_path, 2);
    let spec_path = dir.join("spec.json");
    std::fs::write(&spec_path, r#"{"width": 720, "height": 1280, "fps": 24}"#).unwrap();

    let status = Command::new(exe())
        .arg("gif")
        .arg(&gif_path)
        .arg(dir.join("out.zip"))
        .arg("--work-dir")
        .arg(dir.join("work"))
        .arg("--spec")
        .arg(&spec_path)
        .args(["--resize", "fit"])
        .stdin(Stdio::null())
        .status()
        .unwrap();

    assert!(status.success());
    assert_eq!(
        std::fs::read_to_string(dir.join("work").join("desc.txt")).unwrap(),
        "720 1280 24\np 0 0 part0\n"
    );

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn cli_static_gif_exits_with_one() {
    let dir = temp_dir("static");
    std::fs::create_dir_all(&dir).unwrap();
    let gif_path = dir.join("still.gif");
    write_gif(&gif_path, 1);
    let out = dir.join("out.zip");

    let status = Command::new(exe())
        .arg("gif")
        .arg(&gif_path)
        .arg(&out)
        .arg("--work-dir")
        .arg(&dir)
        .stdin(Stdio::null())
        .status()
        .unwrap();

    assert_eq!(status.code(), Some(1));
    assert!(!out.exists());

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn cli_archive_requires_manifest() {
    let dir = temp_dir("archive_no_desc");
    std::fs::create_dir_all(dir.join("part0")).unwrap();

    let output = Command::new(exe())
        .arg("archive")
        .arg(dir.join("out.zip"))
        .arg("--work-dir")
        .arg(&dir)
        .stdin(Stdio::null())
        .output()
        .unwrap();

    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("desc.txt"));

    std::fs::remove_dir_all(&dir).ok();
}

#[test]
fn cli_archive_and_list() {
    let dir = temp_dir("archive_list");
    std::fs::create_dir_all(dir.join("part0")).unwrap();
    std::fs::write(dir.join("part0").join("00.png"), b"frame").unwrap();
    std::fs::write(dir.join("desc.txt"), "480 854 30\np 0 0 part0\n").unwrap();
    let out = dir.join("out.zip");

    let status = Command::new(exe())
        .arg("archive")
        .arg(&out)
        .arg("--work-dir")
        .arg(&dir)
        .stdin(Stdio::null())
        .status()
        .unwrap();
    assert!(status.success());

    let listed = Command::new(exe()).arg("list").arg(&out).output().unwrap();
    assert!(listed.status.success());
    let text = String::from_utf8_lossy(&listed.stdout);
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[0].ends_with("desc.txt"));
    assert!(lines.iter().all(|l| l.contains("stored")));

    std::fs::remove_dir_all(&dir).ok();
}
