#![allow(dead_code)]

use gif_squeeze::SqueezeConfig;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// 43-byte, single-frame 1x1 GIF89a
pub const TINY_GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00\xff\xff\xff\x00\x00\x00!\xf9\x04\x01\x00\x00\x00\x00,\x00\x00\x00\x00\x01\x00\x01\x00\x00\x02\x02D\x01\x00;";

/// What the fake writes as its "compressed" output
pub const SHRUNK_GIF: &[u8] = b"GIF89a\x02\x00\x02\x00;";

pub enum Behaviour {
    Shrink,
    Fail,
    Garbage,
    NoOutput,
}

/// A shell script standing in for gifsicle. It records its argv for
/// compression runs and answers `--version` / `--info` with fixed text.
pub struct FakeGifsicle {
    dir: TempDir,
    pub program: String,
    args_file: PathBuf,
}

impl FakeGifsicle {
    pub fn new(behaviour: Behaviour) -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let args_file = dir.path().join("args.txt");
        let program = dir.path().join("gifsicle");

        let action = match behaviour {
            Behaviour::Shrink => "printf 'GIF89a\\002\\000\\002\\000;' > \"$output\"\necho \"compressed $input\"",
            Behaviour::Fail => "echo \"gifsicle: $input: file not in GIF format\" >&2\nexit 1",
            Behaviour::Garbage => "printf 'oops' > \"$output\"",
            Behaviour::NoOutput => "exit 0",
        };

        let script = format!(
            r#"#!/bin/sh
case "$1" in
  --version)
    echo "LCDF Gifsicle 1.94"
    exit 0
    ;;
  --info)
    echo "* $2 2 images"
    echo "  logical screen 2x2"
    echo "  global color table [4]"
    echo "  + image #0 2x2"
    echo "  + image #1 2x2"
    exit 0
    ;;
esac
echo "$@" > '{args}'
prev=""
input=""
output=""
for arg in "$@"; do
  if [ "$prev" = "-o" ]; then output="$arg"; fi
  if [ "$arg" = "-o" ]; then input="$prev"; fi
  prev="$arg"
done
{action}
"#,
            args = args_file.display(),
            action = action,
        );

        std::fs::write(&program, script).expect("write fake gifsicle");
        std::fs::set_permissions(&program, std::fs::Permissions::from_mode(0o755))
            .expect("make fake gifsicle executable");

        Self {
            program: program.to_string_lossy().into_owned(),
            dir,
            args_file,
        }
    }

    /// argv of the last compression run, if there was one
    pub fn invoked_args(&self) -> Option<String> {
        std::fs::read_to_string(&self.args_file)
            .ok()
            .map(|s| s.trim().to_string())
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

pub fn write_input(dir: &Path, name: &str, data: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, data).expect("write input gif");
    path
}

pub fn config_for(fake: &FakeGifsicle, output_dir: &Path) -> SqueezeConfig {
    SqueezeConfig {
        gifsicle_path: fake.program.clone(),
        timeout_seconds: 10,
        output_dir: output_dir.to_string_lossy().into_owned(),
        ..SqueezeConfig::default()
    }
}
