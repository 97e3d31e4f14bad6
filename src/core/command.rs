use crate::domain::model::{CompressionOptions, Resize};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const DEFAULT_GIFSICLE: &str = "gifsicle";

/// 一次 gifsicle 呼叫的完整 argv
#[derive(Debug, Clone, PartialEq)]
pub struct GifsicleCommand {
    program: String,
    args: Vec<OsString>,
}

impl GifsicleCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    /// 依參數組出壓縮指令：旗標 → 輸入 → `-o` 輸出
    pub fn compress(
        program: impl Into<String>,
        options: &CompressionOptions,
        input: &Path,
        output: &Path,
    ) -> Self {
        let mut cmd = Self::new(program);

        cmd.arg(format!("-O{}", options.optimization_level));

        if options.unoptimize {
            cmd.arg("--unoptimize");
        }

        if let Some(lossy) = options.lossy_compression {
            cmd.arg(format!("--lossy={}", lossy));
        }

        if let Some(colors) = options.colors {
            cmd.arg(format!("--colors={}", colors));
        }

        match options.effective_resize() {
            Some(Resize::Width(width)) => cmd.arg(format!("--resize-width={}", width)),
            Some(Resize::Height(height)) => cmd.arg(format!("--resize-height={}", height)),
            Some(Resize::Scale(scale)) => cmd.arg(format!("--scale={}", scale)),
            None => {}
        }

        cmd.arg(input.as_os_str());
        cmd.arg("-o");
        cmd.arg(output.as_os_str());
        cmd
    }

    pub fn info(program: impl Into<String>, input: &Path) -> Self {
        let mut cmd = Self::new(program);
        cmd.arg("--info");
        cmd.arg(input.as_os_str());
        cmd
    }

    pub fn version(program: impl Into<String>) -> Self {
        let mut cmd = Self::new(program);
        cmd.arg("--version");
        cmd
    }

    pub fn arg(&mut self, arg: impl Into<OsString>) {
        self.args.push(arg.into());
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    pub fn args(&self) -> &[OsString] {
        &self.args
    }

    /// 指令的輸出路徑 (`-o` 後面那個參數)
    pub fn output_path(&self) -> Option<PathBuf> {
        self.args
            .iter()
            .position(|arg| arg == "-o")
            .and_then(|i| self.args.get(i + 1))
            .map(PathBuf::from)
    }

    /// 給日誌看的單行指令，含空白的參數加上引號
    pub fn display(&self) -> String {
        std::iter::once(self.program.clone())
            .chain(self.args.iter().map(|arg| {
                let arg = arg.to_string_lossy();
                if arg.is_empty() || arg.contains(char::is_whitespace) {
                    format!("'{}'", arg)
                } else {
                    arg.into_owned()
                }
            }))
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn to_tokio(&self) -> tokio::process::Command {
        let mut cmd = tokio::process::Command::new(&self.program);
        cmd.args(&self.args);
        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args_of(options: &CompressionOptions) -> Vec<String> {
        GifsicleCommand::compress(
            DEFAULT_GIFSICLE,
            options,
            Path::new("in.gif"),
            Path::new("out.gif"),
        )
        .args()
        .iter()
        .map(|a| a.to_string_lossy().into_owned())
        .collect()
    }

    #[test]
    fn test_default_options() {
        assert_eq!(
            args_of(&CompressionOptions::default()),
            vec!["-O3", "in.gif", "-o", "out.gif"]
        );
    }

    #[test]
    fn test_every_optimization_level() {
        for level in 1..=3 {
            let options = CompressionOptions {
                optimization_level: level,
                ..CompressionOptions::default()
            };
            let args = args_of(&options);
            assert_eq!(args[0], format!("-O{}", level));
            assert_eq!(args.iter().filter(|a| a.starts_with("-O")).count(), 1);
        }
    }

    #[test]
    fn test_every_color_count() {
        for colors in 2..=256 {
            let options = CompressionOptions {
                colors: Some(colors),
                ..CompressionOptions::default()
            };
            assert!(args_of(&options).contains(&format!("--colors={}", colors)));
        }
    }

    #[test]
    fn test_full_flag_order() {
        let options = CompressionOptions {
            optimization_level: 2,
            lossy_compression: Some(80),
            colors: Some(128),
            scale: Some(0.5),
            resize_width: None,
            resize_height: None,
            unoptimize: true,
        };

        assert_eq!(
            args_of(&options),
            vec![
                "-O2",
                "--unoptimize",
                "--lossy=80",
                "--colors=128",
                "--scale=0.5",
                "in.gif",
                "-o",
                "out.gif"
            ]
        );
    }

    #[test]
    fn test_resize_flags_follow_precedence() {
        let width = CompressionOptions {
            scale: Some(0.5),
            resize_width: Some(320),
            resize_height: Some(200),
            ..CompressionOptions::default()
        };
        let args = args_of(&width);
        assert!(args.contains(&"--resize-width=320".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--resize-height")));
        assert!(!args.iter().any(|a| a.starts_with("--scale")));

        let height = CompressionOptions {
            scale: Some(0.5),
            resize_height: Some(200),
            ..CompressionOptions::default()
        };
        let args = args_of(&height);
        assert!(args.contains(&"--resize-height=200".to_string()));
        assert!(!args.iter().any(|a| a.starts_with("--scale")));
    }

    #[test]
    fn test_lossless_has_no_lossy_flag() {
        assert!(!args_of(&CompressionOptions::default())
            .iter()
            .any(|a| a.starts_with("--lossy")));
    }

    #[test]
    fn test_display_and_output_path() {
        let cmd = GifsicleCommand::compress(
            "/usr/bin/gifsicle",
            &CompressionOptions::default(),
            Path::new("/tmp/my cat.gif"),
            Path::new("/tmp/out.gif"),
        );

        assert_eq!(
            cmd.display(),
            "/usr/bin/gifsicle -O3 '/tmp/my cat.gif' -o /tmp/out.gif"
        );
        assert_eq!(cmd.output_path(), Some(PathBuf::from("/tmp/out.gif")));
        assert_eq!(cmd.program(), "/usr/bin/gifsicle");
    }

    #[test]
    fn test_info_and_version_commands() {
        assert_eq!(
            GifsicleCommand::info(DEFAULT_GIFSICLE, Path::new("a.gif")).display(),
            "gifsicle --info a.gif"
        );
        assert_eq!(
            GifsicleCommand::version(DEFAULT_GIFSICLE).display(),
            "gifsicle --version"
        );
        assert_eq!(
            GifsicleCommand::version(DEFAULT_GIFSICLE).output_path(),
            None
        );
    }
}
