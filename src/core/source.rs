use crate::utils::error::{Result, SqueezeError};
use std::path::{Path, PathBuf};
use tokio::io::AsyncReadExt;

const GIF_SIGNATURES: [&[u8; 6]; 2] = [b"GIF87a", b"GIF89a"];

/// 要壓縮的 GIF 來自哪裡
#[derive(Debug, Clone, PartialEq)]
pub enum GifSource {
    Path(PathBuf),
    Bytes { name: String, data: Vec<u8> },
    StorageKey(String),
    Url(String),
}

impl GifSource {
    /// 報告裡顯示的檔名
    pub fn display_name(&self) -> String {
        let name = match self {
            GifSource::Path(path) => path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned()),
            GifSource::Bytes { name, .. } => Some(name.clone()),
            GifSource::StorageKey(key) => key.rsplit('/').next().map(str::to_string),
            GifSource::Url(url) => url::Url::parse(url).ok().and_then(|u| {
                u.path_segments()
                    .and_then(|mut segments| segments.next_back().map(str::to_string))
            }),
        };

        name.filter(|n| !n.is_empty())
            .unwrap_or_else(|| "input.gif".to_string())
    }
}

pub fn has_gif_signature(header: &[u8]) -> bool {
    GIF_SIGNATURES
        .iter()
        .any(|sig| header.len() >= sig.len() && &header[..sig.len()] == sig.as_slice())
}

/// 讀檔頭的前 6 個 byte；檔案較短時回傳較少
pub async fn read_header(path: &Path) -> std::io::Result<Vec<u8>> {
    let file = tokio::fs::File::open(path).await?;
    let mut header = Vec::with_capacity(GIF_SIGNATURES[0].len());
    file.take(GIF_SIGNATURES[0].len() as u64)
        .read_to_end(&mut header)
        .await?;
    Ok(header)
}

/// 記憶體中的資料必須非空且以 GIF87a / GIF89a 開頭
pub fn check_gif_bytes(name: &str, data: &[u8]) -> Result<()> {
    if data.is_empty() {
        return Err(SqueezeError::input(name, "file is empty"));
    }
    if !has_gif_signature(data) {
        return Err(SqueezeError::input(name, "missing GIF87a/GIF89a header"));
    }
    Ok(())
}

/// 檢查磁碟上的 GIF，回傳檔案大小
pub async fn check_gif_file(path: &Path) -> Result<u64> {
    let display = path.display().to_string();

    let metadata = match tokio::fs::metadata(path).await {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SqueezeError::input(display, "file not found"));
        }
        Err(e) => return Err(SqueezeError::IoError(e)),
    };

    if !metadata.is_file() {
        return Err(SqueezeError::input(display, "not a regular file"));
    }
    if metadata.len() == 0 {
        return Err(SqueezeError::input(display, "file is empty"));
    }

    if !has_gif_signature(&read_header(path).await?) {
        return Err(SqueezeError::input(display, "missing GIF87a/GIF89a header"));
    }

    Ok(metadata.len())
}
