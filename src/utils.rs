/// Path processing utility functions / 路径处理工具函数

/// Video container extensions / 视频容器扩展名
const VIDEO_EXTS: [&str; 4] = ["webm", "mp4", "m4v", "ogv"];

/// Split a storage path into clean segments / 将路径拆分为片段
/// 1. Replace backslashes with forward slashes / 将反斜杠替换为正斜杠
/// 2. Drop empty and `.` segments / 去除空片段和 `.`
/// 3. `..` removes the previous segment / `..` 回退上一级
pub fn split_segments(path: &str) -> Vec<String> {
    let path = path.replace('\\', "/");
    let mut parts: Vec<String> = Vec::new();

    for part in path.split('/') {
        match part {
            "" | "." => continue,
            ".." => {
                parts.pop();
            }
            _ => parts.push(part.to_string()),
        }
    }

    parts
}

/// Percent-encode a single path segment / 编码单个路径片段
pub fn encode_segment(segment: &str) -> String {
    urlencoding::encode(segment).into_owned()
}

/// Encode raw segments one by one and join them with `/` / 逐段编码，分隔符不编码
pub fn encode_path<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|segment| encode_segment(segment.as_ref()))
        .collect::<Vec<_>>()
        .join("/")
}

/// Get file extension (lowercase) / 获取文件扩展名
pub fn get_ext(path: &str) -> String {
    std::path::Path::new(path)
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Whether a filename names a video container / 是否为视频文件
pub fn is_video_file(filename: &str) -> bool {
    VIDEO_EXTS.contains(&get_ext(filename).as_str())
}

/// Join a base URL and an already-encoded relative path / 拼接基础地址与路径
pub fn join_url(base: &str, encoded_path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        encoded_path.trim_start_matches('/')
    )
}
