//! Shader source loading.
//!
//! `src` is either an `http(s)://` URL fetched with a single GET, a `file://`
//! URL, or a plain filesystem path. There is no caching and no retry.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};

use reqwest::Url;
use url::ParseError;

#[derive(Debug)]
pub enum LoadError {
    /// `src` was empty or missing.
    EmptyTarget,
    /// `src` looked like a URL but did not parse, or names no local file.
    InvalidUrl(String),
    UnsupportedScheme(String),
    Io { path: PathBuf, source: io::Error },
    /// Transport failure (connect, TLS, body read) or client setup failure.
    Http(String),
    /// Server answered with a non-success status.
    Status { url: String, status: u16 },
}

impl fmt::Display for LoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadError::EmptyTarget => write!(f, "empty shader source location"),
            LoadError::InvalidUrl(src) => write!(f, "invalid shader URL {src:?}"),
            LoadError::UnsupportedScheme(scheme) => {
                write!(f, "unsupported shader URL scheme {scheme:?}")
            }
            LoadError::Io { path, source } => write!(f, "failed to read {}: {source}", path.display()),
            LoadError::Http(msg) => write!(f, "shader fetch failed: {msg}"),
            LoadError::Status { url, status } => write!(f, "GET {url} returned status {status}"),
        }
    }
}

impl std::error::Error for LoadError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            LoadError::Io { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    Http(Url),
    File(PathBuf),
}

fn classify(src: &str) -> Result<Target, LoadError> {
    let src = src.trim();
    if src.is_empty() {
        return Err(LoadError::EmptyTarget);
    }

    let url = match Url::parse(src) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => return Ok(Target::File(PathBuf::from(src))),
        Err(_) => return Err(LoadError::InvalidUrl(src.to_string())),
    };

    match url.scheme() {
        "http" | "https" => Ok(Target::Http(url)),
        "file" => url
            .to_file_path()
            .map(Target::File)
            .map_err(|()| LoadError::InvalidUrl(src.to_string())),
        // `C:\shaders\a.wgsl` parses with a one-letter scheme.
        drive if drive.len() == 1 => Ok(Target::File(PathBuf::from(src))),
        other => Err(LoadError::UnsupportedScheme(other.to_string())),
    }
}

/// Fetches shader source text.
pub struct ShaderLoader {
    client: Option<reqwest::blocking::Client>,
}

impl ShaderLoader {
    /// The HTTP client is created on first use, so file loads never touch TLS setup.
    pub fn new() -> Self {
        Self { client: None }
    }

    pub fn with_client(client: reqwest::blocking::Client) -> Self {
        Self {
            client: Some(client),
        }
    }

    pub fn load(&mut self, src: &str) -> Result<String, LoadError> {
        match classify(src)? {
            Target::Http(url) => self.fetch(url),
            Target::File(path) => read_file(&path),
        }
    }

    fn fetch(&mut self, url: Url) -> Result<String, LoadError> {
        let client = match self.client.take() {
            Some(c) => c,
            None => reqwest::blocking::Client::builder()
                .build()
                .map_err(|e| LoadError::Http(e.to_string()))?,
        };
        let client = self.client.insert(client);

        log::debug!("GET {url}");
        let resp = client
            .get(url.clone())
            .send()
            .map_err(|e| LoadError::Http(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(LoadError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        resp.text().map_err(|e| LoadError::Http(e.to_string()))
    }
}

impl Default for ShaderLoader {
    fn default() -> Self {
        Self::new()
    }
}

fn read_file(path: &Path) -> Result<String, LoadError> {
    log::debug!("reading shader {}", path.display());
    std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// One-shot load with a fresh [`ShaderLoader`].
pub fn load_shader_source(src: &str) -> Result<String, LoadError> {
    ShaderLoader::new().load(src)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Read, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves exactly one HTTP response on a loopback port; returns its base URL.
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, thread::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut buf = Vec::new();
            let mut chunk = [0u8; 512];
            while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = stream.read(&mut chunk).unwrap();
                if n == 0 {
                    break;
                }
                buf.extend_from_slice(&chunk[..n]);
            }
            let response = format!(
                "HTTP/1.1 {status_line}\r\nContent-Type: text/plain\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        (format!("http://{addr}"), handle)
    }

    fn loopback_loader() -> ShaderLoader {
        let client = reqwest::blocking::Client::builder().no_proxy().build().unwrap();
        ShaderLoader::with_client(client)
    }

    #[test]
    fn classify_targets() {
        assert!(matches!(classify(""), Err(LoadError::EmptyTarget)));
        assert!(matches!(classify("   "), Err(LoadError::EmptyTarget)));
        assert_eq!(
            classify("https://x.test/a.wgsl").unwrap(),
            Target::Http(Url::parse("https://x.test/a.wgsl").unwrap())
        );
        match classify("HTTP://x.test/a").unwrap() {
            Target::Http(url) => assert_eq!(url.scheme(), "http"),
            other => panic!("unexpected target: {other:?}"),
        }
        assert_eq!(classify("file:///tmp/a.wgsl").unwrap(), Target::File("/tmp/a.wgsl".into()));
        assert_eq!(
            classify("file://localhost/tmp/a.wgsl").unwrap(),
            Target::File("/tmp/a.wgsl".into())
        );
        assert_eq!(classify("shaders/a.wgsl").unwrap(), Target::File("shaders/a.wgsl".into()));
    }

    #[test]
    fn rejects_other_schemes_and_bad_urls() {
        match classify("ftp://x.test/a.wgsl") {
            Err(LoadError::UnsupportedScheme(scheme)) => assert_eq!(scheme, "ftp"),
            other => panic!("unexpected result: {other:?}"),
        }
        assert!(matches!(classify("http://[::1/a.wgsl"), Err(LoadError::InvalidUrl(_))));
        assert!(matches!(classify("file://remote.host/a.wgsl"), Err(LoadError::InvalidUrl(_))));
    }

    #[test]
    fn file_url_is_percent_decoded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my shader.wgsl");
        std::fs::write(&path, "// spaced\n").unwrap();

        let url = Url::from_file_path(&path).unwrap();
        assert!(url.as_str().contains("my%20shader.wgsl"), "{url}");
        assert_eq!(load_shader_source(url.as_str()).unwrap(), "// spaced\n");
    }

    #[test]
    fn empty_src_fails() {
        let err = load_shader_source("").unwrap_err();
        assert!(matches!(err, LoadError::EmptyTarget));
    }

    #[test]
    fn reads_plain_path_and_file_url() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wave.wgsl");
        std::fs::write(&path, "// wave\n").unwrap();

        let plain = load_shader_source(path.to_str().unwrap()).unwrap();
        assert_eq!(plain, "// wave\n");

        let url = Url::from_file_path(&path).unwrap();
        assert_eq!(load_shader_source(url.as_str()).unwrap(), "// wave\n");
    }

    #[test]
    fn missing_file_fails_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.wgsl");
        let err = load_shader_source(path.to_str().unwrap()).unwrap_err();
        match &err {
            LoadError::Io { path: p, source } => {
                assert_eq!(p, &path);
                assert_eq!(source.kind(), io::ErrorKind::NotFound);
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("absent.wgsl"));
    }

    #[test]
    fn fetches_http_body() {
        let (base, server) = serve_once("200 OK", "@fragment fn fs_main() {}");
        let body = loopback_loader().load(&format!("{base}/shader.wgsl")).unwrap();
        server.join().unwrap();
        assert_eq!(body, "@fragment fn fs_main() {}");
    }

    #[test]
    fn non_success_status_fails() {
        let (base, server) = serve_once("404 Not Found", "missing");
        let url = format!("{base}/gone.wgsl");
        let err = loopback_loader().load(&url).unwrap_err();
        server.join().unwrap();
        match err {
            LoadError::Status { url: u, status } => {
                assert_eq!(u, url);
                assert_eq!(status, 404);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn connection_refused_is_http_error() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = loopback_loader().load(&format!("http://{addr}/x.wgsl")).unwrap_err();
        assert!(matches!(err, LoadError::Http(_)));
    }
}
