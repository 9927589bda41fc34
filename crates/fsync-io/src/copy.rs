//! Single-file copy with lock-aware source opening

use fsync_types::{BufferSize, Error, Result, RetryPolicy};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use std::thread;
use tracing::{debug, warn};

/// Copy options for customizing copy behavior
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CopyOptions {
    /// Chunk size used to stream file contents
    pub buffer_size: BufferSize,
    /// Policy applied when the source is locked by another process
    pub retry: RetryPolicy,
}

/// Whether an open failure means another process holds the file
#[cfg(windows)]
pub fn is_sharing_violation(error: &io::Error) -> bool {
    const ERROR_SHARING_VIOLATION: i32 = 32;
    const ERROR_LOCK_VIOLATION: i32 = 33;
    matches!(
        error.raw_os_error(),
        Some(ERROR_SHARING_VIOLATION | ERROR_LOCK_VIOLATION)
    )
}

/// Whether an open failure means another process holds the file
///
/// Unix has no mandatory sharing locks. `ETXTBSY` is only raised when a
/// running executable is opened for writing, so a read-only source open is
/// never retried here and the retry policy has no effect on this platform.
#[cfg(unix)]
pub fn is_sharing_violation(error: &io::Error) -> bool {
    error.raw_os_error() == Some(libc::ETXTBSY)
}

/// Whether an open failure means another process holds the file
#[cfg(not(any(unix, windows)))]
pub fn is_sharing_violation(_error: &io::Error) -> bool {
    false
}

/// Run `open` until it succeeds, retrying only errors `is_transient` accepts
///
/// At most `policy.max_attempts` calls are made, `policy.delay` apart. Any
/// other failure is returned right away.
pub fn open_with_retry<T, F, P>(
    path: &Path,
    policy: &RetryPolicy,
    mut open: F,
    is_transient: P,
) -> Result<T>
where
    F: FnMut(&Path) -> io::Result<T>,
    P: Fn(&io::Error) -> bool,
{
    let mut attempt = 1;
    loop {
        match open(path) {
            Ok(handle) => return Ok(handle),
            Err(e) if is_transient(&e) => {
                if attempt >= policy.max_attempts {
                    return Err(Error::Busy {
                        path: path.to_path_buf(),
                        attempts: attempt,
                    });
                }
                if attempt == 1 {
                    warn!("'{}' is locked by another process, retrying", path.display());
                }
                attempt += 1;
                thread::sleep(policy.delay);
            }
            Err(e) => return Err(Error::io_at(path, &e)),
        }
    }
}

/// Open `path` for reading, waiting out sharing violations
pub fn open_read_with_retry(path: &Path, policy: &RetryPolicy) -> Result<File> {
    open_with_retry(path, policy, |p| File::open(p), is_sharing_violation)
}

/// Stream `source` into `destination` through `buffer`
///
/// The destination is created or truncated. Both handles are closed when this
/// returns, whatever the outcome. Returns the number of bytes written.
pub fn copy_file(
    source: &Path,
    destination: &Path,
    options: &CopyOptions,
    buffer: &mut [u8],
) -> Result<u64> {
    let mut reader = open_read_with_retry(source, &options.retry)?;
    let mut writer = File::create(destination).map_err(|e| {
        Error::copy(
            source,
            destination,
            format!("cannot create destination: {}", e),
        )
    })?;

    let bytes = copy_stream(&mut reader, &mut writer, buffer)
        .map_err(|e| Error::copy(source, destination, e.to_string()))?;

    debug!(
        "Copied {} bytes: {} -> {}",
        bytes,
        source.display(),
        destination.display()
    );
    Ok(bytes)
}

/// Copy a reader into a writer chunk by chunk until end of input
pub fn copy_stream<R: Read, W: Write>(
    reader: &mut R,
    writer: &mut W,
    buffer: &mut [u8],
) -> io::Result<u64> {
    let mut total = 0u64;
    loop {
        let read = match reader.read(buffer) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        };
        writer.write_all(&buffer[..read])?;
        total += read as u64;
    }
    writer.flush()?;
    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::time::Duration;
    use tempfile::TempDir;

    fn fast_retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::new(max_attempts, Duration::from_millis(1)).unwrap()
    }

    fn busy() -> io::Error {
        io::Error::new(io::ErrorKind::Other, "busy")
    }

    #[test]
    fn test_copy_file_replaces_destination() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("source.bin");
        let destination = temp_dir.path().join("destination.bin");
        let content: Vec<u8> = (0..20_000u32).map(|i| (i % 251) as u8).collect();
        std::fs::write(&source, &content).unwrap();
        std::fs::write(&destination, vec![0xAA; 50_000]).unwrap();

        let mut buffer = vec![0u8; 4096];
        let bytes = copy_file(&source, &destination, &CopyOptions::default(), &mut buffer).unwrap();

        assert_eq!(bytes, content.len() as u64);
        assert_eq!(std::fs::read(&destination).unwrap(), content);
    }

    #[test]
    fn test_copy_missing_source_fails_without_retry() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.path().join("missing");
        let destination = temp_dir.path().join("out");

        let mut buffer = vec![0u8; 4096];
        let err = copy_file(&source, &destination, &CopyOptions::default(), &mut buffer).unwrap_err();

        assert!(matches!(err, Error::FileNotFound { .. }));
        assert!(!destination.exists());
    }

    #[test]
    fn test_open_retries_transient_failures() {
        let calls = Cell::new(0);
        let result = open_with_retry(
            Path::new("locked"),
            &fast_retry(5),
            |_| {
                calls.set(calls.get() + 1);
                if calls.get() < 3 {
                    Err(busy())
                } else {
                    Ok(42)
                }
            },
            |_| true,
        );

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_open_gives_up_after_max_attempts() {
        let calls = Cell::new(0);
        let result: Result<()> = open_with_retry(
            Path::new("locked"),
            &fast_retry(4),
            |_| {
                calls.set(calls.get() + 1);
                Err(busy())
            },
            |_| true,
        );

        assert!(matches!(result, Err(Error::Busy { attempts: 4, .. })));
        assert_eq!(calls.get(), 4);
    }

    #[test]
    fn test_open_does_not_retry_other_failures() {
        let calls = Cell::new(0);
        let result: Result<()> = open_with_retry(
            Path::new("denied"),
            &fast_retry(10),
            |_| {
                calls.set(calls.get() + 1);
                Err(io::Error::new(io::ErrorKind::PermissionDenied, "no"))
            },
            |_| false,
        );

        assert!(matches!(result, Err(Error::PermissionDenied { .. })));
        assert_eq!(calls.get(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn test_unix_sharing_violation_is_text_busy_only() {
        assert!(is_sharing_violation(&io::Error::from_raw_os_error(libc::ETXTBSY)));
        assert!(!is_sharing_violation(&io::Error::from_raw_os_error(libc::EACCES)));
        assert!(!is_sharing_violation(&io::Error::from_raw_os_error(libc::EAGAIN)));
    }

    #[test]
    fn test_copy_stream_with_small_buffer() {
        let data = b"chunked copy through a tiny buffer".to_vec();
        let mut reader = io::Cursor::new(data.clone());
        let mut out = Vec::new();
        let mut buffer = [0u8; 5];

        let copied = copy_stream(&mut reader, &mut out, &mut buffer).unwrap();
        assert_eq!(copied, data.len() as u64);
        assert_eq!(out, data);
    }
}
