use std::ffi::OsString;
use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

/// Suffix appended to the destination path to name its digest sidecar.
pub const SIDECAR_EXTENSION: &str = "md5";

/// rw-r--r--
#[cfg(unix)]
const FILE_MODE: u32 = 0o644;

/// `<dest>.<extension>`, appended to the full path string so an existing
/// extension is kept (`a.gz` -> `a.gz.md5`).
pub fn sidecar_path_with(dest: &Path, extension: &str) -> PathBuf {
    let mut s: OsString = dest.as_os_str().to_owned();
    s.push(".");
    s.push(extension);
    PathBuf::from(s)
}

pub fn sidecar_path(dest: impl AsRef<Path>) -> PathBuf {
    sidecar_path_with(dest.as_ref(), SIDECAR_EXTENSION)
}

fn options() -> OpenOptions {
    #[allow(unused_mut)]
    let mut opts = OpenOptions::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        opts.mode(FILE_MODE);
    }
    opts
}

/// Open the sidecar for read+write, creating it empty if absent.
/// Existing content is kept so it can be compared first.
pub(crate) fn open_sidecar(path: &Path) -> io::Result<File> {
    options().read(true).write(true).create(true).open(path)
}

/// Open an output file for writing, creating or truncating it.
pub(crate) fn create_output(path: &Path) -> io::Result<File> {
    options().write(true).create(true).truncate(true).open(path)
}
