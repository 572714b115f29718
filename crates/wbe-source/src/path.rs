//! Vendored and adapted from `path-clean` crate, <https://github.com/danreeves/path-clean>
//!
//! path-clean LICENSE-MIT:
//! Copyright (c) 2018 Dan Reeves
//!
//! Permission is hereby granted, free of charge, to any person obtaining a copy
//! of this software and associated documentation files (the "Software"), to deal
//! in the Software without restriction, including without limitation the rights
//! to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
//! copies of the Software, and to permit persons to whom the Software is
//! furnished to do so, subject to the following conditions:
//!
//! The above copyright notice and this permission notice shall be included in all
//! copies or substantial portions of the Software.
//!
//! THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
//! IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
//! FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
//! AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
//! LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
//! OUT OF OR IN

use camino::Utf8Path;
use camino::Utf8PathBuf;

pub trait Utf8PathClean {
    fn clean(&self) -> Utf8PathBuf;
}

impl Utf8PathClean for Utf8Path {
    fn clean(&self) -> Utf8PathBuf {
        clean_utf8_path(self)
    }
}

impl Utf8PathClean for Utf8PathBuf {
    fn clean(&self) -> Utf8PathBuf {
        clean_utf8_path(self)
    }
}

/// Lexically normalise a filesystem path: drop `.` segments and fold `..`
/// into their parent. Never touches the disk.
pub fn clean_utf8_path(path: &Utf8Path) -> Utf8PathBuf {
    let cleaned = clean_segments(path.as_str(), std::path::MAIN_SEPARATOR);
    Utf8PathBuf::from(cleaned)
}

/// Same as [`clean_utf8_path`] for the `/`-separated path of a URL.
///
/// A trailing separator is dropped unless the path is the root.
pub(crate) fn clean_url_path(path: &str) -> String {
    clean_segments(path, '/')
}

fn clean_segments(path: &str, separator: char) -> String {
    let rooted = path.starts_with(separator);
    let mut out: Vec<&str> = Vec::new();

    for segment in path.split(separator) {
        match segment {
            "" | "." => (),
            ".." => match out.last() {
                Some(&"..") => out.push(segment),
                Some(_) => {
                    out.pop();
                }
                // `/..` is still `/`
                None if rooted => (),
                None => out.push(segment),
            },
            segment => out.push(segment),
        }
    }

    let joined = out.join(&separator.to_string());
    match (rooted, joined.is_empty()) {
        (true, _) => format!("{separator}{joined}"),
        (false, true) => ".".to_string(),
        (false, false) => joined,
    }
}
