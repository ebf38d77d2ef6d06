//! Patching a generated block into an existing source file.
//!
//! Patching is split into locating ([`locate`], [`plan`]) and splicing ([`splice`]) so both halves
//! work on plain strings; [`inject_file`] adds the single read and the atomic write around them.
//!
//! A block is found by its header comment, followed by the frame data declaration, followed by the
//! initialization routine, up to the first closing brace after the routine opens. This is a
//! textual heuristic: an unrelated construct of the same shape earlier in the file would be taken
//! for the block.

use crate::{
    error::{IoSnafu, Result, TargetFileSnafu},
    serialize::{BLOCK_HEADER, FRAME_DATA_DECL, INIT_DECL},
};
use log::{info, warn};
use snafu::ResultExt;
use std::{fs, io::Write, ops::Range, path::Path};

/// Where a new block goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Patch {
    /// Replace the existing block at this byte span.
    Replace(Range<usize>),
    /// No block yet, insert before the last closing brace at this byte offset.
    Insert(usize),
    /// No block and no closing brace, append at the end.
    Append,
}

/// Finds the byte span of the first generated block in `text`.
pub fn locate(text: &str) -> Option<Range<usize>> {
    let start = text.find(BLOCK_HEADER)?;
    let decl = start + text[start..].find(FRAME_DATA_DECL)?;
    let init = decl + text[decl..].find(INIT_DECL)?;
    let body = init + INIT_DECL.len();
    let close = body + text[body..].find('}')?;

    Some(start..close + 1)
}

pub fn plan(text: &str) -> Patch {
    if let Some(span) = locate(text) {
        Patch::Replace(span)
    } else if let Some(brace) = text.rfind('}') {
        Patch::Insert(brace)
    } else {
        Patch::Append
    }
}

pub fn splice(text: &str, patch: &Patch, block: &str) -> String {
    let mut out = String::with_capacity(text.len() + block.len() + 2);

    match patch {
        Patch::Replace(span) => {
            out.push_str(&text[..span.start]);
            out.push_str(block);
            out.push_str(&text[span.end..]);
        }
        Patch::Insert(at) => {
            out.push_str(&text[..*at]);
            out.push('\n');
            out.push_str(block);
            out.push('\n');
            out.push_str(&text[*at..]);
        }
        Patch::Append => {
            out.push_str(text);
            out.push('\n');
            out.push_str(block);
        }
    }

    out
}

/// Replaces the generated block in `text` with `block`, or inserts it if there is none.
///
/// Any further blocks after the replaced one are removed, so the result holds exactly one.
/// Injecting the same block twice yields the same text as injecting it once.
pub fn inject(text: &str, block: &str) -> (String, Patch) {
    let patch = plan(text);
    let mut out = splice(text, &patch, block);

    if let Patch::Replace(span) = &patch {
        let tail = span.start + block.len();
        while let Some(extra) = locate(&out[tail..]) {
            warn!("removing duplicate generated block");
            out.replace_range(tail + extra.start..tail + extra.end, "");
        }
    }

    (out, patch)
}

/// Injects `block` into the file at `path`.
///
/// The file is read once and written once. The new contents go to a temporary file in the same
/// directory which then replaces the target, so a failed write leaves the original untouched.
pub fn inject_file(path: &Path, block: &str) -> Result<Patch> {
    let text = fs::read_to_string(path).context(TargetFileSnafu { path })?;
    let (patched, patch) = inject(&text, block);

    match &patch {
        Patch::Replace(_) => info!("replacing generated block in {}", path.display()),
        Patch::Insert(_) => info!("inserting generated block into {}", path.display()),
        Patch::Append => warn!(
            "no closing brace in {}, appending generated block",
            path.display()
        ),
    }

    write_atomic(path, patched.as_bytes())?;

    Ok(patch)
}

/// Writes `data` to a sibling temporary file, then renames it over `path`.
///
/// An existing file's permissions carry over to the replacement.
pub fn write_atomic(path: &Path, data: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir).context(IoSnafu { path })?;
    tmp.write_all(data).context(IoSnafu { path })?;
    if let Ok(metadata) = fs::metadata(path) {
        tmp.as_file()
            .set_permissions(metadata.permissions())
            .context(IoSnafu { path })?;
    }
    tmp.as_file().sync_all().context(IoSnafu { path })?;
    tmp.persist(path)
        .map_err(|e| e.error)
        .context(IoSnafu { path })?;

    Ok(())
}
