//! Renders directory entries for `LIST` and `NLST`.
//!
//! `LIST` lines follow the UNIX `ls -l` column layout; `NLST` emits bare
//! names. Data payload lines are CRLF terminated.

use std::ffi::CStr;
use std::fs::Metadata;
use std::mem::MaybeUninit;
use std::os::unix::fs::MetadataExt;
use std::ptr;

use chrono::{DateTime, Local};

use crate::core_fs::adapter::DirEntry;

/// One `ls -l`-style line: `mode nlink owner group size mtime name`.
pub fn format_entry(entry: &DirEntry) -> String {
    let md = &entry.metadata;
    let mtime: DateTime<Local> = md
        .modified()
        .map(DateTime::from)
        .unwrap_or_else(|_| Local::now());

    format!(
        "{} {:>3} {:<8} {:<8} {:>12} {} {}\r\n",
        mode_string(md),
        md.nlink(),
        owner_name(md.uid()),
        group_name(md.gid()),
        md.len(),
        mtime.format("%b %e %H:%M"),
        entry.name,
    )
}

/// One `NLST` line.
pub fn format_name(name: &str) -> String {
    format!("{}\r\n", name)
}

/// The 10-character mode column, e.g. `drwxr-xr-x`.
fn mode_string(md: &Metadata) -> String {
    let kind = if md.file_type().is_symlink() {
        'l'
    } else if md.is_dir() {
        'd'
    } else {
        '-'
    };

    let mode = md.mode();
    let mut out = String::with_capacity(10);
    out.push(kind);
    for shift in [6u32, 3, 0] {
        let bits = mode >> shift;
        out.push(if bits & 0b100 != 0 { 'r' } else { '-' });
        out.push(if bits & 0b010 != 0 { 'w' } else { '-' });
        out.push(if bits & 0b001 != 0 { 'x' } else { '-' });
    }
    out
}

fn owner_name(uid: u32) -> String {
    lookup_user(uid).unwrap_or_else(|| uid.to_string())
}

fn group_name(gid: u32) -> String {
    lookup_group(gid).unwrap_or_else(|| gid.to_string())
}

fn lookup_user(uid: u32) -> Option<String> {
    let mut pwd = MaybeUninit::<libc::passwd>::uninit();
    let mut buf = [0u8; 2048];
    let mut result: *mut libc::passwd = ptr::null_mut();

    let rc = unsafe {
        libc::getpwuid_r(
            uid,
            pwd.as_mut_ptr(),
            buf.as_mut_ptr().cast::<libc::c_char>(),
            buf.len(),
            &mut result,
        )
    };
    if rc != 0 || result.is_null() {
        return None;
    }
    let name = unsafe { CStr::from_ptr((*result).pw_name) };
    name.to_str().ok().map(str::to_owned)
}

fn lookup_group(gid: u32) -> Option<String> {
    let mut grp = MaybeUninit::<libc::group>::uninit();
    let mut buf = [0u8; 2048];
    let mut result: *mut libc::group = ptr::null_mut();

    let rc = unsafe {
        libc::getgrgid_r(
            gid,
            grp.as_mut_ptr(),
            buf.as_mut_ptr().cast::<libc::c_char>(),
            buf.len(),
            &mut result,
        )
    };
    if rc != 0 || result.is_null() {
        return None;
    }
    let name = unsafe { CStr::from_ptr((*result).gr_name) };
    name.to_str().ok().map(str::to_owned)
}
