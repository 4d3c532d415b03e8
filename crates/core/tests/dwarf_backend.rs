#![cfg(feature = "dwarf-backend")]

use std::fs;

#[cfg(target_os = "linux")]
use object::{Object, ObjectSymbol};

use backtrace_core::services::backends::dwarf::{format_frames, parse_address, FrameText};
use backtrace_core::services::backends::DwarfResolver;
use backtrace_core::services::resolution::{ResolveError, SymbolResolver};
use tempfile::tempdir;

#[test]
fn parses_prefixed_and_bare_hex() {
    assert_eq!(parse_address("0x400810a4").unwrap(), 0x4008_10a4);
    assert_eq!(parse_address("0X10").unwrap(), 0x10);
    assert_eq!(parse_address("ff").unwrap(), 0xff);
    assert!(matches!(parse_address("0xzz"), Err(ResolveError::InvalidAddress(_))));
}

#[test]
fn formats_like_addr2line_pretty_output() {
    let frames = vec![
        FrameText {
            function: Some("inner".into()),
            file: Some("/src/a.c".into()),
            line: Some(10),
        },
        FrameText { function: Some("outer".into()), file: Some("/src/b.c".into()), line: None },
    ];
    assert_eq!(
        format_frames(0x4008_10a4, 8, &frames),
        "0x400810a4: inner at /src/a.c:10\n (inlined by) outer at /src/b.c:?"
    );
}

#[test]
fn no_debug_info_uses_unknown_marker() {
    assert_eq!(format_frames(0x10, 8, &[]), "0x00000010: ?? ??:0");
    let blank = FrameText { function: None, file: None, line: None };
    assert!(format_frames(0x10, 8, &[blank]).contains("?? ??"));
}

#[test]
fn address_is_padded_to_image_width() {
    assert_eq!(format_frames(0x4000, 16, &[]), "0x0000000000004000: ?? ??:0");
}

#[test]
fn missing_image_is_fatal() {
    let err = DwarfResolver::new()
        .resolve(std::path::Path::new("build-nope/firmware.elf"), "0x1")
        .unwrap_err();
    assert!(matches!(err, ResolveError::MissingImage(_)));
}

#[test]
fn non_object_file_is_a_tool_error() {
    let temp = tempdir().unwrap();
    let image = temp.path().join("firmware.elf");
    fs::write(&image, b"definitely not an object file").unwrap();
    let err = DwarfResolver::new().resolve(&image, "0x1").unwrap_err();
    assert!(matches!(err, ResolveError::Tool(_)), "unexpected error: {err:?}");
}

#[cfg(target_os = "linux")]
#[test]
fn address_zero_in_test_binary_is_unknown() {
    let exe = std::env::current_exe().unwrap();
    let resolver = DwarfResolver::new();
    let out = resolver.resolve(&exe, "0x0").unwrap().unwrap();
    assert!(out.contains("?? ??"), "unexpected output: {out}");
    // Second lookup hits the cached context.
    assert_eq!(resolver.resolve(&exe, "0x0").unwrap().unwrap(), out);
}

/// Lookup target with a stable symbol name in this test executable.
#[no_mangle]
#[inline(never)]
pub extern "C" fn dwarf_lookup_target(x: u32) -> u32 {
    x.wrapping_mul(3).wrapping_add(1)
}

#[cfg(target_os = "linux")]
#[test]
fn resolves_known_function_in_test_binary() {
    assert_eq!(std::hint::black_box(dwarf_lookup_target)(2), 7);

    let exe = std::env::current_exe().unwrap();
    let data = fs::read(&exe).unwrap();
    let obj = object::File::parse(&*data).unwrap();
    let symbol = obj
        .symbols()
        .find(|s| matches!(s.name(), Ok("dwarf_lookup_target")))
        .expect("dwarf_lookup_target symbol");
    let addr = symbol.address();
    let width = if obj.is_64() { 16 } else { 8 };

    let out = DwarfResolver::new().resolve(&exe, &format!("{addr:#x}")).unwrap().unwrap();
    assert!(out.starts_with(&format!("0x{addr:0width$x}: ")), "unexpected output: {out}");
    assert!(!out.contains("?? ??"), "unexpected output: {out}");
    let location = out.lines().next().unwrap();
    assert!(location.contains("dwarf_lookup_target at "), "unexpected output: {out}");
    let (file, line) = location.rsplit_once(':').unwrap();
    assert!(file.ends_with("dwarf_backend.rs"), "unexpected output: {out}");
    assert!(line.parse::<u32>().is_ok(), "unexpected output: {out}");
}
