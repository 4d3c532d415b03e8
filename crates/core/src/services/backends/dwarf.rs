use std::borrow::Cow;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use addr2line::Context;
use gimli::{EndianRcSlice, RunTimeEndian};
use object::{Object, ObjectSection};

use crate::services::resolution::{ResolveError, SymbolResolver};

type DwarfContext = Context<EndianRcSlice<RunTimeEndian>>;

/// Parsed debug info plus the hex digit count addr2line pads addresses to.
struct LoadedImage {
    ctx: DwarfContext,
    addr_width: usize,
}

/// In-process resolver reading DWARF line tables directly from the image.
///
/// Output mimics `addr2line -aipfC` so the unknown-marker policy applies
/// unchanged. Each image is parsed once and cached for the process lifetime.
#[derive(Default)]
pub struct DwarfResolver {
    images: RefCell<HashMap<PathBuf, LoadedImage>>,
}

impl DwarfResolver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SymbolResolver for DwarfResolver {
    fn resolve(&self, image: &Path, address: &str) -> Result<Option<String>, ResolveError> {
        if !image.is_file() {
            return Err(ResolveError::MissingImage(image.to_path_buf()));
        }
        let addr = parse_address(address)?;

        let mut images = self.images.borrow_mut();
        if !images.contains_key(image) {
            log::debug!("loading DWARF from {}", image.display());
            let loaded = load_image(image)?;
            images.insert(image.to_path_buf(), loaded);
        }
        let Some(loaded) = images.get(image) else {
            return Ok(None);
        };

        let frames = collect_frames(&loaded.ctx, addr)
            .map_err(|e| ResolveError::Tool(format!("DWARF lookup failed: {e}")))?;
        Ok(Some(format_frames(addr, loaded.addr_width, &frames)))
    }

    fn name(&self) -> &'static str {
        "dwarf"
    }
}

/// Parse a `0x`-prefixed (or bare) hexadecimal address.
pub fn parse_address(address: &str) -> Result<u64, ResolveError> {
    let hex = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address);
    u64::from_str_radix(hex, 16).map_err(|_| ResolveError::InvalidAddress(address.to_string()))
}

fn load_image(image: &Path) -> Result<LoadedImage, ResolveError> {
    let data = fs::read(image)
        .map_err(|e| ResolveError::Tool(format!("failed to read {}: {e}", image.display())))?;
    let obj = object::File::parse(&*data)
        .map_err(|e| ResolveError::Tool(format!("failed to parse {}: {e}", image.display())))?;
    let endian = if obj.is_little_endian() { RunTimeEndian::Little } else { RunTimeEndian::Big };
    let addr_width = if obj.is_64() { 16 } else { 8 };

    let load_section = |id: gimli::SectionId| -> Result<EndianRcSlice<RunTimeEndian>, gimli::Error> {
        let data = obj
            .section_by_name(id.name())
            .and_then(|section| section.uncompressed_data().ok())
            .unwrap_or(Cow::Borrowed(&[][..]));
        Ok(EndianRcSlice::new(Rc::from(&*data), endian))
    };

    let dwarf = gimli::Dwarf::load(&load_section)
        .map_err(|e| ResolveError::Tool(format!("failed to load DWARF: {e}")))?;
    let ctx = Context::from_dwarf(dwarf)
        .map_err(|e| ResolveError::Tool(format!("failed to index DWARF: {e}")))?;
    Ok(LoadedImage { ctx, addr_width })
}

/// Innermost inlined frame first, like addr2line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameText {
    pub function: Option<String>,
    pub file: Option<String>,
    pub line: Option<u32>,
}

fn collect_frames(ctx: &DwarfContext, addr: u64) -> Result<Vec<FrameText>, gimli::Error> {
    let mut out = Vec::new();
    let mut frames = ctx.find_frames(addr).skip_all_loads()?;
    while let Some(frame) = frames.next()? {
        let function = frame.function.and_then(|f| f.demangle().ok().map(|s| s.to_string()));
        let (file, line) = match frame.location {
            Some(loc) => (loc.file.map(str::to_string), loc.line),
            None => (None, None),
        };
        out.push(FrameText { function, file, line });
    }
    Ok(out)
}

/// Render frames the way `addr2line -aipf` prints them, zero-padding the
/// address to `addr_width` hex digits (8 for 32-bit images, 16 for 64-bit).
pub fn format_frames(addr: u64, addr_width: usize, frames: &[FrameText]) -> String {
    let mut out = format!("0x{addr:0addr_width$x}: ");
    if frames.iter().all(|f| f.function.is_none() && f.file.is_none()) {
        out.push_str("?? ??:0");
        return out;
    }
    for (idx, frame) in frames.iter().enumerate() {
        if idx > 0 {
            out.push_str("\n (inlined by) ");
        }
        let function = frame.function.as_deref().unwrap_or("??");
        let file = frame.file.as_deref().unwrap_or("??");
        let line = frame.line.map_or_else(|| "?".to_string(), |l| l.to_string());
        out.push_str(&format!("{function} at {file}:{line}"));
    }
    out
}
