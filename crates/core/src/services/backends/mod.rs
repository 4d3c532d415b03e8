pub mod addr2line_tool;
#[cfg(feature = "dwarf-backend")]
pub mod dwarf;

pub use addr2line_tool::Addr2LineTool;
#[cfg(feature = "dwarf-backend")]
pub use dwarf::DwarfResolver;
