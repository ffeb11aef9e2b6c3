// ! Site workbook importers

pub mod excel_importer;
pub mod join;
pub mod station_builder;
pub mod workbook;

// Re-export commonly used items
pub use excel_importer::{
    build_inventory, load_from_excel, merge_sheets, ImportError, ImportOutcome,
    SpreadsheetImporter,
};
pub use join::JoinReport;
pub use station_builder::{ChannelRecord, Motion, StationContext, StationRecord};
pub use workbook::{Row, SheetSet, SheetTable};
