//! One sampled GPU process and the typed views over its text columns.

use std::fmt;

/// Columns of a data line, in the positional order the sampling command emits them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Type,
    GpuIndex,
    Pid,
    SmUtil,
    MemUtil,
    EncUtil,
    DecUtil,
    FbMemUsage,
}

impl Field {
    pub const ALL: [Field; 9] = [
        Field::Name,
        Field::Type,
        Field::GpuIndex,
        Field::Pid,
        Field::SmUtil,
        Field::MemUtil,
        Field::EncUtil,
        Field::DecUtil,
        Field::FbMemUsage,
    ];

    /// Number of whitespace-delimited columns on every data line.
    pub const COUNT: usize = Self::ALL.len();

    pub fn index(self) -> usize {
        self as usize
    }

    /// Short column key, used for DataFrame columns.
    pub fn key(self) -> &'static str {
        match self {
            Field::Name => "name",
            Field::Type => "type",
            Field::GpuIndex => "gpu",
            Field::Pid => "pid",
            Field::SmUtil => "sm",
            Field::MemUtil => "mem",
            Field::EncUtil => "enc",
            Field::DecUtil => "dec",
            Field::FbMemUsage => "fb",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessType {
    Compute,
    Graphics,
    #[default]
    Unknown,
}

impl ProcessType {
    pub fn from_column(s: &str) -> Self {
        match s.trim() {
            "C" => Self::Compute,
            "G" => Self::Graphics,
            _ => Self::Unknown,
        }
    }
}

/// A column value after integer coercion. Anything that is not a whole
/// base-10 integer (e.g. `-` for an idle counter) is kept as text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellValue {
    Integer(i64),
    Text(String),
}

impl CellValue {
    pub fn coerce(s: &str) -> Self {
        match s.parse::<i64>() {
            Ok(i) => CellValue::Integer(i),
            Err(_) => CellValue::Text(s.to_string()),
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            CellValue::Integer(i) => Some(*i),
            CellValue::Text(_) => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Integer(i) => write!(f, "{}", i),
            CellValue::Text(s) => f.write_str(s),
        }
    }
}

/// A single process as reported by one sampling cycle.
///
/// Columns are stored verbatim; coercion is left to whoever displays them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessRecord {
    pub name: String,
    pub kind: String,
    pub gpu_index: String,
    pub pid: String,
    pub sm_util: String,
    pub mem_util: String,
    pub enc_util: String,
    pub dec_util: String,
    pub fb_mem_usage: String,
}

impl ProcessRecord {
    /// Build a record from at least [`Field::COUNT`] columns; extra trailing columns are ignored.
    /// Returns `None` when there are too few.
    pub fn from_columns(columns: &[&str]) -> Option<Self> {
        if columns.len() < Field::COUNT {
            return None;
        }
        let col = |field: Field| columns[field.index()].to_string();
        Some(Self {
            name: col(Field::Name),
            kind: col(Field::Type),
            gpu_index: col(Field::GpuIndex),
            pid: col(Field::Pid),
            sm_util: col(Field::SmUtil),
            mem_util: col(Field::MemUtil),
            enc_util: col(Field::EncUtil),
            dec_util: col(Field::DecUtil),
            fb_mem_usage: col(Field::FbMemUsage),
        })
    }

    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Type => &self.kind,
            Field::GpuIndex => &self.gpu_index,
            Field::Pid => &self.pid,
            Field::SmUtil => &self.sm_util,
            Field::MemUtil => &self.mem_util,
            Field::EncUtil => &self.enc_util,
            Field::DecUtil => &self.dec_util,
            Field::FbMemUsage => &self.fb_mem_usage,
        }
    }

    pub fn cell(&self, field: Field) -> CellValue {
        CellValue::coerce(self.get(field))
    }

    pub fn process_type(&self) -> ProcessType {
        ProcessType::from_column(&self.kind)
    }

    /// The pid as an OS process id, if the column holds one.
    pub fn pid_number(&self) -> Option<u32> {
        self.pid.parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chrome() -> ProcessRecord {
        ProcessRecord::from_columns(&["chrome", "G", "0", "1234", "10", "20", "0", "-", "512"])
            .unwrap()
    }

    #[test]
    fn test_from_columns_positional() {
        let record = chrome();
        assert_eq!(record.name, "chrome");
        assert_eq!(record.kind, "G");
        assert_eq!(record.gpu_index, "0");
        assert_eq!(record.pid, "1234");
        assert_eq!(record.fb_mem_usage, "512");
        for field in Field::ALL {
            assert!(!record.get(field).is_empty());
        }
    }

    #[test]
    fn test_from_columns_too_few() {
        assert!(ProcessRecord::from_columns(&["chrome", "G", "0", "1234"]).is_none());
    }

    #[test]
    fn test_from_columns_ignores_extra_trailing() {
        let record = ProcessRecord::from_columns(&[
            "a", "C", "1", "42", "1", "2", "3", "4", "5", "extra",
        ])
        .unwrap();
        assert_eq!(record.fb_mem_usage, "5");
    }

    #[test]
    fn test_cell_coercion() {
        let record = chrome();
        assert_eq!(record.cell(Field::Pid), CellValue::Integer(1234));
        assert_eq!(record.cell(Field::DecUtil), CellValue::Text("-".to_string()));
        assert_eq!(record.cell(Field::Name).as_integer(), None);
        assert_eq!(CellValue::coerce("007"), CellValue::Integer(7));
        assert_eq!(CellValue::coerce("12abc").to_string(), "12abc");
    }

    #[test]
    fn test_typed_accessors() {
        let record = chrome();
        assert_eq!(record.process_type(), ProcessType::Graphics);
        assert_eq!(record.pid_number(), Some(1234));
        assert_eq!(ProcessType::from_column("C"), ProcessType::Compute);
        assert_eq!(ProcessType::from_column("C+G"), ProcessType::Unknown);
    }
}
