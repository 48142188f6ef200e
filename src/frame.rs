//! Snapshot export to a polars `DataFrame`.

use crate::record::{Field, ProcessRecord};
use crate::utils::errors::MonitoringError;
use itertools::multiunzip;
use polars::prelude::*;

/// DataFrame: name | type | gpu | pid | sm | mem | enc | dec | fb
///
/// Numeric columns are nullable `i64`; a cell that is not an integer
/// (pmon prints `-` for idle counters) becomes null.
pub fn snapshot_frame(records: &[ProcessRecord]) -> Result<DataFrame, MonitoringError> {
    let num = |r: &ProcessRecord, field: Field| r.cell(field).as_integer();

    let (names, types, gpus, pids, sm, mem, enc, dec, fb): (
        Vec<String>,
        Vec<String>,
        Vec<Option<i64>>,
        Vec<Option<i64>>,
        Vec<Option<i64>>,
        Vec<Option<i64>>,
        Vec<Option<i64>>,
        Vec<Option<i64>>,
        Vec<Option<i64>>,
    ) = multiunzip(records.iter().map(|r| {
        (
            r.name.clone(),
            r.kind.clone(),
            num(r, Field::GpuIndex),
            num(r, Field::Pid),
            num(r, Field::SmUtil),
            num(r, Field::MemUtil),
            num(r, Field::EncUtil),
            num(r, Field::DecUtil),
            num(r, Field::FbMemUsage),
        )
    }));

    df![
        Field::Name.key() => names,
        Field::Type.key() => types,
        Field::GpuIndex.key() => gpus,
        Field::Pid.key() => pids,
        Field::SmUtil.key() => sm,
        Field::MemUtil.key() => mem,
        Field::EncUtil.key() => enc,
        Field::DecUtil.key() => dec,
        Field::FbMemUsage.key() => fb,
    ]
    .map_err(|e| MonitoringError::Other(format!("Failed to create snapshot DataFrame: {}", e)))
}
