//! Fuzz target for the full profiling pipeline.
//!
//! Anything the parser accepts must profile without panicking, with
//! conversion applied so the converter sees the same input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use assay::{ConversionMode, Parser, Profiler, ProfilerConfig};

fuzz_target!(|data: &[u8]| {
    if data.len() > 20_000 {
        return;
    }

    let Ok(dataset) = Parser::new().parse_slice(data) else {
        return;
    };

    // Use the first column as both target and ID to reach the enhanced analyses
    let first = dataset.column_names().first().map(|s| s.to_string());
    let mut config = ProfilerConfig::default().with_conversion(ConversionMode::Apply);
    if let Some(name) = first {
        config = config.with_targets([name.clone()]).with_id_columns([name]);
    }

    if let Ok(profiler) = Profiler::with_config(config) {
        let result = profiler
            .profile_dataset(&dataset, None)
            .expect("profiling without strict validation never fails");
        assert_eq!(result.columns.len(), dataset.column_count());
    }
});
