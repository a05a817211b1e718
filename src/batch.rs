//! Batch generation: one template filled with many variable maps.
//!
//! Each record gets its own clone of the template. Documents are filled in
//! parallel; each fill stays single-threaded.

use rayon::prelude::*;

use crate::error::Result;
use crate::model::Document;
use crate::render::SaveOptions;
use crate::template::{FillOptions, VariableMap, VariableReplacer};
use crate::FilledDocument;

/// Fill `template` once per record. Results keep the order of `records`.
pub fn fill_batch(
    template: &Document,
    records: &[VariableMap],
    options: &FillOptions,
) -> Vec<FilledDocument> {
    let replacer = VariableReplacer::with_options(options.clone());
    records
        .par_iter()
        .map(|vars| {
            let mut document = template.clone();
            let report = replacer.replace(&mut document, vars);
            FilledDocument {
                document,
                report,
                save_options: SaveOptions::default(),
            }
        })
        .collect()
}

/// Fill and serialize `template` once per record.
///
/// A failure to serialize one document does not affect the others.
pub fn fill_batch_to_bytes(
    template: &Document,
    records: &[VariableMap],
    options: &FillOptions,
    save_options: &SaveOptions,
) -> Vec<Result<Vec<u8>>> {
    let replacer = VariableReplacer::with_options(options.clone());
    let results: Vec<Result<Vec<u8>>> = records
        .par_iter()
        .enumerate()
        .map(|(index, vars)| {
            let mut document = template.clone();
            let report = replacer.replace(&mut document, vars);
            if !report.is_complete() {
                log::warn!(
                    "Record {}: unresolved placeholders {:?}",
                    index,
                    report.unresolved
                );
            }
            document.to_bytes(save_options)
        })
        .collect();

    let failed = results.iter().filter(|r| r.is_err()).count();
    if failed > 0 {
        log::warn!("{} of {} documents failed to serialize", failed, results.len());
    }
    results
}
