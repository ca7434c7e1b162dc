use anyhow::{anyhow, Error};
use serde_json::Value;
use tracing::debug;

use crate::record::{BatchItem, ExecutionContext, InputItem, OutputRecord};

/// Merge `token` into every item of the batch, in order.
///
/// A fold over the input sequence: each item yields either an enriched record
/// or, under continue-on-fail, a `Failed` slot at the same position. With
/// continue-on-fail off the first failing item short-circuits, reported as
/// `(index, error)`. Inputs are never mutated.
pub fn batch(
    ctx: &ExecutionContext,
    token: String,
    field_name: &str,
) -> Result<Vec<BatchItem>, (usize, Error)> {
    let mut out = Vec::with_capacity(ctx.items.len());

    for (index, item) in ctx.items.iter().enumerate() {
        match enrich_item(item, index, &token, field_name) {
            Ok(record) => out.push(BatchItem::Enriched(record)),
            Err(err) if ctx.continue_on_fail => {
                debug!("item {index} failed, continuing: {err:#}");
                out.push(BatchItem::Failed {
                    index,
                    message: format!("{err:#}"),
                });
            }
            Err(err) => return Err((index, err)),
        }
    }

    Ok(out)
}

/// Build one output record: a deep, independent copy of the item's `data` with
/// the token merged in. The attachment is shared, not copied; only the small
/// `data` payload is duplicated.
fn enrich_item(
    item: &InputItem,
    index: usize,
    token: &str,
    field_name: &str,
) -> Result<OutputRecord, Error> {
    let data = item
        .data
        .as_object()
        .ok_or_else(|| anyhow!("item data is not an object (found {})", type_name(&item.data)))?;

    // Map clone is a deep copy; the output shares no substructure with the input.
    let mut data = data.clone();
    data.insert(field_name.to_owned(), Value::String(token.to_owned()));

    Ok(OutputRecord {
        data: Value::Object(data),
        attachment: item.attachment.clone(),
        index,
    })
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
