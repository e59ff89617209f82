//! Resource usage table: one row per planned activity.

use serde::Serialize;

use crate::factory::{Needs, UsageOutcome, UsageRecord};

pub const NOT_PROCESSED: &str = "NOT PROCESSED";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UsageRow {
    pub product_index: usize,
    pub activity: usize,
    pub processed: bool,
    /// `None` for activities that did not complete.
    pub needs: Option<Needs>,
    /// `group_name#id` per assigned instance.
    pub resources: Option<Vec<String>>,
    pub request: Option<u64>,
    pub retrieve: Option<u64>,
    pub start: Option<u64>,
    pub finish: Option<u64>,
}

impl UsageRow {
    pub fn from_record(record: &UsageRecord, resource_names: &[String]) -> Self {
        let mut row = UsageRow {
            product_index: record.key.product.0,
            activity: record.key.activity.0,
            processed: false,
            needs: None,
            resources: None,
            request: None,
            retrieve: None,
            start: None,
            finish: None,
        };
        if let UsageOutcome::Completed(c) = &record.outcome {
            row.processed = true;
            row.needs = Some(c.needs.clone());
            row.resources = Some(
                c.resources
                    .iter()
                    .map(|r| {
                        let name = resource_names.get(r.group).map_or("?", String::as_str);
                        format!("{name}#{}", r.id)
                    })
                    .collect(),
            );
            row.request = Some(c.request.0);
            row.retrieve = Some(c.retrieve.0);
            row.start = Some(c.start.0);
            row.finish = Some(c.finish.0);
        }
        row
    }
}

fn cell(v: Option<u64>) -> String {
    v.map_or_else(|| "inf".to_string(), |t| t.to_string())
}

/// 纯文本表格（stdout 用）
pub fn render_table(rows: &[UsageRow]) -> String {
    let mut out = format!(
        "{:>7} {:>8} {:>14} {:<28} {:>8} {:>8} {:>8} {:>8}\n",
        "product", "activity", "needs", "resources", "request", "retrieve", "start", "finish"
    );
    for r in rows {
        let needs = r.needs.as_ref().map_or_else(|| "inf".to_string(), Needs::to_string);
        let resources = r
            .resources
            .as_ref()
            .map_or_else(|| NOT_PROCESSED.to_string(), |v| v.join(","));
        out.push_str(&format!(
            "{:>7} {:>8} {:>14} {:<28} {:>8} {:>8} {:>8} {:>8}\n",
            r.product_index,
            r.activity,
            needs,
            resources,
            cell(r.request),
            cell(r.retrieve),
            cell(r.start),
            cell(r.finish),
        ));
    }
    out
}
